use anyhow::Result;
use clap::Parser;

use git_release::build::CommandExecutor;
use git_release::cli::{run_release_workflow, ReleaseWorkflowArgs};
use git_release::config;
use git_release::git::{Git2Repository, Repository};
use git_release::github::{GitHubPublisher, ReleasePublisher};
use git_release::ui;

#[derive(clap::Parser)]
#[command(
    name = "git-release",
    version,
    about = "Tag, build, push and publish a release, then bump to the next alpha"
)]
struct Args {
    #[arg(short, long, help = "Version to release, e.g. 1.2.3")]
    release: String,

    #[arg(short, long, help = "Release configuration file (YAML)")]
    config: String,

    #[arg(long, help = "Check versions and show the plan without changing anything")]
    dry_run: bool,

    #[arg(short, long, help = "Enable debug logging")]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();

    if let Err(e) = run(args) {
        ui::display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = config::load_config(&args.config)?;
    let repo = Git2Repository::open(".")?;
    let builder = CommandExecutor::from_config(&config.build);

    // Built up front so a missing token fails before anything is changed
    let publisher = match (&config.github, args.dry_run) {
        (Some(github), false) => Some(GitHubPublisher::new(github, repo.root())?),
        _ => None,
    };

    let workflow_args = ReleaseWorkflowArgs {
        release: args.release,
        dry_run: args.dry_run,
    };
    let result = run_release_workflow(
        &workflow_args,
        &config,
        &repo,
        &builder,
        publisher.as_ref().map(|p| p as &dyn ReleasePublisher),
    )?;

    if args.dry_run {
        ui::display_success(&format!("Dry run complete; {} not created", result.tag));
    } else if let Some(next) = &result.next_version {
        ui::display_success(&format!(
            "Released {} ({}); working tree now at {}",
            result.release, result.tag, next
        ));
    }

    Ok(())
}

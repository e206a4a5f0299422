//! Main release workflow orchestration logic
//!
//! Keeps the release pipeline out of main.rs so it can be driven
//! programmatically, with a [MockRepository](crate::git::MockRepository)
//! or a real repository, without depending on clap.

use crate::analyzer::{validate_versions, VersionReader, VersionState};
use crate::boundary::BoundaryWarning;
use crate::build::BuildRunner;
use crate::config::{ReleaseConfig, VersionLocation};
use crate::domain::{TagPattern, Version};
use crate::error::{ReleaseError, Result};
use crate::git::{ChangeScope, Repository};
use crate::github::{PublishedRelease, ReleaseAsset, ReleasePublisher};
use crate::rewriter::{self, PendingRewrite};
use crate::ui;

/// Arguments for the release workflow
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseWorkflowArgs {
    /// Version being released, e.g. `1.2.3`
    pub release: String,

    /// Read and validate only; print the plan without changing anything
    pub dry_run: bool,
}

/// Result of a release run
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowResult {
    /// The released version
    pub release: Version,

    /// The tag that was created (or would be, on a dry run)
    pub tag: String,

    /// Whether a `Version X` commit was made
    pub committed: bool,

    /// The pre-release version the tree was bumped to
    pub next_version: Option<Version>,

    /// The GitHub release, when one was published
    pub published: Option<PublishedRelease>,

    /// Non-fatal notices collected along the way
    pub warnings: Vec<BoundaryWarning>,
}

/// One release run against a repository
///
/// The individual steps are public so callers can run part of the pipeline;
/// [run](ReleaseWorkflow::run) chains all of them.
pub struct ReleaseWorkflow<'a, R: Repository> {
    repo: &'a R,
    config: &'a ReleaseConfig,
    tag_pattern: TagPattern,
    builder: &'a dyn BuildRunner,
    publisher: Option<&'a dyn ReleasePublisher>,
}

impl<'a, R: Repository> ReleaseWorkflow<'a, R> {
    /// Create a workflow without a release publisher
    pub fn new(repo: &'a R, config: &'a ReleaseConfig, builder: &'a dyn BuildRunner) -> Result<Self> {
        Ok(ReleaseWorkflow {
            repo,
            config,
            tag_pattern: config.tag_pattern()?,
            builder,
            publisher: None,
        })
    }

    /// Publish the pushed tag with `publisher`
    pub fn with_publisher(mut self, publisher: &'a dyn ReleasePublisher) -> Self {
        self.publisher = Some(publisher);
        self
    }

    /// Tag name for a version
    pub fn tag_for(&self, version: &Version) -> String {
        self.tag_pattern.format(version)
    }

    /// Read the versions and check everything that must hold before any change
    ///
    /// Fails when the ordering `latest tag ≤ current ≤ release` is broken, the
    /// release has no next alpha, the release tag already exists, or tracked
    /// files have uncommitted changes.
    pub fn check(&self, release: &Version) -> Result<VersionState> {
        let primary = self.config.primary_location()?;
        let state = VersionReader::new(self.repo, &self.tag_pattern).read(primary)?;
        validate_versions(&state.latest_version, &state.current, release)?;
        release.next_alpha()?;

        let tag = self.tag_for(release);
        if self.repo.tag_exists(&tag)? {
            return Err(ReleaseError::tag(format!("Tag '{}' already exists", tag)));
        }

        if !self.repo.is_clean(ChangeScope::WorkingTree)? || !self.repo.is_clean(ChangeScope::Staged)? {
            return Err(ReleaseError::DirtyWorkingTree);
        }

        Ok(state)
    }

    /// Rewrite `locations` to `version`, stage what changed and commit it
    ///
    /// Returns the rewrites and whether a commit was made. No commit is made
    /// when the index ends up identical to HEAD.
    fn rewrite_and_commit<'l, I>(
        &self,
        locations: I,
        version: &Version,
        message: &str,
    ) -> Result<(Vec<PendingRewrite>, bool)>
    where
        I: IntoIterator<Item = &'l VersionLocation>,
    {
        let rewrites = rewriter::rewrite_versions(self.repo.root(), locations, version)?;
        let changed: Vec<_> = rewrites
            .iter()
            .filter(|rewrite| rewrite.changes_file())
            .map(|rewrite| rewrite.relative_path.clone())
            .collect();

        if !changed.is_empty() {
            self.repo.stage(&changed)?;
        }

        if self.repo.is_clean(ChangeScope::Staged)? {
            return Ok((rewrites, false));
        }

        let oid = self.repo.commit(message)?;
        log::info!("Committed '{}' as {}", message, oid);
        Ok((rewrites, true))
    }

    /// Write the release version, commit `Version X` and create the tag
    ///
    /// Returns whether a commit was made.
    pub fn commit_release(&self, release: &Version, warnings: &mut Vec<BoundaryWarning>) -> Result<bool> {
        let message = format!("Version {}", release);
        let (rewrites, committed) =
            self.rewrite_and_commit(&self.config.version_strings, release, &message)?;
        ui::display_rewrites(&rewrites, release);

        if !committed {
            let warning = BoundaryWarning::NothingToCommit {
                version: release.to_string(),
            };
            ui::display_boundary_warning(&warning);
            warnings.push(warning);
        }

        let tag = self.tag_for(release);
        self.repo.create_tag(&tag)?;
        ui::display_success(&format!("Tagged {}", tag));
        Ok(committed)
    }

    /// Run the build; on failure leave instructions for undoing the local release
    pub fn build(&self, tag: &str) -> Result<()> {
        ui::display_status("Building...");
        if let Err(e) = self.builder.run(self.repo.root()) {
            ui::display_boundary_warning(&BoundaryWarning::LocalReleaseLeftBehind {
                tag: tag.to_string(),
            });
            return Err(e);
        }
        ui::display_success("Build finished");
        Ok(())
    }

    /// Push the current branch and the tag, then the release mirror if configured
    pub fn push_release(&self, branch: &str, tag: &str) -> Result<()> {
        let remote = &self.config.remote;
        ui::display_status(&format!("Pushing {} and {} to {}...", branch, tag, remote));
        self.repo.push_branch(remote, branch, branch)?;
        self.repo.push_tags(remote, &[tag])?;

        if let Some(mirror) = &self.config.git_release {
            ui::display_status(&format!(
                "Pushing {} to {}/{}...",
                branch, mirror.remote, mirror.branch
            ));
            self.repo.push_branch(&mirror.remote, branch, &mirror.branch)?;
        }

        ui::display_success(&format!("Pushed {}", tag));
        Ok(())
    }

    /// Publish the tag as a release; `None` without a publisher
    pub fn publish(&self, tag: &str) -> Result<Option<PublishedRelease>> {
        let (Some(publisher), Some(github)) = (self.publisher, &self.config.github) else {
            log::debug!("No GitHub release configured");
            return Ok(None);
        };

        let assets = github
            .assets
            .iter()
            .map(|asset| ReleaseAsset::from_config(self.repo.root(), asset))
            .collect::<Result<Vec<_>>>()?;

        ui::display_status(&format!("Publishing GitHub release for {}...", tag));
        let published = publisher.publish(tag, &assets)?;
        ui::display_published(&published);
        Ok(Some(published))
    }

    /// Move the files on to the next alpha, commit `Bump version to X` and push
    pub fn bump_to_alpha(
        &self,
        release: &Version,
        branch: &str,
        warnings: &mut Vec<BoundaryWarning>,
    ) -> Result<Version> {
        let next = release.next_alpha()?;

        for location in self.config.version_strings.iter().filter(|l| l.skip_alpha) {
            let warning = BoundaryWarning::AlphaSkipped {
                path: location.path.display().to_string(),
            };
            ui::display_boundary_warning(&warning);
            warnings.push(warning);
        }

        let locations = self.config.version_strings.iter().filter(|l| !l.skip_alpha);
        let message = format!("Bump version to {}", next);
        let (rewrites, committed) = self.rewrite_and_commit(locations, &next, &message)?;
        ui::display_rewrites(&rewrites, &next);

        if committed {
            self.repo.push_branch(&self.config.remote, branch, branch)?;
            ui::display_success(&format!("Bumped version to {}", next));
        }

        Ok(next)
    }

    /// Steps a run would take, for `--dry-run`
    pub fn plan(&self, state: &VersionState, release: &Version, branch: &str) -> Result<Vec<String>> {
        let tag = self.tag_for(release);
        let remote = &self.config.remote;
        let files = self
            .config
            .version_strings
            .iter()
            .map(|l| l.path.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");

        let mut steps = vec![
            format!("Rewrite {} from {} to {}", files, state.current, release),
            format!("Commit \"Version {}\" and tag {}", release, tag),
        ];

        let commands: Vec<String> = [&self.config.build.clean, &self.config.build.build]
            .into_iter()
            .filter(|argv| !argv.is_empty())
            .map(|argv| format!("`{}`", argv.join(" ")))
            .collect();
        if !commands.is_empty() {
            steps.push(format!("Run {}", commands.join(" then ")));
        }

        steps.push(format!("Push {} and {} to {}", branch, tag, remote));
        if let Some(mirror) = &self.config.git_release {
            steps.push(format!("Push {} to {}/{}", branch, mirror.remote, mirror.branch));
        }
        if let Some(github) = &self.config.github {
            steps.push(format!(
                "Publish GitHub release {}/{}@{} with {} asset(s)",
                github.user,
                github.repo,
                tag,
                github.assets.len()
            ));
        }

        let next = release.next_alpha()?;
        steps.push(format!("Commit \"Bump version to {}\" and push {}", next, branch));
        Ok(steps)
    }

    /// Run the whole release
    pub fn run(&self, args: &ReleaseWorkflowArgs) -> Result<WorkflowResult> {
        let release = Version::parse(&args.release)?;
        let tag = self.tag_for(&release);

        let state = self.check(&release)?;
        let mut warnings = state.warnings.clone();
        for warning in &warnings {
            log::warn!("{}", warning);
        }
        ui::display_versions(&state.latest_tag, &state.current, &release);

        let branch = self.repo.current_branch()?;

        if args.dry_run {
            ui::display_plan(&self.plan(&state, &release, &branch)?);
            return Ok(WorkflowResult {
                release,
                tag,
                committed: false,
                next_version: None,
                published: None,
                warnings,
            });
        }

        let committed = self.commit_release(&release, &mut warnings)?;
        self.build(&tag)?;
        self.push_release(&branch, &tag)?;
        let published = self.publish(&tag)?;
        let next_version = self.bump_to_alpha(&release, &branch, &mut warnings)?;

        Ok(WorkflowResult {
            release,
            tag,
            committed,
            next_version: Some(next_version),
            published,
            warnings,
        })
    }
}

/// Main release workflow
///
/// 1. Read the latest tag and the current version, validate the ordering
/// 2. Rewrite the version files, commit and tag
/// 3. Build
/// 4. Push the branch and tag (and the release mirror)
/// 5. Publish the GitHub release, when a publisher is given
/// 6. Bump to the next alpha, commit and push
pub fn run_release_workflow<R: Repository>(
    args: &ReleaseWorkflowArgs,
    config: &ReleaseConfig,
    repo: &R,
    builder: &dyn BuildRunner,
    publisher: Option<&dyn ReleasePublisher>,
) -> Result<WorkflowResult> {
    let mut workflow = ReleaseWorkflow::new(repo, config, builder)?;
    if let Some(publisher) = publisher {
        workflow = workflow.with_publisher(publisher);
    }
    workflow.run(args)
}

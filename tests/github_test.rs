// tests/github_test.rs
//
// Drives GitHubPublisher against a local HTTP server standing in for the API.

use git_release::config::GitHubConfig;
use git_release::github::{GitHubPublisher, ReleaseAsset, ReleasePublisher};
use git_release::ReleaseError;
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const RELEASE_PATH: &str = "/repos/octo/widget/releases";
const TAG_PATH: &str = "/repos/octo/widget/releases/tags/v1.2.3";

fn publisher(server: &ServerGuard, dir: &TempDir) -> GitHubPublisher {
    fs::write(dir.path().join(".token"), "secret\n").unwrap();
    let config = GitHubConfig {
        user: "octo".to_string(),
        repo: "widget".to_string(),
        token: Some(PathBuf::from(".token")),
        assets: Vec::new(),
        api_url: server.url(),
    };
    GitHubPublisher::new(&config, dir.path()).unwrap()
}

fn release_body(server: &ServerGuard, id: u64) -> String {
    json!({
        "id": id,
        "tag_name": "v1.2.3",
        "html_url": "https://github.com/octo/widget/releases/tag/v1.2.3",
        "upload_url": format!("{}/upload/{}/assets{{?name,label}}", server.url(), id),
    })
    .to_string()
}

#[test]
fn test_missing_release_is_created() {
    let mut server = Server::new();
    let dir = TempDir::new().unwrap();
    let lookup = server
        .mock("GET", TAG_PATH)
        .match_header("authorization", "token secret")
        .with_status(404)
        .with_body(r#"{"message":"Not Found"}"#)
        .create();
    let create = server
        .mock("POST", RELEASE_PATH)
        .match_header("authorization", "token secret")
        .match_body(Matcher::Json(json!({ "tag_name": "v1.2.3" })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(release_body(&server, 7))
        .create();

    let published = publisher(&server, &dir).publish("v1.2.3", &[]).unwrap();

    lookup.assert();
    create.assert();
    assert_eq!(published.id, 7);
    assert_eq!(
        published.html_url,
        "https://github.com/octo/widget/releases/tag/v1.2.3"
    );
    assert!(published.uploaded.is_empty());
}

#[test]
fn test_existing_release_is_reused() {
    let mut server = Server::new();
    let dir = TempDir::new().unwrap();
    let lookup = server
        .mock("GET", TAG_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(release_body(&server, 9))
        .create();
    let create = server.mock("POST", RELEASE_PATH).expect(0).create();

    let published = publisher(&server, &dir).publish("v1.2.3", &[]).unwrap();

    lookup.assert();
    create.assert();
    assert_eq!(published.id, 9);
}

#[test]
fn test_asset_upload_sends_name_and_content_type() {
    let mut server = Server::new();
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("widget-1.2.3.tar.gz"), "tarball bytes").unwrap();
    let asset = ReleaseAsset {
        path: dir.path().join("widget-1.2.3.tar.gz"),
        name: "widget-1.2.3.tar.gz".to_string(),
        content_type: "application/gzip".to_string(),
    };

    server
        .mock("GET", TAG_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(release_body(&server, 9))
        .create();
    let upload = server
        .mock("POST", "/upload/9/assets")
        .match_query(Matcher::UrlEncoded(
            "name".to_string(),
            "widget-1.2.3.tar.gz".to_string(),
        ))
        .match_header("content-type", "application/gzip")
        .match_header("authorization", "token secret")
        .match_body("tarball bytes")
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "name": "widget-1.2.3.tar.gz",
                "browser_download_url":
                    "https://github.com/octo/widget/releases/download/v1.2.3/widget-1.2.3.tar.gz",
            })
            .to_string(),
        )
        .create();

    let published = publisher(&server, &dir)
        .publish("v1.2.3", &[asset])
        .unwrap();

    upload.assert();
    assert_eq!(
        published.uploaded,
        vec!["https://github.com/octo/widget/releases/download/v1.2.3/widget-1.2.3.tar.gz"]
    );
}

#[test]
fn test_server_error_is_reported() {
    let mut server = Server::new();
    let dir = TempDir::new().unwrap();
    server
        .mock("GET", TAG_PATH)
        .with_status(500)
        .with_body("boom")
        .create();
    let create = server.mock("POST", RELEASE_PATH).expect(0).create();

    let result = publisher(&server, &dir).publish("v1.2.3", &[]);

    create.assert();
    match result {
        Err(ReleaseError::GitHub(message)) => assert!(message.contains("500"), "{}", message),
        other => panic!("expected a GitHub error, got {:?}", other),
    }
}

#[test]
fn test_failed_upload_is_reported() {
    let mut server = Server::new();
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("notes.txt"), "notes").unwrap();
    let asset = ReleaseAsset {
        path: dir.path().join("notes.txt"),
        name: "notes.txt".to_string(),
        content_type: "text/plain".to_string(),
    };
    server
        .mock("GET", TAG_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(release_body(&server, 9))
        .create();
    server
        .mock("POST", "/upload/9/assets")
        .match_query(Matcher::Any)
        .with_status(422)
        .create();

    let result = publisher(&server, &dir).publish("v1.2.3", &[asset]);

    assert!(matches!(result, Err(ReleaseError::GitHub(_))));
}

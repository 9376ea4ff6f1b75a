//! End-to-end workflow tests against a fixture HTTP server.
//!
//! The fixture serves the management endpoint XML, the release feed
//! JSON, the artifact bytes, and a stand-in notification endpoint, so a
//! whole run of the binary can be observed without touching the network.
//!
//! Install behavior depends on the privileges the test process happens
//! to hold, so assertions that differ between elevated and non-elevated
//! runs branch on `platform::is_elevated()`. The configured package
//! manager is `true` (or `false` for the failure test), never a real
//! one.

use super::common::{
    feed_json, state_xml, CannedResponse, ConfigBuilder, FixtureServer, ARTIFACT_BYTES,
    ARTIFACT_SHA1, GARBAGE_BYTES,
};
use assert_cmd::Command;
use pmsup_cli::utils::platform;
use predicates::prelude::*;
use std::collections::HashMap;

const ARTIFACT_PATH: &str = "/dl/plexmediaserver_1.1_amd64.deb";

fn pmsup() -> Command {
    let mut cmd = Command::cargo_bin("pmsup").unwrap();
    cmd.env("NO_COLOR", "1").env("PMSUP_NO_PROGRESS", "1");
    cmd
}

/// Fixture routes for a server running `current`, optionally serving
/// `artifact` bytes. The release feed gets its own fixture in each test
/// because its body has to reference this server's bound address.
fn routes(current: &str, artifact: Option<&[u8]>) -> HashMap<String, CannedResponse> {
    let mut routes = HashMap::new();
    routes.insert("/identity".to_string(), CannedResponse::xml(state_xml(current)));
    routes.insert(
        "/prowl/add".to_string(),
        CannedResponse::json(r#"{"success":{"code":200}}"#),
    );
    if let Some(bytes) = artifact {
        routes.insert(ARTIFACT_PATH.to_string(), CannedResponse::bytes(bytes));
    }
    routes
}

#[test]
fn up_to_date_run_downloads_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let server = FixtureServer::start(routes("1.1", None));
    let artifact_url = server.url(ARTIFACT_PATH);
    let feed = FixtureServer::start(HashMap::from([(
        "/downloads".to_string(),
        CannedResponse::json(feed_json("1.1", &artifact_url, ARTIFACT_SHA1)),
    )]));

    let config = ConfigBuilder::new(server.url("/identity"), feed.url("/downloads"))
        .write(dir.path());

    pmsup()
        .args(["--config", config.to_str().unwrap(), "run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already running the latest version"));

    // No download happened: the artifact path was never requested and
    // nothing landed in the download directory.
    assert!(server.requests().iter().all(|r| r.path != ARTIFACT_PATH));
    assert!(!dir
        .path()
        .join("downloads/plexmediaserver_1.1_amd64.deb")
        .exists());
}

#[test]
fn check_reports_available_without_downloading() {
    let dir = tempfile::tempdir().unwrap();
    let server = FixtureServer::start(routes("1.0", Some(ARTIFACT_BYTES)));
    let artifact_url = server.url(ARTIFACT_PATH);
    let feed = FixtureServer::start(HashMap::from([(
        "/downloads".to_string(),
        CannedResponse::json(feed_json("1.1", &artifact_url, ARTIFACT_SHA1)),
    )]));

    let config = ConfigBuilder::new(server.url("/identity"), feed.url("/downloads"))
        .write(dir.path());

    pmsup()
        .args(["--config", config.to_str().unwrap(), "check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Update available: 1.0 -> 1.1"));

    assert!(server.requests().iter().all(|r| r.path != ARTIFACT_PATH));
}

#[test]
fn status_shows_versions_and_changelog() {
    let dir = tempfile::tempdir().unwrap();
    let server = FixtureServer::start(routes("1.0", None));
    let artifact_url = server.url(ARTIFACT_PATH);
    let feed = FixtureServer::start(HashMap::from([(
        "/downloads".to_string(),
        CannedResponse::json(feed_json("1.1", &artifact_url, ARTIFACT_SHA1)),
    )]));

    let config = ConfigBuilder::new(server.url("/identity"), feed.url("/downloads"))
        .write(dir.path());

    pmsup()
        .args(["--config", config.to_str().unwrap(), "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("den"))
        .stdout(predicate::str::contains("1.0"))
        .stdout(predicate::str::contains("1.1"))
        .stdout(predicate::str::contains("update available"))
        .stdout(predicate::str::contains("Fancy new feature"))
        .stdout(predicate::str::contains("That one bug"));
}

#[test]
fn happy_path_downloads_installs_and_archives() {
    let dir = tempfile::tempdir().unwrap();
    let server = FixtureServer::start(routes("1.0", Some(ARTIFACT_BYTES)));
    let artifact_url = server.url(ARTIFACT_PATH);
    let feed = FixtureServer::start(HashMap::from([(
        "/downloads".to_string(),
        CannedResponse::json(feed_json("1.1", &artifact_url, ARTIFACT_SHA1)),
    )]));

    let config = ConfigBuilder::new(server.url("/identity"), feed.url("/downloads"))
        .notify_key("prowl-test-key")
        .write(dir.path());

    // Prior package files that should be archived, and a bystander that
    // should not.
    let downloads = dir.path().join("downloads");
    let old_pkg = downloads.join("plexmediaserver_1.0_amd64.deb");
    let bystander = downloads.join("notes.txt");
    std::fs::write(&old_pkg, b"old package").unwrap();
    std::fs::write(&bystander, b"keep me").unwrap();

    let assert = pmsup()
        .args(["--config", config.to_str().unwrap(), "run"])
        .env("PMSUP_PROWL_URL", server.url("/prowl/add"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Upgrade available: 1.0 -> 1.1"));

    let new_pkg = downloads.join("plexmediaserver_1.1_amd64.deb");
    assert_eq!(std::fs::read(&new_pkg).unwrap(), ARTIFACT_BYTES);

    if platform::is_elevated() {
        assert
            .stdout(predicate::str::contains("Server upgraded successfully"))
            .stdout(predicate::str::contains("Upgraded 1.0 -> 1.1"));

        // Archive relocated the old package and nothing else.
        assert!(!old_pkg.exists());
        assert!(dir
            .path()
            .join("archive/plexmediaserver_1.0_amd64.deb")
            .exists());
        assert!(bystander.exists());
        assert!(new_pkg.exists());

        // The success notification reached the notification endpoint.
        let notification = server
            .requests()
            .into_iter()
            .find(|r| r.path == "/prowl/add")
            .expect("no notification posted");
        assert_eq!(notification.method, "POST");
        assert!(notification.body.contains("apikey=prowl-test-key"));
        assert!(notification.body.contains("Upgraded+from+1.0+to+1.1"));
    } else {
        assert.stdout(predicate::str::contains("skipping install"));

        // Nothing was installed, so nothing was archived or notified.
        assert!(old_pkg.exists());
        assert!(server.requests().iter().all(|r| r.path != "/prowl/add"));
    }
}

#[test]
fn already_downloaded_artifact_skips_the_network() {
    let dir = tempfile::tempdir().unwrap();
    // No artifact route: a download attempt would 404 and fail the run.
    let server = FixtureServer::start(routes("1.0", None));
    let artifact_url = server.url(ARTIFACT_PATH);
    let feed = FixtureServer::start(HashMap::from([(
        "/downloads".to_string(),
        CannedResponse::json(feed_json("1.1", &artifact_url, ARTIFACT_SHA1)),
    )]));

    let config = ConfigBuilder::new(server.url("/identity"), feed.url("/downloads"))
        .write(dir.path());

    let downloads = dir.path().join("downloads");
    std::fs::write(
        downloads.join("plexmediaserver_1.1_amd64.deb"),
        ARTIFACT_BYTES,
    )
    .unwrap();

    pmsup()
        .args(["--config", config.to_str().unwrap(), "run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("File already downloaded."));

    assert!(server.requests().iter().all(|r| r.path != ARTIFACT_PATH));
}

#[test]
fn checksum_exhaustion_fails_before_install() {
    let dir = tempfile::tempdir().unwrap();
    // The artifact route serves bytes that never match the checksum.
    let server = FixtureServer::start(routes("1.0", Some(GARBAGE_BYTES)));
    let artifact_url = server.url(ARTIFACT_PATH);
    let feed = FixtureServer::start(HashMap::from([(
        "/downloads".to_string(),
        CannedResponse::json(feed_json("1.1", &artifact_url, ARTIFACT_SHA1)),
    )]));

    let config = ConfigBuilder::new(server.url("/identity"), feed.url("/downloads"))
        .attempts(2)
        .notify_key("prowl-test-key")
        .write(dir.path());

    pmsup()
        .args(["--config", config.to_str().unwrap(), "run"])
        .env("PMSUP_PROWL_URL", server.url("/prowl/add"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed after 2 attempt(s)"));

    // Both attempts hit the artifact route; the bad file was removed so
    // a later run cannot mistake it for a verified download.
    let hits = server
        .requests()
        .iter()
        .filter(|r| r.path == ARTIFACT_PATH)
        .count();
    assert_eq!(hits, 2);
    assert!(!dir
        .path()
        .join("downloads/plexmediaserver_1.1_amd64.deb")
        .exists());

    // The failure was pushed to the notification endpoint.
    let notification = server
        .requests()
        .into_iter()
        .find(|r| r.path == "/prowl/add")
        .expect("no failure notification posted");
    assert!(notification.body.contains("download+failed"));
}

#[test]
fn failing_package_manager_fails_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let server = FixtureServer::start(routes("1.0", Some(ARTIFACT_BYTES)));
    let artifact_url = server.url(ARTIFACT_PATH);
    let feed = FixtureServer::start(HashMap::from([(
        "/downloads".to_string(),
        CannedResponse::json(feed_json("1.1", &artifact_url, ARTIFACT_SHA1)),
    )]));

    // `false` exits non-zero for any arguments, standing in for a
    // package-manager refusal.
    let config = ConfigBuilder::new(server.url("/identity"), feed.url("/downloads"))
        .package_manager("false")
        .write(dir.path());

    let assert = pmsup()
        .args(["--config", config.to_str().unwrap(), "run"])
        .assert();

    if platform::is_elevated() {
        assert
            .failure()
            .stderr(predicate::str::contains("Install failed"));
    } else {
        // Without privileges the installer is never reached; the run
        // stops after the download and reports the skip.
        assert
            .success()
            .stdout(predicate::str::contains("skipping install"));
    }
}

#[test]
fn download_only_run_reports_pending_install() {
    if platform::is_elevated() {
        // The skip path only exists without privileges; covered above
        // when the suite runs unprivileged.
        return;
    }

    let dir = tempfile::tempdir().unwrap();
    let server = FixtureServer::start(routes("1.0", Some(ARTIFACT_BYTES)));
    let artifact_url = server.url(ARTIFACT_PATH);
    let feed = FixtureServer::start(HashMap::from([(
        "/downloads".to_string(),
        CannedResponse::json(feed_json("1.1", &artifact_url, ARTIFACT_SHA1)),
    )]));

    let config = ConfigBuilder::new(server.url("/identity"), feed.url("/downloads"))
        .write(dir.path());

    pmsup()
        .args(["--config", config.to_str().unwrap(), "run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rerun as root"));

    assert!(dir
        .path()
        .join("downloads/plexmediaserver_1.1_amd64.deb")
        .exists());
}

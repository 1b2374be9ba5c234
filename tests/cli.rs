//! CLI integration tests for photoshelf admin commands.
//!
//! Each test uses an isolated temp directory for the database, ensuring tests
//! can run in parallel safely.

#![allow(deprecated)] // Command::cargo_bin deprecation only affects custom build dirs

use std::path::Path;

use assert_cmd::Command;
use assert_fs::TempDir;
use photoshelf::store::{SqliteStore, Store};
use predicates::prelude::*;

struct TestContext {
    temp_dir: TempDir,
}

impl TestContext {
    fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    fn data_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    fn data_dir_str(&self) -> String {
        self.data_dir().to_string_lossy().to_string()
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("photoshelf").expect("failed to find binary");
        cmd.env("NO_COLOR", "1");
        cmd
    }

    fn init(&self) -> assert_cmd::assert::Assert {
        self.cmd()
            .args([
                "admin",
                "init",
                "--data-dir",
                &self.data_dir_str(),
                "--non-interactive",
            ])
            .assert()
    }

    fn add_user(&self, email: &str) -> assert_cmd::assert::Assert {
        self.cmd()
            .args([
                "admin",
                "user",
                "add",
                "--data-dir",
                &self.data_dir_str(),
                "--email",
                email,
            ])
            .assert()
    }

    fn store(&self) -> SqliteStore {
        SqliteStore::new(self.data_dir().join("photoshelf.db")).expect("failed to open store")
    }
}

#[test]
fn test_init_writes_admin_token() {
    let ctx = TestContext::new();

    ctx.init()
        .success()
        .stdout(predicate::str::contains("Admin token"))
        .stdout(predicate::str::contains("photoshelf_"));

    let token = std::fs::read_to_string(ctx.data_dir().join(".admin_token"))
        .expect("admin token file missing");
    assert!(token.starts_with("photoshelf_"));
    assert!(ctx.store().has_admin_token().unwrap());
}

#[test]
fn test_init_twice_fails() {
    let ctx = TestContext::new();

    ctx.init().success();
    ctx.init()
        .failure()
        .stderr(predicate::str::contains("already initialized"));
}

#[test]
fn test_user_add_requires_init() {
    let ctx = TestContext::new();

    ctx.add_user("alice@example.com")
        .failure()
        .stderr(predicate::str::contains("not initialized"));
}

#[test]
fn test_user_add_provisions_once() {
    let ctx = TestContext::new();
    ctx.init().success();

    ctx.add_user("alice@example.com")
        .success()
        .stdout(predicate::str::contains("Created user 'alice@example.com'"))
        .stdout(predicate::str::contains("photoshelf_"));

    ctx.add_user("Alice@Example.com")
        .success()
        .stdout(predicate::str::contains("already exists"));

    let store = ctx.store();
    let users = store.list_users().unwrap();
    assert_eq!(users.len(), 1);

    let user = &users[0];
    let profile = store.get_profile_by_user(&user.id).unwrap().unwrap();
    assert_eq!(profile.display_name.as_deref(), Some("alice@example.com"));

    // Each invocation issues a fresh token.
    assert_eq!(store.list_user_tokens(&user.id).unwrap().len(), 2);
}

#[test]
fn test_user_add_rejects_bad_email() {
    let ctx = TestContext::new();
    ctx.init().success();

    ctx.add_user("not-an-email")
        .failure()
        .stderr(predicate::str::contains("Email is not valid"));
}

#[test]
fn test_serve_requires_init() {
    let ctx = TestContext::new();

    ctx.cmd()
        .args(["serve", "--data-dir", &ctx.data_dir_str(), "--port", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("photoshelf admin init"));
}

#[test]
fn test_serve_rejects_unknown_config_keys() {
    let ctx = TestContext::new();
    ctx.init().success();

    let config = ctx.data_dir().join("photoshelf.toml");
    std::fs::write(&config, "colour = \"blue\"\n").unwrap();

    ctx.cmd()
        .args(["serve", "--data-dir", &ctx.data_dir_str(), "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid configuration"));
}

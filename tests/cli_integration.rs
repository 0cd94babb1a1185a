//! Integration tests for the keeda CLI.
//!
//! These tests exercise the binary end-to-end using `assert_cmd`.  The
//! master password comes from `KEEDA_PASSWORD` so nothing prompts, and
//! every vault uses the cheapest KDF settings.

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

use keedavault::{create_vault, Entry, VaultConfig, ROOT_GROUP_ID};

const PASSWORD: &str = "correct-horse";

const CHEAP_INIT: [&str; 7] = [
    "init",
    "--iterations",
    "1",
    "--memory-kb",
    "1024",
    "--parallelism",
    "1",
];

/// Helper: a `keeda` command running inside `dir` with the password set.
fn keeda(dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("keeda").expect("binary should exist");
    cmd.current_dir(dir.path())
        .env("KEEDA_PASSWORD", PASSWORD)
        .env_remove("KEEDA_NEW_PASSWORD")
        .env_remove("KEEDA_VAULT")
        .env_remove("KEEDA_LOG");
    cmd
}

/// Helper: `keeda init` with the cheapest KDF.
fn init(dir: &TempDir) {
    keeda(dir)
        .args(CHEAP_INIT)
        .assert()
        .success();
}

/// Helper: a vault with two entries of known ids, built through the library.
fn seed(dir: &TempDir) {
    let vault = create_vault(
        dir.path().join("keeda.vault"),
        PASSWORD,
        VaultConfig::insecure_for_tests(),
    )
    .unwrap();

    let mut github = Entry::new("GitHub", ROOT_GROUP_ID);
    github.id = "e1".into();
    github.username = "octocat".into();
    github.password = "hunter2".into();
    github.tags.insert("dev".into());
    vault.add_entry(github).unwrap();

    let mut bank = Entry::new("Bank", ROOT_GROUP_ID);
    bank.id = "otp1".into();
    bank.username = "alice".into();
    bank.password = "pa55word".into();
    bank.totp_secret = Some("GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ".into());
    vault.add_entry(bank).unwrap();

    vault.save().unwrap();
    vault.close().unwrap();
}

// ---------------------------------------------------------------------------
// Basics
// ---------------------------------------------------------------------------

#[test]
fn help_flag_shows_usage() {
    let tmp = TempDir::new().unwrap();
    keeda(&tmp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Encrypted credential vault"))
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("add"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("show"))
        .stdout(predicate::str::contains("group"))
        .stdout(predicate::str::contains("totp"))
        .stdout(predicate::str::contains("passwd"));
}

#[test]
fn version_flag_shows_version() {
    let tmp = TempDir::new().unwrap();
    keeda(&tmp)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("keeda"));
}

#[test]
fn no_args_shows_help() {
    let tmp = TempDir::new().unwrap();
    keeda(&tmp)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

// ---------------------------------------------------------------------------
// init
// ---------------------------------------------------------------------------

#[test]
fn init_creates_vault_once() {
    let tmp = TempDir::new().unwrap();
    init(&tmp);
    tmp.child("keeda.vault").assert(predicate::path::exists());

    keeda(&tmp)
        .args(CHEAP_INIT)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn init_rejects_short_password() {
    let tmp = TempDir::new().unwrap();
    keeda(&tmp)
        .env("KEEDA_PASSWORD", "short")
        .args(CHEAP_INIT)
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 8"));
    tmp.child("keeda.vault").assert(predicate::path::missing());
}

#[test]
fn init_honours_config_file_and_vault_flag() {
    let tmp = TempDir::new().unwrap();
    tmp.child(".keeda.toml")
        .write_str(concat!(
            "vault_path = \"secrets/team.vault\"\n",
            "kdf_iterations = 1\n",
            "memory_cost_kb = 1024\n",
            "parallelism = 1\n",
        ))
        .unwrap();

    keeda(&tmp).arg("init").assert().success();
    tmp.child("secrets/team.vault")
        .assert(predicate::path::exists());

    let explicit = tmp.path().join("other.vault");
    keeda(&tmp)
        .arg("--vault")
        .arg(&explicit)
        .arg("init")
        .assert()
        .success();
    assert!(explicit.exists());
}

#[test]
fn malformed_config_file_is_reported() {
    let tmp = TempDir::new().unwrap();
    tmp.child(".keeda.toml").write_str("not valid {{toml").unwrap();
    keeda(&tmp)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config file error"));
}

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

#[test]
fn add_then_list_hides_passwords() {
    let tmp = TempDir::new().unwrap();
    init(&tmp);

    keeda(&tmp)
        .args([
            "add", "--title", "GitHub", "--username", "octocat", "--password", "hunter2",
            "--tag", "dev",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added entry 'GitHub'"));

    keeda(&tmp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("GitHub"))
        .stdout(predicate::str::contains("octocat"))
        .stdout(predicate::str::contains("hunter2").not());
}

#[test]
fn list_filters() {
    let tmp = TempDir::new().unwrap();
    seed(&tmp);

    keeda(&tmp)
        .args(["list", "--search", "OCTO"])
        .assert()
        .success()
        .stdout(predicate::str::contains("GitHub"))
        .stdout(predicate::str::contains("Bank").not());

    keeda(&tmp)
        .args(["list", "--tag", "dev"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 entry"));

    keeda(&tmp)
        .args(["list", "--favorites"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No matching entries"));
}

#[test]
fn show_masks_unless_revealed() {
    let tmp = TempDir::new().unwrap();
    seed(&tmp);

    keeda(&tmp)
        .args(["show", "e1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("octocat"))
        .stdout(predicate::str::contains("********"))
        .stdout(predicate::str::contains("hunter2").not());

    keeda(&tmp)
        .args(["show", "e1", "--reveal"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hunter2"));
}

#[test]
fn show_unknown_entry_fails() {
    let tmp = TempDir::new().unwrap();
    seed(&tmp);
    keeda(&tmp)
        .args(["show", "missing-entry"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn edit_changes_fields() {
    let tmp = TempDir::new().unwrap();
    seed(&tmp);

    keeda(&tmp)
        .args(["edit", "e1", "--title", "GitHub Work", "--favorite", "true"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated 2 field(s)"));

    keeda(&tmp)
        .args(["list", "--favorites"])
        .assert()
        .success()
        .stdout(predicate::str::contains("GitHub Work"));
}

#[test]
fn delete_removes_entry() {
    let tmp = TempDir::new().unwrap();
    seed(&tmp);

    keeda(&tmp)
        .args(["delete", "e1", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted entry 'GitHub'"));

    keeda(&tmp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("GitHub").not())
        .stdout(predicate::str::contains("Bank"));
}

#[test]
fn wrong_password_fails() {
    let tmp = TempDir::new().unwrap();
    seed(&tmp);
    keeda(&tmp)
        .env("KEEDA_PASSWORD", "not-the-password")
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Wrong password"));
}

#[test]
fn missing_vault_fails() {
    let tmp = TempDir::new().unwrap();
    keeda(&tmp)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

// ---------------------------------------------------------------------------
// Groups
// ---------------------------------------------------------------------------

#[test]
fn group_lifecycle() {
    let tmp = TempDir::new().unwrap();
    init(&tmp);

    keeda(&tmp)
        .args(["group", "add", "Work"])
        .assert()
        .success();
    keeda(&tmp)
        .args(["add", "--title", "Jira", "--password", "x", "--group", "work"])
        .assert()
        .success();

    keeda(&tmp)
        .args(["group", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Work"))
        .stdout(predicate::str::contains("Root"));

    keeda(&tmp)
        .args(["group", "delete", "Work"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not empty"));

    keeda(&tmp)
        .args(["group", "rename", "Work", "Office"])
        .assert()
        .success();

    keeda(&tmp)
        .args(["group", "delete", "Office", "--cascade", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted 1 group(s) and 1 entry"));

    keeda(&tmp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Jira").not());
}

#[test]
fn group_rename_can_move_under_new_parent() {
    let tmp = TempDir::new().unwrap();
    init(&tmp);
    keeda(&tmp).args(["group", "add", "Work"]).assert().success();
    keeda(&tmp).args(["group", "add", "Old"]).assert().success();

    keeda(&tmp)
        .args(["group", "rename", "Old", "Archive", "--parent", "Work"])
        .assert()
        .success()
        .stdout(predicate::str::contains("under 'Work'"));

    keeda(&tmp)
        .args(["group", "rename", "Work", "Work", "--parent", "Archive"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("beneath itself"));
}

#[test]
fn trash_then_empty_trash() {
    let tmp = TempDir::new().unwrap();
    seed(&tmp);

    keeda(&tmp)
        .args(["empty-trash", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("recycle bin is empty"));

    keeda(&tmp)
        .args(["delete", "e1", "--trash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Moved entry 'GitHub' to the recycle bin"));

    keeda(&tmp)
        .args(["list", "--group", "Recycle Bin"])
        .assert()
        .success()
        .stdout(predicate::str::contains("GitHub"))
        .stdout(predicate::str::contains("Bank").not());

    keeda(&tmp)
        .args(["empty-trash", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 group(s) and 1 entry"));

    keeda(&tmp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("GitHub").not())
        .stdout(predicate::str::contains("Bank"));
}

#[test]
fn root_group_cannot_be_deleted() {
    let tmp = TempDir::new().unwrap();
    init(&tmp);
    keeda(&tmp)
        .args(["group", "delete", "root", "--cascade", "--force"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("root group cannot be deleted"));
}

// ---------------------------------------------------------------------------
// TOTP and password change
// ---------------------------------------------------------------------------

#[test]
fn totp_prints_a_code() {
    let tmp = TempDir::new().unwrap();
    seed(&tmp);

    keeda(&tmp)
        .args(["totp", "otp1"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^\d{6}\n").unwrap());

    keeda(&tmp)
        .args(["totp", "e1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no TOTP secret"));
}

#[test]
fn add_rejects_invalid_totp_secret() {
    let tmp = TempDir::new().unwrap();
    init(&tmp);
    keeda(&tmp)
        .args(["add", "--title", "X", "--password", "x", "--totp", "***"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("base32"));
}

#[test]
fn passwd_rekeys_the_vault() {
    let tmp = TempDir::new().unwrap();
    seed(&tmp);

    keeda(&tmp)
        .env("KEEDA_NEW_PASSWORD", "battery-staple")
        .arg("passwd")
        .assert()
        .success()
        .stdout(predicate::str::contains("Master password changed"));

    keeda(&tmp)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Wrong password"));

    keeda(&tmp)
        .env("KEEDA_PASSWORD", "battery-staple")
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("GitHub"));
}

//! End-to-end tests for the `fleetsync ls` command.
//!
//! These tests verify the CLI behavior of the `ls` command by invoking
//! the binary directly and checking its output.

#[allow(dead_code)]
mod common;
use common::prelude::*;

fn fleet() -> TestFixture {
    TestFixture::new()
        .with_config(configs::FLEET)
        .with_overlay_file("all/etc/motd._all", "generic")
        .with_overlay_file("all/etc/motd._web", "web")
        .with_overlay_file("all/etc/motd.post._web", "#!/bin/sh\n")
        .with_overlay_file("all/etc/hosts._db", "db hosts")
        .with_overlay_file("all/etc/.git/HEAD", "ref")
        .with_overlay_file("web1/etc/issue._web1", "web1 only")
}

#[test]
fn test_ls_help() {
    let mut cmd = cargo_bin_cmd!("fleetsync");
    cmd.arg("ls")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "List the resolved overlay (or delete) tree of a node",
        ))
        .stdout(predicate::str::contains("--delete"));
}

#[test]
fn test_ls_missing_config() {
    let temp = TempDir::new().unwrap();
    let mut cmd = cargo_bin_cmd!("fleetsync");
    cmd.current_dir(temp.path())
        .env_remove("FLEETSYNC_CONFIG")
        .arg("ls")
        .arg("-n")
        .arg("web1")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration file not found"));
}

#[test]
fn test_ls_resolves_for_web_node() {
    let fixture = fleet();
    fixture
        .command()
        .args(["ls", "-n", "web1"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "/etc/motd <- $masterdir/overlay/all/etc/motd._web  \
             (post: $masterdir/overlay/all/etc/motd.post._web)",
        ))
        .stdout(predicate::str::contains(
            "/etc/issue <- $masterdir/overlay/web1/etc/issue._web1",
        ))
        .stdout(predicate::str::contains("/etc/hosts").not())
        .stdout(predicate::str::contains(".git").not());
}

#[test]
fn test_ls_resolves_for_db_node() {
    let fixture = fleet();
    fixture
        .command()
        .args(["ls", "--node", "db1"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "/etc/motd <- $masterdir/overlay/all/etc/motd._all\n",
        ))
        .stdout(predicate::str::contains(
            "/etc/hosts <- $masterdir/overlay/all/etc/hosts._db",
        ))
        .stdout(predicate::str::contains("post:").not())
        .stdout(predicate::str::contains("/etc/issue").not());
}

#[test]
fn test_ls_directories_have_trailing_slash() {
    let fixture = fleet();
    fixture
        .command()
        .args(["ls", "-n", "db1"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "/etc <- $masterdir/overlay/all/etc/\n",
        ));
}

#[test]
fn test_ls_missing_tag_is_a_defect() {
    let fixture = fleet().with_overlay_file("all/etc/resolv.conf", "nameserver 10.0.0.1");
    fixture
        .command()
        .args(["ls", "-n", "web1"])
        .assert()
        .code(1)
        // everything else is still listed
        .stdout(predicate::str::contains("/etc/motd"))
        .stdout(predicate::str::contains("resolv.conf").not())
        .stderr(predicate::str::contains(
            "no group extension on $masterdir/overlay/all/etc/resolv.conf",
        ))
        .stderr(predicate::str::contains("1 configuration defect(s) found"));
}

#[test]
fn test_ls_unknown_group_is_a_defect() {
    let fixture = fleet().with_overlay_file("all/etc/ntp.conf._nosuch", "server 0.pool");
    fixture
        .command()
        .args(["ls", "-n", "db1"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "unknown group on $masterdir/overlay/all/etc/ntp.conf._nosuch",
        ));
}

#[test]
fn test_ls_not_member_is_silent_unless_verbose() {
    let fixture = fleet();
    fixture
        .command()
        .args(["ls", "-n", "db1"])
        .assert()
        .success()
        .stderr(predicate::str::contains("not one of my groups").not());

    fixture
        .command()
        .args(["-v", "ls", "-n", "db1"])
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "skipping $masterdir/overlay/all/etc/motd._web, it is not one of my groups",
        ));
}

#[test]
fn test_ls_json_format() {
    let fixture = fleet();
    let output = fixture
        .command()
        .args(["ls", "-n", "web1", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["node"], "web1");
    assert_eq!(report["defects"].as_array().unwrap().len(), 0);

    let entries = report["entries"].as_array().unwrap();
    let motd = entries
        .iter()
        .find(|e| e["dest"] == "/etc/motd")
        .expect("motd entry");
    assert!(motd["src"].as_str().unwrap().ends_with("all/etc/motd._web"));
    assert!(motd["post_script"]
        .as_str()
        .unwrap()
        .ends_with("all/etc/motd.post._web"));
    assert_eq!(motd["is_dir"], false);

    let issue = entries
        .iter()
        .find(|e| e["dest"] == "/etc/issue")
        .expect("issue entry");
    assert!(issue.get("post_script").is_none());
}

#[test]
fn test_ls_delete_tree() {
    let fixture = fleet().with_delete_file("all/etc/old.conf._all");
    fixture
        .command()
        .args(["ls", "-n", "web1", "--delete"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "/etc/old.conf <- $masterdir/delete/all/etc/old.conf._all",
        ))
        .stdout(predicate::str::contains("/etc/motd").not());
}

#[test]
fn test_ls_config_from_environment() {
    let fixture = fleet();
    let elsewhere = TempDir::new().unwrap();
    let mut cmd = cargo_bin_cmd!("fleetsync");
    cmd.current_dir(elsewhere.path())
        .env("FLEETSYNC_CONFIG", fixture.config_path())
        .args(["ls", "-n", "web1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/etc/issue"));
}

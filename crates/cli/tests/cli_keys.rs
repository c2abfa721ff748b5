//! CLI integration tests for `zilkey` commands.
//!
//! Every test runs against a temporary `--home` holding a config with cheap
//! KDF costs so keystore creation stays fast.

#![allow(deprecated)] // Command::cargo_bin is deprecated but still works

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const PRIVATE_KEY: &str = "05C3CF3387F31202CD0798B7AA882327A1BD365331F90954A58C18F61BD08FFC";
const PUBLIC_KEY: &str = "03949D29723DA4B2628224D3EC8E74C518ACA98C6630B00527F86B8349E982CB57";
const CHECKSUM_ADDRESS: &str = "0x95B27eC211f86748DD985E1424b4058E94aa5814";
const BECH32_ADDRESS: &str = "zil1jke8ass3lpn53hvctc2zfdq936225kq5xrdunr";
const PASSWORD: &str = "correct horse battery";

/// Home directory with a low-cost KDF config and a password file.
fn setup_home() -> TempDir {
    let home = TempDir::new().unwrap();
    fs::write(
        home.path().join("config.json"),
        r#"{
            "default_kdf": "pbkdf2",
            "kdf": { "pbkdf2_iterations": 1024, "scrypt_n": 1024 }
        }"#,
    )
    .unwrap();
    fs::write(home.path().join("password.txt"), format!("{}\n", PASSWORD)).unwrap();
    home
}

fn zilkey(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("zilkey").unwrap();
    cmd.env_remove("RUST_LOG").arg("--home").arg(home);
    cmd
}

fn password_file(home: &Path) -> String {
    home.join("password.txt").display().to_string()
}

fn import_known_key(home: &Path, name: &str) {
    let key_file = home.join("known.key");
    fs::write(&key_file, format!("{} {}", PUBLIC_KEY, PRIVATE_KEY)).unwrap();

    zilkey(home)
        .args(["keys", "import", "--name", name, "--key-file"])
        .arg(&key_file)
        .args(["--password-file", &password_file(home)])
        .assert()
        .success()
        .stdout(predicate::str::contains(CHECKSUM_ADDRESS));
}

#[test]
fn test_address_prints_all_forms() {
    let home = setup_home();

    zilkey(home.path())
        .args(["address", BECH32_ADDRESS])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "95b27ec211f86748dd985e1424b4058e94aa5814",
        ))
        .stdout(predicate::str::contains(CHECKSUM_ADDRESS))
        .stdout(predicate::str::contains(BECH32_ADDRESS));
}

#[test]
fn test_address_rejects_garbage() {
    let home = setup_home();

    zilkey(home.path())
        .args(["address", "not-an-address"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Invalid address"));
}

#[test]
fn test_generate_list_export() {
    let home = setup_home();

    zilkey(home.path())
        .args(["keys", "generate", "--name", "hot"])
        .args(["--password-file", &password_file(home.path())])
        .assert()
        .success()
        .stdout(predicate::str::contains("Key 'hot' saved"))
        .stdout(predicate::str::contains("zil1"));

    assert!(home.path().join("keys").join("hot.json").is_file());

    zilkey(home.path())
        .args(["keys", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hot"))
        .stdout(predicate::str::contains("Total: 1 keystore(s)"));

    let output = zilkey(home.path())
        .args(["keys", "export", "--name", "hot", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let info: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(info["name"], "hot");
    assert_eq!(info["kdf"], "pbkdf2");
    assert!(info["bech32_address"].as_str().unwrap().starts_with("zil1"));
    assert!(info.get("private_key").is_none());
}

#[test]
fn test_generate_refuses_overwrite_without_force() {
    let home = setup_home();
    let args = ["keys", "generate", "--name", "dup"];

    zilkey(home.path())
        .args(args)
        .args(["--password-file", &password_file(home.path())])
        .assert()
        .success();

    zilkey(home.path())
        .args(args)
        .args(["--password-file", &password_file(home.path())])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    zilkey(home.path())
        .args(args)
        .args(["--password-file", &password_file(home.path()), "--force"])
        .assert()
        .success();
}

#[test]
fn test_import_and_export_known_key() {
    let home = setup_home();
    import_known_key(home.path(), "known");

    zilkey(home.path())
        .args(["keys", "export", "--name", "known"])
        .assert()
        .success()
        .stdout(predicate::str::contains(CHECKSUM_ADDRESS))
        .stdout(predicate::str::contains(BECH32_ADDRESS));
}

#[test]
fn test_import_private_key_file_with_scrypt() {
    let home = setup_home();
    let key_file = home.path().join("private.hex");
    fs::write(&key_file, format!("0x{}\n", PRIVATE_KEY)).unwrap();

    zilkey(home.path())
        .args(["keys", "import", "--name", "scrypted", "--kdf", "scrypt"])
        .arg("--private-key-file")
        .arg(&key_file)
        .args(["--password-file", &password_file(home.path())])
        .assert()
        .success()
        .stdout(predicate::str::contains(BECH32_ADDRESS));

    let stored = fs::read_to_string(home.path().join("keys").join("scrypted.json")).unwrap();
    let stored: serde_json::Value = serde_json::from_str(&stored).unwrap();
    assert_eq!(stored["crypto"]["kdf"], "scrypt");
    assert_eq!(stored["crypto"]["kdfparams"]["n"], 1024);
}

#[test]
fn test_sign_and_verify_round_trip() {
    let home = setup_home();
    import_known_key(home.path(), "signer");

    let output = zilkey(home.path())
        .args(["sign", "--name", "signer", "--message", "hello zilliqa"])
        .args(["--password-file", &password_file(home.path())])
        .output()
        .unwrap();
    assert!(output.status.success());

    let signature = String::from_utf8(output.stdout).unwrap().trim().to_string();
    assert_eq!(signature.len(), 128);

    zilkey(home.path())
        .args(["verify", "--public-key", PUBLIC_KEY])
        .args(["--message", "hello zilliqa", "--signature", &signature])
        .assert()
        .success()
        .stdout(predicate::str::diff("valid\n"));

    zilkey(home.path())
        .args(["verify", "--public-key", PUBLIC_KEY])
        .args(["--message", "hello world", "--signature", &signature])
        .assert()
        .code(1)
        .stdout(predicate::str::diff("invalid\n"));
}

#[test]
fn test_sign_with_wrong_password() {
    let home = setup_home();
    import_known_key(home.path(), "locked");

    let wrong = home.path().join("wrong.txt");
    fs::write(&wrong, "not the password").unwrap();

    zilkey(home.path())
        .args(["sign", "--name", "locked", "--message", "0x00"])
        .arg("--password-file")
        .arg(&wrong)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid password or keystore"));
}

#[test]
fn test_short_password_rejected() {
    let home = setup_home();
    let short = home.path().join("short.txt");
    fs::write(&short, "abc").unwrap();

    zilkey(home.path())
        .args(["keys", "generate", "--password-file"])
        .arg(&short)
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 8 characters"));

    assert!(!home.path().join("keys").join("default.json").exists());
}

#[test]
fn test_sign_missing_key() {
    let home = setup_home();

    zilkey(home.path())
        .args(["sign", "--name", "ghost", "--message", "hi"])
        .args(["--password-file", &password_file(home.path())])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_config_init_and_show() {
    let home = TempDir::new().unwrap();

    zilkey(home.path())
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote default configuration"));

    zilkey(home.path())
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    let output = zilkey(home.path()).args(["config", "show"]).output().unwrap();
    assert!(output.status.success());

    let config: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(config["default_kdf"], "pbkdf2");
    assert_eq!(config["kdf"]["pbkdf2_iterations"], 262144);
    assert_eq!(config["keys_dir"], "keys");
}

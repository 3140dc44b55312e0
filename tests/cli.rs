use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::io::Read;
use std::process::Command;
use tempfile::tempdir;

#[test]
fn test_cli_zip_then_inspect() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Setup: a small tree with one nested file
    let tmp = tempdir()?;
    let root = tmp.path().join("a");
    fs::create_dir_all(root.join("sub"))?;
    fs::write(root.join("x.txt"), "hi")?;
    fs::write(root.join("sub/y.txt"), "yo")?;

    // 2. Zip it
    let mut cmd = Command::cargo_bin("filekit")?;
    cmd.arg("zip").arg(&root);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Archived 2 files"));

    // 3. Verify the archive next to the directory
    let archive_path = tmp.path().join("a.zip");
    let mut archive = zip::ZipArchive::new(fs::File::open(&archive_path)?)?;
    assert_eq!(archive.len(), 2);
    let mut x = String::new();
    archive.by_name("x.txt")?.read_to_string(&mut x)?;
    assert_eq!(x, "hi");
    let mut y = String::new();
    archive.by_name("sub/y.txt")?.read_to_string(&mut y)?;
    assert_eq!(y, "yo");

    Ok(())
}

#[test]
fn test_cli_gzip_gunzip_cycle() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempdir()?;
    let file = tmp.path().join("data.log");
    let payload = "Some log data here.\n".repeat(1000);
    fs::write(&file, &payload)?;

    Command::cargo_bin("filekit")?
        .arg("gzip")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("data.log.gz"));

    let restored = tmp.path().join("restored.log");
    Command::cargo_bin("filekit")?
        .arg("gunzip")
        .arg(tmp.path().join("data.log.gz"))
        .arg("-o")
        .arg(&restored)
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("Wrote {} bytes", payload.len())));

    assert_eq!(fs::read_to_string(&restored)?, payload);
    Ok(())
}

#[test]
fn test_cli_copy_and_list_json() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempdir()?;
    let source = tmp.path().join("src");
    fs::create_dir_all(source.join("nested"))?;
    fs::write(source.join("file1.txt"), "first")?;
    fs::write(source.join("nested/nested_file.dat"), [0u8, 1, 2, 3, 4, 5])?;

    let destination = tmp.path().join("dst");
    Command::cargo_bin("filekit")?
        .arg("copy")
        .arg(&source)
        .arg(&destination)
        .assert()
        .success()
        .stdout(predicate::str::contains("Copied 2 files"));

    let output = Command::cargo_bin("filekit")?
        .arg("list")
        .arg("--recursive")
        .arg("--json")
        .arg(&destination)
        .output()?;
    assert!(output.status.success());

    let nodes: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    let nodes = nodes.as_array().ok_or("expected a JSON array")?;
    assert_eq!(nodes.len(), 2);
    for node in nodes {
        assert_eq!(node["kind"], "file");
    }
    let total: u64 = nodes.iter().filter_map(|n| n["size"].as_u64()).sum();
    assert_eq!(total, 11);
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_cli_list_json_reports_dangling_links() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempdir()?;
    fs::write(tmp.path().join("real.txt"), "here")?;
    std::os::unix::fs::symlink(tmp.path().join("gone.txt"), tmp.path().join("dangling"))?;

    let output = Command::cargo_bin("filekit")?
        .arg("list")
        .arg("--all")
        .arg("--json")
        .arg(tmp.path())
        .output()?;
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let nodes: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    let nodes = nodes.as_array().ok_or("expected a JSON array")?;
    assert_eq!(nodes.len(), 2);
    let dangling = nodes
        .iter()
        .find(|n| n["path"].as_str().map_or(false, |p| p.ends_with("dangling")))
        .ok_or("dangling link missing from the listing")?;
    assert_eq!(dangling["kind"], "other");
    assert_eq!(dangling["size"], 0);
    Ok(())
}

#[test]
fn test_cli_move_missing_source_fails() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempdir()?;
    let destination = tmp.path().join("somewhere/dest.txt");

    Command::cargo_bin("filekit")?
        .arg("move")
        .arg(tmp.path().join("nonexistent"))
        .arg(&destination)
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("Error:").and(predicate::str::contains("nonexistent")));

    assert!(!destination.exists());
    Ok(())
}

#[test]
fn test_cli_touch_mkdir_size_delete() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempdir()?;
    let dir = tmp.path().join("made/here");
    let file = dir.join("empty.txt");

    Command::cargo_bin("filekit")?.arg("mkdir").arg(&dir).assert().success();
    Command::cargo_bin("filekit")?.arg("touch").arg(&file).assert().success();
    Command::cargo_bin("filekit")?
        .arg("touch")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
    Command::cargo_bin("filekit")?
        .arg("size")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::diff("0\n"));

    Command::cargo_bin("filekit")?.arg("delete").arg(tmp.path().join("made")).assert().success();
    assert!(!tmp.path().join("made").exists());
    Ok(())
}

#[test]
fn test_cli_fetch_rejects_bad_timeout_env() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempdir()?;
    Command::cargo_bin("filekit")?
        .env("FILEKIT_READ_TIMEOUT_MS", "soon")
        .arg("fetch")
        .arg("http://127.0.0.1:9/none")
        .arg("-o")
        .arg(tmp.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("FILEKIT_READ_TIMEOUT_MS"));
    Ok(())
}

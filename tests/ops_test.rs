use filekit::ops::{clear_directory, copy_directory, copy_file, delete};
use filekit::walk::{list_directories, list_file_and_directories, list_files, list_files_recursive};
use filekit::{FileKit, FileKitError};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write_file(path: &Path, contents: &[u8]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn kit() -> (tokio::runtime::Runtime, FileKit) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let kit = FileKit::new(runtime.handle().clone());
    (runtime, kit)
}

// ---------- creation, moves and renames ----------

#[test]
fn move_of_missing_source_fails_and_creates_nothing() {
    let (_rt, kit) = kit();
    let tmp = tempdir().unwrap();
    let destination = tmp.path().join("new/parent/dest.txt");

    let err = kit.move_file(tmp.path().join("nonexistent"), &destination).unwrap_err();
    assert!(err.is_not_found(), "{err:?}");
    assert!(!destination.exists());
    assert!(!tmp.path().join("new").exists());
}

#[test]
fn move_creates_destination_parents() {
    let (_rt, kit) = kit();
    let tmp = tempdir().unwrap();
    let source = tmp.path().join("from.txt");
    write_file(&source, b"moving");

    let destination = tmp.path().join("a/b/to.txt");
    kit.move_file(&source, &destination).unwrap();
    assert!(!source.exists());
    assert_eq!(fs::read(&destination).unwrap(), b"moving");
}

#[test]
fn move_directory_carries_its_contents() {
    let (_rt, kit) = kit();
    let tmp = tempdir().unwrap();
    let source = tmp.path().join("dir");
    write_file(&source.join("inner/f.txt"), b"f");

    let destination = tmp.path().join("elsewhere/dir");
    kit.move_directory(&source, &destination).unwrap();
    assert!(!source.exists());
    assert_eq!(fs::read(destination.join("inner/f.txt")).unwrap(), b"f");
}

#[test]
fn rename_stays_in_the_same_directory() {
    let (_rt, kit) = kit();
    let tmp = tempdir().unwrap();
    let target = tmp.path().join("old.txt");
    write_file(&target, b"x");

    let renamed = kit.rename_file(&target, "new.txt").unwrap();
    assert_eq!(renamed, tmp.path().join("new.txt"));
    assert!(renamed.exists());
    assert!(!target.exists());

    assert!(matches!(kit.rename_file(&renamed, "../escape.txt"), Err(FileKitError::InvalidName(_))));
    assert!(matches!(kit.rename_directory(&renamed, "a/b"), Err(FileKitError::InvalidName(_))));
}

#[test]
fn new_directory_is_idempotent() {
    let (_rt, kit) = kit();
    let tmp = tempdir().unwrap();
    let dir = tmp.path().join("x/y/z");

    kit.new_directory(&dir).unwrap();
    kit.new_directory(&dir).unwrap();
    assert!(kit.is_directory(&dir));
}

#[test]
fn new_file_reports_whether_it_created() {
    let (_rt, kit) = kit();
    let tmp = tempdir().unwrap();
    let file = tmp.path().join("deep/empty.txt");

    assert!(kit.new_file(&file).unwrap());
    assert!(kit.is_file(&file));
    assert_eq!(kit.file_size(&file).unwrap(), 0);

    fs::write(&file, b"keep me").unwrap();
    assert!(!kit.new_file(&file).unwrap());
    assert_eq!(fs::read(&file).unwrap(), b"keep me");
}

#[test]
fn queries_on_missing_paths() {
    let (_rt, kit) = kit();
    let tmp = tempdir().unwrap();
    let ghost = tmp.path().join("ghost");
    assert!(!kit.exists(&ghost));
    assert!(!kit.is_file(&ghost));
    assert!(!kit.is_directory(&ghost));
    assert!(kit.file_size(&ghost).unwrap_err().is_not_found());
}

// ---------- copies ----------

#[test]
fn copy_file_respects_replace() {
    let tmp = tempdir().unwrap();
    let source = tmp.path().join("src.txt");
    let destination = tmp.path().join("out/dst.txt");
    write_file(&source, b"new content");
    write_file(&destination, b"old content that is longer");

    let err = copy_file(&source, &destination, false).unwrap_err();
    assert!(matches!(err, FileKitError::AlreadyExists(_)));
    assert_eq!(fs::read(&destination).unwrap(), b"old content that is longer");

    assert_eq!(copy_file(&source, &destination, true).unwrap(), 11);
    assert_eq!(fs::read(&destination).unwrap(), b"new content");
}

#[test]
fn copy_file_rejects_directories() {
    let tmp = tempdir().unwrap();
    let err = copy_file(tmp.path(), &tmp.path().join("copy"), true).unwrap_err();
    assert!(matches!(err, FileKitError::NotAFile(_)));
}

#[test]
fn copy_directory_mirrors_tree_including_empty_dirs() {
    let tmp = tempdir().unwrap();
    let source = tmp.path().join("src");
    write_file(&source.join("a.txt"), b"a");
    write_file(&source.join("sub/b.txt"), b"bb");
    fs::create_dir_all(source.join("sub/empty")).unwrap();

    let destination = tmp.path().join("mirror/dst");
    assert_eq!(copy_directory(&source, &destination, false).unwrap(), 2);
    assert_eq!(fs::read(destination.join("a.txt")).unwrap(), b"a");
    assert_eq!(fs::read(destination.join("sub/b.txt")).unwrap(), b"bb");
    assert!(destination.join("sub/empty").is_dir());

    // A second pass without replace must not clobber anything.
    assert!(copy_directory(&source, &destination, false).is_err());
    write_file(&source.join("a.txt"), b"A2");
    assert_eq!(copy_directory(&source, &destination, true).unwrap(), 2);
    assert_eq!(fs::read(destination.join("a.txt")).unwrap(), b"A2");
}

#[test]
fn copy_directory_requires_a_directory() {
    let tmp = tempdir().unwrap();
    let file = tmp.path().join("f.txt");
    write_file(&file, b"f");
    let err = copy_directory(&file, &tmp.path().join("out"), false).unwrap_err();
    assert!(matches!(err, FileKitError::NotADirectory(_)));
}

// ---------- delete and clear ----------

#[test]
fn delete_removes_files_and_trees() {
    let tmp = tempdir().unwrap();
    let file = tmp.path().join("f.txt");
    let dir = tmp.path().join("tree");
    write_file(&file, b"f");
    write_file(&dir.join("a/b/c.txt"), b"c");

    delete(&file).unwrap();
    delete(&dir).unwrap();
    assert!(!file.exists());
    assert!(!dir.exists());
    assert!(delete(&dir).unwrap_err().is_not_found());
}

#[cfg(unix)]
#[test]
fn delete_of_a_link_keeps_the_target() {
    let tmp = tempdir().unwrap();
    let target = tmp.path().join("real");
    write_file(&target.join("keep.txt"), b"k");
    let link = tmp.path().join("link");
    std::os::unix::fs::symlink(&target, &link).unwrap();

    delete(&link).unwrap();
    assert!(fs::symlink_metadata(&link).is_err());
    assert!(target.join("keep.txt").exists());
}

#[test]
fn clear_directory_everything() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("c");
    write_file(&root.join("a.txt"), b"a");
    write_file(&root.join("sub/b.txt"), b"b");

    clear_directory(&root, false).unwrap();
    assert!(root.is_dir());
    assert!(list_file_and_directories(&root).unwrap().is_empty());
}

#[test]
fn clear_directory_only_files_keeps_skeleton() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("c");
    write_file(&root.join("a.txt"), b"a");
    write_file(&root.join("sub/b.txt"), b"b");
    write_file(&root.join("sub/deeper/c.txt"), b"c");

    clear_directory(&root, true).unwrap();
    assert!(list_files_recursive(&root).unwrap().is_empty());
    assert_eq!(list_directories(&root).unwrap(), vec![root.join("sub")]);
    assert!(root.join("sub/deeper").is_dir());
}

// ---------- listings ----------

#[test]
fn one_level_listings_split_by_kind() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    write_file(&root.join("one.txt"), b"1");
    write_file(&root.join("d/two.txt"), b"2");

    assert_eq!(list_files(root).unwrap(), vec![root.join("one.txt")]);
    assert_eq!(list_directories(root).unwrap(), vec![root.join("d")]);

    let mut all = list_file_and_directories(root).unwrap();
    all.sort();
    assert_eq!(all, vec![root.join("d"), root.join("one.txt")]);

    let mut recursive = list_files_recursive(root).unwrap();
    recursive.sort();
    assert_eq!(recursive, vec![root.join("d/two.txt"), root.join("one.txt")]);
}

#[test]
fn listing_a_file_is_an_error() {
    let tmp = tempdir().unwrap();
    let file = tmp.path().join("f");
    write_file(&file, b"");
    assert!(matches!(list_files(&file), Err(FileKitError::NotADirectory(_))));
    assert!(matches!(list_files_recursive(&file), Err(FileKitError::NotADirectory(_))));
}

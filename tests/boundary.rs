use std::fs;
use std::path::{Path, PathBuf};

use rax_fs::{EngineError, FileEngine};
use tempfile::TempDir;

/// A root directory with a sibling `outside` directory next to it.
struct Sandbox {
    _temp: TempDir,
    root: PathBuf,
    outside: PathBuf,
    engine: FileEngine,
}

fn sandbox() -> Sandbox {
    let temp = TempDir::new().expect("create temp dir");
    let base = fs::canonicalize(temp.path()).unwrap();
    let root = base.join("root");
    let outside = base.join("outside");
    fs::create_dir_all(root.join("docs")).unwrap();
    fs::create_dir_all(&outside).unwrap();
    fs::write(outside.join("secret.txt"), "secret").unwrap();
    fs::write(root.join("docs/readme.txt"), "inside").unwrap();

    let engine = FileEngine::new(&root).unwrap();
    Sandbox {
        _temp: temp,
        root,
        outside,
        engine,
    }
}

fn assert_denied<T: std::fmt::Debug>(result: Result<T, EngineError>) {
    match result {
        Err(EngineError::AccessDenied(_)) => {}
        other => panic!("expected AccessDenied, got {other:?}"),
    }
}

fn snapshot(dir: &Path) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = walk(dir);
    paths.sort();
    paths
}

fn walk(dir: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if fs::symlink_metadata(&path).unwrap().is_dir() {
            out.extend(walk(&path));
        }
        out.push(path);
    }
    out
}

#[test]
fn test_every_operation_denies_parent_traversal() {
    let sb = sandbox();
    let before_root = snapshot(&sb.root);
    let before_outside = snapshot(&sb.outside);

    assert_denied(sb.engine.list("../", false));
    assert_denied(sb.engine.search("..", "*", true));
    assert_denied(sb.engine.create_file("../outside/new.txt", "x"));
    assert_denied(sb.engine.create_directory("../outside/newdir"));
    assert_denied(sb.engine.move_item("docs/readme.txt", "../outside/stolen.txt"));
    assert_denied(sb.engine.move_item("../outside/secret.txt", "docs/secret.txt"));
    assert_denied(sb.engine.delete("../outside/secret.txt"));
    assert_denied(sb.engine.read("../outside/secret.txt", None));
    assert_denied(sb.engine.info("docs/../../outside"));

    assert_eq!(snapshot(&sb.root), before_root);
    assert_eq!(snapshot(&sb.outside), before_outside);
}

#[test]
fn test_absolute_paths_outside_root_are_denied() {
    let sb = sandbox();
    let secret = sb.outside.join("secret.txt");

    assert_denied(sb.engine.read(&secret, None));
    assert_denied(sb.engine.info(&sb.outside));
    assert_denied(sb.engine.list(&sb.outside, false));
    assert_denied(sb.engine.delete(&secret));
    assert!(secret.exists());
}

#[test]
fn test_sibling_sharing_the_root_prefix_is_denied() {
    let sb = sandbox();
    let sibling = sb.root.with_file_name("rootbar");
    fs::create_dir(&sibling).unwrap();

    assert_denied(sb.engine.list(&sibling, false));
    assert_denied(sb.engine.create_file(sibling.join("x.txt"), "x"));
    assert!(!sibling.join("x.txt").exists());
}

#[test]
fn test_absolute_paths_inside_root_are_allowed() {
    let sb = sandbox();

    let content = sb.engine.read(sb.root.join("docs/readme.txt"), None).unwrap();

    assert_eq!(content.content, "inside");
}

#[test]
fn test_root_cannot_be_deleted_or_moved() {
    let sb = sandbox();

    assert_denied(sb.engine.delete("."));
    assert_denied(sb.engine.delete(&sb.root));
    assert_denied(sb.engine.move_item(".", "elsewhere"));
    assert!(sb.root.join("docs/readme.txt").exists());
}

#[cfg(unix)]
mod symlinks {
    use super::*;
    use std::os::unix::fs::symlink;

    #[test]
    fn test_symlink_to_outside_is_not_followed() {
        let sb = sandbox();
        symlink(&sb.outside, sb.root.join("escape")).unwrap();
        symlink(sb.outside.join("secret.txt"), sb.root.join("secret_link")).unwrap();

        assert_denied(sb.engine.list("escape", false));
        assert_denied(sb.engine.read("secret_link", None));
        assert_denied(sb.engine.read("escape/secret.txt", None));
        assert_denied(sb.engine.info("escape"));
        assert_denied(sb.engine.search("escape", "*", true));
        assert_denied(sb.engine.create_file("escape/planted.txt", "x"));
        assert_denied(sb.engine.create_directory("escape/planted"));
        assert_denied(sb.engine.move_item("docs/readme.txt", "escape/readme.txt"));
        assert_denied(sb.engine.delete("escape/secret.txt"));

        assert!(!sb.outside.join("planted.txt").exists());
        assert!(!sb.outside.join("planted").exists());
        assert_eq!(
            fs::read_to_string(sb.outside.join("secret.txt")).unwrap(),
            "secret"
        );
    }

    #[test]
    fn test_dangling_symlink_cannot_plant_files_outside() {
        let sb = sandbox();
        symlink(sb.outside.join("planted.txt"), sb.root.join("trap")).unwrap();

        assert_denied(sb.engine.create_file("trap", "payload"));
        assert!(!sb.outside.join("planted.txt").exists());
    }

    #[test]
    fn test_deleting_a_link_leaves_its_target() {
        let sb = sandbox();
        symlink(&sb.outside, sb.root.join("escape")).unwrap();

        sb.engine.delete("escape").unwrap();

        assert!(fs::symlink_metadata(sb.root.join("escape")).is_err());
        assert!(sb.outside.join("secret.txt").exists());
    }

    #[test]
    fn test_search_does_not_descend_into_links() {
        let sb = sandbox();
        symlink(&sb.outside, sb.root.join("escape")).unwrap();

        let results = sb.engine.search(".", "secret.txt", true).unwrap();

        assert!(results.results.is_empty());
    }

    #[test]
    fn test_links_leading_out_are_not_described() {
        let sb = sandbox();
        symlink(sb.outside.join("secret.txt"), sb.root.join("peek")).unwrap();
        symlink(&sb.outside, sb.root.join("escape")).unwrap();
        symlink(sb.root.join("docs/readme.txt"), sb.root.join("shortcut")).unwrap();

        let listing = sb.engine.list(".", true).unwrap();
        let names: Vec<_> = listing.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["docs", "shortcut"]);

        let found = sb.engine.search(".", "*", true).unwrap();
        assert!(found
            .results
            .iter()
            .all(|m| m.entry.name != "peek" && m.entry.name != "escape"));

        for entry in &listing.files {
            let info = sb.engine.info(&entry.name).unwrap();
            assert_eq!(info.entry.kind, entry.kind);
            assert_eq!(info.entry.size, entry.size);
        }
        assert_denied(sb.engine.info("peek"));
    }

    #[test]
    fn test_unresolvable_outside_paths_are_denied() {
        let sb = sandbox();
        symlink(sb.outside.join("l2"), sb.outside.join("l1")).unwrap();
        symlink(sb.outside.join("l1"), sb.outside.join("l2")).unwrap();
        let looped = sb.outside.join("l1/x");

        assert_denied(sb.engine.info(&looped));
        assert_denied(sb.engine.list(&looped, false));
        assert_denied(sb.engine.read(&looped, None));
        assert_denied(sb.engine.create_file(&looped, "x"));
        assert_denied(sb.engine.delete(&looped));
        assert_denied(sb.engine.info("../outside/l1/x"));
    }
}

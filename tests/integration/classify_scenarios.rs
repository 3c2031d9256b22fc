//! Classifier scenarios
//!
//! End-to-end sweeps over real directories: which files stay, which move, and
//! where they land.

use super::test_utils::{read_tree, write_tree};
use hashsweep::classify::{Classifier, Quarantine};
use hashsweep::manifest::{Manifest, ManifestBuilder};
use hashsweep::progress::NoProgress;
use hashsweep::tree::hasher;
use hashsweep::tree::walker::Exclusions;
use hashsweep::types::Outcome;
use std::collections::BTreeMap;
use tempfile::TempDir;

struct Sweep {
    root: TempDir,
    quarantine_parent: TempDir,
}

impl Sweep {
    fn new(files: &[(&str, &str)]) -> Self {
        let root = TempDir::new().unwrap();
        write_tree(root.path(), files);
        Self {
            root,
            quarantine_parent: TempDir::new().unwrap(),
        }
    }

    fn quarantine(&self) -> Quarantine {
        Quarantine::new(
            self.quarantine_parent.path().join("outdated"),
            self.quarantine_parent.path().join("unknown"),
        )
    }

    fn snapshot(&self) -> Manifest {
        ManifestBuilder::new(self.root.path())
            .build(&mut NoProgress)
            .unwrap()
            .manifest
    }

    fn tree(&self) -> BTreeMap<String, String> {
        read_tree(self.root.path())
    }

    fn outdated(&self) -> BTreeMap<String, String> {
        read_tree(&self.quarantine_parent.path().join("outdated"))
    }

    fn unknown(&self) -> BTreeMap<String, String> {
        read_tree(&self.quarantine_parent.path().join("unknown"))
    }
}

fn tree_of(files: &[(&str, &str)]) -> BTreeMap<String, String> {
    files
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_hello_world_scenario() {
    let sweep = Sweep::new(&[("a.txt", "hello"), ("b.txt", "world")]);
    let mut manifest = Manifest::new();
    manifest.insert("a.txt", hasher::hash_bytes(b"hello")).unwrap();
    manifest.insert("b.txt", hasher::hash_bytes(b"wrong")).unwrap();

    let report = Classifier::new(&manifest, sweep.root.path(), sweep.quarantine())
        .run(&mut NoProgress)
        .unwrap();

    assert_eq!((report.matched, report.outdated, report.unknown), (1, 1, 0));
    assert_eq!(sweep.tree(), tree_of(&[("a.txt", "hello")]));
    assert_eq!(sweep.outdated(), tree_of(&[("b.txt", "world")]));
    assert!(sweep.unknown().is_empty());
}

/// Mutating one file after a snapshot moves exactly that file to outdated
#[test]
fn test_single_mutation_is_outdated() {
    let sweep = Sweep::new(&[("a.txt", "1"), ("dir/b.txt", "2"), ("dir/c.txt", "3")]);
    let manifest = sweep.snapshot();
    write_tree(sweep.root.path(), &[("dir/b.txt", "changed")]);

    let report = Classifier::new(&manifest, sweep.root.path(), sweep.quarantine())
        .run(&mut NoProgress)
        .unwrap();

    assert_eq!((report.matched, report.outdated, report.unknown), (2, 1, 0));
    assert_eq!(report.relocations.len(), 1);
    assert_eq!(report.relocations[0].path, "dir/b.txt");
    assert_eq!(report.relocations[0].outcome, Outcome::Outdated);
    assert_eq!(sweep.outdated(), tree_of(&[("dir/b.txt", "changed")]));
    assert_eq!(sweep.tree(), tree_of(&[("a.txt", "1"), ("dir/c.txt", "3")]));
}

/// A file added after the snapshot is unknown and its content survives the move
#[test]
fn test_novel_file_is_unknown() {
    let sweep = Sweep::new(&[("a.txt", "1")]);
    let manifest = sweep.snapshot();
    write_tree(sweep.root.path(), &[("mods/extra.dat", "new content")]);

    let report = Classifier::new(&manifest, sweep.root.path(), sweep.quarantine())
        .run(&mut NoProgress)
        .unwrap();

    assert_eq!((report.matched, report.outdated, report.unknown), (1, 0, 1));
    assert_eq!(sweep.unknown(), tree_of(&[("mods/extra.dat", "new content")]));
    assert_eq!(sweep.tree(), tree_of(&[("a.txt", "1")]));
}

/// Excluded files are never hashed, classified, or moved
#[test]
fn test_excluded_files_are_untouched() {
    let sweep = Sweep::new(&[
        ("a.txt", "1"),
        (".local_storage", "cache"),
        ("cache/blob.bin", "blob"),
    ]);
    let manifest = Manifest::new();
    let exclusions = Exclusions::new()
        .with_file_name(".local_storage")
        .with_folder("cache");

    let report = Classifier::new(&manifest, sweep.root.path(), sweep.quarantine())
        .with_exclusions(exclusions)
        .run(&mut NoProgress)
        .unwrap();

    assert_eq!(report.classified(), 1);
    assert_eq!(sweep.unknown(), tree_of(&[("a.txt", "1")]));
    assert_eq!(
        sweep.tree(),
        tree_of(&[(".local_storage", "cache"), ("cache/blob.bin", "blob")])
    );
}

/// Re-running the classifier on an already-swept tree moves nothing more
#[test]
fn test_second_run_is_idempotent() {
    let sweep = Sweep::new(&[("a.txt", "1"), ("b.txt", "2")]);
    let manifest = sweep.snapshot();
    write_tree(sweep.root.path(), &[("b.txt", "changed"), ("c.txt", "new")]);

    let classifier = Classifier::new(&manifest, sweep.root.path(), sweep.quarantine());
    let first = classifier.run(&mut NoProgress).unwrap();
    assert_eq!(first.relocations.len(), 2);

    let second = classifier.run(&mut NoProgress).unwrap();
    assert_eq!((second.matched, second.outdated, second.unknown), (1, 0, 0));
    assert!(second.relocations.is_empty());
    assert_eq!(second.missing, vec!["b.txt".to_string()]);
}

/// Same-named files from different folders keep distinct destinations
#[test]
fn test_same_names_do_not_collide() {
    let sweep = Sweep::new(&[("x/a.txt", "from x"), ("y/a.txt", "from y")]);
    let manifest = Manifest::new();

    let report = Classifier::new(&manifest, sweep.root.path(), sweep.quarantine())
        .run(&mut NoProgress)
        .unwrap();

    assert_eq!(report.unknown, 2);
    assert_eq!(
        sweep.unknown(),
        tree_of(&[("x/a.txt", "from x"), ("y/a.txt", "from y")])
    );
}

/// A file already sitting at the destination is never overwritten
#[test]
fn test_existing_destination_gets_suffix() {
    let sweep = Sweep::new(&[("a.txt", "second")]);
    write_tree(
        &sweep.quarantine_parent.path().join("unknown"),
        &[("a.txt", "first")],
    );

    let report = Classifier::new(&Manifest::new(), sweep.root.path(), sweep.quarantine())
        .run(&mut NoProgress)
        .unwrap();

    assert_eq!(report.unknown, 1);
    assert_eq!(
        sweep.unknown(),
        tree_of(&[("a.txt", "first"), ("a.txt.1", "second")])
    );
}

/// Quarantine folders inside the scanned root are skipped by the walk
#[test]
fn test_quarantine_inside_root() {
    let sweep = Sweep::new(&[("a.txt", "1"), ("b.txt", "2")]);
    let manifest = sweep.snapshot();
    write_tree(sweep.root.path(), &[("b.txt", "changed")]);

    let quarantine = Quarantine::new(
        sweep.root.path().join("outdated"),
        sweep.root.path().join("unknown"),
    );
    let classifier = Classifier::new(&manifest, sweep.root.path(), quarantine);
    let first = classifier.run(&mut NoProgress).unwrap();
    assert_eq!((first.matched, first.outdated, first.unknown), (1, 1, 0));

    let second = classifier.run(&mut NoProgress).unwrap();
    assert_eq!((second.matched, second.outdated, second.unknown), (1, 0, 0));
    assert_eq!(
        sweep.tree(),
        tree_of(&[("a.txt", "1"), ("outdated/b.txt", "changed")])
    );
}

#[test]
fn test_dry_run_plans_without_moving() {
    let sweep = Sweep::new(&[("a.txt", "hello"), ("b.txt", "world"), ("c.txt", "new")]);
    let mut manifest = Manifest::new();
    manifest.insert("a.txt", hasher::hash_bytes(b"hello")).unwrap();
    manifest.insert("b.txt", hasher::hash_bytes(b"wrong")).unwrap();

    let report = Classifier::new(&manifest, sweep.root.path(), sweep.quarantine())
        .dry_run(true)
        .run(&mut NoProgress)
        .unwrap();

    assert!(report.dry_run);
    assert_eq!((report.matched, report.outdated, report.unknown), (1, 1, 1));
    let planned: Vec<_> = report
        .relocations
        .iter()
        .map(|r| (r.path.as_str(), r.outcome))
        .collect();
    assert_eq!(
        planned,
        vec![("b.txt", Outcome::Outdated), ("c.txt", Outcome::Unknown)]
    );
    assert_eq!(sweep.tree().len(), 3);
    assert!(!sweep.quarantine_parent.path().join("outdated").exists());
}

#[test]
fn test_missing_entries_are_reported() {
    let sweep = Sweep::new(&[("a.txt", "1"), ("gone.txt", "2")]);
    let manifest = sweep.snapshot();
    std::fs::remove_file(sweep.root.path().join("gone.txt")).unwrap();

    let report = Classifier::new(&manifest, sweep.root.path(), sweep.quarantine())
        .run(&mut NoProgress)
        .unwrap();

    assert_eq!(report.matched, 1);
    assert_eq!(report.missing, vec!["gone.txt".to_string()]);
}

/// Folder prefixes match by text, so siblings sharing the prefix stay put
#[test]
fn test_folder_prefix_covers_similar_names() {
    let sweep = Sweep::new(&[
        ("a.txt", "1"),
        (".local_storage/cache.bin", "c"),
        (".local_storage_old/x", "old"),
        (".local_storage-journal", "j"),
    ]);
    let exclusions = Exclusions::new().with_folder(".local_storage");

    let report = Classifier::new(&Manifest::new(), sweep.root.path(), sweep.quarantine())
        .with_exclusions(exclusions)
        .run(&mut NoProgress)
        .unwrap();

    assert_eq!(report.unknown, 1);
    assert_eq!(sweep.unknown(), tree_of(&[("a.txt", "1")]));
    assert_eq!(sweep.tree().len(), 3);
}

/// One file that cannot be hashed does not stop the others from being swept
#[cfg(unix)]
#[test]
fn test_unreadable_file_does_not_stop_the_run() {
    use std::os::unix::fs::PermissionsExt;

    let sweep = Sweep::new(&[("listed.txt", "data"), ("extra.txt", "extra")]);
    let mut manifest = Manifest::new();
    manifest.insert("listed.txt", hasher::hash_bytes(b"data")).unwrap();
    let locked = sweep.root.path().join("listed.txt");
    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();

    // Permission bits do not stop root; nothing to assert in that case.
    if std::fs::File::open(&locked).is_ok() {
        return;
    }

    let report = Classifier::new(&manifest, sweep.root.path(), sweep.quarantine())
        .run(&mut NoProgress)
        .unwrap();

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].path, "listed.txt");
    assert_eq!(report.unknown, 1);
    assert!(locked.exists());
    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o644)).unwrap();
    assert_eq!(sweep.unknown(), tree_of(&[("extra.txt", "extra")]));
}

/// A name that cannot be a manifest key round-trips as a recorded failure
#[cfg(unix)]
#[test]
fn test_backslash_name_round_trip() {
    let sweep = Sweep::new(&[("a\\b.txt", "odd"), ("ok.txt", "ok")]);
    let report = ManifestBuilder::new(sweep.root.path())
        .keep_going(true)
        .build(&mut NoProgress)
        .unwrap();
    assert_eq!(report.manifest.keys().collect::<Vec<_>>(), vec!["ok.txt"]);
    assert_eq!(report.failures[0].path, "a\\b.txt");

    let verify = Classifier::new(&report.manifest, sweep.root.path(), sweep.quarantine())
        .run(&mut NoProgress)
        .unwrap();
    assert_eq!((verify.matched, verify.unknown), (1, 0));
    assert_eq!(verify.failures.len(), 1);
    assert!(verify.missing.is_empty());
    assert_eq!(sweep.tree().len(), 2);
}

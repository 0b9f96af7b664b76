use dupsweep::checkpoint::{Checkpoint, CheckpointStore, JsonCheckpointStore};
use dupsweep::pipeline::{Pipeline, PipelineConfig, StageSource};
use dupsweep::scanner::{Digest, ExclusionList, HashGroups, HashOutcome};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn write(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn config(root: &Path) -> PipelineConfig {
    PipelineConfig::new(root.to_path_buf())
}

#[test]
fn test_identical_content_grouped_together() {
    let tree = tempdir().unwrap();
    let work = tempdir().unwrap();
    write(&tree.path().join("one/report.pdf"), b"quarterly numbers");
    write(&tree.path().join("two/copy.pdf"), b"quarterly numbers");
    write(&tree.path().join("three/again.pdf"), b"quarterly numbers");
    write(&tree.path().join("unique.txt"), b"nothing like it");
    write(&tree.path().join("pair_a.bin"), b"pair");
    write(&tree.path().join("pair_b.bin"), b"pair");

    let store = JsonCheckpointStore::new(work.path());
    let output = Pipeline::new(config(tree.path()), &store).run(false).unwrap();

    assert_eq!(output.ranked.len(), 2);
    assert!(output.errors.is_empty());

    let big = &output.ranked.groups[0];
    assert_eq!(big.digest, Digest::of(b"quarterly numbers"));
    assert_eq!(big.files.len(), 3);
    assert_eq!(big.size, Some(17));

    let small = &output.ranked.groups[1];
    assert_eq!(small.digest, Digest::of(b"pair"));
    assert_eq!(small.files.len(), 2);

    // Every group has at least two members.
    assert!(output.ranked.groups.iter().all(|g| g.files.len() >= 2));
    assert_eq!(output.ranked.total_reclaimable, 17 * 2 + 4);
}

#[test]
fn test_second_run_reuses_every_checkpoint() {
    let tree = tempdir().unwrap();
    let work = tempdir().unwrap();
    write(&tree.path().join("a.txt"), b"dup");
    write(&tree.path().join("b.txt"), b"dup");
    write(&tree.path().join("c.txt"), b"solo");

    let store = JsonCheckpointStore::new(work.path());
    let pipeline = Pipeline::new(config(tree.path()), &store);

    let first = pipeline.run(false).unwrap();
    let second = pipeline.run(false).unwrap();

    assert!(second.fully_loaded());
    assert_eq!(first.ranked, second.ranked);
    assert_eq!(first.errors, second.errors);
}

#[test]
fn test_loaded_checkpoints_are_not_recomputed() {
    let tree = tempdir().unwrap();
    let work = tempdir().unwrap();
    write(&tree.path().join("a.txt"), b"dup");
    write(&tree.path().join("b.txt"), b"dup");

    let store = JsonCheckpointStore::new(work.path());
    let pipeline = Pipeline::new(config(tree.path()), &store);
    let first = pipeline.run(false).unwrap();

    // The tree changes, but the checkpoints still describe the old state.
    fs::remove_file(tree.path().join("a.txt")).unwrap();
    write(&tree.path().join("new_1.txt"), b"fresh");
    write(&tree.path().join("new_2.txt"), b"fresh");

    let second = pipeline.run(false).unwrap();
    assert!(second.fully_loaded());
    assert_eq!(first.ranked, second.ranked);
}

#[test]
fn test_reset_recomputes_every_stage() {
    let tree = tempdir().unwrap();
    let work = tempdir().unwrap();
    write(&tree.path().join("a.txt"), b"dup");
    write(&tree.path().join("b.txt"), b"dup");

    let store = JsonCheckpointStore::new(work.path());
    let pipeline = Pipeline::new(config(tree.path()), &store);
    let first = pipeline.run(false).unwrap();

    let reset = pipeline.run(true).unwrap();
    let sources: Vec<_> = reset.report.iter().map(|r| r.source).collect();
    assert_eq!(sources, vec![StageSource::Computed; 4]);
    assert_eq!(first.ranked, reset.ranked);

    let stages: Vec<_> = reset.report.iter().map(|r| r.stage).collect();
    assert_eq!(stages, Checkpoint::ALL.to_vec());
}

#[test]
fn test_reset_sees_filesystem_changes() {
    let tree = tempdir().unwrap();
    let work = tempdir().unwrap();
    write(&tree.path().join("a.txt"), b"dup");
    write(&tree.path().join("b.txt"), b"dup");

    let store = JsonCheckpointStore::new(work.path());
    let pipeline = Pipeline::new(config(tree.path()), &store);
    assert_eq!(pipeline.run(false).unwrap().ranked.len(), 1);

    write(&tree.path().join("c.txt"), b"more");
    write(&tree.path().join("d.txt"), b"more");

    assert_eq!(pipeline.run(false).unwrap().ranked.len(), 1);
    assert_eq!(pipeline.run(true).unwrap().ranked.len(), 2);
}

#[test]
fn test_sizes_rank_descending() {
    let tree = tempdir().unwrap();
    let work = tempdir().unwrap();
    for (name, size) in [("ten", 10usize), ("five_hundred", 500), ("fifty", 50)] {
        let content = vec![name.as_bytes()[0]; size];
        write(&tree.path().join(format!("{}_1", name)), &content);
        write(&tree.path().join(format!("{}_2", name)), &content);
    }

    let store = JsonCheckpointStore::new(work.path());
    let output = Pipeline::new(config(tree.path()), &store).run(false).unwrap();

    let sizes: Vec<_> = output.ranked.groups.iter().map(|g| g.size).collect();
    assert_eq!(sizes, vec![Some(500), Some(50), Some(10)]);
}

#[test]
fn test_reclaimable_total_from_disk() {
    let tree = tempdir().unwrap();
    let work = tempdir().unwrap();
    for i in 0..3 {
        write(&tree.path().join(format!("hundred_{}", i)), &[7u8; 100]);
    }
    for i in 0..2 {
        write(&tree.path().join(format!("fifty_{}", i)), &[9u8; 50]);
    }

    let store = JsonCheckpointStore::new(work.path());
    let output = Pipeline::new(config(tree.path()), &store).run(false).unwrap();

    assert_eq!(output.ranked.total_reclaimable, 250);
}

#[test]
fn test_excluded_paths_never_appear() {
    let tree = tempdir().unwrap();
    let work = tempdir().unwrap();
    write(&tree.path().join("keep/a.txt"), b"dup");
    write(&tree.path().join("keep/b.txt"), b"dup");
    write(&tree.path().join("zz_excluded_zz/c.txt"), b"dup");
    write(&tree.path().join("zz_excluded_zz/d.txt"), b"other");
    write(&tree.path().join("zz_excluded_zz/e.txt"), b"other");

    let store = JsonCheckpointStore::new(work.path());
    let pipeline_config = config(tree.path()).with_exclusions(ExclusionList::new(["zz_excluded_zz"]));
    let output = Pipeline::new(pipeline_config, &store).run(false).unwrap();

    assert_eq!(output.ranked.len(), 1);
    assert_eq!(output.ranked.groups[0].files.len(), 2);

    let files: Vec<PathBuf> = store.read(Checkpoint::Files).unwrap();
    let analysed: HashOutcome = store.read(Checkpoint::Analyse).unwrap();
    let dups: HashGroups = store.read(Checkpoint::Dups).unwrap();

    let is_excluded = |p: &PathBuf| p.to_string_lossy().contains("zz_excluded_zz");
    assert_eq!(files.len(), 2);
    assert!(!files.iter().any(is_excluded));
    assert!(!analysed.groups.iter().flat_map(|g| &g.files).any(is_excluded));
    assert!(!analysed.errors.iter().map(|e| &e.path).any(is_excluded));
    assert!(!dups.iter().flat_map(|g| &g.files).any(is_excluded));
    assert!(!output
        .ranked
        .groups
        .iter()
        .flat_map(|g| &g.files)
        .any(is_excluded));
}

#[cfg(unix)]
#[test]
fn test_unreadable_entries_become_error_records() {
    use std::os::unix::fs::symlink;

    let tree = tempdir().unwrap();
    let work = tempdir().unwrap();
    write(&tree.path().join("a.txt"), b"dup");
    write(&tree.path().join("b.txt"), b"dup");
    symlink(tree.path().join("missing"), tree.path().join("dangling")).unwrap();
    symlink(tree.path().join("missing"), tree.path().join("skipme_dangling")).unwrap();

    let store = JsonCheckpointStore::new(work.path());
    let pipeline_config = config(tree.path()).with_exclusions(ExclusionList::new(["skipme"]));
    let output = Pipeline::new(pipeline_config, &store).run(false).unwrap();

    assert_eq!(output.ranked.len(), 1);
    assert_eq!(output.errors.len(), 1);
    assert_eq!(output.errors[0].path, tree.path().join("dangling"));

    // Errors survive a resumed run.
    let resumed = Pipeline::new(config(tree.path()), &store).run(false).unwrap();
    assert_eq!(resumed.errors, output.errors);
}

#[test]
fn test_group_with_all_copies_deleted_before_ranking() {
    let tree = tempdir().unwrap();
    let work = tempdir().unwrap();
    write(&tree.path().join("a.txt"), b"dup");
    write(&tree.path().join("b.txt"), b"dup");

    let store = JsonCheckpointStore::new(work.path());
    let pipeline = Pipeline::new(config(tree.path()), &store);
    pipeline.run(false).unwrap();

    // Only the sizes are recomputed, against a tree that lost both copies.
    store.remove(Checkpoint::Sizes).unwrap();
    fs::remove_file(tree.path().join("a.txt")).unwrap();
    fs::remove_file(tree.path().join("b.txt")).unwrap();

    let output = pipeline.run(false).unwrap();
    assert_eq!(output.ranked.len(), 1);
    assert_eq!(output.ranked.groups[0].size, None);
    assert_eq!(output.ranked.total_reclaimable, 0);
}

#[test]
fn test_exclusion_matching_root_name_keeps_tree() {
    let base = tempdir().unwrap();
    let work = tempdir().unwrap();
    let root = base.path().join("Dropbox");
    write(&root.join("photos/a.jpg"), b"holiday");
    write(&root.join("photos/b.jpg"), b"holiday");

    let store = JsonCheckpointStore::new(work.path());
    let pipeline_config = config(&root).with_exclusions(ExclusionList::new(["Dropbox"]));
    let output = Pipeline::new(pipeline_config, &store).run(false).unwrap();

    assert_eq!(output.ranked.len(), 1);
    assert_eq!(output.ranked.groups[0].files.len(), 2);
}

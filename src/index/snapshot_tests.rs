// Copyright 2026 Muvon Un Limited
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use super::snapshot::{snapshot_dirs, INDEX_FILE_NAME, TEXTS_FILE_NAME};
use super::store::VectorIndex;

fn sample_index() -> VectorIndex {
    let mut index = VectorIndex::new(64);
    index.add("2024-08-30 10:00:01 INFO アプリケーション開始");
    index.add("2024-08-30 10:02:30 ERROR データベース接続エラー\n  at pool.rs:42");
    index.add("path C:\\logs\\app.log rotated");
    index.add("2024-08-30 10:05:01 WARNING 一時的なネットワーク遅延を検出");
    index
}

#[test]
fn test_save_load_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let index = sample_index();
    index.save(dir.path()).unwrap();

    let mut restored = VectorIndex::new(64);
    assert!(restored.load(dir.path()).unwrap());

    assert_eq!(restored.texts(), index.texts());
    let before = index.query("ERROR データベース", 4);
    let after = restored.query("ERROR データベース", 4);
    assert_eq!(before, after);
}

#[test]
fn test_texts_file_has_one_line_per_entry() {
    let dir = tempfile::tempdir().unwrap();
    sample_index().save(dir.path()).unwrap();

    let content = std::fs::read_to_string(dir.path().join(TEXTS_FILE_NAME)).unwrap();
    assert_eq!(content.lines().count(), 4);
}

#[test]
fn test_load_missing_file_is_noop() {
    let dir = tempfile::tempdir().unwrap();
    let mut index = sample_index();

    assert!(!index.load(dir.path()).unwrap());
    assert_eq!(index.len(), 4);
}

#[test]
fn test_load_dimension_mismatch_leaves_index_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    sample_index().save(dir.path()).unwrap();

    let mut other = VectorIndex::new(32);
    other.add("kept");
    assert!(other.load(dir.path()).is_err());
    assert_eq!(other.texts(), &["kept".to_string()]);
}

#[test]
fn test_load_inconsistent_texts_is_error() {
    let dir = tempfile::tempdir().unwrap();
    sample_index().save(dir.path()).unwrap();
    std::fs::write(dir.path().join(TEXTS_FILE_NAME), "only one\n").unwrap();

    let mut index = VectorIndex::new(64);
    assert!(index.load(dir.path()).is_err());
    assert!(index.is_empty());
}

#[test]
fn test_load_corrupt_index_is_error() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(INDEX_FILE_NAME), b"not bincode").unwrap();
    std::fs::write(dir.path().join(TEXTS_FILE_NAME), "").unwrap();

    let mut index = VectorIndex::new(64);
    assert!(index.load(dir.path()).is_err());
}

#[test]
fn test_empty_index_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    VectorIndex::new(8).save(dir.path()).unwrap();

    let mut restored = VectorIndex::new(8);
    restored.add("replaced");
    assert!(restored.load(dir.path()).unwrap());
    assert!(restored.is_empty());
}

#[test]
fn test_save_snapshot_skips_empty_index() {
    let dir = tempfile::tempdir().unwrap();
    let saved = VectorIndex::new(8).save_snapshot(dir.path()).unwrap();
    assert!(saved.is_none());
    assert!(snapshot_dirs(dir.path()).unwrap().is_empty());
}

#[test]
fn test_load_latest_picks_newest_snapshot() {
    let dir = tempfile::tempdir().unwrap();

    let mut old = VectorIndex::new(16);
    old.add("old");
    old.save(&dir.path().join("20240101_000000")).unwrap();

    let mut new = VectorIndex::new(16);
    new.add("new");
    new.save(&dir.path().join("20240830_101500")).unwrap();

    let mut index = VectorIndex::new(16);
    assert!(index.load_latest(dir.path()).unwrap());
    assert_eq!(index.texts(), &["new".to_string()]);
}

#[test]
fn test_save_snapshot_then_load_latest() {
    let dir = tempfile::tempdir().unwrap();
    let index = sample_index();
    let snapshot = index.save_snapshot(dir.path()).unwrap().unwrap();
    assert!(snapshot.join(INDEX_FILE_NAME).is_file());

    let mut restored = VectorIndex::new(64);
    assert!(restored.load_latest(dir.path()).unwrap());
    assert_eq!(restored.len(), index.len());
}

#[test]
fn test_load_latest_without_snapshots() {
    let dir = tempfile::tempdir().unwrap();
    let mut index = VectorIndex::new(16);
    assert!(!index.load_latest(&dir.path().join("missing")).unwrap());
}

#[test]
fn test_load_latest_skips_broken_snapshot() {
    let dir = tempfile::tempdir().unwrap();

    let mut good = VectorIndex::new(16);
    good.add("good");
    good.save(&dir.path().join("20240101_000000")).unwrap();

    // Newer snapshot whose texts file cannot be read
    let broken = dir.path().join("20240101_000001");
    let mut newer = VectorIndex::new(16);
    newer.add("newer");
    newer.save(&broken).unwrap();
    std::fs::remove_file(broken.join(TEXTS_FILE_NAME)).unwrap();
    std::fs::create_dir(broken.join(TEXTS_FILE_NAME)).unwrap();

    let mut index = VectorIndex::new(16);
    assert!(index.load_latest(dir.path()).unwrap());
    assert_eq!(index.texts(), &["good".to_string()]);
}

#[test]
fn test_load_latest_with_only_broken_snapshots() {
    let dir = tempfile::tempdir().unwrap();
    let broken = dir.path().join("20240101_000000");
    std::fs::create_dir_all(&broken).unwrap();
    std::fs::write(broken.join(INDEX_FILE_NAME), b"garbage").unwrap();

    let mut index = VectorIndex::new(16);
    index.add("kept");
    assert!(!index.load_latest(dir.path()).unwrap());
    assert_eq!(index.texts(), &["kept".to_string()]);
}

#[test]
fn test_save_snapshot_never_overwrites() {
    let dir = tempfile::tempdir().unwrap();
    let index = sample_index();

    let first = index.save_snapshot(dir.path()).unwrap().unwrap();
    let second = index.save_snapshot(dir.path()).unwrap().unwrap();
    assert_ne!(first, second);

    let snapshots = snapshot_dirs(dir.path()).unwrap();
    assert_eq!(snapshots.len(), 2);
    assert_eq!(snapshots[0], second);

    // No staging directories are left behind
    let entries = std::fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(entries, 2);
}

#[test]
fn test_staging_directories_are_ignored() {
    let dir = tempfile::tempdir().unwrap();

    let mut done = VectorIndex::new(16);
    done.add("done");
    done.save(&dir.path().join("20240101_000000")).unwrap();

    let mut partial = VectorIndex::new(16);
    partial.add("partial");
    partial.save(&dir.path().join(".staging-abc")).unwrap();

    let mut index = VectorIndex::new(16);
    assert!(index.load_latest(dir.path()).unwrap());
    assert_eq!(index.texts(), &["done".to_string()]);
}

#[test]
fn test_save_writes_texts_before_index() {
    let dir = tempfile::tempdir().unwrap();
    // A directory where index.bin should go makes the final write fail
    std::fs::create_dir(dir.path().join(INDEX_FILE_NAME)).unwrap();

    assert!(sample_index().save(dir.path()).is_err());
    assert!(dir.path().join(TEXTS_FILE_NAME).is_file());

    // Without index.bin the directory does not count as a snapshot
    let mut index = VectorIndex::new(64);
    assert!(!index.load(dir.path()).unwrap());
    assert!(index.is_empty());
}

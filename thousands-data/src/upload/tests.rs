//! Unit tests for the bulk uploader.

use std::num::NonZeroUsize;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use rstest::{fixture, rstest};
use tempfile::TempDir;
use thousands_core::TransferTask;

use super::bulk::content_type_for;
use super::test_support::MemoryObjectStore;
use super::*;

struct AssetDir {
    _guard: TempDir,
    path: Utf8PathBuf,
}

impl AssetDir {
    fn write(&self, name: &str, body: &[u8]) -> Utf8PathBuf {
        let path = self.path.join(name);
        std::fs::write(&path, body).unwrap_or_else(|err| panic!("write {path}: {err}"));
        path
    }

    fn path(&self) -> &Utf8Path {
        &self.path
    }
}

fn asset_dir() -> AssetDir {
    let guard = TempDir::new().expect("temporary asset directory");
    let path = Utf8PathBuf::from_path_buf(guard.path().to_path_buf()).expect("utf-8 temp path");
    AssetDir {
        _guard: guard,
        path,
    }
}

#[fixture]
fn assets() -> AssetDir {
    asset_dir()
}

fn width(value: usize) -> NonZeroUsize {
    NonZeroUsize::new(value).expect("non-zero width")
}

fn tasks_for(assets: &AssetDir, count: usize) -> Vec<TransferTask> {
    (0..count)
        .map(|index| {
            let source = assets.write(&format!("{index}.jpg"), b"jpeg");
            TransferTask::new(source, format!("summits/s{index}_0.jpg"))
        })
        .collect()
}

#[rstest]
fn uploads_missing_objects_as_jpeg(assets: AssetDir) {
    let source = assets.write("a.jpg", b"full image");
    let store = MemoryObjectStore::default();
    let uploader = BulkUploader::new(store.clone(), DEFAULT_UPLOAD_CONCURRENCY).expect("uploader");

    let report = uploader.upload_all(&[TransferTask::new(source, "summits/s1_vid_0.jpg")]);

    assert_eq!(report.uploaded(), 1);
    assert!(report.is_clean());
    let puts = store.puts();
    assert_eq!(puts.len(), 1);
    let put = puts.first().expect("one put");
    assert_eq!(put.key, "summits/s1_vid_0.jpg");
    assert_eq!(put.content_type, "image/jpeg");
    assert_eq!(store.object("summits/s1_vid_0.jpg").as_deref(), Some(&b"full image"[..]));
}

#[rstest]
fn second_run_sends_nothing(assets: AssetDir) {
    let tasks = tasks_for(&assets, 6);
    let store = MemoryObjectStore::default();
    let uploader = BulkUploader::new(&store, width(3)).expect("uploader");

    let first = uploader.upload_all(&tasks);
    let second = uploader.upload_all(&tasks);

    assert_eq!(first.uploaded(), 6);
    assert_eq!(second.uploaded(), 0);
    assert_eq!(second.already_present(), 6);
    assert_eq!(store.put_count(), 6);
}

#[rstest]
fn existing_objects_skip_the_local_read(assets: AssetDir) {
    let store = MemoryObjectStore::default();
    store.insert("users/1_M.jpg", b"remote".to_vec());
    let uploader = BulkUploader::new(&store, width(2)).expect("uploader");

    let missing_file = assets.path().join("never-written.jpg");
    let report = uploader.upload_all(&[TransferTask::new(missing_file, "users/1_M.jpg")]);

    assert_eq!(report.already_present(), 1);
    assert_eq!(store.put_count(), 0);
}

#[rstest]
fn probe_failure_is_isolated(assets: AssetDir) {
    let tasks = tasks_for(&assets, 10);
    let store = MemoryObjectStore::default().fail_probe("summits/s2_0.jpg");
    let uploader = BulkUploader::new(&store, width(4)).expect("uploader");

    let report = uploader.upload_all(&tasks);

    assert_eq!(report.len(), 10);
    assert_eq!(report.uploaded(), 9);
    assert_eq!(report.failed(), 1);
    let (task, err) = report.failures().next().expect("one failure");
    assert_eq!(task.key, "summits/s2_0.jpg");
    assert!(matches!(err, TransferError::Probe { .. }));
    assert!(!store.contains("summits/s2_0.jpg"));
}

#[rstest]
fn missing_local_asset_is_reported_per_task(assets: AssetDir) {
    let present = assets.write("present.jpg", b"jpeg");
    let absent = assets.path().join("absent.jpg");
    let store = MemoryObjectStore::default();
    let uploader = BulkUploader::new(&store, width(2)).expect("uploader");

    let report = uploader.upload_all(&[
        TransferTask::new(present, "summits/s1_0.jpg"),
        TransferTask::new(absent.clone(), "summits/s1_0_preview.jpg"),
    ]);

    assert_eq!(report.uploaded(), 1);
    let (_, err) = report.failures().next().expect("one failure");
    match err {
        TransferError::MissingLocalAsset { key, path } => {
            assert_eq!(key, "summits/s1_0_preview.jpg");
            assert_eq!(path, &absent);
        }
        other => panic!("expected missing asset, got {other:?}"),
    }
}

#[rstest]
fn upload_failure_keeps_the_key(assets: AssetDir) {
    let tasks = tasks_for(&assets, 3);
    let store = MemoryObjectStore::default().fail_put("summits/s0_0.jpg");
    let uploader = BulkUploader::new(&store, width(3)).expect("uploader");

    let report = uploader.upload_all(&tasks);

    assert_eq!(report.uploaded(), 2);
    let (_, err) = report.failures().next().expect("one failure");
    assert!(matches!(err, TransferError::Upload { .. }));
    assert_eq!(err.key(), "summits/s0_0.jpg");
}

#[rstest]
#[case(1)]
#[case(4)]
#[case(10)]
fn concurrency_never_exceeds_width(assets: AssetDir, #[case] limit: usize) {
    let tasks = tasks_for(&assets, 24);
    let store = MemoryObjectStore::default().with_latency(Duration::from_millis(10));
    let uploader = BulkUploader::new(&store, width(limit)).expect("uploader");

    let report = uploader.upload_all(&tasks);

    assert_eq!(report.uploaded(), 24);
    assert_eq!(store.put_count(), 24);
    let peak = store.peak_in_flight();
    assert!(peak <= limit, "peak of probes and puts was {peak}");
    assert!(peak >= 1);
}

#[rstest]
fn wide_uploaders_overlap_probes(assets: AssetDir) {
    let tasks = tasks_for(&assets, 12);
    let store = MemoryObjectStore::default().with_latency(Duration::from_millis(20));
    let uploader = BulkUploader::new(&store, width(4)).expect("uploader");

    uploader.upload_all(&tasks);

    assert!(store.peak_in_flight() > 1, "probes never overlapped");
}

#[rstest]
fn distinct_sources_sharing_a_key_upload_once(assets: AssetDir) {
    let first = assets.write("a.jpg", b"first summit");
    let second = assets.write("a_b.jpg", b"second summit");
    let store = MemoryObjectStore::default().with_latency(Duration::from_millis(20));
    let uploader = BulkUploader::new(&store, width(10)).expect("uploader");

    let report = uploader.upload_all(&[
        TransferTask::new(first.clone(), "summits/a_b_c_0.jpg"),
        TransferTask::new(second.clone(), "summits/a_b_c_0.jpg"),
    ]);

    assert_eq!(store.put_count(), 1);
    assert_eq!(report.uploaded(), 1);
    assert_eq!(report.failed(), 1);
    assert_eq!(store.object("summits/a_b_c_0.jpg").as_deref(), Some(&b"first summit"[..]));
    let (task, err) = report.failures().next().expect("one conflict");
    assert_eq!(task.source, second);
    match err {
        TransferError::KeyConflict { key, path, kept } => {
            assert_eq!(key, "summits/a_b_c_0.jpg");
            assert_eq!(path, &second);
            assert_eq!(kept, &first);
        }
        other => panic!("expected key conflict, got {other:?}"),
    }
}

#[rstest]
fn repeated_tasks_collapse_to_one_transfer(assets: AssetDir) {
    let tasks = tasks_for(&assets, 2);
    let mut repeated = tasks.clone();
    repeated.extend(tasks.iter().cloned());
    let store = MemoryObjectStore::default().with_latency(Duration::from_millis(10));
    let uploader = BulkUploader::new(&store, width(4)).expect("uploader");

    let report = uploader.upload_all(&repeated);

    assert_eq!(report.len(), 2);
    assert_eq!(report.uploaded(), 2);
    assert!(report.is_clean());
    assert_eq!(store.put_count(), 2);
}

#[rstest]
fn empty_task_list_resolves_immediately() {
    let store = MemoryObjectStore::default();
    let uploader = BulkUploader::new(&store, DEFAULT_UPLOAD_CONCURRENCY).expect("uploader");
    let report = uploader.upload_all(&[]);
    assert!(report.is_empty());
    assert!(report.is_clean());
}

#[tokio::test]
async fn transfer_all_runs_inside_an_existing_runtime() {
    let assets = asset_dir();
    let tasks = tasks_for(&assets, 3);
    let store = MemoryObjectStore::default();
    let uploader = BulkUploader::new(&store, width(2)).expect("uploader");

    let report = uploader.transfer_all(&tasks).await;

    assert_eq!(report.uploaded(), 3);
}

#[rstest]
#[case("summits/s1_vid_0.jpg", "image/jpeg")]
#[case("users/1_S.jpg", "image/jpeg")]
#[case("summits/archive.bin", "application/octet-stream")]
#[case("no-extension", "application/octet-stream")]
fn content_type_follows_the_extension(#[case] key: &str, #[case] expected: &str) {
    assert_eq!(content_type_for(key), expected);
}

#[test]
fn reports_merge_outcomes() {
    let mut first = UploadReport::from_outcomes(vec![(
        TransferTask::new("/a.jpg", "summits/a_0.jpg"),
        Ok(TaskOutcome::Uploaded),
    )]);
    let second = UploadReport::from_outcomes(vec![(
        TransferTask::new("/b.jpg", "summits/b_0.jpg"),
        Ok(TaskOutcome::AlreadyPresent),
    )]);
    first.merge(second);
    assert_eq!(first.len(), 2);
    assert_eq!(first.uploaded(), 1);
    assert_eq!(first.already_present(), 1);
}

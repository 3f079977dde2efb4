//! Pipeline tests running the migrate command against in-memory backends.

use super::helpers::{MemoryBackends, SNAPSHOT_KEYS, Workspace, snapshot, summit_row};
use crate::migrate::{MigrationReport, UploadTally, migrate};
use crate::CliError;
use rstest::{fixture, rstest};
use serde_yaml::Value;
use std::fs;
use thousands_core::{ImageSize, UserImage};
use thousands_data::export::ExportError;
use thousands_data::mirror::MirrorStore;

#[fixture]
fn workspace() -> Workspace {
    let workspace = Workspace::new();
    workspace.write_snapshot_images();
    workspace
}

#[fixture]
fn backends() -> MemoryBackends {
    MemoryBackends {
        source: snapshot(),
        ..MemoryBackends::default()
    }
}

#[rstest]
fn migrate_writes_documents_mirror_and_objects(workspace: Workspace, backends: MemoryBackends) {
    let report = migrate(&workspace.config(false), &backends).expect("migration succeeds");

    assert_eq!(
        report,
        MigrationReport {
            ridges: 1,
            summits: 1,
            users_inserted: 2,
            user_images: 1,
            user_images_skipped: 1,
            climbs: 1,
            associations_reset: 0,
            uploads: UploadTally {
                uploaded: 3,
                already_present: 0,
                failed: 0,
            },
        }
    );

    let export = workspace.export_dir();
    assert!(export.join("r1/_meta.yaml").is_file());
    let text = fs::read_to_string(export.join("r1/s1.yaml")).expect("summit document");
    let document: Value = serde_yaml::from_str(&text).expect("parse summit document");
    let images = document
        .get("images")
        .and_then(Value::as_sequence)
        .expect("images");
    assert_eq!(images.len(), 1);

    for key in SNAPSHOT_KEYS {
        assert!(backends.store.contains(key), "expected {key} to be stored");
    }
    assert_eq!(backends.store.put_count(), SNAPSHOT_KEYS.len());

    let mirror = MirrorStore::open(&workspace.mirror_db()).expect("reopen mirror");
    assert_eq!(mirror.users().expect("users").len(), 2);
    assert_eq!(
        mirror.user_images().expect("user images"),
        vec![UserImage {
            user_id: 1,
            size: ImageSize::Medium,
            url: "users/1_M.jpg".to_owned(),
        }]
    );
    assert_eq!(mirror.climbs().expect("climbs").len(), 1);
}

#[rstest]
#[case::without_reset(false, 2)]
#[case::with_reset(true, 1)]
fn rerunning_controls_association_duplicates(
    workspace: Workspace,
    backends: MemoryBackends,
    #[case] reset_mirror: bool,
    #[case] expected_rows: usize,
) {
    let config = workspace.config(reset_mirror);
    migrate(&config, &backends).expect("first run");
    let second = migrate(&config, &backends).expect("second run");

    assert_eq!(second.users_inserted, 0);
    assert_eq!(
        second.uploads,
        UploadTally {
            uploaded: 0,
            already_present: SNAPSHOT_KEYS.len(),
            failed: 0,
        }
    );
    assert_eq!(backends.store.put_count(), SNAPSHOT_KEYS.len());

    let mirror = MirrorStore::open(&workspace.mirror_db()).expect("reopen mirror");
    assert_eq!(mirror.users().expect("users").len(), 2);
    assert_eq!(mirror.user_images().expect("user images").len(), expected_rows);
    assert_eq!(mirror.climbs().expect("climbs").len(), expected_rows);
}

#[rstest]
fn export_directory_is_replaced(workspace: Workspace, backends: MemoryBackends) {
    let stale = workspace.export_dir().join("stale");
    fs::create_dir_all(&stale).expect("create stale dir");
    fs::write(stale.join("old.yaml"), "name: old\n").expect("write stale file");

    migrate(&workspace.config(false), &backends).expect("migration succeeds");

    assert!(!stale.exists());
    assert!(workspace.export_dir().join("r1").is_dir());
}

#[rstest]
fn missing_summit_image_is_counted_not_fatal(backends: MemoryBackends) {
    let workspace = Workspace::new();
    workspace.write_image("a.jpg");
    workspace.write_image("u1.jpg");

    let report = migrate(&workspace.config(false), &backends).expect("migration succeeds");

    assert_eq!(report.uploads.failed, 1);
    assert_eq!(report.uploads.uploaded, 2);
    assert!(workspace.export_dir().join("r1/s1.yaml").is_file());
    assert!(!backends.store.contains("summits/s1_vid_0_preview.jpg"));
}

fn unordered_backends() -> MemoryBackends {
    let mut other = summit_row(None, None);
    other.id = "s2".to_owned();
    MemoryBackends {
        source: snapshot().with_summits(vec![
            summit_row(Some(("a.jpg", "a_p.jpg")), None),
            other,
            summit_row(None, None),
        ]),
        ..MemoryBackends::default()
    }
}

#[rstest]
fn unordered_summits_abort_before_users(workspace: Workspace) {
    let backends = unordered_backends();

    let err = migrate(&workspace.config(false), &backends).expect_err("unordered rows");
    match err {
        CliError::Export(ExportError::NonContiguousParent { summit_id }) => {
            assert_eq!(summit_id, "s1");
        }
        other => panic!("expected NonContiguousParent, found {other:?}"),
    }
    let mirror = MirrorStore::open(&workspace.mirror_db()).expect("reopen mirror");
    assert!(mirror.users().expect("users").is_empty());
    assert_eq!(backends.store.put_count(), 0);
    assert!(workspace.root().join("export").join("r1").is_dir());
}

#[rstest]
fn aborted_reset_run_keeps_previous_associations(workspace: Workspace, backends: MemoryBackends) {
    migrate(&workspace.config(false), &backends).expect("first run");

    let failing = unordered_backends();
    let err = migrate(&workspace.config(true), &failing).expect_err("unordered rows");
    assert!(matches!(err, CliError::Export(ExportError::NonContiguousParent { .. })));

    let mirror = MirrorStore::open(&workspace.mirror_db()).expect("reopen mirror");
    assert_eq!(mirror.users().expect("users").len(), 2);
    assert_eq!(mirror.user_images().expect("user images").len(), 1);
    assert_eq!(mirror.climbs().expect("climbs").len(), 1);
}

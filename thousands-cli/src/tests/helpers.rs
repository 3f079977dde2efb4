//! Test helpers: a scratch workspace, a fixed snapshot and in-memory backends.

use std::fs;
use std::num::NonZeroUsize;

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;
use thousands_core::{ClimbRow, Coordinates, RidgeRow, SummitRow, UserRow};
use thousands_data::source::RelationalSource;
use thousands_data::source::test_support::MemorySource;
use thousands_data::upload::test_support::MemoryObjectStore;
use thousands_data::upload::{ObjectStore, S3Config};

use crate::CliError;
use crate::config::{MigrateArgs, MigrateConfig};
use crate::migrate::MigrationBackends;

/// Keys the snapshot uploads when every local file is present.
pub(super) const SNAPSHOT_KEYS: [&str; 3] = [
    "summits/s1_vid_0.jpg",
    "summits/s1_vid_0_preview.jpg",
    "users/1_M.jpg",
];

/// Backends serving a [`MemorySource`] and sharing one [`MemoryObjectStore`].
#[derive(Debug, Clone, Default)]
pub(super) struct MemoryBackends {
    pub(super) source: MemorySource,
    pub(super) store: MemoryObjectStore,
}

impl MigrationBackends for MemoryBackends {
    fn source(&self, _config: &MigrateConfig) -> Result<Box<dyn RelationalSource>, CliError> {
        Ok(Box::new(self.source.clone()))
    }

    fn object_store(&self, _config: &MigrateConfig) -> Result<Box<dyn ObjectStore>, CliError> {
        Ok(Box::new(self.store.clone()))
    }
}

/// Temporary directory laid out like a migration host.
#[derive(Debug)]
pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        fs::create_dir(root.join("images")).expect("create images dir");
        Self { _dir: dir, root }
    }

    pub(super) fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub(super) fn images_dir(&self) -> Utf8PathBuf {
        self.root.join("images")
    }

    pub(super) fn export_dir(&self) -> Utf8PathBuf {
        self.root.join("export")
    }

    pub(super) fn mirror_db(&self) -> Utf8PathBuf {
        self.root.join("mirror").join("thousands.sqlite")
    }

    pub(super) fn write_image(&self, name: &str) {
        fs::write(self.images_dir().join(name), b"\xFF\xD8jpeg").expect("write image");
    }

    /// Write the files the snapshot references, leaving out the user preview.
    pub(super) fn write_snapshot_images(&self) {
        for name in ["a.jpg", "a_p.jpg", "u1.jpg"] {
            self.write_image(name);
        }
    }

    pub(super) fn config(&self, reset_mirror: bool) -> MigrateConfig {
        MigrateConfig {
            source_dsn: "postgres://localhost/thousands".to_owned(),
            images_dir: self.images_dir(),
            export_dir: self.export_dir(),
            mirror_db: self.mirror_db(),
            s3: S3Config::new("thousands", "access", "secret"),
            upload_concurrency: NonZeroUsize::new(4).expect("non-zero width"),
            reset_mirror,
        }
    }
}

pub(super) fn summit_row(image: Option<(&str, &str)>, comment: Option<&str>) -> SummitRow {
    SummitRow {
        id: "s1".to_owned(),
        ridge_id: "r1".to_owned(),
        name: "Peak".to_owned(),
        name_alt: None,
        height: 4000,
        description: None,
        interpretation: None,
        coordinates: Some(Coordinates::new(45.12345, 7.6789)),
        image: image.map(|(full, _)| full.to_owned()),
        preview: image.map(|(_, preview)| preview.to_owned()),
        comment: comment.map(str::to_owned),
    }
}

/// One ridge, one summit with an image and an image-less row, two users and
/// one climb.
pub(super) fn snapshot() -> MemorySource {
    MemorySource::default()
        .with_ridges(vec![RidgeRow {
            id: "r1".to_owned(),
            name: "Ridge One".to_owned(),
            color: "red".to_owned(),
        }])
        .with_summits(vec![
            summit_row(Some(("a.jpg", "a_p.jpg")), Some("Вид")),
            summit_row(None, None),
        ])
        .with_users(vec![
            UserRow {
                id: 1,
                oauth_id: "vk:1".to_owned(),
                src: 1,
                name: "Anna".to_owned(),
                image: Some("u1.jpg".to_owned()),
                preview: Some("u1_p.jpg".to_owned()),
            },
            UserRow {
                id: 2,
                oauth_id: "vk:2".to_owned(),
                src: 1,
                name: "Boris".to_owned(),
                image: None,
                preview: None,
            },
        ])
        .with_climbs(vec![ClimbRow {
            user_id: 1,
            summit_id: "s1".to_owned(),
            comment: Some("Windy".to_owned()),
            year: Some(2019),
            month: Some(7),
            day: None,
        }])
}

/// A fully populated argument set pointing at `workspace`.
pub(super) fn complete_args(workspace: &Workspace) -> MigrateArgs {
    MigrateArgs {
        source_dsn: Some("postgres://localhost/thousands".to_owned()),
        images_dir: Some(workspace.images_dir()),
        export_dir: Some(workspace.export_dir()),
        mirror_db: Some(workspace.mirror_db()),
        s3_endpoint: None,
        s3_bucket: Some("thousands".to_owned()),
        s3_region: None,
        s3_access_key: Some("access".to_owned()),
        s3_secret_key: Some("secret".to_owned()),
        upload_concurrency: None,
        reset_mirror: None,
    }
}

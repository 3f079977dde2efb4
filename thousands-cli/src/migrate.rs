//! The `migrate` command: runs every entity family against the configured
//! backends.
//!
//! Families run strictly in order: ridges, summits, users, climbs. Each
//! family's documents or mirror rows are written before its images are
//! handed to the uploader, and the uploader returns only once every task has
//! resolved. Failed transfers are logged and counted without aborting the
//! run, so documents may reference keys whose upload failed.

use std::fmt;

use camino::Utf8Path;
use log::{info, warn};
use thousands_core::{TransferTask, UserImage, user_image_key};
use thousands_data::export::{export_ridges, export_summits};
use thousands_data::mirror::MirrorStore;
use thousands_data::source::{PgSource, RelationalSource};
use thousands_data::upload::{BulkUploader, ObjectStore, S3ObjectStore, UploadReport};

use crate::CliError;
use crate::config::{MigrateArgs, MigrateConfig};

/// Upload counters summed over every family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadTally {
    pub uploaded: usize,
    pub already_present: usize,
    pub failed: usize,
}

impl UploadTally {
    fn record(&mut self, report: &UploadReport) {
        self.uploaded += report.uploaded();
        self.already_present += report.already_present();
        self.failed += report.failed();
    }
}

/// Summary of a completed migration run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Ridge directories written.
    pub ridges: usize,
    /// Summit documents written.
    pub summits: usize,
    /// Users newly inserted into the mirror.
    pub users_inserted: usize,
    /// User image associations recorded.
    pub user_images: usize,
    /// User images skipped because the local file was missing.
    pub user_images_skipped: usize,
    /// Climb rows recorded.
    pub climbs: usize,
    /// Association rows cleared inside the users and climbs batches, when a
    /// reset was requested.
    pub associations_reset: usize,
    /// Transfer outcomes across the summit and user families.
    pub uploads: UploadTally,
}

impl fmt::Display for MigrationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "migrated {} ridges, {} summits, {} new users ({} images, {} skipped) and {} climbs; \
             uploads: {} sent, {} already present, {} failed",
            self.ridges,
            self.summits,
            self.users_inserted,
            self.user_images,
            self.user_images_skipped,
            self.climbs,
            self.uploads.uploaded,
            self.uploads.already_present,
            self.uploads.failed,
        )
    }
}

/// Builds the relational source and object store for a run.
pub(crate) trait MigrationBackends {
    fn source(&self, config: &MigrateConfig) -> Result<Box<dyn RelationalSource>, CliError>;
    fn object_store(&self, config: &MigrateConfig) -> Result<Box<dyn ObjectStore>, CliError>;
}

/// Postgres source and S3 object store.
pub(crate) struct DefaultMigrationBackends;

impl MigrationBackends for DefaultMigrationBackends {
    fn source(&self, config: &MigrateConfig) -> Result<Box<dyn RelationalSource>, CliError> {
        let source = PgSource::connect(&config.source_dsn).map_err(CliError::Connect)?;
        Ok(Box::new(source))
    }

    fn object_store(&self, config: &MigrateConfig) -> Result<Box<dyn ObjectStore>, CliError> {
        Ok(Box::new(S3ObjectStore::new(config.s3.clone())))
    }
}

pub(crate) fn run_migrate(
    args: MigrateArgs,
    backends: &dyn MigrationBackends,
) -> Result<MigrationReport, CliError> {
    let config = resolve_migrate_config(args)?;
    migrate(&config, backends)
}

pub(crate) fn resolve_migrate_config(args: MigrateArgs) -> Result<MigrateConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

/// Run every family against an already validated configuration.
pub(crate) fn migrate(
    config: &MigrateConfig,
    backends: &dyn MigrationBackends,
) -> Result<MigrationReport, CliError> {
    let source = backends.source(config)?;
    let uploader = BulkUploader::new(backends.object_store(config)?, config.upload_concurrency)?;
    reset_export_dir(&config.export_dir)?;
    let mut mirror = MirrorStore::open(&config.mirror_db)?;

    let mut report = MigrationReport::default();

    let mut migration = Migration {
        config,
        source: source.as_ref(),
        uploader: &uploader,
        report: &mut report,
    };
    migration.ridges()?;
    migration.summits()?;
    migration.users(&mut mirror)?;
    migration.climbs(&mut mirror)?;

    if report.uploads.failed > 0 {
        warn!(
            "{} transfers failed; affected documents reference missing objects",
            report.uploads.failed
        );
    }
    Ok(report)
}

fn reset_export_dir(path: &Utf8Path) -> Result<(), CliError> {
    let reset = |source| CliError::ResetExportDirectory {
        path: path.to_path_buf(),
        source,
    };
    thousands_fs::ensure_parent_dir(path).map_err(reset)?;
    thousands_fs::reset_dir(path).map_err(reset)
}

struct Migration<'a, S> {
    config: &'a MigrateConfig,
    source: &'a dyn RelationalSource,
    uploader: &'a BulkUploader<S>,
    report: &'a mut MigrationReport,
}

impl<S: ObjectStore> Migration<'_, S> {
    fn ridges(&mut self) -> Result<(), CliError> {
        let rows = self.source.ridges().map_err(read_failed("ridges"))?;
        self.report.ridges = export_ridges(&self.config.export_dir, &rows)?;
        Ok(())
    }

    fn summits(&mut self) -> Result<(), CliError> {
        let rows = self.source.summits().map_err(read_failed("summits"))?;
        let export = export_summits(&self.config.export_dir, &self.config.images_dir, &rows)?;
        self.report.summits = export.documents;
        self.upload("summit", &export.tasks);
        Ok(())
    }

    fn users(&mut self, mirror: &mut MirrorStore) -> Result<(), CliError> {
        let rows = self.source.users().map_err(read_failed("users"))?;
        let batch = mirror.begin()?;
        if self.config.reset_mirror {
            self.report.associations_reset += batch.clear_user_images()?;
        }
        let mut tasks = Vec::new();
        for row in &rows {
            if batch.insert_user(&row.user())? {
                self.report.users_inserted += 1;
            }
            for (size, file) in row.image_slots() {
                let path = self.config.images_dir.join(file);
                if !local_asset_exists(&path) {
                    warn!("skipping image {path} of user {}: file not found", row.id);
                    self.report.user_images_skipped += 1;
                    continue;
                }
                let key = user_image_key(row.id, size);
                batch.insert_user_image(&UserImage {
                    user_id: row.id,
                    size,
                    url: key.clone(),
                })?;
                tasks.push(TransferTask::new(path, key));
                self.report.user_images += 1;
            }
        }
        self.upload("user", &tasks);
        batch.commit()?;
        info!(
            "mirrored {} users ({} new) with {} images",
            rows.len(),
            self.report.users_inserted,
            self.report.user_images
        );
        Ok(())
    }

    fn climbs(&mut self, mirror: &mut MirrorStore) -> Result<(), CliError> {
        let rows = self.source.climbs().map_err(read_failed("climbs"))?;
        let batch = mirror.begin()?;
        if self.config.reset_mirror {
            self.report.associations_reset += batch.clear_climbs()?;
        }
        for climb in &rows {
            batch.insert_climb(climb)?;
        }
        batch.commit()?;
        self.report.climbs = rows.len();
        info!("mirrored {} climbs", rows.len());
        Ok(())
    }

    fn upload(&mut self, family: &str, tasks: &[TransferTask]) {
        info!("uploading {} {family} assets", tasks.len());
        let uploads = self.uploader.upload_all(tasks);
        self.report.uploads.record(&uploads);
    }
}

fn read_failed(family: &'static str) -> impl Fn(thousands_data::source::SourceError) -> CliError {
    move |source| CliError::ReadFamily { family, source }
}

fn local_asset_exists(path: &Utf8Path) -> bool {
    thousands_fs::file_is_file(path).unwrap_or_else(|err| {
        warn!("failed to inspect {path}: {err}");
        false
    })
}

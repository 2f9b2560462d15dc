use std::{env, fs, io, time::Duration};

use derive_more::{Display, Error, From};
use indicatif::{ProgressBar, ProgressDrawTarget};

use crate::{
    archiver::{build_zip_archive, ArchiverError},
    collector::FileCollector,
    commands::Cli,
    config::{ConfigError, DeployConfig},
    filter::IgnoreSet,
    uploader::{self, UploadError, UploadOutcome},
};

/// Name of the temporary archive created inside the packaged directory.
const ARCHIVE_FILE_NAME: &str = "_upload.zip";

/// Deploy pipeline errors.
#[derive(Debug, Display, From, Error)]
pub(crate) enum DeployError {
    /// Configuration resolution error.
    Config(ConfigError),

    /// Ignore pattern compilation error.
    #[display(fmt = "unable to compile an ignore pattern: {}", _0)]
    Pattern(regex::Error),

    /// IO-related error.
    Io(io::Error),

    /// Archive creation error.
    #[display(fmt = "unable to create zip archive: {}", _0)]
    Archiver(ArchiverError),

    /// Transport-level upload error.
    Upload(UploadError),

    /// The server refused the upload; its message has already been printed.
    #[display(fmt = "upload was rejected by the server")]
    Rejected,
}

/// Deploy flow entrypoint: resolve the configuration, collect the files,
/// build the archive, upload it and clean up the temporary archive.
///
/// The temporary archive is removed after the HTTP exchange whatever its
/// outcome; only a failure to build the archive skips the upload entirely.
pub(crate) fn deploy(cli: Cli) -> Result<(), DeployError> {
    let directory = cli.directory_arg();
    let config = DeployConfig::resolve(cli.deploy_key, cli.url, directory)?;

    let ignore = IgnoreSet::load(&config.directory)?;

    let progress = ProgressBar::new_spinner();
    progress.set_draw_target(ProgressDrawTarget::stdout());
    progress.enable_steady_tick(Duration::from_millis(150));

    let display_name = config
        .directory
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| config.directory.display().to_string());
    progress.println(format!("Uploading '{display_name}' to Happening"));
    progress.set_message("Creating zip...");

    let archive_path = config.directory.join(ARCHIVE_FILE_NAME);

    // A stale archive left by an aborted earlier run must never end up
    // inside the new one.
    if archive_path.exists() {
        fs::remove_file(&archive_path)?;
    }

    let self_exe = env::current_exe()
        .ok()
        .and_then(|path| path.canonicalize().ok());
    let collector = FileCollector::new(ignore, self_exe);
    let files = collector.collect(&config.directory, &progress);

    build_zip_archive(&archive_path, &config.directory, &files, &progress)?;

    progress.set_message("Uploading...");

    let outcome = uploader::upload(&config.url, &config.deploy_key, &archive_path);

    if let Err(err) = fs::remove_file(&archive_path) {
        progress.suspend(|| {
            eprintln!(
                "Could not delete temporary zip file {}: {err}",
                archive_path.display()
            );
        });
    }

    match outcome? {
        UploadOutcome::Accepted(message) => {
            if !message.is_empty() {
                progress.println(uploader::indent_lines(&message));
            }
            progress.finish_and_clear();
            Ok(())
        }
        UploadOutcome::Rejected(message) => {
            progress.finish_and_clear();
            eprintln!("{}", uploader::indent_lines(&message));
            Err(DeployError::Rejected)
        }
    }
}

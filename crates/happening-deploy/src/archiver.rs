use std::{
    collections::BTreeSet,
    fs::{self, File},
    io,
    path::{Path, PathBuf, StripPrefixError},
};

use derive_more::{Display, Error, From};
use indicatif::ProgressBar;
use zip::{write::FileOptions, ZipWriter};

use crate::collector::relative_name;

/// Errors that may occur during the archive creation process.
#[derive(Debug, Display, From, Error)]
pub(crate) enum ArchiverError {
    /// [`zip`]-crate specific error.
    Zip(zip::result::ZipError),

    /// IO error.
    Io(io::Error),

    /// Unable to strip the root prefix from a collected path.
    StripPrefix(StripPrefixError),

    /// The directory to package disappeared before archiving.
    #[display(fmt = "directory to package does not exist: {}", "path.display()")]
    #[from(ignore)]
    MissingRoot {
        /// The missing root directory.
        #[error(not(source))]
        path: PathBuf,
    },
}

/// Build the ZIP archive at `target` from the collected `files`.
///
/// Entry names are the files' root-relative paths, `/`-separated and without
/// a leading separator. An archive already present at `target` is replaced,
/// since the target is always an internally generated temporary file. Entry
/// writing aborts on the first IO error; a partial archive must never be
/// uploaded. An empty file set still produces a valid, empty archive.
pub(crate) fn build_zip_archive(
    target: &Path,
    root: &Path,
    files: &BTreeSet<PathBuf>,
    progress: &ProgressBar,
) -> Result<(), ArchiverError> {
    if !root.is_dir() {
        return Err(ArchiverError::MissingRoot {
            path: root.to_path_buf(),
        });
    }

    match fs::remove_file(target) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err.into()),
    }

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut writer = ZipWriter::new(File::create(target)?);

    for file in files {
        let relative = file.strip_prefix(root)?;

        let Some(name) = relative_name(relative) else {
            progress.println(format!(
                "File {} contains non-unicode symbols in path",
                file.display()
            ));
            continue;
        };

        writer.start_file(name, FileOptions::default())?;
        io::copy(&mut File::open(file)?, &mut writer)?;
    }

    writer.finish()?;

    Ok(())
}

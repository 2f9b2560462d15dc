use std::{
    collections::BTreeSet,
    ffi::OsStr,
    path::{Path, PathBuf},
};

use indicatif::ProgressBar;
use walkdir::{DirEntry, WalkDir};

use crate::filter::IgnoreSet;

/// Collects the set of files to package from a root directory.
pub(crate) struct FileCollector {
    /// Compiled `.deployignore` patterns.
    ignore: IgnoreSet,

    /// Resolved path of the running executable, so the tool never packages
    /// itself when launched from inside the target directory.
    self_exe: Option<PathBuf>,
}

impl FileCollector {
    /// Create a collector with the given ignore set and self-executable path.
    pub(crate) fn new(ignore: IgnoreSet, self_exe: Option<PathBuf>) -> Self {
        Self { ignore, self_exe }
    }

    /// Walk `root` recursively and return every file to package.
    ///
    /// Hidden entries and the running executable are pruned entirely, without
    /// descending into them. Regular files are kept unless their root-relative
    /// path matches an ignore pattern. A directory that cannot be listed
    /// contributes no children instead of failing the walk. Symlinks are not
    /// followed.
    pub(crate) fn collect(&self, root: &Path, progress: &ProgressBar) -> BTreeSet<PathBuf> {
        let mut files = BTreeSet::new();

        let entries = WalkDir::new(root)
            .into_iter()
            .filter_entry(|entry| self.keep(entry));

        for entry in entries {
            let Ok(entry) = entry else {
                continue;
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let Ok(relative) = entry.path().strip_prefix(root) else {
                continue;
            };

            let Some(name) = relative_name(relative) else {
                progress.println(format!(
                    "File {} contains non-unicode symbols in path",
                    entry.path().display()
                ));
                continue;
            };

            if self.ignore.is_ignored(&name) {
                continue;
            }

            files.insert(entry.path().to_path_buf());
        }

        files
    }

    /// Whether the walker should yield this entry and descend into it.
    fn keep(&self, entry: &DirEntry) -> bool {
        let hidden = entry
            .path()
            .file_name()
            .and_then(OsStr::to_str)
            .map_or(false, |name| name.starts_with('.'));

        !hidden && self.self_exe.as_deref() != Some(entry.path())
    }
}

/// Root-relative entry name with `/`-joined components.
///
/// Returns [`None`] when any component is not valid unicode.
pub(crate) fn relative_name(relative: &Path) -> Option<String> {
    let mut parts = Vec::new();

    for component in relative.components() {
        parts.push(component.as_os_str().to_str()?);
    }

    Some(parts.join("/"))
}

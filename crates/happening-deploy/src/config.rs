use std::{
    env, io,
    path::{Path, PathBuf},
};

use derive_more::{Display, Error, From};
use figment::{providers::Env, Figment};
use serde::Deserialize;

/// Default upload endpoint for the hosted environment.
pub(crate) const DEFAULT_UPLOAD_URL: &str = "http://happening.im/plugin/";

/// File name of the deploy key sidecar in the packaged directory root.
const DEPLOY_KEY_FILE: &str = ".deploykey";

/// Configuration resolution errors.
#[derive(Debug, Display, From, Error)]
pub(crate) enum ConfigError {
    /// Unable to load the environment overrides with [`figment`].
    Figment(figment::Error),

    /// IO-related error.
    Io(io::Error),

    /// The directory to package does not exist.
    #[display(fmt = "specified directory does not exist: {}", "path.display()")]
    #[from(ignore)]
    MissingDirectory {
        /// The directory as it was specified.
        #[error(not(source))]
        path: PathBuf,
    },

    /// No deploy key could be resolved from any source.
    #[display(
        fmt = "no deploy key specified, specify it as the first argument or put it in the .deploykey file"
    )]
    MissingDeployKey,
}

/// Environment overrides, layered between the CLI arguments and the sidecar
/// files.
///
/// See [`Env`] for more details on how environment variables are mapped; the
/// recognized variables are `DEPLOY_KEY`, `DEPLOY_URL` and `DEPLOY_DIRECTORY`.
///
/// [`Env`]: figment::providers::Env
#[derive(Deserialize)]
struct EnvOverrides {
    /// Deploy key override.
    key: Option<String>,

    /// Upload URL override.
    url: Option<String>,

    /// Directory override.
    directory: Option<String>,
}

/// Fully resolved deployment configuration, immutable after startup.
pub(crate) struct DeployConfig {
    /// Opaque credential appended to the upload URL.
    pub deploy_key: String,

    /// Base upload URL.
    pub url: String,

    /// Canonicalized directory to package.
    pub directory: PathBuf,
}

impl DeployConfig {
    /// Resolve the configuration from the CLI arguments, the `DEPLOY_`
    /// environment variables, the sidecar `.deploykey` file and the built-in
    /// defaults, in that order.
    pub(crate) fn resolve(
        deploy_key: Option<String>,
        url: Option<String>,
        directory: Option<String>,
    ) -> Result<Self, ConfigError> {
        let overrides: EnvOverrides = Figment::new().merge(Env::prefixed("DEPLOY_")).extract()?;

        let directory = match directory.or(overrides.directory) {
            Some(path) => PathBuf::from(path),
            None => env::current_dir()?,
        };

        let directory = directory
            .canonicalize()
            .ok()
            .filter(|path| path.is_dir())
            .ok_or(ConfigError::MissingDirectory { path: directory })?;

        let deploy_key = deploy_key
            .or(overrides.key)
            .or_else(|| read_deploy_key(&directory))
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingDeployKey)?;

        let url = url
            .or(overrides.url)
            .unwrap_or_else(|| DEFAULT_UPLOAD_URL.to_string());

        Ok(Self {
            deploy_key,
            url,
            directory,
        })
    }
}

/// First line of the `.deploykey` sidecar file, if the file is readable.
fn read_deploy_key(directory: &Path) -> Option<String> {
    let contents = std::fs::read_to_string(directory.join(DEPLOY_KEY_FILE)).ok()?;
    contents.lines().next().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch_dir() -> tempfile::TempDir {
        tempfile::Builder::new().prefix("config").tempdir().unwrap()
    }

    fn dir_arg(dir: &tempfile::TempDir) -> Option<String> {
        Some(dir.path().to_string_lossy().into_owned())
    }

    #[test]
    fn explicit_arguments_win() {
        let dir = scratch_dir();

        let config = DeployConfig::resolve(
            Some(String::from("abc123")),
            Some(String::from("http://example.com/up/")),
            dir_arg(&dir),
        )
        .unwrap();

        assert_eq!(config.deploy_key, "abc123");
        assert_eq!(config.url, "http://example.com/up/");
        assert_eq!(config.directory, dir.path().canonicalize().unwrap());
    }

    #[test]
    fn deploy_key_falls_back_to_the_sidecar_file() {
        let dir = scratch_dir();
        fs::write(dir.path().join(".deploykey"), "sekrit\nsecond line\n").unwrap();

        let config = DeployConfig::resolve(None, None, dir_arg(&dir)).unwrap();

        assert_eq!(config.deploy_key, "sekrit");
        assert_eq!(config.url, DEFAULT_UPLOAD_URL);
    }

    #[test]
    fn a_missing_deploy_key_is_fatal() {
        let dir = scratch_dir();

        let result = DeployConfig::resolve(None, None, dir_arg(&dir));

        assert!(matches!(result, Err(ConfigError::MissingDeployKey)));
    }

    #[test]
    fn an_empty_deploy_key_file_is_fatal() {
        let dir = scratch_dir();
        fs::write(dir.path().join(".deploykey"), "\n").unwrap();

        let result = DeployConfig::resolve(None, None, dir_arg(&dir));

        assert!(matches!(result, Err(ConfigError::MissingDeployKey)));
    }

    #[test]
    fn a_missing_directory_is_fatal() {
        let dir = scratch_dir();
        let missing = dir.path().join("nope");

        let result = DeployConfig::resolve(
            Some(String::from("abc123")),
            None,
            Some(missing.to_string_lossy().into_owned()),
        );

        assert!(matches!(result, Err(ConfigError::MissingDirectory { .. })));
    }
}

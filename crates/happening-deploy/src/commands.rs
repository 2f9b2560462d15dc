/// `deploy` pipeline.
mod deploy;

pub(crate) use deploy::deploy;

use clap::Parser;

/// CLI configuration.
///
/// All arguments are positional and optional; each one falls back to an
/// environment variable, a sidecar file in the packaged directory or a
/// built-in default when omitted.
#[derive(Parser)]
#[command(about)]
#[clap(trailing_var_arg = true)]
pub(crate) struct Cli {
    /// Deploy key identifying the upload target; read from the `.deploykey`
    /// file in the packaged directory when omitted.
    pub deploy_key: Option<String>,

    /// Base upload URL the deploy key is appended to.
    pub url: Option<String>,

    /// Directory to package; defaults to the current working directory.
    /// Arguments after this one are appended verbatim to the directory path.
    pub directory: Vec<String>,
}

impl Cli {
    /// Directory argument with any extra trailing arguments concatenated onto
    /// it, preserving the historical behavior of the tool.
    pub(crate) fn directory_arg(&self) -> Option<String> {
        if self.directory.is_empty() {
            None
        } else {
            Some(self.directory.concat())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_arguments_are_assigned_left_to_right() {
        let cli = Cli::try_parse_from(["happening-deploy", "abc123", "http://example.com/up/", "dir"])
            .unwrap();

        assert_eq!(cli.deploy_key.as_deref(), Some("abc123"));
        assert_eq!(cli.url.as_deref(), Some("http://example.com/up/"));
        assert_eq!(cli.directory_arg().as_deref(), Some("dir"));
    }

    #[test]
    fn all_arguments_are_optional() {
        let cli = Cli::try_parse_from(["happening-deploy"]).unwrap();

        assert_eq!(cli.deploy_key, None);
        assert_eq!(cli.url, None);
        assert_eq!(cli.directory_arg(), None);
    }

    #[test]
    fn extra_trailing_arguments_are_appended_to_the_directory() {
        let cli = Cli::try_parse_from(["happening-deploy", "key", "url", "my dir", "suffix"])
            .unwrap();

        assert_eq!(cli.directory_arg().as_deref(), Some("my dirsuffix"));
    }
}

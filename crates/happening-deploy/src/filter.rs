use std::path::Path;

use regex::Regex;

/// File name of the optional ignore sidecar in the packaged directory root.
const IGNORE_FILE: &str = ".deployignore";

/// Compiled set of `.deployignore` patterns.
///
/// Each pattern is one non-empty line of the ignore file. `*` is the only
/// wildcard and matches any substring, path separators included; everything
/// else is literal. A pattern without a directory part matches at any depth,
/// the way archive-tool ignore files behave.
#[derive(Default)]
pub(crate) struct IgnoreSet {
    /// One compiled matcher per ignore-file line.
    patterns: Vec<Regex>,
}

impl IgnoreSet {
    /// Load the ignore set from the `.deployignore` file in `directory`.
    ///
    /// A missing or unreadable ignore file yields an empty set.
    pub(crate) fn load(directory: &Path) -> Result<Self, regex::Error> {
        match std::fs::read_to_string(directory.join(IGNORE_FILE)) {
            Ok(contents) => Self::from_lines(contents.lines()),
            Err(_) => Ok(Self::default()),
        }
    }

    /// Compile one pattern per non-empty line.
    pub(crate) fn from_lines<'a>(
        lines: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, regex::Error> {
        let patterns = lines
            .into_iter()
            .filter(|line| !line.is_empty())
            .map(compile)
            .collect::<Result<_, _>>()?;

        Ok(Self { patterns })
    }

    /// Whether a root-relative path (`/`-separated, no leading separator)
    /// matches any ignore pattern.
    pub(crate) fn is_ignored(&self, relative_path: &str) -> bool {
        self.patterns
            .iter()
            .any(|pattern| pattern.is_match(relative_path))
    }
}

/// Build the matcher for a single ignore pattern.
///
/// The pattern is matched against the full relative path, anchored on both
/// sides, with an optional run of leading path segments in front of it.
fn compile(pattern: &str) -> Result<Regex, regex::Error> {
    let literal = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");

    Regex::new(&format!("^(?:.*/)?{literal}$"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ignore_set(patterns: &[&str]) -> IgnoreSet {
        IgnoreSet::from_lines(patterns.iter().copied()).unwrap()
    }

    #[test]
    fn wildcard_pattern_matches_at_any_depth() {
        let set = ignore_set(&["*.log"]);

        assert!(set.is_ignored("a.log"));
        assert!(set.is_ignored("sub/dir/a.log"));
        assert!(!set.is_ignored("a.log.txt"));
    }

    #[test]
    fn bare_name_matches_at_any_depth() {
        let set = ignore_set(&["build"]);

        assert!(set.is_ignored("build"));
        assert!(set.is_ignored("sub/dir/build"));
        assert!(!set.is_ignored("builds"));
        assert!(!set.is_ignored("prebuild"));
    }

    #[test]
    fn prefix_wildcard_matches_the_rest_of_the_name() {
        let set = ignore_set(&["secret*"]);

        assert!(set.is_ignored("secret.key"));
        assert!(set.is_ignored("conf/secrets"));
        assert!(!set.is_ignored("my-secret.key"));
    }

    #[test]
    fn regex_metacharacters_stay_literal() {
        let set = ignore_set(&["a+b.txt"]);

        assert!(set.is_ignored("a+b.txt"));
        assert!(!set.is_ignored("aab.txt"));
        assert!(!set.is_ignored("a+bxtxt"));
    }

    #[test]
    fn empty_set_ignores_nothing() {
        let set = IgnoreSet::default();

        assert!(!set.is_ignored("anything"));
        assert!(!set.is_ignored("sub/anything"));
    }

    #[test]
    fn empty_lines_are_skipped() {
        let set = IgnoreSet::from_lines("*.log\n\nbuild\n".lines()).unwrap();

        assert!(set.is_ignored("a.log"));
        assert!(set.is_ignored("build"));
        assert!(!set.is_ignored("a.txt"));
    }
}

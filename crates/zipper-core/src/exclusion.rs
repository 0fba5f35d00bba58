//! Exclusion patterns applied during discovery.
//!
//! An [`ExclusionSet`] is built once per run from the default patterns and
//! any user-supplied ones, and never changes afterwards. Patterns are matched
//! against individual path component names, so an excluded directory name
//! excludes everything below it at any depth.

use std::collections::BTreeSet;
use std::path::Path;

/// Names skipped unless the caller opts out of the defaults.
///
/// Covers version-control metadata, dependency and cache directories, OS
/// litter files, editor settings, lock files and previously produced
/// archives.
pub const DEFAULT_EXCLUSIONS: &[&str] = &[
    ".git",
    ".github",
    ".svn",
    ".hg",
    "node_modules",
    "__pycache__",
    ".DS_Store",
    "__MACOSX",
    ".gitignore",
    ".env",
    ".vscode",
    ".idea",
    "*.zip",
    "Thumbs.db",
    "desktop.ini",
    "package-lock.json",
    "yarn.lock",
];

/// Immutable set of name patterns to skip.
///
/// Supported pattern forms:
/// - Exact name: `".git"` matches only a component named `.git`
/// - Suffix wildcard: `"*.zip"` matches names ending with `.zip`
/// - Prefix wildcard: `"temp*"` matches names starting with `temp`
///
/// # Examples
///
/// ```
/// use zipper_core::ExclusionSet;
/// use std::path::Path;
///
/// let set = ExclusionSet::new(["*.log"]);
/// assert!(set.matches_name(".git"));
/// assert!(set.matches_name("debug.log"));
/// assert!(set.matches_path(Path::new("src/node_modules/pkg/index.js")));
/// assert!(!set.matches_path(Path::new("src/main.rs")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionSet {
    patterns: BTreeSet<String>,
}

impl Default for ExclusionSet {
    fn default() -> Self {
        Self::new(std::iter::empty::<&str>())
    }
}

impl ExclusionSet {
    /// Creates the default exclusions unioned with `user` patterns.
    #[must_use]
    pub fn new<I, S>(user: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::only(user);
        set.patterns
            .extend(DEFAULT_EXCLUSIONS.iter().map(|p| (*p).to_string()));
        set
    }

    /// Creates a set containing only `user` patterns, without the defaults.
    ///
    /// Blank patterns are dropped and surrounding whitespace is trimmed.
    #[must_use]
    pub fn only<I, S>(user: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = user
            .into_iter()
            .map(|p| p.as_ref().trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        Self { patterns }
    }

    /// Creates a set that excludes nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            patterns: BTreeSet::new(),
        }
    }

    /// Returns `true` if a single file or directory name is excluded.
    #[must_use]
    pub fn matches_name(&self, name: &str) -> bool {
        self.patterns.iter().any(|p| pattern_matches(name, p))
    }

    /// Returns `true` if any component of `path` is excluded.
    ///
    /// Components that are not valid UTF-8 never match.
    #[must_use]
    pub fn matches_path(&self, path: &Path) -> bool {
        path.components()
            .filter_map(|c| c.as_os_str().to_str())
            .any(|name| self.matches_name(name))
    }

    /// Returns `true` if `pattern` is part of the set.
    #[must_use]
    pub fn contains(&self, pattern: &str) -> bool {
        self.patterns.contains(pattern)
    }

    /// Number of patterns in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Returns `true` if the set excludes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Iterates patterns in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(String::as_str)
    }
}

/// Matches a name against a simple glob pattern.
fn pattern_matches(name: &str, pattern: &str) -> bool {
    if pattern == name {
        return true;
    }

    if let Some(prefix) = pattern.strip_suffix('*') {
        return name.starts_with(prefix);
    }

    if let Some(suffix) = pattern.strip_prefix('*') {
        return name.ends_with(suffix);
    }

    false
}

//! Home-directory placeholder handling
//!
//! Paths written to the project cache replace the user's home directory with
//! the portable `$home` token, so the same cache stays meaningful on another
//! machine or under another user name with the same home-relative layout.
//! Everything held in memory uses the expanded form.

use std::path::{Path, PathBuf};

/// Token substituted for the real home directory in persisted paths
pub const HOME_PLACEHOLDER: &str = "$home";

/// Expands and compacts the home-directory placeholder against a fixed home
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomePath {
    home: String,
}

impl HomePath {
    /// Create a normalizer for the given home directory
    pub fn new(home: impl AsRef<Path>) -> Self {
        let mut home = home.as_ref().to_string_lossy().into_owned();
        while home.len() > 1 && home.ends_with(is_separator) {
            home.pop();
        }
        Self { home }
    }

    /// Create a normalizer for the current user's home directory
    pub fn from_env() -> Self {
        match dirs::home_dir() {
            Some(home) => Self::new(home),
            None => {
                tracing::warn!("Home directory unknown; paths will be stored verbatim");
                Self::new("")
            }
        }
    }

    /// The real home directory this normalizer expands to
    pub fn home(&self) -> &str {
        &self.home
    }

    /// Replace a leading home directory with the placeholder.
    pub fn compact(&self, path: &str) -> String {
        if self.home.is_empty() {
            return path.to_string();
        }
        match strip_prefix_at_boundary(path, &self.home) {
            Some(rest) => format!("{}{}", HOME_PLACEHOLDER, rest),
            None => path.to_string(),
        }
    }

    /// Replace a leading placeholder with the real home directory.
    pub fn expand(&self, path: &str) -> String {
        if self.home.is_empty() {
            return path.to_string();
        }
        match strip_prefix_at_boundary(path, HOME_PLACEHOLDER) {
            Some(rest) => format!("{}{}", self.home, rest),
            None => path.to_string(),
        }
    }

    /// `compact` for a filesystem path
    pub fn compact_path(&self, path: &Path) -> String {
        self.compact(&path.to_string_lossy())
    }

    /// `expand` into a filesystem path
    pub fn expand_path(&self, path: &str) -> PathBuf {
        PathBuf::from(self.expand(path))
    }
}

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

// `/home/al` must not match `/home/alice`
fn strip_prefix_at_boundary<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = path.strip_prefix(prefix)?;
    if rest.is_empty() || rest.starts_with(is_separator) {
        Some(rest)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn home() -> HomePath {
        HomePath::new("/home/alice")
    }

    #[test]
    fn test_compact_under_home() {
        assert_eq!(home().compact("/home/alice/projects/foo"), "$home/projects/foo");
        assert_eq!(home().compact("/home/alice"), "$home");
    }

    #[test]
    fn test_compact_outside_home_is_unchanged() {
        assert_eq!(home().compact("/srv/projects/foo"), "/srv/projects/foo");
        assert_eq!(home().compact("/home/alicia/foo"), "/home/alicia/foo");
        assert_eq!(home().compact("relative/path"), "relative/path");
    }

    #[test]
    fn test_expand_placeholder() {
        assert_eq!(home().expand("$home/projects"), "/home/alice/projects");
        assert_eq!(home().expand("$home"), "/home/alice");
        assert_eq!(home().expand("$homework/x"), "$homework/x");
        assert_eq!(home().expand("/opt/$home"), "/opt/$home");
    }

    #[test]
    fn test_trailing_separator_on_home_is_ignored() {
        let normalizer = HomePath::new("/home/alice/");
        assert_eq!(normalizer.home(), "/home/alice");
        assert_eq!(normalizer.compact("/home/alice/x"), "$home/x");
    }

    #[test]
    fn test_windows_style_separators() {
        let normalizer = HomePath::new(r"C:\Users\alice");
        assert_eq!(normalizer.compact(r"C:\Users\alice\code"), r"$home\code");
        assert_eq!(normalizer.expand(r"$home\code"), r"C:\Users\alice\code");
    }

    #[test]
    fn test_unknown_home_passes_through() {
        let normalizer = HomePath::new("");
        assert_eq!(normalizer.compact("/a/b"), "/a/b");
        assert_eq!(normalizer.expand("$home/b"), "$home/b");
    }

    fn path_under_home() -> impl Strategy<Value = String> {
        prop::collection::vec("[A-Za-z0-9_.-]{1,12}", 0..5)
            .prop_map(|parts| {
                let mut path = "/home/alice".to_string();
                for part in parts {
                    path.push('/');
                    path.push_str(&part);
                }
                path
            })
    }

    proptest! {
        #[test]
        fn prop_round_trip_under_home(path in path_under_home()) {
            let normalizer = home();
            prop_assert_eq!(normalizer.expand(&normalizer.compact(&path)), path);
        }

        #[test]
        fn prop_compact_is_idempotent(path in "(/home/alice)?(/[a-z]{1,8}){0,4}") {
            let normalizer = home();
            let once = normalizer.compact(&path);
            prop_assert_eq!(normalizer.compact(&once), once);
        }

        #[test]
        fn prop_expand_is_idempotent(path in "(\\$home)?(/[a-z]{1,8}){0,4}") {
            let normalizer = home();
            let once = normalizer.expand(&path);
            prop_assert_eq!(normalizer.expand(&once), once);
        }
    }
}

//! Environment mapping - process variables, `.env` overlay and `VITE_` bridging.
//!
//! Nothing here touches the process environment after the initial snapshot.
//! Each step takes an [`Env`] and returns a new one, and the final mapping is
//! passed explicitly to whoever needs configuration.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

/// Prefix stripped by [`Env::bridge_vite_variables`].
pub const VITE_PREFIX: &str = "VITE_";

/// An ordered name -> value mapping of environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Env {
    vars: BTreeMap<String, String>,
}

/// Outcome of looking for a `.env` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DotenvStatus {
    pub path: PathBuf,
    pub found: bool,
    pub loaded: usize,
}

impl Env {
    /// Snapshot the current process environment. Variables whose name or value
    /// is not valid UTF-8 are skipped.
    pub fn from_process() -> Self {
        std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Insert `value` under `key` unless the key is already present.
    /// Returns whether the value was inserted.
    pub fn set_if_absent(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let key = key.into();
        if self.vars.contains_key(&key) {
            return false;
        }
        self.vars.insert(key, value.into());
        true
    }

    /// Overlay the `.env` file at `path`. Variables already present win.
    ///
    /// A missing file is normal. An unreadable file or a malformed line is
    /// logged and skipped.
    pub fn with_dotenv(mut self, path: &Path) -> (Self, DotenvStatus) {
        let mut status = DotenvStatus {
            path: path.to_path_buf(),
            found: false,
            loaded: 0,
        };

        let iter = match dotenvy::from_path_iter(path) {
            Ok(iter) => iter,
            Err(e) if e.not_found() => {
                debug!(path = %path.display(), "No .env file");
                return (self, status);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to open .env file");
                return (self, status);
            }
        };

        status.found = true;
        for item in iter {
            match item {
                Ok((key, value)) => {
                    if self.set_if_absent(key, value) {
                        status.loaded += 1;
                    }
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping unparsable .env entry");
                }
            }
        }

        debug!(path = %path.display(), loaded = status.loaded, "Loaded .env file");
        (self, status)
    }

    /// Copy every `VITE_FOO` to `FOO` when `FOO` is not already present.
    ///
    /// Keys are taken from a snapshot in map order, so a name created by
    /// bridging (e.g. `VITE_X` from `VITE_VITE_X`) is not bridged again.
    pub fn bridge_vite_variables(mut self) -> Self {
        let prefixed: Vec<(String, String)> = self
            .vars
            .iter()
            .filter(|(k, _)| k.starts_with(VITE_PREFIX))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        for (key, value) in prefixed {
            let bare = &key[VITE_PREFIX.len()..];
            if self.set_if_absent(bare, value) {
                debug!(from = %key, to = %bare, "Bridged variable");
            }
        }

        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Env {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Location of the `.env` file: two directories above the directory holding
/// the executable (`target/release/mcp-proxy` -> `./.env`).
pub fn default_dotenv_path() -> PathBuf {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."));
    normalize(&exe_dir.join("..").join("..").join(".env"))
}

/// Resolve `.` and `..` without touching the filesystem. A `..` that would
/// climb past the root or a leading `..` in a relative path is kept.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> Env {
        pairs.iter().copied().collect()
    }

    #[test]
    fn bridge_copies_prefixed_variable() {
        let bridged = env(&[("VITE_API_KEY", "secret")]).bridge_vite_variables();
        assert_eq!(bridged.get("API_KEY"), Some("secret"));
        assert_eq!(bridged.get("VITE_API_KEY"), Some("secret"));
    }

    #[test]
    fn bridge_keeps_existing_value() {
        let bridged = env(&[("VITE_API_KEY", "from-vite"), ("API_KEY", "original")])
            .bridge_vite_variables();
        assert_eq!(bridged.get("API_KEY"), Some("original"));
    }

    #[test]
    fn bridge_treats_empty_value_as_set() {
        let bridged = env(&[("VITE_API_KEY", "from-vite"), ("API_KEY", "")])
            .bridge_vite_variables();
        assert_eq!(bridged.get("API_KEY"), Some(""));
    }

    #[test]
    fn bridge_ignores_unprefixed_and_lowercase() {
        let before = env(&[("vite_TOKEN", "a"), ("MY_VITE_TOKEN", "b"), ("PATH", "/bin")]);
        let after = before.clone().bridge_vite_variables();
        assert_eq!(before, after);
    }

    #[test]
    fn bridge_does_not_cascade() {
        let bridged = env(&[("VITE_VITE_X", "1")]).bridge_vite_variables();
        assert_eq!(bridged.get("VITE_X"), Some("1"));
        assert_eq!(bridged.get("X"), None);
    }

    #[test]
    fn bridge_bare_prefix_maps_to_empty_name() {
        let bridged = env(&[("VITE_", "v")]).bridge_vite_variables();
        assert_eq!(bridged.get(""), Some("v"));
    }

    #[test]
    fn dotenv_missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        let (loaded, status) = env(&[("A", "1")]).with_dotenv(&path);
        assert!(!status.found);
        assert_eq!(status.loaded, 0);
        assert_eq!(status.path, path);
        assert_eq!(loaded, env(&[("A", "1")]));
    }

    #[test]
    fn dotenv_does_not_override_existing() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# comment").unwrap();
        writeln!(file, "MCP_PROXY_TEST_A=from-file").unwrap();
        writeln!(file, "MCP_PROXY_TEST_B=\"quoted value\"").unwrap();
        file.flush().unwrap();

        let (loaded, status) = env(&[("MCP_PROXY_TEST_A", "from-env")]).with_dotenv(file.path());
        assert!(status.found);
        assert_eq!(status.loaded, 1);
        assert_eq!(loaded.get("MCP_PROXY_TEST_A"), Some("from-env"));
        assert_eq!(loaded.get("MCP_PROXY_TEST_B"), Some("quoted value"));
    }

    #[test]
    fn dotenv_then_bridge() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "VITE_MCP_PROXY_TEST_URL=http://localhost:8000/sse").unwrap();
        file.flush().unwrap();

        let (loaded, _) = Env::default().with_dotenv(file.path());
        let bridged = loaded.bridge_vite_variables();
        assert_eq!(
            bridged.get("MCP_PROXY_TEST_URL"),
            Some("http://localhost:8000/sse")
        );
    }

    #[test]
    fn default_dotenv_path_ends_with_env() {
        let path = default_dotenv_path();
        assert!(path.ends_with(".env"));
        assert!(!path.components().any(|c| c == Component::ParentDir));
    }

    #[test]
    fn normalize_resolves_parent_components() {
        assert_eq!(
            normalize(Path::new("/opt/app/target/release/../../.env")),
            PathBuf::from("/opt/app/.env")
        );
        assert_eq!(normalize(Path::new("./a/./b/../.env")), PathBuf::from("a/.env"));
    }

    #[test]
    fn normalize_keeps_unresolvable_parents() {
        assert_eq!(normalize(Path::new("/../.env")), PathBuf::from("/.env"));
        assert_eq!(normalize(Path::new("../../.env")), PathBuf::from("../../.env"));
    }
}

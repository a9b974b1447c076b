use std::collections::HashMap;
use std::env as stdenv;
use std::path::PathBuf;

/// Snapshot of the process environment a session runs against.
///
/// The environment contains:
/// - `vars`: the complete set of variables spawned tools see, and the source
///   of `EDITOR`, `PATH`, `HOME` and `XDG_CACHE_HOME` lookups. Variables whose
///   name or value is not valid Unicode are left out.
/// - `current_dir`: the working directory spawned tools start in.
///
/// Tests build one by hand to control exactly what the session sees.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Key-value store of environment variables (e.g., PATH, HOME).
    pub vars: HashMap<String, String>,
    /// The working directory for spawned processes.
    pub current_dir: PathBuf,
}

impl Environment {
    /// Capture the current process state.
    pub fn new() -> Self {
        let vars = stdenv::vars_os()
            .filter_map(|(key, val)| match (key.into_string(), val.into_string()) {
                (Ok(key), Ok(val)) => Some((key, val)),
                (key, _) => {
                    tracing::debug!(?key, "skipping non-unicode environment variable");
                    None
                }
            })
            .collect();
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self { vars, current_dir }
    }

    /// An environment with no variables at all.
    pub fn empty() -> Self {
        Self {
            vars: HashMap::new(),
            current_dir: stdenv::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// Get the value of a variable. Unlike the process environment, a
    /// variable removed from the snapshot stays removed.
    pub fn get_var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }

    /// Set or override a variable.
    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }

    pub fn remove_var(&mut self, key: &str) {
        self.vars.remove(key);
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::Environment;

    #[test]
    fn test_env_set_and_get_var() {
        let mut env = Environment::empty();

        // initially absent
        assert_eq!(env.get_var("SOME_RANDOM_ENV_VAR_12345"), None);

        env.set_var("KEY", "VALUE");
        assert_eq!(env.get_var("KEY"), Some("VALUE".to_string()));

        env.remove_var("KEY");
        assert_eq!(env.get_var("KEY"), None);
    }

    #[test]
    fn test_env_reads_from_process_env() {
        let env = Environment::new();
        assert!(env.get_var("PATH").is_some());
    }

    #[test]
    #[cfg(unix)]
    fn test_non_unicode_variable_is_skipped() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let key = "RUNC_TEST_NON_UNICODE_VALUE";
        // SAFETY: the key is unique to this test and nothing else reads it.
        unsafe { std::env::set_var(key, OsStr::from_bytes(b"\xff\xfe")) };
        let env = Environment::new();
        unsafe { std::env::remove_var(key) };

        assert_eq!(env.get_var(key), None);
        assert!(env.get_var("PATH").is_some());
    }

    #[test]
    fn test_removed_var_does_not_fall_back_to_process() {
        let mut env = Environment::new();
        env.remove_var("PATH");
        assert_eq!(env.get_var("PATH"), None);
    }
}

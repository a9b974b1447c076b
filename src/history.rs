//! Per-language history: the last successfully run source for each language.
//!
//! Layout: one flat file per language, `<cache>/runc_cache/runc_cache<ext>`,
//! overwritten in place after every successful run.

use crate::env::Environment;
use crate::error::RuncError;
use crate::registry::LanguageSpec;
use crate::snippets;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the tool's cache subdirectory and prefix of every history file.
pub const CACHE_NAME: &str = "runc_cache";

#[derive(Debug, Clone)]
pub struct HistoryStore {
    dir: Option<PathBuf>,
}

impl HistoryStore {
    /// A store rooted at `dir`; `None` means history is unavailable and every
    /// load falls back to the default snippet.
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self { dir }
    }

    pub fn disabled() -> Self {
        Self { dir: None }
    }

    pub fn from_env(env: &Environment) -> Self {
        Self::new(cache_dir(env))
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    pub fn file_for(&self, spec: &LanguageSpec) -> Option<PathBuf> {
        let dir = self.dir.as_ref()?;
        Some(dir.join(format!("{CACHE_NAME}{}", spec.extension)))
    }

    /// Content to seed the editor with.
    ///
    /// `fresh` ignores whatever was saved before and starts from the snippet.
    pub fn load(&self, spec: &LanguageSpec, fresh: bool) -> Result<Vec<u8>, RuncError> {
        let default = || snippets::default_for(spec.key).as_bytes().to_vec();
        if fresh {
            return Ok(default());
        }
        match self.file_for(spec) {
            Some(file) if file.is_file() => {
                tracing::debug!(file = %file.display(), "loading history");
                fs::read(&file).map_err(RuncError::file("could not read history", file))
            }
            _ => Ok(default()),
        }
    }

    /// Copy the final content of `source` into the history file.
    ///
    /// `temporary` runs leave the history untouched.
    pub fn save(
        &self,
        spec: &LanguageSpec,
        source: &Path,
        temporary: bool,
    ) -> Result<(), RuncError> {
        if temporary {
            return Ok(());
        }
        let Some(target) = self.file_for(spec) else {
            return Ok(());
        };
        let content = fs::read(source).map_err(RuncError::file("could not read", source))?;
        fs::write(&target, &content)
            .map_err(RuncError::file("could not write history", &target))?;
        tracing::debug!(file = %target.display(), bytes = content.len(), "saved history");

        // Keep the modification time of the edited file, like a metadata-preserving copy.
        let copied = fs::metadata(source)
            .and_then(|meta| meta.modified())
            .and_then(|modified| {
                fs::File::options()
                    .write(true)
                    .open(&target)?
                    .set_modified(modified)
            });
        if let Err(err) = copied {
            tracing::debug!(%err, "could not copy modification time to history");
        }
        Ok(())
    }
}

/// Locate (and create) the history directory.
///
/// `XDG_CACHE_HOME` wins; otherwise `$HOME/.cache`. The base directory must
/// already exist; only the `runc_cache` subdirectory is created. Any failure
/// means "no history", never an error.
pub fn cache_dir(env: &Environment) -> Option<PathBuf> {
    let base = match env.get_var("XDG_CACHE_HOME").filter(|v| !v.is_empty()) {
        Some(dir) => PathBuf::from(dir),
        None => home_dir(env)?.join(".cache"),
    };
    if !base.is_dir() {
        tracing::debug!(base = %base.display(), "cache base missing, history disabled");
        return None;
    }
    let dir = base.join(CACHE_NAME);
    if !dir.is_dir() {
        if let Err(err) = fs::create_dir(&dir) {
            tracing::warn!(dir = %dir.display(), %err, "cannot create cache directory, history disabled");
            return None;
        }
    }
    Some(dir)
}

fn home_dir(env: &Environment) -> Option<PathBuf> {
    env.get_var("HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::resolve;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> HistoryStore {
        HistoryStore::new(Some(dir.path().to_path_buf()))
    }

    fn edited(dir: &TempDir, content: &[u8]) -> PathBuf {
        let path = dir.path().join("edited");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_round_trip_is_byte_identical() {
        let cache = TempDir::new().unwrap();
        let scratch = TempDir::new().unwrap();
        let history = store(&cache);
        let spec = resolve("python").unwrap();
        let content = b"print('hi')\n\xff\x00tail";

        history.save(spec, &edited(&scratch, content), false).unwrap();
        assert_eq!(history.load(spec, false).unwrap(), content);
        assert_eq!(
            history.file_for(spec).unwrap(),
            cache.path().join("runc_cache.py")
        );
    }

    #[test]
    fn test_fresh_ignores_saved_content() {
        let cache = TempDir::new().unwrap();
        let scratch = TempDir::new().unwrap();
        let history = store(&cache);
        let spec = resolve("c").unwrap();

        history.save(spec, &edited(&scratch, b"int main;"), false).unwrap();
        let loaded = history.load(spec, true).unwrap();
        assert_eq!(loaded, snippets::default_for("c").as_bytes());
    }

    #[test]
    fn test_temporary_never_writes() {
        let cache = TempDir::new().unwrap();
        let scratch = TempDir::new().unwrap();
        let history = store(&cache);
        let spec = resolve("rust").unwrap();

        history.save(spec, &edited(&scratch, b"fn main() {}"), false).unwrap();
        history.save(spec, &edited(&scratch, b"changed"), true).unwrap();
        assert_eq!(history.load(spec, false).unwrap(), b"fn main() {}");
    }

    #[test]
    fn test_missing_file_loads_default() {
        let cache = TempDir::new().unwrap();
        let spec = resolve("go").unwrap();
        let loaded = store(&cache).load(spec, false).unwrap();
        assert_eq!(loaded, snippets::default_for("go").as_bytes());
    }

    #[test]
    fn test_disabled_store_loads_default_and_saves_nothing() {
        let scratch = TempDir::new().unwrap();
        let history = HistoryStore::disabled();
        let spec = resolve("python").unwrap();
        history.save(spec, &edited(&scratch, b"x = 1"), false).unwrap();
        assert!(history.file_for(spec).is_none());
        assert_eq!(
            history.load(spec, false).unwrap(),
            snippets::default_for("python").as_bytes()
        );
    }

    #[test]
    fn test_save_overwrites_in_place() {
        let cache = TempDir::new().unwrap();
        let scratch = TempDir::new().unwrap();
        let history = store(&cache);
        let spec = resolve("python").unwrap();
        history.save(spec, &edited(&scratch, b"a much longer first version"), false).unwrap();
        history.save(spec, &edited(&scratch, b"short"), false).unwrap();
        assert_eq!(history.load(spec, false).unwrap(), b"short");
    }

    #[test]
    fn test_save_of_missing_source_is_file_error() {
        let cache = TempDir::new().unwrap();
        let spec = resolve("python").unwrap();
        let err = store(&cache)
            .save(spec, &cache.path().join("gone"), false)
            .unwrap_err();
        assert!(matches!(err, RuncError::File { .. }));
    }

    #[test]
    fn test_cache_dir_prefers_xdg_and_creates_subdir() {
        let base = TempDir::new().unwrap();
        let mut env = Environment::empty();
        env.set_var("XDG_CACHE_HOME", base.path().to_string_lossy());
        env.set_var("HOME", "/nonexistent-home");

        let dir = cache_dir(&env).unwrap();
        assert_eq!(dir, base.path().join(CACHE_NAME));
        assert!(dir.is_dir());
        // second call reuses it
        assert_eq!(cache_dir(&env).unwrap(), dir);
    }

    #[test]
    fn test_cache_dir_falls_back_to_home() {
        let home = TempDir::new().unwrap();
        fs::create_dir(home.path().join(".cache")).unwrap();
        let mut env = Environment::empty();
        env.set_var("HOME", home.path().to_string_lossy());

        let dir = cache_dir(&env).unwrap();
        assert_eq!(dir, home.path().join(".cache").join(CACHE_NAME));
    }

    #[test]
    fn test_cache_dir_requires_existing_base() {
        let home = TempDir::new().unwrap();
        let mut env = Environment::empty();
        env.set_var("HOME", home.path().to_string_lossy());
        assert!(cache_dir(&env).is_none());
        assert!(HistoryStore::from_env(&env).dir().is_none());
    }
}

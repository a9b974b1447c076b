//! One invocation from language name to captured output.
//!
//! The lifecycle is linear and fails fast:
//! resolve language, check required tools, find the editor, load content,
//! write the scratch source, edit, run, save history. Whatever happens, the
//! scratch source and every build artifact are removed before [`run`]
//! returns.

use crate::editor::Editor;
use crate::env::Environment;
use crate::error::{RuncError, Status};
use crate::external::RunResult;
use crate::history::HistoryStore;
use crate::registry::{self, LanguageSpec};
use crate::strategy::{self, Artifacts, Invocation, STEM};
use std::fs;
use std::path::{Path, PathBuf};

/// Already-parsed inputs of one session.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub language: String,
    /// Flags for the compiler or interpreter.
    pub extra_args: Vec<String>,
    /// Arguments for the program being run.
    pub program_args: Vec<String>,
    /// Do not write history.
    pub temporary: bool,
    /// Do not read history; start from the default snippet.
    pub fresh: bool,
    /// Where the scratch source and artifacts go; the system temp directory
    /// when unset. File names inside it are fixed, so two sessions for the
    /// same language sharing a directory overwrite each other.
    pub work_dir: Option<PathBuf>,
}

/// Split an `--args`/`--argv` value on single spaces, dropping empty pieces.
pub fn split_args(value: Option<&str>) -> Vec<String> {
    value
        .map(|s| {
            s.split(' ')
                .filter(|piece| !piece.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Run a full session and return the final process result.
///
/// A program that exits non-zero is reported as [`RuncError::Code`] carrying
/// the failing stage's output.
pub fn run(
    env: &Environment,
    history: &HistoryStore,
    options: &SessionOptions,
) -> Result<RunResult, RuncError> {
    let spec = registry::resolve(&options.language)?;
    registry::check_requirements(spec, env)?;
    let editor = Editor::from_env(env)?;

    let work_dir = options
        .work_dir
        .clone()
        .unwrap_or_else(std::env::temp_dir);
    let mut session = Session::new(env, history, spec, &work_dir);
    let outcome = session.drive(&editor, options);
    session.teardown(&outcome);
    outcome
}

struct Session<'a> {
    env: &'a Environment,
    history: &'a HistoryStore,
    spec: &'static LanguageSpec,
    work_dir: &'a Path,
    source: PathBuf,
    artifacts: Artifacts,
}

impl<'a> Session<'a> {
    fn new(
        env: &'a Environment,
        history: &'a HistoryStore,
        spec: &'static LanguageSpec,
        work_dir: &'a Path,
    ) -> Self {
        let mut artifacts = Artifacts::new();
        let source = artifacts.register(work_dir.join(format!("{STEM}{}", spec.extension)));
        Self {
            env,
            history,
            spec,
            work_dir,
            source,
            artifacts,
        }
    }

    fn drive(
        &mut self,
        editor: &Editor,
        options: &SessionOptions,
    ) -> Result<RunResult, RuncError> {
        let content = self.history.load(self.spec, options.fresh)?;
        fs::write(&self.source, &content)
            .map_err(RuncError::file("could not write", &self.source))?;

        editor.open(self.env, &self.source)?;

        let inv = Invocation {
            env: self.env,
            source: &self.source,
            work_dir: self.work_dir,
            extra_args: &options.extra_args,
            program_args: &options.program_args,
        };
        let result = strategy::execute(&self.spec.strategy, &inv, &mut self.artifacts)?;
        if !result.success() {
            return Err(RuncError::Code { result });
        }

        self.history.save(self.spec, &self.source, options.temporary)?;
        Ok(result)
    }

    fn teardown(&mut self, outcome: &Result<RunResult, RuncError>) {
        let status = match outcome {
            Ok(_) => Status::Ok,
            Err(err) => err.status(),
        };
        tracing::debug!(
            language = self.spec.key,
            ?status,
            artifacts = self.artifacts.paths().len(),
            "session teardown"
        );
        self.artifacts.cleanup();
    }
}

#[cfg(test)]
mod split_tests {
    use super::split_args;

    #[test]
    fn test_split_args() {
        assert!(split_args(None).is_empty());
        assert!(split_args(Some("")).is_empty());
        assert_eq!(split_args(Some("-O2 -g")), vec!["-O2", "-g"]);
        assert_eq!(split_args(Some(" a  b ")), vec!["a", "b"]);
    }

    #[test]
    fn test_split_keeps_tabs_inside_pieces() {
        assert_eq!(split_args(Some("a\tb c")), vec!["a\tb", "c"]);
    }
}

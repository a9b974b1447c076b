use crate::env::Environment;
use crate::error::RuncError;
use crate::external;
use std::ffi::OsStr;
use std::path::Path;
use std::process::Command;

/// The user's editor, taken from `EDITOR`.
///
/// The variable may carry arguments (`code --wait`); it is split on
/// whitespace and the first word is the program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Editor {
    program: String,
    args: Vec<String>,
}

impl Editor {
    pub fn from_env(env: &Environment) -> Result<Self, RuncError> {
        let value = env.get_var("EDITOR").unwrap_or_default();
        let mut words = value.split_whitespace().map(str::to_string);
        let program = words.next().ok_or_else(|| {
            RuncError::Editor(
                "Could not determine editor. Try setting EDITOR environment variable.".to_string(),
            )
        })?;
        Ok(Self {
            program,
            args: words.collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Open `file` and block until the editor exits.
    ///
    /// The editor owns the terminal: stdin, stdout and stderr are inherited.
    pub fn open(&self, env: &Environment, file: &Path) -> Result<(), RuncError> {
        let executable = external::resolve(env, OsStr::new(&self.program)).ok_or_else(|| {
            RuncError::Editor(format!(
                "failed to start the editor {}. make sure it is in PATH",
                self.program
            ))
        })?;
        tracing::debug!(editor = %executable.display(), file = %file.display(), "opening editor");

        let status = Command::new(&*executable)
            .args(&self.args)
            .arg(file)
            .env_clear()
            .envs(env.vars.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .current_dir(&env.current_dir)
            .status()
            .map_err(|err| {
                RuncError::Editor(format!("failed to start the editor {}: {}", self.program, err))
            })?;

        if status.success() {
            return Ok(());
        }
        Err(RuncError::Editor(match status.code() {
            Some(code) => format!(
                "Failed to run the editor. Command {} {} failed with {}",
                self.program,
                file.display(),
                code
            ),
            None => "editor was closed with a signal".to_string(),
        }))
    }
}

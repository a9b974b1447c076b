//! Run strategies: the process pipelines that turn a source file into output.
//!
//! Every strategy is a straight sequence of external processes. The first
//! stage that exits non-zero ends the pipeline and its [`RunResult`] is what
//! the caller gets back; on success the caller gets the result of the last
//! stage. Files produced along the way are registered in [`Artifacts`] before
//! the process that creates them is started.

use crate::env::Environment;
use crate::error::RuncError;
use crate::external::{RunResult, capture};
use crate::registry::{OutputFlag, Strategy};
use anyhow::anyhow;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// File stem shared by the scratch source file and every build artifact.
pub const STEM: &str = "runc_runner";

/// Inputs shared by every strategy for one run.
pub struct Invocation<'a> {
    pub env: &'a Environment,
    pub source: &'a Path,
    /// Directory the scratch files are written to.
    pub work_dir: &'a Path,
    /// `--args`: handed to the compiler, assembler or interpreter.
    pub extra_args: &'a [String],
    /// `--argv`: handed to the program itself.
    pub program_args: &'a [String],
}

/// Paths created during a session that must not outlive it.
///
/// Each registered path is removed at most once: [`Artifacts::cleanup`] drains
/// the list, and dropping the list runs the same cleanup for any exit path
/// that never reached it.
#[derive(Debug, Default)]
pub struct Artifacts {
    paths: Vec<PathBuf>,
}

impl Artifacts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `path` for removal and hand it back.
    pub fn register(&mut self, path: PathBuf) -> PathBuf {
        if !self.paths.contains(&path) {
            self.paths.push(path.clone());
        }
        path
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Delete every registered path that still exists.
    pub fn cleanup(&mut self) {
        for path in self.paths.drain(..) {
            if !path.exists() {
                continue;
            }
            match std::fs::remove_file(&path) {
                Ok(()) => tracing::debug!(path = %path.display(), "removed artifact"),
                Err(err) => {
                    tracing::warn!(path = %path.display(), %err, "failed to remove artifact")
                }
            }
        }
    }
}

impl Drop for Artifacts {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// Run `strategy` for one invocation.
///
/// A failing stage is not an error here: its `RunResult` comes back like any
/// other. `Err` means a tool could not be started at all.
pub fn execute(
    strategy: &Strategy,
    inv: &Invocation<'_>,
    artifacts: &mut Artifacts,
) -> Result<RunResult, RuncError> {
    match *strategy {
        Strategy::Direct { command } => {
            let (program, fixed) = split_command(command)?;
            let mut args = os_args(fixed);
            args.extend(os_args(inv.extra_args));
            args.push(inv.source.as_os_str().to_owned());
            args.extend(os_args(inv.program_args));
            capture(inv.env, OsStr::new(program), &args, None)
        }

        Strategy::Compile {
            compiler,
            flags,
            output,
        } => {
            let executable = artifacts.register(inv.work_dir.join(format!("{STEM}.out")));
            let compiled = compile(inv, compiler, flags, output, &executable)?;
            if !compiled.success() {
                return Ok(compiled);
            }
            capture(
                inv.env,
                executable.as_os_str(),
                &os_args(inv.program_args),
                None,
            )
        }

        Strategy::CompileHost {
            compiler,
            flags,
            output,
            artifact,
            host,
        } => {
            let compiled_path = artifacts.register(inv.work_dir.join(artifact));
            let compiled = compile(inv, compiler, flags, output, &compiled_path)?;
            if !compiled.success() {
                return Ok(compiled);
            }
            let (program, fixed) = split_command(host)?;
            let mut args = os_args(fixed);
            args.push(compiled_path.into_os_string());
            args.extend(os_args(inv.program_args));
            capture(inv.env, OsStr::new(program), &args, None)
        }

        Strategy::AssembleLink {
            assembler,
            assembler_flags,
            linker,
            linker_flags,
        } => {
            let object = artifacts.register(inv.work_dir.join(format!("{STEM}.o")));
            let executable = artifacts.register(inv.work_dir.join(format!("{STEM}.out")));

            let assembled = compile(
                inv,
                assembler,
                assembler_flags,
                OutputFlag::Separate("-o"),
                &object,
            )?;
            if !assembled.success() {
                return Ok(assembled);
            }

            let mut args = os_args(linker_flags);
            args.push(object.into_os_string());
            args.push("-o".into());
            args.push(executable.as_os_str().to_owned());
            let linked = capture(inv.env, OsStr::new(linker), &args, None)?;
            if !linked.success() {
                return Ok(linked);
            }

            capture(
                inv.env,
                executable.as_os_str(),
                &os_args(inv.program_args),
                None,
            )
        }

        Strategy::HostBootstrap {
            compiler,
            flags,
            output,
            artifact,
            host,
            bootstrap,
        } => {
            let module = artifacts.register(inv.work_dir.join(artifact));
            let compiled = compile(inv, compiler, flags, output, &module)?;
            if !compiled.success() {
                return Ok(compiled);
            }
            let (program, fixed) = split_command(host)?;
            let mut args = os_args(fixed);
            args.extend(os_args(inv.program_args));
            let script = render_bootstrap(bootstrap, &module);
            capture(
                inv.env,
                OsStr::new(program),
                &args,
                Some(script.as_bytes()),
            )
        }
    }
}

/// `<tool> <flags> <extra> <source> <output flag>`.
fn compile(
    inv: &Invocation<'_>,
    tool: &str,
    flags: &[&str],
    output: OutputFlag,
    out: &Path,
) -> Result<RunResult, RuncError> {
    let mut args = os_args(flags);
    args.extend(os_args(inv.extra_args));
    args.push(inv.source.as_os_str().to_owned());
    match output {
        OutputFlag::Separate(flag) => {
            args.push(flag.into());
            args.push(out.as_os_str().to_owned());
        }
        OutputFlag::Joined(flag) => {
            let mut joined = OsString::from(flag);
            joined.push(out.as_os_str());
            args.push(joined);
        }
    }
    capture(inv.env, OsStr::new(tool), &args, None)
}

/// Substitute the quoted module path into a bootstrap template.
pub fn render_bootstrap(template: &str, module: &Path) -> String {
    template.replace("{module}", &format!("{:?}", module.to_string_lossy()))
}

fn split_command<'a>(command: &'a [&'a str]) -> Result<(&'a str, &'a [&'a str]), RuncError> {
    command
        .split_first()
        .map(|(program, rest)| (*program, rest))
        .ok_or_else(|| RuncError::Internal(anyhow!("strategy has an empty command")))
}

fn os_args<S: AsRef<OsStr>>(args: &[S]) -> Vec<OsString> {
    args.iter().map(|arg| arg.as_ref().to_owned()).collect()
}

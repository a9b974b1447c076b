use crate::env::Environment;
use crate::error::RuncError;
use std::borrow::Cow;
use std::ffi::{OsStr, OsString};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

/// Outcome of one external process: its exit code and everything it wrote.
///
/// Output is kept as raw bytes. Compilers and user programs are free to print
/// anything, so nothing here assumes valid UTF-8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    /// Command line as it was spawned, for messages.
    pub command: String,
    pub code: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl RunResult {
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

/// Spawn `program` with `args`, wait for it, and capture stdout and stderr.
///
/// The program is resolved through the `PATH` of `env`; the child sees exactly
/// the variables of `env` and starts in its working directory. When `stdin` is given it is fed
/// to the child and the pipe closed, otherwise the child gets no input.
pub fn capture(
    env: &Environment,
    program: &OsStr,
    args: &[OsString],
    stdin: Option<&[u8]>,
) -> Result<RunResult, RuncError> {
    let command = display_command(program, args);
    let executable = resolve(env, program).ok_or_else(|| RuncError::Spawn {
        program: program.to_string_lossy().into_owned(),
        source: std::io::Error::from(ErrorKind::NotFound),
    })?;
    tracing::debug!(%command, executable = %executable.display(), "spawning");

    let spawn_err = |source| RuncError::Spawn {
        program: program.to_string_lossy().into_owned(),
        source,
    };
    let mut child = Command::new(&*executable)
        .args(args)
        .env_clear()
        .envs(env.vars.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .current_dir(&env.current_dir)
        .stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(spawn_err)?;

    if let Some(input) = stdin {
        if let Some(mut child_stdin) = child.stdin.take() {
            // A child that exits before reading everything still gets its
            // own exit code and output reported.
            match child_stdin.write_all(input) {
                Err(err) if err.kind() == ErrorKind::BrokenPipe => {
                    tracing::debug!(%command, "child closed stdin early");
                }
                result => result.map_err(spawn_err)?,
            }
        }
    }

    let output = child.wait_with_output().map_err(spawn_err)?;
    let code = exit_code(output.status);
    if code != 0 {
        tracing::info!(%command, code, "process exited with failure");
    }
    Ok(RunResult {
        command,
        code,
        stdout: output.stdout,
        stderr: output.stderr,
    })
}

/// Resolve `program` against the `PATH` recorded in `env`.
pub fn resolve<'a>(env: &Environment, program: &'a OsStr) -> Option<Cow<'a, Path>> {
    let search_paths = env.get_var("PATH").unwrap_or_default();
    find_command_path(OsStr::new(&search_paths), Path::new(program))
}

fn display_command(program: &OsStr, args: &[OsString]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(OsString::as_os_str))
        .map(OsStr::to_string_lossy)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Exit code of a finished process; signals are folded into the code the way
/// shells report them.
pub fn exit_code(status: ExitStatus) -> i32 {
    match status.code() {
        Some(x) => x,
        None => terminated_by_signal(status),
    }
}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = ExitStatusExt::signal(&exit_status) {
        128 + signal
    } else if ExitStatusExt::core_dumped(&exit_status) {
        255
    } else {
        -1
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> i32 {
    -1
}

/// Locate a tool or editor executable.
///
/// Absolute paths and paths with several components (`./bin/gcc`) must name an
/// existing file. A bare name such as `gcc` is looked up in each directory of
/// `search_paths` in order. An empty path finds nothing.
pub fn find_command_path<'a>(search_paths: &OsStr, path: &'a Path) -> Option<Cow<'a, Path>> {
    if path.is_absolute() {
        return find_by_path(path).map(Cow::Borrowed);
    }

    let search_in_current_dir = cfg!(not(unix)) || path.starts_with("./");
    if search_in_current_dir && path.exists() {
        return Some(Cow::Borrowed(path));
    }

    let mut components = path.components();
    let first = components.next();
    let second = components.next();
    match (first, second) {
        (None, None) => None,
        (Some(x), None) => find_in_path(search_paths, x.as_os_str()).map(Cow::Owned),
        _ => find_by_path(path).map(Cow::Borrowed),
    }
}

fn find_in_path(search_paths: &OsStr, cmd: &OsStr) -> Option<PathBuf> {
    for dir in std::env::split_paths(search_paths) {
        let path = dir.join(cmd);
        if let Some(path) = find_by_path(&path) {
            return Some(path.to_owned());
        }
    }
    None
}

fn find_by_path(path: &Path) -> Option<&Path> {
    if path.is_file() { Some(path) } else { None }
}

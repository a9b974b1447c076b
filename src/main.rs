use anyhow::Context;
use argh::{EarlyExit, FromArgs};
use runc::render::{Renderer, print_result};
use runc::session::{self, split_args};
use runc::{
    Environment, HistoryStore, RuncError, SessionOptions, Status, logging, picker, registry,
};
use std::process::ExitCode;

#[derive(FromArgs)]
/// Open the EDITOR. Write some code. Have it executed.
struct Args {
    #[argh(positional)]
    /// language to be run
    lang: Option<String>,

    #[argh(option)]
    /// space separated list of arguments to be passed to the compiler or the interpreter
    args: Option<String>,

    #[argh(option)]
    /// space separated list of arguments to be passed to the executed program
    argv: Option<String>,

    #[argh(switch, short = 't')]
    /// run without saving to the language history
    temp: bool,

    #[argh(switch, short = 'n')]
    /// ignore the language history and start from the default snippet
    new_history: bool,

    #[argh(switch, short = 'l')]
    /// list available languages
    ls: bool,

    #[argh(switch, short = 'a')]
    /// list available language aliases
    aliases: bool,

    #[argh(switch, short = 'p')]
    /// choose the language at an interactive prompt
    pick: bool,

    #[argh(switch, short = 'v')]
    /// print the version and exit
    version: bool,
}

fn main() -> ExitCode {
    logging::init();

    let raw: Vec<String> = std::env::args_os()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();
    let rest: Vec<&str> = raw.iter().skip(1).map(String::as_str).collect();

    let args = match Args::from_args(&["runc"], &rest) {
        Ok(args) => args,
        Err(EarlyExit { output, status }) => {
            return match status {
                Ok(()) => {
                    println!("{output}");
                    Status::Ok.into()
                }
                Err(()) => {
                    eprintln!("{output}");
                    Status::ArgumentError.into()
                }
            };
        }
    };

    // Scratch files are dropped during unwinding; a panic still ends in a status code.
    match std::panic::catch_unwind(|| execute(args)) {
        Ok(Ok(status)) => status.into(),
        Ok(Err(err)) => {
            tracing::debug!(?err, "session failed");
            eprintln!("error: {err}");
            err.status().into()
        }
        Err(_) => {
            eprintln!("error: unexpected internal failure");
            Status::InternalError.into()
        }
    }
}

fn execute(args: Args) -> Result<Status, RuncError> {
    let mut stdout = std::io::stdout();
    if args.version {
        println!("runc: v{}", env!("CARGO_PKG_VERSION"));
        return Ok(Status::Ok);
    }
    if args.ls {
        registry::write_languages(&mut stdout).context("writing language list")?;
        return Ok(Status::Ok);
    }
    if args.aliases {
        registry::write_aliases(&mut stdout).context("writing alias list")?;
        return Ok(Status::Ok);
    }

    let language = match args.lang {
        Some(lang) => lang,
        None if args.pick => picker::pick()?,
        None => {
            return Err(RuncError::Argument(
                "Language has to be specified. try '--help'".to_string(),
            ));
        }
    };

    let env = Environment::new();
    let history = HistoryStore::from_env(&env);
    let options = SessionOptions {
        language,
        extra_args: split_args(args.args.as_deref()),
        program_args: split_args(args.argv.as_deref()),
        temporary: args.temp,
        fresh: args.new_history,
        work_dir: None,
    };

    let mut renderer = Renderer::new();
    let mut stderr = std::io::stderr();
    match session::run(&env, &history, &options) {
        Ok(result) => {
            print_result(&mut renderer, &result, &mut stdout, &mut stderr)
                .context("writing program output")?;
            Ok(Status::Ok)
        }
        Err(RuncError::Code { result }) => {
            print_result(&mut renderer, &result, &mut stdout, &mut stderr)
                .context("writing program output")?;
            Err(RuncError::Code { result })
        }
        Err(err) => Err(err),
    }
}

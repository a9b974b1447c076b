//! Static table of supported languages and how each one is run.
//!
//! Tables are plain `static` data built at compile time and never mutated.

use crate::env::Environment;
use crate::error::RuncError;
use crate::external;
use std::ffi::OsStr;
use std::io::{self, Write};

/// How a compiler is told where to write its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFlag {
    /// Flag and path are two arguments: `-o PATH`.
    Separate(&'static str),
    /// Path is glued to the flag: `-femit-bin=PATH`.
    Joined(&'static str),
}

/// One of the fixed orchestration patterns for turning source into output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// `command... <extra> <source> <argv>`, once.
    Direct { command: &'static [&'static str] },

    /// Compile to a scratch executable, then run it.
    Compile {
        compiler: &'static str,
        flags: &'static [&'static str],
        output: OutputFlag,
    },

    /// Compile to `artifact`, then hand it to a host runtime.
    CompileHost {
        compiler: &'static str,
        flags: &'static [&'static str],
        output: OutputFlag,
        artifact: &'static str,
        host: &'static [&'static str],
    },

    /// Assemble to an object file, link it, run the result.
    AssembleLink {
        assembler: &'static str,
        assembler_flags: &'static [&'static str],
        linker: &'static str,
        linker_flags: &'static [&'static str],
    },

    /// Compile to a module the host cannot run directly; the host is started
    /// with `bootstrap` on stdin, which loads `{module}` and exits with the
    /// return value of its `main` export.
    HostBootstrap {
        compiler: &'static str,
        flags: &'static [&'static str],
        output: OutputFlag,
        artifact: &'static str,
        host: &'static [&'static str],
        bootstrap: &'static str,
    },
}

#[derive(Debug, PartialEq, Eq)]
pub struct LanguageSpec {
    pub key: &'static str,
    /// Includes the dot, e.g. `.py`.
    pub extension: &'static str,
    /// Executables that have to be on PATH.
    pub requires: &'static [&'static str],
    pub strategy: Strategy,
}

const CC_OUT: OutputFlag = OutputFlag::Separate("-o");

const WASM_BOOTSTRAP: &str = r#"const fs = require("fs");
const bytes = fs.readFileSync({module});
const imports = { env: { print: (x) => console.log(x) } };
WebAssembly.instantiate(bytes, imports)
  .then(({ instance }) => process.exit(instance.exports.main()))
  .catch((err) => {
    console.error(err);
    process.exit(1);
  });
"#;

#[rustfmt::skip]
pub static LANGUAGES: &[LanguageSpec] = &[
    LanguageSpec { key: "python",     extension: ".py",   requires: &["python3"], strategy: Strategy::Direct { command: &["python3"] } },
    LanguageSpec { key: "javascript", extension: ".js",   requires: &["node"],    strategy: Strategy::Direct { command: &["node"] } },
    LanguageSpec { key: "ruby",       extension: ".rb",   requires: &["ruby"],    strategy: Strategy::Direct { command: &["ruby"] } },
    LanguageSpec { key: "bash",       extension: ".sh",   requires: &["bash"],    strategy: Strategy::Direct { command: &["bash"] } },
    LanguageSpec { key: "lua",        extension: ".lua",  requires: &["lua"],     strategy: Strategy::Direct { command: &["lua"] } },
    LanguageSpec { key: "perl",       extension: ".pl",   requires: &["perl"],    strategy: Strategy::Direct { command: &["perl"] } },
    LanguageSpec { key: "go",         extension: ".go",   requires: &["go"],      strategy: Strategy::Direct { command: &["go", "run"] } },
    LanguageSpec { key: "java",       extension: ".java", requires: &["java"],    strategy: Strategy::Direct { command: &["java"] } },
    LanguageSpec { key: "c",          extension: ".c",    requires: &["gcc"],     strategy: Strategy::Compile { compiler: "gcc", flags: &["-O2"], output: CC_OUT } },
    LanguageSpec { key: "cpp",        extension: ".cpp",  requires: &["g++"],     strategy: Strategy::Compile { compiler: "g++", flags: &["-O2"], output: CC_OUT } },
    LanguageSpec { key: "rust",       extension: ".rs",   requires: &["rustc"],   strategy: Strategy::Compile { compiler: "rustc", flags: &["-O"], output: CC_OUT } },
    LanguageSpec { key: "zig",        extension: ".zig",  requires: &["zig"],     strategy: Strategy::Compile { compiler: "zig", flags: &["build-exe"], output: OutputFlag::Joined("-femit-bin=") } },
    LanguageSpec {
        key: "typescript", extension: ".ts", requires: &["tsc", "node"],
        strategy: Strategy::CompileHost { compiler: "tsc", flags: &[], output: OutputFlag::Separate("--outFile"), artifact: "runc_runner.js", host: &["node"] },
    },
    LanguageSpec {
        key: "csharp", extension: ".cs", requires: &["mcs", "mono"],
        strategy: Strategy::CompileHost { compiler: "mcs", flags: &[], output: OutputFlag::Joined("-out:"), artifact: "runc_runner.exe", host: &["mono"] },
    },
    LanguageSpec {
        key: "asm", extension: ".asm", requires: &["nasm", "ld"],
        strategy: Strategy::AssembleLink { assembler: "nasm", assembler_flags: &["-f", "elf64"], linker: "ld", linker_flags: &[] },
    },
    LanguageSpec {
        key: "gas", extension: ".s", requires: &["as", "ld"],
        strategy: Strategy::AssembleLink { assembler: "as", assembler_flags: &[], linker: "ld", linker_flags: &[] },
    },
    LanguageSpec {
        key: "wat", extension: ".wat", requires: &["wat2wasm", "node"],
        strategy: Strategy::HostBootstrap {
            compiler: "wat2wasm", flags: &[], output: CC_OUT, artifact: "runc_runner.wasm",
            host: &["node", "-"], bootstrap: WASM_BOOTSTRAP,
        },
    },
];

/// Alternate spelling -> canonical key.
#[rustfmt::skip]
pub static ALIASES: &[(&str, &str)] = &[
    ("py",          "python"),
    ("python3",     "python"),
    ("js",          "javascript"),
    ("node",        "javascript"),
    ("rb",          "ruby"),
    ("sh",          "bash"),
    ("shell",       "bash"),
    ("pl",          "perl"),
    ("golang",      "go"),
    ("c++",         "cpp"),
    ("cxx",         "cpp"),
    ("rs",          "rust"),
    ("ts",          "typescript"),
    ("cs",          "csharp"),
    ("c#",          "csharp"),
    ("nasm",        "asm"),
    ("assembly",    "asm"),
    ("wasm",        "wat"),
    ("webassembly", "wat"),
];

/// Resolve a user-supplied language name, case-insensitively, through the
/// alias table.
pub fn resolve(name: &str) -> Result<&'static LanguageSpec, RuncError> {
    let lowered = name.to_lowercase();
    let canonical = ALIASES
        .iter()
        .find(|(alias, _)| *alias == lowered)
        .map_or(lowered.as_str(), |(_, key)| *key);
    let spec = LANGUAGES
        .iter()
        .find(|spec| spec.key == canonical)
        .ok_or_else(|| RuncError::Language {
            name: name.to_string(),
        })?;
    tracing::debug!(name, key = spec.key, "resolved language");
    Ok(spec)
}

/// Sorted list of canonical keys.
pub fn keys() -> Vec<&'static str> {
    let mut keys: Vec<_> = LANGUAGES.iter().map(|spec| spec.key).collect();
    keys.sort_unstable();
    keys
}

/// Tools of `spec` that cannot be found on the `PATH` of `env`.
pub fn missing_tools(spec: &LanguageSpec, env: &Environment) -> Vec<&'static str> {
    spec.requires
        .iter()
        .copied()
        .filter(|tool| external::resolve(env, OsStr::new(tool)).is_none())
        .collect()
}

pub fn check_requirements(spec: &LanguageSpec, env: &Environment) -> Result<(), RuncError> {
    let missing = missing_tools(spec, env);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(RuncError::MissingTools { missing })
    }
}

/// `--ls` output.
pub fn write_languages(out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "Available languages:")?;
    writeln!(out, "___________________")?;
    for key in keys() {
        writeln!(out, "    {key}")?;
    }
    Ok(())
}

/// `--aliases` output, one `alias : canonical` row per alias.
pub fn write_aliases(out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "Available aliases:")?;
    writeln!(out, "___________________")?;
    for (alias, key) in ALIASES {
        writeln!(out, "{alias:>10} : {key}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_key_resolves_to_itself() {
        for spec in LANGUAGES {
            assert!(std::ptr::eq(resolve(spec.key).unwrap(), spec));
            assert!(std::ptr::eq(resolve(&spec.key.to_uppercase()).unwrap(), spec));
        }
    }

    #[test]
    fn test_aliases_resolve_to_canonical_spec() {
        for (alias, key) in ALIASES {
            let via_alias = resolve(alias).unwrap();
            let direct = resolve(key).unwrap();
            assert!(std::ptr::eq(via_alias, direct), "alias {alias} -> {key}");
        }
        assert_eq!(resolve("Py").unwrap().key, "python");
        assert_eq!(resolve("C++").unwrap().key, "cpp");
    }

    #[test]
    fn test_keys_and_aliases_are_unique() {
        let keys: HashSet<_> = LANGUAGES.iter().map(|s| s.key).collect();
        assert_eq!(keys.len(), LANGUAGES.len());
        let aliases: HashSet<_> = ALIASES.iter().map(|(a, _)| *a).collect();
        assert_eq!(aliases.len(), ALIASES.len());
        assert!(aliases.is_disjoint(&keys));
    }

    #[test]
    fn test_unknown_language_is_language_error() {
        let err = resolve("brainfuck").unwrap_err();
        assert!(matches!(err, RuncError::Language { .. }));
        assert_eq!(err.to_string(), "unsupported language: brainfuck");
    }

    #[test]
    fn test_extensions_include_dot() {
        for spec in LANGUAGES {
            assert!(spec.extension.starts_with('.'), "{}", spec.key);
            assert!(!spec.requires.is_empty(), "{}", spec.key);
        }
    }

    #[test]
    fn test_keys_are_sorted() {
        let keys = keys();
        assert_eq!(keys.len(), LANGUAGES.len());
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_all_tools_missing_with_empty_path() {
        let mut env = Environment::empty();
        env.set_var("PATH", "");
        for spec in LANGUAGES {
            assert_eq!(missing_tools(spec, &env), spec.requires.to_vec());
            let err = check_requirements(spec, &env).unwrap_err();
            assert!(matches!(err, RuncError::MissingTools { .. }));
        }
    }

    #[test]
    fn test_go_missing_is_reported_by_name() {
        let env = Environment::empty();
        let err = check_requirements(resolve("go").unwrap(), &env).unwrap_err();
        match err {
            RuncError::MissingTools { missing } => assert_eq!(missing, vec!["go"]),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_tool_found_on_path() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("nasm"), "").unwrap();
        let mut env = Environment::empty();
        env.set_var("PATH", dir.path().to_string_lossy());
        let spec = resolve("asm").unwrap();
        assert_eq!(missing_tools(spec, &env), vec!["ld"]);
    }

    #[test]
    fn test_listing_formats() {
        let mut out = Vec::new();
        write_languages(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Available languages:\n"));
        assert!(text.contains("\n    python\n"));
        assert_eq!(text.lines().count(), LANGUAGES.len() + 2);

        let mut out = Vec::new();
        write_aliases(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("        py : python\n"));
        assert_eq!(text.lines().count(), ALIASES.len() + 2);
    }
}

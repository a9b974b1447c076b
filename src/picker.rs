use crate::error::RuncError;
use crate::registry::{ALIASES, LANGUAGES};
use rustyline::completion::Completer;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

const PROMPT: &str = "language> ";

/// Tab completion over language keys and aliases.
struct LanguageHelper {
    names: Vec<&'static str>,
}

impl LanguageHelper {
    fn new() -> Self {
        let mut names: Vec<&'static str> = LANGUAGES
            .iter()
            .map(|spec| spec.key)
            .chain(ALIASES.iter().map(|(alias, _)| *alias))
            .collect();
        names.sort_unstable();
        names.dedup();
        Self { names }
    }

    /// Start of the word under the cursor and the names it could become.
    fn complete_word(&self, line: &str, pos: usize) -> (usize, Vec<String>) {
        let start = line[..pos]
            .char_indices()
            .rev()
            .find(|(_, c)| c.is_whitespace())
            .map_or(0, |(i, c)| i + c.len_utf8());
        let prefix = line[start..pos].to_lowercase();
        let matches = self
            .names
            .iter()
            .filter(|name| name.starts_with(&prefix))
            .map(|name| name.to_string())
            .collect();
        (start, matches)
    }
}

impl Completer for LanguageHelper {
    type Candidate = String;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        Ok(self.complete_word(line, pos))
    }
}

impl Hinter for LanguageHelper {
    type Hint = String;
}

impl Highlighter for LanguageHelper {}

impl Validator for LanguageHelper {}

impl Helper for LanguageHelper {}

/// Ask for a language name on the terminal.
///
/// Blank lines re-prompt; Ctrl-C or Ctrl-D cancel with an argument error.
pub fn pick() -> Result<String, RuncError> {
    let mut rl: Editor<LanguageHelper, DefaultHistory> =
        Editor::new().map_err(|err| anyhow::anyhow!("cannot open prompt: {err}"))?;
    rl.set_helper(Some(LanguageHelper::new()));

    loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                let name = line.trim();
                if !name.is_empty() {
                    return Ok(name.to_string());
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                return Err(RuncError::Argument("no language selected".to_string()));
            }
            Err(err) => return Err(anyhow::anyhow!("cannot read language: {err}").into()),
        }
    }
}

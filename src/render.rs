use crate::external::RunResult;
use std::fmt::Write as _;
use std::io::{self, Write};

/// Turns captured bytes into printable text.
///
/// Valid UTF-8 passes through untouched; every byte of an invalid run is
/// shown as `\xNN`. The first time that happens a warning is logged, later
/// renders stay quiet.
#[derive(Debug, Default)]
pub struct Renderer {
    warned: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, bytes: &[u8]) -> String {
        let mut out = String::with_capacity(bytes.len());
        let mut lossy = false;
        for chunk in bytes.utf8_chunks() {
            out.push_str(chunk.valid());
            for byte in chunk.invalid() {
                lossy = true;
                let _ = write!(out, "\\x{byte:02x}");
            }
        }
        if lossy && !self.warned {
            self.warned = true;
            tracing::warn!("some bytes were unprintable and are shown as \\xNN escapes");
        }
        out
    }

    /// Whether any render so far had to escape bytes.
    pub fn warned(&self) -> bool {
        self.warned
    }
}

/// Write the captured streams of `result` to the matching writers.
pub fn print_result(
    renderer: &mut Renderer,
    result: &RunResult,
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
) -> io::Result<()> {
    stdout.write_all(renderer.render(&result.stdout).as_bytes())?;
    stdout.flush()?;
    stderr.write_all(renderer.render(&result.stderr).as_bytes())?;
    stderr.flush()
}

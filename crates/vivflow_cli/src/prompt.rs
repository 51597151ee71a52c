//! Yes/no confirmation.

use std::io::{self, BufRead, Write};

/// Writes `question` to `output` and reads one line from `input`.
///
/// Only `y` or `Y` (surrounding whitespace ignored) is a yes; end of input is a no.
pub fn confirm<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> io::Result<bool> {
    write!(output, "{question}")?;
    output.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

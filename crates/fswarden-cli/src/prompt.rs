/// Operator confirmation before a review file is rewritten.
use std::io::{self, BufRead, Write};

/// Ask whether to pin the new walk. Only `y` or `Y` confirms; anything
/// else, including end of input, declines.
pub fn ask_update_reviews<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> io::Result<bool> {
    write!(
        output,
        "Do you want to update the \"last known good\" to this [y/N]: "
    )?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

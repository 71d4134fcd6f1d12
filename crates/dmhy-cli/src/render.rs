//! Plain-text output for search results.

use std::io::{self, BufRead, Write};

use dmhy_core::SearchResult;

/// Write a numbered table of results, numbering from 1.
pub fn write_table<W: Write>(out: &mut W, results: &[SearchResult]) -> io::Result<()> {
    writeln!(out, "{:>4}  {:<16}  {:>10}  Title", "No.", "Time", "Size")?;
    for (idx, result) in results.iter().enumerate() {
        writeln!(
            out,
            "{:>4}  {:<16}  {:>10}  {}",
            idx + 1,
            result.time,
            result.size,
            result.title
        )?;
    }
    Ok(())
}

/// Ask for a 1-based result number until a valid one is entered.
///
/// Returns `Some(index)` as a 0-based index, or `None` when the user
/// enters 0 or input ends.
pub fn prompt_selection<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    count: usize,
) -> io::Result<Option<usize>> {
    let mut line = String::new();
    loop {
        write!(out, "Pick a result by number (0 to cancel): ")?;
        out.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        match line.trim().parse::<usize>() {
            Ok(0) => return Ok(None),
            Ok(n) if n <= count => return Ok(Some(n - 1)),
            Ok(_) => writeln!(out, "Enter a number between 0 and {}", count)?,
            Err(_) => writeln!(out, "Enter a valid number")?,
        }
    }
}

use anyhow::Result;
use std::io::{BufRead, Write};
use std::num::IntErrorKind;
use tracing::{debug, warn};

use crate::utils::normalize_filename;

/// How the user's answer was interpreted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Empty answer, first candidate
    Default(String),
    /// Valid 1-based index
    Numbered(usize, String),
    /// Number outside `1..=len`, first candidate
    OutOfRange(i64, String),
    /// Free text, normalized
    Custom(String),
    /// Read interrupted or stdin closed, first candidate
    Interrupted(String),
}

impl Selection {
    pub fn filename(&self) -> &str {
        match self {
            Selection::Default(name)
            | Selection::Numbered(_, name)
            | Selection::OutOfRange(_, name)
            | Selection::Custom(name)
            | Selection::Interrupted(name) => name,
        }
    }

    pub fn into_filename(self) -> String {
        match self {
            Selection::Default(name)
            | Selection::Numbered(_, name)
            | Selection::OutOfRange(_, name)
            | Selection::Custom(name)
            | Selection::Interrupted(name) => name,
        }
    }
}

/// Interprets one line of user input, `None` when there are no candidates
pub fn interpret(candidates: &[String], input: &str) -> Option<Selection> {
    let first = candidates.first()?.clone();
    let input = input.trim();

    if input.is_empty() {
        return Some(Selection::Default(first));
    }

    let selection = match input.parse::<i64>() {
        Ok(n) if n >= 1 && (n as usize) <= candidates.len() => {
            Selection::Numbered(n as usize, candidates[n as usize - 1].clone())
        }
        Ok(n) => Selection::OutOfRange(n, first),
        Err(e) if matches!(e.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => {
            let n = if input.starts_with('-') { i64::MIN } else { i64::MAX };
            Selection::OutOfRange(n, first)
        }
        Err(_) => Selection::Custom(normalize_filename(input)),
    };
    Some(selection)
}

/// Shows the candidates on `output` and reads the choice from `input`.
///
/// Returns `None` only when there is nothing to choose from. A failed or empty read
/// (end of input) falls back to the first candidate. Errors writing the prompt are
/// returned.
pub fn prompt_selection<R, W>(candidates: Option<&[String]>, input: &mut R, output: &mut W) -> Result<Option<Selection>>
where
    R: BufRead,
    W: Write,
{
    let candidates = match candidates {
        Some(candidates) if !candidates.is_empty() => candidates,
        _ => {
            debug!("No filename candidates to choose from");
            return Ok(None);
        }
    };

    writeln!(output, "\nAI-generated filename suggestions:")?;
    for (i, name) in candidates.iter().enumerate() {
        writeln!(output, "  {}. {}", i + 1, name)?;
    }
    write!(
        output,
        "\nChoose an option (1-{}) or enter custom filename [default: 1]: ",
        candidates.len()
    )?;
    output.flush()?;

    let mut line = String::new();
    let selection = match input.read_line(&mut line) {
        Ok(0) => {
            debug!("Input closed before a choice was made");
            Selection::Interrupted(candidates[0].clone())
        }
        Ok(_) => match interpret(candidates, &line) {
            Some(selection) => selection,
            None => return Ok(None),
        },
        Err(e) => {
            warn!("Failed to read selection: {}", e);
            Selection::Interrupted(candidates[0].clone())
        }
    };

    match &selection {
        Selection::OutOfRange(n, _) => {
            warn!("Selection {} is out of range", n);
            writeln!(output, "Invalid selection ({}), using first option.", n)?;
        }
        Selection::Custom(name) => writeln!(output, "Using custom filename: {}", name)?,
        Selection::Interrupted(_) => writeln!(output, "\nUsing first option.")?,
        Selection::Default(_) | Selection::Numbered(..) => {}
    }

    Ok(Some(selection))
}

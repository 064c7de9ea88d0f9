//! Commands accepted by the interactive session.

use std::str::FromStr;
use thiserror::Error;

/// One line of user input in the interactive session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Upload a PDF from a path or URL.
    Open(String),
    /// Extract and analyse the current upload.
    Analyze,
    /// Toggle the raw-data viewer.
    ToggleRaw,
    /// Re-render the current screen.
    Show,
    Help,
    Quit,
}

/// A line that does not parse as a [`Command`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("`open` needs a path or URL, e.g. `open annual-report.pdf`")]
    MissingTarget,

    #[error("Unknown command '{0}'. Type `help` for the list.")]
    Unknown(String),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        match verb.to_ascii_lowercase().as_str() {
            "open" | "upload" | "o" => {
                if rest.is_empty() {
                    Err(CommandError::MissingTarget)
                } else {
                    Ok(Command::Open(unquote(rest).to_string()))
                }
            }
            "analyze" | "analyse" | "a" => Ok(Command::Analyze),
            "raw" | "r" => Ok(Command::ToggleRaw),
            "show" | "s" | "" => Ok(Command::Show),
            "help" | "h" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            _ => Err(CommandError::Unknown(line.to_string())),
        }
    }
}

/// Strip one pair of matching surrounding quotes.
fn unquote(s: &str) -> &str {
    for q in ['"', '\''] {
        if let Some(inner) = s.strip_prefix(q).and_then(|r| r.strip_suffix(q)) {
            return inner;
        }
    }
    s
}

pub const HELP: &str = "\
Commands:
  open <path|url>   upload a financial report (PDF)
  analyze           extract the text and run the AI analysis
  raw               expand / collapse the raw extracted data
  show              re-render the current screen
  help              show this help
  quit              leave the session";

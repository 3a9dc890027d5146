//! Interactive commands read from stdin while monitoring

use crate::query::Query;

/// Help text printed by `help`
pub const HELP: &str = "\
Commands:
  help                                  show this message
  exit                                  stop monitoring and quit
  log view                              print the whole history
  log filter -name <regex>              history lines whose path matches <regex>
  log filter -date from=<ts> to=<ts>    history lines stamped within [from, to]

Timestamps look like 2024-01-31T13:45:00+0100; a missing bound means now.";

/// One line of interactive input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Exit,
    Log(Query),
    Empty,
    /// Anything else, with the reason it was rejected
    Invalid(String),
}

/// Parse one input line
pub fn parse(line: &str) -> Command {
    let line = line.trim();
    let mut words = line.split_whitespace();

    match words.next() {
        None => Command::Empty,
        Some("help") => Command::Help,
        Some("exit") | Some("quit") => Command::Exit,
        Some("log") => match words.next() {
            Some("view") => Command::Log(Query::All),
            Some("filter") => parse_filter(line, words.next()),
            _ => Command::Invalid("expected 'log view' or 'log filter'".to_string()),
        },
        Some(other) => Command::Invalid(format!("unknown command '{other}'")),
    }
}

fn parse_filter(line: &str, flag: Option<&str>) -> Command {
    let rest = match flag.and_then(|flag| line.split_once(flag)) {
        Some((_, rest)) => rest.trim(),
        None => return Command::Invalid("expected -name or -date".to_string()),
    };

    match flag {
        Some("-name") if rest.is_empty() => {
            Command::Invalid("-name needs a pattern".to_string())
        }
        Some("-name") => Command::Log(Query::Name(rest.to_string())),
        Some("-date") => {
            let mut from = None;
            let mut to = None;
            for word in rest.split_whitespace() {
                if let Some(value) = word.strip_prefix("from=") {
                    from = Some(value.to_string());
                } else if let Some(value) = word.strip_prefix("to=") {
                    to = Some(value.to_string());
                } else {
                    return Command::Invalid(format!("unexpected '{word}' in -date filter"));
                }
            }
            Command::Log(Query::Date { from, to })
        }
        _ => Command::Invalid("expected -name or -date".to_string()),
    }
}

//! History queries

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Local};
use ff_core::naming::parse_timestamp;
use journal::HistoryLog;

/// A read of the history log
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// The whole log
    All,
    /// Lines whose path matches a regular expression
    Name(String),
    /// Lines stamped within a time range; a missing bound means "now"
    Date {
        from: Option<String>,
        to: Option<String>,
    },
}

impl Query {
    /// Build a query from `log` subcommand flags
    ///
    /// `--name` takes precedence over the date bounds.
    pub fn from_flags(name: Option<String>, from: Option<String>, to: Option<String>) -> Self {
        match (name, from, to) {
            (Some(pattern), _, _) => Query::Name(pattern),
            (None, None, None) => Query::All,
            (None, from, to) => Query::Date { from, to },
        }
    }

    /// Run the query against `history`
    pub fn run(&self, history: &HistoryLog) -> Result<String> {
        match self {
            Query::All => history.dump_all(),
            Query::Name(pattern) => history.filter_by_name(pattern),
            Query::Date { from, to } => {
                let now: DateTime<FixedOffset> = Local::now().into();
                let (from, to) = resolve_range(from.as_deref(), to.as_deref(), now)?;
                history.filter_by_date_range(from, to)
            }
        }
    }
}

/// Parse optional range bounds, substituting `now` for the missing ones
pub fn resolve_range(
    from: Option<&str>,
    to: Option<&str>,
    now: DateTime<FixedOffset>,
) -> Result<(DateTime<FixedOffset>, DateTime<FixedOffset>)> {
    let parse = |bound: Option<&str>, label: &str| -> Result<DateTime<FixedOffset>> {
        match bound {
            Some(text) => parse_timestamp(text)
                .with_context(|| format!("Invalid '{label}' timestamp: {text}")),
            None => Ok(now),
        }
    };
    Ok((parse(from, "from")?, parse(to, "to")?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ff_core::Operation;
    use std::path::Path;
    use tempfile::TempDir;

    fn ts(text: &str) -> DateTime<FixedOffset> {
        parse_timestamp(text).unwrap()
    }

    fn seeded_log(temp_dir: &TempDir) -> HistoryLog {
        let history = HistoryLog::open(&temp_dir.path().join(".logs")).unwrap();
        history
            .append(ts("2024-03-01T10:00:00+0000"), Path::new("hot/report.txt"), Operation::Create)
            .unwrap();
        history
            .append(ts("2024-03-02T10:00:00+0000"), Path::new("hot/notes.md"), Operation::Write)
            .unwrap();
        history
            .append(ts("2024-03-03T10:00:00+0000"), Path::new("hot/report.txt"), Operation::Remove)
            .unwrap();
        history
    }

    #[test]
    fn test_from_flags() {
        assert_eq!(Query::from_flags(None, None, None), Query::All);
        assert_eq!(
            Query::from_flags(Some("x".into()), Some("a".into()), None),
            Query::Name("x".into())
        );
        assert_eq!(
            Query::from_flags(None, None, Some("b".into())),
            Query::Date {
                from: None,
                to: Some("b".into())
            }
        );
    }

    #[test]
    fn test_resolve_range_defaults_to_now() {
        let now = ts("2024-06-01T12:00:00+0200");
        let (from, to) = resolve_range(Some("2024-01-01T00:00:00+0000"), None, now).unwrap();
        assert_eq!(from, ts("2024-01-01T00:00:00+0000"));
        assert_eq!(to, now);

        let (from, to) = resolve_range(None, None, now).unwrap();
        assert_eq!(from, now);
        assert_eq!(to, now);
    }

    #[test]
    fn test_resolve_range_rejects_garbage() {
        let now = ts("2024-06-01T12:00:00+0200");
        let err = resolve_range(Some("yesterday"), None, now).unwrap_err();
        assert!(err.to_string().contains("from"));
    }

    #[test]
    fn test_run_queries() {
        let temp_dir = TempDir::new().unwrap();
        let history = seeded_log(&temp_dir);

        let all = Query::All.run(&history).unwrap();
        assert_eq!(all.lines().count(), 3);

        let by_name = Query::Name("report".into()).run(&history).unwrap();
        assert_eq!(by_name.lines().count(), 2);
        assert!(!by_name.contains("notes.md"));

        let by_date = Query::Date {
            from: Some("2024-03-02T00:00:00+0000".into()),
            to: Some("2024-03-02T23:59:59+0000".into()),
        }
        .run(&history)
        .unwrap();
        assert_eq!(by_date.lines().count(), 1);
        assert!(by_date.contains("notes.md WRITE"));
    }

    #[test]
    fn test_bad_pattern_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let history = seeded_log(&temp_dir);
        assert!(Query::Name("(".into()).run(&history).is_err());
    }
}

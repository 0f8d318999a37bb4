//! Statement-type checks
//!
//! Anchored, case-insensitive prefix patterns. This is a guard on the leading
//! keyword only; statements are otherwise passed to the driver verbatim.

use crate::error::{Error, Result};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static SELECT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^SELECT").expect("valid SELECT pattern"));
static COUNT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^SELECT\s+COUNT\(.+\)").expect("valid COUNT pattern"));
static INSERT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^INSERT").expect("valid INSERT pattern"));
static UPDATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^UPDATE").expect("valid UPDATE pattern"));
static DELETE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^DELETE").expect("valid DELETE pattern"));

/// Statement types the helper dispatches on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    Select,
    Count,
    Insert,
    Update,
    Delete,
}

impl StatementKind {
    /// Order used by [`classify`]; COUNT precedes SELECT since every COUNT
    /// statement also matches the SELECT pattern.
    const DISPATCH_ORDER: [StatementKind; 5] = [
        StatementKind::Count,
        StatementKind::Select,
        StatementKind::Insert,
        StatementKind::Update,
        StatementKind::Delete,
    ];

    fn pattern(self) -> &'static Regex {
        match self {
            StatementKind::Select => &*SELECT_PATTERN,
            StatementKind::Count => &*COUNT_PATTERN,
            StatementKind::Insert => &*INSERT_PATTERN,
            StatementKind::Update => &*UPDATE_PATTERN,
            StatementKind::Delete => &*DELETE_PATTERN,
        }
    }

    /// Whether the already-trimmed statement matches this kind
    pub fn matches(self, sql: &str) -> bool {
        self.pattern().is_match(sql)
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatementKind::Select => write!(f, "SELECT"),
            StatementKind::Count => write!(f, "SELECT COUNT..."),
            StatementKind::Insert => write!(f, "INSERT"),
            StatementKind::Update => write!(f, "UPDATE"),
            StatementKind::Delete => write!(f, "DELETE"),
        }
    }
}

/// Trim `sql` and check it against `kind`, returning the trimmed text
pub fn require(sql: &str, kind: StatementKind) -> Result<&str> {
    let sql = sql.trim();
    if !kind.matches(sql) {
        return Err(Error::Validation(format!(
            "SQL query must be {} type",
            kind
        )));
    }
    Ok(sql)
}

/// Trim `sql` and find the first kind it matches in dispatch order
pub fn classify(sql: &str) -> Result<(StatementKind, &str)> {
    let sql = sql.trim();
    StatementKind::DISPATCH_ORDER
        .into_iter()
        .find(|kind| kind.matches(sql))
        .map(|kind| (kind, sql))
        .ok_or_else(|| {
            Error::Validation(
                "This method only supports SELECT, UPDATE, INSERT or DELETE SQL type"
                    .to_string(),
            )
        })
}

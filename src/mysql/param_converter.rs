//! MySQL parameter and value conversion
//!
//! Rewrites `@name` placeholders into positional `?` markers and converts
//! values between the helper's [`Value`] and `mysql_async::Value`.

use crate::error::{Error, Result};
use crate::params::Params;
use crate::types::Value;
use chrono::{Datelike, NaiveDate, Timelike};

/// SQL text with named placeholders replaced by positional markers
#[derive(Debug, Clone, PartialEq)]
pub struct BoundStatement {
    pub sql: String,
    pub values: Vec<mysql_async::Value>,
    /// `@name` references with no matching parameter, left in place
    pub unbound: Vec<String>,
}

impl BoundStatement {
    /// Fail on the first `@name` that no parameter matched
    pub fn require_all_bound(self) -> Result<Self> {
        match self.unbound.first() {
            Some(name) => Err(Error::Runtime(format!(
                "Parameter '@{}' must be defined",
                name
            ))),
            None => Ok(self),
        }
    }
}

/// MySQL parameter conversion utility
pub struct MySqlParamConverter;

impl MySqlParamConverter {
    /// Replace every `@name` placeholder that has a parameter with `?`.
    ///
    /// Names match parameters case-insensitively. Quoted strings, quoted
    /// identifiers, comments and `@@system` variables are copied unchanged.
    /// References without a parameter are left in place and listed in
    /// [`BoundStatement::unbound`].
    pub fn bind_named(sql: &str, params: &Params) -> BoundStatement {
        let bytes = sql.as_bytes();
        let mut out = String::with_capacity(sql.len());
        let mut values = Vec::new();
        let mut unbound = Vec::new();
        let mut i = 0;

        while i < bytes.len() {
            match bytes[i] {
                quote @ (b'\'' | b'"' | b'`') => {
                    let end = quoted_end(bytes, i, quote);
                    out.push_str(&sql[i..end]);
                    i = end;
                }
                b'-' if starts_dash_comment(bytes, i) => {
                    let end = line_end(bytes, i);
                    out.push_str(&sql[i..end]);
                    i = end;
                }
                b'#' => {
                    let end = line_end(bytes, i);
                    out.push_str(&sql[i..end]);
                    i = end;
                }
                b'/' if bytes.get(i + 1) == Some(&b'*') => {
                    let end = block_comment_end(bytes, i);
                    out.push_str(&sql[i..end]);
                    i = end;
                }
                b'@' if bytes.get(i + 1) == Some(&b'@') => {
                    let end = ident_end(bytes, i + 2);
                    out.push_str(&sql[i..end]);
                    i = end;
                }
                b'@' => {
                    let end = ident_end(bytes, i + 1);
                    let name = &sql[i + 1..end];
                    match params.get(name) {
                        Some(value) if !name.is_empty() => {
                            out.push('?');
                            values.push(Self::convert_value(value));
                        }
                        _ => {
                            if !name.is_empty() {
                                unbound.push(name.to_string());
                            }
                            out.push_str(&sql[i..end]);
                        }
                    }
                    i = end;
                }
                _ => {
                    let start = i;
                    i += 1;
                    while i < bytes.len() && !is_special(bytes[i]) {
                        i += 1;
                    }
                    out.push_str(&sql[start..i]);
                }
            }
        }

        BoundStatement {
            sql: out,
            values,
            unbound,
        }
    }

    /// Convert a helper value to a driver parameter value
    pub fn convert_value(value: &Value) -> mysql_async::Value {
        match value {
            Value::Null => mysql_async::Value::NULL,
            Value::Bool(b) => mysql_async::Value::Int(*b as i64),
            Value::Int(i) => mysql_async::Value::Int(*i),
            Value::UInt(u) => mysql_async::Value::UInt(*u),
            Value::Float(f) => mysql_async::Value::Double(*f),
            Value::String(s) => mysql_async::Value::Bytes(s.as_bytes().to_vec()),
            Value::Binary(b) => mysql_async::Value::Bytes(b.clone()),
            Value::DateTime(dt) => mysql_async::Value::Date(
                dt.year() as u16,
                dt.month() as u8,
                dt.day() as u8,
                dt.hour() as u8,
                dt.minute() as u8,
                dt.second() as u8,
                (dt.nanosecond() / 1_000).min(999_999),
            ),
            Value::Time(t) => mysql_async::Value::Bytes(t.as_bytes().to_vec()),
        }
    }

    /// Convert a driver result value back to a helper value.
    ///
    /// With `convert_zero_datetime`, MySQL zero dates become `Null`.
    pub fn convert_from_mysql_value(
        mysql_value: mysql_async::Value,
        convert_zero_datetime: bool,
    ) -> Value {
        match mysql_value {
            mysql_async::Value::NULL => Value::Null,
            mysql_async::Value::Int(i) => Value::Int(i),
            mysql_async::Value::UInt(u) => Value::UInt(u),
            mysql_async::Value::Float(f) => Value::Float(f as f64),
            mysql_async::Value::Double(d) => Value::Float(d),
            mysql_async::Value::Bytes(b) => match String::from_utf8(b) {
                Ok(s) => Value::String(s),
                Err(e) => Value::Binary(e.into_bytes()),
            },
            mysql_async::Value::Date(0, 0, 0, _, _, _, _) if convert_zero_datetime => Value::Null,
            mysql_async::Value::Date(year, month, day, hour, minute, second, micros) => {
                NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32)
                    .and_then(|date| {
                        date.and_hms_micro_opt(
                            hour as u32,
                            minute as u32,
                            second as u32,
                            micros,
                        )
                    })
                    .map(Value::DateTime)
                    .unwrap_or_else(|| {
                        let mut text = format!(
                            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                            year, month, day, hour, minute, second
                        );
                        if micros > 0 {
                            text.push_str(&format!(".{:06}", micros));
                        }
                        Value::String(text)
                    })
            }
            mysql_async::Value::Time(is_negative, days, hours, minutes, seconds, micros) => {
                let mut text = format!(
                    "{}{:02}:{:02}:{:02}",
                    if is_negative { "-" } else { "" },
                    days * 24 + hours as u32,
                    minutes,
                    seconds
                );
                if micros > 0 {
                    text.push_str(&format!(".{:06}", micros));
                }
                Value::Time(text)
            }
        }
    }
}

fn is_special(b: u8) -> bool {
    matches!(b, b'\'' | b'"' | b'`' | b'-' | b'#' | b'/' | b'@')
}

/// Index one past the closing quote, honouring backslash escapes and
/// doubled quotes. Unterminated quotes run to the end of input.
fn quoted_end(bytes: &[u8], start: usize, quote: u8) -> usize {
    let mut j = start + 1;
    while j < bytes.len() {
        match bytes[j] {
            b'\\' if quote != b'`' => j += 2,
            b if b == quote => {
                if bytes.get(j + 1) == Some(&quote) {
                    j += 2;
                } else {
                    return j + 1;
                }
            }
            _ => j += 1,
        }
    }
    bytes.len()
}

/// MySQL only treats `--` as a comment when followed by whitespace or end of input
fn starts_dash_comment(bytes: &[u8], i: usize) -> bool {
    bytes.get(i + 1) == Some(&b'-')
        && bytes
            .get(i + 2)
            .is_none_or(|b| b.is_ascii_whitespace() || b.is_ascii_control())
}

fn line_end(bytes: &[u8], start: usize) -> usize {
    bytes[start..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(bytes.len(), |offset| start + offset)
}

fn block_comment_end(bytes: &[u8], start: usize) -> usize {
    bytes[start + 2..]
        .windows(2)
        .position(|w| w == b"*/")
        .map_or(bytes.len(), |offset| start + 2 + offset + 2)
}

fn ident_end(bytes: &[u8], start: usize) -> usize {
    let mut j = start;
    while j < bytes.len() && (bytes[j].is_ascii_alphanumeric() || bytes[j] == b'_' || bytes[j] == b'$')
    {
        j += 1;
    }
    j
}

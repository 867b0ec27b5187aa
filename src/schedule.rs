//! Feed schedule entries and the text format used to install them.
//!
//! A schedule update is a single string of comma-separated tokens, each of
//! the literal shape `[H:<hour>;M:<minute>;F:<grams>]`:
//!
//! ```text
//! [H:7;M:30;F:150], [H:18;M:0;F:50]
//! ```
//!
//! Whitespace around a token is ignored, whitespace inside one is not.
//! Parsing is all-or-nothing: a single malformed token rejects the whole
//! update so the caller can keep the schedule that is already installed.

use core::fmt;
use core::str::FromStr;

/// One recurring daily feeding event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScheduleEntry {
    pub hour: u8,
    pub minute: u8,
    pub feed_grams: u32,
}

impl ScheduleEntry {
    pub const fn new(hour: u8, minute: u8, feed_grams: u32) -> Self {
        Self {
            hour,
            minute,
            feed_grams,
        }
    }

    /// The `(hour, minute)` slot this entry fires in.
    pub const fn slot(&self) -> (u8, u8) {
        (self.hour, self.minute)
    }
}

impl fmt::Display for ScheduleEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[H:{};M:{};F:{}]", self.hour, self.minute, self.feed_grams)
    }
}

// ───────────────────────────────────────────────────────────────
// Errors
// ───────────────────────────────────────────────────────────────

/// What was wrong with a single token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// Token does not start with `[` or does not end with `]`.
    MissingBrackets,
    /// Token does not contain exactly the three fields `H`, `M`, `F`.
    WrongFieldCount(usize),
    /// Field at this position does not carry the expected `<key>:` prefix.
    UnexpectedKey { expected: char },
    /// Field value is not a non-negative integer.
    NotAnInteger { key: char },
    /// Hour outside 0..=23 or minute outside 0..=59.
    OutOfRange { key: char },
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingBrackets => write!(f, "expected [H:<h>;M:<m>;F:<g>]"),
            Self::WrongFieldCount(n) => write!(f, "expected 3 fields, found {}", n),
            Self::UnexpectedKey { expected } => write!(f, "expected field '{}:'", expected),
            Self::NotAnInteger { key } => write!(f, "field '{}' is not an unsigned integer", key),
            Self::OutOfRange { key } => write!(f, "field '{}' out of range", key),
        }
    }
}

/// A rejected schedule update.  Carries the offending token so the client
/// sees exactly what failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleError {
    /// Zero-based position of the token in the payload.
    pub index: usize,
    pub token: String,
    pub kind: TokenError,
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid schedule token #{} {:?}: {}",
            self.index, self.token, self.kind
        )
    }
}

impl std::error::Error for ScheduleError {}

// ───────────────────────────────────────────────────────────────
// Parsing
// ───────────────────────────────────────────────────────────────

impl FromStr for ScheduleEntry {
    type Err = TokenError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let inner = token
            .strip_prefix('[')
            .and_then(|t| t.strip_suffix(']'))
            .ok_or(TokenError::MissingBrackets)?;

        let fields: Vec<&str> = inner.split(';').collect();
        let [hour, minute, feed] = fields[..] else {
            return Err(TokenError::WrongFieldCount(fields.len()));
        };

        let hour = field_value(hour, 'H')?;
        let minute = field_value(minute, 'M')?;
        let feed_grams = field_value(feed, 'F')?;

        if hour > 23 {
            return Err(TokenError::OutOfRange { key: 'H' });
        }
        if minute > 59 {
            return Err(TokenError::OutOfRange { key: 'M' });
        }

        Ok(Self {
            hour: hour as u8,
            minute: minute as u8,
            feed_grams,
        })
    }
}

fn field_value(field: &str, key: char) -> Result<u32, TokenError> {
    let value = field
        .strip_prefix(key)
        .and_then(|f| f.strip_prefix(':'))
        .ok_or(TokenError::UnexpectedKey { expected: key })?;
    // `u32::from_str` accepts a leading '+'; the wire format does not.
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TokenError::NotAnInteger { key });
    }
    value.parse().map_err(|_| TokenError::OutOfRange { key })
}

/// Parse a complete schedule update.
///
/// Empty tokens (e.g. an empty body or a trailing comma) are ignored, so an
/// empty payload yields an empty schedule.  Any other malformed token fails
/// the whole update.
pub fn parse_schedule(payload: &str) -> Result<Vec<ScheduleEntry>, ScheduleError> {
    payload
        .split(',')
        .map(str::trim)
        .enumerate()
        .filter(|(_, token)| !token.is_empty())
        .map(|(index, token)| {
            token.parse().map_err(|kind| ScheduleError {
                index,
                token: token.to_owned(),
                kind,
            })
        })
        .collect()
}

//! Bus stop code type.

use std::fmt;

use serde::{Serialize, Serializer};

/// Error returned when parsing an invalid bus stop code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid bus stop code: {reason}")]
pub struct InvalidStopCode {
    reason: &'static str,
}

/// A valid 5-digit bus stop code.
///
/// Stop codes are always exactly 5 ASCII digits, leading zeros included
/// (`"01012"` is not the same stop as `"1012"`). Any `StopCode` value is
/// valid by construction.
///
/// # Examples
///
/// ```
/// use bus_server::domain::StopCode;
///
/// let stop = StopCode::parse("01012").unwrap();
/// assert_eq!(stop.as_str(), "01012");
///
/// // Wrong length is rejected
/// assert!(StopCode::parse("1012").is_err());
/// assert!(StopCode::parse("010120").is_err());
///
/// // Non-digits are rejected
/// assert!(StopCode::parse("0101A").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StopCode([u8; 5]);

impl StopCode {
    /// Parse a stop code from a string.
    ///
    /// The input must be exactly 5 ASCII digits.
    pub fn parse(s: &str) -> Result<Self, InvalidStopCode> {
        let bytes = s.as_bytes();

        if bytes.len() != 5 {
            return Err(InvalidStopCode {
                reason: "must be exactly 5 characters",
            });
        }

        if !bytes.iter().all(u8::is_ascii_digit) {
            return Err(InvalidStopCode {
                reason: "must be ASCII digits 0-9",
            });
        }

        Ok(StopCode([bytes[0], bytes[1], bytes[2], bytes[3], bytes[4]]))
    }

    /// Parse user input, ignoring surrounding whitespace.
    pub fn parse_input(s: &str) -> Result<Self, InvalidStopCode> {
        Self::parse(s.trim())
    }

    /// Returns the stop code as a string slice.
    pub fn as_str(&self) -> &str {
        // SAFETY: We only store ASCII digits
        std::str::from_utf8(&self.0).unwrap()
    }
}

impl fmt::Debug for StopCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StopCode({})", self.as_str())
    }
}

impl fmt::Display for StopCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for StopCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

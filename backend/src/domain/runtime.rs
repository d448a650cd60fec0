//! Movie runtime scalar.
//!
//! A [`Runtime`] counts whole minutes. On the wire it never appears as a bare
//! JSON number; it is always the quoted string `"<minutes> mins"`.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Unexpected};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Marker carried by [`Unexpected::Other`] when a runtime fails to decode.
///
/// Structured decoders can match on it to tell a runtime format failure
/// apart from an ordinary type mismatch.
pub const INVALID_RUNTIME_FORMAT: &str = "invalid runtime format";

const UNIT: &str = "mins";
const EXPECTED: &str = "a string of the form \"<minutes> mins\"";

/// Raised when a value does not match the `"<minutes> mins"` format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid runtime format")]
pub struct RuntimeFormatError;

/// Running time of a movie in minutes.
///
/// # Examples
/// ```
/// use greenlight::domain::Runtime;
///
/// let runtime: Runtime = "102 mins".parse().expect("valid runtime");
/// assert_eq!(runtime.minutes(), 102);
/// assert_eq!(serde_json::to_string(&runtime).expect("serialise"), "\"102 mins\"");
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Runtime(i32);

impl Runtime {
    /// Wrap a trusted minute count.
    #[must_use]
    pub const fn new(minutes: i32) -> Self {
        Self(minutes)
    }

    /// Number of minutes.
    #[must_use]
    pub const fn minutes(self) -> i32 {
        self.0
    }

    /// True for the zero value, which doubles as "not provided".
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl From<i32> for Runtime {
    fn from(minutes: i32) -> Self {
        Self(minutes)
    }
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {UNIT}", self.0)
    }
}

impl FromStr for Runtime {
    type Err = RuntimeFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(' ');
        let (Some(minutes), Some(unit), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(RuntimeFormatError);
        };
        if unit != UNIT {
            return Err(RuntimeFormatError);
        }
        minutes.parse::<i32>().map(Self).map_err(|_| RuntimeFormatError)
    }
}

impl Serialize for Runtime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Runtime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Any JSON shape is accepted here so that numbers, arrays and the like
        // fail as a runtime format error rather than a generic type error.
        match Value::deserialize(deserializer)? {
            Value::String(raw) => raw.parse().map_err(|_| format_error()),
            _ => Err(format_error()),
        }
    }
}

fn format_error<E: de::Error>() -> E {
    E::invalid_value(Unexpected::Other(INVALID_RUNTIME_FORMAT), &EXPECTED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(102)]
    #[case(i32::MAX)]
    fn wire_form_recovers_minutes(#[case] minutes: i32) {
        let wire = serde_json::to_string(&Runtime::new(minutes)).expect("serialise runtime");
        assert_eq!(wire, format!("\"{minutes} mins\""));

        let decoded: Runtime = serde_json::from_str(&wire).expect("decode runtime");
        assert_eq!(decoded.minutes(), minutes);
    }

    #[rstest]
    #[case("102")]
    #[case("102 min")]
    #[case("102 MINS")]
    #[case("102  mins")]
    #[case(" 102 mins")]
    #[case("102 mins extra")]
    #[case("abc mins")]
    #[case("2147483648 mins")]
    #[case("")]
    fn rejects_malformed_strings(#[case] raw: &str) {
        assert_eq!(raw.parse::<Runtime>(), Err(RuntimeFormatError));
    }

    #[rstest]
    #[case("102")]
    #[case("true")]
    #[case("null")]
    #[case("[\"102 mins\"]")]
    #[case("\"102 hours\"")]
    fn rejects_non_runtime_json(#[case] json: &str) {
        let error = serde_json::from_str::<Runtime>(json).expect_err("runtime must not decode");
        assert!(
            error.to_string().contains(INVALID_RUNTIME_FORMAT),
            "unexpected error: {error}"
        );
    }

    #[test]
    fn negative_minutes_parse_for_validation_to_reject() {
        let runtime: Runtime = "-5 mins".parse().expect("signed integers parse");
        assert_eq!(runtime.minutes(), -5);
    }
}

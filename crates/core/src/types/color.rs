//! Hex color type used by tags.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Error returned when a string is not a `#rgb` / `#rrggbb` color.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{0:?} is not a HEX color (expected #rgb or #rrggbb)")]
pub struct ColorError(pub String);

/// A CSS hex color, `#rgb` or `#rrggbb`, stored as typed.
///
/// ```
/// use foodgram_core::HexColor;
///
/// assert!(HexColor::parse("#E26C2D").is_ok());
/// assert!(HexColor::parse("#fff").is_ok());
/// assert!(HexColor::parse("E26C2D").is_err());
/// assert!(HexColor::parse("#12345").is_err());
/// ```
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct HexColor(String);

impl HexColor {
    /// Parse a `HexColor`.
    ///
    /// # Errors
    ///
    /// Returns [`ColorError`] if the input is not `#` followed by 3 or 6 hex digits.
    pub fn parse(s: &str) -> Result<Self, ColorError> {
        let digits = s
            .strip_prefix('#')
            .ok_or_else(|| ColorError(s.to_owned()))?;
        let valid_len = matches!(digits.len(), 3 | 6);
        if !valid_len || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorError(s.to_owned()));
        }
        Ok(Self(s.to_owned()))
    }

    /// Returns the color as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for HexColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for HexColor {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for HexColor {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for HexColor {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_short_and_long_forms() {
        assert!(HexColor::parse("#abc").is_ok());
        assert!(HexColor::parse("#A1b2C3").is_ok());
    }

    #[test]
    fn test_parse_rejects() {
        for bad in ["", "#", "abc", "#abcd", "#gggggg", "#1234567", "##abc"] {
            assert!(HexColor::parse(bad).is_err(), "{bad} should be rejected");
        }
    }
}

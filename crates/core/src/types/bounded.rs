//! Bounded integer quantities used by recipes.
//!
//! Use the `define_bounded!` macro to create an integer newtype that can only
//! hold values in an inclusive range.

use serde::Serialize;

/// Error returned when a value falls outside a bounded type's range.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("must be between {min} and {max} (got {value})")]
pub struct BoundedError {
    /// Rejected value.
    pub value: i64,
    /// Inclusive lower bound.
    pub min: i32,
    /// Inclusive upper bound.
    pub max: i32,
}

macro_rules! define_bounded {
    ($(#[$meta:meta])* $name:ident, $min:expr, $max:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Smallest accepted value.
            pub const MIN: i32 = $min;
            /// Largest accepted value.
            pub const MAX: i32 = $max;

            /// Validate a raw value.
            ///
            /// # Errors
            ///
            /// Returns [`BoundedError`] if `value` is outside `MIN..=MAX`.
            pub fn try_new(value: i64) -> Result<Self, BoundedError> {
                i32::try_from(value)
                    .ok()
                    .filter(|v| (Self::MIN..=Self::MAX).contains(v))
                    .map(Self)
                    .ok_or(BoundedError {
                        value,
                        min: Self::MIN,
                        max: Self::MAX,
                    })
            }

            /// Get the underlying value.
            #[must_use]
            pub const fn get(self) -> i32 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Type<::sqlx::Postgres> for $name {
            fn type_info() -> ::sqlx::postgres::PgTypeInfo {
                <i32 as ::sqlx::Type<::sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &::sqlx::postgres::PgTypeInfo) -> bool {
                <i32 as ::sqlx::Type<::sqlx::Postgres>>::compatible(ty)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'r> ::sqlx::Decode<'r, ::sqlx::Postgres> for $name {
            fn decode(
                value: ::sqlx::postgres::PgValueRef<'r>,
            ) -> ::core::result::Result<Self, ::sqlx::error::BoxDynError> {
                let raw = <i32 as ::sqlx::Decode<::sqlx::Postgres>>::decode(value)?;
                Ok(Self(raw))
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Encode<'_, ::sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut ::sqlx::postgres::PgArgumentBuffer,
            ) -> ::std::result::Result<::sqlx::encode::IsNull, ::sqlx::error::BoxDynError> {
                <i32 as ::sqlx::Encode<::sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }
    };
}

define_bounded!(
    /// Cooking time in minutes, 1 to 3000.
    CookingTime,
    1,
    3000
);

define_bounded!(
    /// Amount of one ingredient in a recipe, 1 to 32767 measurement units.
    Amount,
    1,
    32_767
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cooking_time_bounds() {
        assert!(CookingTime::try_new(0).is_err());
        assert_eq!(CookingTime::try_new(1).map(CookingTime::get), Ok(1));
        assert_eq!(CookingTime::try_new(3000).map(CookingTime::get), Ok(3000));
        assert!(CookingTime::try_new(3001).is_err());
    }

    #[test]
    fn test_amount_bounds() {
        assert!(Amount::try_new(-5).is_err());
        assert!(Amount::try_new(0).is_err());
        assert!(Amount::try_new(200).is_ok());
        assert!(Amount::try_new(32_767).is_ok());
        assert!(Amount::try_new(32_768).is_err());
    }

    #[test]
    fn test_out_of_i32_range() {
        let err = Amount::try_new(i64::MAX).unwrap_err();
        assert_eq!(err.value, i64::MAX);
        assert_eq!(err.to_string(), format!("must be between 1 and 32767 (got {})", i64::MAX));
    }
}

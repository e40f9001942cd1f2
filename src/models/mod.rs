//! Data models
//!
//! Entities as persisted in PostgreSQL, their closed status/role enums and the
//! derived records computed at report time.

pub mod customer;
pub mod maintenance;
pub mod otp;
pub mod profile;
pub mod report;
pub mod trip;
pub mod truck;

/// Lets a `FromStr` enum be read straight out of a `text` column.
///
/// Writes bind `as_str()` explicitly, so only `Type` and `Decode` are needed.
macro_rules! text_column_enum {
    ($ty:ty) => {
        impl sqlx::Type<sqlx::Postgres> for $ty {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <str as sqlx::Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <str as sqlx::Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $ty {
            fn decode(
                value: sqlx::postgres::PgValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let raw = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
                Ok(raw.parse::<$ty>()?)
            }
        }
    };
}

pub(crate) use text_column_enum;

/// Error returned when a stored or requested enum value is unknown.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

/// Allows to create one or more typed ids
///
/// Defines the type and, with the `diesel` feature, implements the traits required
/// to use it as a column value with the postgres backend.
#[macro_export]
macro_rules! diesel_newtype {
    ($($(#[$meta:meta])* $name:ident($to_wrap:ty) => $sql_type:ty),+) => {
        $(
            pub use __newtype_impl::$name;
        )+

        mod __newtype_impl {
            #[cfg(feature = "diesel")]
            use diesel::{AsExpression, FromSqlRow};
            #[cfg(feature = "diesel")]
            use diesel::deserialize::{self, FromSql};
            #[cfg(feature = "diesel")]
            use diesel::pg::{Pg, PgValue};
            #[cfg(feature = "diesel")]
            use diesel::serialize::{self, Output, ToSql};
            use serde::{Deserialize, Serialize};
            use std::fmt;

            $(

            #[derive(
                Debug,
                Clone,
                PartialEq,
                Eq,
                PartialOrd,
                Ord,
                Hash,
                Serialize,
                Deserialize,
            )]
            #[cfg_attr(feature = "diesel", derive(AsExpression, FromSqlRow), diesel(sql_type = $sql_type))]
            $(#[$meta])*
            #[allow(missing_docs)]
            pub struct $name($to_wrap);

            impl $name {
                /// Wrap a value into this type.
                pub const fn from(inner: $to_wrap) -> Self {
                    Self(inner)
                }

                /// Get a reference to the inner type.
                pub fn inner(&self) -> &$to_wrap {
                    &self.0
                }

                /// Destructure this type and extract the inner value.
                pub fn into_inner(self) -> $to_wrap {
                    self.0
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    self.0.fmt(f)
                }
            }

            #[cfg(feature = "diesel")]
            impl ToSql<$sql_type, Pg> for $name {
                fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
                    <$to_wrap as ToSql<$sql_type, Pg>>::to_sql(&self.0, out)
                }
            }

            #[cfg(feature = "diesel")]
            impl FromSql<$sql_type, Pg> for $name {
                fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
                    <$to_wrap as FromSql<$sql_type, Pg>>::from_sql(bytes).map(Self)
                }
            }

            )+
        }
    };
}

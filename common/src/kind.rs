//! Macros for defining kind enums.

use derive_more::{Display, Error};

/// Macro for defining a kind enum.
///
/// Variants are spelled in `snake_case` both in [`Display`] and when parsed,
/// and are stored in a database as `INT2`.
///
/// The calling crate must depend on [`strum`] itself, as its derives refer to
/// `::strum`.
///
/// [`strum`]: https://docs.rs/strum
///
/// # Example
///
/// ```rust
/// # use common::define_kind;
///
/// define_kind! {
///     #[doc = "Shape kind."]
///     enum Kind {
///         #[doc = "A cube"]
///         Cube = 1,
///
///         #[doc = "A sphere"]
///         Sphere = 2,
///     }
/// }
///
/// assert_eq!(Kind::parse("cube").unwrap(), Kind::Cube);
/// assert!(Kind::parse("pyramid").is_err());
/// ```
///
/// [`Display`]: std::fmt::Display
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_kind {
    (
        #[doc = $doc:literal]
        enum $name:ident {
            $(
                #[doc = $variant_doc:literal]
                $variant:ident = $value:expr
            ),* $(,)?
        }
    ) => {
        #[derive(
            Clone,
            Copy,
            Debug,
            $crate::private::strum::Display,
            $crate::private::strum::EnumString,
            $crate::private::strum::VariantNames,
            Eq,
            Hash,
            PartialEq,
        )]
        #[doc = $doc]
        #[repr(u8)]
        #[strum(serialize_all = "snake_case")]
        pub enum $name {
            $(
                 #[doc = $variant_doc]
                 $variant = $value,
            )*
        }

        impl $name {
            /// Converts this into its [`u8`] representation.
            #[must_use]
            pub const fn u8(self) -> u8 {
                self as u8
            }

            /// Parses the provided `input` into this kind.
            ///
            /// # Errors
            ///
            /// If the `input` doesn't name any of the variants.
            pub fn parse(input: &str) -> Result<Self, $crate::UnknownKind> {
                use $crate::private::strum::VariantNames as _;

                input.parse().map_err(|_| $crate::UnknownKind {
                    kind: ::core::stringify!($name),
                    expected: Self::VARIANTS,
                })
            }
        }

        #[cfg(feature = "postgres")]
        impl<'a> $crate::private::postgres_types::FromSql<'a> for $name {
            $crate::private::postgres_types::accepts!(INT2);

            fn from_sql(
                ty: &$crate::private::postgres_types::Type,
                raw: &[u8],
            ) -> Result<
                $name,
                Box<dyn ::std::error::Error
                    + ::core::marker::Sync
                    + ::core::marker::Send>,
            > {
                match u8::try_from(i16::from_sql(ty, raw)?)? {
                    $(
                        v if Self::$variant.u8() == v => Ok(Self::$variant),
                    )*
                    v => Err(::std::format!(
                        "invalid `{}` value: {v}",
                        ::core::stringify!($name),
                    ).into()),
                }
            }
        }

        #[cfg(feature = "postgres")]
        impl $crate::private::postgres_types::ToSql for $name {
            $crate::private::postgres_types::accepts!(INT2);
            $crate::private::postgres_types::to_sql_checked!();

            fn to_sql(
                &self,
                ty: &$crate::private::postgres_types::Type,
                w: &mut $crate::private::postgres_types::private::BytesMut,
            ) -> Result<
                $crate::private::postgres_types::IsNull,
                ::std::boxed::Box<
                    dyn ::std::error::Error
                        + ::core::marker::Sync
                        + ::core::marker::Send
                >,
            > {
                i16::from(self.u8()).to_sql(ty, w)
            }
        }
    };
}

/// Error of parsing a kind enum from a string naming none of its variants.
#[derive(Clone, Copy, Debug, Display, Error)]
#[display("unknown `{kind}` value, expected one of: {}", expected.join(", "))]
pub struct UnknownKind {
    /// Name of the kind enum.
    pub kind: &'static str,

    /// Names of all the variants of the kind enum.
    pub expected: &'static [&'static str],
}

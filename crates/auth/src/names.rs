//! Closed, string-named enums (roles, resources, permissions).
//!
//! Each enum gets a stable wire name used by serde, `Display` and `FromStr`,
//! so untrusted strings are parsed exactly once at a boundary.

use thiserror::Error;

/// A string did not name any variant of a closed enum.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown {kind} '{name}'")]
pub struct UnknownName {
    pub kind: &'static str,
    pub name: String,
}

impl UnknownName {
    pub fn new(kind: &'static str, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

macro_rules! named_enum {
    (
        $(#[$meta:meta])*
        pub enum $t:ident : $kind:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $name:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord,
            serde::Serialize, serde::Deserialize,
        )]
        pub enum $t {
            $( $(#[$vmeta])* #[serde(rename = $name)] $variant ),+
        }

        impl $t {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$t] = &[$($t::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $t::$variant => $name ),+
                }
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl core::str::FromStr for $t {
            type Err = $crate::names::UnknownName;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $name => Ok($t::$variant), )+
                    other => Err($crate::names::UnknownName::new($kind, other)),
                }
            }
        }
    };
}

pub(crate) use named_enum;

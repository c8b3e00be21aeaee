#![forbid(unsafe_code)]

pub mod closure;
pub mod entities;
pub mod names;
pub mod paths;
pub mod query;

pub mod ids {
    use serde::{Deserialize, Serialize};

    macro_rules! row_id {
        ($name:ident) => {
            #[derive(
                Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
            )]
            #[serde(transparent)]
            pub struct $name(i64);

            impl $name {
                pub const fn new(value: i64) -> Self {
                    Self(value)
                }

                pub const fn get(self) -> i64 {
                    self.0
                }
            }

            impl std::fmt::Display for $name {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    write!(f, "{}", self.0)
                }
            }
        };
    }

    row_id!(TagId);
    row_id!(ValueId);
    row_id!(FileId);

    impl ValueId {
        /// Row id stored in place of a value when a tag is applied on its own.
        pub const NONE_ROW: i64 = 0;

        /// Maps the stored column back to an optional value; `0` and `NULL` mean "no value".
        pub fn from_row(raw: Option<i64>) -> Option<Self> {
            match raw {
                None | Some(Self::NONE_ROW) => None,
                Some(id) => Some(Self(id)),
            }
        }

        pub fn to_row(value: Option<Self>) -> i64 {
            value.map_or(Self::NONE_ROW, Self::get)
        }
    }
}

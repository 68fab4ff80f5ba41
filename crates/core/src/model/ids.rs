use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Backend rows are keyed by UUIDs; each table gets its own newtype so a
/// course id can never be passed where a user id is expected.
macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            #[must_use]
            pub fn new(id: Uuid) -> Self {
                Self(id)
            }

            /// Generates a fresh random id. Used by in-memory backends and tests;
            /// the hosted backend assigns ids itself.
            #[must_use]
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            #[must_use]
            pub fn value(&self) -> Uuid {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim())
                    .map(Self)
                    .map_err(|_| ParseIdError {
                        kind: stringify!($name),
                    })
            }
        }
    };
}

uuid_id!(
    /// Identifier of a row in the `courses` table.
    CourseId
);
uuid_id!(
    /// Identifier of an authenticated account.
    UserId
);
uuid_id!(
    /// Identifier of a row in the `user_progress` table.
    ProgressId
);

/// Error type for parsing an id from a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: &'static str,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from string", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW: &str = "7f1c2a9e-4b3d-4e8a-9f6b-2d5c8e1a3b4f";

    #[test]
    fn course_id_parses_and_displays() {
        let id: CourseId = RAW.parse().unwrap();
        assert_eq!(id.to_string(), RAW);
    }

    #[test]
    fn id_parse_trims_whitespace() {
        let id: UserId = format!("  {RAW}\n").parse().unwrap();
        assert_eq!(id.value(), Uuid::parse_str(RAW).unwrap());
    }

    #[test]
    fn invalid_id_names_its_kind() {
        let err = "not-a-uuid".parse::<ProgressId>().unwrap_err();
        assert_eq!(err.to_string(), "failed to parse ProgressId from string");
    }

    #[test]
    fn debug_includes_type_name() {
        let id: CourseId = RAW.parse().unwrap();
        assert_eq!(format!("{id:?}"), format!("CourseId({RAW})"));
    }

    #[test]
    fn serializes_as_bare_string() {
        let id: CourseId = RAW.parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{RAW}\""));
    }
}

//! Record identity: store-assigned integer keys with kind prefixes
//!
//! The backing store assigns every record a positive integer key. Keys are
//! serialized as bare integers; at the CLI they may also be written with a
//! kind prefix (`PART-12`, `CAR-7`) so that ids of different record kinds are
//! not confused in mixed output.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Record kind prefixes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordKind {
    /// Racing team
    Team,
    /// Car (chassis)
    Car,
    /// Regulated component
    Part,
    /// Installation record linking a part to a car
    Inst,
}

impl RecordKind {
    /// Get the string representation of the prefix
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Team => "TEAM",
            RecordKind::Car => "CAR",
            RecordKind::Part => "PART",
            RecordKind::Inst => "INST",
        }
    }

    /// Get all valid prefixes
    pub fn all() -> &'static [RecordKind] {
        &[
            RecordKind::Team,
            RecordKind::Car,
            RecordKind::Part,
            RecordKind::Inst,
        ]
    }

    /// Snapshot sub-directory holding records of this kind
    pub fn directory(&self) -> &'static str {
        match self {
            RecordKind::Team => "teams",
            RecordKind::Car => "cars",
            RecordKind::Part => "parts",
            RecordKind::Inst => "car_parts",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "TEAM" => Ok(RecordKind::Team),
            "CAR" => Ok(RecordKind::Car),
            "PART" => Ok(RecordKind::Part),
            "INST" => Ok(RecordKind::Inst),
            _ => Err(IdParseError::InvalidPrefix(s.to_string())),
        }
    }
}

/// Parse `"12"` or `"<PREFIX>-12"` into a key, checking the prefix against `kind`
fn parse_key(s: &str, kind: RecordKind) -> Result<i64, IdParseError> {
    let digits = match s.split_once('-') {
        Some((prefix, rest)) => {
            let found: RecordKind = prefix.parse()?;
            if found != kind {
                return Err(IdParseError::WrongKind {
                    expected: kind,
                    found,
                });
            }
            rest
        }
        None => s,
    };

    let key: i64 = digits
        .trim()
        .parse()
        .map_err(|_| IdParseError::InvalidNumber(s.to_string()))?;
    if key <= 0 {
        return Err(IdParseError::InvalidNumber(s.to_string()));
    }
    Ok(key)
}

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident, $kind:expr) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// The record kind this id belongs to
            pub const KIND: RecordKind = $kind;

            /// Raw store key
            pub fn get(self) -> i64 {
                self.0
            }

            /// Prefixed form, e.g. `PART-12`
            pub fn labelled(self) -> String {
                format!("{}-{}", Self::KIND, self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_key(s, Self::KIND).map($name)
            }
        }
    };
}

record_id!(
    /// Team primary key
    TeamId,
    RecordKind::Team
);
record_id!(
    /// Car primary key
    CarId,
    RecordKind::Car
);
record_id!(
    /// Part primary key
    PartId,
    RecordKind::Part
);
record_id!(
    /// Installation (car part) primary key
    CarPartId,
    RecordKind::Inst
);

/// Errors that can occur when parsing record ids
#[derive(Debug, Error)]
pub enum IdParseError {
    #[error("invalid record prefix: '{0}' (valid: TEAM, CAR, PART, INST)")]
    InvalidPrefix(String),

    #[error("expected a {expected} id, got a {found} id")]
    WrongKind {
        expected: RecordKind,
        found: RecordKind,
    },

    #[error("invalid record number in '{0}': ids are positive integers")]
    InvalidNumber(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_number_parses() {
        let id: PartId = "12".parse().unwrap();
        assert_eq!(id, PartId(12));
        assert_eq!(id.to_string(), "12");
    }

    #[test]
    fn test_prefixed_id_parses_case_insensitively() {
        assert_eq!("PART-12".parse::<PartId>().unwrap(), PartId(12));
        assert_eq!("part-12".parse::<PartId>().unwrap(), PartId(12));
        assert_eq!("INST-40".parse::<CarPartId>().unwrap(), CarPartId(40));
    }

    #[test]
    fn test_wrong_kind_rejected() {
        let err = "CAR-7".parse::<PartId>().unwrap_err();
        assert!(matches!(
            err,
            IdParseError::WrongKind {
                expected: RecordKind::Part,
                found: RecordKind::Car
            }
        ));
    }

    #[test]
    fn test_invalid_numbers_rejected() {
        assert!(matches!(
            "PART-abc".parse::<PartId>().unwrap_err(),
            IdParseError::InvalidNumber(_)
        ));
        assert!(matches!(
            "0".parse::<TeamId>().unwrap_err(),
            IdParseError::InvalidNumber(_)
        ));
        assert!(matches!(
            "XYZ-1".parse::<TeamId>().unwrap_err(),
            IdParseError::InvalidPrefix(_)
        ));
    }

    #[test]
    fn test_labelled() {
        assert_eq!(CarId(7).labelled(), "CAR-7");
        assert_eq!(CarPartId(3).labelled(), "INST-3");
    }

    #[test]
    fn test_serializes_as_bare_integer() {
        let json = serde_json::to_string(&TeamId(5)).unwrap();
        assert_eq!(json, "5");
        let back: TeamId = serde_json::from_str("5").unwrap();
        assert_eq!(back, TeamId(5));
    }

    #[test]
    fn test_all_kinds_parse() {
        for kind in RecordKind::all() {
            assert_eq!(kind.as_str().parse::<RecordKind>().unwrap(), *kind);
        }
    }
}

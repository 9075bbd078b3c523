//! API credential scopes and their implication lattice.
//!
//! Scopes form a small closed hierarchy rather than ad hoc strings:
//! `admin` implies `write` and `read`, `write` implies `read`, `read`
//! implies nothing further. Authorization checks go through
//! [`has_scope`], which honors the implication, never exact-match
//! equality.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A named permission level attached to an API credential.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Read access to the organization's data.
    Read,
    /// Mutating access; implies `read`.
    Write,
    /// Administrative access; implies `write` and `read`.
    Admin,
}

impl Scope {
    /// Every scope value.
    pub const ALL: [Self; 3] = [Self::Read, Self::Write, Self::Admin];

    /// Wire representation of the scope.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Admin => "admin",
        }
    }

    /// Whether holding `self` satisfies a requirement for `required`.
    ///
    /// The lattice is spelled out exhaustively so every cell is testable.
    #[must_use]
    pub const fn implies(self, required: Self) -> bool {
        match (self, required) {
            (Self::Admin, _) | (Self::Write, Self::Write | Self::Read) | (Self::Read, Self::Read) => {
                true
            }
            (Self::Write, Self::Admin) | (Self::Read, Self::Write | Self::Admin) => false,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown scope string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown scope: {0}")]
pub struct UnknownScope(pub String);

impl FromStr for Scope {
    type Err = UnknownScope;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(Self::Read),
            "write" => Ok(Self::Write),
            "admin" => Ok(Self::Admin),
            other => Err(UnknownScope(other.to_string())),
        }
    }
}

/// Whether any granted scope satisfies `required`.
#[must_use]
pub fn has_scope(granted: &[Scope], required: Scope) -> bool {
    granted.iter().any(|scope| scope.implies(required))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_implies_everything() {
        assert!(has_scope(&[Scope::Admin], Scope::Read));
        assert!(has_scope(&[Scope::Admin], Scope::Write));
        assert!(has_scope(&[Scope::Admin], Scope::Admin));
    }

    #[test]
    fn write_implies_read_but_not_admin() {
        assert!(has_scope(&[Scope::Write], Scope::Read));
        assert!(has_scope(&[Scope::Write], Scope::Write));
        assert!(!has_scope(&[Scope::Write], Scope::Admin));
    }

    #[test]
    fn read_implies_only_read() {
        assert!(has_scope(&[Scope::Read], Scope::Read));
        assert!(!has_scope(&[Scope::Read], Scope::Write));
        assert!(!has_scope(&[Scope::Read], Scope::Admin));
    }

    #[test]
    fn empty_grant_satisfies_nothing() {
        for required in Scope::ALL {
            assert!(!has_scope(&[], required));
        }
    }

    #[test]
    fn implication_matrix_is_exact() {
        let expected = [
            // (granted, required, implied)
            (Scope::Read, Scope::Read, true),
            (Scope::Read, Scope::Write, false),
            (Scope::Read, Scope::Admin, false),
            (Scope::Write, Scope::Read, true),
            (Scope::Write, Scope::Write, true),
            (Scope::Write, Scope::Admin, false),
            (Scope::Admin, Scope::Read, true),
            (Scope::Admin, Scope::Write, true),
            (Scope::Admin, Scope::Admin, true),
        ];
        for (granted, required, implied) in expected {
            assert_eq!(granted.implies(required), implied, "{granted} -> {required}");
        }
    }

    #[test]
    fn wire_form_round_trips() {
        for scope in Scope::ALL {
            assert_eq!(scope.as_str().parse::<Scope>(), Ok(scope));
            let json = serde_json::to_string(&scope).expect("serializes");
            assert_eq!(json, format!("\"{}\"", scope.as_str()));
        }
        assert!("owner".parse::<Scope>().is_err());
    }
}

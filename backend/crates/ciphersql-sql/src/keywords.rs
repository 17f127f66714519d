//! Mutating SQL keywords.
//!
//! Used by the token-level fallback check. A bare word token matching one
//! of these keywords causes the query to be rejected, no matter where it
//! appears outside of strings, quoted identifiers and comments.

use std::fmt;
use std::str::FromStr;

/// Keywords that introduce a state-changing statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutatingKeyword {
    Drop,
    Delete,
    Truncate,
    Alter,
    Create,
    Insert,
    Update,
}

impl MutatingKeyword {
    pub const ALL: [MutatingKeyword; 7] = [
        MutatingKeyword::Drop,
        MutatingKeyword::Delete,
        MutatingKeyword::Truncate,
        MutatingKeyword::Alter,
        MutatingKeyword::Create,
        MutatingKeyword::Insert,
        MutatingKeyword::Update,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MutatingKeyword::Drop => "DROP",
            MutatingKeyword::Delete => "DELETE",
            MutatingKeyword::Truncate => "TRUNCATE",
            MutatingKeyword::Alter => "ALTER",
            MutatingKeyword::Create => "CREATE",
            MutatingKeyword::Insert => "INSERT",
            MutatingKeyword::Update => "UPDATE",
        }
    }
}

impl FromStr for MutatingKeyword {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "DROP" => Ok(MutatingKeyword::Drop),
            "DELETE" => Ok(MutatingKeyword::Delete),
            "TRUNCATE" => Ok(MutatingKeyword::Truncate),
            "ALTER" => Ok(MutatingKeyword::Alter),
            "CREATE" => Ok(MutatingKeyword::Create),
            "INSERT" => Ok(MutatingKeyword::Insert),
            "UPDATE" => Ok(MutatingKeyword::Update),
            _ => Err(()),
        }
    }
}

impl fmt::Display for MutatingKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_all() {
        for kw in MutatingKeyword::ALL {
            assert_eq!(kw.as_str().parse::<MutatingKeyword>(), Ok(kw));
        }
    }

    #[test]
    fn test_case_insensitive_and_exact() {
        assert_eq!("drop".parse::<MutatingKeyword>(), Ok(MutatingKeyword::Drop));
        assert!("created_at".parse::<MutatingKeyword>().is_err());
        assert!("SELECT".parse::<MutatingKeyword>().is_err());
    }
}

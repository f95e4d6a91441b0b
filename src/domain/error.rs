//! Extraction errors.
//!
//! Every failure is fatal to the whole run; the caller sees either a complete
//! program or exactly one of these.

use thiserror::Error;

use super::type_graph::Position;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    /// No struct in the package has methods and a matching constructor.
    #[error("no class found")]
    NoClassFound,

    #[error("function return type should be error or (type, error)")]
    IncorrectReturnTuple,

    #[error("map key should be string")]
    InvalidMapKey,

    /// Raised for unrepresentable types under the strict policy.
    #[error("invalid type: {0}")]
    InvalidType(String),
}

/// An [`ErrorKind`] with the source position of the offending declaration,
/// when one is known.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct ExtractError {
    pub kind: ErrorKind,
    pub position: Option<Position>,
}

impl ExtractError {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            position: None,
        }
    }

    /// Attaches `position` unless a more specific one is already present.
    pub fn or_position(mut self, position: Option<&Position>) -> Self {
        if self.position.is_none() {
            self.position = position.cloned();
        }
        self
    }
}

impl From<ErrorKind> for ExtractError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(line: u32) -> Position {
        Position {
            file: "svc.go".to_string(),
            line,
            column: 2,
        }
    }

    #[test]
    fn test_messages() {
        assert_eq!(ExtractError::new(ErrorKind::NoClassFound).to_string(), "no class found");
        assert_eq!(
            ExtractError::new(ErrorKind::IncorrectReturnTuple).to_string(),
            "function return type should be error or (type, error)"
        );
        assert_eq!(
            ExtractError::new(ErrorKind::InvalidType("chan".to_string())).to_string(),
            "invalid type: chan"
        );
    }

    #[test]
    fn test_first_position_wins() {
        let err = ExtractError::new(ErrorKind::InvalidMapKey)
            .or_position(Some(&pos(4)))
            .or_position(Some(&pos(9)));
        assert_eq!(err.position, Some(pos(4)));

        let err = ExtractError::new(ErrorKind::InvalidMapKey).or_position(None);
        assert_eq!(err.position, None);
    }
}

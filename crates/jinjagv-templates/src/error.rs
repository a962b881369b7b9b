use thiserror::Error;

/// Errors raised while parsing one template document.
///
/// Positions are byte offsets into the source; callers map them to
/// line/column with [`crate::LineOffsets`] when reporting.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("unclosed construct at position {position}: {content:?}")]
    UnclosedConstruct { position: usize, content: String },

    #[error("empty tag at position {position}")]
    EmptyTag { position: usize },

    #[error("unknown tag '{name}' at position {position}")]
    UnknownTag { name: String, position: usize },

    #[error("unexpected tag '{name}' at position {position}, expected {expected}")]
    UnexpectedTag {
        name: String,
        position: usize,
        expected: String,
    },

    #[error("'{tag}' at position {position} was never closed, expected {expected}")]
    UnclosedTag {
        tag: String,
        position: usize,
        expected: String,
    },

    #[error("endblock '{found}' does not match open block '{expected}' at position {position}")]
    MismatchedEndBlock {
        expected: String,
        found: String,
        position: usize,
    },

    #[error("expected {expected}, found {found} at position {position}")]
    ExpectedToken {
        expected: String,
        found: String,
        position: usize,
    },

    #[error("expected an expression at position {position}")]
    ExpectedExpression { position: usize },

    #[error("unexpected character {character:?} at position {position}")]
    UnexpectedCharacter { character: char, position: usize },

    #[error("unterminated string literal at position {position}")]
    UnterminatedString { position: usize },

    #[error("invalid number literal {literal:?} at position {position}")]
    InvalidNumber { literal: String, position: usize },

    #[error("trailing content {content:?} in tag at position {position}")]
    TrailingContent { content: String, position: usize },
}

impl ParseError {
    /// Byte offset the error points at, for line/column mapping with
    /// [`crate::LineOffsets`].
    #[must_use]
    pub fn position(&self) -> usize {
        match self {
            Self::UnclosedConstruct { position, .. }
            | Self::EmptyTag { position }
            | Self::UnknownTag { position, .. }
            | Self::UnexpectedTag { position, .. }
            | Self::UnclosedTag { position, .. }
            | Self::MismatchedEndBlock { position, .. }
            | Self::ExpectedToken { position, .. }
            | Self::ExpectedExpression { position }
            | Self::UnexpectedCharacter { position, .. }
            | Self::UnterminatedString { position }
            | Self::InvalidNumber { position, .. }
            | Self::TrailingContent { position, .. } => *position,
        }
    }
}

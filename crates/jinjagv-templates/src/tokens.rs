use crate::spans::Span;

pub const BLOCK_TAG_START: &str = "{%";
pub const BLOCK_TAG_END: &str = "%}";
pub const VARIABLE_TAG_START: &str = "{{";
pub const VARIABLE_TAG_END: &str = "}}";
pub const COMMENT_TAG_START: &str = "{#";
pub const COMMENT_TAG_END: &str = "#}";

/// One lexed region of a template source.
///
/// `content` for the delimited variants is the text between the delimiters,
/// trimmed; `offset` is the byte position of that trimmed content in the
/// source, so error positions stay exact when the lexer drops leading
/// whitespace. [`Token::Error`] keeps the construct's start instead, since
/// its content never parses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    /// `{% ... %}`
    Block { content: String, offset: usize },
    /// `{{ ... }}`
    Variable { content: String, offset: usize },
    /// `{# ... #}`
    Comment { content: String, offset: usize },
    Text { content: String, offset: usize },
    /// An opening delimiter whose closing delimiter never appeared.
    Error { content: String, offset: usize },
    Eof,
}

impl Token {
    /// Span of the token's content, excluding delimiters for the tag forms.
    #[must_use]
    pub fn content_span(&self) -> Span {
        let (start, length) = match self {
            Token::Block { content, offset }
            | Token::Variable { content, offset }
            | Token::Comment { content, offset }
            | Token::Text { content, offset }
            | Token::Error { content, offset } => (*offset, content.len()),
            Token::Eof => (0, 0),
        };
        Span::new(
            u32::try_from(start).unwrap_or(u32::MAX),
            u32::try_from(length).unwrap_or(u32::MAX),
        )
    }
}

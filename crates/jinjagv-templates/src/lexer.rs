use crate::spans::LineOffsets;
use crate::tokens::Token;
use crate::tokens::BLOCK_TAG_END;
use crate::tokens::BLOCK_TAG_START;
use crate::tokens::COMMENT_TAG_END;
use crate::tokens::COMMENT_TAG_START;
use crate::tokens::VARIABLE_TAG_END;
use crate::tokens::VARIABLE_TAG_START;

/// Splits template source into text regions and `{% %}` / `{{ }}` / `{# #}`
/// constructs. Unterminated constructs become [`Token::Error`] so the parser
/// can report a position instead of the lexer panicking or looping.
///
/// Everything between `{% raw %}` and `{% endraw %}` is lexed as literal
/// text, so raw bodies may contain unbalanced delimiters.
pub struct Lexer {
    source: String,
    start: usize,
    current: usize,
}

impl Lexer {
    #[must_use]
    pub fn new(source: &str) -> Self {
        Lexer {
            source: String::from(source),
            start: 0,
            current: 0,
        }
    }

    pub fn tokenize(&mut self) -> (Vec<Token>, LineOffsets) {
        let line_offsets = LineOffsets::from_source(&self.source);
        let mut tokens = Vec::new();
        let mut in_raw = false;

        while !self.is_at_end() {
            self.start = self.current;

            if in_raw {
                in_raw = false;
                if !self.is_endraw_at(self.current) {
                    tokens.push(self.lex_raw_text());
                }
                continue;
            }

            let token = match self.peek() {
                '{' => match self.peek_next() {
                    '%' => self.lex_construct(BLOCK_TAG_END, |content, offset| Token::Block {
                        content,
                        offset,
                    }),
                    '{' => {
                        self.lex_construct(VARIABLE_TAG_END, |content, offset| Token::Variable {
                            content,
                            offset,
                        })
                    }
                    '#' => {
                        self.lex_construct(COMMENT_TAG_END, |content, offset| Token::Comment {
                            content,
                            offset,
                        })
                    }
                    _ => self.lex_text(),
                },
                _ => self.lex_text(),
            };

            if let Token::Block { content, .. } = &token {
                if is_raw_tag(content) {
                    in_raw = true;
                }
            }

            tokens.push(token);
        }

        tokens.push(Token::Eof);

        (tokens, line_offsets)
    }

    fn lex_construct(
        &mut self,
        end: &str,
        token_fn: impl FnOnce(String, usize) -> Token,
    ) -> Token {
        let construct_offset = self.start;

        self.consume_n(2);
        let inner_offset = self.current;

        match self.consume_until(end) {
            Ok(text) => {
                self.consume_n(2);
                let leading = text.len() - text.trim_start().len();
                token_fn(text.trim().to_string(), inner_offset + leading)
            }
            Err(err_text) => Token::Error {
                content: err_text.trim().to_string(),
                offset: construct_offset,
            },
        }
    }

    /// Literal text between `{% raw %}` and the next `endraw` tag (or the
    /// end of the source if there is none; the parser reports that).
    fn lex_raw_text(&mut self) -> Token {
        while !self.is_at_end() && !self.is_endraw_at(self.current) {
            self.consume();
        }

        Token::Text {
            content: self.source[self.start..self.current].to_string(),
            offset: self.start,
        }
    }

    fn is_endraw_at(&self, pos: usize) -> bool {
        let Some(rest) = self.source[pos..].strip_prefix(BLOCK_TAG_START) else {
            return false;
        };
        let rest = rest.strip_prefix(['-', '+']).unwrap_or(rest);
        match rest.trim_start().strip_prefix("endraw") {
            Some(rest) => !rest.starts_with(|c: char| c.is_alphanumeric() || c == '_'),
            None => false,
        }
    }

    fn lex_text(&mut self) -> Token {
        let text_start = self.current;

        while !self.is_at_end() {
            if self.source[self.current..].starts_with(BLOCK_TAG_START)
                || self.source[self.current..].starts_with(VARIABLE_TAG_START)
                || self.source[self.current..].starts_with(COMMENT_TAG_START)
            {
                break;
            }
            self.consume();
        }

        Token::Text {
            content: self.source[text_start..self.current].to_string(),
            offset: self.start,
        }
    }

    #[inline]
    fn peek(&self) -> char {
        self.source[self.current..].chars().next().unwrap_or('\0')
    }

    fn peek_next(&self) -> char {
        let mut chars = self.source[self.current..].chars();
        chars.next();
        chars.next().unwrap_or('\0')
    }

    #[inline]
    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    #[inline]
    fn consume(&mut self) {
        if let Some(ch) = self.source[self.current..].chars().next() {
            self.current += ch.len_utf8();
        }
    }

    fn consume_n(&mut self, count: usize) {
        for _ in 0..count {
            self.consume();
        }
    }

    fn consume_until(&mut self, delimiter: &str) -> Result<String, String> {
        let offset = self.current;

        while self.current < self.source.len() {
            if self.source[self.current..].starts_with(delimiter) {
                return Ok(self.source[offset..self.current].to_string());
            }
            self.consume();
        }

        Err(self.source[offset..self.current].to_string())
    }
}

fn is_raw_tag(content: &str) -> bool {
    let content = content.strip_prefix(['-', '+']).unwrap_or(content);
    let content = content.strip_suffix(['-', '+']).unwrap_or(content);
    content.trim() == "raw"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Vec<Token> {
        let (tokens, _) = Lexer::new(source).tokenize();
        tokens
    }

    #[test]
    fn test_tokenize_text_only() {
        let tokens = lex("<div>hello</div>");
        assert_eq!(
            tokens,
            vec![
                Token::Text {
                    content: "<div>hello</div>".to_string(),
                    offset: 0
                },
                Token::Eof
            ]
        );
    }

    #[test]
    fn test_tokenize_variable() {
        let tokens = lex("{{ user.name|title }}");
        assert_eq!(
            tokens,
            vec![
                Token::Variable {
                    content: "user.name|title".to_string(),
                    offset: 3
                },
                Token::Eof
            ]
        );
    }

    #[test]
    fn test_tokenize_block_and_comment() {
        let tokens = lex("{% block body %}{# note #}{% endblock %}");
        assert_eq!(
            tokens,
            vec![
                Token::Block {
                    content: "block body".to_string(),
                    offset: 3
                },
                Token::Comment {
                    content: "note".to_string(),
                    offset: 19
                },
                Token::Block {
                    content: "endblock".to_string(),
                    offset: 29
                },
                Token::Eof
            ]
        );
    }

    #[test]
    fn test_tokenize_mixed() {
        let tokens = lex("a {{ x }} b {% if x %}c{% endif %}");
        let kinds: Vec<&str> = tokens
            .iter()
            .map(|t| match t {
                Token::Text { .. } => "text",
                Token::Variable { .. } => "var",
                Token::Block { .. } => "block",
                Token::Comment { .. } => "comment",
                Token::Error { .. } => "error",
                Token::Eof => "eof",
            })
            .collect();
        assert_eq!(
            kinds,
            vec!["text", "var", "text", "block", "text", "block", "eof"]
        );
    }

    #[test]
    fn test_tokenize_unclosed_variable() {
        let tokens = lex("{{ user");
        assert_eq!(
            tokens,
            vec![
                Token::Error {
                    content: "user".to_string(),
                    offset: 0
                },
                Token::Eof
            ]
        );
    }

    #[test]
    fn test_tokenize_lone_brace_is_text() {
        let tokens = lex("a { b");
        assert_eq!(
            tokens,
            vec![
                Token::Text {
                    content: "a { b".to_string(),
                    offset: 0
                },
                Token::Eof
            ]
        );
    }

    #[test]
    fn test_tokenize_multiline_offsets() {
        let source = "line one\n{{ x }}\n";
        let (tokens, offsets) = Lexer::new(source).tokenize();
        let var_offset = tokens
            .iter()
            .find_map(|t| match t {
                Token::Variable { offset, .. } => Some(*offset),
                _ => None,
            })
            .unwrap();
        assert_eq!(offsets.position_to_line_col(var_offset), (2, 3));
    }

    #[test]
    fn test_tokenize_raw_content_is_literal() {
        let tokens = lex("{% raw %}{{ {% if %} #}{% endraw %}");
        assert_eq!(
            tokens,
            vec![
                Token::Block {
                    content: "raw".to_string(),
                    offset: 3
                },
                Token::Text {
                    content: "{{ {% if %} #}".to_string(),
                    offset: 9
                },
                Token::Block {
                    content: "endraw".to_string(),
                    offset: 26
                },
                Token::Eof
            ]
        );
    }

    #[test]
    fn test_tokenize_raw_without_endraw_runs_to_end() {
        let tokens = lex("{% raw %}{{ x");
        assert_eq!(
            tokens,
            vec![
                Token::Block {
                    content: "raw".to_string(),
                    offset: 3
                },
                Token::Text {
                    content: "{{ x".to_string(),
                    offset: 9
                },
                Token::Eof
            ]
        );
    }
}

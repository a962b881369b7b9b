//! Expression grammar for tag and variable contents.
//!
//! Covers the subset of the Jinja expression language the structural
//! fact-sets need: names, literals, attribute/subscript access, calls,
//! filter chains, tests, the usual operators with Jinja precedence, and
//! tuple/list/dict literals. Precedence follows Jinja's parser: `or` <
//! `and` < `not` < comparisons < `+`/`-` < `~` < `*`/`/`/`//`/`%` < `**`
//! < unary < postfix (attributes, calls, filters, tests).

use crate::error::ParseError;

#[derive(Clone, Debug, PartialEq)]
pub enum Const {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    None,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
    Pos,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Rem,
    Pow,
    Concat,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    NotIn,
    And,
    Or,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Const(Const),
    Name(String),
    Attr {
        obj: Box<Expr>,
        name: String,
    },
    Item {
        obj: Box<Expr>,
        index: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        kwargs: Vec<(String, Expr)>,
    },
    Filter {
        value: Box<Expr>,
        name: String,
        args: Vec<Expr>,
        kwargs: Vec<(String, Expr)>,
    },
    Test {
        value: Box<Expr>,
        name: String,
        args: Vec<Expr>,
        negated: bool,
    },
    Unary {
        op: UnaryOp,
        value: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Cond {
        test: Box<Expr>,
        then: Box<Expr>,
        otherwise: Option<Box<Expr>>,
    },
    List(Vec<Expr>),
    Tuple(Vec<Expr>),
    Dict(Vec<(Expr, Expr)>),
}

impl Expr {
    /// True for expressions whose value is fully known at parse time.
    #[must_use]
    pub fn is_constant(&self) -> bool {
        match self {
            Expr::Const(_) => true,
            Expr::List(items) | Expr::Tuple(items) => items.iter().all(Expr::is_constant),
            _ => false,
        }
    }
}

const RESERVED: &[&str] = &["and", "or", "not", "if", "else", "in", "is"];

#[derive(Clone, Debug, PartialEq)]
enum ExprToken {
    Name(String),
    Str(String),
    Int(i64),
    Float(f64),
    Sym(&'static str),
}

#[derive(Clone, Debug, PartialEq)]
struct SpannedToken {
    token: ExprToken,
    offset: usize,
}

const TWO_CHAR_SYMS: &[&str] = &["**", "//", "==", "!=", ">=", "<="];
const ONE_CHAR_SYMS: &[&str] = &[
    "+", "-", "*", "/", "%", "~", "|", ".", ",", ":", "(", ")", "[", "]", "{", "}", "=", "<", ">",
];

fn tokenize(content: &str, base: usize) -> Result<Vec<SpannedToken>, ParseError> {
    let bytes = content.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < content.len() {
        let rest = &content[pos..];
        let ch = rest.chars().next().unwrap_or('\0');

        if ch.is_whitespace() {
            pos += ch.len_utf8();
            continue;
        }

        if ch == '\'' || ch == '"' {
            let (value, consumed) = lex_string(rest, ch, base + pos)?;
            tokens.push(SpannedToken {
                token: ExprToken::Str(value),
                offset: base + pos,
            });
            pos += consumed;
            continue;
        }

        if ch.is_ascii_digit() {
            let (token, consumed) = lex_number(rest, base + pos)?;
            tokens.push(SpannedToken {
                token,
                offset: base + pos,
            });
            pos += consumed;
            continue;
        }

        if ch.is_alphabetic() || ch == '_' {
            let end = rest
                .char_indices()
                .find(|(_, c)| !(c.is_alphanumeric() || *c == '_'))
                .map_or(rest.len(), |(idx, _)| idx);
            tokens.push(SpannedToken {
                token: ExprToken::Name(rest[..end].to_string()),
                offset: base + pos,
            });
            pos += end;
            continue;
        }

        if let Some(sym) = TWO_CHAR_SYMS.iter().find(|s| rest.starts_with(**s)) {
            tokens.push(SpannedToken {
                token: ExprToken::Sym(sym),
                offset: base + pos,
            });
            pos += 2;
            continue;
        }

        if let Some(sym) = ONE_CHAR_SYMS
            .iter()
            .find(|s| bytes[pos] == s.as_bytes()[0])
        {
            tokens.push(SpannedToken {
                token: ExprToken::Sym(sym),
                offset: base + pos,
            });
            pos += 1;
            continue;
        }

        return Err(ParseError::UnexpectedCharacter {
            character: ch,
            position: base + pos,
        });
    }

    Ok(tokens)
}

fn lex_string(rest: &str, quote: char, position: usize) -> Result<(String, usize), ParseError> {
    let mut value = String::new();
    let mut chars = rest.char_indices();
    chars.next(); // opening quote

    while let Some((idx, ch)) = chars.next() {
        if ch == quote {
            return Ok((value, idx + ch.len_utf8()));
        }
        if ch == '\\' {
            match chars.next() {
                Some((_, 'n')) => value.push('\n'),
                Some((_, 't')) => value.push('\t'),
                Some((_, 'r')) => value.push('\r'),
                Some((_, c @ ('\\' | '\'' | '"'))) => value.push(c),
                Some((_, c)) => {
                    // Unknown escapes keep the backslash, as Python does.
                    value.push('\\');
                    value.push(c);
                }
                None => break,
            }
            continue;
        }
        value.push(ch);
    }

    Err(ParseError::UnterminatedString { position })
}

fn lex_number(rest: &str, position: usize) -> Result<(ExprToken, usize), ParseError> {
    let bytes = rest.as_bytes();
    let mut end = 0;
    while end < bytes.len() && (bytes[end].is_ascii_digit() || bytes[end] == b'_') {
        end += 1;
    }

    let mut is_float = false;
    if end + 1 < bytes.len() && bytes[end] == b'.' && bytes[end + 1].is_ascii_digit() {
        is_float = true;
        end += 1;
        while end < bytes.len() && (bytes[end].is_ascii_digit() || bytes[end] == b'_') {
            end += 1;
        }
    }

    let literal: String = rest[..end].chars().filter(|c| *c != '_').collect();
    let token = if is_float {
        literal
            .parse::<f64>()
            .map(ExprToken::Float)
            .map_err(|_| ParseError::InvalidNumber {
                literal: literal.clone(),
                position,
            })?
    } else {
        literal
            .parse::<i64>()
            .map(ExprToken::Int)
            .map_err(|_| ParseError::InvalidNumber {
                literal: literal.clone(),
                position,
            })?
    };

    Ok((token, end))
}

/// Cursor over the token stream of one tag or variable body.
///
/// The statement parser drives this directly: it reads tag keywords and
/// names with the `eat_*`/`expect_*` helpers and hands off to
/// [`ExprParser::parse_expression`] for embedded expressions.
pub(crate) struct ExprParser {
    tokens: Vec<SpannedToken>,
    pos: usize,
    end_offset: usize,
}

impl ExprParser {
    pub(crate) fn new(content: &str, base_offset: usize) -> Result<Self, ParseError> {
        let tokens = tokenize(content, base_offset)?;
        Ok(Self {
            tokens,
            pos: 0,
            end_offset: base_offset + content.len(),
        })
    }

    pub(crate) fn is_done(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub(crate) fn current_offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map_or(self.end_offset, |t| t.offset)
    }

    fn peek(&self) -> Option<&ExprToken> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    fn peek_at(&self, n: usize) -> Option<&ExprToken> {
        self.tokens.get(self.pos + n).map(|t| &t.token)
    }

    fn advance(&mut self) -> Option<ExprToken> {
        let token = self.tokens.get(self.pos).map(|t| t.token.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn found(&self) -> String {
        match self.peek() {
            Some(ExprToken::Name(name)) => format!("'{name}'"),
            Some(ExprToken::Str(_)) => "string literal".to_string(),
            Some(ExprToken::Int(_) | ExprToken::Float(_)) => "number literal".to_string(),
            Some(ExprToken::Sym(sym)) => format!("'{sym}'"),
            None => "end of tag".to_string(),
        }
    }

    pub(crate) fn eat_sym(&mut self, sym: &str) -> bool {
        if matches!(self.peek(), Some(ExprToken::Sym(s)) if *s == sym) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn expect_sym(&mut self, sym: &str) -> Result<(), ParseError> {
        if self.eat_sym(sym) {
            Ok(())
        } else {
            Err(ParseError::ExpectedToken {
                expected: format!("'{sym}'"),
                found: self.found(),
                position: self.current_offset(),
            })
        }
    }

    pub(crate) fn eat_keyword(&mut self, keyword: &str) -> bool {
        if matches!(self.peek(), Some(ExprToken::Name(name)) if name == keyword) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn expect_keyword(&mut self, keyword: &str) -> Result<(), ParseError> {
        if self.eat_keyword(keyword) {
            Ok(())
        } else {
            Err(ParseError::ExpectedToken {
                expected: format!("'{keyword}'"),
                found: self.found(),
                position: self.current_offset(),
            })
        }
    }

    pub(crate) fn peek_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(ExprToken::Name(name)) if name == keyword)
    }

    pub(crate) fn expect_name(&mut self) -> Result<String, ParseError> {
        match self.peek() {
            Some(ExprToken::Name(name)) => {
                let name = name.clone();
                self.pos += 1;
                Ok(name)
            }
            _ => Err(ParseError::ExpectedToken {
                expected: "a name".to_string(),
                found: self.found(),
                position: self.current_offset(),
            }),
        }
    }

    pub(crate) fn expect_done(&mut self) -> Result<(), ParseError> {
        if self.is_done() {
            Ok(())
        } else {
            Err(ParseError::TrailingContent {
                content: self.found(),
                position: self.current_offset(),
            })
        }
    }

    /// Can the current token start an expression? Used to stop
    /// comma-separated lists at tag keywords and closing brackets.
    fn can_start_expression(&self) -> bool {
        match self.peek() {
            Some(ExprToken::Name(name)) => {
                !RESERVED.contains(&name.as_str()) || name == "not"
            }
            Some(ExprToken::Str(_) | ExprToken::Int(_) | ExprToken::Float(_)) => true,
            Some(ExprToken::Sym(sym)) => matches!(*sym, "(" | "[" | "{" | "-" | "+"),
            None => false,
        }
    }

    /// One expression, or an unparenthesized tuple if commas follow.
    pub(crate) fn parse_tuple(&mut self, with_cond: bool) -> Result<Expr, ParseError> {
        let parse_one = |p: &mut Self| {
            if with_cond {
                p.parse_expression()
            } else {
                p.parse_or()
            }
        };

        let first = parse_one(self)?;
        if !matches!(self.peek(), Some(ExprToken::Sym(","))) {
            return Ok(first);
        }

        let mut items = vec![first];
        while self.eat_sym(",") {
            if !self.can_start_expression() {
                break;
            }
            items.push(parse_one(self)?);
        }
        Ok(Expr::Tuple(items))
    }

    pub(crate) fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_or()?;
        if self.eat_keyword("if") {
            let test = self.parse_or()?;
            let otherwise = if self.eat_keyword("else") {
                Some(Box::new(self.parse_expression()?))
            } else {
                None
            };
            return Ok(Expr::Cond {
                test: Box::new(test),
                then: Box::new(expr),
                otherwise,
            });
        }
        Ok(expr)
    }

    pub(crate) fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_and()?;
        while self.eat_keyword("or") {
            let right = self.parse_and()?;
            left = Expr::Binary {
                op: BinaryOp::Or,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_not()?;
        while self.eat_keyword("and") {
            let right = self.parse_not()?;
            left = Expr::Binary {
                op: BinaryOp::And,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expr, ParseError> {
        if self.eat_keyword("not") {
            let value = self.parse_not()?;
            return Ok(Expr::Unary {
                op: UnaryOp::Not,
                value: Box::new(value),
            });
        }
        self.parse_compare()
    }

    fn parse_compare(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_add()?;
        loop {
            let op = match self.peek() {
                Some(ExprToken::Sym("==")) => BinaryOp::Eq,
                Some(ExprToken::Sym("!=")) => BinaryOp::Ne,
                Some(ExprToken::Sym("<")) => BinaryOp::Lt,
                Some(ExprToken::Sym("<=")) => BinaryOp::Le,
                Some(ExprToken::Sym(">")) => BinaryOp::Gt,
                Some(ExprToken::Sym(">=")) => BinaryOp::Ge,
                Some(ExprToken::Name(name)) if name == "in" => BinaryOp::In,
                Some(ExprToken::Name(name))
                    if name == "not"
                        && matches!(self.peek_at(1), Some(ExprToken::Name(n)) if n == "in") =>
                {
                    self.pos += 1;
                    BinaryOp::NotIn
                }
                _ => break,
            };
            self.pos += 1;
            let right = self.parse_add()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_add(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_concat()?;
        loop {
            let op = match self.peek() {
                Some(ExprToken::Sym("+")) => BinaryOp::Add,
                Some(ExprToken::Sym("-")) => BinaryOp::Sub,
                _ => break,
            };
            self.pos += 1;
            let right = self.parse_concat()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_concat(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_mul()?;
        while self.eat_sym("~") {
            let right = self.parse_mul()?;
            left = Expr::Binary {
                op: BinaryOp::Concat,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_mul(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_pow()?;
        loop {
            let op = match self.peek() {
                Some(ExprToken::Sym("*")) => BinaryOp::Mul,
                Some(ExprToken::Sym("/")) => BinaryOp::Div,
                Some(ExprToken::Sym("//")) => BinaryOp::FloorDiv,
                Some(ExprToken::Sym("%")) => BinaryOp::Rem,
                _ => break,
            };
            self.pos += 1;
            let right = self.parse_pow()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_pow(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_unary()?;
        if self.eat_sym("**") {
            let right = self.parse_pow()?;
            return Ok(Expr::Binary {
                op: BinaryOp::Pow,
                left: Box::new(left),
                right: Box::new(right),
            });
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        if self.eat_sym("-") {
            let value = self.parse_unary()?;
            return Ok(Expr::Unary {
                op: UnaryOp::Neg,
                value: Box::new(value),
            });
        }
        if self.eat_sym("+") {
            let value = self.parse_unary()?;
            return Ok(Expr::Unary {
                op: UnaryOp::Pos,
                value: Box::new(value),
            });
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.eat_sym(".") {
                let name = self.expect_name()?;
                expr = Expr::Attr {
                    obj: Box::new(expr),
                    name,
                };
            } else if self.eat_sym("[") {
                let index = self.parse_tuple(true)?;
                self.expect_sym("]")?;
                expr = Expr::Item {
                    obj: Box::new(expr),
                    index: Box::new(index),
                };
            } else if self.eat_sym("(") {
                let (args, kwargs) = self.parse_call_args()?;
                expr = Expr::Call {
                    callee: Box::new(expr),
                    args,
                    kwargs,
                };
            } else if self.eat_sym("|") {
                let name = self.expect_name()?;
                let (args, kwargs) = if self.eat_sym("(") {
                    self.parse_call_args()?
                } else {
                    (Vec::new(), Vec::new())
                };
                expr = Expr::Filter {
                    value: Box::new(expr),
                    name,
                    args,
                    kwargs,
                };
            } else if self.peek_keyword("is") {
                self.pos += 1;
                let negated = self.eat_keyword("not");
                let name = self.expect_name()?;
                let args = if self.eat_sym("(") {
                    self.parse_call_args()?.0
                } else if self.can_start_expression() && !self.peek_keyword("not") {
                    // Bare test argument, as in `x is divisibleby 3`.
                    vec![self.parse_primary()?]
                } else {
                    Vec::new()
                };
                expr = Expr::Test {
                    value: Box::new(expr),
                    name,
                    args,
                    negated,
                };
            } else {
                break;
            }
        }
        Ok(expr)
    }

    #[allow(clippy::too_many_lines)]
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let position = self.current_offset();
        match self.peek().cloned() {
            Some(ExprToken::Name(name)) => {
                if RESERVED.contains(&name.as_str()) {
                    return Err(ParseError::ExpectedExpression { position });
                }
                self.pos += 1;
                let expr = match name.as_str() {
                    "true" | "True" => Expr::Const(Const::Bool(true)),
                    "false" | "False" => Expr::Const(Const::Bool(false)),
                    "none" | "None" => Expr::Const(Const::None),
                    _ => Expr::Name(name),
                };
                Ok(expr)
            }
            Some(ExprToken::Str(value)) => {
                self.pos += 1;
                let mut value = value;
                // Adjacent string literals concatenate, as in Python.
                while let Some(ExprToken::Str(next)) = self.peek() {
                    value.push_str(next);
                    self.pos += 1;
                }
                Ok(Expr::Const(Const::Str(value)))
            }
            Some(ExprToken::Int(value)) => {
                self.pos += 1;
                Ok(Expr::Const(Const::Int(value)))
            }
            Some(ExprToken::Float(value)) => {
                self.pos += 1;
                Ok(Expr::Const(Const::Float(value)))
            }
            Some(ExprToken::Sym("(")) => {
                self.pos += 1;
                if self.eat_sym(")") {
                    return Ok(Expr::Tuple(Vec::new()));
                }
                let expr = self.parse_tuple(true)?;
                self.expect_sym(")")?;
                Ok(expr)
            }
            Some(ExprToken::Sym("[")) => {
                self.pos += 1;
                let mut items = Vec::new();
                while !self.eat_sym("]") {
                    if !items.is_empty() {
                        self.expect_sym(",")?;
                        if self.eat_sym("]") {
                            break;
                        }
                    }
                    items.push(self.parse_expression()?);
                }
                Ok(Expr::List(items))
            }
            Some(ExprToken::Sym("{")) => {
                self.pos += 1;
                let mut pairs = Vec::new();
                while !self.eat_sym("}") {
                    if !pairs.is_empty() {
                        self.expect_sym(",")?;
                        if self.eat_sym("}") {
                            break;
                        }
                    }
                    let key = self.parse_expression()?;
                    self.expect_sym(":")?;
                    let value = self.parse_expression()?;
                    pairs.push((key, value));
                }
                Ok(Expr::Dict(pairs))
            }
            _ => Err(ParseError::ExpectedExpression { position }),
        }
    }

    fn parse_call_args(&mut self) -> Result<(Vec<Expr>, Vec<(String, Expr)>), ParseError> {
        let mut args = Vec::new();
        let mut kwargs = Vec::new();

        while !self.eat_sym(")") {
            if !(args.is_empty() && kwargs.is_empty()) {
                self.expect_sym(",")?;
                if self.eat_sym(")") {
                    break;
                }
            }

            let is_kwarg = matches!(self.peek(), Some(ExprToken::Name(_)))
                && matches!(self.peek_at(1), Some(ExprToken::Sym("=")));
            if is_kwarg {
                let name = self.expect_name()?;
                self.expect_sym("=")?;
                kwargs.push((name, self.parse_expression()?));
            } else {
                args.push(self.parse_expression()?);
            }
        }

        Ok((args, kwargs))
    }
}

/// Parse a full variable body (`{{ ... }}` content) as one expression.
pub(crate) fn parse_variable_body(content: &str, base_offset: usize) -> Result<Expr, ParseError> {
    let mut parser = ExprParser::new(content, base_offset)?;
    if parser.is_done() {
        return Err(ParseError::ExpectedExpression {
            position: base_offset,
        });
    }
    let expr = parser.parse_tuple(true)?;
    parser.expect_done()?;
    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Expr {
        parse_variable_body(content, 0).unwrap()
    }

    #[test]
    fn test_parse_name() {
        assert_eq!(parse("user"), Expr::Name("user".to_string()));
    }

    #[test]
    fn test_parse_attr_chain() {
        assert_eq!(
            parse("user.name.first"),
            Expr::Attr {
                obj: Box::new(Expr::Attr {
                    obj: Box::new(Expr::Name("user".to_string())),
                    name: "name".to_string(),
                }),
                name: "first".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_filter_chain() {
        let expr = parse("value|default(\"x\")|title");
        let Expr::Filter { value, name, .. } = expr else {
            panic!("expected filter");
        };
        assert_eq!(name, "title");
        let Expr::Filter { name, args, .. } = *value else {
            panic!("expected inner filter");
        };
        assert_eq!(name, "default");
        assert_eq!(args, vec![Expr::Const(Const::Str("x".to_string()))]);
    }

    #[test]
    fn test_parse_list_of_strings() {
        assert_eq!(
            parse("[\"A\", \"B\"]"),
            Expr::List(vec![
                Expr::Const(Const::Str("A".to_string())),
                Expr::Const(Const::Str("B".to_string())),
            ])
        );
    }

    #[test]
    fn test_parse_parenthesized_tuple() {
        assert_eq!(
            parse("(\"A\", \"B\")"),
            Expr::Tuple(vec![
                Expr::Const(Const::Str("A".to_string())),
                Expr::Const(Const::Str("B".to_string())),
            ])
        );
    }

    #[test]
    fn test_parse_bare_tuple() {
        assert_eq!(
            parse("a, b"),
            Expr::Tuple(vec![
                Expr::Name("a".to_string()),
                Expr::Name("b".to_string())
            ])
        );
    }

    #[test]
    fn test_grouping_parens_are_not_tuples() {
        assert_eq!(parse("(a)"), Expr::Name("a".to_string()));
    }

    #[test]
    fn test_parse_escaped_backslash_string() {
        // The template text `"\\l"` is a one-backslash-plus-l string.
        assert_eq!(
            parse(r#"x|join("\\l")"#),
            Expr::Filter {
                value: Box::new(Expr::Name("x".to_string())),
                name: "join".to_string(),
                args: vec![Expr::Const(Const::Str("\\l".to_string()))],
                kwargs: vec![],
            }
        );
    }

    #[test]
    fn test_parse_precedence() {
        // a + b * c parses as a + (b * c)
        let Expr::Binary { op, right, .. } = parse("a + b * c") else {
            panic!("expected binary");
        };
        assert_eq!(op, BinaryOp::Add);
        assert!(matches!(
            *right,
            Expr::Binary {
                op: BinaryOp::Mul,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_conditional_expression() {
        let expr = parse("\"a\" if flag else \"b\"");
        assert!(matches!(expr, Expr::Cond { .. }));
        assert!(!expr.is_constant());
    }

    #[test]
    fn test_parse_comparison_and_bool_ops() {
        let expr = parse("x > 0 and y in items or not z");
        assert!(matches!(
            expr,
            Expr::Binary {
                op: BinaryOp::Or,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_test_with_bare_argument() {
        let expr = parse("n is divisibleby 3");
        let Expr::Test {
            name,
            args,
            negated,
            ..
        } = expr
        else {
            panic!("expected test");
        };
        assert_eq!(name, "divisibleby");
        assert_eq!(args, vec![Expr::Const(Const::Int(3))]);
        assert!(!negated);
    }

    #[test]
    fn test_parse_is_not_defined() {
        let expr = parse("x is not defined");
        assert!(matches!(expr, Expr::Test { negated: true, .. }));
    }

    #[test]
    fn test_parse_call_with_kwargs() {
        let Expr::Call { args, kwargs, .. } = parse("dict(a, b=1)") else {
            panic!("expected call");
        };
        assert_eq!(args.len(), 1);
        assert_eq!(kwargs.len(), 1);
        assert_eq!(kwargs[0].0, "b");
    }

    #[test]
    fn test_parse_dict_literal() {
        let Expr::Dict(pairs) = parse("{\"k\": v}") else {
            panic!("expected dict");
        };
        assert_eq!(pairs.len(), 1);
    }

    #[test]
    fn test_constantness() {
        assert!(parse("\"a\"").is_constant());
        assert!(parse("[\"a\", \"b\"]").is_constant());
        assert!(parse("(\"a\", \"b\")").is_constant());
        assert!(!parse("[\"a\", name]").is_constant());
        assert!(!parse("base ~ \".html\"").is_constant());
    }

    #[test]
    fn test_unterminated_string_is_an_error() {
        assert!(matches!(
            parse_variable_body("\"abc", 0),
            Err(ParseError::UnterminatedString { .. })
        ));
    }

    #[test]
    fn test_empty_body_is_an_error() {
        assert!(matches!(
            parse_variable_body("   ", 0),
            Err(ParseError::ExpectedExpression { .. })
        ));
    }

    #[test]
    fn test_trailing_garbage_is_an_error() {
        assert!(matches!(
            parse_variable_body("a b", 0),
            Err(ParseError::TrailingContent { .. })
        ));
    }
}

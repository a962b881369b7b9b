use crate::ast::AssignTarget;
use crate::ast::FilterCall;
use crate::ast::ImportedName;
use crate::ast::MacroParam;
use crate::ast::Stmt;
use crate::error::ParseError;
use crate::expr::parse_variable_body;
use crate::expr::ExprParser;
use crate::spans::Span;
use crate::tokens::Token;

/// Turns the lexer's token stream into a statement tree.
///
/// Parsing fails fast: a malformed document is dropped by the caller as a
/// whole, so there is no error recovery here.
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

/// An end tag (`endfor`, `elif`, ...) that closed a body, with its
/// remaining content still parseable (for `elif` conditions and
/// `endblock NAME` checks).
struct EndTag {
    name: String,
    parser: ExprParser,
}

impl Parser {
    #[must_use]
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, current: 0 }
    }

    pub fn parse(&mut self) -> Result<Vec<Stmt>, ParseError> {
        let (stmts, end) = self.subparse(&[])?;
        debug_assert!(end.is_none(), "top-level subparse cannot hit an end tag");
        Ok(stmts)
    }

    fn next_token(&mut self) -> Token {
        let token = self.tokens.get(self.current).cloned().unwrap_or(Token::Eof);
        self.current += 1;
        token
    }

    fn subparse(&mut self, end_tags: &[&str]) -> Result<(Vec<Stmt>, Option<EndTag>), ParseError> {
        let mut stmts = Vec::new();

        loop {
            let token = self.next_token();
            let span = token.content_span();

            match token {
                Token::Text { .. } => stmts.push(Stmt::Text { span }),
                Token::Comment { .. } => stmts.push(Stmt::Comment { span }),
                Token::Variable { content, offset } => {
                    let (body, delta) = strip_whitespace_control(&content);
                    let expr = parse_variable_body(body, offset + delta)?;
                    stmts.push(Stmt::Output { expr, span });
                }
                Token::Error { content, offset } => {
                    return Err(ParseError::UnclosedConstruct {
                        position: offset,
                        content,
                    });
                }
                Token::Eof => return Ok((stmts, None)),
                Token::Block { content, offset } => {
                    let (body, delta) = strip_whitespace_control(&content);
                    let offset = offset + delta;
                    if body.is_empty() {
                        return Err(ParseError::EmptyTag { position: offset });
                    }
                    let mut parser = ExprParser::new(body, offset)?;
                    let name = parser.expect_name()?;

                    if end_tags.contains(&name.as_str()) {
                        return Ok((stmts, Some(EndTag { name, parser })));
                    }

                    let stmt = self.parse_tag(&name, parser, offset, span, end_tags)?;
                    stmts.push(stmt);
                }
            }
        }
    }

    /// Parse a body up to one of `end_tags`, failing with the opener's
    /// position if the source runs out first.
    fn tag_body(
        &mut self,
        end_tags: &[&str],
        opener: &str,
        opener_offset: usize,
    ) -> Result<(Vec<Stmt>, EndTag), ParseError> {
        let (stmts, end) = self.subparse(end_tags)?;
        match end {
            Some(end) => Ok((stmts, end)),
            None => Err(ParseError::UnclosedTag {
                tag: opener.to_string(),
                position: opener_offset,
                expected: end_tags.join(" or "),
            }),
        }
    }

    fn parse_tag(
        &mut self,
        name: &str,
        mut p: ExprParser,
        offset: usize,
        span: Span,
        end_tags: &[&str],
    ) -> Result<Stmt, ParseError> {
        match name {
            "extends" => {
                let template = p.parse_expression()?;
                p.expect_done()?;
                Ok(Stmt::Extends { template, span })
            }
            "include" => {
                let template = p.parse_expression()?;
                let ignore_missing = if p.eat_keyword("ignore") {
                    p.expect_keyword("missing")?;
                    true
                } else {
                    false
                };
                eat_context_modifier(&mut p)?;
                p.expect_done()?;
                Ok(Stmt::Include {
                    template,
                    ignore_missing,
                    span,
                })
            }
            "import" => {
                let template = p.parse_expression()?;
                p.expect_keyword("as")?;
                let target = p.expect_name()?;
                eat_context_modifier(&mut p)?;
                p.expect_done()?;
                Ok(Stmt::Import {
                    template,
                    target,
                    span,
                })
            }
            "from" => self.parse_from(p, span),
            "block" => self.parse_block(p, offset, span),
            "macro" => self.parse_macro(p, offset, span),
            "for" => self.parse_for(p, offset, span),
            "if" => self.parse_if(p, offset, span),
            "set" => self.parse_set(p, offset, span),
            "with" => self.parse_with(p, offset, span),
            "call" => self.parse_call(p, offset, span),
            "filter" => self.parse_filter(p, offset, span),
            "autoescape" => self.parse_autoescape(p, offset, span),
            "do" => {
                let expr = p.parse_tuple(true)?;
                p.expect_done()?;
                Ok(Stmt::Do { expr, span })
            }
            "raw" => self.parse_raw(p, offset, span),
            _ => {
                if name.starts_with("end") || name == "else" || name == "elif" {
                    let expected = if end_tags.is_empty() {
                        "no open tag".to_string()
                    } else {
                        end_tags.join(" or ")
                    };
                    Err(ParseError::UnexpectedTag {
                        name: name.to_string(),
                        position: offset,
                        expected,
                    })
                } else {
                    Err(ParseError::UnknownTag {
                        name: name.to_string(),
                        position: offset,
                    })
                }
            }
        }
    }

    fn parse_from(&mut self, mut p: ExprParser, span: Span) -> Result<Stmt, ParseError> {
        let template = p.parse_expression()?;
        p.expect_keyword("import")?;

        let mut names = Vec::new();
        loop {
            if p.peek_keyword("with") || p.peek_keyword("without") {
                break;
            }
            let name = p.expect_name()?;
            let alias = if p.eat_keyword("as") {
                Some(p.expect_name()?)
            } else {
                None
            };
            names.push(ImportedName { name, alias });
            if !p.eat_sym(",") {
                break;
            }
        }
        if names.is_empty() {
            return Err(ParseError::ExpectedToken {
                expected: "a name to import".to_string(),
                found: "end of tag".to_string(),
                position: p.current_offset(),
            });
        }
        eat_context_modifier(&mut p)?;
        p.expect_done()?;
        Ok(Stmt::FromImport {
            template,
            names,
            span,
        })
    }

    fn parse_block(
        &mut self,
        mut p: ExprParser,
        offset: usize,
        span: Span,
    ) -> Result<Stmt, ParseError> {
        let name = p.expect_name()?;
        let scoped = p.eat_keyword("scoped");
        let required = p.eat_keyword("required");
        p.expect_done()?;

        let (body, mut end) = self.tag_body(&["endblock"], "block", offset)?;
        if !end.parser.is_done() {
            let found = end.parser.expect_name()?;
            end.parser.expect_done()?;
            if found != name {
                return Err(ParseError::MismatchedEndBlock {
                    expected: name,
                    found,
                    position: offset,
                });
            }
        }

        Ok(Stmt::Block {
            name,
            scoped,
            required,
            body,
            span,
        })
    }

    fn parse_macro(
        &mut self,
        mut p: ExprParser,
        offset: usize,
        span: Span,
    ) -> Result<Stmt, ParseError> {
        let name = p.expect_name()?;
        p.expect_sym("(")?;
        let params = parse_macro_params(&mut p)?;
        p.expect_done()?;

        let (body, mut end) = self.tag_body(&["endmacro"], "macro", offset)?;
        end.parser.expect_done()?;

        Ok(Stmt::Macro {
            name,
            params,
            body,
            span,
        })
    }

    fn parse_for(
        &mut self,
        mut p: ExprParser,
        offset: usize,
        span: Span,
    ) -> Result<Stmt, ParseError> {
        let mut targets = Vec::new();
        if p.eat_sym("(") {
            loop {
                targets.push(p.expect_name()?);
                if !p.eat_sym(",") {
                    break;
                }
            }
            p.expect_sym(")")?;
        } else {
            targets.push(p.expect_name()?);
            while p.eat_sym(",") {
                if p.peek_keyword("in") {
                    break;
                }
                targets.push(p.expect_name()?);
            }
        }

        p.expect_keyword("in")?;
        let iter = p.parse_tuple(false)?;
        let filter = if p.eat_keyword("if") {
            Some(p.parse_or()?)
        } else {
            None
        };
        let recursive = p.eat_keyword("recursive");
        p.expect_done()?;

        let (body, mut end) = self.tag_body(&["else", "endfor"], "for", offset)?;
        let else_body = if end.name == "else" {
            end.parser.expect_done()?;
            let (else_body, mut end) = self.tag_body(&["endfor"], "for", offset)?;
            end.parser.expect_done()?;
            else_body
        } else {
            end.parser.expect_done()?;
            Vec::new()
        };

        Ok(Stmt::For {
            targets,
            iter,
            filter,
            recursive,
            body,
            else_body,
            span,
        })
    }

    fn parse_if(
        &mut self,
        mut p: ExprParser,
        offset: usize,
        span: Span,
    ) -> Result<Stmt, ParseError> {
        let mut cond = p.parse_tuple(false)?;
        p.expect_done()?;

        let mut arms = Vec::new();
        let mut else_body = Vec::new();

        loop {
            let (body, mut end) = self.tag_body(&["elif", "else", "endif"], "if", offset)?;
            arms.push((cond, body));
            match end.name.as_str() {
                "elif" => {
                    cond = end.parser.parse_tuple(false)?;
                    end.parser.expect_done()?;
                }
                "else" => {
                    end.parser.expect_done()?;
                    let (body, mut end) = self.tag_body(&["endif"], "if", offset)?;
                    end.parser.expect_done()?;
                    else_body = body;
                    break;
                }
                _ => {
                    end.parser.expect_done()?;
                    break;
                }
            }
        }

        Ok(Stmt::If {
            arms,
            else_body,
            span,
        })
    }

    fn parse_set(
        &mut self,
        mut p: ExprParser,
        offset: usize,
        span: Span,
    ) -> Result<Stmt, ParseError> {
        let mut targets = vec![parse_assign_target(&mut p)?];
        while p.eat_sym(",") {
            targets.push(parse_assign_target(&mut p)?);
        }

        if p.eat_sym("=") {
            let value = p.parse_tuple(true)?;
            p.expect_done()?;
            return Ok(Stmt::Set {
                targets,
                value,
                span,
            });
        }

        // Block form binds exactly one target.
        if targets.len() != 1 {
            return Err(ParseError::ExpectedToken {
                expected: "'='".to_string(),
                found: "end of tag".to_string(),
                position: p.current_offset(),
            });
        }
        let filters = parse_filter_chain(&mut p, false)?;
        p.expect_done()?;

        let (body, mut end) = self.tag_body(&["endset"], "set", offset)?;
        end.parser.expect_done()?;

        Ok(Stmt::SetBlock {
            target: targets.remove(0),
            filters,
            body,
            span,
        })
    }

    fn parse_with(
        &mut self,
        mut p: ExprParser,
        offset: usize,
        span: Span,
    ) -> Result<Stmt, ParseError> {
        let mut bindings = Vec::new();
        if !p.is_done() {
            loop {
                let target = parse_assign_target(&mut p)?;
                p.expect_sym("=")?;
                let value = p.parse_expression()?;
                bindings.push((target, value));
                if !p.eat_sym(",") {
                    break;
                }
            }
        }
        p.expect_done()?;

        let (body, mut end) = self.tag_body(&["endwith"], "with", offset)?;
        end.parser.expect_done()?;

        Ok(Stmt::With {
            bindings,
            body,
            span,
        })
    }

    fn parse_call(
        &mut self,
        mut p: ExprParser,
        offset: usize,
        span: Span,
    ) -> Result<Stmt, ParseError> {
        let params = if p.eat_sym("(") {
            parse_macro_params(&mut p)?
        } else {
            Vec::new()
        };
        let call = p.parse_expression()?;
        p.expect_done()?;

        let (body, mut end) = self.tag_body(&["endcall"], "call", offset)?;
        end.parser.expect_done()?;

        Ok(Stmt::CallBlock {
            params,
            call,
            body,
            span,
        })
    }

    fn parse_filter(
        &mut self,
        mut p: ExprParser,
        offset: usize,
        span: Span,
    ) -> Result<Stmt, ParseError> {
        let filters = parse_filter_chain(&mut p, true)?;
        p.expect_done()?;

        let (body, mut end) = self.tag_body(&["endfilter"], "filter", offset)?;
        end.parser.expect_done()?;

        Ok(Stmt::FilterBlock {
            filters,
            body,
            span,
        })
    }

    fn parse_autoescape(
        &mut self,
        mut p: ExprParser,
        offset: usize,
        span: Span,
    ) -> Result<Stmt, ParseError> {
        let value = p.parse_expression()?;
        p.expect_done()?;

        let (body, mut end) = self.tag_body(&["endautoescape"], "autoescape", offset)?;
        end.parser.expect_done()?;

        Ok(Stmt::Autoescape { value, body, span })
    }

    /// Skip everything up to `{% endraw %}`; raw content is opaque text.
    fn parse_raw(
        &mut self,
        mut p: ExprParser,
        offset: usize,
        span: Span,
    ) -> Result<Stmt, ParseError> {
        p.expect_done()?;

        loop {
            match self.next_token() {
                Token::Block { content, offset } => {
                    let (body, delta) = strip_whitespace_control(&content);
                    let mut end = ExprParser::new(body, offset + delta)?;
                    if end.eat_keyword("endraw") && end.is_done() {
                        break;
                    }
                }
                Token::Eof => {
                    return Err(ParseError::UnclosedTag {
                        tag: "raw".to_string(),
                        position: offset,
                        expected: "endraw".to_string(),
                    });
                }
                _ => {}
            }
        }

        Ok(Stmt::Raw { span })
    }
}

/// Strip `{%- ... -%}` whitespace-control markers from already-trimmed
/// tag content, returning how many leading bytes were dropped so error
/// positions stay anchored to the source.
fn strip_whitespace_control(content: &str) -> (&str, usize) {
    let stripped = content.strip_prefix(['-', '+']).unwrap_or(content);
    let stripped = stripped.trim_start();
    let delta = content.len() - stripped.len();
    let stripped = stripped.strip_suffix(['-', '+']).unwrap_or(stripped);
    (stripped.trim_end(), delta)
}

fn eat_context_modifier(p: &mut ExprParser) -> Result<(), ParseError> {
    if p.eat_keyword("with") || p.eat_keyword("without") {
        p.expect_keyword("context")?;
    }
    Ok(())
}

fn parse_assign_target(p: &mut ExprParser) -> Result<AssignTarget, ParseError> {
    let base = p.expect_name()?;
    if p.eat_sym(".") {
        let name = p.expect_name()?;
        Ok(AssignTarget::Attr { base, name })
    } else {
        Ok(AssignTarget::Name(base))
    }
}

/// Parameter list of a macro or call block; the opening paren is already
/// consumed.
fn parse_macro_params(p: &mut ExprParser) -> Result<Vec<MacroParam>, ParseError> {
    let mut params = Vec::new();
    while !p.eat_sym(")") {
        if !params.is_empty() {
            p.expect_sym(",")?;
            if p.eat_sym(")") {
                break;
            }
        }
        let name = p.expect_name()?;
        let default = if p.eat_sym("=") {
            Some(p.parse_expression()?)
        } else {
            None
        };
        params.push(MacroParam { name, default });
    }
    Ok(params)
}

/// `name(args)` chain joined with `|`, as used by `{% filter %}` and the
/// block form of `{% set %}`. With `leading_name` the chain starts at the
/// cursor; otherwise it starts at the first `|`.
fn parse_filter_chain(p: &mut ExprParser, leading_name: bool) -> Result<Vec<FilterCall>, ParseError> {
    let mut filters = Vec::new();

    if leading_name || p.eat_sym("|") {
        loop {
            let name = p.expect_name()?;
            let args = if p.eat_sym("(") {
                let mut args = Vec::new();
                while !p.eat_sym(")") {
                    if !args.is_empty() {
                        p.expect_sym(",")?;
                        if p.eat_sym(")") {
                            break;
                        }
                    }
                    args.push(p.parse_expression()?);
                }
                args
            } else {
                Vec::new()
            };
            filters.push(FilterCall { name, args });
            if !p.eat_sym("|") {
                break;
            }
        }
    }

    Ok(filters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Const;
    use crate::expr::Expr;
    use crate::lexer::Lexer;

    fn parse(source: &str) -> Vec<Stmt> {
        try_parse(source).unwrap()
    }

    fn try_parse(source: &str) -> Result<Vec<Stmt>, ParseError> {
        let (tokens, _) = Lexer::new(source).tokenize();
        Parser::new(tokens).parse()
    }

    #[test]
    fn test_parse_extends_literal() {
        let stmts = parse("{% extends \"base.html\" %}");
        assert_eq!(stmts.len(), 1);
        let Stmt::Extends { template, .. } = &stmts[0] else {
            panic!("expected extends");
        };
        assert_eq!(template, &Expr::Const(Const::Str("base.html".to_string())));
    }

    #[test]
    fn test_parse_include_with_modifiers() {
        let stmts = parse("{% include \"nav.html\" ignore missing without context %}");
        let Stmt::Include { ignore_missing, .. } = &stmts[0] else {
            panic!("expected include");
        };
        assert!(ignore_missing);
    }

    #[test]
    fn test_parse_include_list() {
        let stmts = parse("{% include [\"a.html\", \"b.html\"] %}");
        let Stmt::Include { template, .. } = &stmts[0] else {
            panic!("expected include");
        };
        assert!(template.is_constant());
    }

    #[test]
    fn test_parse_import_as() {
        let stmts = parse("{% import \"forms.html\" as forms %}");
        let Stmt::Import { target, .. } = &stmts[0] else {
            panic!("expected import");
        };
        assert_eq!(target, "forms");
    }

    #[test]
    fn test_parse_from_import_with_aliases() {
        let stmts = parse("{% from \"forms.html\" import input, field as f with context %}");
        let Stmt::FromImport { names, .. } = &stmts[0] else {
            panic!("expected from-import");
        };
        assert_eq!(names.len(), 2);
        assert_eq!(names[0].name, "input");
        assert_eq!(names[0].alias, None);
        assert_eq!(names[1].name, "field");
        assert_eq!(names[1].alias.as_deref(), Some("f"));
    }

    #[test]
    fn test_parse_block_with_matching_end_name() {
        let stmts = parse("{% block body %}x{% endblock body %}");
        let Stmt::Block { name, body, .. } = &stmts[0] else {
            panic!("expected block");
        };
        assert_eq!(name, "body");
        assert_eq!(body.len(), 1);
    }

    #[test]
    fn test_parse_block_with_wrong_end_name() {
        assert!(matches!(
            try_parse("{% block body %}x{% endblock head %}"),
            Err(ParseError::MismatchedEndBlock { .. })
        ));
    }

    #[test]
    fn test_parse_nested_blocks() {
        let stmts = parse("{% block a %}{% block b %}{% endblock %}{% endblock %}");
        let Stmt::Block { body, .. } = &stmts[0] else {
            panic!("expected block");
        };
        assert!(matches!(&body[0], Stmt::Block { name, .. } if name == "b"));
    }

    #[test]
    fn test_parse_macro_signature() {
        let stmts = parse("{% macro input(name, type=\"text\") %}{{ name }}{% endmacro %}");
        let Stmt::Macro { name, params, .. } = &stmts[0] else {
            panic!("expected macro");
        };
        assert_eq!(name, "input");
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].name, "name");
        assert!(params[1].default.is_some());
    }

    #[test]
    fn test_parse_for_with_tuple_targets_and_else() {
        let stmts = parse("{% for k, v in items %}{{ k }}{% else %}none{% endfor %}");
        let Stmt::For {
            targets, else_body, ..
        } = &stmts[0]
        else {
            panic!("expected for");
        };
        assert_eq!(targets, &vec!["k".to_string(), "v".to_string()]);
        assert_eq!(else_body.len(), 1);
    }

    #[test]
    fn test_parse_for_with_loop_filter() {
        let stmts = parse("{% for x in items if x.visible recursive %}{% endfor %}");
        let Stmt::For {
            filter, recursive, ..
        } = &stmts[0]
        else {
            panic!("expected for");
        };
        assert!(filter.is_some());
        assert!(recursive);
    }

    #[test]
    fn test_parse_if_elif_else() {
        let stmts = parse("{% if a %}1{% elif b %}2{% else %}3{% endif %}");
        let Stmt::If {
            arms, else_body, ..
        } = &stmts[0]
        else {
            panic!("expected if");
        };
        assert_eq!(arms.len(), 2);
        assert_eq!(else_body.len(), 1);
    }

    #[test]
    fn test_parse_set_assignment() {
        let stmts = parse("{% set greeting = \"hi\" %}");
        let Stmt::Set { targets, value, .. } = &stmts[0] else {
            panic!("expected set");
        };
        assert_eq!(targets, &vec![AssignTarget::Name("greeting".to_string())]);
        assert!(value.is_constant());
    }

    #[test]
    fn test_parse_set_block_with_filter() {
        let stmts = parse("{% set body | trim %}  x  {% endset %}");
        let Stmt::SetBlock {
            target, filters, ..
        } = &stmts[0]
        else {
            panic!("expected set block");
        };
        assert_eq!(target, &AssignTarget::Name("body".to_string()));
        assert_eq!(filters.len(), 1);
        assert_eq!(filters[0].name, "trim");
    }

    #[test]
    fn test_parse_with_bindings() {
        let stmts = parse("{% with a = 1, b = 2 %}{{ a }}{% endwith %}");
        let Stmt::With { bindings, .. } = &stmts[0] else {
            panic!("expected with");
        };
        assert_eq!(bindings.len(), 2);
    }

    #[test]
    fn test_parse_filter_block_chain() {
        let stmts = parse("{% filter upper|trim %}x{% endfilter %}");
        let Stmt::FilterBlock { filters, .. } = &stmts[0] else {
            panic!("expected filter block");
        };
        let names: Vec<&str> = filters.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["upper", "trim"]);
    }

    #[test]
    fn test_parse_call_block() {
        let stmts = parse("{% call(user) dump_users(users) %}{{ user.name }}{% endcall %}");
        let Stmt::CallBlock { params, .. } = &stmts[0] else {
            panic!("expected call block");
        };
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_parse_raw_is_opaque() {
        let stmts = parse("{% raw %}{{ not_a_var }}{% if %}{% endraw %}after");
        assert!(matches!(&stmts[0], Stmt::Raw { .. }));
        assert!(matches!(&stmts[1], Stmt::Text { .. }));
    }

    #[test]
    fn test_parse_raw_with_unbalanced_delimiters() {
        let stmts = parse("{% raw %}{{ {% endraw %}ok");
        assert!(matches!(&stmts[0], Stmt::Raw { .. }));
        assert!(matches!(&stmts[1], Stmt::Text { .. }));
    }

    #[test]
    fn test_parse_unclosed_raw_fails() {
        assert!(matches!(
            try_parse("{% raw %}{{ x"),
            Err(ParseError::UnclosedTag { tag, .. }) if tag == "raw"
        ));
    }

    #[test]
    fn test_parse_whitespace_control_markers() {
        let stmts = parse("{%- if a -%}x{%- endif -%}");
        assert!(matches!(&stmts[0], Stmt::If { .. }));
    }

    #[test]
    fn test_parse_unknown_tag_fails() {
        assert!(matches!(
            try_parse("{% load static %}"),
            Err(ParseError::UnknownTag { name, .. }) if name == "load"
        ));
    }

    #[test]
    fn test_error_position_skips_leading_whitespace() {
        assert!(matches!(
            try_parse("{%   load static %}"),
            Err(ParseError::UnknownTag { position: 5, .. })
        ));
    }

    #[test]
    fn test_error_position_skips_whitespace_control_marker() {
        assert!(matches!(
            try_parse("{%- load static %}"),
            Err(ParseError::UnknownTag { position: 4, .. })
        ));
    }

    #[test]
    fn test_parse_stray_end_tag_fails() {
        assert!(matches!(
            try_parse("{% endfor %}"),
            Err(ParseError::UnexpectedTag { .. })
        ));
    }

    #[test]
    fn test_parse_unclosed_for_fails() {
        assert!(matches!(
            try_parse("{% for x in items %}{{ x }}"),
            Err(ParseError::UnclosedTag { tag, .. }) if tag == "for"
        ));
    }

    #[test]
    fn test_parse_empty_variable_fails() {
        assert!(matches!(
            try_parse("{{ }}"),
            Err(ParseError::ExpectedExpression { .. })
        ));
    }

    #[test]
    fn test_parse_unclosed_construct_fails() {
        assert!(matches!(
            try_parse("{{ user"),
            Err(ParseError::UnclosedConstruct { .. })
        ));
    }

    #[test]
    fn test_parse_empty_tag_fails() {
        assert!(matches!(
            try_parse("{%  %}"),
            Err(ParseError::EmptyTag { .. })
        ));
    }

    #[test]
    fn test_parse_full_template() {
        let source = r#"{% extends "base.html" %}
{% from "macros.html" import field %}
{% block content %}
  {% for item in items if item.visible %}
    {{ field(item)|upper }}
  {% endfor %}
{% endblock %}"#;
        let stmts = parse(source);
        assert!(stmts
            .iter()
            .any(|s| matches!(s, Stmt::Block { name, .. } if name == "content")));
    }
}

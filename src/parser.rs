// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

//! Recursive-descent, single-token-lookahead parser (§4.2, C2).
//!
//! Builds a [`Syntax`] tree from the lexer's token stream. Never panics
//! on malformed input: a parse failure is recorded as one diagnostic and
//! the parser resynchronises to the next segment-starting token, per
//! §4.2's recovery rule. The caller discards the tree if any error was
//! recorded (§4.2).

use crate::ast::{Literal, OptionSegment, Parameter, Segment, Syntax};
use crate::diagnostics::{Diagnostic, DiagnosticCode, ParseCode};
use crate::lexer::{Token, TokenKind};

/// Parses a full token stream (as produced by [`crate::lexer::tokenize`])
/// into a `(tree, errors)` pair. The tree is only meaningful when
/// `errors` is empty; callers should treat a non-empty error list as a
/// rejection of the whole pattern (§4.2).
pub fn parse(tokens: Vec<Token>) -> (Syntax, Vec<Diagnostic>) {
    Parser::new(tokens).run()
}

struct Parser {
    tokens: Vec<Token>,
    idx: usize,
    errors: Vec<Diagnostic>,
}

/// Tokens that may legally begin a new top-level segment. Used both to
/// decide what to parse next and, after a parse failure, where to
/// resynchronise to.
fn starts_segment(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::LBrace | TokenKind::LongDash | TokenKind::ShortDash | TokenKind::Identifier | TokenKind::EndOfOptions
    )
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            idx: 0,
            errors: Vec::new(),
        }
    }

    fn run(mut self) -> (Syntax, Vec<Diagnostic>) {
        let mut segments = Vec::new();
        while self.peek().kind != TokenKind::Eof {
            match self.peek().kind {
                TokenKind::LBrace => {
                    if let Some(p) = self.parse_parameter() {
                        segments.push(Segment::Parameter(p));
                    }
                }
                TokenKind::LongDash | TokenKind::ShortDash => {
                    if let Some(o) = self.parse_option() {
                        segments.push(Segment::Option(o));
                    }
                }
                TokenKind::EndOfOptions => {
                    let t = self.advance();
                    segments.push(Segment::Literal(Literal {
                        value: "--".to_string(),
                        position: t.position,
                        length: t.length,
                    }));
                }
                TokenKind::Identifier => {
                    let t = self.advance();
                    segments.push(Segment::Literal(Literal {
                        value: t.lexeme,
                        position: t.position,
                        length: t.length,
                    }));
                }
                _ => {
                    let t = self.advance();
                    self.errors.push(Diagnostic::new(
                        DiagnosticCode::Parse(ParseCode::UnexpectedToken),
                        format!("unexpected token '{}'", t.lexeme),
                        t.position,
                        t.length.max(1),
                    ));
                    self.resync();
                }
            }
        }
        (Syntax::new(segments), self.errors)
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.idx]
    }

    fn peek_kind(&self) -> TokenKind {
        self.tokens[self.idx].kind
    }

    fn advance(&mut self) -> Token {
        let t = self.tokens[self.idx].clone();
        if self.idx + 1 < self.tokens.len() {
            self.idx += 1;
        }
        t
    }

    /// Skip tokens until one that can start a new segment, or EOF.
    /// Mirrors §4.2: "skip tokens until whitespace or a segment-starting
    /// token" — since the lexer already elides whitespace, the
    /// equivalent boundary here is the next segment-starting token.
    fn resync(&mut self) {
        while self.peek_kind() != TokenKind::Eof && !starts_segment(self.peek_kind()) {
            self.advance();
        }
    }

    /// `"{" ["*"] Ident [":" Ident] ["?"] ["|" DescText] "}"`
    fn parse_parameter(&mut self) -> Option<Parameter> {
        let open = self.advance(); // LBrace
        let start = open.position;

        let is_catch_all = if self.peek_kind() == TokenKind::Star {
            self.advance();
            true
        } else {
            false
        };

        let name = match self.peek_kind() {
            TokenKind::Identifier => self.advance().lexeme,
            _ => {
                let t = self.peek().clone();
                self.errors.push(Diagnostic::new(
                    DiagnosticCode::Parse(ParseCode::MissingClosingBrace),
                    "expected a parameter name",
                    t.position,
                    t.length.max(1),
                ));
                self.resync_in_braces();
                return None;
            }
        };

        let mut type_constraint = None;
        if self.peek_kind() == TokenKind::Colon {
            self.advance();
            match self.peek_kind() {
                TokenKind::Identifier => type_constraint = Some(self.advance().lexeme),
                _ => {
                    let t = self.peek().clone();
                    self.errors.push(Diagnostic::new(
                        DiagnosticCode::Parse(ParseCode::InvalidTokenAfterColon),
                        "expected a type name after ':'",
                        t.position,
                        t.length.max(1),
                    ));
                    self.resync_in_braces();
                    return None;
                }
            }
        }

        let is_optional = if self.peek_kind() == TokenKind::Question {
            self.advance();
            true
        } else {
            false
        };

        let description = self.parse_optional_description();

        let close = match self.peek_kind() {
            TokenKind::RBrace => self.advance(),
            _ => {
                let t = self.peek().clone();
                self.errors.push(Diagnostic::new(
                    DiagnosticCode::Parse(ParseCode::MissingClosingBrace),
                    "expected '}' to close parameter",
                    t.position,
                    t.length.max(1),
                ));
                self.resync_in_braces();
                return None;
            }
        };

        Some(Parameter {
            name,
            type_constraint,
            description,
            is_optional,
            is_catch_all,
            position: start,
            length: close.position + close.length - start,
        })
    }

    /// `["|" DescText]`, used inside both parameters and options.
    fn parse_optional_description(&mut self) -> Option<String> {
        if self.peek_kind() != TokenKind::Pipe {
            return None;
        }
        self.advance();
        if self.peek_kind() == TokenKind::DescText {
            Some(self.advance().lexeme)
        } else {
            None
        }
    }

    /// Skip to the next `}`, segment-starting token, or EOF. Used when
    /// a parameter body is malformed so that one bad parameter does not
    /// desynchronise the rest of the pattern.
    fn resync_in_braces(&mut self) {
        while self.peek_kind() != TokenKind::Eof {
            if self.peek_kind() == TokenKind::RBrace {
                self.advance();
                return;
            }
            if starts_segment(self.peek_kind()) {
                return;
            }
            self.advance();
        }
    }

    /// `("--" Ident | "-" Ident) ["," ("--" Ident | "-" Ident)] ["?"]
    /// [WS Parameter] ["*"] ["|" DescText]`
    fn parse_option(&mut self) -> Option<OptionSegment> {
        let start = self.peek().position;
        let (mut long_form, mut short_form) = self.parse_alias()?;

        if self.peek_kind() == TokenKind::Comma {
            self.advance();
            match self.parse_alias() {
                Some((l2, s2)) => {
                    long_form = long_form.or(l2);
                    short_form = short_form.or(s2);
                }
                None => return None,
            }
        }

        let is_optional_flag = if self.peek_kind() == TokenKind::Question {
            self.advance();
            true
        } else {
            false
        };

        let parameter = if self.peek_kind() == TokenKind::LBrace {
            self.parse_parameter()
        } else {
            None
        };

        let is_repeated = if self.peek_kind() == TokenKind::Star {
            self.advance();
            true
        } else {
            false
        };

        let description = self.parse_optional_description();

        let end = if self.idx > 0 {
            let prev = &self.tokens[self.idx - 1];
            prev.position + prev.length
        } else {
            start
        };

        Some(OptionSegment {
            long_form,
            short_form,
            parameter,
            description,
            is_optional_flag,
            is_repeated,
            position: start,
            length: end.saturating_sub(start).max(1),
        })
    }

    /// `"--" Ident | "-" Ident`
    fn parse_alias(&mut self) -> Option<(Option<String>, Option<char>)> {
        match self.peek_kind() {
            TokenKind::LongDash => {
                self.advance();
                match self.peek_kind() {
                    TokenKind::Identifier => Some((Some(self.advance().lexeme), None)),
                    _ => {
                        let t = self.peek().clone();
                        self.errors.push(Diagnostic::new(
                            DiagnosticCode::Parse(ParseCode::MalformedOption),
                            "expected an option name after '--'",
                            t.position,
                            t.length.max(1),
                        ));
                        self.resync();
                        None
                    }
                }
            }
            TokenKind::ShortDash => {
                self.advance();
                match self.peek_kind() {
                    TokenKind::Identifier => {
                        let ident = self.advance();
                        let c = ident.lexeme.chars().next().unwrap_or('\0');
                        Some((None, Some(c)))
                    }
                    _ => {
                        let t = self.peek().clone();
                        self.errors.push(Diagnostic::new(
                            DiagnosticCode::Parse(ParseCode::MalformedOption),
                            "expected an option name after '-'",
                            t.position,
                            t.length.max(1),
                        ));
                        self.resync();
                        None
                    }
                }
            }
            _ => {
                let t = self.peek().clone();
                self.errors.push(Diagnostic::new(
                    DiagnosticCode::Parse(ParseCode::MalformedOption),
                    "expected an option alias",
                    t.position,
                    t.length.max(1),
                ));
                self.resync();
                None
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lexer::tokenize;

    fn parse_src(src: &str) -> (Syntax, Vec<Diagnostic>) {
        let (tokens, lex_errors) = tokenize(src);
        assert!(lex_errors.is_empty(), "unexpected lex errors: {lex_errors:?}");
        parse(tokens)
    }

    #[test]
    fn literal_sequence() {
        let (tree, errors) = parse_src("git commit --amend");
        assert!(errors.is_empty());
        assert_eq!(tree.segments.len(), 3);
        assert!(matches!(&tree.segments[0], Segment::Literal(l) if l.value == "git"));
        assert!(matches!(&tree.segments[1], Segment::Literal(l) if l.value == "commit"));
        assert!(matches!(&tree.segments[2], Segment::Option(o) if o.long_form.as_deref() == Some("amend")));
    }

    #[test]
    fn typed_optional_parameter() {
        let (tree, errors) = parse_src("delay {ms:int?}");
        assert!(errors.is_empty());
        let Segment::Parameter(p) = &tree.segments[1] else {
            panic!("expected parameter segment");
        };
        assert_eq!(p.name, "ms");
        assert_eq!(p.type_constraint.as_deref(), Some("int"));
        assert!(p.is_optional);
    }

    #[test]
    fn catch_all_parameter() {
        let (tree, errors) = parse_src("docker {*args}");
        assert!(errors.is_empty());
        let Segment::Parameter(p) = &tree.segments[1] else {
            panic!("expected parameter segment");
        };
        assert!(p.is_catch_all);
        assert_eq!(p.name, "args");
    }

    #[test]
    fn option_with_alias_and_value() {
        let (tree, errors) = parse_src("build --config,-c {mode}");
        assert!(errors.is_empty());
        let Segment::Option(o) = &tree.segments[1] else {
            panic!("expected option segment");
        };
        assert_eq!(o.long_form.as_deref(), Some("config"));
        assert_eq!(o.short_form, Some('c'));
        assert_eq!(o.parameter.as_ref().unwrap().name, "mode");
    }

    #[test]
    fn repeated_and_optional_flag_option() {
        let (tree, errors) = parse_src("run --tag? {value}* |attach a tag");
        assert!(errors.is_empty());
        let Segment::Option(o) = &tree.segments[1] else {
            panic!("expected option segment");
        };
        assert!(o.is_optional_flag);
        assert!(o.is_repeated);
        assert_eq!(o.description.as_deref(), Some("attach a tag"));
    }

    #[test]
    fn end_of_options_then_catch_all() {
        let (tree, errors) = parse_src("run -- {*rest}");
        assert!(errors.is_empty());
        assert!(matches!(&tree.segments[1], Segment::Literal(l) if l.is_end_of_options()));
        assert!(matches!(&tree.segments[2], Segment::Parameter(p) if p.is_catch_all));
    }

    #[test]
    fn missing_closing_brace_is_recovered() {
        let (_, errors) = parse_src("deploy {env");
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].code,
            DiagnosticCode::Parse(ParseCode::MissingClosingBrace)
        );
    }

    #[test]
    fn malformed_option_recovers_to_next_segment() {
        let (tree, errors) = parse_src("deploy -- commit");
        // "-- commit" here: EndOfOptions then literal "commit"; not malformed.
        assert!(errors.is_empty());
        assert_eq!(tree.segments.len(), 3);
    }
}

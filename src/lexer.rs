// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

//! Single-pass, position-tracked lexer for pattern sources (§4.1, C1).
//!
//! The lexer is the sole producer of position information; every later
//! diagnostic cites a `(position, length)` pair that traces back to a
//! token minted here.

use crate::diagnostics::{Diagnostic, DiagnosticCode, LexCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    LongDash,
    ShortDash,
    LBrace,
    RBrace,
    Colon,
    Comma,
    Star,
    Question,
    Pipe,
    EndOfOptions,
    /// Free-form description text, produced only right after a `Pipe`.
    DescText,
    /// Never emitted by [`Lexer::tokenize`]; whitespace is suppressed
    /// outside of description text per §4.1. Kept in the enum because
    /// `spec.md` §3.1 names it as a lexical kind.
    Whitespace,
    Eof,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub position: usize,
    pub length: usize,
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

/// Tokenizes `src` in one pass. Always returns a token stream terminated
/// by `Eof`, plus any lex diagnostics encountered along the way; a lex
/// error does not abort tokenization, it resynchronises to the next
/// whitespace run (§4.1).
pub fn tokenize(src: &str) -> (Vec<Token>, Vec<Diagnostic>) {
    Lexer::new(src).run()
}

struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    brace_depth: u32,
    /// Byte positions of every `{` not yet matched by a `}`, oldest first.
    /// Whatever remains at EOF is reported as an unterminated brace.
    open_braces: Vec<usize>,
    tokens: Vec<Token>,
    errors: Vec<Diagnostic>,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            brace_depth: 0,
            open_braces: Vec::new(),
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn run(mut self) -> (Vec<Token>, Vec<Diagnostic>) {
        while self.pos < self.bytes.len() {
            let c = self.current_char();
            match c {
                ' ' | '\t' | '\n' | '\r' => {
                    self.pos += c.len_utf8();
                }
                '{' => self.lex_lbrace(),
                '}' => self.lex_rbrace(),
                ':' => self.lex_colon(),
                ',' => self.lex_comma(),
                '*' => self.push_single(TokenKind::Star, '*'),
                '?' => self.push_single(TokenKind::Question, '?'),
                '|' => self.lex_pipe(),
                '-' => self.lex_dash(),
                c if is_ident_start(c) => self.lex_identifier(),
                _ => self.lex_unexpected(),
            }
        }
        for &open_pos in &self.open_braces {
            self.errors.push(Diagnostic::new(
                DiagnosticCode::Lex(LexCode::UnterminatedBrace),
                "'{' was never closed by a matching '}'",
                open_pos,
                1,
            ));
        }
        self.tokens.push(Token {
            kind: TokenKind::Eof,
            lexeme: String::new(),
            position: self.pos,
            length: 0,
        });
        (self.tokens, self.errors)
    }

    fn current_char(&self) -> char {
        self.src[self.pos..].chars().next().unwrap()
    }

    fn peek_char_at(&self, byte_offset: usize) -> Option<char> {
        self.src.get(byte_offset..).and_then(|s| s.chars().next())
    }

    fn push_single(&mut self, kind: TokenKind, c: char) {
        self.tokens.push(Token {
            kind,
            lexeme: c.to_string(),
            position: self.pos,
            length: c.len_utf8(),
        });
        self.pos += c.len_utf8();
    }

    fn lex_lbrace(&mut self) {
        self.open_braces.push(self.pos);
        self.brace_depth += 1;
        self.push_single(TokenKind::LBrace, '{');
    }

    fn lex_rbrace(&mut self) {
        self.open_braces.pop();
        self.brace_depth = self.brace_depth.saturating_sub(1);
        self.push_single(TokenKind::RBrace, '}');
    }

    /// `:` only ever appears inside a parameter's braces (the
    /// type-constraint separator); outside any brace it cannot start or
    /// continue any segment, so it is a stray separator (§4.1).
    fn lex_colon(&mut self) {
        if self.brace_depth == 0 {
            self.stray_separator(':', "':' is only valid inside a parameter's braces");
            return;
        }
        self.push_single(TokenKind::Colon, ':');
    }

    /// `,` only ever appears between an option's long and short aliases,
    /// outside any brace; inside braces it is a stray separator (§4.1).
    fn lex_comma(&mut self) {
        if self.brace_depth > 0 {
            self.stray_separator(',', "',' is only valid between an option's aliases, outside braces");
            return;
        }
        self.push_single(TokenKind::Comma, ',');
    }

    fn stray_separator(&mut self, c: char, message: &str) {
        let start = self.pos;
        self.errors.push(Diagnostic::new(DiagnosticCode::Lex(LexCode::StraySeparator), message, start, 1));
        self.pos += c.len_utf8();
        self.resync();
    }

    fn lex_identifier(&mut self) {
        let start = self.pos;
        let mut end = self.pos;
        for c in self.src[self.pos..].chars() {
            if is_ident_continue(c) {
                end += c.len_utf8();
            } else {
                break;
            }
        }
        let lexeme = self.src[start..end].to_string();
        self.tokens.push(Token {
            kind: TokenKind::Identifier,
            length: lexeme.len(),
            lexeme,
            position: start,
        });
        self.pos = end;
    }

    fn lex_dash(&mut self) {
        let start = self.pos;
        let next = self.peek_char_at(self.pos + 1);
        if next == Some('-') {
            // "--"
            let after = self.peek_char_at(self.pos + 2);
            match after {
                Some(c) if is_ident_start(c) => {
                    self.tokens.push(Token {
                        kind: TokenKind::LongDash,
                        lexeme: "--".to_string(),
                        position: start,
                        length: 2,
                    });
                    self.pos += 2;
                }
                _ => {
                    self.tokens.push(Token {
                        kind: TokenKind::EndOfOptions,
                        lexeme: "--".to_string(),
                        position: start,
                        length: 2,
                    });
                    self.pos += 2;
                }
            }
        } else {
            match next {
                Some(c) if is_ident_start(c) || c.is_ascii_digit() => {
                    self.tokens.push(Token {
                        kind: TokenKind::ShortDash,
                        lexeme: "-".to_string(),
                        position: start,
                        length: 1,
                    });
                    self.pos += 1;
                    let id_start = self.pos;
                    let id_end = id_start + c.len_utf8();
                    self.tokens.push(Token {
                        kind: TokenKind::Identifier,
                        lexeme: c.to_string(),
                        position: id_start,
                        length: id_end - id_start,
                    });
                    self.pos = id_end;
                }
                _ => {
                    self.errors.push(Diagnostic::new(
                        DiagnosticCode::Lex(LexCode::EmptyIdentifier),
                        "expected a short option name after '-'",
                        start,
                        1,
                    ));
                    self.pos += 1;
                    self.resync();
                }
            }
        }
    }

    /// Consumes `|` and the description text that follows it. Inside a
    /// parameter brace the text is terminated by the closing `}`
    /// (exclusive); outside of braces there is no terminator in the
    /// grammar so the description runs to the end of the source.
    fn lex_pipe(&mut self) {
        let pipe_pos = self.pos;
        self.tokens.push(Token {
            kind: TokenKind::Pipe,
            lexeme: "|".to_string(),
            position: pipe_pos,
            length: 1,
        });
        self.pos += 1;
        let text_start = self.pos;
        let text_end = if self.brace_depth > 0 {
            self.src[self.pos..]
                .find('}')
                .map(|i| self.pos + i)
                .unwrap_or(self.bytes.len())
        } else {
            self.bytes.len()
        };
        let raw = &self.src[text_start..text_end];
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            let trim_offset = raw.find(trimmed).unwrap_or(0);
            self.tokens.push(Token {
                kind: TokenKind::DescText,
                lexeme: trimmed.to_string(),
                position: text_start + trim_offset,
                length: trimmed.len(),
            });
        }
        self.pos = text_end;
    }

    fn lex_unexpected(&mut self) {
        let start = self.pos;
        let c = self.current_char();
        self.errors.push(Diagnostic::new(
            DiagnosticCode::Lex(LexCode::UnexpectedCharacter),
            format!("unexpected character '{c}'"),
            start,
            c.len_utf8(),
        ));
        self.pos += c.len_utf8();
        self.resync();
    }

    /// Skip forward to the next whitespace run (or EOF) after a lex
    /// error, so a single bad byte does not cascade into unrelated
    /// follow-on diagnostics.
    fn resync(&mut self) {
        while self.pos < self.bytes.len() {
            let c = self.current_char();
            if c.is_whitespace() {
                return;
            }
            self.pos += c.len_utf8();
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src).0.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn literal_only() {
        assert_eq!(
            kinds("git commit"),
            vec![TokenKind::Identifier, TokenKind::Identifier, TokenKind::Eof]
        );
    }

    #[test]
    fn positions_match_source_slices() {
        let src = "deploy {env:str?}";
        let (tokens, errors) = tokenize(src);
        assert!(errors.is_empty());
        for t in &tokens {
            if t.kind == TokenKind::Eof {
                continue;
            }
            assert_eq!(&src[t.position..t.position + t.length], t.lexeme);
        }
    }

    #[test]
    fn catch_all_marker() {
        assert_eq!(
            kinds("{*args}"),
            vec![
                TokenKind::LBrace,
                TokenKind::Star,
                TokenKind::Identifier,
                TokenKind::RBrace,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn long_and_short_alias() {
        assert_eq!(
            kinds("--config,-c"),
            vec![
                TokenKind::LongDash,
                TokenKind::Identifier,
                TokenKind::Comma,
                TokenKind::ShortDash,
                TokenKind::Identifier,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn end_of_options_literal() {
        assert_eq!(kinds("--"), vec![TokenKind::EndOfOptions, TokenKind::Eof]);
        assert_eq!(
            kinds("-- {*rest}"),
            vec![
                TokenKind::EndOfOptions,
                TokenKind::LBrace,
                TokenKind::Star,
                TokenKind::Identifier,
                TokenKind::RBrace,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn description_inside_brace_stops_at_close() {
        let (tokens, errors) = tokenize("{name|the target name}");
        assert!(errors.is_empty());
        let desc = tokens
            .iter()
            .find(|t| t.kind == TokenKind::DescText)
            .unwrap();
        assert_eq!(desc.lexeme, "the target name");
    }

    #[test]
    fn description_outside_brace_runs_to_end() {
        let (tokens, errors) = tokenize("--verbose,-v|Enable verbose output");
        assert!(errors.is_empty());
        let desc = tokens
            .iter()
            .find(|t| t.kind == TokenKind::DescText)
            .unwrap();
        assert_eq!(desc.lexeme, "Enable verbose output");
    }

    #[test]
    fn unexpected_character_resyncs() {
        let (tokens, errors) = tokenize("git @ commit");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, DiagnosticCode::Lex(LexCode::UnexpectedCharacter));
        let idents: Vec<_> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Identifier)
            .map(|t| t.lexeme.as_str())
            .collect();
        assert_eq!(idents, vec!["git", "commit"]);
    }

    #[test]
    fn dangling_short_dash_is_an_error() {
        let (_, errors) = tokenize("- foo");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, DiagnosticCode::Lex(LexCode::EmptyIdentifier));
    }

    #[test]
    fn unterminated_brace_is_a_lex_error() {
        let (_, errors) = tokenize("deploy {env");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, DiagnosticCode::Lex(LexCode::UnterminatedBrace));
        assert_eq!(errors[0].position, 7);
    }

    #[test]
    fn colon_outside_braces_is_a_stray_separator() {
        let (_, errors) = tokenize("deploy : env");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, DiagnosticCode::Lex(LexCode::StraySeparator));
    }

    #[test]
    fn comma_inside_braces_is_a_stray_separator() {
        let (_, errors) = tokenize("{env,tag}");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, DiagnosticCode::Lex(LexCode::StraySeparator));
    }
}

// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

//! Typed diagnostics shared by every stage of the route pipeline.
//!
//! Lex, parse and semantic errors are collected against a pattern source
//! and cite a byte position into that source (§3.7, §4.1–§4.3). Resolve
//! and bind errors cite an argv index instead. Nothing in this module
//! throws: every fallible operation elsewhere in the crate returns
//! `Diagnostic`/`Vec<Diagnostic>` values.

use std::fmt;

/// Which stage raised a diagnostic. Used only for the `"<Kind> Error"`
/// prefix in [`Diagnostic::format`]; the actual error identity lives in
/// [`DiagnosticCode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Lex,
    Parse,
    Semantic,
    Resolve,
    Bind,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Kind::Lex => "Lex",
            Kind::Parse => "Parse",
            Kind::Semantic => "Semantic",
            Kind::Resolve => "Resolve",
            Kind::Bind => "Bind",
        };
        write!(f, "{s}")
    }
}

/// Lex error codes (`L*`), produced by [`crate::lexer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexCode {
    /// `L001`: a `{` was never closed by a matching `}`.
    UnterminatedBrace,
    /// `L002`: a byte that cannot start any token was encountered.
    UnexpectedCharacter,
    /// `L003`: an identifier was required but zero characters were found.
    EmptyIdentifier,
    /// `L004`: a separator (`:`, `|`, `?`, `,`, `*`) appeared where no
    /// token may legally start.
    StraySeparator,
}

impl LexCode {
    pub fn label(self) -> &'static str {
        match self {
            LexCode::UnterminatedBrace => "L001",
            LexCode::UnexpectedCharacter => "L002",
            LexCode::EmptyIdentifier => "L003",
            LexCode::StraySeparator => "L004",
        }
    }
}

/// Parse error codes (`P*`), produced by [`crate::parser`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseCode {
    /// `P001`: a parameter brace was opened but never closed.
    MissingClosingBrace,
    /// `P002`: the token after `:` was not a type-constraint identifier.
    InvalidTokenAfterColon,
    /// `P003`: the token after `|` was not description text.
    InvalidTokenAfterPipe,
    /// `P004`: an option segment could not be parsed (bad alias pair,
    /// value without a parameter, etc).
    MalformedOption,
    /// `P005`: a token could not begin any known segment; the parser
    /// resynchronised past it.
    UnexpectedToken,
}

impl ParseCode {
    pub fn label(self) -> &'static str {
        match self {
            ParseCode::MissingClosingBrace => "P001",
            ParseCode::InvalidTokenAfterColon => "P002",
            ParseCode::InvalidTokenAfterPipe => "P003",
            ParseCode::MalformedOption => "P004",
            ParseCode::UnexpectedToken => "P005",
        }
    }
}

/// Semantic error codes (`S001`–`S008`), produced by [`crate::semantics`].
/// Names and rules match §4.3 verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticCode {
    DuplicateParameterNames,
    ConflictingOptionalParameters,
    CatchAllNotAtEnd,
    MixedCatchAllWithOptional,
    DuplicateOptionAlias,
    OptionalBeforeRequired,
    InvalidEndOfOptionsSeparator,
    OptionsAfterEndOfOptionsSeparator,
}

impl SemanticCode {
    pub fn label(self) -> &'static str {
        match self {
            SemanticCode::DuplicateParameterNames => "S001",
            SemanticCode::ConflictingOptionalParameters => "S002",
            SemanticCode::CatchAllNotAtEnd => "S003",
            SemanticCode::MixedCatchAllWithOptional => "S004",
            SemanticCode::DuplicateOptionAlias => "S005",
            SemanticCode::OptionalBeforeRequired => "S006",
            SemanticCode::InvalidEndOfOptionsSeparator => "S007",
            SemanticCode::OptionsAfterEndOfOptionsSeparator => "S008",
        }
    }
}

/// Resolve error kinds (§4.7.4). Position is an argv index rather than a
/// source byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveCode {
    NoRouteMatch,
    UnexpectedToken,
    RequiredOptionMissing,
    RequiredParameterMissing,
}

impl ResolveCode {
    pub fn label(self) -> &'static str {
        match self {
            ResolveCode::NoRouteMatch => "R001",
            ResolveCode::UnexpectedToken => "R002",
            ResolveCode::RequiredOptionMissing => "R003",
            ResolveCode::RequiredParameterMissing => "R004",
        }
    }
}

/// Bind error kinds (§4.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindCode {
    ConversionFailed,
    MissingRequiredParameter,
}

impl BindCode {
    pub fn label(self) -> &'static str {
        match self {
            BindCode::ConversionFailed => "B001",
            BindCode::MissingRequiredParameter => "B002",
        }
    }
}

/// The stable identity of a diagnostic. `label()` is what diagnostic
/// codes in `spec.md` refer to (`S006`, `P001`, ...); `kind()` is what
/// picks the `format()` prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticCode {
    Lex(LexCode),
    Parse(ParseCode),
    Semantic(SemanticCode),
    Resolve(ResolveCode),
    Bind(BindCode),
}

impl DiagnosticCode {
    pub fn kind(self) -> Kind {
        match self {
            DiagnosticCode::Lex(_) => Kind::Lex,
            DiagnosticCode::Parse(_) => Kind::Parse,
            DiagnosticCode::Semantic(_) => Kind::Semantic,
            DiagnosticCode::Resolve(_) => Kind::Resolve,
            DiagnosticCode::Bind(_) => Kind::Bind,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DiagnosticCode::Lex(c) => c.label(),
            DiagnosticCode::Parse(c) => c.label(),
            DiagnosticCode::Semantic(c) => c.label(),
            DiagnosticCode::Resolve(c) => c.label(),
            DiagnosticCode::Bind(c) => c.label(),
        }
    }
}

/// A single diagnostic: a typed code, a human-readable message, a
/// position/length into the thing it describes (pattern source for
/// lex/parse/semantic, argv index for resolve/bind), and an optional
/// "did you mean" suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub message: String,
    pub position: usize,
    pub length: usize,
    pub suggestion: Option<String>,
}

impl Diagnostic {
    pub fn new(code: DiagnosticCode, message: impl Into<String>, position: usize, length: usize) -> Self {
        Self {
            code,
            message: message.into(),
            position,
            length,
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Render the one-line-plus-optional-suggestion form required by §4.10.
    pub fn format(&self) -> String {
        let mut out = format!(
            "{} Error at position {}: {}",
            self.code.kind(),
            self.position,
            self.message
        );
        if let Some(suggestion) = &self.suggestion {
            out.push_str("\n    ");
            out.push_str(suggestion);
        }
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format())
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn format_without_suggestion() {
        let d = Diagnostic::new(DiagnosticCode::Lex(LexCode::UnexpectedCharacter), "stray '@'", 4, 1);
        assert_eq!(d.format(), "Lex Error at position 4: stray '@'");
    }

    #[test]
    fn format_with_suggestion() {
        let d = Diagnostic::new(
            DiagnosticCode::Semantic(SemanticCode::OptionalBeforeRequired),
            "required parameter follows an optional one",
            10,
            3,
        )
        .with_suggestion("move {tag} before {env?}");
        assert_eq!(
            d.format(),
            "Semantic Error at position 10: required parameter follows an optional one\n    move {tag} before {env?}"
        );
    }

    #[test]
    fn labels_match_spec_codes() {
        assert_eq!(SemanticCode::DuplicateParameterNames.label(), "S001");
        assert_eq!(SemanticCode::OptionsAfterEndOfOptionsSeparator.label(), "S008");
    }
}

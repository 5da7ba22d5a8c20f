// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

//! Semantic validation of a parsed pattern tree (§4.3, C3).
//!
//! Runs eight independent, side-effect-free checks over a syntactically
//! valid [`Syntax`] and returns every violation found; it never short
//! circuits on the first error; it never mutates the tree it checks.

use std::collections::HashMap;

use crate::ast::{Segment, Syntax};
use crate::diagnostics::{Diagnostic, DiagnosticCode, SemanticCode};

/// Runs all eight checks from §4.3 and returns the combined diagnostic
/// list (empty if the tree is semantically well-formed).
pub fn validate(tree: &Syntax) -> Vec<Diagnostic> {
    let mut errors = Vec::new();
    check_duplicate_parameter_names(tree, &mut errors);
    check_conflicting_optional_parameters(tree, &mut errors);
    check_catch_all_not_at_end(tree, &mut errors);
    check_mixed_catch_all_with_optional(tree, &mut errors);
    check_duplicate_option_alias(tree, &mut errors);
    check_optional_before_required(tree, &mut errors);
    check_end_of_options_separator(tree, &mut errors);
    errors
}

fn diag(code: SemanticCode, message: impl Into<String>, position: usize, length: usize) -> Diagnostic {
    Diagnostic::new(DiagnosticCode::Semantic(code), message, position, length)
}

/// S001: no two parameter-bearing segments (positional or option-value)
/// share a name.
fn check_duplicate_parameter_names(tree: &Syntax, errors: &mut Vec<Diagnostic>) {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for (name, position, length) in tree.segments.iter().filter_map(|s| match s {
        Segment::Parameter(p) => Some((p.name.as_str(), p.position, p.length)),
        Segment::Option(o) => o.parameter.as_ref().map(|p| (p.name.as_str(), p.position, p.length)),
        Segment::Literal(_) => None,
    }) {
        if let Some(_first_position) = seen.get(name) {
            errors.push(diag(
                SemanticCode::DuplicateParameterNames,
                format!("parameter name '{name}' is used more than once"),
                position,
                length,
            ));
        } else {
            seen.insert(name, position);
        }
    }
}

/// Positional segments only: literals (excluding the `--` separator) and
/// bare parameters, in source order. Options are a parallel channel and
/// do not participate in positional adjacency checks.
fn positional_segments(tree: &Syntax) -> impl Iterator<Item = &Segment> {
    tree.segments.iter().filter(|s| match s {
        Segment::Literal(l) => !l.is_end_of_options(),
        Segment::Parameter(_) => true,
        Segment::Option(_) => false,
    })
}

/// S002: no two immediately-adjacent positional parameters are both
/// optional.
fn check_conflicting_optional_parameters(tree: &Syntax, errors: &mut Vec<Diagnostic>) {
    let positionals: Vec<&Segment> = positional_segments(tree).collect();
    for pair in positionals.windows(2) {
        if let (Segment::Parameter(a), Segment::Parameter(b)) = (pair[0], pair[1]) {
            if a.is_optional && b.is_optional {
                errors.push(diag(
                    SemanticCode::ConflictingOptionalParameters,
                    format!(
                        "optional parameters '{}' and '{}' are adjacent and ambiguous",
                        a.name, b.name
                    ),
                    b.position,
                    b.length,
                ));
            }
        }
    }
}

/// S003: no positional segment follows a catch-all.
fn check_catch_all_not_at_end(tree: &Syntax, errors: &mut Vec<Diagnostic>) {
    let positionals: Vec<&Segment> = positional_segments(tree).collect();
    let mut seen_catch_all = false;
    for seg in positionals {
        if seen_catch_all {
            errors.push(diag(
                SemanticCode::CatchAllNotAtEnd,
                "a positional segment follows a catch-all parameter",
                seg.position(),
                seg.length(),
            ));
        }
        if let Segment::Parameter(p) = seg {
            if p.is_catch_all {
                seen_catch_all = true;
            }
        }
    }
}

/// S004: a tree with a catch-all may not also declare an optional
/// positional parameter.
fn check_mixed_catch_all_with_optional(tree: &Syntax, errors: &mut Vec<Diagnostic>) {
    let has_catch_all = positional_segments(tree).any(|s| matches!(s, Segment::Parameter(p) if p.is_catch_all));
    if !has_catch_all {
        return;
    }
    for seg in positional_segments(tree) {
        if let Segment::Parameter(p) = seg {
            if p.is_optional && !p.is_catch_all {
                errors.push(diag(
                    SemanticCode::MixedCatchAllWithOptional,
                    format!("optional parameter '{}' cannot coexist with a catch-all", p.name),
                    p.position,
                    p.length,
                ));
            }
        }
    }
}

/// S005: a short form is used by at most one option.
fn check_duplicate_option_alias(tree: &Syntax, errors: &mut Vec<Diagnostic>) {
    let mut seen: HashMap<char, usize> = HashMap::new();
    for seg in &tree.segments {
        if let Segment::Option(o) = seg {
            if let Some(short) = o.short_form {
                if seen.contains_key(&short) {
                    errors.push(diag(
                        SemanticCode::DuplicateOptionAlias,
                        format!("short option '-{short}' is declared more than once"),
                        o.position,
                        o.length,
                    ));
                } else {
                    seen.insert(short, o.position);
                }
            }
        }
    }
}

/// S006: no required positional parameter follows an optional one;
/// an intervening literal or option resets the tracked state.
fn check_optional_before_required(tree: &Syntax, errors: &mut Vec<Diagnostic>) {
    let mut saw_optional = false;
    for seg in &tree.segments {
        match seg {
            Segment::Literal(l) if !l.is_end_of_options() => saw_optional = false,
            Segment::Literal(_) => {}
            Segment::Option(_) => saw_optional = false,
            Segment::Parameter(p) => {
                if saw_optional && !p.is_optional {
                    errors.push(diag(
                        SemanticCode::OptionalBeforeRequired,
                        format!("required parameter '{}' follows an optional positional parameter", p.name),
                        p.position,
                        p.length,
                    ));
                }
                saw_optional = p.is_optional;
            }
        }
    }
}

/// S007 + S008: validates the end-of-options separator, if present.
fn check_end_of_options_separator(tree: &Syntax, errors: &mut Vec<Diagnostic>) {
    let Some(sep_index) = tree
        .segments
        .iter()
        .position(|s| matches!(s, Segment::Literal(l) if l.is_end_of_options()))
    else {
        return;
    };

    let sep = &tree.segments[sep_index];
    let rest = &tree.segments[sep_index + 1..];
    let valid_tail = matches!(rest.first(), Some(Segment::Parameter(p)) if p.is_catch_all) && rest.len() == 1;
    if !valid_tail {
        errors.push(diag(
            SemanticCode::InvalidEndOfOptionsSeparator,
            "'--' must be followed by exactly one catch-all parameter and nothing else",
            sep.position(),
            sep.length(),
        ));
    }

    for seg in rest {
        if let Segment::Option(o) = seg {
            errors.push(diag(
                SemanticCode::OptionsAfterEndOfOptionsSeparator,
                "an option segment appears after the '--' separator",
                o.position,
                o.length,
            ));
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::parse;

    fn tree_of(src: &str) -> Syntax {
        let (tokens, lex_errors) = tokenize(src);
        assert!(lex_errors.is_empty());
        let (tree, parse_errors) = parse(tokens);
        assert!(parse_errors.is_empty(), "parse errors: {parse_errors:?}");
        tree
    }

    #[test]
    fn optional_before_required_is_rejected() {
        let tree = tree_of("deploy {env?} {tag}");
        let errors = validate(&tree);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, DiagnosticCode::Semantic(SemanticCode::OptionalBeforeRequired));
    }

    #[test]
    fn catch_all_not_at_end_is_rejected() {
        let tree = tree_of("cmd {*a} {b}");
        let errors = validate(&tree);
        assert!(errors
            .iter()
            .any(|e| e.code == DiagnosticCode::Semantic(SemanticCode::CatchAllNotAtEnd)));
    }

    #[test]
    fn well_formed_pattern_has_no_errors() {
        let tree = tree_of("git commit --amend --no-edit");
        assert!(validate(&tree).is_empty());
    }

    #[test]
    fn duplicate_parameter_names_rejected() {
        let tree = tree_of("copy {path} --dest {path}");
        let errors = validate(&tree);
        assert!(errors
            .iter()
            .any(|e| e.code == DiagnosticCode::Semantic(SemanticCode::DuplicateParameterNames)));
    }

    #[test]
    fn duplicate_short_alias_rejected() {
        let tree = tree_of("build --config,-c {mode} --clean,-c");
        let errors = validate(&tree);
        assert!(errors
            .iter()
            .any(|e| e.code == DiagnosticCode::Semantic(SemanticCode::DuplicateOptionAlias)));
    }

    #[test]
    fn mixed_catch_all_with_optional_rejected() {
        let tree = tree_of("run {opt?} {*rest}");
        let errors = validate(&tree);
        assert!(errors
            .iter()
            .any(|e| e.code == DiagnosticCode::Semantic(SemanticCode::MixedCatchAllWithOptional)));
    }

    #[test]
    fn end_of_options_without_catch_all_rejected() {
        let tree = tree_of("run -- {foo}");
        let errors = validate(&tree);
        assert!(errors
            .iter()
            .any(|e| e.code == DiagnosticCode::Semantic(SemanticCode::InvalidEndOfOptionsSeparator)));
    }

    #[test]
    fn option_after_end_of_options_rejected() {
        let tree = tree_of("run -- {*rest} --oops");
        let errors = validate(&tree);
        assert!(errors
            .iter()
            .any(|e| e.code == DiagnosticCode::Semantic(SemanticCode::InvalidEndOfOptionsSeparator)));
        assert!(errors
            .iter()
            .any(|e| e.code == DiagnosticCode::Semantic(SemanticCode::OptionsAfterEndOfOptionsSeparator)));
    }

    #[test]
    fn adjacent_optional_positionals_rejected() {
        let tree = tree_of("cmd {a?} {b?}");
        let errors = validate(&tree);
        assert!(errors
            .iter()
            .any(|e| e.code == DiagnosticCode::Semantic(SemanticCode::ConflictingOptionalParameters)));
    }
}

// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

//! Lowers a validated [`Syntax`] tree into an ordered matcher program and
//! a specificity score (§4.4, C4). Compilation is total over validated
//! trees: it never fails.

use crate::ast::{Segment, Syntax};

/// How a registered endpoint should be classified for host-side
/// dispatch (CQRS-style). The core never inspects this value beyond
/// carrying it through; the host decides what each classification
/// means (e.g. transactional boundaries, retry policy).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Query,
    Command,
    IdempotentCommand,
}

/// One positional slot in a compiled route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteMatcher {
    Literal(LiteralMatcher),
    Parameter(ParameterMatcher),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralMatcher {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterMatcher {
    pub name: String,
    pub type_constraint: Option<String>,
    pub is_optional: bool,
    pub is_catch_all: bool,
}

/// A compiled `Option` segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionMatcher {
    pub long_form: Option<String>,
    pub short_form: Option<char>,
    pub parameter_name: Option<String>,
    pub expects_value: bool,
    pub parameter_type: Option<String>,
    pub parameter_is_optional: bool,
    pub is_optional_flag: bool,
    pub is_repeated: bool,
    pub description: Option<String>,
}

impl OptionMatcher {
    /// The key used in the extracted-values map and the handler
    /// signature: the long form if present, else the short form.
    pub fn canonical_name(&self) -> String {
        match (&self.long_form, self.short_form) {
            (Some(long), _) => long.clone(),
            (None, Some(short)) => short.to_string(),
            (None, None) => String::new(),
        }
    }

    pub fn matches_token(&self, token: &str) -> bool {
        let head = token.split('=').next().unwrap_or(token);
        if let Some(long) = &self.long_form {
            if head == format!("--{long}") {
                return true;
            }
        }
        if let Some(short) = self.short_form {
            if head == format!("-{short}") {
                return true;
            }
        }
        false
    }
}

/// A fully lowered route, ready to be matched against argv (§3.3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledRoute {
    pub positional_matchers: Vec<RouteMatcher>,
    pub option_matchers: Vec<OptionMatcher>,
    pub has_catch_all: bool,
    pub catch_all_name: Option<String>,
    pub specificity: i64,
    pub message_type: MessageType,
}

/// Segment weights from §4.4. Kept as named constants rather than
/// inlined literals so the ordering invariant (literals > required
/// parameters > optional parameters > catch-all; required options >
/// optional options) stays easy to audit.
mod weight {
    pub const LITERAL: i64 = 100;
    pub const REQUIRED_TYPED_PARAMETER: i64 = 50;
    pub const REQUIRED_UNTYPED_PARAMETER: i64 = 40;
    pub const OPTIONAL_PARAMETER: i64 = 20;
    pub const CATCH_ALL_PARAMETER: i64 = 1;
    pub const REQUIRED_OPTION: i64 = 30;
    pub const SHORT_FORM_ALIAS: i64 = 5;
    pub const OPTION_VALUE_REQUIRED: i64 = 10;
    pub const OPTIONAL_OPTION: i64 = 10;
}

fn parameter_weight(is_catch_all: bool, is_optional: bool, has_type: bool) -> i64 {
    if is_catch_all {
        weight::CATCH_ALL_PARAMETER
    } else if is_optional {
        weight::OPTIONAL_PARAMETER
    } else if has_type {
        weight::REQUIRED_TYPED_PARAMETER
    } else {
        weight::REQUIRED_UNTYPED_PARAMETER
    }
}

fn option_weight(
    is_optional_flag: bool,
    has_short_form: bool,
    expects_value: bool,
    value_required: bool,
) -> i64 {
    if is_optional_flag {
        weight::OPTIONAL_OPTION
    } else {
        let mut w = weight::REQUIRED_OPTION;
        if has_short_form {
            w += weight::SHORT_FORM_ALIAS;
        }
        if expects_value && value_required {
            w += weight::OPTION_VALUE_REQUIRED;
        }
        w
    }
}

/// Lowers a semantically validated tree into a [`CompiledRoute`].
/// `message_type` is supplied by the host at registration time (§3.4);
/// the pattern text carries no information about it.
pub fn compile(tree: &Syntax, message_type: MessageType) -> CompiledRoute {
    let mut positional_matchers = Vec::new();
    let mut option_matchers = Vec::new();
    let mut has_catch_all = false;
    let mut catch_all_name = None;
    let mut specificity: i64 = 0;

    let mut segments = tree.segments.iter().peekable();
    while let Some(segment) = segments.next() {
        match segment {
            Segment::Literal(l) if l.is_end_of_options() => {
                // Not emitted as a matcher; the following catch-all
                // parameter is tagged instead (§4.4 step 1).
                if let Some(Segment::Parameter(p)) = segments.peek() {
                    if p.is_catch_all {
                        has_catch_all = true;
                        catch_all_name = Some(p.name.clone());
                        specificity += weight::CATCH_ALL_PARAMETER;
                        segments.next();
                    }
                }
            }
            Segment::Literal(l) => {
                specificity += weight::LITERAL;
                positional_matchers.push(RouteMatcher::Literal(LiteralMatcher {
                    value: l.value.clone(),
                }));
            }
            Segment::Parameter(p) => {
                specificity += parameter_weight(p.is_catch_all, p.is_optional, p.type_constraint.is_some());
                if p.is_catch_all {
                    has_catch_all = true;
                    catch_all_name = Some(p.name.clone());
                }
                positional_matchers.push(RouteMatcher::Parameter(ParameterMatcher {
                    name: p.name.clone(),
                    type_constraint: p.type_constraint.clone(),
                    is_optional: p.is_optional,
                    is_catch_all: p.is_catch_all,
                }));
            }
            Segment::Option(o) => {
                let expects_value = o.parameter.is_some();
                let parameter_is_optional = o.parameter.as_ref().map(|p| p.is_optional).unwrap_or(false);
                specificity += option_weight(
                    o.is_optional_flag,
                    o.short_form.is_some(),
                    expects_value,
                    !parameter_is_optional,
                );
                option_matchers.push(OptionMatcher {
                    long_form: o.long_form.clone(),
                    short_form: o.short_form,
                    parameter_name: o.parameter.as_ref().map(|p| p.name.clone()),
                    expects_value,
                    parameter_type: o.parameter.as_ref().and_then(|p| p.type_constraint.clone()),
                    parameter_is_optional,
                    is_optional_flag: o.is_optional_flag,
                    is_repeated: o.is_repeated,
                    description: o.description.clone(),
                });
            }
        }
    }

    CompiledRoute {
        positional_matchers,
        option_matchers,
        has_catch_all,
        catch_all_name,
        specificity,
        message_type,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::parse;

    fn compile_src(src: &str) -> CompiledRoute {
        let (tokens, _) = tokenize(src);
        let (tree, errors) = parse(tokens);
        assert!(errors.is_empty());
        compile(&tree, MessageType::Command)
    }

    #[test]
    fn literal_beats_parameter() {
        let literal_route = compile_src("status");
        let param_route = compile_src("{status}");
        assert!(literal_route.specificity > param_route.specificity);
    }

    #[test]
    fn required_beats_optional_beats_catch_all() {
        let required = compile_src("{a}");
        let optional = compile_src("{a?}");
        let catch_all = compile_src("{*a}");
        assert!(required.specificity > optional.specificity);
        assert!(optional.specificity > catch_all.specificity);
    }

    #[test]
    fn typed_beats_untyped_parameter() {
        let typed = compile_src("{a:int}");
        let untyped = compile_src("{a}");
        assert!(typed.specificity > untyped.specificity);
    }

    #[test]
    fn required_option_beats_optional_option() {
        let required = compile_src("--verbose");
        let optional = compile_src("--verbose?");
        assert!(required.specificity > optional.specificity);
    }

    #[test]
    fn end_of_options_tags_catch_all_without_a_matcher_entry() {
        let route = compile_src("run -- {*rest}");
        assert!(route.has_catch_all);
        assert_eq!(route.catch_all_name.as_deref(), Some("rest"));
        assert!(route.positional_matchers.is_empty());
    }

    #[test]
    fn positional_order_is_preserved() {
        let route = compile_src("mv {src} {dst}");
        let names: Vec<&str> = route
            .positional_matchers
            .iter()
            .map(|m| match m {
                RouteMatcher::Parameter(p) => p.name.as_str(),
                RouteMatcher::Literal(l) => l.value.as_str(),
            })
            .collect();
        assert_eq!(names, vec!["src", "dst"]);
    }
}

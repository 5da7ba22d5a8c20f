// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

//! Argument resolver (§4.7, C7): walks every compiled route against an
//! argv vector, highest specificity first, and returns the first
//! successful match. Single-threaded, cooperative, no suspension points
//! (§5); every attempt is pure — it mutates neither `args` nor the
//! endpoint it is tried against, and allocates a fresh extracted map.

use std::collections::{BTreeMap, HashSet};

use crate::compiler::{CompiledRoute, OptionMatcher, RouteMatcher};
use crate::diagnostics::{Diagnostic, DiagnosticCode, ResolveCode};
use crate::endpoint::EndpointCollection;

/// The outcome of a successful resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub endpoint_index: usize,
    pub extracted: BTreeMap<String, String>,
    pub consumed_count: usize,
}

/// Walks `endpoints` (already sorted by descending specificity) against
/// `args` and returns the first successful match, or a single
/// diagnostic summarising the closest attempted route (§4.7.3, §4.7.4).
pub fn resolve(args: &[String], endpoints: &EndpointCollection) -> Result<Resolution, Diagnostic> {
    let mut closest: Option<(usize, RouteFailure)> = None;

    for (index, endpoint) in endpoints.iter().enumerate() {
        match try_match(args, &endpoint.compiled) {
            Ok(m) => {
                return Ok(Resolution {
                    endpoint_index: index,
                    extracted: m.extracted,
                    consumed_count: m.consumed_count,
                })
            }
            Err(failure) => {
                let better = closest
                    .as_ref()
                    .map(|(_, best)| failure.reached_index > best.reached_index)
                    .unwrap_or(true);
                if better {
                    closest = Some((index, failure));
                }
            }
        }
    }

    match closest {
        Some((_, failure)) => {
            let diagnostic = Diagnostic::new(
                DiagnosticCode::Resolve(failure.code),
                failure.message,
                failure.reached_index,
                1,
            );
            Err(match failure.suggestion {
                Some(suggestion) => diagnostic.with_suggestion(suggestion),
                None => diagnostic,
            })
        }
        None => Err(Diagnostic::new(
            DiagnosticCode::Resolve(ResolveCode::NoRouteMatch),
            "no routes are registered",
            0,
            0,
        )),
    }
}

struct MatchResult {
    extracted: BTreeMap<String, String>,
    consumed_count: usize,
}

struct RouteFailure {
    code: ResolveCode,
    message: String,
    reached_index: usize,
    suggestion: Option<String>,
}

fn fail(code: ResolveCode, message: impl Into<String>, reached_index: usize) -> RouteFailure {
    RouteFailure {
        code,
        message: message.into(),
        reached_index,
        suggestion: None,
    }
}

/// `--`-prefixed tokens that fail to match any option this route
/// declares get a "did you mean" suggestion against the route's own
/// long forms, the same way the teacher's `filter_suggestions`
/// suggests a long option from a typo (Jaro similarity above 0.7).
fn suggest_long_option(token: &str, route: &CompiledRoute) -> Option<String> {
    let input = token.strip_prefix("--")?.split('=').next()?;
    route
        .option_matchers
        .iter()
        .filter_map(|m| m.long_form.as_deref())
        .map(|long| (long, strsim::jaro(input, long)))
        .filter(|(_, score)| *score > 0.7)
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap())
        .map(|(long, _)| format!("--{long}"))
}

/// `true` if the catch-all (if any) is the `-- {*name}` separator form,
/// which is absent from `positional_matchers` (§4.4) and is only ever
/// populated by an explicit `--` token (§4.7 step 3).
fn catch_all_is_separator_form(route: &CompiledRoute) -> bool {
    route.has_catch_all
        && !route
            .positional_matchers
            .iter()
            .any(|m| matches!(m, RouteMatcher::Parameter(p) if p.is_catch_all))
}

fn token_matches_some_option(token: &str, route: &CompiledRoute) -> bool {
    token.starts_with('-') && route.option_matchers.iter().any(|m| m.matches_token(token))
}

fn find_option<'a>(token: &str, route: &'a CompiledRoute) -> Option<&'a OptionMatcher> {
    route.option_matchers.iter().find(|m| m.matches_token(token))
}

/// One per-route attempt, following §4.7.1 step by step.
fn try_match(args: &[String], route: &CompiledRoute) -> Result<MatchResult, RouteFailure> {
    let mut i = 0usize;
    let mut extracted: BTreeMap<String, String> = BTreeMap::new();
    let mut consumed_options: HashSet<String> = HashSet::new();
    let mut repeated_values: BTreeMap<String, Vec<String>> = BTreeMap::new();

    // Step 2: walk positional matchers left to right.
    for matcher in &route.positional_matchers {
        match matcher {
            RouteMatcher::Literal(lit) => {
                let Some(tok) = args.get(i) else {
                    return Err(fail(
                        ResolveCode::RequiredParameterMissing,
                        format!("expected literal '{}'", lit.value),
                        i,
                    ));
                };
                if tok != &lit.value {
                    return Err(fail(
                        ResolveCode::UnexpectedToken,
                        format!("expected '{}', found '{tok}'", lit.value),
                        i,
                    ));
                }
                i += 1;
            }
            RouteMatcher::Parameter(p) if p.is_catch_all => {
                let mut collected = Vec::new();
                while let Some(tok) = args.get(i) {
                    if token_matches_some_option(tok, route) {
                        break;
                    }
                    collected.push(tok.clone());
                    i += 1;
                }
                extracted.insert(p.name.clone(), collected.join(" "));
            }
            RouteMatcher::Parameter(p) => {
                let skip_for_option = args
                    .get(i)
                    .map(|tok| p.is_optional && token_matches_some_option(tok, route))
                    .unwrap_or(false);
                if skip_for_option {
                    continue;
                }
                match args.get(i) {
                    Some(tok) => {
                        extracted.insert(p.name.clone(), tok.clone());
                        i += 1;
                    }
                    None => {
                        if !p.is_optional {
                            return Err(fail(
                                ResolveCode::RequiredParameterMissing,
                                format!("missing required parameter '{}'", p.name),
                                i,
                            ));
                        }
                    }
                }
            }
        }
    }

    // Step 3: remaining argv tokens are options, or the end-of-options
    // separator, or unexpected.
    let separator_catch_all = catch_all_is_separator_form(route);
    'remaining: while i < args.len() {
        let tok = &args[i];

        if let Some(opt) = find_option(tok, route) {
            // The extracted-values map is always keyed by the option's
            // canonical name (its long form, or short form if it has
            // none), regardless of whatever identifier its value
            // parameter uses inside `{...}` — that inner name is
            // metavar text for the help renderer, not a bind key
            // (§4.9's `--config=<mode>` still binds as "config").
            let canonical = opt.canonical_name();
            if opt.expects_value {
                let inline = tok.split_once('=').map(|(_, v)| v.to_string());
                let value = if let Some(v) = inline {
                    i += 1;
                    Some(v)
                } else {
                    let next_is_value = args
                        .get(i + 1)
                        .map(|next| !(opt.parameter_is_optional && token_matches_some_option(next, route)))
                        .unwrap_or(false);
                    if next_is_value {
                        let v = args[i + 1].clone();
                        i += 2;
                        Some(v)
                    } else {
                        i += 1;
                        None
                    }
                };
                match value {
                    Some(v) => {
                        if opt.is_repeated {
                            repeated_values.entry(canonical.clone()).or_default().push(v);
                        } else {
                            extracted.insert(canonical.clone(), v);
                        }
                    }
                    None if opt.parameter_is_optional => {}
                    None => {
                        return Err(fail(
                            ResolveCode::RequiredParameterMissing,
                            format!("option '{canonical}' requires a value"),
                            i,
                        ));
                    }
                }
            } else {
                if opt.is_repeated {
                    repeated_values.entry(canonical.clone()).or_default().push("true".to_string());
                } else {
                    extracted.insert(canonical.clone(), "true".to_string());
                }
                i += 1;
            }
            consumed_options.insert(canonical);
            continue 'remaining;
        }

        if tok == "--" && separator_catch_all {
            let name = route.catch_all_name.clone().unwrap_or_default();
            let rest = args[i + 1..].to_vec();
            extracted.insert(name, rest.join(" "));
            i = args.len();
            break 'remaining;
        }

        let mut failure = fail(
            ResolveCode::UnexpectedToken,
            format!("unexpected token '{tok}'"),
            i,
        );
        failure.suggestion = suggest_long_option(tok, route);
        return Err(failure);
    }

    // Step 4: required options and required positional parameters.
    for opt in &route.option_matchers {
        if !opt.is_optional_flag && !consumed_options.contains(&opt.canonical_name()) {
            return Err(fail(
                ResolveCode::RequiredOptionMissing,
                format!("required option '{}' was not provided", opt.canonical_name()),
                i,
            ));
        }
    }
    for matcher in &route.positional_matchers {
        if let RouteMatcher::Parameter(p) = matcher {
            if !p.is_optional && !p.is_catch_all && !extracted.contains_key(&p.name) {
                return Err(fail(
                    ResolveCode::RequiredParameterMissing,
                    format!("missing required parameter '{}'", p.name),
                    i,
                ));
            }
        }
    }

    // A catch-all always succeeds even with zero captured tokens (§8.3);
    // make sure its key is present either way.
    if route.has_catch_all {
        let name = route.catch_all_name.clone().unwrap_or_default();
        extracted.entry(name).or_insert_with(String::new);
    }

    // Step 5: collapse repeated options by joining with a single space.
    for (name, values) in repeated_values {
        extracted.insert(name, values.join(" "));
    }

    Ok(MatchResult {
        extracted,
        consumed_count: i,
    })
}

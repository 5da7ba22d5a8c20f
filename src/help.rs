// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

//! Help text renderer (§4.9, C9). Reads the endpoint collection (C5)
//! and renders a plain-text help page; it never touches argv or the
//! converter registry. Column alignment follows the same two-pass
//! layout the teacher's `print_flags` uses: compute every flag
//! signature first, then pad the help text to a fixed column.

use crate::compiler::{OptionMatcher, RouteMatcher};
use crate::endpoint::{Endpoint, EndpointCollection};

const INDENT: usize = 2;
const FLAG_COLUMN_WIDTH: usize = 20;

/// Renders the full help page for `endpoints` under `program_name`:
/// a usage line, a Commands section (sorted lexicographically by
/// pattern) and an Options section, in that order (§4.9). Auto-help
/// routes are excluded from both sections: a bare `help` command, a
/// bare `--help`/`-h` option, and any `<cmd> --help` route — none of
/// them are a command or option of the page they produce.
pub fn render_help(endpoints: &EndpointCollection, program_name: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("Usage:\n{}{program_name} <command> [options]\n", indent()));

    let mut commands: Vec<&Endpoint> = endpoints.commands().filter(|e| !is_auto_help_route(e)).collect();
    commands.sort_by(|a, b| a.pattern_source.cmp(&b.pattern_source));
    if !commands.is_empty() {
        out.push_str("\nCommands:\n");
        let rows: Vec<(String, String)> = commands
            .iter()
            .map(|e| (route_signature(e), e.description.clone().unwrap_or_default()))
            .collect();
        print_rows(&mut out, &rows);
    }

    let mut options: Vec<&Endpoint> = endpoints.options().filter(|e| !is_auto_help_route(e)).collect();
    options.sort_by(|a, b| a.pattern_source.cmp(&b.pattern_source));
    if !options.is_empty() {
        out.push_str("\nOptions:\n");
        let rows: Vec<(String, String)> = options
            .iter()
            .map(|e| (route_signature(e), e.description.clone().unwrap_or_default()))
            .collect();
        print_rows(&mut out, &rows);
    }

    out
}

/// `true` for any of the three auto-help forms §4.9 excludes: a bare
/// `help` literal, a route carrying a `--help`/`-h` option, or a
/// `<cmd> --help` route — the latter two share one check, since a
/// trailing `--help` on a command route is still an option matcher
/// named `help`.
fn is_auto_help_route(endpoint: &Endpoint) -> bool {
    is_bare_help_command(endpoint) || has_help_option(endpoint)
}

fn is_bare_help_command(endpoint: &Endpoint) -> bool {
    endpoint.pattern_source.trim() == "help"
}

fn has_help_option(endpoint: &Endpoint) -> bool {
    endpoint
        .compiled
        .option_matchers
        .iter()
        .any(|m| m.canonical_name() == "help")
}

fn indent() -> String {
    " ".repeat(INDENT)
}

/// Rewrites a compiled route back into a human-readable signature:
/// `{x}` -> `<x>`, `{x?}` -> `[x]`, `{*x}` -> `<x>...`, options in the
/// teacher's `-s, --long=<value>` style (§4.9).
fn route_signature(endpoint: &Endpoint) -> String {
    let mut parts = Vec::new();
    for matcher in &endpoint.compiled.positional_matchers {
        parts.push(match matcher {
            RouteMatcher::Literal(l) => l.value.clone(),
            RouteMatcher::Parameter(p) if p.is_catch_all => format!("<{}>...", p.name),
            RouteMatcher::Parameter(p) if p.is_optional => format!("[{}]", p.name),
            RouteMatcher::Parameter(p) => format!("<{}>", p.name),
        });
    }
    if endpoint.compiled.has_catch_all && !endpoint.compiled.positional_matchers.iter().any(is_catch_all_matcher) {
        if let Some(name) = &endpoint.compiled.catch_all_name {
            parts.push(format!("-- <{name}>..."));
        }
    }
    for option in &endpoint.compiled.option_matchers {
        parts.push(format_option(option));
    }
    parts.join(" ")
}

fn is_catch_all_matcher(matcher: &RouteMatcher) -> bool {
    matches!(matcher, RouteMatcher::Parameter(p) if p.is_catch_all)
}

fn format_option(option: &OptionMatcher) -> String {
    let value_suffix = match (option.expects_value, option.parameter_is_optional) {
        (false, _) => String::new(),
        (true, true) => format!("[={}]", option.parameter_name.as_deref().unwrap_or("value")),
        (true, false) => format!("={}", option.parameter_name.as_deref().unwrap_or("value")),
    };
    let core = match (option.short_form, &option.long_form) {
        (Some(s), Some(l)) => format!("-{s}, --{l}{value_suffix}"),
        (Some(s), None) => format!("-{s}{value_suffix}"),
        (None, Some(l)) => format!("    --{l}{value_suffix}"),
        (None, None) => String::new(),
    };
    if option.is_optional_flag {
        format!("{core}?")
    } else {
        core
    }
}

/// Column-aligns `(signature, help)` rows the way the teacher's
/// `print_flags` does: pad the signature to [`FLAG_COLUMN_WIDTH`] and
/// place help text after it, wrapping to a fresh indented line when
/// the signature itself overruns the column.
fn print_rows(out: &mut String, rows: &[(String, String)]) {
    let pad = indent();
    for (signature, help) in rows {
        out.push_str(&pad);
        out.push_str(signature);
        if help.is_empty() {
            out.push('\n');
            continue;
        }
        if signature.len() <= FLAG_COLUMN_WIDTH {
            let gap = " ".repeat(FLAG_COLUMN_WIDTH - signature.len() + 2);
            out.push_str(&gap);
            out.push_str(help);
            out.push('\n');
        } else {
            out.push('\n');
            let gap = " ".repeat(FLAG_COLUMN_WIDTH + INDENT + 2);
            out.push_str(&gap);
            out.push_str(help);
            out.push('\n');
        }
    }
}

// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

//! Top-level entry point that wires C1–C4 together: `pattern string ->
//! Compiled | Errors` (§1, §6.3).

use crate::compiler::{self, CompiledRoute, MessageType};
use crate::diagnostics::Diagnostic;
use crate::lexer;
use crate::parser;
use crate::semantics;

/// Lexes, parses, validates and compiles a pattern source in one call.
/// Returns the compiled route on success, or every diagnostic collected
/// along the way on failure. Lex/parse errors take precedence: if the
/// token stream does not yield an error-free tree, semantic validation
/// and compilation are skipped (§4.2: "the tree is discarded by the
/// caller" when parse errors are non-empty).
pub fn parse_pattern(src: &str, message_type: MessageType) -> Result<CompiledRoute, Vec<Diagnostic>> {
    let (tokens, lex_errors) = lexer::tokenize(src);
    if !lex_errors.is_empty() {
        return Err(lex_errors);
    }

    let (tree, parse_errors) = parser::parse(tokens);
    if !parse_errors.is_empty() {
        return Err(parse_errors);
    }

    let semantic_errors = semantics::validate(&tree);
    if !semantic_errors.is_empty() {
        return Err(semantic_errors);
    }

    Ok(compiler::compile(&tree, message_type))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn valid_pattern_compiles() {
        let route = parse_pattern("greet {name}", MessageType::Command).unwrap();
        assert_eq!(route.positional_matchers.len(), 2);
    }

    #[test]
    fn invalid_pattern_surfaces_semantic_errors() {
        let err = parse_pattern("deploy {env?} {tag}", MessageType::Command).unwrap_err();
        assert_eq!(err.len(), 1);
    }

    #[test]
    fn lex_errors_short_circuit_before_semantics() {
        let err = parse_pattern("deploy @ {env?} {tag}", MessageType::Command).unwrap_err();
        // Only the lex error is reported, not the S006 violation too.
        assert_eq!(err.len(), 1);
    }
}

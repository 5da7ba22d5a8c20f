// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

//! Parameter binder (§4.8, C8): turns the resolver's extracted-values
//! map into an ordered argument list a host can hand to a handler.
//! Consults the converter registry (C6) read-only; never mutates an
//! [`Endpoint`](crate::endpoint::Endpoint) or its [`HandlerSig`].

use std::collections::BTreeMap;

use crate::convert::{ConvertedValue, ConverterRegistry};
use crate::diagnostics::{BindCode, Diagnostic, DiagnosticCode};
use crate::endpoint::{HandlerSig, ParamSource, ParamSpec};

/// One bound handler argument, in handler-signature order.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundValue {
    /// A converted value taken from the extracted-values map or a
    /// parameter default.
    Value(ConvertedValue),
    /// A nullable parameter with no extracted value and no default.
    Null,
    /// A `FromHost` parameter: the core does not bind this at all, the
    /// host supplies it directly when invoking the handler (§3.8).
    HostInjected,
}

/// `declared_type` values ending in this suffix are bound as arrays:
/// the extracted text is space-split and each element converted with
/// the element type (the suffix stripped), mirroring
/// [`ConverterRegistry::try_convert_array`] (§4.6, §4.8).
const ARRAY_SUFFIX: &str = "[]";

/// Binds every `FromArgs` parameter in `handler` against `extracted`,
/// in declaration order. `FromHost` parameters are passed through as
/// [`BoundValue::HostInjected`] without being looked up at all. Fails
/// on the first parameter that cannot be bound (§4.8).
pub fn bind(
    extracted: &BTreeMap<String, String>,
    handler: &HandlerSig,
    registry: &ConverterRegistry,
) -> Result<Vec<BoundValue>, Diagnostic> {
    let mut bound = Vec::with_capacity(handler.params.len());
    for (index, param) in handler.params.iter().enumerate() {
        if param.source == ParamSource::FromHost {
            bound.push(BoundValue::HostInjected);
            continue;
        }
        bound.push(bind_one(index, param, extracted, registry)?);
    }
    Ok(bound)
}

fn bind_one(
    index: usize,
    param: &ParamSpec,
    extracted: &BTreeMap<String, String>,
    registry: &ConverterRegistry,
) -> Result<BoundValue, Diagnostic> {
    match extracted.get(&param.name) {
        Some(text) => convert_text(index, param, text, registry),
        None => {
            if let Some(default_text) = &param.default_value {
                convert_text(index, param, default_text, registry)
            } else if param.is_nullable {
                Ok(BoundValue::Null)
            } else {
                Err(Diagnostic::new(
                    DiagnosticCode::Bind(BindCode::MissingRequiredParameter),
                    format!("missing required parameter '{}'", param.name),
                    index,
                    1,
                ))
            }
        }
    }
}

fn convert_text(
    index: usize,
    param: &ParamSpec,
    text: &str,
    registry: &ConverterRegistry,
) -> Result<BoundValue, Diagnostic> {
    let outcome = match param.declared_type.strip_suffix(ARRAY_SUFFIX) {
        Some(element_type) => registry.try_convert_array(text, element_type),
        None => registry.try_convert(text, &param.declared_type),
    };
    outcome.map(BoundValue::Value).map_err(|e| {
        let diagnostic = Diagnostic::new(
            DiagnosticCode::Bind(BindCode::ConversionFailed),
            format!(
                "parameter '{}': cannot convert '{}' to {}: {}",
                param.name, text, param.declared_type, e
            ),
            index,
            1,
        );
        match &e.suggestion {
            Some(suggestion) => diagnostic.with_suggestion(format!("did you mean '{suggestion}'?")),
            None => diagnostic,
        }
    })
}

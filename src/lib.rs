// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

#![doc = include_str!("../README.md")]

pub mod ast;
pub mod binder;
pub mod compiler;
pub mod convert;
pub mod diagnostics;
pub mod endpoint;
pub mod help;
pub mod lexer;
pub mod parser;
pub mod pattern;
pub mod resolver;
pub mod semantics;
pub mod sink;

pub use binder::{bind, BoundValue};
pub use compiler::{CompiledRoute, MessageType};
pub use convert::{ConversionError, ConvertedValue, ConverterRegistry};
pub use diagnostics::{
    BindCode, Diagnostic, DiagnosticCode, Kind, LexCode, ParseCode, ResolveCode, SemanticCode,
};
pub use endpoint::{Endpoint, EndpointCollection, EndpointCollectionBuilder, HandlerSig, ParamSource, ParamSpec};
pub use help::render_help;
pub use pattern::parse_pattern;
pub use resolver::{resolve, Resolution};
pub use sink::{LogSink, NullLogSink, NullTerminalSink, StderrTerminalSink, TerminalSink};

#[cfg(test)]
mod test {
    use super::*;

    /// A small end-to-end smoke test exercising the whole pipeline:
    /// register two routes, resolve argv against the more specific one,
    /// bind its parameters, and render help for the pair.
    #[test]
    fn full_pipeline_from_registration_to_binding() {
        let mut builder = EndpointCollectionBuilder::new();
        builder
            .add(
                "deploy {env} --dry-run?",
                HandlerSig::new(vec![
                    ParamSpec::from_args("env", "string"),
                    ParamSpec::from_args("dry-run", "bool").with_default("false"),
                ]),
                Some("deploy an environment".to_string()),
                MessageType::Command,
            )
            .unwrap();
        builder
            .add("status", HandlerSig::default(), Some("show status".to_string()), MessageType::Query)
            .unwrap();
        let endpoints = builder.build();

        let args: Vec<String> = ["deploy", "prod", "--dry-run"].into_iter().map(String::from).collect();
        let resolution = resolve(&args, &endpoints).unwrap();
        let endpoint = endpoints.get(resolution.endpoint_index).unwrap();

        let registry = ConverterRegistry::with_builtins();
        let bound = bind(&resolution.extracted, &endpoint.handler_signature, &registry).unwrap();
        assert_eq!(bound[0], BoundValue::Value(ConvertedValue::String("prod".to_string())));
        assert_eq!(bound[1], BoundValue::Value(ConvertedValue::Bool(true)));

        let help = render_help(&endpoints, "app");
        assert!(help.contains("deploy an environment"));
        assert!(help.contains("show status"));
    }
}

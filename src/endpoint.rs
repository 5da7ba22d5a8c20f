// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

//! Endpoint and endpoint collection (§3.4, §3.5, C5).
//!
//! Lifecycle: a host builds an [`EndpointCollectionBuilder`], calls
//! [`EndpointCollectionBuilder::add`] for each route, then
//! [`EndpointCollectionBuilder::build`] to freeze it into an
//! [`EndpointCollection`]. After that point the collection has a single
//! writer (the builder, now consumed) and many readers (the resolver,
//! the help renderer) and needs no synchronisation (§5).

use crate::compiler::{self, CompiledRoute, MessageType};
use crate::diagnostics::Diagnostic;
use crate::pattern;

/// Whether a handler parameter is bound from the extracted-values map or
/// injected by the host (§3.8, §9 "service-parameter detection").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamSource {
    FromArgs,
    FromHost,
}

/// One parameter of a handler, as described by the host (§3.4).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: String,
    pub declared_type: String,
    pub is_nullable: bool,
    pub has_default: bool,
    pub default_value: Option<String>,
    pub source: ParamSource,
}

impl ParamSpec {
    pub fn from_args(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            is_nullable: false,
            has_default: false,
            default_value: None,
            source: ParamSource::FromArgs,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.is_nullable = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.has_default = true;
        self.default_value = Some(value.into());
        self
    }

    pub fn from_host(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            is_nullable: false,
            has_default: false,
            default_value: None,
            source: ParamSource::FromHost,
        }
    }
}

/// Host-supplied description of a handler's parameters. The core never
/// inspects the handler body itself — only this descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HandlerSig {
    pub params: Vec<ParamSpec>,
}

impl HandlerSig {
    pub fn new(params: Vec<ParamSpec>) -> Self {
        Self { params }
    }
}

/// A route plus a handler signature plus metadata (§3.4).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub pattern_source: String,
    pub compiled: CompiledRoute,
    pub handler_signature: HandlerSig,
    pub description: Option<String>,
    pub message_type: MessageType,
}

impl Endpoint {
    /// `true` when the pattern is an option-only route (its first
    /// segment is a long option), as used by the help renderer to split
    /// endpoints into the Commands and Options sections (§4.9).
    pub fn is_option_route(&self) -> bool {
        self.pattern_source.trim_start().starts_with("--")
    }
}

/// Mutable builder; the single writer in the build-once/read-many
/// discipline (§5).
#[derive(Default)]
pub struct EndpointCollectionBuilder {
    endpoints: Vec<Endpoint>,
}

impl EndpointCollectionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and compiles `pattern_source` and appends it as a new
    /// endpoint. On any lex/parse/semantic diagnostic, the endpoint is
    /// not added and every diagnostic is returned (§7: "the registration
    /// call itself fails with the diagnostic list").
    pub fn add(
        &mut self,
        pattern_source: impl Into<String>,
        handler_signature: HandlerSig,
        description: Option<String>,
        message_type: MessageType,
    ) -> Result<(), Vec<Diagnostic>> {
        let pattern_source = pattern_source.into();
        let compiled = pattern::parse_pattern(&pattern_source, message_type)?;
        self.endpoints.push(Endpoint {
            pattern_source,
            compiled,
            handler_signature,
            description,
            message_type,
        });
        Ok(())
    }

    /// Freezes the builder into an immutable, specificity-sorted
    /// collection. Ties are broken by registration order (§3.5); since
    /// `sort_by` is a stable sort, this falls out of sorting the
    /// registration-ordered vector directly.
    pub fn build(mut self) -> EndpointCollection {
        self.endpoints
            .sort_by(|a, b| b.compiled.specificity.cmp(&a.compiled.specificity));
        EndpointCollection {
            endpoints: self.endpoints,
        }
    }
}

/// An ordered, immutable-after-build sequence of endpoints sorted by
/// descending specificity (§3.5).
pub struct EndpointCollection {
    endpoints: Vec<Endpoint>,
}

impl EndpointCollection {
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Endpoint> {
        self.endpoints.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Endpoint> {
        self.endpoints.get(index)
    }

    /// Endpoints whose pattern is not option-only, for the Commands
    /// help section (§4.9).
    pub fn commands(&self) -> impl Iterator<Item = &Endpoint> {
        self.endpoints.iter().filter(|e| !e.is_option_route())
    }

    /// Endpoints whose pattern is option-only, for the Options help
    /// section (§4.9).
    pub fn options(&self) -> impl Iterator<Item = &Endpoint> {
        self.endpoints.iter().filter(|e| e.is_option_route())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn sig() -> HandlerSig {
        HandlerSig::default()
    }

    #[test]
    fn build_sorts_by_descending_specificity() {
        let mut builder = EndpointCollectionBuilder::new();
        builder.add("{*rest}", sig(), None, MessageType::Command).unwrap();
        builder.add("git commit", sig(), None, MessageType::Command).unwrap();
        builder.add("git {sub}", sig(), None, MessageType::Command).unwrap();
        let collection = builder.build();
        let specs: Vec<i64> = collection.iter().map(|e| e.compiled.specificity).collect();
        assert!(specs.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(collection.get(0).unwrap().pattern_source, "git commit");
    }

    #[test]
    fn ties_keep_registration_order() {
        let mut builder = EndpointCollectionBuilder::new();
        builder.add("foo {a}", sig(), None, MessageType::Command).unwrap();
        builder.add("bar {a}", sig(), None, MessageType::Command).unwrap();
        let collection = builder.build();
        assert_eq!(collection.get(0).unwrap().pattern_source, "foo {a}");
        assert_eq!(collection.get(1).unwrap().pattern_source, "bar {a}");
    }

    #[test]
    fn invalid_pattern_is_rejected_and_not_added() {
        let mut builder = EndpointCollectionBuilder::new();
        let result = builder.add("deploy {env?} {tag}", sig(), None, MessageType::Command);
        assert!(result.is_err());
        let collection = builder.build();
        assert!(collection.is_empty());
    }

    #[test]
    fn commands_and_options_split() {
        let mut builder = EndpointCollectionBuilder::new();
        builder.add("git commit", sig(), None, MessageType::Command).unwrap();
        builder.add("--verbose", sig(), None, MessageType::Command).unwrap();
        let collection = builder.build();
        assert_eq!(collection.commands().count(), 1);
        assert_eq!(collection.options().count(), 1);
    }
}

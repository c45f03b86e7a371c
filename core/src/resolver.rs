//! Expander resolution — AST node in, live expander tree out.
//!
//! [`ExpanderResolver::resolve`] walks an [`ExpanderNode`] depth-first:
//!
//! 1. look the node's name up in the registry (`UnknownExpander` if absent)
//! 2. resolve each argument left to right; nested nodes become live
//!    expanders, literals pass through unchanged
//! 3. construct the implementation with the resolved arguments and the shared
//!    [`Backtrace`]; constructor errors propagate as-is
//! 4. check the constructed object is a [`PatternExpander`]
//!    (`InvalidExpanderType` otherwise)
//!
//! Resolution is all-or-nothing: the first error aborts the whole tree.
//! Nothing is memoized, so identical sibling nodes produce independent
//! instances.

use tracing::{debug, trace};

use crate::{
    Argument, Arguments, Backtrace, ExpanderArgument, ExpanderError, ExpanderNode,
    ExpanderRegistry, PatternExpander,
};

/// Turns [`ExpanderNode`] trees into [`PatternExpander`] trees.
///
/// One resolver carries one [`Backtrace`]; every expander it constructs shares
/// that handle.
///
/// # Example
///
/// ```
/// use patex::{Backtrace, ExpanderNode, ExpanderRegistry, ExpanderResolver, PatternExpander};
///
/// let registry = ExpanderRegistry::new();
/// let resolver = ExpanderResolver::new(&registry, Backtrace::new());
///
/// let node = ExpanderNode::new("oneOf")
///     .nested(ExpanderNode::new("startsWith").arg("a"))
///     .nested(ExpanderNode::new("startsWith").arg("b"));
/// let expander = resolver.resolve(&node).unwrap();
///
/// assert!(expander.matches(&"apple".into()));
/// assert!(expander.matches(&"banana".into()));
/// assert!(!expander.matches(&"cherry".into()));
/// assert!(expander.backtrace().same_as(resolver.backtrace()));
/// ```
#[derive(Debug)]
pub struct ExpanderResolver<'r> {
    registry: &'r ExpanderRegistry,
    backtrace: Backtrace,
}

impl<'r> ExpanderResolver<'r> {
    /// Create a resolver over `registry` that injects `backtrace`.
    #[must_use]
    pub fn new(registry: &'r ExpanderRegistry, backtrace: Backtrace) -> Self {
        Self {
            registry,
            backtrace,
        }
    }

    /// The backtrace handed to every constructed expander.
    #[must_use]
    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }

    /// Resolve `node` into a live expander.
    ///
    /// # Errors
    ///
    /// - [`ExpanderError::UnknownExpander`] — a node names an unregistered expander
    /// - [`ExpanderError::InvalidExpanderType`] — a registry entry built something
    ///   that is not a [`PatternExpander`]
    /// - any construction error raised by an implementation
    ///   ([`ExpanderError::ArgumentCount`], [`ExpanderError::InvalidArgument`], ...)
    pub fn resolve(&self, node: &ExpanderNode) -> Result<Box<dyn PatternExpander>, ExpanderError> {
        self.resolve_at(node, 0)
    }

    fn resolve_at(
        &self,
        node: &ExpanderNode,
        depth: usize,
    ) -> Result<Box<dyn PatternExpander>, ExpanderError> {
        let name = node.name();
        let implementation =
            self.registry
                .lookup(name)
                .ok_or_else(|| ExpanderError::UnknownExpander {
                    name: name.to_owned(),
                })?;

        debug!(
            expander = name,
            arguments = node.arguments().len(),
            depth,
            "resolving expander"
        );

        let arguments = node
            .arguments()
            .iter()
            .enumerate()
            .map(|(index, argument)| match argument {
                ExpanderArgument::Literal(value) => Ok(Argument::Literal(value.clone())),
                ExpanderArgument::Expander(child) => {
                    trace!(
                        expander = name,
                        position = index,
                        child = child.name(),
                        "resolving nested expander"
                    );
                    self.resolve_at(child, depth + 1).map(Argument::Expander)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        let constructed =
            implementation.construct(Arguments::new(name, arguments), &self.backtrace)?;

        constructed
            .downcast::<Box<dyn PatternExpander>>()
            .map(|expander| *expander)
            .map_err(|_| ExpanderError::InvalidExpanderType {
                name: name.to_owned(),
                type_name: implementation.type_name().to_owned(),
            })
    }
}

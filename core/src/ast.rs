//! Expander AST — the parser's output, the resolver's input.
//!
//! An [`ExpanderNode`] is one expander invocation such as
//! `@oneOf(@startsWith("a"), "b")`: a name plus positional arguments, each of
//! which is either a literal [`Value`] or another node. Trees are strictly
//! descending (no back-references), which the resolver relies on instead of
//! doing cycle detection.
//!
//! # Serialized shape (feature = `"serde"`)
//!
//! ```json
//! { "name": "oneOf",
//!   "arguments": [
//!     { "expander": { "name": "startsWith", "arguments": ["a"] } },
//!     "b"
//!   ] }
//! ```
//!
//! An argument that is an object with exactly one key, `expander`, is a nested
//! node. Anything else is a literal value.

use crate::Value;

/// One expander invocation: name plus ordered arguments.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExpanderNode {
    name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    arguments: Vec<ExpanderArgument>,
}

/// A positional argument of an [`ExpanderNode`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "repr::ArgumentRepr", into = "repr::ArgumentRepr")
)]
pub enum ExpanderArgument {
    /// A literal passed to the constructor unchanged.
    Literal(Value),
    /// A nested expander, resolved before its parent is constructed.
    Expander(ExpanderNode),
}

impl ExpanderNode {
    /// Create a node with no arguments.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Vec::new(),
        }
    }

    /// Create a node with the given arguments.
    pub fn with_arguments(name: impl Into<String>, arguments: Vec<ExpanderArgument>) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }

    /// Append a literal argument (builder pattern).
    #[must_use]
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.arguments.push(ExpanderArgument::Literal(value.into()));
        self
    }

    /// Append a nested expander argument (builder pattern).
    #[must_use]
    pub fn nested(mut self, node: ExpanderNode) -> Self {
        self.arguments.push(ExpanderArgument::Expander(node));
        self
    }

    /// The expander name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The positional arguments, in order.
    #[must_use]
    pub fn arguments(&self) -> &[ExpanderArgument] {
        &self.arguments
    }

    /// Returns `true` if the node has at least one argument.
    #[must_use]
    pub fn has_arguments(&self) -> bool {
        !self.arguments.is_empty()
    }

    /// Depth of this node tree (a node without nested expanders has depth 1).
    #[must_use]
    pub fn depth(&self) -> usize {
        1 + self
            .arguments
            .iter()
            .filter_map(|arg| match arg {
                ExpanderArgument::Expander(node) => Some(node.depth()),
                ExpanderArgument::Literal(_) => None,
            })
            .max()
            .unwrap_or(0)
    }
}

impl From<Value> for ExpanderArgument {
    fn from(value: Value) -> Self {
        Self::Literal(value)
    }
}

impl From<ExpanderNode> for ExpanderArgument {
    fn from(node: ExpanderNode) -> Self {
        Self::Expander(node)
    }
}

#[cfg(feature = "serde")]
mod repr {
    use super::{ExpanderArgument, ExpanderNode};
    use crate::Value;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize)]
    #[serde(deny_unknown_fields)]
    pub(super) struct NestedRepr {
        expander: ExpanderNode,
    }

    // Untagged: order matters, the nested form must be tried first.
    #[derive(Serialize, Deserialize)]
    #[serde(untagged)]
    pub(super) enum ArgumentRepr {
        Expander(NestedRepr),
        Literal(Value),
    }

    impl From<ArgumentRepr> for ExpanderArgument {
        fn from(repr: ArgumentRepr) -> Self {
            match repr {
                ArgumentRepr::Expander(nested) => Self::Expander(nested.expander),
                ArgumentRepr::Literal(value) => Self::Literal(value),
            }
        }
    }

    impl From<ExpanderArgument> for ArgumentRepr {
        fn from(argument: ExpanderArgument) -> Self {
            match argument {
                ExpanderArgument::Expander(expander) => Self::Expander(NestedRepr { expander }),
                ExpanderArgument::Literal(value) => Self::Literal(value),
            }
        }
    }
}

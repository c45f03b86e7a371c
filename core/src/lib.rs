//! patex - expander resolution for pattern-matching assertions
//!
//! Patterns such as `@oneOf(@startsWith("a"), @startsWith("b"))` are parsed
//! into an [`ExpanderNode`] tree. This crate turns that tree into a live tree
//! of [`PatternExpander`]s that can be matched against actual values.
//!
//! # Architecture
//!
//! - [`Value`] — Erased value type (null, bool, numbers, strings, arrays, objects)
//! - [`ExpanderNode`] — Parsed invocation: name + literal/nested arguments
//! - [`ExpanderRegistry`] — Open vocabulary: expander name → [`Implementation`]
//! - [`ExpanderResolver`] — Recursive, depth-first construction of expander trees
//! - [`PatternExpander`] — The capability every constructed expander provides
//! - [`Backtrace`] — Diagnostic trail shared by every expander of one resolution
//!
//! # Key Design Insights
//!
//! 1. **Arguments resolve before parents**: constructors never see AST nodes,
//!    only literal [`Value`]s and live expanders.
//!
//! 2. **One backtrace per resolution**: the handle is injected at construction,
//!    so nested expanders report into the same trail as their parent.
//!
//! 3. **All-or-nothing**: the first error aborts resolution; no partial tree is
//!    ever returned.
//!
//! # Example
//!
//! ```
//! use patex::prelude::*;
//!
//! let registry = ExpanderRegistry::new();
//! let backtrace = Backtrace::new();
//!
//! let node = ExpanderNode::new("oneOf")
//!     .nested(ExpanderNode::new("startsWith").arg("a"))
//!     .nested(ExpanderNode::new("startsWith").arg("b"));
//!
//! let expander = registry.resolve(&node, backtrace.clone()).unwrap();
//! assert!(expander.matches(&Value::from("banana")));
//! assert!(!expander.matches(&Value::from("cherry")));
//! assert!(!backtrace.is_empty());
//! ```
//!
//! # Extensions
//!
//! - [`RegistryConfig`] — name aliases loaded from JSON/YAML (feature = `"config"`)
//! - [`patex-test`](https://docs.rs/patex-test) — YAML fixture conformance suite (internal)

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod ast;
mod backtrace;
mod expander;
pub mod expanders;
mod registry;
mod resolver;
mod value;

#[cfg(feature = "config")]
mod config;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

// Core types
pub use ast::{ExpanderArgument, ExpanderNode};
pub use backtrace::{Backtrace, BacktraceEntry};
pub use expander::{Argument, Arguments, IntoExpander, PatternExpander, Reporter};
pub use registry::{Constructed, ExpanderRegistry, Implementation};
pub use resolver::ExpanderResolver;
pub use value::Value;

// Configuration (feature-gated)
#[cfg(feature = "config")]
pub use config::{load_node, RegistryConfig};

// ═══════════════════════════════════════════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════════════════════════════════════════

/// Prelude module for convenient imports.
///
/// ```
/// use patex::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Core types
        Argument,
        Arguments,
        Backtrace,
        BacktraceEntry,
        ExpanderArgument,
        // Errors
        ExpanderError,
        ExpanderNode,
        ExpanderRegistry,
        ExpanderResolver,
        Implementation,
        // Traits
        IntoExpander,
        PatternExpander,
        Reporter,
        Value,
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Names defined by [`ExpanderRegistry::new`].
pub const BUILTIN_EXPANDERS: [&str; 25] = [
    "startsWith",
    "endsWith",
    "contains",
    "notContains",
    "matchRegex",
    "greaterThan",
    "lowerThan",
    "inArray",
    "count",
    "oneOf",
    "isEmpty",
    "isNotEmpty",
    "optional",
    "hasProperty",
    "repeat",
    "match",
    "isEmail",
    "isUrl",
    "isIp",
    "isDateTime",
    "after",
    "before",
    "isTzOffset",
    "isTzAbbreviation",
    "isTzIdentifier",
];

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Errors from expander registration and resolution.
///
/// Every variant aborts the operation that raised it. Resolution never returns
/// a partially built tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExpanderError {
    /// `register()` named an identifier missing from the implementation catalog.
    #[error("unknown expander implementation \"{identifier}\"")]
    UnknownImplementation {
        /// The identifier that was not found.
        identifier: String,
    },

    /// Strict lookup of a name that is not registered.
    #[error("expander \"{name}\" is not defined")]
    UndefinedExpander {
        /// The missing expander name.
        name: String,
    },

    /// A pattern used an expander name that is not registered.
    #[error("unknown expander \"{name}\"")]
    UnknownExpander {
        /// The missing expander name.
        name: String,
    },

    /// A registry entry constructed something that is not a `PatternExpander`.
    #[error("expander \"{name}\" is registered to {type_name}, which is not a pattern expander")]
    InvalidExpanderType {
        /// The expander name being resolved.
        name: String,
        /// Type name reported by the offending implementation.
        type_name: String,
    },

    /// Wrong number of arguments for an expander.
    #[error(
        "expander \"{expander}\" expects {}, got {got}",
        describe_arity(*min, *max)
    )]
    ArgumentCount {
        /// The expander being constructed.
        expander: String,
        /// Minimum accepted argument count.
        min: usize,
        /// Maximum accepted argument count (`None` = unbounded).
        max: Option<usize>,
        /// Actual argument count.
        got: usize,
    },

    /// An argument has the wrong kind or an unusable value.
    #[error("invalid argument for expander \"{expander}\": {reason}")]
    InvalidArgument {
        /// The expander being constructed.
        expander: String,
        /// What is wrong with the argument.
        reason: String,
    },

    /// A regex pattern failed to compile.
    #[error("invalid pattern \"{pattern}\" for expander \"{expander}\": {message}")]
    InvalidPattern {
        /// The expander being constructed.
        expander: String,
        /// The pattern that failed to compile.
        pattern: String,
        /// The underlying error message.
        message: String,
    },

    /// Configuration could not be read or deserialized.
    #[error("invalid config: {message}")]
    InvalidConfig {
        /// The underlying error message.
        message: String,
    },
}

fn describe_arity(min: usize, max: Option<usize>) -> String {
    let plural = |n: usize| if n == 1 { "" } else { "s" };
    match max {
        Some(max) if max == min => format!("{min} argument{}", plural(min)),
        Some(max) => format!("{min} to {max} arguments"),
        None => format!("at least {min} argument{}", plural(min)),
    }
}

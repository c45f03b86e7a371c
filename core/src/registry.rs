//! Expander registry — the open vocabulary of expander names.
//!
//! The registry maps expander names (as written in patterns) to
//! [`Implementation`] handles. A handle is a constructor closure: the concrete
//! expander type is monomorphized into the closure at registration time and
//! erased behind `Arc<dyn Fn>`, then invoked late, once per resolution.
//!
//! # Two tables
//!
//! | Table | Key | Filled by |
//! |-------|-----|-----------|
//! | definitions | expander name used in patterns | `register*()` |
//! | implementations | implementation identifier | built-ins, [`define_implementation`](ExpanderRegistry::define_implementation) |
//!
//! [`register(name, identifier)`](ExpanderRegistry::register) binds a name to an
//! implementation that must already exist in the implementation catalog, so
//! configuration files can alias names without touching code.
//!
//! # Three ways in
//!
//! | Method | Capability check |
//! |--------|------------------|
//! | `register_expander::<T>(name)` | compile time (`T: IntoExpander`) |
//! | `register(name, identifier)` | whatever the catalog entry does |
//! | `register_factory(name, implementation)` | at resolution time for erased factories |
//!
//! # Example
//!
//! ```
//! use patex::{Backtrace, ExpanderNode, ExpanderRegistry, PatternExpander};
//!
//! let mut registry = ExpanderRegistry::new();
//! registry.register("prefix", "startsWith").unwrap();
//!
//! let expander = registry
//!     .resolve(&ExpanderNode::new("prefix").arg("/api"), Backtrace::new())
//!     .unwrap();
//! assert!(expander.matches(&"/api/users".into()));
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
    expanders, Arguments, Backtrace, ExpanderError, ExpanderNode, ExpanderResolver, IntoExpander,
    PatternExpander,
};

/// What an implementation's constructor produces before the capability check.
///
/// Only a `Box<dyn PatternExpander>` boxed again into `Constructed` passes the
/// check. A concrete expander boxed directly (`Box::new(MyExpander) as
/// Constructed`) is rejected with [`ExpanderError::InvalidExpanderType`]; use
/// [`Implementation::from_fn`] for concrete types.
pub type Constructed = Box<dyn Any + Send + Sync>;

/// Type-erased constructor closure.
type BoxedFactory =
    Arc<dyn Fn(Arguments, &Backtrace) -> Result<Constructed, ExpanderError> + Send + Sync>;

// ═══════════════════════════════════════════════════════════════════════════════
// Implementation
// ═══════════════════════════════════════════════════════════════════════════════

/// A constructible expander implementation.
///
/// Cheap to clone; clones share the same constructor.
#[derive(Clone)]
pub struct Implementation {
    type_name: &'static str,
    factory: BoxedFactory,
}

impl Implementation {
    /// Implementation backed by an [`IntoExpander`] type.
    #[must_use]
    pub fn of<T: IntoExpander>() -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            factory: Arc::new(|arguments: Arguments, backtrace: &Backtrace| {
                let expander: Box<dyn PatternExpander> =
                    Box::new(T::from_arguments(arguments, backtrace)?);
                Ok(Box::new(expander) as Constructed)
            }),
        }
    }

    /// Implementation backed by a closure returning a concrete expander.
    pub fn from_fn<F, E>(f: F) -> Self
    where
        F: Fn(Arguments, &Backtrace) -> Result<E, ExpanderError> + Send + Sync + 'static,
        E: PatternExpander + 'static,
    {
        Self {
            type_name: std::any::type_name::<E>(),
            factory: Arc::new(move |arguments: Arguments, backtrace: &Backtrace| {
                let expander: Box<dyn PatternExpander> = Box::new(f(arguments, backtrace)?);
                Ok(Box::new(expander) as Constructed)
            }),
        }
    }

    /// Implementation backed by a fully erased constructor.
    ///
    /// The constructor must produce a `Box<dyn PatternExpander>` wrapped in
    /// [`Constructed`]; anything else is rejected when the expander is resolved,
    /// with [`ExpanderError::InvalidExpanderType`] naming `type_name`.
    pub fn erased<F>(type_name: &'static str, f: F) -> Self
    where
        F: Fn(Arguments, &Backtrace) -> Result<Constructed, ExpanderError> + Send + Sync + 'static,
    {
        Self {
            type_name,
            factory: Arc::new(f),
        }
    }

    /// Name of the type this implementation constructs.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub(crate) fn construct(
        &self,
        arguments: Arguments,
        backtrace: &Backtrace,
    ) -> Result<Constructed, ExpanderError> {
        (self.factory)(arguments, backtrace)
    }
}

impl fmt::Debug for Implementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Implementation").field(&self.type_name).finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Registry
// ═══════════════════════════════════════════════════════════════════════════════

/// Mapping from expander names to implementations.
///
/// Mutation goes through `&mut self`; resolution borrows `&self`. Configure the
/// vocabulary first, then share the registry (e.g. behind an `Arc`) for
/// concurrent resolution: a lookup can never observe a half-applied update.
#[derive(Clone)]
pub struct ExpanderRegistry {
    definitions: HashMap<String, Implementation>,
    implementations: HashMap<String, Implementation>,
}

impl ExpanderRegistry {
    /// Registry seeded with the built-in expanders.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self::empty();
        expanders::register_builtin_expanders(&mut registry);
        registry
    }

    /// Registry with no expander names defined.
    ///
    /// The built-in implementations are still in the catalog, so
    /// [`register`](Self::register) can bind names to them.
    #[must_use]
    pub fn empty() -> Self {
        let mut registry = Self {
            definitions: HashMap::new(),
            implementations: HashMap::new(),
        };
        expanders::define_builtin_implementations(&mut registry);
        registry
    }

    /// Bind `name` to the catalog implementation `identifier`.
    ///
    /// Overwrites any previous binding. No capability check happens here.
    ///
    /// # Errors
    ///
    /// [`ExpanderError::UnknownImplementation`] if `identifier` is not in the
    /// implementation catalog.
    pub fn register(&mut self, name: &str, identifier: &str) -> Result<(), ExpanderError> {
        let implementation = self.implementations.get(identifier).cloned().ok_or_else(|| {
            ExpanderError::UnknownImplementation {
                identifier: identifier.to_owned(),
            }
        })?;
        debug!(expander = name, identifier, "registering expander");
        self.insert(name, implementation);
        Ok(())
    }

    /// Register an [`IntoExpander`] type under `name`.
    ///
    /// The type is also added to the implementation catalog under
    /// [`IntoExpander::NAME`], unless that identifier is already cataloged.
    /// An existing catalog entry is never replaced.
    pub fn register_expander<T: IntoExpander>(&mut self, name: &str) -> &mut Self {
        let implementation = Implementation::of::<T>();
        let cataloged = self
            .implementations
            .entry(T::NAME.to_owned())
            .or_insert_with(|| implementation.clone());
        if cataloged.type_name() != implementation.type_name() {
            warn!(
                identifier = T::NAME,
                cataloged = cataloged.type_name(),
                ignored = implementation.type_name(),
                "implementation identifier already cataloged"
            );
        }
        debug!(expander = name, implementation = T::NAME, "registering expander");
        self.insert(name, implementation);
        self
    }

    /// Register an [`Implementation`] directly under `name`.
    pub fn register_factory(&mut self, name: &str, implementation: Implementation) -> &mut Self {
        debug!(
            expander = name,
            type_name = implementation.type_name(),
            "registering expander factory"
        );
        self.insert(name, implementation);
        self
    }

    /// Add `implementation` to the catalog under `identifier`.
    ///
    /// Does not define any expander name; follow with [`register`](Self::register).
    pub fn define_implementation(
        &mut self,
        identifier: &str,
        implementation: Implementation,
    ) -> &mut Self {
        self.implementations
            .insert(identifier.to_owned(), implementation);
        self
    }

    /// Returns `true` if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// Returns `true` if `identifier` is in the implementation catalog.
    #[must_use]
    pub fn has_implementation(&self, identifier: &str) -> bool {
        self.implementations.contains_key(identifier)
    }

    /// The implementation registered under `name`.
    ///
    /// # Errors
    ///
    /// [`ExpanderError::UndefinedExpander`] if `name` is not registered.
    pub fn get(&self, name: &str) -> Result<&Implementation, ExpanderError> {
        self.lookup(name)
            .ok_or_else(|| ExpanderError::UndefinedExpander {
                name: name.to_owned(),
            })
    }

    /// The implementation registered under `name`, if any.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Implementation> {
        self.definitions.get(name)
    }

    /// Drop custom registrations and restore the built-in vocabulary.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Registered expander names (sorted).
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.definitions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered expander names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Returns `true` if no expander names are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Resolve `node` against this registry, sharing `backtrace` across the tree.
    ///
    /// Shorthand for `ExpanderResolver::new(self, backtrace).resolve(node)`.
    ///
    /// # Errors
    ///
    /// See [`ExpanderResolver::resolve`].
    pub fn resolve(
        &self,
        node: &ExpanderNode,
        backtrace: Backtrace,
    ) -> Result<Box<dyn PatternExpander>, ExpanderError> {
        ExpanderResolver::new(self, backtrace).resolve(node)
    }

    fn insert(&mut self, name: &str, implementation: Implementation) {
        if let Some(previous) = self.definitions.insert(name.to_owned(), implementation) {
            warn!(
                expander = name,
                previous = previous.type_name(),
                "expander definition overwritten"
            );
        }
    }
}

impl Default for ExpanderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ExpanderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpanderRegistry")
            .field("names", &self.names())
            .field("implementations", &self.implementations.len())
            .finish()
    }
}

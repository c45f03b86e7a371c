//! Built-in expanders.
//!
//! Every built-in embeds a [`Reporter`](crate::Reporter) and implements a
//! `check(&self, &Value) -> Result<(), String>` method; the
//! `reporting_expander!` macro turns that into a [`PatternExpander`]
//! that records entrance, success and failure into the shared backtrace.
//!
//! | Module | Expanders |
//! |--------|-----------|
//! | `string` | `startsWith`, `endsWith`, `contains`, `notContains`, `matchRegex` |
//! | `numeric` | `greaterThan`, `lowerThan` |
//! | `collection` | `inArray`, `count`, `oneOf`, `isEmpty`, `isNotEmpty`, `optional`, `hasProperty`, `repeat`, `match` |
//! | `format` | `isEmail`, `isUrl`, `isIp`, `isDateTime`, `after`, `before` |
//! | `timezone` | `isTzOffset`, `isTzAbbreviation`, `isTzIdentifier` |

use crate::{ExpanderRegistry, Implementation, IntoExpander, Value};

macro_rules! reporting_expander {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::PatternExpander for $ty {
            fn name(&self) -> &str {
                self.reporter.name()
            }

            fn matches(&self, value: &$crate::Value) -> bool {
                self.reporter.entrance(value);
                let outcome = self.check(value);
                self.reporter.finish(value, outcome)
            }

            fn error(&self) -> Option<String> {
                self.reporter.error()
            }

            fn backtrace(&self) -> &$crate::Backtrace {
                self.reporter.backtrace()
            }
        }
    )+};
}

mod collection;
mod format;
mod numeric;
mod string;
mod timezone;

pub use collection::{
    Count, HasProperty, InArray, IsEmpty, IsNotEmpty, OneOf, Optional, Repeat, StructuralMatch,
};
pub use format::{After, Before, IsDateTime, IsEmail, IsIp, IsUrl};
pub use numeric::{GreaterThan, LowerThan};
pub use string::{Contains, EndsWith, MatchRegex, NotContains, StartsWith};
pub use timezone::{IsTzAbbreviation, IsTzIdentifier, IsTzOffset};

/// Define every built-in expander under its default name.
///
/// Called by [`ExpanderRegistry::new`]. Also adds each type to the
/// implementation catalog.
pub fn register_builtin_expanders(registry: &mut ExpanderRegistry) {
    registry
        .register_expander::<StartsWith>(StartsWith::NAME)
        .register_expander::<EndsWith>(EndsWith::NAME)
        .register_expander::<Contains>(Contains::NAME)
        .register_expander::<NotContains>(NotContains::NAME)
        .register_expander::<MatchRegex>(MatchRegex::NAME)
        .register_expander::<GreaterThan>(GreaterThan::NAME)
        .register_expander::<LowerThan>(LowerThan::NAME)
        .register_expander::<InArray>(InArray::NAME)
        .register_expander::<Count>(Count::NAME)
        .register_expander::<OneOf>(OneOf::NAME)
        .register_expander::<IsEmpty>(IsEmpty::NAME)
        .register_expander::<IsNotEmpty>(IsNotEmpty::NAME)
        .register_expander::<Optional>(Optional::NAME)
        .register_expander::<HasProperty>(HasProperty::NAME)
        .register_expander::<Repeat>(Repeat::NAME)
        .register_expander::<StructuralMatch>(StructuralMatch::NAME)
        .register_expander::<IsEmail>(IsEmail::NAME)
        .register_expander::<IsUrl>(IsUrl::NAME)
        .register_expander::<IsIp>(IsIp::NAME)
        .register_expander::<IsDateTime>(IsDateTime::NAME)
        .register_expander::<After>(After::NAME)
        .register_expander::<Before>(Before::NAME)
        .register_expander::<IsTzOffset>(IsTzOffset::NAME)
        .register_expander::<IsTzAbbreviation>(IsTzAbbreviation::NAME)
        .register_expander::<IsTzIdentifier>(IsTzIdentifier::NAME);
}

/// Add every built-in type to the implementation catalog without defining names.
///
/// Called by [`ExpanderRegistry::empty`].
pub fn define_builtin_implementations(registry: &mut ExpanderRegistry) {
    fn define<T: IntoExpander>(registry: &mut ExpanderRegistry) {
        registry.define_implementation(T::NAME, Implementation::of::<T>());
    }

    define::<StartsWith>(registry);
    define::<EndsWith>(registry);
    define::<Contains>(registry);
    define::<NotContains>(registry);
    define::<MatchRegex>(registry);
    define::<GreaterThan>(registry);
    define::<LowerThan>(registry);
    define::<InArray>(registry);
    define::<Count>(registry);
    define::<OneOf>(registry);
    define::<IsEmpty>(registry);
    define::<IsNotEmpty>(registry);
    define::<Optional>(registry);
    define::<HasProperty>(registry);
    define::<Repeat>(registry);
    define::<StructuralMatch>(registry);
    define::<IsEmail>(registry);
    define::<IsUrl>(registry);
    define::<IsIp>(registry);
    define::<IsDateTime>(registry);
    define::<After>(registry);
    define::<Before>(registry);
    define::<IsTzOffset>(registry);
    define::<IsTzAbbreviation>(registry);
    define::<IsTzIdentifier>(registry);
}

/// The string inside `value`, or a message saying what it is instead.
fn expect_str(value: &Value) -> Result<&str, String> {
    value
        .as_str()
        .ok_or_else(|| format!("{} \"{value}\" is not a valid string", value.type_name()))
}

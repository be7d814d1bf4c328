//! Stats and modifiers
//!
//! A stat is a base value plus an ordered list of typed modifiers. The resolved
//! value is computed lazily and cached until a modifier or the base changes.

mod collection;
mod description;
mod modifier;
#[allow(clippy::module_inception)]
mod stat;

pub use collection::Stats;
pub use description::{AppliedModifier, DescribedModifier, ModifierDescription};
pub use modifier::{Modifier, ModifierKey, ModifierKind, ModifierSource};
pub use stat::{resolve_value, Stat};

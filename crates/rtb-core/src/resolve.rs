//! Die type lookup and the placeholder resolution loop.

use std::sync::Arc;

use crate::die::DieType;
use crate::error::{PoolError, PoolResult};
use crate::pool::PoolTree;

/// Turns die type names into die types.
///
/// Resolution never fails: a name that is not known yields a placeholder.
pub trait DieTypeResolver {
    /// Resolve `name`.
    fn resolve(&mut self, name: &str) -> Arc<DieType>;
}

/// The answer given for a missing die type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceholderDecision {
    /// Use the named die type instead.
    Replace(String),
    /// Give up; the pool must not be rolled.
    Abort,
}

/// How a placeholder resolution run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// No placeholders remain. Lists each `(missing, replacement)` pair applied.
    Resolved {
        /// Replacements in the order they were made.
        replaced: Vec<(String, String)>,
    },
    /// The caller aborted; the tree may still contain placeholders.
    Aborted,
}

impl Resolution {
    /// True if the tree is ready to roll.
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved { .. })
    }
}

/// Replace placeholders in `tree` until none remain.
///
/// `ask` is called with each missing die type name, depth-first and left to
/// right. A replacement naming another missing type is an error, since the
/// loop would otherwise ask about it forever.
pub fn resolve_placeholders<R, F>(
    tree: &mut PoolTree,
    resolver: &mut R,
    mut ask: F,
) -> PoolResult<Resolution>
where
    R: DieTypeResolver + ?Sized,
    F: FnMut(&DieType) -> PlaceholderDecision,
{
    let mut replaced = Vec::new();
    while let Some(missing) = tree.find_first_placeholder() {
        let new_name = match ask(&missing) {
            PlaceholderDecision::Replace(name) => name,
            PlaceholderDecision::Abort => {
                tracing::debug!(die = missing.name(), "placeholder resolution aborted");
                return Ok(Resolution::Aborted);
            }
        };
        if resolver.resolve(&new_name).is_placeholder() {
            return Err(PoolError::NotFound(format!("die type \"{new_name}\"")));
        }
        tree.replace_die_type(missing.name(), &new_name, resolver);
        tracing::debug!(from = missing.name(), to = %new_name, "replaced missing die type");
        replaced.push((missing.name().to_string(), new_name));
    }
    Ok(Resolution::Resolved { replaced })
}

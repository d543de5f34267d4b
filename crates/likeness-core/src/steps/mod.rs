//! The equivalency step pipeline
//!
//! Comparison strategies are an ordered chain: for every node the engine
//! asks each step in turn whether it applies, and the first applicable
//! step handles the node exclusively; no later step runs for it. The
//! built-in order encodes the comparison policy:
//!
//! 1. null/reference fast path
//! 2. user-registered comparers (by declared or runtime type)
//! 3. predicate/assertion placeholders
//! 4. enums (by value or by name)
//! 5. auto-conversion
//! 6. tuples and by-value types
//! 7. strings
//! 8. collections and dictionaries
//! 9. structural member recursion (the general case)
//! 10. default equality fallback
//!
//! User steps injected through the options builder run before the
//! built-ins (or after them, but still before the fallback, when added
//! with `with_step_after_builtins`). With the built-ins dropped entirely,
//! a node no step can handle is a structural error.

use std::sync::Arc;

use crate::config::EquivalencyOptions;
use crate::engine::ComparisonContext;
use crate::path::NodePath;
use crate::result::Result;
use crate::value::Value;

mod collections;
mod convert;
mod custom;
mod enums;
mod fallback;
mod kinds;
mod reference;
mod strings;
mod structural;

pub use collections::{CollectionStep, DictionaryStep};
pub use convert::ConversionStep;
pub use custom::{CustomComparerStep, PlaceholderStep};
pub use enums::EnumStep;
pub use fallback::DefaultEqualityStep;
pub use kinds::{ByValueStep, TupleStep};
pub use reference::ReferenceEqualityStep;
pub use strings::StringStep;
pub use structural::StructuralStep;

/// The node a step is asked to handle
pub struct ComparisonNode<'a> {
    pub subject: &'a Value,
    pub expectation: &'a Value,
    /// Declared type of the member slot the values came through, if any
    pub declared_type: Option<String>,
    pub path: NodePath,
}

impl<'a> ComparisonNode<'a> {
    pub fn new(
        subject: &'a Value,
        expectation: &'a Value,
        declared_type: Option<String>,
        path: NodePath,
    ) -> Self {
        Self {
            subject,
            expectation,
            declared_type,
            path,
        }
    }
}

/// One comparison strategy in the pipeline
///
/// `can_handle` must be side-effect free; `handle` records discrepancies
/// through the context and recurses via `ComparisonContext::compare_child`.
/// Structural defects are returned as errors and abort the whole walk.
pub trait EquivalencyStep: Send + Sync {
    /// Short label used in trace events
    fn name(&self) -> &'static str;

    /// Whether this step applies to the node
    fn can_handle(&self, node: &ComparisonNode<'_>, options: &EquivalencyOptions) -> bool;

    /// Handle the node exclusively
    fn handle(&self, node: &ComparisonNode<'_>, ctx: &mut ComparisonContext) -> Result<()>;
}

/// The built-in steps in priority order, without the fallback
pub fn builtin_steps() -> Vec<Arc<dyn EquivalencyStep>> {
    vec![
        Arc::new(ReferenceEqualityStep),
        Arc::new(CustomComparerStep),
        Arc::new(PlaceholderStep),
        Arc::new(EnumStep),
        Arc::new(ConversionStep),
        Arc::new(TupleStep),
        Arc::new(ByValueStep),
        Arc::new(StringStep),
        Arc::new(CollectionStep),
        Arc::new(DictionaryStep),
        Arc::new(StructuralStep),
    ]
}

/// The default-equality fallback, always last in the assembled pipeline
pub fn fallback_step() -> Arc<dyn EquivalencyStep> {
    Arc::new(DefaultEqualityStep)
}

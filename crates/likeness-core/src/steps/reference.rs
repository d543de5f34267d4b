//! Null and reference-identity fast path

use crate::config::EquivalencyOptions;
use crate::engine::ComparisonContext;
use crate::report::Discrepancy;
use crate::result::Result;
use crate::steps::{ComparisonNode, EquivalencyStep};
use crate::value::Value;

/// Handles nulls and identical instances before anything else runs
///
/// Both sides null is equivalence; one side null is a discrepancy naming
/// which side was null. Two handles to the same object instance are
/// equivalent without recursion. This step sitting first is also what
/// makes null-vs-enum (including a defined zero variant) fail: the pair
/// never reaches the enum step.
pub struct ReferenceEqualityStep;

impl EquivalencyStep for ReferenceEqualityStep {
    fn name(&self) -> &'static str {
        "reference-equality"
    }

    fn can_handle(&self, node: &ComparisonNode<'_>, _options: &EquivalencyOptions) -> bool {
        node.subject.is_null()
            || node.expectation.is_null()
            || matches!(
                (node.subject, node.expectation),
                (Value::Object(a), Value::Object(b)) if a.ptr_eq(b)
            )
    }

    fn handle(&self, node: &ComparisonNode<'_>, ctx: &mut ComparisonContext) -> Result<()> {
        match (node.subject, node.expectation) {
            (Value::Null, Value::Null) => {}
            (Value::Object(a), Value::Object(b)) if a.ptr_eq(b) => {}
            (subject, Value::Null) => {
                ctx.record(
                    Discrepancy::new(&node.path, "<null>", subject.describe())
                        .with_note("the expectation is null"),
                );
            }
            (Value::Null, expectation) => {
                ctx.record(
                    Discrepancy::new(&node.path, expectation.describe(), "<null>")
                        .with_note("the subject is null"),
                );
            }
            _ => {}
        }
        Ok(())
    }
}

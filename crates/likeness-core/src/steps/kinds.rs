//! Tuple and by-value comparison steps

use crate::config::EquivalencyOptions;
use crate::engine::ComparisonContext;
use crate::path::PathSegment;
use crate::report::Discrepancy;
use crate::result::Result;
use crate::steps::{ComparisonNode, EquivalencyStep};
use crate::value::Value;

/// Compares tuples component-wise, always in order
pub struct TupleStep;

impl EquivalencyStep for TupleStep {
    fn name(&self) -> &'static str {
        "tuple"
    }

    fn can_handle(&self, node: &ComparisonNode<'_>, _options: &EquivalencyOptions) -> bool {
        matches!(
            (node.subject, node.expectation),
            (Value::Tuple(_), Value::Tuple(_))
        )
    }

    fn handle(&self, node: &ComparisonNode<'_>, ctx: &mut ComparisonContext) -> Result<()> {
        let (Value::Tuple(subject), Value::Tuple(expectation)) = (node.subject, node.expectation)
        else {
            return Ok(());
        };

        if subject.len() != expectation.len() {
            ctx.record(
                Discrepancy::new(
                    &node.path,
                    format!("a tuple of {} components", expectation.len()),
                    format!("a tuple of {} components", subject.len()),
                )
                .with_note("component count mismatch"),
            );
            return Ok(());
        }

        for (index, (s, e)) in subject.iter().zip(expectation.iter()).enumerate() {
            ctx.compare_child(PathSegment::Index(index), s, e, None)?;
        }
        Ok(())
    }
}

/// Compares opted-in types by whole-value equality
///
/// Applies to objects whose runtime type has a by-value override, and to
/// records under the global records-by-value mode. The failure framing is
/// distinct from the member-wise one: a single discrepancy
/// at the object's own path, marked as a by-value comparison, instead of
/// one discrepancy per differing member.
pub struct ByValueStep;

impl EquivalencyStep for ByValueStep {
    fn name(&self) -> &'static str {
        "by-value"
    }

    fn can_handle(&self, node: &ComparisonNode<'_>, options: &EquivalencyOptions) -> bool {
        match node.subject {
            Value::Object(object) => {
                options.compares_by_value(object.type_name(), object.is_record())
                    && matches!(node.expectation, Value::Object(_))
            }
            _ => false,
        }
    }

    fn handle(&self, node: &ComparisonNode<'_>, ctx: &mut ComparisonContext) -> Result<()> {
        if node.subject != node.expectation {
            ctx.record(
                Discrepancy::new(
                    &node.path,
                    format!("a value equal to {}", node.expectation.describe()),
                    node.subject.describe(),
                )
                .with_note("compared by value"),
            );
        }
        Ok(())
    }
}

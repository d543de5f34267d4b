//! Default-equality fallback step

use crate::config::EquivalencyOptions;
use crate::engine::ComparisonContext;
use crate::report::Discrepancy;
use crate::result::Result;
use crate::steps::{ComparisonNode, EquivalencyStep};

/// Plain value equality for anything no earlier step claimed
///
/// Always applicable, always last. Kind mismatches (an object against a
/// string, a sequence against a number) land here and are reported with
/// both kinds named.
pub struct DefaultEqualityStep;

impl EquivalencyStep for DefaultEqualityStep {
    fn name(&self) -> &'static str {
        "default-equality"
    }

    fn can_handle(&self, _node: &ComparisonNode<'_>, _options: &EquivalencyOptions) -> bool {
        true
    }

    fn handle(&self, node: &ComparisonNode<'_>, ctx: &mut ComparisonContext) -> Result<()> {
        if node.subject != node.expectation {
            let mut discrepancy = Discrepancy::new(
                &node.path,
                node.expectation.describe(),
                node.subject.describe(),
            );
            if node.subject.kind_name() != node.expectation.kind_name() {
                discrepancy = discrepancy.with_note(format!(
                    "cannot compare {} with {}",
                    node.subject.kind_name(),
                    node.expectation.kind_name()
                ));
            }
            ctx.record(discrepancy);
        }
        Ok(())
    }
}

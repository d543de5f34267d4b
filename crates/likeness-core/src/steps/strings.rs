//! String comparison step

use crate::config::EquivalencyOptions;
use crate::engine::ComparisonContext;
use crate::report::Discrepancy;
use crate::result::Result;
use crate::steps::{ComparisonNode, EquivalencyStep};
use crate::value::Value;

/// Exact string comparison with a first-difference locator
///
/// A mismatch names the first differing character index and quotes the
/// surrounding subject text, so long strings stay diagnosable.
pub struct StringStep;

const CONTEXT_CHARS: usize = 10;

fn first_difference(subject: &str, expectation: &str) -> usize {
    for (index, (s, e)) in subject.chars().zip(expectation.chars()).enumerate() {
        if s != e {
            return index;
        }
    }
    subject.chars().count().min(expectation.chars().count())
}

fn context_around(text: &str, index: usize) -> String {
    text.chars().skip(index).take(CONTEXT_CHARS).collect()
}

impl EquivalencyStep for StringStep {
    fn name(&self) -> &'static str {
        "string"
    }

    fn can_handle(&self, node: &ComparisonNode<'_>, _options: &EquivalencyOptions) -> bool {
        matches!(
            (node.subject, node.expectation),
            (Value::Str(_), Value::Str(_))
        )
    }

    fn handle(&self, node: &ComparisonNode<'_>, ctx: &mut ComparisonContext) -> Result<()> {
        let (Value::Str(subject), Value::Str(expectation)) = (node.subject, node.expectation)
        else {
            return Ok(());
        };

        if subject != expectation {
            let index = first_difference(subject, expectation);
            let near = context_around(subject, index);
            ctx.record(
                Discrepancy::new(&node.path, format!("{expectation:?}"), format!("{subject:?}"))
                    .with_note(format!("they differ near {near:?} (index {index})")),
            );
        }
        Ok(())
    }
}

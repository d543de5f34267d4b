//! Enum comparison step

use crate::config::{EnumComparisonMode, EquivalencyOptions};
use crate::engine::ComparisonContext;
use crate::report::Discrepancy;
use crate::result::Result;
use crate::steps::{ComparisonNode, EquivalencyStep};
use crate::value::Value;

/// Compares enum values by underlying discriminant or by variant name
///
/// By-value is the default and is type-agnostic: enums of distinct
/// declared enum types are equal when their discriminants are. The
/// discriminant is an `i128`, so values beyond the signed 64-bit range
/// (e.g. `u64::MAX`) compare exactly. By-name compares variant names
/// case-sensitively. Either mode fails a pair where only one side is an
/// enum; null never reaches this step (the reference step handles it)
/// and is therefore never equal to any concrete enum value.
pub struct EnumStep;

impl EquivalencyStep for EnumStep {
    fn name(&self) -> &'static str {
        "enum"
    }

    fn can_handle(&self, node: &ComparisonNode<'_>, _options: &EquivalencyOptions) -> bool {
        matches!(node.subject, Value::Enum(_)) || matches!(node.expectation, Value::Enum(_))
    }

    fn handle(&self, node: &ComparisonNode<'_>, ctx: &mut ComparisonContext) -> Result<()> {
        let mode = ctx.options().enum_mode();
        match (node.subject, node.expectation) {
            (Value::Enum(subject), Value::Enum(expectation)) => match mode {
                EnumComparisonMode::ByValue => {
                    if subject.discriminant != expectation.discriminant {
                        ctx.record(
                            Discrepancy::new(
                                &node.path,
                                node.expectation.describe(),
                                node.subject.describe(),
                            )
                            .with_note("enums compared by underlying value"),
                        );
                    }
                }
                EnumComparisonMode::ByName => {
                    if subject.variant != expectation.variant {
                        ctx.record(
                            Discrepancy::new(
                                &node.path,
                                node.expectation.describe(),
                                node.subject.describe(),
                            )
                            .with_note("enums compared by name"),
                        );
                    }
                }
            },
            (subject, expectation) => {
                // Only one side is an enum; neither mode bridges that.
                ctx.record(
                    Discrepancy::new(&node.path, expectation.describe(), subject.describe())
                        .with_note(format!(
                            "cannot compare {} with {}",
                            subject.kind_name(),
                            expectation.kind_name()
                        )),
                );
            }
        }
        Ok(())
    }
}

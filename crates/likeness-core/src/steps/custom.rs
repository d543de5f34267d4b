//! User-registered comparers and caller-supplied placeholders

use crate::config::{EquivalencyOptions, RegisteredComparer};
use crate::engine::ComparisonContext;
use crate::report::Discrepancy;
use crate::result::Result;
use crate::steps::{ComparisonNode, EquivalencyStep};
use crate::value::{Expectation, Value};

/// Applies comparers registered through `using_comparer`
///
/// A comparer applies when its type name matches the node's expected
/// type: the declared member type by default, or the subject's runtime
/// type when runtime types are respected for the node's path. A node
/// whose type matches no registered comparer falls through to the later
/// steps instead of erroring. Among multiple comparers for one type the
/// last registered wins.
pub struct CustomComparerStep;

fn expected_type_of(node: &ComparisonNode<'_>, options: &EquivalencyOptions) -> String {
    if options.respects_runtime_at(&node.path) {
        node.subject.type_name()
    } else {
        node.declared_type
            .clone()
            .unwrap_or_else(|| node.expectation.type_name())
    }
}

fn applicable_comparer<'a>(
    node: &ComparisonNode<'_>,
    options: &'a EquivalencyOptions,
) -> Option<&'a RegisteredComparer> {
    let expected = expected_type_of(node, options);
    options
        .comparers()
        .iter()
        .rev()
        .find(|comparer| comparer.type_name() == expected)
}

impl EquivalencyStep for CustomComparerStep {
    fn name(&self) -> &'static str {
        "custom-comparer"
    }

    fn can_handle(&self, node: &ComparisonNode<'_>, options: &EquivalencyOptions) -> bool {
        applicable_comparer(node, options).is_some()
    }

    fn handle(&self, node: &ComparisonNode<'_>, ctx: &mut ComparisonContext) -> Result<()> {
        let options = ctx.options_arc();
        if let Some(comparer) = applicable_comparer(node, &options) {
            if !comparer.compare(node.subject, node.expectation) {
                ctx.record(
                    Discrepancy::new(
                        &node.path,
                        node.expectation.describe(),
                        node.subject.describe(),
                    )
                    .with_note(format!(
                        "using the custom comparer for type {}",
                        comparer.type_name()
                    )),
                );
            }
        }
        Ok(())
    }
}

/// Evaluates predicate and assertion placeholders on the expectation side
///
/// The placeholder's declared type must match the subject's runtime type
/// exactly; a mismatch is a descriptive discrepancy, never a silent pass.
pub struct PlaceholderStep;

impl EquivalencyStep for PlaceholderStep {
    fn name(&self) -> &'static str {
        "placeholder"
    }

    fn can_handle(&self, node: &ComparisonNode<'_>, _options: &EquivalencyOptions) -> bool {
        matches!(node.expectation, Value::Expect(_))
    }

    fn handle(&self, node: &ComparisonNode<'_>, ctx: &mut ComparisonContext) -> Result<()> {
        let Value::Expect(expectation) = node.expectation else {
            return Ok(());
        };

        let subject_type = node.subject.type_name();
        if subject_type != expectation.expected_type() {
            ctx.record(
                Discrepancy::new(
                    &node.path,
                    format!("a value of type {}", expectation.expected_type()),
                    format!("{} of type {subject_type}", node.subject.describe()),
                )
                .with_note("the placeholder applies to a different type"),
            );
            return Ok(());
        }

        match expectation {
            Expectation::Predicate {
                description,
                predicate,
                ..
            } => {
                if !predicate(node.subject) {
                    ctx.record(Discrepancy::new(
                        &node.path,
                        format!("<value matching {description}>"),
                        node.subject.describe(),
                    ));
                }
            }
            Expectation::Assertion {
                description, check, ..
            } => {
                if let Err(failure) = check(node.subject) {
                    ctx.record(
                        Discrepancy::new(
                            &node.path,
                            format!("<value satisfying {description}>"),
                            node.subject.describe(),
                        )
                        .with_note(failure),
                    );
                }
            }
        }
        Ok(())
    }
}

//! Collection and dictionary comparison steps

use crate::config::EquivalencyOptions;
use crate::engine::ComparisonContext;
use crate::path::PathSegment;
use crate::report::Discrepancy;
use crate::result::Result;
use crate::steps::{ComparisonNode, EquivalencyStep};
use crate::value::Value;

/// Compares sequences and byte strings
///
/// Byte strings always compare strictly ordered. Other sequences consult
/// the ordering rules: strict sequences compare position-by-position;
/// unordered sequences are paired as a multiset via deterministic greedy
/// probing, falling back to index-aligned recursion when a full pairing
/// does not exist so that mismatches come out index-qualified. A length
/// mismatch is a single discrepancy naming both lengths.
pub struct CollectionStep;

impl EquivalencyStep for CollectionStep {
    fn name(&self) -> &'static str {
        "collection"
    }

    fn can_handle(&self, node: &ComparisonNode<'_>, _options: &EquivalencyOptions) -> bool {
        matches!(
            (node.subject, node.expectation),
            (Value::Seq(_), Value::Seq(_)) | (Value::Bytes(_), Value::Bytes(_))
        )
    }

    fn handle(&self, node: &ComparisonNode<'_>, ctx: &mut ComparisonContext) -> Result<()> {
        match (node.subject, node.expectation) {
            (Value::Bytes(subject), Value::Bytes(expectation)) => {
                compare_bytes(node, subject, expectation, ctx)
            }
            (Value::Seq(subject), Value::Seq(expectation)) => {
                compare_sequences(node, subject, expectation, ctx)
            }
            _ => Ok(()),
        }
    }
}

fn compare_bytes(
    node: &ComparisonNode<'_>,
    subject: &[u8],
    expectation: &[u8],
    ctx: &mut ComparisonContext,
) -> Result<()> {
    if subject.len() != expectation.len() {
        ctx.record(
            Discrepancy::new(
                &node.path,
                format!("{} bytes", expectation.len()),
                format!("{} bytes", subject.len()),
            )
            .with_note("length mismatch"),
        );
        return Ok(());
    }
    if let Some(index) = subject
        .iter()
        .zip(expectation.iter())
        .position(|(s, e)| s != e)
    {
        let path = node.path.child(PathSegment::Index(index));
        ctx.record(
            Discrepancy::new(
                &path,
                format!("0x{:02x}", expectation[index]),
                format!("0x{:02x}", subject[index]),
            )
            .with_note("byte sequences compare strictly ordered"),
        );
    }
    Ok(())
}

fn compare_sequences(
    node: &ComparisonNode<'_>,
    subject: &[Value],
    expectation: &[Value],
    ctx: &mut ComparisonContext,
) -> Result<()> {
    if subject.len() != expectation.len() {
        ctx.record(
            Discrepancy::new(
                &node.path,
                format!("{} items", expectation.len()),
                format!("{} items", subject.len()),
            )
            .with_note("length mismatch"),
        );
        return Ok(());
    }
    if subject.is_empty() {
        return Ok(());
    }

    let strict = ctx.options().ordering().is_strict(&node.path, false);
    if !strict && multiset_pairing_exists(subject, expectation, ctx)? {
        return Ok(());
    }

    // Strict order, or an unordered pairing does not exist: compare
    // index-aligned so every mismatch carries its index.
    for (index, (s, e)) in subject.iter().zip(expectation.iter()).enumerate() {
        ctx.compare_child(PathSegment::Index(index), s, e, None)?;
    }
    Ok(())
}

/// Greedy first-fit pairing in subject order over unconsumed expectation
/// elements; deterministic for identical inputs.
fn multiset_pairing_exists(
    subject: &[Value],
    expectation: &[Value],
    ctx: &mut ComparisonContext,
) -> Result<bool> {
    let mut consumed = vec![false; expectation.len()];
    for s in subject {
        let mut paired = false;
        for (index, e) in expectation.iter().enumerate() {
            if consumed[index] {
                continue;
            }
            if ctx.probe(s, e)? {
                consumed[index] = true;
                paired = true;
                break;
            }
        }
        if !paired {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Compares dictionaries by key equality
///
/// Entry counts must match; each subject entry's value is compared
/// against the expectation entry with an equal key, recursively. A key
/// present on one side only is a discrepancy naming the key.
pub struct DictionaryStep;

impl EquivalencyStep for DictionaryStep {
    fn name(&self) -> &'static str {
        "dictionary"
    }

    fn can_handle(&self, node: &ComparisonNode<'_>, _options: &EquivalencyOptions) -> bool {
        matches!(
            (node.subject, node.expectation),
            (Value::Map(_), Value::Map(_))
        )
    }

    fn handle(&self, node: &ComparisonNode<'_>, ctx: &mut ComparisonContext) -> Result<()> {
        let (Value::Map(subject), Value::Map(expectation)) = (node.subject, node.expectation)
        else {
            return Ok(());
        };

        if subject.len() != expectation.len() {
            ctx.record(
                Discrepancy::new(
                    &node.path,
                    format!("{} entries", expectation.len()),
                    format!("{} entries", subject.len()),
                )
                .with_note("entry count mismatch"),
            );
            return Ok(());
        }

        for (key, value) in subject {
            match expectation.iter().find(|(candidate, _)| candidate == key) {
                Some((_, expected_value)) => {
                    ctx.compare_child(
                        PathSegment::Key(key.describe()),
                        value,
                        expected_value,
                        None,
                    )?;
                }
                None => {
                    ctx.record(
                        Discrepancy::new(
                            &node.path,
                            node.expectation.describe(),
                            node.subject.describe(),
                        )
                        .with_note(format!("the expectation has no key {}", key.describe())),
                    );
                }
            }
        }
        Ok(())
    }
}

//! Auto-conversion step

use crate::config::EquivalencyOptions;
use crate::engine::ComparisonContext;
use crate::report::Discrepancy;
use crate::result::Result;
use crate::steps::{ComparisonNode, EquivalencyStep};
use crate::value::Value;

/// Coerces the subject toward the expectation's kind before comparing
///
/// Applies only where conversion is enabled (globally or for the node's
/// path) and only to the supported coercions: string to integer, float,
/// or bool, and exact integer/float interchange. A coercion that fails
/// to parse leaves the values to default equality, which reports the
/// kind mismatch.
pub struct ConversionStep;

fn convert(subject: &Value, target: &Value) -> Option<Value> {
    match (subject, target) {
        (Value::Str(s), Value::Int(_)) => s.trim().parse::<i128>().ok().map(Value::Int),
        (Value::Str(s), Value::Float(_)) => s.trim().parse::<f64>().ok().map(Value::Float),
        (Value::Str(s), Value::Bool(_)) => s.trim().parse::<bool>().ok().map(Value::Bool),
        (Value::Int(i), Value::Float(_)) => Some(Value::Float(*i as f64)),
        (Value::Float(f), Value::Int(_)) if f.fract() == 0.0 => Some(Value::Int(*f as i128)),
        _ => None,
    }
}

fn convertible_shape(subject: &Value, target: &Value) -> bool {
    matches!(
        (subject, target),
        (Value::Str(_), Value::Int(_))
            | (Value::Str(_), Value::Float(_))
            | (Value::Str(_), Value::Bool(_))
            | (Value::Int(_), Value::Float(_))
            | (Value::Float(_), Value::Int(_))
    )
}

impl EquivalencyStep for ConversionStep {
    fn name(&self) -> &'static str {
        "auto-conversion"
    }

    fn can_handle(&self, node: &ComparisonNode<'_>, options: &EquivalencyOptions) -> bool {
        options.conversion_enabled_at(&node.path)
            && convertible_shape(node.subject, node.expectation)
    }

    fn handle(&self, node: &ComparisonNode<'_>, ctx: &mut ComparisonContext) -> Result<()> {
        match convert(node.subject, node.expectation) {
            Some(converted) if &converted == node.expectation => {}
            Some(converted) => {
                ctx.record(
                    Discrepancy::new(
                        &node.path,
                        node.expectation.describe(),
                        node.subject.describe(),
                    )
                    .with_note(format!(
                        "after converting the subject to {}",
                        converted.describe()
                    )),
                );
            }
            None => {
                ctx.record(
                    Discrepancy::new(
                        &node.path,
                        node.expectation.describe(),
                        node.subject.describe(),
                    )
                    .with_note(format!(
                        "the subject could not be converted to {}",
                        node.expectation.kind_name()
                    )),
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_to_number_conversions() {
        assert_eq!(
            convert(&Value::Str("42".into()), &Value::Int(0)),
            Some(Value::Int(42))
        );
        assert_eq!(
            convert(&Value::Str(" 1.5 ".into()), &Value::Float(0.0)),
            Some(Value::Float(1.5))
        );
        assert_eq!(convert(&Value::Str("nope".into()), &Value::Int(0)), None);
    }

    #[test]
    fn numeric_interchange_is_exact() {
        assert_eq!(
            convert(&Value::Int(2), &Value::Float(0.0)),
            Some(Value::Float(2.0))
        );
        assert_eq!(
            convert(&Value::Float(2.0), &Value::Int(0)),
            Some(Value::Int(2))
        );
        assert_eq!(convert(&Value::Float(2.5), &Value::Int(0)), None);
    }
}

//! The comparison engine: context, walk orchestration, entry points
//!
//! A comparison moves through `Start → Walking → {Success, Failed,
//! Error}`. Walking is a synchronous, single-threaded, depth-first
//! recursion: every node is dispatched to the first applicable pipeline
//! step, leaf evaluations accumulate discrepancies, and structural,
//! configuration, and recursion defects abort the walk immediately as
//! errors, never mixed into the discrepancy list. A completed
//! walk with zero discrepancies is Success; otherwise the aggregated
//! report (all mismatches, not the first) becomes a Failed outcome.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::config::{EquivalencyOptions, OptionsBuilder, global_options};
use crate::error::LikenessError;
use crate::path::{NodePath, ObjectReference, PathSegment};
use crate::reflect::{Member, MemberResolver};
use crate::report::{Discrepancy, Report};
use crate::result::Result;
use crate::steps::{ComparisonNode, EquivalencyStep};
use crate::value::{ObjectHandle, Value};

/// Mutable state of one walk
///
/// Owns the current path, the per-branch ancestor stack for cycle
/// detection, and the accumulated discrepancies. Custom steps receive a
/// mutable reference and interact through [`ComparisonContext::record`],
/// [`ComparisonContext::compare_child`], and
/// [`ComparisonContext::probe`].
pub struct ComparisonContext {
    options: Arc<EquivalencyOptions>,
    steps: Arc<Vec<Arc<dyn EquivalencyStep>>>,
    resolver: MemberResolver,
    path: NodePath,
    ancestors: Vec<ObjectReference>,
    discrepancies: Vec<Discrepancy>,
    mismatch_marks: usize,
    probing: bool,
}

impl ComparisonContext {
    pub(crate) fn new(options: Arc<EquivalencyOptions>) -> Self {
        let steps = Arc::new(options.assemble_pipeline());
        Self {
            options,
            steps,
            resolver: MemberResolver::new(),
            path: NodePath::root(),
            ancestors: Vec::new(),
            discrepancies: Vec::new(),
            mismatch_marks: 0,
            probing: false,
        }
    }

    /// The options snapshot this walk runs against
    pub fn options(&self) -> &EquivalencyOptions {
        &self.options
    }

    /// A shared handle to the options, for steps that need to hold them
    /// across mutable context calls
    pub fn options_arc(&self) -> Arc<EquivalencyOptions> {
        Arc::clone(&self.options)
    }

    /// The path of the node currently being compared
    pub fn path(&self) -> &NodePath {
        &self.path
    }

    /// Record a discrepancy at the current node
    ///
    /// During probe (trial) comparisons the discrepancy is counted but
    /// not kept, so failed pairing attempts never leak into the report.
    pub fn record(&mut self, discrepancy: Discrepancy) {
        self.mismatch_marks += 1;
        if !self.probing {
            if self.options.tracing() {
                trace!(path = %discrepancy.path, "discrepancy recorded");
            }
            self.discrepancies.push(discrepancy);
        }
    }

    /// Compare a pair of values at the current path
    pub fn compare_values(
        &mut self,
        subject: &Value,
        expectation: &Value,
        declared_type: Option<&str>,
    ) -> Result<()> {
        let recursion = self.options.recursion();
        if self.path.len() > recursion.max_depth {
            if recursion.allow_infinite {
                trace!(path = %self.path, "depth bound reached, treating as equivalent");
                return Ok(());
            }
            return Err(LikenessError::recursion_error(
                self.path.to_string(),
                format!(
                    "maximum recursion depth of {} exceeded",
                    recursion.max_depth
                ),
            ));
        }

        let node = ComparisonNode::new(
            subject,
            expectation,
            declared_type.map(str::to_string),
            self.path.clone(),
        );
        let steps = Arc::clone(&self.steps);
        for step in steps.iter() {
            if step.can_handle(&node, &self.options) {
                if self.options.tracing() {
                    trace!(path = %node.path, step = step.name(), "step selected");
                }
                return step.handle(&node, self);
            }
        }
        Err(LikenessError::structural_error(
            self.path.to_string(),
            format!(
                "no rule could handle comparing {} with {}",
                subject.kind_name(),
                expectation.kind_name()
            ),
        ))
    }

    /// Descend into a child node: push the segment, compare, unwind
    pub fn compare_child(
        &mut self,
        segment: PathSegment,
        subject: &Value,
        expectation: &Value,
        declared_type: Option<&str>,
    ) -> Result<()> {
        self.path.push(segment);
        let outcome = self.compare_values(subject, expectation, declared_type);
        self.path.pop();
        outcome
    }

    /// Trial comparison: true when the pair is equivalent, without
    /// recording anything. Structural and recursion errors still abort.
    pub fn probe(&mut self, subject: &Value, expectation: &Value) -> Result<bool> {
        let saved_probing = self.probing;
        let saved_marks = self.mismatch_marks;
        self.probing = true;
        let outcome = self.compare_values(subject, expectation, None);
        self.probing = saved_probing;
        let matched = self.mismatch_marks == saved_marks;
        self.mismatch_marks = saved_marks;
        outcome.map(|_| matched)
    }

    /// Resolve the member view of an object for the node at `path`
    pub fn resolve_members(
        &self,
        object: &ObjectHandle,
        declared_type: Option<&str>,
        path: &NodePath,
    ) -> Vec<Member> {
        let respect_runtime = self.options.respects_runtime_at(path);
        self.resolver.resolve(object, declared_type, respect_runtime)
    }

    /// Push the current object onto the branch's ancestor stack
    pub fn push_ancestor(&mut self, reference: ObjectReference) {
        self.ancestors.push(reference);
    }

    /// Unwind the ancestor stack when leaving the object
    pub fn pop_ancestor(&mut self) {
        self.ancestors.pop();
    }

    /// Whether the reference revisits an ancestor on this branch
    pub fn is_cyclic(&self, reference: &ObjectReference) -> bool {
        self.ancestors.iter().any(|ancestor| ancestor == reference)
    }
}

/// A comparison engine bound to one options snapshot
///
/// Engines clone cheaply and are safe to share across threads; each
/// `verify` call runs an independent walk.
#[derive(Clone)]
pub struct EquivalencyEngine {
    options: Arc<EquivalencyOptions>,
}

impl EquivalencyEngine {
    pub fn new(options: EquivalencyOptions) -> Self {
        Self {
            options: Arc::new(options),
        }
    }

    pub fn from_shared(options: Arc<EquivalencyOptions>) -> Self {
        Self { options }
    }

    /// Compare `subject` against `expectation`
    pub fn verify(&self, subject: &Value, expectation: &Value) -> Result<()> {
        self.run(subject, expectation, None)
    }

    /// Compare with a caller-supplied reason woven into failure lines
    pub fn verify_because(
        &self,
        subject: &Value,
        expectation: &Value,
        reason: &str,
    ) -> Result<()> {
        self.run(subject, expectation, Some(reason))
    }

    fn run(&self, subject: &Value, expectation: &Value, reason: Option<&str>) -> Result<()> {
        debug!(
            subject = subject.kind_name(),
            expectation = expectation.kind_name(),
            "starting equivalency walk"
        );
        let mut ctx = ComparisonContext::new(Arc::clone(&self.options));
        ctx.compare_values(subject, expectation, None)?;

        if ctx.discrepancies.is_empty() {
            debug!("equivalency walk succeeded");
            return Ok(());
        }

        debug!(
            discrepancies = ctx.discrepancies.len(),
            "equivalency walk failed"
        );
        let mut report = Report::new(ctx.discrepancies);
        if let Some(reason) = reason {
            report = report.with_reason(reason);
        }
        if self.options.reports_configuration() {
            report = report.with_configuration(self.options.summary());
        }
        Err(LikenessError::mismatch(report))
    }
}

/// Compare two value graphs with configuration derived from the
/// process-wide defaults
///
/// `configure` receives a builder seeded from [`global_options`]; the
/// resulting snapshot drives a single walk. Configuration defects
/// surface before the walk starts.
pub fn compare<F>(subject: &Value, expectation: &Value, configure: F) -> Result<()>
where
    F: FnOnce(OptionsBuilder) -> OptionsBuilder,
{
    let options = configure(OptionsBuilder::from_options(&global_options())).build()?;
    EquivalencyEngine::new(options).verify(subject, expectation)
}

/// Like [`compare`], with a caller-supplied reason for the failure report
pub fn compare_because<F>(
    subject: &Value,
    expectation: &Value,
    configure: F,
    reason: &str,
) -> Result<()>
where
    F: FnOnce(OptionsBuilder) -> OptionsBuilder,
{
    let options = configure(OptionsBuilder::from_options(&global_options())).build()?;
    EquivalencyEngine::new(options).verify_because(subject, expectation, reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EquivalencyOptions;
    use crate::error::ErrorKind;
    use crate::value::{EnumValue, ObjectBuilder, ObjectHandle};

    fn verify(subject: &Value, expectation: &Value) -> Result<()> {
        EquivalencyEngine::new(EquivalencyOptions::default()).verify(subject, expectation)
    }

    fn report_of(result: Result<()>) -> Report {
        match result {
            Err(LikenessError::Mismatch { report }) => *report,
            other => panic!("expected a mismatch, got {other:?}"),
        }
    }

    fn person(age: i64) -> Value {
        Value::Object(ObjectBuilder::new("Person").property("Age", age).build())
    }

    #[test]
    fn equal_graphs_produce_zero_discrepancies() {
        let subject = Value::Object(
            ObjectBuilder::new("Person")
                .property("Age", 36)
                .property("Name", "Ada")
                .build(),
        );
        let expectation = Value::Object(
            ObjectBuilder::new("Person")
                .property("Age", 36)
                .property("Name", "Ada")
                .build(),
        );
        assert!(verify(&subject, &expectation).is_ok());
    }

    #[test]
    fn single_leaf_difference_names_the_exact_path_and_values() {
        let report = report_of(verify(&person(36), &person(37)));
        assert_eq!(report.discrepancies().len(), 1);
        let discrepancy = &report.discrepancies()[0];
        assert_eq!(discrepancy.path, "Age");
        assert_eq!(discrepancy.expected, "37");
        assert_eq!(discrepancy.actual, "36");
        assert!(report.render().contains("Expected Age to be 37, but found 36."));
    }

    #[test]
    fn all_mismatches_are_aggregated_not_just_the_first() {
        let subject = Value::Object(
            ObjectBuilder::new("Person")
                .property("Age", 36)
                .property("Name", "Ada")
                .build(),
        );
        let expectation = Value::Object(
            ObjectBuilder::new("Person")
                .property("Age", 37)
                .property("Name", "Grace")
                .build(),
        );
        let report = report_of(verify(&subject, &expectation));
        assert_eq!(report.discrepancies().len(), 2);
        assert_eq!(report.discrepancies()[0].path, "Age");
        assert_eq!(report.discrepancies()[1].path, "Name");
    }

    #[test]
    fn nested_null_expectation_reports_the_subject_description() {
        let home = ObjectBuilder::new("Address").property("City", "Berlin").build();
        let subject = Value::Object(
            ObjectBuilder::new("Person")
                .property("Home", Value::Object(home))
                .build(),
        );
        let expectation = Value::Object(
            ObjectBuilder::new("Person").property("Home", Value::Null).build(),
        );

        let report = report_of(verify(&subject, &expectation));
        let discrepancy = &report.discrepancies()[0];
        assert_eq!(discrepancy.path, "Home");
        assert_eq!(discrepancy.expected, "<null>");
        assert!(discrepancy.actual.contains("Address"));
    }

    #[test]
    fn zero_comparable_members_is_a_structural_error() {
        let subject = Value::Object(ObjectHandle::new("Empty"));
        let expectation = Value::Object(ObjectHandle::new("Empty"));
        let error = verify(&subject, &expectation).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Structural);
        assert!(error.to_string().contains("no comparable members"));
    }

    #[test]
    fn cyclic_graphs_error_by_default() {
        let parent = ObjectHandle::new("Node");
        let child = ObjectHandle::new("Node");
        parent.set_member_value("Next", Value::Object(child.clone()));
        child.set_member_value("Next", Value::Object(parent.clone()));

        let expected_parent = ObjectHandle::new("Node");
        let expected_child = ObjectHandle::new("Node");
        expected_parent.set_member_value("Next", Value::Object(expected_child.clone()));
        expected_child.set_member_value("Next", Value::Object(expected_parent.clone()));

        let error = verify(
            &Value::Object(parent.clone()),
            &Value::Object(expected_parent.clone()),
        )
        .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Recursion);

        let tolerant = EquivalencyEngine::new(
            EquivalencyOptions::builder()
                .allowing_infinite_recursion()
                .build()
                .unwrap(),
        );
        assert!(
            tolerant
                .verify(&Value::Object(parent), &Value::Object(expected_parent))
                .is_ok()
        );
    }

    #[test]
    fn aliasing_without_a_cycle_is_legitimate() {
        // The same instance referenced from two sibling members is not a
        // cyclic revisit; only same-branch ancestors count.
        let shared = ObjectBuilder::new("Address").property("City", "Berlin").build();
        let subject = Value::Object(
            ObjectBuilder::new("Person")
                .property("Home", Value::Object(shared.clone()))
                .property("Work", Value::Object(shared))
                .build(),
        );
        let expected_shared = ObjectBuilder::new("Address").property("City", "Berlin").build();
        let expectation = Value::Object(
            ObjectBuilder::new("Person")
                .property("Home", Value::Object(expected_shared.clone()))
                .property("Work", Value::Object(expected_shared))
                .build(),
        );
        assert!(verify(&subject, &expectation).is_ok());
    }

    #[test]
    fn depth_guard_trips_without_infinite_allowance() {
        fn nest(levels: usize) -> Value {
            let mut value = Value::Int(1);
            for _ in 0..levels {
                value = Value::Object(ObjectBuilder::new("Box").property("Inner", value).build());
            }
            value
        }

        let engine = EquivalencyEngine::new(
            EquivalencyOptions::builder()
                .with_max_recursion_depth(3)
                .build()
                .unwrap(),
        );
        let error = engine.verify(&nest(6), &nest(6)).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Recursion);

        let tolerant = EquivalencyEngine::new(
            EquivalencyOptions::builder()
                .with_max_recursion_depth(3)
                .allowing_infinite_recursion()
                .build()
                .unwrap(),
        );
        assert!(tolerant.verify(&nest(6), &nest(6)).is_ok());
    }

    #[test]
    fn unordered_sequences_match_as_multisets() {
        let subject = Value::Seq(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        let expectation = Value::Seq(vec![Value::Int(3), Value::Int(2), Value::Int(1)]);
        assert!(verify(&subject, &expectation).is_ok());
    }

    #[test]
    fn strict_ordering_makes_permutations_fail() {
        let engine = EquivalencyEngine::new(
            EquivalencyOptions::builder().with_strict_ordering().build().unwrap(),
        );
        let subject = Value::Seq(vec![Value::Int(1), Value::Int(2)]);
        let expectation = Value::Seq(vec![Value::Int(2), Value::Int(1)]);
        let report = report_of(engine.verify(&subject, &expectation));
        assert_eq!(report.discrepancies().len(), 2);
        assert_eq!(report.discrepancies()[0].path, "[0]");
    }

    #[test]
    fn empty_vs_nonempty_reports_a_length_mismatch() {
        let subject = Value::Seq(vec![]);
        let expectation = Value::Seq(vec![Value::Int(1)]);
        let report = report_of(verify(&subject, &expectation));
        let discrepancy = &report.discrepancies()[0];
        assert_eq!(discrepancy.expected, "1 items");
        assert_eq!(discrepancy.actual, "0 items");
    }

    #[test]
    fn byte_sequences_are_strict_by_default() {
        let subject = Value::Bytes(vec![1, 2, 3]);
        let permuted = Value::Bytes(vec![3, 2, 1]);
        let report = report_of(verify(&subject, &permuted));
        assert_eq!(report.discrepancies()[0].path, "[0]");
    }

    #[test]
    fn same_length_unpairable_sequences_report_index_qualified() {
        let subject = Value::Seq(vec![Value::Int(1), Value::Int(2)]);
        let expectation = Value::Seq(vec![Value::Int(1), Value::Int(5)]);
        let report = report_of(verify(&subject, &expectation));
        assert!(report.discrepancies().iter().any(|d| d.path == "[1]"));
    }

    #[test]
    fn enum_by_value_is_type_agnostic_and_wide() {
        let subject = Value::Enum(EnumValue::new("ColorA", "Red", u64::MAX as i128));
        let expectation = Value::Enum(EnumValue::new("ColorB", "Crimson", u64::MAX as i128));
        assert!(verify(&subject, &expectation).is_ok());

        let differing = Value::Enum(EnumValue::new("ColorB", "Red", 1));
        assert!(verify(&subject, &differing).is_err());
    }

    #[test]
    fn enum_by_name_fails_mixed_kinds() {
        let engine = EquivalencyEngine::new(
            EquivalencyOptions::builder().comparing_enums_by_name().build().unwrap(),
        );
        let by_name_equal = engine.verify(
            &Value::Enum(EnumValue::new("ColorA", "Red", 0)),
            &Value::Enum(EnumValue::new("ColorB", "Red", 9)),
        );
        assert!(by_name_equal.is_ok());

        let mixed = engine.verify(
            &Value::Int(0),
            &Value::Enum(EnumValue::new("Color", "Red", 0)),
        );
        assert!(mixed.is_err());
    }

    #[test]
    fn null_never_equals_a_zero_enum() {
        let report = report_of(verify(
            &Value::Null,
            &Value::Enum(EnumValue::new("Color", "None", 0)),
        ));
        assert!(report.discrepancies()[0].actual.contains("<null>"));
    }

    #[test]
    fn including_a_path_suppresses_other_mismatches() {
        let subject = Value::Object(
            ObjectBuilder::new("Person")
                .property("Age", 36)
                .property("Name", "Ada")
                .build(),
        );
        let expectation = Value::Object(
            ObjectBuilder::new("Person")
                .property("Age", 36)
                .property("Name", "Grace")
                .build(),
        );

        let engine = EquivalencyEngine::new(
            EquivalencyOptions::builder().including_path("Age").build().unwrap(),
        );
        assert!(engine.verify(&subject, &expectation).is_ok());
    }

    #[test]
    fn missing_members_fail_unless_ignored() {
        let subject = Value::Object(
            ObjectBuilder::new("Person")
                .property("Age", 36)
                .property("Nickname", "ada")
                .build(),
        );
        let expectation =
            Value::Object(ObjectBuilder::new("Person").property("Age", 36).build());

        let report = report_of(verify(&subject, &expectation));
        assert_eq!(report.discrepancies()[0].path, "Nickname");

        let lenient = EquivalencyEngine::new(
            EquivalencyOptions::builder().ignoring_missing_members().build().unwrap(),
        );
        assert!(lenient.verify(&subject, &expectation).is_ok());
    }

    #[test]
    fn records_by_value_framing_differs_from_by_members() {
        let record = |text: &str| {
            Value::Object(
                ObjectBuilder::new("Note").record().property("Text", text).build(),
            )
        };

        let by_members = report_of(verify(&record("foo"), &record("bar")));
        assert_eq!(by_members.discrepancies()[0].path, "Text");

        let engine = EquivalencyEngine::new(
            EquivalencyOptions::builder()
                .comparing_records_by_value()
                .build()
                .unwrap(),
        );
        let by_value = report_of(engine.verify(&record("foo"), &record("bar")));
        assert_eq!(by_value.discrepancies()[0].path, "subject");
        assert_eq!(by_value.discrepancies()[0].note.as_deref(), Some("compared by value"));
    }

    #[test]
    fn custom_comparers_apply_by_declared_type() {
        let engine = EquivalencyEngine::new(
            EquivalencyOptions::builder()
                .using_comparer("integer", |subject, expectation| {
                    // Tolerant comparison: off-by-one is fine.
                    match (subject, expectation) {
                        (Value::Int(a), Value::Int(b)) => (a - b).abs() <= 1,
                        _ => false,
                    }
                })
                .build()
                .unwrap(),
        );
        assert!(engine.verify(&person(36), &person(37)).is_ok());
        assert!(engine.verify(&person(36), &person(40)).is_err());
    }

    #[test]
    fn predicate_placeholders_check_type_then_value() {
        let subject = person(36);
        let accepts = Value::Object(
            ObjectBuilder::new("Person")
                .property(
                    "Age",
                    Value::matching("integer", "a plausible age", |v| {
                        matches!(v, Value::Int(age) if (0..130).contains(age))
                    })
                    .unwrap(),
                )
                .build(),
        );
        assert!(verify(&subject, &accepts).is_ok());

        let wrong_type = Value::Object(
            ObjectBuilder::new("Person")
                .property(
                    "Age",
                    Value::matching("string", "a name", |_| true).unwrap(),
                )
                .build(),
        );
        let report = report_of(verify(&subject, &wrong_type));
        assert!(report.discrepancies()[0].expected.contains("a value of type string"));
    }

    #[test]
    fn dropping_builtin_steps_makes_nodes_unhandleable() {
        let engine = EquivalencyEngine::new(
            EquivalencyOptions::builder().without_builtin_steps().build().unwrap(),
        );
        let error = engine.verify(&Value::Int(1), &Value::Int(1)).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Structural);
        assert!(error.to_string().contains("no rule could handle"));
    }

    #[test]
    fn auto_conversion_applies_per_path() {
        let subject = Value::Object(
            ObjectBuilder::new("Row").property("Count", "42").build(),
        );
        let expectation = Value::Object(
            ObjectBuilder::new("Row").property("Count", 42).build(),
        );

        assert!(verify(&subject, &expectation).is_err());

        let engine = EquivalencyEngine::new(
            EquivalencyOptions::builder()
                .with_auto_conversion_for("Count")
                .build()
                .unwrap(),
        );
        assert!(engine.verify(&subject, &expectation).is_ok());
    }

    #[test]
    fn string_mismatch_names_the_first_differing_index() {
        let report = report_of(verify(
            &Value::Str("foo".into()),
            &Value::Str("bar".into()),
        ));
        let note = report.discrepancies()[0].note.as_deref().unwrap();
        assert!(note.contains("index 0"));
        assert!(note.contains("foo"));
    }

    #[test]
    fn reason_reaches_the_rendered_report() {
        let engine = EquivalencyEngine::new(EquivalencyOptions::default());
        let error = engine
            .verify_because(&person(36), &person(37), "the birthday passed")
            .unwrap_err();
        assert!(error.to_string().contains("because the birthday passed"));
    }

    #[test]
    fn configuration_summary_is_appended_on_request() {
        let engine = EquivalencyEngine::new(
            EquivalencyOptions::builder()
                .with_reported_configuration()
                .build()
                .unwrap(),
        );
        let error = engine.verify(&person(36), &person(37)).unwrap_err();
        let text = error.to_string();
        assert!(text.contains("Configuration:"));
        assert!(text.contains("- selection: all public members"));
    }
}

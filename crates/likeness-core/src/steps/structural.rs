//! Structural member recursion, the general case of the pipeline

use crate::config::EquivalencyOptions;
use crate::engine::ComparisonContext;
use crate::error::LikenessError;
use crate::path::{ObjectReference, PathSegment};
use crate::report::Discrepancy;
use crate::result::Result;
use crate::rules::MissingMemberPolicy;
use crate::steps::{ComparisonNode, EquivalencyStep};
use crate::value::Value;

/// Recurses into the selected, matched members of an object pair
///
/// The walk per node: cycle check against the branch's ancestor stack,
/// member resolution (declared-vs-runtime policy), selection, matching
/// against the expectation's member set, then one recursive comparison
/// per matched pair. Zero members surviving selection is a structural
/// error; comparing two member-less objects never silently succeeds.
pub struct StructuralStep;

impl EquivalencyStep for StructuralStep {
    fn name(&self) -> &'static str {
        "structural"
    }

    fn can_handle(&self, node: &ComparisonNode<'_>, _options: &EquivalencyOptions) -> bool {
        matches!(
            (node.subject, node.expectation),
            (Value::Object(_), Value::Object(_))
        )
    }

    fn handle(&self, node: &ComparisonNode<'_>, ctx: &mut ComparisonContext) -> Result<()> {
        let (Value::Object(subject), Value::Object(expectation)) = (node.subject, node.expectation)
        else {
            return Ok(());
        };
        let options = ctx.options_arc();

        let reference = ObjectReference::new(subject, node.path.clone());
        if ctx.is_cyclic(&reference) {
            if options.recursion().allow_infinite {
                tracing::trace!(path = %node.path, "cyclic revisit treated as equivalent");
                return Ok(());
            }
            return Err(LikenessError::recursion_error(
                node.path.to_string(),
                "cyclic reference detected; enable infinite recursion to compare cyclic graphs",
            ));
        }

        // Nested objects excluded from recursion compare by whole value.
        if !options.selection().recurses_nested_objects() && !node.path.is_root() {
            if node.subject != node.expectation {
                ctx.record(
                    Discrepancy::new(
                        &node.path,
                        node.expectation.describe(),
                        node.subject.describe(),
                    )
                    .with_note("nested objects compared by value"),
                );
            }
            return Ok(());
        }

        let declared = node.declared_type.as_deref();
        let members = ctx.resolve_members(subject, declared, &node.path);
        let selected = options.selection().select(members, &node.path);
        if selected.is_empty() {
            return Err(LikenessError::structural_error(
                node.path.to_string(),
                format!(
                    "no comparable members on type {} after selection",
                    subject.type_name()
                ),
            ));
        }

        let expectation_members = ctx.resolve_members(expectation, declared, &node.path);

        ctx.push_ancestor(reference);
        let mut outcome = Ok(());
        for member in &selected {
            match options
                .matching()
                .find_expectation_member(member, &expectation_members)
            {
                Some(index) => {
                    let counterpart = &expectation_members[index];
                    if let Err(error) = ctx.compare_child(
                        PathSegment::member(&member.name),
                        &member.value,
                        &counterpart.value,
                        Some(&member.declared_type),
                    ) {
                        outcome = Err(error);
                        break;
                    }
                }
                None => match options.matching().missing_member_policy() {
                    MissingMemberPolicy::Fail => {
                        let path = node.path.child(PathSegment::member(&member.name));
                        ctx.record(
                            Discrepancy::new(
                                &path,
                                "a member matched on the expectation",
                                member.value.describe(),
                            )
                            .with_note("the expectation has no member with this name"),
                        );
                    }
                    MissingMemberPolicy::Ignore => {}
                },
            }
        }
        ctx.pop_ancestor();
        outcome
    }
}

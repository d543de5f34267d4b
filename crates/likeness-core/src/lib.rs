//! Likeness Core
//!
//! Structural equivalency engine: compares two arbitrary object graphs
//! (subject and expectation) by walking them depth-first through a
//! configurable pipeline of selection, matching, ordering, and
//! comparison rules, with cycle detection and path-annotated difference
//! reports.
//!
//! Adapters present values to the engine as [`Value`] graphs (see the
//! `value` module); the engine itself performs no I/O and has no
//! knowledge of external formats. A comparison is driven by an immutable
//! [`EquivalencyOptions`] snapshot built fluently via [`OptionsBuilder`];
//! process-wide defaults exist behind [`global_options`] with explicit
//! reset semantics and are safe to mutate while comparisons run on other
//! threads.
//!
//! ```
//! use likeness_core::{ObjectBuilder, Value, compare};
//!
//! let subject = Value::Object(ObjectBuilder::new("Person").property("Age", 36).build());
//! let expectation = Value::Object(ObjectBuilder::new("Person").property("Age", 36).build());
//!
//! assert!(compare(&subject, &expectation, |options| options).is_ok());
//! ```

pub mod config;
pub mod console; // Terminal console utilities for report output
pub mod engine;
pub mod error;
pub mod path;
pub mod reflect;
pub mod report;
pub mod result;
pub mod rules;
pub mod steps;
pub mod value;

// Re-export commonly used types
pub use config::{
    ConversionRules, EnumComparisonMode, EquivalencyOptions, OptionsBuilder,
    RecordComparisonMode, RecursionPolicy, RegisteredComparer, TypingRules, global_options,
    reset_global_options, set_global_options, update_global_options,
};
pub use console::{Color, Console};
pub use engine::{ComparisonContext, EquivalencyEngine, compare, compare_because};
pub use error::{ErrorKind, LikenessError};
pub use path::{NodePath, ObjectReference, PathSegment};
pub use reflect::{Member, MemberKind, MemberResolver, Visibility};
pub use report::{ConfigurationSummary, Discrepancy, OutputFormat, Report, ReportRenderer};
pub use result::Result;
pub use rules::{
    MatchingRules, MemberInfo, MemberMatcher, MemberSelector, MissingMemberPolicy, OrderingRules,
    SelectionRules,
};
pub use steps::{ComparisonNode, EquivalencyStep, builtin_steps, fallback_step};
pub use value::{EnumValue, Expectation, ObjectBuilder, ObjectHandle, ObjectKind, Value};

/// Initialize the tracing subscriber for logging
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("likeness=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true),
        )
        .init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

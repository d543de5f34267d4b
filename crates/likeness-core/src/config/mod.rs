//! Configuration for equivalency comparisons
//!
//! Configuration is an explicit value threaded into every comparison, not
//! ambient state. [`OptionsBuilder`] is the fluent, additive surface;
//! [`EquivalencyOptions`] is the immutable snapshot a walk runs against.
//! Conflicting global toggles are last-writer-wins (chaining "records by
//! value" then "by members" leaves members in effect); invalid input
//! fails at [`OptionsBuilder::build`] time, before any walk begins, with
//! a message naming the offending parameter.
//!
//! A process-wide default snapshot exists for callers that want shared
//! defaults; it is read via atomic `Arc` snapshot and replaced wholesale,
//! so arbitrarily many concurrent comparisons can race a thread mutating
//! the defaults without corruption. `reset_global_options` restores the
//! built-in defaults.

mod builder;
mod global;
mod options;

pub use builder::OptionsBuilder;
pub use global::{global_options, reset_global_options, set_global_options, update_global_options};
pub use options::{
    ConversionRules, EnumComparisonMode, EquivalencyOptions, RecordComparisonMode,
    RecursionPolicy, RegisteredComparer, TypingRules,
};

//! Process-wide default options
//!
//! A single default [`EquivalencyOptions`] snapshot exists per process.
//! Readers take an atomic `Arc` snapshot and are never affected by later
//! mutations; writers replace the snapshot wholesale under a lock. This
//! is what lets comparisons run under heavy parallel load while another
//! thread toggles, say, global tracing, without corrupting anyone's walk.

use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;

use crate::config::builder::OptionsBuilder;
use crate::config::options::EquivalencyOptions;
use crate::result::Result;

static GLOBAL_OPTIONS: Lazy<RwLock<Arc<EquivalencyOptions>>> =
    Lazy::new(|| RwLock::new(Arc::new(EquivalencyOptions::default())));

/// The current process-wide default options snapshot
///
/// The returned `Arc` is immutable; concurrent mutations produce new
/// snapshots and never touch one already handed out.
pub fn global_options() -> Arc<EquivalencyOptions> {
    GLOBAL_OPTIONS
        .read()
        .map(|guard| Arc::clone(&guard))
        .unwrap_or_else(|_| Arc::new(EquivalencyOptions::default()))
}

/// Replace the process-wide defaults
pub fn set_global_options(options: EquivalencyOptions) {
    if let Ok(mut guard) = GLOBAL_OPTIONS.write() {
        *guard = Arc::new(options);
    }
}

/// Rebuild the process-wide defaults from the current snapshot
///
/// The closure receives a builder seeded from the current defaults;
/// configuration errors from the builder propagate and leave the
/// defaults untouched.
pub fn update_global_options<F>(configure: F) -> Result<()>
where
    F: FnOnce(OptionsBuilder) -> OptionsBuilder,
{
    let current = global_options();
    let updated = configure(OptionsBuilder::from_options(&current)).build()?;
    set_global_options(updated);
    Ok(())
}

/// Restore the built-in defaults
pub fn reset_global_options() {
    set_global_options(EquivalencyOptions::default());
}

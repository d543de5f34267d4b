//! Global defaults under concurrent load
//!
//! Comparisons snapshot the process-wide defaults at call time, so a
//! thread mutating global state (e.g. toggling tracing) while other
//! threads run assertions must never corrupt a walk or a report. This
//! test drives that contract hard: worker threads hammer comparisons
//! while a writer thread flips the defaults back and forth.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};
use std::thread;

use likeness_core::{
    LikenessError, compare, global_options, reset_global_options, update_global_options,
};
use likeness_integration_tests::{person, person_with_home};

// Both tests mutate process-wide defaults; serialize them so the harness
// running tests in parallel cannot make them observe each other.
static GLOBAL_LOCK: Mutex<()> = Mutex::new(());

#[test]
fn comparisons_survive_global_mutation_under_load() {
    let _guard = GLOBAL_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    reset_global_options();

    let stop = Arc::new(AtomicBool::new(false));

    let writer = {
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            let mut toggle = false;
            while !stop.load(Ordering::Relaxed) {
                toggle = !toggle;
                let result = if toggle {
                    update_global_options(|builder| builder.with_tracing())
                } else {
                    update_global_options(|builder| builder.with_reported_configuration())
                };
                assert!(result.is_ok());
                if toggle {
                    reset_global_options();
                }
            }
        })
    };

    let workers: Vec<_> = (0..4)
        .map(|worker| {
            thread::spawn(move || {
                for round in 0..250 {
                    // Equal graphs must always verify clean.
                    let ok = compare(
                        &person_with_home(36, "Ada", Some("Berlin")),
                        &person_with_home(36, "Ada", Some("Berlin")),
                        |options| options,
                    );
                    assert!(ok.is_ok(), "worker {worker} round {round}: {ok:?}");

                    // Differing graphs must always fail with exactly the
                    // one discrepancy, whatever the global flags say.
                    let failed = compare(&person(36, "Ada"), &person(37, "Ada"), |o| o);
                    match failed {
                        Err(LikenessError::Mismatch { report }) => {
                            assert_eq!(report.discrepancies().len(), 1);
                            assert_eq!(report.discrepancies()[0].path, "Age");
                        }
                        other => panic!("worker {worker} round {round}: {other:?}"),
                    }
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().expect("worker thread panicked");
    }
    stop.store(true, Ordering::Relaxed);
    writer.join().expect("writer thread panicked");

    reset_global_options();
    assert!(!global_options().tracing());
}

#[test]
fn snapshots_are_immune_to_later_mutation() {
    let _guard = GLOBAL_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    reset_global_options();

    let snapshot = global_options();
    update_global_options(|builder| builder.with_tracing()).unwrap();

    // The handed-out snapshot still reflects the state at read time.
    assert!(!snapshot.tracing());
    assert!(global_options().tracing());

    reset_global_options();
}

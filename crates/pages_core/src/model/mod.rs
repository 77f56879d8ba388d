//! Domain records shared by storage backends and handlers.
//!
//! # Responsibility
//! - Define `Account`, `Page` and the session/listing envelopes.
//! - Provide the process-wide timestamp source.
//!
//! # Invariants
//! - Timestamps are UTC nanoseconds and strictly increasing per process.
//! - Password hashes never appear in these values.

pub mod account;
pub mod page;

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static LAST_TIMESTAMP: AtomicI64 = AtomicI64::new(0);

/// Returns the current UTC time in nanoseconds since the Unix epoch.
///
/// Never returns a value less than or equal to a previous call, even if the
/// wall clock steps backwards.
pub fn now_nanos() -> i64 {
    let wall = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_nanos()).unwrap_or(i64::MAX))
        .unwrap_or(0);

    let mut last = LAST_TIMESTAMP.load(Ordering::Relaxed);
    loop {
        let next = wall.max(last.saturating_add(1));
        match LAST_TIMESTAMP.compare_exchange_weak(last, next, Ordering::AcqRel, Ordering::Relaxed)
        {
            Ok(_) => return next,
            Err(observed) => last = observed,
        }
    }
}

//! Join-code allocation for new rooms.
//!
//! Candidates are short uppercase alphanumeric strings. The allocator probes
//! the store before committing; persistent collisions fall back to a
//! timestamp-suffixed code so the loop always terminates.

use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use tracing::{debug, warn};

use crate::backend::store::DataStore;
use crate::core::error::Result;
use crate::shared::constants::{
    JOIN_CODE_ALPHABET, JOIN_CODE_LENGTH, JOIN_CODE_MAX_ATTEMPTS, JOIN_CODE_SUFFIX_LENGTH,
};

/// Source of candidate codes. Swappable so tests can force collisions.
pub trait CodeGenerator: Send + Sync {
    fn candidate(&self, length: usize) -> String;
}

/// Uniform random candidates from the join-code alphabet
pub struct RandomCodeGenerator;

impl CodeGenerator for RandomCodeGenerator {
    fn candidate(&self, length: usize) -> String {
        let mut rng = rand::rng();
        (0..length)
            .map(|_| {
                let idx = rng.random_range(0..JOIN_CODE_ALPHABET.len());
                JOIN_CODE_ALPHABET[idx] as char
            })
            .collect()
    }
}

/// Base-36 tail of the current timestamp, uppercased.
///
/// Appended to a colliding candidate; two allocations in the same millisecond
/// would still differ in their random prefix.
fn timestamp_suffix() -> String {
    let mut millis = Utc::now().timestamp_millis().unsigned_abs();
    let mut out = Vec::with_capacity(JOIN_CODE_SUFFIX_LENGTH);
    for _ in 0..JOIN_CODE_SUFFIX_LENGTH {
        out.push(JOIN_CODE_ALPHABET[(millis % 36) as usize]);
        millis /= 36;
    }
    out.reverse();
    out.into_iter().map(|b| b as char).collect()
}

pub struct JoinCodeAllocator {
    store: Arc<dyn DataStore>,
    generator: Arc<dyn CodeGenerator>,
}

impl JoinCodeAllocator {
    pub fn new(store: Arc<dyn DataStore>, generator: Arc<dyn CodeGenerator>) -> Self {
        Self { store, generator }
    }

    /// Produce a code no existing room holds at probe time.
    ///
    /// The probe cannot rule out a concurrent insert; callers must still treat
    /// a uniqueness violation on the room insert as a signal to re-allocate.
    pub async fn allocate(&self) -> Result<String> {
        for attempt in 1..=JOIN_CODE_MAX_ATTEMPTS {
            let code = self.generator.candidate(JOIN_CODE_LENGTH);
            if self.store.room_by_join_code(&code).await?.is_none() {
                return Ok(code);
            }
            debug!("Join code '{}' collided on probe (attempt {})", code, attempt);
        }

        // Deterministic disambiguation instead of unbounded retry
        let code = format!(
            "{}{}",
            self.generator.candidate(JOIN_CODE_LENGTH),
            timestamp_suffix()
        );
        warn!(
            "Join-code probing exhausted {} attempts, falling back to '{}'",
            JOIN_CODE_MAX_ATTEMPTS, code
        );
        Ok(code)
    }
}

//! Randomized fault generation.
//!
//! A [`FaultGenerator`] turns delay bounds and a candidate code set into one
//! [`FaultResult`]. It never sleeps; the caller decides how to honor the
//! delay, which keeps generation synchronous and testable.

use std::time::Duration;

use faultrpc_common::protocol::FaultRequest;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::error::FaultError;

/// Outcome of one draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaultResult {
    /// Delay to honor before acting on `code`
    pub delay: Duration,
    /// Numeric outcome code, one of the request's candidates
    pub code: u32,
}

/// Per-call fault generator.
///
/// Each call owns its generator, so concurrent calls never share random
/// state and draw independent sequences.
///
/// # Example
///
/// ```
/// use faultrpc_server::fault::FaultGenerator;
/// use std::time::Duration;
///
/// let mut generator = FaultGenerator::seeded(7);
/// let fault = generator
///     .generate(Duration::from_millis(10), Duration::from_millis(20), &[0, 5])
///     .unwrap();
/// assert!(fault.delay >= Duration::from_millis(10));
/// assert!(fault.delay <= Duration::from_millis(20));
/// assert!(fault.code == 0 || fault.code == 5);
/// ```
#[derive(Debug)]
pub struct FaultGenerator {
    rng: StdRng,
}

impl FaultGenerator {
    /// Creates a generator seeded from operating system entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Creates a generator with a fixed seed, for reproducible draws.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Draws a delay uniformly from `[min, max]` and a code uniformly from
    /// `candidates`.
    ///
    /// # Errors
    ///
    /// - [`FaultError::EmptyCandidates`] if `candidates` is empty
    /// - [`FaultError::InvertedBounds`] if `max < min`
    pub fn generate(
        &mut self,
        min: Duration,
        max: Duration,
        candidates: &[u32],
    ) -> Result<FaultResult, FaultError> {
        if candidates.is_empty() {
            return Err(FaultError::EmptyCandidates);
        }
        if max < min {
            return Err(FaultError::InvertedBounds { min, max });
        }

        let nanos = self.rng.gen_range(as_nanos(min)..=as_nanos(max));
        let code = *candidates
            .choose(&mut self.rng)
            .ok_or(FaultError::EmptyCandidates)?;

        Ok(FaultResult {
            delay: Duration::from_nanos(nanos),
            code,
        })
    }

    /// Draws using the bounds and candidates carried by `request`.
    pub fn generate_for(&mut self, request: &FaultRequest) -> Result<FaultResult, FaultError> {
        self.generate(request.min_delay(), request.max_delay(), &request.status_codes)
    }
}

// Saturates at roughly 584 years.
fn as_nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

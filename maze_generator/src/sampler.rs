// sampler.rs - Rejection sampling of mazes by solution-path ratio
//
// Each attempt draws a fresh seed and regenerates from scratch. The loop
// state is only the seed source and the running ratio statistics; attempts
// share nothing else.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{MazeError, Result};
use crate::lattice::Lattice;
use crate::topology::Maze;

pub const DEFAULT_PROGRESS_INTERVAL: u64 = 500;

/// Anything the sampler can judge by its path ratio.
pub trait Candidate {
    fn path_ratio(&self) -> f64;
}

impl Candidate for Maze {
    fn path_ratio(&self) -> f64 {
        Maze::path_ratio(self)
    }
}

/// Open tolerance band `(desired - epsilon, desired + epsilon)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AcceptanceCriteria {
    desired_ratio: f64,
    epsilon: f64,
}

impl AcceptanceCriteria {
    pub fn new(desired_ratio: f64, epsilon: f64) -> Result<Self> {
        if !desired_ratio.is_finite() || desired_ratio <= 0.0 || desired_ratio > 1.0 {
            return Err(MazeError::InvalidCriteria {
                reason: format!("desired ratio {desired_ratio} is outside (0, 1]"),
            });
        }
        if !epsilon.is_finite() || epsilon < 0.0 {
            return Err(MazeError::InvalidCriteria {
                reason: format!("epsilon {epsilon} must be finite and non-negative"),
            });
        }
        Ok(Self {
            desired_ratio,
            epsilon,
        })
    }

    #[inline]
    pub fn desired_ratio(&self) -> f64 {
        self.desired_ratio
    }

    #[inline]
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Strict on both sides: a ratio exactly on the band edge is rejected.
    #[inline]
    pub fn accepts(&self, ratio: f64) -> bool {
        ratio > self.desired_ratio - self.epsilon && ratio < self.desired_ratio + self.epsilon
    }
}

/// Knobs for the sampling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Give up with [`MazeError::TargetUnreachable`] after this many attempts.
    /// `None` loops until a maze is accepted, however long that takes.
    pub max_attempts: Option<u64>,
    /// Seed for the seed stream. `None` draws attempt seeds from OS entropy.
    pub base_seed: Option<u64>,
    /// Log progress every this many attempts (0 disables).
    pub progress_interval: u64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            max_attempts: None,
            base_seed: None,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

/// Ratios seen so far. Starts at `lowest = 1`, `highest = 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatioStats {
    pub attempts: u64,
    pub lowest: f64,
    pub highest: f64,
    pub last: f64,
}

impl Default for RatioStats {
    fn default() -> Self {
        Self {
            attempts: 0,
            lowest: 1.0,
            highest: 0.0,
            last: 0.0,
        }
    }
}

impl RatioStats {
    pub fn record(&mut self, ratio: f64) {
        self.attempts += 1;
        self.last = ratio;
        self.lowest = self.lowest.min(ratio);
        self.highest = self.highest.max(ratio);
    }
}

/// Result of a successful sampling run.
#[derive(Debug, Clone)]
pub struct Accepted<T> {
    pub candidate: T,
    pub seed: u64,
    pub stats: RatioStats,
}

#[derive(Debug, Clone)]
pub struct AcceptanceSampler {
    criteria: AcceptanceCriteria,
    config: SamplerConfig,
    label: String,
}

impl AcceptanceSampler {
    pub fn new(criteria: AcceptanceCriteria, config: SamplerConfig) -> Self {
        Self {
            criteria,
            config,
            label: String::from("maze"),
        }
    }

    /// Name used in log lines.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn criteria(&self) -> &AcceptanceCriteria {
        &self.criteria
    }

    /// Call `generate` with fresh seeds until its candidate's ratio is accepted.
    ///
    /// Attempt-local failures (see [`MazeError::is_attempt_local`]) are logged
    /// and retried; any other error ends the run.
    pub fn run<T, F>(&self, mut generate: F) -> Result<Accepted<T>>
    where
        T: Candidate,
        F: FnMut(u64) -> Result<T>,
    {
        let mut seeds = SeedStream::new(self.config.base_seed);
        let mut stats = RatioStats::default();
        let mut failures = 0u64;

        loop {
            if let Some(limit) = self.config.max_attempts {
                if stats.attempts + failures >= limit {
                    log::warn!(
                        "{}: giving up after {} attempts, highest = {:.4}, lowest = {:.4}",
                        self.label,
                        limit,
                        stats.highest,
                        stats.lowest
                    );
                    return Err(MazeError::TargetUnreachable {
                        attempts: limit,
                        lowest: stats.lowest,
                        highest: stats.highest,
                    });
                }
            }

            let seed = seeds.next_seed();
            let candidate = match generate(seed) {
                Ok(candidate) => candidate,
                Err(err) if err.is_attempt_local() => {
                    failures += 1;
                    log::warn!("{}: discarding attempt with seed {}: {}", self.label, seed, err);
                    continue;
                }
                Err(err) => return Err(err),
            };

            let ratio = candidate.path_ratio();
            stats.record(ratio);

            if self.criteria.accepts(ratio) {
                log::info!(
                    "{}: accepted path ratio {:.4} after {} attempts",
                    self.label,
                    ratio,
                    stats.attempts
                );
                return Ok(Accepted {
                    candidate,
                    seed,
                    stats,
                });
            }

            let interval = self.config.progress_interval;
            if interval > 0 && stats.attempts % interval == 0 {
                log::info!(
                    "{}: {} attempts, highest ratio = {:.4}, lowest ratio = {:.4}",
                    self.label,
                    stats.attempts,
                    stats.highest,
                    stats.lowest
                );
            }
        }
    }

    /// Sample mazes over a fixed lattice.
    pub fn sample_maze(&self, lattice: Arc<Lattice>) -> Result<Accepted<Maze>> {
        self.run(|seed| Maze::generate(Arc::clone(&lattice), seed))
    }
}

/// Source of per-attempt seeds.
enum SeedStream {
    Seeded(StdRng),
    Entropy,
}

impl SeedStream {
    fn new(base_seed: Option<u64>) -> Self {
        match base_seed {
            Some(seed) => SeedStream::Seeded(StdRng::seed_from_u64(seed)),
            None => SeedStream::Entropy,
        }
    }

    fn next_seed(&mut self) -> u64 {
        match self {
            SeedStream::Seeded(rng) => rng.gen(),
            SeedStream::Entropy => rand::thread_rng().gen(),
        }
    }
}

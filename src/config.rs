//! Run configuration and the errors raised while setting up a vessel.

use crate::molecule::*;
use thiserror::Error;

/// Anything wrong with the inputs to a vessel. These are always raised before the first step.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
pub enum ConfigError {
    #[error("no initial amount given for molecule {0:?}")]
    MissingAmount(MoleculeType),
    #[error("initial amount given twice for {0:?}")]
    DuplicateAmount(MoleculeType),
    #[error("initial amount given for undeclared molecule {0:?}")]
    UndeclaredAmount(MoleculeType),
    #[error("the initial population is empty")]
    EmptyPopulation,
    #[error("sample size {size} is outside of 1..={population}")]
    SampleSize { size: usize, population: usize },
    #[error("the number of steps must be positive")]
    ZeroSteps,
    #[error("the emission interval must be positive")]
    ZeroEmitInterval,
    #[error("reaction requires undeclared molecule {0:?}")]
    UndeclaredReactant(MoleculeType),
    #[error("reaction requires too many of molecule {0:?}")]
    RequirementOverflow(MoleculeType),
    #[error("reaction produces undeclared molecule {0:?}")]
    UndeclaredProduct(MoleculeType),
    #[error("rule {0} was built over a different registry")]
    ForeignRule(usize),
}

/// Parameters for a single run of a vessel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunConfig {
    /// Number of steps to simulate.
    pub total_steps: u64,
    /// Number of molecules drawn per step.
    pub sample_size: usize,
    /// Emit concentrations every this many steps. Has no effect on the dynamics.
    pub emit_every: u64,
}
impl Default for RunConfig {
    fn default() -> Self {
        Self {
            total_steps: 1000,
            sample_size: 2,
            emit_every: 1,
        }
    }
}
impl RunConfig {
    pub fn new(total_steps: u64, sample_size: usize, emit_every: u64) -> Self {
        Self {
            total_steps,
            sample_size,
            emit_every,
        }
    }

    /// Pairwise collisions for four sweeps of a population of `m`, reporting ten times per sweep.
    pub fn for_population(m: usize) -> Self {
        let m = m as u64;
        Self {
            total_steps: (4 * m).max(1),
            sample_size: 2,
            emit_every: (m / 10).max(1),
        }
    }

    pub fn with_total_steps(mut self, steps: u64) -> Self {
        self.total_steps = steps;
        self
    }
    pub fn with_sample_size(mut self, size: usize) -> Self {
        self.sample_size = size;
        self
    }
    pub fn with_emit_every(mut self, every: u64) -> Self {
        self.emit_every = every;
        self
    }

    /// Check this configuration against a population of `population` molecules.
    pub fn validate(&self, population: usize) -> Result<(), ConfigError> {
        if self.total_steps == 0 {
            return Err(ConfigError::ZeroSteps);
        }
        if self.emit_every == 0 {
            return Err(ConfigError::ZeroEmitInterval);
        }
        if self.sample_size == 0 || self.sample_size > population {
            return Err(ConfigError::SampleSize {
                size: self.sample_size,
                population,
            });
        }
        Ok(())
    }
}

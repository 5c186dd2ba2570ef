//! The reaction vessel: owns the population and drives the sample-match-replace loop.
//!
//! Each step draws `sample_size` molecules without replacement, tallies them, and looks up the
//! first rule in the table that can occur. If one does, its product overwrites a uniformly
//! random slot of the population, which need not be one of the sampled reactants. The number
//! of molecules never changes.

use crate::config::*;
use crate::counts::*;
use crate::molecule::*;
use crate::observe::Observer;
use crate::population::*;
use crate::reaction::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::{debug, info, instrument, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineState {
    /// Constructed, but no run has been configured
    Idle,
    Running,
    /// The configured number of steps has been taken. Terminal.
    Done,
}

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("cannot {op} a vessel that is {state:?}")]
    InvalidState {
        op: &'static str,
        state: EngineState,
    },
    #[error(transparent)]
    Sampling(#[from] SamplingRangeError),
    #[error(transparent)]
    Undeclared(#[from] UndeclaredMolecule),
}

/// What happened during a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepOutcome {
    /// Rule `rule` matched and `product` was written into `slot`.
    Reacted {
        rule: usize,
        product: MoleculeType,
        slot: usize,
    },
    /// No rule could occur with the sampled reactants; the population is unchanged.
    NoMatch,
}

/// A well-mixed, non-constructive reaction vessel.
#[derive(Debug)]
pub struct Vessel<R = ChaCha8Rng> {
    registry: Registry,
    rules: RuleTable,
    population: Population,
    rng: R,
    state: EngineState,
    config: Option<RunConfig>,
    steps: u64,
}
impl Vessel<ChaCha8Rng> {
    /// Create a vessel with a reproducible generator seeded from `seed`.
    pub fn seeded<I: IntoIterator<Item = (MoleculeType, usize)>>(
        registry: Registry,
        amounts: I,
        rules: RuleTable,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        Self::new(registry, amounts, rules, ChaCha8Rng::seed_from_u64(seed))
    }
}
impl<R: Rng> Vessel<R> {
    /// Create a vessel from the declared types, the initial amount of each, and the rules.
    ///
    /// Every rule must have been built over `registry`.
    pub fn new<I: IntoIterator<Item = (MoleculeType, usize)>>(
        registry: Registry,
        amounts: I,
        rules: RuleTable,
        rng: R,
    ) -> Result<Self, ConfigError> {
        for (i, rule) in rules.iter().enumerate() {
            if !rule.requirement().is_over(&registry) || !registry.contains(rule.product()) {
                return Err(ConfigError::ForeignRule(i));
            }
        }
        let population = Population::from_amounts(&registry, amounts)?;
        debug!(
            kinds = registry.len(),
            rules = rules.len(),
            size = population.len(),
            "created vessel"
        );
        Ok(Self {
            registry,
            rules,
            population,
            rng,
            state: EngineState::Idle,
            config: None,
            steps: 0,
        })
    }

    #[inline(always)]
    pub fn state(&self) -> EngineState {
        self.state
    }
    /// Number of steps taken in the current run
    #[inline(always)]
    pub fn steps_taken(&self) -> u64 {
        self.steps
    }
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }
    pub fn population(&self) -> &Population {
        &self.population
    }
    pub fn config(&self) -> Option<&RunConfig> {
        self.config.as_ref()
    }
    pub fn concentrations(&self) -> Concentrations {
        self.population.concentrations()
    }
    pub fn into_population(self) -> Population {
        self.population
    }

    /// Validate `config` and begin a run.
    pub fn start(&mut self, config: RunConfig) -> Result<(), SimError> {
        if self.state != EngineState::Idle {
            return Err(SimError::InvalidState {
                op: "start",
                state: self.state,
            });
        }
        config.validate(self.population.len())?;
        self.config = Some(config);
        self.state = EngineState::Running;
        debug!(?config, "vessel running");
        Ok(())
    }

    /// Take a single step: sample, match, and maybe replace.
    #[instrument(level = "trace", skip(self), fields(step = self.steps))]
    pub fn step(&mut self) -> Result<StepOutcome, SimError> {
        let config = match (self.state, self.config) {
            (EngineState::Running, Some(config)) => config,
            (state, _) => return Err(SimError::InvalidState { op: "step", state }),
        };
        let reactants = self
            .population
            .sample_without_replacement(&mut self.rng, config.sample_size)?;
        let counts = ReactantCounts::tally(&self.registry, reactants)?;
        trace!(?counts, "sampled reactants");
        let outcome = match self.rules.first_match_index(&counts) {
            Some((rule, r)) => {
                let product = r.product();
                let (slot, _) = self.population.replace_random_slot(&mut self.rng, product)?;
                trace!(rule, "reaction occurred");
                StepOutcome::Reacted {
                    rule,
                    product,
                    slot,
                }
            }
            None => {
                trace!("no rule matched");
                StepOutcome::NoMatch
            }
        };
        self.steps += 1;
        if self.steps >= config.total_steps {
            self.state = EngineState::Done;
            debug!(steps = self.steps, "vessel done");
        }
        Ok(outcome)
    }

    /// Start a run with `config` and step it to completion, reporting to `observer`.
    ///
    /// Concentrations are emitted for step 0, after every `emit_every`-th step, and after the
    /// final step. If the observer breaks, the run stops early and the vessel is left running;
    /// [`resume`](Self::resume) picks it back up. Returns the last snapshot taken.
    pub fn run<O: Observer + ?Sized>(
        &mut self,
        config: RunConfig,
        observer: &mut O,
    ) -> Result<Concentrations, SimError> {
        if self.state != EngineState::Idle {
            return Err(SimError::InvalidState {
                op: "run",
                state: self.state,
            });
        }
        self.start(config)?;
        info!(
            steps = config.total_steps,
            sample_size = config.sample_size,
            size = self.population.len(),
            "starting run"
        );
        let snapshot = self.population.concentrations();
        if observer.observe(0, &snapshot).is_break() {
            debug!(step = 0, "observer halted the run");
            return Ok(snapshot);
        }
        self.drive(config, snapshot, observer)
    }

    /// Continue a run that an observer halted, with the configuration it was started with.
    ///
    /// The step the run halted at is not emitted again.
    pub fn resume<O: Observer + ?Sized>(
        &mut self,
        observer: &mut O,
    ) -> Result<Concentrations, SimError> {
        let config = match (self.state, self.config) {
            (EngineState::Running, Some(config)) => config,
            (state, _) => return Err(SimError::InvalidState { op: "resume", state }),
        };
        info!(
            step = self.steps,
            steps = config.total_steps,
            "resuming run"
        );
        let snapshot = self.population.concentrations();
        self.drive(config, snapshot, observer)
    }

    fn drive<O: Observer + ?Sized>(
        &mut self,
        config: RunConfig,
        mut snapshot: Concentrations,
        observer: &mut O,
    ) -> Result<Concentrations, SimError> {
        while self.state == EngineState::Running {
            self.step()?;
            if self.steps % config.emit_every == 0 || self.state == EngineState::Done {
                snapshot = self.population.concentrations();
                if observer.observe(self.steps, &snapshot).is_break() {
                    debug!(step = self.steps, "observer halted the run");
                    return Ok(snapshot);
                }
            }
        }
        info!(concentrations = ?snapshot, "run complete");
        Ok(snapshot)
    }
}

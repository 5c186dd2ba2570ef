//! Ready-made vessel setups.

use crate::config::*;
use crate::engine::Vessel;
use crate::molecule::*;
use crate::reaction::*;
use itertools::iproduct;
use rand::Rng;

/// Everything needed to build a [`Vessel`].
#[derive(Debug)]
pub struct Scenario {
    pub registry: Registry,
    pub amounts: Vec<(MoleculeType, usize)>,
    pub rules: RuleTable,
}
impl Scenario {
    /// Two molecules, `A` and `B`, with `amount_each` of each. Every ordered pair of reactants
    /// gets a rule: two `B`s make an `A`, and anything else makes a `B`.
    pub fn basic(amount_each: usize) -> Self {
        let mut registry = Registry::new();
        let types = ["A", "B"].map(|name| {
            registry
                .declare(name)
                .unwrap_or_else(|_| unreachable!("a fresh registry has room for two types"))
        });
        let [a, b] = types;
        let rules = RuleTable::from_rules(iproduct!(types, types).map(|(x, y)| {
            let product = if x == b && y == b { a } else { b };
            ReactionRule::new(&registry, [(x, 1), (y, 1)], product)
                .unwrap_or_else(|_| unreachable!("rule types come from the registry"))
        }));
        Self {
            amounts: types.iter().map(|&ty| (ty, amount_each)).collect(),
            registry,
            rules,
        }
    }

    /// Number of molecules in the initial population
    pub fn total(&self) -> usize {
        self.amounts.iter().map(|&(_, n)| n).sum()
    }

    /// The run this scenario was designed for: see [`RunConfig::for_population`].
    pub fn default_config(&self) -> RunConfig {
        RunConfig::for_population(self.total())
    }

    pub fn into_vessel<R: Rng>(self, rng: R) -> Result<Vessel<R>, ConfigError> {
        Vessel::new(self.registry, self.amounts, self.rules, rng)
    }

    pub fn into_seeded(self, seed: u64) -> Result<Vessel, ConfigError> {
        Vessel::seeded(self.registry, self.amounts, self.rules, seed)
    }
}

//! Simulation of a well-mixed, non-constructive chemical reaction vessel.
//!
//! A fixed number of molecules, each of a declared [`MoleculeType`](molecule::MoleculeType),
//! sits in a [`Vessel`](engine::Vessel). Every step draws a few of them at random, finds the
//! first [`ReactionRule`](reaction::ReactionRule) they satisfy, and writes its product over a
//! random molecule. The population size never changes.
//!
//! ```
//! use vessel::prelude::*;
//!
//! let mut registry = Registry::new();
//! let a = registry.declare("A").unwrap();
//! let b = registry.declare("B").unwrap();
//! let rules = RuleTable::from_rules([rule!(registry, "A + B -> A"), rule!(registry, "-> B")]);
//! let mut vessel = Vessel::seeded(registry, [(a, 50), (b, 50)], rules, 7).unwrap();
//! let mut trajectory = Trajectory::new();
//! let last = vessel.run(RunConfig::new(400, 2, 10), &mut trajectory).unwrap();
//! assert!((last.sum() - 100.0).abs() < 1e-9);
//! ```
pub mod config;
pub mod counts;
pub mod engine;
pub mod molecule;
pub mod observe;
pub mod population;
pub mod reaction;
pub mod scenario;

pub mod prelude {
    pub use crate::config::*;
    pub use crate::counts::*;
    pub use crate::engine::*;
    pub use crate::molecule::*;
    pub use crate::observe::*;
    pub use crate::population::*;
    pub use crate::reaction::*;
    pub use crate::rule;
    pub use crate::scenario::*;
}

#[cfg(test)]
mod tests;

//! The fixed-size multiset of molecules inside a vessel.

use crate::config::ConfigError;
use crate::counts::*;
use crate::molecule::*;
use rand::Rng;
use smallvec::SmallVec;
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[error("cannot sample {requested} molecules from a population of {available}")]
pub struct SamplingRangeError {
    pub requested: usize,
    pub available: usize,
}

/// Every molecule in the vessel, one slot each. The number of slots never changes after
/// construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Population {
    registry: RegistryId,
    kinds: usize,
    slots: Vec<MoleculeType>,
}
impl Population {
    /// Lay out the initial amounts in declaration order. Every declared type needs exactly one
    /// amount, which may be zero, and the total must be positive.
    pub fn from_amounts<I: IntoIterator<Item = (MoleculeType, usize)>>(
        registry: &Registry,
        amounts: I,
    ) -> Result<Self, ConfigError> {
        let mut given = SmallVec::<Option<usize>, 8>::from_elem(None, registry.len());
        for (ty, amount) in amounts {
            if !registry.contains(ty) {
                return Err(ConfigError::UndeclaredAmount(ty));
            }
            let slot = &mut given[ty.index()];
            if slot.is_some() {
                return Err(ConfigError::DuplicateAmount(ty));
            }
            *slot = Some(amount);
        }
        let mut slots = Vec::new();
        for (ty, amount) in registry.types().zip(given) {
            let Some(amount) = amount else {
                return Err(ConfigError::MissingAmount(ty));
            };
            slots.extend(std::iter::repeat(ty).take(amount));
        }
        if slots.is_empty() {
            return Err(ConfigError::EmptyPopulation);
        }
        Ok(Self {
            registry: registry.id(),
            kinds: registry.len(),
            slots,
        })
    }

    /// Number of molecules, `M`.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.slots.len()
    }
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
    pub fn get(&self, idx: usize) -> Option<MoleculeType> {
        self.slots.get(idx).copied()
    }
    pub fn as_slice(&self) -> &[MoleculeType] {
        &self.slots
    }

    /// Draw `k` distinct slots uniformly at random and return the molecules in them.
    pub fn sample_without_replacement<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        k: usize,
    ) -> Result<Vec<MoleculeType>, SamplingRangeError> {
        if k > self.slots.len() {
            return Err(SamplingRangeError {
                requested: k,
                available: self.slots.len(),
            });
        }
        let picked = rand::seq::index::sample(rng, self.slots.len(), k);
        Ok(picked.into_iter().map(|i| self.slots[i]).collect())
    }

    /// Overwrite one uniformly chosen slot with `value`, returning the slot and its old
    /// molecule. The slot is independent of any earlier sample.
    pub fn replace_random_slot<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        value: MoleculeType,
    ) -> Result<(usize, MoleculeType), UndeclaredMolecule> {
        if value.registry() != self.registry || value.index() >= self.kinds {
            return Err(UndeclaredMolecule(value));
        }
        let idx = rng.gen_range(0..self.slots.len());
        let old = std::mem::replace(&mut self.slots[idx], value);
        trace!(slot = idx, ?old, new = ?value, "replaced molecule");
        Ok((idx, old))
    }

    /// Count of each declared type across the whole population.
    pub fn amounts(&self) -> ReactantCounts {
        let mut out = ReactantCounts::zeroed_raw(self.registry, self.kinds);
        for &mol in &self.slots {
            out.increment(mol.index());
        }
        out
    }

    pub fn concentrations(&self) -> Concentrations {
        Concentrations::from_counts(&self.amounts())
    }
}

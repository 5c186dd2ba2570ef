//! Per-type tallies and concentrations over a [`Registry`].

use crate::molecule::*;
use smallvec::SmallVec;
use std::fmt::{self, Debug, Formatter};
use thiserror::Error;

/// Inline capacity for per-type arrays. Scenarios rarely have more kinds than this.
const INLINE_TYPES: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[error("molecule {0:?} was not declared in this registry")]
pub struct UndeclaredMolecule(pub MoleculeType);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum CountError {
    #[error(transparent)]
    Undeclared(#[from] UndeclaredMolecule),
    #[error("count of {0:?} overflowed")]
    Overflow(MoleculeType),
}

/// A count for every declared molecule type.
///
/// The backing array always has exactly one entry per declared type, so lookups of a declared
/// type never miss.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ReactantCounts {
    registry: RegistryId,
    counts: SmallVec<usize, INLINE_TYPES>,
}
impl ReactantCounts {
    /// All-zero counts over every type in `registry`.
    pub fn zeroed(registry: &Registry) -> Self {
        Self::zeroed_raw(registry.id(), registry.len())
    }
    pub(crate) fn zeroed_raw(registry: RegistryId, kinds: usize) -> Self {
        Self {
            registry,
            counts: SmallVec::from_elem(0, kinds),
        }
    }

    /// Count how many of each declared type appear in `sample`. Types missing from the sample
    /// map to zero.
    pub fn tally<I: IntoIterator<Item = MoleculeType>>(
        registry: &Registry,
        sample: I,
    ) -> Result<Self, UndeclaredMolecule> {
        let mut out = Self::zeroed(registry);
        for mol in sample {
            // a sample can't hold more than `usize::MAX` molecules
            *out.slot_mut(mol)? += 1;
        }
        Ok(out)
    }

    pub fn get(&self, ty: MoleculeType) -> Option<usize> {
        if ty.registry() == self.registry {
            self.counts.get(ty.index()).copied()
        } else {
            None
        }
    }
    pub fn set(&mut self, ty: MoleculeType, count: usize) -> Result<(), UndeclaredMolecule> {
        *self.slot_mut(ty)? = count;
        Ok(())
    }
    /// Add `count` to the entry for `ty`, failing instead of wrapping on overflow.
    pub fn add(&mut self, ty: MoleculeType, count: usize) -> Result<(), CountError> {
        let slot = self.slot_mut(ty)?;
        *slot = slot.checked_add(count).ok_or(CountError::Overflow(ty))?;
        Ok(())
    }
    /// Bump the entry at a dense index known to be in range.
    #[inline(always)]
    pub(crate) fn increment(&mut self, index: usize) {
        self.counts[index] += 1;
    }
    fn slot_mut(&mut self, ty: MoleculeType) -> Result<&mut usize, UndeclaredMolecule> {
        if ty.registry() != self.registry {
            return Err(UndeclaredMolecule(ty));
        }
        self.counts
            .get_mut(ty.index())
            .ok_or(UndeclaredMolecule(ty))
    }

    /// Sum of all counts, saturating at `usize::MAX`.
    pub fn total(&self) -> usize {
        self.counts
            .iter()
            .fold(0usize, |acc, &c| acc.saturating_add(c))
    }
    /// Sum of all counts, or `None` if it doesn't fit in a `usize`.
    pub fn checked_total(&self) -> Option<usize> {
        self.counts
            .iter()
            .try_fold(0usize, |acc, &c| acc.checked_add(c))
    }

    #[inline(always)]
    pub fn registry(&self) -> RegistryId {
        self.registry
    }

    /// Number of declared types covered, which is also the number of entries.
    #[inline(always)]
    pub fn kinds(&self) -> usize {
        self.counts.len()
    }

    /// Check if these counts cover exactly the types of `registry`.
    pub fn is_over(&self, registry: &Registry) -> bool {
        self.registry == registry.id() && self.counts.len() == registry.len()
    }

    pub(crate) fn as_slice(&self) -> &[usize] {
        self.counts.as_slice()
    }

    /// `(type, count)` pairs in declaration order, including zero entries.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (MoleculeType, usize)> + '_ {
        let registry = self.registry;
        self.counts
            .iter()
            .enumerate()
            .map(move |(i, &c)| (MoleculeType::from_raw(registry, i), c))
    }
}
impl Debug for ReactantCounts {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.counts.iter().enumerate())
            .finish()
    }
}

/// Percentage of the population held by each declared type.
#[derive(Clone, PartialEq)]
pub struct Concentrations {
    registry: RegistryId,
    values: SmallVec<f64, INLINE_TYPES>,
}
impl Concentrations {
    /// Convert counts to percentages of their total. An empty tally gives all zeros.
    pub fn from_counts(counts: &ReactantCounts) -> Self {
        let total = counts.total();
        let values = counts
            .as_slice()
            .iter()
            .map(|&c| {
                if total == 0 {
                    0.0
                } else {
                    c as f64 * 100.0 / total as f64
                }
            })
            .collect();
        Self {
            registry: counts.registry,
            values,
        }
    }

    pub fn get(&self, ty: MoleculeType) -> Option<f64> {
        if ty.registry() == self.registry {
            self.values.get(ty.index()).copied()
        } else {
            None
        }
    }

    /// Sum of all percentages; 100 for any non-empty population, up to rounding.
    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }

    #[inline(always)]
    pub fn kinds(&self) -> usize {
        self.values.len()
    }

    pub fn values(&self) -> &[f64] {
        self.values.as_slice()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = (MoleculeType, f64)> + '_ {
        let registry = self.registry;
        self.values
            .iter()
            .enumerate()
            .map(move |(i, &v)| (MoleculeType::from_raw(registry, i), v))
    }
}
impl Debug for Concentrations {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.values.iter().enumerate())
            .finish()
    }
}

//! Molecule types and the registry that declares them.
//!
//! A [`MoleculeType`] is a small `Copy` handle: the index it was assigned at declaration time,
//! tagged with the identity of the [`Registry`] that declared it. Counts and concentrations are
//! dense arrays indexed by that number, so every declared type always has a slot.

use std::fmt::{self, Debug, Formatter};
use std::sync::atomic::{AtomicU32, Ordering};
use thiserror::Error;

static NEXT_REGISTRY: AtomicU32 = AtomicU32::new(0);

/// Identity of a [`Registry`]. Unique for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegistryId(u32);
impl RegistryId {
    fn fresh() -> Self {
        Self(NEXT_REGISTRY.fetch_add(1, Ordering::Relaxed))
    }
}

/// A declared kind of molecule.
///
/// Equality is identity: two handles are equal only if they came from the same call to
/// [`Registry::declare`], regardless of their names.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MoleculeType {
    registry: RegistryId,
    index: u16,
}
impl MoleculeType {
    #[inline(always)]
    pub(crate) fn from_raw(registry: RegistryId, index: usize) -> Self {
        debug_assert!(index < u16::MAX as usize, "molecule index {index} out of range");
        Self {
            registry,
            index: index as u16,
        }
    }
    /// Dense index of this type within its registry.
    #[inline(always)]
    pub fn index(self) -> usize {
        self.index as usize
    }
    #[inline(always)]
    pub fn registry(self) -> RegistryId {
        self.registry
    }
}
impl Debug for MoleculeType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "MoleculeType({}@{})", self.index, self.registry.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[error("too many molecule types: the limit is {}", u16::MAX)]
pub struct RegistryFull;

/// The closed set of molecule types taking part in a simulation.
///
/// Not `Clone`, since a clone could hand out handles equal to the original's.
#[derive(Debug)]
pub struct Registry {
    id: RegistryId,
    names: Vec<String>,
}
impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
impl Registry {
    pub fn new() -> Self {
        Self {
            id: RegistryId::fresh(),
            names: Vec::new(),
        }
    }

    #[inline(always)]
    pub fn id(&self) -> RegistryId {
        self.id
    }

    /// Declare a new, distinct molecule type. Names are labels only and may repeat.
    pub fn declare(&mut self, name: impl Into<String>) -> Result<MoleculeType, RegistryFull> {
        let index = u16::try_from(self.names.len())
            .ok()
            .filter(|&i| i < u16::MAX)
            .ok_or(RegistryFull)?;
        self.names.push(name.into());
        Ok(MoleculeType {
            registry: self.id,
            index,
        })
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.names.len()
    }
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Check if `ty` was declared by this registry
    pub fn contains(&self, ty: MoleculeType) -> bool {
        ty.registry == self.id && ty.index() < self.names.len()
    }

    pub fn name(&self, ty: MoleculeType) -> Option<&str> {
        if ty.registry == self.id {
            self.names.get(ty.index()).map(String::as_str)
        } else {
            None
        }
    }

    /// Find the first type declared with the given name.
    pub fn lookup(&self, name: &str) -> Option<MoleculeType> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| MoleculeType::from_raw(self.id, i))
    }

    /// All declared types, in declaration order.
    pub fn types(&self) -> impl ExactSizeIterator<Item = MoleculeType> + '_ {
        let registry = self.id;
        (0..self.names.len()).map(move |i| MoleculeType::from_raw(registry, i))
    }

    pub fn names(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.names.iter().map(String::as_str)
    }
}

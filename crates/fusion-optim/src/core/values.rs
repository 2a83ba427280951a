//! Variable identifiers and the assignment store boundary.

use std::fmt;

use fusion_algebra::{BlockVector, EuclideanVector};

use super::factor::{FactorError, FactorResult};

/// Identifier of a variable in an assignment store.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct VariableId(usize);

impl VariableId {
    /// Create an identifier from a raw index.
    #[inline]
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// The raw index.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Read access to the current value of each variable.
///
/// Linearization only reads from the assignment, so implementations are shared across the
/// worker threads of a batch linearization.
pub trait Assignment: Sync {
    /// The current value of variable `id`, if it exists.
    fn get(&self, id: VariableId) -> Option<&[f64]>;
}

/// A minimal assignment store: variables are Euclidean and indexed by insertion order.
#[derive(Debug, Clone, Default)]
pub struct Values {
    storage: Vec<Vec<f64>>,
}

impl Values {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable and return its identifier.
    pub fn insert(&mut self, value: Vec<f64>) -> VariableId {
        self.storage.push(value);
        VariableId(self.storage.len() - 1)
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Whether the store holds no variables.
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Overwrite the value of `id`.
    pub fn set(&mut self, id: VariableId, value: Vec<f64>) -> FactorResult<()> {
        let slot = self
            .storage
            .get_mut(id.0)
            .ok_or(FactorError::VariableNotFound(id))?;
        if slot.len() != value.len() {
            return Err(FactorError::DimensionMismatch {
                expected: slot.len(),
                actual: value.len(),
            });
        }
        *slot = value;
        Ok(())
    }

    /// Apply an increment to the variables in `edges`, block `i` moving `edges[i]`.
    ///
    /// The store is left untouched if any block does not fit its variable.
    pub fn move_along(&mut self, edges: &[VariableId], delta: &BlockVector) -> FactorResult<()> {
        if edges.len() != delta.num_blocks() {
            return Err(FactorError::DimensionMismatch {
                expected: edges.len(),
                actual: delta.num_blocks(),
            });
        }

        for (id, block) in edges.iter().zip(delta.blocks()) {
            let slot = self
                .storage
                .get(id.0)
                .ok_or(FactorError::VariableNotFound(*id))?;
            if slot.len() != block.dimension() {
                return Err(FactorError::DimensionMismatch {
                    expected: slot.len(),
                    actual: block.dimension(),
                });
            }
        }

        for (id, block) in edges.iter().zip(delta.blocks()) {
            for (v, d) in self.storage[id.0].iter_mut().zip(block.iter()) {
                *v += d;
            }
        }

        Ok(())
    }
}

impl Assignment for Values {
    fn get(&self, id: VariableId) -> Option<&[f64]> {
        self.storage.get(id.0).map(Vec::as_slice)
    }
}

//! Per-variable increments.

use crate::{AlgebraError, DVecF64, EuclideanVector};

/// A vector split into consecutive blocks, one per adjacent variable of a factor.
///
/// This is the input (tangent) space of a linearized factor: block `i` is the increment of the
/// factor's `i`-th variable, in edge order. Flattening concatenates the blocks in that order.
///
/// Arithmetic between block vectors with different layouts is a programming error and panics.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlockVector {
    blocks: Vec<DVecF64>,
}

impl BlockVector {
    /// Create a block vector from its blocks.
    pub fn new(blocks: Vec<DVecF64>) -> Self {
        Self { blocks }
    }

    /// Create a zero block vector with the given block dimensions.
    pub fn zeros(dims: &[usize]) -> Self {
        Self {
            blocks: dims.iter().map(|&d| DVecF64::zeros(d)).collect(),
        }
    }

    /// Split a flat vector into blocks of the given dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`AlgebraError::ShapeMismatch`] if `flat.len()` differs from the sum of `dims`.
    pub fn from_flat(flat: &DVecF64, dims: &[usize]) -> Result<Self, AlgebraError> {
        let total: usize = dims.iter().sum();
        if flat.len() != total {
            return Err(AlgebraError::ShapeMismatch {
                expected: total,
                actual: flat.len(),
            });
        }

        let mut offset = 0;
        let blocks = dims
            .iter()
            .map(|&d| {
                let block = flat.rows(offset, d).into_owned();
                offset += d;
                block
            })
            .collect();

        Ok(Self { blocks })
    }

    /// Concatenate the blocks into one flat vector.
    pub fn to_flat(&self) -> DVecF64 {
        DVecF64::from_iterator(
            self.dimension(),
            self.blocks.iter().flat_map(|b| b.iter().copied()),
        )
    }

    /// Dimensions of each block.
    pub fn dims(&self) -> Vec<usize> {
        self.blocks.iter().map(|b| b.len()).collect()
    }

    /// Number of blocks.
    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// Block `i`, if present.
    pub fn block(&self, i: usize) -> Option<&DVecF64> {
        self.blocks.get(i)
    }

    /// All blocks, in order.
    pub fn blocks(&self) -> &[DVecF64] {
        &self.blocks
    }

    /// Consume `self` and return the blocks.
    pub fn into_blocks(self) -> Vec<DVecF64> {
        self.blocks
    }

    fn zip_with(self, rhs: Self, f: impl Fn(DVecF64, DVecF64) -> DVecF64) -> Self {
        assert_eq!(
            self.blocks.len(),
            rhs.blocks.len(),
            "BlockVector block count mismatch"
        );
        Self {
            blocks: self
                .blocks
                .into_iter()
                .zip(rhs.blocks)
                .map(|(a, b)| f(a, b))
                .collect(),
        }
    }
}

impl std::ops::Add for BlockVector {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        self.zip_with(rhs, |a, b| a + b)
    }
}

impl std::ops::Sub for BlockVector {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        self.zip_with(rhs, |a, b| a - b)
    }
}

impl EuclideanVector for BlockVector {
    fn dot(&self, other: &Self) -> f64 {
        assert_eq!(
            self.blocks.len(),
            other.blocks.len(),
            "BlockVector block count mismatch"
        );
        self.blocks
            .iter()
            .zip(&other.blocks)
            .map(|(a, b)| a.dot(b))
            .sum()
    }

    fn scaled(&self, scalar: f64) -> Self {
        Self {
            blocks: self.blocks.iter().map(|b| b.scale(scalar)).collect(),
        }
    }

    fn dimension(&self) -> usize {
        self.blocks.iter().map(|b| b.len()).sum()
    }

    fn move_along(&mut self, direction: &Self) {
        assert_eq!(
            self.blocks.len(),
            direction.blocks.len(),
            "BlockVector block count mismatch"
        );
        for (a, b) in self.blocks.iter_mut().zip(&direction.blocks) {
            *a += b;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_round_trip() -> Result<(), AlgebraError> {
        let flat = DVecF64::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        let blocks = BlockVector::from_flat(&flat, &[3, 2])?;
        assert_eq!(blocks.num_blocks(), 2);
        assert_eq!(blocks.dims(), vec![3, 2]);
        assert_eq!(
            blocks.block(1),
            Some(&DVecF64::from_vec(vec![4.0, 5.0]))
        );
        assert_eq!(blocks.to_flat(), flat);
        Ok(())
    }

    #[test]
    fn test_from_flat_shape_mismatch() {
        let flat = DVecF64::from_vec(vec![1.0, 2.0, 3.0]);
        assert_eq!(
            BlockVector::from_flat(&flat, &[3, 2]),
            Err(AlgebraError::ShapeMismatch {
                expected: 5,
                actual: 3
            })
        );
    }

    #[test]
    fn test_euclidean_ops() {
        let a = BlockVector::new(vec![
            DVecF64::from_vec(vec![1.0, 2.0]),
            DVecF64::from_vec(vec![3.0]),
        ]);
        let b = BlockVector::new(vec![
            DVecF64::from_vec(vec![1.0, -1.0]),
            DVecF64::from_vec(vec![2.0]),
        ]);
        assert_eq!(a.dot(&b), 5.0);
        assert_eq!(a.squared_norm(), 14.0);
        assert_eq!(a.dimension(), 3);
        assert_eq!(
            (a.clone() + b.clone()).to_flat(),
            DVecF64::from_vec(vec![2.0, 1.0, 5.0])
        );
        assert_eq!(
            (a.clone() - b.scaled(2.0)).to_flat(),
            DVecF64::from_vec(vec![-1.0, 4.0, -1.0])
        );

        let mut c = BlockVector::zeros(&[2, 1]);
        c.move_along(&a);
        assert_eq!(c, a);
    }

    #[test]
    #[should_panic(expected = "block count mismatch")]
    fn test_layout_mismatch_panics() {
        let a = BlockVector::zeros(&[2, 1]);
        let b = BlockVector::zeros(&[3]);
        let _ = a + b;
    }
}

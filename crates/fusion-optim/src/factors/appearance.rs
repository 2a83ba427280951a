//! Target tracking with a PPCA appearance model.
//!
//! The factor connects a target's pose in an image with the latent code of a probabilistic PCA
//! model of its appearance. The error is the difference between the appearance the model
//! generates and the patch cropped from the image at the pose.

use std::sync::Arc;

use fusion_algebra::{DMatF64, DVecF64, FixedSizeVector, Vector3, Vector5};

use crate::core::{check_values, FactorError, FactorResult, NonlinearFactor, VariableId};

/// Tangent dimension of the pose variable (x, y, θ).
pub const POSE_DIM: usize = 3;

/// Dimension of the PPCA latent code.
pub const LATENT_DIM: usize = 5;

/// Crops oriented patches out of an image.
///
/// Patches are flattened row-major. `center` holds the patch center and orientation as
/// `(x, y, θ)`.
pub trait PatchSource: Send + Sync {
    /// The `rows x cols` patch at `center`.
    fn patch(&self, center: &Vector3, rows: usize, cols: usize) -> FactorResult<DVecF64>;

    /// The patch at `center` and its Jacobian with respect to `center`, of shape
    /// `rows * cols x 3`.
    fn patch_with_jacobian(
        &self,
        center: &Vector3,
        rows: usize,
        cols: usize,
    ) -> FactorResult<(DVecF64, DMatF64)>;
}

impl<T: PatchSource + ?Sized> PatchSource for Arc<T> {
    fn patch(&self, center: &Vector3, rows: usize, cols: usize) -> FactorResult<DVecF64> {
        (**self).patch(center, rows, cols)
    }

    fn patch_with_jacobian(
        &self,
        center: &Vector3,
        rows: usize,
        cols: usize,
    ) -> FactorResult<(DVecF64, DMatF64)> {
        (**self).patch_with_jacobian(center, rows, cols)
    }
}

/// A factor over a target's pose and the PPCA latent code of its appearance.
///
/// Error: `(mu + W latent) - patch(pose)`.
///
/// Linearizes with its own Jacobian `[-∂patch/∂pose, W]` instead of numerical differentiation.
#[derive(Debug, Clone)]
pub struct PpcaTrackingFactor<S> {
    edges: [VariableId; 2],
    source: S,
    w: DMatF64,
    mu: DVecF64,
    rows: usize,
    cols: usize,
}

impl<S: PatchSource> PpcaTrackingFactor<S> {
    /// Create a factor.
    ///
    /// # Arguments
    ///
    /// * `pose_id` - The pose variable (3 scalars).
    /// * `latent_id` - The latent code variable (5 scalars).
    /// * `source` - The image patches are cropped from.
    /// * `w` - PPCA weight matrix, of shape `rows * cols x 5`.
    /// * `mu` - PPCA mean patch, flattened row-major.
    /// * `rows`, `cols` - Size of the tracked patch.
    ///
    /// # Errors
    ///
    /// Fails if `mu` does not hold `rows * cols` scalars or `w` is not `mu.len() x 5`.
    pub fn new(
        pose_id: VariableId,
        latent_id: VariableId,
        source: S,
        w: DMatF64,
        mu: DVecF64,
        rows: usize,
        cols: usize,
    ) -> FactorResult<Self> {
        if mu.len() != rows * cols {
            return Err(FactorError::DimensionMismatch {
                expected: rows * cols,
                actual: mu.len(),
            });
        }
        if w.shape() != (mu.len(), LATENT_DIM) {
            return Err(FactorError::ShapeMismatch {
                expected: (mu.len(), LATENT_DIM),
                actual: w.shape(),
            });
        }

        Ok(Self {
            edges: [pose_id, latent_id],
            source,
            w,
            mu,
            rows,
            cols,
        })
    }

    /// The appearance generated by the PPCA model for `latent`.
    pub fn generated_appearance(&self, latent: &Vector5) -> DVecF64 {
        &self.mu + &self.w * DVecF64::from_column_slice(&latent.to_array())
    }

    /// Size of the tracked patch as `(rows, cols)`.
    pub fn patch_size(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    fn unpack(&self, values: &[&[f64]]) -> FactorResult<(Vector3, Vector5)> {
        check_values(values, &[POSE_DIM, LATENT_DIM])?;
        Ok((
            Vector3::from_scalars(values[0])?,
            Vector5::from_scalars(values[1])?,
        ))
    }

    fn custom_jacobian(&self, values: &[&[f64]]) -> FactorResult<Vec<DMatF64>> {
        let (pose, _) = self.unpack(values)?;
        let (_, patch_h_pose) = self
            .source
            .patch_with_jacobian(&pose, self.rows, self.cols)?;

        let expected = (self.mu.len(), POSE_DIM);
        if patch_h_pose.shape() != expected {
            return Err(FactorError::ShapeMismatch {
                expected,
                actual: patch_h_pose.shape(),
            });
        }

        Ok(vec![-patch_h_pose, self.w.clone()])
    }
}

impl<S: PatchSource> NonlinearFactor for PpcaTrackingFactor<S> {
    fn edges(&self) -> &[VariableId] {
        &self.edges
    }

    fn variable_dims(&self) -> Vec<usize> {
        vec![POSE_DIM, LATENT_DIM]
    }

    fn residual_dim(&self) -> usize {
        self.mu.len()
    }

    fn error_vector(&self, values: &[&[f64]]) -> FactorResult<DVecF64> {
        let (pose, latent) = self.unpack(values)?;
        let patch = self.source.patch(&pose, self.rows, self.cols)?;
        if patch.len() != self.mu.len() {
            return Err(FactorError::DimensionMismatch {
                expected: self.mu.len(),
                actual: patch.len(),
            });
        }
        Ok(self.generated_appearance(&latent) - patch)
    }

    fn jacobian(&self, values: &[&[f64]]) -> Option<FactorResult<Vec<DMatF64>>> {
        Some(self.custom_jacobian(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Assignment, GaussianFactor, Values};
    use crate::linearization::{CentralDifference, Differentiator, Linearizer};
    use crate::solvers::{Cgls, CglsState};
    use approx::assert_abs_diff_eq;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    const ROWS: usize = 4;
    const COLS: usize = 4;

    fn random_matrix(rng: &mut StdRng, rows: usize, cols: usize) -> DMatF64 {
        DMatF64::from_fn(rows, cols, |_, _| rng.random_range(-1.0..1.0))
    }

    fn random_vector(rng: &mut StdRng, n: usize) -> DVecF64 {
        DVecF64::from_fn(n, |_, _| rng.random_range(-1.0..1.0))
    }

    fn pose_vector(center: &Vector3) -> DVecF64 {
        DVecF64::from_column_slice(&center.to_array())
    }

    /// Pixel k of the patch is `sin(a_k · center + c_k)`.
    struct SineImage {
        a: DMatF64,
        c: DVecF64,
    }

    impl PatchSource for SineImage {
        fn patch(&self, center: &Vector3, _rows: usize, _cols: usize) -> FactorResult<DVecF64> {
            Ok((&self.a * pose_vector(center) + &self.c).map(f64::sin))
        }

        fn patch_with_jacobian(
            &self,
            center: &Vector3,
            rows: usize,
            cols: usize,
        ) -> FactorResult<(DVecF64, DMatF64)> {
            let phase = &self.a * pose_vector(center) + &self.c;
            let mut jacobian = self.a.clone();
            for (k, mut row) in jacobian.row_iter_mut().enumerate() {
                row *= phase[k].cos();
            }
            Ok((self.patch(center, rows, cols)?, jacobian))
        }
    }

    /// The patch is `base + G · center`.
    struct LinearImage {
        base: DVecF64,
        g: DMatF64,
    }

    impl PatchSource for LinearImage {
        fn patch(&self, center: &Vector3, _rows: usize, _cols: usize) -> FactorResult<DVecF64> {
            Ok(&self.base + &self.g * pose_vector(center))
        }

        fn patch_with_jacobian(
            &self,
            center: &Vector3,
            rows: usize,
            cols: usize,
        ) -> FactorResult<(DVecF64, DMatF64)> {
            Ok((self.patch(center, rows, cols)?, self.g.clone()))
        }
    }

    struct OutOfBounds;

    impl PatchSource for OutOfBounds {
        fn patch(&self, center: &Vector3, _rows: usize, _cols: usize) -> FactorResult<DVecF64> {
            Err(FactorError::PatchFailed(format!(
                "center ({}, {}) outside image",
                center.x, center.y
            )))
        }

        fn patch_with_jacobian(
            &self,
            center: &Vector3,
            rows: usize,
            cols: usize,
        ) -> FactorResult<(DVecF64, DMatF64)> {
            Err(self.patch(center, rows, cols).unwrap_err())
        }
    }

    #[test]
    fn test_new_validates_shapes() {
        let ids = (VariableId::new(0), VariableId::new(1));
        let n = ROWS * COLS;

        let ok = PpcaTrackingFactor::new(
            ids.0,
            ids.1,
            OutOfBounds,
            DMatF64::zeros(n, LATENT_DIM),
            DVecF64::zeros(n),
            ROWS,
            COLS,
        );
        assert!(ok.is_ok());

        let bad_w = PpcaTrackingFactor::new(
            ids.0,
            ids.1,
            OutOfBounds,
            DMatF64::zeros(n, 4),
            DVecF64::zeros(n),
            ROWS,
            COLS,
        );
        assert!(matches!(bad_w, Err(FactorError::ShapeMismatch { .. })));

        let bad_mu = PpcaTrackingFactor::new(
            ids.0,
            ids.1,
            OutOfBounds,
            DMatF64::zeros(n, LATENT_DIM),
            DVecF64::zeros(n - 1),
            ROWS,
            COLS,
        );
        assert!(matches!(
            bad_mu,
            Err(FactorError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_custom_jacobian_matches_numeric() -> FactorResult<()> {
        let mut rng = StdRng::seed_from_u64(17);
        let n = ROWS * COLS;
        let image = SineImage {
            a: random_matrix(&mut rng, n, POSE_DIM),
            c: random_vector(&mut rng, n),
        };
        let factor = PpcaTrackingFactor::new(
            VariableId::new(0),
            VariableId::new(1),
            image,
            random_matrix(&mut rng, n, LATENT_DIM),
            random_vector(&mut rng, n),
            ROWS,
            COLS,
        )?;

        let pose = [0.3, -0.2, 0.1];
        let latent = [0.5, -0.5, 0.25, 0.0, 1.0];
        let values: [&[f64]; 2] = [&pose, &latent];

        let custom = factor
            .jacobian(&values)
            .expect("factor supplies its jacobian")?;
        let numeric = CentralDifference::default().jacobian(&factor, &values)?;

        assert_eq!(custom.len(), 2);
        assert_eq!(custom[0].shape(), (n, POSE_DIM));
        assert_eq!(custom[1].shape(), (n, LATENT_DIM));
        for (c, m) in custom.iter().zip(&numeric) {
            for (a, b) in c.iter().zip(m.iter()) {
                assert_abs_diff_eq!(a, b, epsilon = 1e-6);
            }
        }
        Ok(())
    }

    #[test]
    fn test_tracking_recovers_pose_and_latent() -> FactorResult<()> {
        let _ = env_logger::builder().is_test(true).try_init();

        let mut rng = StdRng::seed_from_u64(99);
        let n = ROWS * COLS;
        let w = random_matrix(&mut rng, n, LATENT_DIM);
        let mu = random_vector(&mut rng, n);
        let g = random_matrix(&mut rng, n, POSE_DIM);

        let true_pose = Vector3::new(1.0, -0.5, 0.2);
        let true_latent = Vector5::new(0.3, -0.1, 0.0, 0.7, -0.4);

        // Image whose patch at `true_pose` is exactly the appearance of `true_latent`.
        let generated = &mu + &w * DVecF64::from_column_slice(&true_latent.to_array());
        let image = Arc::new(LinearImage {
            base: generated - &g * pose_vector(&true_pose),
            g,
        });

        let mut values = Values::new();
        let pose_id = values.insert(vec![0.0; POSE_DIM]);
        let latent_id = values.insert(vec![0.0; LATENT_DIM]);
        let factor = PpcaTrackingFactor::new(pose_id, latent_id, image, w, mu, ROWS, COLS)?;

        let linearized = Linearizer::new().linearize(&factor, &values)?;
        let mut delta = linearized.zero_input();
        let summary = Cgls::default().optimize(&linearized, &mut delta);
        assert_eq!(summary.state, CglsState::Converged);

        values.move_along(linearized.edges(), &delta)?;

        let pose = values.get(pose_id).expect("pose is stored");
        let latent = values.get(latent_id).expect("latent is stored");
        for (a, b) in pose.iter().zip(true_pose.to_array()) {
            assert_abs_diff_eq!(*a, b, epsilon = 1e-6);
        }
        for (a, b) in latent.iter().zip(true_latent.to_array()) {
            assert_abs_diff_eq!(*a, b, epsilon = 1e-6);
        }

        let residual = factor.error(&[pose, latent])?;
        assert_abs_diff_eq!(residual, 0.0, epsilon = 1e-10);
        Ok(())
    }

    #[test]
    fn test_patch_failure_propagates() {
        let mut values = Values::new();
        let pose_id = values.insert(vec![100.0, 100.0, 0.0]);
        let latent_id = values.insert(vec![0.0; LATENT_DIM]);
        let n = ROWS * COLS;
        let factor = PpcaTrackingFactor::new(
            pose_id,
            latent_id,
            OutOfBounds,
            DMatF64::zeros(n, LATENT_DIM),
            DVecF64::zeros(n),
            ROWS,
            COLS,
        )
        .expect("shapes are valid");

        assert!(matches!(
            Linearizer::new().linearize(&factor, &values),
            Err(FactorError::PatchFailed(_))
        ));
    }
}

//! Cross-period embedding alignment via orthogonal Procrustes rotation.

use std::collections::HashMap;

use nalgebra::DMatrix;
use ndarray::{Array2, Axis};

use crate::container::Operation;
use crate::corpus::Corpus;
use crate::diachronic::DiachronicCorpus;
use crate::embeddings::Embeddings;
use crate::types::{CorpusError, CorpusResult};

/// A fully-set period used to key corpora and cached rotations.
pub type PeriodKey = (i32, i32);

/// Solve the orthogonal Procrustes problem: the orthogonal matrix `R`
/// minimizing `‖target·R − base‖_F`.
///
/// Computed from the SVD of `targetᵀ·base = U·Σ·Vᵀ` as `R = U·Vᵀ`. A
/// rank-deficient cross-covariance still yields a valid orthogonal `R`.
pub fn orthogonal_procrustes(
    target: &Array2<f64>,
    base: &Array2<f64>,
) -> CorpusResult<Array2<f64>> {
    if target.dim() != base.dim() {
        return Err(CorpusError::Alignment(format!(
            "matrices differ in shape: {:?} vs {:?}",
            target.dim(),
            base.dim()
        )));
    }
    if target.nrows() == 0 || target.ncols() == 0 {
        return Err(CorpusError::Alignment(
            "cannot align empty matrices".to_string(),
        ));
    }

    let cross = target.t().dot(base);
    let dim = cross.nrows();
    let svd = DMatrix::from_row_iterator(dim, dim, cross.iter().copied()).svd(true, true);
    let (Some(u), Some(v_t)) = (svd.u, svd.v_t) else {
        return Err(CorpusError::Alignment(
            "SVD did not produce both factors".to_string(),
        ));
    };
    let rotation = u * v_t;
    Ok(Array2::from_shape_fn((dim, dim), |(i, j)| rotation[(i, j)]))
}

fn mean_center(matrix: &mut Array2<f64>) {
    if let Some(mean) = matrix.mean_axis(Axis(0)) {
        *matrix -= &mean;
    }
}

/// Operation computing the rotation that maps the target period's embedding
/// space onto the base period's, over their shared vocabulary only.
///
/// Solved rotations are cached per `(base, target)` pair; the cache belongs
/// to this operation value and is dropped with it.
pub struct AlignmentMatrix {
    base: PeriodKey,
    target: PeriodKey,
    normalize: bool,
    cache: HashMap<(PeriodKey, PeriodKey), Array2<f64>>,
}

impl AlignmentMatrix {
    /// Create the operation for a base/target period pair. Mean-centering
    /// is on by default.
    pub fn new(base: PeriodKey, target: PeriodKey) -> Self {
        Self {
            base,
            target,
            normalize: true,
            cache: HashMap::new(),
        }
    }

    /// Toggle mean-centering of both spaces before solving.
    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Compute (or fetch from cache) the rotation for the current period
    /// pair against a composite.
    pub fn rotation(&mut self, corpus: &DiachronicCorpus<Embeddings>) -> CorpusResult<Array2<f64>> {
        let key = (self.base, self.target);
        if let Some(rotation) = self.cache.get(&key) {
            tracing::debug!(base = ?self.base, target = ?self.target, "alignment cache hit");
            return Ok(rotation.clone());
        }

        let base = corpus.get(self.base.0, self.base.1)?;
        let target = corpus.get(self.target.0, self.target.1)?;

        let (mut w_base, mut w_target) = base.data.intersection(&target.data)?;
        if self.normalize {
            mean_center(&mut w_base);
            mean_center(&mut w_target);
        }

        tracing::debug!(
            shared = w_base.nrows(),
            dim = w_base.ncols(),
            "solving orthogonal Procrustes"
        );
        let rotation = orthogonal_procrustes(&w_target, &w_base)?;
        self.cache.insert(key, rotation.clone());
        Ok(rotation)
    }
}

impl Operation<Embeddings> for AlignmentMatrix {
    type Output = Option<Array2<f64>>;

    /// Alignment is undefined for a single period.
    fn on_synchronic(&mut self, _corpus: &mut Corpus<Embeddings>) -> CorpusResult<Self::Output> {
        Ok(None)
    }

    fn on_diachronic(
        &mut self,
        corpus: &mut DiachronicCorpus<Embeddings>,
    ) -> CorpusResult<Self::Output> {
        self.rotation(corpus).map(Some)
    }
}

/// Operation rotating the target period's embedding space into the base
/// period's coordinate system.
///
/// Wraps an [`AlignmentMatrix`] so repeated applications (and retargeting
/// via the period setters) reuse already-solved rotations.
pub struct AlignEmbeddings {
    in_place: bool,
    matrix: AlignmentMatrix,
}

impl AlignEmbeddings {
    /// Create the operation for a base/target period pair. In-place
    /// mutation and mean-centering are on by default.
    pub fn new(base: PeriodKey, target: PeriodKey) -> Self {
        Self {
            in_place: true,
            matrix: AlignmentMatrix::new(base, target),
        }
    }

    /// Toggle in-place mutation of the target corpus.
    pub fn with_in_place(mut self, in_place: bool) -> Self {
        self.in_place = in_place;
        self
    }

    /// Toggle mean-centering before solving.
    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.matrix = self.matrix.with_normalize(normalize);
        self
    }

    /// Point the operation at a different base period, keeping the cache.
    pub fn set_base_period(&mut self, base: PeriodKey) {
        self.matrix.base = base;
    }

    /// Point the operation at a different target period, keeping the cache.
    pub fn set_target_period(&mut self, target: PeriodKey) {
        self.matrix.target = target;
    }
}

impl Operation<Embeddings> for AlignEmbeddings {
    type Output = Option<Embeddings>;

    /// Alignment is undefined for a single period.
    fn on_synchronic(&mut self, _corpus: &mut Corpus<Embeddings>) -> CorpusResult<Self::Output> {
        Ok(None)
    }

    fn on_diachronic(
        &mut self,
        corpus: &mut DiachronicCorpus<Embeddings>,
    ) -> CorpusResult<Self::Output> {
        let rotation = self.matrix.rotation(corpus)?;
        let (beginning, end) = self.matrix.target;
        let target = corpus.get_mut(beginning, end)?;
        let aligned = target.data.coordinates().dot(&rotation);

        if self.in_place {
            target.data.set_coordinates(aligned)?;
            Ok(None)
        } else {
            let space = Embeddings::new(target.data.vocabulary().clone(), aligned)?;
            Ok(Some(space))
        }
    }
}

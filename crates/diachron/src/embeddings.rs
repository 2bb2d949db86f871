//! Word-embedding spaces: a vocabulary plus a row-per-token coordinate matrix.

use std::collections::HashMap;

use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::types::{CorpusError, CorpusResult};

/// An ordered token list with constant-time position lookup.
///
/// Serialized as the bare token list; the index is rebuilt on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Vocabulary {
    tokens: Vec<String>,
    index: HashMap<String, usize>,
}

impl Vocabulary {
    /// Build a vocabulary from tokens, rejecting duplicates.
    pub fn new(tokens: impl IntoIterator<Item = impl Into<String>>) -> CorpusResult<Self> {
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        let mut index = HashMap::with_capacity(tokens.len());
        for (position, token) in tokens.iter().enumerate() {
            if index.insert(token.clone(), position).is_some() {
                return Err(CorpusError::Shape(format!("duplicate token: {token}")));
            }
        }
        Ok(Self { tokens, index })
    }

    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether the vocabulary is empty.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The row position of a token, if present.
    pub fn position(&self, token: &str) -> Option<usize> {
        self.index.get(token).copied()
    }

    /// Whether the vocabulary contains a token.
    pub fn contains(&self, token: &str) -> bool {
        self.index.contains_key(token)
    }

    /// The tokens in row order.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }
}

impl TryFrom<Vec<String>> for Vocabulary {
    type Error = CorpusError;

    fn try_from(tokens: Vec<String>) -> CorpusResult<Self> {
        Self::new(tokens)
    }
}

impl From<Vocabulary> for Vec<String> {
    fn from(vocabulary: Vocabulary) -> Self {
        vocabulary.tokens
    }
}

/// An embedding space: row `i` of `coordinates` is the vector for token `i`
/// of the vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embeddings {
    vocabulary: Vocabulary,
    coordinates: Array2<f64>,
}

impl Embeddings {
    /// Create an embedding space, checking that the matrix has one row per
    /// vocabulary token.
    pub fn new(vocabulary: Vocabulary, coordinates: Array2<f64>) -> CorpusResult<Self> {
        if coordinates.nrows() != vocabulary.len() {
            return Err(CorpusError::Shape(format!(
                "{} coordinate rows for {} tokens",
                coordinates.nrows(),
                vocabulary.len()
            )));
        }
        Ok(Self {
            vocabulary,
            coordinates,
        })
    }

    /// The vocabulary.
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// The full coordinate matrix.
    pub fn coordinates(&self) -> &Array2<f64> {
        &self.coordinates
    }

    /// Replace the coordinate matrix, keeping the vocabulary.
    ///
    /// The replacement must match the current shape.
    pub fn set_coordinates(&mut self, coordinates: Array2<f64>) -> CorpusResult<()> {
        if coordinates.dim() != self.coordinates.dim() {
            return Err(CorpusError::Shape(format!(
                "cannot replace {:?} coordinates with {:?}",
                self.coordinates.dim(),
                coordinates.dim()
            )));
        }
        self.coordinates = coordinates;
        Ok(())
    }

    /// The vector for a token, if present.
    pub fn vector(&self, token: &str) -> Option<ArrayView1<'_, f64>> {
        self.vocabulary
            .position(token)
            .map(|row| self.coordinates.row(row))
    }

    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.vocabulary.len()
    }

    /// Whether the space has no tokens.
    pub fn is_empty(&self) -> bool {
        self.vocabulary.is_empty()
    }

    /// Vector dimensionality.
    pub fn dim(&self) -> usize {
        self.coordinates.ncols()
    }

    /// Tokens present in both spaces, in this space's row order.
    pub fn shared_vocabulary<'a>(&'a self, other: &Embeddings) -> Vec<&'a str> {
        self.vocabulary
            .tokens()
            .iter()
            .filter(|t| other.vocabulary.contains(t))
            .map(String::as_str)
            .collect()
    }

    /// Row-aligned coordinate submatrices restricted to the shared
    /// vocabulary, `(self_rows, other_rows)`, ordered by this space's
    /// vocabulary for determinism.
    ///
    /// Fails with [`CorpusError::Alignment`] when no tokens are shared.
    pub fn intersection(
        &self,
        other: &Embeddings,
    ) -> CorpusResult<(Array2<f64>, Array2<f64>)> {
        let shared: Vec<(usize, usize)> = self
            .vocabulary
            .tokens()
            .iter()
            .enumerate()
            .filter_map(|(row, token)| other.vocabulary.position(token).map(|o| (row, o)))
            .collect();

        if shared.is_empty() {
            return Err(CorpusError::Alignment(
                "embedding spaces share no vocabulary".to_string(),
            ));
        }

        let mut own = Array2::zeros((shared.len(), self.dim()));
        let mut theirs = Array2::zeros((shared.len(), other.dim()));
        for (row, &(i, j)) in shared.iter().enumerate() {
            own.row_mut(row).assign(&self.coordinates.row(i));
            theirs.row_mut(row).assign(&other.coordinates.row(j));
        }
        Ok((own, theirs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn space(tokens: &[&str], coordinates: Array2<f64>) -> Embeddings {
        Embeddings::new(Vocabulary::new(tokens.to_vec()).unwrap(), coordinates).unwrap()
    }

    #[test]
    fn test_vocabulary_rejects_duplicates() {
        assert!(Vocabulary::new(vec!["cat", "dog", "cat"]).is_err());
    }

    #[test]
    fn test_vocabulary_positions() {
        let v = Vocabulary::new(vec!["cat", "dog", "run"]).unwrap();
        assert_eq!(v.position("dog"), Some(1));
        assert_eq!(v.position("walk"), None);
        assert!(v.contains("run"));
        assert_eq!(v.len(), 3);
    }

    #[test]
    fn test_new_checks_row_count() {
        let v = Vocabulary::new(vec!["cat", "dog"]).unwrap();
        assert!(Embeddings::new(v, array![[1.0, 0.0]]).is_err());
    }

    #[test]
    fn test_vector_lookup() {
        let e = space(&["cat", "dog"], array![[1.0, 2.0], [3.0, 4.0]]);
        assert_eq!(e.vector("dog").unwrap().to_vec(), vec![3.0, 4.0]);
        assert!(e.vector("walk").is_none());
        assert_eq!(e.dim(), 2);
    }

    #[test]
    fn test_intersection_orders_by_own_vocabulary() {
        let a = space(
            &["cat", "dog", "run"],
            array![[1.0, 0.0], [2.0, 0.0], [3.0, 0.0]],
        );
        let b = space(
            &["run", "walk", "cat"],
            array![[0.0, 3.0], [0.0, 9.0], [0.0, 1.0]],
        );

        assert_eq!(a.shared_vocabulary(&b), vec!["cat", "run"]);

        let (wa, wb) = a.intersection(&b).unwrap();
        assert_eq!(wa, array![[1.0, 0.0], [3.0, 0.0]]);
        assert_eq!(wb, array![[0.0, 1.0], [0.0, 3.0]]);
    }

    #[test]
    fn test_intersection_empty_fails() {
        let a = space(&["cat"], array![[1.0]]);
        let b = space(&["dog"], array![[2.0]]);
        assert!(matches!(
            a.intersection(&b),
            Err(CorpusError::Alignment(_))
        ));
    }

    #[test]
    fn test_set_coordinates_keeps_shape() {
        let mut e = space(&["cat", "dog"], array![[1.0, 2.0], [3.0, 4.0]]);
        assert!(e.set_coordinates(array![[0.0], [0.0]]).is_err());
        e.set_coordinates(array![[5.0, 6.0], [7.0, 8.0]]).unwrap();
        assert_eq!(e.vector("cat").unwrap().to_vec(), vec![5.0, 6.0]);
    }
}

//! Diachron — temporal corpus containers and cross-period word-embedding
//! alignment.
//!
//! Corpora are anchored to integer time periods and composed into a
//! [`DiachronicCorpus`] of non-overlapping children. Operations dispatch on
//! container shape via [`Container::perform`]; [`AlignmentMatrix`] and
//! [`AlignEmbeddings`] compare embedding spaces across periods with an
//! orthogonal Procrustes rotation over the shared vocabulary.

pub mod align;
pub mod container;
pub mod corpus;
pub mod diachronic;
pub mod embeddings;
pub mod storage;
pub mod types;

pub use align::{orthogonal_procrustes, AlignEmbeddings, AlignmentMatrix, PeriodKey};
pub use container::{Container, Operation};
pub use corpus::Corpus;
pub use diachronic::{CorpusIter, DiachronicCorpus};
pub use embeddings::{Embeddings, Vocabulary};
pub use storage::{CorpusReader, CorpusWriter};
pub use types::{CorpusError, CorpusResult, Period};

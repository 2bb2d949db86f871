//! Container variants and operation dispatch.

use serde::{Deserialize, Serialize};

use crate::corpus::Corpus;
use crate::diachronic::DiachronicCorpus;
use crate::types::{CorpusResult, Period};

/// An operation that behaves differently depending on the shape of its
/// target container.
///
/// [`Container::perform`] routes a leaf to [`on_synchronic`] and a composite
/// to [`on_diachronic`]; an operation is free to implement only one branch
/// meaningfully and no-op the other.
///
/// [`on_synchronic`]: Operation::on_synchronic
/// [`on_diachronic`]: Operation::on_diachronic
pub trait Operation<T> {
    /// What the operation produces.
    type Output;

    /// Apply to a single-period corpus.
    fn on_synchronic(&mut self, corpus: &mut Corpus<T>) -> CorpusResult<Self::Output>;

    /// Apply to a multi-period composite.
    fn on_diachronic(&mut self, corpus: &mut DiachronicCorpus<T>) -> CorpusResult<Self::Output>;
}

/// A corpus container: either a single-period leaf or a composite of
/// period-indexed children.
///
/// The variant decides dispatch in [`Container::perform`]; whether the
/// period bounds are set decides [`Container::is_diachronic`], which gates
/// insertion into a [`DiachronicCorpus`]. The two are deliberately distinct
/// predicates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Container<T> {
    /// A leaf corpus covering one period.
    Synchronic(Corpus<T>),
    /// A composite spanning several periods.
    Diachronic(DiachronicCorpus<T>),
}

impl<T> Container<T> {
    /// The container's name, if any.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Synchronic(c) => c.name.as_deref(),
            Self::Diachronic(d) => d.name.as_deref(),
        }
    }

    /// The container's language tag, if any.
    pub fn lang(&self) -> Option<&str> {
        match self {
            Self::Synchronic(c) => c.lang.as_deref(),
            Self::Diachronic(d) => d.lang.as_deref(),
        }
    }

    /// The period this container covers.
    pub fn period(&self) -> Period {
        match self {
            Self::Synchronic(c) => c.period(),
            Self::Diachronic(d) => d.period(),
        }
    }

    /// Whether both period bounds are set.
    ///
    /// This is the eligibility test for insertion into a
    /// [`DiachronicCorpus`], not the leaf/composite discriminant.
    pub fn is_diachronic(&self) -> bool {
        self.period().is_set()
    }

    /// The leaf corpus, if this is one.
    pub fn as_synchronic(&self) -> Option<&Corpus<T>> {
        match self {
            Self::Synchronic(c) => Some(c),
            Self::Diachronic(_) => None,
        }
    }

    /// The composite, if this is one.
    pub fn as_diachronic(&self) -> Option<&DiachronicCorpus<T>> {
        match self {
            Self::Synchronic(_) => None,
            Self::Diachronic(d) => Some(d),
        }
    }

    /// Dispatch an operation according to the container's shape.
    pub fn perform<O: Operation<T>>(&mut self, operation: &mut O) -> CorpusResult<O::Output> {
        match self {
            Self::Synchronic(c) => operation.on_synchronic(c),
            Self::Diachronic(d) => operation.on_diachronic(d),
        }
    }
}

/// Containers inherit the equality rule of their variant: period-only for
/// leaves, period plus children for composites.
impl<T> PartialEq for Container<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Synchronic(a), Self::Synchronic(b)) => a == b,
            (Self::Diachronic(a), Self::Diachronic(b)) => a == b,
            _ => false,
        }
    }
}

impl<T> From<Corpus<T>> for Container<T> {
    fn from(corpus: Corpus<T>) -> Self {
        Self::Synchronic(corpus)
    }
}

impl<T> From<DiachronicCorpus<T>> for Container<T> {
    fn from(corpus: DiachronicCorpus<T>) -> Self {
        Self::Diachronic(corpus)
    }
}

impl<T> std::fmt::Display for Container<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Synchronic(c) => write!(f, "{c}"),
            Self::Diachronic(d) => write!(f, "{d}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records which dispatch branch ran.
    struct Probe {
        synchronic: usize,
        diachronic: usize,
    }

    impl Operation<()> for Probe {
        type Output = ();

        fn on_synchronic(&mut self, _corpus: &mut Corpus<()>) -> CorpusResult<()> {
            self.synchronic += 1;
            Ok(())
        }

        fn on_diachronic(&mut self, _corpus: &mut DiachronicCorpus<()>) -> CorpusResult<()> {
            self.diachronic += 1;
            Ok(())
        }
    }

    #[test]
    fn test_perform_routes_by_shape() {
        let mut probe = Probe {
            synchronic: 0,
            diachronic: 0,
        };

        let mut leaf: Container<()> =
            Corpus::new(()).with_period(1800, 1850).unwrap().into();
        leaf.perform(&mut probe).unwrap();
        assert_eq!((probe.synchronic, probe.diachronic), (1, 0));

        let mut composite: Container<()> = DiachronicCorpus::new().into();
        composite.perform(&mut probe).unwrap();
        assert_eq!((probe.synchronic, probe.diachronic), (1, 1));
    }

    #[test]
    fn test_is_diachronic_tracks_bounds_not_shape() {
        let undated: Container<()> = Corpus::new(()).into();
        assert!(!undated.is_diachronic());

        let dated: Container<()> = Corpus::new(()).with_period(1800, 1850).unwrap().into();
        assert!(dated.is_diachronic());

        // an empty composite has no bounds yet, so it is not eligible either
        let empty: Container<()> = DiachronicCorpus::new().into();
        assert!(!empty.is_diachronic());
    }

    #[test]
    fn test_cross_shape_containers_never_equal() {
        let leaf: Container<()> = Corpus::new(()).with_period(1800, 1850).unwrap().into();
        let composite: Container<()> = DiachronicCorpus::new().into();
        assert_ne!(leaf, composite);
    }
}

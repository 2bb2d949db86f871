//! Leaf container holding one period's data payload.

use serde::{Deserialize, Serialize};

use crate::types::{CorpusResult, Period};

/// A corpus anchored to a single time period.
///
/// The payload `T` is arbitrary — typically an embedding space built from
/// the corpus text — and is carried around untouched by the container
/// machinery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Corpus<T> {
    pub name: Option<String>,
    pub lang: Option<String>,
    period: Period,
    pub data: T,
}

impl<T> Corpus<T> {
    /// Create an undated corpus around a payload.
    pub fn new(data: T) -> Self {
        Self {
            name: None,
            lang: None,
            period: Period::unset(),
            data,
        }
    }

    /// Set the corpus name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the language tag.
    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    /// Set both period bounds, validating their ordering.
    pub fn with_period(mut self, beginning: i32, end: i32) -> CorpusResult<Self> {
        self.period = Period::new(beginning, end)?;
        Ok(self)
    }

    /// The period this corpus covers.
    pub fn period(&self) -> Period {
        self.period
    }

    /// Replace the period wholesale.
    pub fn set_period(&mut self, period: Period) {
        self.period = period;
    }

    /// Strict comparison including the payload, for callers that need more
    /// than the default time-slot identity.
    pub fn content_eq(&self, other: &Self) -> bool
    where
        T: PartialEq,
    {
        self.period == other.period
            && self.name == other.name
            && self.lang == other.lang
            && self.data == other.data
    }
}

/// Equality between corpora is defined **solely by period**: two corpora
/// covering the same time slot are equal regardless of name or payload.
/// Use [`Corpus::content_eq`] when the payload matters.
impl<T> PartialEq for Corpus<T> {
    fn eq(&self, other: &Self) -> bool {
        self.period == other.period
    }
}

impl<T> std::fmt::Display for Corpus<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Corpus:{} {}",
            self.name.as_deref().unwrap_or("<unnamed>"),
            self.period
        )
    }
}

//! Composite container of non-overlapping, period-indexed children.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::container::Container;
use crate::corpus::Corpus;
use crate::types::{CorpusError, CorpusResult, Period};

/// An ordered composite of corpora covering disjoint time periods.
///
/// Children may themselves be leaves or nested composites; each must report
/// a fully-set period before insertion. The composite keeps three pieces of
/// derived state in sync on every mutation: the `occupied` interval list
/// (insertion order), the `corpora` list (sorted ascending by child
/// beginning), and its own period (the min/max hull of `occupied`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiachronicCorpus<T> {
    pub name: Option<String>,
    pub lang: Option<String>,
    period: Period,
    corpora: Vec<Container<T>>,
    occupied: Vec<(i32, i32)>,
}

fn label(name: Option<&str>) -> String {
    name.unwrap_or("<unnamed>").to_string()
}

impl<T> DiachronicCorpus<T> {
    /// Create an empty composite.
    pub fn new() -> Self {
        Self {
            name: None,
            lang: None,
            period: Period::unset(),
            corpora: Vec::new(),
            occupied: Vec::new(),
        }
    }

    /// Create a composite from a sequence of children, adding each in turn.
    pub fn from_corpora(
        corpora: impl IntoIterator<Item = Container<T>>,
    ) -> CorpusResult<Self> {
        let mut composite = Self::new();
        for child in corpora {
            composite.add(child)?;
        }
        Ok(composite)
    }

    /// Set the composite name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the language tag.
    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    /// The hull period covered by this composite (unset while empty).
    pub fn period(&self) -> Period {
        self.period
    }

    /// The children, sorted ascending by period beginning.
    pub fn corpora(&self) -> &[Container<T>] {
        &self.corpora
    }

    /// The occupied intervals, in the order the children were added.
    pub fn periods(&self) -> &[(i32, i32)] {
        &self.occupied
    }

    /// Number of direct children.
    pub fn len(&self) -> usize {
        self.corpora.len()
    }

    /// Whether the composite has no children.
    pub fn is_empty(&self) -> bool {
        self.corpora.is_empty()
    }

    /// Insert a child container.
    ///
    /// Fails with [`CorpusError::InvalidChild`] if the child's period is not
    /// fully set, and with [`CorpusError::Overlap`] if its interval
    /// intersects an occupied one. The insertion is atomic: on failure no
    /// derived state has changed.
    pub fn add(&mut self, child: Container<T>) -> CorpusResult<()> {
        let Some((beginning, end)) = child.period().bounds() else {
            return Err(CorpusError::InvalidChild(label(child.name())));
        };

        let incoming = child.period();
        for &(b, e) in &self.occupied {
            // occupied entries were validated on their own insertion
            let occupied = Period::new(b, e).unwrap_or_default();
            if occupied.overlaps(&incoming) {
                return Err(CorpusError::Overlap {
                    name: label(child.name()),
                    beginning,
                    end,
                });
            }
        }

        self.occupied.push((beginning, end));
        self.corpora.push(child);
        self.corpora.sort_by_key(|c| c.period().beginning());
        self.recompute_bounds();
        Ok(())
    }

    /// Remove the first child equal to `child` and return it.
    ///
    /// Equality follows the containers' own rule (period-based), so a probe
    /// corpus with the right period suffices. The composite's occupied list
    /// and hull period are recomputed, symmetric to [`DiachronicCorpus::add`].
    pub fn remove(&mut self, child: &Container<T>) -> CorpusResult<Container<T>> {
        let position = self
            .corpora
            .iter()
            .position(|c| c == child)
            .ok_or_else(|| CorpusError::NotFound(label(child.name())))?;

        let removed = self.corpora.remove(position);
        if let Some(bounds) = removed.period().bounds() {
            if let Some(occupied) = self.occupied.iter().position(|&p| p == bounds) {
                self.occupied.remove(occupied);
            }
        }
        self.recompute_bounds();
        Ok(removed)
    }

    /// Look up the direct leaf child whose period equals `(beginning, end)`
    /// exactly. Nested composites are neither matched nor entered.
    pub fn get(&self, beginning: i32, end: i32) -> CorpusResult<&Corpus<T>> {
        self.corpora
            .iter()
            .find_map(|c| match c {
                Container::Synchronic(leaf)
                    if leaf.period().bounds() == Some((beginning, end)) =>
                {
                    Some(leaf)
                }
                _ => None,
            })
            .ok_or_else(|| CorpusError::NotFound(format!("<{beginning}, {end}>")))
    }

    /// Mutable variant of [`DiachronicCorpus::get`].
    pub fn get_mut(&mut self, beginning: i32, end: i32) -> CorpusResult<&mut Corpus<T>> {
        self.corpora
            .iter_mut()
            .find_map(|c| match c {
                Container::Synchronic(leaf)
                    if leaf.period().bounds() == Some((beginning, end)) =>
                {
                    Some(leaf)
                }
                _ => None,
            })
            .ok_or_else(|| CorpusError::NotFound(format!("<{beginning}, {end}>")))
    }

    /// Direct children fully contained in `[beginning, end]`, in sorted
    /// order. Missing bounds default to the composite's own; no recursion
    /// into nested composites.
    pub fn slice(&self, beginning: Option<i32>, end: Option<i32>) -> Vec<&Container<T>> {
        let Some((b, e)) = self.effective_range(beginning, end) else {
            return Vec::new();
        };
        self.corpora
            .iter()
            .filter(|c| match c.period().bounds() {
                Some((cb, ce)) => b <= cb && ce <= e,
                None => false,
            })
            .collect()
    }

    /// Lazy traversal over every leaf corpus in `[beginning, end]`, however
    /// deeply nested.
    ///
    /// Leaves fully contained in the range are yielded; composite children
    /// are expanded (their children join the queue) rather than filtered
    /// themselves. The walk uses a private queue, so iterating never mutates
    /// the composite being traversed, and a fresh call restarts from the top.
    pub fn iter_corpora(&self, beginning: Option<i32>, end: Option<i32>) -> CorpusIter<'_, T> {
        CorpusIter {
            queue: self.corpora.iter().collect(),
            range: self.effective_range(beginning, end),
        }
    }

    /// First direct child with exactly this name, if any.
    pub fn get_by_name(&self, name: &str) -> Option<&Container<T>> {
        self.slice(None, None)
            .into_iter()
            .find(|c| c.name() == Some(name))
    }

    fn effective_range(&self, beginning: Option<i32>, end: Option<i32>) -> Option<(i32, i32)> {
        let b = beginning.or(self.period.beginning())?;
        let e = end.or(self.period.end())?;
        Some((b, e))
    }

    fn recompute_bounds(&mut self) {
        let beginning = self.occupied.iter().map(|&(b, _)| b).min();
        let end = self.occupied.iter().map(|&(_, e)| e).max();
        self.period = match (beginning, end) {
            // min beginning never exceeds max end over non-empty intervals
            (Some(b), Some(e)) => Period::new(b, e).unwrap_or_default(),
            _ => Period::unset(),
        };
    }
}

impl<T> Default for DiachronicCorpus<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Composites are equal when their hull periods match and their children
/// are pairwise equal under the children's own rules.
impl<T> PartialEq for DiachronicCorpus<T> {
    fn eq(&self, other: &Self) -> bool {
        self.period == other.period && self.corpora == other.corpora
    }
}

impl<T> std::fmt::Display for DiachronicCorpus<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "DiachronicCorpus:{} {}",
            self.name.as_deref().unwrap_or("<unnamed>"),
            self.period
        )
    }
}

/// Iterator returned by [`DiachronicCorpus::iter_corpora`].
pub struct CorpusIter<'a, T> {
    queue: VecDeque<&'a Container<T>>,
    range: Option<(i32, i32)>,
}

impl<'a, T> Iterator for CorpusIter<'a, T> {
    type Item = &'a Corpus<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let (b, e) = self.range?;
        while let Some(container) = self.queue.pop_front() {
            match container {
                Container::Synchronic(leaf) => {
                    if let Some((cb, ce)) = leaf.period().bounds() {
                        if b <= cb && ce <= e {
                            return Some(leaf);
                        }
                    }
                }
                Container::Diachronic(nested) => {
                    self.queue.extend(nested.corpora.iter());
                }
            }
        }
        None
    }
}

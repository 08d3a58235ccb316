//! Outcome tally and batch result

/// Label-to-count aggregate of a batch run
///
/// Counts only grow. Labels keep their first-seen position, which breaks
/// ties in [`Tally::most_common`]. Equality ignores that order.
#[derive(Debug, Clone, Default)]
pub struct Tally {
    entries: Vec<(String, usize)>,
}

impl Tally {
    /// Create an empty tally
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence of `label`
    pub fn record(&mut self, label: &str) {
        match self.entries.iter_mut().find(|(l, _)| l == label) {
            Some((_, count)) => *count += 1,
            None => self.entries.push((label.to_string(), 1)),
        }
    }

    /// Count for `label`, zero if never seen
    #[must_use]
    pub fn get(&self, label: &str) -> usize {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map_or(0, |(_, count)| *count)
    }

    /// Sum of all counts
    #[must_use]
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    /// Number of distinct labels
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing has been recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Labels by descending count, ties in first-seen order
    #[must_use]
    pub fn most_common(&self) -> Vec<(&str, usize)> {
        let mut counts: Vec<(&str, usize)> = self
            .entries
            .iter()
            .map(|(label, count)| (label.as_str(), *count))
            .collect();
        // stable sort keeps first-seen order among equal counts
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
    }
}

impl PartialEq for Tally {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .entries
                .iter()
                .all(|(label, count)| other.get(label) == *count)
    }
}

impl Eq for Tally {}

/// Final result of one batch run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchResult {
    /// Outcome distribution
    pub tally: Tally,
    /// Number of hosts processed, always equal to `tally.total()`
    pub total_processed: usize,
}

impl From<Tally> for BatchResult {
    fn from(tally: Tally) -> Self {
        let total_processed = tally.total();
        Self {
            tally,
            total_processed,
        }
    }
}

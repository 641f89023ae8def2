//! Source-to-target assignment for a drag gesture.
//!
//! [`match_connections`] pairs each selected source with at most one target,
//! scanning the opposite list circularly from the entry the user released
//! over. The result is injective and fully determined by its inputs.

/// One slot per source port, in selection order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchAssignment<T> {
    slots: Vec<Option<T>>,
}

impl<T> MatchAssignment<T> {
    pub fn slots(&self) -> &[Option<T>] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Target assigned to source `index`.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index).and_then(|s| s.as_ref())
    }

    /// Number of non-empty slots.
    pub fn matched(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// `(source index, target)` for every non-empty slot.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|t| (i, t)))
    }

    pub fn into_slots(self) -> Vec<Option<T>> {
        self.slots
    }
}

/// Assign targets to `sources` by circular scan from `anchor`.
///
/// For each source in order, `targets` is walked starting at the anchor's
/// index, advancing with wraparound. The first target the oracle accepts and
/// that no earlier source already took is assigned; there is no backtracking.
/// A source that completes a full loop without a hit gets an empty slot.
///
/// # Panics
///
/// If `anchor` is not an element of `targets`.
pub fn match_connections<S, T, F>(
    sources: &[S],
    anchor: &T,
    targets: &[T],
    oracle: F,
) -> MatchAssignment<T>
where
    T: PartialEq + Clone,
    F: Fn(&S, &T) -> bool,
{
    let start = targets.iter().position(|t| t == anchor);
    assert!(start.is_some(), "anchor target is not among the visible targets");
    let start = start.unwrap_or_default();

    let n = targets.len();
    let mut taken = vec![false; n];
    let mut slots = Vec::with_capacity(sources.len());

    for source in sources {
        let hit = (0..n)
            .map(|step| (start + step) % n)
            .find(|&idx| !taken[idx] && oracle(source, &targets[idx]));
        match hit {
            Some(idx) => {
                taken[idx] = true;
                slots.push(Some(targets[idx].clone()));
            }
            None => slots.push(None),
        }
    }

    assert_eq!(slots.len(), sources.len(), "assignment length mismatch");
    MatchAssignment { slots }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_wraps_from_anchor() {
        let targets = ["T0", "T1", "T2", "T3"];
        let m = match_connections(&["S"], &"T2", &targets, |_, t| *t == "T1" || *t == "T3");
        assert_eq!(m.slots(), &[Some("T3")]);
    }

    #[test]
    fn test_scan_wraps_past_end() {
        let targets = ["T0", "T1", "T2", "T3"];
        let m = match_connections(&["S"], &"T3", &targets, |_, t| *t == "T1");
        assert_eq!(m.get(0), Some(&"T1"));
    }

    #[test]
    fn test_taken_targets_are_skipped() {
        let targets = [1, 2, 3];
        let m = match_connections(&["a", "b", "c"], &2, &targets, |_, _| true);
        assert_eq!(m.into_slots(), vec![Some(2), Some(3), Some(1)]);
    }

    #[test]
    fn test_more_sources_than_targets() {
        let targets = [1, 2];
        let m = match_connections(&["a", "b", "c"], &1, &targets, |_, _| true);
        assert_eq!(m.len(), 3);
        assert_eq!(m.matched(), 2);
        assert_eq!(m.get(2), None);
    }

    #[test]
    #[should_panic(expected = "anchor target is not among the visible targets")]
    fn test_missing_anchor_panics() {
        let targets = [1, 2, 3];
        let _ = match_connections(&["a"], &9, &targets, |_, _| true);
    }
}

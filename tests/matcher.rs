use portlink::matcher::match_connections;
use std::collections::HashSet;

/// Small deterministic generator so the property checks are reproducible.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next() % n
    }
}

/// Random compatibility table: `table[s][t]` says whether source `s` accepts
/// target `t`.
fn random_case(rng: &mut Lcg) -> (Vec<usize>, Vec<usize>, usize, Vec<Vec<bool>>) {
    let n_sources = 1 + rng.below(6) as usize;
    let n_targets = 1 + rng.below(8) as usize;
    let sources: Vec<usize> = (0..n_sources).collect();
    let targets: Vec<usize> = (100..100 + n_targets).collect();
    let anchor = targets[rng.below(n_targets as u64) as usize];
    let table = (0..n_sources)
        .map(|_| (0..n_targets).map(|_| rng.below(3) == 0).collect())
        .collect();
    (sources, targets, anchor, table)
}

#[test]
fn assignment_is_injective_and_bounded() {
    let mut rng = Lcg(7);
    for _ in 0..500 {
        let (sources, targets, anchor, table) = random_case(&mut rng);
        let m = match_connections(&sources, &anchor, &targets, |s: &usize, t: &usize| {
            table[*s][*t - 100]
        });
        assert_eq!(m.len(), sources.len());

        let assigned: Vec<usize> = m.slots().iter().flatten().copied().collect();
        let unique: HashSet<usize> = assigned.iter().copied().collect();
        assert_eq!(unique.len(), assigned.len(), "target assigned twice: {:?}", m.slots());
        assert!(m.matched() <= sources.len().min(targets.len()));

        // Every assignment must have been accepted by the oracle.
        for (i, t) in m.pairs() {
            assert!(table[i][*t - 100]);
        }
    }
}

#[test]
fn assignment_is_deterministic() {
    let mut rng = Lcg(42);
    for _ in 0..200 {
        let (sources, targets, anchor, table) = random_case(&mut rng);
        let oracle = |s: &usize, t: &usize| table[*s][*t - 100];
        let first = match_connections(&sources, &anchor, &targets, oracle);
        let second = match_connections(&sources, &anchor, &targets, oracle);
        assert_eq!(first, second);
    }
}

#[test]
fn scan_starts_at_anchor_and_wraps() {
    let targets = ["T0", "T1", "T2", "T3"];
    let m = match_connections(&["S"], &"T2", &targets, |_, t: &&str| *t == "T1" || *t == "T3");
    assert_eq!(m.slots(), &[Some("T3")]);
}

#[test]
fn exhausted_scan_leaves_empty_slot() {
    let targets = ["T0", "T1", "T2"];
    let m = match_connections(&["S1", "S2"], &"T0", &targets, |s: &&str, _| *s == "S2");
    assert_eq!(m.slots(), &[None, Some("T0")]);
}

#[test]
fn first_hit_wins_without_backtracking() {
    // P1 takes A even though P2 could only use A; P2 gets nothing.
    let targets = ["A", "B"];
    let m = match_connections(&["P1", "P2"], &"A", &targets, |s: &&str, t: &&str| {
        matches!((*s, *t), ("P1", "A") | ("P1", "B") | ("P2", "A"))
    });
    assert_eq!(m.slots(), &[Some("A"), None]);
}

#[test]
fn two_sources_end_to_end() {
    let targets = ["A", "B", "C"];
    let m = match_connections(&["P1", "P2"], &"A", &targets, |s: &&str, t: &&str| {
        matches!((*s, *t), ("P1", "A") | ("P1", "C") | ("P2", "B"))
    });
    assert_eq!(m.slots(), &[Some("A"), Some("B")]);
}

#[test]
#[should_panic]
fn anchor_outside_targets_panics() {
    let targets = ["A", "B"];
    let _ = match_connections(&["P1"], &"Z", &targets, |_, _| true);
}

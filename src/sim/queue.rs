//! Drop queue
//!
//! A fixed-length, weighted sequence of drop kinds built once per session.
//! Composition is a count-per-kind formula keyed by tier, then shuffled so
//! position carries no information about kind. Consumption is strictly
//! sequential through a cursor.

use rand::Rng;

use super::catalog::DropKind;
use crate::consts::*;
use crate::error::{Result, SimError};
use crate::rules::Rules;

/// Per-kind counts for one queue, indexed by [`DropKind::index`]
pub type Composition = [usize; 5];

/// Exact count of each kind in a queue of `length` at `tier`
pub fn composition(tier: u32, length: usize, rules: &Rules) -> Result<Composition> {
    if tier < 1 {
        return Err(SimError::InvalidTier(tier));
    }

    let mut orange = BASE_ORANGE;
    let mut green = BASE_GREEN;
    let mut yellow = BASE_YELLOW;
    if rules.in_hard_band(tier) {
        orange = orange.saturating_add(rules.hard_band_bonus);
        green = green.saturating_add(rules.hard_band_bonus);
        yellow = yellow.saturating_add(rules.hard_band_bonus);
    }
    let rainbow = BASE_RAINBOW;

    let required = orange
        .saturating_add(green)
        .saturating_add(yellow)
        .saturating_add(rainbow);
    if required > length {
        return Err(SimError::QueueTooShort {
            tier,
            length,
            required,
        });
    }

    let mut counts = [0; 5];
    counts[DropKind::Orange.index()] = orange;
    counts[DropKind::Green.index()] = green;
    counts[DropKind::Yellow.index()] = yellow;
    counts[DropKind::Rainbow.index()] = rainbow;
    // Blue fills the rest of the budget
    counts[DropKind::Blue.index()] = length - required;
    Ok(counts)
}

/// Fisher-Yates: walk from the end, swap each slot with a uniform earlier-or-same slot
pub fn shuffle<T, R: Rng + ?Sized>(slice: &mut [T], rng: &mut R) {
    for i in (1..slice.len()).rev() {
        let j = rng.random_range(0..=i);
        slice.swap(i, j);
    }
}

/// One session's drop sequence
#[derive(Debug, Clone)]
pub struct DropQueue {
    kinds: Vec<DropKind>,
    cursor: usize,
}

impl DropQueue {
    /// Build and shuffle a queue for a tier
    pub fn build<R: Rng + ?Sized>(tier: u32, rules: &Rules, rng: &mut R) -> Result<Self> {
        let counts = composition(tier, rules.queue_length, rules)?;

        let mut kinds = Vec::with_capacity(rules.queue_length);
        for kind in [
            DropKind::Orange,
            DropKind::Green,
            DropKind::Yellow,
            DropKind::Rainbow,
            DropKind::Blue,
        ] {
            kinds.extend(std::iter::repeat_n(kind, counts[kind.index()]));
        }
        shuffle(&mut kinds, rng);

        Ok(Self { kinds, cursor: 0 })
    }

    /// Scripted queue, consumed in the given order
    pub fn from_kinds(kinds: Vec<DropKind>) -> Self {
        Self { kinds, cursor: 0 }
    }

    /// Take the next kind, `None` once exhausted
    pub fn next(&mut self) -> Option<DropKind> {
        let kind = self.kinds.get(self.cursor).copied()?;
        self.cursor += 1;
        Some(kind)
    }

    /// Peek without consuming
    pub fn peek(&self) -> Option<DropKind> {
        self.kinds.get(self.cursor).copied()
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Drops not yet handed out
    pub fn remaining(&self) -> usize {
        self.kinds.len() - self.cursor
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.kinds.len()
    }

    /// The full sequence, including consumed positions
    pub fn as_slice(&self) -> &[DropKind] {
        &self.kinds
    }

    /// Count of each kind in the whole sequence
    pub fn counts(&self) -> Composition {
        let mut counts = [0; 5];
        for kind in &self.kinds {
            counts[kind.index()] += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_composition_tier_one() {
        let counts = composition(1, 100, &Rules::default()).unwrap();
        assert_eq!(counts[DropKind::Orange.index()], 6);
        assert_eq!(counts[DropKind::Green.index()], 6);
        assert_eq!(counts[DropKind::Yellow.index()], 10);
        assert_eq!(counts[DropKind::Rainbow.index()], 2);
        assert_eq!(counts[DropKind::Blue.index()], 76);
    }

    #[test]
    fn test_composition_hard_band() {
        let rules = Rules::default();
        for tier in 4..=6 {
            let counts = composition(tier, 100, &rules).unwrap();
            assert_eq!(counts[DropKind::Orange.index()], 12);
            assert_eq!(counts[DropKind::Green.index()], 12);
            assert_eq!(counts[DropKind::Yellow.index()], 16);
            assert_eq!(counts[DropKind::Rainbow.index()], 2);
            assert_eq!(counts[DropKind::Blue.index()], 58);
        }
        // Band is bounded
        assert_eq!(composition(7, 100, &rules).unwrap(), composition(1, 100, &rules).unwrap());
    }

    #[test]
    fn test_invalid_tier() {
        let mut rng = Pcg32::seed_from_u64(1);
        let err = DropQueue::build(0, &Rules::default(), &mut rng).unwrap_err();
        assert!(matches!(err, SimError::InvalidTier(0)));
    }

    #[test]
    fn test_queue_too_short() {
        let rules = Rules::default();
        let err = composition(4, 40, &rules).unwrap_err();
        assert!(matches!(
            err,
            SimError::QueueTooShort {
                tier: 4,
                length: 40,
                required: 42
            }
        ));
        // Outside the band the same length is enough
        assert_eq!(composition(1, 40, &rules).unwrap()[DropKind::Blue.index()], 16);

        let huge = Rules {
            hard_band_bonus: usize::MAX,
            ..Rules::default()
        };
        assert!(matches!(
            composition(4, 100, &huge),
            Err(SimError::QueueTooShort { required: usize::MAX, .. })
        ));
    }

    #[test]
    fn test_sequential_consumption() {
        let mut queue = DropQueue::from_kinds(vec![DropKind::Blue, DropKind::Orange, DropKind::Rainbow]);
        assert_eq!(queue.remaining(), 3);
        assert_eq!(queue.peek(), Some(DropKind::Blue));
        assert_eq!(queue.next(), Some(DropKind::Blue));
        assert_eq!(queue.next(), Some(DropKind::Orange));
        assert_eq!(queue.next(), Some(DropKind::Rainbow));
        assert!(queue.is_exhausted());
        assert_eq!(queue.next(), None);
        assert_eq!(queue.next(), None);
        assert_eq!(queue.remaining(), 0);
    }

    #[test]
    fn test_shuffle_determinism() {
        let rules = Rules::default();
        let a = DropQueue::build(2, &rules, &mut Pcg32::seed_from_u64(42)).unwrap();
        let b = DropQueue::build(2, &rules, &mut Pcg32::seed_from_u64(42)).unwrap();
        assert_eq!(a.as_slice(), b.as_slice());
    }

    #[test]
    fn test_shuffle_actually_permutes() {
        // 100 drops in catalog order would start with 6 oranges
        let queue = DropQueue::build(1, &Rules::default(), &mut Pcg32::seed_from_u64(7)).unwrap();
        assert!(queue.as_slice()[..6].iter().any(|k| *k != DropKind::Orange));
    }

    proptest! {
        #[test]
        fn prop_build_matches_formula(tier in 1u32..60, seed in any::<u64>()) {
            let rules = Rules::default();
            let mut rng = Pcg32::seed_from_u64(seed);
            let queue = DropQueue::build(tier, &rules, &mut rng).unwrap();
            prop_assert_eq!(queue.len(), rules.queue_length);
            prop_assert_eq!(queue.counts(), composition(tier, rules.queue_length, &rules).unwrap());
        }

        #[test]
        fn prop_shuffle_preserves_multiset(mut values in proptest::collection::vec(0u8..5, 0..200), seed in any::<u64>()) {
            let mut before = values.clone();
            shuffle(&mut values, &mut Pcg32::seed_from_u64(seed));
            before.sort_unstable();
            values.sort_unstable();
            prop_assert_eq!(before, values);
        }
    }
}

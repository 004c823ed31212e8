//! Weighted integer allocation across ordered buckets.
//!
//! Every function here conserves its input: the counts in the returned plan
//! always add up to the requested total. Buckets that end up empty are left
//! out of the plan instead of being listed with a zero count.

use rand::seq::SliceRandom;
use rand::{Rng, RngCore};

/// Relative weights for the year buckets, oldest first.
pub const YEAR_WEIGHTS: [u32; 3] = [1, 2, 4];

/// Number of year buckets ending at (and including) the current year.
pub const YEAR_SPAN: usize = YEAR_WEIGHTS.len();

/// Ordered bucket to count mapping produced by one allocation level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationPlan<K> {
    entries: Vec<(K, usize)>,
}

impl<K> Default for AllocationPlan<K> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<K> AllocationPlan<K> {
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, usize)> {
        self.entries.iter().map(|(key, count)| (key, *count))
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(key, _)| key)
    }

    pub fn get(&self, key: &K) -> Option<usize>
    where
        K: PartialEq,
    {
        self.entries
            .iter()
            .find(|(candidate, _)| candidate == key)
            .map(|(_, count)| *count)
    }
}

impl<K> IntoIterator for AllocationPlan<K> {
    type Item = (K, usize);
    type IntoIter = std::vec::IntoIter<(K, usize)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Split `total` across `weights` proportionally, in iteration order.
///
/// Each bucket except the last gets `floor(total * weight / sum)`, raised to
/// at least 1 while the remaining units can still cover every remaining
/// bucket, and capped so that later buckets keep one unit each. The last
/// bucket absorbs the remainder. When `total` is smaller than the number of
/// buckets the first `total` buckets receive one unit each and the rest are
/// dropped.
///
/// An empty weight list yields an empty plan.
pub fn allocate<K: Clone>(total: usize, weights: &[(K, u32)]) -> AllocationPlan<K> {
    let Some((last, leading)) = weights.split_last() else {
        return AllocationPlan::default();
    };

    let bucket_count = weights.len();
    let weight_sum = weights
        .iter()
        .map(|(_, weight)| u64::from(*weight))
        .sum::<u64>()
        .max(1);

    let mut entries = Vec::with_capacity(bucket_count);
    let mut remaining = total;

    for (index, (key, weight)) in leading.iter().enumerate() {
        // This bucket plus every bucket after it.
        let outstanding = bucket_count - index;
        let count = if remaining >= outstanding {
            let share = (total as u64 * u64::from(*weight) / weight_sum) as usize;
            share.max(1).min(remaining - (outstanding - 1))
        } else {
            remaining.min(1)
        };

        remaining -= count;
        if count > 0 {
            entries.push((key.clone(), count));
        }
    }

    if remaining > 0 {
        entries.push((last.0.clone(), remaining));
    }

    let plan = AllocationPlan { entries };
    debug_assert_eq!(plan.total(), total, "category allocation must conserve units");
    plan
}

/// Spread `count` files over a random subset of `subdirs`.
///
/// When there are no more files than sub-directories, `count` distinct
/// sub-directories are sampled and each receives one file. Otherwise
/// `min(len, max(2, count / 3))` sub-directories are picked and each gets a
/// draw within a third of the running even share; the final pick takes
/// whatever is left.
pub fn allocate_subdirs<K: Clone>(
    count: usize,
    subdirs: &[K],
    rng: &mut dyn RngCore,
) -> AllocationPlan<K> {
    if count == 0 || subdirs.is_empty() {
        return AllocationPlan::default();
    }

    let mut pool = subdirs.to_vec();
    pool.shuffle(rng);

    if count <= pool.len() {
        pool.truncate(count);
        return AllocationPlan {
            entries: pool.into_iter().map(|key| (key, 1)).collect(),
        };
    }

    let selected = pool.len().min((count / 3).max(2));
    pool.truncate(selected);

    let mut entries = Vec::with_capacity(selected);
    let mut remaining = count;
    let mut picks = pool.into_iter();

    for index in 0..selected - 1 {
        let Some(key) = picks.next() else {
            break;
        };
        let outstanding = selected - index;
        let average = remaining / outstanding;
        let spread = (average / 3).max(1);
        let low = average.saturating_sub(spread).max(1);
        let high = average + spread;
        let drawn = rng.random_range(low..=high);
        let share = drawn.min(remaining - (outstanding - 1));

        remaining -= share;
        entries.push((key, share));
    }

    if let Some(key) = picks.next() {
        entries.push((key, remaining));
    }

    let plan = AllocationPlan { entries };
    debug_assert_eq!(plan.total(), count, "sub-directory allocation must conserve units");
    plan
}

/// Spread `count` files over the last [`YEAR_SPAN`] years ending at `current_year`.
///
/// Older years get `floor(count * weight / 7)` with the 1:2:4 skew, keeping
/// room for the years after them; the current year absorbs the remainder so it
/// always holds the largest share.
pub fn allocate_years(count: usize, current_year: i32) -> AllocationPlan<i32> {
    let weight_sum: usize = YEAR_WEIGHTS.iter().map(|weight| *weight as usize).sum();
    let first_year = current_year - (YEAR_SPAN as i32 - 1);

    let mut entries = Vec::with_capacity(YEAR_SPAN);
    let mut remaining = count;

    for (index, weight) in YEAR_WEIGHTS[..YEAR_SPAN - 1].iter().enumerate() {
        let later_years = YEAR_SPAN - index - 1;
        let share = (count * *weight as usize / weight_sum).min(remaining.saturating_sub(later_years));
        if share > 0 {
            entries.push((first_year + index as i32, share));
            remaining -= share;
        }
    }

    if remaining > 0 {
        entries.push((current_year, remaining));
    }

    let plan = AllocationPlan { entries };
    debug_assert_eq!(plan.total(), count, "year allocation must conserve units");
    plan
}

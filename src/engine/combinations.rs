use serde::{Deserialize, Serialize};

/// Whether child sequences that differ only in order count as distinct.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChildOrdering {
    /// Multisets: `[CHD1, CHD2]` and `[CHD2, CHD1]` are the same guest mix.
    #[default]
    Combinations,
    /// Sequences: each ordering is priced separately.
    Permutations,
}

/// Enumerate child sequences of length `count` drawn from `items` with repetition.
///
/// `count == 0` yields one empty sequence (the all-adult case); no items with a
/// non-zero count yields nothing. Results are lexicographic over item positions.
pub fn combinations<T: Clone>(items: &[T], count: usize, ordering: ChildOrdering) -> Vec<Vec<T>> {
    if count == 0 {
        return vec![Vec::new()];
    }
    if items.is_empty() {
        return Vec::new();
    }

    let mut out = Vec::new();
    let mut current = Vec::with_capacity(count);
    match ordering {
        ChildOrdering::Combinations => multisets(items, count, 0, &mut current, &mut out),
        ChildOrdering::Permutations => sequences(items, count, &mut current, &mut out),
    }
    out
}

/// Non-decreasing index walk: each pick starts at the previous pick, so every
/// multiset is produced exactly once.
fn multisets<T: Clone>(
    items: &[T],
    count: usize,
    start: usize,
    current: &mut Vec<T>,
    out: &mut Vec<Vec<T>>,
) {
    if current.len() == count {
        out.push(current.clone());
        return;
    }
    for i in start..items.len() {
        current.push(items[i].clone());
        multisets(items, count, i, current, out);
        current.pop();
    }
}

fn sequences<T: Clone>(items: &[T], count: usize, current: &mut Vec<T>, out: &mut Vec<Vec<T>>) {
    if current.len() == count {
        out.push(current.clone());
        return;
    }
    for item in items {
        current.push(item.clone());
        sequences(items, count, current, out);
        current.pop();
    }
}

/// Number of results `combinations` would return, saturating at `u64::MAX`.
pub fn result_count(n: usize, count: usize, ordering: ChildOrdering) -> u64 {
    match ordering {
        ChildOrdering::Combinations => combination_count(n, count),
        ChildOrdering::Permutations => permutation_count(n, count),
    }
}

/// Multisets of size `k` from `n` kinds: C(n + k - 1, k).
pub fn combination_count(n: usize, k: usize) -> u64 {
    if k == 0 {
        return 1;
    }
    if n == 0 {
        return 0;
    }
    // C(n+k-1, k) built incrementally; each partial product is itself a binomial.
    let (n, k) = (n as u128, k as u128);
    let mut acc: u128 = 1;
    for i in 1..=k {
        acc = acc * (n - 1 + i) / i;
        if acc > u64::MAX as u128 {
            return u64::MAX;
        }
    }
    acc as u64
}

/// Sequences of length `k` from `n` kinds: n^k.
pub fn permutation_count(n: usize, k: usize) -> u64 {
    let Ok(k) = u32::try_from(k) else {
        return if n <= 1 { n as u64 } else { u64::MAX };
    };
    (n as u64).saturating_pow(k)
}

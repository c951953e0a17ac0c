//! Lexicographic ("next permutation") enumeration of label sequences.
//!
//! Repeated labels are handled as a multiset: each distinct arrangement is
//! produced exactly once.

use std::collections::BTreeMap;

/// Rearrange `items` into the next lexicographically greater arrangement.
///
/// Returns `false` when `items` was already the greatest arrangement; in that
/// case `items` is reset to ascending order, matching the usual wrap-around
/// convention.
pub fn next_permutation<T: Ord>(items: &mut [T]) -> bool {
    if items.len() < 2 {
        return false;
    }

    // Longest non-increasing suffix starts at `pivot + 1`.
    let mut pivot = items.len() - 1;
    while pivot > 0 && items[pivot - 1] >= items[pivot] {
        pivot -= 1;
    }
    if pivot == 0 {
        items.reverse();
        return false;
    }
    let pivot = pivot - 1;

    // Rightmost element strictly greater than the pivot.
    let mut successor = items.len() - 1;
    while items[successor] <= items[pivot] {
        successor -= 1;
    }

    items.swap(pivot, successor);
    items[pivot + 1..].reverse();
    true
}

/// Number of distinct arrangements of `items`: n! / Π(count_v!).
///
/// Returns `None` if the count does not fit in a `u128`.
pub fn distinct_arrangements<T: Ord>(items: &[T]) -> Option<u128> {
    let mut counts: BTreeMap<&T, u128> = BTreeMap::new();
    for item in items {
        *counts.entry(item).or_insert(0) += 1;
    }

    // Product of binomials C(placed + k, k), each exact.
    let mut total: u128 = 1;
    let mut placed: u128 = 0;
    for &k in counts.values() {
        placed += k;
        total = total.checked_mul(binomial(placed, k)?)?;
    }
    Some(total)
}

fn binomial(n: u128, k: u128) -> Option<u128> {
    let k = k.min(n - k);
    let mut result: u128 = 1;
    for i in 0..k {
        // result * (n - i) is divisible by (i + 1) at every step.
        result = result.checked_mul(n - i)? / (i + 1);
    }
    Some(result)
}

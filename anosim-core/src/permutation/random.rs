//! Uniform random relabeling.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::domain::LabelAssignment;

/// Overwrite `scratch` with a uniform random shuffle of `base`.
///
/// Each call starts from `base`, so successive draws are independent
/// (sampling with replacement over the space of arrangements).
pub fn reshuffle<R: Rng + ?Sized>(
    base: &LabelAssignment,
    scratch: &mut LabelAssignment,
    rng: &mut R,
) {
    scratch.as_mut_slice().copy_from_slice(base.as_slice());
    scratch.as_mut_slice().shuffle(rng);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn shuffle_preserves_group_sizes() {
        let base = LabelAssignment::new(vec![1, 1, 1, 2, 2, 3]);
        let mut scratch = base.clone();
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..20 {
            reshuffle(&base, &mut scratch, &mut rng);
            assert_eq!(scratch.group_sizes(), base.group_sizes());
        }
    }

    #[test]
    fn same_seed_same_shuffle() {
        let base = LabelAssignment::new((0..12).collect());
        let mut a = base.clone();
        let mut b = base.clone();
        reshuffle(&base, &mut a, &mut StdRng::seed_from_u64(3));
        reshuffle(&base, &mut b, &mut StdRng::seed_from_u64(3));
        assert_eq!(a, b);
    }
}

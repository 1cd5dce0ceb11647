//! Reproducible shuffling of selected entries.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Permute `items` in place; the same seed always gives the same order.
pub fn shuffle_seeded<T>(items: &mut [T], seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    items.shuffle(&mut rng);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SelectedEntry;

    fn entries(n: usize) -> Vec<SelectedEntry> {
        (0..n)
            .map(|i| SelectedEntry {
                id: format!("u{}_dup{}", i / 3, i % 3 + 1),
                text: format!("text {}", i / 3),
                source_id: format!("u{}", i / 3),
            })
            .collect()
    }

    #[test]
    fn test_shuffle_is_permutation() {
        let original = entries(30);
        let mut shuffled = original.clone();
        shuffle_seeded(&mut shuffled, 42);

        assert_eq!(shuffled.len(), original.len());
        let mut a: Vec<&str> = original.iter().map(|e| e.id.as_str()).collect();
        let mut b: Vec<&str> = shuffled.iter().map(|e| e.id.as_str()).collect();
        a.sort();
        b.sort();
        assert_eq!(a, b);
    }

    #[test]
    fn test_shuffle_reproducible() {
        let mut first = entries(30);
        let mut second = entries(30);
        shuffle_seeded(&mut first, 7);
        shuffle_seeded(&mut second, 7);
        assert_eq!(first, second);
    }

    #[test]
    fn test_shuffle_seed_matters() {
        let mut first = entries(30);
        let mut second = entries(30);
        shuffle_seeded(&mut first, 1);
        shuffle_seeded(&mut second, 2);
        assert_ne!(first, second);
    }

    #[test]
    fn test_shuffle_keeps_source_ids() {
        let mut shuffled = entries(12);
        shuffle_seeded(&mut shuffled, 42);
        for e in &shuffled {
            assert!(e.id.starts_with(&format!("{}_dup", e.source_id)));
        }
    }

    #[test]
    fn test_shuffle_empty() {
        let mut empty: Vec<SelectedEntry> = Vec::new();
        shuffle_seeded(&mut empty, 42);
        assert!(empty.is_empty());
    }
}

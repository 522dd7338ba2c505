//! Property-based tests using proptest
//!
//! These tests generate random sequences of operations and verify that the
//! heap invariants hold after every step.

use proptest::prelude::*;
use std::collections::HashMap;

use dheap::min_child::{min_index_blocks, min_index_by};
use dheap::{DHeap, DHeapMap, HeapConfig, Score};

#[derive(Debug, Clone)]
enum Op {
    Push(u8, i32),
    Pop,
    Remove(u8),
    PopLte(i32),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (any::<u8>(), -1000i32..1000).prop_map(|(v, s)| Op::Push(v, s)),
        2 => Just(Op::Pop),
        1 => any::<u8>().prop_map(Op::Remove),
        1 => (-1000i32..1000).prop_map(Op::PopLte),
    ]
}

fn score(s: i32) -> Score {
    Score::new(f64::from(s)).unwrap()
}

/// Drives a DHeapMap alongside a HashMap model and checks every step
fn test_map_against_model(d: usize, ops: Vec<Op>) -> Result<(), TestCaseError> {
    let mut heap: DHeapMap<u8> = DHeapMap::with_d(d).unwrap();
    let mut model: HashMap<u8, i32> = HashMap::new();

    for op in ops {
        match op {
            Op::Push(value, s) => {
                heap.push(value, s).unwrap();
                model.insert(value, s);
            }
            Op::Pop => {
                let expected_min = model.values().min().copied();
                let popped = heap.pop_with_score();
                prop_assert_eq!(popped.map(|(_, s)| s), expected_min.map(score));
                if let Some((value, _)) = popped {
                    prop_assert!(model.remove(&value).is_some());
                }
            }
            Op::Remove(value) => {
                prop_assert_eq!(heap.remove(&value), model.remove(&value).map(score));
            }
            Op::PopLte(threshold) => {
                let expected_min = model.values().min().copied();
                match heap.pop_lte(threshold).unwrap() {
                    Some(value) => {
                        let s = model.remove(&value);
                        prop_assert_eq!(s, expected_min);
                        prop_assert!(s.unwrap() <= threshold);
                    }
                    None => prop_assert!(expected_min.map_or(true, |m| m > threshold)),
                }
            }
        }

        prop_assert!(heap.is_heap());
        prop_assert!(heap.is_consistent());
        prop_assert_eq!(heap.len(), model.len());
        for (value, &s) in &model {
            prop_assert_eq!(heap.score_of(value), Some(&score(s)));
        }
    }
    Ok(())
}

/// Pushes everything, then checks that pops come out sorted
fn test_sorted_extraction(d: usize, scores: Vec<i64>) -> Result<(), TestCaseError> {
    let config = HeapConfig::default().with_d(d).with_capacity(1);
    let mut heap: DHeap<usize> = DHeap::with_config(config).unwrap();
    for (value, &s) in scores.iter().enumerate() {
        heap.push(value, s).unwrap();
        prop_assert!(heap.is_heap());
    }

    let mut popped: Vec<(usize, f64)> = Vec::with_capacity(scores.len());
    while let Some((value, s)) = heap.pop_with_score() {
        popped.push((value, s.get()));
    }
    prop_assert!(popped.windows(2).all(|w| w[0].1 <= w[1].1));

    let mut values: Vec<usize> = popped.iter().map(|&(v, _)| v).collect();
    values.sort_unstable();
    prop_assert_eq!(values, (0..scores.len()).collect::<Vec<_>>());
    for (value, s) in popped {
        prop_assert_eq!(s, scores[value] as f64);
    }
    Ok(())
}

/// pop_all_below returns exactly the entries under the threshold, in order
fn test_pop_all_below(d: usize, scores: Vec<i32>, threshold: i32) -> Result<(), TestCaseError> {
    let mut heap: DHeap<i32> = DHeap::with_d(d).unwrap();
    for &s in &scores {
        heap.push(s, s).unwrap();
    }

    let below = heap.pop_all_below(threshold, Vec::new()).unwrap();
    let mut expected: Vec<i32> = scores.iter().copied().filter(|&s| s < threshold).collect();
    expected.sort_unstable();
    prop_assert_eq!(below, expected);
    prop_assert_eq!(
        heap.len(),
        scores.iter().filter(|&&s| s >= threshold).count()
    );
    let floor = f64::from(threshold);
    prop_assert!(heap.peek_score().map_or(true, |s| s.get() >= floor));
    Ok(())
}

proptest! {
    #[test]
    fn test_map_model_d2(ops in prop::collection::vec(op_strategy(), 0..200)) {
        test_map_against_model(2, ops)?;
    }

    #[test]
    fn test_map_model_d4(ops in prop::collection::vec(op_strategy(), 0..200)) {
        test_map_against_model(4, ops)?;
    }

    #[test]
    fn test_map_model_random_d(d in 2usize..12, ops in prop::collection::vec(op_strategy(), 0..200)) {
        test_map_against_model(d, ops)?;
    }

    #[test]
    fn test_sorted_extraction_random(
        d in 2usize..20,
        scores in prop::collection::vec(any::<i64>(), 0..300),
    ) {
        test_sorted_extraction(d, scores)?;
    }

    #[test]
    fn test_sorted_extraction_few_distinct(
        d in 2usize..6,
        scores in prop::collection::vec(0i64..4, 0..300),
    ) {
        test_sorted_extraction(d, scores)?;
    }

    #[test]
    fn test_pop_all_below_random(
        d in 2usize..9,
        scores in prop::collection::vec(-50i32..50, 0..100),
        threshold in -60i32..60,
    ) {
        test_pop_all_below(d, scores, threshold)?;
    }

    #[test]
    fn test_block_min_matches_naive(raw in prop::collection::vec(-8i32..8, 1..200)) {
        let scores: Vec<Score> = raw.into_iter().map(score).collect();
        prop_assert_eq!(
            min_index_blocks(&scores),
            min_index_by(&scores, |a, b| a < b)
        );
    }
}

/// Every length from 1 to 64 with the minimum tied at every pair of positions
#[test]
fn test_block_min_tie_break_exhaustive() {
    for len in 1..=64usize {
        for first in 0..len {
            for second in first..len {
                let mut scores: Vec<Score> = (0..len).map(|i| score(10 + i as i32 % 5)).collect();
                scores[first] = score(-1);
                scores[second] = score(-1);
                let label = format!("len={len} ties at {first},{second}");
                assert_eq!(min_index_blocks(&scores), first, "{label}");
                assert_eq!(min_index_by(&scores, |a, b| a < b), first);
            }
        }
    }
}

//! Loop broadcasting and index normalization shared by every loop node.
//!
//! Loops of unequal length are broadcast by repeating their last element.
//! Indices wrap into the loop instead of going out of range.

pub mod mutate;
pub mod ops;

use crate::model::value::{Loop, LoopList};

/// Length of the longest loop, 0 when there are none.
pub fn longest_length(loops: &[Loop]) -> usize {
    loops.iter().map(Vec::len).max().unwrap_or(0)
}

/// Extends `values` to `length` by repeating its last element. Loops that are
/// already long enough, and empty loops, are returned unchanged.
pub fn lengthen(values: &Loop, length: usize) -> Loop {
    let mut lengthened = values.clone();
    if let Some(last) = values.last() {
        while lengthened.len() < length {
            lengthened.push(last.clone());
        }
    }
    lengthened
}

/// Broadcasts every loop to the longest length.
pub fn lengthen_all(loops: &[Loop]) -> LoopList {
    let length = longest_length(loops);
    loops.iter().map(|l| lengthen(l, length)).collect()
}

/// Wraps `n` into `[0, length)`. A zero length yields 0.
pub fn friendly_index(n: i64, length: usize) -> usize {
    if length == 0 {
        return 0;
    }
    let length = length as i64;
    (((n % length) + length) % length) as usize
}

/// Index wrap used by insertion, which may target one past the end.
///
/// Non-negative indices wrap modulo `length`; negative ones count backward
/// from one past the end, so -1 appends.
pub fn insert_friendly_index(n: i64, length: usize) -> usize {
    if length == 0 {
        return 0;
    }
    if n >= 0 {
        (n % length as i64) as usize
    } else {
        n.rem_euclid(length as i64 + 1) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::value::Value;

    fn numbers(values: &[f64]) -> Loop {
        values.iter().map(|v| Value::number(*v)).collect()
    }

    #[test]
    fn test_lengthen_repeats_last_element() {
        let loops = vec![numbers(&[1.0, 2.0]), numbers(&[5.0, 6.0, 7.0, 8.0]), numbers(&[9.0])];
        let lengthened = lengthen_all(&loops);
        for (original, extended) in loops.iter().zip(&lengthened) {
            assert_eq!(extended.len(), 4);
            for (j, value) in extended.iter().enumerate() {
                assert_eq!(value, &original[j.min(original.len() - 1)]);
            }
        }
        assert_eq!(lengthened[0], numbers(&[1.0, 2.0, 2.0, 2.0]));
    }

    #[test]
    fn test_lengthen_empty_stays_empty() {
        assert!(lengthen(&Vec::new(), 3).is_empty());
        assert_eq!(longest_length(&[]), 0);
    }

    #[test]
    fn test_friendly_index_wraps() {
        for length in 1..6usize {
            for n in -20i64..20 {
                let wrapped = friendly_index(n, length);
                assert!(wrapped < length);
                assert_eq!(friendly_index(n + length as i64, length), wrapped);
            }
        }
        assert_eq!(friendly_index(-1, 3), 2);
        assert_eq!(friendly_index(5, 0), 0);
    }

    #[test]
    fn test_insert_friendly_index() {
        assert_eq!(insert_friendly_index(1, 3), 1);
        assert_eq!(insert_friendly_index(4, 3), 1);
        assert_eq!(insert_friendly_index(-1, 3), 3);
        assert_eq!(insert_friendly_index(-4, 3), 0);
        assert_eq!(insert_friendly_index(-5, 3), 3);
    }
}

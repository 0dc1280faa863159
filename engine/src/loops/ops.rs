//! Stateless loop operations.
//!
//! Each operation is total: an empty or malformed input yields a
//! single-element default loop rather than an empty one.

use super::{friendly_index, lengthen, longest_length};
use crate::model::value::{Loop, Value, ValueKind, indices_loop};

/// Longest loop an operation will build from a requested count.
pub const MAX_LOOP_LENGTH: usize = 100_000;

/// `[value]` when `values` is empty, otherwise `values`.
pub(crate) fn non_empty(values: Loop, fallback: impl FnOnce() -> Value) -> Loop {
    if values.is_empty() {
        vec![fallback()]
    } else {
        values
    }
}

fn first_kind(values: &Loop) -> ValueKind {
    values.first().map(Value::kind).unwrap_or(ValueKind::Number)
}

/// Index loop `[0 .. count - 1]`, with `count` read from the first value and
/// clamped to `[1, MAX_LOOP_LENGTH]`.
pub fn loop_indices(count: &Loop) -> Loop {
    let requested = count.first().map(Value::as_int).unwrap_or(1).max(1);
    let count = usize::try_from(requested).unwrap_or(MAX_LOOP_LENGTH);
    if count > MAX_LOOP_LENGTH {
        log::warn!("loop count {} capped to {}", requested, MAX_LOOP_LENGTH);
    }
    indices_loop(count.min(MAX_LOOP_LENGTH))
}

/// `[len]` as a single number.
pub fn count(values: &Loop) -> Loop {
    vec![Value::number(values.len() as f64)]
}

/// Repeats each input element `include[i]` times.
///
/// Both loops are broadcast to the longest length; the input is read
/// cyclically against its original length. Negative counts exclude. The
/// output stops growing at `MAX_LOOP_LENGTH`.
pub fn filter(input: &Loop, include: &Loop) -> (Loop, Loop) {
    let kind = first_kind(input);
    if input.is_empty() {
        log::warn!("loopFilter received an empty input loop");
        return (vec![kind.default_value()], indices_loop(1));
    }

    let length = longest_length(&[input.clone(), include.clone()]);
    let include = lengthen(include, length);
    let mut filtered = Vec::new();
    for i in 0..length {
        let value = &input[i % input.len()];
        let repeats = include.get(i).map(Value::as_int).unwrap_or(1).max(0);
        let room = MAX_LOOP_LENGTH - filtered.len();
        let repeats = usize::try_from(repeats).unwrap_or(room);
        if repeats > room {
            log::warn!("loopFilter output capped to {} entries", MAX_LOOP_LENGTH);
            filtered.extend(std::iter::repeat_n(value.clone(), room));
            break;
        }
        filtered.extend(std::iter::repeat_n(value.clone(), repeats));
    }

    let filtered = non_empty(filtered, || input[0].default_false());
    let indices = indices_loop(filtered.len());
    (filtered, indices)
}

/// Picks `values[friendly(index)]` for each index, wrapping against the
/// un-broadcast value length. The result is no longer than the index loop.
pub fn select(values: &Loop, index_loop: &Loop) -> (Loop, Loop) {
    if values.is_empty() {
        log::warn!("loopSelect received an empty value loop");
        return (vec![ValueKind::Number.default_value()], indices_loop(1));
    }
    if index_loop.is_empty() {
        return (vec![values[0].clone()], indices_loop(1));
    }

    let length = longest_length(&[values.clone(), index_loop.clone()]);
    let adjusted_values = lengthen(values, length);
    let adjusted_indices = lengthen(index_loop, length);

    let mut selected: Loop = adjusted_indices
        .iter()
        .map(|index| adjusted_values[friendly_index(index.as_int(), values.len())].clone())
        .collect();
    selected.truncate(index_loop.len());

    let indices = indices_loop(selected.len());
    (selected, indices)
}

/// Removes structurally equal duplicates, keeping first occurrences.
/// The index loop counts the deduped loop's own positions.
pub fn dedupe(values: &Loop) -> (Loop, Loop) {
    let mut deduped: Loop = Vec::with_capacity(values.len());
    for value in values {
        if !deduped.contains(value) {
            deduped.push(value.clone());
        }
    }
    let deduped = non_empty(deduped, || ValueKind::Number.default_value());
    let indices = indices_loop(deduped.len());
    (deduped, indices)
}

pub fn reverse(values: &Loop) -> Loop {
    let reversed: Loop = values.iter().rev().cloned().collect();
    non_empty(reversed, || ValueKind::Number.default_value())
}

pub fn sum(values: &Loop) -> Loop {
    vec![Value::number(values.iter().map(Value::as_number).sum())]
}

/// Exclusive prefix sum: `out[0] = 0`, `out[i] = sum(in[..i])`.
pub fn running_total(values: &Loop) -> Loop {
    let mut total = 0.0;
    let totals: Loop = values
        .iter()
        .map(|value| {
            let current = total;
            total += value.as_number();
            Value::number(current)
        })
        .collect();
    non_empty(totals, || Value::number(0.0))
}

/// Collapses the loop into one JSON array value.
pub fn to_array(values: &Loop) -> Loop {
    let array = values.iter().map(Value::to_json).collect();
    vec![Value::Json(serde_json::Value::Array(array))]
}

/// Expands the first JSON array in `input` into `(indices, values)`. A
/// non-array value is treated as a one-element array.
pub fn over_array(input: &Loop) -> (Loop, Loop) {
    let values: Loop = match input.first() {
        Some(Value::Json(serde_json::Value::Array(items))) => {
            items.iter().map(Value::from_json).collect()
        }
        Some(Value::Json(other)) => vec![Value::from_json(other)],
        Some(other) => vec![other.clone()],
        None => Vec::new(),
    };
    let values = non_empty(values, || ValueKind::Json.default_value());
    (indices_loop(values.len()), values)
}

/// Collapses each input loop to a single value and returns
/// `(indices, values)`.
///
/// An input carrying more than one value is flattened to its first value's
/// falsy default, not to the first value itself.
pub fn build(inputs: &[Loop]) -> (Loop, Loop) {
    let values: Loop = inputs
        .iter()
        .map(|input| match input.as_slice() {
            [] => ValueKind::Number.default_value(),
            [single] => single.clone(),
            [first, ..] => first.default_false(),
        })
        .collect();
    let values = non_empty(values, || ValueKind::Number.default_value());
    (indices_loop(values.len()), values)
}

//! Lifting single-index operations to whole loops.

use crate::loops::lengthen_all;
use crate::model::value::{Loop, LoopList, Value};

/// Applies `op` once per index over the lengthened `inputs` and transposes
/// the per-index rows into `output_count` output loops.
///
/// `op` receives the loop index and that index's input values, one per input
/// port, and returns one value per output port.
pub fn lift<F>(inputs: &[Loop], output_count: usize, mut op: F) -> LoopList
where
    F: FnMut(usize, &[Value]) -> Vec<Value>,
{
    let lengthened = lengthen_all(inputs);
    let length = lengthened.iter().map(Vec::len).max().unwrap_or(0);

    let rows: Vec<Vec<Value>> = (0..length)
        .map(|index| {
            let row: Vec<Value> = lengthened
                .iter()
                .map(|values| match values.get(index) {
                    Some(value) => value.clone(),
                    None => {
                        log::warn!("Empty input loop at index {}, using default", index);
                        Value::default()
                    }
                })
                .collect();
            op(index, &row)
        })
        .collect();

    transpose(rows, output_count)
}

/// Index-major rows to port-major loops. Short rows leave gaps that are
/// filled with the port's last value.
pub fn transpose(rows: Vec<Vec<Value>>, output_count: usize) -> LoopList {
    let mut outputs: LoopList = vec![Vec::with_capacity(rows.len()); output_count];
    for row in rows {
        let mut row = row.into_iter();
        for output in outputs.iter_mut() {
            match row.next() {
                Some(value) => output.push(value),
                None => {
                    debug_assert!(false, "lifted op returned too few outputs");
                    let filler = output.last().cloned().unwrap_or_default();
                    output.push(filler);
                }
            }
        }
    }
    outputs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(values: &[f64]) -> Loop {
        values.iter().map(|v| Value::number(*v)).collect()
    }

    #[test]
    fn test_lift_broadcasts_and_transposes() {
        let inputs = vec![numbers(&[1.0, 2.0, 3.0]), numbers(&[10.0])];
        let outputs = lift(&inputs, 2, |index, row| {
            vec![
                Value::number(row[0].as_number() + row[1].as_number()),
                Value::number(index as f64),
            ]
        });
        assert_eq!(outputs[0], numbers(&[11.0, 12.0, 13.0]));
        assert_eq!(outputs[1], numbers(&[0.0, 1.0, 2.0]));
    }

    #[test]
    fn test_lift_empty_inputs() {
        let outputs = lift(&[Vec::new()], 1, |_, row| row.to_vec());
        assert_eq!(outputs, vec![Vec::<Value>::new()]);
    }
}

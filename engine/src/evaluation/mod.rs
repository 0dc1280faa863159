//! Node evaluation protocol.
//!
//! A patch is evaluated either purely, as a total function of its input
//! loops, or impurely, with access to graph time, its own previous outputs,
//! its ephemeral observer and the media coordinator. Evaluation never fails:
//! whatever an evaluator returns is repaired into one non-empty loop per
//! declared output.

pub mod lift;
pub mod observer;
mod patches;

use log::warn;

use crate::media::MediaCoordinator;
use crate::model::node::{Node, NodeId, NodeKind};
use crate::model::value::{GraphTime, Loop, LoopList, ValueKind};

pub use lift::{lift, transpose};
pub use observer::EphemeralObserver;

/// Everything an impure evaluator may read or write.
pub struct ImpureContext<'a> {
    pub node_id: NodeId,
    pub time: GraphTime,
    pub inputs: &'a [Loop],
    pub previous_outputs: &'a [Loop],
    pub observer: &'a mut EphemeralObserver,
    pub media: &'a mut MediaCoordinator,
}

#[derive(Clone, Copy)]
pub enum Evaluation {
    Pure(fn(&[Loop]) -> LoopList),
    Impure(fn(&mut ImpureContext<'_>) -> LoopList),
}

impl Evaluation {
    pub fn is_pure(&self) -> bool {
        matches!(self, Evaluation::Pure(_))
    }

    /// Runs a pure evaluation. Calling this on an impure evaluation is a
    /// programmer error.
    pub fn evaluate_pure(&self, inputs: &[Loop]) -> LoopList {
        match self {
            Evaluation::Pure(f) => f(inputs),
            Evaluation::Impure(_) => {
                debug_assert!(false, "impure evaluation invoked as pure");
                Vec::new()
            }
        }
    }
}

/// Evaluates `node` at `time` with `inputs` (one loop per input port) and
/// returns its new outputs. The caller commits them.
pub fn evaluate(
    node: &mut Node,
    time: GraphTime,
    inputs: &[Loop],
    media: &mut MediaCoordinator,
) -> LoopList {
    let outputs = match node.kind {
        NodeKind::Layer(_) => return Vec::new(),
        NodeKind::Group => inputs.to_vec(),
        NodeKind::Patch(patch) => match patch.evaluation() {
            Evaluation::Pure(f) => f(inputs),
            Evaluation::Impure(f) => {
                let mut ctx = ImpureContext {
                    node_id: node.id,
                    time,
                    inputs,
                    previous_outputs: &node.outputs,
                    observer: &mut node.observer,
                    media,
                };
                f(&mut ctx)
            }
        },
    };
    repair_outputs(outputs, &node.output_kinds, &node.title)
}

/// Brings `outputs` to one non-empty loop per entry of `kinds`, substituting
/// kind defaults where needed.
pub fn repair_outputs(mut outputs: LoopList, kinds: &[ValueKind], title: &str) -> LoopList {
    if outputs.len() != kinds.len() {
        warn!(
            "{} produced {} outputs, expected {}",
            title,
            outputs.len(),
            kinds.len()
        );
        outputs.resize_with(kinds.len(), Vec::new);
    }
    for (index, (output, kind)) in outputs.iter_mut().zip(kinds).enumerate() {
        if output.is_empty() {
            warn!("{} output {} was empty, using default", title, index);
            output.push(kind.default_value());
        }
    }
    outputs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::value::Value;
    use crate::nodes::Patch;

    fn numbers(values: &[f64]) -> Loop {
        values.iter().map(|v| Value::number(*v)).collect()
    }

    #[test]
    fn test_pure_evaluation_is_repeatable() {
        let evaluation = Patch::RunningTotal.evaluation();
        assert!(evaluation.is_pure());
        let inputs = vec![numbers(&[1.0, 2.0, 3.0])];
        assert_eq!(evaluation.evaluate_pure(&inputs), evaluation.evaluate_pure(&inputs));
    }

    #[test]
    fn test_repair_fills_missing_and_empty_outputs() {
        let repaired = repair_outputs(
            vec![Vec::new()],
            &[ValueKind::String, ValueKind::Number],
            "test",
        );
        assert_eq!(
            repaired,
            vec![vec![Value::string("")], vec![Value::number(0.0)]]
        );
    }

    #[test]
    fn test_evaluate_group_passes_through() {
        let mut node = Node::group(2);
        let mut media = MediaCoordinator::disabled();
        let inputs = vec![numbers(&[1.0]), vec![Value::string("a")]];
        assert_eq!(evaluate(&mut node, 0.0, &inputs, &mut media), inputs);
    }

    #[test]
    fn test_evaluate_impure_reads_previous_outputs() {
        let mut node = Node::patch(Patch::SampleAndHold);
        let mut media = MediaCoordinator::disabled();

        let sample = vec![
            numbers(&[5.0]),
            vec![Value::pulse(1.0)],
            vec![Value::pulse(0.0)],
        ];
        node.outputs = evaluate(&mut node, 1.0, &sample, &mut media);
        assert_eq!(node.outputs, vec![numbers(&[5.0])]);

        let hold = vec![
            numbers(&[8.0]),
            vec![Value::pulse(1.0)],
            vec![Value::pulse(0.0)],
        ];
        node.outputs = evaluate(&mut node, 2.0, &hold, &mut media);
        assert_eq!(node.outputs, vec![numbers(&[5.0])]);
    }
}

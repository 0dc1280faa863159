//! Evaluators for the built-in patches.

use ordered_float::OrderedFloat;

use super::lift::lift;
use super::observer::EphemeralObserver;
use super::{Evaluation, ImpureContext};
use crate::clock::{should_pulse, some_index_pulsed};
use crate::loops::mutate::sample_and_hold;
use crate::loops::ops;
use crate::model::geometry::{Vec2, Vec3};
use crate::model::value::{Loop, LoopList, Value, indices_loop};
use crate::nodes::Patch;

static EMPTY: Loop = Vec::new();

/// Input loop `index`, or an empty loop when the port is missing.
fn port(inputs: &[Loop], index: usize) -> &Loop {
    inputs.get(index).unwrap_or_else(|| {
        log::warn!("Missing input port {}", index);
        &EMPTY
    })
}

impl Patch {
    pub fn evaluation(&self) -> Evaluation {
        match self {
            Patch::Loop => Evaluation::Pure(eval_loop),
            Patch::LoopBuilder => Evaluation::Pure(eval_loop_builder),
            Patch::LoopCount => Evaluation::Pure(eval_loop_count),
            Patch::LoopDedupe => Evaluation::Pure(eval_loop_dedupe),
            Patch::LoopFilter => Evaluation::Pure(eval_loop_filter),
            Patch::LoopOverArray => Evaluation::Pure(eval_loop_over_array),
            Patch::LoopReverse => Evaluation::Pure(eval_loop_reverse),
            Patch::LoopSelect => Evaluation::Pure(eval_loop_select),
            Patch::LoopSum => Evaluation::Pure(eval_loop_sum),
            Patch::LoopToArray => Evaluation::Pure(eval_loop_to_array),
            Patch::RunningTotal => Evaluation::Pure(eval_running_total),
            Patch::Add => Evaluation::Pure(eval_add),
            Patch::LoopInsert => Evaluation::Impure(eval_loop_insert),
            Patch::LoopRemove => Evaluation::Impure(eval_loop_remove),
            Patch::LoopShuffle => Evaluation::Impure(eval_loop_shuffle),
            Patch::LoopOptionSwitch => Evaluation::Impure(eval_loop_option_switch),
            Patch::SampleAndHold => Evaluation::Impure(eval_sample_and_hold),
            Patch::MediaImport => Evaluation::Impure(eval_media_import),
        }
    }
}

// ---------------------------------------------------------------------------
// Pure
// ---------------------------------------------------------------------------

fn eval_loop(inputs: &[Loop]) -> LoopList {
    vec![ops::loop_indices(port(inputs, 0))]
}

fn eval_loop_builder(inputs: &[Loop]) -> LoopList {
    let (indices, values) = ops::build(inputs);
    vec![indices, values]
}

fn eval_loop_count(inputs: &[Loop]) -> LoopList {
    vec![ops::count(port(inputs, 0))]
}

fn eval_loop_dedupe(inputs: &[Loop]) -> LoopList {
    let (deduped, indices) = ops::dedupe(port(inputs, 0));
    vec![deduped, indices]
}

fn eval_loop_filter(inputs: &[Loop]) -> LoopList {
    let (filtered, indices) = ops::filter(port(inputs, 0), port(inputs, 1));
    vec![filtered, indices]
}

fn eval_loop_over_array(inputs: &[Loop]) -> LoopList {
    let (indices, items) = ops::over_array(port(inputs, 0));
    vec![indices, items]
}

fn eval_loop_reverse(inputs: &[Loop]) -> LoopList {
    vec![ops::reverse(port(inputs, 0))]
}

fn eval_loop_select(inputs: &[Loop]) -> LoopList {
    let (selected, indices) = ops::select(port(inputs, 0), port(inputs, 1));
    vec![selected, indices]
}

fn eval_loop_sum(inputs: &[Loop]) -> LoopList {
    vec![ops::sum(port(inputs, 0))]
}

fn eval_loop_to_array(inputs: &[Loop]) -> LoopList {
    vec![ops::to_array(port(inputs, 0))]
}

fn eval_running_total(inputs: &[Loop]) -> LoopList {
    vec![ops::running_total(port(inputs, 0))]
}

fn eval_add(inputs: &[Loop]) -> LoopList {
    lift(inputs, 1, |_, row| {
        let sum = match row {
            [a, b] => add_values(a, b),
            _ => Value::number(row.iter().map(Value::as_number).sum()),
        };
        vec![sum]
    })
}

/// Strings concatenate, points add componentwise, everything else adds as
/// numbers.
fn add_values(a: &Value, b: &Value) -> Value {
    match (a, b) {
        (Value::String(a), Value::String(b)) => Value::String(format!("{}{}", a, b)),
        (Value::Position(a), Value::Position(b)) => Value::Position(add_vec2(a, b)),
        (Value::Size(a), Value::Size(b)) => Value::Size(add_vec2(a, b)),
        (Value::Point3D(a), Value::Point3D(b)) => Value::Point3D(Vec3 {
            x: a.x + b.x,
            y: a.y + b.y,
            z: a.z + b.z,
        }),
        _ => Value::Number(OrderedFloat(a.as_number() + b.as_number())),
    }
}

fn add_vec2(a: &Vec2, b: &Vec2) -> Vec2 {
    Vec2 {
        x: a.x + b.x,
        y: a.y + b.y,
    }
}

// ---------------------------------------------------------------------------
// Impure
// ---------------------------------------------------------------------------

fn observer_mismatch(patch: Patch) -> LoopList {
    debug_assert!(false, "{} evaluated with the wrong ephemeral observer", patch);
    log::error!("{} has an unexpected ephemeral observer", patch);
    Vec::new()
}

fn with_indices(values: Loop) -> LoopList {
    let indices = indices_loop(values.len());
    vec![values, indices]
}

fn eval_loop_insert(ctx: &mut ImpureContext) -> LoopList {
    let EphemeralObserver::Looping(state) = &mut *ctx.observer else {
        return observer_mismatch(Patch::LoopInsert);
    };
    let pulsed = some_index_pulsed(port(ctx.inputs, 3), ctx.time);
    let current = ctx.previous_outputs.first().unwrap_or(&EMPTY);
    let inserted = state.insert(
        port(ctx.inputs, 0),
        current,
        port(ctx.inputs, 1),
        port(ctx.inputs, 2),
        pulsed,
    );
    with_indices(inserted)
}

fn eval_loop_remove(ctx: &mut ImpureContext) -> LoopList {
    let EphemeralObserver::Looping(state) = &mut *ctx.observer else {
        return observer_mismatch(Patch::LoopRemove);
    };
    let pulsed = some_index_pulsed(port(ctx.inputs, 2), ctx.time);
    let current = ctx.previous_outputs.first().unwrap_or(&EMPTY);
    let removed = state.remove(port(ctx.inputs, 0), current, port(ctx.inputs, 1), pulsed);
    with_indices(removed)
}

fn eval_loop_shuffle(ctx: &mut ImpureContext) -> LoopList {
    let EphemeralObserver::Shuffle(state) = &mut *ctx.observer else {
        return observer_mismatch(Patch::LoopShuffle);
    };
    let pulsed = some_index_pulsed(port(ctx.inputs, 1), ctx.time);
    vec![state.shuffle(port(ctx.inputs, 0), pulsed)]
}

fn eval_loop_option_switch(ctx: &mut ImpureContext) -> LoopList {
    let EphemeralObserver::OptionSwitch(state) = &mut *ctx.observer else {
        return observer_mismatch(Patch::LoopOptionSwitch);
    };
    let selected = state.update(port(ctx.inputs, 0), ctx.time);
    vec![vec![Value::number(selected as f64)]]
}

fn eval_sample_and_hold(ctx: &mut ImpureContext) -> LoopList {
    let time = ctx.time;
    let previous = ctx.previous_outputs.first();
    let fired = |value: &Value| value.as_pulse().is_some_and(|t| should_pulse(t, time));
    lift(ctx.inputs, 1, |index, row| {
        let [value, sample, reset] = row else {
            log::warn!("sampleAndHold expects 3 inputs, got {}", row.len());
            return vec![Value::default()];
        };
        let held = previous.and_then(|p| p.get(index));
        vec![sample_and_hold(value, fired(sample), fired(reset), held)]
    })
}

fn eval_media_import(ctx: &mut ImpureContext) -> LoopList {
    let node_id = ctx.node_id;
    let EphemeralObserver::Media(observer) = &mut *ctx.observer else {
        return observer_mismatch(Patch::MediaImport);
    };
    let media = &mut *ctx.media;

    let outputs = lift(ctx.inputs, 1, |index, row| {
        let slot = observer.slot(index);
        vec![media.request(node_id, index, &row[0], &slot)]
    });

    let len = outputs.first().map(Vec::len).unwrap_or(0);
    observer.truncate(len);
    media.cancel_from(node_id, len);
    outputs
}

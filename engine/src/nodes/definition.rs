//! Patch kinds and their port definitions.

use serde::{Deserialize, Serialize};

use crate::model::geometry::Color;
use crate::model::port::{InputPortDefinition, OutputPortDefinition};
use crate::model::value::{Loop, Value, ValueKind};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Patch {
    Loop,
    LoopBuilder,
    LoopCount,
    LoopDedupe,
    LoopFilter,
    LoopInsert,
    LoopOptionSwitch,
    LoopOverArray,
    LoopRemove,
    LoopReverse,
    LoopSelect,
    LoopShuffle,
    LoopSum,
    LoopToArray,
    RunningTotal,
    Add,
    SampleAndHold,
    MediaImport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatchCategory {
    Loop,
    Math,
    Logic,
    Media,
}

impl std::fmt::Display for PatchCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PatchCategory::Loop => "Loop",
            PatchCategory::Math => "Math",
            PatchCategory::Logic => "Logic",
            PatchCategory::Media => "Media",
        };
        write!(f, "{}", s)
    }
}

/// What a patch node looks like when instantiated: its ports, their initial
/// values, and metadata.
#[derive(Debug, Clone)]
pub struct PatchDefinition {
    pub patch: Patch,
    pub display_name: String,
    pub category: PatchCategory,
    pub description: String,
    pub inputs: Vec<InputPortDefinition>,
    pub outputs: Vec<OutputPortDefinition>,
}

impl PatchDefinition {
    pub fn new(patch: Patch, display_name: &str, category: PatchCategory) -> Self {
        Self {
            patch,
            display_name: display_name.to_string(),
            category,
            description: String::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = desc.to_string();
        self
    }

    pub fn with_inputs(mut self, inputs: Vec<InputPortDefinition>) -> Self {
        self.inputs = inputs;
        self
    }

    pub fn with_outputs(mut self, outputs: Vec<OutputPortDefinition>) -> Self {
        self.outputs = outputs;
        self
    }
}

// ---------------------------------------------------------------------------
// Port helpers
// ---------------------------------------------------------------------------

fn inp(label: &str, kind: ValueKind) -> InputPortDefinition {
    InputPortDefinition::new(label, kind)
}

/// Input that accepts any kind, starting out with `default`.
fn any(label: &str, default: Loop) -> InputPortDefinition {
    let kind = default.first().map(Value::kind).unwrap_or(ValueKind::Number);
    InputPortDefinition::new(label, kind)
        .with_default(default)
        .polymorphic()
}

fn out(label: &str, kind: ValueKind) -> OutputPortDefinition {
    OutputPortDefinition::new(label, kind)
}

fn def(patch: Patch, name: &str, category: PatchCategory) -> PatchDefinition {
    PatchDefinition::new(patch, name, category)
}

fn colors() -> Loop {
    [Color::RED, Color::YELLOW, Color::BLUE, Color::GREEN]
        .into_iter()
        .map(Value::Color)
        .collect()
}

/// Loop-in, loop-plus-index-out shape shared by several loop patches.
fn loop_with_index(patch: Patch, name: &str, desc: &str) -> PatchDefinition {
    def(patch, name, PatchCategory::Loop)
        .with_description(desc)
        .with_inputs(vec![any("Loop", colors())])
        .with_outputs(vec![out("Loop", ValueKind::Color), out("Index", ValueKind::Number)])
}

impl Patch {
    pub const ALL: &'static [Patch] = &[
        Patch::Loop,
        Patch::LoopBuilder,
        Patch::LoopCount,
        Patch::LoopDedupe,
        Patch::LoopFilter,
        Patch::LoopInsert,
        Patch::LoopOptionSwitch,
        Patch::LoopOverArray,
        Patch::LoopRemove,
        Patch::LoopReverse,
        Patch::LoopSelect,
        Patch::LoopShuffle,
        Patch::LoopSum,
        Patch::LoopToArray,
        Patch::RunningTotal,
        Patch::Add,
        Patch::SampleAndHold,
        Patch::MediaImport,
    ];

    pub fn definition(&self) -> PatchDefinition {
        use ValueKind::*;
        let patch = *self;
        match patch {
            Patch::Loop => def(patch, "Loop", PatchCategory::Loop)
                .with_description("Creates an index loop with the given number of entries.")
                .with_inputs(vec![inp("Count", Number).with_default(vec![Value::number(3.0)])])
                .with_outputs(vec![out("Index", Number)]),
            Patch::LoopBuilder => def(patch, "Loop Builder", PatchCategory::Loop)
                .with_description("Builds a loop from up to five individual values.")
                .with_inputs(
                    (0..5)
                        .map(|i| any(&format!("Value {}", i), vec![Value::number(i as f64)]))
                        .collect(),
                )
                .with_outputs(vec![out("Index", Number), out("Values", Number)]),
            Patch::LoopCount => def(patch, "Loop Count", PatchCategory::Loop)
                .with_description("Number of entries in a loop.")
                .with_inputs(vec![any("Loop", colors())])
                .with_outputs(vec![out("Count", Number)]),
            Patch::LoopDedupe => loop_with_index(
                patch,
                "Loop Dedupe",
                "Removes duplicate entries, keeping the first of each.",
            ),
            Patch::LoopFilter => def(patch, "Loop Filter", PatchCategory::Loop)
                .with_description("Repeats each entry by its include count; zero drops it.")
                .with_inputs(vec![
                    any("Input", colors()),
                    inp("Include", Number).with_default(vec![Value::number(1.0)]),
                ])
                .with_outputs(vec![out("Loop", Color), out("Index", Number)]),
            Patch::LoopInsert => def(patch, "Loop Insert", PatchCategory::Loop)
                .with_description("Inserts a value into a loop when pulsed.")
                .with_inputs(vec![
                    any("Loop", colors()),
                    any("Value", vec![Value::Color(crate::model::Color::PURPLE)]),
                    inp("Index", Number),
                    inp("Insert", Pulse),
                ])
                .with_outputs(vec![out("Loop", Color), out("Index", Number)]),
            Patch::LoopOptionSwitch => def(patch, "Loop Option Switch", PatchCategory::Logic)
                .with_description("Outputs the index of the entry that pulsed most recently.")
                .with_inputs(vec![inp("Set", Pulse).with_default(vec![Value::pulse(0.0); 3])])
                .with_outputs(vec![out("Option", Number)]),
            Patch::LoopOverArray => def(patch, "Loop over Array", PatchCategory::Loop)
                .with_description("Expands a JSON array into a loop.")
                .with_inputs(vec![
                    inp("Array", Json).with_default(vec![Value::Json(serde_json::json!([]))]),
                ])
                .with_outputs(vec![out("Index", Number), out("Items", Json)]),
            Patch::LoopRemove => def(patch, "Loop Remove", PatchCategory::Loop)
                .with_description("Removes an entry from a loop when pulsed.")
                .with_inputs(vec![
                    any("Loop", colors()),
                    inp("Index", Number).with_default(vec![Value::number(-1.0)]),
                    inp("Remove", Pulse),
                ])
                .with_outputs(vec![out("Loop", Color), out("Index", Number)]),
            Patch::LoopReverse => def(patch, "Loop Reverse", PatchCategory::Loop)
                .with_description("Reverses the order of a loop.")
                .with_inputs(vec![any("Loop", colors())])
                .with_outputs(vec![out("Loop", Color)]),
            Patch::LoopSelect => def(patch, "Loop Select", PatchCategory::Loop)
                .with_description("Picks entries of a loop by index.")
                .with_inputs(vec![
                    any("Input", vec![Value::string("")]),
                    inp("Index Loop", Number),
                ])
                .with_outputs(vec![out("Loop", String), out("Index", Number)]),
            Patch::LoopShuffle => def(patch, "Loop Shuffle", PatchCategory::Loop)
                .with_description("Randomly reorders a loop when pulsed.")
                .with_inputs(vec![any("Loop", colors()), inp("Shuffle", Pulse)])
                .with_outputs(vec![out("Loop", Color)]),
            Patch::LoopSum => def(patch, "Loop Sum", PatchCategory::Loop)
                .with_description("Sum of every entry in a loop.")
                .with_inputs(vec![inp("Loop", Number)])
                .with_outputs(vec![out("Sum", Number)]),
            Patch::LoopToArray => def(patch, "Loop to Array", PatchCategory::Loop)
                .with_description("Collapses a loop into a single JSON array.")
                .with_inputs(vec![any("Loop", vec![Value::number(0.0)])])
                .with_outputs(vec![out("Array", Json)]),
            Patch::RunningTotal => def(patch, "Running Total", PatchCategory::Math)
                .with_description("Sum of all entries before each index.")
                .with_inputs(vec![inp("Loop", Number)])
                .with_outputs(vec![out("Loop", Number)]),
            Patch::Add => def(patch, "Add", PatchCategory::Math)
                .with_description("Adds two values index by index.")
                .with_inputs(vec![
                    any("Value", vec![Value::number(0.0)]),
                    any("Value", vec![Value::number(0.0)]),
                ])
                .with_outputs(vec![out("Sum", Number)]),
            Patch::SampleAndHold => def(patch, "Sample and Hold", PatchCategory::Logic)
                .with_description("Holds the input value from the last sample pulse.")
                .with_inputs(vec![
                    any("Value", vec![Value::number(0.0)]),
                    inp("Sample", Pulse),
                    inp("Reset", Pulse),
                ])
                .with_outputs(vec![out("Value", Number)]),
            Patch::MediaImport => def(patch, "Media Import", PatchCategory::Media)
                .with_description("Loads media in the background.")
                .with_inputs(vec![inp("Media", Media)])
                .with_outputs(vec![out("Media", Media)]),
        }
    }
}

impl std::fmt::Display for Patch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.definition().display_name)
    }
}

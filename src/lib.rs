//! This crate provides the core of a single-tape Turing Machine simulator.
//! It includes the machine definition model and its validation, a sparse two-way tape,
//! the step-by-step execution engine, a cancellable step scheduler, and a set of
//! built-in example machines.

pub mod analyzer;
pub mod config;
pub mod definition;
pub mod loader;
pub mod machine;
pub mod programs;
pub mod resolver;
pub mod scheduler;
pub mod simulator;
pub mod tape;
pub mod types;

/// Re-exports the validation entry points and the `Warning` type from the analyzer module.
pub use analyzer::{lint, validate, Warning};
/// Re-exports the `SimulatorConfig` struct from the config module.
pub use config::SimulatorConfig;
/// Re-exports the `MachineDefinition` struct from the definition module.
pub use definition::MachineDefinition;
/// Re-exports the `DefinitionLoader` struct from the loader module.
pub use loader::DefinitionLoader;
/// Re-exports the engine types from the machine module.
pub use machine::{ExecutionState, TuringMachine};
/// Re-exports `Example`, `ExampleInfo`, `ProgramManager`, and `PROGRAMS` from the programs module.
pub use programs::{Example, ExampleInfo, ProgramManager, PROGRAMS};
/// Re-exports the `TransitionResolver` struct from the resolver module.
pub use resolver::TransitionResolver;
/// Re-exports the `Scheduler` and `Tick` types from the scheduler module.
pub use scheduler::{Scheduler, Tick};
/// Re-exports the `Simulator` and its `Event` type from the simulator module.
pub use simulator::{Event, Simulator};
/// Re-exports the `Tape` struct from the tape module.
pub use tape::Tape;
/// Re-exports various types related to machine definition and execution from the types module.
pub use types::{
    DefinitionError, Direction, MachineError, Phase, State, StepRecord, Symbol, TransitionRule,
    Verdict,
};

//! The command surface front ends drive: a [`TuringMachine`] paired with its
//! [`Scheduler`], plus synchronous event delivery for rendering, sound and notification
//! hooks.
//!
//! A host loop typically looks like:
//!
//! ```no_run
//! # use std::time::Instant;
//! # use turing_sim::{ProgramManager, Simulator};
//! let example = ProgramManager::get_example_by_index(0).unwrap();
//! let mut sim = Simulator::new(example.definition).unwrap();
//! sim.load_input("101").unwrap();
//! sim.play(Instant::now());
//! while let Some(deadline) = sim.next_deadline() {
//!     std::thread::sleep(deadline.saturating_duration_since(Instant::now()));
//!     sim.tick(Instant::now());
//! }
//! ```

use crate::analyzer::Warning;
use crate::config::SimulatorConfig;
use crate::definition::MachineDefinition;
use crate::machine::{ExecutionState, TuringMachine};
use crate::scheduler::{Scheduler, Tick};
use crate::types::{MachineError, Phase, StepRecord, Symbol, Verdict};
use std::time::{Duration, Instant};
use tracing::info;

/// Observable changes, delivered to listeners in the order they happen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A step completed.
    Stepped(StepRecord),
    /// The machine halted. Follows the `Stepped` event of the halting step.
    Halted { verdict: Verdict, steps: u64 },
    PhaseChanged { from: Phase, to: Phase },
}

type Listener = Box<dyn FnMut(&Event)>;

pub struct Simulator {
    machine: TuringMachine,
    scheduler: Scheduler,
    config: SimulatorConfig,
    listeners: Vec<Listener>,
}

impl Simulator {
    /// Creates a simulator with the default configuration.
    pub fn new(definition: MachineDefinition) -> Result<Self, MachineError> {
        Self::with_config(definition, SimulatorConfig::default())
    }

    pub fn with_config(
        definition: MachineDefinition,
        config: SimulatorConfig,
    ) -> Result<Self, MachineError> {
        let mut machine = TuringMachine::new(definition)?;
        machine.set_speed(config.speed());

        Ok(Self {
            scheduler: Scheduler::new(config.speed()),
            machine,
            config,
            listeners: Vec::new(),
        })
    }

    /// Registers a listener for every subsequent event.
    pub fn subscribe(&mut self, listener: impl FnMut(&Event) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn emit(&mut self, event: Event) {
        for listener in &mut self.listeners {
            listener(&event);
        }
    }

    fn emit_phase_change(&mut self, from: Phase) {
        let to = self.machine.phase();
        if from != to {
            self.emit(Event::PhaseChanged { from, to });
        }
    }

    fn publish(&mut self, record: &StepRecord, phase_before: Phase) {
        self.emit(Event::Stepped(record.clone()));
        if let Some(verdict) = record.verdict {
            self.emit_phase_change(phase_before);
            self.emit(Event::Halted {
                verdict,
                steps: record.step,
            });
        }
    }

    /// Replaces the definition. Rejected while running or if validation fails, in which
    /// case the previous definition stays active.
    pub fn load_definition(
        &mut self,
        definition: MachineDefinition,
    ) -> Result<Vec<Warning>, MachineError> {
        let from = self.machine.phase();
        let warnings = self.machine.load_definition(definition)?;
        self.emit_phase_change(from);
        Ok(warnings)
    }

    /// Loads a new input string. Rejected while running.
    pub fn load_input(&mut self, input: &str) -> Result<(), MachineError> {
        let from = self.machine.phase();
        self.machine.load_input(input)?;
        self.emit_phase_change(from);
        Ok(())
    }

    /// Starts continuous execution at the current speed.
    ///
    /// On a halted machine nothing is scheduled. Returns whether the machine is now running.
    pub fn play(&mut self, now: Instant) -> bool {
        let from = self.machine.phase();
        if !self.machine.play() {
            if self.machine.is_halted() {
                self.scheduler.stop();
            }
            return from == Phase::Running;
        }

        self.scheduler.start(self.machine.speed(), now);
        info!(speed = ?self.machine.speed(), "playing");
        self.emit_phase_change(from);
        true
    }

    /// Stops continuous execution. Returns whether the machine was running.
    pub fn pause(&mut self) -> bool {
        self.scheduler.stop();

        let from = self.machine.phase();
        let paused = self.machine.pause();
        if paused {
            info!(steps = self.machine.step_count(), "paused");
            self.emit_phase_change(from);
        }
        paused
    }

    /// Executes one manual step. Rejected while running.
    pub fn step(&mut self) -> Result<Option<StepRecord>, MachineError> {
        let from = self.machine.phase();
        let record = self.machine.step()?;
        if let Some(record) = &record {
            self.publish(record, from);
        }
        Ok(record)
    }

    /// Steps until the machine halts or the configured step limit is reached.
    pub fn run(&mut self) -> Result<Option<Verdict>, MachineError> {
        for _ in 0..self.config.max_steps {
            match self.step()? {
                Some(record) if record.is_halt() => break,
                Some(_) => {}
                None => break,
            }
        }
        Ok(self.machine.verdict())
    }

    /// Cancels any scheduled step and reinitializes execution from the loaded input.
    pub fn reset(&mut self) {
        self.scheduler.stop();

        let from = self.machine.phase();
        self.machine.reset();
        self.emit_phase_change(from);
    }

    /// Changes the step interval. A running schedule picks it up from its next tick.
    pub fn set_speed(&mut self, speed: Duration) {
        self.machine.set_speed(speed);
        if self.scheduler.is_active() {
            self.scheduler.reschedule(speed);
        }
    }

    /// Writes a cell directly; `None` clears it. Rejected while running.
    pub fn edit_cell(&mut self, position: i64, symbol: Option<Symbol>) -> Result<(), MachineError> {
        self.machine.edit_cell(position, symbol)
    }

    /// When the next scheduled step is due, if one is scheduled.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }

    /// Takes the due tick, if any, without executing it.
    pub fn poll(&mut self, now: Instant) -> Option<Tick> {
        self.scheduler.poll(now)
    }

    /// Executes the step for `tick` unless the schedule was stopped since it was taken.
    ///
    /// The scheduler stops itself once the machine halts.
    pub fn dispatch(&mut self, tick: Tick) -> Option<StepRecord> {
        if !self.scheduler.is_current(&tick) {
            return None;
        }

        let from = self.machine.phase();
        if from != Phase::Running {
            self.scheduler.stop();
            return None;
        }

        let Some(record) = self.machine.advance() else {
            self.scheduler.stop();
            return None;
        };

        if record.is_halt() {
            self.scheduler.stop();
        }
        self.publish(&record, from);
        Some(record)
    }

    /// Polls and dispatches in one go. Returns the step taken, if any.
    pub fn tick(&mut self, now: Instant) -> Option<StepRecord> {
        let tick = self.poll(now)?;
        self.dispatch(tick)
    }

    pub fn machine(&self) -> &TuringMachine {
        &self.machine
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// An owned copy of the current execution state.
    pub fn snapshot(&self) -> ExecutionState {
        self.machine.snapshot()
    }

    pub fn phase(&self) -> Phase {
        self.machine.phase()
    }
}

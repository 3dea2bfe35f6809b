//! This module defines the `TuringMachine` struct, the execution engine of the simulator.
//! It owns the active definition, its rule index, the loaded input string and the mutable
//! execution state, and implements the single-step algorithm together with the
//! play/pause/step/reset phase protocol.

use crate::analyzer::Warning;
use crate::definition::MachineDefinition;
use crate::resolver::TransitionResolver;
use crate::tape::Tape;
use crate::types::{MachineError, Phase, State, StepRecord, Symbol, Verdict, DEFAULT_SPEED_MS};
use std::ops::RangeInclusive;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Everything that changes while a machine runs.
///
/// Cloning is cheap: the tape shares its cells until the next write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionState {
    pub current_state: String,
    pub head: i64,
    pub tape: Tape,
    pub steps: u64,
    pub phase: Phase,
    pub verdict: Option<Verdict>,
    /// Interval between scheduled steps.
    pub speed: Duration,
}

impl ExecutionState {
    fn initial(definition: &MachineDefinition, input: &str, speed: Duration) -> Self {
        Self {
            current_state: definition.initial_state.clone(),
            head: 0,
            tape: Tape::from_input(input, definition.blank_symbol),
            steps: 0,
            phase: Phase::Idle,
            verdict: None,
            speed,
        }
    }

    pub fn is_halted(&self) -> bool {
        self.phase == Phase::Halted
    }
}

/// A single-tape deterministic Turing machine.
#[derive(Debug, Clone)]
pub struct TuringMachine {
    definition: MachineDefinition,
    resolver: TransitionResolver,
    input: String,
    execution: ExecutionState,
}

impl TuringMachine {
    /// Creates a machine for `definition` with an empty input.
    ///
    /// # Errors
    ///
    /// Returns `MachineError::Validation` if the definition fails validation.
    pub fn new(definition: MachineDefinition) -> Result<Self, MachineError> {
        definition.validate()?;
        log_warnings(&definition.lint());

        let execution = ExecutionState::initial(
            &definition,
            "",
            Duration::from_millis(DEFAULT_SPEED_MS),
        );

        Ok(Self {
            resolver: TransitionResolver::new(&definition),
            definition,
            input: String::new(),
            execution,
        })
    }

    /// Replaces the active definition and reinitializes execution from the current input.
    ///
    /// On error the previous definition stays active and execution is untouched.
    /// Returns the lint warnings for the new definition.
    pub fn load_definition(
        &mut self,
        definition: MachineDefinition,
    ) -> Result<Vec<Warning>, MachineError> {
        self.ensure_not_running("load a definition")?;
        definition.validate()?;

        let warnings = definition.lint();
        log_warnings(&warnings);

        info!(
            name = %definition.name,
            states = definition.states.len(),
            transitions = definition.transitions.len(),
            "definition loaded"
        );

        self.resolver = TransitionResolver::new(&definition);
        self.definition = definition;
        self.reinitialize();
        Ok(warnings)
    }

    /// Writes `input` onto a fresh tape and reinitializes execution.
    pub fn load_input(&mut self, input: &str) -> Result<(), MachineError> {
        self.ensure_not_running("load input")?;

        for symbol in input.chars() {
            self.warn_if_foreign(symbol);
        }

        info!(input, "input loaded");
        self.input = input.to_string();
        self.reinitialize();
        Ok(())
    }

    /// Returns to `Idle` with the tape holding the loaded input again.
    /// Cell edits and all progress are discarded.
    pub fn reset(&mut self) {
        debug!(phase = %self.execution.phase, "reset");
        self.reinitialize();
    }

    fn reinitialize(&mut self) {
        self.execution =
            ExecutionState::initial(&self.definition, &self.input, self.execution.speed);
    }

    /// Executes a single step on behalf of an external caller.
    ///
    /// Only valid in `Idle`, `Paused` or `Halted`; while `Running` the scheduler owns
    /// stepping. Returns `None` if the machine had already halted.
    pub fn step(&mut self) -> Result<Option<StepRecord>, MachineError> {
        self.ensure_not_running("step")?;
        Ok(self.advance())
    }

    /// Executes a single step regardless of phase. Used by the scheduler.
    pub(crate) fn advance(&mut self) -> Option<StepRecord> {
        if self.execution.is_halted() {
            return None;
        }

        let state = self.execution.current_state.clone();
        let head_before = self.execution.head;
        let read = self.execution.tape.read(head_before);
        self.execution.steps += 1;

        let record = match self.resolver.lookup(&state, read).cloned() {
            None => {
                // No applicable rule: accept only if the current state says so.
                let verdict = if self.definition.state(&state).is_some_and(State::is_accept) {
                    Verdict::Accepted
                } else {
                    Verdict::Rejected
                };
                self.halt(verdict);

                StepRecord {
                    step: self.execution.steps,
                    state,
                    read,
                    rule: None,
                    head_before,
                    head_after: head_before,
                    verdict: Some(verdict),
                }
            }
            Some(rule) => {
                self.execution.tape.write(head_before, rule.write_symbol);
                self.execution.head = head_before + rule.move_direction.offset();
                self.execution.current_state = rule.next_state.clone();

                let verdict = self
                    .definition
                    .state(&rule.next_state)
                    .and_then(State::final_verdict);
                if let Some(verdict) = verdict {
                    self.halt(verdict);
                }

                StepRecord {
                    step: self.execution.steps,
                    state,
                    read,
                    head_before,
                    head_after: self.execution.head,
                    rule: Some(rule),
                    verdict,
                }
            }
        };

        debug!(
            step = record.step,
            state = %record.state,
            read = %record.read,
            head = record.head_after,
            "step"
        );

        Some(record)
    }

    fn halt(&mut self, verdict: Verdict) {
        self.execution.phase = Phase::Halted;
        self.execution.verdict = Some(verdict);
        info!(%verdict, steps = self.execution.steps, "machine halted");
    }

    /// Runs the machine until it halts or `max_steps` steps were taken.
    ///
    /// Returns the verdict if the machine halted.
    pub fn run(&mut self, max_steps: usize) -> Result<Option<Verdict>, MachineError> {
        self.ensure_not_running("run")?;

        for _ in 0..max_steps {
            if self.advance().is_none() || self.execution.is_halted() {
                break;
            }
        }

        Ok(self.execution.verdict)
    }

    /// Enters `Running` from `Idle` or `Paused`. Returns whether the phase changed.
    pub fn play(&mut self) -> bool {
        match self.execution.phase {
            Phase::Idle | Phase::Paused => {
                self.execution.phase = Phase::Running;
                true
            }
            Phase::Running | Phase::Halted => false,
        }
    }

    /// Enters `Paused` from `Running`. Returns whether the phase changed.
    pub fn pause(&mut self) -> bool {
        if self.execution.phase == Phase::Running {
            self.execution.phase = Phase::Paused;
            true
        } else {
            false
        }
    }

    /// Writes a cell directly, without touching the head, state or step counter.
    /// `None` clears the cell to blank.
    pub fn edit_cell(&mut self, position: i64, symbol: Option<Symbol>) -> Result<(), MachineError> {
        self.ensure_not_running("edit a cell")?;

        let symbol = symbol.unwrap_or(self.definition.blank_symbol);
        self.warn_if_foreign(symbol);
        self.execution.tape.write(position, symbol);
        Ok(())
    }

    pub fn set_speed(&mut self, speed: Duration) {
        self.execution.speed = speed;
    }

    fn ensure_not_running(&self, operation: &'static str) -> Result<(), MachineError> {
        if self.execution.phase == Phase::Running {
            return Err(MachineError::InvalidPhase {
                operation,
                phase: Phase::Running,
            });
        }
        Ok(())
    }

    fn warn_if_foreign(&self, symbol: Symbol) {
        if !self.definition.tape_alphabet.contains(&symbol) {
            warn!(%symbol, "symbol is not in the tape alphabet");
        }
    }

    /// The current execution state.
    pub fn execution(&self) -> &ExecutionState {
        &self.execution
    }

    /// An owned copy of the current execution state.
    pub fn snapshot(&self) -> ExecutionState {
        self.execution.clone()
    }

    pub fn definition(&self) -> &MachineDefinition {
        &self.definition
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn state(&self) -> &str {
        &self.execution.current_state
    }

    pub fn head(&self) -> i64 {
        self.execution.head
    }

    pub fn step_count(&self) -> u64 {
        self.execution.steps
    }

    pub fn phase(&self) -> Phase {
        self.execution.phase
    }

    pub fn verdict(&self) -> Option<Verdict> {
        self.execution.verdict
    }

    pub fn speed(&self) -> Duration {
        self.execution.speed
    }

    pub fn is_halted(&self) -> bool {
        self.execution.is_halted()
    }

    pub fn tape(&self) -> &Tape {
        &self.execution.tape
    }

    pub fn blank(&self) -> Symbol {
        self.definition.blank_symbol
    }

    /// Reads a single cell.
    pub fn read(&self, position: i64) -> Symbol {
        self.execution.tape.read(position)
    }

    /// Reads the cells in `range`.
    pub fn window(&self, range: RangeInclusive<i64>) -> Vec<Symbol> {
        self.execution.tape.window(range)
    }
}

fn log_warnings(warnings: &[Warning]) {
    for warning in warnings {
        warn!(%warning, "definition lint");
    }
}

//! This module defines the core data structures and types used throughout the Turing Machine
//! simulator, including states, transition rules, run phases, verdicts, and error types.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A single tape symbol.
pub type Symbol = char;

/// The default blank symbol used on the Turing Machine tape.
pub const DEFAULT_BLANK_SYMBOL: Symbol = '_';
/// The default interval between two scheduled steps, in milliseconds.
pub const DEFAULT_SPEED_MS: u64 = 500;
/// The fastest interval offered by interactive front ends, in milliseconds.
pub const MIN_SPEED_MS: u64 = 100;
/// The slowest interval offered by interactive front ends, in milliseconds.
pub const MAX_SPEED_MS: u64 = 1000;
/// The maximum number of steps to execute when running to completion.
pub const MAX_EXECUTION_STEPS: usize = 10000;
/// The widest span, in cells, that [`crate::tape::Tape::contents`] will render.
pub const MAX_CONTENT_SPAN: u64 = 1 << 16;

/// A named control state of the machine.
///
/// A state is never both accepting and rejecting: setting one flag clears the other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct State {
    name: String,
    #[serde(default)]
    is_accept: bool,
    #[serde(default)]
    is_reject: bool,
}

impl State {
    /// Creates a plain (neither accepting nor rejecting) state.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_accept: false,
            is_reject: false,
        }
    }

    /// Creates an accepting state.
    pub fn accepting(name: impl Into<String>) -> Self {
        let mut state = Self::new(name);
        state.set_accept(true);
        state
    }

    /// Creates a rejecting state.
    pub fn rejecting(name: impl Into<String>) -> Self {
        let mut state = Self::new(name);
        state.set_reject(true);
        state
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn is_accept(&self) -> bool {
        self.is_accept
    }

    pub fn is_reject(&self) -> bool {
        self.is_reject
    }

    /// Whether entering this state halts the machine.
    pub fn is_final(&self) -> bool {
        self.is_accept || self.is_reject
    }

    /// Marks or unmarks the state as accepting. Always clears the reject flag.
    pub fn set_accept(&mut self, on: bool) {
        self.is_accept = on;
        self.is_reject = false;
    }

    /// Marks or unmarks the state as rejecting. Always clears the accept flag.
    pub fn set_reject(&mut self, on: bool) {
        self.is_reject = on;
        self.is_accept = false;
    }

    /// The verdict reached by halting in this state after a rule fired into it.
    /// Accept wins over reject should both flags be set.
    pub fn final_verdict(&self) -> Option<Verdict> {
        if self.is_accept {
            Some(Verdict::Accepted)
        } else if self.is_reject {
            Some(Verdict::Rejected)
        } else {
            None
        }
    }
}

/// Represents a single transition rule: in `current_state` reading `read_symbol`,
/// write `write_symbol`, move the head, and enter `next_state`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionRule {
    pub current_state: String,
    pub read_symbol: Symbol,
    pub write_symbol: Symbol,
    pub move_direction: Direction,
    pub next_state: String,
}

impl TransitionRule {
    pub fn new(
        current_state: impl Into<String>,
        read_symbol: Symbol,
        write_symbol: Symbol,
        move_direction: Direction,
        next_state: impl Into<String>,
    ) -> Self {
        Self {
            current_state: current_state.into(),
            read_symbol,
            write_symbol,
            move_direction,
            next_state: next_state.into(),
        }
    }
}

impl fmt::Display for TransitionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}) -> ({}, {}, {})",
            self.current_state,
            self.read_symbol,
            self.write_symbol,
            self.move_direction,
            self.next_state
        )
    }
}

/// Represents the possible directions a Turing Machine head can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one position to the left.
    #[serde(rename = "L", alias = "Left")]
    Left,
    /// Move the head one position to the right.
    #[serde(rename = "R", alias = "Right")]
    Right,
    /// Keep the head in the same position.
    #[serde(rename = "S", alias = "Stay")]
    Stay,
}

impl Direction {
    /// The head offset produced by this move.
    pub fn offset(self) -> i64 {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
            Direction::Stay => 0,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Direction::Left => "L",
            Direction::Right => "R",
            Direction::Stay => "S",
        };
        f.write_str(c)
    }
}

/// The outcome recorded when the machine halts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Accepted,
    Rejected,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Accepted => f.write_str("accepted"),
            Verdict::Rejected => f.write_str("rejected"),
        }
    }
}

/// The run phase of an execution.
///
/// `Idle --play--> Running --pause--> Paused --play--> Running`, any phase
/// `--reset--> Idle`, and `Halted` is only left through a reset.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    #[default]
    Idle,
    Running,
    Paused,
    Halted,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Idle => "idle",
            Phase::Running => "running",
            Phase::Paused => "paused",
            Phase::Halted => "halted",
        };
        f.write_str(s)
    }
}

/// What happened during one step of execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    /// The step counter after this step.
    pub step: u64,
    /// The state the machine was in when the step began.
    pub state: String,
    /// The symbol read under the head.
    pub read: Symbol,
    /// The rule that fired, or `None` if no rule matched and the machine halted.
    pub rule: Option<TransitionRule>,
    pub head_before: i64,
    pub head_after: i64,
    /// Set if this step halted the machine.
    pub verdict: Option<Verdict>,
}

impl StepRecord {
    /// Whether the step wrote a symbol different from the one it read.
    pub fn wrote(&self) -> bool {
        self.rule
            .as_ref()
            .is_some_and(|rule| rule.write_symbol != self.read)
    }

    /// Whether the head moved.
    pub fn moved(&self) -> bool {
        self.head_before != self.head_after
    }

    /// Whether the step entered a different state.
    pub fn changed_state(&self) -> bool {
        self.rule
            .as_ref()
            .is_some_and(|rule| rule.next_state != self.state)
    }

    pub fn is_halt(&self) -> bool {
        self.verdict.is_some()
    }
}

/// Problems found in a machine definition. Loading a definition that fails
/// any of these checks is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("Machine has no states")]
    NoStates,
    #[error("State name must not be empty")]
    EmptyStateName,
    #[error("Duplicate state: {0}")]
    DuplicateState(String),
    #[error("State {0} is marked both accepting and rejecting")]
    ConflictingStateFlags(String),
    #[error("Invalid initial state: {0}")]
    InvalidInitialState(String),
    #[error("Unknown state: {0}")]
    UnknownState(String),
    #[error("Cannot remove the initial state {0}")]
    InitialStateRemoval(String),
    #[error("Cannot remove the last state {0}")]
    LastStateRemoval(String),
    #[error("Blank symbol {0:?} is not in the tape alphabet")]
    BlankNotInTapeAlphabet(Symbol),
    #[error("Input symbol {0:?} is not in the tape alphabet")]
    InputSymbolNotInTapeAlphabet(Symbol),
    #[error("Transition {index} references undefined state {state}")]
    UndefinedState { index: usize, state: String },
    #[error("Transition {index} uses symbol {symbol:?} outside the tape alphabet")]
    UnknownSymbol { index: usize, symbol: Symbol },
    #[error("Transition index {0} is out of range")]
    TransitionIndex(usize),
}

/// Represents various errors that can occur during Turing Machine operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MachineError {
    /// The definition failed validation; the previously loaded definition stays active.
    #[error("Definition validation error: {0}")]
    Validation(#[from] DefinitionError),
    /// A command was issued in a phase that does not allow it.
    #[error("Cannot {operation} while {phase}")]
    InvalidPhase {
        operation: &'static str,
        phase: Phase,
    },
    /// Definition text could not be decoded.
    #[error("Definition parsing error: {0}")]
    Parse(String),
    /// Indicates an error related to file system operations.
    #[error("File error: {0}")]
    File(String),
    /// A built-in example could not be found.
    #[error("Not found: {0}")]
    NotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_serialization() {
        let left_json = serde_json::to_string(&Direction::Left).unwrap();
        let stay_json = serde_json::to_string(&Direction::Stay).unwrap();

        assert_eq!(left_json, "\"L\"");
        assert_eq!(stay_json, "\"S\"");

        let right: Direction = serde_json::from_str("\"R\"").unwrap();
        let right_long: Direction = serde_json::from_str("\"Right\"").unwrap();
        assert_eq!(right, Direction::Right);
        assert_eq!(right_long, Direction::Right);
    }

    #[test]
    fn test_direction_offset() {
        assert_eq!(Direction::Left.offset(), -1);
        assert_eq!(Direction::Right.offset(), 1);
        assert_eq!(Direction::Stay.offset(), 0);
    }

    #[test]
    fn test_state_flags_are_exclusive() {
        let mut state = State::accepting("q");
        assert!(state.is_accept());

        state.set_reject(true);
        assert!(state.is_reject());
        assert!(!state.is_accept());

        state.set_accept(true);
        assert!(state.is_accept());
        assert!(!state.is_reject());

        state.set_accept(false);
        assert!(!state.is_final());
    }

    #[test]
    fn test_state_deserializes_with_missing_flags() {
        let state: State = serde_json::from_str(r#"{"name":"q0"}"#).unwrap();
        assert_eq!(state, State::new("q0"));

        let state: State = serde_json::from_str(r#"{"name":"ok","isAccept":true}"#).unwrap();
        assert_eq!(state.final_verdict(), Some(Verdict::Accepted));
    }

    #[test]
    fn test_transition_rule_serialization() {
        let json = r#"{"currentState":"q0","readSymbol":"1","writeSymbol":"0","moveDirection":"L","nextState":"q1"}"#;
        let rule: TransitionRule = serde_json::from_str(json).unwrap();

        assert_eq!(rule, TransitionRule::new("q0", '1', '0', Direction::Left, "q1"));
        assert_eq!(rule.to_string(), "(q0, 1) -> (0, L, q1)");
    }

    #[test]
    fn test_step_record_facts() {
        let record = StepRecord {
            step: 1,
            state: "q0".to_string(),
            read: '1',
            rule: Some(TransitionRule::new("q0", '1', '1', Direction::Right, "q0")),
            head_before: 0,
            head_after: 1,
            verdict: None,
        };

        assert!(!record.wrote());
        assert!(record.moved());
        assert!(!record.changed_state());
        assert!(!record.is_halt());
    }

    #[test]
    fn test_error_display() {
        let error: MachineError = DefinitionError::InvalidInitialState("q9".to_string()).into();
        let error_msg = format!("{}", error);
        assert!(error_msg.contains("Invalid initial state"));
        assert!(error_msg.contains("q9"));

        let error = MachineError::InvalidPhase {
            operation: "step",
            phase: Phase::Running,
        };
        assert_eq!(error.to_string(), "Cannot step while running");
    }
}

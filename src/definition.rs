//! The machine definition: states, alphabets, blank symbol and the ordered rule list.
//!
//! A definition is plain data that front ends build and edit freely. It only reaches the
//! engine through [`crate::TuringMachine::load_definition`], which validates it first.

use crate::analyzer::{self, Warning};
use crate::types::{DefinitionError, State, Symbol, TransitionRule, DEFAULT_BLANK_SYMBOL};
use serde::{Deserialize, Serialize};

/// Describes a single-tape deterministic Turing machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineDefinition {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub states: Vec<State>,
    /// Symbols an input string is expected to use.
    pub alphabet: Vec<Symbol>,
    /// Symbols rules may read and write. Includes `alphabet` and the blank symbol.
    pub tape_alphabet: Vec<Symbol>,
    pub initial_state: String,
    #[serde(default = "default_blank")]
    pub blank_symbol: Symbol,
    /// Rules in definition order. The first rule for a `(state, symbol)` pair wins.
    #[serde(default)]
    pub transitions: Vec<TransitionRule>,
}

fn default_blank() -> Symbol {
    DEFAULT_BLANK_SYMBOL
}

impl MachineDefinition {
    /// Creates a definition with a single plain initial state, no rules, and a tape
    /// alphabet holding only the blank symbol.
    pub fn new(name: impl Into<String>, initial_state: impl Into<String>, blank: Symbol) -> Self {
        let initial_state = initial_state.into();
        Self {
            name: name.into(),
            description: String::new(),
            states: vec![State::new(initial_state.clone())],
            alphabet: Vec::new(),
            tape_alphabet: vec![blank],
            initial_state,
            blank_symbol: blank,
            transitions: Vec::new(),
        }
    }

    /// Checks the definition, returning the first problem found.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        analyzer::validate(self)
    }

    /// Non-fatal findings such as shadowed rules and unreachable states.
    pub fn lint(&self) -> Vec<Warning> {
        analyzer::lint(self)
    }

    /// Looks up a state by name.
    pub fn state(&self, name: &str) -> Option<&State> {
        self.states.iter().find(|s| s.name() == name)
    }

    fn state_mut(&mut self, name: &str) -> Result<&mut State, DefinitionError> {
        self.states
            .iter_mut()
            .find(|s| s.name() == name)
            .ok_or_else(|| DefinitionError::UnknownState(name.to_string()))
    }

    pub fn has_state(&self, name: &str) -> bool {
        self.state(name).is_some()
    }

    /// Adds a plain state.
    pub fn add_state(&mut self, name: &str) -> Result<(), DefinitionError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DefinitionError::EmptyStateName);
        }
        if self.has_state(name) {
            return Err(DefinitionError::DuplicateState(name.to_string()));
        }

        self.states.push(State::new(name));
        Ok(())
    }

    /// Removes a state together with every rule that starts or ends in it.
    ///
    /// The initial state and the last remaining state cannot be removed.
    pub fn remove_state(&mut self, name: &str) -> Result<(), DefinitionError> {
        if !self.has_state(name) {
            return Err(DefinitionError::UnknownState(name.to_string()));
        }
        if self.states.len() <= 1 {
            return Err(DefinitionError::LastStateRemoval(name.to_string()));
        }
        if self.initial_state == name {
            return Err(DefinitionError::InitialStateRemoval(name.to_string()));
        }

        self.states.retain(|s| s.name() != name);
        self.transitions
            .retain(|t| t.current_state != name && t.next_state != name);
        Ok(())
    }

    /// Renames a state, following the rename through the initial state and all rules.
    pub fn rename_state(&mut self, old: &str, new: &str) -> Result<(), DefinitionError> {
        let new = new.trim();
        if new.is_empty() {
            return Err(DefinitionError::EmptyStateName);
        }
        if old != new && self.has_state(new) {
            return Err(DefinitionError::DuplicateState(new.to_string()));
        }

        self.state_mut(old)?.set_name(new);

        if self.initial_state == old {
            self.initial_state = new.to_string();
        }
        for rule in &mut self.transitions {
            if rule.current_state == old {
                rule.current_state = new.to_string();
            }
            if rule.next_state == old {
                rule.next_state = new.to_string();
            }
        }
        Ok(())
    }

    pub fn set_initial_state(&mut self, name: &str) -> Result<(), DefinitionError> {
        if !self.has_state(name) {
            return Err(DefinitionError::UnknownState(name.to_string()));
        }

        self.initial_state = name.to_string();
        Ok(())
    }

    /// Marks or unmarks a state as accepting. Clears its reject flag.
    pub fn set_accept(&mut self, name: &str, on: bool) -> Result<(), DefinitionError> {
        self.state_mut(name)?.set_accept(on);
        Ok(())
    }

    /// Marks or unmarks a state as rejecting. Clears its accept flag.
    pub fn set_reject(&mut self, name: &str, on: bool) -> Result<(), DefinitionError> {
        self.state_mut(name)?.set_reject(on);
        Ok(())
    }

    /// Appends a rule. Rules are checked against states and alphabets on load.
    pub fn add_transition(&mut self, rule: TransitionRule) {
        self.transitions.push(rule);
    }

    /// Replaces the rule at `index`, keeping its position in the priority order.
    pub fn replace_transition(
        &mut self,
        index: usize,
        rule: TransitionRule,
    ) -> Result<TransitionRule, DefinitionError> {
        let slot = self
            .transitions
            .get_mut(index)
            .ok_or(DefinitionError::TransitionIndex(index))?;
        Ok(std::mem::replace(slot, rule))
    }

    pub fn remove_transition(&mut self, index: usize) -> Result<TransitionRule, DefinitionError> {
        if index >= self.transitions.len() {
            return Err(DefinitionError::TransitionIndex(index));
        }
        Ok(self.transitions.remove(index))
    }
}

//! This module provides functions for analyzing machine definitions before they are loaded.
//! Structural problems (unknown states, symbols outside the tape alphabet, an invalid initial
//! state) are errors and reject the definition. Suspicious but runnable constructs, such as
//! shadowed rules or unreachable states, are reported as warnings.

use crate::definition::MachineDefinition;
use crate::types::DefinitionError;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Non-fatal findings about a definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A rule that can never fire because an earlier rule has the same `(state, symbol)` key.
    DeadRule {
        index: usize,
        shadowed_by: usize,
    },
    /// States that cannot be reached from the initial state.
    UnreachableStates(Vec<String>),
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::DeadRule { index, shadowed_by } => write!(
                f,
                "Transition {} is shadowed by transition {} and never fires",
                index, shadowed_by
            ),
            Warning::UnreachableStates(states) => {
                write!(f, "Unreachable states detected: {:?}", states)
            }
        }
    }
}

/// Validates a definition, returning the first error found.
///
/// The checks run in order: states, initial state, alphabets, transitions.
pub fn validate(definition: &MachineDefinition) -> Result<(), DefinitionError> {
    [
        check_states,
        check_initial_state,
        check_alphabets,
        check_transitions,
    ]
    .iter()
    .try_for_each(|check| check(definition))
}

/// Collects warnings for a definition. Never fails; assumes nothing about validity.
pub fn lint(definition: &MachineDefinition) -> Vec<Warning> {
    let mut warnings = find_dead_rules(definition);

    let unreachable = find_unreachable_states(definition);
    if !unreachable.is_empty() {
        warnings.push(Warning::UnreachableStates(unreachable));
    }

    warnings
}

/// Checks that there is at least one state, that names are non-empty and unique,
/// and that no state carries both final flags.
fn check_states(definition: &MachineDefinition) -> Result<(), DefinitionError> {
    if definition.states.is_empty() {
        return Err(DefinitionError::NoStates);
    }

    let mut seen = HashSet::new();
    for state in &definition.states {
        if state.name().trim().is_empty() {
            return Err(DefinitionError::EmptyStateName);
        }
        if !seen.insert(state.name()) {
            return Err(DefinitionError::DuplicateState(state.name().to_string()));
        }
        if state.is_accept() && state.is_reject() {
            return Err(DefinitionError::ConflictingStateFlags(
                state.name().to_string(),
            ));
        }
    }

    Ok(())
}

fn check_initial_state(definition: &MachineDefinition) -> Result<(), DefinitionError> {
    if definition.state(&definition.initial_state).is_none() {
        return Err(DefinitionError::InvalidInitialState(
            definition.initial_state.clone(),
        ));
    }

    Ok(())
}

/// The tape alphabet must contain the blank symbol and every input symbol.
fn check_alphabets(definition: &MachineDefinition) -> Result<(), DefinitionError> {
    if !definition.tape_alphabet.contains(&definition.blank_symbol) {
        return Err(DefinitionError::BlankNotInTapeAlphabet(
            definition.blank_symbol,
        ));
    }

    definition
        .alphabet
        .iter()
        .find(|symbol| !definition.tape_alphabet.contains(symbol))
        .map_or(Ok(()), |&symbol| {
            Err(DefinitionError::InputSymbolNotInTapeAlphabet(symbol))
        })
}

/// Every rule must connect declared states and use symbols from the tape alphabet.
fn check_transitions(definition: &MachineDefinition) -> Result<(), DefinitionError> {
    let states: HashSet<&str> = definition.states.iter().map(|s| s.name()).collect();

    for (index, rule) in definition.transitions.iter().enumerate() {
        for state in [&rule.current_state, &rule.next_state] {
            if !states.contains(state.as_str()) {
                return Err(DefinitionError::UndefinedState {
                    index,
                    state: state.clone(),
                });
            }
        }

        for symbol in [rule.read_symbol, rule.write_symbol] {
            if !definition.tape_alphabet.contains(&symbol) {
                return Err(DefinitionError::UnknownSymbol { index, symbol });
            }
        }
    }

    Ok(())
}

/// Finds rules whose `(state, symbol)` key was already claimed by an earlier rule.
fn find_dead_rules(definition: &MachineDefinition) -> Vec<Warning> {
    let mut first: HashMap<(&str, char), usize> = HashMap::new();
    let mut dead = Vec::new();

    for (index, rule) in definition.transitions.iter().enumerate() {
        let key = (rule.current_state.as_str(), rule.read_symbol);
        match first.get(&key) {
            Some(&shadowed_by) => dead.push(Warning::DeadRule { index, shadowed_by }),
            None => {
                first.insert(key, index);
            }
        }
    }

    dead
}

/// Performs a depth-first traversal from the initial state over the rules and returns
/// the declared states that were never visited, sorted by name.
fn find_unreachable_states(definition: &MachineDefinition) -> Vec<String> {
    let mut edges: HashMap<&str, Vec<&str>> = HashMap::new();
    for rule in &definition.transitions {
        edges
            .entry(rule.current_state.as_str())
            .or_default()
            .push(rule.next_state.as_str());
    }

    let mut visited = HashSet::new();
    let mut queue = vec![definition.initial_state.as_str()];

    while let Some(state) = queue.pop() {
        if !visited.insert(state) {
            continue;
        }

        if let Some(next) = edges.get(state) {
            queue.extend(next.iter().copied().filter(|s| !visited.contains(s)));
        }
    }

    let mut unreachable: Vec<String> = definition
        .states
        .iter()
        .map(|s| s.name())
        .filter(|name| !visited.contains(name))
        .map(str::to_string)
        .collect();
    unreachable.sort();
    unreachable
}

//! Constant-time rule lookup keyed by `(state, symbol)`.

use crate::definition::MachineDefinition;
use crate::types::{Symbol, TransitionRule};
use std::collections::HashMap;

/// An index over a definition's rules.
///
/// Built once per definition. When several rules share a `(state, symbol)` key, the one
/// defined first is indexed and the rest are never returned.
#[derive(Debug, Clone, Default)]
pub struct TransitionResolver {
    rules: HashMap<String, HashMap<Symbol, TransitionRule>>,
}

impl TransitionResolver {
    pub fn new(definition: &MachineDefinition) -> Self {
        let mut rules: HashMap<String, HashMap<Symbol, TransitionRule>> = HashMap::new();

        for rule in &definition.transitions {
            rules
                .entry(rule.current_state.clone())
                .or_default()
                .entry(rule.read_symbol)
                .or_insert_with(|| rule.clone());
        }

        Self { rules }
    }

    /// Finds the rule for `state` reading `symbol`, if any.
    pub fn lookup(&self, state: &str, symbol: Symbol) -> Option<&TransitionRule> {
        self.rules.get(state)?.get(&symbol)
    }

    /// Number of distinct `(state, symbol)` keys.
    pub fn len(&self) -> usize {
        self.rules.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

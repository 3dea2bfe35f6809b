//! Built-in example machines, embedded from `machines/*.json` at compile time.

use crate::definition::MachineDefinition;
use crate::types::MachineError;
use serde::{Deserialize, Serialize};
use tracing::error;

// Default embedded examples
const PROGRAM_TEXTS: [&str; 3] = [
    include_str!("../machines/binary-increment.json"),
    include_str!("../machines/palindrome.json"),
    include_str!("../machines/unary-addition.json"),
];

/// A named machine definition with inputs worth trying.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Example {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(rename = "config", alias = "definition")]
    pub definition: MachineDefinition,
    #[serde(default)]
    pub sample_inputs: Vec<String>,
}

impl Example {
    /// The first sample input, or an empty string.
    pub fn default_input(&self) -> &str {
        self.sample_inputs.first().map(String::as_str).unwrap_or("")
    }
}

lazy_static::lazy_static! {
    pub static ref PROGRAMS: Vec<Example> = PROGRAM_TEXTS
        .iter()
        .filter_map(|text| match serde_json::from_str::<Example>(text) {
            Ok(example) => Some(example),
            Err(e) => {
                error!(error = %e, "failed to parse embedded example");
                None
            }
        })
        .collect();
}

pub struct ProgramManager;

impl ProgramManager {
    /// Get the number of available examples
    pub fn count() -> usize {
        PROGRAMS.len()
    }

    /// Get an example by its index
    pub fn get_example_by_index(index: usize) -> Result<Example, MachineError> {
        PROGRAMS
            .get(index)
            .cloned()
            .ok_or_else(|| MachineError::NotFound(format!("Example index {} out of range", index)))
    }

    /// Get an example by its id, e.g. `binary-increment`
    pub fn get_example_by_id(id: &str) -> Result<Example, MachineError> {
        PROGRAMS
            .iter()
            .find(|example| example.id == id)
            .cloned()
            .ok_or_else(|| MachineError::NotFound(format!("Example '{}' not found", id)))
    }

    /// Get an example by its display name
    pub fn get_example_by_name(name: &str) -> Result<Example, MachineError> {
        PROGRAMS
            .iter()
            .find(|example| example.name == name)
            .cloned()
            .ok_or_else(|| MachineError::NotFound(format!("Example '{}' not found", name)))
    }

    /// Resolve an example by id first, then by name
    pub fn find(key: &str) -> Result<Example, MachineError> {
        Self::get_example_by_id(key).or_else(|_| Self::get_example_by_name(key))
    }

    /// List all example names
    pub fn list_example_names() -> Vec<String> {
        PROGRAMS.iter().map(|example| example.name.clone()).collect()
    }

    /// Get summary information about an example by its index
    pub fn get_example_info(index: usize) -> Result<ExampleInfo, MachineError> {
        let example = Self::get_example_by_index(index)?;

        Ok(ExampleInfo {
            index,
            id: example.id.clone(),
            name: example.name.clone(),
            category: example.category.clone(),
            initial_state: example.definition.initial_state.clone(),
            sample_inputs: example.sample_inputs.clone(),
            state_count: example.definition.states.len(),
            transition_count: example.definition.transitions.len(),
        })
    }

    /// Search for examples by name, case-insensitively
    pub fn search_examples(query: &str) -> Vec<usize> {
        let query = query.to_lowercase();
        PROGRAMS
            .iter()
            .enumerate()
            .filter(|(_, example)| example.name.to_lowercase().contains(&query))
            .map(|(index, _)| index)
            .collect()
    }

    /// Get the raw JSON text of an example by its index
    pub fn get_example_text_by_index(index: usize) -> Result<&'static str, MachineError> {
        PROGRAM_TEXTS.get(index).copied().ok_or_else(|| {
            MachineError::NotFound(format!("Example text index {} out of range", index))
        })
    }
}

#[derive(Debug, Clone)]
pub struct ExampleInfo {
    pub index: usize,
    pub id: String,
    pub name: String,
    pub category: String,
    pub initial_state: String,
    pub sample_inputs: Vec<String>,
    pub state_count: usize,
    pub transition_count: usize,
}

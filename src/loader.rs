//! This module provides the `DefinitionLoader` struct, responsible for loading machine
//! definitions from JSON files and strings.
//!
//! A document is either a bare definition or an example wrapper whose `config` field holds
//! the definition. Loaded definitions are validated before they are returned.

use crate::definition::MachineDefinition;
use crate::programs::Example;
use crate::types::MachineError;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Utility for loading machine definitions from files, strings and directories.
pub struct DefinitionLoader;

impl DefinitionLoader {
    /// Loads a single definition from the specified file path.
    ///
    /// # Errors
    ///
    /// * `MachineError::File` if the file cannot be read.
    /// * `MachineError::Parse` if the content is not a definition or example document.
    /// * `MachineError::Validation` if the definition is malformed.
    pub fn load_definition(path: &Path) -> Result<MachineDefinition, MachineError> {
        let content = read(path)?;
        Self::load_definition_from_string(&content)
    }

    /// Loads a single definition from the provided string content.
    pub fn load_definition_from_string(content: &str) -> Result<MachineDefinition, MachineError> {
        let definition = match Self::parse_document(content)? {
            Document::Example(example) => example.definition,
            Document::Definition(definition) => definition,
        };

        definition.validate()?;
        Ok(definition)
    }

    /// Loads an example document (definition plus sample inputs) from a file.
    pub fn load_example(path: &Path) -> Result<Example, MachineError> {
        let content = read(path)?;
        let example: Example =
            serde_json::from_str(&content).map_err(|e| MachineError::Parse(e.to_string()))?;

        example.definition.validate()?;
        Ok(example)
    }

    /// Loads every `.json` file in `directory`.
    ///
    /// Subdirectories and other files are skipped. Each loaded file yields its own result,
    /// so one bad file does not hide the others.
    pub fn load_definitions(
        directory: &Path,
    ) -> Vec<Result<(PathBuf, MachineDefinition), MachineError>> {
        if !directory.exists() {
            return vec![Err(MachineError::File(format!(
                "Directory {} does not exist",
                directory.display()
            )))];
        }

        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(MachineError::File(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        entries
            .filter_map(|entry| {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        return Some(Err(MachineError::File(format!(
                            "Failed to read directory entry: {}",
                            e
                        ))))
                    }
                };

                let path = entry.path();

                // Skip directories and non-.json files
                if path.is_dir() || path.extension().is_none_or(|ext| ext != "json") {
                    return None;
                }

                Some(Self::load_definition(&path).map(|definition| (path, definition)))
            })
            .collect()
    }

    fn parse_document(content: &str) -> Result<Document, MachineError> {
        let value: Value =
            serde_json::from_str(content).map_err(|e| MachineError::Parse(e.to_string()))?;

        let document = if value.get("config").is_some() {
            serde_json::from_value(value).map(Document::Example)
        } else {
            serde_json::from_value(value).map(Document::Definition)
        };

        document.map_err(|e| MachineError::Parse(e.to_string()))
    }
}

enum Document {
    Example(Example),
    Definition(MachineDefinition),
}

fn read(path: &Path) -> Result<String, MachineError> {
    fs::read_to_string(path).map_err(|e| {
        MachineError::File(format!("Failed to read file {}: {}", path.display(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::programs::ProgramManager;
    use crate::types::DefinitionError;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    const DEFINITION: &str = r#"{
        "name": "Test Machine",
        "states": [{"name": "start"}, {"name": "stop", "isAccept": true}],
        "alphabet": ["a"],
        "tapeAlphabet": ["a", "b", "_"],
        "initialState": "start",
        "blankSymbol": "_",
        "transitions": [
            {"currentState": "start", "readSymbol": "a", "writeSymbol": "b", "moveDirection": "R", "nextState": "stop"}
        ]
    }"#;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_valid_definition() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "test.json", DEFINITION);

        let definition = DefinitionLoader::load_definition(&path).unwrap();
        assert_eq!(definition.name, "Test Machine");
        assert_eq!(definition.initial_state, "start");
        assert_eq!(definition.transitions.len(), 1);
    }

    #[test]
    fn test_load_example_document_as_definition() {
        let text = ProgramManager::get_example_text_by_index(0).unwrap();

        let definition = DefinitionLoader::load_definition_from_string(text).unwrap();
        assert_eq!(definition.name, "Binary Increment");
    }

    #[test]
    fn test_load_example_file() {
        let dir = tempdir().unwrap();
        let text = ProgramManager::get_example_text_by_index(2).unwrap();
        let path = write_file(dir.path(), "unary.json", text);

        let example = DefinitionLoader::load_example(&path).unwrap();
        assert_eq!(example.id, "unary-addition");
        assert_eq!(example.default_input(), "1+1");
    }

    #[test]
    fn test_load_invalid_json() {
        let result = DefinitionLoader::load_definition_from_string("This is not a definition");
        assert!(matches!(result, Err(MachineError::Parse(_))));
    }

    #[test]
    fn test_load_invalid_definition() {
        let broken = DEFINITION.replace(r#""initialState": "start""#, r#""initialState": "nope""#);

        let result = DefinitionLoader::load_definition_from_string(&broken);
        assert_eq!(
            result,
            Err(MachineError::Validation(
                DefinitionError::InvalidInitialState("nope".to_string())
            ))
        );
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let result = DefinitionLoader::load_definition(&dir.path().join("missing.json"));
        assert!(matches!(result, Err(MachineError::File(_))));
    }

    #[test]
    fn test_load_definitions_from_directory() {
        let dir = tempdir().unwrap();

        write_file(dir.path(), "valid.json", DEFINITION);
        write_file(dir.path(), "invalid.json", "{ not json");
        write_file(dir.path(), "ignored.txt", "This file should be ignored");
        std::fs::create_dir(dir.path().join("nested.json")).unwrap();

        let results = DefinitionLoader::load_definitions(dir.path());

        // We should have 2 results: 1 success and 1 error
        assert_eq!(results.len(), 2);
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(results.iter().filter(|r| r.is_err()).count(), 1);
    }

    #[test]
    fn test_load_definitions_missing_directory() {
        let dir = tempdir().unwrap();
        let results = DefinitionLoader::load_definitions(&dir.path().join("absent"));

        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], Err(MachineError::File(_))));
    }
}

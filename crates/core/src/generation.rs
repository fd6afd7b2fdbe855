//! Generator trait — the abstraction over the text-generation backend.
//!
//! ClinMesh treats inference as an external service: given a template
//! identifier and input variables, the backend returns generated text or a
//! `GenerationError` that the caller presents. No concrete model backend
//! ships with this workspace.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use crate::error::GenerationError;

/// A request to the generation backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Prompt template identifier (e.g. "soap_note", "differential").
    pub template: String,

    /// Input variables substituted into the template.
    #[serde(default)]
    pub variables: HashMap<String, String>,

    /// Maximum tokens to generate.
    #[serde(default = "default_max_new_tokens")]
    pub max_new_tokens: u32,
}

fn default_max_new_tokens() -> u32 {
    512
}

impl GenerationRequest {
    /// Create a request for a template with no variables.
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            variables: HashMap::new(),
            max_new_tokens: default_max_new_tokens(),
        }
    }

    /// Add an input variable.
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    /// The fully rendered prompt as recorded in audit logs.
    ///
    /// Variables are appended in sorted key order so the rendering is
    /// deterministic.
    pub fn prompt_text(&self) -> String {
        let mut keys: Vec<&String> = self.variables.keys().collect();
        keys.sort();
        let vars: Vec<String> = keys
            .iter()
            .map(|k| format!("{k}={}", self.variables[*k]))
            .collect();
        if vars.is_empty() {
            self.template.clone()
        } else {
            format!("{} [{}]", self.template, vars.join(", "))
        }
    }
}

/// A complete response from the generation backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// The generated text.
    pub text: String,

    /// Which model produced it.
    pub model: String,
}

/// The generation trait implemented by inference backends.
#[async_trait]
pub trait Generator: Send + Sync {
    /// A human-readable backend name.
    fn name(&self) -> &str;

    /// Generate text for the given request.
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> std::result::Result<GenerationResponse, GenerationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_builder() {
        let request = GenerationRequest::new("soap_note")
            .with_var("symptoms", "fever, cough")
            .with_var("age", "45");
        assert_eq!(request.template, "soap_note");
        assert_eq!(request.max_new_tokens, 512);
        assert_eq!(request.variables.len(), 2);
    }

    #[test]
    fn prompt_text_is_deterministic() {
        let request = GenerationRequest::new("differential")
            .with_var("b", "2")
            .with_var("a", "1");
        assert_eq!(request.prompt_text(), "differential [a=1, b=2]");
    }

    #[test]
    fn prompt_text_without_vars() {
        let request = GenerationRequest::new("triage");
        assert_eq!(request.prompt_text(), "triage");
    }
}

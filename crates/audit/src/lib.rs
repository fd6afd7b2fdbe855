//! Generation audit logging.
//!
//! Every text generation is recorded as a [`GenerationRecord`] so that
//! model output reaching a clinician can be traced back to the prompt
//! that produced it. The in-memory [`AuditLog`] keeps records and fans
//! them out to pluggable [`AuditSink`]s; [`JsonlSink`] appends them to a
//! file one JSON object per line.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use clinmesh_core::error::GenerationError;
use clinmesh_core::generation::{GenerationRequest, GenerationResponse, Generator};
use serde::{Deserialize, Serialize};
use std::io::Write as _;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::warn;

/// One recorded generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub timestamp: DateTime<Utc>,
    pub prompt: String,
    pub output: String,
    pub template: String,
    pub model: String,
}

/// Destination for generation records.
pub trait AuditSink: Send + Sync {
    fn record(&self, record: &GenerationRecord);
}

/// In-memory audit log that stores records and forwards them to sinks.
pub struct AuditLog {
    records: Mutex<Vec<GenerationRecord>>,
    sinks: Vec<Box<dyn AuditSink>>,
}

impl std::fmt::Debug for AuditLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.records.lock().map(|r| r.len()).unwrap_or(0);
        f.debug_struct("AuditLog")
            .field("record_count", &count)
            .field("sink_count", &self.sinks.len())
            .finish()
    }
}

impl AuditLog {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            sinks: Vec::new(),
        }
    }

    pub fn with_sinks(sinks: Vec<Box<dyn AuditSink>>) -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            sinks,
        }
    }

    /// Record one generation and forward it to every sink.
    pub fn log(&self, record: GenerationRecord) {
        for sink in &self.sinks {
            sink.record(&record);
        }
        if let Ok(mut records) = self.records.lock() {
            records.push(record);
        }
    }

    pub fn entries(&self) -> Vec<GenerationRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn count(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn clear(&self) {
        if let Ok(mut records) = self.records.lock() {
            records.clear();
        }
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Emits each record through `tracing::info!`.
pub struct TracingSink;

impl AuditSink for TracingSink {
    fn record(&self, record: &GenerationRecord) {
        tracing::info!(
            template = %record.template,
            model = %record.model,
            output_len = record.output.len(),
            "GENERATION"
        );
    }
}

/// Appends records to a file, one JSON object per line.
pub struct JsonlSink {
    file: Mutex<std::fs::File>,
}

impl JsonlSink {
    pub fn open(path: &Path) -> std::io::Result<Self> {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl AuditSink for JsonlSink {
    fn record(&self, record: &GenerationRecord) {
        let Ok(line) = serde_json::to_string(record) else {
            warn!("Failed to serialize generation record");
            return;
        };
        if let Ok(mut file) = self.file.lock() {
            if let Err(e) = writeln!(file, "{line}") {
                warn!(error = %e, "Failed to append generation record");
            }
        }
    }
}

/// Wraps a [`Generator`] and records every completed generation.
///
/// Recording never fails the generation; a full sink only warns.
pub struct AuditedGenerator<G> {
    inner: G,
    log: Arc<AuditLog>,
}

impl<G: Generator> AuditedGenerator<G> {
    pub fn new(inner: G, log: Arc<AuditLog>) -> Self {
        Self { inner, log }
    }

    pub fn log(&self) -> &AuditLog {
        &self.log
    }
}

#[async_trait]
impl<G: Generator> Generator for AuditedGenerator<G> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError> {
        let prompt = request.prompt_text();
        let template = request.template.clone();

        let response = self.inner.generate(request).await?;

        self.log.log(GenerationRecord {
            timestamp: Utc::now(),
            prompt,
            output: response.text.clone(),
            template,
            model: response.model.clone(),
        });

        Ok(response)
    }
}

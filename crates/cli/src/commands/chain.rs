//! `clinmesh chain` — Run the multi-agent reasoning chain.

use clinmesh_agents::{
    AgentOrchestrator, Diagnostician, DocumentationAgent, EvidenceAgent, SafetyMonitorAgent,
};
use clinmesh_core::PatientContext;
use clinmesh_knowledge::{DiagnosisLibrary, DrugDatabase};
use clinmesh_retrieval::EvidenceStore;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

pub async fn run(
    query: &str,
    context_path: Option<&Path>,
    report: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let context = match context_path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| format!("Failed to read context file {}: {e}", path.display()))?;
            let context = toml::from_str::<PatientContext>(&text)
                .map_err(|e| format!("Invalid context file: {e}"))?;
            debug!(path = %path.display(), "Loaded patient context");
            context
        }
        None => PatientContext::default(),
    };

    let retriever = Arc::new(EvidenceStore::with_default_guidelines().await);
    let orchestrator = AgentOrchestrator::new()
        .register(Arc::new(Diagnostician::new(Arc::new(
            DiagnosisLibrary::default(),
        ))))
        .register(Arc::new(SafetyMonitorAgent::new(Arc::new(
            DrugDatabase::default(),
        ))))
        .register(Arc::new(DocumentationAgent::new()))
        .register(Arc::new(EvidenceAgent::new().with_retriever(retriever)));

    let result = orchestrator.run_reasoning_chain(query, &context).await;

    if report {
        println!("{}", orchestrator.format_final_report(&result));
    } else {
        println!("{}", serde_json::to_string_pretty(&result)?);
    }

    Ok(())
}

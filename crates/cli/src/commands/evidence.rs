//! `clinmesh evidence` — Query the built-in guideline corpus.

use clinmesh_core::retrieval::Retriever;
use clinmesh_retrieval::EvidenceStore;

pub async fn run(query: &str, top_k: usize) -> Result<(), Box<dyn std::error::Error>> {
    let store = EvidenceStore::with_default_guidelines().await;
    let results = store.retrieve(query, top_k).await?;

    if results.is_empty() {
        println!("No guideline evidence found for: {query}");
        return Ok(());
    }

    for evidence in &results {
        println!(
            "[{}] ({:.0}% relevant)\n  {}\n",
            evidence.source,
            evidence.relevance * 100.0,
            evidence.content
        );
    }

    Ok(())
}

//! Retrieval-augmented answer pipeline.
//!
//! Retrieves the top-k chunks for a question, stitches them into a
//! grounded prompt, and asks the completion provider for an answer.

use askcorpus_core::error::{AskCorpusError, Result};
use askcorpus_core::traits::{CompletionBackend, EmbeddingBackend};
use askcorpus_retrieval::VectorStore;

/// Build the grounded prompt: fixed instruction text, retrieved
/// contexts separated by blank lines (in search order), then the
/// question.
pub fn build_prompt(question: &str, contexts: &[String]) -> String {
    let context_text = contexts.join("\n\n");
    format!(
        "You are a helpful assistant.\n\
         Use ONLY the context below to answer the question.\n\
         Context:\n\
         {context_text}\n\n\
         Question:\n\
         {question}\n\n\
         Answer:"
    )
}

/// Answer `question` using the loaded store and the two provider
/// backends. Retrieval failures keep their error categories and are
/// never masked as an empty answer; any failure from the completion
/// leg is reported as `UpstreamCompletion`.
pub async fn answer(
    store: &VectorStore,
    embeddings: &dyn EmbeddingBackend,
    llm: &dyn CompletionBackend,
    question: &str,
    k: usize,
) -> Result<String> {
    let hits = store.similarity_search(embeddings, question, k).await?;
    tracing::debug!(hits = hits.len(), k, "retrieved context chunks");

    let contexts: Vec<String> = hits.into_iter().map(|h| h.text).collect();
    let prompt = build_prompt(question, &contexts);

    // Any failure past retrieval belongs to the upstream provider, no
    // matter which variant the backend raised it as.
    llm.complete(&prompt).await.map_err(|e| match e {
        AskCorpusError::UpstreamCompletion(_) => e,
        other => AskCorpusError::UpstreamCompletion(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_keeps_context_order() {
        let contexts = vec!["first chunk".to_string(), "second chunk".to_string()];
        let prompt = build_prompt("what is this?", &contexts);

        assert!(prompt.contains("first chunk\n\nsecond chunk"));
        assert!(prompt.contains("Question:\nwhat is this?"));
        assert!(prompt.starts_with("You are a helpful assistant."));
        assert!(prompt.ends_with("Answer:"));
        let first = prompt.find("first chunk").unwrap();
        let second = prompt.find("second chunk").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_prompt_with_no_contexts() {
        let prompt = build_prompt("anything?", &[]);
        assert!(prompt.contains("Context:\n\n\nQuestion:"));
    }
}

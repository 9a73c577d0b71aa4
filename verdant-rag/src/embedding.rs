//! Embedder trait for generating vector embeddings from text.

use async_trait::async_trait;

use crate::error::Result;

/// The text embedded once at startup to discover the vector dimension.
pub const PROBE_TEXT: &str = "hello world";

/// A provider that generates vector embeddings from text input.
///
/// Implementations wrap specific embedding backends behind a unified async
/// interface. The default [`embed_batch`](Embedder::embed_batch) implementation
/// calls [`embed`](Embedder::embed) sequentially; backends that support native
/// batching should override it.
///
/// # Example
///
/// ```rust,ignore
/// use verdant_rag::Embedder;
///
/// let provider = MyEmbedder::new();
/// let embedding = provider.embed("hello world").await?;
/// assert_eq!(embedding.len(), provider.probe_dimensions().await?);
/// ```
#[async_trait]
pub trait Embedder: Send + Sync {
    /// A short provider name used in logs and errors.
    fn name(&self) -> &str;

    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embedding vectors for a batch of text inputs, in input order.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// Embed [`PROBE_TEXT`] and return the observed vector length.
    ///
    /// The pipeline fixes its index dimension from this value.
    async fn probe_dimensions(&self) -> Result<usize> {
        Ok(self.embed(PROBE_TEXT).await?.len())
    }
}

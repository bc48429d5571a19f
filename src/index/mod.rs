//! In-memory vector index over document chunks.
//!
//! Entries live as long as the index value; there is no persistence and no
//! delete or update path.
use std::sync::Arc;

use tracing::{debug, info};

use crate::document::Chunk;
use crate::embedder::{Embedder, EmbedderError};

/// A chunk paired with the vector computed from its text.
#[derive(Debug, Clone)]
struct IndexEntry {
    chunk: Chunk,
    vector: Vec<f32>,
}

/// A retrieved chunk and its cosine similarity to the query.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub chunk: Chunk,
    pub similarity: f32,
}

pub struct VectorIndex {
    embedder: Arc<dyn Embedder>,
    entries: Vec<IndexEntry>,
    dimensions: Option<usize>,
}

impl VectorIndex {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            entries: Vec::new(),
            dimensions: None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Vector width, known once something has been added.
    pub fn dimensions(&self) -> Option<usize> {
        self.dimensions
    }

    /// Embed `chunks` and append them.
    ///
    /// Nothing is appended unless every chunk got a vector of the index's
    /// dimension. Duplicates are kept.
    pub fn add(&mut self, chunks: &[Chunk]) -> Result<usize, EmbedderError> {
        if chunks.is_empty() {
            return Ok(0);
        }

        let texts: Vec<&str> = chunks.iter().map(Chunk::content).collect();
        let vectors = self.embedder.embed_batch(&texts)?;
        if vectors.len() != chunks.len() {
            return Err(EmbedderError::InvalidResponse(format!(
                "{} vectors returned for {} chunks",
                vectors.len(),
                chunks.len()
            )));
        }

        let expected = self.dimensions.unwrap_or_else(|| vectors[0].len());
        if let Some(bad) = vectors.iter().find(|v| v.len() != expected) {
            return Err(EmbedderError::DimensionMismatch {
                expected,
                actual: bad.len(),
            });
        }

        self.dimensions = Some(expected);
        self.entries.extend(
            chunks
                .iter()
                .cloned()
                .zip(vectors)
                .map(|(chunk, vector)| IndexEntry { chunk, vector }),
        );
        info!(
            "Indexed {} chunks ({} total, {expected} dims)",
            chunks.len(),
            self.entries.len()
        );
        Ok(chunks.len())
    }

    /// Return up to `k` chunks most similar to `query`, best first.
    ///
    /// Equal scores keep insertion order.
    pub fn search(&self, query: &str, k: usize) -> Result<Vec<SearchResult>, EmbedderError> {
        if self.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let query_vector = self.embedder.embed(query)?;
        if let Some(expected) = self.dimensions {
            if query_vector.len() != expected {
                return Err(EmbedderError::DimensionMismatch {
                    expected,
                    actual: query_vector.len(),
                });
            }
        }

        let mut scored: Vec<SearchResult> = self
            .entries
            .iter()
            .map(|entry| SearchResult {
                chunk: entry.chunk.clone(),
                similarity: cosine_similarity(&query_vector, &entry.vector),
            })
            .collect();

        // sort_by is stable, so ties stay in insertion order
        scored.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        scored.truncate(k);

        debug!("Search returned {} of {} chunks", scored.len(), self.entries.len());
        Ok(scored)
    }
}

/// Cosine similarity of two vectors; 0.0 when either has zero magnitude.
///
/// Accumulates in f64 so large components do not overflow to NaN.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f64 = a.iter().zip(b).map(|(&x, &y)| f64::from(x) * f64::from(y)).sum();
    let norm_a = a.iter().map(|&x| f64::from(x).powi(2)).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|&x| f64::from(x).powi(2)).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let similarity = (dot / (norm_a * norm_b)) as f32;
    if similarity.is_finite() { similarity } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedder::mock::MockEmbedder;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

    fn chunk(index: usize, text: &str) -> Chunk {
        Chunk::new(text.to_string(), PathBuf::from("doc.pdf"), 1, 0, index)
    }

    fn index() -> VectorIndex {
        VectorIndex::new(Arc::new(MockEmbedder::default()))
    }

    /// Fails every call after the first `ok_calls`.
    struct FlakyEmbedder {
        ok_calls: usize,
        calls: AtomicUsize,
    }

    impl Embedder for FlakyEmbedder {
        fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedderError> {
            Ok(self.embed_batch(&[text])?.remove(0))
        }

        fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedderError> {
            if self.calls.fetch_add(1, AtomicOrdering::SeqCst) >= self.ok_calls {
                return Err(EmbedderError::Unreachable {
                    endpoint: "test".to_string(),
                    message: "down".to_string(),
                });
            }
            MockEmbedder::default().embed_batch(texts)
        }
    }

    /// Returns a vector of the wrong width for the last input.
    struct RaggedEmbedder;

    impl Embedder for RaggedEmbedder {
        fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbedderError> {
            Ok(vec![1.0, 0.0])
        }

        fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedderError> {
            let mut out = vec![vec![1.0, 0.0]; texts.len()];
            if let Some(last) = out.last_mut() {
                last.push(0.5);
            }
            Ok(out)
        }
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_add_and_search_ranks_related_first() {
        let mut idx = index();
        idx.add(&[
            chunk(0, "Invoices are due at the end of every month."),
            chunk(1, "The sky is blue on a clear day."),
            chunk(2, "Cats sleep most of the afternoon."),
        ])
        .unwrap();
        assert_eq!(idx.len(), 3);
        assert_eq!(idx.dimensions(), Some(256));

        let results = idx.search("What color is the sky?", 2).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.index(), 1);
        assert!(results[0].similarity >= results[1].similarity);
    }

    #[test]
    fn test_search_never_exceeds_k() {
        let mut idx = index();
        let chunks: Vec<Chunk> = (0..10).map(|i| chunk(i, &format!("item {i}"))).collect();
        idx.add(&chunks).unwrap();

        for k in [1, 3, 10, 25] {
            let results = idx.search("item", k).unwrap();
            assert_eq!(results.len(), k.min(10));
            for r in &results {
                assert!(chunks.contains(&r.chunk));
            }
        }
        assert!(idx.search("item", 0).unwrap().is_empty());
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let mut idx = index();
        idx.add(&[chunk(0, "same words"), chunk(1, "same words"), chunk(2, "same words")])
            .unwrap();
        let order: Vec<usize> = idx
            .search("same words", 3)
            .unwrap()
            .iter()
            .map(|r| r.chunk.index())
            .collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn test_adding_twice_duplicates_top_match() {
        let mut idx = index();
        let chunks = vec![chunk(0, "The sky is blue."), chunk(1, "Grass is green.")];
        idx.add(&chunks).unwrap();
        let first = idx.search("sky blue", 1).unwrap();

        idx.add(&chunks).unwrap();
        assert_eq!(idx.len(), 4);
        let second = idx.search("sky blue", 2).unwrap();
        assert_eq!(second[0].chunk, first[0].chunk);
        assert_eq!(second[1].chunk, first[0].chunk);
    }

    #[test]
    fn test_empty_index_does_not_call_embedder() {
        let idx = VectorIndex::new(Arc::new(FlakyEmbedder {
            ok_calls: 0,
            calls: AtomicUsize::new(0),
        }));
        assert!(idx.search("anything", 4).unwrap().is_empty());
    }

    #[test]
    fn test_failed_add_leaves_index_unchanged() {
        let mut idx = VectorIndex::new(Arc::new(FlakyEmbedder {
            ok_calls: 1,
            calls: AtomicUsize::new(0),
        }));
        idx.add(&[chunk(0, "first batch")]).unwrap();

        let err = idx
            .add(&[chunk(1, "second"), chunk(2, "batch")])
            .unwrap_err();
        assert!(matches!(err, EmbedderError::Unreachable { .. }));
        assert_eq!(idx.len(), 1);
    }

    #[test]
    fn test_failed_search_leaves_index_unchanged() {
        let mut idx = VectorIndex::new(Arc::new(FlakyEmbedder {
            ok_calls: 1,
            calls: AtomicUsize::new(0),
        }));
        idx.add(&[chunk(0, "The sky is blue."), chunk(1, "Grass is green.")])
            .unwrap();

        let err = idx.search("What color is the sky?", 4).unwrap_err();
        assert!(matches!(err, EmbedderError::Unreachable { .. }));
        assert_eq!(idx.len(), 2);
    }

    /// Returns huge vectors for odd-numbered texts.
    struct HugeEmbedder;

    impl Embedder for HugeEmbedder {
        fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbedderError> {
            Ok(vec![1.0, 0.0])
        }

        fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedderError> {
            Ok((0..texts.len())
                .map(|i| if i % 2 == 1 { vec![1e30, 1e30] } else { vec![1.0, 0.0] })
                .collect())
        }
    }

    #[test]
    fn test_huge_vectors_rank_deterministically() {
        assert!(cosine_similarity(&[1e30, 1e30], &[1e30, 1e30]).is_finite());

        let mut idx = VectorIndex::new(Arc::new(HugeEmbedder));
        let chunks: Vec<Chunk> = (0..6).map(|i| chunk(i, &format!("text {i}"))).collect();
        idx.add(&chunks).unwrap();

        let results = idx.search("query", 6).unwrap();
        let order: Vec<usize> = results.iter().map(|r| r.chunk.index()).collect();
        assert_eq!(order, vec![0, 2, 4, 1, 3, 5]);
        assert!(results.iter().all(|r| r.similarity.is_finite()));
        assert!((results[3].similarity - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
    }

    #[test]
    fn test_dimension_mismatch_rejected_whole() {
        let mut idx = VectorIndex::new(Arc::new(RaggedEmbedder));
        let err = idx.add(&[chunk(0, "a"), chunk(1, "b")]).unwrap_err();
        assert!(matches!(
            err,
            EmbedderError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        ));
        assert!(idx.is_empty());
        assert_eq!(idx.dimensions(), None);
    }
}

use crate::embeddings::cosine_similarity;
use crate::error::{Result, VectorStoreError};
use std::collections::HashMap;

/// Exact nearest-neighbour index over document ids (brute-force cosine)
#[derive(Debug, Clone)]
pub struct FlatIndex {
    dimension: usize,
    vectors: HashMap<String, Vec<f32>>,
}

impl FlatIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: HashMap::new(),
        }
    }

    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    /// Add or replace the vector for `id`
    pub fn add(&mut self, id: &str, vector: &[f32]) -> Result<()> {
        self.check_dimension(vector)?;
        self.vectors.insert(id.to_string(), vector.to_vec());
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> bool {
        self.vectors.remove(id).is_some()
    }

    /// Search for k nearest neighbors using cosine similarity
    /// Returns (id, similarity) sorted by similarity descending, ties by id
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(String, f32)>> {
        self.check_dimension(query)?;

        let mut scores: Vec<(String, f32)> = self
            .vectors
            .iter()
            .map(|(id, vector)| (id.clone(), cosine_similarity(query, vector)))
            .collect();

        scores.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        scores.truncate(k);

        Ok(scores)
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn clear(&mut self) {
        self.vectors.clear();
    }

    fn check_dimension(&self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dimension {
            return Err(VectorStoreError::InvalidDimension {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_add_and_search() {
        let mut index = FlatIndex::new(3);

        index.add("a", &[1.0, 0.0, 0.0]).unwrap();
        index.add("b", &[0.9, 0.1, 0.0]).unwrap();
        index.add("c", &[0.0, 1.0, 0.0]).unwrap();

        assert_eq!(index.len(), 3);

        let results = index.search(&[1.0, 0.0, 0.0], 2).unwrap();
        assert_eq!(results.len(), 2);

        assert_eq!(results[0].0, "a");
        assert!((results[0].1 - 1.0).abs() < 1e-6);

        assert_eq!(results[1].0, "b");
        assert!(results[1].1 > 0.9);
    }

    #[test]
    fn test_replace_and_remove() {
        let mut index = FlatIndex::new(2);
        index.add("a", &[1.0, 0.0]).unwrap();
        index.add("a", &[0.0, 1.0]).unwrap();
        assert_eq!(index.len(), 1);

        let results = index.search(&[0.0, 1.0], 5).unwrap();
        assert!((results[0].1 - 1.0).abs() < 1e-6);

        assert!(index.remove("a"));
        assert!(!index.remove("a"));
        assert!(index.is_empty());
    }

    #[test]
    fn test_dimension_mismatch() {
        let mut index = FlatIndex::new(3);
        let result = index.add("a", &[1.0, 0.0]);
        assert!(result.is_err());

        index.add("a", &[1.0, 0.0, 0.0]).unwrap();
        let result = index.search(&[1.0, 0.0], 1);
        assert!(result.is_err());
    }

    proptest! {
        #[test]
        fn search_returns_best_k_in_order(
            vectors in prop::collection::vec(prop::collection::vec(0.1f32..1.0, 4), 1..20),
            query in prop::collection::vec(-1.0f32..1.0, 4),
            k in 0usize..25,
        ) {
            let mut index = FlatIndex::new(4);
            for (i, vector) in vectors.iter().enumerate() {
                index.add(&format!("v{i:02}"), vector).unwrap();
            }

            let results = index.search(&query, k).unwrap();
            prop_assert_eq!(results.len(), k.min(vectors.len()));
            prop_assert!(results.windows(2).all(|w| w[0].1 >= w[1].1));

            let cutoff = results.last().map_or(f32::INFINITY, |r| r.1);
            for (i, vector) in vectors.iter().enumerate() {
                let id = format!("v{i:02}");
                if !results.iter().any(|r| r.0 == id) {
                    prop_assert!(cosine_similarity(&query, vector) <= cutoff);
                }
            }
        }
    }
}

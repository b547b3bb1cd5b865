use crate::error::{Result, VectorStoreError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_DIMENSION: usize = 384;
pub const EMBEDDING_MODE_ENV: &str = "RAG_EMBEDDING_MODE";

/// Text-to-vector capability used by the storage adapter and the retriever.
#[async_trait]
pub trait Embedder: Send + Sync {
    fn dimension(&self) -> usize;

    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingMode {
    /// Lexical feature hashing: texts sharing identifiers land close together.
    #[default]
    Hashed,
    /// Deterministic pseudo-random vectors, unrelated texts are near-orthogonal.
    Stub,
}

impl EmbeddingMode {
    pub fn from_env() -> Result<Self> {
        match env::var(EMBEDDING_MODE_ENV) {
            Ok(raw) => raw.parse(),
            Err(_) => Ok(Self::default()),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hashed => "hashed",
            Self::Stub => "stub",
        }
    }
}

impl FromStr for EmbeddingMode {
    type Err = VectorStoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hashed" => Ok(Self::Hashed),
            "stub" => Ok(Self::Stub),
            other => Err(VectorStoreError::EmbeddingError(format!(
                "Unsupported {EMBEDDING_MODE_ENV} '{other}' (expected 'hashed' or 'stub')"
            ))),
        }
    }
}

impl fmt::Display for EmbeddingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Local, deterministic embedding model
#[derive(Debug, Clone)]
pub struct EmbeddingModel {
    mode: EmbeddingMode,
    dimension: usize,
}

impl EmbeddingModel {
    pub fn new(mode: EmbeddingMode, dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(VectorStoreError::EmbeddingError(
                "Embedding dimension must be positive".to_string(),
            ));
        }
        log::debug!("Embedding model: mode={mode}, dimension={dimension}");
        Ok(Self { mode, dimension })
    }

    #[must_use]
    pub fn embed_sync(&self, text: &str) -> Vec<f32> {
        match self.mode {
            EmbeddingMode::Hashed => hashed_embed(text, self.dimension),
            EmbeddingMode::Stub => stub_embed(text, self.dimension),
        }
    }
}

#[async_trait]
impl Embedder for EmbeddingModel {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_sync(text))
    }
}

#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Signed feature hashing over identifier tokens.
///
/// Whole tokens carry full weight; the parts of `snake_case` and `camelCase`
/// identifiers add half weight so `parse_config` and `parseConfig` overlap.
fn hashed_embed(text: &str, dimension: usize) -> Vec<f32> {
    let mut vec = vec![0.0_f32; dimension];
    for token in text
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| !t.is_empty())
    {
        add_feature(&mut vec, &token.to_lowercase(), 1.0);
        let parts = split_identifier(token);
        if parts.len() > 1 {
            for part in parts {
                add_feature(&mut vec, &part, 0.5);
            }
        }
    }
    normalize(&mut vec);
    vec
}

fn add_feature(vec: &mut [f32], feature: &str, weight: f32) {
    let hash = fnv1a_64(feature.as_bytes());
    let bucket = (hash % vec.len() as u64) as usize;
    let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
    vec[bucket] += sign * weight;
}

fn split_identifier(token: &str) -> Vec<String> {
    let mut parts = Vec::new();
    for piece in token.split('_').filter(|p| !p.is_empty()) {
        let mut current = String::new();
        let mut prev_lower = false;
        for ch in piece.chars() {
            if ch.is_uppercase() && prev_lower && !current.is_empty() {
                parts.push(std::mem::take(&mut current));
            }
            prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
            current.extend(ch.to_lowercase());
        }
        if !current.is_empty() {
            parts.push(current);
        }
    }
    parts
}

fn normalize(vec: &mut [f32]) {
    let norm = vec.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm == 0.0 {
        return;
    }
    for value in vec {
        *value /= norm;
    }
}

fn stub_embed(text: &str, dimension: usize) -> Vec<f32> {
    let mut state =
        fnv1a_64(text.as_bytes()) ^ (dimension as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    let mut vec = Vec::with_capacity(dimension);
    for _ in 0..dimension {
        let bits = splitmix64(&mut state);
        let high = (bits >> 32) as u32;
        let mantissa = high >> 9;
        let unit = f32::from_bits(0x3f80_0000 | mantissa) - 1.0;
        vec.push(unit.mul_add(2.0, -1.0));
    }
    normalize(&mut vec);
    vec
}

fn fnv1a_64(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

const fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(v: &[f32]) -> f32 {
        v.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    #[tokio::test]
    async fn embeddings_are_deterministic_and_normalized() {
        for mode in [EmbeddingMode::Hashed, EmbeddingMode::Stub] {
            let model = EmbeddingModel::new(mode, 64).unwrap();
            let a = model.embed("def parse_config(path): pass").await.unwrap();
            let b = model.embed("def parse_config(path): pass").await.unwrap();
            assert_eq!(a, b);
            assert_eq!(a.len(), 64);
            assert!((norm(&a) - 1.0).abs() < 1e-4, "{mode}");
        }
    }

    #[test]
    fn hashed_mode_rewards_shared_identifiers() {
        let model = EmbeddingModel::new(EmbeddingMode::Hashed, 256).unwrap();
        let query = model.embed_sync("load user settings");
        let close = model.embed_sync("fn load_user_settings() { read settings for user }");
        let far = model.embed_sync("render chart axis ticks");

        assert!(cosine_similarity(&query, &close) > cosine_similarity(&query, &far));
    }

    #[test]
    fn identifier_splitting() {
        assert_eq!(split_identifier("parseConfig"), vec!["parse", "config"]);
        assert_eq!(split_identifier("load_user"), vec!["load", "user"]);
        assert_eq!(split_identifier("HTTPServer"), vec!["httpserver"]);
    }

    #[test]
    fn empty_text_embeds_to_zero_vector() {
        let model = EmbeddingModel::new(EmbeddingMode::Hashed, 16).unwrap();
        assert!(model.embed_sync("  \n").iter().all(|v| *v == 0.0));
    }

    #[test]
    fn mode_parsing() {
        assert_eq!("hashed".parse::<EmbeddingMode>().unwrap(), EmbeddingMode::Hashed);
        assert_eq!(" STUB ".parse::<EmbeddingMode>().unwrap(), EmbeddingMode::Stub);
        assert!("onnx".parse::<EmbeddingMode>().is_err());
    }

    #[test]
    fn zero_dimension_is_rejected() {
        assert!(EmbeddingModel::new(EmbeddingMode::Stub, 0).is_err());
    }

    #[test]
    fn cosine_similarity_edge_cases() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
    }
}

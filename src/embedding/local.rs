//! ONNX Runtime embedding backend (all-MiniLM-L6-v2).

use std::sync::Mutex;

use anyhow::{Context, Result};
use ort::session::Session;
use ort::value::Tensor;
use tokenizers::Tokenizer;

use super::{EmbeddingProvider, EMBEDDING_DIM};
use crate::config::EmbeddingConfig;

/// all-MiniLM-L6-v2 was trained at sequence length 256.
const MAX_SEQ_LEN: usize = 256;

pub struct MiniLmEmbedder {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
}

// Safety: Tokenizer is Send+Sync; the Mutex guarantees exclusive access to the
// Session during run().
unsafe impl Send for MiniLmEmbedder {}
unsafe impl Sync for MiniLmEmbedder {}

impl MiniLmEmbedder {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let cache_dir = crate::config::expand_tilde(&config.cache_dir);
        let model_path = cache_dir.join("model.onnx");
        let tokenizer_path = cache_dir.join("tokenizer.json");

        anyhow::ensure!(
            model_path.exists() && tokenizer_path.exists(),
            "embedding model files not found in {}. Run `skycast model download` first.",
            cache_dir.display()
        );

        let session = Session::builder()?
            .with_optimization_level(ort::session::builder::GraphOptimizationLevel::Level3)?
            .with_intra_threads(4)?
            .commit_from_file(&model_path)
            .context("failed to load ONNX model")?;

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("failed to load tokenizer: {e}"))?;
        tokenizer
            .with_truncation(Some(tokenizers::TruncationParams {
                max_length: MAX_SEQ_LEN,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("failed to set truncation: {e}"))?;
        tokenizer.with_padding(Some(tokenizers::PaddingParams {
            strategy: tokenizers::PaddingStrategy::BatchLongest,
            ..Default::default()
        }));

        tracing::info!(model = %model_path.display(), "embedding model loaded");

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
        })
    }
}

impl EmbeddingProvider for MiniLmEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut results = self.embed_batch(&[text])?;
        Ok(results.pop().expect("batch of one"))
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| anyhow::anyhow!("tokenization failed: {e}"))?;

        let batch = encodings.len();
        let seq_len = encodings[0].get_ids().len();

        let mut ids = Vec::with_capacity(batch * seq_len);
        let mut mask = Vec::with_capacity(batch * seq_len);
        for enc in &encodings {
            ids.extend(enc.get_ids().iter().map(|&v| v as i64));
            mask.extend(enc.get_attention_mask().iter().map(|&v| v as i64));
        }

        let shape = vec![batch as i64, seq_len as i64];
        let ids_tensor = Tensor::from_array((shape.clone(), ids.into_boxed_slice()))?;
        let mask_tensor = Tensor::from_array((shape.clone(), mask.clone().into_boxed_slice()))?;
        // Single-sentence input: token_type_ids are all zero.
        let type_tensor =
            Tensor::from_array((shape, vec![0i64; batch * seq_len].into_boxed_slice()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| anyhow::anyhow!("session lock poisoned: {e}"))?;
        let outputs = session.run(ort::inputs! {
            "input_ids" => ids_tensor,
            "attention_mask" => mask_tensor,
            "token_type_ids" => type_tensor,
        })?;

        // Output name varies by ONNX export; fall back to the first output.
        let token_embeddings = outputs
            .get("token_embeddings")
            .or_else(|| outputs.get("last_hidden_state"))
            .unwrap_or_else(|| &outputs[0]);
        let (out_shape, data) = token_embeddings
            .try_extract_tensor::<f32>()
            .context("failed to extract token embeddings")?;

        let dims: &[i64] = &out_shape;
        anyhow::ensure!(
            dims.len() == 3 && dims[2] == EMBEDDING_DIM as i64,
            "unexpected embedding shape {dims:?}, expected [batch, seq, {EMBEDDING_DIM}]"
        );
        let out_seq_len = dims[1] as usize;

        let vectors = (0..batch)
            .map(|b| {
                let pooled = mean_pool(
                    &data[b * out_seq_len * EMBEDDING_DIM..(b + 1) * out_seq_len * EMBEDDING_DIM],
                    &mask[b * seq_len..b * seq_len + out_seq_len],
                );
                l2_normalize(&pooled)
            })
            .collect();

        Ok(vectors)
    }
}

/// Attention-mask-weighted mean over token embeddings.
fn mean_pool(token_data: &[f32], mask: &[i64]) -> Vec<f32> {
    let mut sum = vec![0.0f32; EMBEDDING_DIM];
    let mut count = 0.0f32;
    for (s, &m) in mask.iter().enumerate() {
        if m > 0 {
            let offset = s * EMBEDDING_DIM;
            for d in 0..EMBEDDING_DIM {
                sum[d] += token_data[offset + d];
            }
            count += 1.0;
        }
    }
    if count > 0.0 {
        for v in &mut sum {
            *v /= count;
        }
    }
    sum
}

/// L2-normalize a vector. A zero vector stays zero.
fn l2_normalize(v: &[f32]) -> Vec<f32> {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        v.iter().map(|x| x / norm).collect()
    } else {
        v.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn l2_normalize_unit_norm() {
        let normalized = l2_normalize(&[3.0, 4.0]);
        assert!((normalized[0] - 0.6).abs() < 1e-6);
        assert!((normalized[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn l2_normalize_zero_vector() {
        assert_eq!(l2_normalize(&[0.0, 0.0]), vec![0.0, 0.0]);
    }

    #[test]
    fn mean_pool_ignores_masked_tokens() {
        // two tokens, second masked out
        let mut data = vec![0.0f32; 2 * EMBEDDING_DIM];
        data[0] = 2.0; // token 0, dim 0
        data[EMBEDDING_DIM] = 100.0; // token 1, dim 0 (masked)
        let pooled = mean_pool(&data, &[1, 0]);
        assert!((pooled[0] - 2.0).abs() < 1e-6);
    }

    fn model_config() -> EmbeddingConfig {
        EmbeddingConfig {
            provider: "local".into(),
            model: "all-MiniLM-L6-v2".into(),
            cache_dir: crate::config::default_skycast_dir()
                .join("models")
                .to_string_lossy()
                .into_owned(),
        }
    }

    #[test]
    #[ignore] // Requires model files — run with: cargo test -- --ignored
    fn embed_produces_normalized_384_dims() {
        let embedder = MiniLmEmbedder::new(&model_config()).unwrap();
        let vector = embedder.embed("heavy rain expected tomorrow").unwrap();
        assert_eq!(vector.len(), EMBEDDING_DIM);
        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }

    #[test]
    #[ignore]
    fn similar_texts_are_closer_than_unrelated_ones() {
        let embedder = MiniLmEmbedder::new(&model_config()).unwrap();
        let a = embedder.embed("It is raining heavily in London").unwrap();
        let b = embedder.embed("Heavy rainfall over London today").unwrap();
        let c = embedder.embed("Quantum computing uses qubits").unwrap();

        let dot = |x: &[f32], y: &[f32]| -> f32 { x.iter().zip(y).map(|(a, b)| a * b).sum() };
        assert!(dot(&a, &b) > dot(&a, &c));
    }
}

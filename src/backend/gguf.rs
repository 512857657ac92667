//! llama-cpp-2 backend for GGUF models.
//!
//! Model loading, context creation, and token generation are delegated to
//! the llama-cpp-2 bindings.

use std::num::NonZeroU32;
use std::path::PathBuf;
use std::sync::Arc;

use llama_cpp_2::context::params::LlamaContextParams;
use llama_cpp_2::context::LlamaContext;
use llama_cpp_2::llama_backend::LlamaBackend;
use llama_cpp_2::llama_batch::LlamaBatch;
use llama_cpp_2::model::params::LlamaModelParams;
use llama_cpp_2::model::{AddBos, LlamaModel};
use llama_cpp_2::sampling::LlamaSampler;
use llama_cpp_2::token::LlamaToken;
use parking_lot::{const_mutex, Mutex};

use super::{LoadRequest, ModelBackend, ModelResource};
use crate::config::{resolve_threads, BridgeConfig};
use crate::error::BridgeError;

const TOP_K: i32 = 40;
const TOP_P: f32 = 0.9;
const TEMPERATURE: f32 = 0.7;
const SEED: u32 = 42;

// llama.cpp allows a single backend init per process.
static LLAMA_BACKEND: Mutex<Option<Arc<LlamaBackend>>> = const_mutex(None);

fn shared_backend() -> Result<Arc<LlamaBackend>, BridgeError> {
    let mut slot = LLAMA_BACKEND.lock();
    if let Some(backend) = slot.as_ref() {
        return Ok(backend.clone());
    }
    let backend = Arc::new(LlamaBackend::init().map_err(|e| {
        BridgeError::AcquisitionFailure(format!("backend init: {e}"))
    })?);
    *slot = Some(backend.clone());
    Ok(backend)
}

/// Backend loading GGUF files through llama-cpp-2.
pub struct GgufBackend {
    n_threads: i32,
    n_gpu_layers: u32,
}

impl GgufBackend {
    pub fn new(config: &BridgeConfig) -> Self {
        Self {
            n_threads: resolve_threads(config.n_threads),
            n_gpu_layers: config.n_gpu_layers,
        }
    }
}

impl ModelBackend for GgufBackend {
    fn name(&self) -> &'static str {
        "gguf"
    }

    fn load(&self, request: &LoadRequest) -> Result<Box<dyn ModelResource>, BridgeError> {
        let backend = shared_backend()?;
        let model_params = LlamaModelParams::default().with_n_gpu_layers(self.n_gpu_layers);
        let model = LlamaModel::load_from_file(&backend, &request.model_path, &model_params)
            .map_err(|e| BridgeError::AcquisitionFailure(format!("load: {e}")))?;
        Ok(Box::new(GgufContext {
            backend,
            model,
            model_path: request.model_path.clone(),
            n_ctx: request.n_ctx,
            n_threads: self.n_threads,
        }))
    }
}

/// A loaded GGUF model. A fresh llama context is created per generation.
pub struct GgufContext {
    backend: Arc<LlamaBackend>,
    model: LlamaModel,
    model_path: PathBuf,
    n_ctx: u32,
    n_threads: i32,
}

// SAFETY: LlamaModel and LlamaBackend are Send+Sync in llama-cpp-2; the model
// is only read after loading.
unsafe impl Send for GgufContext {}
unsafe impl Sync for GgufContext {}

impl GgufContext {
    fn tokenize(&self, text: &str) -> Result<Vec<LlamaToken>, BridgeError> {
        self.model
            .str_to_token(text, AddBos::Always)
            .map_err(|e| BridgeError::InputValidation(format!("tokenize: {e}")))
    }

    fn detokenize(&self, tokens: &[LlamaToken]) -> Result<String, BridgeError> {
        let mut dec = encoding_rs::UTF_8.new_decoder();
        let mut out = String::new();
        for &t in tokens {
            let piece = self
                .model
                .token_to_piece(t, &mut dec, false, None)
                .map_err(|e| BridgeError::Inference(format!("detok: {e}")))?;
            out.push_str(&piece);
        }
        Ok(out)
    }

    fn create_context(&self) -> Result<LlamaContext<'_>, BridgeError> {
        let p = LlamaContextParams::default()
            .with_n_ctx(NonZeroU32::new(self.n_ctx))
            .with_n_threads(self.n_threads)
            .with_n_threads_batch(self.n_threads);
        self.model
            .new_context(&self.backend, p)
            .map_err(|e| BridgeError::Inference(format!("ctx: {e}")))
    }

    fn sample_loop(
        &self,
        ctx: &mut LlamaContext<'_>,
        tokens: &[LlamaToken],
        max_tok: u32,
    ) -> Result<Vec<LlamaToken>, BridgeError> {
        let mut batch = LlamaBatch::new(tokens.len(), 1);
        add_seq(&mut batch, tokens)?;
        decode(ctx, &mut batch)?;
        let mut sampler = build_sampler();
        sampler.accept_many(tokens.iter().copied());
        let mut out = Vec::new();
        let mut pos = tokens.len() as i32;
        for _ in 0..max_tok {
            // -1 samples from the last token that had logits computed
            let tok = sampler.sample(ctx, -1);
            sampler.accept(tok);
            if self.model.is_eog_token(tok) {
                break;
            }
            out.push(tok);
            batch.clear();
            add_one(&mut batch, tok, pos)?;
            decode(ctx, &mut batch)?;
            pos += 1;
        }
        Ok(out)
    }
}

impl ModelResource for GgufContext {
    fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, BridgeError> {
        if prompt.is_empty() {
            return Err(BridgeError::InputValidation("prompt cannot be empty".into()));
        }
        let tokens = self.tokenize(prompt)?;
        let prompt_len = u32::try_from(tokens.len()).unwrap_or(u32::MAX);
        if prompt_len >= self.n_ctx {
            return Err(BridgeError::InputValidation(format!(
                "prompt is {prompt_len} tokens, context window is {}",
                self.n_ctx
            )));
        }
        let max_tok = max_tokens.min(self.n_ctx - prompt_len);
        let mut ctx = self.create_context()?;
        let out = self.sample_loop(&mut ctx, &tokens, max_tok)?;
        self.detokenize(&out)
    }

    fn describe(&self) -> String {
        format!(
            "gguf({}, n_ctx={}, size={} bytes)",
            self.model_path.display(),
            self.n_ctx,
            self.model.size()
        )
    }
}

fn add_seq(batch: &mut LlamaBatch, tokens: &[LlamaToken]) -> Result<(), BridgeError> {
    // Only the last prompt token needs logits
    let n = tokens.len();
    for (i, &tok) in tokens.iter().enumerate() {
        batch
            .add(tok, i as i32, &[0], i + 1 == n)
            .map_err(|e| BridgeError::Inference(format!("batch: {e}")))?;
    }
    Ok(())
}

fn add_one(batch: &mut LlamaBatch, tok: LlamaToken, pos: i32) -> Result<(), BridgeError> {
    batch
        .add(tok, pos, &[0], true)
        .map_err(|e| BridgeError::Inference(format!("batch: {e}")))
}

fn decode(ctx: &mut LlamaContext<'_>, batch: &mut LlamaBatch) -> Result<(), BridgeError> {
    ctx.decode(batch)
        .map_err(|e| BridgeError::Inference(format!("decode: {e}")))
}

fn build_sampler() -> LlamaSampler {
    LlamaSampler::chain_simple([
        LlamaSampler::top_k(TOP_K),
        LlamaSampler::top_p(TOP_P, 1),
        LlamaSampler::temp(TEMPERATURE),
        LlamaSampler::dist(SEED),
    ])
}

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use alembic_core::errors::ProviderError;
use alembic_core::models::{GenerationRequest, GenerationResponse, ProviderDescriptor};
use alembic_core::traits::IProvider;
use async_trait::async_trait;

/// Deterministic provider double.
pub struct ScriptedProvider {
    descriptor: ProviderDescriptor,
    dimensions: usize,
    reply: Option<String>,
    delay: Option<Duration>,
    fail_all: bool,
    fail_first: usize,
    /// Calls at or past this index fail; adjustable while in use.
    fail_from: AtomicUsize,
    available: AtomicBool,
    generate_calls: AtomicUsize,
    embed_calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    /// Generation-only provider.
    pub fn generator(name: &str) -> Self {
        Self {
            descriptor: ProviderDescriptor {
                name: name.to_string(),
                supports_generation: true,
                supports_embeddings: false,
                max_context_tokens: 8_192,
                cost_per_1k_tokens: 0.5,
                relative_latency: 1.0,
                model: format!("{name}-model"),
                embedding_model: None,
            },
            dimensions: 0,
            reply: None,
            delay: None,
            fail_all: false,
            fail_first: 0,
            fail_from: AtomicUsize::new(usize::MAX),
            available: AtomicBool::new(true),
            generate_calls: AtomicUsize::new(0),
            embed_calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Embedding-only provider producing `dimensions`-long vectors.
    pub fn embedder(name: &str, dimensions: usize) -> Self {
        let mut p = Self::generator(name).with_embeddings(dimensions);
        p.descriptor.supports_generation = false;
        p
    }

    pub fn with_embeddings(mut self, dimensions: usize) -> Self {
        self.descriptor.supports_embeddings = true;
        self.descriptor.embedding_model = Some(format!("{}-embed", self.descriptor.name));
        self.dimensions = dimensions;
        self
    }

    /// Fixed completion text instead of the default echo.
    pub fn with_reply(mut self, reply: impl Into<String>) -> Self {
        self.reply = Some(reply.into());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_cost(mut self, cost_per_1k_tokens: f64) -> Self {
        self.descriptor.cost_per_1k_tokens = cost_per_1k_tokens;
        self
    }

    /// Every call fails with a transient error.
    pub fn failing(mut self) -> Self {
        self.fail_all = true;
        self
    }

    /// The first `n` calls fail, later ones succeed.
    pub fn failing_first(mut self, n: usize) -> Self {
        self.fail_first = n;
        self
    }

    pub fn unavailable(self) -> Self {
        self.available.store(false, Ordering::SeqCst);
        self
    }

    /// Calls numbered `index` and up fail. Generation and embedding calls
    /// are numbered separately, from zero.
    pub fn fail_from_call(&self, index: usize) {
        self.fail_from.store(index, Ordering::SeqCst);
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn generate_calls(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }

    pub fn embed_calls(&self) -> usize {
        self.embed_calls.load(Ordering::SeqCst)
    }

    /// Every prompt received by `generate`, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    fn should_fail(&self, call_index: usize) -> Option<ProviderError> {
        if self.fail_all
            || call_index < self.fail_first
            || call_index >= self.fail_from.load(Ordering::SeqCst)
        {
            Some(ProviderError::RequestFailed {
                provider: self.descriptor.name.clone(),
                reason: "scripted failure".to_string(),
            })
        } else {
            None
        }
    }

    /// Deterministic unit vector derived from the text hash.
    pub fn vector_for(&self, text: &str) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.dimensions);
        let mut counter: u32 = 0;
        while out.len() < self.dimensions {
            let mut hasher = blake3::Hasher::new();
            hasher.update(text.as_bytes());
            hasher.update(&counter.to_le_bytes());
            for byte in hasher.finalize().as_bytes() {
                if out.len() == self.dimensions {
                    break;
                }
                out.push(f32::from(*byte) / 255.0 - 0.5);
            }
            counter += 1;
        }
        let norm: f32 = out.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            out.iter_mut().for_each(|x| *x /= norm);
        }
        out
    }
}

#[async_trait]
impl IProvider for ScriptedProvider {
    fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, ProviderError> {
        let call = self.generate_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(request.prompt.clone());
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = self.should_fail(call) {
            return Err(err);
        }
        if !self.descriptor.supports_generation {
            return Err(ProviderError::Unsupported {
                provider: self.descriptor.name.clone(),
                capability: "generation".to_string(),
            });
        }
        let content = match &self.reply {
            Some(reply) => reply.clone(),
            None => {
                let chars: Vec<char> = request.prompt.chars().collect();
                let tail: String = chars[chars.len().saturating_sub(80)..].iter().collect();
                format!("{} #{call}: {tail}", self.descriptor.name)
            }
        };
        let output_tokens = content.split_whitespace().count() as u32;
        Ok(GenerationResponse {
            content,
            model: request
                .model
                .clone()
                .unwrap_or_else(|| self.descriptor.model.clone()),
            input_tokens: Some(request.prompt.split_whitespace().count() as u32),
            output_tokens: Some(output_tokens),
        })
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        let call = self.embed_calls.fetch_add(1, Ordering::SeqCst);
        if !self.descriptor.supports_embeddings {
            return Err(ProviderError::Unsupported {
                provider: self.descriptor.name.clone(),
                capability: "embedding".to_string(),
            });
        }
        if let Some(err) = self.should_fail(call) {
            return Err(err);
        }
        Ok(self.vector_for(text))
    }

    async fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }
}

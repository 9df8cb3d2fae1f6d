//! # alembic-providers
//!
//! Uniform contract over generation/embedding backends, a capability-aware
//! registry, and fallback chains that aggregate per-provider failures.
//!
//! ## Architecture
//!
//! ```text
//! ProviderRegistry
//! ├── resolve(capability, preferred) → ordered chain
//! │   ├── preferred provider (if capable)
//! │   ├── configured fallbacks filtered by capability
//! │   └── healthy-first stable reorder (advisory)
//! ├── FallbackChain (invoke, per-call FallbackEvents, provider metrics)
//! └── EmbeddingRouter (standard dims check, substitution record, moka cache)
//!
//! providers/
//! ├── OpenAiProvider    (generation + embeddings, HTTP)
//! ├── AnthropicProvider (generation only, HTTP)
//! ├── OllamaProvider    (generation + embeddings, local HTTP)
//! └── HashedEmbedder    (embeddings only, always available)
//! ```

pub mod chain;
pub mod embedding;
mod http;
pub mod providers;
pub mod registry;

pub use chain::{FallbackChain, Routed};
pub use embedding::EmbeddingRouter;
pub use providers::{AnthropicProvider, HashedEmbedder, OllamaProvider, OpenAiProvider};
pub use providers::create_provider;
pub use registry::{ProviderRegistry, LOCAL_EMBEDDER};

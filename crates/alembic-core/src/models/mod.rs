mod artifact;
mod fallback_event;
mod feedback_event;
mod generation;
mod optimize;
mod phase;
mod provider_descriptor;
mod ranking_record;
mod request;
mod search;
mod training_run;
mod weight_vector;

pub use artifact::{Artifact, EmbeddingInfo, GenerationMetadata, Lineage};
pub use fallback_event::FallbackEvent;
pub use feedback_event::{FeedbackEvent, FeedbackKind};
pub use generation::{EmbeddingOutcome, GenerationRequest, GenerationResponse};
pub use optimize::{OptimizeRequest, OptimizeResult};
pub use phase::Phase;
pub use provider_descriptor::{Capability, ProviderDescriptor, ProviderStatus};
pub use ranking_record::{Factor, FactorScores, RankingRecord, ScoreSource};
pub use request::{
    GenerateRequest, GenerateResult, GeneratedArtifact, PartialFailure, RequestState,
    SelectionStrategy,
};
pub use search::{SearchFilter, SearchHit, SearchOptions, SearchOutcome};
pub use training_run::{TrainingOutcome, TrainingRun};
pub use weight_vector::WeightVector;

mod artifact_store;
mod learner;
mod provider;
mod ranker;

pub use artifact_store::IArtifactStore;
pub use learner::ILearner;
pub use provider::IProvider;
pub use ranker::{IRanker, Neighbor, RankingContext};

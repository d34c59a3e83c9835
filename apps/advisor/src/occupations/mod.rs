// Occupation ranking.
// Implements: record normalization, recency-window filter, per-title merge, weighted scoring.
// Everything except `handlers` is synchronous and free of shared state.

pub mod handlers;
pub mod merge;
pub mod models;
pub mod normalize;
pub mod ranker;
pub mod scoring;

pub use models::{RankedOccupation, RawJobRecord};
pub use ranker::{rank_occupations, RankingOptions};
pub use scoring::RankingWeights;

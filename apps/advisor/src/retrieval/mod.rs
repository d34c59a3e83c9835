// Candidate module retrieval.
// `source` is the async seam to the module catalog; `strategy` is pure.

pub mod handlers;
pub mod models;
pub mod source;
pub mod strategy;

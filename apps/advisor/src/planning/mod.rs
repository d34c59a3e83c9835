// Study plan scheduling.
// Greedy semester placement with a single forward skip per semester, followed by a re-validation pass.

pub mod handlers;
pub mod models;
pub mod scheduler;
pub mod validation;

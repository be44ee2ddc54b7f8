//! Résumé-vs-job-description features: the scoring dashboard and gap analysis.

pub mod analyzer;
pub mod gap;
pub mod handlers;
pub mod prompts;

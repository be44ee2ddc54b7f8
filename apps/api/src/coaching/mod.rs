//! Free-text coaching features: career roadmaps and the mentor chat.

pub mod handlers;
pub mod mentor;
pub mod prompts;
pub mod roadmap;

//! Résumé ingestion: PDF text extraction, keyword highlighting and
//! LLM structuring.

pub mod handlers;
pub mod highlight;
pub mod parser;
pub mod pdf;
pub mod prompts;

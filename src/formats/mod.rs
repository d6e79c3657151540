//! Output format module for sockaudit
pub mod csv;
pub mod json;
pub mod jsonl;
pub mod text;
pub mod traits;

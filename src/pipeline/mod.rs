pub mod details;
pub mod extractor;
pub mod orchestrator;
pub mod signatures;

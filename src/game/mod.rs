pub mod duplicate;
pub mod scoring;

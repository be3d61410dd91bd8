pub mod jwt;
pub mod settings;

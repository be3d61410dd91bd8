pub mod account_service;
pub mod score_service;

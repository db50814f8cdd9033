pub mod auth;
pub mod quiz;

pub mod agent;
pub mod configuration;
pub mod errors;
pub mod prompt;
pub mod providers;
pub mod tools;

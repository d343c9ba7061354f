pub mod base;
pub mod chat_model;
pub mod configs;
pub mod pollinations;
pub mod types;
pub mod utils;

#[cfg(test)]
pub mod mock;

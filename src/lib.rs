pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod mail;
pub mod pipeline;
pub mod report;
pub mod summarize;
pub mod terminal;

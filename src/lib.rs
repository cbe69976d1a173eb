pub mod backend;
pub mod batch;
pub mod cache;
pub mod config;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod quality;
pub mod record;
pub mod textutil;

// Completion service client

pub mod client;

pub use client::CompletionClient;

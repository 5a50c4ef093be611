//! Completion-service integration: client, prompts and output decoding.

pub mod completion;
pub mod parse;
pub mod prompts;

pub use completion::{CompletionClient, OpenAiCompletion};

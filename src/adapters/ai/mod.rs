//! Text generation adapters. Implement `TextGenerationPort`.
//!
//! Provides an OpenAI-compatible client and an offline mock.

pub mod mock_adapter;
pub mod openai_adapter;

pub use mock_adapter::MockAiAdapter;
pub use openai_adapter::OpenAiAdapter;

//! OpenAI-compatible chat completion client for tutorflow.
//!
//! This crate is the transport for the three generation stages. It knows
//! nothing about roles, prompts or the pipeline; it sends a chat request and
//! returns the provider's response or a typed [`ProviderError`].
//!
//! # Architecture
//!
//! - [`Provider`] trait defines the chat completion interface
//! - [`OpenAiCompatProvider`] implements it for any OpenAI-compatible API
//! - [`LlmProviderConfig`] describes how to connect to a provider
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use tutorflow_llm::{ChatMessage, ChatRequest, LlmProviderConfig, OpenAiCompatProvider, Provider};
//!
//! let provider = OpenAiCompatProvider::new(LlmProviderConfig::dashscope());
//! let request = ChatRequest::new("qwen-flash", vec![
//!     ChatMessage::system("You are a helpful assistant."),
//!     ChatMessage::user("What is momentum?"),
//! ]);
//!
//! let response = provider.complete(&request).await?;
//! println!("{}", response.first_text().unwrap_or_default());
//! ```

pub mod config;
pub mod error;
pub mod openai_compat;
pub mod provider;
pub mod types;

pub use config::LlmProviderConfig;
pub use error::{ProviderError, Result};
pub use openai_compat::OpenAiCompatProvider;
pub use provider::Provider;
pub use types::{ChatMessage, ChatRequest, ChatResponse, Choice, Usage};

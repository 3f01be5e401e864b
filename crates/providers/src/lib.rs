//! LLM Provider implementations for Turnwise.
//!
//! All providers implement the `turnwise_core::Provider` trait.
//! [`build_from_config`] selects the backend from configuration.

pub mod builder;
pub mod openai_compat;

pub use builder::{build_from_config, default_base_url, is_local_provider, resolve_base_url};
pub use openai_compat::OpenAiCompatProvider;

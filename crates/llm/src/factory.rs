//! Chat client factory.
//!
//! Creates a chat client from the provider name and endpoint configuration.
//! The backend is chosen here, at construction time; callers hold a trait
//! object and never inspect the concrete type.

use crate::client::ChatClient;
use crate::providers::OpenAiClient;
use docquery_core::{AppError, AppResult};
use std::sync::Arc;

/// Create a chat client for the given provider.
///
/// # Arguments
/// * `provider` - Provider identifier ("openai" or "openrouter")
/// * `endpoint` - Optional custom endpoint base URL
/// * `api_key` - API key for the provider
///
/// # Errors
/// Returns `AppError::Config` if the provider is unknown or the API key is
/// missing.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn ChatClient>> {
    match provider.to_lowercase().as_str() {
        "openai" | "openrouter" => {
            let api_key = api_key.ok_or_else(|| {
                AppError::Config(format!("Provider '{}' requires an API key", provider))
            })?;
            let client = match endpoint {
                Some(url) => OpenAiClient::with_base_url(url, api_key),
                None => OpenAiClient::new(api_key),
            };
            Ok(Arc::new(client))
        }
        _ => Err(AppError::Config(format!(
            "Unknown chat provider: '{}'. Supported providers: openai, openrouter",
            provider
        ))),
    }
}

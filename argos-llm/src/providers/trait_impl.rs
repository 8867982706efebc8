use crate::config::GenerateRequest;
use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait Provider: Send + Sync {
    /// Get the provider name
    fn name(&self) -> &'static str;

    /// Run one text generation request and return the full completion.
    ///
    /// Implementations that receive the completion in incremental chunks
    /// must concatenate them in arrival order before returning.
    async fn generate(&self, request: GenerateRequest) -> Result<String>;
}

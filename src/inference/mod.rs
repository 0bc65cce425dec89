pub mod gemini;

use async_trait::async_trait;

use crate::error::CallFailure;
use crate::wire::{GenerateContentRequest, GenerateContentResponse};

/// One generateContent call. No state, no history, no retries.
/// Request in, response out.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, CallFailure>;
}

/// Blanket impl so `Box<dyn GenerativeBackend>` can be handed to `GeminiLlm::with_backend()`.
#[async_trait]
impl GenerativeBackend for Box<dyn GenerativeBackend> {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, CallFailure> {
        (**self).generate_content(model, request).await
    }
}

pub use gemini::GeminiClient;

//! The generation backend seam: one opaque prompt in, text out or failure.

use async_trait::async_trait;

use crate::error::GenerationError;

/// Anything that can turn a prompt into generated text.
///
/// Implementations make a single attempt; callers own fallback behavior.
#[async_trait]
pub trait Generator: Send + Sync {
  async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;

  /// Short name for logs (model id, or a test double's label).
  fn name(&self) -> &str;
}

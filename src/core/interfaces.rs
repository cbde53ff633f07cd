use crate::core::models::ChunkMetadata;
use crate::utils::Result;
use serde_json::Value;

/// Checks registration arguments before a stylesheet is recorded
pub trait PreprocessorValidator: Send + Sync {
    fn validate(&self, kind: &str, source: &str, output: &str) -> Result<()>;
}

/// Code-splitting registry shared by every component of a build
pub trait ChunkRegistry: Send + Sync {
    /// Emit a separate runtime chunk
    fn enable_runtime(&self);

    fn add(
        &self,
        name: &str,
        matcher_key: &str,
        pattern: &str,
        metadata: ChunkMetadata,
    ) -> Result<()>;

    /// Render the bundler `optimization` section
    fn optimization(&self) -> Value;
}

use std::path::Path;

use super::{Server, Source};
use crate::core::Result;

/// Reads [`Server`] settings from a JSON or YAML file.
pub struct ConfigReader;

impl ConfigReader {
    pub async fn read(path: impl AsRef<Path>) -> Result<Server> {
        let path = path.as_ref();
        let source = Source::detect(&path.to_string_lossy())?;
        let text = tokio::fs::read_to_string(path).await?;
        let server = Server::from_source(source, &text)?;
        tracing::debug!(path = %path.display(), "server config loaded");
        Ok(server)
    }
}

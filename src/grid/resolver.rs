use super::PathResolver;
use crate::error::{ExdError, ExdResult};
use std::path::PathBuf;
use url::Url;

/// Resolves `file://` URLs (percent-encoded) and bare local paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileUrlResolver;

impl FileUrlResolver {
    fn to_path(url: &str) -> ExdResult<PathBuf> {
        match Url::parse(url) {
            Ok(parsed) if parsed.scheme() == "file" => parsed
                .to_file_path()
                .map_err(|_| ExdError::NotFound(format!("File \"{}\" is not a local path.", url))),
            // single letters are Windows drive prefixes, not schemes
            Ok(parsed) if parsed.scheme().len() > 1 => Err(ExdError::NotFound(format!(
                "File \"{}\" uses unsupported scheme \"{}\".",
                url,
                parsed.scheme()
            ))),
            _ => Ok(PathBuf::from(url)),
        }
    }
}

impl PathResolver for FileUrlResolver {
    fn resolve_to_local_path(&self, url: &str) -> ExdResult<PathBuf> {
        let path = Self::to_path(url)?;
        if !path.is_file() {
            return Err(ExdError::NotFound(format!(
                "File \"{}\" not accessible from plugin.",
                url
            )));
        }
        Ok(path)
    }
}

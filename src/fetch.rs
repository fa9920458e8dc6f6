//! Document fetching seam.
//!
//! `load` resolves a source URI to bytes through a [`Fetcher`]. The
//! in-tree implementation serves `file:` URIs and bare paths; network
//! transports are external collaborators that plug in at the trait.

use std::fs;
use std::time::Duration;

use tracing::debug;

use crate::error::{Result, StoreError};

/// Resolves a URI to the document's bytes.
///
/// Implementations should give up after `timeout`; the store additionally
/// rejects any fetch whose wall-clock time exceeds it.
pub trait Fetcher: Send + Sync {
    /// Fetches the document named by `uri`.
    fn fetch(&self, uri: &str, timeout: Duration) -> Result<Vec<u8>>;
}

/// Fetcher for `file:` URIs and plain filesystem paths.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileFetcher;

impl Fetcher for FileFetcher {
    fn fetch(&self, uri: &str, _timeout: Duration) -> Result<Vec<u8>> {
        let path = match uri.split_once(':') {
            Some(("file", rest)) => rest.trim_start_matches("//"),
            Some((scheme, _)) if scheme.len() > 1 => {
                return Err(StoreError::Fetch {
                    uri: uri.to_owned(),
                    reason: format!("unsupported scheme '{scheme}'"),
                })
            }
            // No scheme (or a single-letter drive prefix): treat as a path.
            _ => uri,
        };
        debug!(uri, path, "fetching file");
        fs::read(path).map_err(|e| StoreError::Fetch {
            uri: uri.to_owned(),
            reason: e.to_string(),
        })
    }
}

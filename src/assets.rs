//! Static image assets: the label logo and the packing-slip banner.
//!
//! Assets are fetched once, before any layout work starts, and a failure
//! only costs the picture: the generator draws a blank header area instead.

use std::sync::Arc;

use async_trait::async_trait;
use image::DynamicImage;

use crate::config::MillProfile;
use crate::error::ReelprintError;

/// Decoded images available to the generators. Either may be missing.
#[derive(Debug, Clone, Default)]
pub struct Assets {
    pub logo: Option<Arc<DynamicImage>>,
    pub header: Option<Arc<DynamicImage>>,
}

impl Assets {
    /// No images; every header area is left blank.
    pub fn none() -> Self {
        Self::default()
    }
}

/// Fetches raw asset bytes from a location (URL or path).
#[async_trait]
pub trait AssetLoader: Send + Sync {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>, ReelprintError>;
}

/// Loads `http(s)://` locations with reqwest and everything else from disk.
pub struct HttpFileLoader {
    client: reqwest::Client,
}

impl HttpFileLoader {
    pub fn new() -> Result<Self, ReelprintError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("reelprint/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| ReelprintError::Transport(format!("HTTP client error: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl AssetLoader for HttpFileLoader {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>, ReelprintError> {
        if location.starts_with("http://") || location.starts_with("https://") {
            let response = self
                .client
                .get(location)
                .send()
                .await
                .map_err(|e| {
                    ReelprintError::Asset(format!("Failed to download {}: {}", location, e))
                })?;
            if !response.status().is_success() {
                return Err(ReelprintError::Asset(format!(
                    "Failed to download {}: HTTP {}",
                    location,
                    response.status()
                )));
            }
            let bytes = response
                .bytes()
                .await
                .map_err(|e| ReelprintError::Asset(format!("Failed to read {}: {}", location, e)))?;
            Ok(bytes.to_vec())
        } else {
            tokio::fs::read(location)
                .await
                .map_err(|e| ReelprintError::Asset(format!("{}: {}", location, e)))
        }
    }
}

/// Fetch and decode the mill's assets.
///
/// Both loads happen here, in sequence, so generation has a single
/// suspension point. Failures are logged and leave the slot empty.
pub async fn load_assets(loader: &dyn AssetLoader, mill: &MillProfile) -> Assets {
    Assets {
        logo: load_one(loader, mill.logo.as_deref(), "logo").await,
        header: load_one(loader, mill.header_image.as_deref(), "header").await,
    }
}

async fn load_one(
    loader: &dyn AssetLoader,
    location: Option<&str>,
    name: &str,
) -> Option<Arc<DynamicImage>> {
    let location = location.filter(|l| !l.trim().is_empty())?;
    let bytes = match loader.fetch(location).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(asset = name, error = %e, "asset unavailable, header left blank");
            return None;
        }
    };
    match image::load_from_memory(&bytes) {
        Ok(img) => {
            tracing::debug!(
                asset = name,
                width = img.width(),
                height = img.height(),
                "asset loaded"
            );
            Some(Arc::new(img))
        }
        Err(e) => {
            tracing::warn!(
                asset = name,
                error = %e,
                "asset could not be decoded, header left blank"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Serves assets from memory.
    struct MemoryLoader(HashMap<String, Vec<u8>>);

    #[async_trait]
    impl AssetLoader for MemoryLoader {
        async fn fetch(&self, location: &str) -> Result<Vec<u8>, ReelprintError> {
            self.0
                .get(location)
                .cloned()
                .ok_or_else(|| ReelprintError::Asset(format!("not found: {}", location)))
        }
    }

    fn png(w: u32, h: u32) -> Vec<u8> {
        let img = image::GrayImage::from_pixel(w, h, image::Luma([0]));
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[tokio::test]
    async fn test_loads_available_assets() {
        let loader = MemoryLoader(HashMap::from([("logo.png".to_string(), png(4, 4))]));
        let mill = MillProfile {
            logo: Some("logo.png".into()),
            header_image: Some("missing.png".into()),
            ..MillProfile::default()
        };
        let assets = load_assets(&loader, &mill).await;
        assert_eq!(assets.logo.as_ref().map(|i| i.width()), Some(4));
        assert!(assets.header.is_none());
    }

    #[tokio::test]
    async fn test_undecodable_asset_is_dropped() {
        let loader = MemoryLoader(HashMap::from([("logo.png".to_string(), b"not a png".to_vec())]));
        let mill = MillProfile {
            logo: Some("logo.png".into()),
            ..MillProfile::default()
        };
        assert!(load_assets(&loader, &mill).await.logo.is_none());
    }

    #[tokio::test]
    async fn test_missing_file_is_not_fatal() {
        let loader = HttpFileLoader::new().unwrap();
        let mill = MillProfile {
            logo: Some("/nonexistent/logo.png".into()),
            ..MillProfile::default()
        };
        assert!(load_assets(&loader, &mill).await.logo.is_none());
    }
}

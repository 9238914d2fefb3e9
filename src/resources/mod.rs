//! Loading of external assets: matcap textures and typeface fonts.
//!
//! Natively assets are read from a directory on disk (`./assets` unless
//! configured otherwise). On the web they are fetched relative to the page
//! origin, below the same directory name.

use anyhow::Context;
use futures::future::try_join_all;

use crate::resources::font::Font;

pub mod font;

#[derive(Clone, Debug)]
pub struct AssetProvider {
    root: String,
}

impl Default for AssetProvider {
    fn default() -> Self {
        Self::new("assets")
    }
}

impl AssetProvider {
    pub fn new(root: impl Into<String>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    #[cfg(target_arch = "wasm32")]
    fn format_url(&self, file_name: &str) -> anyhow::Result<reqwest::Url> {
        let window = web_sys::window().context("no browser window")?;
        let origin = window
            .location()
            .origin()
            .map_err(|e| anyhow::anyhow!("failed to read the page origin: {e:?}"))?;
        let base = reqwest::Url::parse(&format!("{}/{}/", origin, self.root.trim_matches('/')))?;
        Ok(base.join(file_name)?)
    }

    pub async fn load_string(&self, file_name: &str) -> anyhow::Result<String> {
        #[cfg(target_arch = "wasm32")]
        let txt = {
            let url = self.format_url(file_name)?;
            reqwest::get(url).await?.error_for_status()?.text().await?
        };
        #[cfg(not(target_arch = "wasm32"))]
        let txt = {
            let path = std::path::Path::new(&self.root).join(file_name);
            tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?
        };

        Ok(txt)
    }

    pub async fn load_binary(&self, file_name: &str) -> anyhow::Result<Vec<u8>> {
        #[cfg(target_arch = "wasm32")]
        let data = {
            let url = self.format_url(file_name)?;
            reqwest::get(url).await?.error_for_status()?.bytes().await?.to_vec()
        };
        #[cfg(not(target_arch = "wasm32"))]
        let data = {
            let path = std::path::Path::new(&self.root).join(file_name);
            tokio::fs::read(&path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?
        };

        Ok(data)
    }

    pub async fn load_font(&self, file_name: &str) -> anyhow::Result<Font> {
        let json = self.load_string(file_name).await?;
        let font = Font::from_json(&json).with_context(|| format!("failed to parse font {file_name}"))?;
        log::info!("loaded font {:?} from {file_name}", font.family_name());
        Ok(font)
    }

    pub async fn load_matcap(&self, file_name: &str) -> anyhow::Result<image::RgbaImage> {
        let bytes = self.load_binary(file_name).await?;
        let image = image::load_from_memory(&bytes)
            .with_context(|| format!("failed to decode matcap {file_name}"))?;
        Ok(image.to_rgba8())
    }

    /// Loads all matcaps concurrently, keeping the order of `file_names`.
    pub async fn load_matcaps(&self, file_names: &[String]) -> anyhow::Result<Vec<image::RgbaImage>> {
        try_join_all(file_names.iter().map(|name| self.load_matcap(name))).await
    }
}

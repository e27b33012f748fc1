//! TOML request manifests for `refstack build`.
//!
//! ```toml
//! generation_id = "demo"          # optional
//!
//! [aspect_ratio]
//! width = 1024
//! height = 1280
//! description = "4:5 portrait"
//!
//! [[selfies]]
//! path = "selfies/front.jpg"
//! type = "front_view"
//!
//! [[selfies]]
//! path = "selfies/extra.jpg"      # untagged
//!
//! [style.branding]
//! logo_key = "logos/acme.png"
//! mode = "clothing"
//!
//! [style.background]
//! type = "custom"
//! key = "backdrops/office.jpg"
//! ```

use anyhow::{Context, Result};
use refstack_core::{AspectRatio, StyleSettings};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub generation_id: Option<String>,
    pub aspect_ratio: AspectRatio,
    #[serde(default)]
    pub selfies: Vec<SelfieEntry>,
    #[serde(default)]
    pub style: StyleSettings,
}

/// One selfie file. The path doubles as the selfie identifier.
#[derive(Debug, Clone, Deserialize)]
pub struct SelfieEntry {
    pub path: String,
    #[serde(default, rename = "type")]
    pub selfie_type: Option<String>,
}

impl Manifest {
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid request manifest")
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read manifest {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("in {}", path.display()))
    }

    pub fn selfie_ids(&self) -> Vec<String> {
        self.selfies.iter().map(|s| s.path.clone()).collect()
    }

    pub fn selfie_types(&self) -> HashMap<String, String> {
        self.selfies
            .iter()
            .filter_map(|s| Some((s.path.clone(), s.selfie_type.clone()?)))
            .collect()
    }
}

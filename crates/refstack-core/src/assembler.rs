//! Builds the ordered reference-image set for one generation request.
//!
//! Output order is fixed and relied on by the prompt builder:
//!
//! 1. FACE REFERENCE composite, if any selfie has a face-angle tag
//! 2. BODY REFERENCE composite, if any selfie has a body-angle tag
//! 3. SUBJECT composite over every selfie, only when neither 1 nor 2 exists
//! 4. logo, when branding asks for one and it can be fetched
//! 5. custom background, when configured and it can be fetched
//! 6. the format guide, always last
//!
//! Selfies are mandatory: an empty list, a failed fetch or an undecodable
//! selfie aborts the whole build. Logo and background are optional and
//! degrade to "no reference" with a warning.

use crate::classify::classify;
use crate::debug::{artifact_name, DebugSink, NoopSink};
use crate::encode::{base64_asset_to_png, encode_png};
use crate::format;
use crate::label::{LabelRenderer, LabelStyle};
use crate::layout::{self, CompositeItem};
use crate::normalize::{ImageNormalizer, NormalizeError};
use crate::svg::RenderError;
use crate::types::{AspectRatio, BackgroundKind, LogoMode, ReferenceImage, StyleSettings};
use std::collections::HashMap;
use std::future::Future;
use thiserror::Error;

/// Error type returned by caller-supplied fetchers.
pub type FetchError = Box<dyn std::error::Error + Send + Sync>;

/// Retrieves raw selfie bytes from storage.
pub trait SelfieSource {
    fn fetch_selfie(&self, id: &str) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send;
}

/// Retrieves optional assets (logo, background) as base64.
///
/// `Ok(None)` means the asset does not exist.
pub trait AssetSource {
    fn fetch_asset(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<String>, FetchError>> + Send;
}

#[derive(Error, Debug)]
pub enum AssemblyError {
    #[error("at least one selfie is required")]
    MissingSelfies,
    #[error("failed to fetch selfie {id}: {source}")]
    SelfieFetch {
        id: String,
        #[source]
        source: FetchError,
    },
    #[error("selfie {id}: {source}")]
    Normalize {
        id: String,
        #[source]
        source: NormalizeError,
    },
    #[error("render failed: {0}")]
    Render(#[from] RenderError),
    #[error("png encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// Inputs for one reference build.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceRequest<'a> {
    /// Used only to name debug artifacts. Characters that are not safe in
    /// a file name are replaced.
    pub generation_id: &'a str,
    pub style: &'a StyleSettings,
    pub selfie_ids: &'a [String],
    /// Selfie identifier → angle tag (`front_view`, `full_body`, ...).
    pub selfie_types: &'a HashMap<String, String>,
    pub aspect_ratio: &'a AspectRatio,
}

/// The three selfie composites the assembler can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CompositeKind {
    Face,
    Body,
    Subject,
}

impl CompositeKind {
    fn title(self) -> &'static str {
        match self {
            Self::Face => "FACE REFERENCE",
            Self::Body => "BODY REFERENCE",
            Self::Subject => "SUBJECT",
        }
    }

    fn label_prefix(self) -> &'static str {
        match self {
            Self::Face => "FACE-SELFIE",
            Self::Body => "BODY-SELFIE",
            Self::Subject => "SELFIE",
        }
    }

    fn slug(self) -> &'static str {
        match self {
            Self::Face => "face",
            Self::Body => "body",
            Self::Subject => "subject",
        }
    }

    fn description(self, count: usize) -> String {
        match self {
            Self::Face => format!(
                "FACE REFERENCE: {count} close-up selfie(s) of the subject (front and side angles), \
                 labeled FACE-SELFIE1..{count}. Use them for facial identity: face shape, eyes, \
                 nose, mouth, skin tone, hairline and hair. The generated face must match exactly."
            ),
            Self::Body => format!(
                "BODY REFERENCE: {count} selfie(s) showing the subject's body (partial and full), \
                 labeled BODY-SELFIE1..{count}. Use them for body proportions, build, height \
                 and posture. Do not copy clothing or background from these photos."
            ),
            Self::Subject => format!(
                "SUBJECT: {count} selfie(s) of the same person, labeled SELFIE1..{count}. \
                 Use them together to reproduce the subject's facial features and body \
                 proportions faithfully. Do not copy clothing or background from these photos."
            ),
        }
    }
}

const BACKGROUND_DESCRIPTION: &str = "BACKGROUND: the backdrop to place behind the subject. \
     Reproduce this scene as the environment of the photo, with natural depth of field \
     and lighting consistent with it. Do not place any people from it in the result.";

const FORMAT_DESCRIPTION_PREFIX: &str = "FORMAT: transparent guide at the exact output size. \
     Compose the final image to fill this frame edge to edge; the guide itself must not \
     appear in the result.";

/// Builds reference images from selfies, optional brand assets and the
/// target aspect ratio.
pub struct ReferenceAssembler {
    normalizer: ImageNormalizer,
    labels: LabelRenderer,
    debug: Box<dyn DebugSink>,
}

impl ReferenceAssembler {
    /// Assembler with default normalization, system fonts and no debug output.
    pub fn new() -> Self {
        Self {
            normalizer: ImageNormalizer::default(),
            labels: LabelRenderer::new(),
            debug: Box::new(NoopSink),
        }
    }

    pub fn with_normalizer(mut self, normalizer: ImageNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn with_label_renderer(mut self, labels: LabelRenderer) -> Self {
        self.labels = labels;
        self
    }

    pub fn with_debug_sink<D>(mut self, sink: D) -> Self
    where
        D: DebugSink + 'static,
    {
        self.debug = Box::new(sink);
        self
    }

    /// Build the ordered reference list for one request.
    pub async fn build_references<S, A>(
        &self,
        request: &ReferenceRequest<'_>,
        selfies: &S,
        assets: &A,
    ) -> Result<Vec<ReferenceImage>, AssemblyError>
    where
        S: SelfieSource + Sync,
        A: AssetSource + Sync,
    {
        if request.selfie_ids.is_empty() {
            return Err(AssemblyError::MissingSelfies);
        }

        let groups = classify(request.selfie_ids, request.selfie_types);
        let mut references = Vec::new();

        if !groups.face.is_empty() {
            references.push(
                self.selfie_composite(CompositeKind::Face, &groups.face, request, selfies)
                    .await?,
            );
        }
        if !groups.body.is_empty() {
            references.push(
                self.selfie_composite(CompositeKind::Body, &groups.body, request, selfies)
                    .await?,
            );
        }
        if groups.has_split_groups() {
            if !groups.unclassified.is_empty() {
                tracing::debug!(
                    count = groups.unclassified.len(),
                    "untagged selfies left out of split composites"
                );
            }
        } else {
            references.push(
                self.selfie_composite(CompositeKind::Subject, &groups.unclassified, request, selfies)
                    .await?,
            );
        }

        if let Some(logo) = self.logo_reference(request.style, assets).await {
            references.push(logo);
        }
        if let Some(background) = self.background_reference(request.style, assets).await {
            references.push(background);
        }

        references.push(self.format_reference(request.aspect_ratio, request.generation_id)?);

        tracing::info!(
            generation_id = request.generation_id,
            references = references.len(),
            "reference images built"
        );
        Ok(references)
    }

    async fn selfie_composite<S>(
        &self,
        kind: CompositeKind,
        ids: &[String],
        request: &ReferenceRequest<'_>,
        selfies: &S,
    ) -> Result<ReferenceImage, AssemblyError>
    where
        S: SelfieSource + Sync,
    {
        let title = self.labels.render(kind.title(), &LabelStyle::title())?;
        let item_style = LabelStyle::item();

        let mut items = Vec::with_capacity(ids.len());
        for (index, id) in ids.iter().enumerate() {
            let bytes = selfies
                .fetch_selfie(id)
                .await
                .map_err(|source| AssemblyError::SelfieFetch {
                    id: id.clone(),
                    source,
                })?;
            let normalized =
                self.normalizer
                    .normalize(&bytes)
                    .map_err(|source| AssemblyError::Normalize {
                        id: id.clone(),
                        source,
                    })?;
            let label = self
                .labels
                .render(&format!("{}{}", kind.label_prefix(), index + 1), &item_style)?;
            items.push(CompositeItem {
                image: normalized.into_pixels(),
                label,
            });
        }

        let composite = layout::build_composite(&title, &items);
        let png = encode_png(&composite)?;
        self.debug.try_save(
            &png,
            &artifact_name(kind.slug(), request.generation_id),
        );

        tracing::info!(
            kind = kind.slug(),
            items = items.len(),
            width = composite.width(),
            height = composite.height(),
            "selfie composite built"
        );
        Ok(ReferenceImage::png(&png, kind.description(items.len())))
    }

    async fn logo_reference<A>(&self, style: &StyleSettings, assets: &A) -> Option<ReferenceImage>
    where
        A: AssetSource + Sync,
    {
        let branding = style.branding.as_ref()?;
        if branding.mode == LogoMode::Exclude {
            tracing::debug!("logo excluded by branding mode");
            return None;
        }
        let key = branding.logo_key.as_deref()?;
        let png = fetch_optional_png(assets, key, "logo").await?;
        Some(ReferenceImage::png(
            &png,
            branding.mode.reference_description(),
        ))
    }

    async fn background_reference<A>(
        &self,
        style: &StyleSettings,
        assets: &A,
    ) -> Option<ReferenceImage>
    where
        A: AssetSource + Sync,
    {
        let background = style.background.as_ref()?;
        if background.kind != BackgroundKind::Custom {
            return None;
        }
        let Some(key) = background.key.as_deref() else {
            tracing::warn!("custom background configured without a key; omitting reference");
            return None;
        };
        let png = fetch_optional_png(assets, key, "background").await?;
        Some(ReferenceImage::png(&png, BACKGROUND_DESCRIPTION))
    }

    fn format_reference(
        &self,
        aspect: &AspectRatio,
        generation_id: &str,
    ) -> Result<ReferenceImage, AssemblyError> {
        let guide = format::render_guide(self.labels.rasterizer(), aspect)?;
        let png = encode_png(&guide)?;
        self.debug
            .try_save(&png, &artifact_name("format", generation_id));
        let description = format!(
            "{FORMAT_DESCRIPTION_PREFIX} Required aspect ratio: {} ({}x{} pixels).",
            aspect.description, aspect.width, aspect.height
        );
        Ok(ReferenceImage::png(&png, description))
    }
}

impl Default for ReferenceAssembler {
    fn default() -> Self {
        Self::new()
    }
}

/// Fetch and transcode an optional asset. Every failure is logged and
/// mapped to `None`.
async fn fetch_optional_png<A>(assets: &A, key: &str, kind: &'static str) -> Option<Vec<u8>>
where
    A: AssetSource + Sync,
{
    let payload = match assets.fetch_asset(key).await {
        Ok(Some(payload)) => payload,
        Ok(None) => {
            tracing::warn!(kind, key, "asset not found; omitting reference");
            return None;
        }
        Err(err) => {
            tracing::warn!(kind, key, error = %err, "asset fetch failed; omitting reference");
            return None;
        }
    };
    match base64_asset_to_png(&payload) {
        Ok(png) => Some(png),
        Err(err) => {
            tracing::warn!(kind, key, error = %err, "asset is not a usable image; omitting reference");
            None
        }
    }
}

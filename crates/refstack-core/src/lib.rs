//! refstack-core — Reference-image composition for AI headshot generation.
//!
//! Turns raw selfies, an optional logo and an optional custom backdrop into
//! the ordered, labeled PNG references an image model receives alongside
//! its prompt. Selfies are orientation-corrected and downsampled, grouped
//! by camera angle and stacked into titled composites; a transparent
//! framing guide encodes the target aspect ratio.

pub mod assembler;
pub mod classify;
pub mod debug;
pub mod encode;
pub mod format;
pub mod label;
pub mod layout;
pub mod normalize;
pub mod svg;
pub mod types;

pub use assembler::{
    AssemblyError, AssetSource, FetchError, ReferenceAssembler, ReferenceRequest, SelfieSource,
};
pub use classify::{classify, SelfieGroups};
pub use debug::{DebugSink, NoopSink, ScratchDir};
pub use label::{LabelRenderer, LabelStyle};
pub use normalize::{ImageNormalizer, NormalizeError, NormalizedImage, Orientation};
pub use svg::{RenderError, SvgRasterizer};
pub use types::{
    AspectRatio, Background, BackgroundKind, Branding, Dimensions, LogoMode, ReferenceImage,
    SelfieType, StyleSettings,
};

use base64::prelude::{Engine as _, BASE64_STANDARD};
use serde::{Deserialize, Serialize};

/// MIME type of every payload this crate produces.
pub const PNG_MIME_TYPE: &str = "image/png";

/// One visual input handed to the image-generation request builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceImage {
    pub mime_type: String,
    /// Standard-alphabet, padded base64 of the PNG bytes.
    pub base64: String,
    /// Instruction for the generator describing what this image represents.
    pub description: String,
}

impl ReferenceImage {
    /// Wrap already-encoded PNG bytes.
    pub fn png(bytes: &[u8], description: impl Into<String>) -> Self {
        Self {
            mime_type: PNG_MIME_TYPE.to_string(),
            base64: BASE64_STANDARD.encode(bytes),
            description: description.into(),
        }
    }

    /// Decode the payload back into PNG bytes.
    pub fn decode_payload(&self) -> Result<Vec<u8>, base64::DecodeError> {
        BASE64_STANDARD.decode(&self.base64)
    }
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Camera angle a selfie was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelfieType {
    FrontView,
    SideView,
    PartialBody,
    FullBody,
}

impl SelfieType {
    /// Parse a caller-supplied tag. Unknown tags are unclassified (`None`).
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim() {
            "front_view" => Some(Self::FrontView),
            "side_view" => Some(Self::SideView),
            "partial_body" => Some(Self::PartialBody),
            "full_body" => Some(Self::FullBody),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::FrontView => "front_view",
            Self::SideView => "side_view",
            Self::PartialBody => "partial_body",
            Self::FullBody => "full_body",
        }
    }

    pub fn is_face(self) -> bool {
        matches!(self, Self::FrontView | Self::SideView)
    }

    pub fn is_body(self) -> bool {
        matches!(self, Self::PartialBody | Self::FullBody)
    }
}

/// Per-request style configuration relevant to reference building.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleSettings {
    pub branding: Option<Branding>,
    pub background: Option<Background>,
}

/// Logo placement requested by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branding {
    /// Storage key of the uploaded logo.
    #[serde(default)]
    pub logo_key: Option<String>,
    #[serde(default)]
    pub mode: LogoMode,
}

/// How the logo is applied to the generated photo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogoMode {
    /// No logo at all, even if a key is present.
    Exclude,
    /// Printed or embroidered on the subject's clothing.
    Clothing,
    /// Shown on the backdrop behind the subject.
    Background,
    /// Placed as a standalone element in the scene.
    #[default]
    Element,
}

impl LogoMode {
    pub(crate) fn reference_description(self) -> &'static str {
        match self {
            Self::Exclude => "",
            Self::Clothing => {
                "BRAND ASSET: the company logo. Apply it to the subject's clothing \
                 (chest or lapel area) as a printed or embroidered mark. Reproduce \
                 its shapes and colors faithfully; do not invent text."
            }
            Self::Background => {
                "BRAND ASSET: the company logo. Place it on the backdrop behind the \
                 subject, as signage or a wall mark, partially out of focus. Reproduce \
                 its shapes and colors faithfully; do not invent text."
            }
            Self::Element => {
                "BRAND ASSET: the company logo. Include it as a distinct element in \
                 the scene without covering the subject's face. Reproduce its shapes \
                 and colors faithfully; do not invent text."
            }
        }
    }
}

/// Backdrop requested by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Background {
    #[serde(rename = "type", alias = "kind")]
    pub kind: BackgroundKind,
    /// Storage key of the uploaded backdrop, used when `kind` is `custom`.
    #[serde(default)]
    pub key: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundKind {
    Custom,
    Neutral,
    Gradient,
    Office,
    Studio,
}

/// Target output geometry of the generated image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AspectRatio {
    pub width: u32,
    pub height: u32,
    /// Human-readable descriptor such as `"1:1"` or `"4:5 portrait"`.
    pub description: String,
}

impl AspectRatio {
    pub fn new(width: u32, height: u32, description: impl Into<String>) -> Self {
        Self {
            width,
            height,
            description: description.into(),
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }
}

// Prompt configuration models
// The user-editable request that drives prompt optimization and generation

use serde::{Deserialize, Serialize};

/// Reduce a label to lowercase alphanumerics so "Dark & Moody", "dark-moody"
/// and "DARK MOODY" all compare equal.
fn normalize(label: &str) -> String {
    label
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Kind of media produced at the end of the workflow
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum MediaType {
    #[default]
    Image,
    Video,
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaType::Image => write!(f, "IMAGE"),
            MediaType::Video => write!(f, "VIDEO"),
        }
    }
}

impl MediaType {
    /// File extension used when the asset is downloaded
    pub fn extension(&self) -> &'static str {
        match self {
            MediaType::Image => "png",
            MediaType::Video => "mp4",
        }
    }

    /// Human readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            MediaType::Image => "Image",
            MediaType::Video => "Video",
        }
    }

    pub fn from_label(s: &str) -> Option<Self> {
        match normalize(s).as_str() {
            "image" | "img" | "photo" => Some(MediaType::Image),
            "video" | "vid" => Some(MediaType::Video),
            _ => None,
        }
    }
}

/// Visual style injected into the optimization instruction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum VisualStyle {
    #[default]
    #[serde(rename = "Cinematic 8K")]
    Cinematic8k,
    #[serde(rename = "Cyberpunk Anime")]
    CyberpunkAnime,
    #[serde(rename = "Hyper-Realistic")]
    HyperRealistic,
    #[serde(rename = "Surrealism Art")]
    SurrealismArt,
    #[serde(rename = "3D Pixar Style")]
    PixarStyle3d,
    #[serde(rename = "Epic Oil Painting")]
    EpicOilPainting,
}

impl VisualStyle {
    pub const ALL: [VisualStyle; 6] = [
        VisualStyle::Cinematic8k,
        VisualStyle::CyberpunkAnime,
        VisualStyle::HyperRealistic,
        VisualStyle::SurrealismArt,
        VisualStyle::PixarStyle3d,
        VisualStyle::EpicOilPainting,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            VisualStyle::Cinematic8k => "Cinematic 8K",
            VisualStyle::CyberpunkAnime => "Cyberpunk Anime",
            VisualStyle::HyperRealistic => "Hyper-Realistic",
            VisualStyle::SurrealismArt => "Surrealism Art",
            VisualStyle::PixarStyle3d => "3D Pixar Style",
            VisualStyle::EpicOilPainting => "Epic Oil Painting",
        }
    }

    pub fn from_label(s: &str) -> Option<Self> {
        let wanted = normalize(s);
        Self::ALL.into_iter().find(|v| normalize(v.label()) == wanted)
    }
}

impl std::fmt::Display for VisualStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Lighting families; natural lighting gets extra phrasing in the instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightingGroup {
    Natural,
    Stylized,
}

impl LightingGroup {
    pub fn display_name(&self) -> &'static str {
        match self {
            LightingGroup::Natural => "Natural",
            LightingGroup::Stylized => "Stylized",
        }
    }
}

/// Lighting mode selected by the user
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Lighting {
    #[default]
    #[serde(rename = "Natural Sunlight")]
    NaturalSunlight,
    #[serde(rename = "Soft Daylighting")]
    SoftDaylighting,
    #[serde(rename = "Golden Magic Hour")]
    GoldenMagicHour,
    #[serde(rename = "Cloudy Overcast")]
    CloudyOvercast,
    #[serde(rename = "Morning Window Light")]
    MorningWindowLight,
    #[serde(rename = "Dramatic Neon")]
    DramaticNeon,
    #[serde(rename = "Soft Volumetric")]
    SoftVolumetric,
    #[serde(rename = "Dark & Moody")]
    DarkAndMoody,
    #[serde(rename = "Bright Studio")]
    BrightStudio,
    #[serde(rename = "Moonlight Ether")]
    MoonlightEther,
}

impl Lighting {
    pub const ALL: [Lighting; 10] = [
        Lighting::NaturalSunlight,
        Lighting::SoftDaylighting,
        Lighting::GoldenMagicHour,
        Lighting::CloudyOvercast,
        Lighting::MorningWindowLight,
        Lighting::DramaticNeon,
        Lighting::SoftVolumetric,
        Lighting::DarkAndMoody,
        Lighting::BrightStudio,
        Lighting::MoonlightEther,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Lighting::NaturalSunlight => "Natural Sunlight",
            Lighting::SoftDaylighting => "Soft Daylighting",
            Lighting::GoldenMagicHour => "Golden Magic Hour",
            Lighting::CloudyOvercast => "Cloudy Overcast",
            Lighting::MorningWindowLight => "Morning Window Light",
            Lighting::DramaticNeon => "Dramatic Neon",
            Lighting::SoftVolumetric => "Soft Volumetric",
            Lighting::DarkAndMoody => "Dark & Moody",
            Lighting::BrightStudio => "Bright Studio",
            Lighting::MoonlightEther => "Moonlight Ether",
        }
    }

    pub fn group(&self) -> LightingGroup {
        match self {
            Lighting::NaturalSunlight
            | Lighting::SoftDaylighting
            | Lighting::GoldenMagicHour
            | Lighting::CloudyOvercast
            | Lighting::MorningWindowLight => LightingGroup::Natural,
            _ => LightingGroup::Stylized,
        }
    }

    pub fn is_natural(&self) -> bool {
        self.group() == LightingGroup::Natural
    }

    pub fn from_label(s: &str) -> Option<Self> {
        let wanted = normalize(s);
        Self::ALL.into_iter().find(|v| normalize(v.label()) == wanted)
    }
}

impl std::fmt::Display for Lighting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Output aspect ratio
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "16:9")]
    Landscape16x9,
    #[serde(rename = "9:16")]
    Portrait9x16,
    #[serde(rename = "1:1")]
    Square1x1,
    #[serde(rename = "4:3")]
    Classic4x3,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 4] = [
        AspectRatio::Landscape16x9,
        AspectRatio::Portrait9x16,
        AspectRatio::Square1x1,
        AspectRatio::Classic4x3,
    ];

    /// Wire value understood by the generation endpoints
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Landscape16x9 => "16:9",
            AspectRatio::Portrait9x16 => "9:16",
            AspectRatio::Square1x1 => "1:1",
            AspectRatio::Classic4x3 => "4:3",
        }
    }

    /// Short hint shown next to the ratio
    pub fn hint(&self) -> &'static str {
        match self {
            AspectRatio::Landscape16x9 => "Cinema",
            AspectRatio::Portrait9x16 => "TikTok",
            AspectRatio::Square1x1 => "Square",
            AspectRatio::Classic4x3 => "Classic",
        }
    }

    pub fn from_label(s: &str) -> Option<Self> {
        let wanted = normalize(s);
        Self::ALL
            .into_iter()
            .find(|v| normalize(v.as_str()) == wanted || normalize(v.hint()) == wanted)
    }
}

impl std::fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User-editable generation request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PromptConfig {
    /// Free-text description of the desired content
    pub concept: String,
    pub style: VisualStyle,
    pub lighting: Lighting,
    pub aspect_ratio: AspectRatio,
    pub media_type: MediaType,
}

impl PromptConfig {
    /// Whether the concept contains anything besides whitespace
    pub fn has_concept(&self) -> bool {
        !self.concept.trim().is_empty()
    }
}

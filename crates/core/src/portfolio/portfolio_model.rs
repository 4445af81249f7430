//! Portfolio documents as they are stored in every tier.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: String,
    pub url: String,
    pub thumbnail: String,
    pub alt: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Continent {
    Asia,
    Europe,
}

impl Continent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asia => "asia",
            Self::Europe => "europe",
        }
    }
}

/// Location used for map highlights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoInfo {
    pub continent: Continent,
    pub country: String,
    pub country_code: String,
    pub city: String,
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoCollection {
    pub id: String,
    pub title: String,
    pub location: String,
    pub year: i32,
    pub description: String,
    pub cover_image: String,
    /// Separate crop used on the home page cards.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_cover_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hover_location: Option<String>,
    #[serde(default)]
    pub photos: Vec<Photo>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo: Option<GeoInfo>,
    /// Manual display position set from the admin panel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Philosophy {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skills {
    pub photography: Vec<String>,
    pub equipment: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub email: String,
    pub phone: String,
    pub instagram: String,
    pub weibo: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileStats {
    pub cities: u32,
    pub photos: String,
    pub experience: String,
}

/// Custom headings for the about page sections.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionLabels {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basic_info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AboutInfo {
    pub name: String,
    pub title: String,
    pub subtitle: String,
    pub location: String,
    pub avatar: String,
    #[serde(default)]
    pub bio: Vec<String>,
    #[serde(default)]
    pub philosophy: Vec<Philosophy>,
    #[serde(default)]
    pub skills: Skills,
    #[serde(default)]
    pub contact: Contact,
    #[serde(default)]
    pub stats: ProfileStats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_labels: Option<SectionLabels>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroImage {
    pub id: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile_url: Option<String>,
    pub title: String,
    pub location: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HeroTransition {
    #[default]
    Slide,
    Fade,
    Zoom,
    Kenburns,
    Blur,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IntroAnimation {
    #[default]
    FadeUp,
    FadeIn,
    Typewriter,
    SplitRise,
    BlurIn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CardAnimation {
    Flip,
    FadeUp,
    ScaleUp,
    SlideIn,
    TiltReveal,
    #[default]
    FloatFlip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageTransition {
    None,
    #[default]
    Fade,
    SlideUp,
    SlideLeft,
    ZoomFade,
    BlurFade,
    ScrollReveal,
}

/// Animation presets chosen in the admin playground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationConfig {
    pub hero_transition: HeroTransition,
    pub intro_animation: IntroAnimation,
    pub card_animation: CardAnimation,
    pub page_transition: PageTransition,
}

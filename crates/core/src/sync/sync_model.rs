//! Logical keys, document kinds and typed documents handled by the sync engine.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::errors::{Error, Result};
use crate::portfolio::{AboutInfo, AnimationConfig, GeoInfo, HeroImage, PhotoCollection};

/// Canonical storage keys, in the order startup processes them.
pub const PORTFOLIO_DATA_KEYS: [&str; 5] = [
    "photo_collections",
    "about_info",
    "lit_cities",
    "hero_images",
    "animation_config",
];

/// Independently synchronized documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataKey {
    PhotoCollections,
    AboutInfo,
    LitCities,
    HeroImages,
    AnimationConfig,
}

impl DataKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PhotoCollections => PORTFOLIO_DATA_KEYS[0],
            Self::AboutInfo => PORTFOLIO_DATA_KEYS[1],
            Self::LitCities => PORTFOLIO_DATA_KEYS[2],
            Self::HeroImages => PORTFOLIO_DATA_KEYS[3],
            Self::AnimationConfig => PORTFOLIO_DATA_KEYS[4],
        }
    }

    pub fn kind(&self) -> DocumentKind {
        match self {
            Self::PhotoCollections | Self::LitCities | Self::HeroImages => DocumentKind::Sequence,
            Self::AboutInfo | Self::AnimationConfig => DocumentKind::Record,
        }
    }
}

impl fmt::Display for DataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape of a document. The empty-remote conflict rule only applies to sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Sequence,
    Record,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyDescriptor {
    pub key: DataKey,
    pub kind: DocumentKind,
}

/// Keys in startup order.
pub fn load_order() -> Vec<KeyDescriptor> {
    [
        DataKey::PhotoCollections,
        DataKey::AboutInfo,
        DataKey::LitCities,
        DataKey::HeroImages,
        DataKey::AnimationConfig,
    ]
    .into_iter()
    .map(|key| KeyDescriptor {
        key,
        kind: key.kind(),
    })
    .collect()
}

/// A decoded value for one logical key.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    Collections(Vec<PhotoCollection>),
    AboutInfo(AboutInfo),
    LitCities(Vec<GeoInfo>),
    HeroImages(Vec<HeroImage>),
    AnimationConfig(AnimationConfig),
}

impl Document {
    /// Decodes a stored JSON value; a shape mismatch is reported as corrupt data.
    pub fn decode(key: DataKey, value: Value) -> Result<Self> {
        let corrupt = |err: serde_json::Error| Error::corrupt(key.as_str(), err.to_string());
        let document = match key {
            DataKey::PhotoCollections => {
                Self::Collections(serde_json::from_value(value).map_err(corrupt)?)
            }
            DataKey::AboutInfo => Self::AboutInfo(serde_json::from_value(value).map_err(corrupt)?),
            DataKey::LitCities => Self::LitCities(serde_json::from_value(value).map_err(corrupt)?),
            DataKey::HeroImages => Self::HeroImages(serde_json::from_value(value).map_err(corrupt)?),
            DataKey::AnimationConfig => {
                Self::AnimationConfig(serde_json::from_value(value).map_err(corrupt)?)
            }
        };
        Ok(document)
    }

    pub fn key(&self) -> DataKey {
        match self {
            Self::Collections(_) => DataKey::PhotoCollections,
            Self::AboutInfo(_) => DataKey::AboutInfo,
            Self::LitCities(_) => DataKey::LitCities,
            Self::HeroImages(_) => DataKey::HeroImages,
            Self::AnimationConfig(_) => DataKey::AnimationConfig,
        }
    }

    pub fn to_value(&self) -> Result<Value> {
        let value = match self {
            Self::Collections(v) => serde_json::to_value(v)?,
            Self::AboutInfo(v) => serde_json::to_value(v)?,
            Self::LitCities(v) => serde_json::to_value(v)?,
            Self::HeroImages(v) => serde_json::to_value(v)?,
            Self::AnimationConfig(v) => serde_json::to_value(v)?,
        };
        Ok(value)
    }

    /// Element count for sequence documents, `None` for records.
    pub fn sequence_len(&self) -> Option<usize> {
        match self {
            Self::Collections(v) => Some(v.len()),
            Self::LitCities(v) => Some(v.len()),
            Self::HeroImages(v) => Some(v.len()),
            Self::AboutInfo(_) | Self::AnimationConfig(_) => None,
        }
    }
}

/// Bundled first-run document. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedDocument {
    #[serde(default)]
    pub collections: Option<Vec<PhotoCollection>>,
    #[serde(default)]
    pub about_info: Option<AboutInfo>,
    #[serde(default)]
    pub lit_cities: Option<Vec<GeoInfo>>,
    #[serde(default)]
    pub hero_images: Option<Vec<HeroImage>>,
    #[serde(default)]
    pub animation_config: Option<AnimationConfig>,
}

impl SeedDocument {
    /// Present fields as documents, in load order.
    pub fn into_documents(self) -> Vec<Document> {
        let mut documents = Vec::new();
        if let Some(v) = self.collections {
            documents.push(Document::Collections(v));
        }
        if let Some(v) = self.about_info {
            documents.push(Document::AboutInfo(v));
        }
        if let Some(v) = self.lit_cities {
            documents.push(Document::LitCities(v));
        }
        if let Some(v) = self.hero_images {
            documents.push(Document::HeroImages(v));
        }
        if let Some(v) = self.animation_config {
            documents.push(Document::AnimationConfig(v));
        }
        documents
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn data_key_serialization_matches_storage_keys() {
        let actual = load_order()
            .iter()
            .map(|d| serde_json::to_string(&d.key).expect("serialize key"))
            .collect::<Vec<_>>();
        let expected = PORTFOLIO_DATA_KEYS
            .iter()
            .map(|k| format!("\"{}\"", k))
            .collect::<Vec<_>>();
        assert_eq!(actual, expected);

        for descriptor in load_order() {
            assert_eq!(descriptor.key.to_string(), descriptor.key.as_str());
        }
    }

    #[test]
    fn only_list_documents_are_sequences() {
        let kinds: Vec<_> = load_order().iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![
                DocumentKind::Sequence,
                DocumentKind::Record,
                DocumentKind::Sequence,
                DocumentKind::Sequence,
                DocumentKind::Record,
            ]
        );
    }

    #[test]
    fn decode_rejects_wrong_shape_as_corrupt() {
        let err = Document::decode(DataKey::LitCities, json!({"city": "Paris"}))
            .expect_err("object is not a list");
        match err {
            Error::CorruptData { key, .. } => assert_eq!(key, "lit_cities"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_sequence_decodes_and_reports_zero_length() {
        let doc = Document::decode(DataKey::HeroImages, json!([])).expect("decode");
        assert_eq!(doc.sequence_len(), Some(0));
        assert_eq!(doc.key(), DataKey::HeroImages);

        let config = serde_json::to_value(AnimationConfig::default()).expect("encode");
        let record = Document::decode(DataKey::AnimationConfig, config).expect("decode");
        assert_eq!(record.sequence_len(), None);
    }

    #[test]
    fn seed_document_yields_only_present_fields() {
        let seed: SeedDocument = serde_json::from_value(json!({
            "litCities": [],
            "animationConfig": {
                "heroTransition": "fade",
                "introAnimation": "fade-in",
                "cardAnimation": "flip",
                "pageTransition": "none"
            }
        }))
        .expect("decode seed");
        let keys: Vec<_> = seed.into_documents().iter().map(Document::key).collect();
        assert_eq!(keys, vec![DataKey::LitCities, DataKey::AnimationConfig]);
    }
}

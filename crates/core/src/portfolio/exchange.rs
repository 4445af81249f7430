//! Whole-portfolio export/import file used by the admin panel.
//!
//! The reconciliation engine never reads this format; importing simply calls
//! the regular update operations with already-typed values.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::portfolio_model::{AboutInfo, AnimationConfig, GeoInfo, HeroImage, PhotoCollection};
use crate::errors::{Error, Result};
use crate::sync::{PortfolioDataServiceTrait, PortfolioSnapshot};

pub const EXPORT_FILE_NAME: &str = "portfolio-data.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioExport {
    pub collections: Vec<PhotoCollection>,
    pub about_info: AboutInfo,
    pub lit_cities: Vec<GeoInfo>,
    pub hero_images: Vec<HeroImage>,
    pub animation_config: AnimationConfig,
}

impl PortfolioExport {
    pub fn from_snapshot(snapshot: &PortfolioSnapshot) -> Self {
        Self {
            collections: snapshot.collections.clone(),
            about_info: snapshot.about_info.clone(),
            lit_cities: snapshot.lit_cities.clone(),
            hero_images: snapshot.hero_images.clone(),
            animation_config: snapshot.animation_config,
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// A parsed import file. Collections and about info are mandatory.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioImport {
    pub collections: Vec<PhotoCollection>,
    pub about_info: AboutInfo,
    #[serde(default)]
    pub lit_cities: Option<Vec<GeoInfo>>,
    #[serde(default)]
    pub hero_images: Option<Vec<HeroImage>>,
    #[serde(default)]
    pub animation_config: Option<AnimationConfig>,
}

impl PortfolioImport {
    pub fn parse(contents: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(contents)
            .map_err(|e| Error::InvalidInput(format!("Import file is not valid JSON: {}", e)))?;
        let has = |field: &str| value.get(field).is_some_and(|v| !v.is_null());
        if !has("collections") || !has("aboutInfo") {
            return Err(Error::InvalidInput(
                "Import file is missing collections or aboutInfo".to_string(),
            ));
        }
        serde_json::from_value(value)
            .map_err(|e| Error::InvalidInput(format!("Import file has an invalid shape: {}", e)))
    }
}

/// Replaces the current portfolio with an imported one.
///
/// Every present field is written even if an earlier one fails; the first
/// failure is returned.
pub async fn apply_import(
    service: &dyn PortfolioDataServiceTrait,
    import: PortfolioImport,
) -> Result<()> {
    let collection_count = import.collections.len();
    let mut results = vec![
        service.update_collections(import.collections).await,
        service.update_about_info(import.about_info).await,
    ];
    if let Some(cities) = import.lit_cities {
        results.push(service.update_lit_cities(cities).await);
    }
    if let Some(images) = import.hero_images {
        results.push(service.update_hero_images(images).await);
    }
    if let Some(config) = import.animation_config {
        results.push(service.update_animation_config(config).await);
    }

    match results.into_iter().find_map(|r| r.err()) {
        Some(err) => {
            warn!("Import applied locally but failed to save remotely: {}", err);
            Err(err)
        }
        None => {
            info!("Imported {} collection(s)", collection_count);
            Ok(())
        }
    }
}

//! Catalog Models
//!
//! Decoded result types for catalog endpoints. Optional fields default when
//! absent so partial API payloads still decode.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A gallery or museum show.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Show {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "description")]
    pub show_description: Option<String>,
    #[serde(default)]
    pub press_release: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub start_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_at: Option<DateTime<Utc>>,
    pub partner: Partner,
    #[serde(default)]
    pub location: Option<Location>,
}

impl Show {
    /// Single-line address such as `"529 W 20th St, New York"`.
    pub fn location_one_liner(&self) -> Option<String> {
        self.location.as_ref().and_then(Location::one_liner)
    }

    /// Whether the show is open at the given instant.
    pub fn is_running_at(&self, now: DateTime<Utc>) -> bool {
        match (self.start_at, self.end_at) {
            (Some(start), Some(end)) => start <= now && now < end,
            _ => false,
        }
    }
}

/// The partner (gallery, institution) hosting a show.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partner {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Physical location of a show.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub address_2: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub coordinates: Option<GeoPoint>,
}

impl Location {
    fn one_liner(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.address, &self.address_2, &self.city]
            .into_iter()
            .filter_map(|p| p.as_deref())
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

/// Decoded latitude/longitude.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// An artwork shown in a show.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Artwork {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub medium: Option<String>,
    #[serde(default)]
    pub artist: Option<Artist>,
    #[serde(default)]
    pub images: Vec<Image>,
}

impl Artwork {
    /// The image flagged as default, falling back to the first one.
    pub fn default_image(&self) -> Option<&Image> {
        self.images
            .iter()
            .find(|i| i.is_default)
            .or_else(|| self.images.first())
    }
}

/// Artist attribution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// An installation shot or artwork image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id: String,
    /// URL template containing a `:version` placeholder.
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub image_versions: Vec<String>,
    #[serde(default)]
    pub aspect_ratio: Option<f64>,
    #[serde(default)]
    pub is_default: bool,
}

impl Image {
    /// Concrete URL for one of the advertised versions.
    pub fn url_for_version(&self, version: &str) -> Option<String> {
        if !self.image_versions.iter().any(|v| v == version) {
            return None;
        }
        self.image_url
            .as_ref()
            .map(|template| template.replace(":version", version))
    }
}

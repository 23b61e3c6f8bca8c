//! Venue point-of-interest catalog

use serde::{Deserialize, Serialize};

use crate::core::types::{Category, PointOfInterest};
use crate::validation::data::CatalogValidator;
use crate::validation::error::{Result, VenueMapError};
use crate::utils::config::ConfigError;

/// Ordered, read-only list of the venue's points of interest.
///
/// Iteration order is the order pins were declared in; proximity matching and
/// category centring both depend on it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PointOfInterest>", into = "Vec<PointOfInterest>")]
pub struct VenueCatalog {
    points: Vec<PointOfInterest>,
}

impl TryFrom<Vec<PointOfInterest>> for VenueCatalog {
    type Error = VenueMapError;

    fn try_from(points: Vec<PointOfInterest>) -> Result<Self> {
        Self::new(points)
    }
}

impl From<VenueCatalog> for Vec<PointOfInterest> {
    fn from(catalog: VenueCatalog) -> Self {
        catalog.points
    }
}

impl VenueCatalog {
    /// Build a catalog, rejecting duplicate ids and off-map pins
    pub fn new(points: Vec<PointOfInterest>) -> Result<Self> {
        CatalogValidator::validate(&points).map_err(|problems| {
            VenueMapError::Config(ConfigError::InvalidParameter {
                parameter: "catalog".to_string(),
                value: format!("{} points", points.len()),
                reason: problems.join("; "),
            })
        })?;
        Ok(Self { points })
    }

    /// Parse a JSON array of points of interest
    pub fn from_json_str(json: &str) -> Result<Self> {
        let points: Vec<PointOfInterest> = serde_json::from_str(json).map_err(|e| {
            VenueMapError::Config(ConfigError::Serialization {
                message: e.to_string(),
            })
        })?;
        Self::new(points)
    }

    /// Pins of the festival ground the map was first drawn for
    pub fn default_venue() -> Self {
        Self {
            points: vec![
                PointOfInterest::new(
                    "food",
                    20.0,
                    75.0,
                    Category::Food,
                    "Food 10 Zone",
                    "Kokoro Ramen, IKOI Tokyo, Kaori by Chiran, Izanagi, Katana, Matsuri, Japcul Foods",
                ),
                PointOfInterest::new(
                    "cafe",
                    88.0,
                    30.0,
                    Category::Cafe,
                    "Maid Cafe",
                    "Authentic Akihabara Experience & Cheki Photos",
                ),
                PointOfInterest::new(
                    "grass",
                    75.0,
                    20.0,
                    Category::Booth,
                    "Sponsor Zone",
                    "Toyota, Rakuten, Yakult, Nissin, JAL, Findy, Mercari",
                ),
                PointOfInterest::new(
                    "stage",
                    40.0,
                    50.0,
                    Category::Event,
                    "Main Stage",
                    "Live: Diana Garnet (Naruto Singer), Cosplay Championship",
                ),
                PointOfInterest::new(
                    "hall2",
                    85.0,
                    60.0,
                    Category::Workshop,
                    "Hall 2 Workshops",
                    "Tatami Crafting, Manga Workshop (Cosmics), Wacom, Pilot",
                ),
                PointOfInterest::new(
                    "merch",
                    25.0,
                    25.0,
                    Category::Shop,
                    "Merch Arch",
                    "Anime Creator, Rhino Cult, Orange Kiwi",
                ),
                PointOfInterest::new("entrance", 50.0, 95.0, Category::Info, "Entrance", "Gate 9 (Princess Golf)"),
            ],
        }
    }

    pub fn get(&self, id: &str) -> Option<&PointOfInterest> {
        self.points.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PointOfInterest> {
        self.points.iter()
    }

    pub fn points(&self) -> &[PointOfInterest] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points of one category, in catalog order
    pub fn in_category(&self, category: Category) -> impl Iterator<Item = &PointOfInterest> {
        self.points.iter().filter(move |p| p.category == category)
    }

    /// Where the map centres when a category chip is selected
    pub fn first_in_category(&self, category: Category) -> Option<&PointOfInterest> {
        self.in_category(category).next()
    }
}

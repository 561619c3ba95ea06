//! Trip package model and its hosted-table row shape.

use serde::{Deserialize, Serialize};

/// Currency assumed when a trip does not name one.
pub const DEFAULT_CURRENCY: &str = "INR";

/// One day of a trip itinerary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItineraryDay {
    pub day: u32,
    pub title: String,
    pub text: String,
}

/// A bookable trip package as the site and dashboard see it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub inclusions: Vec<String>,
    #[serde(default)]
    pub exclusions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub itinerary: Option<Vec<ItineraryDay>>,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub featured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

/// Row shape of the hosted `trips` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TripRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub highlights: Option<Vec<String>>,
    #[serde(default)]
    pub inclusions: Option<Vec<String>>,
    #[serde(default)]
    pub exclusions: Option<Vec<String>>,
    /// Always written, as `null` when cleared.
    #[serde(default)]
    pub itinerary: Option<Vec<ItineraryDay>>,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Some older rows carry the UI field name instead of `image_url`.
    #[serde(default, skip_serializing)]
    pub image: Option<String>,
    #[serde(default)]
    pub featured: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl TripRow {
    /// Build a write payload; the table assigns ids and creation stamps.
    pub fn for_write(trip: &Trip, updated_at: Option<String>) -> Self {
        let currency = if trip.currency.trim().is_empty() {
            DEFAULT_CURRENCY.to_string()
        } else {
            trip.currency.clone()
        };
        Self {
            id: None,
            title: trip.title.clone(),
            location: Some(trip.location.clone()),
            duration: Some(trip.duration.clone()),
            price: Some(trip.price),
            currency: Some(currency),
            description: Some(trip.description.clone()),
            highlights: Some(trip.highlights.clone()),
            inclusions: Some(trip.inclusions.clone()),
            exclusions: Some(trip.exclusions.clone()),
            itinerary: trip.itinerary.clone(),
            image_url: Some(trip.image.clone()),
            image: None,
            featured: Some(trip.featured),
            created_at: None,
            updated_at,
        }
    }
}

impl From<TripRow> for Trip {
    fn from(row: TripRow) -> Self {
        let image = row
            .image_url
            .filter(|url| !url.is_empty())
            .or(row.image)
            .unwrap_or_default();
        Trip {
            id: row.id.unwrap_or_default(),
            title: row.title,
            location: row.location.unwrap_or_default(),
            duration: row.duration.unwrap_or_default(),
            price: row.price.unwrap_or(0.0),
            currency: row.currency.unwrap_or_else(default_currency),
            description: row.description.unwrap_or_default(),
            highlights: row.highlights.unwrap_or_default(),
            inclusions: row.inclusions.unwrap_or_default(),
            exclusions: row.exclusions.unwrap_or_default(),
            itinerary: row.itinerary,
            image,
            featured: row.featured.unwrap_or(false),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Built-in sample trips shown when no real data exists.
pub fn default_trips() -> Vec<Trip> {
    vec![
        Trip {
            id: "lakshadweep-4d3n".to_string(),
            title: "Lakshadweep Trip".to_string(),
            location: "Lakshadweep Islands".to_string(),
            duration: "4 Days / 3 Nights".to_string(),
            price: 16000.0,
            currency: DEFAULT_CURRENCY.to_string(),
            description: "Lagoon stays with island hopping, calm waters, and guided experiences tailored for comfort.".to_string(),
            highlights: strings(&["Island hopping", "Lagoon cruise", "Family-friendly comfort"]),
            inclusions: strings(&[
                "Entry permit",
                "Police clearance certificate",
                "Accommodation and food",
                "Airport transfers",
                "Sightseeing",
                "Snorkeling",
                "Kayaking",
                "Glass boat ride",
                "Tour guide",
            ]),
            exclusions: strings(&["Flight ticket", "Scuba diving"]),
            itinerary: None,
            image: "assets/trip-lakshadweep.svg".to_string(),
            featured: true,
            created_at: None,
            updated_at: None,
        },
        Trip {
            id: "coorg-escape-3d2n".to_string(),
            title: "Coorg Coffee Escape".to_string(),
            location: "Coorg, Karnataka".to_string(),
            duration: "3 Days / 2 Nights".to_string(),
            price: 9800.0,
            currency: DEFAULT_CURRENCY.to_string(),
            description: "A calm hillside getaway with boutique stays, coffee trails, and plantation walks.".to_string(),
            highlights: strings(&["Plantation stay", "Waterfall visit", "Local cuisine"]),
            inclusions: strings(&["Stay with breakfast", "Local transfers", "Guided plantation tour"]),
            exclusions: strings(&["Personal expenses", "Adventure sports"]),
            itinerary: None,
            image: "assets/trip-coorg.svg".to_string(),
            featured: false,
            created_at: None,
            updated_at: None,
        },
        Trip {
            id: "rajasthan-heritage-5d4n".to_string(),
            title: "Rajasthan Heritage Trail".to_string(),
            location: "Jaipur, Jodhpur, Udaipur".to_string(),
            duration: "5 Days / 4 Nights".to_string(),
            price: 24800.0,
            currency: DEFAULT_CURRENCY.to_string(),
            description: "Fort tours, heritage hotels, and cultural evenings with a dedicated coordinator.".to_string(),
            highlights: strings(&["Fort visits", "Heritage stays", "Cultural evenings"]),
            inclusions: strings(&[
                "Hotel stay",
                "Daily breakfast",
                "Private transfers",
                "Guided sightseeing",
            ]),
            exclusions: strings(&["Flight or train tickets", "Meals not mentioned"]),
            itinerary: None,
            image: "assets/trip-rajasthan.svg".to_string(),
            featured: false,
            created_at: None,
            updated_at: None,
        },
    ]
}

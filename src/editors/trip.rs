//! Trip editor form.

use base64::Engine;
use serde::{Deserialize, Serialize};

use super::{coerce_number, split_list, BusyFlag};
use crate::errors::AppError;
use crate::gateway::{Bearer, Gateway};
use crate::models::{ImageUpload, ItineraryDay, Trip, DEFAULT_CURRENCY};
use crate::store::ClientStore;

/// Where the trip image comes from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "source", rename_all = "camelCase")]
pub enum ImageSource {
    /// A new file, base64 encoded. Data URLs are accepted.
    #[serde(rename_all = "camelCase")]
    Upload {
        file_name: String,
        #[serde(default = "default_content_type")]
        content_type: String,
        data: String,
    },
    /// A pasted URL.
    Url { url: String },
    /// An image already in the library.
    Library { url: String },
}

fn default_content_type() -> String {
    "application/octet-stream".to_string()
}

impl ImageSource {
    /// The file to upload, if this source needs one.
    pub fn decode_upload(&self) -> Result<Option<ImageUpload>, AppError> {
        let ImageSource::Upload {
            file_name,
            content_type,
            data,
        } = self
        else {
            return Ok(None);
        };

        let payload = match data.split_once(";base64,") {
            Some((_, encoded)) => encoded,
            None => data.as_str(),
        };
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| AppError::Validation(format!("Invalid image data: {}", e)))?;

        Ok(Some(ImageUpload {
            file_name: file_name.clone(),
            content_type: content_type.clone(),
            bytes,
        }))
    }
}

/// One itinerary sub-form row.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ItineraryRow {
    pub day: serde_json::Value,
    pub title: String,
    pub text: String,
}

/// Trip editor fields as submitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TripForm {
    /// Empty for a new trip.
    pub id: String,
    pub title: String,
    pub location: String,
    pub duration: String,
    pub price: serde_json::Value,
    pub currency: String,
    pub description: String,
    pub highlights: String,
    pub inclusions: String,
    pub exclusions: String,
    pub itinerary: Vec<ItineraryRow>,
    pub featured: bool,
    pub image: Option<ImageSource>,
}

impl TripForm {
    /// Prefill the form for editing an existing trip.
    pub fn from_trip(trip: &Trip) -> Self {
        Self {
            id: trip.id.clone(),
            title: trip.title.clone(),
            location: trip.location.clone(),
            duration: trip.duration.clone(),
            price: serde_json::json!(trip.price),
            currency: trip.currency.clone(),
            description: trip.description.clone(),
            highlights: trip.highlights.join("\n"),
            inclusions: trip.inclusions.join("\n"),
            exclusions: trip.exclusions.join("\n"),
            itinerary: trip
                .itinerary
                .iter()
                .flatten()
                .map(|day| ItineraryRow {
                    day: serde_json::json!(day.day),
                    title: day.title.clone(),
                    text: day.text.clone(),
                })
                .collect(),
            featured: trip.featured,
            image: (!trip.image.is_empty()).then(|| ImageSource::Url {
                url: trip.image.clone(),
            }),
        }
    }

    /// Itinerary rows with blanks dropped. Missing day numbers follow row order.
    pub fn itinerary_days(&self) -> Option<Vec<ItineraryDay>> {
        let days: Vec<ItineraryDay> = self
            .itinerary
            .iter()
            .enumerate()
            .filter(|(_, row)| !row.title.trim().is_empty() || !row.text.trim().is_empty())
            .map(|(index, row)| {
                let day = coerce_number(&row.day);
                ItineraryDay {
                    day: if day >= 1.0 { day as u32 } else { index as u32 + 1 },
                    title: row.title.trim().to_string(),
                    text: row.text.trim().to_string(),
                }
            })
            .collect();
        (!days.is_empty()).then_some(days)
    }

    /// Map the fields onto a trip record with the resolved image URL.
    pub fn into_trip(self, image: String) -> Trip {
        let itinerary = self.itinerary_days();
        let currency = match self.currency.trim() {
            "" => DEFAULT_CURRENCY.to_string(),
            c => c.to_string(),
        };
        Trip {
            id: self.id.trim().to_string(),
            title: self.title.trim().to_string(),
            location: self.location.trim().to_string(),
            duration: self.duration.trim().to_string(),
            price: coerce_number(&self.price),
            currency,
            description: self.description.trim().to_string(),
            highlights: split_list(&self.highlights),
            inclusions: split_list(&self.inclusions),
            exclusions: split_list(&self.exclusions),
            itinerary,
            image,
            featured: self.featured,
            created_at: None,
            updated_at: None,
        }
    }
}

/// Trip create/edit flow. One submit at a time.
#[derive(Debug, Default)]
pub struct TripEditor {
    busy: BusyFlag,
}

impl TripEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    /// A blank form, or one prefilled from the cached trip list.
    pub async fn open(&self, store: &ClientStore, id: Option<&str>) -> Result<TripForm, AppError> {
        let Some(id) = id else {
            return Ok(TripForm::default());
        };
        store
            .find_trip(id)
            .await
            .map(|trip| TripForm::from_trip(&trip))
            .ok_or_else(|| AppError::NotFound(format!("Trip {} not found", id)))
    }

    /// Upload a new image if one was chosen, then create or update the trip.
    pub async fn submit(
        &self,
        gateway: &Gateway,
        bearer: Bearer<'_>,
        form: TripForm,
    ) -> Result<Trip, AppError> {
        let _busy = self.busy.acquire()?;

        let image = match &form.image {
            None => String::new(),
            Some(ImageSource::Url { url }) | Some(ImageSource::Library { url }) => {
                url.trim().to_string()
            }
            Some(source) => {
                let upload = source.decode_upload()?;
                gateway.upload_image(bearer, upload.as_ref(), None).await?
            }
        };

        let trip = form.into_trip(image);
        if trip.id.is_empty() {
            let created = gateway.create_trip(bearer, &trip).await?;
            tracing::info!(id = %created.id, "Trip created");
            Ok(created)
        } else {
            gateway.update_trip(bearer, &trip).await?;
            tracing::info!(id = %trip.id, "Trip updated");
            Ok(trip)
        }
    }
}

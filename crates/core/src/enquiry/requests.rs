use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{
    error::EnquiryError,
    types::{Enquiry, EnquiryStatus},
};
use crate::{serde::deserialize_optional_string, RecordId};

/// JSON body of `POST /api/enquiry`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEnquiry {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub car_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub message: Option<String>,
}

/// Checks required fields, then the car id format.
///
/// Returns the parsed car id so callers can look the car up.
pub fn validate_new_enquiry(request: &NewEnquiry) -> Result<RecordId, EnquiryError> {
    let missing: Vec<&'static str> = [
        ("carId", request.car_id.is_some()),
        ("name", request.name.is_some()),
        ("email", request.email.is_some()),
        ("message", request.message.is_some()),
    ]
    .into_iter()
    .filter(|(_, present)| !present)
    .map(|(name, _)| name)
    .collect();

    if !missing.is_empty() {
        return Err(EnquiryError::MissingFields(missing));
    }

    let car_id = request.car_id.as_deref().unwrap_or_default();
    Ok(RecordId::parse(car_id.trim())?)
}

impl NewEnquiry {
    /// Builds a new enquiry in status `new`, stamped at `now`.
    pub fn into_enquiry(self, now: DateTime<Utc>) -> Result<Enquiry, EnquiryError> {
        let car_id = validate_new_enquiry(&self)?;

        Ok(Enquiry {
            id: RecordId::new(),
            car_id,
            name: self.name.unwrap_or_default().trim().to_string(),
            email: self.email.unwrap_or_default().trim().to_string(),
            phone: self.phone.map(|p| p.trim().to_string()),
            message: self.message.unwrap_or_default(),
            status: EnquiryStatus::New,
            created_at: now,
            updated_at: now,
        })
    }
}

/// JSON body of `PATCH /api/enquiry/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateEnquiryStatus {
    #[serde(default)]
    pub status: Option<String>,
}

impl UpdateEnquiryStatus {
    pub fn into_status(self) -> Result<EnquiryStatus, EnquiryError> {
        self.status.unwrap_or_default().parse()
    }
}

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::EnquiryError;
use crate::{car::Car, RecordId};

/// Where an enquiry is in the follow-up workflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnquiryStatus {
    #[default]
    New,
    Contacted,
    Closed,
}

impl EnquiryStatus {
    pub const ALL: [Self; 3] = [Self::New, Self::Contacted, Self::Closed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Contacted => "contacted",
            Self::Closed => "closed",
        }
    }
}

impl FromStr for EnquiryStatus {
    type Err = EnquiryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| EnquiryError::InvalidStatus(s.to_string()))
    }
}

impl fmt::Display for EnquiryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A visitor's contact request about one car.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enquiry {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub car_id: RecordId,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub message: String,
    #[serde(default)]
    pub status: EnquiryStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Enquiry {
    /// Moves the enquiry to `status`, bumping `updated_at`.
    pub fn set_status(&mut self, status: EnquiryStatus, now: DateTime<Utc>) {
        self.status = status;
        self.updated_at = now;
    }
}

/// The car an enquiry points at: the full record, or just its id once the car
/// has been deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CarRef {
    Expanded(Box<Car>),
    Orphaned(RecordId),
}

/// An enquiry with its car reference resolved, as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnquiryWithCar {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub car_id: CarRef,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub message: String,
    pub status: EnquiryStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EnquiryWithCar {
    pub fn new(enquiry: Enquiry, car: Option<Car>) -> Self {
        let car_id = match car {
            Some(car) => CarRef::Expanded(Box::new(car)),
            None => CarRef::Orphaned(enquiry.car_id),
        };

        Self {
            id: enquiry.id,
            car_id,
            name: enquiry.name,
            email: enquiry.email,
            phone: enquiry.phone,
            message: enquiry.message,
            status: enquiry.status,
            created_at: enquiry.created_at,
            updated_at: enquiry.updated_at,
        }
    }

    /// The referenced car, if it still exists.
    pub fn car(&self) -> Option<&Car> {
        match &self.car_id {
            CarRef::Expanded(car) => Some(car),
            CarRef::Orphaned(_) => None,
        }
    }
}

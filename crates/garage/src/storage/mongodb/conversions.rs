//! Conversions between domain types and stored BSON documents.
//!
//! Ids map 1:1 onto `ObjectId` (both are 24 hex characters). Timestamps are
//! stored as BSON dates, which keep millisecond precision.

use chrono::{DateTime, Utc};
use mongodb::bson::{self, oid::ObjectId};
use serde::{Deserialize, Serialize};

use garage_core::car::{
    BodyType, Car, Condition, FuelType, ImageDescriptor, Price, Transmission,
};
use garage_core::enquiry::{Enquiry, EnquiryStatus};
use garage_core::storage::RepositoryError;
use garage_core::RecordId;

/// A car as stored in the `cars` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarDocument {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub make: String,
    pub model: String,
    pub year: i64,
    pub price: f64,
    pub mileage: i64,
    pub engine_size: String,
    pub fuel_type: FuelType,
    pub transmission: Transmission,
    pub color: String,
    pub description: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub images: Vec<ImageDescriptor>,
    pub condition: Condition,
    pub body_type: BodyType,
    pub registration_year: i64,
    pub vin: String,
    pub created_at: bson::DateTime,
    pub updated_at: bson::DateTime,
}

/// An enquiry as stored in the `enquiries` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnquiryDocument {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub car_id: ObjectId,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub message: String,
    #[serde(default)]
    pub status: EnquiryStatus,
    pub created_at: bson::DateTime,
    pub updated_at: bson::DateTime,
}

pub fn to_object_id(id: &RecordId) -> Result<ObjectId, RepositoryError> {
    ObjectId::parse_str(id.as_str()).map_err(|e| RepositoryError::InvalidData(e.to_string()))
}

fn to_record_id(id: &ObjectId) -> Result<RecordId, RepositoryError> {
    RecordId::parse(&id.to_hex()).map_err(|e| RepositoryError::Serialization(e.to_string()))
}

pub fn to_bson_datetime(dt: &DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(dt.timestamp_millis())
}

fn from_bson_datetime(dt: bson::DateTime) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::from_timestamp_millis(dt.timestamp_millis()).ok_or_else(|| {
        RepositoryError::Serialization(format!("timestamp out of range: {}", dt.timestamp_millis()))
    })
}

/// BSON has no unsigned integers.
pub fn to_int64(field: &str, value: u64) -> Result<i64, RepositoryError> {
    i64::try_from(value)
        .map_err(|_| RepositoryError::InvalidData(format!("{field} {value} is out of range")))
}

fn from_int64<T: TryFrom<i64>>(field: &str, value: i64) -> Result<T, RepositoryError> {
    T::try_from(value).map_err(|_| {
        RepositoryError::Serialization(format!("stored {field} {value} is out of range"))
    })
}

impl CarDocument {
    pub fn from_car(car: &Car) -> Result<Self, RepositoryError> {
        Ok(Self {
            id: to_object_id(&car.id)?,
            make: car.make.clone(),
            model: car.model.clone(),
            year: i64::from(car.year),
            price: car.price.amount(),
            mileage: to_int64("mileage", car.mileage)?,
            engine_size: car.engine_size.clone(),
            fuel_type: car.fuel_type,
            transmission: car.transmission,
            color: car.color.clone(),
            description: car.description.clone(),
            features: car.features.clone(),
            images: car.images.clone(),
            condition: car.condition,
            body_type: car.body_type,
            registration_year: i64::from(car.registration_year),
            vin: car.vin.clone(),
            created_at: to_bson_datetime(&car.created_at),
            updated_at: to_bson_datetime(&car.updated_at),
        })
    }

    pub fn into_car(self) -> Result<Car, RepositoryError> {
        Ok(Car {
            id: to_record_id(&self.id)?,
            make: self.make,
            model: self.model,
            year: from_int64("year", self.year)?,
            price: Price::new(self.price)
                .map_err(|e| RepositoryError::Serialization(format!("stored {e}")))?,
            mileage: from_int64("mileage", self.mileage)?,
            engine_size: self.engine_size,
            fuel_type: self.fuel_type,
            transmission: self.transmission,
            color: self.color,
            description: self.description,
            features: self.features,
            images: self.images,
            condition: self.condition,
            body_type: self.body_type,
            registration_year: from_int64("registrationYear", self.registration_year)?,
            vin: self.vin,
            created_at: from_bson_datetime(self.created_at)?,
            updated_at: from_bson_datetime(self.updated_at)?,
        })
    }
}

impl EnquiryDocument {
    pub fn from_enquiry(enquiry: &Enquiry) -> Result<Self, RepositoryError> {
        Ok(Self {
            id: to_object_id(&enquiry.id)?,
            car_id: to_object_id(&enquiry.car_id)?,
            name: enquiry.name.clone(),
            email: enquiry.email.clone(),
            phone: enquiry.phone.clone(),
            message: enquiry.message.clone(),
            status: enquiry.status,
            created_at: to_bson_datetime(&enquiry.created_at),
            updated_at: to_bson_datetime(&enquiry.updated_at),
        })
    }

    pub fn into_enquiry(self) -> Result<Enquiry, RepositoryError> {
        Ok(Enquiry {
            id: to_record_id(&self.id)?,
            car_id: to_record_id(&self.car_id)?,
            name: self.name,
            email: self.email,
            phone: self.phone,
            message: self.message,
            status: self.status,
            created_at: from_bson_datetime(self.created_at)?,
            updated_at: from_bson_datetime(self.updated_at)?,
        })
    }
}

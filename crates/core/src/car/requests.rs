use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{
    error::CarError,
    types::{BodyType, Car, Condition, FuelType, ImageDescriptor, Price, Transmission},
};
use crate::{
    serde::{deserialize_optional_string, non_blank},
    RecordId,
};

/// Required fields in the order they are reported when missing.
const REQUIRED_FIELDS: [&str; 14] = [
    "make",
    "model",
    "year",
    "price",
    "mileage",
    "engineSize",
    "fuelType",
    "transmission",
    "color",
    "description",
    "condition",
    "bodyType",
    "registrationYear",
    "vin",
];

/// JSON body of `POST /api/cars`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCar {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub make: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub model: Option<String>,
    #[serde(default)]
    pub year: Option<u32>,
    #[serde(default)]
    pub price: Option<Price>,
    #[serde(default)]
    pub mileage: Option<u64>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub engine_size: Option<String>,
    #[serde(default)]
    pub fuel_type: Option<FuelType>,
    #[serde(default)]
    pub transmission: Option<Transmission>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub color: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub description: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub images: Vec<ImageDescriptor>,
    #[serde(default)]
    pub condition: Option<Condition>,
    #[serde(default)]
    pub body_type: Option<BodyType>,
    #[serde(default)]
    pub registration_year: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub vin: Option<String>,
}

impl NewCar {
    /// Names of the required fields that are absent, in reporting order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let present = [
            self.make.is_some(),
            self.model.is_some(),
            self.year.is_some(),
            self.price.is_some(),
            self.mileage.is_some(),
            self.engine_size.is_some(),
            self.fuel_type.is_some(),
            self.transmission.is_some(),
            self.color.is_some(),
            self.description.is_some(),
            self.condition.is_some(),
            self.body_type.is_some(),
            self.registration_year.is_some(),
            self.vin.is_some(),
        ];

        REQUIRED_FIELDS
            .iter()
            .zip(present)
            .filter(|(_, present)| !present)
            .map(|(name, _)| *name)
            .collect()
    }

    /// Builds a new car with a fresh id, stamped at `now`.
    pub fn into_car(self, now: DateTime<Utc>) -> Result<Car, CarError> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(CarError::MissingFields(missing));
        }

        let (
            Some(make),
            Some(model),
            Some(year),
            Some(price),
            Some(mileage),
            Some(engine_size),
            Some(fuel_type),
            Some(transmission),
            Some(color),
            Some(description),
            Some(condition),
            Some(body_type),
            Some(registration_year),
            Some(vin),
        ) = (
            self.make,
            self.model,
            self.year,
            self.price,
            self.mileage,
            self.engine_size,
            self.fuel_type,
            self.transmission,
            self.color,
            self.description,
            self.condition,
            self.body_type,
            self.registration_year,
            self.vin,
        )
        else {
            return Err(CarError::MissingFields(REQUIRED_FIELDS.to_vec()));
        };

        Ok(Car {
            id: RecordId::new(),
            make: make.trim().to_string(),
            model: model.trim().to_string(),
            year,
            price,
            mileage,
            engine_size: engine_size.trim().to_string(),
            fuel_type,
            transmission,
            color: color.trim().to_string(),
            description,
            features: clean_features(self.features),
            images: self.images,
            condition,
            body_type,
            registration_year,
            vin: vin.trim().to_string(),
            created_at: now,
            updated_at: now,
        })
    }
}

/// Multipart fields of `PUT /api/cars/{id}`, as received.
///
/// Every value arrives as text; [`CarForm::into_update`] coerces them.
#[derive(Debug, Clone, Default)]
pub struct CarForm {
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<String>,
    pub price: Option<String>,
    pub mileage: Option<String>,
    pub engine_size: Option<String>,
    pub fuel_type: Option<String>,
    pub transmission: Option<String>,
    pub color: Option<String>,
    pub description: Option<String>,
    pub features: Option<String>,
    pub images: Option<String>,
    pub condition: Option<String>,
    pub body_type: Option<String>,
    pub registration_year: Option<String>,
    pub vin: Option<String>,
}

impl CarForm {
    /// Assigns a text field by its wire name. Unknown names are ignored.
    pub fn set(&mut self, name: &str, value: String) -> bool {
        let slot = match name {
            "make" => &mut self.make,
            "model" => &mut self.model,
            "year" => &mut self.year,
            "price" => &mut self.price,
            "mileage" => &mut self.mileage,
            "engineSize" => &mut self.engine_size,
            "fuelType" => &mut self.fuel_type,
            "transmission" => &mut self.transmission,
            "color" => &mut self.color,
            "description" => &mut self.description,
            "features" => &mut self.features,
            "images" => &mut self.images,
            "condition" => &mut self.condition,
            "bodyType" => &mut self.body_type,
            "registrationYear" => &mut self.registration_year,
            "vin" => &mut self.vin,
            _ => return false,
        };
        *slot = Some(value);
        true
    }

    /// Decodes the text fields into a typed full-replace update.
    ///
    /// Missing fields are reported together before any value is parsed.
    pub fn into_update(self) -> Result<CarUpdate, CarError> {
        let make = non_blank(self.make);
        let model = non_blank(self.model);
        let year = non_blank(self.year);
        let price = non_blank(self.price);
        let mileage = non_blank(self.mileage);
        let engine_size = non_blank(self.engine_size);
        let fuel_type = non_blank(self.fuel_type);
        let transmission = non_blank(self.transmission);
        let color = non_blank(self.color);
        let description = non_blank(self.description);
        let condition = non_blank(self.condition);
        let body_type = non_blank(self.body_type);
        let registration_year = non_blank(self.registration_year);
        let vin = non_blank(self.vin);

        let present = [
            make.is_some(),
            model.is_some(),
            year.is_some(),
            price.is_some(),
            mileage.is_some(),
            engine_size.is_some(),
            fuel_type.is_some(),
            transmission.is_some(),
            color.is_some(),
            description.is_some(),
            condition.is_some(),
            body_type.is_some(),
            registration_year.is_some(),
            vin.is_some(),
        ];
        let missing: Vec<&'static str> = REQUIRED_FIELDS
            .iter()
            .zip(present)
            .filter(|(_, present)| !present)
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(CarError::MissingFields(missing));
        }

        let (
            Some(make),
            Some(model),
            Some(year),
            Some(price),
            Some(mileage),
            Some(engine_size),
            Some(fuel_type),
            Some(transmission),
            Some(color),
            Some(description),
            Some(condition),
            Some(body_type),
            Some(registration_year),
            Some(vin),
        ) = (
            make,
            model,
            year,
            price,
            mileage,
            engine_size,
            fuel_type,
            transmission,
            color,
            description,
            condition,
            body_type,
            registration_year,
            vin,
        )
        else {
            return Err(CarError::MissingFields(REQUIRED_FIELDS.to_vec()));
        };

        Ok(CarUpdate {
            make,
            model,
            year: parse_number("year", &year)?,
            price: parse_number("price", &price)?,
            mileage: parse_number("mileage", &mileage)?,
            engine_size,
            fuel_type: fuel_type.parse()?,
            transmission: transmission.parse()?,
            color,
            description,
            features: self.features.as_deref().map(decode_features).transpose()?,
            images: self.images.as_deref().map(decode_images).transpose()?,
            condition: condition.parse()?,
            body_type: body_type.parse()?,
            registration_year: parse_number("registrationYear", &registration_year)?,
            vin,
        })
    }
}

/// A full replacement of a car's mutable fields.
///
/// `features` and `images` are `None` when the request did not carry them, in
/// which case the stored lists are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarUpdate {
    pub make: String,
    pub model: String,
    pub year: u32,
    pub price: Price,
    pub mileage: u64,
    pub engine_size: String,
    pub fuel_type: FuelType,
    pub transmission: Transmission,
    pub color: String,
    pub description: String,
    pub features: Option<Vec<String>>,
    pub images: Option<Vec<ImageDescriptor>>,
    pub condition: Condition,
    pub body_type: BodyType,
    pub registration_year: u32,
    pub vin: String,
}

impl CarUpdate {
    /// Overwrites the car's mutable fields and bumps `updated_at`.
    pub fn apply_to(self, car: &mut Car, now: DateTime<Utc>) {
        car.make = self.make;
        car.model = self.model;
        car.year = self.year;
        car.price = self.price;
        car.mileage = self.mileage;
        car.engine_size = self.engine_size;
        car.fuel_type = self.fuel_type;
        car.transmission = self.transmission;
        car.color = self.color;
        car.description = self.description;
        if let Some(features) = self.features {
            car.features = features;
        }
        if let Some(images) = self.images {
            car.images = images;
        }
        car.condition = self.condition;
        car.body_type = self.body_type;
        car.registration_year = self.registration_year;
        car.vin = self.vin;
        car.updated_at = now;
    }
}

fn parse_number<T: std::str::FromStr>(field: &'static str, value: &str) -> Result<T, CarError> {
    value
        .trim()
        .parse()
        .map_err(|_| CarError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}

fn clean_features(features: Vec<String>) -> Vec<String> {
    features
        .into_iter()
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
        .collect()
}

/// Decodes the `features` form field.
///
/// A value containing `[` is read as a JSON array of strings; anything else is
/// a comma-separated list. Blank entries are dropped either way.
pub fn decode_features(value: &str) -> Result<Vec<String>, CarError> {
    if value.contains('[') {
        let features: Vec<String> = serde_json::from_str(value)
            .map_err(|e| CarError::InvalidFeatures(e.to_string()))?;
        return Ok(clean_features(features));
    }

    Ok(value
        .split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect())
}

/// Decodes the `images` form field, a JSON array of `{url, key}` objects.
pub fn decode_images(value: &str) -> Result<Vec<ImageDescriptor>, CarError> {
    if value.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(value).map_err(|e| CarError::InvalidImages(e.to_string()))
}

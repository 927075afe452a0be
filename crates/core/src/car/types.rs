use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

use super::error::{CarError, InvalidPrice, ParseEnumError};
use crate::RecordId;

/// Fuel a car runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FuelType {
    Petrol,
    Diesel,
    Electric,
    Hybrid,
}

impl FuelType {
    pub const ALL: [Self; 4] = [Self::Petrol, Self::Diesel, Self::Electric, Self::Hybrid];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Petrol => "Petrol",
            Self::Diesel => "Diesel",
            Self::Electric => "Electric",
            Self::Hybrid => "Hybrid",
        }
    }
}

/// Gearbox type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Transmission {
    Manual,
    Automatic,
}

impl Transmission {
    pub const ALL: [Self; 2] = [Self::Manual, Self::Automatic];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "Manual",
            Self::Automatic => "Automatic",
        }
    }
}

/// Cosmetic and mechanical condition grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Condition {
    New,
    #[serde(rename = "Like New")]
    LikeNew,
    Excellent,
    Good,
    Fair,
}

impl Condition {
    pub const ALL: [Self; 5] = [
        Self::New,
        Self::LikeNew,
        Self::Excellent,
        Self::Good,
        Self::Fair,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "New",
            Self::LikeNew => "Like New",
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
        }
    }
}

/// Body style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyType {
    Sedan,
    #[serde(rename = "SUV")]
    Suv,
    Hatchback,
    Coupe,
    Wagon,
    Van,
    Truck,
}

impl BodyType {
    pub const ALL: [Self; 7] = [
        Self::Sedan,
        Self::Suv,
        Self::Hatchback,
        Self::Coupe,
        Self::Wagon,
        Self::Van,
        Self::Truck,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sedan => "Sedan",
            Self::Suv => "SUV",
            Self::Hatchback => "Hatchback",
            Self::Coupe => "Coupe",
            Self::Wagon => "Wagon",
            Self::Van => "Van",
            Self::Truck => "Truck",
        }
    }
}

/// Finds the variant whose wire name equals `value` exactly.
fn parse_variant<T: Copy>(
    field: &'static str,
    value: &str,
    variants: &[T],
    as_str: fn(&T) -> &'static str,
) -> Result<T, ParseEnumError> {
    variants
        .iter()
        .copied()
        .find(|v| as_str(v) == value)
        .ok_or_else(|| ParseEnumError {
            field,
            value: value.to_string(),
            allowed: allowed_values(field),
        })
}

fn allowed_values(field: &'static str) -> &'static str {
    match field {
        "fuelType" => "Petrol, Diesel, Electric, Hybrid",
        "transmission" => "Manual, Automatic",
        "condition" => "New, Like New, Excellent, Good, Fair",
        "bodyType" => "Sedan, SUV, Hatchback, Coupe, Wagon, Van, Truck",
        _ => "",
    }
}

impl FromStr for FuelType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_variant("fuelType", s, &Self::ALL, Self::as_str)
    }
}

impl FromStr for Transmission {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_variant("transmission", s, &Self::ALL, Self::as_str)
    }
}

impl FromStr for Condition {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_variant("condition", s, &Self::ALL, Self::as_str)
    }
}

impl FromStr for BodyType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_variant("bodyType", s, &Self::ALL, Self::as_str)
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Transmission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for BodyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Largest float below which every whole number is exact.
const MAX_EXACT_WHOLE: f64 = 9_007_199_254_740_992.0;

/// Asking price. Finite and non-negative; may carry cents (`15999.99`).
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Deserialize)]
#[serde(try_from = "f64")]
pub struct Price(f64);

// NaN can't be constructed, so equality is reflexive.
impl Eq for Price {}

impl Price {
    pub fn new(amount: f64) -> Result<Self, InvalidPrice> {
        if amount.is_finite() && amount >= 0.0 {
            // `-0.0 + 0.0` is `0.0`
            Ok(Self(amount + 0.0))
        } else {
            Err(InvalidPrice(amount.to_string()))
        }
    }

    pub fn amount(self) -> f64 {
        self.0
    }

    fn is_whole(self) -> bool {
        self.0.fract() == 0.0 && self.0 < MAX_EXACT_WHOLE
    }
}

impl From<u32> for Price {
    fn from(amount: u32) -> Self {
        Self(f64::from(amount))
    }
}

impl From<Price> for f64 {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl TryFrom<f64> for Price {
    type Error = InvalidPrice;

    fn try_from(amount: f64) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl FromStr for Price {
    type Err = InvalidPrice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount: f64 = s
            .trim()
            .parse()
            .map_err(|_| InvalidPrice(s.to_string()))?;
        Self::new(amount).map_err(|_| InvalidPrice(s.to_string()))
    }
}

/// Whole amounts are written as integers (`15000`, not `15000.0`).
impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_whole() {
            serializer.serialize_u64(self.0 as u64)
        } else {
            serializer.serialize_f64(self.0)
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_whole() {
            write!(f, "{}", self.0 as u64)
        } else {
            write!(f, "{:.2}", self.0)
        }
    }
}

/// A stored image: public URL plus the opaque key it was written under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDescriptor {
    pub url: String,
    pub key: String,
}

impl ImageDescriptor {
    pub fn new(url: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            key: key.into(),
        }
    }
}

/// A vehicle listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Car {
    #[serde(rename = "_id")]
    pub id: RecordId,
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
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub images: Vec<ImageDescriptor>,
    pub condition: Condition,
    pub body_type: BodyType,
    pub registration_year: u32,
    pub vin: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Car {
    /// Display title, e.g. "2019 Toyota Corolla".
    pub fn title(&self) -> String {
        format!("{} {} {}", self.year, self.make, self.model)
    }

    /// Sets a specific ID for this car (useful for testing).
    pub fn with_id(mut self, id: RecordId) -> Self {
        self.id = id;
        self
    }

    /// Sets the creation timestamp (useful for testing ordering).
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self.updated_at = created_at;
        self
    }
}

/// Validates a car before it is written.
///
/// Required text fields must not be blank. Enumerated and numeric fields are
/// already constrained by their types.
pub fn validate_car(car: &Car) -> Result<(), CarError> {
    let text_fields = [
        ("make", &car.make),
        ("model", &car.model),
        ("engineSize", &car.engine_size),
        ("color", &car.color),
        ("description", &car.description),
        ("vin", &car.vin),
    ];

    let missing: Vec<&'static str> = text_fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(CarError::MissingFields(missing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::car::demo_cars;

    #[test]
    fn test_enum_wire_names_round_trip() {
        for fuel in FuelType::ALL {
            assert_eq!(fuel.as_str().parse::<FuelType>().unwrap(), fuel);
        }
        for body in BodyType::ALL {
            assert_eq!(body.as_str().parse::<BodyType>().unwrap(), body);
        }
        for condition in Condition::ALL {
            assert_eq!(condition.as_str().parse::<Condition>().unwrap(), condition);
        }
        for transmission in Transmission::ALL {
            assert_eq!(
                transmission.as_str().parse::<Transmission>().unwrap(),
                transmission
            );
        }
    }

    #[test]
    fn test_enum_parse_is_exact_match() {
        assert!("petrol".parse::<FuelType>().is_err());
        assert!("Suv".parse::<BodyType>().is_err());
        assert_eq!("SUV".parse::<BodyType>().unwrap(), BodyType::Suv);
        assert_eq!("Like New".parse::<Condition>().unwrap(), Condition::LikeNew);
    }

    #[test]
    fn test_enum_parse_error_names_field() {
        let err = "Steam".parse::<FuelType>().unwrap_err();
        assert_eq!(err.field, "fuelType");
        assert_eq!(err.value, "Steam");
    }

    #[test]
    fn test_serde_matches_wire_names() {
        assert_eq!(
            serde_json::to_string(&Condition::LikeNew).unwrap(),
            "\"Like New\""
        );
        assert_eq!(serde_json::to_string(&BodyType::Suv).unwrap(), "\"SUV\"");
        assert_eq!(
            serde_json::from_str::<FuelType>("\"Hybrid\"").unwrap(),
            FuelType::Hybrid
        );
    }

    #[test]
    fn test_car_serializes_camel_case_with_underscore_id() {
        let car = demo_cars(Utc::now()).remove(0);
        let json = serde_json::to_value(&car).unwrap();

        assert_eq!(json["_id"], car.id.as_str());
        assert!(json.get("engineSize").is_some());
        assert!(json.get("fuelType").is_some());
        assert!(json.get("registrationYear").is_some());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("id").is_none());
    }

    #[test]
    fn test_validate_car_rejects_blank_text() {
        let mut car = demo_cars(Utc::now()).remove(0);
        assert!(validate_car(&car).is_ok());

        car.vin = "   ".to_string();
        car.make = String::new();
        assert_eq!(
            validate_car(&car),
            Err(CarError::MissingFields(vec!["make", "vin"]))
        );
    }

    #[test]
    fn test_price_accepts_cents_and_rejects_negatives() {
        assert_eq!("15999.99".parse::<Price>().unwrap().amount(), 15999.99);
        assert_eq!(" 15000 ".parse::<Price>().unwrap(), Price::from(15000));
        assert!("-1".parse::<Price>().is_err());
        assert!("NaN".parse::<Price>().is_err());
        assert!("inf".parse::<Price>().is_err());
        assert!("12k".parse::<Price>().is_err());
        assert!(Price::new(-0.5).is_err());
    }

    #[test]
    fn test_price_wire_form() {
        assert_eq!(serde_json::to_string(&Price::from(15000)).unwrap(), "15000");
        assert_eq!(
            serde_json::to_string(&Price::new(15999.99).unwrap()).unwrap(),
            "15999.99"
        );
        assert_eq!(
            serde_json::from_str::<Price>("15000").unwrap(),
            Price::from(15000)
        );
        assert!(serde_json::from_str::<Price>("-3").is_err());
    }

    #[test]
    fn test_price_display() {
        assert_eq!(Price::from(14995).to_string(), "14995");
        assert_eq!(Price::new(9999.5).unwrap().to_string(), "9999.50");
    }

    #[test]
    fn test_title() {
        let car = demo_cars(Utc::now()).remove(0);
        assert_eq!(car.title(), format!("{} {} {}", car.year, car.make, car.model));
    }
}

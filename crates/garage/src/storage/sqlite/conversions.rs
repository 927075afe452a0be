//! SQLite row conversion functions.
//!
//! Pure functions for converting between SQLite rows and domain types.
//! These are testable in isolation without database access.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use garage_core::car::{Car, ImageDescriptor, Price};
use garage_core::enquiry::Enquiry;
use garage_core::storage::RepositoryError;
use garage_core::RecordId;
use rusqlite::types::Type;
use rusqlite::Row;

// ============================================================================
// Car conversions
// ============================================================================

/// Convert a SQLite row to a Car.
///
/// Expected columns: id, make, model, year, price, mileage, engine_size,
/// fuel_type, transmission, color, description, features, images, condition,
/// body_type, registration_year, vin, created_at, updated_at
pub fn row_to_car(row: &Row) -> rusqlite::Result<Car> {
    let id: String = row.get(0)?;
    let fuel_type: String = row.get(7)?;
    let transmission: String = row.get(8)?;
    let features: String = row.get(11)?;
    let images: String = row.get(12)?;
    let condition: String = row.get(13)?;
    let body_type: String = row.get(14)?;
    let created_at: String = row.get(17)?;
    let updated_at: String = row.get(18)?;
    let price: f64 = row.get(4)?;
    let mileage: i64 = row.get(5)?;

    Ok(Car {
        id: parse_id(0, &id)?,
        make: row.get(1)?,
        model: row.get(2)?,
        year: row.get(3)?,
        price: Price::new(price)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Real, Box::new(e)))?,
        mileage: parse_unsigned(5, mileage)?,
        engine_size: row.get(6)?,
        fuel_type: parse_text(7, &fuel_type)?,
        transmission: parse_text(8, &transmission)?,
        color: row.get(9)?,
        description: row.get(10)?,
        features: parse_json(11, &features)?,
        images: parse_json(12, &images)?,
        condition: parse_text(13, &condition)?,
        body_type: parse_text(14, &body_type)?,
        registration_year: row.get(15)?,
        vin: row.get(16)?,
        created_at: parse_datetime(17, &created_at)?,
        updated_at: parse_datetime(18, &updated_at)?,
    })
}

/// Serialize a car's feature list for the `features` column.
pub fn features_to_json(features: &[String]) -> Result<String, RepositoryError> {
    serde_json::to_string(features).map_err(|e| RepositoryError::Serialization(e.to_string()))
}

/// Serialize a car's image list for the `images` column.
pub fn images_to_json(images: &[ImageDescriptor]) -> Result<String, RepositoryError> {
    serde_json::to_string(images).map_err(|e| RepositoryError::Serialization(e.to_string()))
}

// ============================================================================
// Enquiry conversions
// ============================================================================

/// Convert a SQLite row to an Enquiry.
///
/// Expected columns: id, car_id, name, email, phone, message, status,
/// created_at, updated_at
pub fn row_to_enquiry(row: &Row) -> rusqlite::Result<Enquiry> {
    let id: String = row.get(0)?;
    let car_id: String = row.get(1)?;
    let status: String = row.get(6)?;
    let created_at: String = row.get(7)?;
    let updated_at: String = row.get(8)?;

    Ok(Enquiry {
        id: parse_id(0, &id)?,
        car_id: parse_id(1, &car_id)?,
        name: row.get(2)?,
        email: row.get(3)?,
        phone: row.get(4)?,
        message: row.get(5)?,
        status: parse_text(6, &status)?,
        created_at: parse_datetime(7, &created_at)?,
        updated_at: parse_datetime(8, &updated_at)?,
    })
}

// ============================================================================
// Helper functions
// ============================================================================

fn conversion_failure<E>(column: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(err))
}

fn parse_unsigned(column: usize, value: i64) -> rusqlite::Result<u64> {
    u64::try_from(value).map_err(|_| rusqlite::Error::IntegralValueOutOfRange(column, value))
}

fn parse_id(column: usize, s: &str) -> rusqlite::Result<RecordId> {
    RecordId::parse(s).map_err(|e| conversion_failure(column, e))
}

/// Parse an enum stored by its wire name.
fn parse_text<T>(column: usize, s: &str) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    s.parse().map_err(|e| conversion_failure(column, e))
}

fn parse_json<T: serde::de::DeserializeOwned>(column: usize, s: &str) -> rusqlite::Result<T> {
    serde_json::from_str(s).map_err(|e| conversion_failure(column, e))
}

/// Parse a datetime from RFC 3339 string.
fn parse_datetime(column: usize, s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_failure(column, e))
}

/// Format a DateTime for SQLite storage.
///
/// Fixed-width (nanoseconds, `Z` suffix) so that text order is time order.
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use garage_core::car::FuelType;
    use garage_core::enquiry::EnquiryStatus;

    #[test]
    fn test_format_datetime_is_fixed_width() {
        let whole = DateTime::parse_from_rfc3339("2024-06-15T10:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let fractional = DateTime::parse_from_rfc3339("2024-06-15T10:30:00.5Z")
            .unwrap()
            .with_timezone(&Utc);

        assert_eq!(format_datetime(&whole), "2024-06-15T10:30:00.000000000Z");
        assert_eq!(format_datetime(&fractional).len(), format_datetime(&whole).len());
        assert!(format_datetime(&whole) < format_datetime(&fractional));
    }

    #[test]
    fn test_datetime_round_trip() {
        let now = Utc::now();
        assert_eq!(parse_datetime(0, &format_datetime(&now)).unwrap(), now);
    }

    #[test]
    fn test_parse_text_enums() {
        assert_eq!(parse_text::<FuelType>(7, "Diesel").unwrap(), FuelType::Diesel);
        assert_eq!(
            parse_text::<EnquiryStatus>(6, "contacted").unwrap(),
            EnquiryStatus::Contacted
        );
    }

    #[test]
    fn test_parse_text_invalid_reports_column() {
        let err = parse_text::<FuelType>(7, "Steam").unwrap_err();
        assert!(matches!(
            err,
            rusqlite::Error::FromSqlConversionFailure(7, Type::Text, _)
        ));
    }

    #[test]
    fn test_images_json_round_trip() {
        let images = vec![ImageDescriptor::new("/uploads/a.jpg", "a.jpg")];
        let json = images_to_json(&images).unwrap();

        assert_eq!(json, r#"[{"url":"/uploads/a.jpg","key":"a.jpg"}]"#);
        assert_eq!(parse_json::<Vec<ImageDescriptor>>(12, &json).unwrap(), images);
    }

    #[test]
    fn test_parse_unsigned_rejects_negative() {
        assert_eq!(parse_unsigned(5, 42_000).unwrap(), 42_000);
        assert!(matches!(
            parse_unsigned(5, -1),
            Err(rusqlite::Error::IntegralValueOutOfRange(5, -1))
        ));
    }

    #[test]
    fn test_parse_id_rejects_garbage() {
        assert!(parse_id(0, "not-an-id").is_err());
    }
}

//! SQLite repository implementation.
//!
//! Implements the repository traits from `garage_core::storage` using SQLite.

use async_trait::async_trait;
use tokio_rusqlite::Connection;

use garage_core::car::Car;
use garage_core::enquiry::Enquiry;
use garage_core::filter::CarFilter;
use garage_core::storage::{CarRepository, EnquiryRepository, RepositoryError, Result};
use garage_core::RecordId;

use super::conversions::{
    features_to_json, format_datetime, images_to_json, row_to_car, row_to_enquiry,
};
use super::error::map_tokio_rusqlite_error;
use super::schema;

/// Helper to wrap rusqlite errors for tokio_rusqlite closures.
fn wrap_err(e: rusqlite::Error) -> tokio_rusqlite::Error {
    tokio_rusqlite::Error::Rusqlite(e)
}

/// SQLite integers are signed 64-bit.
fn to_integer(field: &str, value: u64) -> Result<i64> {
    i64::try_from(value)
        .map_err(|_| RepositoryError::InvalidData(format!("{field} {value} is out of range")))
}

/// Column values of a car, owned so they can move into a connection closure.
struct CarRow {
    id: String,
    make: String,
    model: String,
    year: u32,
    price: f64,
    mileage: i64,
    engine_size: String,
    fuel_type: &'static str,
    transmission: &'static str,
    color: String,
    description: String,
    features: String,
    images: String,
    condition: &'static str,
    body_type: &'static str,
    registration_year: u32,
    vin: String,
    created_at: String,
    updated_at: String,
}

impl CarRow {
    fn from_car(car: &Car) -> Result<Self> {
        Ok(Self {
            id: car.id.to_string(),
            make: car.make.clone(),
            model: car.model.clone(),
            year: car.year,
            price: car.price.amount(),
            mileage: to_integer("mileage", car.mileage)?,
            engine_size: car.engine_size.clone(),
            fuel_type: car.fuel_type.as_str(),
            transmission: car.transmission.as_str(),
            color: car.color.clone(),
            description: car.description.clone(),
            features: features_to_json(&car.features)?,
            images: images_to_json(&car.images)?,
            condition: car.condition.as_str(),
            body_type: car.body_type.as_str(),
            registration_year: car.registration_year,
            vin: car.vin.clone(),
            created_at: format_datetime(&car.created_at),
            updated_at: format_datetime(&car.updated_at),
        })
    }
}

/// SQLite-based repository implementation.
///
/// Provides async access to SQLite storage for cars and enquiries.
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Creates a new repository with a file-based database.
    ///
    /// The database file will be created if it doesn't exist.
    /// Schema tables are created automatically.
    pub async fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    /// Creates a new repository with an in-memory database.
    ///
    /// Useful for testing - data is lost when the connection is dropped.
    pub async fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    /// Initialize the database schema.
    async fn init_schema(conn: &Connection) -> Result<()> {
        conn.call(|conn| {
            schema::register_functions(conn).map_err(wrap_err)?;
            conn.execute_batch(schema::CREATE_TABLES)
                .map_err(wrap_err)?;
            Ok(())
        })
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))
    }

    async fn query_car(&self, sql: &'static str, key: String) -> Result<Option<Car>> {
        let id = key.clone();
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(sql).map_err(wrap_err)?;
                match stmt.query_row([&key], row_to_car) {
                    Ok(car) => Ok(Some(car)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(wrap_err(e)),
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Car", id))
    }
}

// ============================================================================
// CarRepository implementation
// ============================================================================

#[async_trait]
impl CarRepository for SqliteRepository {
    async fn list_cars(&self, filter: &CarFilter) -> Result<Vec<Car>> {
        let (sql, params) = schema::car_list_query(filter);

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&sql).map_err(wrap_err)?;
                let rows = stmt
                    .query_map(rusqlite::params_from_iter(params), row_to_car)
                    .map_err(wrap_err)?;

                let mut cars = Vec::new();
                for row_result in rows {
                    cars.push(row_result.map_err(wrap_err)?);
                }
                Ok(cars)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Car", "list"))
    }

    async fn get_car(&self, id: &RecordId) -> Result<Option<Car>> {
        self.query_car(schema::SELECT_CAR_BY_ID, id.to_string()).await
    }

    async fn find_car_by_vin(&self, vin: &str) -> Result<Option<Car>> {
        self.query_car(schema::SELECT_CAR_BY_VIN, vin.to_string()).await
    }

    async fn create_car(&self, car: &Car) -> Result<()> {
        let row = CarRow::from_car(car)?;
        let vin = car.vin.clone();

        self.conn
            .call(move |conn| {
                conn.execute(
                    schema::INSERT_CAR,
                    rusqlite::params![
                        row.id,
                        row.make,
                        row.model,
                        row.year,
                        row.price,
                        row.mileage,
                        row.engine_size,
                        row.fuel_type,
                        row.transmission,
                        row.color,
                        row.description,
                        row.features,
                        row.images,
                        row.condition,
                        row.body_type,
                        row.registration_year,
                        row.vin,
                        row.created_at,
                        row.updated_at
                    ],
                )
                .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Car", vin))
    }

    async fn update_car(&self, car: &Car) -> Result<()> {
        let row = CarRow::from_car(car)?;
        let car_id = car.id.to_string();
        let vin = car.vin.clone();

        let result = self
            .conn
            .call(move |conn| {
                conn.execute(
                    schema::UPDATE_CAR,
                    rusqlite::params![
                        row.id,
                        row.make,
                        row.model,
                        row.year,
                        row.price,
                        row.mileage,
                        row.engine_size,
                        row.fuel_type,
                        row.transmission,
                        row.color,
                        row.description,
                        row.features,
                        row.images,
                        row.condition,
                        row.body_type,
                        row.registration_year,
                        row.vin,
                        row.updated_at
                    ],
                )
                .map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Car", vin))?;

        if result == 0 {
            return Err(RepositoryError::car_not_found(car_id));
        }
        Ok(())
    }

    async fn delete_car(&self, id: &RecordId) -> Result<()> {
        let id_str = id.to_string();
        let car_id = id.to_string();

        self.conn
            .call(move |conn| {
                let rows = conn
                    .execute(schema::DELETE_CAR, [&id_str])
                    .map_err(wrap_err)?;
                if rows == 0 {
                    Err(wrap_err(rusqlite::Error::QueryReturnedNoRows))
                } else {
                    Ok(())
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Car", car_id))
    }

    async fn count_cars(&self) -> Result<u64> {
        self.conn
            .call(|conn| {
                conn.query_row(schema::COUNT_CARS, [], |row| row.get::<_, i64>(0))
                    .map_err(wrap_err)
            })
            .await
            .map(|count| count.unsigned_abs())
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))
    }
}

// ============================================================================
// EnquiryRepository implementation
// ============================================================================

#[async_trait]
impl EnquiryRepository for SqliteRepository {
    async fn list_enquiries(&self) -> Result<Vec<Enquiry>> {
        self.conn
            .call(|conn| {
                let mut stmt = conn.prepare(schema::SELECT_ENQUIRIES).map_err(wrap_err)?;
                let rows = stmt.query_map([], row_to_enquiry).map_err(wrap_err)?;

                let mut enquiries = Vec::new();
                for row_result in rows {
                    enquiries.push(row_result.map_err(wrap_err)?);
                }
                Ok(enquiries)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Enquiry", "list"))
    }

    async fn get_enquiry(&self, id: &RecordId) -> Result<Option<Enquiry>> {
        let id_str = id.to_string();

        self.conn
            .call(move |conn| {
                let mut stmt = conn
                    .prepare(schema::SELECT_ENQUIRY_BY_ID)
                    .map_err(wrap_err)?;
                match stmt.query_row([&id_str], row_to_enquiry) {
                    Ok(enquiry) => Ok(Some(enquiry)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(wrap_err(e)),
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Enquiry", id.to_string()))
    }

    async fn create_enquiry(&self, enquiry: &Enquiry) -> Result<()> {
        let id = enquiry.id.to_string();
        let car_id = enquiry.car_id.to_string();
        let name = enquiry.name.clone();
        let email = enquiry.email.clone();
        let phone = enquiry.phone.clone();
        let message = enquiry.message.clone();
        let status = enquiry.status.as_str();
        let created_at = format_datetime(&enquiry.created_at);
        let updated_at = format_datetime(&enquiry.updated_at);
        let enquiry_id = enquiry.id.to_string();

        self.conn
            .call(move |conn| {
                conn.execute(
                    schema::INSERT_ENQUIRY,
                    rusqlite::params![
                        id, car_id, name, email, phone, message, status, created_at, updated_at
                    ],
                )
                .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Enquiry", enquiry_id))
    }

    async fn update_enquiry(&self, enquiry: &Enquiry) -> Result<()> {
        let id = enquiry.id.to_string();
        let status = enquiry.status.as_str();
        let updated_at = format_datetime(&enquiry.updated_at);
        let enquiry_id = enquiry.id.to_string();

        self.conn
            .call(move |conn| {
                let rows = conn
                    .execute(
                        schema::UPDATE_ENQUIRY,
                        rusqlite::params![id, status, updated_at],
                    )
                    .map_err(wrap_err)?;
                if rows == 0 {
                    Err(wrap_err(rusqlite::Error::QueryReturnedNoRows))
                } else {
                    Ok(())
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Enquiry", enquiry_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use garage_core::car::{demo_cars, BodyType, Price};
    use garage_core::enquiry::EnquiryStatus;
    use garage_core::filter::NumericRange;

    async fn seeded() -> (SqliteRepository, Vec<Car>) {
        let repo = SqliteRepository::new_in_memory().await.unwrap();
        let cars = demo_cars(Utc::now());
        for car in &cars {
            repo.create_car(car).await.unwrap();
        }
        (repo, cars)
    }

    #[tokio::test]
    async fn test_car_round_trip() {
        let (repo, cars) = seeded().await;

        for car in &cars {
            assert_eq!(repo.get_car(&car.id).await.unwrap().as_ref(), Some(car));
        }
        assert_eq!(repo.count_cars().await.unwrap(), cars.len() as u64);
    }

    #[tokio::test]
    async fn test_list_matches_in_memory_predicate() {
        let (repo, cars) = seeded().await;
        let filter = CarFilter {
            make: Some("o".to_string()),
            price: NumericRange::new(Some(Price::from(9_000)), None),
            mileage: NumericRange::new(None, Some(70_000)),
            ..Default::default()
        };

        let listed = repo.list_cars(&filter).await.unwrap();

        let expected: Vec<Car> = cars.into_iter().filter(|c| filter.matches(c)).collect();
        assert_eq!(listed, expected);
    }

    #[tokio::test]
    async fn test_list_is_case_insensitive_and_newest_first() {
        let (repo, cars) = seeded().await;

        let all = repo.list_cars(&CarFilter::default()).await.unwrap();
        assert_eq!(all, cars);

        let filter = CarFilter {
            make: Some("TOYOTA".to_string()),
            ..Default::default()
        };
        let listed = repo.list_cars(&filter).await.unwrap();
        assert!(!listed.is_empty());
        assert!(listed.iter().all(|c| c.make == "Toyota"));
    }

    #[tokio::test]
    async fn test_make_match_folds_non_ascii_case() {
        let repo = SqliteRepository::new_in_memory().await.unwrap();
        let mut car = demo_cars(Utc::now()).remove(0);
        car.make = "Škoda".to_string();
        car.model = "Octavia Ö".to_string();
        repo.create_car(&car).await.unwrap();

        for (make, model) in [("škoda", "ö"), ("ŠKODA", "OCTAVIA"), ("koda", "octavia ö")] {
            let filter = CarFilter {
                make: Some(make.to_string()),
                model: Some(model.to_string()),
                ..Default::default()
            };
            assert!(filter.matches(&car), "{make}/{model}");
            assert_eq!(repo.list_cars(&filter).await.unwrap(), vec![car.clone()]);
        }
    }

    #[tokio::test]
    async fn test_price_keeps_cents() {
        let repo = SqliteRepository::new_in_memory().await.unwrap();
        let mut car = demo_cars(Utc::now()).remove(0);
        car.price = Price::new(15999.99).unwrap();
        repo.create_car(&car).await.unwrap();

        assert_eq!(repo.get_car(&car.id).await.unwrap(), Some(car.clone()));

        let below = CarFilter {
            price: NumericRange::new(None, Some(Price::new(15999.98).unwrap())),
            ..Default::default()
        };
        assert!(repo.list_cars(&below).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_vin_is_already_exists() {
        let (repo, cars) = seeded().await;
        let clone = cars[0].clone().with_id(RecordId::new());

        let result = repo.create_car(&clone).await;

        assert_eq!(result, Err(RepositoryError::duplicate_vin(&cars[0].vin)));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let (repo, mut cars) = seeded().await;
        let mut car = cars.remove(0);

        car.body_type = BodyType::Wagon;
        car.images.clear();
        repo.update_car(&car).await.unwrap();
        assert_eq!(repo.get_car(&car.id).await.unwrap(), Some(car.clone()));

        repo.delete_car(&car.id).await.unwrap();
        assert!(repo.get_car(&car.id).await.unwrap().is_none());
        assert!(matches!(
            repo.delete_car(&car.id).await,
            Err(RepositoryError::NotFound { .. })
        ));
        assert!(matches!(
            repo.update_car(&car).await,
            Err(RepositoryError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_enquiry_round_trip() {
        let (repo, cars) = seeded().await;
        let now = Utc::now();
        let mut enquiry = Enquiry {
            id: RecordId::new(),
            car_id: cars[0].id.clone(),
            name: "Sam".to_string(),
            email: "sam@example.com".to_string(),
            phone: None,
            message: "Still available?".to_string(),
            status: EnquiryStatus::New,
            created_at: now,
            updated_at: now,
        };
        repo.create_enquiry(&enquiry).await.unwrap();

        enquiry.set_status(EnquiryStatus::Contacted, Utc::now());
        repo.update_enquiry(&enquiry).await.unwrap();

        assert_eq!(
            repo.get_enquiry(&enquiry.id).await.unwrap(),
            Some(enquiry.clone())
        );
        assert_eq!(repo.list_enquiries().await.unwrap(), vec![enquiry]);
    }
}

use std::sync::Arc;

use chrono::Utc;
use garage_core::{
    car::{demo_cars, validate_car, Car, CarUpdate, NewCar},
    filter::{CarFilter, ListCarsQuery},
    storage::{CarRepository, RepositoryError},
    RecordId,
};

use super::ServiceError;

/// CRUD over car listings with VIN uniqueness enforced.
#[derive(Clone)]
pub struct CarService {
    cars: Arc<dyn CarRepository>,
}

impl CarService {
    pub fn new(cars: Arc<dyn CarRepository>) -> Self {
        Self { cars }
    }

    /// Cars matching every supplied filter, newest first.
    pub async fn list(&self, query: ListCarsQuery) -> Result<Vec<Car>, ServiceError> {
        let filter = CarFilter::try_from(query)?;
        tracing::debug!(?filter, "Listing cars");
        Ok(self.cars.list_cars(&filter).await?)
    }

    pub async fn get(&self, id: &RecordId) -> Result<Car, ServiceError> {
        self.cars
            .get_car(id)
            .await?
            .ok_or_else(|| RepositoryError::car_not_found(id).into())
    }

    pub async fn create(&self, request: NewCar) -> Result<Car, ServiceError> {
        let car = request.into_car(Utc::now())?;
        validate_car(&car)?;

        if self.cars.find_car_by_vin(&car.vin).await?.is_some() {
            return Err(ServiceError::DuplicateVin);
        }

        self.cars.create_car(&car).await.map_err(vin_conflict)?;

        tracing::info!(car_id = %car.id, vin = %car.vin, "Car created");
        Ok(car)
    }

    /// Replaces every mutable field of car `id`.
    ///
    /// The image list in `update` is written as given; callers that upload new
    /// files append their descriptors before calling this.
    pub async fn update(&self, id: &RecordId, update: CarUpdate) -> Result<Car, ServiceError> {
        let mut car = self.load_for_update(id, &update.vin).await?;

        update.apply_to(&mut car, Utc::now());
        validate_car(&car)?;

        self.cars.update_car(&car).await.map_err(vin_conflict)?;

        tracing::info!(car_id = %car.id, vin = %car.vin, images = car.images.len(), "Car updated");
        Ok(car)
    }

    /// Loads car `id` ahead of an update that sets its VIN to `vin`.
    ///
    /// Fails with [`ServiceError::DuplicateVin`] when another car holds `vin`,
    /// so callers can reject the request before doing side effects.
    pub async fn load_for_update(&self, id: &RecordId, vin: &str) -> Result<Car, ServiceError> {
        let car = self.get(id).await?;

        if let Some(other) = self.cars.find_car_by_vin(vin).await? {
            if other.id != car.id {
                return Err(ServiceError::DuplicateVin);
            }
        }

        Ok(car)
    }

    /// Hard-deletes a car. Its enquiries and images are kept.
    pub async fn delete(&self, id: &RecordId) -> Result<(), ServiceError> {
        self.cars.delete_car(id).await?;
        tracing::info!(car_id = %id, "Car deleted");
        Ok(())
    }

    /// Inserts the demo inventory when no cars exist. Returns how many were added.
    pub async fn seed_if_empty(&self) -> Result<usize, ServiceError> {
        if self.cars.count_cars().await? > 0 {
            tracing::info!("Car store is not empty, skipping seed");
            return Ok(0);
        }

        let cars = demo_cars(Utc::now());
        for car in &cars {
            self.cars.create_car(car).await.map_err(vin_conflict)?;
        }

        tracing::info!(count = cars.len(), "Seeded demo cars");
        Ok(cars.len())
    }
}

/// A unique-index violation raised by the store means a concurrent write won
/// the VIN.
fn vin_conflict(err: RepositoryError) -> ServiceError {
    match err {
        RepositoryError::AlreadyExists {
            entity_type: "Car", ..
        } => ServiceError::DuplicateVin,
        other => other.into(),
    }
}

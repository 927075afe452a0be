//! In-memory repository implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use garage_core::car::Car;
use garage_core::enquiry::Enquiry;
use garage_core::filter::{sort_newest_first, CarFilter};
use garage_core::storage::{CarRepository, EnquiryRepository, RepositoryError, Result};
use garage_core::RecordId;

/// In-memory storage backend.
///
/// Uses HashMaps wrapped in `Arc<RwLock<_>>` for thread-safe access.
/// Data is not persisted and will be lost when the repository is dropped.
#[derive(Debug, Clone)]
pub struct InMemoryRepository {
    cars: Arc<RwLock<HashMap<RecordId, Car>>>,
    enquiries: Arc<RwLock<HashMap<RecordId, Enquiry>>>,
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRepository {
    /// Creates a new empty in-memory repository.
    pub fn new() -> Self {
        Self {
            cars: Arc::new(RwLock::new(HashMap::new())),
            enquiries: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

fn vin_taken(cars: &HashMap<RecordId, Car>, car: &Car) -> bool {
    cars.values().any(|c| c.vin == car.vin && c.id != car.id)
}

#[async_trait]
impl CarRepository for InMemoryRepository {
    async fn list_cars(&self, filter: &CarFilter) -> Result<Vec<Car>> {
        let cars = self.cars.read().await;
        let mut matching: Vec<Car> = cars.values().filter(|c| filter.matches(c)).cloned().collect();
        sort_newest_first(&mut matching);
        Ok(matching)
    }

    async fn get_car(&self, id: &RecordId) -> Result<Option<Car>> {
        let cars = self.cars.read().await;
        Ok(cars.get(id).cloned())
    }

    async fn find_car_by_vin(&self, vin: &str) -> Result<Option<Car>> {
        let cars = self.cars.read().await;
        Ok(cars.values().find(|c| c.vin == vin).cloned())
    }

    async fn create_car(&self, car: &Car) -> Result<()> {
        let mut cars = self.cars.write().await;
        if cars.contains_key(&car.id) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "Car",
                id: car.id.to_string(),
            });
        }
        if vin_taken(&cars, car) {
            return Err(RepositoryError::duplicate_vin(&car.vin));
        }
        cars.insert(car.id.clone(), car.clone());
        Ok(())
    }

    async fn update_car(&self, car: &Car) -> Result<()> {
        let mut cars = self.cars.write().await;
        if !cars.contains_key(&car.id) {
            return Err(RepositoryError::car_not_found(&car.id));
        }
        if vin_taken(&cars, car) {
            return Err(RepositoryError::duplicate_vin(&car.vin));
        }
        cars.insert(car.id.clone(), car.clone());
        Ok(())
    }

    async fn delete_car(&self, id: &RecordId) -> Result<()> {
        let mut cars = self.cars.write().await;
        if cars.remove(id).is_none() {
            return Err(RepositoryError::car_not_found(id));
        }
        Ok(())
    }

    async fn count_cars(&self) -> Result<u64> {
        let cars = self.cars.read().await;
        Ok(cars.len() as u64)
    }
}

#[async_trait]
impl EnquiryRepository for InMemoryRepository {
    async fn list_enquiries(&self) -> Result<Vec<Enquiry>> {
        let enquiries = self.enquiries.read().await;
        let mut all: Vec<Enquiry> = enquiries.values().cloned().collect();
        all.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(all)
    }

    async fn get_enquiry(&self, id: &RecordId) -> Result<Option<Enquiry>> {
        let enquiries = self.enquiries.read().await;
        Ok(enquiries.get(id).cloned())
    }

    async fn create_enquiry(&self, enquiry: &Enquiry) -> Result<()> {
        let mut enquiries = self.enquiries.write().await;
        if enquiries.contains_key(&enquiry.id) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "Enquiry",
                id: enquiry.id.to_string(),
            });
        }
        enquiries.insert(enquiry.id.clone(), enquiry.clone());
        Ok(())
    }

    async fn update_enquiry(&self, enquiry: &Enquiry) -> Result<()> {
        let mut enquiries = self.enquiries.write().await;
        if !enquiries.contains_key(&enquiry.id) {
            return Err(RepositoryError::enquiry_not_found(&enquiry.id));
        }
        enquiries.insert(enquiry.id.clone(), enquiry.clone());
        Ok(())
    }
}

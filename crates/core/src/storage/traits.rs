use async_trait::async_trait;

use crate::{car::Car, enquiry::Enquiry, filter::CarFilter, RecordId};

use super::Result;

/// Repository for car listings.
#[async_trait]
pub trait CarRepository: Send + Sync {
    /// Lists the cars matching `filter`, most recently created first.
    async fn list_cars(&self, filter: &CarFilter) -> Result<Vec<Car>>;

    /// Gets a car by its ID.
    async fn get_car(&self, id: &RecordId) -> Result<Option<Car>>;

    /// Gets the car holding `vin`, if any.
    async fn find_car_by_vin(&self, vin: &str) -> Result<Option<Car>>;

    /// Creates a new car. A VIN collision is `AlreadyExists`.
    async fn create_car(&self, car: &Car) -> Result<()>;

    /// Replaces an existing car. A missing car is `NotFound`.
    async fn update_car(&self, car: &Car) -> Result<()>;

    /// Deletes a car by its ID. A missing car is `NotFound`.
    async fn delete_car(&self, id: &RecordId) -> Result<()>;

    /// Number of stored cars.
    async fn count_cars(&self) -> Result<u64>;
}

/// Repository for customer enquiries.
#[async_trait]
pub trait EnquiryRepository: Send + Sync {
    /// Lists all enquiries, most recently created first.
    async fn list_enquiries(&self) -> Result<Vec<Enquiry>>;

    /// Gets an enquiry by its ID.
    async fn get_enquiry(&self, id: &RecordId) -> Result<Option<Enquiry>>;

    /// Creates a new enquiry.
    async fn create_enquiry(&self, enquiry: &Enquiry) -> Result<()>;

    /// Replaces an existing enquiry. A missing enquiry is `NotFound`.
    async fn update_enquiry(&self, enquiry: &Enquiry) -> Result<()>;
}

use std::{collections::HashMap, sync::Arc};

use chrono::Utc;
use garage_core::{
    car::Car,
    enquiry::{Enquiry, EnquiryWithCar, NewEnquiry, UpdateEnquiryStatus},
    storage::{CarRepository, EnquiryRepository, RepositoryError},
    RecordId,
};

use super::ServiceError;

/// Customer enquiries and their status workflow.
#[derive(Clone)]
pub struct EnquiryService {
    enquiries: Arc<dyn EnquiryRepository>,
    cars: Arc<dyn CarRepository>,
}

impl EnquiryService {
    pub fn new(enquiries: Arc<dyn EnquiryRepository>, cars: Arc<dyn CarRepository>) -> Self {
        Self { enquiries, cars }
    }

    /// Records a new enquiry in status `new`.
    ///
    /// The car id format is checked before the store is touched.
    pub async fn create(&self, request: NewEnquiry) -> Result<Enquiry, ServiceError> {
        let enquiry = request.into_enquiry(Utc::now())?;

        if self.cars.get_car(&enquiry.car_id).await?.is_none() {
            return Err(ServiceError::UnknownCar(enquiry.car_id));
        }

        self.enquiries.create_enquiry(&enquiry).await?;

        tracing::info!(enquiry_id = %enquiry.id, car_id = %enquiry.car_id, "Enquiry submitted");
        Ok(enquiry)
    }

    /// Every enquiry, newest first, with its car expanded.
    pub async fn list(&self) -> Result<Vec<EnquiryWithCar>, ServiceError> {
        let enquiries = self.enquiries.list_enquiries().await?;

        let mut cars: HashMap<RecordId, Option<Car>> = HashMap::new();
        let mut expanded = Vec::with_capacity(enquiries.len());
        for enquiry in enquiries {
            let car = match cars.get(&enquiry.car_id) {
                Some(car) => car.clone(),
                None => {
                    let car = self.cars.get_car(&enquiry.car_id).await?;
                    cars.insert(enquiry.car_id.clone(), car.clone());
                    car
                }
            };
            expanded.push(EnquiryWithCar::new(enquiry, car));
        }

        Ok(expanded)
    }

    pub async fn get(&self, id: &RecordId) -> Result<EnquiryWithCar, ServiceError> {
        let enquiry = self.find(id).await?;
        self.expand(enquiry).await
    }

    /// Moves an enquiry to a new status and returns it with its car expanded.
    pub async fn update_status(
        &self,
        id: &RecordId,
        request: UpdateEnquiryStatus,
    ) -> Result<EnquiryWithCar, ServiceError> {
        let status = request.into_status()?;
        let mut enquiry = self.find(id).await?;

        enquiry.set_status(status, Utc::now());
        self.enquiries.update_enquiry(&enquiry).await?;

        tracing::info!(enquiry_id = %enquiry.id, status = %status, "Enquiry status updated");
        self.expand(enquiry).await
    }

    async fn find(&self, id: &RecordId) -> Result<Enquiry, ServiceError> {
        self.enquiries
            .get_enquiry(id)
            .await?
            .ok_or_else(|| RepositoryError::enquiry_not_found(id).into())
    }

    async fn expand(&self, enquiry: Enquiry) -> Result<EnquiryWithCar, ServiceError> {
        let car = self.cars.get_car(&enquiry.car_id).await?;
        Ok(EnquiryWithCar::new(enquiry, car))
    }
}

#[cfg(test)]
mod tests {
    use garage_core::{
        car::demo_cars,
        enquiry::{CarRef, EnquiryError, EnquiryStatus},
        filter::CarFilter,
    };

    use super::*;
    use crate::storage::InMemoryRepository;

    async fn setup() -> (EnquiryService, Arc<InMemoryRepository>, Car) {
        let repo = Arc::new(InMemoryRepository::new());
        let car = demo_cars(Utc::now()).remove(0);
        repo.create_car(&car).await.unwrap();
        let service = EnquiryService::new(repo.clone(), repo.clone());
        (service, repo, car)
    }

    fn request(car_id: &str) -> NewEnquiry {
        NewEnquiry {
            car_id: Some(car_id.to_string()),
            name: Some("Ada".to_string()),
            email: Some("ada@example.com".to_string()),
            phone: None,
            message: Some("Is it still available?".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_expands_car() {
        let (service, _, car) = setup().await;

        let enquiry = service.create(request(car.id.as_str())).await.unwrap();
        assert_eq!(enquiry.status, EnquiryStatus::New);

        let fetched = service.get(&enquiry.id).await.unwrap();
        assert_eq!(fetched.car(), Some(&car));
    }

    #[tokio::test]
    async fn test_create_rejects_malformed_car_id_without_writing() {
        let (service, repo, _) = setup().await;

        let err = service.create(request("not-a-valid-id")).await.unwrap_err();

        assert!(matches!(
            err,
            ServiceError::Enquiry(EnquiryError::InvalidCarId)
        ));
        assert!(repo.list_enquiries().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_car() {
        let (service, _, _) = setup().await;

        let err = service
            .create(request(RecordId::new().as_str()))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::UnknownCar(_)));
    }

    #[tokio::test]
    async fn test_update_status() {
        let (service, _, car) = setup().await;
        let enquiry = service.create(request(car.id.as_str())).await.unwrap();

        let updated = service
            .update_status(
                &enquiry.id,
                UpdateEnquiryStatus {
                    status: Some("contacted".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.status, EnquiryStatus::Contacted);
        assert!(updated.updated_at >= enquiry.updated_at);
        assert_eq!(updated.car(), Some(&car));
    }

    #[tokio::test]
    async fn test_update_status_rejects_unknown_value() {
        let (service, _, car) = setup().await;
        let enquiry = service.create(request(car.id.as_str())).await.unwrap();

        let err = service
            .update_status(
                &enquiry.id,
                UpdateEnquiryStatus {
                    status: Some("archived".to_string()),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ServiceError::Enquiry(EnquiryError::InvalidStatus(_))
        ));
    }

    #[tokio::test]
    async fn test_update_status_missing_enquiry_is_not_found() {
        let (service, _, _) = setup().await;

        let err = service
            .update_status(
                &RecordId::new(),
                UpdateEnquiryStatus {
                    status: Some("closed".to_string()),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ServiceError::Repository(RepositoryError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_keeps_enquiries_of_deleted_cars() {
        let (service, repo, car) = setup().await;
        service.create(request(car.id.as_str())).await.unwrap();

        repo.delete_car(&car.id).await.unwrap();
        assert!(repo.list_cars(&CarFilter::default()).await.unwrap().is_empty());

        let enquiries = service.list().await.unwrap();
        assert_eq!(enquiries.len(), 1);
        assert_eq!(enquiries[0].car_id, CarRef::Orphaned(car.id.clone()));
    }
}

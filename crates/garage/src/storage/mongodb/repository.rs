//! MongoDB repository implementation.
//!
//! Implements the repository traits from `garage_core::storage` using the
//! official MongoDB driver.

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::doc;
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, IndexModel};

use garage_core::car::Car;
use garage_core::enquiry::Enquiry;
use garage_core::filter::CarFilter;
use garage_core::storage::{CarRepository, EnquiryRepository, RepositoryError, Result};
use garage_core::RecordId;

use super::conversions::{to_bson_datetime, to_object_id, CarDocument, EnquiryDocument};
use super::error::map_mongo_error;
use super::query::{car_filter_document, newest_first};

/// MongoDB-based repository implementation.
///
/// The driver keeps its own connection pool; one client is shared by every
/// request.
pub struct MongoRepository {
    cars: Collection<CarDocument>,
    enquiries: Collection<EnquiryDocument>,
}

impl MongoRepository {
    /// Connects to `uri` and ensures the indexes exist.
    ///
    /// The database named in the URI wins; `database` is used when the URI
    /// names none.
    pub async fn connect(uri: &str, database: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        let db = client
            .default_database()
            .unwrap_or_else(|| client.database(database));

        tracing::info!(database = %db.name(), "Connected to MongoDB");

        let repo = Self {
            cars: db.collection("cars"),
            enquiries: db.collection("enquiries"),
        };
        repo.ensure_indexes().await?;

        Ok(repo)
    }

    async fn ensure_indexes(&self) -> Result<()> {
        let vin = IndexModel::builder()
            .keys(doc! { "vin": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.cars
            .create_index(vin)
            .await
            .map_err(|e| map_mongo_error(e, "Car", "vin index"))?;

        let created = IndexModel::builder().keys(doc! { "createdAt": -1 }).build();
        self.enquiries
            .create_index(created)
            .await
            .map_err(|e| map_mongo_error(e, "Enquiry", "createdAt index"))?;

        Ok(())
    }
}

// ============================================================================
// CarRepository implementation
// ============================================================================

#[async_trait]
impl CarRepository for MongoRepository {
    async fn list_cars(&self, filter: &CarFilter) -> Result<Vec<Car>> {
        let documents: Vec<CarDocument> = self
            .cars
            .find(car_filter_document(filter))
            .sort(newest_first())
            .await
            .map_err(|e| map_mongo_error(e, "Car", "list"))?
            .try_collect()
            .await
            .map_err(|e| map_mongo_error(e, "Car", "list"))?;

        documents.into_iter().map(CarDocument::into_car).collect()
    }

    async fn get_car(&self, id: &RecordId) -> Result<Option<Car>> {
        let oid = to_object_id(id)?;
        self.cars
            .find_one(doc! { "_id": oid })
            .await
            .map_err(|e| map_mongo_error(e, "Car", id.to_string()))?
            .map(CarDocument::into_car)
            .transpose()
    }

    async fn find_car_by_vin(&self, vin: &str) -> Result<Option<Car>> {
        self.cars
            .find_one(doc! { "vin": vin })
            .await
            .map_err(|e| map_mongo_error(e, "Car", vin))?
            .map(CarDocument::into_car)
            .transpose()
    }

    async fn create_car(&self, car: &Car) -> Result<()> {
        let document = CarDocument::from_car(car)?;
        self.cars
            .insert_one(document)
            .await
            .map_err(|e| map_mongo_error(e, "Car", car.vin.clone()))?;
        Ok(())
    }

    async fn update_car(&self, car: &Car) -> Result<()> {
        let document = CarDocument::from_car(car)?;
        let result = self
            .cars
            .replace_one(doc! { "_id": document.id }, &document)
            .await
            .map_err(|e| map_mongo_error(e, "Car", car.vin.clone()))?;

        if result.matched_count == 0 {
            return Err(RepositoryError::car_not_found(&car.id));
        }
        Ok(())
    }

    async fn delete_car(&self, id: &RecordId) -> Result<()> {
        let oid = to_object_id(id)?;
        let result = self
            .cars
            .delete_one(doc! { "_id": oid })
            .await
            .map_err(|e| map_mongo_error(e, "Car", id.to_string()))?;

        if result.deleted_count == 0 {
            return Err(RepositoryError::car_not_found(id));
        }
        Ok(())
    }

    async fn count_cars(&self) -> Result<u64> {
        self.cars
            .count_documents(doc! {})
            .await
            .map_err(|e| map_mongo_error(e, "Car", "count"))
    }
}

// ============================================================================
// EnquiryRepository implementation
// ============================================================================

#[async_trait]
impl EnquiryRepository for MongoRepository {
    async fn list_enquiries(&self) -> Result<Vec<Enquiry>> {
        let documents: Vec<EnquiryDocument> = self
            .enquiries
            .find(doc! {})
            .sort(newest_first())
            .await
            .map_err(|e| map_mongo_error(e, "Enquiry", "list"))?
            .try_collect()
            .await
            .map_err(|e| map_mongo_error(e, "Enquiry", "list"))?;

        documents
            .into_iter()
            .map(EnquiryDocument::into_enquiry)
            .collect()
    }

    async fn get_enquiry(&self, id: &RecordId) -> Result<Option<Enquiry>> {
        let oid = to_object_id(id)?;
        self.enquiries
            .find_one(doc! { "_id": oid })
            .await
            .map_err(|e| map_mongo_error(e, "Enquiry", id.to_string()))?
            .map(EnquiryDocument::into_enquiry)
            .transpose()
    }

    async fn create_enquiry(&self, enquiry: &Enquiry) -> Result<()> {
        let document = EnquiryDocument::from_enquiry(enquiry)?;
        self.enquiries
            .insert_one(document)
            .await
            .map_err(|e| map_mongo_error(e, "Enquiry", enquiry.id.to_string()))?;
        Ok(())
    }

    async fn update_enquiry(&self, enquiry: &Enquiry) -> Result<()> {
        let oid = to_object_id(&enquiry.id)?;
        let result = self
            .enquiries
            .update_one(
                doc! { "_id": oid },
                doc! { "$set": {
                    "status": enquiry.status.as_str(),
                    "updatedAt": to_bson_datetime(&enquiry.updated_at),
                } },
            )
            .await
            .map_err(|e| map_mongo_error(e, "Enquiry", enquiry.id.to_string()))?;

        if result.matched_count == 0 {
            return Err(RepositoryError::enquiry_not_found(&enquiry.id));
        }
        Ok(())
    }
}

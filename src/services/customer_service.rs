use crate::api::error::AppError;
use crate::entities::{prelude::*, *};
use crate::models::{CreateCustomerRequest, TrackResponse};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use uuid::Uuid;

pub struct CustomerService;

impl CustomerService {
    /// Inserts the customer and its products in one transaction and returns the customer id.
    pub async fn create(
        db: &DatabaseConnection,
        request: CreateCustomerRequest,
    ) -> Result<String, AppError> {
        let request = request.normalize().map_err(AppError::Validation)?;
        let customer = request.customer;
        let customer_id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let txn = db.begin().await.map_err(AppError::Database)?;

        customers::ActiveModel {
            id: Set(customer_id.clone()),
            created_at: Set(customer.created_at.unwrap_or(now)),
            document_number: Set(customer.document_number),
            names: Set(customer.names),
            cell_phone_number: Set(customer.cell_phone_number),
            email: Set(customer.email),
            city: Set(customer.city),
            address: Set(customer.address),
            status: Set(false),
        }
        .insert(&txn)
        .await?;

        let count = request.product_list.len();
        for product in request.product_list {
            products::ActiveModel {
                id: Set(Uuid::new_v4().to_string()),
                created_at: Set(product.created_at.unwrap_or(now)),
                primary_color: Set(product.primary_color),
                second_color: Set(product.second_color),
                chest_width: Set(product.chest_width),
                waist_width: Set(product.waist_width),
                neck_to_hip_height: Set(product.neck_to_hip_height),
                sleeve_length_shirt: Set(product.sleeve_length_shirt),
                sleeve_length_hoodie: Set(product.sleeve_length_hoodie),
                age: Set(product.age),
                height: Set(product.height),
                weight: Set(product.weight),
                shoe_size: Set(product.shoe_size),
                body_type: Set(product.body_type),
                status: Set(product.status),
                customer_id: Set(customer_id.clone()),
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await.map_err(AppError::Database)?;

        tracing::info!("Created customer {} with {} products", customer_id, count);
        Ok(customer_id)
    }

    /// Order progress for `customer_id`. Unknown customers report no products.
    pub async fn track(
        db: &DatabaseConnection,
        customer_id: &str,
    ) -> Result<TrackResponse, AppError> {
        let Some(customer) = Customers::find_by_id(customer_id.trim().to_string())
            .one(db)
            .await?
        else {
            return Ok(track_status(false, 0, 0, false));
        };

        let products = Products::find()
            .filter(products::Column::CustomerId.eq(&customer.id))
            .all(db)
            .await?;
        let rating = Ratings::find()
            .filter(ratings::Column::Owner.eq(&customer.id))
            .one(db)
            .await?
            .is_some();

        let total = products.len() as u64;
        let ready = products.iter().filter(|p| p.status).count() as u64;

        Ok(track_status(customer.status, total, ready, rating))
    }
}

pub fn track_status(completed: bool, total: u64, ready: u64, rating: bool) -> TrackResponse {
    let status = match (total, completed) {
        (0, _) => 0,
        (_, true) => 3,
        _ if ready == total => 2,
        _ => 1,
    };
    TrackResponse {
        total,
        ready,
        status,
        rating,
    }
}

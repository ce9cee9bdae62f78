use crate::api::error::FieldError;
use crate::utils::validation::{FieldRule, MSG_REQUIRED, collect};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInput {
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    pub document_number: String,
    pub names: String,
    pub cell_phone_number: String,
    pub email: String,
    pub city: String,
    pub address: String,
}

impl CustomerInput {
    /// Checks every field and returns the normalized customer, or all
    /// failures at once.
    pub fn normalize(self) -> Result<Self, Vec<FieldError>> {
        let mut errors = Vec::new();

        let document_number = collect(
            "documentNumber",
            FieldRule::DocumentNumber.check(&self.document_number),
            &mut errors,
        );
        let names = collect("names", FieldRule::Word.check(&self.names), &mut errors);
        let cell_phone_number = collect(
            "cellPhoneNumber",
            FieldRule::CellPhoneNumber.check(&self.cell_phone_number),
            &mut errors,
        );
        let email = collect("email", FieldRule::Email.check(&self.email), &mut errors);
        let city = collect("city", FieldRule::Word.check(&self.city), &mut errors);
        let address = collect(
            "address",
            FieldRule::Address.check(&self.address),
            &mut errors,
        );

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Self {
            created_at: self.created_at,
            document_number,
            names,
            cell_phone_number,
            email: email.to_lowercase(),
            city,
            address,
        })
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    pub primary_color: String,
    pub second_color: String,
    pub chest_width: i32,
    pub waist_width: i32,
    pub neck_to_hip_height: i32,
    pub sleeve_length_shirt: i32,
    pub sleeve_length_hoodie: i32,
    pub age: i32,
    pub height: i32,
    pub weight: i32,
    pub shoe_size: i32,
    pub body_type: i32,
    #[serde(default)]
    pub status: bool,
}

impl ProductInput {
    pub fn check(&self, errors: &mut Vec<FieldError>) {
        if self.primary_color.trim().is_empty() {
            errors.push(FieldError::new("primaryColor", MSG_REQUIRED));
        }
        if self.second_color.trim().is_empty() {
            errors.push(FieldError::new("secondColor", MSG_REQUIRED));
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerRequest {
    pub customer: CustomerInput,
    #[serde(default)]
    pub product_list: Vec<ProductInput>,
}

impl CreateCustomerRequest {
    pub fn normalize(self) -> Result<Self, Vec<FieldError>> {
        let mut product_errors = Vec::new();
        for product in &self.product_list {
            product.check(&mut product_errors);
        }

        let customer = match self.customer.normalize() {
            Ok(customer) if product_errors.is_empty() => customer,
            Ok(_) => return Err(product_errors),
            Err(mut errors) => {
                errors.extend(product_errors);
                return Err(errors);
            }
        };

        Ok(Self {
            customer,
            product_list: self.product_list,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateCustomerResponse {
    /// Customer id, used later as the tracking code
    pub hash: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TrackQuery {
    pub track: String,
}

/// Order progress for a customer.
///
/// `status` is 0 when there are no products, 1 while some are pending,
/// 2 once all are ready and 3 after the customer is marked completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct TrackResponse {
    pub total: u64,
    pub ready: u64,
    pub status: u8,
    pub rating: bool,
}

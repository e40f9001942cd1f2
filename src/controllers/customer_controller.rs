use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::dto::customer_dto::{CreateCustomerRequest, UpdateCustomerRequest};
use crate::dto::ApiResponse;
use crate::models::customer::{Customer, CustomerChanges, NewCustomer};
use crate::repositories::CustomerRepository;
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppResult};
use crate::utils::validation::{normalize_email, require_text};

pub struct CustomerController {
    customers: Arc<dyn CustomerRepository>,
}

impl CustomerController {
    pub fn new(state: &AppState) -> Self {
        Self {
            customers: state.customers.clone(),
        }
    }

    pub async fn create(
        &self,
        request: CreateCustomerRequest,
    ) -> AppResult<ApiResponse<Customer>> {
        request.validate()?;

        let customer = self
            .customers
            .create(NewCustomer {
                name: require_text("name", &request.name)?,
                contact_person: request.contact_person,
                email: request.email.as_deref().map(normalize_email),
                phone: request.phone,
                address: request.address,
            })
            .await?;

        tracing::info!("🏢 Customer {} created", customer.id);
        Ok(ApiResponse::success_with_message(customer, "Customer created"))
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Customer> {
        self.customers
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Customer", &id))
    }

    pub async fn list(&self) -> AppResult<Vec<Customer>> {
        self.customers.list().await
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateCustomerRequest,
    ) -> AppResult<ApiResponse<Customer>> {
        request.validate()?;

        let changes = CustomerChanges {
            name: request
                .name
                .as_deref()
                .map(|n| require_text("name", n))
                .transpose()?,
            contact_person: request.contact_person,
            email: request.email.as_deref().map(normalize_email),
            phone: request.phone,
            address: request.address,
        };

        let customer = self
            .customers
            .update(id, changes)
            .await?
            .ok_or_else(|| not_found_error("Customer", &id))?;

        Ok(ApiResponse::success_with_message(customer, "Customer updated"))
    }
}

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::CustomerRepository;
use crate::models::customer::{Customer, CustomerChanges, NewCustomer};
use crate::utils::errors::AppResult;

const CUSTOMER_COLUMNS: &str =
    "id, name, contact_person, email, phone, address, created_at, updated_at";

pub struct PgCustomerRepository {
    pool: PgPool,
}

impl PgCustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CustomerRepository for PgCustomerRepository {
    async fn create(&self, customer: NewCustomer) -> AppResult<Customer> {
        let created = sqlx::query_as::<_, Customer>(&format!(
            r#"
            INSERT INTO customers (id, name, contact_person, email, phone, address, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW(), NOW())
            RETURNING {CUSTOMER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(customer.name)
        .bind(customer.contact_person)
        .bind(customer.email)
        .bind(customer.phone)
        .bind(customer.address)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    async fn list(&self) -> AppResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    async fn update(&self, id: Uuid, changes: CustomerChanges) -> AppResult<Option<Customer>> {
        let updated = sqlx::query_as::<_, Customer>(&format!(
            r#"
            UPDATE customers
            SET name = COALESCE($2, name),
                contact_person = COALESCE($3, contact_person),
                email = COALESCE($4, email),
                phone = COALESCE($5, phone),
                address = COALESCE($6, address),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {CUSTOMER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.name)
        .bind(changes.contact_person)
        .bind(changes.email)
        .bind(changes.phone)
        .bind(changes.address)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }
}

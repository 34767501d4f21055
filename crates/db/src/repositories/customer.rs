//! Customer repository.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use stanza_shared::types::CustomerId;

use crate::entities::customers;

/// Input for inserting a customer.
#[derive(Debug, Clone)]
pub struct NewCustomer {
    /// Required display name.
    pub full_name: String,
    /// Optional unique phone number.
    pub phone_number: Option<String>,
    /// Optional postal address.
    pub address: Option<String>,
    /// Optional unique e-mail address.
    pub email: Option<String>,
}

/// Replacement field set for updating a customer; `created_at` is
/// preserved from the stored row.
#[derive(Debug, Clone)]
pub struct CustomerChanges {
    /// Required display name.
    pub full_name: String,
    /// Optional unique phone number.
    pub phone_number: Option<String>,
    /// Optional postal address.
    pub address: Option<String>,
    /// Optional unique e-mail address.
    pub email: Option<String>,
}

/// Repository for customer queries and writes.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    db: DatabaseConnection,
}

impl CustomerRepository {
    /// Creates a new customer repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a customer by id.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<customers::Model>, DbErr> {
        customers::Entity::find_by_id(id).one(&self.db).await
    }

    /// Lists all customers, oldest first.
    pub async fn list_all(&self) -> Result<Vec<customers::Model>, DbErr> {
        customers::Entity::find()
            .order_by_asc(customers::Column::CreatedAt)
            .all(&self.db)
            .await
    }

    /// Counts all customers.
    pub async fn count(&self) -> Result<u64, DbErr> {
        customers::Entity::find().count(&self.db).await
    }

    /// Finds a customer holding the given e-mail, optionally excluding one
    /// id (uniqueness check on update).
    pub async fn find_by_email(
        &self,
        email: &str,
        exclude: Option<Uuid>,
    ) -> Result<Option<customers::Model>, DbErr> {
        let mut query = customers::Entity::find().filter(customers::Column::Email.eq(email));
        if let Some(id) = exclude {
            query = query.filter(customers::Column::Id.ne(id));
        }
        query.one(&self.db).await
    }

    /// Finds a customer holding the given phone number, optionally
    /// excluding one id.
    pub async fn find_by_phone(
        &self,
        phone_number: &str,
        exclude: Option<Uuid>,
    ) -> Result<Option<customers::Model>, DbErr> {
        let mut query =
            customers::Entity::find().filter(customers::Column::PhoneNumber.eq(phone_number));
        if let Some(id) = exclude {
            query = query.filter(customers::Column::Id.ne(id));
        }
        query.one(&self.db).await
    }

    /// Inserts a new customer.
    pub async fn insert(
        &self,
        conn: &impl ConnectionTrait,
        new: NewCustomer,
    ) -> Result<customers::Model, DbErr> {
        let customer = customers::ActiveModel {
            id: Set(CustomerId::new().into_inner()),
            full_name: Set(new.full_name),
            phone_number: Set(new.phone_number),
            address: Set(new.address),
            email: Set(new.email),
            created_at: Set(Utc::now().into()),
        };

        customer.insert(conn).await
    }

    /// Updates a customer, preserving the creation timestamp.
    pub async fn update(
        &self,
        conn: &impl ConnectionTrait,
        existing: &customers::Model,
        changes: CustomerChanges,
    ) -> Result<customers::Model, DbErr> {
        let customer = customers::ActiveModel {
            id: Set(existing.id),
            full_name: Set(changes.full_name),
            phone_number: Set(changes.phone_number),
            address: Set(changes.address),
            email: Set(changes.email),
            created_at: Set(existing.created_at),
        };

        customer.update(conn).await
    }

    /// Deletes a customer, returning the number of removed rows.
    pub async fn delete(&self, txn: &DatabaseTransaction, id: Uuid) -> Result<u64, DbErr> {
        let result = customers::Entity::delete_by_id(id).exec(txn).await?;
        Ok(result.rows_affected)
    }
}

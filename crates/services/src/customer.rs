//! Customer service and deletion guard.

use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use stanza_core::booking::{check_customer_deletable, validate_customer_name, validate_email};
use stanza_core::ledger::{balances_by_customer, compute_balance, is_overdue};
use stanza_db::entities::{customers, ledger_entries, reservations};
use stanza_db::repositories::customer::{CustomerChanges, NewCustomer};
use stanza_db::repositories::ledger::signed_inputs;
use stanza_db::{CustomerRepository, LedgerEntryRepository, ReservationRepository, UnitOfWork};
use stanza_shared::types::CustomerId;
use stanza_shared::{AppError, AppResult, ServiceResponse};

use crate::{persistence_error, rollback_then};

/// Input for creating a customer.
#[derive(Debug, Clone)]
pub struct CreateCustomerInput {
    /// Required display name.
    pub full_name: String,
    /// Optional unique phone number.
    pub phone_number: Option<String>,
    /// Optional postal address.
    pub address: Option<String>,
    /// Optional unique e-mail address.
    pub email: Option<String>,
}

/// Input for updating a customer.
#[derive(Debug, Clone)]
pub struct UpdateCustomerInput {
    /// Customer to update.
    pub id: Uuid,
    /// Required display name.
    pub full_name: String,
    /// Optional unique phone number.
    pub phone_number: Option<String>,
    /// Optional postal address.
    pub address: Option<String>,
    /// Optional unique e-mail address.
    pub email: Option<String>,
}

/// Customer lifecycle, balance queries, and the deletion guard.
#[derive(Debug, Clone)]
pub struct CustomerService {
    db: DatabaseConnection,
    customers: CustomerRepository,
    reservations: ReservationRepository,
    ledger: LedgerEntryRepository,
}

impl CustomerService {
    /// Creates a customer service over the given connection.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            customers: CustomerRepository::new(db.clone()),
            reservations: ReservationRepository::new(db.clone()),
            ledger: LedgerEntryRepository::new(db.clone()),
            db,
        }
    }

    /// Creates a customer.
    pub async fn create_customer(
        &self,
        input: CreateCustomerInput,
    ) -> ServiceResponse<customers::Model> {
        match self.try_create(input).await {
            Ok(model) => ServiceResponse::created("Customer created successfully", model),
            Err(err) => ServiceResponse::failure(&err),
        }
    }

    /// Updates a customer, preserving the creation timestamp.
    pub async fn update_customer(
        &self,
        input: UpdateCustomerInput,
    ) -> ServiceResponse<customers::Model> {
        match self.try_update(input).await {
            Ok(model) => ServiceResponse::ok("Customer updated successfully", model),
            Err(err) => ServiceResponse::failure(&err),
        }
    }

    /// Deletes a customer once nothing blocks it: no active reservations
    /// and a ledger folding to exactly zero. The ledger cleanup and the
    /// customer row removal are one unit of work.
    pub async fn delete_customer(&self, id: Uuid) -> ServiceResponse<bool> {
        match self.try_delete(id).await {
            Ok(()) => ServiceResponse::ok("Customer deleted successfully", true),
            Err(err) => ServiceResponse::failure(&err),
        }
    }

    /// Returns a customer by id.
    pub async fn get_customer(&self, id: Uuid) -> ServiceResponse<customers::Model> {
        match self.try_get(id).await {
            Ok(model) => ServiceResponse::ok("Customer retrieved successfully", model),
            Err(err) => ServiceResponse::failure(&err),
        }
    }

    /// Lists all customers.
    pub async fn list_customers(&self) -> ServiceResponse<Vec<customers::Model>> {
        match self.customers.list_all().await {
            Ok(models) => ServiceResponse::ok("Customers retrieved successfully", models),
            Err(err) => {
                ServiceResponse::failure(&persistence_error("Failed to retrieve customers", &err))
            }
        }
    }

    /// Counts all customers.
    pub async fn count_customers(&self) -> ServiceResponse<u64> {
        match self.customers.count().await {
            Ok(count) => ServiceResponse::ok("Customer count retrieved successfully", count),
            Err(err) => ServiceResponse::failure(&persistence_error(
                "Failed to retrieve customer count",
                &err,
            )),
        }
    }

    /// Returns a customer's balance, folded from their full ledger.
    pub async fn get_customer_balance(&self, id: Uuid) -> ServiceResponse<Decimal> {
        match self.try_balance(id).await {
            Ok(balance) => ServiceResponse::ok("Customer balance retrieved successfully", balance),
            Err(err) => ServiceResponse::failure(&err),
        }
    }

    /// Returns a customer's most recent ledger entries, newest first.
    pub async fn get_recent_ledger_entries(
        &self,
        id: Uuid,
        count: u64,
    ) -> ServiceResponse<Vec<ledger_entries::Model>> {
        match self.try_recent_entries(id, count).await {
            Ok(entries) => {
                ServiceResponse::ok("Customer ledger entries retrieved successfully", entries)
            }
            Err(err) => ServiceResponse::failure(&err),
        }
    }

    /// Lists all reservations of a customer.
    pub async fn get_customer_reservations(
        &self,
        id: Uuid,
    ) -> ServiceResponse<Vec<reservations::Model>> {
        match self.try_reservations(id).await {
            Ok(models) => {
                ServiceResponse::ok("Customer reservations retrieved successfully", models)
            }
            Err(err) => ServiceResponse::failure(&err),
        }
    }

    /// Lists customers whose derived balance is strictly positive.
    pub async fn get_overdue_customers(&self) -> ServiceResponse<Vec<customers::Model>> {
        match self.try_overdue().await {
            Ok(models) => {
                ServiceResponse::ok("Customers with overdue balance retrieved successfully", models)
            }
            Err(err) => ServiceResponse::failure(&err),
        }
    }

    async fn try_get(&self, id: Uuid) -> AppResult<customers::Model> {
        self.customers
            .find_by_id(id)
            .await
            .map_err(|e| persistence_error("Failed to load customer", &e))?
            .ok_or_else(|| AppError::NotFound("Customer not found".to_string()))
    }

    async fn try_create(&self, input: CreateCustomerInput) -> AppResult<customers::Model> {
        validate_customer_name(&input.full_name)?;
        validate_email(input.email.as_deref())?;

        self.ensure_contact_unique(input.email.as_deref(), input.phone_number.as_deref(), None)
            .await?;

        let customer = self
            .customers
            .insert(
                &self.db,
                NewCustomer {
                    full_name: input.full_name,
                    phone_number: input.phone_number,
                    address: input.address,
                    email: input.email,
                },
            )
            .await
            .map_err(|e| persistence_error("Failed to create customer", &e))?;

        tracing::info!(customer_id = %customer.id, "customer created");
        Ok(customer)
    }

    async fn try_update(&self, input: UpdateCustomerInput) -> AppResult<customers::Model> {
        validate_customer_name(&input.full_name)?;
        validate_email(input.email.as_deref())?;

        let existing = self.try_get(input.id).await?;

        self.ensure_contact_unique(
            input.email.as_deref(),
            input.phone_number.as_deref(),
            Some(existing.id),
        )
        .await?;

        self.customers
            .update(
                &self.db,
                &existing,
                CustomerChanges {
                    full_name: input.full_name,
                    phone_number: input.phone_number,
                    address: input.address,
                    email: input.email,
                },
            )
            .await
            .map_err(|e| persistence_error("Failed to update customer", &e))
    }

    async fn try_delete(&self, id: Uuid) -> AppResult<()> {
        let existing = self.try_get(id).await?;

        let active = self
            .reservations
            .find_active_by_customer(existing.id)
            .await
            .map_err(|e| persistence_error("Failed to load customer reservations", &e))?;

        let entries = self
            .ledger
            .for_customer(existing.id)
            .await
            .map_err(|e| persistence_error("Failed to load customer ledger", &e))?;
        let balance = compute_balance(signed_inputs(&entries));

        check_customer_deletable(active.len(), balance)?;

        let mut uow = UnitOfWork::new(self.db.clone());
        uow.begin().await?;

        match self.write_delete(&uow, existing.id).await {
            Ok(()) => {
                uow.commit().await?;
                tracing::info!(customer_id = %existing.id, "customer deleted");
                Ok(())
            }
            Err(err) => Err(rollback_then(&mut uow, err).await),
        }
    }

    async fn write_delete(&self, uow: &UnitOfWork, customer_id: Uuid) -> AppResult<()> {
        let txn = uow.txn()?;

        self.ledger
            .delete_for_customer(txn, customer_id)
            .await
            .map_err(|e| persistence_error("Failed to delete customer ledger entries", &e))?;

        let deleted = self
            .customers
            .delete(txn, customer_id)
            .await
            .map_err(|e| persistence_error("Failed to delete customer", &e))?;
        if deleted == 0 {
            return Err(AppError::Persistence("Failed to delete customer".to_string()));
        }

        Ok(())
    }

    async fn try_balance(&self, id: Uuid) -> AppResult<Decimal> {
        let existing = self.try_get(id).await?;

        let entries = self
            .ledger
            .for_customer(existing.id)
            .await
            .map_err(|e| persistence_error("Failed to load customer ledger", &e))?;

        Ok(compute_balance(signed_inputs(&entries)))
    }

    async fn try_recent_entries(
        &self,
        id: Uuid,
        count: u64,
    ) -> AppResult<Vec<ledger_entries::Model>> {
        let existing = self.try_get(id).await?;

        self.ledger
            .recent_for_customer(existing.id, count)
            .await
            .map_err(|e| persistence_error("Failed to load customer ledger", &e))
    }

    async fn try_reservations(&self, id: Uuid) -> AppResult<Vec<reservations::Model>> {
        let existing = self.try_get(id).await?;

        self.reservations
            .find_by_customer(existing.id)
            .await
            .map_err(|e| persistence_error("Failed to load customer reservations", &e))
    }

    async fn try_overdue(&self) -> AppResult<Vec<customers::Model>> {
        let customers = self
            .customers
            .list_all()
            .await
            .map_err(|e| persistence_error("Failed to retrieve customers", &e))?;

        let entries = self
            .ledger
            .all()
            .await
            .map_err(|e| persistence_error("Failed to load ledger", &e))?;

        let balances = balances_by_customer(entries.into_iter().map(|e| {
            (
                CustomerId::from_uuid(e.customer_id),
                e.entry_kind.into(),
                e.amount,
            )
        }));

        Ok(customers
            .into_iter()
            .filter(|c| {
                balances
                    .get(&CustomerId::from_uuid(c.id))
                    .copied()
                    .is_some_and(is_overdue)
            })
            .collect())
    }

    async fn ensure_contact_unique(
        &self,
        email: Option<&str>,
        phone_number: Option<&str>,
        exclude: Option<Uuid>,
    ) -> AppResult<()> {
        if let Some(email) = email {
            let holder = self
                .customers
                .find_by_email(email, exclude)
                .await
                .map_err(|e| persistence_error("Failed to check e-mail uniqueness", &e))?;
            if holder.is_some() {
                return Err(AppError::Conflict(
                    "A customer with the same email already exists".to_string(),
                ));
            }
        }

        if let Some(phone) = phone_number {
            let holder = self
                .customers
                .find_by_phone(phone, exclude)
                .await
                .map_err(|e| persistence_error("Failed to check phone uniqueness", &e))?;
            if holder.is_some() {
                return Err(AppError::Conflict(
                    "A customer with the same phone number already exists".to_string(),
                ));
            }
        }

        Ok(())
    }
}

//! Ledger account store: bank and cash accounts with a running balance.
//!
//! Metadata is managed through [`AccountRepository`] methods on `&self`.
//! The balance primitives ([`AccountRepository::get_or_create_cash_account`],
//! [`AccountRepository::apply_delta`], [`AccountRepository::withdraw_checked`])
//! take any connection so they can run inside the caller's transaction.

use chrono::{NaiveDate, Utc};
use khata_core::ledger::{
    AccountKind, CASH_ACCOUNT_NAME, LedgerError, Reconciliation, ensure_sufficient_balance,
    is_valid_ifsc,
};
use rust_decimal::Decimal;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, Statement,
};
use tracing::{debug, info};
use uuid::Uuid;

use super::error::{StoreError, on_unique_violation};
use crate::entities::{accounts, ledger_transactions, sea_orm_active_enums::AccountType};

/// Optional bank details of an account.
#[derive(Debug, Clone, Default)]
pub struct BankDetails {
    /// Account number.
    pub bank_account_no: Option<String>,
    /// IFSC code.
    pub ifsc_code: Option<String>,
    /// Account holder name.
    pub account_holder_name: Option<String>,
    /// UPI id.
    pub upi_id: Option<String>,
    /// Bank name.
    pub bank_name: Option<String>,
    /// Branch name.
    pub branch_name: Option<String>,
}

impl BankDetails {
    /// Trims every field, drops blanks and upper-cases the IFSC code.
    fn normalized(self) -> Result<Self, LedgerError> {
        let clean = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let ifsc_code = clean(self.ifsc_code).map(|code| code.to_ascii_uppercase());
        if let Some(code) = &ifsc_code
            && !is_valid_ifsc(code)
        {
            return Err(LedgerError::InvalidIfscCode(code.clone()));
        }
        Ok(Self {
            bank_account_no: clean(self.bank_account_no),
            ifsc_code,
            account_holder_name: clean(self.account_holder_name),
            upi_id: clean(self.upi_id),
            bank_name: clean(self.bank_name),
            branch_name: clean(self.branch_name),
        })
    }
}

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// Organization ID.
    pub organization_id: Uuid,
    /// User creating the account.
    pub user_id: Uuid,
    /// Display name, unique per organization and kind.
    pub account_name: String,
    /// Bank or cash.
    pub kind: AccountKind,
    /// Opening balance; the current balance starts here.
    pub opening_balance: Decimal,
    /// Date of the opening balance (defaults to today).
    pub as_of_date: Option<NaiveDate>,
    /// Bank metadata.
    pub bank: BankDetails,
}

/// Input for updating account metadata. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateAccountInput {
    /// New display name.
    pub account_name: Option<String>,
    /// New as-of date.
    pub as_of_date: Option<NaiveDate>,
    /// Bank fields to replace.
    pub bank: BankDetails,
}

/// Account repository.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an account whose current balance equals its opening balance.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The name is blank or the IFSC code is malformed
    /// - An account with the same name and kind exists
    pub async fn create(&self, input: CreateAccountInput) -> Result<accounts::Model, StoreError> {
        let account_name = input.account_name.trim().to_string();
        if account_name.is_empty() {
            return Err(LedgerError::MissingField("account_name").into());
        }
        let bank = input.bank.normalized()?;

        let now = Utc::now().into();
        let account = accounts::ActiveModel {
            id: Set(Uuid::now_v7()),
            organization_id: Set(input.organization_id),
            user_id: Set(input.user_id),
            account_name: Set(account_name.clone()),
            account_type: Set(input.kind.into()),
            opening_balance: Set(input.opening_balance),
            current_balance: Set(input.opening_balance),
            as_of_date: Set(input.as_of_date.unwrap_or_else(|| Utc::now().date_naive())),
            bank_account_no: Set(bank.bank_account_no),
            ifsc_code: Set(bank.ifsc_code),
            account_holder_name: Set(bank.account_holder_name),
            upi_id: Set(bank.upi_id),
            bank_name: Set(bank.bank_name),
            branch_name: Set(bank.branch_name),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let account = account
            .insert(&self.db)
            .await
            .map_err(|e| {
                on_unique_violation(e, || LedgerError::DuplicateAccountName(account_name))
            })?;

        info!(
            organization_id = %account.organization_id,
            account_id = %account.id,
            kind = %input.kind,
            "Account created"
        );
        Ok(account)
    }

    /// Lists accounts of an organization, optionally filtered by kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        organization_id: Uuid,
        kind: Option<AccountKind>,
    ) -> Result<Vec<accounts::Model>, DbErr> {
        let mut query = accounts::Entity::find()
            .filter(accounts::Column::OrganizationId.eq(organization_id))
            .order_by_asc(accounts::Column::AccountName);

        if let Some(kind) = kind {
            query = query.filter(accounts::Column::AccountType.eq(AccountType::from(kind)));
        }

        query.all(&self.db).await
    }

    /// Gets an account of the organization.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if it does not exist in this organization.
    pub async fn get(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> Result<accounts::Model, StoreError> {
        Self::find(&self.db, organization_id, id)
            .await?
            .ok_or_else(|| LedgerError::AccountNotFound(id).into())
    }

    /// Updates name, as-of date and bank metadata. The balance is never touched.
    ///
    /// # Errors
    ///
    /// Returns an error if the account is missing, the new name is taken, or
    /// a field fails validation.
    pub async fn update_metadata(
        &self,
        organization_id: Uuid,
        id: Uuid,
        input: UpdateAccountInput,
    ) -> Result<accounts::Model, StoreError> {
        let account = self.get(organization_id, id).await?;
        let bank = input.bank.normalized()?;
        let mut active: accounts::ActiveModel = account.into();

        let mut new_name = None;
        if let Some(name) = input.account_name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(LedgerError::MissingField("account_name").into());
            }
            active.account_name = Set(name.clone());
            new_name = Some(name);
        }
        if let Some(as_of_date) = input.as_of_date {
            active.as_of_date = Set(as_of_date);
        }
        if let Some(v) = bank.bank_account_no {
            active.bank_account_no = Set(Some(v));
        }
        if let Some(v) = bank.ifsc_code {
            active.ifsc_code = Set(Some(v));
        }
        if let Some(v) = bank.account_holder_name {
            active.account_holder_name = Set(Some(v));
        }
        if let Some(v) = bank.upi_id {
            active.upi_id = Set(Some(v));
        }
        if let Some(v) = bank.bank_name {
            active.bank_name = Set(Some(v));
        }
        if let Some(v) = bank.branch_name {
            active.branch_name = Set(Some(v));
        }
        active.updated_at = Set(Utc::now().into());

        active.update(&self.db).await.map_err(|e| {
            on_unique_violation(e, || {
                LedgerError::DuplicateAccountName(new_name.unwrap_or_default())
            })
        })
    }

    /// Deletes an account that has no ledger transactions.
    ///
    /// # Errors
    ///
    /// Returns `AccountHasTransactions` while any transaction references it.
    pub async fn delete(&self, organization_id: Uuid, id: Uuid) -> Result<(), StoreError> {
        let account = self.get(organization_id, id).await?;

        let references = ledger_transactions::Entity::find()
            .filter(ledger_transactions::Column::AccountId.eq(account.id))
            .count(&self.db)
            .await?;
        if references > 0 {
            return Err(LedgerError::AccountHasTransactions(account.id).into());
        }

        accounts::Entity::delete_by_id(account.id)
            .exec(&self.db)
            .await?;
        info!(organization_id = %organization_id, account_id = %id, "Account deleted");
        Ok(())
    }

    /// Replays the account's log on top of its opening balance.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` or a database error.
    pub async fn reconcile(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> Result<Reconciliation, StoreError> {
        let account = self.get(organization_id, id).await?;
        let entries = ledger_transactions::Entity::find()
            .filter(ledger_transactions::Column::AccountId.eq(account.id))
            .all(&self.db)
            .await?;

        Ok(Reconciliation::replay(
            account.id,
            account.opening_balance,
            account.current_balance,
            entries
                .into_iter()
                .map(|e| (e.transaction_type.into(), e.amount)),
        ))
    }

    // ========================================================================
    // Balance primitives (run inside the caller's transaction)
    // ========================================================================

    /// Finds an account scoped to an organization.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find<C: ConnectionTrait>(
        conn: &C,
        organization_id: Uuid,
        id: Uuid,
    ) -> Result<Option<accounts::Model>, DbErr> {
        accounts::Entity::find_by_id(id)
            .filter(accounts::Column::OrganizationId.eq(organization_id))
            .one(conn)
            .await
    }

    async fn find_cash_account<C: ConnectionTrait>(
        conn: &C,
        organization_id: Uuid,
    ) -> Result<Option<accounts::Model>, DbErr> {
        accounts::Entity::find()
            .filter(accounts::Column::OrganizationId.eq(organization_id))
            .filter(accounts::Column::AccountName.eq(CASH_ACCOUNT_NAME))
            .filter(accounts::Column::AccountType.eq(AccountType::Cash))
            .one(conn)
            .await
    }

    /// Returns the organization's cash account, creating it on first use.
    ///
    /// Concurrent first use is resolved by the unique constraint on
    /// `(organization_id, account_name, account_type)`: the losing insert does
    /// nothing and the row is re-fetched.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get_or_create_cash_account<C: ConnectionTrait>(
        conn: &C,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> Result<accounts::Model, StoreError> {
        if let Some(account) = Self::find_cash_account(conn, organization_id).await? {
            return Ok(account);
        }

        let now = Utc::now().into();
        let account = accounts::ActiveModel {
            id: Set(Uuid::now_v7()),
            organization_id: Set(organization_id),
            user_id: Set(user_id),
            account_name: Set(CASH_ACCOUNT_NAME.to_string()),
            account_type: Set(AccountType::Cash),
            opening_balance: Set(Decimal::ZERO),
            current_balance: Set(Decimal::ZERO),
            as_of_date: Set(Utc::now().date_naive()),
            bank_account_no: Set(None),
            ifsc_code: Set(None),
            account_holder_name: Set(None),
            upi_id: Set(None),
            bank_name: Set(None),
            branch_name: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let inserted = accounts::Entity::insert(account)
            .on_conflict(
                OnConflict::columns([
                    accounts::Column::OrganizationId,
                    accounts::Column::AccountName,
                    accounts::Column::AccountType,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(conn)
            .await?;
        if inserted > 0 {
            info!(organization_id = %organization_id, "Cash account created");
        } else {
            debug!(
                organization_id = %organization_id,
                "Cash account created concurrently, re-fetching"
            );
        }

        Self::find_cash_account(conn, organization_id)
            .await?
            .ok_or_else(|| {
                LedgerError::Internal("cash account missing after insert".to_string()).into()
            })
    }

    /// Atomically adds `delta` to the account's balance and returns the new balance.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if no row was updated.
    pub async fn apply_delta<C: ConnectionTrait>(
        conn: &C,
        organization_id: Uuid,
        account_id: Uuid,
        delta: Decimal,
    ) -> Result<Decimal, StoreError> {
        let row = conn
            .query_one(Statement::from_sql_and_values(
                conn.get_database_backend(),
                r"UPDATE accounts
                  SET current_balance = current_balance + $1, updated_at = now()
                  WHERE id = $2 AND organization_id = $3
                  RETURNING current_balance",
                [delta.into(), account_id.into(), organization_id.into()],
            ))
            .await?
            .ok_or(LedgerError::AccountNotFound(account_id))?;

        Ok(row.try_get::<Decimal>("", "current_balance")?)
    }

    /// Atomically subtracts `amount` if the balance covers it.
    ///
    /// The check and the decrement are one statement, so two concurrent
    /// withdrawals cannot both pass against the same balance.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientBalance` or `AccountNotFound`.
    pub async fn withdraw_checked<C: ConnectionTrait>(
        conn: &C,
        organization_id: Uuid,
        account_id: Uuid,
        amount: Decimal,
    ) -> Result<Decimal, StoreError> {
        let row = conn
            .query_one(Statement::from_sql_and_values(
                conn.get_database_backend(),
                r"UPDATE accounts
                  SET current_balance = current_balance - $1, updated_at = now()
                  WHERE id = $2 AND organization_id = $3 AND current_balance >= $1
                  RETURNING current_balance",
                [amount.into(), account_id.into(), organization_id.into()],
            ))
            .await?;

        if let Some(row) = row {
            return Ok(row.try_get::<Decimal>("", "current_balance")?);
        }

        let account = Self::find(conn, organization_id, account_id)
            .await?
            .ok_or(LedgerError::AccountNotFound(account_id))?;
        ensure_sufficient_balance(account_id, account.current_balance, amount)?;
        // The balance was raised between the update and the re-read.
        Err(LedgerError::Internal("conditional withdrawal matched no row".to_string()).into())
    }
}

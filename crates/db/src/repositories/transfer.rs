//! Manual adjustments and transfers between accounts.

use chrono::NaiveDate;
use khata_core::ledger::{
    ExternalBeneficiary, LedgerError, TransactionType, validate_adjustment_type, validate_amount,
    validate_internal_transfer,
};
use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use tracing::info;
use uuid::Uuid;

use super::account::AccountRepository;
use super::error::StoreError;
use super::ledger::{LedgerRepository, NewLedgerTransaction};
use crate::entities::ledger_transactions;

/// Manual add/reduce on one account.
#[derive(Debug, Clone)]
pub struct AdjustmentInput {
    /// Organization ID.
    pub organization_id: Uuid,
    /// Acting user.
    pub user_id: Uuid,
    /// Account to adjust.
    pub account_id: Uuid,
    /// `Add` or `Reduce`.
    pub transaction_type: TransactionType,
    /// Positive amount.
    pub amount: Decimal,
    /// Business date.
    pub transaction_date: NaiveDate,
    /// Description; a default is used when blank.
    pub description: Option<String>,
}

/// Transfer between two accounts of the organization.
#[derive(Debug, Clone)]
pub struct InternalTransferInput {
    /// Organization ID.
    pub organization_id: Uuid,
    /// Acting user.
    pub user_id: Uuid,
    /// Source account.
    pub from_account_id: Uuid,
    /// Destination account.
    pub to_account_id: Uuid,
    /// Positive amount.
    pub amount: Decimal,
    /// Business date.
    pub transaction_date: NaiveDate,
    /// Description; a default is used when blank.
    pub description: Option<String>,
}

/// Transfer to a bank account outside the organization.
#[derive(Debug, Clone)]
pub struct ExternalTransferInput {
    /// Organization ID.
    pub organization_id: Uuid,
    /// Acting user.
    pub user_id: Uuid,
    /// Source account.
    pub from_account_id: Uuid,
    /// Positive amount.
    pub amount: Decimal,
    /// Business date.
    pub transaction_date: NaiveDate,
    /// Description; a default is used when blank.
    pub description: Option<String>,
    /// Beneficiary bank details.
    pub beneficiary: ExternalBeneficiary,
}

/// A single-row balance change.
#[derive(Debug, Clone)]
pub struct AdjustmentResult {
    /// Row written.
    pub transaction: ledger_transactions::Model,
    /// Balance after the change.
    pub new_balance: Decimal,
}

/// Both legs of an internal transfer.
#[derive(Debug, Clone)]
pub struct TransferResult {
    /// `transfer_out` row on the source account.
    pub outgoing: ledger_transactions::Model,
    /// `transfer_in` row on the destination account.
    pub incoming: ledger_transactions::Model,
    /// Source balance after the transfer.
    pub from_balance: Decimal,
    /// Destination balance after the transfer.
    pub to_balance: Decimal,
}

fn description_or(description: Option<String>, fallback: impl FnOnce() -> String) -> String {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .unwrap_or_else(fallback)
}

/// Adjustment and transfer service.
#[derive(Debug, Clone)]
pub struct TransferService {
    db: DatabaseConnection,
}

impl TransferService {
    /// Creates a new transfer service.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Adds money to or removes money from one account.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The type is not `add`/`reduce` or the amount is below 0.01
    /// - The account does not exist
    /// - A reduction exceeds the balance
    pub async fn adjust(&self, input: AdjustmentInput) -> Result<AdjustmentResult, StoreError> {
        validate_adjustment_type(input.transaction_type)?;
        validate_amount(input.amount)?;
        let org = input.organization_id;

        let txn = self.db.begin().await?;

        let account = AccountRepository::find(&txn, org, input.account_id)
            .await?
            .ok_or(LedgerError::AccountNotFound(input.account_id))?;

        let new_balance = match input.transaction_type {
            TransactionType::Reduce => {
                AccountRepository::withdraw_checked(&txn, org, account.id, input.amount).await?
            }
            _ => AccountRepository::apply_delta(&txn, org, account.id, input.amount).await?,
        };

        let description = description_or(input.description, || match input.transaction_type {
            TransactionType::Reduce => format!("Reduce money from {}", account.account_name),
            _ => format!("Add money to {}", account.account_name),
        });
        let transaction = LedgerRepository::append(
            &txn,
            NewLedgerTransaction::new(
                org,
                account.id,
                input.user_id,
                input.transaction_type,
                input.amount,
                input.transaction_date,
                description,
            ),
        )
        .await?;

        txn.commit().await?;

        info!(
            organization_id = %org,
            account_id = %account.id,
            transaction_type = %input.transaction_type,
            amount = %input.amount,
            new_balance = %new_balance,
            "Balance adjusted"
        );

        Ok(AdjustmentResult {
            transaction,
            new_balance,
        })
    }

    /// Moves money between two accounts of the organization.
    ///
    /// Writes a `transfer_out`/`transfer_in` pair that reference each other.
    ///
    /// # Errors
    ///
    /// Returns an error if the accounts are the same or missing, the amount is
    /// below 0.01, or the source balance is insufficient.
    pub async fn transfer_internal(
        &self,
        input: InternalTransferInput,
    ) -> Result<TransferResult, StoreError> {
        validate_internal_transfer(input.from_account_id, input.to_account_id)?;
        validate_amount(input.amount)?;
        let org = input.organization_id;

        let txn = self.db.begin().await?;

        let from = AccountRepository::find(&txn, org, input.from_account_id)
            .await?
            .ok_or(LedgerError::AccountNotFound(input.from_account_id))?;
        let to = AccountRepository::find(&txn, org, input.to_account_id)
            .await?
            .ok_or(LedgerError::AccountNotFound(input.to_account_id))?;

        // Lock rows in id order so opposite transfers cannot deadlock.
        let (from_balance, to_balance) = if from.id < to.id {
            let from_balance =
                AccountRepository::withdraw_checked(&txn, org, from.id, input.amount).await?;
            let to_balance = AccountRepository::apply_delta(&txn, org, to.id, input.amount).await?;
            (from_balance, to_balance)
        } else {
            let to_balance = AccountRepository::apply_delta(&txn, org, to.id, input.amount).await?;
            let from_balance =
                AccountRepository::withdraw_checked(&txn, org, from.id, input.amount).await?;
            (from_balance, to_balance)
        };

        let description = description_or(input.description, || {
            format!("Transfer from {} to {}", from.account_name, to.account_name)
        });

        let mut out_leg = NewLedgerTransaction::new(
            org,
            from.id,
            input.user_id,
            TransactionType::TransferOut,
            input.amount,
            input.transaction_date,
            description.clone(),
        );
        let mut in_leg = NewLedgerTransaction::new(
            org,
            to.id,
            input.user_id,
            TransactionType::TransferIn,
            input.amount,
            input.transaction_date,
            description,
        );
        out_leg.related_account_id = Some(to.id);
        out_leg.related_transaction_id = Some(in_leg.id);
        in_leg.related_account_id = Some(from.id);
        in_leg.related_transaction_id = Some(out_leg.id);

        let (outgoing, incoming) = Self::append_pair(&txn, out_leg, in_leg).await?;

        txn.commit().await?;

        info!(
            organization_id = %org,
            from_account_id = %from.id,
            to_account_id = %to.id,
            amount = %input.amount,
            "Internal transfer"
        );

        Ok(TransferResult {
            outgoing,
            incoming,
            from_balance,
            to_balance,
        })
    }

    /// Sends money to an external bank account.
    ///
    /// # Errors
    ///
    /// Returns an error if beneficiary details are incomplete or the IFSC code
    /// is malformed, the account is missing, or the balance is insufficient.
    pub async fn transfer_external(
        &self,
        input: ExternalTransferInput,
    ) -> Result<AdjustmentResult, StoreError> {
        validate_amount(input.amount)?;
        let beneficiary = input.beneficiary.normalized()?;
        let org = input.organization_id;

        let txn = self.db.begin().await?;

        let from = AccountRepository::find(&txn, org, input.from_account_id)
            .await?
            .ok_or(LedgerError::AccountNotFound(input.from_account_id))?;
        let new_balance =
            AccountRepository::withdraw_checked(&txn, org, from.id, input.amount).await?;

        let description = description_or(input.description, || {
            format!(
                "Transfer to {} ({})",
                beneficiary.account_holder, beneficiary.bank_name
            )
        });
        let mut entry = NewLedgerTransaction::new(
            org,
            from.id,
            input.user_id,
            TransactionType::TransferOut,
            input.amount,
            input.transaction_date,
            description,
        );
        entry.external = Some(beneficiary);

        let transaction = LedgerRepository::append(&txn, entry).await?;

        txn.commit().await?;

        info!(
            organization_id = %org,
            from_account_id = %from.id,
            amount = %input.amount,
            "External transfer"
        );

        Ok(AdjustmentResult {
            transaction,
            new_balance,
        })
    }

    async fn append_pair<C: ConnectionTrait>(
        conn: &C,
        out_leg: NewLedgerTransaction,
        in_leg: NewLedgerTransaction,
    ) -> Result<(ledger_transactions::Model, ledger_transactions::Model), StoreError> {
        let outgoing = LedgerRepository::append(conn, out_leg).await?;
        let incoming = LedgerRepository::append(conn, in_leg).await?;
        Ok((outgoing, incoming))
    }
}

//! Integration tests for adjustments and transfers.

use khata_core::ledger::{ExternalBeneficiary, LedgerError, TransactionType};
use khata_db::entities::sea_orm_active_enums;
use khata_db::repositories::{AdjustmentInput, ExternalTransferInput, InternalTransferInput};
use khata_db::{AccountRepository, StoreError, TransferService};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

mod common;
use common::{Fixture, connect, date};

fn internal(fx: &Fixture, from: Uuid, to: Uuid, amount: Decimal) -> InternalTransferInput {
    InternalTransferInput {
        organization_id: fx.org_id,
        user_id: fx.user_id,
        from_account_id: from,
        to_account_id: to,
        amount,
        transaction_date: date(),
        description: None,
    }
}

fn beneficiary(ifsc: &str) -> ExternalBeneficiary {
    ExternalBeneficiary {
        account_holder: " Asha Traders ".to_string(),
        account_number: "123456789012".to_string(),
        bank_name: "State Bank".to_string(),
        ifsc_code: ifsc.to_string(),
    }
}

#[tokio::test]
async fn test_internal_transfer_moves_money_and_links_rows() {
    let Some(db) = connect().await else { return };
    let fx = Fixture::new(db).await;
    let a = fx.bank_account("A", dec!(300)).await;
    let b = fx.bank_account("B", dec!(50)).await;

    let result = TransferService::new(fx.db.clone())
        .transfer_internal(internal(&fx, a.id, b.id, dec!(100)))
        .await
        .unwrap();

    assert_eq!(result.from_balance, dec!(200));
    assert_eq!(result.to_balance, dec!(150));
    assert_eq!(fx.balance(a.id).await, dec!(200));
    assert_eq!(fx.balance(b.id).await, dec!(150));

    assert_eq!(
        result.outgoing.transaction_type,
        sea_orm_active_enums::TransactionType::TransferOut
    );
    assert_eq!(
        result.incoming.transaction_type,
        sea_orm_active_enums::TransactionType::TransferIn
    );
    assert_eq!(result.outgoing.related_transaction_id, Some(result.incoming.id));
    assert_eq!(result.incoming.related_transaction_id, Some(result.outgoing.id));
    assert_eq!(result.outgoing.related_account_id, Some(b.id));
    assert_eq!(result.incoming.related_account_id, Some(a.id));
    assert_eq!(result.outgoing.description, "Transfer from A to B");
}

#[tokio::test]
async fn test_internal_transfer_rejects_same_account_and_overdraw() {
    let Some(db) = connect().await else { return };
    let fx = Fixture::new(db).await;
    let service = TransferService::new(fx.db.clone());
    let a = fx.bank_account("A", dec!(300)).await;
    let b = fx.bank_account("B", dec!(0)).await;

    let err = service
        .transfer_internal(internal(&fx, a.id, a.id, dec!(10)))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Ledger(LedgerError::SameAccountTransfer)));

    let err = service
        .transfer_internal(internal(&fx, a.id, b.id, dec!(300.01)))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Ledger(LedgerError::InsufficientBalance { .. })
    ));

    let err = service
        .transfer_internal(internal(&fx, a.id, b.id, dec!(0.001)))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Ledger(LedgerError::ZeroAmount)));

    assert_eq!(fx.balance(a.id).await, dec!(300));
    assert_eq!(fx.balance(b.id).await, dec!(0));
    assert_eq!(fx.transaction_count().await, 0);
}

#[tokio::test]
async fn test_opposite_transfers_do_not_deadlock() {
    let Some(db) = connect().await else { return };
    let fx = Fixture::new(db).await;
    let a = fx.bank_account("A", dec!(1000)).await;
    let b = fx.bank_account("B", dec!(1000)).await;

    let tasks = (0..20).map(|i| {
        let service = TransferService::new(fx.db.clone());
        let input = if i % 2 == 0 {
            internal(&fx, a.id, b.id, dec!(10))
        } else {
            internal(&fx, b.id, a.id, dec!(5))
        };
        tokio::spawn(async move { service.transfer_internal(input).await })
    });
    for result in futures::future::join_all(tasks).await {
        result.unwrap().unwrap();
    }

    assert_eq!(fx.balance(a.id).await, dec!(950));
    assert_eq!(fx.balance(b.id).await, dec!(1050));
}

#[tokio::test]
async fn test_external_transfer_validates_ifsc() {
    let Some(db) = connect().await else { return };
    let fx = Fixture::new(db).await;
    let a = fx.bank_account("A", dec!(500)).await;

    let err = TransferService::new(fx.db.clone())
        .transfer_external(ExternalTransferInput {
            organization_id: fx.org_id,
            user_id: fx.user_id,
            from_account_id: a.id,
            amount: dec!(100),
            transaction_date: date(),
            description: None,
            beneficiary: beneficiary("SBIN1234567"),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::Ledger(LedgerError::InvalidIfscCode(_))));
    assert_eq!(fx.balance(a.id).await, dec!(500));
}

#[tokio::test]
async fn test_external_transfer_records_beneficiary() {
    let Some(db) = connect().await else { return };
    let fx = Fixture::new(db).await;
    let a = fx.bank_account("A", dec!(500)).await;

    let result = TransferService::new(fx.db.clone())
        .transfer_external(ExternalTransferInput {
            organization_id: fx.org_id,
            user_id: fx.user_id,
            from_account_id: a.id,
            amount: dec!(120),
            transaction_date: date(),
            description: None,
            beneficiary: beneficiary("sbin0001234"),
        })
        .await
        .unwrap();

    assert_eq!(result.new_balance, dec!(380));
    let row = result.transaction;
    assert!(row.is_external_transfer);
    assert_eq!(row.external_account_holder.as_deref(), Some("Asha Traders"));
    assert_eq!(row.external_ifsc_code.as_deref(), Some("SBIN0001234"));
    assert_eq!(row.related_transaction_id, None);
    assert_eq!(row.description, "Transfer to Asha Traders (State Bank)");
}

#[tokio::test]
async fn test_adjustments_add_and_reduce() {
    let Some(db) = connect().await else { return };
    let fx = Fixture::new(db).await;
    let service = TransferService::new(fx.db.clone());
    let a = fx.bank_account("Petty", dec!(100)).await;

    let adjust = |transaction_type, amount| AdjustmentInput {
        organization_id: fx.org_id,
        user_id: fx.user_id,
        account_id: a.id,
        transaction_type,
        amount,
        transaction_date: date(),
        description: None,
    };

    let added = service
        .adjust(adjust(TransactionType::Add, dec!(40)))
        .await
        .unwrap();
    assert_eq!(added.new_balance, dec!(140));
    assert_eq!(added.transaction.description, "Add money to Petty");

    let err = service
        .adjust(adjust(TransactionType::Reduce, dec!(140.01)))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Ledger(LedgerError::InsufficientBalance { .. })
    ));

    let reduced = service
        .adjust(adjust(TransactionType::Reduce, dec!(140)))
        .await
        .unwrap();
    assert_eq!(reduced.new_balance, dec!(0));

    let err = service
        .adjust(adjust(TransactionType::Expense, dec!(1)))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Ledger(LedgerError::InvalidAdjustmentType(_))
    ));

    let rec = AccountRepository::new(fx.db.clone())
        .reconcile(fx.org_id, a.id)
        .await
        .unwrap();
    assert!(rec.is_consistent());
    assert_eq!(rec.transaction_count, 2);
}

#[tokio::test]
async fn test_account_with_history_cannot_be_deleted() {
    let Some(db) = connect().await else { return };
    let fx = Fixture::new(db).await;
    let repo = AccountRepository::new(fx.db.clone());
    let a = fx.bank_account("A", dec!(10)).await;
    let b = fx.bank_account("B", dec!(0)).await;

    TransferService::new(fx.db.clone())
        .transfer_internal(internal(&fx, a.id, b.id, dec!(10)))
        .await
        .unwrap();

    let err = repo.delete(fx.org_id, a.id).await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::Ledger(LedgerError::AccountHasTransactions(_))
    ));

    let unused = fx.bank_account("Unused", dec!(0)).await;
    repo.delete(fx.org_id, unused.id).await.unwrap();
}

#[tokio::test]
async fn test_duplicate_account_name_conflicts() {
    let Some(db) = connect().await else { return };
    let fx = Fixture::new(db).await;
    fx.bank_account("HDFC Current", dec!(0)).await;

    let err = AccountRepository::new(fx.db.clone())
        .create(khata_db::repositories::CreateAccountInput {
            organization_id: fx.org_id,
            user_id: fx.user_id,
            account_name: "HDFC Current".to_string(),
            kind: khata_core::ledger::AccountKind::Bank,
            opening_balance: Decimal::ZERO,
            as_of_date: None,
            bank: Default::default(),
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Ledger(LedgerError::DuplicateAccountName(_))
    ));
}

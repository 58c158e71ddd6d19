//! Integration tests for stock side effects and all-or-nothing documents.

use khata_core::document::DocumentKind;
use khata_core::ledger::LedgerError;
use khata_db::{DocumentService, StoreError};
use rust_decimal_macros::dec;

mod common;
use common::{Fixture, connect, line};

#[tokio::test]
async fn test_insufficient_stock_rolls_back_everything() {
    let Some(db) = connect().await else { return };
    let fx = Fixture::new(db).await;
    let service = DocumentService::new(fx.db.clone());
    let item = fx.item("Widget", dec!(5)).await;

    let err = service
        .create(fx.document(
            DocumentKind::SalesInvoice,
            line(Some(item.id), dec!(10), dec!(20)),
            dec!(200),
            "Cash",
            None,
        ))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        StoreError::Ledger(LedgerError::InsufficientStock { .. })
    ));
    assert_eq!(fx.stock(item.id).await, dec!(5));
    assert_eq!(fx.transaction_count().await, 0);
    assert!(fx.cash_accounts().await.is_empty());
    let listed = service
        .list(fx.org_id, DocumentKind::SalesInvoice, Default::default())
        .await
        .unwrap();
    assert_eq!(listed.meta.total, 0);
}

#[tokio::test]
async fn test_quantities_are_aggregated_per_item() {
    let Some(db) = connect().await else { return };
    let fx = Fixture::new(db).await;
    let service = DocumentService::new(fx.db.clone());
    let item = fx.item("Bolt", dec!(10)).await;

    // Each line alone fits, together they do not.
    let mut input = fx.document(
        DocumentKind::SalesInvoice,
        line(Some(item.id), dec!(6), dec!(1)),
        dec!(0),
        "Cash",
        None,
    );
    input.lines.push(line(Some(item.id), dec!(6), dec!(1)));

    let err = service.create(input).await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::Ledger(LedgerError::InsufficientStock { .. })
    ));
    assert_eq!(fx.stock(item.id).await, dec!(10));
}

#[tokio::test]
async fn test_purchase_and_sale_move_stock() {
    let Some(db) = connect().await else { return };
    let fx = Fixture::new(db).await;
    let service = DocumentService::new(fx.db.clone());
    let item = fx.item("Rice 25kg", dec!(0)).await;

    service
        .create(fx.document(
            DocumentKind::PurchaseInvoice,
            line(Some(item.id), dec!(40), dec!(900)),
            dec!(0),
            "Cash",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(fx.stock(item.id).await, dec!(40));

    let sale = service
        .create(fx.document(
            DocumentKind::SalesInvoice,
            line(Some(item.id), dec!(15), dec!(1100)),
            dec!(0),
            "Cash",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(fx.stock(item.id).await, dec!(25));

    service
        .create(fx.document(
            DocumentKind::SalesReturn,
            line(Some(item.id), dec!(2), dec!(1100)),
            dec!(0),
            "Cash",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(fx.stock(item.id).await, dec!(27));

    service
        .delete(fx.org_id, sale.record.document.id)
        .await
        .unwrap();
    assert_eq!(fx.stock(item.id).await, dec!(42));
}

#[tokio::test]
async fn test_deleting_purchase_of_sold_stock_is_refused() {
    let Some(db) = connect().await else { return };
    let fx = Fixture::new(db).await;
    let service = DocumentService::new(fx.db.clone());
    let item = fx.item("Lamp", dec!(0)).await;
    let bank = fx.bank_account("Purchases", dec!(5000)).await;

    let purchase = service
        .create(fx.document(
            DocumentKind::PurchaseInvoice,
            line(Some(item.id), dec!(10), dec!(100)),
            dec!(1000),
            "UPI",
            Some(bank.id),
        ))
        .await
        .unwrap();
    service
        .create(fx.document(
            DocumentKind::SalesInvoice,
            line(Some(item.id), dec!(8), dec!(150)),
            dec!(0),
            "Cash",
            None,
        ))
        .await
        .unwrap();

    let err = service
        .delete(fx.org_id, purchase.record.document.id)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Ledger(LedgerError::InsufficientStock { .. })
    ));
    // Rolled back: the payment is still posted and the stock untouched.
    assert_eq!(fx.balance(bank.id).await, dec!(4000));
    assert_eq!(fx.stock(item.id).await, dec!(2));
}

#[tokio::test]
async fn test_unknown_item_is_not_found() {
    let Some(db) = connect().await else { return };
    let fx = Fixture::new(db).await;
    let service = DocumentService::new(fx.db.clone());
    let other = Fixture::new(fx.db.clone()).await;
    let foreign_item = other.item("Elsewhere", dec!(100)).await;

    let err = service
        .create(fx.document(
            DocumentKind::PurchaseInvoice,
            line(Some(foreign_item.id), dec!(1), dec!(1)),
            dec!(0),
            "Cash",
            None,
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Ledger(LedgerError::ItemNotFound(_))));
}

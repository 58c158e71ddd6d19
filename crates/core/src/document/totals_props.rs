//! Property-based tests for document totals and settlement status.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::status::{PaymentStatus, Settlement};
use super::totals::{DocumentAdjustments, LineInput, compute_totals};

fn money() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn quantity() -> impl Strategy<Value = Decimal> {
    (1i64..100_000i64).prop_map(|v| Decimal::new(v, 3))
}

fn percent() -> impl Strategy<Value = Decimal> {
    (0i64..=10_000i64).prop_map(|v| Decimal::new(v, 2))
}

fn line() -> impl Strategy<Value = LineInput> {
    (quantity(), money(), percent(), percent()).prop_map(|(quantity, rate, discount, tax)| {
        LineInput {
            item_id: None,
            description: String::new(),
            quantity,
            rate,
            discount_percent: discount,
            tax_percent: tax,
        }
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Every line satisfies `amount = subtotal - discount + tax`, and the
    /// header satisfies the document total identity.
    #[test]
    fn prop_total_identities(
        lines in proptest::collection::vec(line(), 1..10),
        charges in money(),
    ) {
        let adjustments = DocumentAdjustments {
            discount: Decimal::ZERO,
            additional_charges: charges,
            round_off: Decimal::ZERO,
        };
        let (amounts, totals) = compute_totals(&lines, &adjustments).unwrap();

        for a in &amounts {
            prop_assert_eq!(a.amount, a.subtotal - a.discount + a.tax);
            prop_assert!(a.discount <= a.subtotal);
        }
        let line_sum: Decimal = amounts.iter().map(|a| a.amount).sum();
        prop_assert_eq!(totals.total, line_sum + charges);
        prop_assert_eq!(
            totals.total,
            totals.subtotal - totals.discount
                + totals.tax
                + totals.additional_charges
                + totals.round_off
        );
        prop_assert!(totals.total.scale() <= 4);
    }

    /// Status is fully determined by the balance.
    #[test]
    fn prop_status_matches_balance(total in money(), settled in money()) {
        let s = Settlement::evaluate(total, settled);
        prop_assert!(s.balance >= Decimal::ZERO);
        match s.status {
            PaymentStatus::Paid => prop_assert!(s.balance.is_zero()),
            PaymentStatus::Partial => {
                prop_assert!(settled > Decimal::ZERO);
                prop_assert_eq!(s.balance, total - settled);
            }
            PaymentStatus::Unpaid => {
                prop_assert!(settled.is_zero());
                prop_assert_eq!(s.balance, total);
            }
        }
    }
}

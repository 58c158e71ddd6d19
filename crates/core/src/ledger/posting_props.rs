//! Property-based tests for posting and reversal.
//!
//! Runs postings and reversals against an in-memory account/log model that
//! applies deltas the same way the database layer does.

use std::collections::HashMap;

use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::balance::Reconciliation;
use super::posting::{PostingService, PostingTarget};
use super::reversal::RecordedPosting;
use super::types::TransactionType;

/// Strategy to generate positive decimal amounts (0.01 to 10,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate any transaction type.
fn transaction_type() -> impl Strategy<Value = TransactionType> {
    proptest::sample::select(TransactionType::ALL.to_vec())
}

#[derive(Debug, Clone)]
enum Op {
    Post(usize, TransactionType, Decimal),
    ReverseOldest,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0usize..3, transaction_type(), positive_amount())
            .prop_map(|(account, t, amount)| Op::Post(account, t, amount)),
        1 => Just(Op::ReverseOldest),
    ]
}

/// Minimal model of the account store plus transaction log.
struct Model {
    opening: HashMap<Uuid, Decimal>,
    balances: HashMap<Uuid, Decimal>,
    log: Vec<RecordedPosting>,
}

impl Model {
    fn new(openings: &[(Uuid, Decimal)]) -> Self {
        Self {
            opening: openings.iter().copied().collect(),
            balances: openings.iter().copied().collect(),
            log: Vec::new(),
        }
    }

    fn post(
        &mut self,
        account_id: Uuid,
        transaction_type: TransactionType,
        amount: Decimal,
    ) -> Uuid {
        let recorded = RecordedPosting {
            transaction_id: Uuid::new_v4(),
            account_id,
            transaction_type,
            amount,
        };
        *self.balances.get_mut(&account_id).unwrap() += recorded.applied_delta();
        self.log.push(recorded);
        recorded.transaction_id
    }

    fn reverse(&mut self, transaction_id: Uuid) -> bool {
        let Some(pos) = self.log.iter().position(|p| p.transaction_id == transaction_id) else {
            return false;
        };
        let recorded = self.log.remove(pos);
        *self.balances.get_mut(&recorded.account_id).unwrap() += recorded.inverse_delta();
        true
    }

    fn reconcile(&self, account_id: Uuid) -> Reconciliation {
        Reconciliation::replay(
            account_id,
            self.opening[&account_id],
            self.balances[&account_id],
            self.log
                .iter()
                .filter(|p| p.account_id == account_id)
                .map(|p| (p.transaction_type, p.amount)),
        )
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Balance conservation.
    ///
    /// *For any* sequence of postings and reversals, every account's balance
    /// SHALL equal its opening balance plus the signed sum of its log.
    #[test]
    fn prop_balance_conservation(
        openings in proptest::collection::vec(positive_amount(), 3),
        ops in proptest::collection::vec(op(), 1..60),
    ) {
        let accounts: Vec<(Uuid, Decimal)> =
            openings.into_iter().map(|o| (Uuid::new_v4(), o)).collect();
        let mut model = Model::new(&accounts);

        for op in ops {
            match op {
                Op::Post(index, t, amount) => {
                    model.post(accounts[index].0, t, amount);
                }
                Op::ReverseOldest => {
                    if let Some(first) = model.log.first().map(|p| p.transaction_id) {
                        prop_assert!(model.reverse(first));
                    }
                }
            }
        }

        for (account_id, _) in &accounts {
            let rec = model.reconcile(*account_id);
            prop_assert!(rec.is_consistent(), "drift {} on {}", rec.drift, account_id);
        }
    }

    /// Reversal exactness.
    ///
    /// *For any* posting, reversing it SHALL restore the prior balance and
    /// leave no transaction row for it.
    #[test]
    fn prop_reversal_restores_balance(
        opening in positive_amount(),
        t in transaction_type(),
        amount in positive_amount(),
    ) {
        let account = Uuid::new_v4();
        let mut model = Model::new(&[(account, opening)]);

        let tx = model.post(account, t, amount);
        prop_assert!(model.reverse(tx));

        prop_assert_eq!(model.balances[&account], opening);
        prop_assert!(model.log.is_empty());
        // A second reversal finds nothing and changes nothing.
        prop_assert!(!model.reverse(tx));
        prop_assert_eq!(model.balances[&account], opening);
    }

    /// Edit re-posting.
    ///
    /// *For any* settlement edited from A to B on the same account, the
    /// balance SHALL reflect only B.
    #[test]
    fn prop_edit_reflects_only_new_amount(
        opening in positive_amount(),
        t in transaction_type(),
        a in positive_amount(),
        b in positive_amount(),
    ) {
        let account = Uuid::new_v4();
        let mut model = Model::new(&[(account, opening)]);

        let first = model.post(account, t, a);
        model.reverse(first);
        model.post(account, t, b);

        prop_assert_eq!(model.balances[&account], opening + t.signed_amount(b));
        prop_assert_eq!(model.log.len(), 1);
    }

    /// Direction sign.
    ///
    /// *For any* type and positive amount, the applied delta SHALL have the
    /// magnitude of the amount and the sign of the type's direction.
    #[test]
    fn prop_signed_amount_magnitude(t in transaction_type(), amount in positive_amount()) {
        let signed = t.signed_amount(amount);
        prop_assert_eq!(signed.abs(), amount);
        prop_assert_eq!(signed, t.direction().signed(amount));
        prop_assert_eq!(t.direction().inverse().signed(amount), -signed);
    }

    /// Cash resolution ignores the selected bank account.
    #[test]
    fn prop_cash_mode_never_skips(
        casing in "[cC][aA][sS][hH]",
        amount in positive_amount(),
        bank in proptest::option::of(Just(Uuid::nil())),
    ) {
        let request = super::posting::PostingRequest {
            organization_id: Uuid::nil(),
            user_id: Uuid::nil(),
            payment_mode: super::types::PaymentMode::parse(&casing),
            bank_account_id: bank,
            amount,
            transaction_date: chrono::NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            description: String::new(),
            transaction_type: TransactionType::Add,
            source: None,
        };
        prop_assert_eq!(
            PostingService::resolve_target(&request).unwrap(),
            PostingTarget::CashAccount
        );
    }
}

//! Line and document total arithmetic.
//!
//! All money is rounded to 4 decimal places with Banker's Rounding, the
//! precision of the `NUMERIC(19,4)` columns it is stored in. Every derived
//! figure is computed from already-rounded parts, so the stored identities
//! (`amount = subtotal - discount + tax`, and the document total formula)
//! hold exactly.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ledger::error::LedgerError;

/// Decimal places kept for money.
pub const MONEY_SCALE: u32 = 4;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Magnitudes from here up do not fit `NUMERIC(19,4)`.
const MONEY_LIMIT: i64 = 1_000_000_000_000_000;

/// Rounds a money value to storage precision.
#[must_use]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointNearestEven)
}

/// Rejects a value that cannot be stored in a money column.
///
/// # Errors
///
/// Returns `AmountOutOfRange` naming `field`.
pub fn check_money(field: &'static str, value: Decimal) -> Result<Decimal, LedgerError> {
    if value.abs() >= Decimal::from(MONEY_LIMIT) {
        return Err(LedgerError::AmountOutOfRange(field));
    }
    Ok(value)
}

fn mul(field: &'static str, a: Decimal, b: Decimal) -> Result<Decimal, LedgerError> {
    a.checked_mul(b).ok_or(LedgerError::AmountOutOfRange(field))
}

fn add(field: &'static str, a: Decimal, b: Decimal) -> Result<Decimal, LedgerError> {
    a.checked_add(b).ok_or(LedgerError::AmountOutOfRange(field))
}

fn percent_of(
    field: &'static str,
    base: Decimal,
    percent: Decimal,
) -> Result<Decimal, LedgerError> {
    Ok(round_money(mul(field, base, percent)? / HUNDRED))
}

/// One line of a document as entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineInput {
    /// Inventory item, if the line moves stock.
    #[serde(default)]
    pub item_id: Option<Uuid>,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Quantity (non-negative).
    pub quantity: Decimal,
    /// Unit price (non-negative).
    pub rate: Decimal,
    /// Discount percentage, 0..=100.
    #[serde(default)]
    pub discount_percent: Decimal,
    /// Tax percentage, 0..=100.
    #[serde(default)]
    pub tax_percent: Decimal,
}

/// Computed amounts for one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineAmounts {
    /// `quantity * rate`.
    pub subtotal: Decimal,
    /// `subtotal * discount_percent / 100`.
    pub discount: Decimal,
    /// `subtotal - discount`.
    pub taxable: Decimal,
    /// `taxable * tax_percent / 100`.
    pub tax: Decimal,
    /// `taxable + tax`.
    pub amount: Decimal,
}

impl LineInput {
    /// Validates ranges.
    ///
    /// # Errors
    ///
    /// Returns a validation error for negative quantity/rate, a value too
    /// large to store, or a percentage outside 0..=100.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.quantity < Decimal::ZERO {
            return Err(LedgerError::NegativeField("quantity"));
        }
        if self.rate < Decimal::ZERO {
            return Err(LedgerError::NegativeField("rate"));
        }
        check_money("quantity", self.quantity)?;
        check_money("rate", self.rate)?;
        check_percent("discount_percent", self.discount_percent)?;
        check_percent("tax_percent", self.tax_percent)?;
        Ok(())
    }

    /// Computes this line's amounts.
    ///
    /// # Errors
    ///
    /// Returns `AmountOutOfRange` when a figure cannot be represented or
    /// stored.
    pub fn amounts(&self) -> Result<LineAmounts, LedgerError> {
        let subtotal = round_money(mul("subtotal", self.quantity, self.rate)?);
        let discount = percent_of("discount", subtotal, self.discount_percent)?;
        let taxable = subtotal - discount;
        let tax = percent_of("tax", taxable, self.tax_percent)?;
        let amount = check_money("amount", add("amount", taxable, tax)?)?;
        Ok(LineAmounts {
            subtotal: check_money("subtotal", subtotal)?,
            discount,
            taxable,
            tax,
            amount,
        })
    }
}

fn check_percent(field: &'static str, value: Decimal) -> Result<(), LedgerError> {
    if value < Decimal::ZERO || value > HUNDRED {
        return Err(LedgerError::InvalidPercentage { field, value });
    }
    Ok(())
}

/// Document-level adjustments applied after the lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentAdjustments {
    /// Flat discount on the whole document (non-negative).
    #[serde(default)]
    pub discount: Decimal,
    /// Freight, packing and similar charges (non-negative).
    #[serde(default)]
    pub additional_charges: Decimal,
    /// Rounding adjustment, may be negative.
    #[serde(default)]
    pub round_off: Decimal,
}

/// Header totals of a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTotals {
    /// Sum of line subtotals.
    pub subtotal: Decimal,
    /// Line discounts plus the document discount.
    pub discount: Decimal,
    /// Sum of line taxes.
    pub tax: Decimal,
    /// Additional charges.
    pub additional_charges: Decimal,
    /// Rounding adjustment.
    pub round_off: Decimal,
    /// `subtotal - discount + tax + additional_charges + round_off`.
    pub total: Decimal,
}

impl DocumentTotals {
    /// Totals for a payment that has no lines: the amount is the total.
    #[must_use]
    pub fn flat(amount: Decimal) -> Self {
        let amount = round_money(amount);
        Self {
            subtotal: amount,
            total: amount,
            ..Self::default()
        }
    }
}

/// Computes per-line amounts and header totals.
///
/// # Errors
///
/// Returns a validation error when a line is invalid, a document adjustment is
/// negative or too large, or the resulting total is negative or too large.
pub fn compute_totals(
    lines: &[LineInput],
    adjustments: &DocumentAdjustments,
) -> Result<(Vec<LineAmounts>, DocumentTotals), LedgerError> {
    if adjustments.discount < Decimal::ZERO {
        return Err(LedgerError::NegativeField("discount"));
    }
    if adjustments.additional_charges < Decimal::ZERO {
        return Err(LedgerError::NegativeField("additional_charges"));
    }
    check_money("discount", adjustments.discount)?;
    check_money("additional_charges", adjustments.additional_charges)?;
    check_money("round_off", adjustments.round_off)?;

    let mut amounts = Vec::with_capacity(lines.len());
    let mut totals = DocumentTotals {
        additional_charges: round_money(adjustments.additional_charges),
        round_off: round_money(adjustments.round_off),
        ..DocumentTotals::default()
    };

    for line in lines {
        line.validate()?;
        let line_amounts = line.amounts()?;
        let subtotal = add("subtotal", totals.subtotal, line_amounts.subtotal)?;
        totals.subtotal = check_money("subtotal", subtotal)?;
        totals.discount = add("discount", totals.discount, line_amounts.discount)?;
        totals.tax = check_money("tax", add("tax", totals.tax, line_amounts.tax)?)?;
        amounts.push(line_amounts);
    }

    // Every operand is below the storage limit, so these cannot overflow.
    totals.discount += round_money(adjustments.discount);
    totals.total = totals.subtotal - totals.discount
        + totals.tax
        + totals.additional_charges
        + totals.round_off;

    if totals.total < Decimal::ZERO {
        return Err(LedgerError::NegativeField("total"));
    }
    check_money("total", totals.total)?;

    Ok((amounts, totals))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(quantity: Decimal, rate: Decimal, discount: Decimal, tax: Decimal) -> LineInput {
        LineInput {
            item_id: None,
            description: "Widget".to_string(),
            quantity,
            rate,
            discount_percent: discount,
            tax_percent: tax,
        }
    }

    #[test]
    fn test_line_amounts() {
        let amounts = line(dec!(10), dec!(100), dec!(10), dec!(18)).amounts().unwrap();
        assert_eq!(amounts.subtotal, dec!(1000));
        assert_eq!(amounts.discount, dec!(100));
        assert_eq!(amounts.taxable, dec!(900));
        assert_eq!(amounts.tax, dec!(162));
        assert_eq!(amounts.amount, dec!(1062));
    }

    #[test]
    fn test_document_totals() {
        let lines = vec![
            line(dec!(10), dec!(100), dec!(10), dec!(18)),
            line(dec!(2), dec!(50), dec!(0), dec!(5)),
        ];
        let adjustments = DocumentAdjustments {
            discount: dec!(12),
            additional_charges: dec!(40),
            round_off: dec!(-0.5),
        };

        let (amounts, totals) = compute_totals(&lines, &adjustments).unwrap();

        assert_eq!(amounts.len(), 2);
        assert_eq!(totals.subtotal, dec!(1100));
        assert_eq!(totals.discount, dec!(112));
        assert_eq!(totals.tax, dec!(167));
        assert_eq!(totals.total, dec!(1194.5));
    }

    #[test]
    fn test_rounding_is_bankers() {
        // 3 * 0.00005 = 0.00015 -> 0.0002 (nearest even)
        let amounts = line(dec!(3), dec!(0.00005), dec!(0), dec!(0)).amounts().unwrap();
        assert_eq!(amounts.subtotal, dec!(0.0002));
        assert_eq!(round_money(dec!(0.00025)), dec!(0.0002));
    }

    #[test]
    fn test_rejects_invalid_percent() {
        let lines = vec![line(dec!(1), dec!(10), dec!(101), dec!(0))];
        let err = compute_totals(&lines, &DocumentAdjustments::default()).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InvalidPercentage { field: "discount_percent", .. }
        ));
    }

    #[test]
    fn test_rejects_negative_quantity() {
        let lines = vec![line(dec!(-1), dec!(10), dec!(0), dec!(0))];
        let err = compute_totals(&lines, &DocumentAdjustments::default()).unwrap_err();
        assert!(matches!(err, LedgerError::NegativeField("quantity")));
    }

    #[test]
    fn test_rejects_negative_total() {
        let lines = vec![line(dec!(1), dec!(10), dec!(0), dec!(0))];
        let adjustments = DocumentAdjustments {
            discount: dec!(11),
            ..DocumentAdjustments::default()
        };
        let err = compute_totals(&lines, &adjustments).unwrap_err();
        assert!(matches!(err, LedgerError::NegativeField("total")));
    }

    #[test]
    fn test_huge_line_is_rejected_without_panicking() {
        let huge = dec!(100000000000000000000);
        let lines = vec![line(huge, huge, dec!(0), dec!(18))];
        let err = compute_totals(&lines, &DocumentAdjustments::default()).unwrap_err();
        assert!(matches!(err, LedgerError::AmountOutOfRange("quantity")));

        // Each factor fits a column, the product does not.
        let lines = vec![line(dec!(999999999999), dec!(999999999999), dec!(0), dec!(0))];
        let err = compute_totals(&lines, &DocumentAdjustments::default()).unwrap_err();
        assert_eq!(err.http_status_code(), 400);
        assert!(matches!(err, LedgerError::AmountOutOfRange("amount" | "subtotal")));
    }

    #[test]
    fn test_lines_summing_past_the_limit_are_rejected() {
        let big = line(dec!(1), dec!(600000000000000), dec!(0), dec!(0));
        let lines = vec![big.clone(), big];
        let err = compute_totals(&lines, &DocumentAdjustments::default()).unwrap_err();
        assert!(matches!(err, LedgerError::AmountOutOfRange("subtotal")));
    }

    #[test]
    fn test_check_money_bounds() {
        let largest = dec!(999999999999999.9999);
        assert_eq!(check_money("amount", largest).unwrap(), largest);
        assert!(check_money("amount", dec!(1000000000000000)).is_err());
        assert!(check_money("round_off", dec!(-1000000000000000)).is_err());
    }

    #[test]
    fn test_flat_totals() {
        let totals = DocumentTotals::flat(dec!(200));
        assert_eq!(totals.total, dec!(200));
        assert_eq!(totals.tax, Decimal::ZERO);
    }
}

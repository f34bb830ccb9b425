//! Subtotal, VAT and total reconciliation.
//!
//! Declared amounts are always kept verbatim. Missing ones are derived from
//! the declared ones, or from the line items when nothing is declared.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::document::LineItem;

/// Where the totals of a document came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TotalsSource {
    /// All three amounts are printed on the document.
    Declared,
    /// Some amounts are printed, the others derived from them.
    PartiallyDerived,
    /// Nothing printed; computed from the line items.
    #[default]
    ComputedFromItems,
}

/// Amounts printed on the document, if any.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeclaredTotals {
    pub subtotal: Option<Decimal>,
    pub vat: Option<Decimal>,
    pub total: Option<Decimal>,
}

impl DeclaredTotals {
    pub fn is_empty(&self) -> bool {
        self.subtotal.is_none() && self.vat.is_none() && self.total.is_none()
    }
}

/// Reconciled totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Totals {
    pub subtotal: Decimal,
    pub vat: Decimal,
    pub total: Decimal,
    pub source: TotalsSource,
}

impl Totals {
    /// Whether `subtotal + vat` matches `total` within one cent.
    pub fn is_consistent(&self) -> bool {
        self.subtotal
            .checked_add(self.vat)
            .and_then(|sum| sum.checked_sub(self.total))
            .is_some_and(|diff| diff.abs() <= Decimal::new(1, 2))
    }
}

fn money(value: Decimal) -> Decimal {
    value.round_dp(2)
}

/// Sum of the line item totals, `None` on overflow.
pub fn items_subtotal(items: &[LineItem]) -> Option<Decimal> {
    items
        .iter()
        .try_fold(Decimal::ZERO, |sum, item| sum.checked_add(item.total))
}

/// Fill in the missing amounts. `None` when the arithmetic overflows.
fn derive(
    items: &[LineItem],
    declared: &DeclaredTotals,
    vat_rate: Decimal,
) -> Option<(Decimal, Decimal, Decimal)> {
    let vat_of = |subtotal: Decimal| subtotal.checked_mul(vat_rate).map(money);

    let amounts = match (declared.subtotal, declared.vat, declared.total) {
        (Some(s), Some(v), Some(t)) => (s, v, t),
        (Some(s), Some(v), None) => (s, v, s.checked_add(v)?),
        (Some(s), None, Some(t)) => (s, t.checked_sub(s)?, t),
        (None, Some(v), Some(t)) => (t.checked_sub(v)?, v, t),
        (Some(s), None, None) => {
            let v = vat_of(s)?;
            (s, v, s.checked_add(v)?)
        }
        (None, Some(v), None) => {
            let s = if vat_rate.is_zero() {
                money(items_subtotal(items)?)
            } else {
                money(v.checked_div(vat_rate)?)
            };
            (s, v, s.checked_add(v)?)
        }
        (None, None, Some(t)) => {
            let s = money(t.checked_div(Decimal::ONE.checked_add(vat_rate)?)?);
            (s, t.checked_sub(s)?, t)
        }
        (None, None, None) => {
            let s = money(items_subtotal(items)?);
            let v = vat_of(s)?;
            (s, v, s.checked_add(v)?)
        }
    };

    Some(amounts)
}

/// Reconcile declared amounts with the line items.
///
/// `vat_rate` is a fraction (0.22 for 22%). When deriving an amount would
/// overflow, declared amounts are kept and the missing ones are left at zero.
pub fn reconcile(items: &[LineItem], declared: &DeclaredTotals, vat_rate: Decimal) -> Totals {
    let (subtotal, vat, total) = derive(items, declared, vat_rate).unwrap_or_else(|| {
        warn!("Totals overflow, keeping declared amounts only");
        (
            declared.subtotal.unwrap_or_default(),
            declared.vat.unwrap_or_default(),
            declared.total.unwrap_or_default(),
        )
    });

    let source = match (declared.subtotal, declared.vat, declared.total) {
        (Some(_), Some(_), Some(_)) => TotalsSource::Declared,
        (None, None, None) => TotalsSource::ComputedFromItems,
        _ => TotalsSource::PartiallyDerived,
    };

    let totals = Totals {
        subtotal,
        vat,
        total,
        source,
    };

    if totals.source == TotalsSource::Declared && !totals.is_consistent() {
        warn!(
            "Declared totals do not add up: {} + {} != {}",
            totals.subtotal, totals.vat, totals.total
        );
    }

    debug!(
        "Totals ({:?}): subtotal {} vat {} total {}",
        totals.source, totals.subtotal, totals.vat, totals.total
    );

    totals
}

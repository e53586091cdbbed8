//! Prices are stored as whole cents so amounts survive a save exactly.

/// Largest storable price, in cents.
pub const MAX_PRICE_CENTS: i64 = 1_000_000_000_000;

/// Convert a decimal amount to cents, rounding half away from zero.
///
/// Returns `None` for non-finite, negative or out-of-range amounts.
///
/// ```rust
/// use warrantree::domain::money::cents_from_amount;
///
/// assert_eq!(cents_from_amount(899.99), Some(89_999));
/// assert_eq!(cents_from_amount(-1.0), None);
/// ```
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn cents_from_amount(amount: f64) -> Option<i64> {
    let cents = (amount * 100.0).round();
    if !cents.is_finite() || cents < 0.0 || cents > MAX_PRICE_CENTS as f64 {
        return None;
    }
    Some(cents as i64)
}

#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn amount_from_cents(cents: i64) -> f64 {
    cents as f64 / 100.0
}

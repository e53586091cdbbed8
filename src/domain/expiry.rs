//! Warranty expiry arithmetic.
//!
//! All predicates take "today" as an argument; callers obtain it from a
//! [`Clock`] at the moment of the call. Nothing here touches `Item.status`.

use chrono::{Duration, Local, Months, NaiveDate};

/// Source of the current date.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local calendar date of the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock pinned to one date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Purchase date plus `warranty_months` calendar months, with the day clamped
/// to the end of the target month (Jan 31 + 1 month = Feb 28/29).
///
/// Absent or non-positive durations mean "no warranty".
#[must_use]
pub fn derive_expiry(purchase_date: NaiveDate, warranty_months: Option<i32>) -> Option<NaiveDate> {
    let months = u32::try_from(warranty_months?).ok().filter(|m| *m > 0)?;
    purchase_date.checked_add_months(Months::new(months))
}

#[must_use]
pub fn is_expired(expiry: Option<NaiveDate>, today: NaiveDate) -> bool {
    expiry.is_some_and(|e| e < today)
}

/// Not yet expired, and expiring strictly before `today + days`.
#[must_use]
pub fn is_expiring_soon(expiry: Option<NaiveDate>, today: NaiveDate, days: i64) -> bool {
    let Some(expiry) = expiry else {
        return false;
    };
    // Windows past the calendar range saturate at its ends.
    let horizon = Duration::try_days(days)
        .and_then(|d| today.checked_add_signed(d))
        .unwrap_or(if days < 0 { NaiveDate::MIN } else { NaiveDate::MAX });

    expiry < horizon && !is_expired(Some(expiry), today)
}

/// Signed day distance from today to expiry; negative once expired.
#[must_use]
pub fn days_until_expiry(expiry: Option<NaiveDate>, today: NaiveDate) -> Option<i64> {
    expiry.map(|e| (e - today).num_days())
}

#[must_use]
pub fn reminder_due_date(expiry: NaiveDate, lead_days: i32) -> Option<NaiveDate> {
    expiry.checked_sub_signed(Duration::days(i64::from(lead_days)))
}

/// A reminder fires once its due date is reached, while the item still has
/// an unexpired warranty.
#[must_use]
pub fn is_reminder_due(
    expiry: Option<NaiveDate>,
    lead_days: i32,
    active: bool,
    today: NaiveDate,
) -> bool {
    if !active || is_expired(expiry, today) {
        return false;
    }
    expiry
        .and_then(|e| reminder_due_date(e, lead_days))
        .is_some_and(|due| today >= due)
}

/// Derived flags attached to item views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryFlags {
    pub is_expired: bool,
    pub is_expiring_soon: bool,
    pub days_until_expiry: Option<i64>,
}

impl ExpiryFlags {
    #[must_use]
    pub fn evaluate(expiry: Option<NaiveDate>, today: NaiveDate, window_days: i64) -> Self {
        Self {
            is_expired: is_expired(expiry, today),
            is_expiring_soon: is_expiring_soon(expiry, today, window_days),
            days_until_expiry: days_until_expiry(expiry, today),
        }
    }
}

use chrono::{NaiveDate, TimeDelta};
use serde_derive::{Deserialize, Serialize};

/// Every 10 points are worth one currency unit of discount.
pub const POINTS_PER_CURRENCY_UNIT: i64 = 10;
/// Balances below this cannot be redeemed.
pub const MIN_REDEEMABLE_POINTS: i64 = 10;
/// Discount never exceeds this share of the base price.
pub const MAX_DISCOUNT_SHARE: f64 = 0.5;
/// One point is earned per this many currency units paid.
pub const CURRENCY_PER_EARNED_POINT: f64 = 10.0;

pub const INVALID_RANGE_MSG: &str = "End date must be after start date";

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingQuote {
    pub duration_days: i64,
    pub base_price: f64,
    pub points_value: i64,
    pub discount: f64,
    pub total: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BookingQuote {
    fn invalid() -> Self {
        BookingQuote {
            duration_days: 0,
            base_price: 0.0,
            points_value: 0,
            discount: 0.0,
            total: 0.0,
            error: Some(String::from(INVALID_RANGE_MSG)),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LoyaltyUpdate {
    pub points_spent: i64,
    pub points_earned: i64,
    pub new_balance: i64,
}

pub fn billable_days_count(raw_duration: TimeDelta) -> i64 {
    // Partial days round up to a full day
    (raw_duration.num_seconds() as f64 / 86_400.0).ceil() as i64
}

pub fn compute_booking(
    price_per_day: f64,
    start_date: NaiveDate,
    end_date: NaiveDate,
    loyalty_points: i64,
    use_points: bool,
) -> BookingQuote {
    let duration_days = billable_days_count(end_date - start_date);
    if duration_days <= 0 {
        return BookingQuote::invalid();
    }
    let base_price = duration_days as f64 * price_per_day;

    let points_value = loyalty_points.max(0).div_euclid(POINTS_PER_CURRENCY_UNIT);
    let discount = if use_points && loyalty_points >= MIN_REDEEMABLE_POINTS {
        (points_value as f64).min(base_price * MAX_DISCOUNT_SHARE)
    } else {
        0.0
    };

    BookingQuote {
        duration_days,
        base_price,
        points_value,
        discount,
        total: base_price - discount,
        error: None,
    }
}

pub fn loyalty_update(loyalty_points: i64, quote: &BookingQuote) -> LoyaltyUpdate {
    let points_spent = (quote.discount * POINTS_PER_CURRENCY_UNIT as f64).round() as i64;
    let points_earned = (quote.total / CURRENCY_PER_EARNED_POINT).floor() as i64;
    LoyaltyUpdate {
        points_spent,
        points_earned,
        new_balance: loyalty_points - points_spent + points_earned,
    }
}

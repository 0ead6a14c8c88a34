use chrono::{DateTime, Duration, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

string_enum! {
    /// Marketing tier of a customer within one shop.
    Segment ("segment") {
        New => "new",
        Regular => "regular",
        Vip => "vip",
        Inactive => "inactive",
    }
}

pub const VIP_MIN_ORDERS: i32 = 10;
pub const VIP_MIN_SPENT: i64 = 10_000;
pub const REGULAR_MIN_ORDERS: i32 = 3;
pub const INACTIVE_AFTER_DAYS: i64 = 90;

/// Re-evaluates a customer's segment from its aggregates.
///
/// The checks run in a fixed order: no orders is always `new`, then `vip`
/// beats `regular`. Only customers below the `regular` threshold can become
/// `inactive`; otherwise they keep `current`.
pub fn evaluate_segment(
    current: Segment,
    total_orders: i32,
    total_spent: Decimal,
    last_order_date: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Segment {
    if total_orders == 0 {
        return Segment::New;
    }
    if total_orders >= VIP_MIN_ORDERS || total_spent >= Decimal::from(VIP_MIN_SPENT) {
        return Segment::Vip;
    }
    if total_orders >= REGULAR_MIN_ORDERS {
        return Segment::Regular;
    }
    match last_order_date {
        Some(last) if last < now - Duration::days(INACTIVE_AFTER_DAYS) => Segment::Inactive,
        _ => current,
    }
}

/// `round(total_spent / total_orders)`, half away from zero; zero without orders.
pub fn average_order_value(total_spent: Decimal, total_orders: i32) -> Decimal {
    if total_orders <= 0 {
        return Decimal::ZERO;
    }
    (total_spent / Decimal::from(total_orders))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Aggregate fields kept on every customer row.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerTotals {
    pub total_orders: i32,
    pub total_spent: Decimal,
    pub last_order_date: Option<DateTime<Utc>>,
    pub average_order_value: Decimal,
    pub segment: Segment,
}

impl CustomerTotals {
    pub fn fresh() -> Self {
        Self {
            total_orders: 0,
            total_spent: Decimal::ZERO,
            last_order_date: None,
            average_order_value: Decimal::ZERO,
            segment: Segment::New,
        }
    }

    /// Folds one placed order into the aggregates.
    pub fn record_order(&mut self, final_total: Decimal, now: DateTime<Utc>) {
        self.total_orders += 1;
        self.total_spent += final_total;
        self.last_order_date = Some(now);
        self.average_order_value = average_order_value(self.total_spent, self.total_orders);
        self.segment = evaluate_segment(
            self.segment,
            self.total_orders,
            self.total_spent,
            self.last_order_date,
            now,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dormant_regular_customer_is_not_downgraded() {
        let now = Utc::now();
        let long_ago = Some(now - Duration::days(200));
        assert_eq!(
            evaluate_segment(Segment::Regular, 4, Decimal::from(800), long_ago, now),
            Segment::Regular
        );
        assert_eq!(
            evaluate_segment(Segment::New, 1, Decimal::from(80), long_ago, now),
            Segment::Inactive
        );
    }

    #[test]
    fn average_rounds_half_away_from_zero() {
        assert_eq!(average_order_value(Decimal::from(5), 2), Decimal::from(3));
        assert_eq!(average_order_value(Decimal::from(10), 0), Decimal::ZERO);
    }
}

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use utoipa::ToSchema;

/// Day-over-day style change in percent, one decimal place.
///
/// A zero baseline reports 100 when there is any current value and 0 otherwise.
pub fn percentage_change(current: Decimal, previous: Decimal) -> Decimal {
    if previous.is_zero() {
        return if current > Decimal::ZERO {
            Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        };
    }
    ((current - previous) / previous * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

/// Half-open UTC interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at < self.end
    }
}

/// Converts between UTC instants and the business's local calendar.
#[derive(Debug, Clone, Copy)]
pub struct BusinessClock {
    offset: FixedOffset,
}

impl BusinessClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.offset).date_naive()
    }

    /// UTC instant of local midnight starting `day`.
    pub fn day_start(&self, day: NaiveDate) -> DateTime<Utc> {
        let local_midnight = day.and_time(chrono::NaiveTime::MIN);
        let utc = local_midnight - Duration::seconds(i64::from(self.offset.local_minus_utc()));
        DateTime::<Utc>::from_naive_utc_and_offset(utc, Utc)
    }

    pub fn day_window(&self, day: NaiveDate) -> TimeWindow {
        TimeWindow {
            start: self.day_start(day),
            end: self.day_start(day + Duration::days(1)),
        }
    }

    pub fn today(&self, now: DateTime<Utc>) -> TimeWindow {
        self.day_window(self.local_date(now))
    }

    pub fn yesterday(&self, now: DateTime<Utc>) -> TimeWindow {
        self.day_window(self.local_date(now) - Duration::days(1))
    }

    /// From local midnight of the most recent Sunday up to the end of today.
    pub fn week_to_date(&self, now: DateTime<Utc>) -> TimeWindow {
        let today = self.local_date(now);
        let sunday = today - Duration::days(i64::from(today.weekday().num_days_from_sunday()));
        TimeWindow {
            start: self.day_start(sunday),
            end: self.today(now).end,
        }
    }

    /// From local midnight of the first of the month up to the end of today.
    pub fn month_to_date(&self, now: DateTime<Utc>) -> TimeWindow {
        let today = self.local_date(now);
        let first = today.with_day(1).unwrap_or(today);
        TimeWindow {
            start: self.day_start(first),
            end: self.today(now).end,
        }
    }
}

string_enum! {
    TrendPeriod ("period") {
        Week => "week",
        Month => "month",
        Year => "year",
    }
}

impl TrendPeriod {
    pub fn days_back(&self) -> i64 {
        match self {
            TrendPeriod::Week => 7,
            TrendPeriod::Month => 30,
            TrendPeriod::Year => 365,
        }
    }

    /// Day of week (1 = Sunday), day of month, or month number.
    pub fn bucket_of(&self, local: NaiveDate) -> u32 {
        match self {
            TrendPeriod::Week => local.weekday().number_from_sunday(),
            TrendPeriod::Month => local.day(),
            TrendPeriod::Year => local.month(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrendBucket {
    pub bucket: u32,
    pub total_sales: Decimal,
    pub order_count: i64,
}

/// Groups `(created_at, final_total)` pairs into ascending trend buckets.
pub fn bucket_sales<I>(orders: I, period: TrendPeriod, clock: &BusinessClock) -> Vec<TrendBucket>
where
    I: IntoIterator<Item = (DateTime<Utc>, Decimal)>,
{
    let mut buckets: BTreeMap<u32, (Decimal, i64)> = BTreeMap::new();
    for (created_at, amount) in orders {
        let key = period.bucket_of(clock.local_date(created_at));
        let entry = buckets.entry(key).or_insert((Decimal::ZERO, 0));
        entry.0 += amount;
        entry.1 += 1;
    }
    buckets
        .into_iter()
        .map(|(bucket, (total_sales, order_count))| TrendBucket {
            bucket,
            total_sales,
            order_count,
        })
        .collect()
}

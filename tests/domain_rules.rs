use std::collections::HashMap;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, TimeZone, Utc};
use localbiz_api::{
    domain::{
        analytics::{BusinessClock, TrendPeriod, bucket_sales, percentage_change},
        customer::{CustomerTotals, Segment, evaluate_segment},
        message::{MessageStatus, OrderConfirmation, format_order_confirmation},
        order::{
            LineRequest, OrderRuleError, OrderSource, OrderStatus, PaymentMethod, PaymentStatus,
            StockedProduct, format_order_number, price_order, settle_payment,
        },
        payment::{sign, verify_signature},
        plan::{Plan, Resource, check_ceiling, effective_plan},
        product::{Unit, profit_margin, subtract_stock},
        shop::{Language, ShopCategory, slug_candidates, slugify},
    },
    dto::orders::{CreateOrderRequest, OrderCustomerInput, OrderItemRequest},
    response::Pagination,
};
use rust_decimal::Decimal;
use uuid::Uuid;
use validator::Validate;

fn ist() -> BusinessClock {
    BusinessClock::new(FixedOffset::east_opt(330 * 60).unwrap())
}

fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

fn catalog(entries: &[(&str, i64, i32)]) -> (Vec<Uuid>, HashMap<Uuid, StockedProduct>) {
    let mut ids = Vec::new();
    let mut products = HashMap::new();
    for (name, price, stock) in entries {
        let id = Uuid::new_v4();
        ids.push(id);
        products.insert(
            id,
            StockedProduct {
                id,
                name: (*name).to_string(),
                price: Decimal::from(*price),
                stock: *stock,
                unit: "piece".into(),
                is_active: true,
            },
        );
    }
    (ids, products)
}

#[test]
fn order_is_priced_from_catalog_prices() {
    let (ids, products) = catalog(&[("Atta", 50, 5), ("Dal", 30, 2)]);
    let lines = [
        LineRequest { product_id: ids[0], quantity: 2 },
        LineRequest { product_id: ids[1], quantity: 1 },
    ];

    let draft = price_order(&lines, &products, None, Decimal::from(10)).unwrap();

    assert_eq!(draft.total, Decimal::from(130));
    assert_eq!(draft.final_total, Decimal::from(120));
    assert_eq!(draft.lines[0].subtotal, Decimal::from(100));
    assert_eq!(draft.stock_changes[0].new_stock, 3);
    assert_eq!(draft.stock_changes[1].new_stock, 1);
    assert_eq!(draft.stock_changes[1].revenue, Decimal::from(30));
}

#[test]
fn one_short_line_rejects_the_whole_order() {
    let (ids, products) = catalog(&[("Atta", 50, 5), ("Dal", 30, 2)]);
    let lines = [
        LineRequest { product_id: ids[0], quantity: 2 },
        LineRequest { product_id: ids[1], quantity: 3 },
    ];

    let err = price_order(&lines, &products, None, Decimal::ZERO).unwrap_err();
    assert_eq!(
        err,
        OrderRuleError::InsufficientStock {
            product: "Dal".into(),
            available: 2
        }
    );
    assert_eq!(err.to_string(), "Insufficient stock for Dal. Available: 2");
}

#[test]
fn repeated_products_are_merged_before_the_stock_check() {
    let (ids, products) = catalog(&[("Soap", 40, 3)]);
    let twice = [
        LineRequest { product_id: ids[0], quantity: 2 },
        LineRequest { product_id: ids[0], quantity: 1 },
    ];
    let draft = price_order(&twice, &products, None, Decimal::ZERO).unwrap();
    assert_eq!(draft.lines.len(), 1);
    assert_eq!(draft.lines[0].quantity, 3);
    assert_eq!(draft.stock_changes[0].new_stock, 0);

    let too_many = [
        LineRequest { product_id: ids[0], quantity: 2 },
        LineRequest { product_id: ids[0], quantity: 2 },
    ];
    assert!(matches!(
        price_order(&too_many, &products, None, Decimal::ZERO),
        Err(OrderRuleError::InsufficientStock { available: 3, .. })
    ));
}

#[test]
fn submitted_total_and_discount_are_checked() {
    let (ids, products) = catalog(&[("Atta", 50, 5)]);
    let lines = [LineRequest { product_id: ids[0], quantity: 1 }];

    assert!(matches!(
        price_order(&lines, &products, Some(Decimal::from(45)), Decimal::ZERO),
        Err(OrderRuleError::TotalMismatch { .. })
    ));
    assert!(price_order(&lines, &products, Some(Decimal::from(50)), Decimal::ZERO).is_ok());
    assert_eq!(
        price_order(&lines, &products, None, Decimal::from(60)).unwrap_err(),
        OrderRuleError::DiscountExceedsTotal
    );
    assert_eq!(
        price_order(&[], &products, None, Decimal::ZERO).unwrap_err(),
        OrderRuleError::EmptyOrder
    );
}

#[test]
fn unknown_and_inactive_products_are_rejected() {
    let (ids, mut products) = catalog(&[("Atta", 50, 5)]);
    let stray = Uuid::new_v4();
    assert_eq!(
        price_order(&[LineRequest { product_id: stray, quantity: 1 }], &products, None, Decimal::ZERO)
            .unwrap_err(),
        OrderRuleError::ProductNotFound(stray)
    );

    if let Some(product) = products.get_mut(&ids[0]) {
        product.is_active = false;
    }
    assert_eq!(
        price_order(&[LineRequest { product_id: ids[0], quantity: 1 }], &products, None, Decimal::ZERO)
            .unwrap_err(),
        OrderRuleError::ProductUnavailable("Atta".into())
    );
}

#[test]
fn order_numbers_are_zero_padded_per_day() {
    let day = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
    assert_eq!(format_order_number(day, 1), "ORD-20240305-0001");
    assert_eq!(format_order_number(day, 42), "ORD-20240305-0042");
    assert_eq!(format_order_number(day, 12345), "ORD-20240305-12345");
}

#[test]
fn status_moves_forward_or_cancels() {
    use OrderStatus::*;
    assert!(Pending.can_transition_to(Confirmed));
    assert!(Confirmed.can_transition_to(Ready));
    assert!(Ready.can_transition_to(Cancelled));
    assert!(!Confirmed.can_transition_to(Pending));
    assert!(!Processing.can_transition_to(Processing));
    assert!(!Delivered.can_transition_to(Cancelled));
    assert!(!Cancelled.can_transition_to(Pending));
}

#[test]
fn payment_amount_follows_status() {
    let total = Decimal::from(120);
    assert_eq!(settle_payment(PaymentStatus::Paid, None, total), Ok(total));
    assert_eq!(
        settle_payment(PaymentStatus::Partial, Some(Decimal::from(50)), total),
        Ok(Decimal::from(50))
    );
    assert!(settle_payment(PaymentStatus::Partial, None, total).is_err());
    assert!(settle_payment(PaymentStatus::Partial, Some(Decimal::from(150)), total).is_err());
    assert!(settle_payment(PaymentStatus::Unpaid, Some(Decimal::from(10)), total).is_err());
}

#[test]
fn stock_never_goes_negative() {
    assert_eq!(subtract_stock(5, 2), 3);
    assert_eq!(subtract_stock(2, 5), 0);
    assert_eq!(profit_margin(Decimal::from(150), Decimal::from(100)), Decimal::from(50));
    assert_eq!(profit_margin(Decimal::from(150), Decimal::ZERO), Decimal::ZERO);
}

#[test]
fn segments_follow_order_history() {
    let now = utc(2024, 6, 1, 12, 0);
    let spent = |n: i64| Decimal::from(n);

    assert_eq!(evaluate_segment(Segment::Vip, 0, spent(0), None, now), Segment::New);
    assert_eq!(evaluate_segment(Segment::New, 10, spent(900), Some(now), now), Segment::Vip);
    assert_eq!(evaluate_segment(Segment::New, 1, spent(10_000), Some(now), now), Segment::Vip);
    assert_eq!(evaluate_segment(Segment::New, 3, spent(900), Some(now), now), Segment::Regular);
    assert_eq!(
        evaluate_segment(Segment::New, 1, spent(200), Some(now - Duration::days(91)), now),
        Segment::Inactive
    );
    assert_eq!(
        evaluate_segment(Segment::New, 2, spent(200), Some(now - Duration::days(10)), now),
        Segment::New
    );
}

#[test]
fn recording_orders_updates_customer_totals() {
    let now = utc(2024, 6, 1, 12, 0);
    let mut totals = CustomerTotals::fresh();
    totals.record_order(Decimal::from(100), now);
    totals.record_order(Decimal::from(51), now);
    totals.record_order(Decimal::from(50), now);

    assert_eq!(totals.total_orders, 3);
    assert_eq!(totals.total_spent, Decimal::from(201));
    assert_eq!(totals.average_order_value, Decimal::from(67));
    assert_eq!(totals.segment, Segment::Regular);
    assert_eq!(totals.last_order_date, Some(now));
}

#[test]
fn slugs_collapse_separators_and_count_up() {
    assert_eq!(slugify("Rahul's Kirana Store!!"), "rahul-s-kirana-store");
    assert_eq!(slugify("  Best   Salon  "), "best-salon");
    assert_eq!(slugify("!!!"), "shop");

    let first: Vec<String> = slug_candidates("best-salon").take(3).collect();
    assert_eq!(first, vec!["best-salon", "best-salon-1", "best-salon-2"]);
    assert_eq!(slug_candidates("x").count(), 1_001);
}

#[test]
fn percentage_change_handles_zero_baseline() {
    assert_eq!(percentage_change(Decimal::from(120), Decimal::from(100)), Decimal::from(20));
    assert_eq!(percentage_change(Decimal::from(50), Decimal::from(200)), Decimal::from(-75));
    assert_eq!(percentage_change(Decimal::from(1), Decimal::from(3)), Decimal::new(-667, 1));
    assert_eq!(percentage_change(Decimal::from(5), Decimal::ZERO), Decimal::ONE_HUNDRED);
    assert_eq!(percentage_change(Decimal::ZERO, Decimal::ZERO), Decimal::ZERO);
}

#[test]
fn business_days_use_the_local_offset() {
    let clock = ist();
    let day = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
    let window = clock.day_window(day);
    assert_eq!(window.start, utc(2024, 3, 3, 18, 30));
    assert_eq!(window.end, utc(2024, 3, 4, 18, 30));
    assert!(window.contains(utc(2024, 3, 3, 18, 30)));
    assert!(!window.contains(utc(2024, 3, 4, 18, 30)));

    // Wednesday 11:30 local; the week starts on Sunday 3 March.
    let now = utc(2024, 3, 6, 6, 0);
    let week = clock.week_to_date(now);
    assert_eq!(week.start, utc(2024, 3, 2, 18, 30));
    assert_eq!(week.end, utc(2024, 3, 6, 18, 30));
    assert_eq!(clock.month_to_date(now).start, utc(2024, 2, 29, 18, 30));
}

#[test]
fn weekly_trend_buckets_by_local_weekday() {
    let clock = ist();
    let orders = vec![
        // Sunday 15:30 local
        (utc(2024, 3, 3, 10, 0), Decimal::from(100)),
        // Monday 01:30 local, still Sunday in UTC
        (utc(2024, 3, 3, 20, 0), Decimal::from(40)),
        (utc(2024, 3, 4, 9, 0), Decimal::from(60)),
    ];

    let buckets = bucket_sales(orders, TrendPeriod::Week, &clock);
    assert_eq!(buckets.len(), 2);
    assert_eq!((buckets[0].bucket, buckets[0].total_sales, buckets[0].order_count), (1, Decimal::from(100), 1));
    assert_eq!((buckets[1].bucket, buckets[1].total_sales, buckets[1].order_count), (2, Decimal::from(100), 2));
}

#[test]
fn gateway_signatures_verify_only_untampered() {
    let signature = sign("s3cret", "order_123", "pay_456").unwrap();
    assert_eq!(signature.len(), 64);
    assert!(verify_signature("s3cret", "order_123", "pay_456", &signature));
    assert!(!verify_signature("s3cret", "order_123", "pay_457", &signature));
    assert!(!verify_signature("other", "order_123", "pay_456", &signature));
    assert!(!verify_signature("s3cret", "order_123", "pay_456", "not-hex"));
}

#[test]
fn plan_ceilings_and_expiry() {
    assert!(check_ceiling(Plan::Free, Resource::Products, 49).is_ok());
    let err = check_ceiling(Plan::Free, Resource::Products, 50).unwrap_err();
    assert_eq!(err.limit, 50);
    assert!(check_ceiling(Plan::Pro, Resource::Customers, 100_000).is_ok());

    let now = utc(2024, 6, 1, 0, 0);
    assert_eq!(effective_plan(Plan::Pro, Some(now - Duration::days(1)), now), Plan::Free);
    assert_eq!(effective_plan(Plan::Pro, Some(now + Duration::days(1)), now), Plan::Pro);
    assert_eq!(effective_plan(Plan::Basic, None, now), Plan::Basic);
}

#[test]
fn pagination_reports_neighbours() {
    let middle = Pagination::new(2, 20, 45);
    assert_eq!(middle.pages, 3);
    assert!(middle.has_next && middle.has_prev);

    let empty = Pagination::new(1, 20, 0);
    assert_eq!(empty.pages, 0);
    assert!(!empty.has_next && !empty.has_prev);
}

#[test]
fn message_status_only_advances() {
    assert!(MessageStatus::Queued.can_advance_to(MessageStatus::Sent));
    assert!(MessageStatus::Sent.can_advance_to(MessageStatus::Read));
    assert!(MessageStatus::Delivered.can_advance_to(MessageStatus::Failed));
    assert!(!MessageStatus::Read.can_advance_to(MessageStatus::Delivered));
    assert!(!MessageStatus::Failed.can_advance_to(MessageStatus::Sent));
}

#[test]
fn confirmation_text_uses_shop_language() {
    let order = OrderConfirmation {
        order_number: "ORD-20240305-0001",
        customer_name: "Priya",
        total: Decimal::from(120),
        delivery_date: NaiveDate::from_ymd_opt(2024, 3, 6),
        shop_name: "Sharma Kirana",
    };

    let english = format_order_confirmation(&order, Language::En);
    assert!(english.starts_with("🎉 Hello Priya!"));
    assert!(english.contains("Your order #ORD-20240305-0001 has been confirmed."));
    assert!(english.contains("📅 Delivery: 06/03/2024"));
    assert!(english.ends_with("Thank you for shopping at Sharma Kirana! 🙏"));

    let hindi = format_order_confirmation(&order, Language::Hi);
    assert!(hindi.starts_with("🎉 नमस्ते Priya!"));
    assert!(hindi.contains("₹120"));
}

fn order_with_items(items: Vec<OrderItemRequest>) -> CreateOrderRequest {
    CreateOrderRequest {
        customer: OrderCustomerInput {
            name: "Priya".into(),
            phone: "9876543210".into(),
            address: None,
        },
        items,
        total: None,
        discount: None,
        delivery_date: None,
        delivery_time: None,
        notes: None,
        payment_method: None,
        source: None,
    }
}

#[test]
fn order_request_needs_at_least_one_item() {
    let empty = order_with_items(Vec::new()).validate().unwrap_err();
    assert!(empty.field_errors().contains_key("items"));

    let one = order_with_items(vec![OrderItemRequest {
        product_id: Uuid::new_v4(),
        quantity: 1,
    }]);
    assert!(one.validate().is_ok());
}

#[test]
fn unset_enums_fall_back_to_their_defaults() {
    assert_eq!(PaymentMethod::default(), PaymentMethod::Cash);
    assert_eq!(OrderSource::default(), OrderSource::Manual);
    assert_eq!(ShopCategory::default(), ShopCategory::Other);
    assert_eq!(Language::default(), Language::En);
    assert_eq!(Unit::default(), Unit::Piece);
}

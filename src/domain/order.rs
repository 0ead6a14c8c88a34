//! Order pricing, numbering and the status machine.

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::product::subtract_stock;
string_enum! {
    OrderStatus ("order status") {
        Pending => "pending",
        Confirmed => "confirmed",
        Processing => "processing",
        Ready => "ready",
        Delivered => "delivered",
        Cancelled => "cancelled",
    }
}

string_enum! {
    PaymentStatus ("payment status") {
        Unpaid => "unpaid",
        Partial => "partial",
        Paid => "paid",
    }
}

string_enum! {
    #[derive(Default)]
    PaymentMethod ("payment method") {
        #[default]
        Cash => "cash",
        Upi => "upi",
        Card => "card",
        Online => "online",
        Other => "other",
    }
}

string_enum! {
    /// Channel an order came in through.
    #[derive(Default)]
    OrderSource ("order source") {
        Shop => "shop",
        PublicPage => "public_page",
        Whatsapp => "whatsapp",
        #[default]
        Manual => "manual",
    }
}

impl OrderStatus {
    /// Statuses counted as "pending" on the dashboard.
    pub const OPEN: [OrderStatus; 3] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Processing,
    ];

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    fn rank(&self) -> Option<u8> {
        match self {
            OrderStatus::Pending => Some(0),
            OrderStatus::Confirmed => Some(1),
            OrderStatus::Processing => Some(2),
            OrderStatus::Ready => Some(3),
            OrderStatus::Delivered => Some(4),
            OrderStatus::Cancelled => None,
        }
    }

    /// Forward moves along the fulfilment chain, or cancellation, from any
    /// non-terminal status.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        match (self.rank(), next.rank()) {
            (_, None) => true,
            (Some(from), Some(to)) => to > from,
            (None, Some(_)) => false,
        }
    }
}

/// Actor recorded for transitions made by the system itself.
pub const SYSTEM_ACTOR: &str = "system";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

/// Product fields needed to price and validate one line.
#[derive(Debug, Clone, PartialEq)]
pub struct StockedProduct {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub stock: i32,
    pub unit: String,
    pub is_active: bool,
}

/// Line item snapshot stored with the order.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedLine {
    pub product_id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub quantity: i32,
    pub unit: String,
    pub subtotal: Decimal,
}

/// Stock and sales-stat change to apply to one product.
#[derive(Debug, Clone, PartialEq)]
pub struct StockChange {
    pub product_id: Uuid,
    pub new_stock: i32,
    pub sold: i32,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderDraft {
    pub lines: Vec<PricedLine>,
    pub stock_changes: Vec<StockChange>,
    pub total: Decimal,
    pub discount: Decimal,
    pub final_total: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OrderRuleError {
    EmptyOrder,
    InvalidQuantity(Uuid),
    ProductNotFound(Uuid),
    ProductUnavailable(String),
    InsufficientStock { product: String, available: i32 },
    NegativeAmount(&'static str),
    DiscountExceedsTotal,
    TotalMismatch { submitted: Decimal, computed: Decimal },
}

impl fmt::Display for OrderRuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyOrder => write!(f, "Order must have at least one item"),
            Self::InvalidQuantity(id) => write!(f, "Quantity must be at least 1 for product {id}"),
            Self::ProductNotFound(id) => write!(f, "Product not found: {id}"),
            Self::ProductUnavailable(name) => write!(f, "{name} is not available"),
            Self::InsufficientStock { product, available } => {
                write!(f, "Insufficient stock for {product}. Available: {available}")
            }
            Self::NegativeAmount(field) => write!(f, "{field} cannot be negative"),
            Self::DiscountExceedsTotal => write!(f, "Discount cannot exceed the order total"),
            Self::TotalMismatch {
                submitted,
                computed,
            } => write!(
                f,
                "Total {submitted} does not match line items total {computed}"
            ),
        }
    }
}

impl std::error::Error for OrderRuleError {}

pub fn final_total(total: Decimal, discount: Decimal) -> Decimal {
    total - discount
}

/// Collapses repeated product ids into one line, keeping first-seen order.
pub fn merge_lines(lines: &[LineRequest]) -> Vec<LineRequest> {
    let mut merged: Vec<LineRequest> = Vec::with_capacity(lines.len());
    for line in lines {
        match merged.iter_mut().find(|m| m.product_id == line.product_id) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(line.quantity),
            None => merged.push(*line),
        }
    }
    merged
}

/// Validates every line against current stock, then prices the order.
///
/// Nothing here mutates state: the caller applies `stock_changes` only when
/// this returns `Ok`, so a failing line never leaves earlier lines applied.
pub fn price_order(
    lines: &[LineRequest],
    products: &HashMap<Uuid, StockedProduct>,
    submitted_total: Option<Decimal>,
    discount: Decimal,
) -> Result<OrderDraft, OrderRuleError> {
    if lines.is_empty() {
        return Err(OrderRuleError::EmptyOrder);
    }
    if discount < Decimal::ZERO {
        return Err(OrderRuleError::NegativeAmount("Discount"));
    }
    if let Some(total) = submitted_total {
        if total < Decimal::ZERO {
            return Err(OrderRuleError::NegativeAmount("Total"));
        }
    }

    let lines = merge_lines(lines);

    let mut validated: Vec<(&StockedProduct, i32)> = Vec::with_capacity(lines.len());
    for line in &lines {
        if line.quantity < 1 {
            return Err(OrderRuleError::InvalidQuantity(line.product_id));
        }
        let product = products
            .get(&line.product_id)
            .ok_or(OrderRuleError::ProductNotFound(line.product_id))?;
        if !product.is_active {
            return Err(OrderRuleError::ProductUnavailable(product.name.clone()));
        }
        if product.stock < line.quantity {
            return Err(OrderRuleError::InsufficientStock {
                product: product.name.clone(),
                available: product.stock,
            });
        }
        validated.push((product, line.quantity));
    }

    let mut priced = Vec::with_capacity(validated.len());
    let mut stock_changes = Vec::with_capacity(validated.len());
    let mut computed = Decimal::ZERO;
    for (product, quantity) in validated {
        let subtotal = product.price * Decimal::from(quantity);
        computed += subtotal;
        priced.push(PricedLine {
            product_id: product.id,
            name: product.name.clone(),
            price: product.price,
            quantity,
            unit: product.unit.clone(),
            subtotal,
        });
        stock_changes.push(StockChange {
            product_id: product.id,
            new_stock: subtract_stock(product.stock, quantity),
            sold: quantity,
            revenue: subtotal,
        });
    }

    if let Some(submitted) = submitted_total {
        if submitted != computed {
            return Err(OrderRuleError::TotalMismatch {
                submitted,
                computed,
            });
        }
    }
    if discount > computed {
        return Err(OrderRuleError::DiscountExceedsTotal);
    }

    Ok(OrderDraft {
        lines: priced,
        stock_changes,
        total: computed,
        discount,
        final_total: final_total(computed, discount),
    })
}

/// `ORD-YYYYMMDD-NNNN`, with the per-shop daily sequence starting at 1.
pub fn format_order_number(day: NaiveDate, sequence: i32) -> String {
    format!("ORD-{}-{:04}", day.format("%Y%m%d"), sequence)
}

/// Validates a payment update and returns the paid amount to store.
pub fn settle_payment(
    status: PaymentStatus,
    paid_amount: Option<Decimal>,
    final_total: Decimal,
) -> Result<Decimal, String> {
    let amount = match (status, paid_amount) {
        (PaymentStatus::Paid, _) => final_total,
        (PaymentStatus::Unpaid, None) => Decimal::ZERO,
        (PaymentStatus::Partial, None) => {
            return Err("paidAmount is required for a partial payment".to_string());
        }
        (_, Some(amount)) => amount,
    };
    if amount < Decimal::ZERO || amount > final_total {
        return Err(format!("paidAmount must be between 0 and {final_total}"));
    }
    if status == PaymentStatus::Unpaid && amount != Decimal::ZERO {
        return Err("paidAmount must be 0 for an unpaid order".to_string());
    }
    Ok(amount)
}

use rust_decimal::{Decimal, RoundingStrategy};

string_enum! {
    /// Selling unit of a catalog item.
    #[derive(Default)]
    Unit ("unit") {
        #[default]
        Piece => "piece",
        Kg => "kg",
        Gram => "gram",
        Liter => "liter",
        Ml => "ml",
        Meter => "meter",
        Dozen => "dozen",
        Box => "box",
        Packet => "packet",
        Other => "other",
    }
}

pub const DEFAULT_LOW_STOCK_THRESHOLD: i32 = 10;
pub const DEFAULT_CATEGORY: &str = "general";

/// Stock after selling `quantity`, clamped at zero.
pub fn subtract_stock(stock: i32, quantity: i32) -> i32 {
    stock.saturating_sub(quantity).max(0)
}

pub fn is_low_stock(stock: i32, threshold: i32) -> bool {
    stock <= threshold
}

/// Margin over cost as a percentage with two decimals, zero when cost is unknown.
pub fn profit_margin(price: Decimal, cost_price: Decimal) -> Decimal {
    if cost_price <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    ((price - cost_price) / cost_price * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

use std::fmt::Write;

use rust_decimal::Decimal;
use sea_orm::TransactionTrait;
use validator::Validate;

use crate::{
    domain::{
        plan::{PlanLimits, UsageKind},
        shop::ShopCategory,
    },
    dto::{
        ai::{AiAnswer, AiQueryRequest, AiUsage},
        analytics::{LowStockProduct, TopProduct},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::{analytics_service, shop_service, usage_service},
    state::AppState,
};

/// Shop figures the assistant reasons over.
#[derive(Debug, Clone)]
pub struct BusinessContext {
    pub shop_name: String,
    pub category: ShopCategory,
    pub total_products: i64,
    pub total_orders: i64,
    pub total_revenue: Decimal,
    pub today_sales: Decimal,
    pub week_sales: Decimal,
    pub month_sales: Decimal,
    pub top_products: Vec<TopProduct>,
    pub low_stock_products: Vec<LowStockProduct>,
}

/// Renders the business context followed by the owner's question.
pub fn build_prompt(context: &BusinessContext, query: &str) -> String {
    let mut prompt = String::new();
    let _ = writeln!(prompt, "Shop Information:");
    let _ = writeln!(prompt, "- Name: {}", context.shop_name);
    let _ = writeln!(prompt, "- Category: {}", context.category);
    let _ = writeln!(prompt, "- Total Products: {}", context.total_products);
    let _ = writeln!(prompt, "- Total Orders: {}", context.total_orders);
    let _ = writeln!(prompt, "- Total Revenue: ₹{}", context.total_revenue);
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "Recent Performance:");
    let _ = writeln!(prompt, "- Today's Sales: ₹{}", context.today_sales);
    let _ = writeln!(prompt, "- This Week's Sales: ₹{}", context.week_sales);
    let _ = writeln!(prompt, "- This Month's Sales: ₹{}", context.month_sales);

    if !context.top_products.is_empty() {
        let _ = writeln!(prompt);
        let _ = writeln!(prompt, "Top Selling Products:");
        for (rank, product) in context.top_products.iter().enumerate() {
            let _ = writeln!(prompt, "{}. {} - {} sold", rank + 1, product.name, product.total_sold);
        }
    }
    if !context.low_stock_products.is_empty() {
        let _ = writeln!(prompt);
        let _ = writeln!(prompt, "Low Stock Products:");
        for product in &context.low_stock_products {
            let _ = writeln!(prompt, "- {}: {} {}", product.name, product.stock, product.unit);
        }
    }

    let _ = writeln!(prompt);
    let _ = write!(prompt, "User Question: {}", query.trim());
    prompt
}

const COMMON_QUESTIONS: &[&str] = &[
    "💰 आज की sales कैसी है?",
    "📦 Which is my best selling product?",
    "📊 क्या मुझे कोई offer देना चाहिए?",
    "⚠️ Low stock वाले products कौन से हैं?",
    "👥 मेरे top customers कौन हैं?",
];

/// Starter questions for the assistant, with a category-specific tail.
pub fn suggested_questions(category: ShopCategory) -> Vec<&'static str> {
    let specific: &[&str] = match category {
        ShopCategory::Kirana => &["🛒 Grocery items में सबसे ज्यादा क्या बिकता है?"],
        ShopCategory::Salon => &["💇 Which service is most popular?"],
        ShopCategory::Tailor => &["👔 Peak season में क्या करूं?"],
        ShopCategory::Tiffin => &["🍱 Daily vs weekend orders का comparison?"],
        ShopCategory::Tuition => &["📚 Student retention कैसे बढ़ाएं?"],
        _ => &[],
    };
    COMMON_QUESTIONS.iter().chain(specific).copied().collect()
}

pub async fn ask(
    state: &AppState,
    user: &AuthUser,
    payload: AiQueryRequest,
) -> AppResult<ApiResponse<AiAnswer>> {
    payload.validate()?;
    let shop = shop_service::owned_shop(state, user).await?;
    let account = usage_service::check(state, user.user_id, UsageKind::Ai).await?;

    let context = analytics_service::business_context(state, &shop).await?;
    let prompt = build_prompt(&context, &payload.query);

    let response = state.advisor.advise(&prompt).await.map_err(|err| {
        tracing::warn!(shop_id = %shop.id, error = %err, "AI query failed");
        AppError::from(err)
    })?;

    let txn = state.orm.begin().await?;
    usage_service::increment(&txn, user.user_id, UsageKind::Ai, 1).await?;
    txn.commit().await?;

    let limits = PlanLimits::for_plan(usage_service::plan_of(&account));
    Ok(ApiResponse::success(
        "AI response",
        AiAnswer {
            query: payload.query,
            response,
            usage: AiUsage {
                used: account.ai_queries_this_month + 1,
                limit: limits.ai_queries,
            },
        },
    ))
}

pub async fn suggestions(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<Vec<&'static str>>> {
    let category = match user.shop_id {
        Some(_) => shop_service::owned_shop(state, user)
            .await?
            .category
            .parse()
            .unwrap_or_default(),
        None => ShopCategory::default(),
    };
    Ok(ApiResponse::success(
        "Suggested questions",
        suggested_questions(category),
    ))
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn context() -> BusinessContext {
        BusinessContext {
            shop_name: "Sharma Kirana".into(),
            category: ShopCategory::Kirana,
            total_products: 42,
            total_orders: 310,
            total_revenue: Decimal::new(15432050, 2),
            today_sales: Decimal::from(1200),
            week_sales: Decimal::from(8400),
            month_sales: Decimal::from(30100),
            top_products: vec![TopProduct {
                id: Uuid::nil(),
                name: "Atta 5kg".into(),
                total_sold: 88,
                revenue: Decimal::from(21120),
                stock: 12,
                price: Decimal::from(240),
                unit: "packet".into(),
            }],
            low_stock_products: vec![LowStockProduct {
                id: Uuid::nil(),
                name: "Sugar".into(),
                stock: 3,
                unit: "kg".into(),
                price: Decimal::from(45),
            }],
        }
    }

    #[test]
    fn prompt_carries_figures_and_question() {
        let prompt = build_prompt(&context(), "  What should I restock?  ");
        assert!(prompt.starts_with("Shop Information:\n- Name: Sharma Kirana\n- Category: kirana"));
        assert!(prompt.contains("- Total Revenue: ₹154320.50"));
        assert!(prompt.contains("1. Atta 5kg - 88 sold"));
        assert!(prompt.contains("- Sugar: 3 kg"));
        assert!(prompt.ends_with("User Question: What should I restock?"));
    }

    #[test]
    fn prompt_omits_empty_product_sections() {
        let full = context();
        let mut ctx = full.clone();
        ctx.top_products.clear();
        ctx.low_stock_products.clear();
        let prompt = build_prompt(&ctx, "hi");
        assert!(!prompt.contains("Top Selling Products"));
        assert!(!prompt.contains("Low Stock Products"));
        assert!(build_prompt(&full, "hi").contains("Top Selling Products"));
    }

    #[test]
    fn suggestions_add_category_questions() {
        assert_eq!(suggested_questions(ShopCategory::Other).len(), 5);
        let salon = suggested_questions(ShopCategory::Salon);
        assert_eq!(salon.len(), 6);
        assert_eq!(salon[5], "💇 Which service is most popular?");
    }
}

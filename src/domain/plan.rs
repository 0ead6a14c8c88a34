use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

string_enum! {
    /// Subscription tier of an account.
    Plan ("plan") {
        Free => "free",
        Basic => "basic",
        Pro => "pro",
        Enterprise => "enterprise",
    }
}

string_enum! {
    /// Monthly metered action.
    UsageKind ("usage kind") {
        Orders => "orders",
        Messages => "messages",
        Ai => "ai",
    }
}

string_enum! {
    /// Catalog-size ceiling checked when a record is created.
    Resource ("resource") {
        Products => "products",
        Customers => "customers",
    }
}

/// Ceiling used for "unlimited" plan entries.
pub const UNLIMITED: i32 = 999_999;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanLimits {
    pub max_orders: i32,
    pub max_messages: i32,
    pub max_products: i32,
    pub max_customers: i32,
    pub ai_queries: i32,
}

impl PlanLimits {
    pub const fn for_plan(plan: Plan) -> Self {
        match plan {
            Plan::Free => PlanLimits {
                max_orders: 20,
                max_messages: 50,
                max_products: 50,
                max_customers: 100,
                ai_queries: 10,
            },
            Plan::Basic => PlanLimits {
                max_orders: 100,
                max_messages: 500,
                max_products: 200,
                max_customers: 500,
                ai_queries: 50,
            },
            Plan::Pro => PlanLimits {
                max_orders: UNLIMITED,
                max_messages: 2000,
                max_products: UNLIMITED,
                max_customers: UNLIMITED,
                ai_queries: 200,
            },
            Plan::Enterprise => PlanLimits {
                max_orders: UNLIMITED,
                max_messages: UNLIMITED,
                max_products: UNLIMITED,
                max_customers: UNLIMITED,
                ai_queries: UNLIMITED,
            },
        }
    }

    pub fn ceiling_for(&self, resource: Resource) -> i32 {
        match resource {
            Resource::Products => self.max_products,
            Resource::Customers => self.max_customers,
        }
    }

    pub fn limit_for(&self, kind: UsageKind) -> i32 {
        match kind {
            UsageKind::Orders => self.max_orders,
            UsageKind::Messages => self.max_messages,
            UsageKind::Ai => self.ai_queries,
        }
    }
}

impl Plan {
    /// Checkout price in paise. The free tier cannot be bought.
    pub fn price_paise(&self) -> Option<i64> {
        match self {
            Plan::Free => None,
            Plan::Basic => Some(19_900),
            Plan::Pro => Some(49_900),
            Plan::Enterprise => Some(99_900),
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Plan::Free => "Free",
            Plan::Basic => "Basic",
            Plan::Pro => "Pro",
            Plan::Enterprise => "Enterprise",
        }
    }

    pub fn features(&self) -> &'static [&'static str] {
        match self {
            Plan::Free => &[
                "20 orders/month",
                "50 WhatsApp messages",
                "10 AI queries",
                "Basic support",
            ],
            Plan::Basic => &[
                "100 orders/month",
                "500 WhatsApp messages",
                "50 AI queries",
                "Email support",
            ],
            Plan::Pro => &[
                "Unlimited orders",
                "2000 WhatsApp messages",
                "200 AI queries",
                "Priority support",
            ],
            Plan::Enterprise => &[
                "Everything unlimited",
                "Custom domain",
                "API access",
                "Dedicated support",
            ],
        }
    }
}

impl Resource {
    pub fn label(&self) -> &'static str {
        match self {
            Resource::Products => "products",
            Resource::Customers => "customers",
        }
    }
}

impl UsageKind {
    /// Human wording used in limit messages.
    pub fn label(&self) -> &'static str {
        match self {
            UsageKind::Orders => "order",
            UsageKind::Messages => "WhatsApp message",
            UsageKind::Ai => "AI query",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    pub orders_this_month: i32,
    pub messages_this_month: i32,
    pub ai_queries_this_month: i32,
}

impl Usage {
    pub fn get(&self, kind: UsageKind) -> i32 {
        match kind {
            UsageKind::Orders => self.orders_this_month,
            UsageKind::Messages => self.messages_this_month,
            UsageKind::Ai => self.ai_queries_this_month,
        }
    }
}

/// Returns the plan that applies at `now`. A paid plan whose expiry has passed
/// falls back to free; the caller persists the downgrade.
pub fn effective_plan(plan: Plan, expiry: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Plan {
    match (plan, expiry) {
        (Plan::Free, _) => Plan::Free,
        (_, Some(expiry)) if expiry < now => Plan::Free,
        (plan, _) => plan,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitExceeded {
    pub kind: UsageKind,
    pub plan: Plan,
    pub current: i32,
    pub limit: i32,
}

/// Rejects when `usage` for `kind` has already reached the plan ceiling.
pub fn check_limit(plan: Plan, usage: &Usage, kind: UsageKind) -> Result<(), LimitExceeded> {
    let limit = PlanLimits::for_plan(plan).limit_for(kind);
    let current = usage.get(kind);
    if current >= limit {
        return Err(LimitExceeded {
            kind,
            plan,
            current,
            limit,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CeilingReached {
    pub resource: Resource,
    pub plan: Plan,
    pub current: i64,
    pub limit: i32,
}

/// Rejects creating one more `resource` when `current` already meets the plan ceiling.
pub fn check_ceiling(plan: Plan, resource: Resource, current: i64) -> Result<(), CeilingReached> {
    let limit = PlanLimits::for_plan(plan).ceiling_for(resource);
    if current >= i64::from(limit) {
        return Err(CeilingReached {
            resource,
            plan,
            current,
            limit,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn free_plan_rejects_at_the_ceiling() {
        let usage = Usage {
            orders_this_month: 20,
            ..Usage::default()
        };
        let err = check_limit(Plan::Free, &usage, UsageKind::Orders).unwrap_err();
        assert_eq!(err.current, 20);
        assert_eq!(err.limit, 20);

        let usage = Usage {
            orders_this_month: 19,
            ..Usage::default()
        };
        assert!(check_limit(Plan::Free, &usage, UsageKind::Orders).is_ok());
    }

    #[test]
    fn expired_paid_plan_falls_back_to_free() {
        let now = Utc::now();
        assert_eq!(
            effective_plan(Plan::Pro, Some(now - Duration::days(1)), now),
            Plan::Free
        );
        assert_eq!(
            effective_plan(Plan::Pro, Some(now + Duration::days(1)), now),
            Plan::Pro
        );
        assert_eq!(effective_plan(Plan::Basic, None, now), Plan::Basic);
    }

    #[test]
    fn product_ceiling_follows_the_plan_table() {
        assert!(check_ceiling(Plan::Free, Resource::Products, 49).is_ok());
        let err = check_ceiling(Plan::Free, Resource::Products, 50).unwrap_err();
        assert_eq!(err.limit, 50);
        assert!(check_ceiling(Plan::Pro, Resource::Customers, 50_000).is_ok());
    }
}

use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    domain::{
        analytics::{TrendBucket, TrendPeriod},
        customer::Segment,
        message::{MessageStatus, MessageType},
        order::{OrderSource, OrderStatus, PaymentMethod, PaymentStatus},
        payment::PaymentState,
        plan::{Plan, PlanLimits},
    },
    dto::{
        ai::{AiAnswer, AiQueryRequest, AiUsage},
        analytics::{Dashboard, DashboardTotals, LowStockProduct, PeriodSummary, SalesTrends, TodaySummary, TopProduct},
        auth::{AccessTokenResponse, AuthResponse, LoginRequest, RefreshRequest, RegisterRequest},
        customers::{CreateCustomerRequest, PreferencesInput, UpdateCustomerRequest},
        messages::{CampaignRecipient, CampaignRequest, CampaignResult, RecipientResult, SendMessageRequest, SendResult},
        orders::{CreateOrderRequest, OrderCustomerInput, OrderItemRequest, UpdateOrderStatusRequest, UpdatePaymentRequest},
        payments::{CheckoutOrder, CreateCheckoutRequest, PlanInfo, VerifiedPlan, VerifyPaymentRequest},
        products::{CreateProductRequest, UpdateProductRequest},
        shops::{CreateShopRequest, ShopSettingsInput, UpdateShopRequest},
    },
    models::{
        Address, Customer, CustomerPreferences, CustomerWithOrders, Message, Order, OrderCustomer,
        OrderItem, Payment, Product, ProductStats, PublicShop, Recipient, Shop, ShopSettings,
        ShopStats, StatusChange, UserProfile,
    },
    response::{ApiResponse, Pagination},
    routes::{ai, analytics, auth, customers, health, orders, params, payments, products, shop, whatsapp},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::refresh,
        auth::logout,
        auth::me,
        shop::create_shop,
        shop::get_shop,
        shop::update_shop,
        shop::public_shop,
        shop::public_products,
        shop::public_order,
        products::list_products,
        products::create_product,
        products::get_product,
        products::update_product,
        products::delete_product,
        products::low_stock,
        customers::list_customers,
        customers::create_customer,
        customers::get_customer,
        customers::update_customer,
        orders::list_orders,
        orders::create_order,
        orders::get_order,
        orders::update_status,
        orders::update_payment,
        orders::send_confirmation,
        analytics::dashboard,
        analytics::sales_trends,
        whatsapp::send_message,
        whatsapp::campaign,
        whatsapp::history,
        ai::query,
        ai::suggestions,
        payments::plans,
        payments::create_order,
        payments::verify,
        payments::history
    ),
    components(
        schemas(
            UserProfile,
            Shop,
            ShopSettings,
            ShopStats,
            PublicShop,
            Address,
            Product,
            ProductStats,
            Customer,
            CustomerPreferences,
            CustomerWithOrders,
            Order,
            OrderCustomer,
            OrderItem,
            StatusChange,
            Message,
            Recipient,
            Payment,
            Plan,
            PlanLimits,
            PlanInfo,
            Segment,
            OrderStatus,
            PaymentStatus,
            PaymentMethod,
            OrderSource,
            MessageType,
            MessageStatus,
            PaymentState,
            TrendPeriod,
            TrendBucket,
            RegisterRequest,
            LoginRequest,
            RefreshRequest,
            AuthResponse,
            AccessTokenResponse,
            CreateShopRequest,
            UpdateShopRequest,
            ShopSettingsInput,
            CreateProductRequest,
            UpdateProductRequest,
            CreateCustomerRequest,
            UpdateCustomerRequest,
            PreferencesInput,
            CreateOrderRequest,
            OrderCustomerInput,
            OrderItemRequest,
            UpdateOrderStatusRequest,
            UpdatePaymentRequest,
            SendMessageRequest,
            SendResult,
            CampaignRequest,
            CampaignRecipient,
            CampaignResult,
            RecipientResult,
            AiQueryRequest,
            AiAnswer,
            AiUsage,
            Dashboard,
            DashboardTotals,
            TodaySummary,
            PeriodSummary,
            TopProduct,
            LowStockProduct,
            SalesTrends,
            CreateCheckoutRequest,
            CheckoutOrder,
            VerifyPaymentRequest,
            VerifiedPlan,
            Pagination,
            params::ProductQuery,
            params::CatalogQuery,
            params::CustomerQuery,
            params::OrderListQuery,
            params::TrendQuery,
            health::HealthData,
            ApiResponse<Shop>,
            ApiResponse<Product>,
            ApiResponse<Order>,
            ApiResponse<Customer>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Account and token endpoints"),
        (name = "Shop", description = "Owner shop profile"),
        (name = "Storefront", description = "Public shop page and ordering"),
        (name = "Products", description = "Catalog endpoints"),
        (name = "Customers", description = "Customer book endpoints"),
        (name = "Orders", description = "Order endpoints"),
        (name = "Analytics", description = "Sales dashboard and trends"),
        (name = "WhatsApp", description = "Customer messaging"),
        (name = "AI", description = "Business assistant"),
        (name = "Payments", description = "Subscription plans and checkout"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}

use localbiz_api::routes::doc::ApiDoc;
use utoipa::OpenApi;

#[tokio::test]
async fn openapi_lists_every_route_group() {
    let doc = ApiDoc::openapi();
    let paths: Vec<&String> = doc.paths.paths.keys().collect();

    for expected in [
        "/health",
        "/api/auth/register",
        "/api/shop/public/{slug}/orders",
        "/api/products/alerts/low-stock",
        "/api/customers/{id}",
        "/api/orders/{id}/send-whatsapp",
        "/api/analytics/sales-trends",
        "/api/whatsapp/campaign",
        "/api/ai/suggestions",
        "/api/payments/verify",
    ] {
        assert!(
            paths.iter().any(|p| p.as_str() == expected),
            "missing {expected} in {paths:?}"
        );
    }

    let components = doc.components.expect("components");
    assert!(components.security_schemes.contains_key("bearer_auth"));
}

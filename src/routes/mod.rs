use std::future::Future;

use axum::Router;

use crate::{
    error::{AppError, AppResult},
    state::AppState,
};

pub mod ai;
pub mod analytics;
pub mod auth;
pub mod customers;
pub mod doc;
pub mod health;
pub mod orders;
pub mod params;
pub mod payments;
pub mod products;
pub mod shop;
pub mod whatsapp;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/shop", shop::router())
        .nest("/products", products::router())
        .nest("/customers", customers::router())
        .nest("/orders", orders::router())
        .nest("/analytics", analytics::router())
        .nest("/whatsapp", whatsapp::router())
        .nest("/ai", ai::router())
        .nest("/payments", payments::router())
}

/// Runs `work` on its own task and waits for it, so dropping the request
/// future (client disconnect) cannot abort a unit of work half way.
pub(crate) async fn run_detached<F, T>(work: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>> + Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(work)
        .await
        .map_err(|err| AppError::Internal(err.into()))?
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            Arc,
            atomic::{AtomicBool, Ordering},
        },
        time::Duration,
    };

    use super::*;

    #[tokio::test]
    async fn detached_work_finishes_after_the_caller_gives_up() {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = finished.clone();
        let caller = run_detached(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            flag.store(true, Ordering::SeqCst);
            Ok::<_, AppError>(())
        });

        let abandoned = tokio::time::timeout(Duration::from_millis(5), caller).await;
        assert!(abandoned.is_err());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(finished.load(Ordering::SeqCst));
    }
}

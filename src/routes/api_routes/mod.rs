use crate::models::AppState;
use axum::routing::{get, post};
use axum::Router;

mod currency;

pub fn init(state: AppState) -> Router {
    Router::new()
        .route("/currencies", get(currency::currencies))
        .route("/currencies/", get(currency::currencies))
        .route("/convert", post(currency::convert))
        .route("/convert/", post(currency::convert))
        .with_state(state)
}

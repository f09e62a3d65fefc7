use crate::state::AppState;
use axum::{routing::get, Router};

mod client;
pub mod handlers;

pub use client::{
    Customer, Customizations, HttpPaymentClient, PaymentClient, PaymentError, PaymentRequest,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/pay/:job_id", get(handlers::pay))
}

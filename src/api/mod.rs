mod args;
mod handlers;

use std::sync::Arc;

use axum::{http::HeaderValue, routing::get, routing::post, Router};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::store::Store;

pub fn create_router(store: Arc<dyn Store>) -> Router {
    create_router_with_env(store, "development")
}

pub fn create_router_with_env(store: Arc<dyn Store>, environment: &str) -> Router {
    let api = Router::new()
        // Leads
        .route("/leads/create", post(handlers::create_lead))
        .route("/leads/get", get(handlers::get_lead))
        .route("/leads/list", get(handlers::list_leads))
        .route("/leads/update", post(handlers::update_lead))
        .route("/leads/add_note", post(handlers::add_lead_note))
        .route("/leads/search", get(handlers::search_leads))
        .route("/leads/delete", post(handlers::delete_lead))
        // Email templates
        .route("/templates/list", get(handlers::list_email_templates))
        .route("/templates/get", get(handlers::get_email_template))
        .route("/templates/create", post(handlers::create_email_template))
        .route("/templates/update", post(handlers::update_email_template))
        .route("/templates/delete", post(handlers::delete_email_template))
        // Emails
        .route("/emails/compose", post(handlers::compose_email))
        .route("/emails/log", post(handlers::log_email))
        .route("/emails/history", get(handlers::get_email_history))
        // Meetings
        .route("/meetings/schedule", post(handlers::schedule_meeting))
        .route("/meetings/update", post(handlers::update_meeting))
        .route("/meetings/delete", post(handlers::delete_meeting))
        .route("/meetings/list", get(handlers::list_meetings))
        // Follow-ups
        .route("/follow_ups/create", post(handlers::create_follow_up))
        .route("/follow_ups/update", post(handlers::update_follow_up))
        .route("/follow_ups/delete", post(handlers::delete_follow_up))
        .route("/follow_ups/complete", post(handlers::complete_follow_up))
        .route("/follow_ups/list", get(handlers::get_follow_ups))
        // Reports
        .route("/pipeline", get(handlers::get_pipeline))
        .route("/sales_report", get(handlers::get_sales_report))
        .route("/lead_activity", get(handlers::get_lead_activity))
        .route("/dashboard", get(handlers::get_dashboard));

    Router::new()
        .nest("/api", api)
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(environment))
        .with_state(store)
}

/// Production serves whatever origin asks; development keeps a whitelist
/// of the usual local dev servers.
fn cors_layer(environment: &str) -> CorsLayer {
    if environment == "production" {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list([
                HeaderValue::from_static("http://localhost:3000"),
                HeaderValue::from_static("http://localhost:5173"),
            ]))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

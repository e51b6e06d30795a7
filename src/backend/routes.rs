use axum::{
    routing::{get, post, put},
    Router,
};

use crate::backend::handlers::{
    bills, budgets, categories, investments, reports, subscriptions, transactions, watchlist,
};
use crate::backend::{auth, AppState};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        // categories and transactions
        .route("/api/categories", get(categories::list).post(categories::create))
        .route("/api/categories/:id", axum::routing::delete(categories::delete))
        .route("/api/transactions", get(transactions::list).post(transactions::create))
        .route(
            "/api/transactions/:id",
            get(transactions::get).delete(transactions::delete),
        )
        // budgets
        .route("/api/budgets", get(budgets::list).post(budgets::create))
        .route("/api/budgets/recommendations", post(budgets::recommendations))
        .route(
            "/api/budgets/:id",
            get(budgets::get).put(budgets::update).delete(budgets::delete),
        )
        .route("/api/budgets/:id/progress", get(budgets::progress))
        // investments
        .route(
            "/api/asset-classes",
            get(investments::list_asset_classes).post(investments::create_asset_class),
        )
        .route(
            "/api/asset-classes/:id",
            put(investments::update_asset_class).delete(investments::delete_asset_class),
        )
        .route(
            "/api/investments",
            get(investments::list_holdings).post(investments::create_holding),
        )
        .route("/api/investments/summary", get(investments::summary))
        .route("/api/investments/rebalance", get(investments::rebalance_plan))
        .route("/api/investments/tax-location", get(investments::tax_location_advice))
        .route("/api/investments/tax-loss-harvesting", get(investments::harvesting))
        .route(
            "/api/investments/:id",
            put(investments::update_holding).delete(investments::delete_holding),
        )
        // subscriptions
        .route(
            "/api/subscriptions",
            get(subscriptions::list).post(subscriptions::create),
        )
        .route("/api/subscriptions/duplicates", get(subscriptions::duplicates))
        .route("/api/subscriptions/summary", get(subscriptions::summary))
        .route(
            "/api/subscriptions/:id",
            get(subscriptions::get)
                .put(subscriptions::update)
                .delete(subscriptions::delete),
        )
        .route(
            "/api/subscriptions/:id/payments",
            get(subscriptions::list_payments).post(subscriptions::record_payment),
        )
        // bills
        .route("/api/bills", get(bills::list).post(bills::create))
        .route(
            "/api/bills/:id",
            get(bills::get).put(bills::update).delete(bills::delete),
        )
        .route("/api/bills/:id/pay", post(bills::pay))
        .route("/api/bills/:id/payments", get(bills::list_payments))
        // watchlist
        .route("/api/watchlist", get(watchlist::list).post(watchlist::add))
        .route(
            "/api/watchlist/:id",
            put(watchlist::update).delete(watchlist::remove),
        )
        // reports
        .route("/api/reports/monthly", get(reports::monthly))
        .route("/api/reports/export", get(reports::export))
        .route("/api/dashboard", get(reports::dashboard))
}

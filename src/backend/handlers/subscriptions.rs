use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::info;

use super::{deleted, require_name, require_positive};
use crate::backend::{AppState, CurrentUser};
use crate::database::db::migrate::recover_missing_table;
use crate::database::db::queries::payments::{self, PaymentTarget};
use crate::database::db::queries::subscriptions;
use crate::database::models::{NewPayment, NewSubscription, Payment, Subscription, SubscriptionStatus};
use crate::error::Result;
use crate::insights::subscriptions::{find_duplicates, summarize, DuplicateGroup, SubscriptionSummary};
use crate::util::{now, today};

fn validate(new: &NewSubscription) -> Result<()> {
    require_name("name", &new.name)?;
    require_name("category", &new.category)?;
    require_positive("cost", new.cost)
}

#[derive(Debug, Default, Deserialize)]
pub struct StatusQuery {
    pub status: Option<SubscriptionStatus>,
}

// GET /api/subscriptions?status=
pub async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<StatusQuery>,
) -> Result<Json<Vec<Subscription>>> {
    let rows = recover_missing_table(&state.db, "subscriptions", || {
        subscriptions::list_subscriptions(&state.db, &user.id, query.status)
    })
    .await?;
    Ok(Json(rows))
}

// POST /api/subscriptions
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(new): Json<NewSubscription>,
) -> Result<(StatusCode, Json<Subscription>)> {
    validate(&new)?;
    let subscription = subscriptions::create_subscription(&state.db, &user.id, &new, now()).await?;
    info!(user_id = %user.id, subscription_id = subscription.id, "subscription created");
    Ok((StatusCode::CREATED, Json(subscription)))
}

// GET /api/subscriptions/:id
pub async fn get(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<Subscription>> {
    Ok(Json(subscriptions::get_subscription(&state.db, &user.id, id).await?))
}

// PUT /api/subscriptions/:id
pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(new): Json<NewSubscription>,
) -> Result<Json<Subscription>> {
    validate(&new)?;
    let subscription = subscriptions::update_subscription(&state.db, &user.id, id, &new).await?;
    info!(user_id = %user.id, subscription_id = id, status = subscription.status.as_str(), "subscription updated");
    Ok(Json(subscription))
}

// DELETE /api/subscriptions/:id
pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    deleted(subscriptions::delete_subscription(&state.db, &user.id, id).await?, "Subscription")
}

// GET /api/subscriptions/duplicates
pub async fn duplicates(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<DuplicateGroup>>> {
    let subs = subscriptions::list_subscriptions(&state.db, &user.id, Some(SubscriptionStatus::Active)).await?;
    Ok(Json(find_duplicates(&subs)))
}

// GET /api/subscriptions/summary
pub async fn summary(State(state): State<AppState>, user: CurrentUser) -> Result<Json<SubscriptionSummary>> {
    let subs = subscriptions::list_subscriptions(&state.db, &user.id, None).await?;
    Ok(Json(summarize(&subs, today())))
}

// GET /api/subscriptions/:id/payments
pub async fn list_payments(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Payment>>> {
    subscriptions::get_subscription(&state.db, &user.id, id).await?;
    let rows = payments::list_payments(&state.db, &user.id, PaymentTarget::Subscription(id)).await?;
    Ok(Json(rows))
}

// POST /api/subscriptions/:id/payments
pub async fn record_payment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payment): Json<NewPayment>,
) -> Result<(StatusCode, Json<Payment>)> {
    if let Some(amount) = payment.amount {
        require_positive("amount", amount)?;
    }
    let recorded = payments::record_subscription_payment(&state.db, &user.id, id, &payment, today()).await?;
    info!(user_id = %user.id, subscription_id = id, payment_id = recorded.id, "subscription payment recorded");
    Ok((StatusCode::CREATED, Json(recorded)))
}

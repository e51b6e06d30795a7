use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::info;

use super::{deleted, require_name, require_positive};
use crate::backend::{AppState, CurrentUser};
use crate::database::db::migrate::recover_missing_table;
use crate::database::db::queries::bills::{self, BillPayment};
use crate::database::db::queries::payments::{self, PaymentTarget};
use crate::database::models::{Bill, BillFilter, NewBill, NewPayment, Payment};
use crate::error::{AppError, Result};
use crate::util::{now, today};

fn validate(new: &NewBill) -> Result<()> {
    require_name("name", &new.name)?;
    require_positive("amount", new.amount)
}

#[derive(Debug, Serialize)]
pub struct BillView {
    #[serde(flatten)]
    pub bill: Bill,
    pub overdue: bool,
}

impl From<Bill> for BillView {
    fn from(bill: Bill) -> Self {
        let overdue = bill.is_overdue(today());
        Self { bill, overdue }
    }
}

#[derive(Debug, Serialize)]
pub struct PaidBill {
    pub bill: BillView,
    pub payment: Payment,
}

// GET /api/bills?status=&upcoming_days=
pub async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(filter): Query<BillFilter>,
) -> Result<Json<Vec<BillView>>> {
    let rows = recover_missing_table(&state.db, "bills", || {
        bills::list_bills(&state.db, &user.id, &filter, today())
    })
    .await?;
    Ok(Json(rows.into_iter().map(BillView::from).collect()))
}

// POST /api/bills
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(new): Json<NewBill>,
) -> Result<(StatusCode, Json<BillView>)> {
    validate(&new)?;
    let bill = bills::create_bill(&state.db, &user.id, &new, now()).await?;
    info!(user_id = %user.id, bill_id = bill.id, "bill created");
    Ok((StatusCode::CREATED, Json(bill.into())))
}

// GET /api/bills/:id
pub async fn get(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<BillView>> {
    Ok(Json(bills::get_bill(&state.db, &user.id, id).await?.into()))
}

// PUT /api/bills/:id
pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(new): Json<NewBill>,
) -> Result<Json<BillView>> {
    validate(&new)?;
    Ok(Json(bills::update_bill(&state.db, &user.id, id, &new).await?.into()))
}

// DELETE /api/bills/:id
pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    deleted(bills::delete_bill(&state.db, &user.id, id).await?, "Bill")
}

// POST /api/bills/:id/pay
pub async fn pay(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    payment: Option<Json<NewPayment>>,
) -> Result<Json<PaidBill>> {
    let payment = payment.map(|Json(p)| p).unwrap_or_default();
    if let Some(amount) = payment.amount {
        require_positive("amount", amount)?;
    }

    let (bill, recorded) = match bills::pay_bill(&state.db, &user.id, id, &payment, today()).await? {
        BillPayment::Paid(bill, recorded) => (bill, recorded),
        BillPayment::AlreadyPaid => {
            return Err(AppError::Conflict("Bill is already paid".to_string()));
        }
    };
    info!(
        user_id = %user.id,
        bill_id = id,
        next_due = %bill.due_date,
        status = bill.status.as_str(),
        "bill paid"
    );
    Ok(Json(PaidBill {
        bill: bill.into(),
        payment: recorded,
    }))
}

// GET /api/bills/:id/payments
pub async fn list_payments(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Payment>>> {
    bills::get_bill(&state.db, &user.id, id).await?;
    Ok(Json(payments::list_payments(&state.db, &user.id, PaymentTarget::Bill(id)).await?))
}

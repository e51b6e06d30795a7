//! End-to-end tests driving the router against an in-memory database.

use std::str::FromStr;

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tower::ServiceExt;

use finance_planner::backend::{build_router, AppState};
use finance_planner::config::Config;
use finance_planner::database::db::connection::get_memory_pool;
use finance_planner::database::db::migrate::run_migrations;

async fn app() -> Router {
    let pool = get_memory_pool().await.unwrap();
    run_migrations(&pool).await.unwrap();
    build_router(AppState::new(pool, Config::default()))
}

async fn call(app: &Router, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Response<Body> {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let body = match body {
        Some(value) => {
            req = req.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    app.clone().oneshot(req.body(body).unwrap()).await.unwrap()
}

async fn read_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    }
}

async fn send(app: &Router, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let response = call(app, method, uri, token, body).await;
    let status = response.status();
    (status, read_json(response).await)
}

fn dec(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).unwrap(),
        other => Decimal::from_str(&other.to_string()).unwrap(),
    }
}

async fn signup(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({ "email": email, "password": "correct horse", "display_name": "Test" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["token"].as_str().unwrap().to_string()
}

async fn create(app: &Router, token: &str, uri: &str, body: Value) -> Value {
    let (status, value) = send(app, "POST", uri, Some(token), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "POST {} -> {}", uri, value);
    value
}

#[tokio::test]
async fn health_is_public() {
    let app = app().await;
    let response = call(&app, "GET", "/health", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn api_requires_a_session() {
    let app = app().await;

    let (status, body) = send(&app, "GET", "/api/categories", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, _) = send(&app, "GET", "/api/bills", Some("not-a-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn signup_login_and_logout() {
    let app = app().await;
    let token = signup(&app, "Alice@Example.com").await;

    let (status, me) = send(&app, "GET", "/api/auth/me", Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "alice@example.com");

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({ "email": "alice@example.com", "password": "another pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "alice@example.com", "password": "wrong password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let response = call(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "alice@example.com", "password": "correct horse" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("session="));
    assert!(cookie.contains("HttpOnly"));

    // the cookie alone authenticates
    let session = cookie.split(';').next().unwrap().to_string();
    let request = Request::builder()
        .uri("/api/auth/me")
        .header(header::COOKIE, session)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (status, _) = send(&app, "POST", "/api/auth/logout", Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", "/api/auth/me", Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn short_passwords_are_rejected() {
    let app = app().await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({ "email": "bob@example.com", "password": "short" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Password"));
}

#[tokio::test]
async fn rows_are_scoped_to_their_owner() {
    let app = app().await;
    let alice = signup(&app, "alice@example.com").await;
    let bob = signup(&app, "bob@example.com").await;

    let category = create(&app, &alice, "/api/categories", json!({ "name": "Rent", "kind": "expense" })).await;
    let category_id = category["id"].as_i64().unwrap();
    create(
        &app,
        &alice,
        "/api/transactions",
        json!({
            "category_id": category_id,
            "amount": "1200.00",
            "is_expense": true,
            "transacted_at": "2024-01-01"
        }),
    )
    .await;

    let (_, bobs) = send(&app, "GET", "/api/categories", Some(bob.as_str()), None).await;
    assert_eq!(bobs.as_array().unwrap().len(), 0);
    let (_, bobs) = send(&app, "GET", "/api/transactions", Some(bob.as_str()), None).await;
    assert_eq!(bobs.as_array().unwrap().len(), 0);

    let uri = format!("/api/categories/{}", category_id);
    let (status, _) = send(&app, "DELETE", &uri, Some(bob.as_str()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "POST",
        "/api/transactions",
        Some(bob.as_str()),
        Some(json!({
            "category_id": category_id,
            "amount": "5",
            "is_expense": true,
            "transacted_at": "2024-01-02"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", &uri, Some(alice.as_str()), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn non_positive_amounts_are_rejected() {
    let app = app().await;
    let token = signup(&app, "alice@example.com").await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/transactions",
        Some(token.as_str()),
        Some(json!({ "amount": "0", "is_expense": true, "transacted_at": "2024-01-01" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn budget_progress_counts_spending_in_period() {
    let app = app().await;
    let token = signup(&app, "alice@example.com").await;

    let rent = create(&app, &token, "/api/categories", json!({ "name": "Rent", "kind": "expense" })).await;
    let rent_id = rent["id"].as_i64().unwrap();

    let budget = create(
        &app,
        &token,
        "/api/budgets",
        json!({
            "name": "January",
            "method": "traditional",
            "period_start": "2024-01-01",
            "period_end": "2024-01-31",
            "income": "3000",
            "categories": [{ "category_id": rent_id, "allocated_amount": "1200" }]
        }),
    )
    .await;
    assert_eq!(dec(&budget["total_amount"]), Decimal::from(1200));
    assert_eq!(budget["categories"].as_array().unwrap().len(), 1);

    for (amount, day) in [("1000", "2024-01-05"), ("300", "2024-02-01")] {
        create(
            &app,
            &token,
            "/api/transactions",
            json!({ "category_id": rent_id, "amount": amount, "is_expense": true, "transacted_at": day }),
        )
        .await;
    }

    let uri = format!("/api/budgets/{}/progress", budget["id"]);
    let (status, progress) = send(&app, "GET", &uri, Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    let line = &progress["lines"][0];
    assert_eq!(dec(&line["spent"]), Decimal::from(1000));
    assert_eq!(dec(&line["remaining"]), Decimal::from(200));
    assert_eq!(dec(&line["percent_used"]), Decimal::new(8333, 2));

    let (status, _) = send(
        &app,
        "POST",
        "/api/budgets",
        Some(token.as_str()),
        Some(json!({
            "name": "Backwards",
            "period_start": "2024-02-01",
            "period_end": "2024-01-01",
            "income": "100"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn zero_based_recommendation_balances_to_income() {
    let app = app().await;
    let token = signup(&app, "alice@example.com").await;

    let rent = create(&app, &token, "/api/categories", json!({ "name": "Rent", "kind": "expense" })).await;
    let fun = create(&app, &token, "/api/categories", json!({ "name": "Concerts", "kind": "expense" })).await;

    for day in ["2024-01-01", "2024-02-01", "2024-03-01"] {
        create(
            &app,
            &token,
            "/api/transactions",
            json!({ "category_id": rent["id"], "amount": "1200", "is_expense": true, "transacted_at": day }),
        )
        .await;
    }
    create(
        &app,
        &token,
        "/api/transactions",
        json!({ "category_id": fun["id"], "amount": "150", "is_expense": true, "transacted_at": "2024-03-10" }),
    )
    .await;

    let (status, rec) = send(
        &app,
        "POST",
        "/api/budgets/recommendations",
        Some(token.as_str()),
        Some(json!({ "income": "3000", "method": "zero_based", "as_of": "2024-03-31" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", rec);

    let categories = rec["categories"].as_array().unwrap();
    assert_eq!(categories[0]["category_name"], "Rent");
    assert_eq!(categories[0]["classification"], "need");
    assert_eq!(dec(&categories[0]["recommended_amount"]), Decimal::from(1200));

    let allocated: Decimal = categories.iter().map(|c| dec(&c["recommended_amount"])).sum();
    assert_eq!(allocated + dec(&rec["unallocated"]), Decimal::from(3000));
}

#[tokio::test]
async fn recommendations_average_over_the_lookback_window() {
    let app = app().await;
    let token = signup(&app, "alice@example.com").await;

    let gym = create(&app, &token, "/api/categories", json!({ "name": "Gym", "kind": "expense" })).await;
    for day in ["2023-12-20", "2024-01-20", "2024-02-20", "2024-03-20", "2024-04-20", "2024-05-20"] {
        create(
            &app,
            &token,
            "/api/transactions",
            json!({ "category_id": gym["id"], "amount": "100", "is_expense": true, "transacted_at": day }),
        )
        .await;
    }

    let (status, rec) = send(
        &app,
        "POST",
        "/api/budgets/recommendations",
        Some(token.as_str()),
        Some(json!({ "income": "3000", "method": "envelope", "as_of": "2024-06-18" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", rec);

    let gym = &rec["categories"][0];
    assert_eq!(dec(&gym["monthly_average"]), Decimal::from(100));
    assert_eq!(dec(&gym["frequency"]), Decimal::ONE);
}

#[tokio::test]
async fn oversized_holdings_are_rejected() {
    let app = app().await;
    let token = signup(&app, "alice@example.com").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/investments",
        Some(token.as_str()),
        Some(json!({
            "symbol": "HUGE", "name": "Overflow", "account_type": "taxable",
            "quantity": "79228162514264337593543950335", "cost_basis": "1", "current_price": "2"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);

    let (status, summary) = send(&app, "GET", "/api/investments/summary", Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::OK, "{}", summary);

    let (status, _) = send(
        &app,
        "POST",
        "/api/budgets/recommendations",
        Some(token.as_str()),
        Some(json!({ "income": "79228162514264337593543950335", "method": "fifty_thirty_twenty" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn transaction_paging_is_validated() {
    let app = app().await;
    let token = signup(&app, "alice@example.com").await;

    for uri in ["/api/transactions?limit=-1", "/api/transactions?limit=201", "/api/transactions?offset=-3"] {
        let (status, body) = send(&app, "GET", uri, Some(token.as_str()), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{} -> {}", uri, body);
    }
    let (status, _) = send(&app, "GET", "/api/transactions?limit=5&offset=0", Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn rebalance_and_tax_advice() {
    let app = app().await;
    let token = signup(&app, "alice@example.com").await;

    let stocks = create(&app, &token, "/api/asset-classes", json!({ "name": "US Stocks", "target_percentage": "60" })).await;
    let bonds = create(&app, &token, "/api/asset-classes", json!({ "name": "Bonds", "target_percentage": "40" })).await;

    create(
        &app,
        &token,
        "/api/investments",
        json!({
            "asset_class_id": stocks["id"], "symbol": "VTI", "name": "Total Market",
            "account_type": "taxable", "quantity": "8", "cost_basis": "700", "current_price": "100"
        }),
    )
    .await;
    create(
        &app,
        &token,
        "/api/investments",
        json!({
            "asset_class_id": bonds["id"], "symbol": "BND", "name": "Total Bond",
            "account_type": "taxable", "quantity": "2", "cost_basis": "400", "current_price": "100"
        }),
    )
    .await;

    let (status, plan) = send(&app, "GET", "/api/investments/rebalance", Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dec(&plan["total_value"]), Decimal::from(1000));
    for line in plan["lines"].as_array().unwrap() {
        let expected = (dec(&line["target_percentage"]) - dec(&line["current_percentage"]))
            * dec(&plan["total_value"])
            / Decimal::ONE_HUNDRED;
        assert_eq!(dec(&line["delta_amount"]), expected);
    }
    let bond_line = plan["lines"]
        .as_array()
        .unwrap()
        .iter()
        .find(|l| l["asset_class"] == "Bonds")
        .unwrap();
    assert_eq!(bond_line["action"], "buy");
    assert_eq!(dec(&bond_line["delta_amount"]), Decimal::from(200));

    let (_, suggestions) = send(&app, "GET", "/api/investments/tax-location", Some(token.as_str()), None).await;
    let suggestions = suggestions.as_array().unwrap();
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0]["symbol"], "BND");
    assert_eq!(suggestions[0]["preferred_account"], "tax_deferred");

    let (_, harvest) = send(&app, "GET", "/api/investments/tax-loss-harvesting", Some(token.as_str()), None).await;
    let harvest = harvest.as_array().unwrap();
    assert_eq!(harvest.len(), 1);
    assert_eq!(dec(&harvest[0]["unrealized_loss"]), Decimal::from(200));
    assert_eq!(dec(&harvest[0]["estimated_tax_savings"]), Decimal::from(48));

    let (status, _) = send(
        &app,
        "POST",
        "/api/asset-classes",
        Some(token.as_str()),
        Some(json!({ "name": "Crypto", "target_percentage": "150" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_subscriptions_are_grouped() {
    let app = app().await;
    let token = signup(&app, "alice@example.com").await;

    for (name, category, cost, status) in [
        ("Netflix", "Streaming", "15.49", "active"),
        ("Hulu", "streaming ", "7.99", "active"),
        ("Disney+", "Streaming", "9.99", "cancelled"),
        ("Spotify", "Music", "10.99", "active"),
    ] {
        create(
            &app,
            &token,
            "/api/subscriptions",
            json!({ "name": name, "category": category, "cost": cost, "billing_cycle": "monthly", "status": status }),
        )
        .await;
    }

    let (status, groups) = send(&app, "GET", "/api/subscriptions/duplicates", Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    let groups = groups.as_array().unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0]["subscriptions"].as_array().unwrap().len(), 2);
    assert_eq!(dec(&groups[0]["potential_monthly_savings"]), Decimal::new(799, 2));

    let (_, summary) = send(&app, "GET", "/api/subscriptions/summary", Some(token.as_str()), None).await;
    assert_eq!(summary["active_count"], 3);
    assert_eq!(summary["cancelled_count"], 1);
}

#[tokio::test]
async fn paying_bills_advances_or_closes_them() {
    let app = app().await;
    let token = signup(&app, "alice@example.com").await;

    let rent = create(
        &app,
        &token,
        "/api/bills",
        json!({ "name": "Rent", "amount": "1200", "due_date": "2024-01-31", "recurrence": "monthly" }),
    )
    .await;
    let repair = create(
        &app,
        &token,
        "/api/bills",
        json!({ "name": "Boiler repair", "amount": "300", "due_date": "2024-01-15" }),
    )
    .await;
    assert_eq!(rent["overdue"], true);

    let uri = format!("/api/bills/{}/pay", rent["id"]);
    let (status, paid) = send(&app, "POST", &uri, Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::OK, "{}", paid);
    assert_eq!(paid["bill"]["due_date"], "2024-02-29");
    assert_eq!(paid["bill"]["status"], "unpaid");
    assert_eq!(dec(&paid["payment"]["amount"]), Decimal::from(1200));

    let uri = format!("/api/bills/{}/pay", repair["id"]);
    let (_, paid) = send(&app, "POST", &uri, Some(token.as_str()), Some(json!({ "amount": "280.50" }))).await;
    assert_eq!(paid["bill"]["status"], "paid");
    assert_eq!(paid["bill"]["overdue"], false);

    let uri = format!("/api/bills/{}/payments", rent["id"]);
    let (_, payments) = send(&app, "GET", &uri, Some(token.as_str()), None).await;
    assert_eq!(payments.as_array().unwrap().len(), 1);

    let (_, unpaid) = send(&app, "GET", "/api/bills?status=unpaid", Some(token.as_str()), None).await;
    assert_eq!(unpaid.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn a_settled_one_off_bill_cannot_be_paid_again() {
    let app = app().await;
    let token = signup(&app, "alice@example.com").await;

    let repair = create(
        &app,
        &token,
        "/api/bills",
        json!({ "name": "Boiler repair", "amount": "300", "due_date": "2024-01-15" }),
    )
    .await;
    let uri = format!("/api/bills/{}/pay", repair["id"]);

    let (status, _) = send(&app, "POST", &uri, Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(&app, "POST", &uri, Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::CONFLICT, "{}", body);

    let uri = format!("/api/bills/{}/payments", repair["id"]);
    let (_, payments) = send(&app, "GET", &uri, Some(token.as_str()), None).await;
    assert_eq!(payments.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn month_end_bills_keep_their_due_day() {
    let app = app().await;
    let token = signup(&app, "alice@example.com").await;

    let rent = create(
        &app,
        &token,
        "/api/bills",
        json!({ "name": "Rent", "amount": "1200", "due_date": "2024-01-31", "recurrence": "monthly" }),
    )
    .await;
    let uri = format!("/api/bills/{}/pay", rent["id"]);

    let mut due = Vec::new();
    for _ in 0..3 {
        let (status, paid) = send(&app, "POST", &uri, Some(token.as_str()), None).await;
        assert_eq!(status, StatusCode::OK, "{}", paid);
        due.push(paid["bill"]["due_date"].as_str().unwrap().to_string());
    }
    assert_eq!(due, ["2024-02-29", "2024-03-31", "2024-04-30"]);
}

#[tokio::test]
async fn huge_upcoming_windows_still_skip_paid_bills() {
    let app = app().await;
    let token = signup(&app, "alice@example.com").await;

    let repair = create(
        &app,
        &token,
        "/api/bills",
        json!({ "name": "Boiler repair", "amount": "300", "due_date": "2024-01-15" }),
    )
    .await;
    create(&app, &token, "/api/bills", json!({ "name": "Dentist", "amount": "90", "due_date": "2024-02-01" })).await;
    let uri = format!("/api/bills/{}/pay", repair["id"]);
    send(&app, "POST", &uri, Some(token.as_str()), None).await;

    let (status, bills) = send(&app, "GET", "/api/bills?upcoming_days=4000000000", Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::OK, "{}", bills);
    let bills = bills.as_array().unwrap();
    assert_eq!(bills.len(), 1);
    assert_eq!(bills[0]["name"], "Dentist");
}

#[tokio::test]
async fn watchlist_symbols_are_unique_per_user() {
    let app = app().await;
    let token = signup(&app, "alice@example.com").await;

    create(&app, &token, "/api/watchlist", json!({ "symbol": "AAPL", "target_price": "150" })).await;
    let (status, _) = send(&app, "POST", "/api/watchlist", Some(token.as_str()), Some(json!({ "symbol": "AAPL" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let other = signup(&app, "bob@example.com").await;
    create(&app, &other, "/api/watchlist", json!({ "symbol": "AAPL" })).await;
}

#[tokio::test]
async fn monthly_report_and_csv_export() {
    let app = app().await;
    let token = signup(&app, "alice@example.com").await;

    let food = create(&app, &token, "/api/categories", json!({ "name": "Food", "kind": "expense" })).await;
    create(
        &app,
        &token,
        "/api/transactions",
        json!({ "amount": "2500", "is_expense": false, "transacted_at": "2024-01-01", "description": "Salary" }),
    )
    .await;
    create(
        &app,
        &token,
        "/api/transactions",
        json!({
            "category_id": food["id"], "amount": "42.10", "is_expense": true,
            "transacted_at": "2024-01-12", "description": "Groceries, weekly"
        }),
    )
    .await;

    let (status, report) = send(
        &app,
        "GET",
        "/api/reports/monthly?from=2024-01-01&to=2024-01-31",
        Some(token.as_str()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["months"].as_array().unwrap().len(), 1);
    assert_eq!(dec(&report["net"]), Decimal::new(245790, 2));

    let response = call(
        &app,
        "GET",
        "/api/reports/export?format=csv&from=2024-01-01&to=2024-01-31",
        Some(token.as_str()),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/csv; charset=utf-8"
    );
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let csv = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(csv.starts_with("date,category,description,type,amount\n"));
    assert!(csv.contains("2024-01-12,Food,\"Groceries, weekly\",expense,42.10"));

    let (status, _) = send(&app, "GET", "/api/reports/export?format=docx", Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn dashboard_renders_for_a_new_user() {
    let app = app().await;
    let token = signup(&app, "alice@example.com").await;

    let (status, dashboard) = send(&app, "GET", "/api/dashboard", Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["active_budgets"], 0);
    assert_eq!(dashboard["overdue_bills"], 0);
    assert_eq!(dec(&dashboard["portfolio_value"]), Decimal::ZERO);
}

use chrono::NaiveDateTime;
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

use crate::database::models::{User, UserCredentials};

fn user_from_row(row: &SqliteRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        display_name: row.try_get("display_name")?,
        created_at: row.try_get("created_at")?,
    })
}

pub async fn create_user(
    pool: &Pool<Sqlite>,
    id: &str,
    email: &str,
    display_name: Option<&str>,
    password_hash: &str,
    password_salt: &str,
    created_at: NaiveDateTime,
) -> Result<User, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO users (id, email, password_hash, password_salt, display_name, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING id, email, display_name, created_at
        "#,
    )
    .bind(id)
    .bind(email)
    .bind(password_hash)
    .bind(password_salt)
    .bind(display_name)
    .bind(created_at)
    .fetch_one(pool)
    .await?;

    user_from_row(&row)
}

pub async fn get_user(pool: &Pool<Sqlite>, user_id: &str) -> Result<User, sqlx::Error> {
    let row = sqlx::query("SELECT id, email, display_name, created_at FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await?;

    user_from_row(&row)
}

pub async fn find_credentials_by_email(
    pool: &Pool<Sqlite>,
    email: &str,
) -> Result<Option<(User, UserCredentials)>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT id, email, display_name, created_at, password_hash, password_salt
        FROM users
        WHERE email = ?
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    row.map(|row| {
        let user = user_from_row(&row)?;
        let credentials = UserCredentials {
            user_id: user.id.clone(),
            password_hash: row.try_get("password_hash")?,
            password_salt: row.try_get("password_salt")?,
        };
        Ok((user, credentials))
    })
    .transpose()
}

/*==========Session Queries=========== */

pub async fn create_session(
    pool: &Pool<Sqlite>,
    token: &str,
    user_id: &str,
    created_at: NaiveDateTime,
    expires_at: NaiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO sessions (token, user_id, created_at, expires_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(token)
    .bind(user_id)
    .bind(created_at)
    .bind(expires_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// The user owning `token`, if the session exists and has not expired.
pub async fn find_session_user(
    pool: &Pool<Sqlite>,
    token: &str,
    now: NaiveDateTime,
) -> Result<Option<User>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT u.id, u.email, u.display_name, u.created_at
        FROM sessions s
        JOIN users u ON u.id = s.user_id
        WHERE s.token = ? AND s.expires_at > ?
        "#,
    )
    .bind(token)
    .bind(now)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(user_from_row).transpose()
}

pub async fn delete_session(pool: &Pool<Sqlite>, token: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM sessions WHERE token = ?")
        .bind(token)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn delete_expired_sessions(
    pool: &Pool<Sqlite>,
    now: NaiveDateTime,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
        .bind(now)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

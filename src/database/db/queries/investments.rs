use chrono::NaiveDateTime;
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

use super::{decimal_col, enum_col};
use crate::database::models::{AssetClass, Holding, NewAssetClass, NewHolding};

/*==========Asset Class Queries=========== */

fn asset_class_from_row(row: &SqliteRow) -> Result<AssetClass, sqlx::Error> {
    Ok(AssetClass {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        target_percentage: decimal_col(row, "target_percentage")?,
    })
}

pub async fn create_asset_class(
    pool: &Pool<Sqlite>,
    user_id: &str,
    new: &NewAssetClass,
) -> Result<AssetClass, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO asset_classes (user_id, name, target_percentage)
        VALUES (?, ?, ?)
        RETURNING id, name, target_percentage
        "#,
    )
    .bind(user_id)
    .bind(new.name.trim())
    .bind(new.target_percentage.to_string())
    .fetch_one(pool)
    .await?;

    asset_class_from_row(&row)
}

pub async fn list_asset_classes(
    pool: &Pool<Sqlite>,
    user_id: &str,
) -> Result<Vec<AssetClass>, sqlx::Error> {
    sqlx::query(
        r#"
        SELECT id, name, target_percentage
        FROM asset_classes
        WHERE user_id = ?
        ORDER BY name ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?
    .iter()
    .map(asset_class_from_row)
    .collect()
}

pub async fn update_asset_class(
    pool: &Pool<Sqlite>,
    user_id: &str,
    asset_class_id: i64,
    new: &NewAssetClass,
) -> Result<AssetClass, sqlx::Error> {
    let row = sqlx::query(
        r#"
        UPDATE asset_classes
        SET name = ?, target_percentage = ?
        WHERE id = ? AND user_id = ?
        RETURNING id, name, target_percentage
        "#,
    )
    .bind(new.name.trim())
    .bind(new.target_percentage.to_string())
    .bind(asset_class_id)
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    asset_class_from_row(&row)
}

pub async fn delete_asset_class(
    pool: &Pool<Sqlite>,
    user_id: &str,
    asset_class_id: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM asset_classes WHERE id = ? AND user_id = ?")
        .bind(asset_class_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/*==========Holding Queries=========== */

const SELECT_HOLDINGS: &str = r#"
    SELECT
        i.id, i.asset_class_id, a.name AS asset_class_name, i.symbol, i.name,
        i.account_type, i.quantity, i.cost_basis, i.current_price, i.updated_at
    FROM investments i
    LEFT JOIN asset_classes a ON a.id = i.asset_class_id
"#;

fn holding_from_row(row: &SqliteRow) -> Result<Holding, sqlx::Error> {
    Ok(Holding {
        id: row.try_get("id")?,
        asset_class_id: row.try_get("asset_class_id")?,
        asset_class_name: row.try_get("asset_class_name")?,
        symbol: row.try_get("symbol")?,
        name: row.try_get("name")?,
        account_type: enum_col(row, "account_type")?,
        quantity: decimal_col(row, "quantity")?,
        cost_basis: decimal_col(row, "cost_basis")?,
        current_price: decimal_col(row, "current_price")?,
        updated_at: row.try_get("updated_at")?,
    })
}

async fn check_asset_class_owner(
    pool: &Pool<Sqlite>,
    user_id: &str,
    asset_class_id: Option<i64>,
) -> Result<(), sqlx::Error> {
    if let Some(id) = asset_class_id {
        sqlx::query_scalar::<_, i64>("SELECT id FROM asset_classes WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .fetch_one(pool)
            .await?;
    }
    Ok(())
}

pub async fn create_holding(
    pool: &Pool<Sqlite>,
    user_id: &str,
    new: &NewHolding,
    now: NaiveDateTime,
) -> Result<Holding, sqlx::Error> {
    check_asset_class_owner(pool, user_id, new.asset_class_id).await?;

    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO investments (
            user_id, asset_class_id, symbol, name, account_type,
            quantity, cost_basis, current_price, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(new.asset_class_id)
    .bind(new.symbol.trim().to_uppercase())
    .bind(new.name.trim())
    .bind(new.account_type.as_str())
    .bind(new.quantity.to_string())
    .bind(new.cost_basis.to_string())
    .bind(new.current_price.to_string())
    .bind(now)
    .fetch_one(pool)
    .await?;

    get_holding(pool, user_id, id).await
}

pub async fn get_holding(
    pool: &Pool<Sqlite>,
    user_id: &str,
    holding_id: i64,
) -> Result<Holding, sqlx::Error> {
    let sql = format!("{} WHERE i.id = ? AND i.user_id = ?", SELECT_HOLDINGS);
    let row = sqlx::query(&sql)
        .bind(holding_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

    holding_from_row(&row)
}

pub async fn list_holdings(pool: &Pool<Sqlite>, user_id: &str) -> Result<Vec<Holding>, sqlx::Error> {
    let sql = format!("{} WHERE i.user_id = ? ORDER BY i.symbol ASC, i.id ASC", SELECT_HOLDINGS);
    sqlx::query(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await?
        .iter()
        .map(holding_from_row)
        .collect()
}

pub async fn update_holding(
    pool: &Pool<Sqlite>,
    user_id: &str,
    holding_id: i64,
    new: &NewHolding,
    now: NaiveDateTime,
) -> Result<Holding, sqlx::Error> {
    check_asset_class_owner(pool, user_id, new.asset_class_id).await?;

    let result = sqlx::query(
        r#"
        UPDATE investments
        SET asset_class_id = ?, symbol = ?, name = ?, account_type = ?,
            quantity = ?, cost_basis = ?, current_price = ?, updated_at = ?
        WHERE id = ? AND user_id = ?
        "#,
    )
    .bind(new.asset_class_id)
    .bind(new.symbol.trim().to_uppercase())
    .bind(new.name.trim())
    .bind(new.account_type.as_str())
    .bind(new.quantity.to_string())
    .bind(new.cost_basis.to_string())
    .bind(new.current_price.to_string())
    .bind(now)
    .bind(holding_id)
    .bind(user_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(sqlx::Error::RowNotFound);
    }

    get_holding(pool, user_id, holding_id).await
}

pub async fn delete_holding(
    pool: &Pool<Sqlite>,
    user_id: &str,
    holding_id: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM investments WHERE id = ? AND user_id = ?")
        .bind(holding_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

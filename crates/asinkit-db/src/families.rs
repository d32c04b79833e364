//! Database operations for `family_runs`, `family_members`, and
//! `unavailable_members`.

use asinkit_family::FamilyResult;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `family_runs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FamilyRunRow {
    pub id: i64,
    pub public_id: Uuid,
    pub seed_asin: String,
    pub parent_asin: String,
    /// JSON array of attribute names in first-sighting order.
    pub attribute_names: serde_json::Value,
    pub parent_title_normalized: String,
    pub parent_title_excluding_variant_normalized: String,
    pub member_count: i32,
    pub unavailable_count: i32,
    pub created_at: DateTime<Utc>,
}

/// Persists a finished family in a single transaction and returns the new
/// run's id.
///
/// Members and unavailable entries keep their result order in `position`.
/// Attribute values are stored as a JSONB object per member.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any insert fails; nothing is written in that
/// case.
pub async fn save_family(pool: &PgPool, result: &FamilyResult) -> Result<i64, DbError> {
    let mut tx = pool.begin().await?;

    let run_id: i64 = sqlx::query_scalar(
        "INSERT INTO family_runs \
           (public_id, seed_asin, parent_asin, attribute_names, parent_title_normalized, \
            parent_title_excluding_variant_normalized, member_count, unavailable_count) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         RETURNING id",
    )
    .bind(Uuid::new_v4())
    .bind(result.seed_asin())
    .bind(result.parent_asin())
    .bind(json!(result.attribute_names()))
    .bind(result.parent_title_normalized())
    .bind(result.parent_title_excluding_variant_normalized())
    .bind(count_i32(result.members().len()))
    .bind(count_i32(result.unavailable().len()))
    .fetch_one(&mut *tx)
    .await?;

    for (position, member) in result.members().iter().enumerate() {
        sqlx::query(
            "INSERT INTO family_members \
               (family_run_id, position, asin, parent_asin, title, title_excluding_variant, \
                category, relationship, attribute_values) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(run_id)
        .bind(count_i32(position))
        .bind(&member.asin)
        .bind(&member.parent_asin)
        .bind(&member.title)
        .bind(member.title_excluding_variant.as_deref())
        .bind(member.category.as_deref())
        .bind(member.relationship.as_str())
        .bind(json!(member.attribute_values))
        .execute(&mut *tx)
        .await?;
    }

    for (position, entry) in result.unavailable().iter().enumerate() {
        sqlx::query(
            "INSERT INTO unavailable_members \
               (family_run_id, position, asin, parent_asin, status, title) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(run_id)
        .bind(count_i32(position))
        .bind(&entry.asin)
        .bind(entry.parent_asin.as_deref())
        .bind(entry.status.as_str())
        .bind(&entry.title)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    tracing::debug!(
        run_id,
        seed = result.seed_asin(),
        members = result.members().len(),
        unavailable = result.unavailable().len(),
        "family saved"
    );
    Ok(run_id)
}

/// Fetches a saved run by id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_family_run(pool: &PgPool, id: i64) -> Result<Option<FamilyRunRow>, DbError> {
    let row = sqlx::query_as::<_, FamilyRunRow>(
        "SELECT id, public_id, seed_asin, parent_asin, attribute_names, parent_title_normalized, \
                parent_title_excluding_variant_normalized, member_count, unavailable_count, \
                created_at \
         FROM family_runs WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

fn count_i32(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

use chrono::{DateTime, Utc};
use futures::stream::{Stream, StreamExt};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use thiserror::Error;

use housing_core::domain::post::{Author, Gender, LeaseDuration, Post, PostType, PriceRange};

#[derive(Debug, Error)]
pub enum PostsRepoError {
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("invalid stored post {id}: {reason}")]
    InvalidRow { id: String, reason: String },
}

/// Lazily streams every post in feed order, newest first, skipping the first
/// `skip` rows. Dropping the stream releases its connection.
pub fn scan_posts(
    pool: &PgPool,
    skip: u64,
) -> impl Stream<Item = Result<Post, PostsRepoError>> + Send + '_ {
    let skip = i64::try_from(skip).unwrap_or(i64::MAX);
    sqlx::query(
        r#"
        SELECT id,
               created_at,
               msg,
               post_type,
               price_low,
               price_high,
               duration_start,
               duration_end,
               desired_gender,
               amenities,
               author_name,
               author_id,
               author_profile_img_url
        FROM posts
        ORDER BY created_at DESC, id DESC
        OFFSET $1
        "#,
    )
    .bind(skip)
    .fetch(pool)
    .map(decode_row)
}

/// Appends posts. Ids already stored are left untouched.
pub async fn insert_posts(pool: &PgPool, posts: &[Post]) -> Result<u64, PostsRepoError> {
    let mut tx = pool.begin().await?;
    let mut inserted = 0;
    for post in posts {
        let result = sqlx::query(
            r#"
            INSERT INTO posts (
                id,
                created_at,
                msg,
                post_type,
                price_low,
                price_high,
                duration_start,
                duration_end,
                desired_gender,
                amenities,
                author_name,
                author_id,
                author_profile_img_url
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(&post.id)
        .bind(post.created_at)
        .bind(&post.message)
        .bind(post.post_type.as_str())
        .bind(to_db_price(&post.id, post.price_low())?)
        .bind(to_db_price(&post.id, post.price_high())?)
        .bind(post.move_in())
        .bind(post.move_out())
        .bind(post.desired_gender.map(|gender| gender.as_str()))
        .bind(&post.amenities)
        .bind(&post.author.name)
        .bind(&post.author.id)
        .bind(&post.author.profile_img_url)
        .execute(&mut *tx)
        .await?;
        inserted += result.rows_affected();
    }
    tx.commit().await?;
    Ok(inserted)
}

pub async fn count_posts(pool: &PgPool) -> Result<i64, PostsRepoError> {
    let row = sqlx::query(
        r#"
        SELECT COUNT(*) AS count
        FROM posts
        "#,
    )
    .fetch_one(pool)
    .await?;
    let count: i64 = row.try_get("count")?;
    Ok(count)
}

fn decode_row(row: Result<PgRow, sqlx::Error>) -> Result<Post, PostsRepoError> {
    map_post(&row?)
}

fn map_post(row: &PgRow) -> Result<Post, PostsRepoError> {
    let id: String = row.try_get("id")?;
    let invalid = |reason: String| PostsRepoError::InvalidRow {
        id: id.clone(),
        reason,
    };

    let post_type: String = row.try_get("post_type")?;
    let post_type = post_type
        .parse::<PostType>()
        .map_err(|err| invalid(format!("{err}")))?;
    let desired_gender: Option<String> = row.try_get("desired_gender")?;
    let desired_gender = desired_gender
        .as_deref()
        .map(str::parse::<Gender>)
        .transpose()
        .map_err(|err| invalid(format!("{err}")))?;
    let price_low: Option<i32> = row.try_get("price_low")?;
    let price_high: Option<i32> = row.try_get("price_high")?;
    let price_low = from_db_price(price_low).map_err(&invalid)?;
    let price_high = from_db_price(price_high).map_err(&invalid)?;
    let start: Option<String> = row.try_get("duration_start")?;
    let end: Option<String> = row.try_get("duration_end")?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;

    Ok(Post {
        message: row.try_get("msg")?,
        created_at,
        author: Author {
            name: row.try_get("author_name")?,
            id: row.try_get("author_id")?,
            profile_img_url: row.try_get("author_profile_img_url")?,
        },
        post_type,
        duration: (start.is_some() || end.is_some()).then_some(LeaseDuration { start, end }),
        price_range: (price_low.is_some() || price_high.is_some()).then_some(PriceRange {
            low: price_low,
            high: price_high,
        }),
        amenities: row.try_get("amenities")?,
        desired_gender,
        id,
    })
}

fn from_db_price(value: Option<i32>) -> Result<Option<u32>, String> {
    value
        .map(|price| u32::try_from(price).map_err(|_| format!("negative price {price}")))
        .transpose()
}

fn to_db_price(id: &str, value: Option<u32>) -> Result<Option<i32>, PostsRepoError> {
    value
        .map(|price| {
            i32::try_from(price).map_err(|_| PostsRepoError::InvalidRow {
                id: id.to_string(),
                reason: format!("price {price} out of range"),
            })
        })
        .transpose()
}

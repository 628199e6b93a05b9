use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, postgres::PgRow, Pool, Postgres, Row};

use crate::{
    errors::CustomError,
    ids,
    models::wishes::{
        Author, LikeToggleOut, NewWish, WishCategory, WishFilter, WishRecord, WishSort,
    },
    store::WishStore,
};

const SCHEMA: [&str; 5] = [
    "CREATE TABLE IF NOT EXISTS wishes (
        id BIGINT PRIMARY KEY,
        content TEXT NOT NULL,
        category TEXT NOT NULL,
        is_anonymous BOOLEAN NOT NULL DEFAULT FALSE,
        author_id TEXT,
        author_name TEXT,
        author_avatar TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )",
    "CREATE TABLE IF NOT EXISTS wish_likes (
        wish_id BIGINT NOT NULL REFERENCES wishes(id),
        user_id TEXT NOT NULL,
        PRIMARY KEY (wish_id, user_id)
    )",
    "CREATE INDEX IF NOT EXISTS wishes_category_idx ON wishes (category)",
    "CREATE INDEX IF NOT EXISTS wishes_created_at_idx ON wishes (created_at DESC)",
    "CREATE INDEX IF NOT EXISTS wishes_author_idx ON wishes (author_id)",
];

// likes 由 wish_likes 聚合得到，不单独存计数
const SELECT_WISHES: &str = "SELECT w.id, w.content, w.category, w.is_anonymous, w.author_id, w.author_name, w.author_avatar, w.created_at, w.updated_at,
        COALESCE(array_agg(l.user_id) FILTER (WHERE l.user_id IS NOT NULL), '{}') AS liked_by
    FROM wishes w LEFT JOIN wish_likes l ON l.wish_id = w.id";

const FILTER: &str = "($1::text IS NULL OR w.category = $1) AND ($2::text IS NULL OR w.author_id = $2)";

#[derive(Debug, Clone)]
pub struct PgStore {
    db_pool: Pool<Postgres>,
}

impl PgStore {
    pub async fn connect(db_url: &str, max_connections: u32) -> Result<Self, CustomError> {
        let db_pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(db_url)
            .await?;
        let store = Self { db_pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<(), CustomError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.db_pool).await?;
        }
        Ok(())
    }
}

fn order_by(sort: WishSort) -> &'static str {
    match sort {
        WishSort::Newest => "ORDER BY w.created_at DESC, w.id DESC",
        WishSort::Popular => "ORDER BY COUNT(l.user_id) DESC, w.created_at DESC, w.id DESC",
    }
}

fn wish_from_row(row: &PgRow) -> Result<WishRecord, CustomError> {
    let category: String = row.try_get("category")?;
    let category = category
        .parse::<WishCategory>()
        .map_err(|e| CustomError::InternalError(format!("bad category in store: {e}")))?;
    let author_id: Option<String> = row.try_get("author_id")?;
    let author = match author_id {
        Some(id) => Some(Author {
            id,
            name: row.try_get::<Option<String>, _>("author_name")?.unwrap_or_default(),
            avatar: row.try_get("author_avatar")?,
        }),
        None => None,
    };
    let liked_by: Vec<String> = row.try_get("liked_by")?;
    Ok(WishRecord {
        id: row.try_get("id")?,
        content: row.try_get("content")?,
        category,
        is_anonymous: row.try_get("is_anonymous")?,
        author,
        liked_by: liked_by.into_iter().collect(),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl WishStore for PgStore {
    async fn insert(&self, wish: NewWish) -> Result<WishRecord, CustomError> {
        let author = wish.author.as_ref();
        let row = sqlx::query("INSERT INTO wishes (id, content, category, is_anonymous, author_id, author_name, author_avatar) VALUES ($1,$2,$3,$4,$5,$6,$7) RETURNING id, content, category, is_anonymous, author_id, author_name, author_avatar, created_at, updated_at, '{}'::text[] AS liked_by")
            .bind(ids::next_id())
            .bind(&wish.content)
            .bind(wish.category.as_str())
            .bind(wish.is_anonymous())
            .bind(author.map(|a| a.id.as_str()))
            .bind(author.map(|a| a.name.as_str()))
            .bind(author.and_then(|a| a.avatar.as_deref()))
            .fetch_one(&self.db_pool)
            .await?;
        wish_from_row(&row)
    }

    async fn get(&self, id: i64) -> Result<Option<WishRecord>, CustomError> {
        let sql = format!("{SELECT_WISHES} WHERE w.id = $1 GROUP BY w.id");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?;
        row.as_ref().map(wish_from_row).transpose()
    }

    async fn list(
        &self,
        filter: &WishFilter,
        sort: WishSort,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<WishRecord>, CustomError> {
        let sql = format!(
            "{SELECT_WISHES} WHERE {FILTER} GROUP BY w.id {} OFFSET $3 LIMIT $4",
            order_by(sort)
        );
        let rows = sqlx::query(&sql)
            .bind(filter.category.map(|c| c.as_str()))
            .bind(filter.author_id.as_deref())
            .bind(i64::try_from(offset).unwrap_or(i64::MAX))
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(&self.db_pool)
            .await?;
        rows.iter().map(wish_from_row).collect()
    }

    async fn count(&self, filter: &WishFilter) -> Result<u64, CustomError> {
        let sql = format!("SELECT COUNT(*) AS total FROM wishes w WHERE {FILTER}");
        let row = sqlx::query(&sql)
            .bind(filter.category.map(|c| c.as_str()))
            .bind(filter.author_id.as_deref())
            .fetch_one(&self.db_pool)
            .await?;
        let total: i64 = row.try_get("total")?;
        Ok(total.max(0) as u64)
    }

    async fn toggle_like(
        &self,
        id: i64,
        user_id: &str,
    ) -> Result<Option<LikeToggleOut>, CustomError> {
        let mut tx = self.db_pool.begin().await?;
        // 行锁，串行化同一心愿的点赞
        let wish = sqlx::query("SELECT id FROM wishes WHERE id=$1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if wish.is_none() {
            tx.rollback().await.ok();
            return Ok(None);
        }
        let removed = sqlx::query("DELETE FROM wish_likes WHERE wish_id=$1 AND user_id=$2")
            .bind(id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if removed == 0 {
            sqlx::query("INSERT INTO wish_likes (wish_id, user_id) VALUES ($1,$2)")
                .bind(id)
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
        }
        sqlx::query("UPDATE wishes SET updated_at=NOW() WHERE id=$1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let likes: i64 = sqlx::query("SELECT COUNT(*) AS likes FROM wish_likes WHERE wish_id=$1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?
            .try_get("likes")?;
        tx.commit().await?;
        Ok(Some(LikeToggleOut {
            wish_id: id,
            likes: likes.max(0) as u64,
            is_liked: removed == 0,
        }))
    }
}

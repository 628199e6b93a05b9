//! 心愿存储接口。
//!
//! 默认使用内存存储（带演示数据），配置 `DATABASE_URL` 后切换到 Postgres。

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::{
    errors::CustomError,
    models::wishes::{LikeToggleOut, NewWish, WishFilter, WishRecord, WishSort},
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait WishStore: Send + Sync {
    /// 分配 id 与时间戳后写入
    async fn insert(&self, wish: NewWish) -> Result<WishRecord, CustomError>;

    /// 不存在时返回 `None`
    async fn get(&self, id: i64) -> Result<Option<WishRecord>, CustomError>;

    async fn list(
        &self,
        filter: &WishFilter,
        sort: WishSort,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<WishRecord>, CustomError>;

    async fn count(&self, filter: &WishFilter) -> Result<u64, CustomError>;

    /// 切换点赞状态，整条记录原子更新；心愿不存在时返回 `None`
    async fn toggle_like(
        &self,
        id: i64,
        user_id: &str,
    ) -> Result<Option<LikeToggleOut>, CustomError>;
}

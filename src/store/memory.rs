use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::RwLock;

use crate::{
    errors::CustomError,
    ids,
    models::wishes::{
        Author, LikeToggleOut, NewWish, WishCategory, WishFilter, WishRecord, WishSort,
    },
    store::WishStore,
};

#[derive(Debug, Default)]
pub struct MemoryStore {
    wishes: RwLock<Vec<WishRecord>>,
}

impl MemoryStore {
    pub fn with_wishes(wishes: Vec<WishRecord>) -> Self {
        Self { wishes: RwLock::new(wishes) }
    }

    /// 演示数据，点赞数由 likedBy 推导。
    ///
    /// likedBy 里的 `seed-fan-N` 是为了凑出演示点赞数的占位用户，不对应真实用户。
    pub fn seeded() -> Self {
        Self::with_wishes(demo_wishes())
    }
}

#[async_trait]
impl WishStore for MemoryStore {
    async fn insert(&self, wish: NewWish) -> Result<WishRecord, CustomError> {
        let now = Utc::now();
        let record = WishRecord {
            id: ids::next_id(),
            is_anonymous: wish.is_anonymous(),
            content: wish.content,
            category: wish.category,
            author: wish.author,
            liked_by: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        };
        self.wishes.write().await.insert(0, record.clone());
        Ok(record)
    }

    async fn get(&self, id: i64) -> Result<Option<WishRecord>, CustomError> {
        let wishes = self.wishes.read().await;
        Ok(wishes.iter().find(|w| w.id == id).cloned())
    }

    async fn list(
        &self,
        filter: &WishFilter,
        sort: WishSort,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<WishRecord>, CustomError> {
        let wishes = self.wishes.read().await;
        let mut matched: Vec<&WishRecord> = wishes.iter().filter(|w| filter.matches(w)).collect();
        matched.sort_by(|a, b| sort.compare(a, b));
        Ok(matched
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn count(&self, filter: &WishFilter) -> Result<u64, CustomError> {
        let wishes = self.wishes.read().await;
        Ok(wishes.iter().filter(|w| filter.matches(w)).count() as u64)
    }

    async fn toggle_like(
        &self,
        id: i64,
        user_id: &str,
    ) -> Result<Option<LikeToggleOut>, CustomError> {
        let mut wishes = self.wishes.write().await;
        let Some(wish) = wishes.iter_mut().find(|w| w.id == id) else {
            return Ok(None);
        };
        let is_liked = if wish.liked_by.remove(user_id) {
            false
        } else {
            wish.liked_by.insert(user_id.to_string());
            true
        };
        wish.updated_at = Utc::now();
        Ok(Some(LikeToggleOut {
            wish_id: wish.id,
            likes: wish.likes(),
            is_liked,
        }))
    }
}

fn at(year: i32, month: u32, day: u32, hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, min, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

fn fans(count: usize) -> BTreeSet<String> {
    (1..=count).map(|n| format!("seed-fan-{n}")).collect()
}

fn seed_author(id: &str, name: &str, avatar: &str) -> Option<Author> {
    Some(Author {
        id: id.into(),
        name: name.into(),
        avatar: Some(avatar.into()),
    })
}

fn demo_wishes() -> Vec<WishRecord> {
    let seeds = [
        (
            1,
            "I wish for good health for my family and myself in the coming year.",
            WishCategory::Health,
            seed_author(
                "user1",
                "Sarah Johnson",
                "https://images.unsplash.com/photo-1494790108755-2616b9997188?w=150",
            ),
            at(2024, 1, 15, 10, 30),
            42,
        ),
        (
            2,
            "May I find the courage to pursue my dreams and start my own business.",
            WishCategory::Career,
            None,
            at(2024, 1, 15, 9, 15),
            28,
        ),
        (
            3,
            "I hope to meet someone special who truly understands and loves me.",
            WishCategory::Love,
            seed_author(
                "user3",
                "Michael Chen",
                "https://images.unsplash.com/photo-1507003211169-0a1dd7228f2d?w=150",
            ),
            at(2024, 1, 14, 16, 45),
            67,
        ),
        (
            4,
            "I wish for my parents to stay healthy and happy for many years to come.",
            WishCategory::Family,
            seed_author(
                "user4",
                "Emma Wilson",
                "https://images.unsplash.com/photo-1438761681033-6461ffad8d80?w=150",
            ),
            at(2024, 1, 14, 14, 20),
            89,
        ),
    ];
    seeds
        .into_iter()
        .map(|(id, content, category, author, created_at, likes)| WishRecord {
            id,
            content: content.into(),
            category,
            is_anonymous: author.is_none(),
            author,
            liked_by: fans(likes),
            created_at,
            updated_at: created_at,
        })
        .collect()
}

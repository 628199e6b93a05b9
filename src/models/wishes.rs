use std::{cmp::Ordering, collections::BTreeSet, fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

// ================= Enums =================
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum WishCategory {
    Health,
    Career,
    Love,
    Study,
    Family,
    Wealth,
    Other,
}

impl WishCategory {
    pub const ALL: [WishCategory; 7] = [
        WishCategory::Health,
        WishCategory::Career,
        WishCategory::Love,
        WishCategory::Study,
        WishCategory::Family,
        WishCategory::Wealth,
        WishCategory::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WishCategory::Health => "health",
            WishCategory::Career => "career",
            WishCategory::Love => "love",
            WishCategory::Study => "study",
            WishCategory::Family => "family",
            WishCategory::Wealth => "wealth",
            WishCategory::Other => "other",
        }
    }
}

impl FromStr for WishCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WishCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| {
                "Category must be one of: health, career, love, study, family, wealth, other"
                    .to_string()
            })
    }
}

impl fmt::Display for WishCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WishSort {
    /// 按创建时间倒序
    #[default]
    Newest,
    /// 按点赞数倒序
    Popular,
}

impl WishSort {
    /// 除 `popular` 外一律按时间排序
    pub fn from_param(sort: Option<&str>) -> Self {
        match sort {
            Some("popular") => WishSort::Popular,
            _ => WishSort::Newest,
        }
    }

    pub fn compare(self, a: &WishRecord, b: &WishRecord) -> Ordering {
        let newest = b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id));
        match self {
            WishSort::Newest => newest,
            WishSort::Popular => b.likes().cmp(&a.likes()).then(newest),
        }
    }
}

// ================= Records =================
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Author {
    pub id: String,
    pub name: String,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WishRecord {
    pub id: i64,
    pub content: String,
    pub category: WishCategory,
    pub is_anonymous: bool,
    pub author: Option<Author>,
    pub liked_by: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WishRecord {
    pub fn likes(&self) -> u64 {
        self.liked_by.len() as u64
    }

    pub fn is_liked_by(&self, user_id: &str) -> bool {
        self.liked_by.contains(user_id)
    }
}

/// 已校验的新心愿，由存储层分配 id 与时间戳
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWish {
    pub content: String,
    pub category: WishCategory,
    pub author: Option<Author>,
}

impl NewWish {
    pub fn is_anonymous(&self) -> bool {
        self.author.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WishFilter {
    pub category: Option<WishCategory>,
    pub author_id: Option<String>,
}

impl WishFilter {
    pub fn matches(&self, wish: &WishRecord) -> bool {
        self.category.map_or(true, |c| wish.category == c)
            && self.author_id.as_deref().map_or(true, |id| {
                wish.author.as_ref().is_some_and(|a| a.id == id)
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, limit: 10 }
    }
}

impl Pagination {
    /// 页码过大时饱和，不会回绕到第一页
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }

    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.limit)
    }
}

// ================= DTOs =================
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WishCreateInput {
    #[schema(value_type = Option<String>)]
    pub content: Option<serde_json::Value>,
    #[schema(value_type = Option<String>)]
    pub category: Option<serde_json::Value>,
    #[schema(value_type = Option<bool>)]
    pub is_anonymous: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WishQuery {
    /// 页码，默认 1
    pub page: Option<String>,
    /// 每页条数，默认 10，最大 100
    pub limit: Option<String>,
    /// 分类，`all` 表示不过滤
    pub category: Option<String>,
    /// `popular` 或 `createdAt`
    pub sort: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// 对外视图：不含 likedBy，匿名心愿不含 author
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WishOut {
    pub id: i64,
    pub content: String,
    pub category: WishCategory,
    pub is_anonymous: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
    pub likes: u64,
    pub is_liked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WishOut {
    pub fn from_record(r: &WishRecord, viewer_id: &str) -> Self {
        Self {
            id: r.id,
            content: r.content.clone(),
            category: r.category,
            is_anonymous: r.is_anonymous,
            author: if r.is_anonymous { None } else { r.author.clone() },
            likes: r.likes(),
            is_liked: r.is_liked_by(viewer_id),
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WishPage {
    pub wishes: Vec<WishOut>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LikeToggleOut {
    pub wish_id: i64,
    pub likes: u64,
    pub is_liked: bool,
}

//! 心愿业务逻辑：校验、分页查询、创建、点赞切换。
//!
//! 这里只依赖 [`WishStore`]，HTTP 层负责解析请求并把结果包进响应外壳。

use crate::{
    errors::CustomError,
    models::{
        users::ActingUser,
        wishes::{
            LikeToggleOut, NewWish, Pagination, WishCategory, WishCreateInput, WishFilter,
            WishOut, WishPage, WishRecord, WishSort,
        },
    },
    store::WishStore,
};

pub const MIN_CONTENT_CHARS: usize = 10;
pub const MAX_CONTENT_CHARS: usize = 500;
pub const MAX_PAGE_LIMIT: u64 = 100;

fn parse_positive(name: &str, raw: Option<&str>, default: u64) -> Result<u64, String> {
    match raw.map(str::trim) {
        None | Some("") => Ok(default),
        Some(value) => match value.parse::<u64>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(format!("{name} must be a positive integer")),
        },
    }
}

pub fn parse_pagination(page: Option<&str>, limit: Option<&str>) -> Result<Pagination, CustomError> {
    let defaults = Pagination::default();
    let mut errors = Vec::new();
    let page = parse_positive("page", page, defaults.page).unwrap_or_else(|e| {
        errors.push(e);
        defaults.page
    });
    let limit = parse_positive("limit", limit, defaults.limit).unwrap_or_else(|e| {
        errors.push(e);
        defaults.limit
    });
    if limit > MAX_PAGE_LIMIT {
        errors.push(format!("limit must not exceed {MAX_PAGE_LIMIT}"));
    }
    if !errors.is_empty() {
        return Err(CustomError::ValidationError(errors));
    }
    Ok(Pagination { page, limit })
}

/// `all` 与空值都表示不过滤
pub fn parse_category_filter(category: Option<&str>) -> Result<Option<WishCategory>, CustomError> {
    match category.map(str::trim) {
        None | Some("") | Some("all") => Ok(None),
        Some(value) => value
            .parse::<WishCategory>()
            .map(Some)
            .map_err(|e| CustomError::ValidationError(vec![e])),
    }
}

/// 不存在和格式不对的 id 一样按找不到处理
pub fn parse_wish_id(raw: &str) -> Result<i64, CustomError> {
    raw.trim().parse().map_err(|_| wish_not_found())
}

fn wish_not_found() -> CustomError {
    CustomError::NotFound("Wish not found".into())
}

pub fn validate_new_wish(input: &WishCreateInput, user: &ActingUser) -> Result<NewWish, CustomError> {
    let mut errors = Vec::new();

    // 字段类型不对按字段错误处理，不当作 JSON 格式错误
    let content = input
        .content
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default()
        .trim();
    let chars = content.chars().count();
    if !(MIN_CONTENT_CHARS..=MAX_CONTENT_CHARS).contains(&chars) {
        errors.push(format!(
            "Content must be between {MIN_CONTENT_CHARS} and {MAX_CONTENT_CHARS} characters"
        ));
    }

    let category = match input
        .category
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .map(str::parse::<WishCategory>)
    {
        Some(Ok(category)) => Some(category),
        _ => {
            errors.push("Invalid category".to_string());
            None
        }
    };

    let is_anonymous = match &input.is_anonymous {
        None | Some(serde_json::Value::Null) => false,
        Some(serde_json::Value::Bool(flag)) => *flag,
        Some(_) => {
            errors.push("isAnonymous must be a boolean".to_string());
            false
        }
    };

    match category {
        Some(category) if errors.is_empty() => Ok(NewWish {
            content: content.to_string(),
            category,
            author: (!is_anonymous).then(|| user.as_author()),
        }),
        _ => Err(CustomError::ValidationError(errors)),
    }
}

pub async fn create_wish(
    store: &dyn WishStore,
    input: &WishCreateInput,
    user: &ActingUser,
) -> Result<WishRecord, CustomError> {
    let new_wish = validate_new_wish(input, user)?;
    let record = store.insert(new_wish).await?;
    log::info!(
        "wish {} created category={} anonymous={}",
        record.id,
        record.category,
        record.is_anonymous
    );
    Ok(record)
}

pub async fn query_wishes(
    store: &dyn WishStore,
    filter: &WishFilter,
    sort: WishSort,
    pagination: Pagination,
    viewer_id: &str,
) -> Result<WishPage, CustomError> {
    let total = store.count(filter).await?;
    let records = store
        .list(filter, sort, pagination.offset(), pagination.limit)
        .await?;
    Ok(WishPage {
        wishes: records
            .iter()
            .map(|r| WishOut::from_record(r, viewer_id))
            .collect(),
        total,
        page: pagination.page,
        limit: pagination.limit,
        total_pages: pagination.total_pages(total),
    })
}

/// 某个作者的心愿，按时间倒序
pub async fn user_wishes(
    store: &dyn WishStore,
    author_id: &str,
    pagination: Pagination,
    viewer_id: &str,
) -> Result<WishPage, CustomError> {
    let filter = WishFilter {
        category: None,
        author_id: Some(author_id.to_string()),
    };
    query_wishes(store, &filter, WishSort::Newest, pagination, viewer_id).await
}

pub async fn get_wish(store: &dyn WishStore, id: i64, viewer_id: &str) -> Result<WishOut, CustomError> {
    store
        .get(id)
        .await?
        .map(|r| WishOut::from_record(&r, viewer_id))
        .ok_or_else(wish_not_found)
}

pub async fn toggle_like(
    store: &dyn WishStore,
    id: i64,
    user_id: &str,
) -> Result<LikeToggleOut, CustomError> {
    store.toggle_like(id, user_id).await?.ok_or_else(wish_not_found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn input(content: &str, category: &str, anonymous: Option<serde_json::Value>) -> WishCreateInput {
        WishCreateInput {
            content: Some(json!(content)),
            category: Some(json!(category)),
            is_anonymous: anonymous,
        }
    }

    fn errors_of(err: CustomError) -> Vec<String> {
        match err {
            CustomError::ValidationError(errors) => errors,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn content_length_boundaries() {
        let user = ActingUser::demo();
        assert!(validate_new_wish(&input(&"a".repeat(9), "love", None), &user).is_err());
        assert!(validate_new_wish(&input(&"a".repeat(10), "love", None), &user).is_ok());
        assert!(validate_new_wish(&input(&"a".repeat(500), "love", None), &user).is_ok());
        assert!(validate_new_wish(&input(&"a".repeat(501), "love", None), &user).is_err());
    }

    #[test]
    fn content_is_trimmed_before_counting() {
        let user = ActingUser::demo();
        let padded = format!("   {}   ", "a".repeat(9));
        assert!(validate_new_wish(&input(&padded, "love", None), &user).is_err());

        let ok = validate_new_wish(&input("  I wish for sunshine  ", "other", None), &user).unwrap();
        assert_eq!(ok.content, "I wish for sunshine");
    }

    #[test]
    fn content_counts_characters_not_bytes() {
        let user = ActingUser::demo();
        let ten_chars = "愿家人平安健康快乐幸";
        assert!(validate_new_wish(&input(ten_chars, "family", None), &user).is_ok());
    }

    #[test]
    fn collects_every_field_error() {
        let user = ActingUser::demo();
        let bad = WishCreateInput {
            content: None,
            category: Some(json!("money")),
            is_anonymous: Some(json!("yes")),
        };
        let errors = errors_of(validate_new_wish(&bad, &user).unwrap_err());
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&"Invalid category".to_string()));
        assert!(errors.contains(&"isAnonymous must be a boolean".to_string()));
    }

    #[test]
    fn anonymous_has_no_author() {
        let user = ActingUser::demo();
        let wish = validate_new_wish(&input("a valid ten+ char wish", "love", Some(json!(true))), &user).unwrap();
        assert!(wish.author.is_none());

        let named = validate_new_wish(&input("a valid ten+ char wish", "love", None), &user).unwrap();
        assert_eq!(named.author.map(|a| a.id), Some("demo-user".to_string()));
    }

    #[test]
    fn wrongly_typed_fields_are_field_errors() {
        let user = ActingUser::demo();
        let bad = WishCreateInput {
            content: Some(json!(1234567890123_u64)),
            category: Some(json!(5)),
            is_anonymous: None,
        };
        let errors = errors_of(validate_new_wish(&bad, &user).unwrap_err());
        assert_eq!(
            errors,
            vec![
                "Content must be between 10 and 500 characters".to_string(),
                "Invalid category".to_string(),
            ]
        );
    }

    #[test]
    fn pagination_parsing() {
        assert_eq!(parse_pagination(None, None).unwrap(), Pagination { page: 1, limit: 10 });
        assert_eq!(parse_pagination(Some("2"), Some("5")).unwrap(), Pagination { page: 2, limit: 5 });
        assert_eq!(errors_of(parse_pagination(Some("0"), Some("abc")).unwrap_err()).len(), 2);
        assert!(parse_pagination(None, Some("101")).is_err());
        assert!(parse_pagination(Some("-1"), None).is_err());
    }

    #[test]
    fn category_filter_parsing() {
        assert_eq!(parse_category_filter(None).unwrap(), None);
        assert_eq!(parse_category_filter(Some("all")).unwrap(), None);
        assert_eq!(parse_category_filter(Some("health")).unwrap(), Some(WishCategory::Health));
        assert!(parse_category_filter(Some("pets")).is_err());
    }

    #[test]
    fn bad_ids_are_not_found() {
        assert_eq!(parse_wish_id("42").unwrap(), 42);
        assert_eq!(parse_wish_id("abc").unwrap_err(), CustomError::NotFound("Wish not found".into()));
    }

    #[ntex::test]
    async fn page_past_end_is_empty() {
        let store = MemoryStore::seeded();
        let page = query_wishes(
            &store,
            &WishFilter::default(),
            WishSort::Newest,
            Pagination { page: 2, limit: 10 },
            "demo-user",
        )
        .await
        .unwrap();
        assert!(page.wishes.is_empty());
        assert_eq!(page.total, 4);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.page, 2);
    }

    #[ntex::test]
    async fn huge_page_is_past_the_end() {
        let store = MemoryStore::seeded();
        let pagination = parse_pagination(Some("9223372036854775809"), Some("10")).unwrap();
        assert_eq!(pagination.offset(), u64::MAX);

        let page = query_wishes(&store, &WishFilter::default(), WishSort::Newest, pagination, "demo-user")
            .await
            .unwrap();
        assert!(page.wishes.is_empty());
        assert_eq!(page.total, 4);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.page, 9_223_372_036_854_775_809);
    }

    #[ntex::test]
    async fn popular_sort_orders_by_likes() {
        let store = MemoryStore::seeded();
        let page = query_wishes(&store, &WishFilter::default(), WishSort::Popular, Pagination::default(), "demo-user")
            .await
            .unwrap();
        let likes: Vec<u64> = page.wishes.iter().map(|w| w.likes).collect();
        assert_eq!(likes, vec![89, 67, 42, 28]);
    }

    #[ntex::test]
    async fn default_sort_is_newest_first() {
        let store = MemoryStore::seeded();
        let created = create_wish(&store, &input("Fresh wish for the new year", "study", None), &ActingUser::demo())
            .await
            .unwrap();
        let page = query_wishes(&store, &WishFilter::default(), WishSort::Newest, Pagination::default(), "demo-user")
            .await
            .unwrap();
        let ids: Vec<i64> = page.wishes.iter().map(|w| w.id).collect();
        assert_eq!(ids, vec![created.id, 1, 2, 3, 4]);
        assert_eq!(page.total, 5);
    }

    #[ntex::test]
    async fn category_filter_counts_only_matches() {
        let store = MemoryStore::seeded();
        create_wish(&store, &input("Run a marathon this spring", "health", Some(json!(true))), &ActingUser::demo())
            .await
            .unwrap();
        let filter = WishFilter {
            category: Some(WishCategory::Health),
            author_id: None,
        };
        let page = query_wishes(&store, &filter, WishSort::Newest, Pagination::default(), "demo-user")
            .await
            .unwrap();
        assert_eq!(page.total, 2);
        assert!(page.wishes.iter().all(|w| w.category == WishCategory::Health));
    }

    #[ntex::test]
    async fn toggle_twice_restores_state() {
        let store = MemoryStore::seeded();
        let original = get_wish(&store, 3, "demo-user").await.unwrap();

        let first = toggle_like(&store, 3, "demo-user").await.unwrap();
        assert_eq!(first, LikeToggleOut { wish_id: 3, likes: original.likes + 1, is_liked: true });

        let second = toggle_like(&store, 3, "demo-user").await.unwrap();
        assert_eq!(second.likes, original.likes);
        assert_eq!(second.is_liked, original.is_liked);
    }

    #[ntex::test]
    async fn likes_track_liked_by_across_users() {
        let store = MemoryStore::seeded();
        let users = ["alice", "bob", "carol", "alice", "bob", "alice"];
        for user in users {
            toggle_like(&store, 2, user).await.unwrap();
        }
        let record = store.get(2).await.unwrap().unwrap();
        assert_eq!(record.likes(), record.liked_by.len() as u64);
        // alice 三次，bob 两次，carol 一次
        assert!(record.is_liked_by("alice"));
        assert!(!record.is_liked_by("bob"));
        assert!(record.is_liked_by("carol"));
        assert_eq!(record.likes(), 30);
    }

    #[ntex::test]
    async fn unknown_wish_is_not_found() {
        let store = MemoryStore::default();
        assert!(matches!(toggle_like(&store, 5, "demo-user").await, Err(CustomError::NotFound(_))));
        assert!(matches!(get_wish(&store, 5, "demo-user").await, Err(CustomError::NotFound(_))));
    }

    #[ntex::test]
    async fn anonymous_wish_serializes_without_author() {
        let store = MemoryStore::default();
        let created = create_wish(&store, &input("a valid ten+ char wish", "love", Some(json!(true))), &ActingUser::demo())
            .await
            .unwrap();
        let out = get_wish(&store, created.id, "demo-user").await.unwrap();
        let json = serde_json::to_value(&out).unwrap();
        assert!(json.get("author").is_none());
        assert_eq!(json["likes"], 0);
    }

    #[ntex::test]
    async fn user_wishes_only_lists_that_author() {
        let store = MemoryStore::seeded();
        create_wish(&store, &input("Learn to play the violin", "study", None), &ActingUser::with_id("alice"))
            .await
            .unwrap();
        create_wish(&store, &input("Secret wish from alice", "love", Some(json!(true))), &ActingUser::with_id("alice"))
            .await
            .unwrap();

        let page = user_wishes(&store, "alice", Pagination::default(), "demo-user").await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.wishes[0].content, "Learn to play the violin");

        let seeded = user_wishes(&store, "user3", Pagination::default(), "demo-user").await.unwrap();
        assert_eq!(seeded.total, 1);
        assert_eq!(seeded.wishes[0].id, 3);
    }
}

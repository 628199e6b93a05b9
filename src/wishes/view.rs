use std::sync::Arc;

use ntex::web::{types::{Path, Query, State}, HttpResponse, Responder};

use crate::{
    errors::CustomError,
    models::{
        response::ApiResponse,
        users::ActingUser,
        wishes::{WishFilter, WishOut, WishPage, WishQuery, WishSort},
    },
    services::wishes::{get_wish, parse_category_filter, parse_pagination, parse_wish_id, query_wishes},
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/wishes",
    tag = "心愿",
    summary = "心愿列表，支持分类过滤、排序与分页",
    params(WishQuery),
    responses(
        (status = 200, body = WishPage, description = "包在 { success, data } 中"),
        (status = 400, body = CustomError)
    )
)]
pub async fn get_wishes(
    user: ActingUser,
    state: State<Arc<AppState>>,
    query: Query<WishQuery>,
) -> Result<impl Responder, CustomError> {
    let pagination = parse_pagination(query.page.as_deref(), query.limit.as_deref())?;
    let filter = WishFilter {
        category: parse_category_filter(query.category.as_deref())?,
        author_id: None,
    };
    let sort = WishSort::from_param(query.sort.as_deref());

    let page = query_wishes(state.store.as_ref(), &filter, sort, pagination, &user.id).await?;
    Ok(HttpResponse::Ok().json(&ApiResponse::ok(page)))
}

#[utoipa::path(
    get,
    path = "/api/wishes/{id}",
    tag = "心愿",
    params(("id" = String, Path, description = "心愿ID")),
    responses(
        (status = 200, body = WishOut, description = "包在 { success, data } 中"),
        (status = 404, body = CustomError)
    )
)]
pub async fn get_wish_detail(
    user: ActingUser,
    state: State<Arc<AppState>>,
    id: Path<String>,
) -> Result<impl Responder, CustomError> {
    let id = parse_wish_id(&id)?;
    let wish = get_wish(state.store.as_ref(), id, &user.id).await?;
    Ok(HttpResponse::Ok().json(&ApiResponse::ok(wish)))
}

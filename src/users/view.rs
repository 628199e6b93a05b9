use std::sync::Arc;

use ntex::web::{types::{Path, Query, State}, HttpResponse, Responder};

use crate::{
    errors::CustomError,
    models::{
        response::ApiResponse,
        users::{ActingUser, UserProfile},
        wishes::{PageQuery, WishPage},
    },
    services::wishes::{parse_pagination, user_wishes},
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/users/profile",
    tag = "用户",
    summary = "获取当前用户信息（演示用户）",
    responses(
        (status = 200, body = UserProfile, description = "包在 { success, data } 中")
    ),
    security(("user_header" = []))
)]
pub async fn get_profile(user: ActingUser) -> Result<impl Responder, CustomError> {
    Ok(HttpResponse::Ok().json(&ApiResponse::ok(user.profile())))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}/wishes",
    tag = "用户",
    summary = "某个用户发布的心愿，按时间倒序",
    params(
        ("id" = String, Path, description = "用户ID"),
        PageQuery
    ),
    responses(
        (status = 200, body = WishPage, description = "包在 { success, data } 中"),
        (status = 400, body = CustomError)
    )
)]
pub async fn get_user_wishes(
    viewer: ActingUser,
    state: State<Arc<AppState>>,
    id: Path<String>,
    query: Query<PageQuery>,
) -> Result<impl Responder, CustomError> {
    let pagination = parse_pagination(query.page.as_deref(), query.limit.as_deref())?;
    let page = user_wishes(state.store.as_ref(), id.trim(), pagination, &viewer.id).await?;
    Ok(HttpResponse::Ok().json(&ApiResponse::ok(page)))
}

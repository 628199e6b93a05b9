use std::sync::Arc;

use ntex::web::{types::{Path, State}, HttpResponse, Responder};

use crate::{
    errors::CustomError,
    models::{response::ApiResponse, users::ActingUser, wishes::LikeToggleOut},
    services::wishes::{parse_wish_id, toggle_like},
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/wishes/{id}/like",
    tag = "心愿",
    summary = "点赞 / 取消点赞",
    params(("id" = String, Path, description = "心愿ID")),
    responses(
        (status = 200, body = LikeToggleOut, description = "包在 { success, data, message } 中"),
        (status = 404, body = CustomError)
    ),
    security(("user_header" = []))
)]
pub async fn toggle_wish_like(
    user: ActingUser,
    state: State<Arc<AppState>>,
    id: Path<String>,
) -> Result<impl Responder, CustomError> {
    let id = parse_wish_id(&id)?;
    let toggled = toggle_like(state.store.as_ref(), id, &user.id).await?;
    log::debug!("user {} toggled like on wish {} -> {}", user.id, id, toggled.is_liked);

    let message = if toggled.is_liked { "Wish liked" } else { "Like removed" };
    Ok(HttpResponse::Ok().json(&ApiResponse::with_message(toggled, message)))
}

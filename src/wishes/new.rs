use crate::{
    errors::CustomError,
    models::{
        response::ApiResponse,
        users::ActingUser,
        wishes::{WishCreateInput, WishOut},
    },
    services, AppState,
};
use ntex::{
    util::Bytes,
    web::{types::State, HttpResponse, Responder},
};
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/api/wishes",
    tag = "心愿",
    summary = "发布心愿，匿名心愿不记录作者",
    request_body = WishCreateInput,
    responses(
        (status = 201, body = WishOut, description = "包在 { success, data, message } 中"),
        (status = 400, body = CustomError)
    ),
    security(("user_header" = []))
)]
pub async fn create_wish(
    user: ActingUser,
    state: State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl Responder, CustomError> {
    // 手动解析，格式错误也返回统一的 JSON 错误
    let input: WishCreateInput = serde_json::from_slice(&body)?;
    let record = services::wishes::create_wish(state.store.as_ref(), &input, &user).await?;
    let out = WishOut::from_record(&record, &user.id);
    Ok(HttpResponse::Created().json(&ApiResponse::with_message(out, "Wish created successfully")))
}

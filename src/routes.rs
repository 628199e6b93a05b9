use crate::{
    openapi::{ openapi_json, serve_swagger },
    users,
    wishes,
    AppState,
};
use chrono::{ DateTime, Utc };
use ntex::web::{ self, types::State, HttpResponse };
use serde::{ Deserialize, Serialize };
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthOut {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    /// 进程运行秒数
    pub uptime: f64,
}

#[utoipa::path(get, path = "/health", tag = "系统", responses((status = 200, body = HealthOut)))]
pub async fn health_check(state: State<Arc<AppState>>) -> HttpResponse {
    let health = HealthOut {
        status: "OK".into(),
        timestamp: Utc::now(),
        uptime: state.started_at.elapsed().as_secs_f64(),
    };
    HttpResponse::Ok().json(&health)
}

pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound()
        .content_type("application/json; charset=utf-8")
        .json(&serde_json::json!({ "success": false, "message": "API endpoint not found" }))
}

pub fn route(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/api-doc/openapi.json").route("", web::get().to(openapi_json)))
        .service(web::scope("/swagger-ui").route("/{tail:.*}", web::get().to(serve_swagger)))
        .service(web::scope("/health").route("", web::get().to(health_check)));

    // 心愿相关路由
    cfg.service(
        web
            ::scope("/api/wishes")
            .route("", web::get().to(wishes::view::get_wishes))
            .route("", web::post().to(wishes::new::create_wish))
            .route("/{id}", web::get().to(wishes::view::get_wish_detail))
            .route("/{id}/like", web::post().to(wishes::update::toggle_wish_like))
    );
    // 用户
    cfg.service(
        web
            ::scope("/api/users")
            .route("/profile", web::get().to(users::view::get_profile))
            .route("/{id}/wishes", web::get().to(users::view::get_user_wishes))
    );
}

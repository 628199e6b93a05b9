
use std::sync::Arc;

use ntex::web::{HttpRequest, HttpResponse};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::Config;

use crate::errors::CustomError;
use crate::models;
use crate::routes::HealthOut;
use crate::users::view::*;
use crate::wishes::{new::*, update::*, view::*};

pub async fn openapi_json() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("application/json")
        .json(&ApiDoc::openapi())
}

pub async fn serve_swagger(req: HttpRequest) -> HttpResponse {
    let config = Arc::new(Config::from("/api-doc/openapi.json"));
    let path = req.uri().path();
    let tail = path.strip_prefix("/swagger-ui/")
        .unwrap_or_default();

    match utoipa_swagger_ui::serve(tail, config) {
        Ok(swagger_file) => {
            if let Some(file) = swagger_file {
                HttpResponse::Ok()
                    .content_type(&file.content_type)
                    .body(file.bytes.to_vec())
            } else {
                HttpResponse::NotFound().finish()
            }
        }
        Err(_) => HttpResponse::InternalServerError().finish()
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        get_wishes,
        create_wish,
        get_wish_detail,
        toggle_wish_like,
        get_profile,
        get_user_wishes,
        crate::routes::health_check
    ),
    components(
        schemas(
            models::wishes::WishCategory,
            models::wishes::Author,
            models::wishes::WishOut,
            models::wishes::WishPage,
            models::wishes::WishCreateInput,
            models::wishes::LikeToggleOut,
            models::users::UserProfile,
            HealthOut,
            CustomError
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "心愿", description = "心愿发布、列表与点赞"),
        (name = "用户", description = "演示用户与用户心愿"),
        (name = "系统", description = "健康检查")
    )
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            // 以指定用户身份操作，缺省为演示用户
            components.add_security_scheme(
                "user_header",
                SecurityScheme::ApiKey(
                    ApiKey::Header(
                        ApiKeyValue::new(models::users::USER_ID_HEADER)
                    )
                )
            );
        }
    }
}

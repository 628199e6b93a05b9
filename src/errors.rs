use std::{fmt, sync::Arc};
use log::error as logError;
use ntex::{
    http::StatusCode,
    web::{HttpRequest, HttpResponse, WebResponseError},
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::AppState;

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub enum CustomError {
    /// 字段级校验失败，每个元素是一条提示
    ValidationError(Vec<String>),
    BadRequest(String),
    NotFound(String),
    InternalError(String),
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

impl CustomError {
    fn body(&self, expose_internal: bool) -> ErrorBody {
        match self {
            Self::ValidationError(errors) => ErrorBody {
                success: false,
                message: "Validation Error".into(),
                errors: errors.clone(),
                detail: None,
            },
            Self::BadRequest(e) | Self::NotFound(e) => ErrorBody {
                success: false,
                message: e.clone(),
                errors: Vec::new(),
                detail: None,
            },
            // 生产环境不暴露内部错误信息
            Self::InternalError(e) => ErrorBody {
                success: false,
                message: "Internal Server Error".into(),
                errors: Vec::new(),
                detail: expose_internal.then(|| e.clone()),
            },
        }
    }
}

impl WebResponseError for CustomError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self, req: &HttpRequest) -> HttpResponse {
        let expose_internal = req
            .app_state::<Arc<AppState>>()
            .map(|state| state.config.app_env.is_development())
            .unwrap_or(false);
        if let Self::InternalError(e) = self {
            logError!("{} {} failed: {}", req.method(), req.path(), e);
        }
        HttpResponse::build(self.status_code())
            .content_type("application/json; charset=utf-8")
            .json(&self.body(expose_internal))
    }
}

impl fmt::Display for CustomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CustomError::ValidationError(e) => write!(f, "Validation Error: {}", e.join("; ")),
            CustomError::BadRequest(e) => write!(f, "{e}"),
            CustomError::NotFound(e) => write!(f, "{e}"),
            CustomError::InternalError(e) => write!(f, "{e}"),
        }
    }
}

impl From<sqlx::Error> for CustomError {
    fn from(e: sqlx::Error) -> Self {
        logError!(target: "sqlx", "sql 错误: {:?}", e);
        Self::InternalError(format!("database error: {e}"))
    }
}

impl From<std::io::Error> for CustomError {
    fn from(e: std::io::Error) -> Self {
        CustomError::InternalError(e.to_string())
    }
}

impl From<idgenerator::error::OptionError> for CustomError {
    fn from(value: idgenerator::error::OptionError) -> Self {
        CustomError::InternalError(format!("id生成器初始化失败: {:#?}", value))
    }
}

impl From<serde_json::Error> for CustomError {
    fn from(value: serde_json::Error) -> Self {
        CustomError::BadRequest(format!("Invalid JSON body: {value}"))
    }
}

use crate::{errors::CustomError, models::wishes::Author};
use chrono::{DateTime, Utc};
use ntex::{
    http::Payload,
    web::{ErrorRenderer, FromRequest, HttpRequest},
};
use serde::{Deserialize, Serialize};
use std::future::{ready, Future};
use utoipa::ToSchema;

pub const DEMO_USER_ID: &str = "demo-user";
pub const DEMO_USER_NAME: &str = "Demo User";
pub const DEMO_USER_EMAIL: &str = "demo@example.com";
/// 可选请求头，用于以其他用户身份操作
pub const USER_ID_HEADER: &str = "X-User-Id";

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

// 身份认证未接入，默认是固定的演示用户
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActingUser {
    pub id: String,
    pub name: String,
}

impl ActingUser {
    pub fn demo() -> Self {
        Self {
            id: DEMO_USER_ID.into(),
            name: DEMO_USER_NAME.into(),
        }
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        let id = id.into();
        Self { name: id.clone(), id }
    }

    pub fn avatar(&self) -> String {
        format!(
            "https://ui-avatars.com/api/?name={}&background=random",
            self.name.replace(' ', "+")
        )
    }

    pub fn as_author(&self) -> Author {
        Author {
            id: self.id.clone(),
            name: self.name.clone(),
            avatar: Some(self.avatar()),
        }
    }

    pub fn profile(&self) -> UserProfile {
        let email = if self.id == DEMO_USER_ID {
            DEMO_USER_EMAIL.to_string()
        } else {
            format!("{}@example.com", self.id)
        };
        UserProfile {
            id: self.id.clone(),
            name: self.name.clone(),
            email,
            avatar: Some(self.avatar()),
            created_at: Utc::now(),
        }
    }
}

impl<E: ErrorRenderer> FromRequest<E> for ActingUser {
    type Error = CustomError;

    fn from_request(
        req: &HttpRequest,
        _: &mut Payload,
    ) -> impl Future<Output = Result<Self, Self::Error>> {
        let user = req
            .headers()
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(ActingUser::with_id)
            .unwrap_or_else(ActingUser::demo);
        ready(Ok(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_profile() {
        let profile = ActingUser::demo().profile();
        assert_eq!(profile.id, "demo-user");
        assert_eq!(profile.email, "demo@example.com");
        assert_eq!(
            profile.avatar.as_deref(),
            Some("https://ui-avatars.com/api/?name=Demo+User&background=random")
        );
    }

    #[test]
    fn author_carries_identity() {
        let author = ActingUser::with_id("alice").as_author();
        assert_eq!(author.id, "alice");
        assert_eq!(author.name, "alice");
    }
}

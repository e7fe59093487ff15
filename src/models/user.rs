use serde::{Deserialize, Serialize};

/// 애플리케이션을 사용할 수 있는 역할 값. 그 외 역할은 403으로 막습니다.
pub const ACTIVE_ROLE: i64 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub provider: String,
    pub provider_account_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub image: Option<String>,
    pub role: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// OAuth 공급자에서 받은 프로필. upsert 시 이름/메일/이미지를 갱신합니다.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Profile {
    pub name: Option<String>,
    pub email: Option<String>,
    pub image: Option<String>,
}

/// 게이트웨이의 세션 발급 요청: `POST /api/v1/auth/session`
#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    pub provider: String,
    pub provider_account_id: String,
    #[serde(flatten)]
    pub profile: Profile,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: User,
    pub access_token: String,
}

use crate::error::AppError;
use serde::{Deserialize, Serialize};

pub const DEFAULT_ITEMS_PER_PAGE: i64 = 9;
pub const MAX_ITEMS_PER_PAGE: i64 = 60;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Grid => "grid",
            Self::List => "list",
        }
    }

    /// DB에 저장된 값을 해석합니다. 모르는 값은 기본값(grid)으로 취급합니다.
    pub fn from_db(value: &str) -> Self {
        match value {
            "list" => Self::List,
            _ => Self::Grid,
        }
    }
}

/// 사용자별 설정. 행이 없으면 기본값을 돌려줍니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSettings {
    pub items_per_page: i64,
    pub default_view: ViewMode,
    /// 등록 위저드가 빈 요약을 자동으로 채울지 여부
    pub auto_summary: bool,
    /// 저장만 하는 값입니다. 서버는 알림을 보내지 않습니다.
    pub notifications: bool,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
            default_view: ViewMode::Grid,
            auto_summary: true,
            notifications: false,
        }
    }
}

/// 설정 변경 요청: `PUT /api/v1/users/{user_id}/settings`
/// 생략한 필드는 현재 값을 유지합니다.
#[derive(Debug, Deserialize)]
pub struct UpdateSettingsRequest {
    pub items_per_page: Option<i64>,
    pub default_view: Option<ViewMode>,
    pub auto_summary: Option<bool>,
    pub notifications: Option<bool>,
}

impl UpdateSettingsRequest {
    pub fn apply_to(&self, current: UserSettings) -> Result<UserSettings, AppError> {
        let items_per_page = self.items_per_page.unwrap_or(current.items_per_page);
        if !(1..=MAX_ITEMS_PER_PAGE).contains(&items_per_page) {
            return Err(AppError::Validation(format!(
                "items_per_page must be between 1 and {MAX_ITEMS_PER_PAGE}"
            )));
        }
        Ok(UserSettings {
            items_per_page,
            default_view: self.default_view.unwrap_or(current.default_view),
            auto_summary: self.auto_summary.unwrap_or(current.auto_summary),
            notifications: self.notifications.unwrap_or(current.notifications),
        })
    }
}

//! # 기사 등록 위저드 핸들러
//!
//! 드래프트 하나가 위저드 세션 하나입니다. 모든 조작은 드래프트 잠금을 잡은 채 실행되므로,
//! 외부 호출이 진행 중인 드래프트에 들어온 요청은 409 `conflict`로 거절됩니다.
//!
//! ## 엔드포인트 (`/api/v1/users/{user_id}/registrations` 아래)
//! | 메서드 | 경로 | 설명 |
//! |--------|------|------|
//! | POST | `/` | 새 드래프트 (201) |
//! | GET / PATCH / DELETE | `/{draft_id}` | 조회 / 필드 편집 / 폐기 |
//! | POST | `/{draft_id}/next` | 현재 단계에서 다음 단계로 |
//! | POST | `/{draft_id}/back` | 이전 단계로 |
//! | POST | `/{draft_id}/headings/{heading_id}/toggle` | 견출 선택 토글 |
//! | POST | `/{draft_id}/tags/{tag_id}/toggle` | 태그 선택 토글 |
//! | POST | `/{draft_id}/regenerate` | 요약 재생성 (최대 3회) |
//! | POST | `/{draft_id}/save` | 저장 후 드래프트 폐기 (201 + 기사) |
//!
//! 응답 형식: `{ "draft": { "id", "step", "step_index", "progress", ... }, "advisory": null }`

use crate::{
    db,
    error::AppError,
    middleware::auth::AuthUser,
    models::*,
    routes::articles::AppState,
    services::registration::RegistrationWizard,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

fn respond(
    draft_id: &str,
    wizard: &RegistrationWizard,
    advisory: Option<String>,
) -> Json<WizardResponse> {
    Json(WizardResponse {
        draft: DraftView::new(draft_id, wizard.draft()),
        advisory,
    })
}

pub async fn start_registration(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<String>,
) -> Result<(StatusCode, Json<WizardResponse>), AppError> {
    auth.require_owner(&user_id)?;
    let draft_id = state.drafts.start(&user_id);
    let wizard = state.drafts.lock(&user_id, &draft_id)?;
    Ok((StatusCode::CREATED, respond(&draft_id, &wizard, None)))
}

pub async fn get_registration(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((user_id, draft_id)): Path<(String, String)>,
) -> Result<Json<WizardResponse>, AppError> {
    auth.require_owner(&user_id)?;
    let wizard = state.drafts.lock(&user_id, &draft_id)?;
    Ok(respond(&draft_id, &wizard, None))
}

/// `PATCH .../{draft_id}` + `{ "url"?, "title"?, "comment"?, "summary"? }`
pub async fn update_registration(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((user_id, draft_id)): Path<(String, String)>,
    Json(req): Json<UpdateDraftRequest>,
) -> Result<Json<WizardResponse>, AppError> {
    auth.require_owner(&user_id)?;
    let mut wizard = state.drafts.lock(&user_id, &draft_id)?;
    wizard.apply_update(req)?;
    Ok(respond(&draft_id, &wizard, None))
}

pub async fn abandon_registration(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((user_id, draft_id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    auth.require_owner(&user_id)?;
    state.drafts.remove(&user_id, &draft_id)?;
    tracing::debug!(draft_id = %draft_id, "registration abandoned");
    Ok(StatusCode::NO_CONTENT)
}

/// 현재 단계에 맞는 전이를 실행합니다. 확인 단계에서는 `save`를 써야 합니다.
pub async fn next_step(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((user_id, draft_id)): Path<(String, String)>,
) -> Result<Json<WizardResponse>, AppError> {
    auth.require_owner(&user_id)?;
    let mut wizard = state.drafts.lock(&user_id, &draft_id)?;

    let advisory = match wizard.step() {
        RegistrationStep::Url => {
            wizard
                .submit_url(state.extractor.as_ref(), state.external_timeout)
                .await?;
            None
        }
        RegistrationStep::Headings => wizard.submit_headings()?,
        RegistrationStep::TagsComment => {
            let settings = db::get_settings(&state.pool, &user_id).await?;
            wizard
                .submit_tags_comment(
                    state.summarizer.as_ref(),
                    state.external_timeout,
                    settings.auto_summary,
                )
                .await?
        }
        RegistrationStep::Summary => {
            wizard.submit_summary()?;
            None
        }
        RegistrationStep::Confirm => {
            return Err(AppError::Validation(
                "The confirm step is finished by saving".to_string(),
            ))
        }
    };

    tracing::debug!(draft_id = %draft_id, step = wizard.step().as_str(), "registration advanced");
    Ok(respond(&draft_id, &wizard, advisory))
}

pub async fn previous_step(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((user_id, draft_id)): Path<(String, String)>,
) -> Result<Json<WizardResponse>, AppError> {
    auth.require_owner(&user_id)?;
    let mut wizard = state.drafts.lock(&user_id, &draft_id)?;
    wizard.back()?;
    Ok(respond(&draft_id, &wizard, None))
}

pub async fn toggle_heading(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((user_id, draft_id, heading_id)): Path<(String, String, String)>,
) -> Result<Json<WizardResponse>, AppError> {
    auth.require_owner(&user_id)?;
    let mut wizard = state.drafts.lock(&user_id, &draft_id)?;
    wizard.toggle_heading(&heading_id)?;
    Ok(respond(&draft_id, &wizard, None))
}

/// 사용자의 태그로 존재할 때만 토글합니다.
pub async fn toggle_tag(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((user_id, draft_id, tag_id)): Path<(String, String, String)>,
) -> Result<Json<WizardResponse>, AppError> {
    auth.require_owner(&user_id)?;
    let mut wizard = state.drafts.lock(&user_id, &draft_id)?;
    if db::get_tag(&state.pool, &user_id, &tag_id).await?.is_none() {
        return Err(AppError::NotFound);
    }
    wizard.toggle_tag(&tag_id)?;
    Ok(respond(&draft_id, &wizard, None))
}

pub async fn regenerate_summary(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((user_id, draft_id)): Path<(String, String)>,
) -> Result<Json<WizardResponse>, AppError> {
    auth.require_owner(&user_id)?;
    let mut wizard = state.drafts.lock(&user_id, &draft_id)?;
    wizard
        .regenerate_summary(state.summarizer.as_ref(), state.external_timeout)
        .await?;
    Ok(respond(&draft_id, &wizard, None))
}

/// 저장에 성공하면 드래프트를 레지스트리에서 지웁니다. 실패하면 드래프트는 그대로 남습니다.
///
/// 잠금을 쥔 채로 드래프트를 지우므로, 뒤따르는 `save`는 409(진행 중) 아니면 404를 받습니다.
pub async fn save_registration(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((user_id, draft_id)): Path<(String, String)>,
) -> Result<(StatusCode, Json<Article>), AppError> {
    auth.require_owner(&user_id)?;
    let wizard = state.drafts.lock(&user_id, &draft_id)?;
    let article = wizard.save(&state.pool, &user_id).await?;
    // 저장 중에 폐기 요청이 먼저 지웠을 수 있습니다. 기사는 이미 저장되었으므로 성공으로 응답합니다.
    if state.drafts.remove(&user_id, &draft_id).is_err() {
        tracing::debug!(draft_id = %draft_id, "draft was removed during save");
    }
    drop(wizard);
    Ok((StatusCode::CREATED, Json(article)))
}

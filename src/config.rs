//! # 애플리케이션 설정(Configuration) 모듈
//!
//! 환경변수에서 서버 설정값을 읽어오는 모듈입니다.
//! `.env` 파일이나 시스템 환경변수에서 값을 가져옵니다.
//!
//! 설정 항목:
//! - `DATABASE_URL`: SQLite 데이터베이스 경로 (필수)
//! - `JWT_SECRET`: 세션 토큰 서명에 사용할 비밀키 (필수)
//! - `IDENTITY_SECRET`: OAuth 게이트웨이가 세션을 발급받을 때 쓰는 공유 비밀키 (필수)
//! - `HOST` / `PORT`: 서버 바인딩 주소
//! - `SESSION_MAX_AGE_SECS`: 세션 토큰 유효기간 (기본 1일)
//! - `COLLABORATOR_MODE`: `canned`(고정 응답) 또는 `live`(실제 HTTP 호출)
//! - `SUMMARY_SERVICE_URL`: live 모드에서 요약 API 엔드포인트
//! - `EXTERNAL_TIMEOUT_SECS`: 견출 추출/요약 생성 타임아웃
//! - `CANNED_LATENCY_MS`: canned 모드에서 흉내 낼 지연 시간
//! - `DRAFT_TTL_SECS`: 방치된 등록 드래프트를 정리하는 기준 시간
//! - `SEED_PROVIDER` / `SEED_PROVIDER_ACCOUNT_ID`: 시작 시 생성할 시드 사용자

use std::{env, str::FromStr, time::Duration};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is required")]
    Missing(&'static str),

    #[error("environment variable {key} has invalid value {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// 외부 협력자(견출 추출, 요약 생성)를 어떤 구현으로 연결할지
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollaboratorMode {
    /// 고정 지연 + 고정 응답 (개발/데모용)
    Canned,
    /// reqwest로 실제 페이지와 요약 API를 호출
    Live,
}

impl FromStr for CollaboratorMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "canned" => Ok(Self::Canned),
            "live" => Ok(Self::Live),
            _ => Err(()),
        }
    }
}

/// 시드 사용자 정보 (개발 환경에서 바로 로그인할 수 있도록)
#[derive(Debug, Clone)]
pub struct SeedUser {
    pub provider: String,
    pub provider_account_id: String,
}

/// 애플리케이션 전체 설정을 담는 구조체
///
/// 서버 시작 시 환경변수에서 한 번 읽어온 후,
/// 애플리케이션 전체에서 공유됩니다.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite 데이터베이스 URL (예: "sqlite:data/shelf.db")
    pub database_url: String,
    pub jwt_secret: String,
    pub identity_secret: String,
    /// 서버가 바인딩할 호스트 주소 (기본값: "0.0.0.0")
    pub host: String,
    /// 서버 포트 번호 (기본값: 3000)
    pub port: u16,
    pub session_max_age: Duration,
    pub collaborator_mode: CollaboratorMode,
    pub summary_service_url: Option<String>,
    pub external_timeout: Duration,
    pub canned_latency: Duration,
    pub draft_ttl: Duration,
    pub seed_user: Option<SeedUser>,
}

impl Config {
    /// 환경변수에서 설정값을 읽어 Config 인스턴스를 생성합니다.
    ///
    /// # 에러
    /// `DATABASE_URL`, `JWT_SECRET`, `IDENTITY_SECRET`은 필수입니다.
    /// live 모드에서는 `SUMMARY_SERVICE_URL`도 필수입니다.
    /// 숫자 설정값이 파싱되지 않으면 `ConfigError::Invalid`를 반환합니다.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 조회 함수를 주입받아 설정을 만듭니다. (테스트에서 환경변수를 건드리지 않기 위해 분리)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| lookup(key).ok_or(ConfigError::Missing(key));

        // 값이 없으면 기본값, 있는데 숫자가 아니면 에러
        let number = |key: &'static str, default: u64| -> Result<u64, ConfigError> {
            match lookup(key) {
                None => Ok(default),
                Some(value) => value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::Invalid { key, value }),
            }
        };

        let collaborator_mode = match lookup("COLLABORATOR_MODE") {
            None => CollaboratorMode::Canned,
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                key: "COLLABORATOR_MODE",
                value,
            })?,
        };

        let summary_service_url = lookup("SUMMARY_SERVICE_URL");
        if collaborator_mode == CollaboratorMode::Live && summary_service_url.is_none() {
            return Err(ConfigError::Missing("SUMMARY_SERVICE_URL"));
        }

        let port = number("PORT", 3000)?;
        let port = u16::try_from(port).map_err(|_| ConfigError::Invalid {
            key: "PORT",
            value: port.to_string(),
        })?;

        let seed_user = match (lookup("SEED_PROVIDER"), lookup("SEED_PROVIDER_ACCOUNT_ID")) {
            (Some(provider), Some(provider_account_id)) => Some(SeedUser {
                provider,
                provider_account_id,
            }),
            _ => None,
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            identity_secret: required("IDENTITY_SECRET")?,
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            session_max_age: Duration::from_secs(number("SESSION_MAX_AGE_SECS", 86_400)?),
            collaborator_mode,
            summary_service_url,
            external_timeout: Duration::from_secs(number("EXTERNAL_TIMEOUT_SECS", 30)?),
            canned_latency: Duration::from_millis(number("CANNED_LATENCY_MS", 1_000)?),
            draft_ttl: Duration::from_secs(number("DRAFT_TTL_SECS", 3_600)?),
            seed_user,
        })
    }
}

//! # 드래프트 레지스트리
//!
//! 진행 중인 등록 위저드를 드래프트 ID로 보관합니다. 각 드래프트는 만든 사용자에게 묶이고,
//! 다른 사용자가 접근하면 존재하지 않는 것처럼(404) 응답합니다.
//!
//! 위저드마다 `tokio::sync::Mutex`가 하나씩 있습니다. 조작은 `try_lock`으로 잠금을 얻고,
//! 이미 다른 조작(주로 외부 호출)이 진행 중이면 기다리지 않고 `Conflict`로 거절합니다.

use crate::{error::AppError, services::registration::RegistrationWizard};
use dashmap::DashMap;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::{Mutex, OwnedMutexGuard};

struct DraftEntry {
    owner_id: String,
    last_used: Instant,
    wizard: Arc<Mutex<RegistrationWizard>>,
}

pub struct DraftRegistry {
    drafts: DashMap<String, DraftEntry>,
    ttl: Duration,
}

impl DraftRegistry {
    /// `ttl`: 이 시간 이상 쓰이지 않은 드래프트는 새 드래프트를 만들 때 정리됩니다.
    pub fn new(ttl: Duration) -> Self {
        Self {
            drafts: DashMap::new(),
            ttl,
        }
    }

    /// 새 위저드를 만들고 드래프트 ID를 돌려줍니다.
    pub fn start(&self, owner_id: &str) -> String {
        self.purge_stale();

        let id = uuid::Uuid::now_v7().to_string();
        self.drafts.insert(
            id.clone(),
            DraftEntry {
                owner_id: owner_id.to_string(),
                last_used: Instant::now(),
                wizard: Arc::new(Mutex::new(RegistrationWizard::new())),
            },
        );
        tracing::debug!(draft_id = %id, owner_id, "registration draft started");
        id
    }

    /// 드래프트의 잠금을 얻습니다.
    ///
    /// - 없는 드래프트, 다른 사용자의 드래프트: `NotFound`
    /// - 다른 조작이 진행 중: `Conflict`
    pub fn lock(
        &self,
        owner_id: &str,
        draft_id: &str,
    ) -> Result<OwnedMutexGuard<RegistrationWizard>, AppError> {
        let mut entry = self.drafts.get_mut(draft_id).ok_or(AppError::NotFound)?;
        if entry.owner_id != owner_id {
            return Err(AppError::NotFound);
        }
        entry.last_used = Instant::now();

        Arc::clone(&entry.wizard).try_lock_owned().map_err(|_| {
            tracing::debug!(draft_id, "rejected concurrent draft operation");
            AppError::Conflict("Another operation on this draft is in progress".to_string())
        })
    }

    /// 드래프트를 버립니다. 진행 중인 외부 호출이 있으면 그 결과는 분리된 위저드와 함께 사라집니다.
    pub fn remove(&self, owner_id: &str, draft_id: &str) -> Result<(), AppError> {
        self.drafts
            .remove_if(draft_id, |_, entry| entry.owner_id == owner_id)
            .map(|_| ())
            .ok_or(AppError::NotFound)
    }

    /// 잠겨 있지 않고 TTL이 지난 드래프트를 정리합니다.
    pub fn purge_stale(&self) -> usize {
        let before = self.drafts.len();
        self.drafts.retain(|_, entry| {
            let in_use = Arc::strong_count(&entry.wizard) > 1;
            in_use || entry.last_used.elapsed() < self.ttl
        });
        let purged = before.saturating_sub(self.drafts.len());
        if purged > 0 {
            tracing::info!(purged, "stale registration drafts purged");
        }
        purged
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: Duration = Duration::from_secs(3600);

    #[test]
    fn owner_can_lock_their_draft() {
        let registry = DraftRegistry::new(HOUR);
        let id = registry.start("u1");
        let wizard = registry.lock("u1", &id).unwrap();
        assert!(wizard.draft().url.is_empty());
    }

    #[test]
    fn other_users_see_not_found() {
        let registry = DraftRegistry::new(HOUR);
        let id = registry.start("u1");
        assert!(matches!(registry.lock("u2", &id), Err(AppError::NotFound)));
        assert!(matches!(registry.remove("u2", &id), Err(AppError::NotFound)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn second_lock_is_rejected_while_first_is_held() {
        let registry = DraftRegistry::new(HOUR);
        let id = registry.start("u1");
        let guard = registry.lock("u1", &id).unwrap();
        assert!(matches!(registry.lock("u1", &id), Err(AppError::Conflict(_))));
        drop(guard);
        assert!(registry.lock("u1", &id).is_ok());
    }

    #[test]
    fn removed_drafts_are_gone() {
        let registry = DraftRegistry::new(HOUR);
        let id = registry.start("u1");
        registry.remove("u1", &id).unwrap();
        assert!(registry.is_empty());
        assert!(matches!(registry.lock("u1", &id), Err(AppError::NotFound)));
    }

    #[test]
    fn removal_detaches_a_busy_wizard() {
        let registry = DraftRegistry::new(HOUR);
        let id = registry.start("u1");
        let _in_flight = registry.lock("u1", &id).unwrap();
        registry.remove("u1", &id).unwrap();
        assert!(matches!(registry.lock("u1", &id), Err(AppError::NotFound)));
    }

    #[test]
    fn expired_drafts_are_purged_unless_locked() {
        let registry = DraftRegistry::new(Duration::ZERO);
        let idle = registry.start("u1");
        let busy = registry.start("u1");
        let _guard = registry.lock("u1", &busy).unwrap();

        registry.start("u2");
        assert!(matches!(registry.lock("u1", &idle), Err(AppError::NotFound)));
        assert!(matches!(registry.lock("u1", &busy), Err(AppError::Conflict(_))));
    }
}

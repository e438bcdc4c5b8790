//! Canned operators, API responses and camera doubles

use super::mock_api::MockApi;
use async_trait::async_trait;
use lifthub_checkin::api::{
    CheckInApi, CheckInResolver, Operator, OperatorRole, QrUser, QrValidation, UserMatch,
    UserType,
};
use lifthub_checkin::scanner::{CameraDevice, CameraStream, InitError};
use lifthub_checkin::session::SessionSettings;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const MEMBER_CODE: &str = "LIFTHUB-MEMBER-42";
pub const DAY_PASS_CODE: &str = "LIFTHUB-DAYPASS-Ana Gomez";

pub fn operator() -> Operator {
    Operator {
        id: 7,
        name: "Sam Desk".to_string(),
        role: OperatorRole::Staff,
    }
}

pub fn resolver(api: &Arc<MockApi>) -> Arc<CheckInResolver> {
    let api: Arc<dyn CheckInApi> = api.clone();
    Arc::new(CheckInResolver::new(api, operator()))
}

pub fn member_validation(user_id: u64, full_name: &str, already_entered: bool) -> QrValidation {
    QrValidation {
        success: true,
        user_exists: true,
        already_entered,
        user: Some(QrUser {
            user_id,
            full_name: full_name.to_string(),
            user_type: UserType::Member,
        }),
        ..QrValidation::default()
    }
}

pub fn day_pass_validation(name: Option<&str>) -> QrValidation {
    QrValidation {
        success: true,
        is_day_pass: true,
        name: name.map(str::to_string),
        ..QrValidation::default()
    }
}

pub fn user_match(id: u64, full_name: &str) -> UserMatch {
    UserMatch {
        id,
        full_name: full_name.to_string(),
        user_name: full_name.to_lowercase().replace(' ', "."),
        user_type: UserType::Member,
    }
}

/// Session settings with the stock delays and a fast decode loop
pub fn session_settings() -> SessionSettings {
    let mut settings = SessionSettings::default();
    settings.decode.fps = 20;
    settings
}

/// Camera that refuses every acquisition
pub struct DeniedCamera {
    attempts: AtomicUsize,
}

impl DeniedCamera {
    pub fn new() -> Self {
        Self {
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CameraDevice for DeniedCamera {
    async fn acquire(&self, _surface_id: &str) -> Result<Box<dyn CameraStream>, InitError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(InitError::PermissionDenied)
    }
}

/// Give spawned tasks and a few decode ticks time to run on a paused clock
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(200)).await;
}

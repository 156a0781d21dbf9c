//! Capture permission checks for the local backend.
//!
//! A virtual device needs no OS consent, so the status is fixed at
//! construction. `CAMERA_SESSION_AUTHORIZATION` overrides it for demos and
//! tests (`granted`, `denied` or `undetermined`).

use async_trait::async_trait;

use camera_session_core::traits::permission::{AuthorizationStatus, PermissionChecker};

pub const AUTHORIZATION_ENV: &str = "CAMERA_SESSION_AUTHORIZATION";

pub struct StaticPermission {
    status: AuthorizationStatus,
    grant_on_request: bool,
}

impl StaticPermission {
    pub fn granted() -> Self {
        Self::new(AuthorizationStatus::Granted, true)
    }

    pub fn new(status: AuthorizationStatus, grant_on_request: bool) -> Self {
        Self {
            status,
            grant_on_request,
        }
    }

    /// Status from `CAMERA_SESSION_AUTHORIZATION`, granted when unset.
    pub fn from_env() -> Self {
        match std::env::var(AUTHORIZATION_ENV) {
            Ok(value) => match parse_status(&value) {
                Some(status) => Self::new(status, false),
                None => {
                    log::warn!("Ignoring {}={:?}", AUTHORIZATION_ENV, value);
                    Self::granted()
                }
            },
            Err(_) => Self::granted(),
        }
    }
}

fn parse_status(value: &str) -> Option<AuthorizationStatus> {
    match value.trim().to_ascii_lowercase().as_str() {
        "granted" => Some(AuthorizationStatus::Granted),
        "denied" => Some(AuthorizationStatus::Denied),
        "undetermined" => Some(AuthorizationStatus::Undetermined),
        _ => None,
    }
}

#[async_trait]
impl PermissionChecker for StaticPermission {
    async fn check_authorization(&self) -> AuthorizationStatus {
        self.status
    }

    async fn request_access(&self) -> bool {
        self.grant_on_request
    }
}

use async_trait::async_trait;

use crate::models::error::PermissionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationStatus {
    Granted,
    Denied,
    Undetermined,
}

/// Capture authorization as decided by the platform.
#[async_trait]
pub trait PermissionChecker: Send + Sync {
    async fn check_authorization(&self) -> AuthorizationStatus;

    /// Prompt for access when the status is undetermined. Returns whether access was granted.
    async fn request_access(&self) -> bool {
        false
    }
}

/// Resolve the authorization status, asking once if it is still undetermined.
pub async fn ensure_authorized(checker: &dyn PermissionChecker) -> Result<(), PermissionError> {
    match checker.check_authorization().await {
        AuthorizationStatus::Granted => Ok(()),
        AuthorizationStatus::Denied => Err(PermissionError::Denied),
        AuthorizationStatus::Undetermined => {
            if checker.request_access().await {
                Ok(())
            } else {
                Err(PermissionError::Denied)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed {
        status: AuthorizationStatus,
        grant_on_request: bool,
    }

    #[async_trait]
    impl PermissionChecker for Fixed {
        async fn check_authorization(&self) -> AuthorizationStatus {
            self.status
        }

        async fn request_access(&self) -> bool {
            self.grant_on_request
        }
    }

    #[tokio::test]
    async fn undetermined_asks_once() {
        let granted = Fixed {
            status: AuthorizationStatus::Undetermined,
            grant_on_request: true,
        };
        let refused = Fixed {
            status: AuthorizationStatus::Undetermined,
            grant_on_request: false,
        };

        assert_eq!(ensure_authorized(&granted).await, Ok(()));
        assert_eq!(ensure_authorized(&refused).await, Err(PermissionError::Denied));
    }

    #[tokio::test]
    async fn denied_does_not_prompt() {
        let denied = Fixed {
            status: AuthorizationStatus::Denied,
            grant_on_request: true,
        };
        assert_eq!(ensure_authorized(&denied).await, Err(PermissionError::Denied));
    }
}

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::sleep;

use crate::error::CoreError;

const DEFAULT_AUTH_LATENCY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub email: String,
    pub name: String,
}

/// Mock credential service. Calls suspend the caller for a fixed simulated
/// latency and always succeed; a real backend reports failures through
/// `CoreError::ServiceUnavailable`, leaving session state untouched either
/// way.
pub struct MockAuthService {
    latency: Duration,
}

impl MockAuthService {
    pub fn new() -> Self {
        Self {
            latency: DEFAULT_AUTH_LATENCY,
        }
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self { latency }
    }

    pub async fn login(&self, email: &str, _password: &str) -> Result<User, CoreError> {
        sleep(self.latency).await;
        let name = email.split('@').next().unwrap_or(email).to_string();
        Ok(User {
            email: email.to_string(),
            name,
        })
    }

    pub async fn signup(
        &self,
        name: &str,
        email: &str,
        _password: &str,
    ) -> Result<User, CoreError> {
        sleep(self.latency).await;
        Ok(User {
            email: email.to_string(),
            name: name.to_string(),
        })
    }
}

impl Default for MockAuthService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn login_derives_name_from_email() {
        let auth = MockAuthService::with_latency(Duration::from_millis(0));
        let user = auth.login("ada@example.com", "hunter2").await.unwrap();
        assert_eq!(user.name, "ada");
        assert_eq!(user.email, "ada@example.com");
    }

    #[tokio::test]
    async fn signup_keeps_the_given_name() {
        let auth = MockAuthService::with_latency(Duration::from_millis(0));
        let user = auth
            .signup("Ada Lovelace", "ada@example.com", "hunter2")
            .await
            .unwrap();
        assert_eq!(user.name, "Ada Lovelace");
    }
}

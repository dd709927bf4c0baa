//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::config::SecurityConfig;
use crate::db::{NewUser, Store, User};
use crate::domain::validation::validate_registration;
use crate::domain::{LoginInput, RegistrationInput};
use crate::services::auth_service::{AuthError, AuthService, SessionUser};

impl From<User> for SessionUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username,
            email: user.email,
        }
    }
}

pub struct SeaOrmAuthService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(&self, input: &RegistrationInput) -> Result<SessionUser, AuthError> {
        validate_registration(input).map_err(AuthError::Validation)?;

        let created = self
            .store
            .user_repo()
            .create(
                input.username.trim(),
                input.email.trim(),
                &input.password,
                &self.security,
            )
            .await?;

        match created {
            NewUser::Created(user) => {
                info!(user_id = user.id, username = %user.username, "Account registered");
                Ok(SessionUser::from(user))
            }
            NewUser::Duplicate => Err(AuthError::Conflict),
        }
    }

    async fn login(&self, input: &LoginInput) -> Result<SessionUser, AuthError> {
        let email = input.email.trim();
        if email.is_empty() || input.password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let user = self
            .store
            .user_repo()
            .verify_password(email, &input.password)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        Ok(SessionUser::from(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn service() -> SeaOrmAuthService {
        let store = Store::new("sqlite::memory:").await.unwrap();
        let security = SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            argon2_parallelism: 1,
        };
        SeaOrmAuthService::new(store, security)
    }

    fn registration(username: &str, email: &str) -> RegistrationInput {
        RegistrationInput {
            username: username.to_string(),
            email: email.to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
        }
    }

    fn login(email: &str, password: &str) -> LoginInput {
        LoginInput {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let auth = service().await;

        let user = auth
            .register(&registration(" alice ", "Alice@Example.com"))
            .await
            .unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.email, "alice@example.com");

        let logged_in = auth
            .login(&login("alice@example.com", "secret1"))
            .await
            .unwrap();
        assert_eq!(logged_in, user);
    }

    #[tokio::test]
    async fn test_register_rejections() {
        let auth = service().await;
        auth.register(&registration("alice", "alice@example.com"))
            .await
            .unwrap();

        let err = auth
            .register(&registration("alice", "new@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Conflict));
        assert_eq!(err.user_messages(), vec![
            "Username or email already exists".to_string()
        ]);

        let err = auth
            .register(&registration("al", "new@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let auth = service().await;
        auth.register(&registration("alice", "alice@example.com"))
            .await
            .unwrap();

        let wrong_password = auth
            .login(&login("alice@example.com", "nope123"))
            .await
            .unwrap_err();
        let unknown_email = auth
            .login(&login("bob@example.com", "secret1"))
            .await
            .unwrap_err();
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
        assert_eq!(wrong_password.to_string(), "Invalid email or password");

        let missing = auth.login(&login("", "secret1")).await.unwrap_err();
        assert!(matches!(missing, AuthError::MissingCredentials));
    }
}

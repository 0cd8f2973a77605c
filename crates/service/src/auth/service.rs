use std::sync::Arc;

use argon2::{Argon2, password_hash::{PasswordHasher, PasswordVerifier, SaltString}, PasswordHash};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use rand::rngs::OsRng;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::access::Actor;

use super::domain::{AuthSession, AuthUser, Claims, LoginInput, RegisterInput};
use super::errors::AuthError;
use super::repository::AuthRepository;

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: Option<String>,
    pub password_algorithm: String,
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository> {
    repo: Arc<R>,
    cfg: AuthConfig,
}

impl<R: AuthRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthConfig) -> Self { Self { repo, cfg } }

    /// Register a new user with a hashed password.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::RegisterInput;
    /// use service::access::Role;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo, AuthConfig { jwt_secret: None, password_algorithm: "argon2".into() });
    /// let input = RegisterInput { email: "user@example.com".into(), name: "Test".into(), phone: None, password: "Secret123".into(), role: Role::Customer };
    /// let user = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(user.email, "user@example.com");
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email, role = %input.role))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthUser, AuthError> {
        if input.password.len() < 8 {
            return Err(AuthError::Validation("password too short (>=8)".into()));
        }
        if let Some(existing) = self.repo.find_user_by_email_role(&input.email, input.role).await? {
            debug!("user exists: {}", existing.email);
            return Err(AuthError::Conflict);
        }

        let user = self
            .repo
            .create_user(&input.email, &input.name, input.phone.as_deref(), input.role)
            .await?;
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(input.password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashError(e.to_string()))?
            .to_string();

        let _cred = self.repo.upsert_password(user.id, hash, self.cfg.password_algorithm.clone()).await?;
        info!(user_id = %user.id, email = %user.email, role = %user.role, "user_registered");
        Ok(user)
    }

    /// Authenticate a user and optionally issue a token.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::{RegisterInput, LoginInput};
    /// use service::access::Role;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo.clone(), AuthConfig { jwt_secret: Some("secret".into()), password_algorithm: "argon2".into() });
    /// let _ = tokio_test::block_on(svc.register(RegisterInput { email: "u@e.com".into(), name: "N".into(), phone: None, password: "Passw0rd".into(), role: Role::Provider }));
    /// let session = tokio_test::block_on(svc.login(LoginInput { email: "u@e.com".into(), password: "Passw0rd".into(), role: Role::Provider })).unwrap();
    /// assert_eq!(session.user.email, "u@e.com");
    /// assert!(session.token.is_some());
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email, role = %input.role))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let user = self.repo
            .find_user_by_email_role(&input.email, input.role)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let cred = self.repo
            .get_credentials(user.id)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let parsed = PasswordHash::new(&cred.password_hash).map_err(|e| AuthError::HashError(e.to_string()))?;
        if Argon2::default().verify_password(input.password.as_bytes(), &parsed).is_err() {
            return Err(AuthError::Unauthorized);
        }

        let mut token = None;
        if let Some(secret) = &self.cfg.jwt_secret {
            let exp = (chrono::Utc::now() + chrono::Duration::hours(12)).timestamp() as usize;
            let claims = Claims {
                sub: user.email.clone(),
                uid: user.id.to_string(),
                role: user.role,
                exp,
            };
            token = Some(
                encode(&JwtHeader::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
                    .map_err(|e| AuthError::TokenError(e.to_string()))?,
            );
        }

        Ok(AuthSession { user, token })
    }
}

/// Decode a bearer token into the actor the services operate on.
pub fn actor_from_token(token: &str, jwt_secret: &str) -> Result<Actor, AuthError> {
    let key = DecodingKey::from_secret(jwt_secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let data = decode::<Claims>(token, &key, &validation).map_err(|e| AuthError::TokenError(e.to_string()))?;
    let user_id = Uuid::parse_str(&data.claims.uid).map_err(|e| AuthError::TokenError(e.to_string()))?;
    Ok(Actor::new(user_id, data.claims.role))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::Role;
    use crate::auth::repository::mock::MockAuthRepository;

    fn svc_with_secret() -> AuthService<MockAuthRepository> {
        AuthService::new(
            Arc::new(MockAuthRepository::default()),
            AuthConfig { jwt_secret: Some("test-secret".into()), password_algorithm: "argon2".into() },
        )
    }

    #[tokio::test]
    async fn register_then_login_roundtrip() {
        let svc = svc_with_secret();
        let user = svc
            .register(RegisterInput {
                email: "a@example.com".into(),
                name: "A".into(),
                phone: None,
                password: "Passw0rd".into(),
                role: Role::Seller,
            })
            .await
            .unwrap();
        assert_eq!(user.role, Role::Seller);

        let session = svc
            .login(LoginInput { email: "a@example.com".into(), password: "Passw0rd".into(), role: Role::Seller })
            .await
            .unwrap();
        let token = session.token.expect("token issued");

        let actor = actor_from_token(&token, "test-secret").unwrap();
        assert_eq!(actor.user_id, user.id);
        assert_eq!(actor.role, Role::Seller);
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let svc = svc_with_secret();
        svc.register(RegisterInput {
            email: "b@example.com".into(),
            name: "B".into(),
            phone: None,
            password: "Passw0rd".into(),
            role: Role::Customer,
        })
        .await
        .unwrap();

        let err = svc
            .login(LoginInput { email: "b@example.com".into(), password: "nope-nope".into(), role: Role::Customer })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized));
    }

    #[tokio::test]
    async fn duplicate_registration_conflicts() {
        let svc = svc_with_secret();
        let input = RegisterInput {
            email: "c@example.com".into(),
            name: "C".into(),
            phone: None,
            password: "Passw0rd".into(),
            role: Role::Customer,
        };
        svc.register(input.clone()).await.unwrap();
        let err = svc.register(input).await.unwrap_err();
        assert!(matches!(err, AuthError::Conflict));
    }

    #[test]
    fn tampered_token_rejected() {
        let err = actor_from_token("not-a-token", "test-secret").unwrap_err();
        assert!(matches!(err, AuthError::TokenError(_)));
    }
}

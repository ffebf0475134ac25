//! Core business logic for the authentication system.
//!
//! Registration and login orchestrate the credential store, the password
//! hasher and the token service. Every store call is bounded by the configured
//! timeout; bcrypt runs on the blocking pool outside that bound.

use crate::auth::models::{RegisterRequest, RequestIdentity};
use crate::database::models::Principal;
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::{CredentialStore, StoreError, UniqueField};
use crate::utils::jwt::TokenService;
use crate::utils::password::PasswordHasher;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use validator::{Validate, ValidationErrors};

/// Token and principal id handed back after a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub principal_id: String,
}

/// Authentication service for registration, login and identity lookups
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    tokens: Arc<TokenService>,
    hasher: PasswordHasher,
    store_timeout: Duration,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        tokens: Arc<TokenService>,
        hasher: PasswordHasher,
        store_timeout: Duration,
    ) -> Self {
        Self {
            store,
            tokens,
            hasher,
            store_timeout,
        }
    }

    pub fn tokens(&self) -> Arc<TokenService> {
        Arc::clone(&self.tokens)
    }

    /// Registers a new principal.
    ///
    /// # Errors
    /// - `Validation` / `ConfirmationMismatch` before any store access
    /// - `AlreadyExists` when the username or email is taken, including when a
    ///   concurrent registration wins the race to the unique index
    /// - `PasswordTooLong` when the password exceeds bcrypt's input bound
    /// - `StoreUnavailable` on store faults or timeouts
    pub async fn register(&self, request: RegisterRequest) -> ServiceResult<Principal> {
        if let Err(validation_errors) = request.validate() {
            return Err(ServiceError::validation(validation_message(&validation_errors)));
        }
        if request.password != request.confirm {
            return Err(ServiceError::ConfirmationMismatch);
        }

        if self
            .bounded("find_by_username", self.store.find_by_username(&request.username))
            .await?
            .is_some()
        {
            return Err(ServiceError::already_exists(
                UniqueField::Username,
                &request.username,
            ));
        }

        if self
            .bounded("find_by_email", self.store.find_by_email(&request.email))
            .await?
            .is_some()
        {
            return Err(ServiceError::already_exists(
                UniqueField::Email,
                &request.email,
            ));
        }

        let password_hash = self.hash_password(request.password).await?;
        let principal = Principal::new(request.username, request.email, password_hash);

        self.bounded("create", self.store.create(&principal))
            .await
            .map_err(|err| match err {
                StoreError::Duplicate { field } => {
                    warn!("Registration lost a uniqueness race on {}", field);
                    let identifier = match field {
                        UniqueField::Username => &principal.username,
                        UniqueField::Email => &principal.email,
                    };
                    ServiceError::already_exists(field, identifier)
                }
                other => other.into(),
            })?;

        info!("Registered principal {} ({})", principal.id, principal.username);
        Ok(principal)
    }

    /// Authenticates a principal, marks it online and issues a session token.
    ///
    /// An unknown username and a wrong password both yield
    /// `InvalidCredentials`. If the online flag cannot be written the login
    /// fails with `StoreUnavailable` and no token is returned.
    pub async fn login(&self, username: &str, password: &str) -> ServiceResult<LoginOutcome> {
        let principal = match self
            .bounded("find_by_username", self.store.find_by_username(username))
            .await?
        {
            Some(principal) => principal,
            None => {
                debug!("Login rejected: unknown username");
                return Err(ServiceError::InvalidCredentials);
            }
        };

        if !self
            .verify_password(password.to_string(), principal.password_hash.clone())
            .await?
        {
            debug!("Login rejected: password mismatch for {}", principal.id);
            return Err(ServiceError::InvalidCredentials);
        }

        let token = self
            .tokens
            .issue(&principal.id, &principal.username, principal.role)?;

        self.bounded("set_online", self.store.set_online(&principal.id))
            .await?;

        info!("Principal {} logged in as {}", principal.id, principal.role);
        Ok(LoginOutcome {
            token,
            principal_id: principal.id,
        })
    }

    /// Loads the principal behind an authenticated request.
    pub async fn current_principal(&self, identity: &RequestIdentity) -> ServiceResult<Principal> {
        self.bounded("find_by_id", self.store.find_by_id(&identity.principal_id))
            .await?
            .ok_or_else(|| ServiceError::not_found("Principal", &identity.principal_id))
    }

    /// Runs a store operation under the per-request timeout.
    async fn bounded<T, F>(&self, operation: &'static str, future: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match tokio::time::timeout(self.store_timeout, future).await {
            Ok(result) => result,
            Err(_) => {
                error!(
                    "Store operation {} timed out after {:?}",
                    operation, self.store_timeout
                );
                Err(StoreError::Timeout {
                    operation,
                    after: self.store_timeout,
                })
            }
        }
    }

    async fn hash_password(&self, password: String) -> ServiceResult<String> {
        let hasher = self.hasher;
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| ServiceError::internal_error(format!("Password hashing task failed: {}", e)))?
            .map_err(ServiceError::from)
    }

    async fn verify_password(&self, password: String, hash: String) -> ServiceResult<bool> {
        let hasher = self.hasher;
        let verified = tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| {
                ServiceError::internal_error(format!("Password verification task failed: {}", e))
            })?;

        match verified {
            Ok(matches) => Ok(matches),
            Err(e) => {
                error!("Stored password hash could not be checked: {}", e);
                Ok(false)
            }
        }
    }
}

/// Flattens validator output into `field: message` pairs, sorted by field.
pub fn validation_message(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                format!(
                    "{}: {}",
                    field,
                    error.message.as_ref().unwrap_or(&"Invalid value".into())
                )
            })
        })
        .collect();
    messages.sort();
    messages.join(", ")
}

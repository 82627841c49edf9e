//! Account service operations.
//!
//! Registration, login and refresh, role administration and password
//! changes. Like the entry service, every public operation returns an
//! [`ApiResponse`]; payload validation happens here because role resolution
//! depends on it. Password hashing runs on the blocking pool.

use std::sync::Arc;

use axum::http::StatusCode;
use chrono::Utc;
use uuid::Uuid;

use logbook_auth::{hash_password, verify_password, AuthState};
use logbook_core::auth::{generate_refresh_token, Role};
use logbook_core::cache::{user_entries_key, user_entry_key, Cache};
use logbook_core::response::ApiResponse;
use logbook_core::storage::{EntryRepository, RepositoryError, UserRepository};
use logbook_core::user::{
    new_user, validate_add_roles, validate_change_password, validate_login, validate_refresh,
    validate_registration, AddRolesRequest, ChangePasswordRequest, LoginRequest,
    RefreshTokenRequest, RegisterUserRequest, TokenDto, User, UserDto, UserValidationError,
};

use super::ServiceError;
use crate::config::AdminSeed;

const SUCCESS: &str = "Request successful";
const INTERNAL_ERROR: &str = "An error occurred. Request unsuccessful.";
const REQUEST_UNSUCCESSFUL: &str = "Request unsuccessful";
const REGISTRATION_SUCCESS: &str = "Registration Successful";
const USER_EXISTS: &str = "User already exists.";
const USER_NOT_CREATED: &str = "User could not be created";
const LOGIN_SUCCESS: &str = "Validation successful";
const INVALID_CREDENTIALS: &str = "Authentication failed. Invalid credentials";
const LOGIN_FAILED: &str = "An error occurred. User authentication failed.";
const REFRESH_SUCCESS: &str = "Request Successful";
const INVALID_REFRESH: &str = "Invalid client request. The tokenDto has some invalid values.";
const USERS_FAILED: &str = "Error occurred while retrieving users from the database.";
const USER_DOES_NOT_EXIST: &str = "User does not exist";
const ALREADY_HAS_ROLE: &str = "User already has the specified role";
const PASSWORD_CHANGED: &str = "Password reset successful";

type ServiceResult<T> = Result<ApiResponse<T>, ServiceError>;

/// Account service.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    entries: Arc<dyn EntryRepository>,
    cache: Arc<dyn Cache>,
    auth: AuthState,
}

fn failure<T>(status: StatusCode, message: &str) -> ApiResponse<T> {
    ApiResponse::failure(status.as_u16(), message)
}

fn rejected<T>(errors: Vec<UserValidationError>) -> ApiResponse<T> {
    tracing::debug!(?errors, "Rejected account request");
    failure(StatusCode::BAD_REQUEST, REQUEST_UNSUCCESSFUL)
        .with_errors(errors.iter().map(ToString::to_string).collect())
}

/// Collapses an infrastructure failure into a 500 response with `message`.
fn internal_error<T>(operation: &'static str, err: ServiceError, message: &str) -> ApiResponse<T> {
    tracing::error!(operation, error = %err, "User service operation failed");
    failure(StatusCode::INTERNAL_SERVER_ERROR, message)
}

async fn hash_on_blocking_pool(password: String) -> Result<String, ServiceError> {
    Ok(tokio::task::spawn_blocking(move || hash_password(&password)).await??)
}

async fn verify_on_blocking_pool(password: String, hash: String) -> Result<bool, ServiceError> {
    Ok(tokio::task::spawn_blocking(move || verify_password(&password, &hash)).await?)
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        entries: Arc<dyn EntryRepository>,
        cache: Arc<dyn Cache>,
        auth: AuthState,
    ) -> Self {
        Self {
            users,
            entries,
            cache,
            auth,
        }
    }

    /// Issues an access token for `user` and rotates their refresh token.
    ///
    /// A fresh refresh token gets the configured lifetime; a rotated one
    /// keeps the expiry it was first issued with.
    async fn issue_tokens(&self, user: &mut User, renew_expiry: bool) -> ServiceResult<TokenDto> {
        let access = self.auth.issue_access_token(&user.identity())?;

        let now = Utc::now();
        user.refresh_token = Some(generate_refresh_token());
        if renew_expiry || user.refresh_token_expires_at.is_none() {
            user.refresh_token_expires_at = Some(now + self.auth.config.refresh_token_ttl);
        }
        user.updated_at = now;
        self.users.update_user(user).await?;

        Ok(ApiResponse::success(
            StatusCode::OK.as_u16(),
            Some(TokenDto {
                access_token: access.token,
                refresh_token: user.refresh_token.clone().unwrap_or_default(),
                access_token_expires_at: access.expires_at,
                refresh_token_expires_at: user.refresh_token_expires_at,
            }),
            SUCCESS,
        ))
    }

    // ------------------------------------------------------------------
    // Anonymous operations
    // ------------------------------------------------------------------

    /// Creates an account with the `User` role unless other roles were asked for.
    pub async fn register(&self, request: RegisterUserRequest) -> ApiResponse<UserDto> {
        self.try_register(request)
            .await
            .unwrap_or_else(|err| internal_error("register", err, USER_NOT_CREATED))
    }

    async fn try_register(&self, request: RegisterUserRequest) -> ServiceResult<UserDto> {
        let roles = match validate_registration(&request) {
            Ok(roles) => roles,
            Err(errors) => return Ok(rejected(errors)),
        };

        if self.users.get_user_by_name(&request.user_name).await?.is_some()
            || self.users.get_user_by_email(&request.email).await?.is_some()
        {
            tracing::debug!(user_name = %request.user_name, "Rejected duplicate registration");
            return Ok(failure(StatusCode::BAD_REQUEST, USER_EXISTS));
        }

        let password_hash = hash_on_blocking_pool(request.password.clone()).await?;
        let user = new_user(request, roles, password_hash, Utc::now());

        match self.users.create_user(&user).await {
            Ok(()) => {}
            Err(RepositoryError::AlreadyExists { .. }) => {
                return Ok(failure(StatusCode::BAD_REQUEST, USER_EXISTS));
            }
            Err(err) => return Err(err.into()),
        }

        tracing::info!(user_id = %user.id, user_name = %user.user_name, "Registered user");
        Ok(ApiResponse::success(
            StatusCode::CREATED.as_u16(),
            Some(user.to_dto()),
            REGISTRATION_SUCCESS,
        ))
    }

    /// Checks credentials and hands out an access and refresh token pair.
    pub async fn login(&self, request: LoginRequest) -> ApiResponse<TokenDto> {
        self.try_login(request)
            .await
            .unwrap_or_else(|err| internal_error("login", err, LOGIN_FAILED))
    }

    async fn try_login(&self, request: LoginRequest) -> ServiceResult<TokenDto> {
        if let Err(errors) = validate_login(&request) {
            return Ok(rejected(errors));
        }

        let Some(mut user) = self.users.get_user_by_name(&request.user_name).await? else {
            tracing::debug!(user_name = %request.user_name, "Login for unknown user");
            return Ok(failure(StatusCode::UNAUTHORIZED, INVALID_CREDENTIALS));
        };

        if !verify_on_blocking_pool(request.password, user.password_hash.clone()).await? {
            tracing::debug!(user_id = %user.id, "Login with wrong password");
            return Ok(failure(StatusCode::UNAUTHORIZED, INVALID_CREDENTIALS));
        }

        let response = self.issue_tokens(&mut user, true).await?;
        tracing::info!(user_id = %user.id, "User logged in");
        Ok(ApiResponse {
            message: LOGIN_SUCCESS.to_string(),
            ..response
        })
    }

    /// Trades a (possibly expired) access token and its refresh token for a
    /// new pair. The refresh token's expiry is not extended.
    pub async fn refresh_token(&self, request: RefreshTokenRequest) -> ApiResponse<TokenDto> {
        self.try_refresh_token(request)
            .await
            .unwrap_or_else(|err| internal_error("refresh_token", err, INTERNAL_ERROR))
    }

    async fn try_refresh_token(&self, request: RefreshTokenRequest) -> ServiceResult<TokenDto> {
        if let Err(errors) = validate_refresh(&request) {
            return Ok(rejected(errors));
        }

        let identity = match self.auth.verify_expired_token(&request.access_token) {
            Ok(identity) => identity,
            Err(err) => {
                tracing::debug!(error = %err, "Refresh with unusable access token");
                return Ok(failure(StatusCode::BAD_REQUEST, INVALID_REFRESH));
            }
        };

        let Some(mut user) = self.users.get_user(identity.user_id).await? else {
            return Ok(failure(StatusCode::BAD_REQUEST, INVALID_REFRESH));
        };

        if !user.accepts_refresh_token(&request.refresh_token, Utc::now()) {
            tracing::debug!(user_id = %user.id, "Refresh with stale refresh token");
            return Ok(failure(StatusCode::BAD_REQUEST, INVALID_REFRESH));
        }

        let response = self.issue_tokens(&mut user, false).await?;
        tracing::info!(user_id = %user.id, "Refreshed tokens");
        Ok(ApiResponse {
            message: REFRESH_SUCCESS.to_string(),
            ..response
        })
    }

    // ------------------------------------------------------------------
    // Caller operations
    // ------------------------------------------------------------------

    /// Replaces the caller's password after checking the current one.
    ///
    /// Outstanding refresh tokens are revoked.
    pub async fn change_password(
        &self,
        user_id: Uuid,
        request: ChangePasswordRequest,
    ) -> ApiResponse<()> {
        self.try_change_password(user_id, request)
            .await
            .unwrap_or_else(|err| internal_error("change_password", err, INTERNAL_ERROR))
    }

    async fn try_change_password(
        &self,
        user_id: Uuid,
        request: ChangePasswordRequest,
    ) -> ServiceResult<()> {
        if let Err(errors) = validate_change_password(&request) {
            return Ok(rejected(errors));
        }

        let Some(mut user) = self.users.get_user(user_id).await? else {
            return Ok(failure(StatusCode::NOT_FOUND, USER_DOES_NOT_EXIST));
        };

        if !verify_on_blocking_pool(request.current_password, user.password_hash.clone()).await? {
            return Ok(rejected(vec![UserValidationError::IncorrectPassword]));
        }

        user.password_hash = hash_on_blocking_pool(request.new_password).await?;
        user.clear_refresh_token();
        user.updated_at = Utc::now();
        self.users.update_user(&user).await?;

        tracing::info!(%user_id, "Changed password");
        Ok(ApiResponse::success(
            StatusCode::OK.as_u16(),
            None,
            PASSWORD_CHANGED,
        ))
    }

    // ------------------------------------------------------------------
    // Administrator operations
    // ------------------------------------------------------------------

    pub async fn get_users(&self) -> ApiResponse<Vec<UserDto>> {
        self.try_get_users()
            .await
            .unwrap_or_else(|err| internal_error("get_users", err, USERS_FAILED))
    }

    async fn try_get_users(&self) -> ServiceResult<Vec<UserDto>> {
        let users = self.users.get_all_users().await?;
        let dtos = users.iter().map(User::to_dto).collect();
        Ok(ApiResponse::success(StatusCode::OK.as_u16(), Some(dtos), SUCCESS))
    }

    pub async fn get_user_by_id(&self, id: Uuid) -> ApiResponse<UserDto> {
        self.try_get_user_by_id(id)
            .await
            .unwrap_or_else(|err| internal_error("get_user_by_id", err, INTERNAL_ERROR))
    }

    async fn try_get_user_by_id(&self, id: Uuid) -> ServiceResult<UserDto> {
        match self.users.get_user(id).await? {
            Some(user) => Ok(ApiResponse::success(
                StatusCode::OK.as_u16(),
                Some(user.to_dto()),
                SUCCESS,
            )),
            None => Ok(failure(StatusCode::NOT_FOUND, USER_DOES_NOT_EXIST)),
        }
    }

    /// Grants roles to the user with the given email. Roles they already
    /// hold are skipped.
    pub async fn add_roles(&self, request: AddRolesRequest) -> ApiResponse<()> {
        self.try_add_roles(request)
            .await
            .unwrap_or_else(|err| internal_error("add_roles", err, INTERNAL_ERROR))
    }

    async fn try_add_roles(&self, request: AddRolesRequest) -> ServiceResult<()> {
        let roles = match validate_add_roles(&request) {
            Ok(roles) => roles,
            Err(errors) => return Ok(rejected(errors)),
        };

        let Some(mut user) = self.users.get_user_by_email(&request.email).await? else {
            return Ok(failure(StatusCode::BAD_REQUEST, USER_DOES_NOT_EXIST));
        };

        let added = user.grant_roles(&roles);
        if added.is_empty() {
            return Ok(ApiResponse::success(
                StatusCode::OK.as_u16(),
                None,
                ALREADY_HAS_ROLE,
            ));
        }

        user.updated_at = Utc::now();
        self.users.update_user(&user).await?;

        tracing::info!(user_id = %user.id, ?added, "Granted roles");
        Ok(ApiResponse::success(StatusCode::OK.as_u16(), None, SUCCESS))
    }

    /// Role names held by the user with the given email.
    pub async fn get_user_roles(&self, email: &str) -> ApiResponse<Vec<String>> {
        self.try_get_user_roles(email)
            .await
            .unwrap_or_else(|err| internal_error("get_user_roles", err, INTERNAL_ERROR))
    }

    async fn try_get_user_roles(&self, email: &str) -> ServiceResult<Vec<String>> {
        let Some(user) = self.users.get_user_by_email(email).await? else {
            return Ok(failure(StatusCode::NOT_FOUND, USER_DOES_NOT_EXIST));
        };

        let names = user.roles.iter().map(Role::to_string).collect();
        Ok(ApiResponse::success(StatusCode::OK.as_u16(), Some(names), SUCCESS))
    }

    /// Removes the user with the given email along with all of their entries.
    pub async fn delete_user(&self, email: &str) -> ApiResponse<()> {
        self.try_delete_user(email)
            .await
            .unwrap_or_else(|err| internal_error("delete_user", err, INTERNAL_ERROR))
    }

    async fn try_delete_user(&self, email: &str) -> ServiceResult<()> {
        let Some(user) = self.users.get_user_by_email(email).await? else {
            return Ok(ApiResponse::failure(
                StatusCode::NOT_FOUND.as_u16(),
                format!("User with email '{}' not found", email.trim()),
            ));
        };

        let owned = self.entries.get_entries_for_user(user.id).await?;
        self.users.delete_user(user.id).await?;

        let mut keys = vec![user_entries_key(user.id)];
        keys.extend(owned.iter().map(|entry| user_entry_key(user.id, entry.id)));
        for key in &keys {
            if let Err(err) = self.cache.delete(key).await {
                tracing::warn!(key = %key, error = %err, "Failed to invalidate cache");
            }
        }

        tracing::info!(user_id = %user.id, entries = owned.len(), "Deleted user");
        Ok(ApiResponse::success(
            StatusCode::NO_CONTENT.as_u16(),
            None,
            SUCCESS,
        ))
    }

    // ------------------------------------------------------------------
    // Startup
    // ------------------------------------------------------------------

    /// Makes sure the configured administrator account exists and holds the
    /// `Administrator` role.
    pub async fn seed_admin(&self, seed: &AdminSeed) -> Result<(), ServiceError> {
        if let Some(mut user) = self.users.get_user_by_name(&seed.user_name).await? {
            if !user.grant_roles(&[Role::Administrator]).is_empty() {
                user.updated_at = Utc::now();
                self.users.update_user(&user).await?;
                tracing::info!(user_id = %user.id, "Promoted configured administrator");
            }
            return Ok(());
        }

        let password_hash = hash_on_blocking_pool(seed.password.clone()).await?;
        let request = RegisterUserRequest {
            first_name: seed.user_name.clone(),
            last_name: String::new(),
            user_name: seed.user_name.clone(),
            email: seed.email.clone(),
            ..RegisterUserRequest::default()
        };
        let user = new_user(
            request,
            vec![Role::Administrator, Role::User],
            password_hash,
            Utc::now(),
        );
        self.users.create_user(&user).await?;

        tracing::info!(user_id = %user.id, user_name = %user.user_name, "Seeded administrator");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{Duration, NaiveDate};
    use logbook_auth::AuthConfig;
    use logbook_core::entry::LogbookEntry;

    use crate::cache::MemoryCache;
    use crate::storage::InMemoryRepository;

    struct Harness {
        service: UserService,
        repo: InMemoryRepository,
        auth: AuthState,
    }

    fn harness() -> Harness {
        let repo = InMemoryRepository::new();
        let auth = AuthState::new(AuthConfig::new("test-secret"));
        let service = UserService::new(
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
            Arc::new(MemoryCache::new(100)),
            auth.clone(),
        );
        Harness {
            service,
            repo,
            auth,
        }
    }

    fn registration(user_name: &str, email: &str) -> RegisterUserRequest {
        RegisterUserRequest {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            user_name: user_name.to_string(),
            password: "secret1".to_string(),
            email: email.to_string(),
            phone_country_code: "+44".to_string(),
            phone_number: "7700900123".to_string(),
            roles: Vec::new(),
        }
    }

    fn login(user_name: &str, password: &str) -> LoginRequest {
        LoginRequest {
            user_name: user_name.to_string(),
            password: password.to_string(),
        }
    }

    async fn registered(h: &Harness) -> UserDto {
        h.service
            .register(registration("jdoe", "jane@example.com"))
            .await
            .data
            .unwrap()
    }

    // ------------------------------------------------------------------
    // register
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_register_stores_hashed_password_and_user_role() {
        let h = harness();

        let response = h
            .service
            .register(registration("jdoe", "jane@example.com"))
            .await;

        assert_eq!(response.status_code, 201);
        assert_eq!(response.message, "Registration Successful");
        let dto = response.data.unwrap();
        assert_eq!(dto.normalized_email, "JANE@EXAMPLE.COM");

        let stored = h.repo.get_user(dto.id).await.unwrap().unwrap();
        assert_eq!(stored.roles, vec![Role::User]);
        assert_ne!(stored.password_hash, "secret1");
        assert!(verify_password("secret1", &stored.password_hash));
    }

    #[tokio::test]
    async fn test_register_rejects_taken_user_name_or_email() {
        let h = harness();
        registered(&h).await;

        let same_name = h
            .service
            .register(registration("JDOE", "other@example.com"))
            .await;
        let same_email = h
            .service
            .register(registration("other", "Jane@Example.com"))
            .await;

        assert_eq!(same_name.status_code, 400);
        assert_eq!(same_name.message, "User already exists.");
        assert_eq!(same_email.message, "User already exists.");
    }

    #[tokio::test]
    async fn test_register_reports_validation_errors() {
        let h = harness();
        let request = RegisterUserRequest {
            password: "short".to_string(),
            ..registration("jdoe", "jane@example.com")
        };

        let response = h.service.register(request).await;

        assert_eq!(response.status_code, 400);
        assert_eq!(response.message, "Request unsuccessful");
        assert_eq!(
            response.errors,
            vec![
                "Passwords must be at least 6 characters.",
                "Passwords must have at least one digit ('0'-'9')."
            ]
        );
        assert!(h.repo.get_all_users().await.unwrap().is_empty());
    }

    // ------------------------------------------------------------------
    // login / refresh
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_login_issues_verifiable_tokens() {
        let h = harness();
        let dto = registered(&h).await;

        let response = h.service.login(login("jdoe", "secret1")).await;

        assert_eq!(response.status_code, 200);
        assert_eq!(response.message, "Validation successful");
        let tokens = response.data.unwrap();
        let identity = h.auth.verify_token(&tokens.access_token).unwrap();
        assert_eq!(identity.user_id, dto.id);
        assert_eq!(identity.roles, vec![Role::User]);

        let stored = h.repo.get_user(dto.id).await.unwrap().unwrap();
        assert_eq!(stored.refresh_token, Some(tokens.refresh_token));
        let expires = tokens.refresh_token_expires_at.unwrap();
        assert!(expires > Utc::now() + Duration::days(6));
    }

    #[tokio::test]
    async fn test_login_rejects_bad_credentials() {
        let h = harness();
        registered(&h).await;

        let wrong_password = h.service.login(login("jdoe", "secret2")).await;
        let unknown_user = h.service.login(login("nobody", "secret1")).await;

        assert_eq!(wrong_password.status_code, 401);
        assert_eq!(
            wrong_password.message,
            "Authentication failed. Invalid credentials"
        );
        assert_eq!(unknown_user.status_code, 401);
    }

    #[tokio::test]
    async fn test_refresh_rotates_token_and_keeps_expiry() {
        let h = harness();
        registered(&h).await;
        let first = h
            .service
            .login(login("jdoe", "secret1"))
            .await
            .data
            .unwrap();

        let response = h
            .service
            .refresh_token(RefreshTokenRequest {
                access_token: first.access_token.clone(),
                refresh_token: first.refresh_token.clone(),
            })
            .await;

        assert_eq!(response.status_code, 200);
        assert_eq!(response.message, "Request Successful");
        let second = response.data.unwrap();
        assert_ne!(second.refresh_token, first.refresh_token);
        assert_eq!(
            second.refresh_token_expires_at,
            first.refresh_token_expires_at
        );

        let replay = h
            .service
            .refresh_token(RefreshTokenRequest {
                access_token: first.access_token,
                refresh_token: first.refresh_token,
            })
            .await;
        assert_eq!(replay.status_code, 400);
        assert_eq!(
            replay.message,
            "Invalid client request. The tokenDto has some invalid values."
        );
    }

    #[tokio::test]
    async fn test_refresh_rejects_expired_refresh_token() {
        let h = harness();
        let dto = registered(&h).await;
        let tokens = h
            .service
            .login(login("jdoe", "secret1"))
            .await
            .data
            .unwrap();

        let mut stored = h.repo.get_user(dto.id).await.unwrap().unwrap();
        stored.refresh_token_expires_at = Some(Utc::now() - Duration::minutes(1));
        h.repo.update_user(&stored).await.unwrap();

        let response = h
            .service
            .refresh_token(RefreshTokenRequest {
                access_token: tokens.access_token,
                refresh_token: tokens.refresh_token,
            })
            .await;

        assert_eq!(response.status_code, 400);
    }

    #[tokio::test]
    async fn test_refresh_rejects_forged_access_token() {
        let h = harness();
        registered(&h).await;
        let tokens = h
            .service
            .login(login("jdoe", "secret1"))
            .await
            .data
            .unwrap();

        let response = h
            .service
            .refresh_token(RefreshTokenRequest {
                access_token: "not.a.jwt".to_string(),
                refresh_token: tokens.refresh_token,
            })
            .await;

        assert_eq!(response.status_code, 400);
    }

    // ------------------------------------------------------------------
    // change_password
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_change_password() {
        let h = harness();
        let dto = registered(&h).await;
        h.service.login(login("jdoe", "secret1")).await;

        let response = h
            .service
            .change_password(
                dto.id,
                ChangePasswordRequest {
                    current_password: "secret1".to_string(),
                    new_password: "secret2".to_string(),
                    confirm_new_password: "secret2".to_string(),
                },
            )
            .await;

        assert_eq!(response.status_code, 200);
        assert_eq!(response.message, "Password reset successful");
        let stored = h.repo.get_user(dto.id).await.unwrap().unwrap();
        assert!(stored.refresh_token.is_none());
        assert_eq!(h.service.login(login("jdoe", "secret1")).await.status_code, 401);
        assert_eq!(h.service.login(login("jdoe", "secret2")).await.status_code, 200);
    }

    #[tokio::test]
    async fn test_change_password_requires_current_password() {
        let h = harness();
        let dto = registered(&h).await;

        let response = h
            .service
            .change_password(
                dto.id,
                ChangePasswordRequest {
                    current_password: "wrong1".to_string(),
                    new_password: "secret2".to_string(),
                    confirm_new_password: "secret2".to_string(),
                },
            )
            .await;

        assert_eq!(response.status_code, 400);
        assert_eq!(response.errors, vec!["Incorrect password."]);
    }

    // ------------------------------------------------------------------
    // administration
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_add_roles_and_get_roles() {
        let h = harness();
        registered(&h).await;
        let grant = AddRolesRequest {
            email: "jane@example.com".to_string(),
            roles: vec!["Administrator".to_string()],
        };

        let first = h.service.add_roles(grant.clone()).await;
        let again = h.service.add_roles(grant).await;

        assert_eq!(first.status_code, 200);
        assert_eq!(first.message, "Request successful");
        assert_eq!(again.message, "User already has the specified role");

        let roles = h.service.get_user_roles("JANE@example.com").await;
        assert_eq!(
            roles.data,
            Some(vec!["User".to_string(), "Administrator".to_string()])
        );
    }

    #[tokio::test]
    async fn test_add_roles_for_unknown_user() {
        let h = harness();

        let response = h
            .service
            .add_roles(AddRolesRequest {
                email: "ghost@example.com".to_string(),
                roles: vec!["User".to_string()],
            })
            .await;

        assert_eq!(response.status_code, 400);
        assert_eq!(response.message, "User does not exist");
        assert_eq!(
            h.service.get_user_roles("ghost@example.com").await.status_code,
            404
        );
    }

    #[tokio::test]
    async fn test_get_users_and_get_user_by_id() {
        let h = harness();
        let dto = registered(&h).await;

        let all = h.service.get_users().await;
        assert_eq!(all.data.map(|users| users.len()), Some(1));

        let one = h.service.get_user_by_id(dto.id).await;
        assert_eq!(one.data, Some(dto));

        let missing = h.service.get_user_by_id(Uuid::new_v4()).await;
        assert_eq!(missing.status_code, 404);
        assert_eq!(missing.message, "User does not exist");
    }

    #[tokio::test]
    async fn test_delete_user_cascades_to_entries() {
        let h = harness();
        let dto = registered(&h).await;
        let date = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
        h.repo
            .create_entry(&LogbookEntry::new(dto.id, "Checkride", date))
            .await
            .unwrap();

        let response = h.service.delete_user("jane@example.com").await;

        assert_eq!(response.status_code, 204);
        assert!(h.repo.get_user(dto.id).await.unwrap().is_none());
        assert!(h.repo.get_entries_for_user(dto.id).await.unwrap().is_empty());

        let again = h.service.delete_user("jane@example.com").await;
        assert_eq!(again.status_code, 404);
        assert_eq!(again.message, "User with email 'jane@example.com' not found");
    }

    #[tokio::test]
    async fn test_seed_admin_is_idempotent() {
        let h = harness();
        let seed = AdminSeed {
            user_name: "admin".to_string(),
            email: "admin@example.com".to_string(),
            password: "admin123".to_string(),
        };

        h.service.seed_admin(&seed).await.unwrap();
        h.service.seed_admin(&seed).await.unwrap();

        let users = h.repo.get_all_users().await.unwrap();
        assert_eq!(users.len(), 1);
        assert!(users[0].identity().is_admin());

        let tokens = h.service.login(login("admin", "admin123")).await.data.unwrap();
        assert!(h.auth.verify_token(&tokens.access_token).unwrap().is_admin());
    }
}

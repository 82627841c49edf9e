use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::auth::Role;

use super::error::{UserValidationError, MAX_NAME_LENGTH, MIN_PASSWORD_LENGTH};
use super::requests::{
    AddRolesRequest, ChangePasswordRequest, LoginRequest, RefreshTokenRequest, RegisterUserRequest,
};
use super::types::User;

/// Canonical form used for uniqueness checks and lookups.
pub fn normalize(value: &str) -> String {
    value.trim().to_uppercase()
}

/// Accepts `local@domain.tld` with no whitespace and a single `@`.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') {
        return false;
    }

    // Domain needs a dot with a label on each side.
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty() && !domain.starts_with('.'),
        None => false,
    }
}

/// `+` followed by one to three digits.
pub fn is_valid_country_code(code: &str) -> bool {
    match code.strip_prefix('+') {
        Some(digits) => {
            (1..=3).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
        }
        None => false,
    }
}

/// Exactly ten digits.
pub fn is_valid_phone_number(number: &str) -> bool {
    number.len() == 10 && number.chars().all(|c| c.is_ascii_digit())
}

/// Password strength rules. Blank passwords are reported by the caller.
pub fn check_password_policy(password: &str) -> Vec<UserValidationError> {
    let mut errors = Vec::new();
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.push(UserValidationError::PasswordTooShort);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push(UserValidationError::PasswordMissingDigit);
    }
    errors
}

/// Parses role names, dropping duplicates and keeping request order.
pub fn parse_roles(names: &[String]) -> Result<Vec<Role>, Vec<UserValidationError>> {
    let mut roles = Vec::new();
    let mut errors = Vec::new();
    for name in names {
        match Role::from_name(name.trim()) {
            Some(role) if !roles.contains(&role) => roles.push(role),
            Some(_) => {}
            None => errors.push(UserValidationError::InvalidRole(name.clone())),
        }
    }
    into_result(errors).map(|()| roles)
}

fn into_result(errors: Vec<UserValidationError>) -> Result<(), Vec<UserValidationError>> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_name(
    value: &str,
    missing: UserValidationError,
    too_long: UserValidationError,
    errors: &mut Vec<UserValidationError>,
) {
    if value.trim().is_empty() {
        errors.push(missing);
    } else if value.chars().count() > MAX_NAME_LENGTH {
        errors.push(too_long);
    }
}

fn check_email(email: &str, errors: &mut Vec<UserValidationError>) {
    if email.trim().is_empty() {
        errors.push(UserValidationError::MissingEmail);
    } else if !is_valid_email(email) {
        errors.push(UserValidationError::InvalidEmail);
    }
}

/// Validates a registration payload and resolves the requested roles.
///
/// No roles means `User`. Self-registration cannot request `Administrator`.
pub fn validate_registration(
    request: &RegisterUserRequest,
) -> Result<Vec<Role>, Vec<UserValidationError>> {
    let mut errors = Vec::new();

    check_name(
        &request.first_name,
        UserValidationError::MissingFirstName,
        UserValidationError::FirstNameTooLong,
        &mut errors,
    );
    check_name(
        &request.last_name,
        UserValidationError::MissingLastName,
        UserValidationError::LastNameTooLong,
        &mut errors,
    );
    if request.user_name.trim().is_empty() {
        errors.push(UserValidationError::MissingUserName);
    }
    if request.password.is_empty() {
        errors.push(UserValidationError::MissingPassword);
    } else {
        errors.extend(check_password_policy(&request.password));
    }
    check_email(&request.email, &mut errors);

    if request.phone_country_code.trim().is_empty() {
        errors.push(UserValidationError::MissingCountryCode);
    } else if !is_valid_country_code(&request.phone_country_code) {
        errors.push(UserValidationError::InvalidCountryCode);
    }
    if request.phone_number.trim().is_empty() {
        errors.push(UserValidationError::MissingPhoneNumber);
    } else if !is_valid_phone_number(&request.phone_number) {
        errors.push(UserValidationError::InvalidPhoneNumber);
    }

    let roles = match parse_roles(&request.roles) {
        Ok(roles) if roles.contains(&Role::Administrator) => {
            errors.push(UserValidationError::AdministratorSelfAssigned);
            roles
        }
        Ok(roles) if roles.is_empty() => vec![Role::User],
        Ok(roles) => roles,
        Err(role_errors) => {
            errors.extend(role_errors);
            Vec::new()
        }
    };

    into_result(errors).map(|()| roles)
}

pub fn validate_login(request: &LoginRequest) -> Result<(), Vec<UserValidationError>> {
    let mut errors = Vec::new();
    if request.user_name.trim().is_empty() {
        errors.push(UserValidationError::MissingLoginName);
    }
    if request.password.is_empty() {
        errors.push(UserValidationError::MissingLoginPassword);
    }
    into_result(errors)
}

pub fn validate_refresh(request: &RefreshTokenRequest) -> Result<(), Vec<UserValidationError>> {
    let mut errors = Vec::new();
    if request.access_token.trim().is_empty() {
        errors.push(UserValidationError::MissingAccessToken);
    }
    if request.refresh_token.trim().is_empty() {
        errors.push(UserValidationError::MissingRefreshToken);
    }
    into_result(errors)
}

/// Validates a role grant and resolves the role names.
pub fn validate_add_roles(
    request: &AddRolesRequest,
) -> Result<Vec<Role>, Vec<UserValidationError>> {
    let mut errors = Vec::new();
    check_email(&request.email, &mut errors);

    let roles = match parse_roles(&request.roles) {
        Ok(roles) if roles.is_empty() => {
            errors.push(UserValidationError::MissingRoles);
            roles
        }
        Ok(roles) => roles,
        Err(role_errors) => {
            errors.extend(role_errors);
            Vec::new()
        }
    };

    into_result(errors).map(|()| roles)
}

/// Checks presence, confirmation and policy of a password change.
///
/// The current password itself is verified against the stored hash by the caller.
pub fn validate_change_password(
    request: &ChangePasswordRequest,
) -> Result<(), Vec<UserValidationError>> {
    let mut errors = Vec::new();
    if request.current_password.is_empty() {
        errors.push(UserValidationError::MissingCurrentPassword);
    }
    if request.new_password.is_empty() {
        errors.push(UserValidationError::MissingNewPassword);
    } else {
        errors.extend(check_password_policy(&request.new_password));
    }
    if request.confirm_new_password.is_empty() {
        errors.push(UserValidationError::MissingPasswordConfirmation);
    } else if request.new_password != request.confirm_new_password {
        errors.push(UserValidationError::PasswordMismatch);
    }
    into_result(errors)
}

/// Builds the account a validated registration describes.
pub fn new_user(
    request: RegisterUserRequest,
    roles: Vec<Role>,
    password_hash: String,
    now: DateTime<Utc>,
) -> User {
    User {
        id: Uuid::new_v4(),
        user_name: request.user_name.trim().to_string(),
        first_name: request.first_name.trim().to_string(),
        last_name: request.last_name.trim().to_string(),
        email: request.email.trim().to_string(),
        phone_country_code: request.phone_country_code,
        phone_number: request.phone_number,
        password_hash,
        roles,
        refresh_token: None,
        refresh_token_expires_at: None,
        created_at: now,
        updated_at: now,
    }
}

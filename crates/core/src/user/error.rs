use thiserror::Error;

/// Maximum length of a first or last name, in characters.
pub const MAX_NAME_LENGTH: usize = 50;

/// Minimum password length, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Payload validation failures for account requests.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    #[error("FirstName is required")]
    MissingFirstName,
    #[error("FirstName cannot exceed 50 characters")]
    FirstNameTooLong,
    #[error("LastName is required")]
    MissingLastName,
    #[error("LastName cannot exceed 50 characters")]
    LastNameTooLong,
    #[error("Username is required")]
    MissingUserName,
    #[error("User name is required")]
    MissingLoginName,
    #[error("Password is required")]
    MissingPassword,
    #[error("Password field is required")]
    MissingLoginPassword,
    #[error("Email is required")]
    MissingEmail,
    #[error("A valid email address is required")]
    InvalidEmail,
    #[error("Phone country code is required")]
    MissingCountryCode,
    #[error("Invalid country code format. Use '+' followed by 1-3 digits")]
    InvalidCountryCode,
    #[error("Phone number is required")]
    MissingPhoneNumber,
    #[error("Phone number must be exactly 10 digits")]
    InvalidPhoneNumber,
    #[error("Invalid role: {0}. Valid roles are: Administrator, User")]
    InvalidRole(String),
    #[error("The Administrator role can only be granted by an administrator")]
    AdministratorSelfAssigned,
    #[error("At least one role is required")]
    MissingRoles,
    #[error("Passwords must be at least 6 characters.")]
    PasswordTooShort,
    #[error("Passwords must have at least one digit ('0'-'9').")]
    PasswordMissingDigit,
    #[error("Current password field is required")]
    MissingCurrentPassword,
    #[error("New password field is required")]
    MissingNewPassword,
    #[error("New password field confirmation is required")]
    MissingPasswordConfirmation,
    #[error("Password fields do not match")]
    PasswordMismatch,
    #[error("Incorrect password.")]
    IncorrectPassword,
    #[error("Access token is required")]
    MissingAccessToken,
    #[error("Refresh token is required")]
    MissingRefreshToken,
}

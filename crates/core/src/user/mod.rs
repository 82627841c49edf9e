mod error;
mod operations;
mod requests;
mod types;

pub use error::UserValidationError;
pub use operations::{
    new_user, normalize, validate_add_roles, validate_change_password, validate_login,
    validate_refresh, validate_registration,
};
pub use requests::{
    AddRolesRequest, ChangePasswordRequest, EmailQuery, LoginRequest, RefreshTokenRequest,
    RegisterUserRequest,
};
pub use types::{TokenDto, User, UserDto};

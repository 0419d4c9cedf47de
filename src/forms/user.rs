use serde::Deserialize;
use serde_valid::Validate;

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RegisterForm {
    #[validate(min_length = 1)]
    pub username: String,
    #[validate(min_length = 3)]
    #[validate(pattern = r"^[^@\s]+@[^@\s]+$")]
    pub email: String,
    #[validate(min_length = 1)]
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct LoginForm {
    #[validate(min_length = 1)]
    pub email: String,
    #[validate(min_length = 1)]
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RefreshForm {
    #[validate(min_length = 1)]
    pub refresh_token: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct PasswordResetRequestForm {
    #[validate(min_length = 1)]
    pub email: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct NewPasswordForm {
    #[validate(min_length = 1)]
    pub password: String,
}

/// `?token=` query of the link endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct LinkQuery {
    #[serde(default)]
    pub token: String,
}

use crate::forms;
use crate::helpers::JsonResponse;
use crate::services::{Audit, AuthError, AuthService};
use actix_web::{post, web, Responder, Result};
use serde_valid::Validate;

#[tracing::instrument(name = "Request password reset.", skip(form, auth, audit))]
#[post("/password-update")]
pub async fn password_reset_request_handler(
    form: web::Json<forms::PasswordResetRequestForm>,
    auth: web::Data<AuthService>,
    audit: web::Data<Audit>,
) -> Result<impl Responder, AuthError> {
    form.validate()
        .map_err(|err| AuthError::Validation(err.to_string()))?;

    auth.request_password_reset(&form.email).await?;
    audit
        .record("password_reset_request", format!("reset link sent to {}", form.email))
        .await;

    Ok(JsonResponse::<()>::build().ok("Password reset link sent, check your email"))
}

#[tracing::instrument(name = "Reset password.", skip(query, form, auth, audit))]
#[post("/password-reset")]
pub async fn password_reset_handler(
    query: web::Query<forms::LinkQuery>,
    form: web::Json<forms::NewPasswordForm>,
    auth: web::Data<AuthService>,
    audit: web::Data<Audit>,
) -> Result<impl Responder, AuthError> {
    form.validate()
        .map_err(|err| AuthError::Validation(err.to_string()))?;

    let email = auth.reset_password(&query.token, &form.password).await?;
    audit
        .record("password_reset_completion", format!("password of {email} replaced"))
        .await;

    Ok(JsonResponse::<()>::build().ok("Password updated"))
}

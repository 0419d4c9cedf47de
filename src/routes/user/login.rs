use crate::forms;
use crate::helpers::JsonResponse;
use crate::services::{Audit, AuthError, AuthService};
use actix_web::{post, web, Responder, Result};
use serde_valid::Validate;

/// Only the access token goes back to the client. The refresh token stays
/// on the user record where the auth gate and the refresh endpoint find it.
#[tracing::instrument(name = "Login.", skip(form, auth, audit))]
#[post("/login")]
pub async fn login_handler(
    form: web::Json<forms::LoginForm>,
    auth: web::Data<AuthService>,
    audit: web::Data<Audit>,
) -> Result<impl Responder, AuthError> {
    form.validate()
        .map_err(|err| AuthError::Validation(err.to_string()))?;

    let result = auth.login(&form.email, &form.password).await;
    let outcome = match &result {
        Ok(_) => "succeeded",
        Err(err) => err.reason(),
    };
    audit
        .record("login_attempt", format!("{} {}", form.email, outcome))
        .await;

    let session = result?;
    Ok(JsonResponse::<()>::build()
        .set_token(session.access_token)
        .ok("Login successful"))
}

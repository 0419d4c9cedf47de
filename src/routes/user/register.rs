use crate::forms;
use crate::helpers::JsonResponse;
use crate::models;
use crate::services::{Audit, AuthError, AuthService};
use actix_web::{post, web, Responder, Result};
use serde_valid::Validate;

#[tracing::instrument(name = "Register user.", skip(form, auth, audit))]
#[post("/register")]
pub async fn register_handler(
    form: web::Json<forms::RegisterForm>,
    auth: web::Data<AuthService>,
    audit: web::Data<Audit>,
) -> Result<impl Responder, AuthError> {
    form.validate()
        .map_err(|err| AuthError::Validation(err.to_string()))?;

    let user = auth
        .register(&form.username, &form.email, &form.password)
        .await?;

    audit
        .record(
            "user_registration",
            format!("user {} registered with {}", user.id, user.email),
        )
        .await;

    Ok(JsonResponse::<models::PublicUser>::build()
        .set_item(user)
        .ok("Registration successful, check your email to verify the account"))
}

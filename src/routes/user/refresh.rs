use crate::forms;
use crate::helpers::JsonResponse;
use crate::services::{Audit, AuthError, AuthService};
use actix_web::{post, web, Responder, Result};
use serde_valid::Validate;

#[tracing::instrument(name = "Refresh access token.", skip(form, auth, audit))]
#[post("/token/refresh")]
pub async fn refresh_handler(
    form: web::Json<forms::RefreshForm>,
    auth: web::Data<AuthService>,
    audit: web::Data<Audit>,
) -> Result<impl Responder, AuthError> {
    form.validate()
        .map_err(|err| AuthError::Validation(err.to_string()))?;

    let result = auth.refresh(&form.refresh_token).await;
    let outcome = match &result {
        Ok(_) => "succeeded",
        Err(err) => err.reason(),
    };
    audit
        .record("token_refresh", format!("explicit refresh {outcome}"))
        .await;

    Ok(JsonResponse::<()>::build()
        .set_token(result?)
        .ok("Access token refreshed"))
}

use crate::forms;
use crate::helpers::JsonResponse;
use crate::services::{Audit, AuthError, AuthService};
use actix_web::{get, web, Responder, Result};

#[tracing::instrument(name = "Verify email.", skip(query, auth, audit))]
#[get("/verify-email")]
pub async fn verify_email_handler(
    query: web::Query<forms::LinkQuery>,
    auth: web::Data<AuthService>,
    audit: web::Data<Audit>,
) -> Result<impl Responder, AuthError> {
    let email = auth.verify_email(&query.token).await?;
    audit
        .record("email_verification", format!("{email} verified"))
        .await;

    Ok(JsonResponse::<()>::build().ok("Email verified"))
}

use crate::helpers::JsonResponse;
use crate::models;
use crate::services::{Audit, AuthError};
use actix_web::{get, web, Responder, Result};

#[tracing::instrument(name = "Admin list audit log.", skip(audit))]
#[get("/logs")]
pub async fn admin_list_logs_handler(
    audit: web::Data<Audit>,
) -> Result<impl Responder, AuthError> {
    let entries = audit.list().await?;
    Ok(JsonResponse::<models::LogEntry>::build()
        .set_list(entries)
        .ok("OK"))
}

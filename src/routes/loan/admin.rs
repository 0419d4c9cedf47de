use super::LoanError;
use crate::db::LoanStore;
use crate::forms;
use crate::helpers::JsonResponse;
use crate::models;
use crate::services::Audit;
use actix_web::{delete, get, patch, web, Responder, Result};
use uuid::Uuid;

/// An administrator may only decide a loan; moving it back to pending is
/// not a decision.
pub fn parse_decision(status: &str) -> Result<models::LoanStatus, LoanError> {
    match status.parse::<models::LoanStatus>() {
        Ok(status @ (models::LoanStatus::Approved | models::LoanStatus::Rejected)) => Ok(status),
        _ => Err(LoanError::Validation(
            "status must be approved or rejected".to_string(),
        )),
    }
}

#[tracing::instrument(name = "Admin list loans.", skip(loans, audit))]
#[get("/loans")]
pub async fn admin_list_handler(
    loans: web::Data<dyn LoanStore>,
    audit: web::Data<Audit>,
) -> Result<impl Responder, LoanError> {
    let list = loans.list().await?;
    audit
        .record("view_all_loans", format!("{} loans listed", list.len()))
        .await;

    Ok(JsonResponse::<models::Loan>::build()
        .set_list(list)
        .ok("OK"))
}

#[tracing::instrument(name = "Admin update loan status.", skip(form, loans, audit))]
#[patch("/loans/{id}/status")]
pub async fn admin_status_handler(
    path: web::Path<(Uuid,)>,
    form: web::Json<forms::LoanStatusForm>,
    loans: web::Data<dyn LoanStore>,
    audit: web::Data<Audit>,
) -> Result<impl Responder, LoanError> {
    let loan_id = path.0;
    let status = parse_decision(&form.status)?;
    loans.update_status(&loan_id, status).await?;

    audit
        .record(
            "loan_approval_rejection",
            format!("loan {loan_id} marked {status}"),
        )
        .await;

    let loan = loans.find_by_id(&loan_id).await?;
    Ok(JsonResponse::<models::Loan>::build()
        .set_item(loan)
        .ok("Loan status updated"))
}

#[tracing::instrument(name = "Admin delete loan.", skip(loans, audit))]
#[delete("/loans/{id}")]
pub async fn admin_delete_handler(
    path: web::Path<(Uuid,)>,
    loans: web::Data<dyn LoanStore>,
    audit: web::Data<Audit>,
) -> Result<impl Responder, LoanError> {
    let loan_id = path.0;
    loans.delete(&loan_id).await?;
    audit
        .record("loan_deletion", format!("loan {loan_id} deleted"))
        .await;

    Ok(JsonResponse::<models::Loan>::build().ok("Loan deleted"))
}

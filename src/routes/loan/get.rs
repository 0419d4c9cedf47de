use super::LoanError;
use crate::db::LoanStore;
use crate::helpers::JsonResponse;
use crate::models;
use crate::services::Audit;
use actix_web::{get, web, Responder, Result};
use uuid::Uuid;

/// Owners see their own loans; administrators see any.
pub fn can_view(identity: &models::Identity, loan: &models::Loan) -> bool {
    identity.is_admin || identity.user_id == loan.user_id.to_string()
}

#[tracing::instrument(name = "Get loan.", skip(identity, loans, audit))]
#[get("/{id}")]
pub async fn item_handler(
    identity: web::ReqData<models::Identity>,
    path: web::Path<(Uuid,)>,
    loans: web::Data<dyn LoanStore>,
    audit: web::Data<Audit>,
) -> Result<impl Responder, LoanError> {
    let loan_id = path.0;
    let loan = loans.find_by_id(&loan_id).await?;
    if !can_view(&identity, &loan) {
        return Err(LoanError::Forbidden);
    }

    audit
        .record(
            "view_loan_status",
            format!("user {} viewed loan {}", identity.user_id, loan.id),
        )
        .await;

    Ok(JsonResponse::<models::Loan>::build()
        .set_item(loan)
        .ok("Loan retrieved"))
}

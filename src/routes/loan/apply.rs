use super::LoanError;
use crate::db::LoanStore;
use crate::forms;
use crate::helpers::JsonResponse;
use crate::models;
use crate::services::Audit;
use actix_web::{post, web, Responder, Result};
use serde_valid::Validate;
use uuid::Uuid;

#[tracing::instrument(name = "Apply for a loan.", skip(identity, form, loans, audit))]
#[post("")]
pub async fn apply_handler(
    identity: web::ReqData<models::Identity>,
    form: web::Json<forms::LoanForm>,
    loans: web::Data<dyn LoanStore>,
    audit: web::Data<Audit>,
) -> Result<impl Responder, LoanError> {
    form.validate()
        .map_err(|err| LoanError::Validation(err.to_string()))?;

    let user_id = Uuid::parse_str(&identity.user_id)
        .map_err(|_| LoanError::Validation("invalid user id".to_string()))?;
    let form = form.into_inner();
    let loan = models::Loan::new(user_id, form.description, form.amount);
    loans.insert(&loan).await?;

    tracing::info!(loan_id = %loan.id, "Loan application saved");
    audit
        .record(
            "loan_application",
            format!("user {} applied for loan {} of {}", user_id, loan.id, loan.amount),
        )
        .await;

    Ok(JsonResponse::<models::Loan>::build()
        .set_item(loan)
        .ok("Loan application submitted"))
}

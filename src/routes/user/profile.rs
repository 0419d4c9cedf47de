use crate::helpers::JsonResponse;
use crate::models;
use crate::services::{Audit, AuthError, AuthService};
use actix_web::{get, web, Responder, Result};

#[tracing::instrument(name = "Get own profile.", skip(identity, auth, audit))]
#[get("")]
pub async fn profile_handler(
    identity: web::ReqData<models::Identity>,
    auth: web::Data<AuthService>,
    audit: web::Data<Audit>,
) -> Result<impl Responder, AuthError> {
    let user = auth.profile(&identity.user_id).await?;
    audit
        .record("user_profile_retrieval", format!("user {}", user.id))
        .await;

    Ok(JsonResponse::<models::PublicUser>::build()
        .set_item(user)
        .ok("Profile retrieved"))
}

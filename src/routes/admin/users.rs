use crate::helpers::JsonResponse;
use crate::models;
use crate::services::{Audit, AuthError, AuthService};
use actix_web::{delete, get, web, Responder, Result};

#[tracing::instrument(name = "Admin list users.", skip(auth, audit))]
#[get("/users")]
pub async fn admin_list_users_handler(
    auth: web::Data<AuthService>,
    audit: web::Data<Audit>,
) -> Result<impl Responder, AuthError> {
    let users = auth.list_users().await?;
    audit
        .record("get_all_users", format!("{} users listed", users.len()))
        .await;

    Ok(JsonResponse::<models::PublicUser>::build()
        .set_list(users)
        .ok("OK"))
}

#[tracing::instrument(name = "Admin delete user.", skip(identity, auth, audit))]
#[delete("/users/{id}")]
pub async fn admin_delete_user_handler(
    identity: web::ReqData<models::Identity>,
    path: web::Path<(String,)>,
    auth: web::Data<AuthService>,
    audit: web::Data<Audit>,
) -> Result<impl Responder, AuthError> {
    let user_id = path.into_inner().0;
    auth.delete_user(&user_id).await?;
    audit
        .record(
            "user_deletion",
            format!("user {user_id} deleted by {}", identity.user_id),
        )
        .await;

    Ok(JsonResponse::<models::PublicUser>::build().ok("User deleted"))
}

use crate::middleware::authentication::Rejection;
use crate::models::Identity;
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::{FutureExt, LocalBoxFuture};
use std::future::{ready, Ready};

/// Admit only callers the authentication gate marked as administrators.
pub fn require_admin(identity: Option<&Identity>) -> Result<(), Rejection> {
    match identity {
        Some(identity) if identity.is_admin => Ok(()),
        _ => Err(Rejection::Forbidden),
    }
}

/// Admin-only scope guard. Reads the [`Identity`] the authentication gate
/// put into the request, so it must be wrapped inside it; on its own it
/// finds no identity and forbids everything.
#[derive(Clone, Default)]
pub struct AdminGate;

impl<S, B> Transform<S, ServiceRequest> for AdminGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AdminGateMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AdminGateMiddleware { service }))
    }
}

pub struct AdminGateMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AdminGateMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<ServiceResponse<B>, Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let identity = req.extensions().get::<Identity>().cloned();
        if let Err(rejection) = require_admin(identity.as_ref()) {
            tracing::warn!(user_id = ?identity.map(|identity| identity.user_id), "admin route refused");
            return async move { Err::<ServiceResponse<B>, Error>(rejection.into()) }.boxed_local();
        }

        self.service.call(req).boxed_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, web, App, HttpResponse};

    fn identity(is_admin: bool) -> Identity {
        Identity {
            user_id: "user-1".to_string(),
            is_admin,
        }
    }

    #[actix_web::test]
    async fn only_admins_pass() {
        assert_eq!(require_admin(None), Err(Rejection::Forbidden));
        assert_eq!(require_admin(Some(&identity(false))), Err(Rejection::Forbidden));
        assert_eq!(require_admin(Some(&identity(true))), Ok(()));
    }

    async fn secret() -> HttpResponse {
        HttpResponse::Ok().body("secret")
    }

    #[actix_web::test]
    async fn standalone_gate_forbids_everything() {
        let app = test::init_service(
            App::new()
                .wrap(AdminGate)
                .route("/anything", web::get().to(secret)),
        )
        .await;

        let req = test::TestRequest::get().uri("/anything").to_request();
        let err = match test::try_call_service(&app, req).await {
            Ok(res) => panic!("request admitted with status {}", res.status()),
            Err(err) => err,
        };
        assert_eq!(
            err.error_response().status(),
            actix_web::http::StatusCode::FORBIDDEN
        );
    }

    #[actix_web::test]
    async fn identity_from_outer_layer_is_honoured() {
        for (is_admin, admitted) in [(true, true), (false, false)] {
            let app = test::init_service(
                App::new()
                    .wrap(AdminGate)
                    .wrap_fn(move |req, srv| {
                        req.extensions_mut().insert(identity(is_admin));
                        srv.call(req)
                    })
                    .route("/anything", web::get().to(secret)),
            )
            .await;

            let req = test::TestRequest::get().uri("/anything").to_request();
            let result = test::try_call_service(&app, req).await;
            assert_eq!(result.is_ok(), admitted);
        }
    }
}

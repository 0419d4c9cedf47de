use crate::middleware::authentication::*;
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse},
    error::ErrorInternalServerError,
    http::header::{HeaderName, HeaderValue},
    Error, HttpMessage,
};
use futures::future::{FutureExt, LocalBoxFuture};
use std::rc::Rc;
use std::sync::Arc;

pub struct AuthenticationMiddleware<S> {
    pub service: Rc<S>,
    pub gate: Arc<AuthGate>,
}

impl<S, B> Service<ServiceRequest> for AuthenticationMiddleware<S>
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
        let service = self.service.clone();
        let gate = self.gate.clone();

        async move {
            let authorization = get_header::<String>(&req, "authorization").map_err(|err| {
                tracing::debug!("{}", err);
                Rejection::MissingOrMalformedHeader
            })?;

            let admission = gate.admit(authorization.as_deref()).await?;
            if req.extensions_mut().insert(admission.identity).is_some() {
                tracing::error!("identity already set for this request");
                return Err(ErrorInternalServerError("identity already set"));
            }

            let mut res = service.call(req).await?;

            if let Some(token) = admission.refreshed_token {
                match HeaderValue::from_str(&token) {
                    Ok(value) => {
                        res.headers_mut()
                            .insert(HeaderName::from_static(NEW_ACCESS_TOKEN_HEADER), value);
                    }
                    Err(err) => tracing::error!("refreshed token is not a header value {err:?}"),
                }
            }

            Ok::<_, Error>(res)
        }
        .boxed_local()
    }
}

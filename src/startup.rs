use crate::configuration::AuthSettings;
use crate::connectors::Mailer;
use crate::db::{LoanStore, LogStore, UserStore};
use crate::helpers::{self, PasswordHasher};
use crate::middleware::{AdminGate, AuthGate, Authentication};
use crate::routes;
use crate::services::{Audit, AuthService, SessionStore};
use crate::token::{TokenCodec, TokenIssuer};
use actix_cors::Cors;
use actix_web::{dev::Server, error, http::StatusCode, web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

/// Everything the handlers and gates share for the lifetime of the server.
#[derive(Clone)]
pub struct Components {
    pub auth: Arc<AuthService>,
    pub gate: Arc<AuthGate>,
    pub loans: Arc<dyn LoanStore>,
    pub audit: Audit,
}

/// Storage and delivery backends the components are built on.
pub struct Backends {
    pub users: Arc<dyn UserStore>,
    pub loans: Arc<dyn LoanStore>,
    pub logs: Arc<dyn LogStore>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub mailer: Arc<dyn Mailer>,
}

impl Components {
    pub fn build(auth: &AuthSettings, backends: Backends) -> Self {
        let codec = Arc::new(TokenCodec::new(auth.jwt_secret.as_bytes()));
        let issuer = TokenIssuer::new(codec, auth.access_ttl(), auth.refresh_ttl());

        let gate = AuthGate::new(issuer.clone(), SessionStore::new(backends.users.clone()));
        let service = AuthService::new(
            backends.users,
            issuer,
            backends.hasher,
            backends.mailer,
            auth.link_ttl(),
            auth.public_base_url.clone(),
        );

        Self {
            auth: Arc::new(service),
            gate: Arc::new(gate),
            loans: backends.loans,
            audit: Audit::new(backends.logs),
        }
    }
}

/// Route table. The admin guard is registered before the authentication
/// gate so that it ends up inside it and always sees the identity.
pub fn configure(cfg: &mut web::ServiceConfig, components: &Components) {
    let authentication = Authentication::new(components.gate.clone());

    cfg.service(web::scope("/health_check").service(routes::health_check))
        .service(
            web::scope("/users")
                .service(
                    web::scope("/profile")
                        .wrap(authentication.clone())
                        .service(routes::user::profile_handler),
                )
                .service(routes::user::register_handler)
                .service(routes::user::verify_email_handler)
                .service(routes::user::login_handler)
                .service(routes::user::refresh_handler)
                .service(routes::user::password_reset_request_handler)
                .service(routes::user::password_reset_handler),
        )
        .service(
            web::scope("/loans")
                .wrap(authentication.clone())
                .service(routes::loan::apply_handler)
                .service(routes::loan::item_handler),
        )
        .service(
            web::scope("/admin")
                .wrap(AdminGate)
                .wrap(authentication)
                .service(routes::admin::admin_list_users_handler)
                .service(routes::admin::admin_delete_user_handler)
                .service(routes::admin::admin_list_logs_handler)
                .service(routes::loan::admin_list_handler)
                .service(routes::loan::admin_status_handler)
                .service(routes::loan::admin_delete_handler),
        );
}

pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let response = helpers::error_response(StatusCode::BAD_REQUEST, "validation", err.to_string());
        error::InternalError::from_response(err, response).into()
    })
}

pub fn run(listener: TcpListener, components: Components) -> Result<Server, std::io::Error> {
    let auth = web::Data::from(components.auth.clone());
    let loans: web::Data<dyn LoanStore> = web::Data::from(components.loans.clone());
    let audit = web::Data::new(components.audit.clone());

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(Cors::permissive())
            .app_data(json_config())
            .app_data(auth.clone())
            .app_data(loans.clone())
            .app_data(audit.clone())
            .configure(|cfg| configure(cfg, &components))
    })
    .listen(listener)?
    .run();

    Ok(server)
}

#![allow(dead_code)]

use chrono::Utc;
use loan_tracker::configuration::AuthSettings;
use loan_tracker::connectors::{Mailer, MockMailer};
use loan_tracker::db::{MemoryLoanStore, MemoryLogStore, MemoryUserStore, UserStore};
use loan_tracker::helpers::{Argon2Hasher, PasswordHasher};
use loan_tracker::models::User;
use loan_tracker::startup::{run, Backends, Components};
use loan_tracker::token::{Claims, TokenCodec};
use serde_json::{json, Value};
use std::net::TcpListener;
use std::sync::Arc;

pub const JWT_SECRET: &str = "integration-test-secret";

pub struct TestApp {
    pub address: String,
    pub users: Arc<MemoryUserStore>,
    pub mailer: Arc<MockMailer>,
    pub codec: TokenCodec,
    pub client: reqwest::Client,
}

pub async fn spawn_app() -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let auth = AuthSettings {
        jwt_secret: JWT_SECRET.to_string(),
        access_token_minutes: 15,
        refresh_token_days: 7,
        link_token_hours: 24,
        public_base_url: address.clone(),
    };

    let users = Arc::new(MemoryUserStore::new());
    let mailer = Arc::new(MockMailer::new());
    let mailer_handle: Arc<dyn Mailer> = mailer.clone();

    let components = Components::build(
        &auth,
        Backends {
            users: users.clone(),
            loans: Arc::new(MemoryLoanStore::new()),
            logs: Arc::new(MemoryLogStore::new()),
            hasher: Arc::new(Argon2Hasher),
            mailer: mailer_handle,
        },
    );

    let server = run(listener, components).expect("Failed to bind address.");
    let _ = tokio::spawn(server);

    TestApp {
        address,
        users,
        mailer,
        codec: TokenCodec::new(JWT_SECRET.as_bytes()),
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn post_json(&self, path: &str, body: &Value, token: Option<&str>) -> reqwest::Response {
        let mut request = self.client.post(self.url(path)).json(body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request.send().await.expect("Failed to execute request.")
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> reqwest::Response {
        let mut request = self.client.get(self.url(path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request.send().await.expect("Failed to execute request.")
    }

    pub async fn register(&self, username: &str, email: &str, password: &str) -> reqwest::Response {
        self.post_json(
            "/users/register",
            &json!({"username": username, "email": email, "password": password}),
            None,
        )
        .await
    }

    /// Follow the link from the most recent mail.
    pub async fn follow_last_link(&self) -> reqwest::Response {
        let mail = self.mailer.last().expect("no mail was sent");
        let token = mail.token().expect("link without token").to_string();
        self.get(&format!("/users/verify-email?token={token}"), None)
            .await
    }

    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.post_json(
            "/users/login",
            &json!({"email": email, "password": password}),
            None,
        )
        .await
    }

    /// Register, verify and log in; returns the access token.
    pub async fn signed_in_user(&self, username: &str, email: &str, password: &str) -> String {
        assert_eq!(self.register(username, email, password).await.status().as_u16(), 200);
        assert_eq!(self.follow_last_link().await.status().as_u16(), 200);
        token_of(self.login(email, password).await).await
    }

    /// Seed a verified administrator and log in as them.
    pub async fn signed_in_admin(&self, email: &str, password: &str) -> String {
        let hash = Argon2Hasher.hash(password).unwrap();
        let mut admin = User::new("admin".to_string(), email.to_string(), hash);
        admin.is_admin = true;
        admin.is_verified = true;
        self.users.put(admin).await;
        token_of(self.login(email, password).await).await
    }

    pub async fn stored_user(&self, email: &str) -> User {
        self.users.find_by_email(email).await.expect("user not stored")
    }

    /// A correctly signed access token for `user` that expired a minute ago.
    pub fn expired_access_token(&self, user: &User) -> String {
        self.codec
            .encode(&Claims::new(
                user.id.to_string(),
                user.email.clone(),
                Utc::now().timestamp() - 60,
            ))
            .unwrap()
    }
}

pub async fn token_of(response: reqwest::Response) -> String {
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    body["token"].as_str().expect("response without token").to_string()
}

pub async fn reason_of(response: reqwest::Response) -> String {
    let body: Value = response.json().await.unwrap();
    body["reason"].as_str().unwrap_or_default().to_string()
}

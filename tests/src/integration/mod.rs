//! # Integration Flows
//!
//! [`TestCourier`] assembles the same components the binary does, on a
//! private broker, with cheap password hashing and short call timeouts.

pub mod accounts;
pub mod delivery;
pub mod profiles;

#[cfg(test)]
pub(crate) mod harness {
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use axum::Router;
    use courier_runtime::{HashCosts, RuntimeConfig, Services};
    use cr_01_identity::IdentityVerifier;
    use serde_json::{json, Value};
    use shared_bus::InMemoryBroker;
    use shared_types::UserId;
    use std::sync::Arc;
    use tower::ServiceExt;

    pub const SECRET: &str = "integration-suite-secret-0123456789abcdef";
    pub const ADMIN_EMAIL: &str = "admin@courier.dev";
    pub const PASSWORD: &str = "correct-horse";

    /// Fully wired courier without an HTTP listener.
    pub struct TestCourier {
        services: Services,
        router: Router,
        verifier: IdentityVerifier,
    }

    /// A registered account.
    pub struct Account {
        pub id: UserId,
        pub login: String,
        pub email: String,
        pub bearer: String,
    }

    impl TestCourier {
        pub async fn start() -> Self {
            let mut config = RuntimeConfig::new(SECRET);
            config.gateway.call_timeout_ms = 2_000;
            config.admin_emails = vec![ADMIN_EMAIL.to_string()];
            config.hash_costs = HashCosts {
                memory_kib: 64,
                iterations: 1,
                lanes: 1,
            };
            let verifier = IdentityVerifier::new(&config.identity).unwrap();

            let services = Services::assemble(config, Arc::new(InMemoryBroker::new())).await.unwrap();
            let router = services.gateway().router();
            Self {
                services,
                router,
                verifier,
            }
        }

        pub fn broker(&self) -> &Arc<InMemoryBroker> {
            self.services.broker()
        }

        pub async fn request(
            &self,
            method: Method,
            uri: &str,
            bearer: Option<&str>,
            body: Option<Value>,
        ) -> (StatusCode, Value) {
            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(bearer) = bearer {
                builder = builder.header(header::AUTHORIZATION, bearer);
            }
            let request = match body {
                Some(body) => builder
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
                None => builder.body(Body::empty()).unwrap(),
            };

            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
            (status, value)
        }

        /// Register `login` and return the account with its bearer credential.
        pub async fn register(&self, login: &str, email: &str) -> Account {
            let (status, body) = self
                .request(Method::POST, "/auth/registration", None, Some(registration_body(login, email)))
                .await;
            assert_eq!(status, StatusCode::CREATED, "registration of {login} failed: {body}");

            let bearer = format!("Bearer {}", body["token"].as_str().unwrap());
            let claim = self.verifier.verify(&bearer).unwrap();
            Account {
                id: claim.subject_id,
                login: login.to_string(),
                email: email.to_string(),
                bearer,
            }
        }

        pub fn verifier(&self) -> &IdentityVerifier {
            &self.verifier
        }

        pub async fn shutdown(self) {
            self.services.shutdown().await;
        }
    }

    pub fn registration_body(login: &str, email: &str) -> Value {
        json!({
            "login": login,
            "email": email,
            "password": PASSWORD,
            "name": "Ivan",
            "surname": "Petrov",
            "phone_number": "+79991234567",
            "address": "Lenina 1"
        })
    }
}

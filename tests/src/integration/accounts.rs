//! # Account Flows
//!
//! Registration spans both services: the auth service creates the profile
//! over the queue before it stores the user. Account edits are limited to
//! the owner or an admin.

#[cfg(test)]
mod tests {
    use super::super::harness::{registration_body, TestCourier, ADMIN_EMAIL, PASSWORD};
    use axum::http::{Method, StatusCode};
    use futures::future::join_all;
    use serde_json::json;
    use shared_types::Role;
    use std::collections::HashSet;

    #[tokio::test]
    async fn test_registration_links_user_and_profile() {
        let courier = TestCourier::start().await;
        let ivan = courier.register("ivan", "ivan@mail.ru").await;

        let (status, user) = courier
            .request(Method::GET, &format!("/users/{}", ivan.id), Some(&ivan.bearer), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(user["login"], "ivan");
        assert_eq!(user["roles"], json!(["user"]));
        assert!(user.get("password_hash").is_none());

        let profile_id = user["profile_id"].as_u64().expect("profile linked");
        let (status, profile) = courier
            .request(Method::GET, &format!("/profiles/{profile_id}"), Some(&ivan.bearer), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(profile["user_id"], ivan.id.0);
        assert_eq!(profile["phone_number"], "+79991234567");

        courier.shutdown().await;
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts_without_side_effects() {
        let courier = TestCourier::start().await;
        let ivan = courier.register("ivan", "ivan@mail.ru").await;

        let (status, body) = courier
            .request(
                Method::POST,
                "/auth/registration",
                None,
                Some(registration_body("other", "IVAN@mail.ru")),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "domain_conflict");
        assert_eq!(body["message"], "user with this email already exists");

        let (status, body) = courier
            .request(Method::POST, "/auth/registration", None, Some(registration_body("ivan", "new@mail.ru")))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["message"], "user with this login already exists");

        // No stray profile from the rejected attempts
        let (_, users) = courier.request(Method::GET, "/users", Some(&ivan.bearer), None).await;
        let (_, profiles) = courier.request(Method::GET, "/profiles", Some(&ivan.bearer), None).await;
        assert_eq!(users.as_array().unwrap().len(), 1);
        assert_eq!(profiles.as_array().unwrap().len(), 1);

        courier.shutdown().await;
    }

    #[tokio::test]
    async fn test_invalid_registration_is_bad_request() {
        let courier = TestCourier::start().await;

        let mut body = registration_body("ivan", "ivan@mail.ru");
        body["phone_number"] = json!("call me");
        let (status, reply) = courier.request(Method::POST, "/auth/registration", None, Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(reply["error"], "validation_failed");

        let mut body = registration_body("ivan", "ivan@mail.ru");
        body["password"] = json!("short");
        let (status, _) = courier.request(Method::POST, "/auth/registration", None, Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        // The account can still be created afterwards
        courier.register("ivan", "ivan@mail.ru").await;
        courier.shutdown().await;
    }

    #[tokio::test]
    async fn test_login() {
        let courier = TestCourier::start().await;
        let ivan = courier.register("ivan", "ivan@mail.ru").await;

        let (status, body) = courier
            .request(
                Method::POST,
                "/auth/login",
                None,
                Some(json!({"login": "ivan", "email": "ivan@mail.ru", "password": PASSWORD})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        let bearer = format!("Bearer {}", body["token"].as_str().unwrap());
        assert_eq!(courier.verifier().verify(&bearer).unwrap().subject_id, ivan.id);

        for attempt in [
            json!({"login": "ivan", "email": "ivan@mail.ru", "password": "wrong-password"}),
            json!({"login": "ivan", "email": "nobody@mail.ru", "password": PASSWORD}),
            json!({"login": "petr", "email": "ivan@mail.ru", "password": PASSWORD}),
        ] {
            let (status, body) = courier.request(Method::POST, "/auth/login", None, Some(attempt)).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body["error"], "invalid_credentials");
        }

        courier.shutdown().await;
    }

    #[tokio::test]
    async fn test_account_routes_require_identity() {
        let courier = TestCourier::start().await;

        let (status, body) = courier.request(Method::GET, "/users", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "missing_or_malformed_credential");

        let (status, _) = courier.request(Method::GET, "/users", Some("Bearer forged"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        courier.shutdown().await;
    }

    #[tokio::test]
    async fn test_only_owner_edits_account() {
        let courier = TestCourier::start().await;
        let ivan = courier.register("ivan", "ivan@mail.ru").await;
        let petr = courier.register("petr", "petr@mail.ru").await;

        let (status, body) = courier
            .request(
                Method::PUT,
                &format!("/users/{}", petr.id),
                Some(&ivan.bearer),
                Some(json!({"login": "hijacked"})),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "forbidden");

        let (_, user) = courier
            .request(Method::GET, &format!("/users/{}", petr.id), Some(&ivan.bearer), None)
            .await;
        assert_eq!(user["login"], petr.login);

        let (status, user) = courier
            .request(
                Method::PUT,
                &format!("/users/{}", petr.id),
                Some(&petr.bearer),
                Some(json!({"login": "pyotr", "password": "new-password"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(user["login"], "pyotr");

        let (status, _) = courier
            .request(
                Method::POST,
                "/auth/login",
                None,
                Some(json!({"login": "pyotr", "email": petr.email, "password": "new-password"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        courier.shutdown().await;
    }

    #[tokio::test]
    async fn test_admin_deletes_account_and_profile() {
        let courier = TestCourier::start().await;
        let admin = courier.register("root", ADMIN_EMAIL).await;
        let ivan = courier.register("ivan", "ivan@mail.ru").await;

        let claim = courier.verifier().verify(&admin.bearer).unwrap();
        assert!(claim.has_role(Role::Admin));

        let (_, user) = courier
            .request(Method::GET, &format!("/users/{}", ivan.id), Some(&ivan.bearer), None)
            .await;
        let profile_id = user["profile_id"].as_u64().unwrap();

        let (status, body) = courier
            .request(Method::DELETE, &format!("/users/{}", ivan.id), Some(&admin.bearer), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"id": ivan.id.0, "deleted": true}));

        let (status, _) = courier
            .request(Method::GET, &format!("/users/{}", ivan.id), Some(&admin.bearer), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = courier
            .request(Method::GET, &format!("/profiles/{profile_id}"), Some(&admin.bearer), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        courier.shutdown().await;
    }

    #[tokio::test]
    async fn test_concurrent_registrations_get_their_own_replies() {
        let courier = TestCourier::start().await;

        let accounts = join_all((0..16).map(|i| {
            let courier = &courier;
            async move { courier.register(&format!("user{i}"), &format!("user{i}@mail.ru")).await }
        }))
        .await;

        let ids: HashSet<_> = accounts.iter().map(|a| a.id).collect();
        assert_eq!(ids.len(), 16);

        // Each token belongs to the account that asked for it
        for account in &accounts {
            let (status, user) = courier
                .request(Method::GET, &format!("/users/{}", account.id), Some(&account.bearer), None)
                .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(user["email"], account.email);
        }

        courier.shutdown().await;
    }
}

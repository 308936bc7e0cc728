//! # Profile Flows
//!
//! Ownership of an existing profile is resolved through `get-profile`
//! before the gateway lets an edit or delete through.

#[cfg(test)]
mod tests {
    use super::super::harness::{TestCourier, ADMIN_EMAIL};
    use axum::http::{Method, StatusCode};
    use serde_json::{json, Value};

    async fn profile_of(courier: &TestCourier, bearer: &str, user: shared_types::UserId) -> Value {
        let (_, user) = courier
            .request(Method::GET, &format!("/users/{user}"), Some(bearer), None)
            .await;
        let id = user["profile_id"].as_u64().unwrap();
        let (_, profile) = courier
            .request(Method::GET, &format!("/profiles/{id}"), Some(bearer), None)
            .await;
        profile
    }

    #[tokio::test]
    async fn test_create_profile_is_idempotent_per_owner() {
        let courier = TestCourier::start().await;
        let ivan = courier.register("ivan", "ivan@mail.ru").await;
        let existing = profile_of(&courier, &ivan.bearer, ivan.id).await;

        let (status, profile) = courier
            .request(
                Method::POST,
                "/profiles",
                Some(&ivan.bearer),
                Some(json!({
                    "name": "Another",
                    "surname": "Name",
                    "phone_number": "+70000000000",
                    "address": "Elsewhere"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(profile, existing);

        let (_, all) = courier.request(Method::GET, "/profiles", Some(&ivan.bearer), None).await;
        assert_eq!(all.as_array().unwrap().len(), 1);

        courier.shutdown().await;
    }

    #[tokio::test]
    async fn test_owner_edits_profile_partially() {
        let courier = TestCourier::start().await;
        let ivan = courier.register("ivan", "ivan@mail.ru").await;
        let profile = profile_of(&courier, &ivan.bearer, ivan.id).await;

        let (status, edited) = courier
            .request(
                Method::PUT,
                &format!("/profiles/{}", profile["id"]),
                Some(&ivan.bearer),
                Some(json!({"address": "Pushkina 10"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(edited["address"], "Pushkina 10");
        assert_eq!(edited["name"], profile["name"]);

        let (status, body) = courier
            .request(
                Method::PUT,
                &format!("/profiles/{}", profile["id"]),
                Some(&ivan.bearer),
                Some(json!({"phone_number": "12"})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_failed");

        courier.shutdown().await;
    }

    #[tokio::test]
    async fn test_foreign_profile_is_forbidden_unless_admin() {
        let courier = TestCourier::start().await;
        let admin = courier.register("root", ADMIN_EMAIL).await;
        let ivan = courier.register("ivan", "ivan@mail.ru").await;
        let petr = courier.register("petr", "petr@mail.ru").await;
        let profile = profile_of(&courier, &petr.bearer, petr.id).await;
        let uri = format!("/profiles/{}", profile["id"]);

        let (status, _) = courier
            .request(Method::PUT, &uri, Some(&ivan.bearer), Some(json!({"name": "Mallory"})))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = courier.request(Method::DELETE, &uri, Some(&ivan.bearer), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (_, unchanged) = courier.request(Method::GET, &uri, Some(&ivan.bearer), None).await;
        assert_eq!(unchanged, profile);

        let (status, edited) = courier
            .request(Method::PUT, &uri, Some(&admin.bearer), Some(json!({"name": "Pyotr"})))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(edited["name"], "Pyotr");

        let (status, body) = courier.request(Method::DELETE, &uri, Some(&admin.bearer), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["deleted"], true);

        courier.shutdown().await;
    }

    #[tokio::test]
    async fn test_missing_profile_is_not_found_before_guard() {
        let courier = TestCourier::start().await;
        let ivan = courier.register("ivan", "ivan@mail.ru").await;

        let (status, body) = courier
            .request(Method::DELETE, "/profiles/9999", Some(&ivan.bearer), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");

        courier.shutdown().await;
    }
}

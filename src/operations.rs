//! API operations and their raising counterparts.
//!
//! Every operation is declared once in the `api_operations!` invocation below.
//! From that single declaration the macro emits:
//! - the `Client` method returning an [`ApiResponse`] (business failures are values),
//! - the `_strict` `Client` method, which runs the first and turns a failure into
//!   an [`ApiError`] through [`raise_on_failure`],
//! - both as crate-level functions bound to the process-wide configuration,
//! - an entry in the [`OPERATIONS`] registry.
//!
//! Configuration functions (`setup`, `configuration`, `default_configuration`) are
//! not declared here, so they never gain a raising counterpart.

use anyhow::Result;
use serde_json::{Map, Value};

use crate::client::Client;
use crate::error::ApiError;
use crate::event::TrackEvent;
use crate::http::{ApiRequest, Transport};
use crate::response::ApiResponse;

/// Suffix naming the raising counterpart of an operation.
pub const RAISING_SUFFIX: &str = "_strict";

/// Registry entry pairing an operation with its raising counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    pub name: &'static str,
    pub raising_name: &'static str,
}

/// Looks up an operation by its non-raising name.
pub fn find_operation(name: &str) -> Option<&'static Operation> {
    OPERATIONS.iter().find(|op| op.name == name)
}

/// Passes a successful result through unchanged and raises [`ApiError`] on failure.
pub fn raise_on_failure(response: ApiResponse) -> Result<ApiResponse> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(ApiError::from_response(&response).into())
    }
}

macro_rules! api_operations {
    ($(
        $(#[$doc:meta])*
        $name:ident / $strict:ident ( $($arg:ident : $ty:ty),* ) $build:block
    )*) => {
        impl<T: Transport> Client<T> {
            $(
                $(#[$doc])*
                #[tracing::instrument(skip(self))]
                pub async fn $name(&self, $($arg: $ty),*) -> Result<ApiResponse> {
                    let request: ApiRequest = $build;
                    self.dispatch(stringify!($name), request).await
                }

                #[doc = concat!("Like [`Client::", stringify!($name), "`], but a business failure is returned as an [`ApiError`].")]
                pub async fn $strict(&self, $($arg: $ty),*) -> Result<ApiResponse> {
                    raise_on_failure(self.$name($($arg),*).await?)
                }
            )*
        }

        /// Operations bound to the process-wide configuration.
        pub mod shared {
            use super::*;

            $(
                $(#[$doc])*
                pub async fn $name($($arg: $ty),*) -> Result<ApiResponse> {
                    Client::shared()?.$name($($arg),*).await
                }

                #[doc = concat!("Like [`", stringify!($name), "`], but a business failure is returned as an [`ApiError`].")]
                pub async fn $strict($($arg: $ty),*) -> Result<ApiResponse> {
                    Client::shared()?.$strict($($arg),*).await
                }
            )*
        }

        /// Every API operation, in declaration order.
        pub const OPERATIONS: &[Operation] = &[
            $(Operation { name: stringify!($name), raising_name: stringify!($strict) },)*
        ];
    };
}

api_operations! {
    /// Fetches a user. `redirect_url` is forwarded for enrollment links.
    get_user / get_user_strict (user_id: &str, redirect_url: Option<&str>) {
        let request = ApiRequest::get(["users", user_id]);
        match redirect_url {
            Some(url) => request.query("redirectUrl", url),
            None => request,
        }
    }

    /// Updates user attributes such as `email` or `phone_number`.
    update_user / update_user_strict (user_id: &str, user: Value) {
        ApiRequest::post(["users", user_id]).body(user)
    }

    delete_user / delete_user_strict (user_id: &str) {
        ApiRequest::delete(["users", user_id])
    }

    /// Fetches the outcome of a tracked action.
    get_action / get_action_strict (user_id: &str, action: &str, idempotency_key: &str) {
        ApiRequest::get(["users", user_id, "actions", action, idempotency_key])
    }

    /// Enrolls an authenticator the caller has already verified, e.g. an SMS number.
    enroll_verified_authenticator / enroll_verified_authenticator_strict (user_id: &str, authenticator: Value) {
        ApiRequest::post(["users", user_id, "authenticators"]).body(authenticator)
    }

    delete_authenticator / delete_authenticator_strict (user_id: &str, user_authenticator_id: &str) {
        ApiRequest::delete(["users", user_id, "authenticators", user_authenticator_id])
    }

    /// Tracks an action for risk evaluation.
    ///
    /// Fails with [`crate::ArgumentError`] before sending anything when the action or
    /// user id is empty.
    track / track_strict (event: &TrackEvent) {
        event.validate()?;
        ApiRequest::post(["users", event.user_id.as_str(), "actions", event.action.as_str()])
            .body(event.body())
    }

    /// Validates a challenge token. `user_id` and `action`, when given, must match the token.
    validate_challenge / validate_challenge_strict (token: &str, user_id: Option<&str>, action: Option<&str>) {
        let mut body = Map::new();
        body.insert("token".to_string(), Value::from(token));
        if let Some(user_id) = user_id {
            body.insert("user_id".to_string(), Value::from(user_id));
        }
        if let Some(action) = action {
            body.insert("action".to_string(), Value::from(action));
        }
        ApiRequest::post(["validate"]).body(Value::Object(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Configuration;
    use crate::error::ArgumentError;
    use crate::http::{MockTransport, RawResponse};
    use reqwest::Method;
    use serde_json::json;

    fn respond(status: u16, body: Value) -> impl Fn(&Configuration, &ApiRequest) -> Result<RawResponse> {
        move |_, _| {
            Ok(RawResponse {
                status: Some(status),
                body: Some(body.clone()),
            })
        }
    }

    fn client(transport: MockTransport) -> Client<MockTransport> {
        Client::with_transport(transport, Some(Configuration::default()))
    }

    fn expect_request(
        transport: &mut MockTransport,
        method: Method,
        path: &'static str,
        status: u16,
        body: Value,
    ) {
        transport
            .expect_send()
            .withf(move |_, request| request.method == method && request.display_path() == path)
            .returning(respond(status, body));
    }

    #[test]
    fn test_registry_follows_suffix_convention() {
        for op in OPERATIONS {
            assert_eq!(op.raising_name, format!("{}{}", op.name, RAISING_SUFFIX));
        }
    }

    #[test]
    fn test_registry_lists_every_operation_once() {
        let names: Vec<&str> = OPERATIONS.iter().map(|op| op.name).collect();
        assert_eq!(
            names,
            vec![
                "get_user",
                "update_user",
                "delete_user",
                "get_action",
                "enroll_verified_authenticator",
                "delete_authenticator",
                "track",
                "validate_challenge",
            ]
        );
    }

    #[tokio::test]
    async fn test_registry_matches_client_methods() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .times(2 * OPERATIONS.len())
            .returning(respond(200, json!({})));
        let client = client(transport);
        let event = TrackEvent::new("u1", "signIn");

        let responses = vec![
            client.get_user("u1", None).await,
            client.get_user_strict("u1", None).await,
            client.update_user("u1", json!({})).await,
            client.update_user_strict("u1", json!({})).await,
            client.delete_user("u1").await,
            client.delete_user_strict("u1").await,
            client.get_action("u1", "signIn", "k1").await,
            client.get_action_strict("u1", "signIn", "k1").await,
            client.enroll_verified_authenticator("u1", json!({})).await,
            client.enroll_verified_authenticator_strict("u1", json!({})).await,
            client.delete_authenticator("u1", "ua1").await,
            client.delete_authenticator_strict("u1", "ua1").await,
            client.track(&event).await,
            client.track_strict(&event).await,
            client.validate_challenge("tok", None, None).await,
            client.validate_challenge_strict("tok", None, None).await,
        ];

        assert_eq!(responses.len(), 2 * OPERATIONS.len());
        assert!(responses.into_iter().all(|r| r.unwrap().is_success()));
    }

    #[test]
    fn test_find_operation() {
        let op = find_operation("track").unwrap();
        assert_eq!(op.raising_name, "track_strict");
        assert!(find_operation("track_strict").is_none());
    }

    #[test]
    fn test_raise_on_failure_passes_success_through() {
        let response = ApiResponse::Success {
            fields: json!({"id": "abc"}).as_object().cloned().unwrap(),
        };
        assert_eq!(raise_on_failure(response.clone()).unwrap(), response);
    }

    #[test]
    fn test_raise_on_failure_builds_api_error() {
        let response = ApiResponse::Failure {
            fields: json!({"error": "not_found", "error_description": "no such user"})
                .as_object()
                .cloned()
                .unwrap(),
            status: 404,
        };
        let err = raise_on_failure(response).unwrap_err();
        let api_error = err.downcast_ref::<ApiError>().unwrap();
        assert_eq!(api_error.status, 404);
        assert_eq!(api_error.name.as_deref(), Some("not_found"));
        assert_eq!(api_error.code.as_deref(), Some("not_found"));
        assert_eq!(api_error.description.as_deref(), Some("no such user"));
    }

    #[tokio::test]
    async fn test_get_user_success() {
        let mut transport = MockTransport::new();
        expect_request(
            &mut transport,
            Method::GET,
            "users/abc",
            200,
            json!({"id": "abc", "email": "a@b.com"}),
        );

        let response = client(transport).get_user("abc", None).await.unwrap();
        assert_eq!(
            response.into_value(),
            json!({"id": "abc", "email": "a@b.com", "success": true})
        );
    }

    #[tokio::test]
    async fn test_get_user_forwards_redirect_url() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|_, request| {
                request.query == vec![("redirectUrl".to_string(), "https://app/cb".to_string())]
            })
            .returning(respond(200, json!({})));

        let response = client(transport)
            .get_user("abc", Some("https://app/cb"))
            .await
            .unwrap();
        assert!(response.is_success());
    }

    #[tokio::test]
    async fn test_get_user_strict_raises_on_not_found() {
        let mut transport = MockTransport::new();
        expect_request(
            &mut transport,
            Method::GET,
            "users/missing",
            404,
            json!({"error": "not_found", "error_description": "no such user"}),
        );

        let err = client(transport)
            .get_user_strict("missing", None)
            .await
            .unwrap_err();
        let api_error = err.downcast_ref::<ApiError>().unwrap();
        assert_eq!(api_error.status, 404);
        assert_eq!(api_error.code.as_deref(), Some("not_found"));
        assert_eq!(api_error.description.as_deref(), Some("no such user"));
    }

    #[tokio::test]
    async fn test_non_raising_returns_failure_value() {
        let mut transport = MockTransport::new();
        expect_request(
            &mut transport,
            Method::DELETE,
            "users/missing",
            404,
            json!({"error": "not_found"}),
        );

        let response = client(transport).delete_user("missing").await.unwrap();
        assert_eq!(
            response.into_value(),
            json!({"error": "not_found", "status": 404, "success": false})
        );
    }

    #[tokio::test]
    async fn test_strict_success_equals_non_raising_result() {
        let mut transport = MockTransport::new();
        expect_request(
            &mut transport,
            Method::GET,
            "users/u1/actions/signIn/key-1",
            200,
            json!({"state": "ALLOW", "rule_ids": []}),
        );
        let client = client(transport);

        let plain = client.get_action("u1", "signIn", "key-1").await.unwrap();
        let strict = client.get_action_strict("u1", "signIn", "key-1").await.unwrap();
        assert_eq!(plain, strict);
    }

    #[tokio::test]
    async fn test_update_user_sends_body() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|_, request| {
                request.method == Method::POST
                    && request.display_path() == "users/u1"
                    && request.body == Some(json!({"email": "new@b.com"}))
            })
            .returning(respond(200, json!({"email": "new@b.com"})));

        let response = client(transport)
            .update_user("u1", json!({"email": "new@b.com"}))
            .await
            .unwrap();
        assert_eq!(response.get("email"), Some(&json!("new@b.com")));
    }

    #[tokio::test]
    async fn test_enroll_and_delete_authenticator_paths() {
        let mut transport = MockTransport::new();
        expect_request(
            &mut transport,
            Method::POST,
            "users/u1/authenticators",
            200,
            json!({"authenticator": {"user_authenticator_id": "ua1"}}),
        );
        expect_request(
            &mut transport,
            Method::DELETE,
            "users/u1/authenticators/ua1",
            200,
            json!({}),
        );
        let client = client(transport);

        let enrolled = client
            .enroll_verified_authenticator_strict(
                "u1",
                json!({"verification_method": "SMS", "phone_number": "+64270000000"}),
            )
            .await
            .unwrap();
        assert!(enrolled.is_success());

        let deleted = client.delete_authenticator_strict("u1", "ua1").await.unwrap();
        assert!(deleted.is_success());
    }

    #[tokio::test]
    async fn test_track_sends_attributes_only() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|_, request| {
                request.display_path() == "users/u1/actions/signIn"
                    && request.body == Some(json!({"redirect_url": "https://app"}))
            })
            .returning(respond(200, json!({"state": "ALLOW"})));

        let event = TrackEvent::new("u1", "signIn").attribute("redirect_url", "https://app");
        let response = client(transport).track(&event).await.unwrap();
        assert_eq!(response.get("state"), Some(&json!("ALLOW")));
    }

    #[tokio::test]
    async fn test_track_empty_action_fails_before_dispatch() {
        let mut transport = MockTransport::new();
        transport.expect_send().never();
        let client = client(transport);

        let err = client.track(&TrackEvent::new("u1", "")).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<ArgumentError>(),
            Some(&ArgumentError::MissingAction)
        );

        let err = client.track_strict(&TrackEvent::new("", "signIn")).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<ArgumentError>(),
            Some(&ArgumentError::MissingUserId)
        );
    }

    #[tokio::test]
    async fn test_validate_challenge_omits_absent_fields() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|_, request| {
                request.display_path() == "validate" && request.body == Some(json!({"token": "tok"}))
            })
            .returning(respond(200, json!({"is_valid": true})));

        let response = client(transport)
            .validate_challenge("tok", None, None)
            .await
            .unwrap();
        assert_eq!(response.get("is_valid"), Some(&json!(true)));
    }

    #[tokio::test]
    async fn test_validate_challenge_strict_raises_without_error_fields() {
        let mut transport = MockTransport::new();
        transport.expect_send().returning(|_, _| {
            Ok(RawResponse {
                status: Some(502),
                body: None,
            })
        });

        let err = client(transport)
            .validate_challenge_strict("tok", Some("u1"), Some("signIn"))
            .await
            .unwrap_err();
        let api_error = err.downcast_ref::<ApiError>().unwrap();
        assert_eq!(api_error.status, 502);
        assert_eq!(api_error.code, None);
    }

    #[tokio::test]
    async fn test_strict_propagates_transport_errors() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .returning(|_, _| Err(anyhow::anyhow!("connection timed out")));

        let err = client(transport).delete_user_strict("u1").await.unwrap_err();
        assert!(err.downcast_ref::<ApiError>().is_none());
        assert!(err.to_string().contains("connection timed out"));
    }
}

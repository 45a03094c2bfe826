//! Integration tests for the service connection.

use std::sync::Arc;

use passfill_crypto::{
    CryptoError, DecryptedCredential, ScriptedCryptoService, ServiceConnection, ServiceResult,
};
use serde_json::json;

fn connect() -> (Arc<ScriptedCryptoService>, ServiceConnection) {
    let service = Arc::new(ScriptedCryptoService::new());
    let connection = ServiceConnection::new(service.clone());
    (service, connection)
}

// =============================================================================
// Binding
// =============================================================================

mod binding {
    use super::*;

    #[tokio::test]
    async fn test_concurrent_requests_share_one_bind() {
        let (service, connection) = connect();
        service.respond(ServiceResult::success(b"a".to_vec()));
        service.respond(ServiceResult::success(b"b".to_vec()));

        let (first, second) = tokio::join!(
            connection.decrypt_verify(b"one".to_vec(), None),
            connection.decrypt_verify(b"two".to_vec(), None),
        );

        assert!(first.is_ok());
        assert!(second.is_ok());
        assert_eq!(service.bind_calls(), 1);
        assert_eq!(service.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_rebinds_after_disconnect() {
        let (service, connection) = connect();
        connection.ensure_bound().await.unwrap();
        connection.ensure_bound().await.unwrap();
        assert_eq!(service.bind_calls(), 1);

        service.disconnect();
        connection.ensure_bound().await.unwrap();
        assert_eq!(service.bind_calls(), 2);
    }

    #[tokio::test]
    async fn test_bind_failure_is_retried_next_time() {
        let (service, connection) = connect();
        service.refuse_bind(true);
        assert!(matches!(
            connection.ensure_bound().await,
            Err(CryptoError::BindFailed(_))
        ));

        service.refuse_bind(false);
        connection.ensure_bound().await.unwrap();
        assert!(connection.is_bound());
        assert_eq!(service.bind_calls(), 2);
    }
}

// =============================================================================
// Requests
// =============================================================================

mod requests {
    use super::*;

    #[tokio::test]
    async fn test_resume_payload_reaches_service() {
        let (service, connection) = connect();
        service.respond(ServiceResult::InteractionRequired(json!({"step": "unlock"})));
        service.respond(ServiceResult::success(b"pw\nuser: alice".to_vec()));

        let first = connection.decrypt_verify(b"cipher".to_vec(), None).await.unwrap();
        let token = match first {
            ServiceResult::InteractionRequired(token) => token,
            other => panic!("expected interaction, got {other:?}"),
        };

        let second = connection
            .decrypt_verify(b"cipher".to_vec(), Some(json!({"unlocked": true})))
            .await
            .unwrap();
        let ServiceResult::Success(plain) = second else {
            panic!("expected success");
        };
        let cred = DecryptedCredential::parse(&plain).unwrap();
        assert_eq!(cred.username(), Some("alice"));

        assert_eq!(token["step"], "unlock");
        let requests = service.requests();
        assert_eq!(requests[0].1, None);
        assert_eq!(requests[1].1, Some(json!({"unlocked": true})));
    }

    #[tokio::test]
    async fn test_service_error_is_a_result_not_a_failure() {
        let (service, connection) = connect();
        service.respond(ServiceResult::Error {
            code: 2,
            message: "bad key".to_string(),
        });

        let result = connection.decrypt_verify(b"cipher".to_vec(), None).await.unwrap();
        assert!(matches!(result, ServiceResult::Error { code: 2, .. }));
    }
}

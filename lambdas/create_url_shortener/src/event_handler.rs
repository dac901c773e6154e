use lambda_runtime::{tracing, Error, LambdaEvent};
use shared::core::{IdGenerator, RequestEnvelope, ShortUrlStore, UrlShortener};
use std::collections::HashMap;

pub(crate) struct HandlerDeps<S: ShortUrlStore, I: IdGenerator> {
    pub url_shortener: UrlShortener<S, I>,
}

#[tracing::instrument(skip(deps, event), fields(request_id = %event.context.request_id))]
pub(crate) async fn function_handler<S: ShortUrlStore, I: IdGenerator>(
    deps: &HandlerDeps<S, I>,
    event: LambdaEvent<RequestEnvelope>,
) -> Result<HashMap<String, String>, Error> {
    let response = deps
        .url_shortener
        .process_request(event.payload)
        .await
        .map_err(|e| {
            tracing::error!("Failed to shorten URL: {}", e);
            e
        })?;

    Ok(response.into())
}

#[cfg(test)]
mod tests {
    use super::{function_handler, HandlerDeps};
    use lambda_runtime::{Context, LambdaEvent};
    use mockall::predicate::{always, eq};
    use serde_json::json;
    use shared::core::{MockIdGenerator, MockShortUrlStore, RequestEnvelope, UrlShortener};

    fn create_lambda_event(payload: serde_json::Value) -> LambdaEvent<RequestEnvelope> {
        let envelope: RequestEnvelope = serde_json::from_value(payload).unwrap();
        LambdaEvent::new(envelope, Context::default())
    }

    #[tokio::test]
    async fn when_valid_envelope_is_passed_should_return_code_map() {
        let mut mock_url_store = MockShortUrlStore::new();
        mock_url_store
            .expect_put_url_data()
            .with(eq("9b1deb4d.json"), always())
            .times(1)
            .returning(|_, _| Ok(()));
        let mut mock_id_generator = MockIdGenerator::new();
        mock_id_generator
            .expect_generate_id()
            .times(1)
            .return_const("9b1deb4d".to_string());
        let deps = HandlerDeps {
            url_shortener: UrlShortener::new(mock_url_store, mock_id_generator),
        };
        let event = create_lambda_event(json!({
            "body": json!({
                "originalUrl": "https://example.com",
                "expirationTime": "1700000000"
            })
            .to_string()
        }));

        let result = function_handler(&deps, event).await;

        let response = result.unwrap();
        assert_eq!(response.len(), 1);
        assert_eq!(response.get("code").map(String::as_str), Some("9b1deb4d"));
    }

    #[tokio::test]
    async fn when_body_is_missing_should_return_error() {
        let mut mock_url_store = MockShortUrlStore::new();
        mock_url_store.expect_put_url_data().times(0);
        let mut mock_id_generator = MockIdGenerator::new();
        mock_id_generator.expect_generate_id().times(0);
        let deps = HandlerDeps {
            url_shortener: UrlShortener::new(mock_url_store, mock_id_generator),
        };
        let event = create_lambda_event(json!({"httpMethod": "POST"}));

        let result = function_handler(&deps, event).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn when_storage_fails_should_return_error_with_cause() {
        let mut mock_url_store = MockShortUrlStore::new();
        mock_url_store
            .expect_put_url_data()
            .times(1)
            .returning(|_, _| Err("SlowDown: reduce your request rate".to_string()));
        let mut mock_id_generator = MockIdGenerator::new();
        mock_id_generator
            .expect_generate_id()
            .times(1)
            .return_const("12345689".to_string());
        let deps = HandlerDeps {
            url_shortener: UrlShortener::new(mock_url_store, mock_id_generator),
        };
        let event = create_lambda_event(json!({
            "body": json!({
                "originalUrl": "https://example.com",
                "expirationTime": "1700000000"
            })
            .to_string()
        }));

        let result = function_handler(&deps, event).await;

        let err = result.unwrap_err();
        assert!(err.to_string().contains("SlowDown: reduce your request rate"));
    }
}

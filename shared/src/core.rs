use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt::Debug;
use thiserror::Error;
use uuid::Uuid;

#[cfg(any(test, feature = "mocks"))]
use mockall::{automock, predicate::*};

pub const SHORT_CODE_LENGTH: usize = 8;
pub const URL_DATA_EXTENSION: &str = ".json";

const BODY_ORIGINAL_URL_KEY: &str = "originalUrl";
const BODY_EXPIRATION_TIME_KEY: &str = "expirationTime";

#[derive(Debug, Error)]
pub enum ShortenError {
    #[error("Request envelope has no body")]
    MissingBody,
    #[error("Error parsing JSON body: {0}")]
    BodyParse(#[from] serde_json::Error),
    #[error("Invalid expiration time {value:?}: {reason}")]
    InvalidExpirationFormat {
        value: Option<String>,
        reason: String,
    },
    #[error("Cannot save URL data on S3: {0}")]
    StorageWrite(String),
}

/// Port over the bucket holding one JSON object per short code.
///
/// Writes are blind overwrites: an existing object under the same key is
/// replaced, so callers must not assume two codes never collide.
#[cfg_attr(any(test, feature = "mocks"), automock)]
#[async_trait]
pub trait ShortUrlStore: Debug {
    async fn put_url_data(&self, key: &str, content: String) -> Result<(), String>;
}

#[cfg_attr(any(test, feature = "mocks"), automock)]
pub trait IdGenerator {
    fn generate_id(&self) -> String;
}

/// Short codes made of the first 8 characters of a random v4 UUID in its
/// canonical hyphenated form.
///
/// The 8-4-4-4-12 layout means the prefix is always 8 lowercase hex digits,
/// i.e. only 32 of the UUID's random bits survive. Collisions become likely
/// after roughly 77k codes (birthday bound) and nothing checks for them.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidPrefixGenerator;

impl UuidPrefixGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl IdGenerator for UuidPrefixGenerator {
    fn generate_id(&self) -> String {
        let mut id = Uuid::new_v4().hyphenated().to_string();
        id.truncate(SHORT_CODE_LENGTH);
        id
    }
}

/// Invocation payload. Only `body` is read, anything else the caller sends
/// along (API Gateway proxy fields and the like) is ignored.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RequestEnvelope {
    #[serde(default)]
    pub body: Option<Value>,
}

impl RequestEnvelope {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: Some(Value::String(body.into())),
        }
    }

    fn body_text(&self) -> Result<String, ShortenError> {
        match &self.body {
            None | Some(Value::Null) => Err(ShortenError::MissingBody),
            Some(Value::String(body)) => Ok(body.clone()),
            // already decoded upstream, render it back so it parses the same way
            Some(other) => Ok(other.to_string()),
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ShortenUrlRequest {
    pub original_url: Option<String>,
    pub expiration_time: Option<String>,
}

impl ShortenUrlRequest {
    /// Decodes the body as a flat object of string (or null) values.
    pub fn from_body(body: &str) -> Result<Self, ShortenError> {
        let mut fields: HashMap<String, Option<String>> = serde_json::from_str(body)?;

        Ok(Self {
            original_url: fields.remove(BODY_ORIGINAL_URL_KEY).flatten(),
            expiration_time: fields.remove(BODY_EXPIRATION_TIME_KEY).flatten(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortenedUrlRecord {
    pub original_url: Option<String>,
    pub expiration_time: i64,
}

impl ShortenedUrlRecord {
    pub fn new(original_url: Option<String>, expiration_time: i64) -> Self {
        Self {
            original_url,
            expiration_time,
        }
    }
}

impl TryFrom<ShortenUrlRequest> for ShortenedUrlRecord {
    type Error = ShortenError;

    fn try_from(request: ShortenUrlRequest) -> Result<Self, Self::Error> {
        let expiration_time = match request.expiration_time.as_deref() {
            Some(value) => value
                .parse::<i64>()
                .map_err(|e| ShortenError::InvalidExpirationFormat {
                    value: Some(value.to_string()),
                    reason: e.to_string(),
                })?,
            None => {
                return Err(ShortenError::InvalidExpirationFormat {
                    value: None,
                    reason: "expirationTime is missing".to_string(),
                })
            }
        };

        Ok(Self::new(request.original_url, expiration_time))
    }
}

#[derive(Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ShortenUrlResponse {
    pub code: String,
}

impl From<ShortenUrlResponse> for HashMap<String, String> {
    fn from(response: ShortenUrlResponse) -> Self {
        HashMap::from([("code".to_string(), response.code)])
    }
}

pub struct UrlShortener<S: ShortUrlStore, I: IdGenerator> {
    url_store: S,
    id_generator: I,
}

impl<S: ShortUrlStore, I: IdGenerator> UrlShortener<S, I> {
    pub fn new(url_store: S, id_generator: I) -> Self {
        Self {
            url_store,
            id_generator,
        }
    }

    /// Parses the envelope, stores a record under a fresh short code and
    /// returns that code. Nothing is written unless the input parsed.
    pub async fn process_request(
        &self,
        envelope: RequestEnvelope,
    ) -> Result<ShortenUrlResponse, ShortenError> {
        let body = envelope.body_text()?;
        let request = ShortenUrlRequest::from_body(&body)?;
        tracing::debug!("Parsed shorten request: {:?}", request);

        let url_data = ShortenedUrlRecord::try_from(request)?;
        let code = self.id_generator.generate_id();

        self.save_url_data(&code, &url_data).await?;
        tracing::info!(code = %code, "Stored short URL");

        Ok(ShortenUrlResponse { code })
    }

    async fn save_url_data(
        &self,
        code: &str,
        url_data: &ShortenedUrlRecord,
    ) -> Result<(), ShortenError> {
        let content = serde_json::to_string(url_data)
            .map_err(|e| ShortenError::StorageWrite(e.to_string()))?;

        self.url_store
            .put_url_data(&url_data_key(code), content)
            .await
            .map_err(ShortenError::StorageWrite)
    }
}

pub fn url_data_key(code: &str) -> String {
    format!("{}{}", code, URL_DATA_EXTENSION)
}

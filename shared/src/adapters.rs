use crate::core::ShortUrlStore;
use async_trait::async_trait;
use aws_sdk_s3::{error::DisplayErrorContext, primitives::ByteStream, Client};

#[derive(Debug)]
pub struct S3ShortUrlStore {
    bucket_name: String,
    s3_client: Client,
}

impl S3ShortUrlStore {
    pub fn new(bucket_name: String, s3_client: Client) -> Self {
        Self {
            bucket_name,
            s3_client,
        }
    }
}

#[async_trait]
impl ShortUrlStore for S3ShortUrlStore {
    async fn put_url_data(&self, key: &str, content: String) -> Result<(), String> {
        self.s3_client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            .content_type("application/json")
            .body(ByteStream::from(content.into_bytes()))
            .send()
            .await
            .map(|_| ())
            .map_err(|e| {
                format!(
                    "Error putting object '{}' in bucket '{}': {}",
                    key,
                    self.bucket_name,
                    DisplayErrorContext(&e)
                )
            })
    }
}

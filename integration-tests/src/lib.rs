use std::env;

pub async fn s3_client() -> aws_sdk_s3::Client {
    let config = aws_config::load_from_env().await;
    aws_sdk_s3::Client::new(&config)
}

pub fn bucket_name() -> String {
    env::var("BUCKET_NAME").unwrap_or("url-shortener-integration".to_string())
}

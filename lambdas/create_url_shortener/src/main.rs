use crate::config::Config;
use crate::event_handler::HandlerDeps;
use event_handler::function_handler;
use lambda_runtime::{run, service_fn, tracing, Error};
use shared::adapters::S3ShortUrlStore;
use shared::core::{UrlShortener, UuidPrefixGenerator};

mod config;
mod event_handler;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();
    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let config = Config::load()?;
    tracing::info!(bucket = %config.bucket_name, "Configuration loaded");

    let url_store = S3ShortUrlStore::new(config.bucket_name, aws_sdk_s3::Client::new(&aws_config));
    let deps = HandlerDeps {
        url_shortener: UrlShortener::new(url_store, UuidPrefixGenerator::new()),
    };

    run(service_fn(|event| function_handler(&deps, event))).await
}

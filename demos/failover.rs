//! Example: Rotating through several services until one answers.
//!
//! Run with: cargo run --example failover -- /path/to/captcha.png

use anticaptcha::{AntiCaptcha, Backend, CaptchaError, SubmissionRequest};
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let path = std::env::args()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("usage: failover <image>"))?;
    let key = std::env::var("ANTICAPTCHA_KEY")?;

    let client = AntiCaptcha::builder()
        .backend(Backend::named("anti-captcha", "http://anti-captcha.com", key.as_str()))
        .backend(Backend::named("rucaptcha", "http://rucaptcha.com", key.as_str()))
        .timeout(Duration::from_secs(120))
        .build()?;

    let attempts = client.registry().len();

    for _ in 0..attempts {
        let name = client.name().unwrap_or_default();
        println!("\n=== Trying {} ===", name);

        // Pin the backend so a wrong answer can be reported to the same service
        match client
            .recognize(SubmissionRequest::file(&path), Some(name.as_str()))
            .await
        {
            Ok(result) => {
                println!("{} answered {:?} in {}ms", result.backend, result.answer, result.elapsed_ms);
                return Ok(());
            }
            Err(e @ CaptchaError::UnknownBackend { .. }) => return Err(e.into()),
            Err(e) => {
                println!("Failed: {}", e);
                client.advance();
            }
        }
    }

    anyhow::bail!("no backend recognized the captcha")
}

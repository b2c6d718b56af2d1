//! Example: Recognizing a captcha image.
//!
//! Run with: cargo run --example recognize -- /path/to/captcha.png
//!
//! Backends are read from the default config file (see `ClientConfig::default_path`)
//! or from `ANTICAPTCHA_HOST` / `ANTICAPTCHA_KEY`.

use anticaptcha::{AntiCaptcha, Backend, CaptchaOption, ClientConfig, SubmissionRequest};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing for debug output (optional)
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let path = std::env::args()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("usage: recognize <image>"))?;

    let client = match ClientConfig::load_default()? {
        Some(config) => AntiCaptcha::from_config(config)?,
        None => AntiCaptcha::builder()
            .backend(Backend::named(
                "env",
                std::env::var("ANTICAPTCHA_HOST").unwrap_or_else(|_| "http://rucaptcha.com".into()),
                std::env::var("ANTICAPTCHA_KEY")?,
            ))
            .build()?,
    };

    println!("Balance: {}", client.balance(None).await?);

    let request = SubmissionRequest::file(&path).option(CaptchaOption::Regsense, 1);

    match client.recognize(request, None).await {
        Ok(result) => {
            println!("Success!");
            println!("  job_id: {}", result.job_id);
            println!("  answer: {}", result.answer);
            println!("  backend: {}", result.backend);
            println!("  elapsed: {}ms", result.elapsed_ms);
        }
        Err(e) => {
            println!("Failed: {} (code: {:?})", e, e.code());
        }
    }

    Ok(())
}

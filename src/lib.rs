//! # anticaptcha
//!
//! Async client for captcha recognition services speaking the
//! anti-captcha `in.php` / `res.php` text protocol (anti-captcha, rucaptcha,
//! 2captcha and compatible services).
//!
//! ## Features
//!
//! - **Multiple Backends**: Register several service accounts, pick one per call
//!   or rotate through them round-robin.
//! - **Bounded Polling**: Answers are polled at a fixed interval inside a total
//!   time budget (3s / 300s by default).
//! - **Streaming Uploads**: Image files are streamed, never read into memory.
//! - **Async/Await**: Built on Tokio; any number of recognitions can run concurrently.
//!
//! ## Quick Start
//!
//! ```ignore
//! use anticaptcha::{AntiCaptcha, Backend, CaptchaOption, SubmissionRequest};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = AntiCaptcha::builder()
//!         .backend(Backend::named("anti-captcha", "http://anti-captcha.com", "12345"))
//!         .backend(Backend::named("rucaptcha", "http://rucaptcha.com", "12345"))
//!         .build()?;
//!
//!     let request = SubmissionRequest::file("/home/user/1.png")
//!         .option(CaptchaOption::Numeric, 1);
//!     let result = client.recognize(request, None).await?;
//!
//!     println!("{} answered {} in {}ms", result.backend, result.answer, result.elapsed_ms);
//!     Ok(())
//! }
//! ```
//!
//! ## Failover
//!
//! Nothing is retried internally. On failure, call [`AntiCaptcha::advance`]
//! (or [`AntiCaptcha::select`]) and try again; if the answer turns out wrong,
//! [`AntiCaptcha::report_bad`] it with the same backend name.

#![allow(missing_docs)]

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod poll;
pub mod protocol;
pub mod registry;
pub mod transport;

#[cfg(feature = "ffi")]
pub mod ffi;

// Re-exports for convenience
pub use client::{AntiCaptcha, AntiCaptchaBuilder};
pub use config::ClientConfig;
pub use error::{CaptchaError, Result};
pub use models::{
    Backend, CaptchaOption, ImageType, OptionValue, Payload, RecognitionResult, SubmissionRequest,
};
pub use poll::PollPolicy;
pub use registry::BackendRegistry;
pub use transport::{HttpTransport, Transport};
pub use tokio_util::sync::CancellationToken;

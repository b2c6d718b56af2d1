//! C FFI bindings for anticaptcha.
//!
//! Provides a simple blocking API against a single backend, for use from C,
//! Python, Go, etc.
//!
//! # Example (C)
//!
//! ```c
//! #include "anticaptcha.h"
//!
//! int main() {
//!     char* result = anticaptcha_recognize_json(
//!         "http://rucaptcha.com", "12345", "/home/user/1.png", "{\"numeric\": 1}");
//!     if (result) {
//!         printf("Result: %s\n", result);
//!         anticaptcha_free_string(result);
//!     }
//!     return 0;
//! }
//! ```

use std::collections::BTreeMap;
use std::ffi::{c_char, CStr, CString};
use std::ptr;

use crate::error::{CaptchaError, Result};
use crate::models::{Backend, OptionValue, RecognitionResult, SubmissionRequest};
use crate::AntiCaptcha;

/// Convert Rust String to C string pointer.
fn string_to_ptr(s: String) -> *mut c_char {
    CString::new(s)
        .map(|cs| cs.into_raw())
        .unwrap_or(ptr::null_mut())
}

/// Convert C string to Rust String, returns None if null or invalid UTF-8.
unsafe fn ptr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

fn required(value: Option<String>, what: &str) -> Result<String> {
    match value {
        Some(s) if !s.is_empty() => Ok(s),
        _ => Err(CaptchaError::Config(format!("{} is required", what))),
    }
}

/// Run `f` against a single-backend client on a private current-thread runtime.
fn block_on_client<T, F, Fut>(host: Option<String>, key: Option<String>, f: F) -> Result<T>
where
    F: FnOnce(AntiCaptcha) -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let host = required(host, "host")?;
    let key = required(key, "key")?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let client = AntiCaptcha::builder()
            .backend(Backend::new(host, key))
            .build()?;
        f(client).await
    })
}

fn recognize_blocking(
    host: Option<String>,
    key: Option<String>,
    file_path: Option<String>,
    options_json: Option<String>,
) -> Result<RecognitionResult> {
    let mut request = SubmissionRequest::file(required(file_path, "file_path")?);
    if let Some(json) = options_json {
        let options: BTreeMap<String, OptionValue> = serde_json::from_str(&json)?;
        request.options.extend(options);
    }
    block_on_client(host, key, |client| async move {
        client.recognize(request, None).await
    })
}

fn report_bad_blocking(
    host: Option<String>,
    key: Option<String>,
    job_id: Option<String>,
) -> Result<String> {
    let job_id = required(job_id, "job_id")?;
    block_on_client(host, key, |client| async move {
        client.report_bad(&job_id, None).await
    })
}

fn error_json(e: &CaptchaError) -> serde_json::Value {
    serde_json::json!({
        "success": false,
        "error": e.to_string(),
        "code": e.code(),
    })
}

/// Recognize a captcha image file (blocking).
///
/// # Parameters
///
/// - `host`: Service root, e.g. "http://rucaptcha.com" (required)
/// - `key`: Access key (required)
/// - `file_path`: Path of the image to upload (required)
/// - `options_json`: NULL or a JSON object of vendor options, e.g. `{"numeric": 1}`
///
/// # Returns
///
/// A JSON string on success:
/// ```json
/// {"success": true, "job_id": "...", "answer": "...", "backend": "...", "elapsed_ms": 12345}
/// ```
///
/// Or on error:
/// ```json
/// {"success": false, "error": "error message", "code": "ERROR_ZERO_BALANCE"}
/// ```
///
/// The caller must free the string with `anticaptcha_free_string`.
///
/// # Safety
///
/// - `host`, `key` and `file_path` must be valid null-terminated C strings
/// - `options_json` must be NULL or a valid null-terminated C string
#[no_mangle]
pub unsafe extern "C" fn anticaptcha_recognize_json(
    host: *const c_char,
    key: *const c_char,
    file_path: *const c_char,
    options_json: *const c_char,
) -> *mut c_char {
    let outcome = recognize_blocking(
        ptr_to_string(host),
        ptr_to_string(key),
        ptr_to_string(file_path),
        ptr_to_string(options_json),
    );

    let json = match outcome {
        Ok(result) => serde_json::json!({
            "success": true,
            "job_id": result.job_id,
            "answer": result.answer,
            "backend": result.backend,
            "elapsed_ms": result.elapsed_ms,
        }),
        Err(e) => error_json(&e),
    };

    string_to_ptr(json.to_string())
}

/// Query the account balance (blocking).
///
/// # Returns
///
/// A JSON string on success:
/// ```json
/// {"success": true, "balance": 42.5}
/// ```
///
/// `balance` is `null` when the service answered with a non-numeric body.
/// Failures use the same error object as `anticaptcha_recognize_json`.
/// The caller must free the string with `anticaptcha_free_string`.
///
/// # Safety
///
/// - `host` and `key` must be valid null-terminated C strings
#[no_mangle]
pub unsafe extern "C" fn anticaptcha_balance_json(
    host: *const c_char,
    key: *const c_char,
) -> *mut c_char {
    let outcome = block_on_client(ptr_to_string(host), ptr_to_string(key), |client| async move {
        client.balance(None).await
    });

    let json = match outcome {
        Ok(balance) => serde_json::json!({
            "success": true,
            "balance": balance,
        }),
        Err(e) => error_json(&e),
    };

    string_to_ptr(json.to_string())
}

/// Report a wrong answer (blocking).
///
/// # Returns
///
/// A JSON string on success, carrying the service's raw acknowledgement:
/// ```json
/// {"success": true, "response": "OK_REPORT_RECORDED"}
/// ```
///
/// Failures use the same error object as `anticaptcha_recognize_json`.
/// The caller must free the string with `anticaptcha_free_string`.
///
/// # Safety
///
/// - `host`, `key` and `job_id` must be valid null-terminated C strings
#[no_mangle]
pub unsafe extern "C" fn anticaptcha_report_bad_json(
    host: *const c_char,
    key: *const c_char,
    job_id: *const c_char,
) -> *mut c_char {
    let outcome = report_bad_blocking(ptr_to_string(host), ptr_to_string(key), ptr_to_string(job_id));

    let json = match outcome {
        Ok(ack) => serde_json::json!({
            "success": true,
            "response": ack,
        }),
        Err(e) => error_json(&e),
    };

    string_to_ptr(json.to_string())
}

/// Free a string returned by anticaptcha FFI functions.
///
/// # Safety
///
/// - `s` must be NULL or a valid pointer previously returned by anticaptcha
/// - Each string must only be freed once
#[no_mangle]
pub unsafe extern "C" fn anticaptcha_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = CString::from_raw(s);
    }
}

/// Get the library version.
///
/// # Returns
///
/// A static string with the version number. Do NOT free this string.
#[no_mangle]
pub extern "C" fn anticaptcha_version() -> *const c_char {
    // This is a static string, no need to free
    concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr() as *const c_char
}

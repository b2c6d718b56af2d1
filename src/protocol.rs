//! Wire format of the `in.php` / `res.php` text protocol.
//!
//! Every call answers with a single line: `OK|<value>` on success or a bare
//! error token such as `ERROR_WRONG_USER_KEY`.

use crate::error::{CaptchaError, Result};
use crate::models::{Backend, Payload, SubmissionRequest};
use crate::transport::{FormField, FormValue};
use regex::Regex;
use std::sync::LazyLock;

/// Poll response meaning the job is still being worked on.
pub const NOT_READY: &str = "CAPCHA_NOT_READY";

/// Poll response for an unknown or expired job id.
pub const NO_SUCH_JOB: &str = "ERROR_NO_SUCH_CAPCHA_ID";

static JOB_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^OK\|(\d+)$").expect("valid job id pattern"));

static ANSWER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^OK\|(.+)$").expect("valid answer pattern"));

/// Outcome of a single status check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStatus {
    Ready(String),
    NotReady,
}

/// Strip the line terminator; anything else is part of the token or answer.
fn strip_line_end(body: &str) -> &str {
    body.trim_end_matches(['\r', '\n'])
}

fn rejected(backend: &Backend, body: &str) -> CaptchaError {
    tracing::warn!(backend = backend.label(), code = body, "Service rejected request");
    CaptchaError::RemoteRejected {
        backend: backend.label().to_string(),
        code: body.to_string(),
    }
}

/// Extract the job id from an `in.php` response.
pub fn parse_submit(backend: &Backend, body: &str) -> Result<String> {
    let body = strip_line_end(body);
    JOB_ID_RE
        .captures(body)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| rejected(backend, body))
}

/// Classify a `res.php?action=get` response.
pub fn parse_poll(backend: &Backend, body: &str) -> Result<PollStatus> {
    let body = strip_line_end(body);
    if body == NOT_READY {
        return Ok(PollStatus::NotReady);
    }

    ANSWER_RE
        .captures(body)
        .and_then(|c| c.get(1))
        .map(|m| PollStatus::Ready(m.as_str().to_string()))
        .ok_or_else(|| rejected(backend, body))
}

/// Numeric coercion of a balance response.
///
/// Never fails: a blank body is `0.0`, anything non-numeric is `NaN`.
pub fn parse_balance(body: &str) -> f64 {
    let body = body.trim();
    if body.is_empty() {
        return 0.0;
    }
    body.parse().unwrap_or(f64::NAN)
}

pub fn submit_url(backend: &Backend) -> String {
    backend.endpoint("in.php")
}

fn res_url(backend: &Backend, action: &str, job_id: Option<&str>) -> String {
    let mut url = format!(
        "{}?key={}&action={}",
        backend.endpoint("res.php"),
        urlencoding::encode(&backend.key),
        action
    );
    if let Some(id) = job_id {
        url.push_str("&id=");
        url.push_str(&urlencoding::encode(id));
    }
    url
}

pub fn poll_url(backend: &Backend, job_id: &str) -> String {
    res_url(backend, "get", Some(job_id))
}

pub fn report_bad_url(backend: &Backend, job_id: &str) -> String {
    res_url(backend, "reportbad", Some(job_id))
}

pub fn balance_url(backend: &Backend) -> String {
    res_url(backend, "getbalance", None)
}

/// Build the `in.php` form for a request.
///
/// The backend key and the payload-derived `method` are defaults; a request
/// option with the same name replaces them. A text `file` field is treated
/// as a path and streamed, and `body` is percent-encoded.
pub fn build_submit_form(backend: &Backend, request: SubmissionRequest) -> Vec<FormField> {
    let SubmissionRequest { payload, options } = request;
    let mut fields = Vec::with_capacity(options.len() + 3);

    if !options.contains_key("key") {
        fields.push(FormField::text("key", backend.key.as_str()));
    }

    if let Some(payload) = &payload {
        if !options.contains_key("method") {
            fields.push(FormField::text("method", payload.method()));
        }
    }

    let has_file = options.contains_key("file");
    let has_body = options.contains_key("body");

    for (name, value) in options {
        let value = value.to_string();
        let field = match name.as_str() {
            "file" => FormField {
                name,
                value: FormValue::File(value.into()),
            },
            "body" => FormField::text(name, urlencoding::encode(&value).into_owned()),
            _ => FormField::text(name, value),
        };
        fields.push(field);
    }

    match payload {
        Some(Payload::File(path)) if !has_file => fields.push(FormField {
            name: "file".into(),
            value: FormValue::File(path),
        }),
        Some(Payload::Bytes { file_name, data }) if !has_file => fields.push(FormField {
            name: "file".into(),
            value: FormValue::Bytes { file_name, data },
        }),
        Some(Payload::Base64(body)) if !has_body => {
            fields.push(FormField::text("body", urlencoding::encode(&body).into_owned()))
        }
        _ => {}
    }

    fields
}

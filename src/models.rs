//! Data models for captcha submission and recognition.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// One configured recognition service account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Backend {
    /// Optional name used for explicit selection
    #[serde(default)]
    pub name: Option<String>,
    /// Service root, e.g. `http://rucaptcha.com`
    pub host: String,
    /// Access key
    pub key: String,
}

impl Backend {
    /// Create an unnamed backend.
    pub fn new(host: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: None,
            host: host.into(),
            key: key.into(),
        }
    }

    /// Create a named backend.
    pub fn named(name: impl Into<String>, host: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            host: host.into(),
            key: key.into(),
        }
    }

    /// Name if set, otherwise the host. Used in results and error messages.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.host)
    }

    /// Absolute URL of a path on this backend.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.host.trim_end_matches('/'), path)
    }
}

/// Result of a completed recognition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionResult {
    pub job_id: String,
    pub answer: String,
    pub backend: String,
    pub elapsed_ms: u64,
}

/// Value of a vendor option. Sent verbatim as a form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Number(i64),
    Text(String),
}

impl std::fmt::Display for OptionValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptionValue::Number(n) => write!(f, "{}", n),
            OptionValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for OptionValue {
    fn from(v: i64) -> Self {
        OptionValue::Number(v)
    }
}

impl From<i32> for OptionValue {
    fn from(v: i32) -> Self {
        OptionValue::Number(v.into())
    }
}

impl From<u32> for OptionValue {
    fn from(v: u32) -> Self {
        OptionValue::Number(v.into())
    }
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        OptionValue::Number(v as i64)
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        OptionValue::Text(v.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(v: String) -> Self {
        OptionValue::Text(v)
    }
}

impl From<ImageType> for OptionValue {
    fn from(v: ImageType) -> Self {
        OptionValue::Text(v.as_str().to_string())
    }
}

/// Vendor options documented by anti-captcha compatible services.
///
/// None of these are interpreted locally; unknown keys can still be passed
/// with [`SubmissionRequest::raw_option`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaptchaOption {
    /// 1 = answer has 2-3 words
    Phrase,
    /// 1 = answer is case sensitive
    Regsense,
    /// 1 = digits only, 2 = no digits
    Numeric,
    /// 1 = worker must solve arithmetic
    Calc,
    /// 1..20 minimum answer length
    MinLen,
    /// 1..20 maximum answer length
    MaxLen,
    /// 1 = send to the Russian-speaking queue
    IsRussian,
    /// Application id for developer commission
    SoftId,
    /// 1 = respond with `Access-Control-Allow-Origin: *`
    HeaderAcao,
    /// Grid type, see [`ImageType`]
    Type,
    /// Instruction text shown to the worker (max 100 bytes)
    Comment,
    /// 1 = the image asks a question
    Question,
    /// 1 = Cyrillic only, 2 = Latin only
    Language,
}

impl CaptchaOption {
    pub const ALL: [CaptchaOption; 13] = [
        CaptchaOption::Phrase,
        CaptchaOption::Regsense,
        CaptchaOption::Numeric,
        CaptchaOption::Calc,
        CaptchaOption::MinLen,
        CaptchaOption::MaxLen,
        CaptchaOption::IsRussian,
        CaptchaOption::SoftId,
        CaptchaOption::HeaderAcao,
        CaptchaOption::Type,
        CaptchaOption::Comment,
        CaptchaOption::Question,
        CaptchaOption::Language,
    ];

    /// Returns the form field name.
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptchaOption::Phrase => "phrase",
            CaptchaOption::Regsense => "regsense",
            CaptchaOption::Numeric => "numeric",
            CaptchaOption::Calc => "calc",
            CaptchaOption::MinLen => "min_len",
            CaptchaOption::MaxLen => "max_len",
            CaptchaOption::IsRussian => "is_russian",
            CaptchaOption::SoftId => "soft_id",
            CaptchaOption::HeaderAcao => "header_acao",
            CaptchaOption::Type => "type",
            CaptchaOption::Comment => "comment",
            CaptchaOption::Question => "question",
            CaptchaOption::Language => "language",
        }
    }

    /// Look up a documented option by its field name.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|o| o.as_str() == key)
    }
}

impl std::fmt::Display for CaptchaOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Values for the `type` option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageType {
    /// 3x3 reCAPTCHA v2 grid
    Recaptcha2,
    /// 4x4 grid
    Recaptcha2Grid4x4,
    /// 2x4 grid
    Recaptcha2Grid2x4,
}

impl ImageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageType::Recaptcha2 => "recaptcha2",
            ImageType::Recaptcha2Grid4x4 => "recaptcha2_44",
            ImageType::Recaptcha2Grid2x4 => "recaptcha2_24",
        }
    }
}

/// Challenge payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Image on disk, streamed during upload
    File(PathBuf),
    /// In-memory image sent as a multipart file part
    Bytes { file_name: String, data: Vec<u8> },
    /// Already base64-encoded image, sent as the `body` field
    Base64(String),
}

impl Payload {
    /// Encode raw image bytes as a base64 payload.
    pub fn base64_from_bytes(data: &[u8]) -> Self {
        use base64::Engine;
        Payload::Base64(base64::engine::general_purpose::STANDARD.encode(data))
    }

    /// Upload method the service expects for this payload.
    pub fn method(&self) -> &'static str {
        match self {
            Payload::File(_) | Payload::Bytes { .. } => "post",
            Payload::Base64(_) => "base64",
        }
    }
}

/// A captcha submission: payload plus pass-through vendor options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionRequest {
    pub payload: Option<Payload>,
    pub options: BTreeMap<String, OptionValue>,
}

impl SubmissionRequest {
    /// Empty request. A text-only question needs just a `comment` option.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request uploading an image file.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::with_payload(Payload::File(path.into()))
    }

    /// Request uploading in-memory image bytes.
    pub fn bytes(file_name: impl Into<String>, data: Vec<u8>) -> Self {
        Self::with_payload(Payload::Bytes {
            file_name: file_name.into(),
            data,
        })
    }

    /// Request carrying an already base64-encoded image.
    pub fn base64(body: impl Into<String>) -> Self {
        Self::with_payload(Payload::Base64(body.into()))
    }

    pub fn with_payload(payload: Payload) -> Self {
        Self {
            payload: Some(payload),
            options: BTreeMap::new(),
        }
    }

    /// Set a documented vendor option.
    pub fn option(self, option: CaptchaOption, value: impl Into<OptionValue>) -> Self {
        self.raw_option(option.as_str(), value)
    }

    /// Set any form field, including ones this crate does not know about.
    pub fn raw_option(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }
}

impl From<Payload> for SubmissionRequest {
    fn from(payload: Payload) -> Self {
        Self::with_payload(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_label_and_endpoint() {
        let named = Backend::named("rucaptcha", "http://rucaptcha.com/", "k");
        assert_eq!(named.label(), "rucaptcha");
        assert_eq!(named.endpoint("in.php"), "http://rucaptcha.com/in.php");

        let unnamed = Backend::new("http://anti-captcha.com", "k");
        assert_eq!(unnamed.label(), "http://anti-captcha.com");
    }

    #[test]
    fn test_option_keys() {
        assert_eq!(CaptchaOption::MinLen.as_str(), "min_len");
        assert_eq!(CaptchaOption::HeaderAcao.to_string(), "header_acao");
        assert_eq!(CaptchaOption::from_key("is_russian"), Some(CaptchaOption::IsRussian));
        assert_eq!(CaptchaOption::from_key("json"), None);
        for option in CaptchaOption::ALL {
            assert_eq!(CaptchaOption::from_key(option.as_str()), Some(option));
        }
    }

    #[test]
    fn test_request_options_passthrough() {
        let request = SubmissionRequest::file("/tmp/1.png")
            .option(CaptchaOption::Numeric, 1)
            .option(CaptchaOption::Type, ImageType::Recaptcha2Grid4x4)
            .raw_option("json", 0);

        assert_eq!(request.options["numeric"], OptionValue::Number(1));
        assert_eq!(request.options["type"].to_string(), "recaptcha2_44");
        assert_eq!(request.options["json"], OptionValue::Number(0));
        assert_eq!(request.payload.as_ref().map(Payload::method), Some("post"));
    }

    #[test]
    fn test_base64_payload() {
        let payload = Payload::base64_from_bytes(b"png");
        assert_eq!(payload, Payload::Base64("cG5n".into()));
        assert_eq!(payload.method(), "base64");
    }

    #[test]
    fn test_option_value_deserialize() {
        let opts: BTreeMap<String, OptionValue> =
            serde_json::from_str(r#"{"phrase": 1, "comment": "cat"}"#).unwrap();
        assert_eq!(opts["phrase"], OptionValue::Number(1));
        assert_eq!(opts["comment"], OptionValue::Text("cat".into()));
    }
}

use wasm_bindgen::JsValue;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("DOM operation failed: {0}")]
    Dom(String),

    #[error("element #{0} not found")]
    MissingElement(String),

    #[error("request failed: {0}")]
    Network(String),

    #[error("server responded with HTTP {0}")]
    HttpStatus(u16),

    #[error("malformed events response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Best-effort text for a thrown JS value; most DOM exceptions are `Error`
/// objects so `as_string` alone usually comes back empty.
pub fn describe_js(value: &JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| format!("{value:?}"))
}

impl From<JsValue> for Error {
    fn from(value: JsValue) -> Self {
        Error::Dom(describe_js(&value))
    }
}

impl From<Error> for JsValue {
    fn from(err: Error) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

use crate::error::PipelineError;
use url::Url;

/// MIME subtypes accepted inside a `data:image/...;base64,` URI
pub const DATA_URI_FORMATS: &[&str] = &["gif", "png", "jpeg", "jpg", "bmp", "webp", "svg+xml"];

/// Where the image bytes come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Inline base64 image; `payload` is still encoded
    DataUri { extension: String, payload: String },
    /// Remote image; the extension is known once the response headers arrive
    Remote(Url),
}

impl Source {
    /// Classifies the raw input. Performs no I/O.
    pub fn parse(raw: &str) -> Result<Self, PipelineError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(PipelineError::Validation(
                "source should not be empty".to_string(),
            ));
        }

        if let Some(rest) = strip_prefix_ignore_case(raw, "data:") {
            return parse_data_uri(rest);
        }

        let url = Url::parse(raw)
            .map_err(|e| PipelineError::Validation(format!("invalid source URL: {}", e)))?;
        match url.scheme() {
            "http" | "https" => Ok(Source::Remote(url)),
            scheme => Err(PipelineError::Validation(format!(
                "unsupported URL scheme: {}",
                scheme
            ))),
        }
    }

    /// Extension when it can be known without fetching
    pub fn extension(&self) -> Option<&str> {
        match self {
            Source::DataUri { extension, .. } => Some(extension),
            Source::Remote(_) => None,
        }
    }
}

fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    let head = value.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&value[prefix.len()..])
    } else {
        None
    }
}

/// `image/<fmt>[;charset=utf-8];base64,<payload>` (after `data:`)
fn parse_data_uri(rest: &str) -> Result<Source, PipelineError> {
    let (header, payload) = rest.split_once(',').ok_or_else(|| {
        PipelineError::Validation("data URI is missing the ',' separator".to_string())
    })?;

    let mut params = header.split(';');
    let mime = params.next().unwrap_or_default().to_ascii_lowercase();
    let extension = mime
        .strip_prefix("image/")
        .filter(|subtype| DATA_URI_FORMATS.contains(subtype))
        .ok_or_else(|| {
            PipelineError::Validation(format!("unsupported data URI type: '{}'", mime))
        })?
        .to_string();

    let params: Vec<String> = params.map(|p| p.trim().to_ascii_lowercase()).collect();
    let is_base64 = match params.as_slice() {
        [encoding] => encoding == "base64",
        [charset, encoding] => charset == "charset=utf-8" && encoding == "base64",
        _ => false,
    };
    if !is_base64 {
        return Err(PipelineError::Validation(
            "only base64 encoded data URIs are supported".to_string(),
        ));
    }

    Ok(Source::DataUri {
        extension,
        payload: payload.to_string(),
    })
}

/// File extension for a remote image, taken from its `Content-Type`.
pub fn extension_from_content_type(content_type: Option<&str>) -> Result<String, PipelineError> {
    let content_type = content_type.ok_or_else(|| {
        PipelineError::Validation("There was no file extension specified".to_string())
    })?;

    let mime: mime::Mime = content_type.trim().parse().map_err(|_| {
        PipelineError::Validation(format!("invalid content type: '{}'", content_type))
    })?;

    if mime.type_() != mime::IMAGE {
        return Err(PipelineError::Validation(format!(
            "source is not an image: '{}'",
            mime.essence_str()
        )));
    }

    // essence keeps structured suffixes such as svg+xml
    let essence = mime.essence_str().to_ascii_lowercase();
    match essence.split_once('/') {
        Some((_, subtype)) if !subtype.is_empty() => Ok(subtype.to_string()),
        _ => Err(PipelineError::Validation(
            "There was no file extension specified".to_string(),
        )),
    }
}

use serde::Serialize;
use serde_json::{Map, Value};

/// Decoded `output_file_url`. The column holds a bare URL, a JSON array, or a JSON object
/// whose URLs sit under one of several keys depending on the backend that wrote it.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputFile {
    Url(String),
    UrlList(Vec<String>),
    UrlObject(Map<String, Value>),
}

const LIST_KEYS: &[&str] = &["images", "outputs", "urls"];

impl OutputFile {
    /// `None` for an empty column
    pub fn decode(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        if trimmed.starts_with('[') || trimmed.starts_with('{') || trimmed.starts_with('"') {
            if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
                return Some(Self::from_value(value));
            }
        }
        Some(OutputFile::Url(trimmed.to_string()))
    }

    pub fn from_value(value: Value) -> Self {
        match value {
            Value::String(s) => OutputFile::Url(s),
            Value::Array(items) => OutputFile::UrlList(items.iter().filter_map(entry_url).collect()),
            Value::Object(map) => OutputFile::UrlObject(map),
            other => OutputFile::Url(other.to_string()),
        }
    }

    /// Flat, ordered output URLs
    pub fn urls(&self) -> Vec<String> {
        match self {
            OutputFile::Url(url) => vec![url.clone()],
            OutputFile::UrlList(urls) => urls.clone(),
            OutputFile::UrlObject(map) => object_urls(map),
        }
    }
}

fn entry_url(entry: &Value) -> Option<String> {
    match entry {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Object(obj) => obj.get("url").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

fn looks_like_url(s: &str) -> bool {
    s.starts_with("http") || s.starts_with('/')
}

fn object_urls(map: &Map<String, Value>) -> Vec<String> {
    for key in LIST_KEYS {
        match map.get(*key) {
            Some(Value::Array(items)) => {
                return items.iter().filter_map(entry_url).collect();
            }
            Some(entry @ (Value::String(_) | Value::Object(_))) => {
                if let Some(url) = entry_url(entry) {
                    return vec![url];
                }
            }
            _ => {}
        }
    }

    if let Some(url) = map.get("url").and_then(entry_url) {
        return vec![url];
    }

    let scanned: Vec<String> = map
        .values()
        .filter_map(Value::as_str)
        .filter(|s| looks_like_url(s))
        .map(str::to_string)
        .collect();
    if !scanned.is_empty() {
        return scanned;
    }

    vec![Value::Object(map.clone()).to_string()]
}

/// Output URLs of a raw column value; empty when nothing was produced
pub fn normalize_output(raw: Option<&str>) -> Vec<String> {
    raw.and_then(OutputFile::decode)
        .map(|o| o.urls())
        .unwrap_or_default()
}

/// One viewable output of a generation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputView {
    pub id: String,
    pub url: String,
    pub name: String,
    pub index: usize,
    pub total: usize,
}

/// A generation with N>1 outputs becomes N views `<id>_<i>` named `"<name> (i/N)"`; a single
/// output keeps the generation's id and name.
pub fn expand_outputs(id: &str, name: &str, urls: &[String]) -> Vec<OutputView> {
    let total = urls.len();
    if total == 1 {
        return vec![OutputView {
            id: id.to_string(),
            url: urls[0].clone(),
            name: name.to_string(),
            index: 0,
            total,
        }];
    }
    urls.iter()
        .enumerate()
        .map(|(i, url)| OutputView {
            id: format!("{}_{}", id, i),
            url: url.clone(),
            name: format!("{} ({}/{})", name, i + 1, total),
            index: i,
            total,
        })
        .collect()
}

/// Base generation id of a possibly expanded view id (`<uuid>_<i>` → `<uuid>`)
pub fn base_generation_id(view_id: &str) -> &str {
    match view_id.rsplit_once('_') {
        Some((base, index)) if !index.is_empty() && index.chars().all(|c| c.is_ascii_digit()) => base,
        _ => view_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_url_is_single_output() {
        assert_eq!(normalize_output(Some("https://cdn.x/a.png")), vec!["https://cdn.x/a.png"]);
        assert!(normalize_output(Some("  ")).is_empty());
        assert!(normalize_output(None).is_empty());
    }

    #[test]
    fn array_keeps_order_and_accepts_objects() {
        let urls = normalize_output(Some(r#"["https://a", {"url": "https://b"}]"#));
        assert_eq!(urls, vec!["https://a", "https://b"]);
    }

    #[test]
    fn images_key_beats_heuristics() {
        let urls = normalize_output(Some(
            r#"{"thumbnail":"https://thumb","images":[{"url":"https://img1"}]}"#,
        ));
        assert_eq!(urls, vec!["https://img1"]);
    }

    #[test]
    fn key_precedence() {
        let urls = normalize_output(Some(r#"{"urls":["https://u"],"outputs":["https://o"]}"#));
        assert_eq!(urls, vec!["https://o"]);
        let urls = normalize_output(Some(r#"{"url":"https://single","other":"https://x"}"#));
        assert_eq!(urls, vec!["https://single"]);
    }

    #[test]
    fn falls_back_to_url_like_values() {
        assert_eq!(normalize_output(Some(r#"{"foo":"http://x"}"#)), vec!["http://x"]);
        assert_eq!(
            normalize_output(Some(r#"{"path":"/storage/v1/a.mp4","n":3}"#)),
            vec!["/storage/v1/a.mp4"]
        );
    }

    #[test]
    fn object_without_urls_is_kept_whole() {
        let urls = normalize_output(Some(r#"{"status":"ok"}"#));
        assert_eq!(urls, vec![r#"{"status":"ok"}"#]);
    }

    #[test]
    fn expansion_suffixes_names() {
        let urls = vec!["https://a".to_string(), "https://b".to_string()];
        let views = expand_outputs("g1", "Sunset", &urls);
        assert_eq!(views[0].id, "g1_0");
        assert_eq!(views[1].id, "g1_1");
        assert_eq!(views[0].name, "Sunset (1/2)");
        assert_eq!(views[1].name, "Sunset (2/2)");

        let single = expand_outputs("g2", "One", &urls[..1]);
        assert_eq!(single[0].id, "g2");
        assert_eq!(single[0].name, "One");
    }

    #[test]
    fn base_id_strips_index_suffix() {
        let id = "0d8f5c1e-2b7a-4e0e-9a57-0c5d8f1a2b3c";
        assert_eq!(base_generation_id(&format!("{}_3", id)), id);
        assert_eq!(base_generation_id(id), id);
        assert_eq!(base_generation_id("upload_abc"), "upload_abc");
    }
}

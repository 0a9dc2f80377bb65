use crate::error::{Result, TryOnError};
use serde::{Deserialize, Serialize};

/// Payload returned by the try-on backend. `imageUrl` holds either a single
/// URL or a list of them.
#[derive(Debug, Clone, Deserialize)]
pub struct TryOnResponse {
    #[serde(rename = "imageUrl")]
    pub image_url: ImageUrlPayload,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ImageUrlPayload {
    One(String),
    Many(Vec<String>),
}

impl ImageUrlPayload {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            ImageUrlPayload::One(url) => vec![url],
            ImageUrlPayload::Many(urls) => urls,
        }
    }
}

/// Ordered set of generated result URLs, already cleaned and validated.
/// Invalidated by the next generate call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedImageSet {
    urls: Vec<String>,
}

impl GeneratedImageSet {
    /// Trims surrounding quote characters from every entry and rejects the
    /// whole response unless each cleaned URL starts with `http`.
    pub fn from_response(response: TryOnResponse) -> Result<Self> {
        let urls: Vec<String> = response
            .image_url
            .into_vec()
            .into_iter()
            .map(|url| url.trim_matches('"').to_string())
            .collect();

        if urls.is_empty() || !urls.iter().all(|url| url.starts_with("http")) {
            return Err(TryOnError::InvalidResponse(
                "Invalid image URLs received from backend".to_string(),
            ));
        }

        Ok(Self { urls })
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// Save-action wording, singular or plural with the image count.
    pub fn download_label(&self) -> String {
        if self.urls.len() > 1 {
            format!("Save All {} Looks", self.urls.len())
        } else {
            "Save Look".to_string()
        }
    }

    /// The note shown once every image has been rendered.
    pub fn summary_note(&self) -> String {
        let total = self.urls.len();
        format!(
            "{} custom look{} been generated using AI try-on technology!",
            total,
            if total > 1 { "s have" } else { " has" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<GeneratedImageSet> {
        let response: TryOnResponse = serde_json::from_str(json).unwrap();
        GeneratedImageSet::from_response(response)
    }

    #[test]
    fn single_url_parses() {
        let set = parse(r#"{"imageUrl": "http://a/1.png"}"#).unwrap();
        assert_eq!(set.urls(), ["http://a/1.png"]);
        assert_eq!(set.download_label(), "Save Look");
        assert_eq!(
            set.summary_note(),
            "1 custom look has been generated using AI try-on technology!"
        );
    }

    #[test]
    fn url_list_parses() {
        let set = parse(r#"{"imageUrl": ["http://a/1.png", "http://a/2.png"]}"#).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.download_label(), "Save All 2 Looks");
        assert_eq!(
            set.summary_note(),
            "2 custom looks have been generated using AI try-on technology!"
        );
    }

    #[test]
    fn surrounding_quotes_are_trimmed() {
        let set = parse(r#"{"imageUrl": "\"https://a/1.png\""}"#).unwrap();
        assert_eq!(set.urls(), ["https://a/1.png"]);
    }

    #[test]
    fn non_http_url_is_rejected() {
        let err = parse(r#"{"imageUrl": "not-a-url"}"#).unwrap_err();
        assert!(matches!(err, TryOnError::InvalidResponse(_)));
    }

    #[test]
    fn empty_list_is_rejected() {
        let err = parse(r#"{"imageUrl": []}"#).unwrap_err();
        assert!(matches!(err, TryOnError::InvalidResponse(_)));
    }

    #[test]
    fn one_bad_entry_rejects_the_whole_response() {
        let err = parse(r#"{"imageUrl": ["http://a/1.png", "ftp://a/2.png"]}"#).unwrap_err();
        assert!(matches!(err, TryOnError::InvalidResponse(_)));
    }
}

use base64::Engine;
use serde::{Deserialize, Serialize};

/// One narrative paragraph plus an optional illustration. The original
/// storybook format, still produced by the classic text mode and still
/// present in older collections on disk.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TextPage {
    pub text: String,
    pub image_prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SpeechBubble {
    pub character: String,
    pub text: String,
}

/// One illustrated unit within a comic page.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Panel {
    pub description: String,
    pub image_prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub speech_bubbles: Vec<SpeechBubble>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComicPage {
    pub panels: Vec<Panel>,
}

/// Stored collections mix both page shapes: comic pages from the current
/// generator alongside text pages written by its predecessor.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum Page {
    Comic(ComicPage),
    Text(TextPage),
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub id: String,
    pub title: String,
    pub couple_names: String,
    pub pages: Vec<Page>,
    pub created_at: String,
}

/// Raw bytes returned by the image model.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl ImageData {
    pub fn data_url(&self) -> String {
        let encoded = base64::engine::general_purpose::STANDARD.encode(&self.data);
        format!("data:{};base64,{}", self.mime_type, encoded)
    }
}

/// Outcome of one panel's illustration attempt, kept explicit through the
/// merge step so a fallback is distinguishable from a real image.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageResult {
    Generated(ImageData),
    Placeholder(String),
}

impl ImageResult {
    pub fn is_generated(&self) -> bool {
        matches!(self, ImageResult::Generated(_))
    }
}

/// Deterministic fallback illustration for a page or panel whose real image
/// was not generated.
pub fn placeholder_image_url(image_prompt: &str) -> String {
    let prefix: String = image_prompt.chars().take(20).collect();
    let encoded: String = url::form_urlencoded::byte_serialize(prefix.as_bytes()).collect();
    format!("https://placehold.co/600x400/ffe4e6/be123c?text={}...", encoded)
}

/// Derives a story id from the couple's names plus a low-resolution time
/// suffix. Uniqueness is best effort: identical names within the same
/// suffix window collide, and the store does not reject duplicates.
pub fn derive_story_id(couple_names: &str, timestamp_millis: i64) -> String {
    let slug: String = couple_names
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    let millis = timestamp_millis.to_string();
    let suffix = &millis[millis.len().saturating_sub(4)..];
    format!("{}-{}", slug, suffix)
}

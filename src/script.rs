use crate::story::SpeechBubble;
use anyhow::{bail, Context, Result};
use serde::Deserialize;

/// Storybook shape: `{ "pages": [ { "text", "imagePrompt" } ] }`
#[derive(Debug, Deserialize)]
pub struct StoryScript {
    pub pages: Vec<StoryScriptPage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryScriptPage {
    pub text: String,
    pub image_prompt: String,
}

/// Comic shape: `{ "pages": [ { "panels": [ ... ] } ] }`
#[derive(Debug, Deserialize)]
pub struct ComicScript {
    pub pages: Vec<ComicScriptPage>,
}

#[derive(Debug, Deserialize)]
pub struct ComicScriptPage {
    pub panels: Vec<ComicScriptPanel>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComicScriptPanel {
    pub description: String,
    pub image_prompt: String,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub speech_bubbles: Vec<SpeechBubble>,
}

/// Models wrap JSON in markdown fences even when asked not to.
pub fn strip_code_blocks(s: &str) -> String {
    let s = s.trim();
    if s.starts_with("```json") {
        s.trim_start_matches("```json")
            .trim_end_matches("```")
            .trim()
            .to_string()
    } else if s.starts_with("```") {
        s.trim_start_matches("```")
            .trim_end_matches("```")
            .trim()
            .to_string()
    } else {
        s.to_string()
    }
}

/// Parses and validates a storybook script. Any schema violation is fatal
/// to the request; no partial story is produced from a malformed response.
pub fn parse_story_script(response: &str) -> Result<StoryScript> {
    let clean = strip_code_blocks(response);
    let script: StoryScript = serde_json::from_str(&clean)
        .with_context(|| format!("Failed to parse story script JSON: {}", clean))?;

    if script.pages.is_empty() {
        bail!("Story script has no pages");
    }
    for (i, page) in script.pages.iter().enumerate() {
        if page.text.trim().is_empty() {
            bail!("Story script page {} has empty text", i + 1);
        }
        if page.image_prompt.trim().is_empty() {
            bail!("Story script page {} has empty imagePrompt", i + 1);
        }
    }
    Ok(script)
}

/// Parses and validates a comic script. Pages carry 1-2 panels each.
pub fn parse_comic_script(response: &str) -> Result<ComicScript> {
    let clean = strip_code_blocks(response);
    let script: ComicScript = serde_json::from_str(&clean)
        .with_context(|| format!("Failed to parse comic script JSON: {}", clean))?;

    if script.pages.is_empty() {
        bail!("Comic script has no pages");
    }
    for (i, page) in script.pages.iter().enumerate() {
        if page.panels.is_empty() || page.panels.len() > 2 {
            bail!(
                "Comic script page {} has {} panels, expected 1 or 2",
                i + 1,
                page.panels.len()
            );
        }
        for (j, panel) in page.panels.iter().enumerate() {
            if panel.description.trim().is_empty() {
                bail!("Comic script page {} panel {} has empty description", i + 1, j + 1);
            }
            if panel.image_prompt.trim().is_empty() {
                bail!("Comic script page {} panel {} has empty imagePrompt", i + 1, j + 1);
            }
        }
    }
    Ok(script)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_blocks() {
        assert_eq!(strip_code_blocks("json"), "json");
        assert_eq!(strip_code_blocks("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_blocks("```\n{}\n```"), "{}");
        assert_eq!(strip_code_blocks("  ```json  \n  {}  \n  ```  "), "{}");
    }

    #[test]
    fn test_parse_story_script_with_fences() {
        let response = r#"```json
        { "pages": [ { "text": "They met.", "imagePrompt": "a cafe at dusk" } ] }
        ```"#;
        let script = parse_story_script(response).unwrap();
        assert_eq!(script.pages.len(), 1);
        assert_eq!(script.pages[0].image_prompt, "a cafe at dusk");
    }

    #[test]
    fn test_parse_story_script_rejects_missing_field() {
        let response = r#"{ "pages": [ { "text": "They met." } ] }"#;
        assert!(parse_story_script(response).is_err());
    }

    #[test]
    fn test_parse_story_script_rejects_empty_pages() {
        assert!(parse_story_script(r#"{ "pages": [] }"#).is_err());
    }

    #[test]
    fn test_parse_story_script_rejects_non_json() {
        assert!(parse_story_script("Once upon a time there was no JSON.").is_err());
    }

    #[test]
    fn test_parse_comic_script_full_shape() {
        let response = r#"{
            "pages": [
                { "panels": [
                    { "description": "They bump into each other.",
                      "imagePrompt": "two people colliding at a cafe door",
                      "caption": "It started with spilled coffee.",
                      "speechBubbles": [ { "character": "Alex", "text": "Oh no, I'm so sorry!" } ] },
                    { "description": "Both laugh.",
                      "imagePrompt": "two people laughing, coffee on the floor" }
                ] }
            ]
        }"#;
        let script = parse_comic_script(response).unwrap();
        assert_eq!(script.pages[0].panels.len(), 2);
        assert_eq!(script.pages[0].panels[0].speech_bubbles[0].character, "Alex");
        assert!(script.pages[0].panels[1].caption.is_none());
        assert!(script.pages[0].panels[1].speech_bubbles.is_empty());
    }

    #[test]
    fn test_parse_comic_script_rejects_three_panels() {
        let response = r#"{
            "pages": [ { "panels": [
                { "description": "a", "imagePrompt": "b" },
                { "description": "c", "imagePrompt": "d" },
                { "description": "e", "imagePrompt": "f" }
            ] } ]
        }"#;
        assert!(parse_comic_script(response).is_err());
    }

    #[test]
    fn test_parse_comic_script_rejects_blank_prompt() {
        let response = r#"{
            "pages": [ { "panels": [ { "description": "a", "imagePrompt": "  " } ] } ]
        }"#;
        assert!(parse_comic_script(response).is_err());
    }

    #[test]
    fn test_parse_comic_script_tolerates_unknown_fields() {
        let response = r#"{
            "pages": [ { "panels": [
                { "description": "a", "imagePrompt": "b", "mood": "tender" }
            ] } ],
            "title": "extra"
        }"#;
        assert!(parse_comic_script(response).is_ok());
    }
}

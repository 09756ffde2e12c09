use crate::pipeline::{ReferencePhoto, SaveStatus, StoryOutcome};
use crate::prompts::{FlirtyRequest, FutureRequest, LetterRequest, StoryRequest, VIBES};
use crate::store::StoryStore;
use crate::story::{Page, Story};
use anyhow::{Context, Result};
use inquire::{Select, Text};
use std::fs;
use std::path::Path;

pub const MENU_LOVE_LETTER: &str = "Love Letter";
pub const MENU_FLIRTY_TEXTS: &str = "Flirty Texts";
pub const MENU_FUTURE_US: &str = "Future Us";
pub const MENU_STORYBOOK: &str = "Our Storybook";
pub const MENU_READ_STORY: &str = "Read a saved story";
pub const MENU_QUIT: &str = "Quit";

pub fn main_menu() -> Result<&'static str> {
    let choice = Select::new(
        "What shall we create?",
        vec![
            MENU_LOVE_LETTER,
            MENU_FLIRTY_TEXTS,
            MENU_FUTURE_US,
            MENU_STORYBOOK,
            MENU_READ_STORY,
            MENU_QUIT,
        ],
    )
    .prompt()?;
    Ok(choice)
}

/// Re-prompts until the field is non-empty. Generation is never started
/// with a missing required field.
fn required_text(prompt: &str, placeholder: &str) -> Result<String> {
    loop {
        let value = Text::new(prompt).with_placeholder(placeholder).prompt()?;
        let value = value.trim();
        if !value.is_empty() {
            return Ok(value.to_string());
        }
        println!("This field is required.");
    }
}

fn optional_text(prompt: &str, placeholder: &str) -> Result<String> {
    Ok(Text::new(prompt)
        .with_placeholder(placeholder)
        .prompt()?
        .trim()
        .to_string())
}

pub fn letter_form() -> Result<LetterRequest> {
    Ok(LetterRequest {
        partner_name: required_text("Partner's name:", "e.g. Sarah")?,
        occasion: optional_text("Occasion:", "e.g. Valentine's Day, Anniversary")?,
        tone: Select::new(
            "Tone:",
            vec!["Romantic", "Funny", "Poetic", "Casual", "Passionate"],
        )
        .prompt()?
        .to_string(),
        memories: optional_text(
            "Key memories or details:",
            "e.g. Our trip to Paris, the way she laughs...",
        )?,
    })
}

pub fn flirty_form() -> Result<FlirtyRequest> {
    Ok(FlirtyRequest {
        context: required_text(
            "What's the situation?",
            "e.g. Just matched, want to ask them out, saying goodnight...",
        )?,
        tone: Select::new("Tone:", vec!["Cheesy", "Bold", "Witty", "Cute", "Mysterious"])
            .prompt()?
            .to_string(),
    })
}

pub fn future_form() -> Result<FutureRequest> {
    Ok(FutureRequest {
        names: required_text("Couple's names:", "e.g. Alex & Sam")?,
        stage: Select::new(
            "Current relationship stage:",
            vec!["Just Met", "Dating", "Engaged", "Married", "Long Distance"],
        )
        .prompt()?
        .to_string(),
        dreams: optional_text("Your dreams together:", "e.g. A house by the sea, travel...")?,
    })
}

pub fn story_form() -> Result<StoryRequest> {
    Ok(StoryRequest {
        names: required_text("Couple's names:", "e.g. Alex & Sam")?,
        how_met: required_text("How did you meet?", "e.g. At a coffee shop...")?,
        first_date: optional_text("First date details:", "e.g. Went to the movies...")?,
        memorable_moments: optional_text(
            "Memorable moments:",
            "e.g. The proposal, our first trip together...",
        )?,
        vibe: Select::new("Story vibe:", VIBES.to_vec()).prompt()?.to_string(),
    })
}

/// Whether to illustrate with the real image model or classic placeholder
/// art.
pub fn storybook_mode() -> Result<bool> {
    let choice = Select::new(
        "Storybook style:",
        vec![
            "Illustrated comic (generates real images)",
            "Classic storybook (placeholder art)",
        ],
    )
    .prompt()?;
    Ok(choice.starts_with("Illustrated"))
}

/// Optional reference photos of the two partners. An unreadable file is
/// skipped with a notice; the pipeline works fine without photos.
pub fn story_photos() -> Result<Vec<ReferencePhoto>> {
    let mut photos = Vec::new();
    for partner in ["first", "second"] {
        let path = Text::new(&format!("Photo of the {} partner (optional, path):", partner))
            .with_placeholder("press enter to skip")
            .prompt()?;
        let path = path.trim();
        if path.is_empty() {
            continue;
        }
        match load_photo(path) {
            Ok(photo) => photos.push(photo),
            Err(e) => println!("Skipping photo {}: {:#}", path, e),
        }
    }
    Ok(photos)
}

fn load_photo(path: &str) -> Result<ReferencePhoto> {
    let data = fs::read(path).with_context(|| format!("Failed to read {}", path))?;
    let extension = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());
    let mime_type = match extension.as_deref() {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    };
    Ok(ReferencePhoto {
        mime_type: mime_type.to_string(),
        data,
    })
}

pub fn show_outcome(outcome: &StoryOutcome) {
    println!();
    match &outcome.saved {
        SaveStatus::Saved => println!("Saved! Story id: {}", outcome.story.id),
        SaveStatus::Unsaved(reason) => {
            println!("Warning: this story could NOT be saved ({}).", reason);
            println!("It is shown once below; copy anything you want to keep.");
        }
    }
    if outcome.placeholder_images > 0 && outcome.generated_images > 0 {
        println!(
            "{} of {} illustrations could not be generated and use placeholders.",
            outcome.placeholder_images,
            outcome.generated_images + outcome.placeholder_images
        );
    }
    render_story(&outcome.story);
}

pub fn render_story(story: &Story) {
    println!();
    println!("=== {} — {} ===", story.title, story.couple_names);
    for (i, page) in story.pages.iter().enumerate() {
        println!();
        println!("--- Page {} of {} ---", i + 1, story.pages.len());
        match page {
            Page::Text(page) => {
                println!("{}", page.text);
                if let Some(url) = &page.image_url {
                    println!("  [illustration: {}]", image_note(url));
                }
            }
            Page::Comic(page) => {
                for (j, panel) in page.panels.iter().enumerate() {
                    println!("Panel {}: {}", j + 1, panel.description);
                    if let Some(caption) = &panel.caption {
                        println!("  Caption: {}", caption);
                    }
                    for bubble in &panel.speech_bubbles {
                        println!("  {}: \"{}\"", bubble.character, bubble.text);
                    }
                    if let Some(url) = &panel.image_url {
                        println!("  [illustration: {}]", image_note(url));
                    }
                }
            }
        }
    }
    println!();
}

/// Data URLs are megabytes of base64; summarize instead of flooding the
/// terminal with them.
fn image_note(url: &str) -> String {
    if url.starts_with("data:") {
        let mime = url
            .split(';')
            .next()
            .and_then(|prefix| prefix.strip_prefix("data:"))
            .unwrap_or("image");
        format!("generated {} image, {} chars", mime, url.len())
    } else {
        url.to_string()
    }
}

pub fn read_story_flow(store: &StoryStore) -> Result<()> {
    let stories = store.list();
    if stories.is_empty() {
        println!("No saved stories yet.");
        return Ok(());
    }

    let options: Vec<String> = stories
        .iter()
        .map(|s| format!("{} — {} ({})", s.title, s.couple_names, s.id))
        .collect();
    let selection = Select::new("Which story?", options).prompt()?;

    let id = selection
        .rsplit('(')
        .next()
        .map(|tail| tail.trim_end_matches(')'))
        .unwrap_or(&selection);

    match store.get_by_id(id) {
        Some(story) => render_story(&story),
        None => println!("Story not found: {}", id),
    }
    Ok(())
}

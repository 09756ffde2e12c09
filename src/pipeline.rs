use crate::genai::GenAiClient;
use crate::prompts::{
    compose_comic_script, compose_story_script, StoryRequest, DESCRIBE_PERSON_PROMPT,
    GENERIC_PERSON_DESCRIPTION, IMAGE_STYLE_SUFFIX,
};
use crate::script::{self, ComicScript};
use crate::store::StoryStore;
use crate::story::{
    derive_story_id, placeholder_image_url, ComicPage, ImageResult, Page, Panel, Story, TextPage,
};
use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use futures_util::future::join_all;
use indicatif::ProgressBar;
use std::collections::HashMap;

/// Image-generation calls in flight at once. Backpressure against rate
/// limits and request timeouts, not a correctness constraint.
const IMAGE_BATCH_SIZE: usize = 2;

const STORY_TITLE: &str = "Our Love Story";

/// A partner's reference photo, read by the UI layer.
pub struct ReferencePhoto {
    pub mime_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SaveStatus {
    Saved,
    /// The story could not be persisted; it exists only in this outcome and
    /// should be displayed immediately with a warning.
    Unsaved(String),
}

pub struct StoryOutcome {
    pub story: Story,
    pub saved: SaveStatus,
    pub generated_images: usize,
    pub placeholder_images: usize,
}

struct PanelJob {
    page: usize,
    panel: usize,
    image_prompt: String,
}

pub struct StoryPipeline<'a> {
    client: &'a dyn GenAiClient,
    store: &'a StoryStore,
}

impl<'a> StoryPipeline<'a> {
    pub fn new(client: &'a dyn GenAiClient, store: &'a StoryStore) -> Self {
        Self { client, store }
    }

    /// Comic mode: analyze reference photos, generate a paneled script,
    /// illustrate every panel in bounded batches, merge by coordinate and
    /// persist. Only the script step can fail the request.
    pub async fn create_comic_story(
        &self,
        request: &StoryRequest,
        photos: &[ReferencePhoto],
    ) -> Result<StoryOutcome> {
        let character_descriptions = self.describe_couple(photos).await;

        println!("Weaving your story...");
        let prompt = compose_comic_script(request, character_descriptions.as_deref());
        let response = self
            .client
            .generate_json(&prompt)
            .await
            .context("Comic script generation failed")?;
        let comic = script::parse_comic_script(&response)?;

        println!("Illustrating your memories...");
        let worklist = flatten_panels(&comic);
        let results = self.illustrate_panels(&worklist).await;
        let (pages, generated, placeholders) = merge_images(comic, results);

        let story = Story {
            id: derive_story_id(&request.names, Utc::now().timestamp_millis()),
            title: STORY_TITLE.to_string(),
            couple_names: request.names.clone(),
            pages: pages.into_iter().map(Page::Comic).collect(),
            created_at: now_iso(),
        };

        let saved = self.persist(&story);
        Ok(StoryOutcome {
            story,
            saved,
            generated_images: generated,
            placeholder_images: placeholders,
        })
    }

    /// Classic mode: text pages with templated placeholder illustrations.
    /// No image model is called, so there is no batching and nothing to
    /// isolate per panel.
    pub async fn create_text_story(&self, request: &StoryRequest) -> Result<StoryOutcome> {
        println!("Weaving your story...");
        let prompt = compose_story_script(request);
        let response = self
            .client
            .generate_json(&prompt)
            .await
            .context("Story generation failed")?;
        let script = script::parse_story_script(&response)?;

        let pages: Vec<Page> = script
            .pages
            .into_iter()
            .map(|page| {
                let image_url = placeholder_image_url(&page.image_prompt);
                Page::Text(TextPage {
                    text: page.text,
                    image_prompt: page.image_prompt,
                    image_url: Some(image_url),
                })
            })
            .collect();
        let placeholder_images = pages.len();

        let story = Story {
            id: derive_story_id(&request.names, Utc::now().timestamp_millis()),
            title: STORY_TITLE.to_string(),
            couple_names: request.names.clone(),
            pages,
            created_at: now_iso(),
        };

        let saved = self.persist(&story);
        Ok(StoryOutcome {
            story,
            saved,
            generated_images: 0,
            placeholder_images,
        })
    }

    /// One description per photo; a failed analysis falls back to a generic
    /// description rather than aborting the run.
    async fn describe_couple(&self, photos: &[ReferencePhoto]) -> Option<String> {
        if photos.is_empty() {
            return None;
        }

        println!("Studying your photos...");
        let mut descriptions = Vec::new();
        for photo in photos {
            match self
                .client
                .describe_image(&photo.mime_type, &photo.data, DESCRIBE_PERSON_PROMPT)
                .await
            {
                Ok(description) => descriptions.push(description.trim().to_string()),
                Err(e) => {
                    log::warn!("Reference photo analysis failed: {:#}", e);
                    descriptions.push(GENERIC_PERSON_DESCRIPTION.to_string());
                }
            }
        }
        Some(descriptions.join("; "))
    }

    async fn illustrate_panels(&self, worklist: &[PanelJob]) -> Vec<(usize, usize, ImageResult)> {
        let pb = ProgressBar::new(worklist.len() as u64);

        let mut results = Vec::with_capacity(worklist.len());
        for batch in worklist.chunks(IMAGE_BATCH_SIZE) {
            let calls = batch.iter().map(|job| async {
                let prompt = format!("{}{}", job.image_prompt, IMAGE_STYLE_SUFFIX);
                let image = match self.client.generate_image(&prompt).await {
                    Ok(image) => ImageResult::Generated(image),
                    Err(e) => {
                        log::warn!(
                            "Image generation failed for page {} panel {}: {:#}",
                            job.page + 1,
                            job.panel + 1,
                            e
                        );
                        ImageResult::Placeholder(format!("{:#}", e))
                    }
                };
                (job.page, job.panel, image)
            });

            for result in join_all(calls).await {
                pb.inc(1);
                results.push(result);
            }
        }
        pb.finish_and_clear();

        results
    }

    fn persist(&self, story: &Story) -> SaveStatus {
        match self.store.append(story) {
            Ok(()) => SaveStatus::Saved,
            Err(e) => {
                log::warn!("Failed to save story {}: {:#}", story.id, e);
                SaveStatus::Unsaved(format!("{:#}", e))
            }
        }
    }
}

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Document-order work-list of every panel, keyed by (page, panel) so the
/// results can be merged back regardless of completion order.
fn flatten_panels(comic: &ComicScript) -> Vec<PanelJob> {
    let mut jobs = Vec::new();
    for (page, script_page) in comic.pages.iter().enumerate() {
        for (panel, script_panel) in script_page.panels.iter().enumerate() {
            jobs.push(PanelJob {
                page,
                panel,
                image_prompt: script_panel.image_prompt.clone(),
            });
        }
    }
    jobs
}

/// Rebuilds the page/panel structure with images inserted by coordinate.
/// Every panel ends up with an image URL: a data URL for generated images,
/// the deterministic placeholder otherwise.
fn merge_images(
    comic: ComicScript,
    results: Vec<(usize, usize, ImageResult)>,
) -> (Vec<ComicPage>, usize, usize) {
    let mut by_coord: HashMap<(usize, usize), ImageResult> = results
        .into_iter()
        .map(|(page, panel, image)| ((page, panel), image))
        .collect();

    let mut generated = 0;
    let mut placeholders = 0;

    let pages = comic
        .pages
        .into_iter()
        .enumerate()
        .map(|(page, script_page)| ComicPage {
            panels: script_page
                .panels
                .into_iter()
                .enumerate()
                .map(|(panel, script_panel)| {
                    let image = by_coord
                        .remove(&(page, panel))
                        .unwrap_or_else(|| ImageResult::Placeholder("no image result".to_string()));
                    let image_url = match &image {
                        ImageResult::Generated(data) => {
                            generated += 1;
                            data.data_url()
                        }
                        ImageResult::Placeholder(_) => {
                            placeholders += 1;
                            placeholder_image_url(&script_panel.image_prompt)
                        }
                    };
                    Panel {
                        description: script_panel.description,
                        image_prompt: script_panel.image_prompt,
                        caption: script_panel.caption,
                        speech_bubbles: script_panel.speech_bubbles,
                        image_url: Some(image_url),
                    }
                })
                .collect(),
        })
        .collect();

    (pages, generated, placeholders)
}

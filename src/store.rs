use crate::story::Story;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Append-only collection of stories in a single pretty-printed JSON file.
/// The whole file is read, extended and rewritten on every append.
pub struct StoryStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process. Writers in
    /// other processes remain last-writer-wins at whole-file granularity.
    write_lock: Mutex<()>,
}

impl StoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Returns every stored story. A missing, unreadable or corrupt
    /// collection reads as empty so browsing never fails; the two cases are
    /// indistinguishable to callers.
    pub fn list(&self) -> Vec<Story> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                if self.path.exists() {
                    log::warn!("Failed to read story collection {:?}: {}", self.path, e);
                }
                return Vec::new();
            }
        };

        match serde_json::from_str(&content) {
            Ok(stories) => stories,
            Err(e) => {
                log::warn!("Failed to parse story collection {:?}: {}", self.path, e);
                Vec::new()
            }
        }
    }

    /// Appends one story and rewrites the collection. Errors are reported,
    /// not raised past the caller's `?`, so the pipeline can degrade to
    /// one-time display instead of failing the whole request.
    pub fn append(&self, story: &Story) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create data directory {:?}", parent))?;
            }
        }

        let mut stories = self.list();
        stories.push(story.clone());

        let content = serde_json::to_string_pretty(&stories)?;
        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write story collection {:?}", self.path))?;
        Ok(())
    }

    pub fn get_by_id(&self, id: &str) -> Option<Story> {
        self.list().into_iter().find(|s| s.id == id)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::story::{ComicPage, Page, Panel, TextPage};

    fn text_story(id: &str) -> Story {
        Story {
            id: id.to_string(),
            title: "Our Love Story".to_string(),
            couple_names: "Alex & Sam".to_string(),
            pages: vec![Page::Text(TextPage {
                text: "They met at a cafe.".to_string(),
                image_prompt: "a cozy cafe".to_string(),
                image_url: Some("https://placehold.co/600x400?text=cafe".to_string()),
            })],
            created_at: "2026-08-07T10:00:00.000Z".to_string(),
        }
    }

    fn comic_story(id: &str) -> Story {
        Story {
            id: id.to_string(),
            title: "Our Love Story".to_string(),
            couple_names: "Mia & Noor".to_string(),
            pages: vec![Page::Comic(ComicPage {
                panels: vec![Panel {
                    description: "They bump into each other.".to_string(),
                    image_prompt: "two people at a cafe door".to_string(),
                    caption: Some("It started with spilled coffee.".to_string()),
                    speech_bubbles: vec![],
                    image_url: Some("data:image/png;base64,AQID".to_string()),
                }],
            })],
            created_at: "2026-08-07T11:00:00.000Z".to_string(),
        }
    }

    #[test]
    fn test_list_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = StoryStore::new(dir.path().join("stories.json"));
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_list_corrupt_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stories.json");
        fs::write(&path, "not json at all").unwrap();
        let store = StoryStore::new(path);
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_round_trip_mixed_shapes() {
        let dir = tempfile::tempdir().unwrap();
        let store = StoryStore::new(dir.path().join("data").join("stories.json"));

        let legacy = text_story("alex---sam-1111");
        let comic = comic_story("mia---noor-2222");
        store.append(&legacy).unwrap();
        store.append(&comic).unwrap();

        assert_eq!(store.list().len(), 2);
        assert_eq!(store.get_by_id("alex---sam-1111").unwrap(), legacy);
        assert_eq!(store.get_by_id("mia---noor-2222").unwrap(), comic);
    }

    #[test]
    fn test_append_preserves_existing_records() {
        let dir = tempfile::tempdir().unwrap();
        let store = StoryStore::new(dir.path().join("stories.json"));

        store.append(&text_story("first-0001")).unwrap();
        store.append(&text_story("second-0002")).unwrap();

        let ids: Vec<String> = store.list().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["first-0001", "second-0002"]);
    }

    #[test]
    fn test_get_by_id_unknown_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = StoryStore::new(dir.path().join("stories.json"));
        store.append(&text_story("known-0001")).unwrap();
        assert!(store.get_by_id("unknown-9999").is_none());
    }

    #[test]
    fn test_append_reports_unwritable_target() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the data directory should be makes the
        // write fail without touching filesystem permissions.
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "file, not a directory").unwrap();

        let store = StoryStore::new(blocker.join("stories.json"));
        assert!(store.append(&text_story("doomed-0001")).is_err());
    }
}

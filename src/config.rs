use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Path of the JSON collection all generated stories are appended to.
    #[serde(default = "default_data_file")]
    pub data_file: String,

    pub genai: GenAiConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GenAiConfig {
    pub provider: String, // currently only "gemini"
    pub gemini: Option<GeminiConfig>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    #[serde(default = "default_text_model")]
    pub text_model: String,
    #[serde(default = "default_image_model")]
    pub image_model: String,
}

fn default_data_file() -> String {
    "data/stories.json".to_string()
}

fn default_text_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_image_model() -> String {
    "imagen-4.0-generate-001".to_string()
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Path::new("config.yml");
        if !path.exists() {
            anyhow::bail!("config.yml not found. Please create one.");
        }

        let content = fs::read_to_string(path).context("Failed to read config.yml")?;
        let config: Config =
            serde_yaml_ng::from_str(&content).context("Failed to parse config.yml")?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let content = serde_yaml_ng::to_string(self)?;
        fs::write("config.yml", content).context("Failed to write config.yml")?;
        Ok(())
    }

    pub fn ensure_directories(&self) -> Result<()> {
        if let Some(parent) = Path::new(&self.data_file).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let yaml = r#"
genai:
  provider: gemini
  gemini:
    api_key: "test-key"
"#;
        let config: Config = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.data_file, "data/stories.json");
        let gemini = config.genai.gemini.unwrap();
        assert_eq!(gemini.text_model, "gemini-2.5-flash");
        assert_eq!(gemini.image_model, "imagen-4.0-generate-001");
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
data_file: "/tmp/stories.json"
genai:
  provider: gemini
  gemini:
    api_key: "test-key"
    text_model: "gemini-custom"
    image_model: "imagen-custom"
"#;
        let config: Config = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.data_file, "/tmp/stories.json");
        assert_eq!(config.genai.gemini.unwrap().text_model, "gemini-custom");
    }
}

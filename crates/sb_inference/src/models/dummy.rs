use std::fmt;

use sb_core::{Result, TextGenerator};

/// Offline generator: echoes the first words of the prompt's last paragraph.
pub struct DummyModel;

impl fmt::Debug for DummyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyModel").finish()
    }
}

impl DummyModel {
    pub const WORDS: usize = 20;

    pub fn new() -> Self {
        Self
    }
}

impl Default for DummyModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl TextGenerator for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = prompt
            .split("\n\n")
            .filter(|p| !p.trim().is_empty())
            .last()
            .unwrap_or("");
        let words: Vec<&str> = body.split_whitespace().take(Self::WORDS).collect();
        Ok(words.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dummy_model() {
        let model = DummyModel::new();
        let result = model
            .generate("Summarize this:\n\nMice flown on the station lost bone.")
            .await
            .unwrap();
        assert_eq!(result, "Mice flown on the station lost bone.");

        let long = "word ".repeat(50);
        let result = model.generate(&long).await.unwrap();
        assert_eq!(result.split_whitespace().count(), DummyModel::WORDS);

        assert_eq!(model.generate("").await.unwrap(), "");
    }
}

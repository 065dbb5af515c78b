use regex::Regex;
use std::fs;
use std::path::PathBuf;

use crate::utils::Settings;

/// One saved prompt template. The body may contain the `[input1]` and
/// `[input2]` placeholder markers.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptTemplate {
    pub title: String,
    pub body: String,
}

/// The prompt template collection, persisted as a flat text file with one
/// `### <title>` heading plus fenced block per entry. The whole file is
/// rewritten on every save and reloaded wholesale after every mutation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptLibrary {
    templates: Vec<PromptTemplate>,
}

const ENTRY_PATTERN: &str = r"(?s)### (.*?)```(.*?)```";

impl PromptLibrary {
    /// Path to the prompt file inside the app's config directory.
    pub fn prompts_path() -> Result<PathBuf, String> {
        Ok(Settings::settings_dir()?.join("prompts.md"))
    }

    /// Parses the heading + fence format. Titles and bodies are trimmed;
    /// text outside entries is ignored.
    pub fn parse(content: &str) -> Result<Self, String> {
        let pattern =
            Regex::new(ENTRY_PATTERN).map_err(|e| format!("invalid template pattern: {}", e))?;

        let mut library = Self::default();
        for captures in pattern.captures_iter(content) {
            let title = captures
                .get(1)
                .map(|m| m.as_str().trim())
                .unwrap_or_default();
            let body = captures
                .get(2)
                .map(|m| m.as_str().trim())
                .unwrap_or_default();
            if !title.is_empty() {
                library.upsert(title.to_string(), body.to_string());
            }
        }

        Ok(library)
    }

    /// Renders the whole collection back into the file format.
    pub fn render(&self) -> String {
        let mut content = String::new();
        for template in &self.templates {
            content.push_str(&format!(
                "### {}\n```\n{}\n```\n\n",
                template.title, template.body
            ));
        }
        content
    }

    /// Loads the collection from disk. A missing file is an empty library.
    pub fn load() -> Result<Self, String> {
        let path = Self::prompts_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let contents =
            fs::read_to_string(&path).map_err(|e| format!("failed to read prompt file: {}", e))?;

        Self::parse(&contents)
    }

    /// Rewrites the prompt file from the in-memory collection.
    pub fn save(&self) -> Result<(), String> {
        let dir = Settings::settings_dir()?;

        if !dir.exists() {
            fs::create_dir_all(&dir)
                .map_err(|e| format!("failed to create settings directory: {}", e))?;
        }

        let path = Self::prompts_path()?;
        fs::write(&path, self.render())
            .map_err(|e| format!("failed to write prompt file: {}", e))?;

        Ok(())
    }

    pub fn get(&self, title: &str) -> Option<&PromptTemplate> {
        self.templates.iter().find(|t| t.title == title)
    }

    /// Inserts or overwrites by title, keeping the original position for
    /// overwrites so the selector order stays stable.
    pub fn upsert(&mut self, title: String, body: String) {
        match self.templates.iter_mut().find(|t| t.title == title) {
            Some(existing) => existing.body = body,
            None => self.templates.push(PromptTemplate { title, body }),
        }
    }

    pub fn remove(&mut self, title: &str) -> bool {
        let before = self.templates.len();
        self.templates.retain(|t| t.title != title);
        self.templates.len() != before
    }

    pub fn titles(&self) -> Vec<String> {
        self.templates.iter().map(|t| t.title.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_heading_and_fence_entries() {
        let content = "### Translate\n```\nTranslate to French: [input1]\n```\n\n### Compare\n```\nCompare [input1] with [input2]\n```\n\n";
        let library = PromptLibrary::parse(content).unwrap();
        assert_eq!(library.len(), 2);
        assert_eq!(
            library.get("Translate").unwrap().body,
            "Translate to French: [input1]"
        );
        assert_eq!(library.titles(), vec!["Translate", "Compare"]);
    }

    #[test]
    fn render_then_parse_round_trips() {
        let mut library = PromptLibrary::default();
        library.upsert("One".to_string(), "first body [input1]".to_string());
        library.upsert("Two".to_string(), "second\nmultiline\nbody".to_string());
        library.upsert("Three".to_string(), "[input1] and [input2]".to_string());

        let reloaded = PromptLibrary::parse(&library.render()).unwrap();
        assert_eq!(reloaded, library);
    }

    #[test]
    fn upsert_overwrites_by_title_in_place() {
        let mut library = PromptLibrary::default();
        library.upsert("A".to_string(), "old".to_string());
        library.upsert("B".to_string(), "other".to_string());
        library.upsert("A".to_string(), "new".to_string());

        assert_eq!(library.len(), 2);
        assert_eq!(library.get("A").unwrap().body, "new");
        assert_eq!(library.titles(), vec!["A", "B"]);
    }

    #[test]
    fn remove_reports_whether_anything_was_deleted() {
        let mut library = PromptLibrary::default();
        library.upsert("A".to_string(), "body".to_string());
        assert!(library.remove("A"));
        assert!(!library.remove("A"));
        assert!(library.is_empty());
    }

    #[test]
    fn parse_ignores_text_outside_entries() {
        let content = "stray preamble\n\n### Only\n```\nbody\n```\n\ntrailing notes";
        let library = PromptLibrary::parse(content).unwrap();
        assert_eq!(library.titles(), vec!["Only"]);
    }
}

//! Page template loading and placeholder substitution.

use std::fs;
use std::io::ErrorKind;

use crate::config::BuildConfig;
use crate::error::{Error, Result};

/// Placeholders the page template must contain. The template is
/// load-bearing for every page, so a missing placeholder aborts the
/// build before any output is written.
pub const REQUIRED_PLACEHOLDERS: [&str; 3] = [
    "{{PAGE_TITLE}}",
    "{{TABLE_CONTENT}}",
    "{{DROP_NAV_CONTENT}}",
];

/// A validated page template.
#[derive(Debug, Clone)]
pub struct PageTemplate {
    text: String,
}

impl PageTemplate {
    /// Load the template file and validate its placeholders.
    pub fn load(config: &BuildConfig) -> Result<Self> {
        let text = match fs::read_to_string(&config.template_path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(Error::TemplateNotFound(config.template_path.clone()));
            }
            Err(err) => return Err(err.into()),
        };
        Self::from_text(text)
    }

    /// Validate template text directly.
    pub fn from_text(text: String) -> Result<Self> {
        let missing: Vec<&str> = REQUIRED_PLACEHOLDERS
            .iter()
            .copied()
            .filter(|placeholder| !text.contains(placeholder))
            .collect();
        if !missing.is_empty() {
            return Err(Error::MissingPlaceholders(missing.join(", ")));
        }
        Ok(PageTemplate { text })
    }

    /// Raw template text; also the first input to the aggregate hash.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Substitute the three placeholders into a full page.
    pub fn render(&self, title: &str, table_content: &str, drop_nav: &str) -> String {
        self.text
            .replace("{{PAGE_TITLE}}", title)
            .replace("{{TABLE_CONTENT}}", table_content)
            .replace("{{DROP_NAV_CONTENT}}", drop_nav)
    }
}

use codify_protocol::LanguageOption;

const DOWNLOAD_STEM: &str = "codify_output";
const FALLBACK_EXTENSION: &str = "txt";

/// A target language offered by the generator page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Language {
    /// Label shown in the selector and sent to the provider.
    pub label: String,
    /// Highlighting hint for rendered code.
    pub syntax: String,
    /// File extension used by the download action.
    pub extension: String,
}

impl Language {
    pub fn new(
        label: impl Into<String>,
        syntax: impl Into<String>,
        extension: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            syntax: syntax.into(),
            extension: extension.into(),
        }
    }

    pub fn to_option(&self) -> LanguageOption {
        LanguageOption {
            label: self.label.clone(),
            syntax: self.syntax.clone(),
            extension: self.extension.clone(),
        }
    }
}

/// Fixed, ordered set of languages the UI lets users pick from.
///
/// The history store accepts any label; only request validation consults
/// this list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageCatalog {
    languages: Vec<Language>,
}

impl Default for LanguageCatalog {
    fn default() -> Self {
        Self::new(vec![
            Language::new("Python", "python", "py"),
            Language::new("R", "r", "r"),
            Language::new("SQL", "sql", "sql"),
            Language::new("Julia", "julia", "jl"),
        ])
    }
}

impl LanguageCatalog {
    pub fn new(languages: Vec<Language>) -> Self {
        Self { languages }
    }

    pub fn get(&self, label: &str) -> Option<&Language> {
        self.languages.iter().find(|l| l.label == label)
    }

    pub fn labels(&self) -> Vec<&str> {
        self.languages.iter().map(|l| l.label.as_str()).collect()
    }

    pub fn options(&self) -> Vec<LanguageOption> {
        self.languages.iter().map(Language::to_option).collect()
    }

    pub fn download_file_name(&self, label: &str) -> String {
        let ext = self
            .get(label)
            .map(|l| l.extension.as_str())
            .filter(|e| !e.is_empty())
            .unwrap_or(FALLBACK_EXTENSION);
        format!("{DOWNLOAD_STEM}.{ext}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_order() {
        let catalog = LanguageCatalog::default();
        assert_eq!(catalog.labels(), vec!["Python", "R", "SQL", "Julia"]);
        assert_eq!(catalog.get("Julia").map(|l| l.syntax.as_str()), Some("julia"));
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let catalog = LanguageCatalog::default();
        assert!(catalog.get("Python").is_some());
        assert!(catalog.get("python").is_none());
    }

    #[test]
    fn download_name_uses_extension() {
        let catalog = LanguageCatalog::default();
        assert_eq!(catalog.download_file_name("Python"), "codify_output.py");
        assert_eq!(catalog.download_file_name("Julia"), "codify_output.jl");
        assert_eq!(catalog.download_file_name("COBOL"), "codify_output.txt");
    }
}

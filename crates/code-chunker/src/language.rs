use std::path::Path;

/// Extensions the indexer will pick up; everything else is skipped.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["py", "ts", "tsx", "js", "jsx"];

/// Language of an indexable source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
    Unknown,
}

impl Language {
    /// Detect language from file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "py" => Language::Python,
            "js" | "jsx" => Language::JavaScript,
            "ts" | "tsx" => Language::TypeScript,
            _ => Language::Unknown,
        }
    }

    /// Detect language from file path
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(Language::Unknown)
    }

    /// Get language name as string
    pub fn as_str(self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Unknown => "unknown",
        }
    }

    pub fn is_supported(self) -> bool {
        self != Language::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension() {
        assert_eq!(Language::from_extension("py"), Language::Python);
        assert_eq!(Language::from_extension("ts"), Language::TypeScript);
        assert_eq!(Language::from_extension("tsx"), Language::TypeScript);
        assert_eq!(Language::from_extension("js"), Language::JavaScript);
        assert_eq!(Language::from_extension("JSX"), Language::JavaScript);
        assert_eq!(Language::from_extension("rs"), Language::Unknown);
    }

    #[test]
    fn test_from_path() {
        assert_eq!(Language::from_path("src/app.py"), Language::Python);
        assert_eq!(Language::from_path("web/App.tsx"), Language::TypeScript);
        assert_eq!(Language::from_path("Makefile"), Language::Unknown);
    }

    #[test]
    fn supported_extensions_map_to_known_languages() {
        for ext in SUPPORTED_EXTENSIONS {
            assert!(Language::from_extension(ext).is_supported(), "{ext}");
        }
    }
}

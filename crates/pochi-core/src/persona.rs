//! Persona Loader: reads the identity fragments and appends them to the system prompt.
//! Re-read on every request, so edits to the files apply without a restart.

use std::path::{Path, PathBuf};

/// Fragment files in prompt order.
pub const DEFAULT_FRAGMENTS: [&str; 3] = ["IDENTITY.md", "SOUL.md", "USER.md"];

/// Reads persona fragments from one directory. Never fails: a missing or
/// unreadable fragment contributes nothing.
#[derive(Debug, Clone)]
pub struct PersonaLoader {
    base_dir: PathBuf,
    fallback_dir: Option<PathBuf>,
    fragments: Vec<String>,
}

impl PersonaLoader {
    pub fn new(base_dir: impl Into<PathBuf>, fragments: Vec<String>) -> Self {
        Self {
            base_dir: base_dir.into(),
            fallback_dir: None,
            fragments,
        }
    }

    /// Directory read when `base_dir` does not exist. Checked on every load.
    pub fn with_fallback(mut self, fallback_dir: Option<PathBuf>) -> Self {
        self.fallback_dir = fallback_dir;
        self
    }

    pub fn with_default_fragments(base_dir: impl Into<PathBuf>) -> Self {
        Self::new(
            base_dir,
            DEFAULT_FRAGMENTS.iter().map(|s| s.to_string()).collect(),
        )
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// The directory the next [`PersonaLoader::load`] reads from.
    pub fn current_dir(&self) -> PathBuf {
        resolve_persona_dir(&self.base_dir, self.fallback_dir.as_deref())
    }

    /// Concatenate present fragments as `"\n\n--- <name> ---\n<content>"` blocks.
    pub async fn load(&self) -> String {
        let dir = self.current_dir();
        let mut context = String::new();
        for name in &self.fragments {
            let path = dir.join(name);
            match tokio::fs::read_to_string(&path).await {
                Ok(content) => {
                    tracing::debug!(fragment = %name, bytes = content.len(), "persona fragment loaded");
                    context.push_str(&format_fragment(name, &content));
                }
                Err(e) => {
                    tracing::debug!(fragment = %name, path = %path.display(), "persona fragment skipped: {}", e);
                }
            }
        }
        context
    }
}

fn format_fragment(name: &str, content: &str) -> String {
    format!("\n\n--- {} ---\n{}", name, content)
}

/// Primary dir if present; otherwise the fallback if present; otherwise the primary anyway.
/// Evaluated per load, so a primary dir created after startup takes over immediately.
pub fn resolve_persona_dir(primary: &Path, fallback: Option<&Path>) -> PathBuf {
    if primary.exists() {
        return primary.to_path_buf();
    }
    match fallback {
        Some(f) if f.exists() => f.to_path_buf(),
        _ => primary.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).unwrap();
    }

    #[tokio::test]
    async fn all_fragments_in_fixed_order() {
        let dir = tempfile::tempdir().unwrap();
        // Written out of order on purpose.
        write(dir.path(), "USER.md", "likes tea");
        write(dir.path(), "IDENTITY.md", "I am Pochi");
        write(dir.path(), "SOUL.md", "gentle");

        let out = PersonaLoader::with_default_fragments(dir.path()).load().await;
        assert_eq!(
            out,
            "\n\n--- IDENTITY.md ---\nI am Pochi\n\n--- SOUL.md ---\ngentle\n\n--- USER.md ---\nlikes tea"
        );
    }

    #[tokio::test]
    async fn absent_fragments_contribute_nothing() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "SOUL.md", "gentle");

        let out = PersonaLoader::with_default_fragments(dir.path()).load().await;
        assert_eq!(out, "\n\n--- SOUL.md ---\ngentle");
        assert!(!out.contains("IDENTITY.md"));
        assert!(!out.contains("USER.md"));
    }

    #[tokio::test]
    async fn missing_directory_yields_empty() {
        let dir = tempfile::tempdir().unwrap();
        let loader = PersonaLoader::with_default_fragments(dir.path().join("nope"));
        assert_eq!(loader.load().await, "");
    }

    #[tokio::test]
    async fn edits_are_visible_on_next_load() {
        let dir = tempfile::tempdir().unwrap();
        let loader = PersonaLoader::with_default_fragments(dir.path());
        write(dir.path(), "IDENTITY.md", "v1");
        assert!(loader.load().await.contains("v1"));
        write(dir.path(), "IDENTITY.md", "v2");
        let second = loader.load().await;
        assert!(second.contains("v2"));
        assert!(!second.contains("v1"));
    }

    #[test]
    fn falls_back_when_primary_missing() {
        let dir = tempfile::tempdir().unwrap();
        let primary = dir.path().join("context");
        let fallback = dir.path().join("workspace");
        std::fs::create_dir(&fallback).unwrap();

        assert_eq!(resolve_persona_dir(&primary, Some(&fallback)), fallback);
        std::fs::create_dir(&primary).unwrap();
        assert_eq!(resolve_persona_dir(&primary, Some(&fallback)), primary);
    }

    #[tokio::test]
    async fn primary_created_after_start_takes_over() {
        let dir = tempfile::tempdir().unwrap();
        let primary = dir.path().join("context");
        let fallback = dir.path().join("workspace");
        std::fs::create_dir(&fallback).unwrap();
        write(&fallback, "IDENTITY.md", "from workspace");

        let loader = PersonaLoader::with_default_fragments(&primary).with_fallback(Some(fallback));
        assert_eq!(loader.load().await, "\n\n--- IDENTITY.md ---\nfrom workspace");

        std::fs::create_dir(&primary).unwrap();
        write(&primary, "IDENTITY.md", "from context");
        assert_eq!(loader.current_dir(), primary);
        assert_eq!(loader.load().await, "\n\n--- IDENTITY.md ---\nfrom context");
    }

    #[test]
    fn keeps_primary_when_nothing_exists() {
        let dir = tempfile::tempdir().unwrap();
        let primary = dir.path().join("context");
        let fallback = dir.path().join("workspace");
        assert_eq!(resolve_persona_dir(&primary, Some(&fallback)), primary);
        assert_eq!(resolve_persona_dir(&primary, None), primary);
    }
}

use crate::error::{AppError, Result};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Logical name of a knowledge-base entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKey {
    Intro,
    Overview,
    FourComponents,
    Principles,
    Examples,
    Feelings,
    Needs,
    TransformationGuide,
    TrainerGuide,
    DiscourseGuide,
    DebateGuide,
}

impl ContentKey {
    pub const ALL: [ContentKey; 11] = [
        ContentKey::Intro,
        ContentKey::Overview,
        ContentKey::FourComponents,
        ContentKey::Principles,
        ContentKey::Examples,
        ContentKey::Feelings,
        ContentKey::Needs,
        ContentKey::TransformationGuide,
        ContentKey::TrainerGuide,
        ContentKey::DiscourseGuide,
        ContentKey::DebateGuide,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ContentKey::Intro => "intro",
            ContentKey::Overview => "overview",
            ContentKey::FourComponents => "four_components",
            ContentKey::Principles => "principles",
            ContentKey::Examples => "examples",
            ContentKey::Feelings => "feelings",
            ContentKey::Needs => "needs",
            ContentKey::TransformationGuide => "transformation_guide",
            ContentKey::TrainerGuide => "trainer_guide",
            ContentKey::DiscourseGuide => "discourse_guide",
            ContentKey::DebateGuide => "debate_guide",
        }
    }

    /// Path of the entry relative to a knowledge directory.
    pub fn file_name(self) -> &'static str {
        match self {
            ContentKey::Intro => "intro.md",
            ContentKey::Overview => "nvc-overview.md",
            ContentKey::FourComponents => "four-components.md",
            ContentKey::Principles => "principles.md",
            ContentKey::Examples => "examples.md",
            ContentKey::Feelings => "catalogs/feelings.yaml",
            ContentKey::Needs => "catalogs/needs.yaml",
            ContentKey::TransformationGuide => "message-transformation-guide.md",
            ContentKey::TrainerGuide => "trainer-guide.md",
            ContentKey::DiscourseGuide => "political-discourse-guide.md",
            ContentKey::DebateGuide => "political-debate-guide.md",
        }
    }

    pub fn mime_kind(self) -> MimeKind {
        match self {
            ContentKey::Feelings | ContentKey::Needs => MimeKind::StructuredText,
            _ => MimeKind::Markdown,
        }
    }

    /// Heading used when the entry is embedded in a rendered prompt.
    pub fn label(self) -> &'static str {
        match self {
            ContentKey::Intro => "Getting Started",
            ContentKey::Overview => "NVC Overview",
            ContentKey::FourComponents => "The Four Components",
            ContentKey::Principles => "Core Principles and Common Pitfalls",
            ContentKey::Examples => "Worked Examples",
            ContentKey::Feelings => "Feelings Catalog (YAML)",
            ContentKey::Needs => "Needs Catalog (YAML)",
            ContentKey::TransformationGuide => "Message Transformation Guide",
            ContentKey::TrainerGuide => "NVC Trainer Guide",
            ContentKey::DiscourseGuide => "Political Discourse Guide",
            ContentKey::DebateGuide => "Political Debate Guide",
        }
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MimeKind {
    Markdown,
    StructuredText,
}

impl MimeKind {
    pub fn mime_type(self) -> &'static str {
        match self {
            MimeKind::Markdown => "text/markdown",
            MimeKind::StructuredText => "text/yaml",
        }
    }
}

/// Where the text of an entry comes from.
#[derive(Debug, Clone)]
pub enum ContentSource {
    Inline(Cow<'static, str>),
    FilePath(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentEntry {
    pub key: ContentKey,
    pub mime_kind: MimeKind,
    pub body: String,
}

impl ContentEntry {
    /// Resolve a single source into an entry.
    ///
    /// File sources fail with `ContentLoadError` when the file is missing or not UTF-8.
    pub fn load(key: ContentKey, source: ContentSource) -> Result<Self> {
        let body = match source {
            ContentSource::Inline(text) => text.into_owned(),
            ContentSource::FilePath(path) => {
                std::fs::read_to_string(&path).map_err(|e| AppError::ContentLoadError {
                    key: key.to_string(),
                    reason: format!("{}: {}", path.display(), e),
                })?
            }
        };

        Ok(Self {
            key,
            mime_kind: key.mime_kind(),
            body,
        })
    }
}

/// Immutable set of knowledge entries, keyed by [`ContentKey`].
#[derive(Debug, Clone)]
pub struct ContentStore {
    entries: BTreeMap<ContentKey, ContentEntry>,
}

impl ContentStore {
    /// Eagerly load every source. Fails on the first unreadable source or a repeated key.
    pub fn load<I>(sources: I) -> Result<Self>
    where
        I: IntoIterator<Item = (ContentKey, ContentSource)>,
    {
        let mut entries = BTreeMap::new();
        for (key, source) in sources {
            let entry = ContentEntry::load(key, source)?;
            if entries.insert(key, entry).is_some() {
                return Err(AppError::ConfigurationError(format!(
                    "content key '{}' supplied more than once",
                    key
                )));
            }
        }

        tracing::debug!(entries = entries.len(), "Content store loaded");
        Ok(Self { entries })
    }

    /// The full knowledge base as compiled into the binary.
    pub fn embedded() -> Result<Self> {
        Self::load(
            ContentKey::ALL
                .into_iter()
                .map(|key| (key, ContentSource::Inline(Cow::Borrowed(super::embedded::text(key))))),
        )
    }

    /// The full knowledge base read from `dir`, laid out like the `knowledge/` directory.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        Self::load(
            ContentKey::ALL
                .into_iter()
                .map(|key| (key, ContentSource::FilePath(dir.join(key.file_name())))),
        )
    }

    pub fn get(&self, key: ContentKey) -> Option<&ContentEntry> {
        self.entries.get(&key)
    }

    pub fn contains(&self, key: ContentKey) -> bool {
        self.entries.contains_key(&key)
    }

    /// Body of `key`, or an empty string when the entry is absent.
    ///
    /// Tools declare the entries they need at registration, so renderers never hit the empty case.
    pub fn body(&self, key: ContentKey) -> &str {
        self.entries.get(&key).map(|e| e.body.as_str()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Hex SHA-256 over every entry in key order.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();

        for entry in self.entries.values() {
            hasher.update(entry.key.as_str().as_bytes());
            hasher.update(b"|");
            hasher.update(entry.mime_kind.mime_type().as_bytes());
            hasher.update(b"|");
            hasher.update(entry.body.as_bytes());
            hasher.update(b"\n");
        }

        hasher
            .finalize()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect()
    }
}

//! Post catalog - the fixed, ordered list of posts a site publishes

use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;
use std::collections::HashSet;

/// One entry of the catalog: where a post lives and how it is listed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostDescriptor {
    /// Path or URL of the raw markdown, also used as the shareable id
    #[serde(rename = "file")]
    pub source_ref: String,

    /// Post title (untrusted)
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: String,

    /// Publication date as an ISO `YYYY-MM-DD` string
    #[serde(default, deserialize_with = "lenient_text")]
    pub date: String,

    /// Post tags (untrusted)
    #[serde(
        default,
        deserialize_with = "lenient_tags",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub tags: Vec<String>,
}

/// Text of a scalar value; anything else reads as empty
fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

// A hand-edited catalog entry with a null, numeric or missing field still
// loads; the render layer shows it as "Invalid Date" or an empty title.
fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?
        .and_then(scalar_text)
        .unwrap_or_default())
}

fn lenient_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Sequence(items)) => items.into_iter().filter_map(scalar_text).collect(),
        Some(value) => scalar_text(value).into_iter().collect(),
        None => Vec::new(),
    })
}

impl PostDescriptor {
    /// Create a descriptor without tags
    pub fn new(source_ref: &str, title: &str, date: &str) -> Self {
        Self {
            source_ref: source_ref.to_string(),
            title: title.to_string(),
            date: date.to_string(),
            tags: Vec::new(),
        }
    }

    /// Builder-style tag setter
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// The immutable set of posts, in configuration order
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    posts: Vec<PostDescriptor>,
}

impl Catalog {
    /// Build a catalog from configured descriptors
    pub fn new(posts: Vec<PostDescriptor>) -> Self {
        let mut seen = HashSet::new();
        for post in &posts {
            if !seen.insert(post.source_ref.as_str()) {
                tracing::warn!(
                    "Duplicate catalog entry for {:?}; only the first one is reachable by link",
                    post.source_ref
                );
            }
            if chrono::NaiveDate::parse_from_str(&post.date, "%Y-%m-%d").is_err() {
                tracing::warn!("Post {:?} has an invalid date {:?}", post.title, post.date);
            }
        }
        Self { posts }
    }

    /// All descriptors in configuration order
    pub fn all(&self) -> &[PostDescriptor] {
        &self.posts
    }

    /// Descriptors in display order (newest first)
    pub fn sorted(&self) -> Vec<PostDescriptor> {
        sort_by_date(self.posts.clone())
    }

    /// Look up a descriptor by exact source reference
    pub fn find(&self, source_ref: &str) -> Option<&PostDescriptor> {
        self.posts.iter().find(|p| p.source_ref == source_ref)
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

/// Sort descriptors newest first; equal dates keep their relative order
pub fn sort_by_date(mut posts: Vec<PostDescriptor>) -> Vec<PostDescriptor> {
    // `sort_by` is stable
    posts.sort_by(|a, b| b.date.cmp(&a.date));
    posts
}

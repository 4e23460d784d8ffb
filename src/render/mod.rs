//! View builders for the post list and the detail pane
//!
//! Views are plain data: every user-authored string in them is already
//! escaped, so an adapter (see [`page`]) only has to place them in markup.

pub mod page;

use serde::Serialize;

use crate::catalog::{sort_by_date, PostDescriptor};
use crate::helpers::{encode_fragment, escape_text, format_date};

/// Remediation shown under a load error
pub const ERROR_HINT: &str = "Check the file path in the posts catalog and that the file exists.";

/// One row of the post list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListRow {
    /// Position in the displayed list; selecting the row selects this index
    pub position: usize,
    /// Escaped title
    pub title: String,
    /// Escaped, formatted date
    pub date: String,
    /// Escaped tags
    pub tags: Vec<String>,
    /// Shareable fragment of the post
    pub fragment: String,
    pub active: bool,
}

/// The rendered post list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListView {
    pub rows: Vec<ListRow>,
}

impl ListView {
    /// Mark exactly one row (or none) as active
    pub fn set_active(&mut self, position: Option<usize>) {
        for row in &mut self.rows {
            row.active = Some(row.position) == position;
        }
    }

    /// Position of the active row
    pub fn active(&self) -> Option<usize> {
        self.rows.iter().find(|r| r.active).map(|r| r.position)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Body of the detail pane
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DetailBody {
    Loading,
    /// Rendered post HTML
    Content { html: String },
    /// Escaped error message and a fixed hint
    Error { message: String, hint: String },
}

impl DetailBody {
    pub fn content(html: impl Into<String>) -> Self {
        DetailBody::Content { html: html.into() }
    }

    /// Error body for any displayable failure
    pub fn error(err: &impl std::fmt::Display) -> Self {
        DetailBody::Error {
            message: escape_text(&err.to_string()),
            hint: ERROR_HINT.to_string(),
        }
    }
}

/// The rendered detail pane
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailView {
    pub title: String,
    pub date: String,
    pub tags: Vec<String>,
    pub body: DetailBody,
}

impl DetailView {
    /// Tags joined for the header line
    pub fn tag_line(&self) -> String {
        self.tags.join(" \u{2022} ")
    }
}

/// Build the list view, newest first, with `active` highlighted
pub fn render_list(entries: &[PostDescriptor], active: Option<usize>) -> ListView {
    let rows = sort_by_date(entries.to_vec())
        .into_iter()
        .enumerate()
        .map(|(position, post)| ListRow {
            position,
            title: escape_text(&post.title),
            date: escape_text(&format_date(&post.date)),
            tags: post.tags.iter().map(|t| escape_text(t)).collect(),
            fragment: encode_fragment(&post.source_ref),
            active: Some(position) == active,
        })
        .collect();
    ListView { rows }
}

/// Build the detail view for one post
pub fn render_detail(descriptor: &PostDescriptor, body: DetailBody) -> DetailView {
    DetailView {
        title: escape_text(&descriptor.title),
        date: escape_text(&format_date(&descriptor.date)),
        tags: descriptor.tags.iter().map(|t| escape_text(t)).collect(),
        body,
    }
}

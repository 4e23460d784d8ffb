//! Session controller
//!
//! A [`Session`] holds everything that changes while someone browses the
//! log: which posts are listed, which one is active, the last search query
//! and whether a load is outstanding. Every selection hands out a
//! [`LoadTicket`] stamped with a generation number; a completed load is only
//! applied if no newer selection has been made since.

use crate::catalog::{sort_by_date, Catalog, PostDescriptor};
use crate::content::{ContentSource, LoadError, LoadedPost, Loader};
use crate::helpers::decode_fragment;
use crate::render::{render_detail, render_list, DetailBody, DetailView, ListView};
use crate::search;

/// Whether a post load is outstanding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Browsing,
    Loading { generation: u64 },
}

/// Permission to apply the result of one load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub generation: u64,
    pub position: usize,
    pub descriptor: PostDescriptor,
}

/// Browsing state for one reader
#[derive(Debug, Clone)]
pub struct Session {
    entries: Vec<PostDescriptor>,
    active: Option<usize>,
    query: String,
    state: SessionState,
    generation: u64,
    fragment: Option<String>,
    detail: Option<DetailView>,
}

impl Session {
    /// A browsing session listing the whole catalog, nothing selected
    pub fn new(catalog: &Catalog) -> Self {
        Self {
            entries: catalog.sorted(),
            active: None,
            query: String::new(),
            state: SessionState::Browsing,
            generation: 0,
            fragment: None,
            detail: None,
        }
    }

    /// Start a session, selecting the post named by `fragment` if it exists
    /// in the catalog, otherwise the newest post
    ///
    /// Returns no ticket for an empty catalog.
    pub fn start(catalog: &Catalog, fragment: Option<&str>) -> (Self, Option<LoadTicket>) {
        let mut session = Self::new(catalog);

        let linked = fragment
            .map(decode_fragment)
            .filter(|f| !f.is_empty())
            .and_then(|wanted| session.position_of(&wanted));
        if fragment.is_some() && linked.is_none() {
            tracing::debug!("Fragment {:?} matches no post", fragment);
        }

        let position = linked.or(if session.entries.is_empty() {
            None
        } else {
            Some(0)
        });
        let ticket = position.and_then(|p| session.select(p));
        (session, ticket)
    }

    /// Re-filter the list; the active marker is cleared
    pub fn search(&mut self, catalog: &Catalog, query: &str) -> ListView {
        self.entries = sort_by_date(search::filter(catalog.all(), query));
        self.query = query.to_string();
        self.active = None;
        tracing::debug!("Search {:?} matched {} posts", query, self.entries.len());
        self.list_view()
    }

    /// Select the post at `position` in the displayed list
    ///
    /// The row becomes active right away and the detail pane shows a
    /// loading placeholder until [`Session::complete`] is called.
    pub fn select(&mut self, position: usize) -> Option<LoadTicket> {
        let descriptor = self.entries.get(position)?.clone();

        self.active = Some(position);
        self.generation += 1;
        self.state = SessionState::Loading {
            generation: self.generation,
        };
        self.detail = Some(render_detail(&descriptor, DetailBody::Loading));

        Some(LoadTicket {
            generation: self.generation,
            position,
            descriptor,
        })
    }

    /// Select the post with the given source reference, clearing the search
    /// first if it is filtered out
    pub fn select_source(&mut self, catalog: &Catalog, source_ref: &str) -> Option<LoadTicket> {
        if self.position_of(source_ref).is_none() && catalog.find(source_ref).is_some() {
            self.search(catalog, "");
        }
        let position = self.position_of(source_ref)?;
        self.select(position)
    }

    /// Apply the outcome of a load
    ///
    /// Returns `None` when the ticket is stale: a newer selection was made
    /// while this load was in flight, so its result is dropped.
    pub fn complete(
        &mut self,
        ticket: &LoadTicket,
        result: Result<LoadedPost, LoadError>,
    ) -> Option<DetailView> {
        if ticket.generation != self.generation {
            tracing::debug!(
                "Dropping stale load of {} (generation {} < {})",
                ticket.descriptor.source_ref,
                ticket.generation,
                self.generation
            );
            return None;
        }

        self.state = SessionState::Browsing;
        let body = match result {
            Ok(post) => {
                self.fragment = Some(post.fragment);
                DetailBody::content(post.html)
            }
            Err(e) => {
                tracing::warn!("Failed to load {}: {}", ticket.descriptor.source_ref, e);
                DetailBody::error(&e)
            }
        };

        let view = render_detail(&ticket.descriptor, body);
        self.detail = Some(view.clone());
        Some(view)
    }

    /// Select and load a post in one go
    pub async fn open<S: ContentSource>(
        &mut self,
        position: usize,
        loader: &Loader<S>,
    ) -> Option<DetailView> {
        let ticket = self.select(position)?;
        let result = loader.load(&ticket.descriptor).await;
        self.complete(&ticket, result)
    }

    /// Current list view with the active row marked
    pub fn list_view(&self) -> ListView {
        render_list(&self.entries, self.active)
    }

    /// Current detail pane, if anything has been selected
    pub fn detail(&self) -> Option<&DetailView> {
        self.detail.as_ref()
    }

    pub fn entries(&self) -> &[PostDescriptor] {
        &self.entries
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, SessionState::Loading { .. })
    }

    /// Fragment of the last successfully loaded post
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    fn position_of(&self, source_ref: &str) -> Option<usize> {
        self.entries.iter().position(|p| p.source_ref == source_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::FsSource;
    use crate::helpers::encode_fragment;
    use std::fs;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            PostDescriptor::new("log/posts/old.md", "Old", "2025-01-01").with_tags(["Math"]),
            PostDescriptor::new("log/posts/new.md", "New", "2026-01-01").with_tags(["RC"]),
            PostDescriptor::new("log/posts/mid.md", "Mid", "2025-06-01"),
        ])
    }

    fn loaded(ticket: &LoadTicket, html: &str) -> LoadedPost {
        LoadedPost {
            descriptor: ticket.descriptor.clone(),
            html: html.to_string(),
            fragment: encode_fragment(&ticket.descriptor.source_ref),
        }
    }

    #[test]
    fn test_start_selects_newest() {
        let (session, ticket) = Session::start(&catalog(), None);
        let ticket = ticket.unwrap();
        assert_eq!(ticket.descriptor.source_ref, "log/posts/new.md");
        assert_eq!(ticket.position, 0);
        assert_eq!(session.active(), Some(0));
        assert!(session.is_loading());
        assert_eq!(session.detail().unwrap().body, DetailBody::Loading);
    }

    #[test]
    fn test_start_from_fragment() {
        let fragment = format!("#{}", encode_fragment("log/posts/old.md"));
        let (session, ticket) = Session::start(&catalog(), Some(&fragment));
        let ticket = ticket.unwrap();
        assert_eq!(ticket.descriptor.source_ref, "log/posts/old.md");
        assert_eq!(session.active(), Some(2));
        assert_eq!(session.list_view().active(), Some(2));
    }

    #[test]
    fn test_start_with_unknown_fragment_falls_back_to_newest() {
        let (_, ticket) = Session::start(&catalog(), Some("#log%2Fposts%2Fnope.md"));
        assert_eq!(ticket.unwrap().descriptor.source_ref, "log/posts/new.md");

        let (_, ticket) = Session::start(&catalog(), Some("#"));
        assert_eq!(ticket.unwrap().descriptor.source_ref, "log/posts/new.md");
    }

    #[test]
    fn test_start_with_empty_catalog() {
        let (session, ticket) = Session::start(&Catalog::default(), Some("#x"));
        assert!(ticket.is_none());
        assert!(session.list_view().is_empty());
        assert!(session.detail().is_none());
        assert_eq!(session.state(), SessionState::Browsing);
    }

    #[test]
    fn test_complete_success_returns_to_browsing() {
        let (mut session, ticket) = Session::start(&catalog(), None);
        let ticket = ticket.unwrap();
        let view = session
            .complete(&ticket, Ok(loaded(&ticket, "<p>hi</p>")))
            .unwrap();
        assert_eq!(view.body, DetailBody::content("<p>hi</p>"));
        assert_eq!(session.state(), SessionState::Browsing);
        assert_eq!(session.fragment(), Some("log%2Fposts%2Fnew.md"));
    }

    #[test]
    fn test_complete_failure_keeps_active_row() {
        let (mut session, _) = Session::start(&catalog(), None);
        let ticket = session.select(1).unwrap();
        let err = LoadError::HttpStatus {
            source_ref: ticket.descriptor.source_ref.clone(),
            status: 404,
        };
        let view = session.complete(&ticket, Err(err)).unwrap();
        match view.body {
            DetailBody::Error { message, .. } => assert!(message.contains("404")),
            other => panic!("expected error body, got {:?}", other),
        }
        assert!(!session.is_loading());
        assert_eq!(session.active(), Some(1));
        assert_eq!(session.fragment(), None);
    }

    #[test]
    fn test_stale_load_is_dropped() {
        let (mut session, first) = Session::start(&catalog(), None);
        let first = first.unwrap();
        let second = session.select(2).unwrap();

        // the first request resolves last but is older
        let applied = session.complete(&second, Ok(loaded(&second, "<p>second</p>")));
        assert!(applied.is_some());
        assert!(session
            .complete(&first, Ok(loaded(&first, "<p>first</p>")))
            .is_none());

        assert_eq!(
            session.detail().unwrap().body,
            DetailBody::content("<p>second</p>")
        );
        assert_eq!(session.fragment(), Some("log%2Fposts%2Fold.md"));
    }

    #[test]
    fn test_select_out_of_range() {
        let (mut session, _) = Session::start(&catalog(), None);
        assert!(session.select(3).is_none());
        assert_eq!(session.active(), Some(0));
    }

    #[test]
    fn test_search_filters_and_resets_active() {
        let catalog = catalog();
        let (mut session, _) = Session::start(&catalog, None);
        let view = session.search(&catalog, "rc");
        assert_eq!(view.len(), 1);
        assert_eq!(session.active(), None);
        assert_eq!(session.query(), "rc");
        assert_eq!(session.entries()[0].source_ref, "log/posts/new.md");

        let view = session.search(&catalog, "");
        assert_eq!(view.len(), 3);
    }

    #[test]
    fn test_select_source_clears_hiding_search() {
        let catalog = catalog();
        let (mut session, _) = Session::start(&catalog, None);
        session.search(&catalog, "rc");

        let ticket = session.select_source(&catalog, "log/posts/old.md").unwrap();
        assert_eq!(ticket.position, 2);
        assert_eq!(session.query(), "");
        assert!(session.select_source(&catalog, "log/posts/none.md").is_none());
    }

    #[tokio::test]
    async fn test_open_loads_from_source() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("log/posts")).unwrap();
        fs::write(dir.path().join("log/posts/new.md"), "Hello *there*").unwrap();
        let loader = Loader::new(FsSource::new(dir.path()));

        let mut session = Session::new(&catalog());
        let view = session.open(0, &loader).await.unwrap();
        match view.body {
            DetailBody::Content { html } => assert!(html.contains("<em>there</em>")),
            other => panic!("expected content, got {:?}", other),
        }

        // old.md does not exist on disk
        let view = session.open(2, &loader).await.unwrap();
        match view.body {
            DetailBody::Error { message, .. } => {
                assert_eq!(message, "Cannot load log/posts/old.md (404)")
            }
            other => panic!("expected error, got {:?}", other),
        }
        assert_eq!(session.active(), Some(2));
    }
}

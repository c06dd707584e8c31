//! Per-user query session: current keyword, working set and transcript.
//!
//! A session has exactly one writer. A new search replaces the working set
//! wholesale; nothing is merged or deduplicated.

use crate::models::{Article, Turn};
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct Session {
    keyword: Option<String>,
    articles: Vec<Article>,
    transcript: Vec<Turn>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keyword(&self) -> Option<&str> {
        self.keyword.as_deref()
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    pub fn has_articles(&self) -> bool {
        !self.articles.is_empty()
    }

    /// Install the result of a search. The transcript is kept.
    pub fn replace_working_set(&mut self, keyword: impl Into<String>, articles: Vec<Article>) {
        self.keyword = Some(keyword.into());
        self.articles = articles;
    }

    pub fn push_turn(&mut self, turn: Turn) {
        self.transcript.push(turn);
    }

    /// Clear keyword, working set and transcript.
    pub fn reset(&mut self) {
        self.keyword = None;
        self.articles.clear();
        self.transcript.clear();
    }
}

//! Integration tests for the repository section of a page.

#[path = "repos/page_topics.rs"]
mod page_topics;

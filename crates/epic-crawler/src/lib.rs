//! Epic Crawler - dependency graphs for Jira epics.
//!
//! Starting from one epic, the crawler collects the epic's member issues and
//! every issue blocking them, then renders the result as a Graphviz graph:
//! nodes colored by workflow status, blockers owned by other epics grouped
//! into one labeled cluster per epic.
//!
//! The crate provides both the `epic-crawler` CLI and a library. The crawl
//! core talks to the tracker through [`tracker::TrackerQueryPort`] and to the
//! layout engine through [`render::GraphRenderPort`].

#![forbid(unsafe_code)]

// Public modules for library usage
pub mod config;
pub mod crawl;
pub mod domain;
pub mod error;
pub mod graph;
pub mod render;
pub mod tracker;

// Public CLI module (needed by binary)
pub mod cli;

// Application context
pub mod app;

pub mod output;

//! slidekit core - slide boundary parsing and layout rewriting
//!
//! This crate contains the text-level logic for slidekit, independent of any
//! editing surface:
//! - Depth-matching span finder and slide boundary location
//! - Title / body / footer fragment extraction
//! - Two-column image layout
//! - Footer page renumbering
//! - Document model, templates, image references and configuration
//!
//! Every transformation takes the whole buffer and returns a new one.

pub mod config;
pub mod diff;
pub mod doc;
pub mod fragment;
pub mod images;
pub mod layout;
pub mod locate;
pub mod paging;
pub mod span;
pub mod template;

// Re-export commonly used types
pub use config::Config;
pub use doc::Document;
pub use fragment::{extract_fragments, Fragments};
pub use layout::{split_slide, to_split_layout};
pub use locate::{locate_slide, resolve_insert_offset, slide_spans, SlideSpan};
pub use paging::{renumber_pages, renumber_pages_with, PageStyle, Period};
pub use span::{DepthMatcher, MatchFinder};

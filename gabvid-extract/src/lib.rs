//! Video URL extraction from saved HTML pages.
//!
//! - [`VideoExtractor`] looks up `<meta property=... content=...>` tags in a
//!   configurable priority order (`og:video`, then `video` by default)
//! - [`extract_video_url`] / [`extract_video_url_from_file`] expose the plain
//!   string contract where an empty string means "not found"
//!
//! Parsing is done with `scraper` (html5ever), which never rejects input;
//! malformed markup simply yields fewer matches.

pub mod extract;

pub use extract::{
    DEFAULT_PROPERTIES, VideoExtractor, VideoMatch, extract_video_url,
    extract_video_url_from_file, read_document,
};

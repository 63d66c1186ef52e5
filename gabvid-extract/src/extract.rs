use std::io::ErrorKind;
use std::path::Path;
use std::sync::LazyLock;

use gabvid_common::{GabvidError, Result};
use scraper::{Html, Selector};
use tracing::{debug, error, warn};

/// Meta `property` values consulted when nothing else is configured, highest
/// priority first.
pub const DEFAULT_PROPERTIES: [&str; 2] = ["og:video", "video"];

static META: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("meta").expect("`meta` is a valid selector"));

/// A `<meta>` tag that yielded a video URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoMatch {
    /// The `property` value that matched, e.g. `og:video`.
    pub property: String,
    /// The tag's `content` attribute.
    pub url: String,
}

/// Looks up video URLs in meta tags, consulting `properties` in order.
#[derive(Debug, Clone)]
pub struct VideoExtractor {
    properties: Vec<String>,
}

impl Default for VideoExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoExtractor {
    /// Extractor for `og:video`, falling back to `video`.
    pub fn new() -> Self {
        Self {
            properties: DEFAULT_PROPERTIES.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Extractor with a custom lookup order. The list must not be empty.
    ///
    /// ```
    /// use gabvid_extract::VideoExtractor;
    ///
    /// let extractor = VideoExtractor::with_properties(["og:video:secure_url", "og:video"]).unwrap();
    /// let html = r#"<meta property="og:video" content="http://a/v.mp4">
    ///               <meta property="og:video:secure_url" content="https://a/v.mp4">"#;
    /// assert_eq!(extractor.extract(html).unwrap().url, "https://a/v.mp4");
    ///
    /// assert!(VideoExtractor::with_properties(Vec::<String>::new()).is_err());
    /// ```
    pub fn with_properties<I, S>(properties: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let properties: Vec<String> = properties.into_iter().map(Into::into).collect();
        if properties.is_empty() {
            return Err(GabvidError::Config(
                "at least one meta property must be configured".into(),
            ));
        }
        Ok(Self { properties })
    }

    pub fn properties(&self) -> &[String] {
        &self.properties
    }

    /// Find the video URL in `html`.
    ///
    /// For each property in priority order, the first `<meta>` carrying it is
    /// consulted. If that tag has a `content` attribute its value is the
    /// answer, and an empty value means "not found". Only a missing attribute
    /// moves on to the next property.
    pub fn extract(&self, html: &str) -> Option<VideoMatch> {
        let document = Html::parse_document(html);

        for property in &self.properties {
            let tag = document
                .select(&META)
                .find(|el| el.value().attr("property") == Some(property.as_str()));

            let Some(tag) = tag else {
                continue;
            };

            let Some(content) = tag.value().attr("content") else {
                debug!(property = %property, "meta tag has no content attribute");
                continue;
            };

            // a present attribute settles the lookup, even when it is empty
            if content.is_empty() {
                warn!(property = %property, "{property} meta tag has empty content");
                return None;
            }

            debug!(property = %property, "Found video URL in {property} meta tag");
            return Some(VideoMatch {
                property: property.clone(),
                url: content.to_string(),
            });
        }

        warn!("No video URL found in HTML content");
        None
    }

    /// Read `path` and extract from it. Read failures are logged and reported
    /// as "not found".
    pub fn extract_from_file(&self, path: impl AsRef<Path>) -> Option<VideoMatch> {
        let path = path.as_ref();
        debug!(file = %path.display(), "extracting video url");

        match read_document(path) {
            Ok(html) => self.extract(&html),
            Err(GabvidError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
                error!("File not found: {}", path.display());
                None
            }
            Err(e) => {
                error!("Error processing file: {e}");
                None
            }
        }
    }
}

/// Load an HTML document as UTF-8 text.
pub fn read_document(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| GabvidError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    String::from_utf8(bytes).map_err(|_| GabvidError::Decode {
        path: path.to_path_buf(),
    })
}

/// Video URL from `html`, or an empty string when none is present.
///
/// ```
/// let html = r#"<meta property="og:video" content="https://example.com/v.mp4">"#;
/// assert_eq!(gabvid_extract::extract_video_url(html), "https://example.com/v.mp4");
/// assert_eq!(gabvid_extract::extract_video_url("<p>nothing</p>"), "");
/// ```
pub fn extract_video_url(html: &str) -> String {
    VideoExtractor::new()
        .extract(html)
        .map(|m| m.url)
        .unwrap_or_default()
}

/// Video URL from the file at `path`, or an empty string when none is present
/// or the file cannot be read.
pub fn extract_video_url_from_file(path: impl AsRef<Path>) -> String {
    VideoExtractor::new()
        .extract_from_file(path)
        .map(|m| m.url)
        .unwrap_or_default()
}

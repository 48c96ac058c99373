//! Content file transformation pipeline.
//!
//! Takes one XHTML content file as text and rewrites it for Kobo
//! firmware: wrapper divs for column layout, per-sentence kobo spans,
//! the kobo stylesheet rule, artifact cleanup, and literal fixups on the
//! serialized output. Stages run in a fixed order and the first failure
//! aborts the whole transform.

pub mod clean;
pub mod fixup;
pub mod spans;
pub mod style;
pub mod wrap;

use crate::error::Result;
use crate::html;

/// Configuration for content transformation.
#[derive(Debug, Clone)]
pub struct TransformConfig {
    /// Replace dash runs with en/em dash entities after serialization.
    pub smarten_punctuation: bool,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            smarten_punctuation: true,
        }
    }
}

/// Content file transformer.
///
/// # Example
///
/// ```
/// use kepub::ContentTransformer;
///
/// let transformer = ContentTransformer::new();
/// let output = transformer
///     .transform("<html><body><p>Hello world. Bye!</p></body></html>")
///     .unwrap();
/// assert!(output.contains(r#"<span class="koboSpan" id="kobo.1.1">"#));
/// ```
pub struct ContentTransformer {
    config: TransformConfig,
}

impl ContentTransformer {
    /// Create a transformer with the default configuration.
    pub fn new() -> Self {
        Self {
            config: TransformConfig::default(),
        }
    }

    /// Configure the transformer with custom settings.
    pub fn with_config(mut self, config: TransformConfig) -> Self {
        self.config = config;
        self
    }

    /// Rewrite one content file.
    pub fn transform(&self, content: &str) -> Result<String> {
        let dom = html::parse_html(content);

        wrap::add_divs(&dom);
        spans::add_spans(&dom);
        style::add_kobo_styles(&dom)?;
        clean::clean_html(&dom);

        let markup = html::serialize_html(&dom);
        Ok(fixup::fix_markup(&markup, self.config.smarten_punctuation))
    }
}

impl Default for ContentTransformer {
    fn default() -> Self {
        Self::new()
    }
}

/// Rewrite one content file with the default configuration.
pub fn transform_content(content: &str) -> Result<String> {
    ContentTransformer::new().transform(content)
}

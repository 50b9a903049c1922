//! Family Tree Layout - a genealogical layout engine
//!
//! This library infers generations from loose family records, groups children
//! under their parents' unions, assigns non-overlapping grid positions and
//! routes orthogonal connectors. A TOML document parser and an SVG renderer
//! sit on top of the engine.
//!
//! # Example
//!
//! ```rust
//! use family_tree_layout::render;
//!
//! let svg = render(r#"
//! [[person]]
//! id = "me"
//! relation = "self"
//! "#).unwrap();
//! assert!(svg.contains("<svg"));
//! ```

pub mod error;
pub mod layout;
pub mod model;
pub mod parser;
pub mod renderer;
pub mod stylesheet;

pub use error::ParseError;
pub use layout::{layout_family, FamilyLayout, LayoutConfig, LintWarning};
pub use model::{
    Family, PartnershipKind, PartnershipRecord, Person, PersonId, Relation, ValidationError,
};
pub use parser::{parse, Document};
pub use renderer::{render_svg, SvgConfig};

use thiserror::Error;
use tracing::info;

// Re-export Stylesheet for public API
pub use stylesheet::Stylesheet;

/// Errors that can occur during the render pipeline
#[derive(Debug, Error)]
pub enum RenderError {
    /// Error while parsing the document
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The records could not be validated
    #[error("invalid family: {0}")]
    Validation(#[from] ValidationError),
}

/// Configuration for the complete render pipeline
#[derive(Debug, Clone, Default)]
pub struct RenderConfig {
    /// Layout configuration; a document's `[layout]` table overrides it
    pub layout: LayoutConfig,
    /// SVG output configuration
    pub svg: SvgConfig,
    /// Stylesheet for color resolution
    pub stylesheet: Stylesheet,
    /// Debug mode: log the computed grid
    pub debug: bool,
}

impl RenderConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the layout configuration
    pub fn with_layout(mut self, config: LayoutConfig) -> Self {
        self.layout = config;
        self
    }

    /// Set the SVG configuration
    pub fn with_svg(mut self, config: SvgConfig) -> Self {
        self.svg = config;
        self
    }

    /// Set the stylesheet for color resolution
    pub fn with_stylesheet(mut self, stylesheet: Stylesheet) -> Self {
        self.stylesheet = stylesheet;
        self
    }

    /// Enable or disable debug mode
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

/// A document run through the layout engine
#[derive(Debug, Clone)]
pub struct LaidOut {
    pub family: Family,
    pub layout: FamilyLayout,
    /// Layout configuration after the document's overrides
    pub config: LayoutConfig,
}

/// Parse a document and compute its layout
pub fn layout_document(source: &str, base: &LayoutConfig) -> Result<LaidOut, RenderError> {
    let doc = parse(source)?;
    let config = doc.layout_config(base.clone());
    let (people, partnerships) = doc.records();
    let family = Family::new(&people, &partnerships)?;
    let layout = layout::compute(&family, &config);
    Ok(LaidOut {
        family,
        layout,
        config,
    })
}

/// Render a family document to SVG with default configuration
///
/// This is the main entry point for the library. It parses the document,
/// computes the layout, and generates SVG output.
pub fn render(source: &str) -> Result<String, RenderError> {
    render_with_config(source, RenderConfig::default())
}

/// Render a family document to SVG with custom configuration
///
/// # Example
///
/// ```rust
/// use family_tree_layout::{render_with_config, LayoutConfig, RenderConfig, SvgConfig};
///
/// let config = RenderConfig::new()
///     .with_layout(LayoutConfig::default().with_cell_size(200.0, 140.0))
///     .with_svg(SvgConfig::default().with_viewbox_padding(10.0));
///
/// let svg = render_with_config("[[person]]\nid = \"a\"\n", config).unwrap();
/// assert!(svg.contains("<svg"));
/// ```
pub fn render_with_config(source: &str, config: RenderConfig) -> Result<String, RenderError> {
    render_with_lint(source, config).map(|(svg, _)| svg)
}

/// Render a family document and also return layout lint warnings
pub fn render_with_lint(
    source: &str,
    config: RenderConfig,
) -> Result<(String, Vec<LintWarning>), RenderError> {
    let laid_out = layout_document(source, &config.layout)?;

    if config.debug {
        for line in laid_out.layout.describe().lines() {
            info!("{}", line);
        }
    }

    let warnings = layout::lint::check(&laid_out.family, &laid_out.layout, &laid_out.config);
    let svg = render_svg(
        &laid_out.family,
        &laid_out.layout,
        &config.svg,
        &config.stylesheet,
    );
    Ok((svg, warnings))
}

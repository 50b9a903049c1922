//! SVG renderer for family layouts
//!
//! This module takes a FamilyLayout and produces an SVG string with CSS
//! classes for styling. It only reads geometry; nothing here feeds back
//! into the layout.

pub mod config;
pub mod svg;

pub use config::SvgConfig;
pub use svg::{person_label, render_svg};

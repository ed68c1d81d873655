//! `AsciiDoc` output.
//!
//! [`SectionBody`] renders the requirement forest of one Section;
//! [`Document`] assembles the header, the optional changelog, and every
//! Part into a single document.

mod document;
mod section;

pub use document::{Document, RenderError};
pub use section::SectionBody;

/// Deepest heading `AsciiDoc` supports (`======`).
///
/// Headings nested below it share this level. Requirement children blocks
/// still show the nesting.
const MAX_HEADING_DEPTH: usize = 6;

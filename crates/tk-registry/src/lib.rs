//! Layer and area-list registry for TrakEM2 project files.
//!
//! Loading is a single extraction pass over the XML document. Everything the
//! adjacency pipeline needs (layer transforms, area-list transforms, and the
//! raw `t2_path@d` strings grouped by layer) is copied into owned data, so
//! the parsed document is never shared with worker threads.
//!
//! Path strings use TrakEM2's mini-language `M x y L x y ... z`. A path that
//! does not follow it is skipped with a warning; it never fails the layer.

mod encoding;
mod parse;
mod registry;
mod xml;

pub use encoding::decode_document;
pub use parse::{parse_path, parse_translation};
pub use registry::{AreaList, Calibration, Layer, LayerSetDims, Registry, RegistryConfig};

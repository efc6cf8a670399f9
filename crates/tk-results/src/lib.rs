//! Adjacency result documents.
//!
//! A result document is a `<data>` root holding one `<layer name="...">`
//! element per processed layer:
//!
//! ```text
//! <data><layer name="N2U_001"><area><cell1>ADAL</cell1><cell2>AVAL</cell2>
//! <index1>0</index1><index2>0</index2><adjacency>12</adjacency></area></layer></data>
//! ```
//!
//! [`ResultDocument`] keeps the source text of every layer it has not been
//! asked to replace, so rewriting a document after reprocessing one layer
//! leaves all other layers byte-for-byte intact.

mod csv;
mod document;

pub use csv::{export_csv, write_csv};
pub use document::ResultDocument;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use tk_core::Error;

use crate::ResultDocument;

/// Writes one `cell1,cell2,index1,index2,layer,adjacency` row per record,
/// layers in ascending name order, records in stored order. No header row.
/// Rows end in `\n`, not the `\r\n` some CSV writers emit, so byte-level
/// comparisons against such files must normalize line endings first.
/// Returns the number of rows written.
pub fn write_csv<W: Write>(doc: &ResultDocument, mut out: W) -> Result<usize, Error> {
    let mut layers = doc.layer_names();
    layers.sort_unstable();
    layers.dedup();

    let mut rows = 0;
    for layer in layers {
        for r in doc.records(layer)?.unwrap_or_default() {
            writeln!(
                out,
                "{},{},{},{},{},{}",
                field(&r.cell1),
                field(&r.cell2),
                r.index1,
                r.index2,
                field(layer),
                r.adjacency
            )?;
            rows += 1;
        }
    }
    out.flush()?;
    Ok(rows)
}

/// Converts the result document at `input` into a CSV file at `output`.
pub fn export_csv(input: &Path, output: &Path) -> Result<usize, Error> {
    let doc = ResultDocument::parse(&fs::read_to_string(input)?)?;
    let file = File::create(output)?;
    write_csv(&doc, BufWriter::new(file))
}

/// Quotes a field only when it holds a delimiter, quote or line break.
fn field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_owned()
    }
}

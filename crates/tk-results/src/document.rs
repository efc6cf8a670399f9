use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use quick_xml::Reader;
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use tk_core::{AdjacencyRecord, Error};

#[derive(Debug, Clone, PartialEq)]
enum Node {
    /// Verbatim text of a child element read from an existing document.
    Raw { layer: Option<String>, xml: String },
    /// Layer produced during this run.
    Fresh {
        layer: String,
        records: Vec<AdjacencyRecord>,
    },
}

impl Node {
    fn layer(&self) -> Option<&str> {
        match self {
            Node::Raw { layer, .. } => layer.as_deref(),
            Node::Fresh { layer, .. } => Some(layer),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultDocument {
    nodes: Vec<Node>,
}

impl ResultDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `path`, or starts an empty document when it does not exist.
    pub fn open(path: &Path) -> Result<Self, Error> {
        if !path.exists() {
            debug!("{} not found; starting a new result document", path.display());
            return Ok(Self::new());
        }
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn parse(xml: &str) -> Result<Self, Error> {
        let mut reader = Reader::from_str(xml);
        let mut nodes = Vec::new();
        let mut depth = 0usize;
        let mut seen_root = false;
        let mut open_child: Option<(usize, Option<String>)> = None;

        loop {
            let event = reader
                .read_event()
                .map_err(|err| Error::Xml(format!("at byte {}: {err}", reader.buffer_position())))?;
            let end = reader.buffer_position() as usize;

            match event {
                Event::Start(e) => {
                    match depth {
                        0 => check_root(&e, &mut seen_root)?,
                        1 => open_child = Some((tag_start(xml, end), layer_attr(&e)?)),
                        _ => {}
                    }
                    depth += 1;
                }
                Event::Empty(e) => match depth {
                    0 => check_root(&e, &mut seen_root)?,
                    1 => nodes.push(Node::Raw {
                        layer: layer_attr(&e)?,
                        xml: xml[tag_start(xml, end)..end].to_owned(),
                    }),
                    _ => {}
                },
                Event::End(_) => {
                    depth = depth.saturating_sub(1);
                    if depth == 1
                        && let Some((start, layer)) = open_child.take()
                    {
                        nodes.push(Node::Raw {
                            layer,
                            xml: xml[start..end].to_owned(),
                        });
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if depth != 0 {
            return Err(Error::Xml(format!("{depth} unclosed element(s) at end of document")));
        }
        if !seen_root {
            return Err(Error::UnexpectedRoot {
                expected: "data",
                actual: String::new(),
            });
        }
        Ok(Self { nodes })
    }

    /// Layer names in document order.
    pub fn layer_names(&self) -> Vec<&str> {
        self.nodes.iter().filter_map(Node::layer).collect()
    }

    pub fn contains_layer(&self, layer: &str) -> bool {
        self.nodes.iter().any(|n| n.layer() == Some(layer))
    }

    pub fn num_layers(&self) -> usize {
        self.layer_names().len()
    }

    /// Replaces the content of `layer`, or appends it when absent.
    ///
    /// Records are stored sorted by `(cell1, index1, cell2, index2)`. Repeated
    /// occurrences of `layer` after the first are dropped.
    pub fn replace_layer(&mut self, layer: &str, mut records: Vec<AdjacencyRecord>) {
        records.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        let fresh = Node::Fresh {
            layer: layer.to_owned(),
            records,
        };

        match self.nodes.iter().position(|n| n.layer() == Some(layer)) {
            Some(first) => {
                self.nodes[first] = fresh;
                let before = self.nodes.len();
                let mut i = 0;
                self.nodes.retain(|n| {
                    let keep = i <= first || n.layer() != Some(layer);
                    i += 1;
                    keep
                });
                if self.nodes.len() != before {
                    warn!("layer {layer} appeared more than once; extra copies removed");
                }
            }
            None => self.nodes.push(fresh),
        }
    }

    /// Adjacency records stored for `layer`, or `None` when it is absent.
    pub fn records(&self, layer: &str) -> Result<Option<Vec<AdjacencyRecord>>, Error> {
        let Some(node) = self.nodes.iter().find(|n| n.layer() == Some(layer)) else {
            return Ok(None);
        };
        match node {
            Node::Fresh { records, .. } => Ok(Some(records.clone())),
            Node::Raw { xml, .. } => parse_records(layer, xml).map(Some),
        }
    }

    /// Serializes without an XML declaration or indentation.
    pub fn to_xml_string(&self) -> String {
        if self.nodes.is_empty() {
            return "<data/>".to_owned();
        }
        let mut out = String::from("<data>");
        for node in &self.nodes {
            match node {
                Node::Raw { xml, .. } => out.push_str(xml),
                Node::Fresh { layer, records } => write_layer(&mut out, layer, records),
            }
        }
        out.push_str("</data>");
        out
    }

    /// Writes the document through a sibling temporary file so that an
    /// interrupted save leaves the previous file in place.
    pub fn save(&self, path: &Path) -> Result<(), Error> {
        let tmp = tmp_path(path);
        fs::write(&tmp, self.to_xml_string())?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

fn check_root(e: &BytesStart<'_>, seen_root: &mut bool) -> Result<(), Error> {
    let name = e.name();
    if name.as_ref() != b"data" {
        return Err(Error::UnexpectedRoot {
            expected: "data",
            actual: String::from_utf8_lossy(name.as_ref()).into_owned(),
        });
    }
    *seen_root = true;
    Ok(())
}

fn layer_attr(e: &BytesStart<'_>) -> Result<Option<String>, Error> {
    if e.name().as_ref() != b"layer" {
        return Ok(None);
    }
    for a in e.attributes() {
        let a = a.map_err(|err| Error::Xml(err.to_string()))?;
        if a.key.as_ref() == b"name" {
            let value = a.unescape_value().map_err(|err| Error::Xml(err.to_string()))?;
            return Ok(Some(value.into_owned()));
        }
    }
    warn!("layer element without a name attribute kept as-is");
    Ok(None)
}

/// Offset of the `<` opening the tag that ends at `end`. Attribute values
/// cannot contain a raw `<`, so the last one before `end` is the tag's own.
fn tag_start(xml: &str, end: usize) -> usize {
    xml[..end].rfind('<').unwrap_or(0)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

fn write_layer(out: &mut String, layer: &str, records: &[AdjacencyRecord]) {
    let name = escape(layer);
    if records.is_empty() {
        out.push_str(&format!("<layer name=\"{name}\"/>"));
        return;
    }
    out.push_str(&format!("<layer name=\"{name}\">"));
    for r in records {
        out.push_str(&format!(
            "<area><cell1>{}</cell1><cell2>{}</cell2><index1>{}</index1><index2>{}</index2><adjacency>{}</adjacency></area>",
            escape(&r.cell1),
            escape(&r.cell2),
            r.index1,
            r.index2,
            r.adjacency
        ));
    }
    out.push_str("</layer>");
}

#[derive(Default)]
struct PartialRecord {
    cell1: Option<String>,
    cell2: Option<String>,
    index1: Option<String>,
    index2: Option<String>,
    adjacency: Option<String>,
}

impl PartialRecord {
    fn slot(&mut self, field: &[u8]) -> Option<&mut Option<String>> {
        match field {
            b"cell1" => Some(&mut self.cell1),
            b"cell2" => Some(&mut self.cell2),
            b"index1" => Some(&mut self.index1),
            b"index2" => Some(&mut self.index2),
            b"adjacency" => Some(&mut self.adjacency),
            _ => None,
        }
    }

    fn finish(self, layer: &str) -> Result<AdjacencyRecord, Error> {
        let text = |v: Option<String>, field: &str| {
            v.ok_or_else(|| Error::MalformedRecord {
                layer: layer.to_owned(),
                reason: format!("missing {field}"),
            })
        };
        let count = |v: Option<String>, field: &str| {
            let v = text(v, field)?;
            v.trim().parse::<usize>().map_err(|_| Error::MalformedRecord {
                layer: layer.to_owned(),
                reason: format!("{field} '{v}' is not a count"),
            })
        };
        Ok(AdjacencyRecord {
            cell1: text(self.cell1, "cell1")?,
            cell2: text(self.cell2, "cell2")?,
            index1: count(self.index1, "index1")?,
            index2: count(self.index2, "index2")?,
            adjacency: count(self.adjacency, "adjacency")?,
        })
    }
}

fn parse_records(layer: &str, xml: &str) -> Result<Vec<AdjacencyRecord>, Error> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut records = Vec::new();
    let mut current: Option<PartialRecord> = None;
    let mut field: Option<Vec<u8>> = None;
    loop {
        match reader.read_event().map_err(|err| Error::Xml(err.to_string()))? {
            Event::Start(e) => match e.name().as_ref() {
                b"area" => current = Some(PartialRecord::default()),
                name if current.is_some() => field = Some(name.to_vec()),
                _ => {}
            },
            Event::Text(t) => {
                if let (Some(rec), Some(name)) = (current.as_mut(), field.as_deref())
                    && let Some(slot) = rec.slot(name)
                {
                    let value = t.unescape().map_err(|err| Error::Xml(err.to_string()))?;
                    *slot = Some(value.into_owned());
                }
            }
            Event::End(e) => {
                if e.name().as_ref() == b"area" {
                    if let Some(rec) = current.take() {
                        records.push(rec.finish(layer)?);
                    }
                } else {
                    field = None;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(records)
}

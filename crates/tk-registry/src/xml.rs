use log::warn;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tk_core::{Error, Offset2d};

use crate::parse::parse_translation;
use crate::registry::{AreaList, Calibration, Layer, LayerSetDims, Registry, RegistryConfig};

struct PendingLayer {
    oid: String,
    z: f64,
    thickness: f64,
    patch: Option<PatchInfo>,
}

struct PatchInfo {
    name: String,
    transform: Offset2d,
    width: f64,
    height: f64,
}

#[derive(Default)]
struct Extractor {
    registry: Registry,
    layer: Option<PendingLayer>,
    area_list: Option<AreaList>,
    area_layer: Option<String>,
}

pub(crate) fn extract(xml: &str, cfg: &RegistryConfig) -> Result<Registry, Error> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut ex = Extractor::default();
    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(err) => {
                return Err(Error::Xml(format!(
                    "at byte {}: {err}",
                    reader.buffer_position()
                )));
            }
        };

        match event {
            Event::Start(e) => ex.open(&e)?,
            Event::Empty(e) => {
                ex.open(&e)?;
                ex.close(e.name().as_ref(), cfg);
            }
            Event::End(e) => ex.close(e.name().as_ref(), cfg),
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(ex.registry)
}

impl Extractor {
    fn open(&mut self, e: &BytesStart<'_>) -> Result<(), Error> {
        match e.name().as_ref() {
            b"t2_layer_set" => {
                let width = attr(e, "layer_width")?;
                let height = attr(e, "layer_height")?;
                if let (Some(w), Some(h)) = (width, height) {
                    self.registry.layer_set = Some(LayerSetDims {
                        width: number("layer_width", &w)?,
                        height: number("layer_height", &h)?,
                    });
                }
            }
            b"t2_calibration" => {
                self.registry.calibration = Some(Calibration {
                    pixel_width: optional_number(e, "pixelWidth", 1.0)?,
                    pixel_height: optional_number(e, "pixelHeight", 1.0)?,
                    pixel_depth: optional_number(e, "pixelDepth", 1.0)?,
                });
            }
            b"t2_layer" => {
                self.layer = Some(PendingLayer {
                    oid: required(e, "t2_layer", "oid")?,
                    z: optional_number(e, "z", 0.0)?,
                    thickness: optional_number(e, "thickness", 0.0)?,
                    patch: None,
                });
            }
            b"t2_patch" => {
                let Some(layer) = self.layer.as_mut() else {
                    return Ok(());
                };
                if layer.patch.is_some() {
                    return Ok(());
                }

                let title = required(e, "t2_patch", "title")?;
                let transform = match attr(e, "transform")? {
                    Some(t) => parse_translation(&t)?,
                    None => Offset2d::default(),
                };
                layer.patch = Some(PatchInfo {
                    name: title.strip_suffix(".tif").unwrap_or(&title).to_owned(),
                    transform,
                    width: optional_number(e, "width", 0.0)?,
                    height: optional_number(e, "height", 0.0)?,
                });
            }
            b"t2_area_list" => {
                let title = required(e, "t2_area_list", "title")?;
                let transform = match attr(e, "transform")? {
                    Some(t) => parse_translation(&t)?,
                    None => Offset2d::default(),
                };
                self.area_list = Some(AreaList::new(title, transform));
            }
            b"t2_area" if self.area_list.is_some() => {
                self.area_layer = Some(required(e, "t2_area", "layer_id")?);
            }
            b"t2_path" => {
                if let (Some(area_list), Some(layer_oid)) =
                    (self.area_list.as_mut(), self.area_layer.as_ref())
                    && let Some(d) = attr(e, "d")?
                {
                    area_list.add_path(layer_oid.clone(), d);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn close(&mut self, name: &[u8], cfg: &RegistryConfig) {
        match name {
            b"t2_layer" => {
                let Some(pending) = self.layer.take() else {
                    return;
                };
                match pending.patch {
                    Some(patch) => self.registry.insert_layer(Layer {
                        name: patch.name,
                        oid: pending.oid,
                        transform: patch.transform,
                        width: patch.width,
                        height: patch.height,
                        z: pending.z,
                        thickness: pending.thickness,
                    }),
                    None => warn!("layer oid={} has no image patch; skipped", pending.oid),
                }
            }
            b"t2_area" => self.area_layer = None,
            b"t2_area_list" => {
                if let Some(area_list) = self.area_list.take() {
                    self.registry.insert_area_list(area_list, cfg);
                }
            }
            _ => {}
        }
    }
}

fn attr(e: &BytesStart<'_>, key: &str) -> Result<Option<String>, Error> {
    for a in e.attributes() {
        let a = a.map_err(|err| Error::Xml(err.to_string()))?;
        if a.key.as_ref() == key.as_bytes() {
            let value = a.unescape_value().map_err(|err| Error::Xml(err.to_string()))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn required(
    e: &BytesStart<'_>,
    element: &'static str,
    attribute: &'static str,
) -> Result<String, Error> {
    attr(e, attribute)?.ok_or(Error::MissingAttribute { element, attribute })
}

fn optional_number(e: &BytesStart<'_>, key: &'static str, default: f64) -> Result<f64, Error> {
    match attr(e, key)? {
        Some(v) => number(key, &v),
        None => Ok(default),
    }
}

fn number(what: &'static str, value: &str) -> Result<f64, Error> {
    value.trim().parse().map_err(|_| Error::InvalidNumber {
        what,
        value: value.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use tk_boundary::BoundaryConfig;
    use tk_core::{Error, Offset2d};

    use crate::{Registry, RegistryConfig};

    const PROJECT: &str = r#"<?xml version="1.0" encoding="ISO-8859-1"?>
<!DOCTYPE trakem2_anything [
  <!ELEMENT trakem2 (project,t2_layer_set,t2_display)>
  <!ATTLIST t2_layer oid NMTOKEN #REQUIRED>
]>
<trakem2>
  <project id="0" title="test.xml"/>
  <t2_layer_set oid="3" layer_width="2048.0" layer_height="1536.0">
    <t2_calibration pixelWidth="2.0" pixelHeight="2.0" pixelDepth="50.0" unit="nm"/>
    <t2_layer oid="10" thickness="1.0" z="0.0" title="">
      <t2_patch oid="20" width="2048.0" height="1536.0" transform="matrix(1.0,0.0,0.0,1.0,12.0,-4.0)" title="N2U_001.tif"/>
    </t2_layer>
    <t2_layer oid="11" thickness="1.0" z="1.0" title="">
      <t2_patch oid="21" width="2048.0" height="1536.0" transform="matrix(1.0,0.0,0.0,1.0,0.0,0.0)" title="N2U_002.tif"/>
    </t2_layer>
    <t2_layer oid="12" thickness="1.0" z="2.0" title=""/>
    <t2_area_list oid="30" layer_set_id="3" transform="matrix(1.0,0.0,0.0,1.0,100.7,200.2)" title="AVAL" style="fill:#ff0000;">
      <t2_area layer_id="10">
        <t2_path d="M 0 0 L 0 20 L 20 20 L 20 0 z"/>
        <t2_path d="M 40 40 L 40 60 L 60 60 L 60 40 z"/>
      </t2_area>
      <t2_area layer_id="11">
        <t2_path d="M 0 0 L 0 20 L 20 20 L 20 0 z"/>
      </t2_area>
    </t2_area_list>
    <t2_area_list oid="31" layer_set_id="3" transform="matrix(1.0,0.0,0.0,1.0,0.0,0.0)" title="area_list"/>
    <t2_area_list oid="32" layer_set_id="3" transform="matrix(1.0,0.0,0.0,1.0,0.0,0.0)" title="ADAL">
      <t2_area layer_id="10">
        <t2_path d="M 200 200 L 200 230 L 230 230 L 230 200 z"/>
      </t2_area>
    </t2_area_list>
  </t2_layer_set>
</trakem2>
"#;

    #[test]
    fn extracts_layers_area_lists_and_calibration() {
        let reg = Registry::from_xml(PROJECT, &RegistryConfig::default()).expect("valid project");

        assert_eq!(reg.layer_names(), vec!["N2U_001", "N2U_002"]);
        let l1 = reg.layer("N2U_001").expect("layer present");
        assert_eq!(l1.oid, "10");
        assert_eq!(l1.transform, Offset2d::new(12.0, -4.0));
        assert_eq!(l1.width, 2048.0);
        assert_eq!(reg.layer("N2U_002").map(|l| l.z), Some(1.0));

        let cal = reg.calibration().expect("calibration present");
        assert_eq!(cal.pixel_depth, 50.0);
        assert_eq!(reg.layer_set_dims().map(|d| d.height), Some(1536.0));

        assert_eq!(reg.num_area_lists(), 2);
        let aval = reg.area_list("AVAL").expect("AVAL present");
        assert_eq!(aval.transform, Offset2d::new(100.0, 200.0));
        assert_eq!(aval.paths_in("10").len(), 2);
        assert_eq!(reg.paths("N2U_002", "AVAL").len(), 1);
        assert!(reg.paths("N2U_002", "ADAL").is_empty());
    }

    #[test]
    fn boundaries_from_document() {
        let reg = Registry::from_xml(PROJECT, &RegistryConfig::default()).expect("valid project");
        let lb = reg
            .boundaries_in_layer("N2U_001", &BoundaryConfig::default(), None)
            .expect("known layer");

        assert_eq!(lb.get("AVAL").len(), 2);
        assert_eq!(lb.get("ADAL").len(), 1);
        let first = &lb.get("AVAL")[0];
        assert_eq!(first.vertices()[0].x, 100.0);
        assert_eq!(first.transform(), Offset2d::new(12.0, -4.0));
    }

    #[test]
    fn missing_required_attribute() {
        let xml = r#"<trakem2><t2_layer_set><t2_area_list oid="1"/></t2_layer_set></trakem2>"#;
        let err = Registry::from_xml(xml, &RegistryConfig::default()).expect_err("no title");
        assert_eq!(
            err,
            Error::MissingAttribute {
                element: "t2_area_list",
                attribute: "title"
            }
        );
    }

    #[test]
    fn latin1_project_bytes_load() {
        let bytes = PROJECT.replace("title=\"ADAL\"", "title=\"Caf@\"").into_bytes();
        let bytes: Vec<u8> = bytes
            .into_iter()
            .map(|b| if b == b'@' { 0xE9 } else { b })
            .collect();

        let reg = Registry::from_bytes(&bytes, &RegistryConfig::default()).expect("latin-1");
        assert!(reg.area_list("Caf\u{e9}").is_some());
        assert_eq!(reg.num_area_lists(), 2);
    }

    #[test]
    fn broken_xml_is_reported() {
        let xml = "<trakem2><t2_layer_set></trakem2>";
        assert!(matches!(
            Registry::from_xml(xml, &RegistryConfig::default()),
            Err(Error::Xml(_))
        ));
    }
}

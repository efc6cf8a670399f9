use std::collections::{BTreeMap, BTreeSet};

use log::{debug, warn};
use tk_boundary::{Boundary, BoundaryConfig, LayerBoundaries, prepare_boundary};
use tk_core::{Error, Offset2d, Point2d};

use crate::parse::parse_path;

#[derive(Debug, Clone, PartialEq)]
pub struct RegistryConfig {
    /// Area-list titles that are structural artifacts of the project file
    /// rather than segmented objects.
    pub placeholder_names: BTreeSet<String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            placeholder_names: BTreeSet::from(["area_list".to_owned()]),
        }
    }
}

/// One imaged section.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub name: String,
    pub oid: String,
    pub transform: Offset2d,
    pub width: f64,
    pub height: f64,
    pub z: f64,
    pub thickness: f64,
}

/// One segmented object, tracked across layers.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaList {
    pub name: String,
    /// Integer translation applied to every path vertex.
    pub transform: Offset2d,
    pub(crate) paths: BTreeMap<String, Vec<String>>,
}

impl AreaList {
    pub fn new(name: impl Into<String>, transform: Offset2d) -> Self {
        Self {
            name: name.into(),
            transform: transform.truncated(),
            paths: BTreeMap::new(),
        }
    }

    /// Raw `d` strings of this object in the layer with `layer_oid`.
    pub fn paths_in(&self, layer_oid: &str) -> &[String] {
        self.paths.get(layer_oid).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn add_path(&mut self, layer_oid: impl Into<String>, d: impl Into<String>) {
        self.paths.entry(layer_oid.into()).or_default().push(d.into());
    }

    pub fn num_layers(&self) -> usize {
        self.paths.len()
    }

    /// Parses one path string and shifts it by the area-list translation.
    pub fn transformed_path(&self, d: &str) -> Result<Vec<Point2d>, Error> {
        let points = parse_path(d)?;
        Ok(points.into_iter().map(|p| p + self.transform).collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    pub pixel_width: f64,
    pub pixel_height: f64,
    pub pixel_depth: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerSetDims {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Default)]
pub struct Registry {
    pub(crate) layer_set: Option<LayerSetDims>,
    pub(crate) calibration: Option<Calibration>,
    pub(crate) layers: BTreeMap<String, Layer>,
    pub(crate) area_lists: BTreeMap<String, AreaList>,
}

impl Registry {
    pub fn from_xml(xml: &str, cfg: &RegistryConfig) -> Result<Self, Error> {
        let registry = crate::xml::extract(xml, cfg)?;
        debug!(
            "registry loaded: {} layers, {} area lists",
            registry.layers.len(),
            registry.area_lists.len()
        );
        Ok(registry)
    }

    /// Parses a project file's raw bytes, honoring its declared encoding.
    pub fn from_bytes(bytes: &[u8], cfg: &RegistryConfig) -> Result<Self, Error> {
        let xml = crate::encoding::decode_document(bytes)?;
        Self::from_xml(&xml, cfg)
    }

    /// Adds a layer, replacing any previous layer with the same name.
    pub fn insert_layer(&mut self, layer: Layer) {
        self.layers.insert(layer.name.clone(), layer);
    }

    /// Adds an area list. Paths of a repeated name are merged into the
    /// first definition, whose transform is kept.
    pub fn insert_area_list(&mut self, area_list: AreaList, cfg: &RegistryConfig) {
        if cfg.placeholder_names.contains(&area_list.name) {
            debug!("skipping placeholder area list '{}'", area_list.name);
            return;
        }

        match self.area_lists.get_mut(&area_list.name) {
            Some(existing) => {
                warn!(
                    "duplicate area list '{}'; merging its paths into the first definition",
                    area_list.name
                );
                for (layer_oid, paths) in area_list.paths {
                    existing.paths.entry(layer_oid).or_default().extend(paths);
                }
            }
            None => {
                self.area_lists.insert(area_list.name.clone(), area_list);
            }
        }
    }

    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers.get(name)
    }

    pub fn layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.values()
    }

    /// Layer names in ascending order.
    pub fn layer_names(&self) -> Vec<String> {
        self.layers.keys().cloned().collect()
    }

    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    pub fn area_list(&self, name: &str) -> Option<&AreaList> {
        self.area_lists.get(name)
    }

    pub fn area_lists(&self) -> impl Iterator<Item = &AreaList> {
        self.area_lists.values()
    }

    pub fn num_area_lists(&self) -> usize {
        self.area_lists.len()
    }

    pub fn calibration(&self) -> Option<Calibration> {
        self.calibration
    }

    pub fn layer_set_dims(&self) -> Option<LayerSetDims> {
        self.layer_set
    }

    /// Raw path strings of `object` in `layer`; empty when either is unknown.
    pub fn paths(&self, layer: &str, object: &str) -> &[String] {
        match (self.layers.get(layer), self.area_lists.get(object)) {
            (Some(layer), Some(area_list)) => area_list.paths_in(&layer.oid),
            _ => &[],
        }
    }

    /// Builds the qualifying boundaries of every object (or of `only`) in
    /// `layer`.
    ///
    /// Per object, boundaries are indexed from `0` in document order, counting
    /// only those whose area exceeds the threshold. Malformed paths are logged
    /// and skipped. Unknown names in `only` are ignored.
    pub fn boundaries_in_layer(
        &self,
        layer: &str,
        cfg: &BoundaryConfig,
        only: Option<&[String]>,
    ) -> Result<LayerBoundaries, Error> {
        let layer_info = self
            .layers
            .get(layer)
            .ok_or_else(|| Error::UnknownLayer(layer.to_owned()))?;

        let names: Vec<&str> = match only {
            Some(names) => names.iter().map(String::as_str).collect(),
            None => self.area_lists.keys().map(String::as_str).collect(),
        };

        let mut out = LayerBoundaries::new(layer);
        for name in names {
            let Some(area_list) = self.area_lists.get(name) else {
                continue;
            };

            let mut index = 0;
            for d in area_list.paths_in(&layer_info.oid) {
                let vertices = match area_list.transformed_path(d) {
                    Ok(v) => v,
                    Err(err) => {
                        warn!("layer {layer}, object {name}: {err}; boundary skipped");
                        continue;
                    }
                };

                let raw = Boundary::new(name, index, vertices, layer_info.transform);
                if let Some(boundary) = prepare_boundary(raw, cfg)? {
                    out.insert(boundary);
                    index += 1;
                }
            }
        }

        debug!(
            "layer {layer}: {} boundaries across {} objects",
            out.num_boundaries(),
            out.num_objects()
        );
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use tk_boundary::BoundaryConfig;
    use tk_core::{Error, Offset2d, Pixel, Point2d};

    use super::{AreaList, Layer, Registry, RegistryConfig};

    fn layer(name: &str, oid: &str, transform: Offset2d) -> Layer {
        Layer {
            name: name.to_owned(),
            oid: oid.to_owned(),
            transform,
            width: 100.0,
            height: 100.0,
            z: 0.0,
            thickness: 1.0,
        }
    }

    fn square_path(x0: i64, y0: i64, side: i64) -> String {
        format!(
            "M {x0} {y0} L {x0} {} L {} {} L {} {y0} z",
            y0 + side,
            x0 + side,
            y0 + side,
            x0 + side
        )
    }

    fn registry() -> Registry {
        let cfg = RegistryConfig::default();
        let mut reg = Registry::default();
        reg.insert_layer(layer("L1", "10", Offset2d::new(5.0, 5.0)));
        reg.insert_layer(layer("L2", "11", Offset2d::default()));

        let mut a = AreaList::new("AVAL", Offset2d::new(2.9, -1.2));
        a.add_path("10", square_path(0, 0, 20));
        a.add_path("10", square_path(50, 50, 5));
        a.add_path("10", "M 1 2 L nonsense");
        a.add_path("10", square_path(30, 0, 20));
        reg.insert_area_list(a, &cfg);

        let mut b = AreaList::new("ADAL", Offset2d::default());
        b.add_path("11", square_path(0, 0, 20));
        reg.insert_area_list(b, &cfg);

        reg.insert_area_list(AreaList::new("area_list", Offset2d::default()), &cfg);
        reg
    }

    #[test]
    fn placeholder_is_excluded() {
        let reg = registry();
        assert_eq!(reg.num_area_lists(), 2);
        assert!(reg.area_list("area_list").is_none());
    }

    #[test]
    fn custom_placeholder_set() {
        let cfg = RegistryConfig {
            placeholder_names: ["Background".to_owned()].into(),
        };
        let mut reg = Registry::default();
        reg.insert_area_list(AreaList::new("Background", Offset2d::default()), &cfg);
        reg.insert_area_list(AreaList::new("area_list", Offset2d::default()), &cfg);
        assert!(reg.area_list("Background").is_none());
        assert!(reg.area_list("area_list").is_some());
    }

    #[test]
    fn boundaries_are_indexed_after_filtering() {
        let reg = registry();
        let lb = reg
            .boundaries_in_layer("L1", &BoundaryConfig::default(), None)
            .expect("known layer");

        // The 5x5 square is below threshold and the malformed path is skipped.
        let aval = lb.get("AVAL");
        assert_eq!(aval.len(), 2);
        assert_eq!(aval[0].index(), 0);
        assert_eq!(aval[1].index(), 1);
        assert!(lb.get("ADAL").is_empty());

        // Area-list translation (2, -1) is applied to the vertices.
        assert_eq!(aval[0].vertices()[0], Point2d { x: 2.0, y: -1.0 });
        assert_eq!(aval[1].path()[0], Pixel::new(32, -1));
        assert_eq!(aval[0].transform(), Offset2d::new(5.0, 5.0));
    }

    #[test]
    fn object_subset_and_unknown_names() {
        let reg = registry();
        let only = vec!["ADAL".to_owned(), "NOPE".to_owned()];
        let lb = reg
            .boundaries_in_layer("L2", &BoundaryConfig::default(), Some(&only))
            .expect("known layer");
        assert_eq!(lb.num_boundaries(), 1);
        assert_eq!(lb.names().collect::<Vec<_>>(), vec!["ADAL"]);
    }

    #[test]
    fn unknown_layer_is_an_error() {
        let reg = registry();
        assert_eq!(
            reg.boundaries_in_layer("L9", &BoundaryConfig::default(), None)
                .map(|lb| lb.num_boundaries()),
            Err(Error::UnknownLayer("L9".to_owned()))
        );
        assert!(reg.paths("L9", "AVAL").is_empty());
        assert_eq!(reg.paths("L1", "AVAL").len(), 4);
    }

    #[test]
    fn duplicate_titles_merge_paths() {
        let cfg = RegistryConfig::default();
        let mut reg = Registry::default();
        let mut first = AreaList::new("RIAL", Offset2d::new(1.0, 1.0));
        first.add_path("10", square_path(0, 0, 20));
        let mut second = AreaList::new("RIAL", Offset2d::new(9.0, 9.0));
        second.add_path("10", square_path(40, 40, 20));
        second.add_path("12", square_path(40, 40, 20));
        reg.insert_area_list(first, &cfg);
        reg.insert_area_list(second, &cfg);

        let rial = reg.area_list("RIAL").expect("present");
        assert_eq!(rial.transform, Offset2d::new(1.0, 1.0));
        assert_eq!(rial.paths_in("10").len(), 2);
        assert_eq!(rial.num_layers(), 2);
    }
}

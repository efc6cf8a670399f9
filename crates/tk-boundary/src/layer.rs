use std::collections::BTreeMap;
use std::sync::Arc;

use crate::Boundary;

/// All qualifying boundaries of one layer, keyed by area list name.
///
/// Names with no qualifying boundary are absent; [`LayerBoundaries::get`]
/// reports them as an empty slice.
#[derive(Debug, Clone, Default)]
pub struct LayerBoundaries {
    layer: String,
    objects: BTreeMap<String, Vec<Arc<Boundary>>>,
}

impl LayerBoundaries {
    pub fn new(layer: impl Into<String>) -> Self {
        Self {
            layer: layer.into(),
            objects: BTreeMap::new(),
        }
    }

    pub fn layer(&self) -> &str {
        &self.layer
    }

    /// Appends a boundary under its own name. Indices are expected to be
    /// assigned densely from `0` per name.
    pub fn insert(&mut self, boundary: Boundary) {
        let list = self.objects.entry(boundary.name().to_owned()).or_default();
        debug_assert_eq!(boundary.index(), list.len(), "non-dense boundary index");
        list.push(Arc::new(boundary));
    }

    pub fn get(&self, name: &str) -> &[Arc<Boundary>] {
        self.objects.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn boundary(&self, name: &str, index: usize) -> Option<&Arc<Boundary>> {
        self.get(name).get(index)
    }

    /// Objects in ascending name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Arc<Boundary>])> {
        self.objects.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.objects.keys().map(String::as_str)
    }

    pub fn num_objects(&self) -> usize {
        self.objects.len()
    }

    pub fn num_boundaries(&self) -> usize {
        self.objects.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use tk_core::Offset2d;

    use crate::{Boundary, LayerBoundaries};

    #[test]
    fn missing_objects_read_as_empty() {
        let mut layer = LayerBoundaries::new("N2U_001");
        layer.insert(Boundary::new("AVAL", 0, Vec::new(), Offset2d::default()));
        layer.insert(Boundary::new("AVAL", 1, Vec::new(), Offset2d::default()));
        layer.insert(Boundary::new("ADAL", 0, Vec::new(), Offset2d::default()));

        assert_eq!(layer.layer(), "N2U_001");
        assert_eq!(layer.get("AVAL").len(), 2);
        assert!(layer.get("PVPR").is_empty());
        assert!(layer.boundary("AVAL", 1).is_some());
        assert!(layer.boundary("AVAL", 2).is_none());
        assert_eq!(layer.names().collect::<Vec<_>>(), vec!["ADAL", "AVAL"]);
        assert_eq!(layer.num_objects(), 2);
        assert_eq!(layer.num_boundaries(), 3);
    }
}

use crate::{
    foundation::core::{Affine, BezPath, Rect},
    geometry::provider::GeometryProvider,
};

const ROOT_ID: &str = "svg-root";

/// One element of a [`MemoryDocument`].
#[derive(Clone, Debug)]
pub struct MemoryElement {
    pub key: String,
    /// Layer group containing the element; layer groups point at themselves.
    pub layer: Option<String>,
    pub bbox: Rect,
    pub ctm: Affine,
    pub is_rect: bool,
    /// Element carries no `id` attribute (never offered as a reference element).
    pub anonymous: bool,
    pub path: Option<BezPath>,
}

impl MemoryElement {
    pub fn new(key: impl Into<String>, bbox: Rect) -> Self {
        Self {
            key: key.into(),
            layer: None,
            bbox,
            ctm: Affine::IDENTITY,
            is_rect: false,
            anonymous: false,
            path: None,
        }
    }

    pub fn rect(key: impl Into<String>, rect: Rect) -> Self {
        Self {
            is_rect: true,
            ..Self::new(key, rect)
        }
    }

    pub fn path(key: impl Into<String>, path: BezPath) -> Self {
        use kurbo::Shape;
        let bbox = path.bounding_box();
        Self {
            path: Some(path),
            ..Self::new(key, bbox)
        }
    }

    pub fn in_layer(mut self, layer: impl Into<String>) -> Self {
        self.layer = Some(layer.into());
        self
    }

    pub fn with_ctm(mut self, ctm: Affine) -> Self {
        self.ctm = ctm;
        self
    }

    pub fn anonymous(mut self) -> Self {
        self.anonymous = true;
        self
    }
}

/// In-memory document with fixed geometry.
///
/// Elements are kept in insertion order, which doubles as document order for
/// intersection queries.
#[derive(Clone, Debug)]
pub struct MemoryDocument {
    bounds: Rect,
    root_ctm: Affine,
    elements: Vec<MemoryElement>,
    intersections_supported: bool,
}

impl MemoryDocument {
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            root_ctm: Affine::IDENTITY,
            elements: Vec::new(),
            intersections_supported: true,
        }
    }

    /// Register a layer group (a direct child of the root).
    pub fn add_layer(&mut self, key: impl Into<String>) -> &mut Self {
        let key = key.into();
        let layer = MemoryElement::new(key.clone(), Rect::ZERO).in_layer(key);
        self.elements.push(layer);
        self
    }

    pub fn insert(&mut self, element: MemoryElement) -> &mut Self {
        self.elements.retain(|e| e.key != element.key);
        self.elements.push(element);
        self
    }

    /// CTM of the root user space (shared by every layer).
    pub fn set_root_ctm(&mut self, ctm: Affine) -> &mut Self {
        self.root_ctm = ctm;
        self
    }

    /// Simulate engines without spatial queries.
    pub fn set_intersections_supported(&mut self, supported: bool) -> &mut Self {
        self.intersections_supported = supported;
        self
    }

    pub fn element(&self, key: &str) -> Option<&MemoryElement> {
        self.elements.iter().find(|e| e.key == key)
    }

    fn is_layer(&self, e: &MemoryElement) -> bool {
        e.layer.as_deref() == Some(e.key.as_str())
    }

    fn layer_bbox(&self, layer: &str) -> Rect {
        self.elements
            .iter()
            .filter(|e| e.layer.as_deref() == Some(layer) && !self.is_layer(e))
            .map(|e| self.relative_ctm(e).transform_rect_bbox(e.bbox))
            .reduce(|a, b| a.union(b))
            .unwrap_or(Rect::ZERO)
    }

    fn relative_ctm(&self, e: &MemoryElement) -> Affine {
        self.root_ctm.inverse() * e.ctm
    }
}

impl GeometryProvider for MemoryDocument {
    type Node = String;

    fn root(&self) -> String {
        ROOT_ID.to_string()
    }

    fn find(&self, id: &str) -> Option<String> {
        if id == ROOT_ID {
            return Some(self.root());
        }
        self.element(id)
            .filter(|e| !e.anonymous)
            .map(|e| e.key.clone())
    }

    fn element_id(&self, node: &String) -> Option<String> {
        if node == ROOT_ID {
            return Some(node.clone());
        }
        self.element(node)
            .filter(|e| !e.anonymous)
            .map(|e| e.key.clone())
    }

    fn bounding_box(&self, node: &String) -> Option<Rect> {
        if node == ROOT_ID {
            return Some(self.bounds);
        }
        let e = self.element(node)?;
        if self.is_layer(e) {
            Some(self.layer_bbox(&e.key))
        } else {
            Some(e.bbox)
        }
    }

    fn rect_geometry(&self, node: &String) -> Option<Rect> {
        self.element(node).filter(|e| e.is_rect).map(|e| e.bbox)
    }

    fn ctm(&self, node: &String) -> Option<Affine> {
        if node == ROOT_ID {
            return Some(self.root_ctm);
        }
        self.element(node).map(|e| e.ctm)
    }

    fn layer_space(&self, node: &String) -> Option<Affine> {
        if node == ROOT_ID {
            return Some(self.root_ctm);
        }
        self.element(node)?.layer.as_ref().map(|_| self.root_ctm)
    }

    fn intersection_list(
        &self,
        layer: &String,
        area: Rect,
        view: Affine,
    ) -> Option<Vec<(String, Rect)>> {
        if !self.intersections_supported {
            return None;
        }
        let hits = self
            .elements
            .iter()
            .filter(|e| e.layer.as_deref() == Some(layer.as_str()) && !self.is_layer(e))
            .filter_map(|e| {
                let screen = (view * self.relative_ctm(e)).transform_rect_bbox(e.bbox);
                let overlap = screen.intersect(area);
                (overlap.width() > 0.0 && overlap.height() > 0.0).then(|| (e.key.clone(), screen))
            })
            .collect();
        Some(hits)
    }

    fn motion_path(&self, node: &String) -> Option<BezPath> {
        let e = self.element(node)?;
        e.path.as_ref().map(|p| self.relative_ctm(e) * p.clone())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/memory.rs"]
mod tests;

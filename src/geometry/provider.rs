//! Geometry queries the camera engine needs from an SVG document.
//!
//! The engine never touches a DOM directly. Hosts implement
//! [`GeometryProvider`] over whatever document model they have; the crate
//! ships [`crate::MemoryDocument`] (fixed geometry) and [`crate::SvgDocument`]
//! (parsed with `usvg`).

use std::fmt::Debug;

use crate::foundation::core::{Affine, BezPath, Rect};

/// Read-only access to element geometry.
pub trait GeometryProvider {
    /// Handle identifying one element of the document.
    type Node: Clone + PartialEq + Debug;

    /// The document root.
    fn root(&self) -> Self::Node;

    /// Look up an element by its `id` attribute.
    fn find(&self, id: &str) -> Option<Self::Node>;

    /// The `id` attribute of an element, if it has a non-empty one.
    fn element_id(&self, node: &Self::Node) -> Option<String>;

    /// Object bounding box in the element's own user space (`getBBox`).
    fn bounding_box(&self, node: &Self::Node) -> Option<Rect>;

    /// Raw `x/y/width/height` attributes for `rect` elements.
    ///
    /// When present these take precedence over [`GeometryProvider::bounding_box`].
    fn rect_geometry(&self, _node: &Self::Node) -> Option<Rect> {
        None
    }

    /// Current transformation matrix of an element (`getCTM`).
    fn ctm(&self, node: &Self::Node) -> Option<Affine>;

    /// CTM of the coordinate space that the camera of the element's layer transforms.
    ///
    /// This is the space of the direct children of the SVG root, before any
    /// camera transform is applied.
    fn layer_space(&self, node: &Self::Node) -> Option<Affine>;

    /// Elements of `layer` whose on-screen bounding box intersects `area`.
    ///
    /// `view` maps layer space to viewport pixels. Each hit carries its
    /// on-screen bounding box. `None` means the host cannot answer spatial
    /// queries at all.
    fn intersection_list(
        &self,
        layer: &Self::Node,
        area: Rect,
        view: Affine,
    ) -> Option<Vec<(Self::Node, Rect)>>;

    /// Outline of a path element, used for motion along a path.
    fn motion_path(&self, _node: &Self::Node) -> Option<BezPath> {
        None
    }
}

/// Bounding box of the whole document, in root user space.
pub fn document_bounds<P: GeometryProvider>(provider: &P) -> Option<Rect> {
    provider.bounding_box(&provider.root())
}

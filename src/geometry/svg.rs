use std::collections::HashMap;

use anyhow::Context as _;
use usvg::tiny_skia_path::PathSegment;

use crate::{
    foundation::core::{Affine, BezPath, Point, Rect},
    foundation::error::SoziResult,
    geometry::provider::GeometryProvider,
};

/// Element handle in an [`SvgDocument`]: child indices from the layer container.
///
/// The empty path is the container itself; the first index selects the layer group.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct SvgNode(Vec<usize>);

impl SvgNode {
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The direct child of the root containing this node.
    pub fn layer(&self) -> Option<SvgNode> {
        self.0.first().map(|&i| SvgNode(vec![i]))
    }
}

/// SVG document parsed with `usvg`, answering geometry queries.
///
/// Layer space is the `viewBox` user space. When `width`/`height` do not match
/// the `viewBox`, `usvg` wraps the content in an anonymous group carrying the
/// view box transform; that group is the layer container and its children are
/// the layers.
pub struct SvgDocument {
    tree: usvg::Tree,
    ids: HashMap<String, SvgNode>,
}

impl std::fmt::Debug for SvgDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SvgDocument")
            .field("ids", &self.ids.len())
            .finish_non_exhaustive()
    }
}

impl SvgDocument {
    #[tracing::instrument(skip(bytes), fields(len = bytes.len()))]
    pub fn parse(bytes: &[u8]) -> SoziResult<Self> {
        let opts = usvg::Options::default();
        let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;
        let mut ids = HashMap::new();
        index_group(layer_container(tree.root()), &mut Vec::new(), &mut ids);
        tracing::debug!(elements = ids.len(), "indexed svg ids");
        Ok(Self { tree, ids })
    }

    pub fn parse_str(text: &str) -> SoziResult<Self> {
        Self::parse(text.as_bytes())
    }

    /// Intrinsic document size in user units.
    pub fn size(&self) -> (f64, f64) {
        let s = self.tree.size();
        (f64::from(s.width()), f64::from(s.height()))
    }

    /// Layer groups, in document order.
    pub fn layers(&self) -> Vec<SvgNode> {
        (0..self.container().children().len())
            .map(|i| SvgNode(vec![i]))
            .collect()
    }

    fn container(&self) -> &usvg::Group {
        layer_container(self.tree.root())
    }

    fn node(&self, handle: &SvgNode) -> Option<&usvg::Node> {
        let (first, rest) = handle.0.split_first()?;
        let mut node = self.container().children().get(*first)?;
        for &i in rest {
            match node {
                usvg::Node::Group(g) => node = g.children().get(i)?,
                _ => return None,
            }
        }
        Some(node)
    }

    fn root_space(&self) -> Affine {
        to_affine(self.container().abs_transform())
    }
}

impl GeometryProvider for SvgDocument {
    type Node = SvgNode;

    fn root(&self) -> SvgNode {
        SvgNode::default()
    }

    fn find(&self, id: &str) -> Option<SvgNode> {
        self.ids.get(id).cloned()
    }

    fn element_id(&self, node: &SvgNode) -> Option<String> {
        let id = if node.is_root() {
            self.tree.root().id()
        } else {
            self.node(node)?.id()
        };
        (!id.is_empty()).then(|| id.to_string())
    }

    fn bounding_box(&self, node: &SvgNode) -> Option<Rect> {
        if node.is_root() {
            return Some(to_rect(self.container().bounding_box()));
        }
        self.node(node).map(|n| to_rect(n.bounding_box()))
    }

    fn ctm(&self, node: &SvgNode) -> Option<Affine> {
        if node.is_root() {
            return Some(self.root_space());
        }
        self.node(node).map(|n| to_affine(n.abs_transform()))
    }

    fn layer_space(&self, node: &SvgNode) -> Option<Affine> {
        if node.is_root() || self.node(node).is_some() {
            Some(self.root_space())
        } else {
            None
        }
    }

    fn intersection_list(
        &self,
        layer: &SvgNode,
        area: Rect,
        view: Affine,
    ) -> Option<Vec<(SvgNode, Rect)>> {
        let to_screen = view * self.root_space().inverse();
        let mut hits = Vec::new();
        let mut prefix = layer.0.clone();
        if let Some(node) = self.node(layer) {
            collect_hits(node, &mut prefix, area, to_screen, &mut hits);
        }
        Some(hits)
    }

    fn motion_path(&self, node: &SvgNode) -> Option<BezPath> {
        let usvg::Node::Path(path) = self.node(node)? else {
            return None;
        };
        let mut out = BezPath::new();
        for seg in path.data().segments() {
            match seg {
                PathSegment::MoveTo(p) => out.move_to(to_point(p)),
                PathSegment::LineTo(p) => out.line_to(to_point(p)),
                PathSegment::QuadTo(p1, p2) => out.quad_to(to_point(p1), to_point(p2)),
                PathSegment::CubicTo(p1, p2, p3) => {
                    out.curve_to(to_point(p1), to_point(p2), to_point(p3))
                }
                PathSegment::Close => out.close_path(),
            }
        }
        let to_layer = self.root_space().inverse() * to_affine(path.abs_transform());
        Some(to_layer * out)
    }
}

fn layer_container(root: &usvg::Group) -> &usvg::Group {
    match root.children() {
        [usvg::Node::Group(g)] if is_view_box_group(g) => g,
        _ => root,
    }
}

// The view box wrapper has nothing but a transform.
fn is_view_box_group(g: &usvg::Group) -> bool {
    g.id().is_empty()
        && g.opacity().get() == 1.0
        && g.clip_path().is_none()
        && g.mask().is_none()
        && g.filters().is_empty()
        && !g.abs_transform().is_identity()
}

fn index_group(group: &usvg::Group, prefix: &mut Vec<usize>, ids: &mut HashMap<String, SvgNode>) {
    for (i, child) in group.children().iter().enumerate() {
        prefix.push(i);
        if !child.id().is_empty() {
            ids.entry(child.id().to_string())
                .or_insert_with(|| SvgNode(prefix.clone()));
        }
        if let usvg::Node::Group(g) = child {
            index_group(g, prefix, ids);
        }
        prefix.pop();
    }
}

// Graphics elements only: groups are traversed but never reported.
fn collect_hits(
    node: &usvg::Node,
    prefix: &mut Vec<usize>,
    area: Rect,
    to_screen: Affine,
    hits: &mut Vec<(SvgNode, Rect)>,
) {
    if let usvg::Node::Group(g) = node {
        for (i, child) in g.children().iter().enumerate() {
            prefix.push(i);
            collect_hits(child, prefix, area, to_screen, hits);
            prefix.pop();
        }
        return;
    }
    let screen = (to_screen * to_affine(node.abs_transform()))
        .transform_rect_bbox(to_rect(node.bounding_box()));
    let overlap = screen.intersect(area);
    if overlap.width() > 0.0 && overlap.height() > 0.0 {
        hits.push((SvgNode(prefix.clone()), screen));
    }
}

fn to_affine(t: usvg::Transform) -> Affine {
    Affine::new([
        f64::from(t.sx),
        f64::from(t.ky),
        f64::from(t.kx),
        f64::from(t.sy),
        f64::from(t.tx),
        f64::from(t.ty),
    ])
}

fn to_rect(r: usvg::Rect) -> Rect {
    Rect::new(
        f64::from(r.left()),
        f64::from(r.top()),
        f64::from(r.right()),
        f64::from(r.bottom()),
    )
}

fn to_point(p: usvg::tiny_skia_path::Point) -> Point {
    Point::new(f64::from(p.x), f64::from(p.y))
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/svg.rs"]
mod tests;

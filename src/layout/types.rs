//! Core types for the layout engine

use std::collections::BTreeMap;
use std::fmt;

use crate::model::{PartnershipKind, PersonId};

use super::config::LayoutConfig;

/// A 2D point in the output coordinate system
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A bounding box representing the spatial extent of a node or the drawing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a zero-sized bounding box at the origin
    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    /// Right edge x-coordinate
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge y-coordinate
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Center point of the bounding box
    pub fn center(&self) -> Point {
        Point {
            x: self.x + self.width / 2.0,
            y: self.y + self.height / 2.0,
        }
    }

    /// Check if this bounding box contains a point (edges included)
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    /// Check if this bounding box intersects another (touching edges do not count)
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Compute the union of two bounding boxes (smallest box containing both)
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        BoundingBox::new(x, y, right - x, bottom - y)
    }

    /// Expand this bounding box to include a point
    pub fn expand_to_include(&self, point: Point) -> BoundingBox {
        let x = self.x.min(point.x);
        let y = self.y.min(point.y);
        let right = self.right().max(point.x);
        let bottom = self.bottom().max(point.y);
        BoundingBox::new(x, y, right - x, bottom - y)
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::zero()
    }
}

/// Grid position of one person
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    /// Horizontal grid position; fractional for tight partner pairs
    pub column: f64,
    /// Generation row, 0 at the top
    pub row: i32,
}

impl Node {
    pub fn new(column: f64, row: i32) -> Self {
        Self { column, row }
    }

    /// Box of this node in output units
    pub fn bounds(&self, config: &LayoutConfig) -> BoundingBox {
        let (width, height) = config.node_size;
        let center_x = self.column * config.column_width;
        BoundingBox::new(
            center_x - width / 2.0,
            f64::from(self.row) * config.row_height,
            width,
            height,
        )
    }
}

/// Identifier of a derived union ("U0", "U1", ... in canonical order)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnionId(pub String);

impl UnionId {
    pub fn from_index(index: usize) -> Self {
        Self(format!("U{}", index))
    }
}

impl fmt::Display for UnionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Members of a union: a lone parent or a couple in sorted id order
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UnionMembers {
    Single(PersonId),
    Couple(PersonId, PersonId),
}

impl UnionMembers {
    /// Build a couple with members in canonical order
    pub fn couple(a: PersonId, b: PersonId) -> Self {
        if a <= b {
            UnionMembers::Couple(a, b)
        } else {
            UnionMembers::Couple(b, a)
        }
    }

    pub fn ids(&self) -> Vec<&PersonId> {
        match self {
            UnionMembers::Single(a) => vec![a],
            UnionMembers::Couple(a, b) => vec![a, b],
        }
    }

    pub fn contains(&self, id: &PersonId) -> bool {
        match self {
            UnionMembers::Single(a) => a == id,
            UnionMembers::Couple(a, b) => a == id || b == id,
        }
    }

    /// The other member of a couple
    pub fn partner_of(&self, id: &PersonId) -> Option<&PersonId> {
        match self {
            UnionMembers::Couple(a, b) if a == id => Some(b),
            UnionMembers::Couple(a, b) if b == id => Some(a),
            _ => None,
        }
    }

    pub fn is_couple(&self) -> bool {
        matches!(self, UnionMembers::Couple(..))
    }
}

/// A derived couple or single-parent grouping used for layout
#[derive(Debug, Clone, PartialEq)]
pub struct Union {
    pub id: UnionId,
    pub members: UnionMembers,
    /// Declared partnership kind; `None` when implied only by shared children
    pub kind: Option<PartnershipKind>,
    /// Children sorted by descending birth-order hint, ties by id
    pub children: Vec<PersonId>,
    /// Minimum generation (depth) of the members
    pub generation: i32,
}

/// Start of a drop line: a person's box or a union bar
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Person(PersonId),
    Bar(UnionId),
}

/// Bracket joining both partners of a couple
#[derive(Debug, Clone, PartialEq)]
pub struct UnionBar {
    pub union: UnionId,
    /// Midpoint of the horizontal bar; child drops start here
    pub center: Point,
    pub row: i32,
    /// Horizontal extent of the bar
    pub width: f64,
    pub members: Vec<PersonId>,
    /// Member A bottom edge, bar, member B bottom edge
    pub path: Vec<Point>,
}

/// Orthogonal connector from a bar or a single parent into a child
#[derive(Debug, Clone, PartialEq)]
pub struct DropLine {
    pub from: Endpoint,
    pub to: PersonId,
    /// Point where the trunk turns towards the child
    pub via: Point,
    pub path: Vec<Point>,
}

/// Geometric connector handed to a render backend
#[derive(Debug, Clone, PartialEq)]
pub enum Connector {
    UnionBar(UnionBar),
    DropLine(DropLine),
}

impl Connector {
    pub fn path(&self) -> &[Point] {
        match self {
            Connector::UnionBar(bar) => &bar.path,
            Connector::DropLine(drop) => &drop.path,
        }
    }
}

/// The complete result of a layout run
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FamilyLayout {
    /// Grid position of every person
    pub nodes: BTreeMap<PersonId, Node>,
    /// Box of every person in output units
    pub boxes: BTreeMap<PersonId, BoundingBox>,
    /// Connectors in union order, each bar before its child drops
    pub connectors: Vec<Connector>,
    /// Canonical unions
    pub unions: Vec<Union>,
    /// Depth of every person; 0 is the anchor or the median generation
    pub generations: BTreeMap<PersonId, i32>,
    /// Whether generation propagation reached a fixed point
    pub converged: bool,
    /// Bounding box of all boxes and connectors
    pub bounds: BoundingBox,
}

impl FamilyLayout {
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(&PersonId::from(id))
    }

    /// First union, in canonical order, that `member` belongs to
    pub fn union_of(&self, member: &str) -> Option<&Union> {
        let id = PersonId::from(member);
        self.unions.iter().find(|u| u.members.contains(&id))
    }

    /// Union bars in emission order
    pub fn union_bars(&self) -> impl Iterator<Item = &UnionBar> {
        self.connectors.iter().filter_map(|c| match c {
            Connector::UnionBar(bar) => Some(bar),
            Connector::DropLine(_) => None,
        })
    }

    /// Drop lines in emission order
    pub fn drop_lines(&self) -> impl Iterator<Item = &DropLine> {
        self.connectors.iter().filter_map(|c| match c {
            Connector::DropLine(drop) => Some(drop),
            Connector::UnionBar(_) => None,
        })
    }

    /// Recompute person boxes and the overall `bounds` from nodes and connectors
    pub fn compute_geometry(&mut self, config: &LayoutConfig) {
        self.boxes = self
            .nodes
            .iter()
            .map(|(id, node)| (id.clone(), node.bounds(config)))
            .collect();

        let mut boxes = self.boxes.values();
        let Some(first) = boxes.next() else {
            self.bounds = BoundingBox::zero();
            return;
        };
        let mut bounds = boxes.fold(*first, |acc, b| acc.union(b));
        for connector in &self.connectors {
            for point in connector.path() {
                bounds = bounds.expand_to_include(*point);
            }
        }
        self.bounds = bounds;
    }

    /// Stable plain-text dump: one line per node (row-major), then unions
    pub fn describe(&self) -> String {
        let mut nodes: Vec<(&PersonId, &Node)> = self.nodes.iter().collect();
        nodes.sort_by(|(ia, a), (ib, b)| {
            a.row
                .cmp(&b.row)
                .then(a.column.total_cmp(&b.column))
                .then(ia.cmp(ib))
        });

        let mut lines: Vec<String> = nodes
            .into_iter()
            .map(|(id, node)| format!("{} col={} row={}", id, node.column + 0.0, node.row))
            .collect();

        for union in &self.unions {
            let members = union
                .members
                .ids()
                .iter()
                .map(|id| id.as_str())
                .collect::<Vec<_>>()
                .join("+");
            let children = if union.children.is_empty() {
                "-".to_string()
            } else {
                union
                    .children
                    .iter()
                    .map(|id| id.as_str())
                    .collect::<Vec<_>>()
                    .join(",")
            };
            lines.push(format!("{} {} children={}", union.id, members, children));
        }

        lines.join("\n")
    }
}

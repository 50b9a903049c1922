//! Lint engine for detecting defects in a computed family layout.
//!
//! Runs after column assignment and connector routing to check the
//! properties the layout promises: no overlapping boxes, partners side by
//! side, siblings in age order, children one row below their parents, and
//! connectors that do not cut through unrelated boxes.

use std::collections::HashSet;
use std::fmt;

use crate::model::{Family, PersonId};

use super::config::LayoutConfig;
use super::types::{BoundingBox, Connector, FamilyLayout, Point, UnionMembers};

const EPSILON: f64 = 1e-9;

/// A lint warning about a layout defect
#[derive(Debug)]
pub struct LintWarning {
    pub category: LintCategory,
    pub message: String,
}

/// Category of lint defect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintCategory {
    Overlap,
    Adjacency,
    SiblingOrder,
    Depth,
    Connection,
}

impl fmt::Display for LintCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LintCategory::Overlap => write!(f, "overlap"),
            LintCategory::Adjacency => write!(f, "adjacency"),
            LintCategory::SiblingOrder => write!(f, "sibling-order"),
            LintCategory::Depth => write!(f, "depth"),
            LintCategory::Connection => write!(f, "connection"),
        }
    }
}

/// Run all lint checks on a completed layout.
pub fn check(family: &Family, layout: &FamilyLayout, config: &LayoutConfig) -> Vec<LintWarning> {
    let mut warnings = Vec::new();
    check_overlaps(layout, config, &mut warnings);
    check_adjacency(layout, &mut warnings);
    check_sibling_order(layout, &mut warnings);
    check_depth(family, layout, &mut warnings);
    check_connections(layout, config, &mut warnings);
    warnings
}

// ── Overlap detection ─────────────────────────────────────────────

/// Boxes that only touch may still intersect by a rounding error
const OVERLAP_TOLERANCE: f64 = 1e-6;

fn check_overlaps(layout: &FamilyLayout, config: &LayoutConfig, warnings: &mut Vec<LintWarning>) {
    let boxes: Vec<(&PersonId, BoundingBox)> = layout
        .nodes
        .iter()
        .map(|(id, node)| (id, node.bounds(config)))
        .collect();

    for i in 0..boxes.len() {
        for j in (i + 1)..boxes.len() {
            let (id_a, a) = &boxes[i];
            let (id_b, b) = &boxes[j];
            let overlap_w = a.right().min(b.right()) - a.x.max(b.x);
            let overlap_h = a.bottom().min(b.bottom()) - a.y.max(b.y);
            if overlap_w > OVERLAP_TOLERANCE && overlap_h > OVERLAP_TOLERANCE {
                warnings.push(LintWarning {
                    category: LintCategory::Overlap,
                    message: format!(
                        "people \"{}\" and \"{}\" overlap by {:.0}x{:.0}px",
                        id_a, id_b, overlap_w, overlap_h
                    ),
                });
            }
        }
    }
}

// ── Partner adjacency ─────────────────────────────────────────────

fn check_adjacency(layout: &FamilyLayout, warnings: &mut Vec<LintWarning>) {
    for union in &layout.unions {
        let UnionMembers::Couple(a, b) = &union.members else {
            continue;
        };
        let (Some(node_a), Some(node_b)) = (layout.nodes.get(a), layout.nodes.get(b)) else {
            continue;
        };
        if node_a.row != node_b.row {
            warnings.push(LintWarning {
                category: LintCategory::Adjacency,
                message: format!(
                    "partners \"{}\" and \"{}\" sit in different rows ({} and {})",
                    a, b, node_a.row, node_b.row
                ),
            });
            continue;
        }
        let distance = (node_a.column - node_b.column).abs();
        if distance > 1.0 + EPSILON {
            warnings.push(LintWarning {
                category: LintCategory::Adjacency,
                message: format!(
                    "partners \"{}\" and \"{}\" are {} columns apart",
                    a, b, distance
                ),
            });
        }
    }
}

// ── Sibling order ─────────────────────────────────────────────────

fn check_sibling_order(layout: &FamilyLayout, warnings: &mut Vec<LintWarning>) {
    for union in &layout.unions {
        let placed: Vec<(&PersonId, f64, i32)> = union
            .children
            .iter()
            .filter_map(|c| layout.nodes.get(c).map(|n| (c, n.column, n.row)))
            .collect();

        for (i, (older, older_col, older_row)) in placed.iter().enumerate() {
            for (younger, younger_col, younger_row) in &placed[i + 1..] {
                if older_row == younger_row && older_col >= younger_col {
                    warnings.push(LintWarning {
                        category: LintCategory::SiblingOrder,
                        message: format!(
                            "sibling \"{}\" is not left of younger sibling \"{}\" in union {}",
                            older, younger, union.id
                        ),
                    });
                }
            }
        }
    }
}

// ── Parent/child depth ────────────────────────────────────────────

fn check_depth(family: &Family, layout: &FamilyLayout, warnings: &mut Vec<LintWarning>) {
    for (i, person) in family.people().iter().enumerate() {
        let Some(child) = layout.nodes.get(&person.id) else {
            continue;
        };
        for parent in family.parentage_at(i).parents() {
            let Some(parent_node) = layout.nodes.get(parent) else {
                continue;
            };
            if child.row != parent_node.row + 1 {
                warnings.push(LintWarning {
                    category: LintCategory::Depth,
                    message: format!(
                        "\"{}\" is in row {} but parent \"{}\" is in row {}",
                        person.id, child.row, parent, parent_node.row
                    ),
                });
            }
        }
    }
}

// ── Connection-box intersection ───────────────────────────────────

/// Check if a line segment intersects an axis-aligned bounding box.
fn line_segment_intersects_bbox(p1: &Point, p2: &Point, bbox: &BoundingBox) -> bool {
    if bbox.contains(*p1) || bbox.contains(*p2) {
        return true;
    }

    let edges = [
        (Point::new(bbox.x, bbox.y), Point::new(bbox.right(), bbox.y)),
        (
            Point::new(bbox.x, bbox.bottom()),
            Point::new(bbox.right(), bbox.bottom()),
        ),
        (Point::new(bbox.x, bbox.y), Point::new(bbox.x, bbox.bottom())),
        (
            Point::new(bbox.right(), bbox.y),
            Point::new(bbox.right(), bbox.bottom()),
        ),
    ];

    edges
        .iter()
        .any(|(e1, e2)| segments_intersect(p1, p2, e1, e2))
}

/// Check if two line segments intersect using parametric intersection.
fn segments_intersect(a1: &Point, a2: &Point, b1: &Point, b2: &Point) -> bool {
    let d1x = a2.x - a1.x;
    let d1y = a2.y - a1.y;
    let d2x = b2.x - b1.x;
    let d2y = b2.y - b1.y;

    let denom = d1x * d2y - d1y * d2x;

    // Parallel or coincident: not reported
    if denom.abs() < 1e-10 {
        return false;
    }

    let dx = b1.x - a1.x;
    let dy = b1.y - a1.y;

    let t = (dx * d2y - dy * d2x) / denom;
    let u = (dx * d1y - dy * d1x) / denom;

    (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u)
}

fn connector_name(connector: &Connector) -> String {
    match connector {
        Connector::UnionBar(bar) => format!("bar {}", bar.union),
        Connector::DropLine(drop) => format!("drop to \"{}\"", drop.to),
    }
}

fn check_connections(
    layout: &FamilyLayout,
    config: &LayoutConfig,
    warnings: &mut Vec<LintWarning>,
) {
    let boxes: Vec<(&PersonId, BoundingBox)> = layout
        .nodes
        .iter()
        .map(|(id, node)| (id, node.bounds(config)))
        .collect();

    for connector in &layout.connectors {
        let path = connector.path();
        let (Some(start), Some(end)) = (path.first(), path.last()) else {
            continue;
        };

        let mut crossed: HashSet<&PersonId> = HashSet::new();
        for seg in path.windows(2) {
            for (id, bounds) in &boxes {
                if crossed.contains(id) {
                    continue;
                }
                if !line_segment_intersects_bbox(&seg[0], &seg[1], bounds) {
                    continue;
                }
                // Connectors start and end on box edges; those boxes are expected
                if bounds.contains(*start) || bounds.contains(*end) {
                    continue;
                }
                if let Connector::UnionBar(bar) = connector {
                    if bar.members.contains(*id) {
                        continue;
                    }
                }
                crossed.insert(*id);
                warnings.push(LintWarning {
                    category: LintCategory::Connection,
                    message: format!("{} crosses \"{}\"", connector_name(connector), id),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::types::{Node, Union, UnionId};
    use crate::model::Person;

    fn layout_with(nodes: &[(&str, f64, i32)], unions: Vec<Union>) -> FamilyLayout {
        FamilyLayout {
            nodes: nodes
                .iter()
                .map(|&(id, column, row)| (PersonId::from(id), Node::new(column, row)))
                .collect(),
            unions,
            ..FamilyLayout::default()
        }
    }

    fn couple(a: &str, b: &str, children: &[&str]) -> Union {
        Union {
            id: UnionId::from_index(0),
            members: UnionMembers::couple(a.into(), b.into()),
            kind: None,
            children: children.iter().map(|&c| PersonId::from(c)).collect(),
            generation: 0,
        }
    }

    fn categories(warnings: &[LintWarning]) -> Vec<LintCategory> {
        warnings.iter().map(|w| w.category).collect()
    }

    #[test]
    fn test_category_display() {
        assert_eq!(LintCategory::SiblingOrder.to_string(), "sibling-order");
        assert_eq!(LintCategory::Overlap.to_string(), "overlap");
    }

    #[test]
    fn test_overlap_detected() {
        let family = Family::new(&[Person::new("a"), Person::new("b")], &[]).unwrap();
        let layout = layout_with(&[("a", 0.0, 0), ("b", 0.5, 0)], vec![]);
        let warnings = check(&family, &layout, &LayoutConfig::default());
        assert_eq!(categories(&warnings), vec![LintCategory::Overlap]);
        assert!(warnings[0].message.contains("\"a\""));
    }

    #[test]
    fn test_touching_boxes_are_not_an_overlap() {
        let family = Family::new(&[Person::new("a"), Person::new("b")], &[]).unwrap();
        let layout = layout_with(&[("a", 2.4, 0), ("b", 3.2, 0)], vec![]);
        let warnings = check(&family, &layout, &LayoutConfig::default());
        assert!(warnings.is_empty(), "{:?}", warnings);
    }

    #[test]
    fn test_distant_partners_flagged() {
        let family = Family::new(
            &[Person::new("a"), Person::new("x"), Person::new("b")],
            &[],
        )
        .unwrap();
        let layout = layout_with(
            &[("a", 0.0, 0), ("x", 1.0, 0), ("b", 2.0, 0)],
            vec![couple("a", "b", &[])],
        );
        let warnings = check(&family, &layout, &LayoutConfig::default());
        assert!(categories(&warnings).contains(&LintCategory::Adjacency));
    }

    #[test]
    fn test_sibling_order_and_depth() {
        let people = [
            Person::new("a"),
            Person::new("b"),
            Person::new("old").with_father("a").with_mother("b").with_age(40.0),
            Person::new("young").with_father("a").with_mother("b").with_age(30.0),
        ];
        let family = Family::new(&people, &[]).unwrap();
        let layout = layout_with(
            &[("a", 0.0, 0), ("b", 1.0, 0), ("old", 1.0, 2), ("young", 0.0, 2)],
            vec![couple("a", "b", &["old", "young"])],
        );
        let found = categories(&check(&family, &layout, &LayoutConfig::default()));
        assert!(found.contains(&LintCategory::SiblingOrder));
        assert!(found.contains(&LintCategory::Depth));
    }

    #[test]
    fn test_segment_crosses_bbox() {
        let bbox = BoundingBox::new(10.0, 10.0, 20.0, 20.0);
        assert!(line_segment_intersects_bbox(
            &Point::new(0.0, 20.0),
            &Point::new(40.0, 20.0),
            &bbox
        ));
        assert!(!line_segment_intersects_bbox(
            &Point::new(0.0, 0.0),
            &Point::new(5.0, 5.0),
            &bbox
        ));
    }

    #[test]
    fn test_computed_layout_is_clean() {
        let people = [
            Person::new("a").with_relation(crate::model::Relation::Myself),
            Person::new("b"),
            Person::new("c").with_father("a").with_mother("b").with_age(35.0),
            Person::new("d").with_father("a").with_mother("b").with_age(32.0),
        ];
        let family = Family::new(&people, &[]).unwrap();
        let config = LayoutConfig::default();
        let layout = crate::layout::compute(&family, &config);
        let warnings = check(&family, &layout, &config);
        assert!(warnings.is_empty(), "unexpected warnings: {:?}", warnings);
    }
}

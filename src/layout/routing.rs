//! Connector routing
//!
//! Turns grid positions into connector geometry: a bracket joining each
//! couple and an orthogonal drop from that bracket (or from a lone parent)
//! into every child. Each connector is computed independently from the two
//! or three boxes it touches.

use std::collections::BTreeMap;

use tracing::debug;

use crate::model::PersonId;

use super::config::LayoutConfig;
use super::types::{
    BoundingBox, Connector, DropLine, Endpoint, Node, Point, Union, UnionBar, UnionMembers,
};

const EPSILON: f64 = 1e-9;

/// Edge of a person box that a connector attaches to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Top,
    Bottom,
}

/// Midpoint of a box edge
pub fn attachment_point(bounds: &BoundingBox, edge: Edge) -> Point {
    let x = bounds.x + bounds.width / 2.0;
    match edge {
        Edge::Top => Point::new(x, bounds.y),
        Edge::Bottom => Point::new(x, bounds.bottom()),
    }
}

/// Route every connector, in union order with each bar before its drops
pub fn route_connectors(
    nodes: &BTreeMap<PersonId, Node>,
    unions: &[Union],
    config: &LayoutConfig,
) -> Vec<Connector> {
    let bounds_of = |id: &PersonId| nodes.get(id).map(|n| n.bounds(config));
    let mut connectors = Vec::new();

    for union in unions {
        let start = match &union.members {
            UnionMembers::Couple(a, b) => {
                let (Some(box_a), Some(box_b)) = (bounds_of(a), bounds_of(b)) else {
                    continue;
                };
                let bar = union_bar(union, (a, &box_a), (b, &box_b), config);
                let start = (Endpoint::Bar(union.id.clone()), bar.center);
                connectors.push(Connector::UnionBar(bar));
                start
            }
            UnionMembers::Single(parent) => {
                let Some(parent_box) = bounds_of(parent) else {
                    continue;
                };
                (
                    Endpoint::Person(parent.clone()),
                    attachment_point(&parent_box, Edge::Bottom),
                )
            }
        };

        for child in &union.children {
            let Some(child_box) = bounds_of(child) else {
                continue;
            };
            connectors.push(Connector::DropLine(drop_line(
                start.0.clone(),
                start.1,
                child,
                &child_box,
                config,
            )));
        }
    }

    debug!(connectors = connectors.len(), "connectors routed");
    connectors
}

/// Bracket from both member boxes down to a shared bar line
fn union_bar(
    union: &Union,
    a: (&PersonId, &BoundingBox),
    b: (&PersonId, &BoundingBox),
    config: &LayoutConfig,
) -> UnionBar {
    let from_a = attachment_point(a.1, Edge::Bottom);
    let from_b = attachment_point(b.1, Edge::Bottom);
    let bar_y = from_a.y.max(from_b.y) + config.union_bar_offset;
    let (row_a, row_b) = (row_of(a.1, config), row_of(b.1, config));

    UnionBar {
        union: union.id.clone(),
        center: Point::new((from_a.x + from_b.x) / 2.0, bar_y),
        row: row_a.min(row_b),
        width: (from_b.x - from_a.x).abs(),
        members: vec![a.0.clone(), b.0.clone()],
        path: vec![
            from_a,
            Point::new(from_a.x, bar_y),
            Point::new(from_b.x, bar_y),
            from_b,
        ],
    }
}

/// Z-shaped drop: down to the trunk line, across, then into the child's top
fn drop_line(
    from: Endpoint,
    start: Point,
    child: &PersonId,
    child_box: &BoundingBox,
    config: &LayoutConfig,
) -> DropLine {
    let target = attachment_point(child_box, Edge::Top);
    let gap = config.row_height - config.node_size.1;
    let mut trunk_y = target.y - gap / 2.0;
    if trunk_y <= start.y {
        trunk_y = (start.y + target.y) / 2.0;
    }
    let via = Point::new(start.x, trunk_y);

    let path = if (start.x - target.x).abs() < EPSILON {
        vec![start, target]
    } else {
        vec![start, via, Point::new(target.x, trunk_y), target]
    };

    DropLine {
        from,
        to: child.clone(),
        via,
        path,
    }
}

fn row_of(bounds: &BoundingBox, config: &LayoutConfig) -> i32 {
    (bounds.y / config.row_height).round() as i32
}

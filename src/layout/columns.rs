//! Column assignment
//!
//! Greedy, single pass over the generation rows from top to bottom. Each
//! union reserves a contiguous block for its children in the next row and is
//! centered above it; childless couples are kept side by side; everyone else
//! is appended at the right edge of their row.
//!
//! Every placement goes through [`Grid::is_free`], so two nodes of one row
//! are never closer than [`LayoutConfig::min_separation`].

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use tracing::{debug, trace};

use crate::model::{Family, PersonId};

use super::config::LayoutConfig;
use super::generation::GenerationMap;
use super::types::{Node, Union};

const EPSILON: f64 = 1e-9;

/// Placement state: occupied columns and the next free column per row
struct Grid<'a> {
    config: &'a LayoutConfig,
    rows: HashMap<PersonId, i32>,
    placed: BTreeMap<PersonId, Node>,
    occupied: BTreeMap<i32, Vec<f64>>,
    cursor: BTreeMap<i32, f64>,
}

impl<'a> Grid<'a> {
    fn new(config: &'a LayoutConfig, rows: HashMap<PersonId, i32>) -> Self {
        Self {
            config,
            rows,
            placed: BTreeMap::new(),
            occupied: BTreeMap::new(),
            cursor: BTreeMap::new(),
        }
    }

    fn row_of(&self, id: &PersonId) -> Option<i32> {
        self.rows.get(id).copied()
    }

    fn column_of(&self, id: &PersonId) -> Option<f64> {
        self.placed.get(id).map(|n| n.column)
    }

    fn is_placed(&self, id: &PersonId) -> bool {
        self.placed.contains_key(id)
    }

    fn cursor(&self, row: i32) -> f64 {
        self.cursor.get(&row).copied().unwrap_or(0.0)
    }

    fn is_free(&self, row: i32, column: f64) -> bool {
        let min = self.config.min_separation() - EPSILON;
        self.occupied
            .get(&row)
            .map_or(true, |cols| cols.iter().all(|c| (c - column).abs() >= min))
    }

    /// Place at `desired` when free, otherwise at the row's cursor
    fn place_near(&mut self, id: &PersonId, desired: f64) -> Option<f64> {
        if self.is_placed(id) {
            return self.column_of(id);
        }
        let row = self.row_of(id)?;
        let column = if self.is_free(row, desired) {
            desired
        } else {
            self.cursor(row)
        };
        trace!(person = %id, row, column, "placed");
        self.placed.insert(id.clone(), Node::new(column, row));
        self.occupied.entry(row).or_default().push(column);
        let next = self.cursor(row).max(column + 1.0);
        self.cursor.insert(row, next);
        Some(column)
    }

    /// Place `partner` next to an already placed person: right side, then left
    fn place_beside(&mut self, partner: &PersonId, anchor: &PersonId) -> Option<f64> {
        let (Some(row), Some(anchor_column)) = (self.row_of(partner), self.column_of(anchor))
        else {
            return None;
        };
        if self.row_of(anchor) == Some(row) {
            let gap = self.config.spouse_gap();
            for desired in [anchor_column + gap, anchor_column - gap] {
                if self.is_free(row, desired) {
                    return self.place_near(partner, desired);
                }
            }
        }
        let cursor = self.cursor(row);
        self.place_near(partner, cursor)
    }
}

/// Assign a grid position to every person in the family
pub fn assign_columns(
    family: &Family,
    generations: &GenerationMap,
    unions: &[Union],
    config: &LayoutConfig,
) -> BTreeMap<PersonId, Node> {
    let rows: HashMap<PersonId, i32> = family
        .people()
        .iter()
        .filter_map(|p| Some((p.id.clone(), generations.row(&p.id)?)))
        .collect();
    let row_list: BTreeSet<i32> = rows.values().copied().collect();
    let min_depth = generations.min_depth();

    let child_of: HashSet<&PersonId> = unions.iter().flat_map(|u| u.children.iter()).collect();

    let mut grid = Grid::new(config, rows);

    for &row in &row_list {
        let in_row: Vec<(usize, &Union)> = unions
            .iter()
            .enumerate()
            .filter(|(_, u)| u.generation - min_depth == row)
            .collect();

        // Child-bearing unions, left to right by their already placed members
        let mut with_children: Vec<(f64, usize, &Union)> = in_row
            .iter()
            .filter(|(_, u)| {
                u.children
                    .iter()
                    .any(|c| grid.row_of(c) == Some(row + 1) && !grid.is_placed(c))
            })
            .map(|&(i, u)| {
                let leftmost = u
                    .members
                    .ids()
                    .into_iter()
                    .filter_map(|m| grid.column_of(m))
                    .fold(f64::INFINITY, f64::min);
                (leftmost, i, u)
            })
            .collect();
        with_children.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        for (_, _, union) in with_children {
            place_family_block(&mut grid, union, row, unions, &child_of);
        }

        for (_, union) in &in_row {
            place_members(&mut grid, union);
        }

        place_leftovers(&mut grid, family, row);
    }

    let mut nodes = grid.placed;
    if let Some(min) = nodes.values().map(|n| n.column).reduce(f64::min) {
        for node in nodes.values_mut() {
            node.column -= min;
        }
    }
    debug!(nodes = nodes.len(), rows = row_list.len(), "columns assigned");
    nodes
}

/// Reserve the children block of `union` in the next row and center the
/// members above it
fn place_family_block(
    grid: &mut Grid<'_>,
    union: &Union,
    row: i32,
    unions: &[Union],
    child_of: &HashSet<&PersonId>,
) {
    let next = row + 1;
    let children: Vec<&PersonId> = union
        .children
        .iter()
        .filter(|c| grid.row_of(c) == Some(next) && !grid.is_placed(c))
        .collect();
    if children.is_empty() {
        return;
    }

    // Relative offsets: children one column apart, married-in partners beside them
    let gap = grid.config.spouse_gap();
    let mut block: Vec<(&PersonId, f64)> = Vec::new();
    let mut reserved: HashSet<&PersonId> = HashSet::new();
    let mut last = 0.0;
    let mut last_child = 0.0;
    for (i, &child) in children.iter().enumerate() {
        let position = if i == 0 { 0.0 } else { last + 1.0 };
        block.push((child, position));
        last = position;
        last_child = position;

        for candidate in unions.iter().filter(|u| u.members.contains(child)) {
            let Some(partner) = candidate.members.partner_of(child) else {
                continue;
            };
            let married_in = !grid.is_placed(partner)
                && !child_of.contains(partner)
                && grid.row_of(partner) == Some(next)
                && !reserved.contains(partner);
            if married_in {
                reserved.insert(partner);
                last += gap;
                block.push((partner, last));
            }
        }
    }
    let mid = last_child / 2.0;

    let members = union.members.ids();
    let any_placed = members.iter().any(|m| grid.is_placed(m));
    let center = if any_placed {
        place_members(grid, union);
        let columns: Vec<f64> = members.iter().filter_map(|m| grid.column_of(m)).collect();
        columns.iter().sum::<f64>() / columns.len().max(1) as f64
    } else {
        let offset = if union.members.is_couple() {
            grid.config.partner_offset()
        } else {
            0.0
        };
        let member_floor = members
            .iter()
            .enumerate()
            .filter_map(|(i, m)| {
                let cursor = grid.cursor(grid.row_of(m)?);
                Some(if i == 0 { cursor + offset } else { cursor - offset })
            })
            .fold(f64::NEG_INFINITY, f64::max);
        let center = (grid.cursor(next) + mid).max(member_floor);
        for (i, member) in members.iter().enumerate() {
            let desired = if i == 0 { center - offset } else { center + offset };
            grid.place_near(member, desired);
        }
        center
    };

    let start = (center - mid).max(grid.cursor(next));
    for (id, position) in block {
        grid.place_near(id, start + position);
    }
    trace!(union = %union.id, center, start, "family block placed");
}

/// Place whichever members of `union` are still unplaced, keeping a couple
/// side by side
fn place_members(grid: &mut Grid<'_>, union: &Union) {
    let members = union.members.ids();
    let placed: Vec<&PersonId> = members
        .iter()
        .copied()
        .filter(|m| grid.is_placed(m))
        .collect();

    match placed.first() {
        Some(&anchor) => {
            for member in &members {
                if !grid.is_placed(member) {
                    grid.place_beside(member, anchor);
                }
            }
        }
        None => {
            let Some((first, rest)) = members.split_first() else {
                return;
            };
            let Some(row) = grid.row_of(first) else {
                return;
            };
            let cursor = grid.cursor(row);
            grid.place_near(first, cursor);
            for member in rest {
                grid.place_beside(member, first);
            }
        }
    }
}

/// Append everyone still unplaced in `row`: self anchor first, then by
/// descending age, then by id
fn place_leftovers(grid: &mut Grid<'_>, family: &Family, row: i32) {
    let mut leftovers: Vec<_> = family
        .people()
        .iter()
        .filter(|p| grid.row_of(&p.id) == Some(row) && !grid.is_placed(&p.id))
        .collect();
    leftovers.sort_by(|a, b| {
        b.is_anchor()
            .cmp(&a.is_anchor())
            .then(b.birth_order_hint.total_cmp(&a.birth_order_hint))
            .then(a.id.cmp(&b.id))
    });
    for person in leftovers {
        let cursor = grid.cursor(row);
        grid.place_near(&person.id, cursor);
    }
}

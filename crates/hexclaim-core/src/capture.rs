//! Enclosure capture.
//!
//! A cell not owned by the claiming side survives only if a path of cells
//! not owned by that side connects it to the board's outer ring. Everything
//! else is enclosed and changes hands. This is the territory rule of Go or
//! Qix applied to a hex grid.
//!
//! Rock cells take part like any other cell: they can relay an escape path
//! and can themselves be enclosed, in which case their stored owner changes
//! while they stay impassable.

use crate::board::{Board, Owner};
use crate::hex::HexCoord;
use std::collections::{HashSet, VecDeque};

/// Cells that can reach the boundary without crossing `owner` territory
fn escapable(board: &Board, owner: Owner) -> HashSet<HexCoord> {
    let mut reached = HashSet::new();
    let mut queue = VecDeque::new();

    for cell in board.cells() {
        if cell.owner != owner && board.is_boundary(&cell.coord) {
            reached.insert(cell.coord);
            queue.push_back(cell.coord);
        }
    }

    while let Some(current) = queue.pop_front() {
        for next in current.neighbors() {
            if reached.contains(&next) {
                continue;
            }
            if board.owner_at(&next).is_some_and(|o| o != owner) {
                reached.insert(next);
                queue.push_back(next);
            }
        }
    }

    reached
}

/// Reassign every enclosed cell to `owner`.
///
/// Runs in time linear in the number of cells and is idempotent: a second
/// call with the same owner changes nothing. Returns the captured
/// coordinates in (q, r) order.
pub fn capture_enclosed(board: &mut Board, owner: Owner) -> Vec<HexCoord> {
    let reached = escapable(board, owner);

    let mut captured = Vec::new();
    for cell in board.cells_mut() {
        if cell.owner != owner && !reached.contains(&cell.coord) {
            cell.owner = owner;
            captured.push(cell.coord);
        }
    }
    captured
}

/// Cells that `capture_enclosed` would take, without changing the board
pub fn enclosed_cells(board: &Board, owner: Owner) -> Vec<HexCoord> {
    let reached = escapable(board, owner);
    board
        .cells()
        .filter(|c| c.owner != owner && !reached.contains(&c.coord))
        .map(|c| c.coord)
        .collect()
}

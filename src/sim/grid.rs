//! Grid occupancy
//!
//! Fixed cells, each empty or holding exactly one active drop.

use rand::Rng;

use super::state::{ActiveDrop, CellId, DropId};
use crate::error::{Result, SimError};

#[derive(Debug, Clone)]
pub struct GridModel {
    cells: Vec<Option<ActiveDrop>>,
}

impl GridModel {
    pub fn new(size: usize) -> Self {
        Self {
            cells: vec![None; size],
        }
    }

    pub fn size(&self) -> usize {
        self.cells.len()
    }

    /// Uniformly random empty cell, `None` when the grid is full
    pub fn find_empty_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<CellId> {
        let empty: Vec<CellId> = self
            .cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_none())
            .map(|(i, _)| i)
            .collect();
        if empty.is_empty() {
            return None;
        }
        Some(empty[rng.random_range(0..empty.len())])
    }

    /// Place a drop. The cell must be empty.
    pub fn occupy(&mut self, cell: CellId, drop: ActiveDrop) -> Result<()> {
        let size = self.cells.len();
        let slot = self
            .cells
            .get_mut(cell)
            .ok_or(SimError::UnknownCell { cell, size })?;
        if slot.is_some() {
            return Err(SimError::CellOccupied(cell));
        }
        *slot = Some(drop);
        Ok(())
    }

    /// Empty a cell, returning what was there. Releasing an empty cell is a no-op.
    pub fn release(&mut self, cell: CellId) -> Option<ActiveDrop> {
        self.cells.get_mut(cell).and_then(Option::take)
    }

    /// Release a cell only if it still holds the given drop
    pub fn release_drop(&mut self, cell: CellId, drop: DropId) -> Option<ActiveDrop> {
        match self.get(cell) {
            Some(active) if active.id == drop => self.release(cell),
            _ => None,
        }
    }

    pub fn get(&self, cell: CellId) -> Option<&ActiveDrop> {
        self.cells.get(cell).and_then(Option::as_ref)
    }

    pub fn is_occupied(&self, cell: CellId) -> bool {
        self.get(cell).is_some()
    }

    /// Find the cell holding a drop
    pub fn locate(&self, drop: DropId) -> Option<CellId> {
        self.cells
            .iter()
            .position(|c| c.as_ref().is_some_and(|d| d.id == drop))
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// Active drops in cell order
    pub fn drops(&self) -> impl Iterator<Item = &ActiveDrop> {
        self.cells.iter().flatten()
    }

    /// Empty every cell, returning the removed drops
    pub fn clear(&mut self) -> Vec<ActiveDrop> {
        self.cells.iter_mut().filter_map(Option::take).collect()
    }
}

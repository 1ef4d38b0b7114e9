/*!
Cell selection.

Three orders --- linear (first open cell), concentric (best open cell in the
first open band of the (max-index, id) order), concentric-band (best open
cell within the currently-constrained band, falling back to concentric) ---
crossed with five measures: none, most occurrences, most propagations, most
contradictions, most crossed-off values.
The propagation-counting measures try every value of the candidate cell
speculatively and unwind; ties always break to the lowest cell id, and
skolem-constant cells come last.
*/

use crate::config::{SelectionMeasure, SelectionOrder};
use crate::mace::cells::Space;
use crate::structures::term::TermArena;

impl Space {
    fn num_occurrences(&self, id: usize) -> isize {
        self.cells[id].occurrences.len() as isize
    }

    fn num_crossed(&self, id: usize) -> isize {
        (self.cell_range(id) - self.cells[id].possible.count()) as isize
    }

    /// Total propagations over all speculative assignments of the cell.
    fn num_propagations(&mut self, terms: &mut TermArena, id: usize) -> isize {
        let saved = self.stats.propagations;
        let mut total = 0;
        for v in 0..self.cell_range(id) {
            let before = self.stats.propagations;
            match self.assign_and_propagate(terms, id, v) {
                Ok(mark) => self.restore_to(terms, mark),
                Err(_) => {}
            }
            total += self.stats.propagations - before;
        }
        self.stats.propagations = saved;
        total as isize
    }

    /// How many speculative assignments contradict; gives up (-1) once the
    /// best seen so far is out of reach.
    fn num_contradictions(&mut self, terms: &mut TermArena, id: usize, best: isize) -> isize {
        let saved = self.stats.propagations;
        let range = self.cell_range(id);
        let mut n = 0;
        for v in 0..range {
            match self.assign_and_propagate(terms, id, v) {
                Ok(mark) => self.restore_to(terms, mark),
                Err(_) => n += 1,
            }
            let to_try = (range - v - 1) as isize;
            if n + to_try <= best {
                self.stats.propagations = saved;
                return -1;
            }
        }
        self.stats.propagations = saved;
        n
    }

    fn apply_measure(
        &mut self,
        terms: &mut TermArena,
        measure: SelectionMeasure,
        id: usize,
        best: &mut isize,
        best_id: &mut Option<usize>,
    ) {
        let score = match measure {
            SelectionMeasure::None => 0,
            SelectionMeasure::MostOccurrences => self.num_occurrences(id),
            SelectionMeasure::MostPropagations => self.num_propagations(terms, id),
            SelectionMeasure::MostContradictions => self.num_contradictions(terms, id, *best),
            SelectionMeasure::MostCrossed => self.num_crossed(id),
        };
        if score > *best {
            *best = score;
            *best_id = Some(id);
        }
    }

    fn select_linear(
        &mut self,
        terms: &mut TermArena,
        measure: SelectionMeasure,
        lo: usize,
        hi: usize,
    ) -> Option<usize> {
        if measure == SelectionMeasure::None {
            return self.ordered_cells[lo..hi]
                .iter()
                .copied()
                .find(|&id| self.cells[id].value.is_none());
        }
        let mut best = -1;
        let mut best_id = None;
        for i in lo..hi {
            let id = self.ordered_cells[i];
            if self.cells[id].value.is_none() {
                self.apply_measure(terms, measure, id, &mut best, &mut best_id);
            }
        }
        best_id
    }

    fn select_concentric(
        &mut self,
        terms: &mut TermArena,
        measure: SelectionMeasure,
        lo: usize,
        hi: usize,
    ) -> Option<usize> {
        let first_open = (lo..hi).find(|&i| {
            let id = self.ordered_cells[i];
            self.cells[id].value.is_none()
        })?;
        let band = self.cells[self.ordered_cells[first_open]].max_index;

        let mut best = -1;
        let mut best_id = None;
        let mut i = first_open;
        while i < hi && self.cells[self.ordered_cells[i]].max_index <= band {
            let id = self.ordered_cells[i];
            if self.cells[id].value.is_none() {
                self.apply_measure(terms, measure, id, &mut best, &mut best_id);
            }
            i += 1;
        }
        best_id
    }

    fn select_concentric_band(
        &mut self,
        terms: &mut TermArena,
        measure: SelectionMeasure,
        lo: usize,
        hi: usize,
        max_constrained: isize,
    ) -> Option<usize> {
        let mut best = -1;
        let mut best_id = None;
        let mut i = lo;
        while i < hi && self.cells[self.ordered_cells[i]].max_index <= max_constrained {
            let id = self.ordered_cells[i];
            if self.cells[id].value.is_none() {
                self.apply_measure(terms, measure, id, &mut best, &mut best_id);
            }
            i += 1;
        }
        // Nothing in the band: fall back to the plain concentric order.
        best_id.or_else(|| self.select_concentric(terms, measure, lo, hi))
    }

    /// The next cell to decide, or None when every cell is assigned.
    pub fn select_cell(
        &mut self,
        terms: &mut TermArena,
        order: SelectionOrder,
        measure: SelectionMeasure,
        max_constrained: isize,
    ) -> Option<usize> {
        let sections = [(0, self.first_skolem_cell), (self.first_skolem_cell, self.number_of_cells())];
        for (lo, hi) in sections {
            let found = match order {
                SelectionOrder::Linear => self.select_linear(terms, measure, lo, hi),
                SelectionOrder::Concentric => self.select_concentric(terms, measure, lo, hi),
                SelectionOrder::ConcentricBand => {
                    self.select_concentric_band(terms, measure, lo, hi, max_constrained)
                }
            };
            if found.is_some() {
                self.stats.selections += 1;
                return found;
            }
        }
        None
    }
}

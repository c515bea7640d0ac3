//! Dense two-phase tableau Simplex for the LP-based discounted solvers.
//!
//! Variables may be free. Every free variable `x_i` is written as `x'_i - W`
//! with one auxiliary `W >= 0` shared by all of them; a variable with a finite
//! lower bound `l` is written as `y + l`. After that substitution every
//! tableau column is non-negative and the usual slack / surplus / artificial
//! setup applies. Rows with a negative right-hand side are flipped first.
//!
//! Phase one maximises `-Σ artificials` and then drives any artificial still
//! in the basis out of it. Phase two optimises the real objective. The
//! objective can be replaced afterwards and re-optimised from the current
//! feasible basis.

use tracing::trace;

use crate::error::SimplexError;

/// Tolerance for pivots, ratio tests and reduced costs
pub const EPSILON: f64 = 1e-8;

/// `max objective · x` subject to `row_lower <= rows · x <= row_upper` and
/// `var_lower <= x <= var_upper`. Infinite bounds are allowed on both.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearProgram {
    pub objective: Vec<f64>,
    pub rows: Vec<Vec<f64>>,
    pub row_lower: Vec<f64>,
    pub row_upper: Vec<f64>,
    pub var_lower: Vec<f64>,
    pub var_upper: Vec<f64>,
}

impl LinearProgram {
    /// An LP over `variables` free variables with a zero objective and no rows.
    pub fn new(variables: usize) -> Self {
        LinearProgram {
            objective: vec![0.0; variables],
            rows: Vec::new(),
            row_lower: Vec::new(),
            row_upper: Vec::new(),
            var_lower: vec![f64::NEG_INFINITY; variables],
            var_upper: vec![f64::INFINITY; variables],
        }
    }

    pub fn variables(&self) -> usize {
        self.objective.len()
    }

    pub fn constraints(&self) -> usize {
        self.rows.len()
    }

    pub fn add_row(&mut self, coeffs: Vec<f64>, lower: f64, upper: f64) {
        self.rows.push(coeffs);
        self.row_lower.push(lower);
        self.row_upper.push(upper);
    }

    pub fn set_bounds(&mut self, var: usize, lower: f64, upper: f64) {
        self.var_lower[var] = lower;
        self.var_upper[var] = upper;
    }

    fn check(&self) -> Result<(), SimplexError> {
        let n = self.variables();
        if self.var_lower.len() != n || self.var_upper.len() != n {
            return Err(SimplexError::Dimension(format!(
                "{n} variables but {} lower / {} upper bounds",
                self.var_lower.len(),
                self.var_upper.len()
            )));
        }
        if self.row_lower.len() != self.rows.len() || self.row_upper.len() != self.rows.len() {
            return Err(SimplexError::Dimension(format!(
                "{} rows but {} lower / {} upper bounds",
                self.rows.len(),
                self.row_lower.len(),
                self.row_upper.len()
            )));
        }
        if let Some((r, row)) = self.rows.iter().enumerate().find(|(_, row)| row.len() != n) {
            return Err(SimplexError::Dimension(format!(
                "row {r} has {} coefficients, expected {n}",
                row.len()
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Shift {
    /// `x = y + l`
    Lower(f64),
    /// `x = y - W`
    Free,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Sense {
    Le,
    Ge,
    Eq,
}

/// Tableau state of one linear program.
#[derive(Debug, Clone)]
pub struct Simplex {
    shift: Vec<Shift>,
    /// Column of the shared `W`, if any variable is free
    free_column: Option<usize>,
    /// Constraint rows; the last entry of each is the right-hand side
    tableau: Vec<Vec<f64>>,
    /// Reduced costs `z_j - c_j`; the last entry is the objective value
    costs: Vec<f64>,
    basis: Vec<usize>,
    /// Columns at or past this index are artificial
    artificial_start: usize,
    columns: usize,
    objective: Vec<f64>,
    phase_one_done: bool,
    pivots: usize,
}

impl Simplex {
    /// Build the initial tableau. Nothing is pivoted yet.
    pub fn new(lp: LinearProgram) -> Result<Self, SimplexError> {
        lp.check()?;
        let vars = lp.variables();

        let mut shift = Vec::with_capacity(vars);
        for i in 0..vars {
            let (lo, hi) = (lp.var_lower[i], lp.var_upper[i]);
            if lo > hi {
                return Err(SimplexError::Infeasible(lo - hi));
            }
            shift.push(if lo.is_finite() {
                Shift::Lower(lo)
            } else {
                Shift::Free
            });
        }
        let free_column = shift.contains(&Shift::Free).then_some(vars);
        let structural = vars + usize::from(free_column.is_some());

        // rows in y-space, before slacks
        let mut rows: Vec<(Vec<f64>, Sense, f64)> = Vec::new();
        let mut push = |coeffs: Vec<f64>, lower: f64, upper: f64| {
            if lower == upper {
                rows.push((coeffs, Sense::Eq, lower));
                return;
            }
            if lower.is_finite() {
                rows.push((coeffs.clone(), Sense::Ge, lower));
            }
            if upper.is_finite() {
                rows.push((coeffs, Sense::Le, upper));
            }
        };
        for (r, a) in lp.rows.iter().enumerate() {
            let (coeffs, offset) = substitute(a, &shift, structural);
            push(coeffs, lp.row_lower[r] - offset, lp.row_upper[r] - offset);
        }
        for i in 0..vars {
            let hi = lp.var_upper[i];
            if !hi.is_finite() {
                continue;
            }
            let mut unit = vec![0.0; vars];
            unit[i] = 1.0;
            let (coeffs, offset) = substitute(&unit, &shift, structural);
            push(coeffs, f64::NEG_INFINITY, hi - offset);
        }

        for (coeffs, sense, rhs) in rows.iter_mut() {
            if *rhs < 0.0 {
                coeffs.iter_mut().for_each(|c| *c = -*c);
                *rhs = -*rhs;
                *sense = match *sense {
                    Sense::Le => Sense::Ge,
                    Sense::Ge => Sense::Le,
                    Sense::Eq => Sense::Eq,
                };
            }
        }

        let slacks = rows.iter().filter(|(_, s, _)| *s != Sense::Eq).count();
        let artificials = rows.iter().filter(|(_, s, _)| *s != Sense::Le).count();
        let artificial_start = structural + slacks;
        let columns = artificial_start + artificials;

        let mut tableau = Vec::with_capacity(rows.len());
        let mut basis = Vec::with_capacity(rows.len());
        let (mut next_slack, mut next_artificial) = (structural, artificial_start);
        for (coeffs, sense, rhs) in rows {
            let mut row = vec![0.0; columns + 1];
            row[..structural].copy_from_slice(&coeffs);
            row[columns] = rhs;
            match sense {
                Sense::Le => {
                    row[next_slack] = 1.0;
                    basis.push(next_slack);
                    next_slack += 1;
                }
                Sense::Ge => {
                    row[next_slack] = -1.0;
                    next_slack += 1;
                    row[next_artificial] = 1.0;
                    basis.push(next_artificial);
                    next_artificial += 1;
                }
                Sense::Eq => {
                    row[next_artificial] = 1.0;
                    basis.push(next_artificial);
                    next_artificial += 1;
                }
            }
            tableau.push(row);
        }

        let mut simplex = Simplex {
            shift,
            free_column,
            tableau,
            costs: vec![0.0; columns + 1],
            basis,
            artificial_start,
            columns,
            objective: lp.objective,
            phase_one_done: artificials == 0,
            pivots: 0,
        };
        if simplex.phase_one_done {
            simplex.price_objective();
        } else {
            simplex.price_phase_one();
        }
        Ok(simplex)
    }

    /// Total number of pivots performed so far
    pub fn pivots(&self) -> usize {
        self.pivots
    }

    pub fn rows(&self) -> usize {
        self.tableau.len()
    }

    /// Phase one. Afterwards no artificial variable is basic with a non-zero
    /// value; artificials that cannot leave mark redundant rows.
    pub fn remove_artificial_variables(&mut self) -> Result<(), SimplexError> {
        if self.phase_one_done {
            return Ok(());
        }
        self.run()?;
        let residual = -self.costs[self.columns];
        if residual > EPSILON {
            return Err(SimplexError::Infeasible(residual));
        }
        for r in 0..self.tableau.len() {
            if self.basis[r] < self.artificial_start {
                continue;
            }
            let entering =
                (0..self.artificial_start).find(|&j| self.tableau[r][j].abs() > EPSILON);
            if let Some(j) = entering {
                self.pivot(r, j)?;
            }
        }
        self.phase_one_done = true;
        trace!(pivots = self.pivots, "phase one done");
        Ok(())
    }

    /// Drop the artificial columns, and the redundant rows whose basic
    /// variable is still artificial. Re-prices the objective.
    pub fn purge_artificial_columns(&mut self) -> Result<(), SimplexError> {
        self.remove_artificial_variables()?;
        if self.artificial_start == self.columns {
            return Ok(());
        }
        let keep = self.artificial_start;
        let mut tableau = Vec::with_capacity(self.tableau.len());
        let mut basis = Vec::with_capacity(self.basis.len());
        for (row, &b) in self.tableau.iter().zip(&self.basis) {
            if b >= keep {
                continue;
            }
            let mut trimmed = row[..keep].to_vec();
            trimmed.push(row[self.columns]);
            tableau.push(trimmed);
            basis.push(b);
        }
        self.tableau = tableau;
        self.basis = basis;
        self.columns = keep;
        self.price_objective();
        Ok(())
    }

    /// Phase two: optimise the current objective from the current basis.
    pub fn optimize(&mut self) -> Result<(), SimplexError> {
        self.purge_artificial_columns()?;
        self.run()
    }

    /// Replace the objective and re-price it against the current basis, so
    /// the next `optimize` starts from a feasible basis.
    pub fn set_objective(&mut self, coeffs: &[f64]) -> Result<(), SimplexError> {
        if coeffs.len() != self.shift.len() {
            return Err(SimplexError::Dimension(format!(
                "objective has {} coefficients, expected {}",
                coeffs.len(),
                self.shift.len()
            )));
        }
        self.objective = coeffs.to_vec();
        if self.artificial_start == self.columns {
            self.price_objective();
        }
        Ok(())
    }

    /// Values of the original variables and the objective value.
    pub fn solution(&self) -> (Vec<f64>, f64) {
        let mut y = vec![0.0; self.columns];
        for (row, &b) in self.tableau.iter().zip(&self.basis) {
            y[b] = row[self.columns];
        }
        let w = self.free_column.map_or(0.0, |c| y[c]);
        let x: Vec<f64> = self
            .shift
            .iter()
            .enumerate()
            .map(|(i, s)| match s {
                Shift::Lower(l) => y[i] + l,
                Shift::Free => y[i] - w,
            })
            .collect();
        let value = x.iter().zip(&self.objective).map(|(x, c)| x * c).sum();
        (x, value)
    }

    fn price_phase_one(&mut self) {
        let mut costs = vec![0.0; self.columns + 1];
        for c in &mut costs[self.artificial_start..self.columns] {
            *c = 1.0;
        }
        for (row, &b) in self.tableau.iter().zip(&self.basis) {
            if b >= self.artificial_start {
                for (c, a) in costs.iter_mut().zip(row) {
                    *c -= a;
                }
            }
        }
        self.costs = costs;
    }

    fn column_cost(&self, j: usize) -> f64 {
        if j < self.shift.len() {
            self.objective[j]
        } else if Some(j) == self.free_column {
            -self
                .shift
                .iter()
                .zip(&self.objective)
                .filter(|(s, _)| **s == Shift::Free)
                .map(|(_, c)| c)
                .sum::<f64>()
        } else {
            0.0
        }
    }

    fn price_objective(&mut self) {
        let mut costs: Vec<f64> = (0..self.columns).map(|j| -self.column_cost(j)).collect();
        costs.push(0.0);
        for r in 0..self.tableau.len() {
            let cb = self.column_cost(self.basis[r]);
            if cb != 0.0 {
                for (c, a) in costs.iter_mut().zip(&self.tableau[r]) {
                    *c += cb * a;
                }
            }
        }
        self.costs = costs;
    }

    /// Pivot until no reduced cost is negative. Dantzig's rule, switching to
    /// Bland's rule after a streak of degenerate pivots.
    fn run(&mut self) -> Result<(), SimplexError> {
        let size = self.tableau.len() + self.columns;
        let limit = 50 * size.max(1);
        let bland_after = 2 * size.max(1);
        let mut degenerate = 0usize;
        let mut steps = 0usize;
        loop {
            let entering = if degenerate >= bland_after {
                (0..self.columns).find(|&j| self.costs[j] < -EPSILON)
            } else {
                let mut best: Option<(usize, f64)> = None;
                for j in 0..self.columns {
                    let c = self.costs[j];
                    if c < -EPSILON && best.map_or(true, |(_, b)| c < b) {
                        best = Some((j, c));
                    }
                }
                best.map(|(j, _)| j)
            };
            let Some(col) = entering else {
                return Ok(());
            };

            let mut leaving: Option<(usize, f64)> = None;
            for (r, row) in self.tableau.iter().enumerate() {
                let a = row[col];
                if a <= EPSILON {
                    continue;
                }
                let ratio = row[self.columns] / a;
                let better = match leaving {
                    None => true,
                    Some((l, best)) => {
                        ratio < best - EPSILON
                            || (ratio <= best + EPSILON && self.basis[r] < self.basis[l])
                    }
                };
                if better {
                    leaving = Some((r, ratio));
                }
            }
            let Some((row, ratio)) = leaving else {
                return Err(SimplexError::Unbounded(col));
            };

            if steps >= limit {
                return Err(SimplexError::IterationLimit(limit));
            }
            steps += 1;
            self.pivot(row, col)?;
            if ratio.abs() < EPSILON {
                degenerate += 1;
            } else {
                degenerate = 0;
            }
        }
    }

    fn pivot(&mut self, row: usize, col: usize) -> Result<(), SimplexError> {
        let p = self.tableau[row][col];
        if p.abs() < EPSILON {
            return Err(SimplexError::NegligiblePivot(p));
        }
        let width = self.columns + 1;
        for x in &mut self.tableau[row][..width] {
            *x /= p;
        }
        let pivot_row = self.tableau[row].clone();
        for (r, other) in self.tableau.iter_mut().enumerate() {
            if r == row {
                continue;
            }
            eliminate(other, &pivot_row, col);
        }
        eliminate(&mut self.costs, &pivot_row, col);
        self.basis[row] = col;
        self.pivots += 1;
        Ok(())
    }
}

fn eliminate(target: &mut [f64], pivot_row: &[f64], col: usize) {
    let f = target[col];
    if f == 0.0 {
        return;
    }
    for (t, p) in target.iter_mut().zip(pivot_row) {
        *t -= f * p;
    }
}

/// Rewrite `a · x` over the shifted columns: returns the structural
/// coefficients and the constant that moves to the right-hand side.
fn substitute(a: &[f64], shift: &[Shift], structural: usize) -> (Vec<f64>, f64) {
    let mut coeffs = vec![0.0; structural];
    let mut offset = 0.0;
    let mut w = 0.0;
    for (i, (&ai, s)) in a.iter().zip(shift).enumerate() {
        coeffs[i] = ai;
        match s {
            Shift::Lower(l) => offset += ai * l,
            Shift::Free => w -= ai,
        }
    }
    if structural > shift.len() {
        coeffs[shift.len()] = w;
    }
    (coeffs, offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solve(lp: LinearProgram) -> Result<(Vec<f64>, f64), SimplexError> {
        let mut s = Simplex::new(lp)?;
        s.remove_artificial_variables()?;
        s.purge_artificial_columns()?;
        s.optimize()?;
        Ok(s.solution())
    }

    /// max 3x + 5y  s.t.  x <= 4, 2y <= 12, 3x + 2y <= 18, x, y >= 0
    fn textbook() -> LinearProgram {
        let mut lp = LinearProgram::new(2);
        lp.objective = vec![3.0, 5.0];
        lp.set_bounds(0, 0.0, f64::INFINITY);
        lp.set_bounds(1, 0.0, f64::INFINITY);
        lp.add_row(vec![1.0, 0.0], f64::NEG_INFINITY, 4.0);
        lp.add_row(vec![0.0, 2.0], f64::NEG_INFINITY, 12.0);
        lp.add_row(vec![3.0, 2.0], f64::NEG_INFINITY, 18.0);
        lp
    }

    #[test]
    fn test_textbook_optimum() {
        let (x, value) = solve(textbook()).unwrap();
        assert!((value - 36.0).abs() < 1e-6);
        assert!((x[0] - 2.0).abs() < 1e-6);
        assert!((x[1] - 6.0).abs() < 1e-6);
    }

    #[test]
    fn test_free_variables_and_equality() {
        // max -x + 2y  s.t.  x + y = 2, x - y >= -4; optimum at (-1, 3)
        let mut lp = LinearProgram::new(2);
        lp.objective = vec![-1.0, 2.0];
        lp.add_row(vec![1.0, 1.0], 2.0, 2.0);
        lp.add_row(vec![1.0, -1.0], -4.0, f64::INFINITY);
        let (x, value) = solve(lp).unwrap();
        assert!((value - 7.0).abs() < 1e-6);
        assert!((x[0] + 1.0).abs() < 1e-6);
        assert!((x[1] - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_warm_start_with_new_objective() {
        let mut s = Simplex::new(textbook()).unwrap();
        s.optimize().unwrap();
        let first = s.pivots();
        s.set_objective(&[1.0, 0.0]).unwrap();
        s.optimize().unwrap();
        let (x, value) = s.solution();
        assert!((value - 4.0).abs() < 1e-6);
        assert!((x[0] - 4.0).abs() < 1e-6);
        assert!(s.pivots() >= first);
    }

    #[test]
    fn test_infeasible() {
        let mut lp = LinearProgram::new(1);
        lp.set_bounds(0, 0.0, f64::INFINITY);
        lp.add_row(vec![1.0], f64::NEG_INFINITY, 1.0);
        lp.add_row(vec![1.0], 2.0, f64::INFINITY);
        assert!(matches!(solve(lp), Err(SimplexError::Infeasible(_))));
    }

    #[test]
    fn test_unbounded() {
        let mut lp = LinearProgram::new(1);
        lp.objective = vec![1.0];
        lp.set_bounds(0, 0.0, f64::INFINITY);
        assert!(matches!(solve(lp), Err(SimplexError::Unbounded(_))));
    }

    #[test]
    fn test_dimension_mismatch() {
        let mut lp = LinearProgram::new(2);
        lp.add_row(vec![1.0], 0.0, 1.0);
        assert!(matches!(Simplex::new(lp), Err(SimplexError::Dimension(_))));
    }

    #[test]
    fn test_variable_upper_bound() {
        // max x + y  s.t.  x <= 1.5 (bound), y in [-2, 3] (bound), x + y <= 4
        let mut lp = LinearProgram::new(2);
        lp.objective = vec![1.0, 1.0];
        lp.set_bounds(0, f64::NEG_INFINITY, 1.5);
        lp.set_bounds(1, -2.0, 3.0);
        lp.add_row(vec![1.0, 1.0], f64::NEG_INFINITY, 4.0);
        let (_, value) = solve(lp).unwrap();
        assert!((value - 4.0).abs() < 1e-6);
    }
}

//! Hungarian (Kuhn-Munkres) solver for rectangular cost matrices.
//!
//! Classical O(n²·m) potential-based formulation: each row is inserted in
//! turn and a shortest augmenting path is found Dijkstra-style over reduced
//! costs, updating row/column potentials as it goes.

/// Solves the linear assignment problem on a matrix of finite costs.
///
/// Returns `(row, col)` pairs forming a minimum-cost matching of size
/// `min(rows, cols)`, sorted by row. Rows must all have the same length.
/// A row that cannot reach any column through finite reduced costs is left
/// unmatched instead of spinning.
pub fn solve(cost: &[Vec<f64>]) -> Vec<(usize, usize)> {
    let rows = cost.len();
    let cols = cost.first().map_or(0, Vec::len);
    if rows == 0 || cols == 0 {
        return Vec::new();
    }

    if rows <= cols {
        solve_wide(cost, rows, cols)
    } else {
        // Work on the transpose so that rows <= cols.
        let transposed: Vec<Vec<f64>> = (0..cols)
            .map(|j| (0..rows).map(|i| cost[i][j]).collect())
            .collect();
        let mut pairs: Vec<(usize, usize)> = solve_wide(&transposed, cols, rows)
            .into_iter()
            .map(|(c, r)| (r, c))
            .collect();
        pairs.sort_unstable();
        pairs
    }
}

/// Core solver; requires `n <= m`.
fn solve_wide(cost: &[Vec<f64>], n: usize, m: usize) -> Vec<(usize, usize)> {
    // u[i], v[j]: row/column potentials (1-indexed; index 0 is the dummy).
    let mut u = vec![0.0_f64; n + 1];
    let mut v = vec![0.0_f64; m + 1];
    // p[j]: 1-indexed row matched to column j (0 = free).
    let mut p = vec![0_usize; m + 1];
    // way[j]: previous column on the augmenting path to j.
    let mut way = vec![0_usize; m + 1];

    for i in 1..=n {
        p[0] = i;
        let mut j0 = 0_usize;
        let mut min_val = vec![f64::INFINITY; m + 1];
        let mut used = vec![false; m + 1];
        let mut augmented = true;

        loop {
            used[j0] = true;
            let i0 = p[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0_usize;

            for j in 1..=m {
                if used[j] {
                    continue;
                }
                let reduced = cost[i0 - 1][j - 1] - u[i0] - v[j];
                if reduced < min_val[j] {
                    min_val[j] = reduced;
                    way[j] = j0;
                }
                if min_val[j] < delta {
                    delta = min_val[j];
                    j1 = j;
                }
            }

            if j1 == 0 || !delta.is_finite() {
                augmented = false;
                break;
            }

            for j in 0..=m {
                if used[j] {
                    u[p[j]] += delta;
                    v[j] -= delta;
                } else {
                    min_val[j] -= delta;
                }
            }

            j0 = j1;
            if p[j0] == 0 {
                break;
            }
        }

        if !augmented {
            continue;
        }

        // Flip the augmenting path.
        loop {
            let prev = way[j0];
            p[j0] = p[prev];
            j0 = prev;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut pairs: Vec<(usize, usize)> = (1..=m)
        .filter(|&j| p[j] != 0)
        .map(|j| (p[j] - 1, j - 1))
        .collect();
    pairs.sort_unstable();
    pairs
}

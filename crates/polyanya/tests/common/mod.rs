//! Synthetic grid meshes, and a visibility-graph shortest path over the same
//! grid to check search costs against.
#![allow(dead_code)]

use polyanya::geometry::{distance, Point};
use polyanya::Mesh;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// `n × n` unit cells with roughly `blocked` of them removed as obstacles,
/// as a mesh of square polygons.
pub fn grid_mesh(n: usize, blocked: f64, seed: u64) -> Mesh {
    Grid::random(n, blocked, seed).mesh()
}

/// Unit cells on `[0, n]²`, each open or blocked.
///
/// No vertex has its open cells only on one diagonal, so the free space has
/// no pinch points and "closed free space" is exactly what the search may
/// traverse.
pub struct Grid {
    pub n: usize,
    open: Vec<bool>,
}

impl Grid {
    pub fn random(n: usize, blocked: f64, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let open = (0..n * n).map(|_| rng.gen::<f64>() >= blocked).collect();
        let mut grid = Self { n, open };
        grid.open_pinches();
        grid
    }

    pub fn is_open(&self, i: i64, j: i64) -> bool {
        let n = self.n as i64;
        i >= 0 && j >= 0 && i < n && j < n && self.open[(j * n + i) as usize]
    }

    fn open_pinches(&mut self) {
        let n = self.n as i64;
        loop {
            let mut changed = false;
            for j in 1..n {
                for i in 1..n {
                    let ur = self.is_open(i, j);
                    let ul = self.is_open(i - 1, j);
                    let ll = self.is_open(i - 1, j - 1);
                    let lr = self.is_open(i, j - 1);
                    if ur == ll && ul == lr && ur != ul {
                        let (ci, cj) = if ur { (i - 1, j) } else { (i, j) };
                        self.open[(cj * n + ci) as usize] = true;
                        changed = true;
                    }
                }
            }
            if !changed {
                return;
            }
        }
    }

    /// Index of each open cell among the open cells, row by row, or -1.
    fn cell_index(&self) -> Vec<i64> {
        let mut count = 0;
        self.open
            .iter()
            .map(|&is_open| {
                if is_open {
                    count += 1;
                    count - 1
                } else {
                    -1
                }
            })
            .collect()
    }

    fn open_count(&self) -> usize {
        self.open.iter().filter(|&&o| o).count()
    }

    fn vid(&self, i: i64, j: i64) -> i64 {
        j * (self.n as i64 + 1) + i
    }

    /// One square polygon per open cell.
    pub fn mesh(&self) -> Mesh {
        let index = self.cell_index();
        let n = self.n as i64;
        let cell = |i: i64, j: i64| -> i64 {
            if self.is_open(i, j) {
                index[(j * n + i) as usize]
            } else {
                -1
            }
        };

        let mut text = format!("mesh 2 {} {}\n", (n + 1) * (n + 1), self.open_count());
        for j in 0..=n {
            for i in 0..=n {
                // Counterclockwise from the upper right cell.
                text += &format!(
                    "{i} {j} 4 {} {} {} {}\n",
                    cell(i, j),
                    cell(i - 1, j),
                    cell(i - 1, j - 1),
                    cell(i, j - 1)
                );
            }
        }
        for j in 0..n {
            for i in 0..n {
                if cell(i, j) < 0 {
                    continue;
                }
                text += &format!(
                    "4 {} {} {} {} {} {} {} {}\n",
                    self.vid(i, j),
                    self.vid(i + 1, j),
                    self.vid(i + 1, j + 1),
                    self.vid(i, j + 1),
                    cell(i - 1, j),
                    cell(i, j - 1),
                    cell(i + 1, j),
                    cell(i, j + 1)
                );
            }
        }
        text.parse().expect("generated grid mesh parses")
    }

    /// Two triangles per open cell, split along the `(i, j)-(i+1, j+1)`
    /// diagonal: `2c` below it, `2c + 1` above.
    pub fn triangulated_mesh(&self) -> Mesh {
        let index = self.cell_index();
        let n = self.n as i64;
        let cell = |i: i64, j: i64| -> i64 {
            if self.is_open(i, j) {
                index[(j * n + i) as usize]
            } else {
                -1
            }
        };
        let lo = |i: i64, j: i64| match cell(i, j) {
            -1 => -1,
            c => 2 * c,
        };
        let up = |i: i64, j: i64| match cell(i, j) {
            -1 => -1,
            c => 2 * c + 1,
        };

        let mut text = format!("mesh 2 {} {}\n", (n + 1) * (n + 1), 2 * self.open_count());
        for j in 0..=n {
            for i in 0..=n {
                text += &format!(
                    "{i} {j} 6 {} {} {} {} {} {}\n",
                    lo(i, j),
                    up(i, j),
                    lo(i - 1, j),
                    up(i - 1, j - 1),
                    lo(i - 1, j - 1),
                    up(i, j - 1)
                );
            }
        }
        for j in 0..n {
            for i in 0..n {
                if cell(i, j) < 0 {
                    continue;
                }
                text += &format!(
                    "3 {} {} {} {} {} {}\n",
                    self.vid(i, j),
                    self.vid(i + 1, j),
                    self.vid(i + 1, j + 1),
                    up(i, j),
                    up(i, j - 1),
                    up(i + 1, j)
                );
                text += &format!(
                    "3 {} {} {} {} {} {}\n",
                    self.vid(i, j),
                    self.vid(i + 1, j + 1),
                    self.vid(i, j + 1),
                    lo(i - 1, j),
                    lo(i, j),
                    lo(i, j + 1)
                );
            }
        }
        text.parse().expect("generated triangle mesh parses")
    }

    /// Shortest Euclidean distance from `start` to `goal` through open cells,
    /// by Dijkstra over the visibility graph of obstacle corners.
    pub fn shortest_path(&self, start: Point, goal: Point) -> Option<f64> {
        let n = self.n as i64;
        let mut nodes = vec![start, goal];
        for j in 0..=n {
            for i in 0..=n {
                let around = [
                    self.is_open(i, j),
                    self.is_open(i - 1, j),
                    self.is_open(i - 1, j - 1),
                    self.is_open(i, j - 1),
                ];
                if around.contains(&true) && around.contains(&false) {
                    nodes.push(Point::new(i as f64, j as f64));
                }
            }
        }

        let k = nodes.len();
        let mut dist = vec![f64::INFINITY; k];
        let mut done = vec![false; k];
        dist[0] = 0.0;
        loop {
            let u = (0..k)
                .filter(|&u| !done[u] && dist[u].is_finite())
                .min_by(|&a, &b| dist[a].total_cmp(&dist[b]))?;
            if u == 1 {
                return Some(dist[1]);
            }
            done[u] = true;
            for v in 0..k {
                if !done[v] && self.visible(&nodes[u], &nodes[v]) {
                    dist[v] = dist[v].min(dist[u] + distance(&nodes[u], &nodes[v]));
                }
            }
        }
    }

    /// The segment stays out of the interior of every blocked cell.
    fn visible(&self, a: &Point, b: &Point) -> bool {
        const SHRINK: f64 = 1e-9;
        let n = self.n as i64;
        for j in 0..n {
            for i in 0..n {
                if self.is_open(i, j) {
                    continue;
                }
                let min = Point::new(i as f64 + SHRINK, j as f64 + SHRINK);
                let max = Point::new((i + 1) as f64 - SHRINK, (j + 1) as f64 - SHRINK);
                if segment_hits_box(a, b, &min, &max) {
                    return false;
                }
            }
        }
        true
    }
}

/// Liang-Barsky clip of `a-b` against the box `[min, max]`.
fn segment_hits_box(a: &Point, b: &Point, min: &Point, max: &Point) -> bool {
    let d = b - a;
    let (mut t0, mut t1) = (0.0f64, 1.0f64);
    for (p, q) in [
        (-d.x, a.x - min.x),
        (d.x, max.x - a.x),
        (-d.y, a.y - min.y),
        (d.y, max.y - a.y),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return false;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return false;
        }
    }
    true
}

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use elimtree::graph::{Factor, FactorGraph, Key};
use elimtree::symbolic::SymbolicFactor;
use elimtree::{BayesNet, EliminationPolicy};

fn snapshot_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("snapshots")
}

pub fn assert_snapshot(name: &str, actual: &str) {
    let path = snapshot_root().join(name);
    if std::env::var("ELIMTREE_UPDATE_SNAPSHOTS").is_ok() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create snapshot directory");
        }
        fs::write(&path, actual).expect("write snapshot");
        return;
    }

    let expected =
        fs::read_to_string(&path).unwrap_or_else(|_| panic!("snapshot {:?} not found", path));
    if normalize(&expected) != normalize(actual) {
        panic!(
            "Snapshot mismatch for {:?}. Set ELIMTREE_UPDATE_SNAPSHOTS=1 to regenerate.\nExpected:\n{}\nActual:\n{}",
            path,
            expected,
            actual
        );
    }
}

fn normalize(input: &str) -> String {
    input.replace("\r\n", "\n")
}

pub fn symbolic_graph(factors: &[&[Key]]) -> FactorGraph<SymbolicFactor> {
    factors
        .iter()
        .map(|keys| SymbolicFactor::new(keys.to_vec()))
        .collect()
}

/// Pairwise factors along 0 - 1 - ... - (n - 1)
pub fn symbolic_chain(n: Key) -> FactorGraph<SymbolicFactor> {
    (1..n).map(|k| SymbolicFactor::new(vec![k - 1, k])).collect()
}

/// 4-connected `side` x `side` grid, keys row-major
pub fn symbolic_grid(side: Key) -> FactorGraph<SymbolicFactor> {
    grid_edges(side)
        .into_iter()
        .map(|(a, b)| SymbolicFactor::new(vec![a, b]))
        .collect()
}

fn grid_edges(side: Key) -> Vec<(Key, Key)> {
    let mut edges = Vec::new();
    for r in 0..side {
        for c in 0..side {
            let k = r * side + c;
            if c + 1 < side {
                edges.push((k, k + 1));
            }
            if r + 1 < side {
                edges.push((k, k + side));
            }
        }
    }
    edges
}

// ---------------------------------------------------------------------------
// Scalar Gaussian factors in information form: 0.5 x'Lx - eta'x
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct QuadraticFactor {
    keys: Vec<Key>,
    info: Vec<f64>,
    eta: Vec<f64>,
}

impl QuadraticFactor {
    /// Weighted linear measurement `coeffs . x = rhs`
    pub fn measurement(keys: &[Key], coeffs: &[f64], rhs: f64, weight: f64) -> Self {
        assert_eq!(keys.len(), coeffs.len());
        let mut pairs: Vec<(Key, f64)> = keys.iter().copied().zip(coeffs.iter().copied()).collect();
        pairs.sort_by_key(|&(key, _)| key);

        let n = pairs.len();
        let mut info = vec![0.0; n * n];
        let mut eta = vec![0.0; n];
        for (i, &(_, ai)) in pairs.iter().enumerate() {
            eta[i] = weight * ai * rhs;
            for (j, &(_, aj)) in pairs.iter().enumerate() {
                info[i * n + j] = weight * ai * aj;
            }
        }
        Self {
            keys: pairs.into_iter().map(|(key, _)| key).collect(),
            info,
            eta,
        }
    }

    pub fn info(&self, i: usize, j: usize) -> f64 {
        self.info[i * self.keys.len() + j]
    }

    pub fn eta(&self, i: usize) -> f64 {
        self.eta[i]
    }
}

impl Factor for QuadraticFactor {
    fn keys(&self) -> &[Key] {
        &self.keys
    }

    fn equals(&self, other: &Self, tol: f64) -> bool {
        self.keys == other.keys
            && self
                .info
                .iter()
                .chain(&self.eta)
                .zip(other.info.iter().chain(&other.eta))
                .all(|(a, b)| (a - b).abs() <= tol)
    }
}

/// x_frontal = rhs - sum(coeffs[i] * x_parents[i])
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianConditional {
    pub frontal: Key,
    pub parents: Vec<Key>,
    pub coeffs: Vec<f64>,
    pub rhs: f64,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GaussianError {
    #[error("variable {0} has no information")]
    Singular(Key),
    #[error("gaussian policy eliminates one key at a time, got {0}")]
    FrontalCount(usize),
}

const PIVOT_TOLERANCE: f64 = 1e-12;

#[derive(Debug, Clone, Copy, Default)]
pub struct GaussianPolicy;

impl EliminationPolicy<QuadraticFactor> for GaussianPolicy {
    type Conditional = GaussianConditional;
    type Error = GaussianError;

    fn eliminate(
        &self,
        factors: &[Arc<QuadraticFactor>],
        keys: &[Key],
    ) -> Result<(GaussianConditional, Option<QuadraticFactor>), GaussianError> {
        let &[frontal] = keys else {
            return Err(GaussianError::FrontalCount(keys.len()));
        };

        let union: Vec<Key> = factors
            .iter()
            .flat_map(|f| f.keys().iter().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let Some(p) = union.iter().position(|&k| k == frontal) else {
            return Err(GaussianError::Singular(frontal));
        };

        let n = union.len();
        let mut info = vec![0.0; n * n];
        let mut eta = vec![0.0; n];
        for factor in factors {
            let slots: Vec<usize> = factor
                .keys()
                .iter()
                .map(|k| union.binary_search(k).expect("key in union"))
                .collect();
            for (i, &si) in slots.iter().enumerate() {
                eta[si] += factor.eta(i);
                for (j, &sj) in slots.iter().enumerate() {
                    info[si * n + sj] += factor.info(i, j);
                }
            }
        }

        let pivot = info[p * n + p];
        if pivot.abs() < PIVOT_TOLERANCE {
            return Err(GaussianError::Singular(frontal));
        }

        let others: Vec<usize> = (0..n).filter(|&i| i != p).collect();
        let conditional = GaussianConditional {
            frontal,
            parents: others.iter().map(|&i| union[i]).collect(),
            coeffs: others.iter().map(|&i| info[p * n + i] / pivot).collect(),
            rhs: eta[p] / pivot,
        };
        if others.is_empty() {
            return Ok((conditional, None));
        }

        let m = others.len();
        let mut sep_info = vec![0.0; m * m];
        let mut sep_eta = vec![0.0; m];
        for (a, &i) in others.iter().enumerate() {
            sep_eta[a] = eta[i] - info[i * n + p] * eta[p] / pivot;
            for (b, &j) in others.iter().enumerate() {
                sep_info[a * m + b] = info[i * n + j] - info[i * n + p] * info[p * n + j] / pivot;
            }
        }
        let separator = QuadraticFactor {
            keys: conditional.parents.clone(),
            info: sep_info,
            eta: sep_eta,
        };
        Ok((conditional, Some(separator)))
    }
}

/// Solve a Bayes net back to front, starting from `known` values
pub fn back_substitute(
    bayes_net: &BayesNet<GaussianConditional>,
    mut known: BTreeMap<Key, f64>,
) -> BTreeMap<Key, f64> {
    for conditional in bayes_net.iter().rev() {
        let value = conditional.rhs
            - conditional
                .parents
                .iter()
                .zip(&conditional.coeffs)
                .map(|(parent, coeff)| coeff * known[parent])
                .sum::<f64>();
        known.insert(conditional.frontal, value);
    }
    known
}

/// Dense reference solve of the normal equations L x = eta
pub fn dense_solve(graph: &FactorGraph<QuadraticFactor>) -> BTreeMap<Key, f64> {
    let keys: Vec<Key> = graph.keys().into_iter().collect();
    let n = keys.len();
    let mut a = vec![vec![0.0; n + 1]; n];
    for factor in graph.iter() {
        let slots: Vec<usize> = factor
            .keys()
            .iter()
            .map(|k| keys.binary_search(k).expect("key in graph"))
            .collect();
        for (i, &si) in slots.iter().enumerate() {
            a[si][n] += factor.eta(i);
            for (j, &sj) in slots.iter().enumerate() {
                a[si][sj] += factor.info(i, j);
            }
        }
    }

    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&x, &y| a[x][col].abs().total_cmp(&a[y][col].abs()))
            .expect("non-empty range");
        a.swap(col, pivot_row);
        let pivot = a[col][col];
        assert!(pivot.abs() > PIVOT_TOLERANCE, "dense system is singular");
        for row in (col + 1)..n {
            let factor = a[row][col] / pivot;
            for k in col..=n {
                let upper = a[col][k];
                a[row][k] -= factor * upper;
            }
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = ((row + 1)..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (a[row][n] - tail) / a[row][row];
    }
    keys.into_iter().zip(x).collect()
}

/// Prior on 0 plus unit odometry between neighbours
pub fn gaussian_chain(n: Key) -> FactorGraph<QuadraticFactor> {
    let mut graph = FactorGraph::new();
    graph.push(QuadraticFactor::measurement(&[0], &[1.0], 0.5, 4.0));
    for k in 1..n {
        let offset = 1.0 + 0.1 * k as f64;
        graph.push(QuadraticFactor::measurement(&[k - 1, k], &[-1.0, 1.0], offset, 1.0));
    }
    graph
}

/// Grid with a prior on every corner and weighted differences on each edge
pub fn gaussian_grid(side: Key) -> FactorGraph<QuadraticFactor> {
    let mut graph = FactorGraph::new();
    let last = side * side - 1;
    for (i, corner) in [0, side - 1, last - (side - 1), last].into_iter().enumerate() {
        graph.push(QuadraticFactor::measurement(&[corner], &[1.0], i as f64, 2.0));
    }
    for (i, (a, b)) in grid_edges(side).into_iter().enumerate() {
        let weight = 1.0 + (i % 3) as f64 * 0.5;
        graph.push(QuadraticFactor::measurement(&[a, b], &[1.0, -1.0], 0.25, weight));
    }
    graph
}

pub fn assert_close(actual: &BTreeMap<Key, f64>, expected: &BTreeMap<Key, f64>, tol: f64) {
    assert_eq!(
        actual.keys().collect::<Vec<_>>(),
        expected.keys().collect::<Vec<_>>(),
        "solved variables differ"
    );
    for (key, value) in expected {
        let got = actual[key];
        assert!(
            (got - value).abs() <= tol,
            "variable {key}: got {got}, expected {value}"
        );
    }
}

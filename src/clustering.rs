//! Day assignment by k-means clustering
//!
//! Resolved places are partitioned into `min(days, places)` groups with a
//! seeded k-means (k-means++ seeding, Lloyd iterations, best of `n_init`
//! restarts). Clustering runs on raw latitude/longitude; groups approximate
//! "what is close together" and are not a route optimisation.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::TripPlannerError;
use crate::models::{DayPoint, Location, Waypoint};

pub const DEFAULT_SEED: u64 = 42;

/// Largest squared centroid shift that still counts as converged
const CONVERGENCE_TOLERANCE: f64 = 1e-10;

/// How day groups are numbered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DayOrdering {
    /// Days follow the cluster labels as produced by k-means
    #[default]
    Label,
    /// Days follow the order in which groups are first visited (origin's group is day 0)
    Visit,
}

/// Parameters for [`group_points`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupingOptions {
    pub seed: u64,
    pub n_init: usize,
    pub max_iter: usize,
    /// Scale factor applied to the first and last point's coordinates before clustering
    pub endpoint_weight: Option<f64>,
    pub ordering: DayOrdering,
}

impl Default for GroupingOptions {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            n_init: 1,
            max_iter: 300,
            endpoint_weight: None,
            ordering: DayOrdering::Label,
        }
    }
}

/// Result of a k-means fit
#[derive(Debug, Clone, PartialEq)]
pub struct KMeansFit {
    pub labels: Vec<usize>,
    pub centroids: Vec<[f64; 2]>,
    /// Sum of squared distances to the assigned centroid
    pub inertia: f64,
}

/// Seeded k-means over 2-D points
#[derive(Debug, Clone)]
pub struct KMeans {
    k: usize,
    seed: u64,
    n_init: usize,
    max_iter: usize,
}

impl KMeans {
    #[must_use]
    pub fn new(k: usize) -> Self {
        Self {
            k,
            seed: DEFAULT_SEED,
            n_init: 1,
            max_iter: 300,
        }
    }

    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init.max(1);
        self
    }

    #[must_use]
    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter.max(1);
        self
    }

    /// Fit and return the best of `n_init` runs, or `None` for `k == 0` or no points.
    /// `k` is capped at the number of points.
    #[must_use]
    pub fn fit(&self, points: &[[f64; 2]]) -> Option<KMeansFit> {
        let k = self.k.min(points.len());
        if k == 0 {
            return None;
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut best: Option<KMeansFit> = None;
        for _ in 0..self.n_init {
            let fit = self.run_once(points, k, &mut rng);
            if best.as_ref().is_none_or(|b| fit.inertia < b.inertia) {
                best = Some(fit);
            }
        }
        best
    }

    /// Labels in `[0, min(k, points.len()))`, one per point
    #[must_use]
    pub fn fit_predict(&self, points: &[[f64; 2]]) -> Vec<usize> {
        self.fit(points).map(|fit| fit.labels).unwrap_or_default()
    }

    fn run_once(&self, points: &[[f64; 2]], k: usize, rng: &mut StdRng) -> KMeansFit {
        let mut centroids = init_plus_plus(points, k, rng);
        let mut labels = vec![0usize; points.len()];

        for _ in 0..self.max_iter {
            assign(points, &centroids, &mut labels);
            let mut partial = update_centroids(points, &labels, k);
            let updated = fill_empty_clusters(points, &mut labels, &mut partial);

            let shift = centroids
                .iter()
                .zip(&updated)
                .map(|(old, new)| squared_distance(old, new))
                .fold(0.0, f64::max);
            centroids = updated;
            if shift <= CONVERGENCE_TOLERANCE {
                break;
            }
        }

        assign(points, &centroids, &mut labels);
        let inertia = points
            .iter()
            .zip(&labels)
            .map(|(p, &l)| squared_distance(p, &centroids[l]))
            .sum();

        KMeansFit {
            labels,
            centroids,
            inertia,
        }
    }
}

fn squared_distance(a: &[f64; 2], b: &[f64; 2]) -> f64 {
    (a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)
}

fn nearest(point: &[f64; 2], centroids: &[[f64; 2]]) -> (usize, f64) {
    centroids
        .iter()
        .enumerate()
        .map(|(i, c)| (i, squared_distance(point, c)))
        .fold((0, f64::INFINITY), |best, cur| if cur.1 < best.1 { cur } else { best })
}

/// k-means++: each next centre is drawn with probability proportional to D(x)^2
fn init_plus_plus(points: &[[f64; 2]], k: usize, rng: &mut StdRng) -> Vec<[f64; 2]> {
    let mut centroids = Vec::with_capacity(k);
    centroids.push(points[rng.random_range(0..points.len())]);

    while centroids.len() < k {
        let weights: Vec<f64> = points.iter().map(|p| nearest(p, &centroids).1).collect();
        let total: f64 = weights.iter().sum();

        let index = if total > 0.0 {
            let mut target = rng.random::<f64>() * total;
            let mut chosen = points.len() - 1;
            for (i, w) in weights.iter().enumerate() {
                if target < *w {
                    chosen = i;
                    break;
                }
                target -= w;
            }
            chosen
        } else {
            // all points coincide with a centre
            rng.random_range(0..points.len())
        };
        centroids.push(points[index]);
    }
    centroids
}

fn assign(points: &[[f64; 2]], centroids: &[[f64; 2]], labels: &mut [usize]) {
    for (label, point) in labels.iter_mut().zip(points) {
        *label = nearest(point, centroids).0;
    }
}

fn update_centroids(points: &[[f64; 2]], labels: &[usize], k: usize) -> Vec<Option<[f64; 2]>> {
    let mut sums = vec![[0.0f64; 2]; k];
    let mut counts = vec![0usize; k];
    for (point, &label) in points.iter().zip(labels) {
        sums[label][0] += point[0];
        sums[label][1] += point[1];
        counts[label] += 1;
    }
    sums.into_iter()
        .zip(counts)
        .map(|(sum, count)| {
            (count > 0).then(|| {
                let n = count as f64;
                [sum[0] / n, sum[1] / n]
            })
        })
        .collect()
}

/// Re-seed each empty cluster with the point farthest from its current centre
fn fill_empty_clusters(
    points: &[[f64; 2]],
    labels: &mut [usize],
    centroids: &mut [Option<[f64; 2]>],
) -> Vec<[f64; 2]> {
    let mut taken = vec![false; points.len()];
    for cluster in 0..centroids.len() {
        if centroids[cluster].is_some() {
            continue;
        }
        let farthest = points
            .iter()
            .enumerate()
            .filter(|(i, _)| !taken[*i])
            .map(|(i, p)| {
                let own = centroids[labels[i]].unwrap_or(*p);
                (i, squared_distance(p, &own))
            })
            .fold(None, |best: Option<(usize, f64)>, cur| match best {
                Some(b) if b.1 >= cur.1 => Some(b),
                _ => Some(cur),
            });
        if let Some((index, _)) = farthest {
            taken[index] = true;
            labels[index] = cluster;
            centroids[cluster] = Some(points[index]);
        }
    }
    centroids
        .iter()
        .map(|c| c.unwrap_or([0.0, 0.0]))
        .collect()
}

/// Assign each resolved place to one of `min(days, places)` day groups.
///
/// Rows come back stably sorted by day, so places of the same day keep their
/// itinerary order. Coordinates in the output are always the geocoded ones,
/// even when `endpoint_weight` scales them for clustering.
pub fn group_points(
    resolved: &[(Waypoint, Location)],
    days: u32,
    options: &GroupingOptions,
) -> crate::Result<Vec<DayPoint>> {
    if days == 0 {
        return Err(TripPlannerError::validation("Days must be at least 1"));
    }
    if resolved.is_empty() {
        return Ok(Vec::new());
    }

    let k = (days as usize).min(resolved.len());
    let mut features: Vec<[f64; 2]> = resolved.iter().map(|(_, loc)| loc.as_point()).collect();

    if let Some(weight) = options.endpoint_weight {
        if !weight.is_finite() || weight <= 0.0 {
            return Err(TripPlannerError::validation(format!(
                "Endpoint weight must be a positive number, got: {weight}"
            )));
        }
        let last = features.len() - 1;
        for index in [0, last] {
            features[index] = [features[index][0] * weight, features[index][1] * weight];
        }
    }

    let mut labels = KMeans::new(k)
        .seed(options.seed)
        .n_init(options.n_init)
        .max_iter(options.max_iter)
        .fit_predict(&features);

    if options.ordering == DayOrdering::Visit {
        relabel_by_first_visit(&mut labels);
    }

    debug!(
        "Grouped {} places into {} days (seed {})",
        resolved.len(),
        k,
        options.seed
    );

    let mut rows: Vec<DayPoint> = resolved
        .iter()
        .zip(labels)
        .map(|((waypoint, location), day)| DayPoint {
            name: waypoint.name.clone(),
            latitude: location.latitude,
            longitude: location.longitude,
            role: waypoint.role,
            day,
        })
        .collect();
    rows.sort_by_key(|row| row.day);
    Ok(rows)
}

fn relabel_by_first_visit(labels: &mut [usize]) {
    let mut mapping: HashMap<usize, usize> = HashMap::new();
    for label in labels.iter_mut() {
        let next = mapping.len();
        *label = *mapping.entry(*label).or_insert(next);
    }
}

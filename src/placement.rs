/// Non-overlapping building footprint placement via rejection sampling.
use crate::error::{PipelineError, Result};
use rand::Rng;

/// One accepted circular building base. Immutable once accepted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Footprint {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub height: f64,
}

/// Sampler configuration for one scene, read-only during sampling.
#[derive(Debug, Clone)]
pub struct PlacementConfig {
    /// Number of footprints to accept.
    pub target_count: usize,
    /// Radius of the bounding disk centred on the origin.
    pub bound_radius: f64,
    /// Upper bound for building heights; accepted heights fall in
    /// `[0.2 * height_bound, 0.7 * height_bound]`.
    pub height_bound: f64,
    /// Candidate budget; exceeding it fails the round instead of looping.
    pub max_attempts: usize,
}

impl PlacementConfig {
    /// Nominal footprint radius for this configuration.
    /// Candidate radii are drawn from a ±20% band around this value.
    pub fn nominal_radius(&self) -> f64 {
        self.bound_radius / (1.5 * self.target_count as f64 * 2.0)
    }

    fn validate(&self) -> Result<()> {
        if self.bound_radius <= 0.0 {
            return Err(PipelineError::Config(format!(
                "bound_radius must be positive, got {}",
                self.bound_radius
            )));
        }
        if self.height_bound <= 0.0 {
            return Err(PipelineError::Config(format!(
                "height_bound must be positive, got {}",
                self.height_bound
            )));
        }
        if self.target_count > 0 && self.max_attempts == 0 {
            return Err(PipelineError::Config(
                "max_attempts must be positive for a nonzero target".into(),
            ));
        }
        Ok(())
    }
}

/// Pairwise separation test used during sampling.
///
/// Deliberately asymmetric: the squared centre distance is compared against
/// `(2 * candidate_radius)^2`, using only the candidate's radius. Large
/// existing footprints can therefore be grazed by small candidates. This
/// matches the placement policy the datasets were generated with; changing it
/// would shift dataset statistics.
pub fn overlaps(placed: &[Footprint], x: f64, y: f64, candidate_radius: f64) -> bool {
    placed.iter().any(|b| {
        let dist_sq = (b.x - x).powi(2) + (b.y - y).powi(2);
        dist_sq <= 4.0 * candidate_radius * candidate_radius
    })
}

/// Sample exactly `target_count` footprints inside the bounding disk.
///
/// Candidates are drawn in polar coordinates (`loc_r`, then angle, then
/// radius, then height on acceptance) and rejected when [`overlaps`] holds
/// against the accepted set. Draw order is part of the contract: a given seed
/// always yields the same placement set.
pub fn sample_footprints<R: Rng>(config: &PlacementConfig, rng: &mut R) -> Result<Vec<Footprint>> {
    config.validate()?;
    if config.target_count == 0 {
        return Ok(Vec::new());
    }

    let r_nom = config.nominal_radius();
    let max_r = config.bound_radius - r_nom;
    if max_r < 0.0 {
        return Err(PipelineError::Config(format!(
            "nominal radius {r_nom} exceeds bound radius {}",
            config.bound_radius
        )));
    }

    let mut placed = Vec::with_capacity(config.target_count);
    let mut attempts = 0usize;
    while placed.len() < config.target_count {
        if attempts >= config.max_attempts {
            return Err(PipelineError::PlacementExhausted {
                attempts,
                placed: placed.len(),
                target: config.target_count,
            });
        }
        attempts += 1;

        let loc_r = rng.gen_range(0.0..=max_r);
        let theta = rng.gen_range(0.0..360.0f64).to_radians();
        let x = loc_r * theta.cos();
        let y = loc_r * theta.sin();
        let radius = rng.gen_range(0.8 * r_nom..=1.2 * r_nom);
        if overlaps(&placed, x, y, radius) {
            continue;
        }

        let height = rng.gen_range(0.2 * config.height_bound..=0.7 * config.height_bound);
        placed.push(Footprint {
            x,
            y,
            radius,
            height,
        });
    }

    log::debug!(
        "placed {} footprints in {attempts} attempts",
        placed.len()
    );
    Ok(placed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{RngCore, SeedableRng};

    fn config(target_count: usize) -> PlacementConfig {
        PlacementConfig {
            target_count,
            bound_radius: 10.0,
            height_bound: 9.0,
            max_attempts: 10_000,
        }
    }

    #[test]
    fn returns_exact_count_within_bounds() {
        let cfg = config(6);
        let mut rng = StdRng::seed_from_u64(42);
        let set = sample_footprints(&cfg, &mut rng).unwrap();

        assert_eq!(set.len(), 6);
        let max_r = cfg.bound_radius - cfg.nominal_radius();
        for fp in &set {
            let dist = (fp.x * fp.x + fp.y * fp.y).sqrt();
            assert!(dist <= max_r + 1e-9, "centre outside bounding disk");
            assert!(fp.height >= 0.2 * cfg.height_bound && fp.height <= 0.7 * cfg.height_bound);
            assert!(fp.radius >= 0.8 * cfg.nominal_radius() - 1e-9);
            assert!(fp.radius <= 1.2 * cfg.nominal_radius() + 1e-9);
        }
    }

    #[test]
    fn same_seed_same_placement() {
        let cfg = config(6);
        let a = sample_footprints(&cfg, &mut StdRng::seed_from_u64(7)).unwrap();
        let b = sample_footprints(&cfg, &mut StdRng::seed_from_u64(7)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn acceptance_decisions_are_reproducible() {
        let cfg = config(8);
        let set = sample_footprints(&cfg, &mut StdRng::seed_from_u64(3)).unwrap();
        for i in 0..set.len() {
            assert!(
                !overlaps(&set[..i], set[i].x, set[i].y, set[i].radius),
                "footprint {i} would not have been accepted"
            );
        }
    }

    #[test]
    fn zero_target_returns_empty_without_touching_rng() {
        let cfg = config(0);
        let mut used = StdRng::seed_from_u64(11);
        let mut fresh = StdRng::seed_from_u64(11);
        let set = sample_footprints(&cfg, &mut used).unwrap();
        assert!(set.is_empty());
        assert_eq!(used.next_u64(), fresh.next_u64());
    }

    #[test]
    fn exhausted_budget_reports_progress() {
        let cfg = PlacementConfig {
            max_attempts: 1,
            ..config(2)
        };
        let err = sample_footprints(&cfg, &mut StdRng::seed_from_u64(1)).unwrap_err();
        match err {
            PipelineError::PlacementExhausted {
                attempts,
                placed,
                target,
            } => {
                assert_eq!(attempts, 1);
                assert_eq!(placed, 1);
                assert_eq!(target, 2);
            }
            other => panic!("expected PlacementExhausted, got {other}"),
        }
    }

    #[test]
    fn degenerate_bounds_are_config_errors() {
        let mut cfg = config(6);
        cfg.bound_radius = 0.0;
        assert!(matches!(
            sample_footprints(&cfg, &mut StdRng::seed_from_u64(0)),
            Err(PipelineError::Config(_))
        ));

        let mut cfg = config(6);
        cfg.height_bound = -1.0;
        assert!(matches!(
            sample_footprints(&cfg, &mut StdRng::seed_from_u64(0)),
            Err(PipelineError::Config(_))
        ));

        let mut cfg = config(3);
        cfg.max_attempts = 0;
        assert!(matches!(
            sample_footprints(&cfg, &mut StdRng::seed_from_u64(0)),
            Err(PipelineError::Config(_))
        ));
    }

    #[test]
    fn asymmetric_overlap_uses_candidate_radius_only() {
        let placed = [Footprint {
            x: 0.0,
            y: 0.0,
            radius: 5.0,
            height: 1.0,
        }];
        // Centre distance 3: rejected for a candidate of radius 2 (4r^2 = 16)
        // but accepted for radius 1 (4r^2 = 4), despite the large neighbour.
        assert!(overlaps(&placed, 3.0, 0.0, 2.0));
        assert!(!overlaps(&placed, 3.0, 0.0, 1.0));
    }
}

//! Individual tree state and the JABOWA growth model.

use std::f64::consts::PI;

use rand::Rng;

use crate::catalog::{Pft, SpeciesId, ToleranceClass};

/// Minimum establishment diameter (cm).
pub const MIN_DIAMETER: f64 = 0.5;

/// Light extinction coefficient applied to shading biomass.
pub const K_EXT: f64 = 1.0 / 6000.0;

/// Increment below which a tree counts as growth-stressed.
pub const STRESS_INCREMENT: f64 = 0.01;

/// Age scale of background mortality; `age_max` must exceed it.
pub const MORTALITY_AGE_SCALE: f64 = 4.0;

/// Diameter increment assigned at birth; above [`STRESS_INCREMENT`].
const NEWBORN_INCREMENT: f64 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    species: SpeciesId,
    age: u32,
    d: f64,
    d_change: f64,
    h: f64,
    w: f64,
    ba: f64,
    sla: f64,
}

impl Tree {
    /// Creates a sapling with a diameter in `[MIN_DIAMETER, 1.1 * MIN_DIAMETER)`.
    pub fn new<R: Rng + ?Sized>(pft: &Pft, rng: &mut R) -> Self {
        let d = MIN_DIAMETER + rng.gen::<f64>() * 0.1 * MIN_DIAMETER;
        let mut tree = Self {
            species: pft.id,
            age: 0,
            d,
            d_change: NEWBORN_INCREMENT,
            h: 0.0,
            w: 0.0,
            ba: 0.0,
            sla: 0.0,
        };
        tree.update_allometry(pft);
        tree
    }

    /// Grows the tree by one year under its current shading.
    pub fn grow(&mut self, pft: &Pft) {
        debug_assert_eq!(pft.id, self.species);

        // Botkin et al. (1972), eq. 5
        let potential = pft.g * self.d * (1.0 - self.d * self.h / (pft.d_max * pft.h_max))
            / (274.0 + 3.0 * pft.b2 * self.d - 4.0 * pft.b3 * self.d * self.d);

        let f_env = 1.0;
        self.d_change = potential * f_env * self.light_response(pft.tolerance);
        self.d += self.d_change;
        self.update_allometry(pft);
        self.age += 1;
    }

    /// Relative growth under the current shading, never negative.
    pub fn light_response(&self, tolerance: ToleranceClass) -> f64 {
        let al = (-K_EXT * self.sla).exp();
        match tolerance {
            ToleranceClass::ShadeTolerant => (1.0 - (-4.64 * (al - 0.05)).exp()).max(0.0),
            ToleranceClass::Cherry | ToleranceClass::Birch => {
                (2.24 * (1.0 - (-1.136 * (al - 0.08)).exp())).max(0.0)
            }
        }
    }

    fn update_allometry(&mut self, pft: &Pft) {
        self.h = 137.0 + pft.b2 * self.d - pft.b3 * self.d * self.d;
        self.w = pft.c * self.d * self.d;
        self.ba = 0.25 * PI * self.d * self.d;
    }

    pub fn species(&self) -> SpeciesId {
        self.species
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn diameter(&self) -> f64 {
        self.d
    }

    pub fn diameter_change(&self) -> f64 {
        self.d_change
    }

    pub fn height(&self) -> f64 {
        self.h
    }

    pub fn weight(&self) -> f64 {
        self.w
    }

    pub fn basal_area(&self) -> f64 {
        self.ba
    }

    pub fn shading(&self) -> f64 {
        self.sla
    }

    pub fn set_shading(&mut self, sla: f64) {
        self.sla = sla;
    }
}

/// Probability that a tree of `age` dies of background causes this year.
///
/// Calibrated so that about 2% of a cohort reaches `age_max`. Rises strictly
/// with age when `age_max > MORTALITY_AGE_SCALE`, which the catalog enforces.
pub fn background_mortality(age: u32, age_max: f64) -> f64 {
    let exponent = i32::try_from(age).unwrap_or(i32::MAX);
    1.0 - (1.0 - MORTALITY_AGE_SCALE / age_max).powi(exponent)
}

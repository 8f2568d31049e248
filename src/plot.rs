//! A single patch of forest and its yearly birth, kill and growth pipeline.

use rand::Rng;
use serde::Serialize;
use tracing::debug;

use crate::catalog::{Catalog, CatalogError, ToleranceClass};
use crate::tree::{background_mortality, Tree, STRESS_INCREMENT};

/// Plot weight below which early-successional species establish.
pub const CHERRY_CUTOFF: f64 = 55.0;

/// Plot weight at or above which the canopy is closed to intolerant species.
pub const BIRCH_CUTOFF: f64 = 1000.0;

/// Yearly death probability of a growth-stressed tree (about 1/e).
pub const STRESS_MORTALITY: f64 = 0.368;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SpeciesTally {
    pub count: usize,
    pub weight: f64,
    pub basal_area: f64,
}

/// Per-plot output record for one year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotSummary {
    pub year: u64,
    pub trees: usize,
    pub weight: f64,
    pub basal_area: f64,
    pub species: Vec<SpeciesTally>,
}

/// Counts from one year of the pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct YearReport {
    pub recruited: usize,
    pub aged_out: usize,
    pub stressed_out: usize,
}

impl YearReport {
    pub fn merge(self, other: Self) -> Self {
        Self {
            recruited: self.recruited + other.recruited,
            aged_out: self.aged_out + other.aged_out,
            stressed_out: self.stressed_out + other.stressed_out,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Plot {
    trees: Vec<Tree>,
    weight: f64,
    basal_area: f64,
}

impl Plot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs one simulated year: birth, then kill, then growth.
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        catalog: &Catalog,
        rng: &mut R,
    ) -> Result<YearReport, CatalogError> {
        let recruited = self.birth(catalog, rng)?;
        let (aged_out, stressed_out) = self.kill(catalog, rng)?;
        self.growth(catalog)?;

        let report = YearReport {
            recruited,
            aged_out,
            stressed_out,
        };
        debug!(
            recruited,
            aged_out,
            stressed_out,
            trees = self.trees.len(),
            weight = self.weight,
            "plot advanced"
        );
        Ok(report)
    }

    /// Recruits saplings and returns how many were added.
    pub fn birth<R: Rng + ?Sized>(
        &mut self,
        catalog: &Catalog,
        rng: &mut R,
    ) -> Result<usize, CatalogError> {
        let before = self.trees.len();

        // TODO: gate establishment on the degree-day and moisture limits of each species
        let tolerant = catalog.group(ToleranceClass::ShadeTolerant);
        if !tolerant.is_empty() {
            let id = tolerant[rng.gen_range(0..tolerant.len())];
            let count = rng.gen_range(0..=2);
            let pft = catalog.species(id)?;
            for _ in 0..count {
                self.trees.push(Tree::new(pft, rng));
            }
        }

        if self.weight < CHERRY_CUTOFF {
            let count = rng.gen_range(60..=75);
            self.recruit_mixed(catalog, ToleranceClass::Cherry, count, rng)?;
        } else if self.weight < BIRCH_CUTOFF {
            let count = rng.gen_range(0..=13);
            self.recruit_mixed(catalog, ToleranceClass::Birch, count, rng)?;
        }

        Ok(self.trees.len() - before)
    }

    fn recruit_mixed<R: Rng + ?Sized>(
        &mut self,
        catalog: &Catalog,
        class: ToleranceClass,
        count: usize,
        rng: &mut R,
    ) -> Result<(), CatalogError> {
        let group = catalog.group(class);
        if group.is_empty() {
            return Ok(());
        }
        for _ in 0..count {
            let id = group[rng.gen_range(0..group.len())];
            let pft = catalog.species(id)?;
            self.trees.push(Tree::new(pft, rng));
        }
        Ok(())
    }

    /// Applies background then growth-stress mortality. Returns the number of
    /// trees removed by each mechanism.
    pub fn kill<R: Rng + ?Sized>(
        &mut self,
        catalog: &Catalog,
        rng: &mut R,
    ) -> Result<(usize, usize), CatalogError> {
        let population = self.trees.len();
        let mut survivors = Vec::with_capacity(population);
        for tree in self.trees.drain(..) {
            let age_max = catalog.species(tree.species())?.age_max;
            if rng.gen::<f64>() >= background_mortality(tree.age(), age_max) {
                survivors.push(tree);
            }
        }
        let aged_out = population - survivors.len();

        let population = survivors.len();
        survivors.retain(|tree| {
            !(tree.diameter_change() < STRESS_INCREMENT && rng.gen::<f64>() < STRESS_MORTALITY)
        });
        let stressed_out = population - survivors.len();

        self.trees = survivors;
        Ok((aged_out, stressed_out))
    }

    /// Computes shading for every tree, then grows them all and refreshes the
    /// plot totals.
    pub fn growth(&mut self, catalog: &Catalog) -> Result<(), CatalogError> {
        let canopy: Vec<(f64, f64)> = self
            .trees
            .iter()
            .map(|tree| (tree.height(), tree.weight()))
            .collect();
        for tree in &mut self.trees {
            let h = tree.height();
            let sla = canopy
                .iter()
                .filter(|(other_h, _)| *other_h > h)
                .map(|(_, other_w)| other_w)
                .sum();
            tree.set_shading(sla);
        }

        self.weight = 0.0;
        self.basal_area = 0.0;
        for tree in &mut self.trees {
            tree.grow(catalog.species(tree.species())?);
            self.weight += tree.weight();
            self.basal_area += tree.basal_area();
        }
        Ok(())
    }

    pub fn summary(&self, year: u64, catalog: &Catalog) -> PlotSummary {
        let mut species = vec![SpeciesTally::default(); catalog.len()];
        for tree in &self.trees {
            if let Some(tally) = species.get_mut(tree.species()) {
                tally.count += 1;
                tally.weight += tree.weight();
                tally.basal_area += tree.basal_area();
            }
        }
        PlotSummary {
            year,
            trees: self.trees.len(),
            weight: self.weight,
            basal_area: self.basal_area,
            species,
        }
    }

    pub fn trees(&self) -> &[Tree] {
        &self.trees
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// Total tree weight as of the last growth step.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Total basal area as of the last growth step.
    pub fn basal_area(&self) -> f64 {
        self.basal_area
    }
}

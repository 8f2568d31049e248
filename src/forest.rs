//! Monte Carlo ensemble of independent plots.

use rayon::prelude::*;

use crate::catalog::{Catalog, CatalogError};
use crate::plot::{Plot, PlotSummary, YearReport};
use crate::rng::{PlotRng, RngManager};

pub struct Forest {
    catalog: Catalog,
    plots: Vec<Plot>,
    streams: Vec<PlotRng>,
    parallel: bool,
}

impl Forest {
    /// Creates `plots` empty plots, each with its own random stream derived
    /// from `seed`.
    pub fn new(catalog: Catalog, plots: usize, seed: u64) -> Self {
        let streams = RngManager::new(seed).plot_streams(plots);
        Self {
            catalog,
            plots: vec![Plot::new(); plots],
            streams,
            parallel: true,
        }
    }

    /// Chooses between rayon and a plain loop. Output is identical either way.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Advances every plot by one year and returns the summed counts.
    pub fn advance(&mut self) -> Result<YearReport, CatalogError> {
        let catalog = &self.catalog;
        if self.parallel {
            self.plots
                .par_iter_mut()
                .zip(self.streams.par_iter_mut())
                .map(|(plot, rng)| plot.advance(catalog, rng))
                .try_reduce(YearReport::default, |a, b| Ok(a.merge(b)))
        } else {
            self.plots
                .iter_mut()
                .zip(self.streams.iter_mut())
                .try_fold(
                    YearReport::default(),
                    |total, (plot, rng)| -> Result<YearReport, CatalogError> {
                        Ok(total.merge(plot.advance(catalog, rng)?))
                    },
                )
        }
    }

    /// One summary per plot, in plot order.
    pub fn dump(&self, year: u64) -> Vec<PlotSummary> {
        self.plots
            .iter()
            .map(|plot| plot.summary(year, &self.catalog))
            .collect()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn plots(&self) -> &[Plot] {
        &self.plots
    }

    pub fn nplots(&self) -> usize {
        self.plots.len()
    }

    pub fn total_trees(&self) -> usize {
        self.plots.iter().map(Plot::len).sum()
    }

    /// Mean plot weight across the ensemble.
    pub fn mean_weight(&self) -> f64 {
        if self.plots.is_empty() {
            return 0.0;
        }
        self.plots.iter().map(Plot::weight).sum::<f64>() / self.plots.len() as f64
    }
}

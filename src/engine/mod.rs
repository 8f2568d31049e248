use std::io::Write;

use anyhow::Result;
use tracing::{info, warn};

use crate::{
    forest::Forest,
    plot::{PlotSummary, YearReport},
    report::ReportWriter,
    scenario::Scenario,
};

pub struct EngineSettings {
    pub scenario_name: String,
    /// Years between plot records; 0 disables them.
    pub output_interval: u64,
}

impl EngineSettings {
    pub fn from_scenario(scenario: &Scenario) -> Self {
        Self {
            scenario_name: scenario.name.clone(),
            output_interval: scenario.output_interval,
        }
    }
}

/// Drives a forest through simulated years and emits plot records.
pub struct Engine {
    forest: Forest,
    year: u64,
    settings: EngineSettings,
    /// Counts accumulated since the last record.
    pending: YearReport,
}

impl Engine {
    pub fn new(forest: Forest, settings: EngineSettings) -> Self {
        if forest.nplots() == 0 {
            warn!(scenario = %settings.scenario_name, "forest has no plots");
        }
        Self {
            forest,
            year: 0,
            settings,
            pending: YearReport::default(),
        }
    }

    /// Advances one year and returns the new year number.
    pub fn step(&mut self) -> Result<u64> {
        self.year += 1;
        let report = self.forest.advance()?;
        self.pending = self.pending.merge(report);
        Ok(self.year)
    }

    pub fn run<W: Write>(&mut self, years: u64, writer: &mut ReportWriter<W>) -> Result<()> {
        writer.write_header(self.forest.catalog())?;
        self.run_with_hook(years, |summaries| writer.write_records(summaries))?;
        writer.flush()
    }

    /// Runs `years` years, handing each due set of plot records to `hook`.
    pub fn run_with_hook<F>(&mut self, years: u64, mut hook: F) -> Result<()>
    where
        F: FnMut(&[PlotSummary]) -> Result<()>,
    {
        info!(
            scenario = %self.settings.scenario_name,
            plots = self.forest.nplots(),
            years,
            "starting run"
        );
        for _ in 0..years {
            let year = self.step()?;
            if self.is_output_year(year) {
                let summaries = self.forest.dump(year);
                hook(&summaries)?;
                let counts = std::mem::take(&mut self.pending);
                info!(
                    year,
                    trees = self.forest.total_trees(),
                    mean_weight = self.forest.mean_weight(),
                    recruited = counts.recruited,
                    aged_out = counts.aged_out,
                    stressed_out = counts.stressed_out,
                    "forest state"
                );
            }
        }
        info!(year = self.year, "run complete");
        Ok(())
    }

    fn is_output_year(&self, year: u64) -> bool {
        self.settings.output_interval != 0 && year % self.settings.output_interval == 0
    }

    pub fn current_year(&self) -> u64 {
        self.year
    }

    pub fn forest(&self) -> &Forest {
        &self.forest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    fn engine(output_interval: u64) -> Engine {
        let forest = Forest::new(Catalog::botkin_1972().unwrap(), 2, 3);
        Engine::new(
            forest,
            EngineSettings {
                scenario_name: "test".into(),
                output_interval,
            },
        )
    }

    #[test]
    fn hook_runs_at_output_interval() {
        let mut engine = engine(5);
        let mut years = Vec::new();
        engine
            .run_with_hook(20, |summaries| {
                years.push(summaries[0].year);
                Ok(())
            })
            .unwrap();

        assert_eq!(years, vec![5, 10, 15, 20]);
        assert_eq!(engine.current_year(), 20);
    }

    #[test]
    fn zero_interval_disables_output() {
        let mut engine = engine(0);
        let mut calls = 0;
        engine
            .run_with_hook(6, |_| {
                calls += 1;
                Ok(())
            })
            .unwrap();

        assert_eq!(calls, 0);
        assert_eq!(engine.current_year(), 6);
    }

    #[test]
    fn counts_reset_after_each_record() {
        let mut engine = engine(3);
        engine.run_with_hook(3, |_| Ok(())).unwrap();
        assert_eq!(engine.pending, YearReport::default());

        engine.step().unwrap();
        assert!(engine.pending.recruited > 0);
    }

    #[test]
    fn step_counts_years() {
        let mut engine = engine(1);
        assert_eq!(engine.step().unwrap(), 1);
        assert_eq!(engine.step().unwrap(), 2);
        assert!(engine.forest().total_trees() > 0);
    }
}

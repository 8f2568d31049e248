//! Rendering of per-plot yearly records.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use clap::ValueEnum;

use crate::catalog::Catalog;
use crate::plot::PlotSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Fixed-width columns with a two-line header.
    #[default]
    Table,
    /// One JSON object per plot record.
    Json,
}

/// Two header lines naming the plot columns and each species' columns.
pub fn header(catalog: &Catalog) -> String {
    let mut out = format!("{:6}|{:<32}", "", " PLOT");
    for pft in catalog.iter() {
        let _ = write!(out, "| {:<31}", pft.name);
    }
    let _ = write!(
        out,
        "|\n{:<6}|{:<6}|{:<12}|{:<12}",
        " Year", " #tr", " weight", " b. area"
    );
    for _ in catalog.iter() {
        let _ = write!(out, "|{:<6}|{:<12}|{:<12}", " #tr", " weight", " b. area");
    }
    out.push('|');
    out
}

pub fn record_line(summary: &PlotSummary) -> String {
    let mut line = format!(
        "{:6} {:6} {:12.3} {:12.3}",
        summary.year, summary.trees, summary.weight, summary.basal_area
    );
    for tally in &summary.species {
        let _ = write!(
            line,
            " {:6} {:12.3} {:12.3}",
            tally.count, tally.weight, tally.basal_area
        );
    }
    line
}

pub struct ReportWriter<W: Write> {
    out: W,
    format: OutputFormat,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self { out, format }
    }

    pub fn write_header(&mut self, catalog: &Catalog) -> Result<()> {
        if self.format == OutputFormat::Table {
            writeln!(self.out, "{}", header(catalog))?;
        }
        Ok(())
    }

    pub fn write_records(&mut self, summaries: &[PlotSummary]) -> Result<()> {
        for summary in summaries {
            match self.format {
                OutputFormat::Table => writeln!(self.out, "{}", record_line(summary))?,
                OutputFormat::Json => {
                    serde_json::to_writer(&mut self.out, summary)?;
                    writeln!(self.out)?;
                }
            }
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::SpeciesTally;

    fn summary() -> PlotSummary {
        let mut species = vec![SpeciesTally::default(); 13];
        species[6] = SpeciesTally {
            count: 61,
            weight: 40.25,
            basal_area: 13.5,
        };
        PlotSummary {
            year: 1,
            trees: 61,
            weight: 40.25,
            basal_area: 13.5,
            species,
        }
    }

    #[test]
    fn record_has_fixed_width_fields() {
        let line = record_line(&summary());

        assert!(line.starts_with("     1     61       40.250       13.500"));
        // 4 plot fields plus 13 species triplets
        assert_eq!(line.split_whitespace().count(), 4 + 13 * 3);
        assert_eq!(line.len(), 6 + 7 + 13 + 13 + 13 * (7 + 13 + 13));
    }

    #[test]
    fn header_lines_align_with_records() {
        let catalog = Catalog::botkin_1972().unwrap();
        let header = header(&catalog);
        let lines: Vec<&str> = header.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("| Sugar maple"));
        assert!(lines[0].contains("| Red maple"));
        assert!(lines[1].starts_with(" Year |"));
        assert_eq!(lines[0].len(), lines[1].len());
        assert_eq!(lines[1].len(), record_line(&summary()).len() + 1);
    }

    #[test]
    fn json_records_are_one_per_line() {
        let mut writer = ReportWriter::new(Vec::new(), OutputFormat::Json);
        writer.write_records(&[summary(), summary()]).unwrap();

        let text = String::from_utf8(writer.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let value: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(value["trees"], 61);
        assert_eq!(value["species"][6]["count"], 61);
    }

    #[test]
    fn json_format_skips_header() {
        let catalog = Catalog::botkin_1972().unwrap();
        let mut writer = ReportWriter::new(Vec::new(), OutputFormat::Json);
        writer.write_header(&catalog).unwrap();
        assert!(writer.into_inner().is_empty());
    }
}

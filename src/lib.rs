pub mod catalog;
pub mod engine;
pub mod forest;
pub mod plot;
pub mod report;
pub mod rng;
pub mod scenario;
pub mod tree;

pub use catalog::{Catalog, CatalogError, Pft, PftRecord, SpeciesId, ToleranceClass};
pub use engine::{Engine, EngineSettings};
pub use forest::Forest;
pub use plot::{Plot, PlotSummary};
pub use tree::Tree;

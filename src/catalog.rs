//! Species catalog: immutable plant functional type (PFT) parameters.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tree::MORTALITY_AGE_SCALE;

/// Index of a species in its catalog.
pub type SpeciesId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToleranceClass {
    ShadeTolerant,
    /// Early-successional, shade-intolerant.
    Cherry,
    /// Mid-successional, shade-intolerant.
    Birch,
}

impl fmt::Display for ToleranceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ToleranceClass::ShadeTolerant => "shade-tolerant",
            ToleranceClass::Cherry => "early-successional",
            ToleranceClass::Birch => "mid-successional",
        };
        f.write_str(label)
    }
}

/// Literal parameter row, as written in a scenario or the built-in table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PftRecord {
    pub name: String,
    pub g: f64,
    pub c: f64,
    pub age_max: f64,
    pub tolerance: ToleranceClass,
    pub d_max: f64,
    pub h_max: f64,
    pub b2: f64,
    pub b3: f64,
    pub degd_min: f64,
    pub degd_max: f64,
    pub wmin: f64,
    pub wmax: f64,
}

impl PftRecord {
    #[allow(clippy::too_many_arguments)]
    fn row(
        name: &str,
        g: f64,
        c: f64,
        age_max: f64,
        tolerance: ToleranceClass,
        d_max: f64,
        h_max: f64,
        b2: f64,
        b3: f64,
        degd_min: f64,
        degd_max: f64,
        wmin: f64,
        wmax: f64,
    ) -> Self {
        Self {
            name: name.to_string(),
            g,
            c,
            age_max,
            tolerance,
            d_max,
            h_max,
            b2,
            b3,
            degd_min,
            degd_max,
            wmin,
            wmax,
        }
    }
}

/// A species archetype with its catalog id.
///
/// The degree-day (`degd_*`) and moisture (`wmin`/`wmax`) limits are carried
/// but not consulted by recruitment yet.
#[derive(Debug, Clone, PartialEq)]
pub struct Pft {
    pub id: SpeciesId,
    pub name: String,
    pub g: f64,
    pub c: f64,
    pub age_max: f64,
    pub tolerance: ToleranceClass,
    pub d_max: f64,
    pub h_max: f64,
    pub b2: f64,
    pub b3: f64,
    pub degd_min: f64,
    pub degd_max: f64,
    pub wmin: f64,
    pub wmax: f64,
}

impl Pft {
    fn from_record(id: SpeciesId, record: PftRecord) -> Self {
        Self {
            id,
            name: record.name,
            g: record.g,
            c: record.c,
            age_max: record.age_max,
            tolerance: record.tolerance,
            d_max: record.d_max,
            h_max: record.h_max,
            b2: record.b2,
            b3: record.b3,
            degd_min: record.degd_min,
            degd_max: record.degd_max,
            wmin: record.wmin,
            wmax: record.wmax,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("catalog must contain at least one species")]
    Empty,
    #[error("no {0} species in catalog")]
    EmptyGroup(ToleranceClass),
    #[error("species '{species}' has non-positive {parameter} ({value})")]
    NonPositiveParameter {
        species: String,
        parameter: &'static str,
        value: f64,
    },
    #[error("species '{species}' has age_max {age_max}; background mortality needs more than 4 years")]
    ShortLifespan { species: String, age_max: f64 },
    #[error("species id {0} is not in the catalog")]
    UnknownSpecies(SpeciesId),
}

#[derive(Debug, Clone)]
pub struct Catalog {
    species: Vec<Pft>,
    shade_tolerant: Vec<SpeciesId>,
    cherry: Vec<SpeciesId>,
    birch: Vec<SpeciesId>,
}

impl Catalog {
    /// Builds a catalog in which every tolerance group has at least one member.
    pub fn new(records: Vec<PftRecord>) -> Result<Self, CatalogError> {
        let catalog = Self::with_partial_groups(records)?;
        for class in [
            ToleranceClass::ShadeTolerant,
            ToleranceClass::Cherry,
            ToleranceClass::Birch,
        ] {
            if catalog.group(class).is_empty() {
                return Err(CatalogError::EmptyGroup(class));
            }
        }
        Ok(catalog)
    }

    /// Builds a catalog that may leave tolerance groups empty. Recruitment
    /// from an empty group adds nothing.
    pub fn with_partial_groups(records: Vec<PftRecord>) -> Result<Self, CatalogError> {
        if records.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut species = Vec::with_capacity(records.len());
        let mut shade_tolerant = Vec::new();
        let mut cherry = Vec::new();
        let mut birch = Vec::new();

        for (id, record) in records.into_iter().enumerate() {
            for (parameter, value) in [
                ("d_max", record.d_max),
                ("h_max", record.h_max),
                ("age_max", record.age_max),
            ] {
                // NaN fails this check too
                if !(value > 0.0) {
                    return Err(CatalogError::NonPositiveParameter {
                        species: record.name.clone(),
                        parameter,
                        value,
                    });
                }
            }
            if record.age_max <= MORTALITY_AGE_SCALE {
                return Err(CatalogError::ShortLifespan {
                    species: record.name.clone(),
                    age_max: record.age_max,
                });
            }
            match record.tolerance {
                ToleranceClass::ShadeTolerant => shade_tolerant.push(id),
                ToleranceClass::Cherry => cherry.push(id),
                ToleranceClass::Birch => birch.push(id),
            }
            species.push(Pft::from_record(id, record));
        }

        Ok(Self {
            species,
            shade_tolerant,
            cherry,
            birch,
        })
    }

    /// The 13 northern hardwood species of Botkin, Janak & Wallis (1972).
    pub fn botkin_1972() -> Result<Self, CatalogError> {
        Self::new(default_records())
    }

    pub fn species(&self, id: SpeciesId) -> Result<&Pft, CatalogError> {
        self.species.get(id).ok_or(CatalogError::UnknownSpecies(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pft> {
        self.species.iter()
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    pub fn group(&self, class: ToleranceClass) -> &[SpeciesId] {
        match class {
            ToleranceClass::ShadeTolerant => &self.shade_tolerant,
            ToleranceClass::Cherry => &self.cherry,
            ToleranceClass::Birch => &self.birch,
        }
    }
}

/// Parameter table for the default catalog.
#[rustfmt::skip]
pub fn default_records() -> Vec<PftRecord> {
    use ToleranceClass::{Birch, Cherry, ShadeTolerant};

    vec![
        //                 Name             g      c      age_max  type           d_max   h_max   b2    b3     degd_min degd_max wmin  wmax
        PftRecord::row("Sugar maple",   170., 1.57 , 200., ShadeTolerant, 152.5, 4011., 50.9, 0.167, 2000.,  6300., 300., -1.),
        PftRecord::row("Beech",         150., 2.20 , 300., ShadeTolerant, 122.0, 3660., 57.8, 0.237, 2100.,  6000., 300., -1.),
        PftRecord::row("Yellow birch",  100., 0.486, 300., Birch,         122.0, 3050., 47.8, 0.196, 2000.,  5300., 250., -1.),
        PftRecord::row("White ash",     130., 1.75 , 100., ShadeTolerant,  50.0, 2160., 80.2, 0.802, 2100., 10700., 320., -1.),
        PftRecord::row("Mt. maple",     100., 1.13 ,  25., ShadeTolerant,  13.5,  500., 53.8, 2.0  , 2000.,  6300., 320., -1.),
        PftRecord::row("Striped maple", 150., 1.75 ,  30., ShadeTolerant,  22.5, 1000., 76.6, 1.70 , 2000.,  6300., 320., -1.),
        PftRecord::row("Pin cherry",    200., 2.45 ,  30., Cherry,         28.5, 1126., 70.6, 1.26 , 1100.,  8000., 190., -1.),
        PftRecord::row("Choke cherry",  150., 2.45 ,  20., Cherry,         10.0,  500., 72.6, 3.63 ,  600., 10000., 155., -1.),
        PftRecord::row("Balsam Fir",    200., 2.5  ,  80., ShadeTolerant,  50.0, 1830., 67.9, 0.679, 1100.,  3700., 190., -1.),
        PftRecord::row("Spruce",         50., 2.5  , 350., ShadeTolerant,  50.0, 1830., 67.9, 0.679,  600.,  3700., 190., -1.),
        PftRecord::row("White birch",   140., 0.486,  80., Birch,          46.0, 1830., 73.6, 0.800, 1100.,  3700., 190., 600.),
        PftRecord::row("Mt. ash",       150., 1.75 ,  30., ShadeTolerant,  10.0,  500., 72.6, 3.63 , 2000.,  4000., 300., -1.),
        PftRecord::row("Red maple",     240., 1.75 , 150., ShadeTolerant, 152.5, 3660., 46.3, 0.152, 2000., 12400., 300., -1.),
    ]
}

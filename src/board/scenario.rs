//! Scenario (board definition) loading.
//!
//! A scenario is the immutable input of a game: the areas, the border graph,
//! the pairs of areas joined by land only, the starting setups and the number
//! of cities needed to win. It is read once, validated, indexed by `AreaId`
//! and then shared read-only by every game played on it.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::area::{Area, AreaDef, AreaId};
use super::unit::UnitType;

/// Errors that can occur while loading a scenario.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("scenario has no areas")]
    Empty,

    #[error("duplicate area code '{0}'")]
    DuplicateArea(String),

    #[error("unknown area code '{0}'")]
    UnknownArea(String),

    #[error("area '{0}' cannot border itself")]
    SelfBorder(String),

    #[error("too many areas: {0}")]
    TooManyAreas(usize),

    #[error("{unit_type:?} cannot start in area '{area}'")]
    BadSetup { area: String, unit_type: UnitType },

    #[error("invalid scenario json: {0}")]
    Json(#[from] serde_json::Error),
}

fn default_cities_to_win() -> u32 {
    15
}

/// Serialisable starting setup entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupDef {
    /// Owning country; absent for autonomous garrisons.
    #[serde(default)]
    pub country: Option<String>,
    pub area: String,
    /// Absent for a home area that starts without a unit.
    #[serde(default)]
    pub unit_type: Option<UnitType>,
}

/// Serialisable scenario definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioDef {
    pub name: String,
    pub start_year: u16,
    #[serde(default = "default_cities_to_win")]
    pub cities_to_win: u32,
    pub areas: Vec<AreaDef>,
    pub borders: Vec<(String, String)>,
    #[serde(default)]
    pub land_only: Vec<(String, String)>,
    #[serde(default)]
    pub setups: Vec<SetupDef>,
}

/// A resolved starting setup entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Setup {
    pub country: Option<String>,
    pub area: AreaId,
    pub unit_type: Option<UnitType>,
}

/// A validated, indexed board definition.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: String,
    pub start_year: u16,
    pub cities_to_win: u32,
    areas: Vec<Area>,
    by_code: HashMap<String, AreaId>,
    land_only: HashSet<(AreaId, AreaId)>,
    setups: Vec<Setup>,
}

impl Scenario {
    /// Parses and validates a scenario from its JSON form.
    pub fn from_json(json: &str) -> Result<Scenario, ScenarioError> {
        let def: ScenarioDef = serde_json::from_str(json)?;
        Scenario::from_def(&def)
    }

    /// Validates a definition and builds the indexed scenario.
    pub fn from_def(def: &ScenarioDef) -> Result<Scenario, ScenarioError> {
        if def.areas.is_empty() {
            return Err(ScenarioError::Empty);
        }
        if def.areas.len() > u16::MAX as usize {
            return Err(ScenarioError::TooManyAreas(def.areas.len()));
        }

        let mut areas = Vec::with_capacity(def.areas.len());
        let mut by_code = HashMap::with_capacity(def.areas.len());
        for (i, area_def) in def.areas.iter().enumerate() {
            let id = AreaId(i as u16);
            if by_code.insert(area_def.code.clone(), id).is_some() {
                return Err(ScenarioError::DuplicateArea(area_def.code.clone()));
            }
            areas.push(Area::from_def(id, area_def));
        }

        let lookup = |code: &str| -> Result<AreaId, ScenarioError> {
            by_code
                .get(code)
                .copied()
                .ok_or_else(|| ScenarioError::UnknownArea(code.to_string()))
        };

        let mut edges = BTreeSet::new();
        for (a, b) in &def.borders {
            let (a, b) = (lookup(a)?, lookup(b)?);
            if a == b {
                return Err(ScenarioError::SelfBorder(areas[a.index()].code.clone()));
            }
            edges.insert((a, b));
            edges.insert((b, a));
        }
        for (from, to) in edges {
            areas[from.index()].borders.push(to);
        }

        let mut land_only = HashSet::new();
        for (a, b) in &def.land_only {
            let (a, b) = (lookup(a)?, lookup(b)?);
            land_only.insert((a, b));
            land_only.insert((b, a));
        }

        let mut setups = Vec::with_capacity(def.setups.len());
        for s in &def.setups {
            let area = lookup(&s.area)?;
            if let Some(unit_type) = s.unit_type {
                if !areas[area.index()].can_occupy(unit_type) {
                    return Err(ScenarioError::BadSetup {
                        area: s.area.clone(),
                        unit_type,
                    });
                }
            }
            setups.push(Setup {
                country: s.country.clone(),
                area,
                unit_type: s.unit_type,
            });
        }

        Ok(Scenario {
            name: def.name.clone(),
            start_year: def.start_year,
            cities_to_win: def.cities_to_win,
            areas,
            by_code,
            land_only,
            setups,
        })
    }

    /// Returns all areas in index order.
    pub fn areas(&self) -> &[Area] {
        &self.areas
    }

    /// Returns the number of areas.
    pub fn area_count(&self) -> usize {
        self.areas.len()
    }

    /// Returns the area with the given id.
    pub fn area(&self, id: AreaId) -> &Area {
        &self.areas[id.index()]
    }

    /// Returns the code of the given area.
    pub fn code(&self, id: AreaId) -> &str {
        &self.areas[id.index()].code
    }

    /// Looks up an area by its code.
    pub fn area_id(&self, code: &str) -> Option<AreaId> {
        self.by_code.get(code).copied()
    }

    /// Returns true if `to` borders `from`.
    ///
    /// Pairs joined by land only are not adjacent for fleets.
    pub fn is_adjacent(&self, from: AreaId, to: AreaId, fleet: bool) -> bool {
        if fleet && self.land_only.contains(&(from, to)) {
            return false;
        }
        self.areas[from.index()].borders.contains(&to)
    }

    /// Returns the starting setups.
    pub fn setups(&self) -> &[Setup] {
        &self.setups
    }

    /// Returns the distinct playable countries in sorted order.
    pub fn countries(&self) -> Vec<String> {
        let set: BTreeSet<&String> = self
            .setups
            .iter()
            .filter_map(|s| s.country.as_ref())
            .collect();
        set.into_iter().cloned().collect()
    }

    /// Returns the home areas of a country.
    pub fn home_areas<'a>(&'a self, country: &'a str) -> impl Iterator<Item = AreaId> + 'a {
        self.setups
            .iter()
            .filter(move |s| s.country.as_deref() == Some(country))
            .map(|s| s.area)
    }
}

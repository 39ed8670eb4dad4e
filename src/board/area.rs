//! Area definitions and terrain rules.
//!
//! An `AreaDef` is the serialisable description of one area as it appears in
//! a scenario file. Once a scenario is loaded every area is resolved into an
//! `Area` that carries its index and its neighbour list.

use serde::{Deserialize, Serialize};

use super::unit::UnitType;

/// Index of an area within its scenario.
///
/// Game-scoped tables (`GameArea`, lookup buffers) are indexed by this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AreaId(pub u16);

impl AreaId {
    /// Returns the id as a table index.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Serialisable description of one area.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaDef {
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sea: bool,
    #[serde(default)]
    pub coast: bool,
    #[serde(default)]
    pub city: bool,
    #[serde(default)]
    pub fortified: bool,
    #[serde(default)]
    pub port: bool,
    /// Sea-flagged area that is still controlled like land.
    #[serde(default)]
    pub land_control: bool,
}

impl AreaDef {
    /// Creates a plain land area.
    pub fn new(code: &str) -> Self {
        AreaDef {
            code: code.to_string(),
            name: code.to_string(),
            ..AreaDef::default()
        }
    }

    pub fn sea(mut self) -> Self {
        self.sea = true;
        self
    }

    pub fn coast(mut self) -> Self {
        self.coast = true;
        self
    }

    pub fn city(mut self) -> Self {
        self.city = true;
        self
    }

    pub fn fortified(mut self) -> Self {
        self.fortified = true;
        self
    }

    pub fn port(mut self) -> Self {
        self.port = true;
        self
    }

    pub fn land_control(mut self) -> Self {
        self.land_control = true;
        self
    }
}

/// A resolved board area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Area {
    pub id: AreaId,
    pub code: String,
    pub name: String,
    pub is_sea: bool,
    pub is_coast: bool,
    pub has_city: bool,
    pub is_fortified: bool,
    pub has_port: bool,
    pub land_control: bool,
    pub(crate) borders: Vec<AreaId>,
}

impl Area {
    pub(crate) fn from_def(id: AreaId, def: &AreaDef) -> Self {
        Area {
            id,
            code: def.code.clone(),
            name: if def.name.is_empty() {
                def.code.clone()
            } else {
                def.name.clone()
            },
            is_sea: def.sea,
            is_coast: def.coast,
            has_city: def.city,
            is_fortified: def.fortified,
            has_port: def.port,
            land_control: def.land_control,
            borders: Vec::new(),
        }
    }

    /// Returns the ids of all bordering areas, ignoring unit type.
    pub fn borders(&self) -> &[AreaId] {
        &self.borders
    }

    /// Returns true if a unit of this type may stand in the area at all.
    ///
    /// Fleets sail seas and coastal waters; garrisons only exist in
    /// fortified cities.
    pub fn can_occupy(&self, unit_type: UnitType) -> bool {
        match unit_type {
            UnitType::Army => !self.is_sea,
            UnitType::Fleet => self.is_sea || self.is_coast,
            UnitType::Garrison => self.is_fortified,
        }
    }

    /// Returns true if a new unit of this type may be raised here.
    ///
    /// Fleets are only built (or converted from garrisons) in ports.
    pub fn accepts_type(&self, unit_type: UnitType) -> bool {
        match unit_type {
            UnitType::Army => !self.is_sea,
            UnitType::Fleet => self.has_port,
            UnitType::Garrison => self.is_fortified,
        }
    }

    /// Returns true if the area takes part in control updates.
    pub fn is_controllable(&self) -> bool {
        !self.is_sea || self.land_control
    }
}

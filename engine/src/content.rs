use std::{collections::HashMap, fs, path::Path};

use anyhow::{anyhow, Context, Result};
use encoding_rs::Encoding;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::combatant::Combatant;
use crate::encounter::Encounter;
use crate::weapon::Weapon;

/// Encounter content: the combatants plus the weapon each one wields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncounterFile {
    pub name: String,
    pub combatants: Vec<Combatant>,
    /// Combatant id → wielded weapon. Missing entries fight unarmed.
    #[serde(default)]
    pub loadout: IndexMap<String, Weapon>,
}

impl EncounterFile {
    pub fn weapon_for(&self, id: &str) -> Weapon {
        self.loadout.get(id).cloned().unwrap_or_else(Weapon::unarmed)
    }

    pub fn build(&self) -> Result<Encounter> {
        Encounter::from_combatants(self.combatants.iter().cloned())
            .with_context(|| format!("invalid encounter '{}'", self.name))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Format::Yaml,
            _ => Format::Json,
        }
    }
}

pub fn builtin_encounters() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        (
            "temple_skirmish",
            include_str!("../content/encounters/temple_skirmish.yaml"),
        ),
        (
            "desert_ambush",
            include_str!("../content/encounters/desert_ambush.yaml"),
        ),
    ])
}

pub fn parse_encounter(text: &str, format: Format) -> Result<EncounterFile> {
    let file = match format {
        Format::Json => serde_json::from_str(text).context("failed to parse encounter JSON")?,
        Format::Yaml => serde_yaml::from_str(text).context("failed to parse encounter YAML")?,
    };
    Ok(file)
}

/// Read a text file, honouring a UTF-8/UTF-16 BOM if present.
pub fn read_text_auto(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    match Encoding::for_bom(&bytes) {
        Some((enc, bom_len)) => Ok(enc.decode(&bytes[bom_len..]).0.into_owned()),
        None => String::from_utf8(bytes)
            .map_err(|e| anyhow!("{} is not UTF-8: {}", path.display(), e)),
    }
}

/// Load an encounter file; `.yaml`/`.yml` parse as YAML, anything else as JSON.
pub fn load_encounter(path: impl AsRef<Path>) -> Result<EncounterFile> {
    let path = path.as_ref();
    let text = read_text_auto(path)?;
    parse_encounter(&text, Format::from_path(path))
        .with_context(|| format!("in {}", path.display()))
}

pub fn builtin_encounter(id: &str) -> Result<EncounterFile> {
    let text = builtin_encounters()
        .get(id)
        .copied()
        .ok_or_else(|| anyhow!("unknown built-in encounter '{}'", id))?;
    parse_encounter(text, Format::Yaml).with_context(|| format!("built-in encounter '{}'", id))
}

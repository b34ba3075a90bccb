//! Pokemon domain DTOs
//!
//! The shapes this service serves and caches. Serialized camelCase, the
//! JSON contract of the public API; cached payloads round-trip through the
//! same serde derives.

use serde::{Deserialize, Serialize};

use crate::upstream::types::PokemonWire;

/// One type slot of a pokemon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeSlot {
    pub name: String,
    pub slot: u32,
}

/// One ability of a pokemon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbilityInfo {
    pub name: String,
    pub is_hidden: bool,
}

/// One base stat of a pokemon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatValue {
    pub name: String,
    pub value: u32,
}

/// One step of a flattened evolution chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionLink {
    pub name: String,
    pub id: u32,
}

// == Summary ==
/// The list-level view of a pokemon, as produced by batched enrichment.
///
/// A summary also decodes from a cached [`PokemonDetail`] payload (the extra
/// detail fields are ignored), so list requests can reuse detail entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PokemonSummary {
    pub id: u32,
    pub name: String,
    pub image_url: Option<String>,
    pub types: Vec<TypeSlot>,
    pub abilities: Vec<AbilityInfo>,
}

impl From<PokemonWire> for PokemonSummary {
    fn from(wire: PokemonWire) -> Self {
        Self {
            id: wire.id,
            name: wire.name,
            image_url: wire.sprites.artwork_or_default(),
            types: type_slots(&wire.types),
            abilities: abilities(&wire.abilities),
        }
    }
}

// == Detail ==
/// The full single-entity view, including stats and the flattened
/// evolution chain.
///
/// `stats`, `height` and `weight` are required on decode: a cached summary
/// does not satisfy them, which forces a fresh detail fetch instead of
/// serving a truncated object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PokemonDetail {
    pub id: u32,
    pub name: String,
    pub image_url: Option<String>,
    pub types: Vec<TypeSlot>,
    pub abilities: Vec<AbilityInfo>,
    pub stats: Vec<StatValue>,
    pub height: u32,
    pub weight: u32,
    /// Depth-first, parent-before-children; empty when the auxiliary
    /// lookup failed or the species has no chain.
    pub evolution_chain: Vec<EvolutionLink>,
}

impl PokemonDetail {
    /// Assembles a detail from the primary wire payload and an already
    /// flattened evolution chain.
    pub fn from_wire(wire: PokemonWire, evolution_chain: Vec<EvolutionLink>) -> Self {
        Self {
            id: wire.id,
            name: wire.name,
            image_url: wire.sprites.default_or_artwork(),
            types: type_slots(&wire.types),
            abilities: abilities(&wire.abilities),
            stats: wire
                .stats
                .iter()
                .map(|s| StatValue {
                    name: s.stat.name.clone(),
                    value: s.base_stat,
                })
                .collect(),
            height: wire.height,
            weight: wire.weight,
            evolution_chain,
        }
    }
}

fn type_slots(types: &[crate::upstream::types::TypeSlotWire]) -> Vec<TypeSlot> {
    types
        .iter()
        .map(|t| TypeSlot {
            name: t.type_ref.name.clone(),
            slot: t.slot,
        })
        .collect()
}

fn abilities(abilities: &[crate::upstream::types::AbilityWire]) -> Vec<AbilityInfo> {
    abilities
        .iter()
        .map(|a| AbilityInfo {
            name: a.ability.name.clone(),
            is_hidden: a.is_hidden,
        })
        .collect()
}

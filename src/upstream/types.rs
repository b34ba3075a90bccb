//! Upstream Wire Types
//!
//! Serde structs for the PokeAPI payloads the service consumes. Only the
//! fields the service reads are modeled; unknown fields are ignored.

use serde::Deserialize;

/// A `{ name, url }` reference, the PokeAPI's universal link shape.
#[derive(Debug, Clone, Deserialize)]
pub struct NamedResource {
    pub name: String,
    pub url: String,
}

/// Response of `GET pokemon?limit=..&offset=..`.
#[derive(Debug, Deserialize)]
pub struct PagedListing {
    pub results: Vec<NamedResource>,
}

/// Response of `GET type/<name>`: the pokemon of one type.
#[derive(Debug, Deserialize)]
pub struct TypeListing {
    pub pokemon: Vec<TypeMember>,
}

#[derive(Debug, Deserialize)]
pub struct TypeMember {
    pub pokemon: NamedResource,
}

/// Response of `GET pokemon/<name>`, reduced to the fields we surface.
#[derive(Debug, Deserialize)]
pub struct PokemonWire {
    pub id: u32,
    pub name: String,
    pub height: u32,
    pub weight: u32,
    pub sprites: SpritesWire,
    pub types: Vec<TypeSlotWire>,
    pub abilities: Vec<AbilityWire>,
    pub stats: Vec<StatWire>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SpritesWire {
    pub front_default: Option<String>,
    pub other: Option<OtherSpritesWire>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OtherSpritesWire {
    #[serde(rename = "official-artwork")]
    pub official_artwork: Option<ArtworkWire>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ArtworkWire {
    pub front_default: Option<String>,
}

impl SpritesWire {
    /// The official artwork sprite when present, else the default sprite.
    pub fn artwork_or_default(&self) -> Option<String> {
        self.other
            .as_ref()
            .and_then(|other| other.official_artwork.as_ref())
            .and_then(|artwork| artwork.front_default.clone())
            .or_else(|| self.front_default.clone())
    }

    /// The default sprite when present, else the official artwork.
    pub fn default_or_artwork(&self) -> Option<String> {
        self.front_default.clone().or_else(|| {
            self.other
                .as_ref()
                .and_then(|other| other.official_artwork.as_ref())
                .and_then(|artwork| artwork.front_default.clone())
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct TypeSlotWire {
    pub slot: u32,
    #[serde(rename = "type")]
    pub type_ref: NamedResource,
}

#[derive(Debug, Deserialize)]
pub struct AbilityWire {
    pub ability: NamedResource,
    pub is_hidden: bool,
}

#[derive(Debug, Deserialize)]
pub struct StatWire {
    pub base_stat: u32,
    pub stat: NamedResource,
}

/// Response of `GET pokemon-species/<name>`, reduced to the evolution link.
#[derive(Debug, Deserialize)]
pub struct SpeciesWire {
    pub evolution_chain: Option<EvolutionChainRef>,
}

#[derive(Debug, Deserialize)]
pub struct EvolutionChainRef {
    pub url: String,
}

/// Response of `GET evolution-chain/<id>`.
#[derive(Debug, Deserialize)]
pub struct EvolutionChainWire {
    pub chain: EvolutionNodeWire,
}

/// One node of the evolution tree; children live in `evolves_to`.
#[derive(Debug, Deserialize)]
pub struct EvolutionNodeWire {
    pub species: NamedResource,
    #[serde(default)]
    pub evolves_to: Vec<EvolutionNodeWire>,
}

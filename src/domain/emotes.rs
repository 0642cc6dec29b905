//! Emote registry: bidirectional mapping between semantic values and guild emotes.
//!
//! The forward direction is total (every class and response has an emote); the reverse
//! lookups return `None` for emotes outside the vocabulary so foreign reactions are tolerated.

use crate::domain::entities::{CharacterClass, SubscriptionResponse};
use crate::domain::DomainError;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// A custom guild emote.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Emote {
    pub name: String,
    pub id: u64,
}

impl Emote {
    pub fn new(name: impl Into<String>, id: u64) -> Self {
        Self {
            name: name.into(),
            id,
        }
    }

    /// Parse the `name:id` form used in configuration.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let (name, id) = s
            .split_once(':')
            .ok_or_else(|| DomainError::Configuration(format!("emote '{}' is not name:id", s)))?;
        let id: u64 = id
            .trim()
            .parse()
            .map_err(|_| DomainError::Configuration(format!("emote '{}' has a bad id", s)))?;
        if name.trim().is_empty() || id == 0 {
            return Err(DomainError::Configuration(format!(
                "emote '{}' needs a name and a non-zero id",
                s
            )));
        }
        Ok(Self::new(name.trim(), id))
    }

    /// String form accepted by the reaction endpoint.
    pub fn for_reaction(&self) -> String {
        format!("{}:{}", self.name, self.id)
    }
}

impl fmt::Display for Emote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<:{}:{}>", self.name, self.id)
    }
}

/// Built-in emotes of the raid guild, in enumeration order.
const DEFAULT_CLASS_EMOTES: [(&str, u64); 8] = [
    ("warrior", 683_667_478_140_715_040),
    ("paladin", 683_667_478_094_577_685),
    ("druid", 683_667_478_279_127_093),
    ("priest", 683_667_478_249_635_851),
    ("rogue", 683_667_478_270_738_432),
    ("mage", 683_667_478_178_201_636),
    ("warlock", 683_667_478_254_092_339),
    ("hunter", 683_667_477_994_307_616),
];

const DEFAULT_RESPONSE_EMOTES: [(&str, u64); 4] = [
    ("present", 683_668_209_669_488_656),
    ("late", 683_668_209_531_076_649),
    ("bench", 683_668_209_866_620_959),
    ("absent", 683_668_209_585_471_529),
];

/// Static registry. Cheap to share via `Arc`; never mutated after construction.
#[derive(Debug, Clone)]
pub struct EmoteRegistry {
    classes: [Emote; 8],
    responses: [Emote; 4],
    class_by_id: HashMap<u64, CharacterClass>,
    response_by_id: HashMap<u64, SubscriptionResponse>,
}

impl Default for EmoteRegistry {
    fn default() -> Self {
        let classes = DEFAULT_CLASS_EMOTES.map(|(name, id)| Emote::new(name, id));
        let responses = DEFAULT_RESPONSE_EMOTES.map(|(name, id)| Emote::new(name, id));
        Self::build(classes, responses)
    }
}

impl EmoteRegistry {
    /// Build from explicit tables (index = enumeration order). Fails if two values share an id.
    pub fn new(classes: [Emote; 8], responses: [Emote; 4]) -> Result<Self, DomainError> {
        let mut seen = HashSet::new();
        for emote in classes.iter().chain(responses.iter()) {
            if !seen.insert(emote.id) {
                return Err(DomainError::Configuration(format!(
                    "emote id {} is mapped to more than one value",
                    emote.id
                )));
            }
        }
        Ok(Self::build(classes, responses))
    }

    /// Defaults with per-value overrides, keyed by class or response name (e.g. `MAGE`, `LATE`)
    /// and valued `name:id`.
    pub fn with_overrides(overrides: &HashMap<String, String>) -> Result<Self, DomainError> {
        let base = Self::default();
        let mut classes = base.classes;
        let mut responses = base.responses;
        for (key, value) in overrides {
            let emote = Emote::parse(value)?;
            let key = key.to_ascii_uppercase();
            if let Ok(class) = key.parse::<CharacterClass>() {
                classes[class.index()] = emote;
            } else if let Ok(response) = key.parse::<SubscriptionResponse>() {
                responses[response.index()] = emote;
            } else {
                return Err(DomainError::Configuration(format!(
                    "emote override for unknown value '{}'",
                    key
                )));
            }
        }
        Self::new(classes, responses)
    }

    fn build(classes: [Emote; 8], responses: [Emote; 4]) -> Self {
        let class_by_id = CharacterClass::ALL
            .into_iter()
            .map(|c| (classes[c.index()].id, c))
            .collect();
        let response_by_id = SubscriptionResponse::ALL
            .into_iter()
            .map(|r| (responses[r.index()].id, r))
            .collect();
        Self {
            classes,
            responses,
            class_by_id,
            response_by_id,
        }
    }

    pub fn emote_for_class(&self, class: CharacterClass) -> &Emote {
        &self.classes[class.index()]
    }

    pub fn emote_for_response(&self, response: SubscriptionResponse) -> &Emote {
        &self.responses[response.index()]
    }

    pub fn class_for(&self, emote_id: u64) -> Option<CharacterClass> {
        self.class_by_id.get(&emote_id).copied()
    }

    pub fn response_for(&self, emote_id: u64) -> Option<SubscriptionResponse> {
        self.response_by_id.get(&emote_id).copied()
    }

    /// Reactions a new embed is seeded with: every class, then every response except `Present`.
    pub fn seed_order(&self) -> Vec<&Emote> {
        CharacterClass::ALL
            .into_iter()
            .map(|c| self.emote_for_class(c))
            .chain(SubscriptionResponse::with_reactions().map(|r| self.emote_for_response(r)))
            .collect()
    }
}

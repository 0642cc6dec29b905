//! Domain entities. Pure data structures for the core business.
//!
//! No Discord/IO types here; adapters map into these.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A scheduled raid. The core only reads/writes `discord_message_id`; the rest is domain data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Raid {
    pub id: i64,
    pub raid_type: RaidType,
    pub date: DateTime<Utc>,
    pub comment: Option<String>,
    /// Unset until the embed is first published.
    pub discord_message_id: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RaidType {
    Onyxia,
    MoltenCore,
    ZulGurub,
    BlackwingLair,
    #[serde(rename = "AHN_QIRAJ_20")]
    AhnQiraj20,
    #[serde(rename = "AHN_QIRAJ_40")]
    AhnQiraj40,
    Naxxramas,
}

impl RaidType {
    pub const ALL: [RaidType; 7] = [
        RaidType::Onyxia,
        RaidType::MoltenCore,
        RaidType::ZulGurub,
        RaidType::BlackwingLair,
        RaidType::AhnQiraj20,
        RaidType::AhnQiraj40,
        RaidType::Naxxramas,
    ];

    /// Stable key used in storage and configuration.
    pub fn key(self) -> &'static str {
        match self {
            RaidType::Onyxia => "ONYXIA",
            RaidType::MoltenCore => "MOLTEN_CORE",
            RaidType::ZulGurub => "ZUL_GURUB",
            RaidType::BlackwingLair => "BLACKWING_LAIR",
            RaidType::AhnQiraj20 => "AHN_QIRAJ_20",
            RaidType::AhnQiraj40 => "AHN_QIRAJ_40",
            RaidType::Naxxramas => "NAXXRAMAS",
        }
    }

    /// Human-readable name used in rendered embeds.
    pub fn display_name(self) -> &'static str {
        match self {
            RaidType::Onyxia => "Onyxia",
            RaidType::MoltenCore => "Molten Core",
            RaidType::ZulGurub => "Zul'Gurub",
            RaidType::BlackwingLair => "Blackwing Lair",
            RaidType::AhnQiraj20 => "Ahn'Qiraj (20)",
            RaidType::AhnQiraj40 => "Ahn'Qiraj (40)",
            RaidType::Naxxramas => "Naxxramas",
        }
    }
}

impl FromStr for RaidType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RaidType::ALL
            .into_iter()
            .find(|t| t.key() == s)
            .ok_or_else(|| format!("unknown raid type: {}", s))
    }
}

/// Character class a participant signs up with. Declaration order is the enumeration order
/// used when seeding reactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CharacterClass {
    Warrior,
    Paladin,
    Druid,
    Priest,
    Rogue,
    Mage,
    Warlock,
    Hunter,
}

impl CharacterClass {
    pub const ALL: [CharacterClass; 8] = [
        CharacterClass::Warrior,
        CharacterClass::Paladin,
        CharacterClass::Druid,
        CharacterClass::Priest,
        CharacterClass::Rogue,
        CharacterClass::Mage,
        CharacterClass::Warlock,
        CharacterClass::Hunter,
    ];

    pub fn key(self) -> &'static str {
        match self {
            CharacterClass::Warrior => "WARRIOR",
            CharacterClass::Paladin => "PALADIN",
            CharacterClass::Druid => "DRUID",
            CharacterClass::Priest => "PRIEST",
            CharacterClass::Rogue => "ROGUE",
            CharacterClass::Mage => "MAGE",
            CharacterClass::Warlock => "WARLOCK",
            CharacterClass::Hunter => "HUNTER",
        }
    }

    /// Position in `ALL`.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for CharacterClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for CharacterClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CharacterClass::ALL
            .into_iter()
            .find(|c| c.key() == s)
            .ok_or_else(|| format!("unknown character class: {}", s))
    }
}

/// RSVP answer to a raid. `Present` is the default state and gets no seeded reaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionResponse {
    Present,
    Late,
    Bench,
    Absent,
}

impl SubscriptionResponse {
    pub const ALL: [SubscriptionResponse; 4] = [
        SubscriptionResponse::Present,
        SubscriptionResponse::Late,
        SubscriptionResponse::Bench,
        SubscriptionResponse::Absent,
    ];

    pub fn key(self) -> &'static str {
        match self {
            SubscriptionResponse::Present => "PRESENT",
            SubscriptionResponse::Late => "LATE",
            SubscriptionResponse::Bench => "BENCH",
            SubscriptionResponse::Absent => "ABSENT",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            SubscriptionResponse::Present => "Present",
            SubscriptionResponse::Late => "Late",
            SubscriptionResponse::Bench => "Bench",
            SubscriptionResponse::Absent => "Absent",
        }
    }

    /// Responses that get a reaction button on a freshly published embed.
    pub fn with_reactions() -> impl Iterator<Item = SubscriptionResponse> {
        SubscriptionResponse::ALL
            .into_iter()
            .filter(|r| *r != SubscriptionResponse::Present)
    }
}

impl fmt::Display for SubscriptionResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SubscriptionResponse {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SubscriptionResponse::ALL
            .into_iter()
            .find(|r| r.key() == s)
            .ok_or_else(|| format!("unknown subscription response: {}", s))
    }
}

/// A participant's answer for one raid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaidSubscription {
    pub raid_id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub response: SubscriptionResponse,
    pub character_class: Option<CharacterClass>,
}

/// Locally persisted user, keyed by Discord id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalUser {
    pub id: i64,
    pub discord_id: u64,
    pub name: String,
}

/// Rendered embed content. Produced by the renderer port, sent by the chat gateway.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageBody {
    pub title: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub fields: Vec<EmbedField>,
    pub footer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

/// Emote attached to a message or carried by a reaction event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EmoteRef {
    /// Guild emote; only these can map to a semantic action.
    Custom { id: u64, name: Option<String> },
    /// Standard unicode emoji.
    Unicode(String),
}

/// Remote chat message as seen through the gateway. Not owned by this system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalMessage {
    pub id: u64,
    pub author_id: u64,
    pub reactions: Vec<EmoteRef>,
}

/// Inbound reaction-add event from the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionEvent {
    pub user_id: u64,
    /// Set when the gateway already knows the reacting account is a bot.
    pub user_is_bot: bool,
    pub channel_id: u64,
    pub message_id: u64,
    pub emote: EmoteRef,
}

/// Identity returned by the OAuth user-info endpoint, after enrichers have run.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalIdentity {
    pub id: u64,
    pub username: String,
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn responses_with_reactions_skip_present() {
        let seeded: Vec<_> = SubscriptionResponse::with_reactions().collect();
        assert_eq!(
            seeded,
            vec![
                SubscriptionResponse::Late,
                SubscriptionResponse::Bench,
                SubscriptionResponse::Absent
            ]
        );
    }

    #[test]
    fn class_keys_parse_back() {
        for class in CharacterClass::ALL {
            assert_eq!(class.key().parse::<CharacterClass>(), Ok(class));
        }
        assert!("mage".parse::<CharacterClass>().is_err());
    }

    #[test]
    fn index_matches_enumeration_order() {
        for (i, class) in CharacterClass::ALL.into_iter().enumerate() {
            assert_eq!(class.index(), i);
        }
        for (i, response) in SubscriptionResponse::ALL.into_iter().enumerate() {
            assert_eq!(response.index(), i);
        }
    }

    #[test]
    fn raid_type_serializes_as_key() {
        let json = serde_json::to_string(&RaidType::MoltenCore).unwrap();
        assert_eq!(json, "\"MOLTEN_CORE\"");
        assert_eq!("AHN_QIRAJ_40".parse::<RaidType>(), Ok(RaidType::AhnQiraj40));
    }
}

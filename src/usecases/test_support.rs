//! In-memory port fakes shared by use-case tests.

use crate::domain::{
    CharacterClass, DomainError, Emote, EmoteRef, ExternalIdentity, ExternalMessage, LocalUser,
    MessageBody, Raid, RaidSubscription, RaidType, SubscriptionResponse,
};
use crate::ports::{
    ChatGateway, ClassChoiceListener, EmbedRenderer, IdentityProvider, RaidStore,
    ResponseListener, UserStore,
};
use chrono::{TimeZone, Utc};
use secrecy::{ExposeSecret, Secret};
use std::collections::HashMap;
use std::sync::Mutex;

pub const BOT_ID: u64 = 1_000;
pub const GUILD_ID: u64 = 2_000;
pub const CHANNEL_ID: u64 = 3_000;

pub fn raid(id: i64, message_id: Option<u64>) -> Raid {
    Raid {
        id,
        raid_type: RaidType::MoltenCore,
        date: Utc.with_ymd_and_hms(2020, 3, 10, 19, 30, 0).unwrap(),
        comment: None,
        discord_message_id: message_id,
    }
}

#[derive(Default)]
pub struct MemoryRaidStore {
    pub raids: Mutex<HashMap<i64, Raid>>,
    pub subscriptions: Mutex<Vec<RaidSubscription>>,
    pub saves: Mutex<usize>,
}

impl MemoryRaidStore {
    pub fn with(raids: Vec<Raid>) -> Self {
        let store = Self::default();
        {
            let mut map = store.raids.lock().unwrap();
            for r in raids {
                map.insert(r.id, r);
            }
        }
        store
    }

    pub fn get(&self, id: i64) -> Raid {
        self.raids.lock().unwrap().get(&id).cloned().unwrap()
    }

    pub fn save_count(&self) -> usize {
        *self.saves.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl RaidStore for MemoryRaidStore {
    async fn find(&self, raid_id: i64) -> Result<Raid, DomainError> {
        self.raids
            .lock()
            .unwrap()
            .get(&raid_id)
            .cloned()
            .ok_or_else(|| DomainError::NotFound(format!("raid {}", raid_id)))
    }

    async fn save(&self, raid: &Raid) -> Result<(), DomainError> {
        *self.saves.lock().unwrap() += 1;
        self.raids.lock().unwrap().insert(raid.id, raid.clone());
        Ok(())
    }

    async fn subscriptions(&self, raid_id: i64) -> Result<Vec<RaidSubscription>, DomainError> {
        Ok(self
            .subscriptions
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.raid_id == raid_id)
            .cloned()
            .collect())
    }

    async fn find_by_message_id(&self, message_id: u64) -> Result<Option<Raid>, DomainError> {
        Ok(self
            .raids
            .lock()
            .unwrap()
            .values()
            .find(|r| r.discord_message_id == Some(message_id))
            .cloned())
    }

    async fn save_subscription(&self, subscription: &RaidSubscription) -> Result<(), DomainError> {
        let mut subs = self.subscriptions.lock().unwrap();
        subs.retain(|s| !(s.raid_id == subscription.raid_id && s.user_id == subscription.user_id));
        subs.push(subscription.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryUserStore {
    pub users: Mutex<Vec<LocalUser>>,
}

#[async_trait::async_trait]
impl UserStore for MemoryUserStore {
    async fn save_or_update(&self, discord_id: u64, name: &str) -> Result<LocalUser, DomainError> {
        let mut users = self.users.lock().unwrap();
        if let Some(u) = users.iter_mut().find(|u| u.discord_id == discord_id) {
            u.name = name.to_string();
            return Ok(u.clone());
        }
        let user = LocalUser {
            id: users.len() as i64 + 1,
            discord_id,
            name: name.to_string(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_discord_id(&self, discord_id: u64) -> Result<Option<LocalUser>, DomainError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.discord_id == discord_id)
            .cloned())
    }
}

/// Renders the title only, with the participant count in the footer.
pub struct TitleRenderer;

impl EmbedRenderer for TitleRenderer {
    fn render(&self, raid: &Raid, subscriptions: &[RaidSubscription], raid_url: &str) -> MessageBody {
        MessageBody {
            title: raid.raid_type.display_name().to_string(),
            url: Some(raid_url.to_string()),
            footer: Some(format!("{} answers", subscriptions.len())),
            ..Default::default()
        }
    }
}

/// Every remote call the fake gateway received, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Fetch(u64),
    Send,
    Edit(u64),
    Delete(u64),
    React(u64, Emote),
    Unreact { message_id: u64, user_id: u64 },
    Dm(u64, String),
}

pub struct FakeChat {
    pub calls: Mutex<Vec<Call>>,
    /// Messages that currently exist in the channel.
    pub messages: Mutex<HashMap<u64, ExternalMessage>>,
    /// Guild members: id -> (display name, role names).
    pub members: HashMap<u64, (String, Vec<String>)>,
    pub next_id: Mutex<u64>,
    pub fail_fetch: bool,
    pub fail_delete: bool,
    pub fail_unreact: bool,
    pub fail_dm_for: Vec<u64>,
    /// Fail the n-th `add_reaction` call (1-based), once.
    pub fail_react_at: Option<usize>,
    pub reacts: Mutex<usize>,
    /// Members whose role lookup reports them gone.
    pub roles_missing_for: Vec<u64>,
}

impl Default for FakeChat {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            messages: Mutex::new(HashMap::new()),
            members: HashMap::new(),
            next_id: Mutex::new(500),
            fail_fetch: false,
            fail_delete: false,
            fail_unreact: false,
            fail_dm_for: Vec::new(),
            fail_react_at: None,
            reacts: Mutex::new(0),
            roles_missing_for: Vec::new(),
        }
    }
}

impl FakeChat {
    pub fn with_message(self, id: u64, author_id: u64) -> Self {
        self.messages.lock().unwrap().insert(
            id,
            ExternalMessage {
                id,
                author_id,
                reactions: Vec::new(),
            },
        );
        self
    }

    pub fn with_member(mut self, id: u64, name: &str, roles: &[&str]) -> Self {
        self.members.insert(
            id,
            (name.to_string(), roles.iter().map(|r| r.to_string()).collect()),
        );
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn reactions(&self) -> Vec<Emote> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::React(_, e) => Some(e),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait::async_trait]
impl ChatGateway for FakeChat {
    fn bot_user_id(&self) -> u64 {
        BOT_ID
    }

    async fn fetch_message(
        &self,
        _channel_id: u64,
        message_id: u64,
    ) -> Result<ExternalMessage, DomainError> {
        self.record(Call::Fetch(message_id));
        if self.fail_fetch {
            return Err(DomainError::RemoteTransient("connection reset".into()));
        }
        self.messages
            .lock()
            .unwrap()
            .get(&message_id)
            .cloned()
            .ok_or_else(|| DomainError::NotFound(format!("message {}", message_id)))
    }

    async fn send_message(
        &self,
        _channel_id: u64,
        _body: &MessageBody,
    ) -> Result<ExternalMessage, DomainError> {
        self.record(Call::Send);
        let id = {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            *next
        };
        let message = ExternalMessage {
            id,
            author_id: BOT_ID,
            reactions: Vec::new(),
        };
        self.messages.lock().unwrap().insert(id, message.clone());
        Ok(message)
    }

    async fn edit_message(
        &self,
        _channel_id: u64,
        message_id: u64,
        _body: &MessageBody,
    ) -> Result<(), DomainError> {
        self.record(Call::Edit(message_id));
        Ok(())
    }

    async fn delete_message(&self, _channel_id: u64, message_id: u64) -> Result<(), DomainError> {
        self.record(Call::Delete(message_id));
        if self.fail_delete {
            return Err(DomainError::RemoteTransient("503".into()));
        }
        self.messages.lock().unwrap().remove(&message_id);
        Ok(())
    }

    async fn add_reaction(
        &self,
        _channel_id: u64,
        message_id: u64,
        emote: &Emote,
    ) -> Result<(), DomainError> {
        self.record(Call::React(message_id, emote.clone()));
        let attempt = {
            let mut reacts = self.reacts.lock().unwrap();
            *reacts += 1;
            *reacts
        };
        if self.fail_react_at == Some(attempt) {
            return Err(DomainError::RemoteTransient("429".into()));
        }
        Ok(())
    }

    async fn remove_reaction(
        &self,
        _channel_id: u64,
        message_id: u64,
        user_id: u64,
        _emote: &EmoteRef,
    ) -> Result<(), DomainError> {
        self.record(Call::Unreact {
            message_id,
            user_id,
        });
        if self.fail_unreact {
            return Err(DomainError::RemoteTransient("timeout".into()));
        }
        Ok(())
    }

    async fn member_display_name(
        &self,
        _guild_id: u64,
        user_id: u64,
    ) -> Result<String, DomainError> {
        self.members
            .get(&user_id)
            .map(|(name, _)| name.clone())
            .ok_or_else(|| DomainError::NotFound(format!("member {}", user_id)))
    }

    async fn member_role_names(
        &self,
        _guild_id: u64,
        user_id: u64,
    ) -> Result<Vec<String>, DomainError> {
        if self.roles_missing_for.contains(&user_id) {
            return Err(DomainError::NotFound(format!("member {}", user_id)));
        }
        self.members
            .get(&user_id)
            .map(|(_, roles)| roles.clone())
            .ok_or_else(|| DomainError::NotFound(format!("member {}", user_id)))
    }

    async fn send_private_message(&self, user_id: u64, text: &str) -> Result<(), DomainError> {
        self.record(Call::Dm(user_id, text.to_string()));
        if self.fail_dm_for.contains(&user_id) {
            return Err(DomainError::RemoteTransient("cannot DM".into()));
        }
        Ok(())
    }
}

/// Records every delivered action.
#[derive(Default)]
pub struct RecordingListener {
    pub classes: Mutex<Vec<(u64, u64, CharacterClass)>>,
    pub responses: Mutex<Vec<(u64, u64, SubscriptionResponse)>>,
    pub fail: bool,
}

#[async_trait::async_trait]
impl ClassChoiceListener for RecordingListener {
    async fn on_class_choice(
        &self,
        discord_user_id: u64,
        message_id: u64,
        class: CharacterClass,
    ) -> Result<(), DomainError> {
        self.classes
            .lock()
            .unwrap()
            .push((discord_user_id, message_id, class));
        if self.fail {
            return Err(DomainError::Repo("disk full".into()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ResponseListener for RecordingListener {
    async fn on_response(
        &self,
        discord_user_id: u64,
        message_id: u64,
        response: SubscriptionResponse,
    ) -> Result<(), DomainError> {
        self.responses
            .lock()
            .unwrap()
            .push((discord_user_id, message_id, response));
        Ok(())
    }
}

/// Identity provider that accepts one code and returns a fixed identity.
pub struct FakeIdentity {
    pub code: String,
    pub identity: ExternalIdentity,
}

#[async_trait::async_trait]
impl IdentityProvider for FakeIdentity {
    fn authorize_url(&self, state: &str) -> Result<String, DomainError> {
        Ok(format!("https://discord.test/authorize?state={}", state))
    }

    async fn exchange_code(&self, code: &str) -> Result<Secret<String>, DomainError> {
        if code == self.code {
            Ok(Secret::new(format!("token-{}", code)))
        } else {
            Err(DomainError::Identity("invalid_grant".into()))
        }
    }

    async fn fetch_identity(
        &self,
        access_token: &Secret<String>,
    ) -> Result<ExternalIdentity, DomainError> {
        if access_token.expose_secret() == &format!("token-{}", self.code) {
            Ok(self.identity.clone())
        } else {
            Err(DomainError::Identity("401".into()))
        }
    }
}

//! Map serenity types to domain entities and back.
//!
//! Emotes go both ways: `Emote`/`EmoteRef` -> `ReactionType` for REST calls,
//! gateway `Reaction` -> `ReactionEvent` for the dispatcher.

use crate::domain::{DomainError, Emote, EmoteRef, ExternalMessage, MessageBody, ReactionEvent};
use serenity::all::{
    CreateEmbed, CreateEmbedFooter, EmojiId, Message, Reaction, ReactionType,
};
use serenity::http::HttpError;

/// Reaction payload for a registry emote (always a custom guild emote).
pub fn reaction_for_emote(emote: &Emote) -> ReactionType {
    ReactionType::Custom {
        animated: false,
        id: EmojiId::new(emote.id),
        name: Some(emote.name.clone()),
    }
}

pub fn reaction_for_ref(emote: &EmoteRef) -> ReactionType {
    match emote {
        EmoteRef::Custom { id, name } => ReactionType::Custom {
            animated: false,
            id: EmojiId::new(*id),
            name: name.clone(),
        },
        EmoteRef::Unicode(s) => ReactionType::Unicode(s.clone()),
    }
}

pub fn emote_ref(reaction: &ReactionType) -> EmoteRef {
    match reaction {
        ReactionType::Custom { id, name, .. } => EmoteRef::Custom {
            id: id.get(),
            name: name.clone(),
        },
        ReactionType::Unicode(s) => EmoteRef::Unicode(s.clone()),
        other => EmoteRef::Unicode(other.to_string()),
    }
}

/// Gateway reaction-add -> domain event. `None` when the event carries no user
/// (should not happen for guild reactions).
pub fn reaction_event(reaction: &Reaction) -> Option<ReactionEvent> {
    let user_id = reaction.user_id?;
    Some(ReactionEvent {
        user_id: user_id.get(),
        user_is_bot: reaction.member.as_ref().is_some_and(|m| m.user.bot),
        channel_id: reaction.channel_id.get(),
        message_id: reaction.message_id.get(),
        emote: emote_ref(&reaction.emoji),
    })
}

pub fn external_message(message: &Message) -> ExternalMessage {
    ExternalMessage {
        id: message.id.get(),
        author_id: message.author.id.get(),
        reactions: message
            .reactions
            .iter()
            .map(|r| emote_ref(&r.reaction_type))
            .collect(),
    }
}

pub fn embed(body: &MessageBody) -> CreateEmbed {
    let mut embed = CreateEmbed::new().title(&body.title);
    if let Some(description) = &body.description {
        embed = embed.description(description);
    }
    if let Some(url) = &body.url {
        embed = embed.url(url);
    }
    for field in &body.fields {
        embed = embed.field(&field.name, &field.value, field.inline);
    }
    if let Some(footer) = &body.footer {
        embed = embed.footer(CreateEmbedFooter::new(footer));
    }
    embed
}

/// HTTP 404 -> NotFound; anything else (other statuses, network, gateway) -> RemoteTransient.
pub fn map_error(op: &str, err: serenity::Error) -> DomainError {
    if let serenity::Error::Http(HttpError::UnsuccessfulRequest(resp)) = &err {
        if resp.status_code.as_u16() == 404 {
            return DomainError::NotFound(format!("{}: {}", op, resp.error.message));
        }
    }
    DomainError::RemoteTransient(format!("{}: {}", op, err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EmbedField;

    #[test]
    fn registry_emote_becomes_custom_reaction() {
        let reaction = reaction_for_emote(&Emote::new("mage", 580801859221192714));
        assert_eq!(reaction.to_string(), "<:mage:580801859221192714>");
        assert_eq!(
            emote_ref(&reaction),
            EmoteRef::Custom {
                id: 580801859221192714,
                name: Some("mage".into())
            }
        );
    }

    #[test]
    fn unicode_reactions_stay_unicode() {
        let reaction = reaction_for_ref(&EmoteRef::Unicode("👍".into()));
        assert!(matches!(reaction, ReactionType::Unicode(ref s) if s == "👍"));
        assert_eq!(emote_ref(&reaction), EmoteRef::Unicode("👍".into()));
    }

    #[test]
    fn embed_carries_every_part_of_the_body() {
        let body = MessageBody {
            title: "Molten Core".into(),
            description: Some("bring fire resist".into()),
            url: Some("https://raids.test/raids/1".into()),
            fields: vec![EmbedField {
                name: "Present (1)".into(),
                value: "Thrall".into(),
                inline: true,
            }],
            footer: Some("1 answer".into()),
        };

        let json = serde_json::to_value(embed(&body)).unwrap();

        assert_eq!(json["title"], "Molten Core");
        assert_eq!(json["description"], "bring fire resist");
        assert_eq!(json["url"], "https://raids.test/raids/1");
        assert_eq!(json["fields"][0]["name"], "Present (1)");
        assert_eq!(json["fields"][0]["inline"], true);
        assert_eq!(json["footer"]["text"], "1 answer");
    }

    #[test]
    fn non_http_errors_are_transient() {
        let err = map_error("fetch_message", serenity::Error::Other("socket closed"));
        assert!(matches!(err, DomainError::RemoteTransient(ref m) if m.contains("fetch_message")));
    }
}

//! Default embed layout: one field per answer, participants listed with their class emote.

use crate::domain::{EmbedField, EmoteRegistry, MessageBody, Raid, RaidSubscription, SubscriptionResponse};
use crate::ports::EmbedRenderer;
use std::sync::Arc;

const EMPTY_FIELD: &str = "-";
const FOOTER: &str = "Click your class to sign up, or an answer to change it";

pub struct PlainEmbedRenderer {
    emotes: Arc<EmoteRegistry>,
}

impl PlainEmbedRenderer {
    pub fn new(emotes: Arc<EmoteRegistry>) -> Self {
        Self { emotes }
    }

    fn participant_line(&self, subscription: &RaidSubscription) -> String {
        match subscription.character_class {
            Some(class) => format!(
                "{} {}",
                self.emotes.emote_for_class(class),
                subscription.user_name
            ),
            None => subscription.user_name.clone(),
        }
    }
}

impl EmbedRenderer for PlainEmbedRenderer {
    fn render(&self, raid: &Raid, subscriptions: &[RaidSubscription], raid_url: &str) -> MessageBody {
        let fields = SubscriptionResponse::ALL
            .into_iter()
            .map(|response| {
                let lines: Vec<String> = subscriptions
                    .iter()
                    .filter(|s| s.response == response)
                    .map(|s| self.participant_line(s))
                    .collect();
                EmbedField {
                    name: format!(
                        "{} {} ({})",
                        self.emotes.emote_for_response(response),
                        response.label(),
                        lines.len()
                    ),
                    value: if lines.is_empty() {
                        EMPTY_FIELD.to_string()
                    } else {
                        lines.join("\n")
                    },
                    inline: true,
                }
            })
            .collect();

        MessageBody {
            title: format!(
                "{} - {}",
                raid.raid_type.display_name(),
                raid.date.format("%A %d/%m/%Y %H:%M UTC")
            ),
            description: raid.comment.clone().filter(|c| !c.trim().is_empty()),
            url: Some(raid_url.to_string()),
            fields,
            footer: Some(FOOTER.to_string()),
        }
    }
}

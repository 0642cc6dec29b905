//! Private reminders for raid members who have not answered yet.

use crate::domain::DomainError;
use crate::ports::{ChatGateway, RaidStore, UserStore};
use crate::shared::RaidUrls;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct RaidNotifier {
    chat: Arc<dyn ChatGateway>,
    raids: Arc<dyn RaidStore>,
    users: Arc<dyn UserStore>,
    urls: RaidUrls,
}

impl RaidNotifier {
    pub fn new(
        chat: Arc<dyn ChatGateway>,
        raids: Arc<dyn RaidStore>,
        users: Arc<dyn UserStore>,
        urls: RaidUrls,
    ) -> Self {
        Self {
            chat,
            raids,
            users,
            urls,
        }
    }

    /// DM a link to the raid to every candidate who has not answered it yet.
    /// Returns how many messages went out. A user who cannot be reached is skipped.
    pub async fn notify_missing(
        &self,
        raid_id: i64,
        discord_user_ids: &[u64],
    ) -> Result<usize, DomainError> {
        let raid = self.raids.find(raid_id).await?;
        let answered: HashSet<i64> = self
            .raids
            .subscriptions(raid_id)
            .await?
            .into_iter()
            .map(|s| s.user_id)
            .collect();
        let text = format!(
            "You have not answered for {} on {} yet: {}",
            raid.raid_type.display_name(),
            raid.date.format("%d/%m/%Y %H:%M"),
            self.urls.raid_url(raid.id)
        );

        let mut sent = 0;
        let mut pending = 0;
        for &user_id in discord_user_ids {
            let local = self.users.find_by_discord_id(user_id).await?;
            if local.is_some_and(|u| answered.contains(&u.id)) {
                debug!(raid_id, user_id, "already answered");
                continue;
            }
            pending += 1;
            match self.chat.send_private_message(user_id, &text).await {
                Ok(()) => sent += 1,
                Err(e) => warn!(raid_id, user_id, error = %e, "reminder not delivered"),
            }
        }
        info!(raid_id, sent, pending, candidates = discord_user_ids.len(), "missing answer reminders sent");
        Ok(sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RaidSubscription, SubscriptionResponse};
    use crate::usecases::test_support::*;

    fn notifier(chat: &Arc<FakeChat>, raids: MemoryRaidStore, users: Arc<MemoryUserStore>) -> RaidNotifier {
        RaidNotifier::new(
            Arc::clone(chat) as Arc<dyn ChatGateway>,
            Arc::new(raids),
            users,
            RaidUrls::new("https://raids.test"),
        )
    }

    #[tokio::test]
    async fn unreachable_users_are_skipped() {
        let chat = Arc::new(FakeChat {
            fail_dm_for: vec![2],
            ..Default::default()
        });
        let notifier = notifier(
            &chat,
            MemoryRaidStore::with(vec![raid(4, None)]),
            Arc::new(MemoryUserStore::default()),
        );

        let sent = notifier.notify_missing(4, &[1, 2, 3]).await.unwrap();

        assert_eq!(sent, 2);
        let dms: Vec<_> = chat
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Dm(user, text) => Some((user, text)),
                _ => None,
            })
            .collect();
        assert_eq!(dms.len(), 3);
        assert!(dms[0].1.contains("Molten Core"));
        assert!(dms[0].1.contains("10/03/2020 19:30"));
        assert!(dms[0].1.ends_with("https://raids.test/raids/4"));
    }

    #[tokio::test]
    async fn unknown_raid_sends_nothing() {
        let chat = Arc::new(FakeChat::default());
        let notifier = notifier(
            &chat,
            MemoryRaidStore::default(),
            Arc::new(MemoryUserStore::default()),
        );

        assert!(notifier.notify_missing(4, &[1]).await.unwrap_err().is_not_found());
        assert!(chat.calls().is_empty());
    }

    #[tokio::test]
    async fn users_who_answered_are_not_reminded() {
        let users = Arc::new(MemoryUserStore::default());
        let answered = users.save_or_update(1, "Jaina").await.unwrap();
        users.save_or_update(2, "Thrall").await.unwrap();
        let raids = MemoryRaidStore::with(vec![raid(4, None)]);
        raids
            .save_subscription(&RaidSubscription {
                raid_id: 4,
                user_id: answered.id,
                user_name: answered.name.clone(),
                response: SubscriptionResponse::Absent,
                character_class: None,
            })
            .await
            .unwrap();
        let chat = Arc::new(FakeChat::default());

        let sent = notifier(&chat, raids, users)
            .notify_missing(4, &[1, 2, 3])
            .await
            .unwrap();

        assert_eq!(sent, 2);
        let recipients: Vec<u64> = chat
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Dm(user, _) => Some(user),
                _ => None,
            })
            .collect();
        assert_eq!(recipients, vec![2, 3]);
    }
}

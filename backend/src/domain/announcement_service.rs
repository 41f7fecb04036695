//! TV announcement management.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;
use uuid::Uuid;

use crate::domain::ports::{AccountRepository, AnnouncementRepository, TvAnnouncements};
use crate::domain::service_support::{load_actor, map_announcement_error};
use crate::domain::{
    AnnouncementDraft, BoardChange, ChangeFeed, Error, Permission, TvAnnouncement, UserId,
};

/// Service implementing [`TvAnnouncements`].
pub struct AnnouncementService<N, A> {
    announcements: Arc<N>,
    accounts: Arc<A>,
    feed: ChangeFeed,
    clock: Arc<dyn Clock>,
}

impl<N, A> AnnouncementService<N, A> {
    pub fn new(
        announcements: Arc<N>,
        accounts: Arc<A>,
        feed: ChangeFeed,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            announcements,
            accounts,
            feed,
            clock,
        }
    }
}

impl<N, A> AnnouncementService<N, A>
where
    N: AnnouncementRepository,
    A: AccountRepository,
{
    async fn editor(&self, caller: &UserId) -> Result<(), Error> {
        load_actor(self.accounts.as_ref(), caller)
            .await?
            .require_permission(Permission::TvAnnouncements)
    }
}

#[async_trait]
impl<N, A> TvAnnouncements for AnnouncementService<N, A>
where
    N: AnnouncementRepository,
    A: AccountRepository,
{
    async fn visible(&self) -> Result<Vec<TvAnnouncement>, Error> {
        let now = self.clock.utc();
        let all = self
            .announcements
            .list()
            .await
            .map_err(map_announcement_error)?;
        Ok(all.into_iter().filter(|item| item.is_visible(now)).collect())
    }

    async fn list(&self, caller: &UserId) -> Result<Vec<TvAnnouncement>, Error> {
        self.editor(caller).await?;
        self.announcements
            .list()
            .await
            .map_err(map_announcement_error)
    }

    async fn create(
        &self,
        caller: &UserId,
        draft: AnnouncementDraft,
    ) -> Result<TvAnnouncement, Error> {
        self.editor(caller).await?;
        let now = self.clock.utc();
        let draft = draft.validate(now)?;
        let announcement = TvAnnouncement {
            id: Uuid::new_v4(),
            message: draft.message,
            background_color: draft.background_color,
            text_color: draft.text_color,
            icon: draft.icon,
            fullscreen: draft.fullscreen,
            active: true,
            expires_at: draft.expires_at,
            created_at: now,
        };
        self.announcements
            .insert(&announcement)
            .await
            .map_err(map_announcement_error)?;
        info!(announcement = %announcement.id, %caller, "announcement created");
        self.feed.publish(BoardChange::Announcements);
        Ok(announcement)
    }

    async fn set_active(
        &self,
        caller: &UserId,
        id: Uuid,
        active: bool,
    ) -> Result<TvAnnouncement, Error> {
        self.editor(caller).await?;
        let announcement = self
            .announcements
            .set_active(id, active)
            .await
            .map_err(map_announcement_error)?
            .ok_or_else(|| Error::not_found(format!("announcement {id} not found")))?;
        info!(announcement = %id, active, "announcement toggled");
        self.feed.publish(BoardChange::Announcements);
        Ok(announcement)
    }

    async fn delete(&self, caller: &UserId, id: Uuid) -> Result<(), Error> {
        self.editor(caller).await?;
        let removed = self
            .announcements
            .delete(id)
            .await
            .map_err(map_announcement_error)?;
        if !removed {
            return Err(Error::not_found(format!("announcement {id} not found")));
        }
        info!(announcement = %id, "announcement deleted");
        self.feed.publish(BoardChange::Announcements);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockAccountRepository, MockAnnouncementRepository};
    use crate::domain::{BoardTrigger, ErrorCode, Role};
    use crate::test_support::{MutableClock, fixture_now, staff_account};
    use chrono::Duration;

    fn announcement(active: bool, expires_in: Option<Duration>) -> TvAnnouncement {
        TvAnnouncement {
            id: Uuid::new_v4(),
            message: "Vandaag tot 17:00 open".to_owned(),
            background_color: "#1E3A8A".to_owned(),
            text_color: "#FFFFFF".to_owned(),
            icon: None,
            fullscreen: false,
            active,
            expires_at: expires_in.map(|offset| fixture_now() + offset),
            created_at: fixture_now(),
        }
    }

    fn service(
        announcements: MockAnnouncementRepository,
        accounts: MockAccountRepository,
        feed: ChangeFeed,
    ) -> AnnouncementService<MockAnnouncementRepository, MockAccountRepository> {
        AnnouncementService::new(
            Arc::new(announcements),
            Arc::new(accounts),
            feed,
            Arc::new(MutableClock::new(fixture_now())),
        )
    }

    #[tokio::test]
    async fn only_active_unexpired_announcements_are_visible() {
        let mut announcements = MockAnnouncementRepository::new();
        announcements.expect_list().returning(|| {
            Ok(vec![
                announcement(true, None),
                announcement(false, None),
                announcement(true, Some(Duration::minutes(-1))),
                announcement(true, Some(Duration::hours(2))),
            ])
        });

        let visible = service(announcements, MockAccountRepository::new(), ChangeFeed::new())
            .visible()
            .await
            .expect("visible");
        assert_eq!(visible.len(), 2);
    }

    #[tokio::test]
    async fn creating_publishes_to_the_board() {
        let actor = staff_account(Role::Foh, &[Permission::TvAnnouncements]);
        let known = actor.clone();
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find()
            .returning(move |_| Ok(Some(known.clone())));
        let mut announcements = MockAnnouncementRepository::new();
        announcements.expect_insert().times(1).returning(|_| Ok(()));
        let feed = ChangeFeed::new();
        let mut observer = feed.observe(std::time::Duration::from_secs(60));

        let created = service(announcements, accounts, feed)
            .create(
                actor.user_id(),
                AnnouncementDraft {
                    message: "Koffie staat klaar".to_owned(),
                    background_color: "#10b981".to_owned(),
                    text_color: "#ffffff".to_owned(),
                    icon: None,
                    fullscreen: true,
                    expires_at: None,
                },
            )
            .await
            .expect("created");
        assert_eq!(created.background_color, "#10B981");
        assert_eq!(
            observer.changed().await,
            BoardTrigger::Pushed(BoardChange::Announcements)
        );
    }

    #[tokio::test]
    async fn mechanics_cannot_manage_announcements() {
        let actor = staff_account(Role::Monteur, &[]);
        let known = actor.clone();
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find()
            .returning(move |_| Ok(Some(known.clone())));
        let mut announcements = MockAnnouncementRepository::new();
        announcements.expect_delete().never();

        let error = service(announcements, accounts, ChangeFeed::new())
            .delete(actor.user_id(), Uuid::new_v4())
            .await
            .expect_err("forbidden");
        assert_eq!(error.code(), ErrorCode::Forbidden);
    }
}

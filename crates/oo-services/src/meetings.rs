//! Meeting room bookings

use oo_contracts::{require_evaluator, require_owner_or_admin, validate_attributes, UserContext};
use oo_core::{Id, OoError, OoResult};
use oo_models::{Meeting, NewMeeting};
use tracing::{info, instrument};

use crate::context::ServiceContext;

pub struct MeetingService<'a, U: UserContext> {
    ctx: &'a ServiceContext,
    user: &'a U,
}

impl<'a, U: UserContext> MeetingService<'a, U> {
    pub fn new(ctx: &'a ServiceContext, user: &'a U) -> Self {
        Self { ctx, user }
    }

    #[instrument(skip_all, fields(user_id = self.user.id(), room = %input.room_name))]
    pub async fn book(&self, input: NewMeeting) -> OoResult<Meeting> {
        validate_attributes(&input)?;
        let meeting = Meeting::book(self.user.id(), input, self.ctx.now());
        let saved = self.ctx.stores.meetings.insert(&meeting).await?;
        info!(meeting_id = ?saved.id, "Meeting booked");
        Ok(saved)
    }

    /// Admins see every booking, everyone else their own; newest first
    pub async fn list(&self) -> OoResult<Vec<Meeting>> {
        let organizer = (!self.user.is_admin()).then(|| self.user.id());
        Ok(self.ctx.stores.meetings.list(organizer).await?)
    }

    #[instrument(skip_all, fields(user_id = self.user.id(), meeting_id = id))]
    pub async fn start(&self, id: Id) -> OoResult<Meeting> {
        let meeting = self.find(id).await?;
        require_owner_or_admin(self.user, meeting.user_id, "start this meeting")?;
        self.save(meeting.start(self.ctx.now())?, "Meeting started").await
    }

    #[instrument(skip_all, fields(user_id = self.user.id(), meeting_id = id))]
    pub async fn end(&self, id: Id) -> OoResult<Meeting> {
        let meeting = self.find(id).await?;
        require_owner_or_admin(self.user, meeting.user_id, "end this meeting")?;
        self.save(meeting.end(self.ctx.now())?, "Meeting ended").await
    }

    /// GA staff may close any meeting that has not ended yet
    #[instrument(skip_all, fields(user_id = self.user.id(), meeting_id = id))]
    pub async fn force_end(&self, id: Id) -> OoResult<Meeting> {
        require_evaluator(self.user, "force end meetings")?;
        let meeting = self.find(id).await?;
        self.save(meeting.force_end(self.ctx.now())?, "Meeting force ended").await
    }

    async fn find(&self, id: Id) -> OoResult<Meeting> {
        self.ctx
            .stores
            .meetings
            .find(id)
            .await?
            .ok_or_else(|| OoError::not_found("Meeting", id))
    }

    async fn save(&self, meeting: Meeting, message: &'static str) -> OoResult<Meeting> {
        let saved = self.ctx.stores.meetings.update(&meeting).await?;
        info!(status = %saved.status, "{}", message);
        Ok(saved)
    }
}

//! Peer ratings and per-account summaries.

use super::{
    report_mutation, Mirror, Placement, ResourceStore, StoreContext, StoreError, StoreResult,
};
use crate::model::profile::AccountId;
use crate::model::rating::{average_score, Rating, RatingDraft};
use crate::remote::{ChannelSpec, Table};
use crate::repo::rating_repo::RatingRepository;

pub struct RatingStore<'r> {
    ctx: StoreContext<'r>,
    mirror: Mirror<Rating>,
}

impl<'r> RatingStore<'r> {
    pub fn new(ctx: StoreContext<'r>) -> Self {
        Self {
            ctx,
            mirror: Mirror::new(),
        }
    }

    /// Ratings received by `account`, newest first.
    pub fn received_by(&self, account: AccountId) -> Vec<&Rating> {
        self.items()
            .iter()
            .filter(|rating| rating.rated_user_id == account)
            .collect()
    }

    pub fn count_for(&self, account: AccountId) -> usize {
        self.received_by(account).len()
    }

    /// Mean score received by `account`; `0.0` when it has none.
    pub fn average_for(&self, account: AccountId) -> f64 {
        average_score(self.received_by(account))
    }

    pub fn submit_rating(&mut self, draft: RatingDraft) -> StoreResult<Rating> {
        let ctx = self.ctx;
        let result = ctx.require_account().and_then(|rater| {
            draft.validate()?;
            RatingRepository::new(ctx.remote)
                .create(&draft.into_new_rating(rater))
                .map_err(StoreError::Write)
        });
        let rating = report_mutation(&ctx, "submit_rating", "Failed to submit rating", result)?;

        ctx.notifier.success("Rating submitted successfully!");
        self.mirror
            .merge(rating.clone(), Placement::Front, |existing| existing.id == rating.id);
        Ok(rating)
    }
}

impl<'r> ResourceStore<'r> for RatingStore<'r> {
    type Item = Rating;

    const RESOURCE: &'static str = "ratings";

    fn context(&self) -> StoreContext<'r> {
        self.ctx
    }

    fn mirror(&self) -> &Mirror<Rating> {
        &self.mirror
    }

    fn mirror_mut(&mut self) -> &mut Mirror<Rating> {
        &mut self.mirror
    }

    fn load(&self) -> StoreResult<Option<Vec<Rating>>> {
        if !self.ctx.session.is_authenticated() {
            return Ok(None);
        }
        RatingRepository::new(self.ctx.remote)
            .list_all()
            .map(Some)
            .map_err(StoreError::Read)
    }

    fn channels(&self) -> Vec<ChannelSpec> {
        if !self.ctx.session.is_authenticated() {
            return Vec::new();
        }
        vec![ChannelSpec::table(Table::Ratings)]
    }
}

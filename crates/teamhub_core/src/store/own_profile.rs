//! The signed-in account's own profile.

use super::{report_mutation, Mirror, ResourceStore, StoreContext, StoreError, StoreResult};
use crate::model::profile::{Profile, ProfileUpdate};
use crate::remote::{ChannelSpec, Table};
use crate::repo::id_value;
use crate::repo::profile_repo::ProfileRepository;

/// Holds zero or one profile: the session account's.
pub struct OwnProfileStore<'r> {
    ctx: StoreContext<'r>,
    mirror: Mirror<Profile>,
}

impl<'r> OwnProfileStore<'r> {
    pub fn new(ctx: StoreContext<'r>) -> Self {
        Self {
            ctx,
            mirror: Mirror::new(),
        }
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.items().first()
    }

    pub fn update_profile(&mut self, update: ProfileUpdate) -> StoreResult<Profile> {
        let ctx = self.ctx;
        let result = ctx.require_account().and_then(|account| {
            update.validate()?;
            ProfileRepository::new(ctx.remote)
                .update(account, &update)
                .map_err(StoreError::Write)
        });
        let profile =
            report_mutation(&ctx, "update_profile", "Failed to update profile", result)?;

        ctx.notifier.success("Profile updated successfully!");
        self.mirror.replace(vec![profile.clone()]);
        Ok(profile)
    }
}

impl<'r> ResourceStore<'r> for OwnProfileStore<'r> {
    type Item = Profile;

    const RESOURCE: &'static str = "profile";

    fn context(&self) -> StoreContext<'r> {
        self.ctx
    }

    fn mirror(&self) -> &Mirror<Profile> {
        &self.mirror
    }

    fn mirror_mut(&mut self) -> &mut Mirror<Profile> {
        &mut self.mirror
    }

    fn load(&self) -> StoreResult<Option<Vec<Profile>>> {
        let Some(account) = self.ctx.session.account_id() else {
            return Ok(None);
        };
        ProfileRepository::new(self.ctx.remote)
            .get(account)
            .map(|profile| Some(profile.into_iter().collect()))
            .map_err(StoreError::Read)
    }

    fn channels(&self) -> Vec<ChannelSpec> {
        match self.ctx.session.account_id() {
            Some(account) => {
                vec![ChannelSpec::table(Table::Profiles).filter_eq("id", id_value(account))]
            }
            None => Vec::new(),
        }
    }
}

//! Directory of every profile, used by the team finder and ratings views.

use super::{Mirror, ResourceStore, StoreContext, StoreError, StoreResult};
use crate::model::profile::{AccountId, Profile};
use crate::remote::{ChannelSpec, Table};
use crate::repo::profile_repo::ProfileRepository;

pub struct ProfileDirectoryStore<'r> {
    ctx: StoreContext<'r>,
    mirror: Mirror<Profile>,
}

impl<'r> ProfileDirectoryStore<'r> {
    pub fn new(ctx: StoreContext<'r>) -> Self {
        Self {
            ctx,
            mirror: Mirror::new(),
        }
    }

    pub fn find(&self, id: AccountId) -> Option<&Profile> {
        self.mirror.find(|profile| profile.id == id)
    }

    /// Profiles other than the session account's, in snapshot order.
    pub fn others(&self) -> Vec<&Profile> {
        let me = self.ctx.session.account_id();
        self.items()
            .iter()
            .filter(|profile| Some(profile.id) != me)
            .collect()
    }
}

impl<'r> ResourceStore<'r> for ProfileDirectoryStore<'r> {
    type Item = Profile;

    const RESOURCE: &'static str = "profiles";

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
        if !self.ctx.session.is_authenticated() {
            return Ok(None);
        }
        ProfileRepository::new(self.ctx.remote)
            .list_all()
            .map(Some)
            .map_err(StoreError::Read)
    }

    fn channels(&self) -> Vec<ChannelSpec> {
        if !self.ctx.session.is_authenticated() {
            return Vec::new();
        }
        vec![ChannelSpec::table(Table::Profiles)]
    }
}

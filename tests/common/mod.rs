//! Common Test Utilities
//!
//! In-memory repository fakes and a service harness. The fakes honor the
//! same conditional-update contracts as the Postgres implementations:
//! relationship transitions and membership changes evaluate their
//! presence predicate inside the store and report rejection as `None`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Duration;
use uuid::Uuid;

use relay_server::application::services::{
    AuthServiceImpl, ChannelServiceImpl, CredentialHasher, DomainServiceImpl, UserServiceImpl,
};
use relay_server::domain::{
    Channel, ChannelRepository, ChannelSummary, Message, RelationshipAction, User, UserRepository,
    GLOBAL_CHANNEL, MIN_MEMBERS,
};
use relay_server::infrastructure::sessions::SessionStore;
use relay_server::shared::error::AppError;

/// User store fake backed by a map.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<String, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_name(&self, name: &str) -> Result<Option<User>, AppError> {
        Ok(self.users.lock().unwrap().get(name).cloned())
    }

    async fn create(&self, user: &User) -> Result<User, AppError> {
        let mut users = self.users.lock().unwrap();
        if users.contains_key(&user.name) {
            return Err(AppError::Conflict("User already exists".into()));
        }
        users.insert(user.name.clone(), user.clone());
        Ok(user.clone())
    }

    async fn delete(&self, name: &str) -> Result<(), AppError> {
        match self.users.lock().unwrap().remove(name) {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound("User doesn't exist".into())),
        }
    }

    async fn list_names(&self) -> Result<Vec<String>, AppError> {
        let mut names: Vec<String> = self.users.lock().unwrap().keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn name_exists(&self, name: &str) -> Result<bool, AppError> {
        Ok(self.users.lock().unwrap().contains_key(name))
    }

    async fn update_relationship(
        &self,
        acting: &str,
        action: RelationshipAction,
        target: &str,
    ) -> Result<Option<User>, AppError> {
        let mut users = self.users.lock().unwrap();
        let Some(user) = users.get_mut(acting) else {
            return Ok(None);
        };

        let list = match action.target_list() {
            "friends" => &mut user.friends,
            _ => &mut user.blocked,
        };

        let present = list.iter().any(|n| n == target);
        if action.is_addition() {
            if present {
                return Ok(None);
            }
            list.push(target.to_string());
        } else {
            if !present {
                return Ok(None);
            }
            list.retain(|n| n != target);
        }

        Ok(Some(user.clone()))
    }
}

/// Channel store fake. `fail_next_add` injects a store failure into the
/// next membership addition, for exercising compensation paths.
#[derive(Default)]
pub struct InMemoryChannelRepository {
    channels: Mutex<HashMap<Uuid, Channel>>,
    pub fail_next_add: AtomicBool,
}

impl InMemoryChannelRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn channel_count(&self) -> usize {
        self.channels.lock().unwrap().len()
    }
}

#[async_trait]
impl ChannelRepository for InMemoryChannelRepository {
    async fn create(&self, channel: &Channel) -> Result<Channel, AppError> {
        self.channels
            .lock()
            .unwrap()
            .insert(channel.id, channel.clone());
        Ok(channel.clone())
    }

    async fn find_for_member(&self, member: &str, id: Uuid) -> Result<Option<Channel>, AppError> {
        Ok(self
            .channels
            .lock()
            .unwrap()
            .get(&id)
            .filter(|c| c.has_member(member))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Channel>, AppError> {
        Ok(self.channels.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Channel>, AppError> {
        Ok(self
            .channels
            .lock()
            .unwrap()
            .values()
            .find(|c| c.name == name)
            .cloned())
    }

    async fn list_for_member(&self, member: &str) -> Result<Vec<ChannelSummary>, AppError> {
        Ok(self
            .channels
            .lock()
            .unwrap()
            .values()
            .filter(|c| c.has_member(member))
            .map(|c| ChannelSummary {
                id: c.id,
                name: c.name.clone(),
                members: c.members.clone(),
                created_at: c.created_at,
            })
            .collect())
    }

    async fn add_member(
        &self,
        id: Uuid,
        user: &str,
        notice: &Message,
    ) -> Result<Option<Channel>, AppError> {
        if self.fail_next_add.swap(false, Ordering::SeqCst) {
            return Err(AppError::Unavailable("Store unavailable".into()));
        }

        let mut channels = self.channels.lock().unwrap();
        let Some(channel) = channels.get_mut(&id) else {
            return Ok(None);
        };
        if channel.has_member(user) {
            return Ok(None);
        }
        channel.members.push(user.to_string());
        channel.messages.push(notice.clone());
        Ok(Some(channel.clone()))
    }

    async fn remove_member(&self, id: Uuid, user: &str) -> Result<Option<Channel>, AppError> {
        let mut channels = self.channels.lock().unwrap();
        let Some(channel) = channels.get_mut(&id) else {
            return Ok(None);
        };
        if !channel.has_member(user) {
            return Ok(None);
        }
        channel.members.retain(|m| m != user);
        Ok(Some(channel.clone()))
    }

    async fn delete_if_depleted(&self, id: Uuid) -> Result<bool, AppError> {
        let mut channels = self.channels.lock().unwrap();
        let depleted = channels
            .get(&id)
            .map(|c| c.name != GLOBAL_CHANNEL && c.members.len() < MIN_MEMBERS)
            .unwrap_or(false);
        if depleted {
            channels.remove(&id);
        }
        Ok(depleted)
    }

    async fn append_user_message(
        &self,
        id: Uuid,
        author: &str,
        message: &Message,
    ) -> Result<Option<Channel>, AppError> {
        let mut channels = self.channels.lock().unwrap();
        let Some(channel) = channels.get_mut(&id) else {
            return Ok(None);
        };
        if !channel.has_member(author) {
            return Ok(None);
        }
        channel.messages.push(message.clone());
        Ok(Some(channel.clone()))
    }

    async fn append_system_message(
        &self,
        id: Uuid,
        message: &Message,
    ) -> Result<Option<Channel>, AppError> {
        let mut channels = self.channels.lock().unwrap();
        let Some(channel) = channels.get_mut(&id) else {
            return Ok(None);
        };
        channel.messages.push(message.clone());
        Ok(Some(channel.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        match self.channels.lock().unwrap().remove(&id) {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound("Channel doesn't exist".into())),
        }
    }
}

pub type TestUserService = UserServiceImpl<InMemoryUserRepository>;
pub type TestChannelService = ChannelServiceImpl<InMemoryChannelRepository, InMemoryUserRepository>;
pub type TestDomainService =
    DomainServiceImpl<TestUserService, TestChannelService, InMemoryChannelRepository>;
pub type TestAuthService = AuthServiceImpl<InMemoryUserRepository>;

/// Fully wired service stack over the in-memory fakes.
pub struct TestHarness {
    pub user_repo: Arc<InMemoryUserRepository>,
    pub channel_repo: Arc<InMemoryChannelRepository>,
    pub users: Arc<TestUserService>,
    pub channels: Arc<TestChannelService>,
    pub domain: TestDomainService,
    pub sessions: Arc<SessionStore>,
    pub auth: TestAuthService,
}

impl TestHarness {
    pub fn new() -> Self {
        let user_repo = Arc::new(InMemoryUserRepository::new());
        let channel_repo = Arc::new(InMemoryChannelRepository::new());
        let credentials = Arc::new(CredentialHasher::new());
        let sessions = Arc::new(SessionStore::new(Duration::minutes(60)));

        let users = Arc::new(UserServiceImpl::new(user_repo.clone(), credentials.clone()));
        let channels = Arc::new(ChannelServiceImpl::new(
            channel_repo.clone(),
            user_repo.clone(),
        ));
        let domain =
            DomainServiceImpl::new(users.clone(), channels.clone(), channel_repo.clone());
        let auth = AuthServiceImpl::new(user_repo.clone(), sessions.clone(), credentials);

        Self {
            user_repo,
            channel_repo,
            users,
            channels,
            domain,
            sessions,
            auth,
        }
    }

    /// Seed the reserved "Global" channel the way the migration does.
    pub async fn seed_global(&self) -> Uuid {
        let global = Channel::new(GLOBAL_CHANNEL, vec![]);
        let created = self
            .channel_repo
            .create(&global)
            .await
            .expect("seed global");
        created.id
    }

    /// Register a user straight into the store, bypassing the cascade.
    pub async fn seed_user(&self, name: &str) {
        self.user_repo
            .create(&User::new(name, "argon2-hash"))
            .await
            .expect("seed user");
    }
}

use std::fmt::{Debug, Display};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, info_span, warn};

use crate::db::StoreError;

// =============================================================================
// 1. THE ABSTRACTION (Entity hooks and the Repository behind the actor)
// =============================================================================

/// Trait that any domain entity must implement to be managed by ResourceActor
pub trait Entity: Clone + Send + Sync + 'static {
    /// Name used in logs and not-found messages.
    const KIND: &'static str;

    type Id: Eq + Clone + Send + Sync + Display + Debug;
    type CreateParams: Send + Sync + Debug;
    type Patch: Send + Sync + Debug;
    type Filter: Send + Sync + Debug + Default;

    type Action: Send + Sync + Debug;
    type ActionResult: Send + Sync + Debug;

    /// Get the ID of the entity
    fn id(&self) -> &Self::Id;

    /// Construct the full Entity from the freshly allocated ID and the creation parameters
    fn from_create_params(id: Self::Id, params: Self::CreateParams) -> Result<Self, String>;

    // --- Lifecycle Hooks ---

    fn on_create(&mut self) -> Result<(), String> { Ok(()) }
    fn on_update(&mut self, patch: Self::Patch) -> Result<(), String>;
    fn on_delete(&self) -> Result<(), String> { Ok(()) }

    // --- Action Handler ---

    /// Handle a custom domain-specific action
    fn handle_action(&mut self, action: Self::Action) -> Result<Self::ActionResult, String>;
}

/// Storage owned by a single ResourceActor.
///
/// Only the actor thread ever touches a repository, so implementations are
/// free to hold non-`Sync` handles such as a SQLite connection.
pub trait Repository<T: Entity>: Send + 'static {
    /// Allocate the ID for the next created entity. IDs are never reused.
    fn next_id(&mut self) -> Result<T::Id, StoreError>;
    fn insert(&mut self, item: &T) -> Result<(), StoreError>;
    fn get(&self, id: &T::Id) -> Result<Option<T>, StoreError>;
    fn list(&self, filter: &T::Filter) -> Result<Vec<T>, StoreError>;
    fn count(&self, filter: &T::Filter) -> Result<u64, StoreError>;
    fn save(&mut self, item: &T) -> Result<(), StoreError>;
    fn delete(&mut self, id: &T::Id) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum FrameworkError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("Rejected: {0}")]
    Rejected(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped")]
    ActorDropped,
}

impl From<StoreError> for FrameworkError {
    fn from(e: StoreError) -> Self {
        FrameworkError::Storage(e.to_string())
    }
}

// =============================================================================
// 2. THE GENERIC MESSAGES
// =============================================================================

pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

#[derive(Debug)]
pub enum ResourceRequest<T: Entity> {
    Create {
        params: T::CreateParams,
        respond_to: Response<T::Id>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    List {
        filter: T::Filter,
        respond_to: Response<Vec<T>>,
    },
    Count {
        filter: T::Filter,
        respond_to: Response<u64>,
    },
    Update {
        id: T::Id,
        patch: T::Patch,
        respond_to: Response<T>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<()>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult>,
    },
}

// =============================================================================
// 3. THE GENERIC ACTOR SERVER
// =============================================================================

/// Owns one repository and serves requests for it strictly one at a time.
pub struct ResourceActor<T: Entity, R: Repository<T>> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    repo: R,
}

impl<T: Entity, R: Repository<T>> ResourceActor<T, R> {
    pub fn new(buffer_size: usize, repo: R) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self { receiver, repo };
        let client = ResourceClient::new(sender);
        (actor, client)
    }

    /// Run the actor on the blocking pool. Repository calls are synchronous
    /// I/O and must stay off the async workers.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::task::spawn_blocking(move || self.run())
    }

    /// Serve requests until every client has been dropped.
    pub fn run(mut self) {
        let span = info_span!("resource_actor", kind = T::KIND);
        let _guard = span.enter();
        info!("Resource actor starting");

        while let Some(msg) = self.receiver.blocking_recv() {
            match msg {
                ResourceRequest::Create { params, respond_to } => {
                    let _ = respond_to.send(self.create(params));
                }
                ResourceRequest::Get { id, respond_to } => {
                    let _ = respond_to.send(self.repo.get(&id).map_err(Into::into));
                }
                ResourceRequest::List { filter, respond_to } => {
                    let _ = respond_to.send(self.repo.list(&filter).map_err(Into::into));
                }
                ResourceRequest::Count { filter, respond_to } => {
                    let _ = respond_to.send(self.repo.count(&filter).map_err(Into::into));
                }
                ResourceRequest::Update { id, patch, respond_to } => {
                    let _ = respond_to.send(self.update(id, patch));
                }
                ResourceRequest::Delete { id, respond_to } => {
                    let _ = respond_to.send(self.delete(id));
                }
                ResourceRequest::Action { id, action, respond_to } => {
                    let _ = respond_to.send(self.perform_action(id, action));
                }
            }
        }

        info!("Resource actor stopped");
    }

    fn create(&mut self, params: T::CreateParams) -> Result<T::Id, FrameworkError> {
        let id = self.repo.next_id()?;
        let mut item = T::from_create_params(id.clone(), params).map_err(FrameworkError::Rejected)?;
        item.on_create().map_err(FrameworkError::Rejected)?;
        self.repo.insert(&item)?;
        debug!(id = %id, "Created");
        Ok(id)
    }

    fn fetch(&self, id: &T::Id) -> Result<T, FrameworkError> {
        self.repo
            .get(id)?
            .ok_or_else(|| FrameworkError::NotFound(format!("{} {}", T::KIND, id)))
    }

    /// Hooks run against a copy; nothing is written unless they succeed.
    fn update(&mut self, id: T::Id, patch: T::Patch) -> Result<T, FrameworkError> {
        let mut item = self.fetch(&id)?;
        item.on_update(patch).map_err(FrameworkError::Rejected)?;
        self.repo.save(&item)?;
        debug!(id = %id, "Updated");
        Ok(item)
    }

    fn delete(&mut self, id: T::Id) -> Result<(), FrameworkError> {
        let item = self.fetch(&id)?;
        if let Err(e) = item.on_delete() {
            warn!(id = %id, reason = %e, "Delete rejected");
            return Err(FrameworkError::Rejected(e));
        }
        self.repo.delete(item.id())?;
        debug!(id = %id, "Deleted");
        Ok(())
    }

    fn perform_action(&mut self, id: T::Id, action: T::Action) -> Result<T::ActionResult, FrameworkError> {
        let mut item = self.fetch(&id)?;
        let result = item.handle_action(action).map_err(FrameworkError::Rejected)?;
        self.repo.save(&item)?;
        Ok(result)
    }
}

// =============================================================================
// 4. THE GENERIC CLIENT
// =============================================================================

pub struct ResourceClient<T: Entity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
}

impl<T: Entity> Clone for ResourceClient<T> {
    fn clone(&self) -> Self {
        Self { sender: self.sender.clone() }
    }
}

impl<T: Entity> ResourceClient<T> {
    pub fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self { sender }
    }

    async fn request<V>(
        &self,
        build: impl FnOnce(Response<V>) -> ResourceRequest<T>,
    ) -> Result<V, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn create(&self, params: T::CreateParams) -> Result<T::Id, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Create { params, respond_to }).await
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Get { id, respond_to }).await
    }

    pub async fn list(&self, filter: T::Filter) -> Result<Vec<T>, FrameworkError> {
        self.request(|respond_to| ResourceRequest::List { filter, respond_to }).await
    }

    pub async fn count(&self, filter: T::Filter) -> Result<u64, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Count { filter, respond_to }).await
    }

    pub async fn update(&self, id: T::Id, patch: T::Patch) -> Result<T, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Update { id, patch, respond_to }).await
    }

    pub async fn delete(&self, id: T::Id) -> Result<(), FrameworkError> {
        self.request(|respond_to| ResourceRequest::Delete { id, respond_to }).await
    }

    pub async fn perform_action(&self, id: T::Id, action: T::Action) -> Result<T::ActionResult, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Action { id, action, respond_to }).await
    }
}

// =============================================================================
// 5. EXAMPLE USAGE (Test)
// =============================================================================

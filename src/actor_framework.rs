use std::collections::HashMap;
use std::hash::Hash;
use std::fmt::{self, Debug, Display};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, instrument, warn};

// =============================================================================
// 1. THE ABSTRACTION (Entity trait with lifecycle hooks)
// =============================================================================

/// Errors produced by a `ResourceActor` or the channel in front of it.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FrameworkError {
    #[error("Item not found: {0}")]
    NotFound(String),
    /// A guarded update found the item in a different state.
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),
    /// A lifecycle hook refused the payload.
    #[error("Rejected: {0}")]
    Rejected(String),
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped")]
    ActorDropped,
}

/// Trait that any domain entity must implement to be managed by ResourceActor
pub trait Entity: Clone + Send + Sync + 'static {
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;
    type CreateParams: Send + Sync + Debug;
    type Patch: Send + Sync + Debug;

    /// Short name used in logs.
    const NAME: &'static str;

    /// Get the ID of the entity
    fn id(&self) -> &Self::Id;

    /// Construct the full Entity from the ID and creation parameters
    fn from_create_params(id: Self::Id, params: Self::CreateParams) -> Result<Self, FrameworkError>;

    // --- Lifecycle Hooks ---

    fn on_create(&mut self) -> Result<(), FrameworkError> { Ok(()) }

    /// Apply a patch. Runs against a working copy; the stored item is only
    /// replaced when this returns `Ok`.
    fn on_update(&mut self, patch: Self::Patch) -> Result<(), FrameworkError>;
}

/// Predicate for `List` requests.
pub struct Filter<T>(Box<dyn Fn(&T) -> bool + Send + Sync>);

impl<T> Filter<T> {
    pub fn new(predicate: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        Self(Box::new(predicate))
    }

    pub fn all() -> Self {
        Self::new(|_| true)
    }

    pub fn matches(&self, item: &T) -> bool {
        (self.0)(item)
    }
}

impl<T> Debug for Filter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Filter(..)")
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
        respond_to: Response<T>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    Update {
        id: T::Id,
        patch: T::Patch,
        respond_to: Response<T>,
    },
    List {
        filter: Filter<T>,
        respond_to: Response<Vec<T>>,
    },
}

// =============================================================================
// 3. THE GENERIC ACTOR SERVER
// =============================================================================

/// Owns one collection. Requests are handled strictly one at a time, which is
/// what makes a guarded `Update` a compare-and-swap.
pub struct ResourceActor<T: Entity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<T::Id, T>,
    next_id_fn: Box<dyn Fn() -> T::Id + Send + Sync>,
}

impl<T: Entity> ResourceActor<T> {
    pub fn new(
        buffer_size: usize,
        next_id_fn: impl Fn() -> T::Id + Send + Sync + 'static
    ) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: HashMap::new(),
            next_id_fn: Box::new(next_id_fn),
        };
        let client = ResourceClient::new(sender);
        (actor, client)
    }

    #[instrument(name = "resource_actor", skip(self), fields(entity = T::NAME))]
    pub async fn run(mut self) {
        info!("ResourceActor starting");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { params, respond_to } => {
                    let _ = respond_to.send(self.handle_create(params));
                }
                ResourceRequest::Get { id, respond_to } => {
                    let item = self.store.get(&id).cloned();
                    let _ = respond_to.send(Ok(item));
                }
                ResourceRequest::Update { id, patch, respond_to } => {
                    let _ = respond_to.send(self.handle_update(id, patch));
                }
                ResourceRequest::List { filter, respond_to } => {
                    let items = self.store.values().filter(|item| filter.matches(item)).cloned().collect();
                    let _ = respond_to.send(Ok(items));
                }
            }
        }

        info!("ResourceActor stopped");
    }

    fn handle_create(&mut self, params: T::CreateParams) -> Result<T, FrameworkError> {
        let id = (self.next_id_fn)();
        let mut item = T::from_create_params(id, params)?;
        item.on_create()?;
        debug!(id = %item.id(), "Item created");
        self.store.insert(item.id().clone(), item.clone());
        Ok(item)
    }

    fn handle_update(&mut self, id: T::Id, patch: T::Patch) -> Result<T, FrameworkError> {
        let item = self.store.get_mut(&id).ok_or_else(|| FrameworkError::NotFound(id.to_string()))?;
        let mut working = item.clone();
        if let Err(e) = working.on_update(patch) {
            warn!(id = %id, error = %e, "Update refused");
            return Err(e);
        }
        *item = working;
        Ok(item.clone())
    }
}

// =============================================================================
// 4. THE GENERIC CLIENT
// =============================================================================

#[derive(Clone)]
pub struct ResourceClient<T: Entity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
}

impl<T: Entity> ResourceClient<T> {
    pub fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self { sender }
    }

    pub async fn create(&self, params: T::CreateParams) -> Result<T, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender.send(ResourceRequest::Create { params, respond_to })
            .await.map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender.send(ResourceRequest::Get { id, respond_to })
            .await.map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn update(&self, id: T::Id, patch: T::Patch) -> Result<T, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender.send(ResourceRequest::Update { id, patch, respond_to })
            .await.map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn list(&self, filter: Filter<T>) -> Result<Vec<T>, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender.send(ResourceRequest::List { filter, respond_to })
            .await.map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }
}

// =============================================================================
// 5. EXAMPLE USAGE (Test)
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};

    // --- Domain Definition ---

    #[derive(Clone, Debug, PartialEq)]
    struct Counter {
        id: String,
        label: String,
        value: u32,
    }

    #[derive(Debug)]
    struct CounterCreate {
        label: String,
    }

    #[derive(Debug)]
    struct CounterPatch {
        expected: Option<u32>,
        value: u32,
    }

    impl Entity for Counter {
        type Id = String;
        type CreateParams = CounterCreate;
        type Patch = CounterPatch;

        const NAME: &'static str = "counter";

        fn id(&self) -> &String { &self.id }

        fn from_create_params(id: String, params: CounterCreate) -> Result<Self, FrameworkError> {
            if params.label.is_empty() {
                return Err(FrameworkError::Rejected("label required".into()));
            }
            Ok(Self { id, label: params.label, value: 0 })
        }

        fn on_update(&mut self, patch: CounterPatch) -> Result<(), FrameworkError> {
            // Mutate first so a refused patch proves the working copy is discarded.
            let previous = self.value;
            self.value = patch.value;
            match patch.expected {
                Some(expected) if expected != previous => {
                    Err(FrameworkError::PreconditionFailed(format!("value is {}", previous)))
                }
                _ => Ok(()),
            }
        }
    }

    fn spawn_counters() -> ResourceClient<Counter> {
        let counter = Arc::new(AtomicU64::new(1));
        let next_id = move || format!("counter_{}", counter.fetch_add(1, Ordering::SeqCst));
        let (actor, client) = ResourceActor::new(10, next_id);
        tokio::spawn(actor.run());
        client
    }

    // --- Tests ---

    #[tokio::test]
    async fn test_create_get_update() {
        let client = spawn_counters();

        let created = client.create(CounterCreate { label: "a".into() }).await.unwrap();
        assert_eq!(created.id, "counter_1");

        let updated = client
            .update(created.id.clone(), CounterPatch { expected: None, value: 3 })
            .await
            .unwrap();
        assert_eq!(updated.value, 3);

        let fetched = client.get(created.id.clone()).await.unwrap().unwrap();
        assert_eq!(fetched, updated);
        assert_eq!(client.get("missing".into()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_refused_update_leaves_item_untouched() {
        let client = spawn_counters();
        let created = client.create(CounterCreate { label: "a".into() }).await.unwrap();

        let result = client
            .update(created.id.clone(), CounterPatch { expected: Some(7), value: 9 })
            .await;
        assert!(matches!(result, Err(FrameworkError::PreconditionFailed(_))));

        let fetched = client.get(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.value, 0);
    }

    #[tokio::test]
    async fn test_guarded_updates_have_single_winner() {
        let client = spawn_counters();
        let created = client.create(CounterCreate { label: "a".into() }).await.unwrap();

        let mut tasks = Vec::new();
        for value in 1..=5 {
            let client = client.clone();
            let id = created.id.clone();
            tasks.push(tokio::spawn(async move {
                client.update(id, CounterPatch { expected: Some(0), value }).await
            }));
        }

        let mut winners = 0;
        for task in tasks {
            if task.await.unwrap().is_ok() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn test_list_with_filter_and_rejected_create() {
        let client = spawn_counters();
        client.create(CounterCreate { label: "a".into() }).await.unwrap();
        client.create(CounterCreate { label: "b".into() }).await.unwrap();
        assert!(matches!(
            client.create(CounterCreate { label: String::new() }).await,
            Err(FrameworkError::Rejected(_))
        ));

        let all = client.list(Filter::all()).await.unwrap();
        assert_eq!(all.len(), 2);

        let only_b = client.list(Filter::new(|c: &Counter| c.label == "b")).await.unwrap();
        assert_eq!(only_b.len(), 1);
        assert_eq!(only_b[0].label, "b");

        assert!(matches!(
            client.update("nope".into(), CounterPatch { expected: None, value: 1 }).await,
            Err(FrameworkError::NotFound(_))
        ));
    }
}

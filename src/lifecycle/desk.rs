use crate::api::{ApiError, Collaborators, HttpBackend};
use crate::backend::{Catalog, MemoryBackend};
use crate::config::{BackendKind, Config};
use crate::workflow::{WorkflowActor, WorkflowController, WorkflowHandle};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// The runtime orchestrator of the order desk.
///
/// `OrderDesk` builds the backend selected by [`Config`], wires it into a
/// [`WorkflowController`] and runs that controller in a [`WorkflowActor`].
///
/// # Example
///
/// ```ignore
/// let desk = OrderDesk::start(&Config::from_env()?)?;
///
/// desk.workflow.select_table(TableId(1)).await?;
/// desk.workflow.confirm_table().await?;
///
/// desk.shutdown().await?;
/// ```
pub struct OrderDesk {
    /// Handle to the workflow actor.
    pub workflow: WorkflowHandle,

    /// The in-process backend, when the desk runs on one.
    memory: Option<MemoryBackend>,

    /// Task handles, workflow first (used for graceful shutdown)
    handles: Vec<JoinHandle<()>>,
}

impl OrderDesk {
    /// Starts the desk on the backend named by `config.backend`.
    pub fn start(config: &Config) -> Result<Self, ApiError> {
        match config.backend {
            BackendKind::Memory => Ok(Self::in_memory(config, Catalog::demo())),
            BackendKind::Http => Self::over_http(config),
        }
    }

    /// Starts the desk on a fresh [`MemoryBackend`] serving `catalog`.
    pub fn in_memory(config: &Config, catalog: Catalog) -> Self {
        let (memory, backend_handles) = MemoryBackend::spawn(config.user.clone(), catalog);
        let api = Collaborators::from_backend(Arc::new(memory.clone()));
        let (workflow, workflow_handle) = Self::spawn_workflow(config, api);

        let mut handles = vec![workflow_handle];
        handles.extend(backend_handles);
        info!(user = %config.user.id, "Order desk started on the in-memory backend");
        Self {
            workflow,
            memory: Some(memory),
            handles,
        }
    }

    /// Starts the desk against the REST backend at `config.api_url`.
    pub fn over_http(config: &Config) -> Result<Self, ApiError> {
        let mut backend = HttpBackend::new(&config.api_url, config.timeout)?;
        if let Some(token) = &config.api_token {
            backend = backend.with_token(token.clone());
        }
        let api = Collaborators::from_backend(Arc::new(backend));
        let (workflow, workflow_handle) = Self::spawn_workflow(config, api);
        info!(url = %config.api_url, user = %config.user.id, "Order desk started on the REST backend");
        Ok(Self {
            workflow,
            memory: None,
            handles: vec![workflow_handle],
        })
    }

    fn spawn_workflow(config: &Config, api: Collaborators) -> (WorkflowHandle, JoinHandle<()>) {
        let controller = WorkflowController::new(config.user.clone(), api, config.workflow_settings());
        let (actor, workflow) = WorkflowActor::new(controller);
        (workflow, tokio::spawn(actor.run()))
    }

    /// The in-process backend, for seeding tables and opening cash boxes. `None` when
    /// the desk talks to the REST backend.
    pub fn memory(&self) -> Option<&MemoryBackend> {
        self.memory.as_ref()
    }

    /// Gracefully shuts down the desk.
    ///
    /// Drops the desk's handles and waits for every task. The workflow stops once all
    /// clones of [`workflow`](Self::workflow) are gone, and its backend actors stop
    /// after it.
    ///
    /// # Returns
    ///
    /// - `Ok(())` if every task finished cleanly
    /// - `Err(String)` if a task panicked
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down order desk...");

        drop(self.workflow);
        drop(self.memory);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Task failed: {:?}", e);
                return Err(format!("Task failed: {:?}", e));
            }
        }

        info!("Order desk shutdown complete.");
        Ok(())
    }
}

// ── Update coordinator ──
//
// Owns one Grocy client and the latest data for every registered key.
// Handles setup (connection check, feature resolution, first refresh),
// periodic refresh, service command routing, and teardown.

mod refresh;
mod registry;
mod routing;

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use chrono::Local;
use serde::Serialize;
use serde_json::Value;
use strum::Display;
use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use grocy_api::GrocyClient;
use grocy_api::models::{SystemConfig, SystemInfo};

use crate::adapters::{self, EntityState, TodoListState};
use crate::command::{Command, CommandEnvelope, CommandResult, Service};
use crate::config::CoordinatorConfig;
use crate::entity::EntityKey;
use crate::error::CoreError;
use crate::features::resolve_available;
use crate::fetch::DataAccess;
use crate::store::{CoordinatorData, DataStore};
use crate::todo::{self, NewTodoItem, TodoItem, TodoStatus};

pub use refresh::{KeyFailure, RefreshReport};
pub use registry::Registration;

use registry::Registry;

const COMMAND_CHANNEL_SIZE: usize = 64;

// ── CoordinatorState ─────────────────────────────────────────────

/// Lifecycle state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CoordinatorState {
    Idle,
    SettingUp,
    /// Set up; background tasks not started.
    Ready,
    Running,
    Stopped,
    Failed,
}

// ── Coordinator ──────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<CoordinatorInner>`. One instance serves one
/// Grocy server: it owns the client, the published data, the entity
/// registry and the background tasks.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    config: CoordinatorConfig,
    access: DataAccess,
    store: DataStore,
    registry: Registry,
    system_info: ArcSwapOption<SystemInfo>,
    state: watch::Sender<CoordinatorState>,
    command_tx: mpsc::Sender<CommandEnvelope>,
    command_rx: Mutex<Option<mpsc::Receiver<CommandEnvelope>>>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Coordinator {
    /// Build a coordinator. Does NOT contact Grocy; call
    /// [`setup()`](Self::setup) next.
    pub fn new(config: CoordinatorConfig) -> Result<Self, CoreError> {
        config.validate()?;
        let client = GrocyClient::new(
            &config.url,
            config.port,
            &config.api_key,
            &config.transport(),
        )?;
        Ok(Self::with_client(config, client))
    }

    /// Build around an existing client (tests, custom transports).
    pub fn with_client(config: CoordinatorConfig, client: GrocyClient) -> Self {
        let access = DataAccess::new(client, config.max_concurrent_requests);
        let (state, _) = watch::channel(CoordinatorState::Idle);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);

        Self {
            inner: Arc::new(CoordinatorInner {
                config,
                access,
                store: DataStore::new(),
                registry: Registry::new(),
                system_info: ArcSwapOption::empty(),
                state,
                command_tx,
                command_rx: Mutex::new(Some(command_rx)),
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.inner.config
    }

    pub fn client(&self) -> &GrocyClient {
        self.inner.access.client()
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Validate the connection, resolve available keys, register them and
    /// run the first refresh.
    ///
    /// Fails when Grocy cannot be reached or rejects the API key. A failed
    /// feature-flag read is not fatal: it leaves nothing available.
    pub async fn setup(&self) -> Result<Vec<EntityKey>, CoreError> {
        self.inner.state.send_replace(CoordinatorState::SettingUp);

        let info = match self.fetch_system_info().await {
            Ok(info) => info,
            Err(e) => {
                self.inner.state.send_replace(CoordinatorState::Failed);
                return Err(e);
            }
        };
        info!(
            url = %self.client().base_url(),
            version = %info.grocy_version.version,
            "connected to Grocy"
        );
        self.inner.system_info.store(Some(Arc::new(info)));

        let flags = match self.fetch_system_config().await {
            Ok(flags) => flags,
            Err(e) => {
                warn!(error = %e, "could not read Grocy feature flags; no entities available");
                SystemConfig::default()
            }
        };
        let available = resolve_available(&flags, self.inner.config.missing_flag_policy);
        if available.is_empty() {
            warn!("no Grocy features enabled; nothing to poll");
        }

        for key in self.inner.registry.set_available(available.clone()) {
            self.inner.store.remove(key);
        }
        for key in &available {
            let enabled = !self.inner.config.disabled_entities.contains(key);
            self.inner.registry.register(*key, enabled)?;
        }
        debug!(keys = ?available, "resolved available entities");

        let report = self.refresh().await;
        if !report.is_success() {
            warn!(failed = report.failed.len(), "first refresh incomplete");
        }

        self.inner.state.send_replace(CoordinatorState::Ready);
        Ok(available)
    }

    /// Spawn the command processor and, unless the poll interval is zero,
    /// the periodic refresh task.
    pub async fn start(&self) -> Result<(), CoreError> {
        match *self.inner.state.borrow() {
            CoordinatorState::Ready => {}
            CoordinatorState::Running => return Ok(()),
            _ => return Err(CoreError::CoordinatorStopped),
        }

        let mut handles = self.inner.task_handles.lock().await;

        if let Some(rx) = self.inner.command_rx.lock().await.take() {
            let coordinator = self.clone();
            handles.push(tokio::spawn(command_processor_task(coordinator, rx)));
        }

        let interval = self.inner.config.poll_interval;
        if !interval.is_zero() {
            let coordinator = self.clone();
            let cancel = self.inner.cancel.child_token();
            handles.push(tokio::spawn(refresh_task(coordinator, interval, cancel)));
        }

        self.inner.state.send_replace(CoordinatorState::Running);
        info!(poll_interval = ?interval, "coordinator running");
        Ok(())
    }

    /// Cancel background tasks and wait for them to finish.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }

        self.inner.state.send_replace(CoordinatorState::Stopped);
        debug!("coordinator stopped");
    }

    /// One-shot: set up, run closure, shut down.
    ///
    /// Periodic refresh is disabled; commands still route through the
    /// processor task.
    pub async fn oneshot<F, Fut, T>(config: CoordinatorConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Coordinator) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let mut cfg = config;
        cfg.poll_interval = Duration::ZERO;

        let coordinator = Coordinator::new(cfg)?;
        coordinator.setup().await?;
        coordinator.start().await?;
        let result = f(coordinator.clone()).await;
        coordinator.shutdown().await;
        result
    }

    // ── Remote reads outside the poll cycle ──────────────────────

    pub async fn fetch_system_info(&self) -> Result<SystemInfo, CoreError> {
        let _permit = self.inner.access.permit().await?;
        Ok(self.client().system_info().await?)
    }

    pub async fn fetch_system_config(&self) -> Result<SystemConfig, CoreError> {
        let _permit = self.inner.access.permit().await?;
        Ok(self.client().system_config().await?)
    }

    // ── Registration ─────────────────────────────────────────────

    /// Keys this Grocy instance offers, in feature-table order.
    pub fn available(&self) -> Vec<EntityKey> {
        self.inner.registry.available().as_ref().clone()
    }

    pub fn register(&self, key: EntityKey) -> Result<(), CoreError> {
        self.inner.registry.register(key, true)
    }

    /// Disabling a key drops its data; re-enabling picks it up on the next
    /// refresh.
    pub fn set_enabled(&self, key: EntityKey, enabled: bool) -> Result<(), CoreError> {
        self.inner.registry.set_enabled(key, enabled)?;
        if !enabled {
            self.inner.store.remove(key);
        }
        Ok(())
    }

    pub fn unregister(&self, key: EntityKey) -> Result<(), CoreError> {
        self.inner.registry.unregister(key)?;
        self.inner.store.remove(key);
        Ok(())
    }

    pub fn registered(&self) -> Vec<Registration> {
        self.inner.registry.registered()
    }

    /// Registered and enabled keys.
    pub fn active_keys(&self) -> Vec<EntityKey> {
        self.inner.registry.active()
    }

    fn require_registered(&self, key: EntityKey) -> Result<(), CoreError> {
        if self.inner.registry.is_registered(key) {
            Ok(())
        } else if self.inner.registry.available().contains(&key) {
            Err(CoreError::NotRegistered { key })
        } else {
            Err(CoreError::NotAvailable { key })
        }
    }

    // ── State observation ────────────────────────────────────────

    /// Latest published data (cheap `Arc` clone).
    pub fn data(&self) -> Arc<CoordinatorData> {
        self.inner.store.snapshot()
    }

    /// Receive every published `CoordinatorData`.
    pub fn subscribe(&self) -> watch::Receiver<Arc<CoordinatorData>> {
        self.inner.store.subscribe()
    }

    pub fn state(&self) -> CoordinatorState {
        *self.inner.state.borrow()
    }

    pub fn watch_state(&self) -> watch::Receiver<CoordinatorState> {
        self.inner.state.subscribe()
    }

    pub fn system_info(&self) -> Option<Arc<SystemInfo>> {
        self.inner.system_info.load_full()
    }

    // ── Entity views ─────────────────────────────────────────────

    /// Every active entity, including equipment field sensors.
    pub fn entity_states(&self) -> Vec<EntityState> {
        adapters::all_states(&self.active_keys(), &self.data())
    }

    pub fn entity_state(&self, key: EntityKey) -> Result<EntityState, CoreError> {
        self.require_registered(key)?;
        Ok(adapters::entity_state(key, &self.data()))
    }

    pub fn todo_list(&self, key: EntityKey) -> Result<TodoListState, CoreError> {
        self.require_todo(key)?;
        Ok(adapters::todo_list_state(
            key,
            &self.data(),
            Local::now().naive_local(),
        ))
    }

    pub fn todo_items(&self, key: EntityKey) -> Result<Vec<TodoItem>, CoreError> {
        self.require_todo(key)?;
        let data = self.data();
        let records = data.data(key).ok_or(CoreError::NoData { key })?;
        Ok(todo::items(key, records, Local::now().naive_local()))
    }

    fn require_todo(&self, key: EntityKey) -> Result<(), CoreError> {
        if !key.has_todo_list() {
            return Err(CoreError::Unsupported {
                operation: format!("todo list for {key}"),
                reason: "no todo list is exposed for this entity".into(),
            });
        }
        self.require_registered(key)
    }

    // ── Commands ─────────────────────────────────────────────────

    /// Execute a command against Grocy.
    ///
    /// Sends the command through the internal channel to the command
    /// processor task and awaits the result, including the refresh of
    /// affected keys.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        cmd.validate()?;
        if self.state() != CoordinatorState::Running {
            return Err(CoreError::CoordinatorStopped);
        }

        let (tx, rx) = tokio::sync::oneshot::channel();

        self.inner
            .command_tx
            .send(CommandEnvelope {
                command: cmd,
                response_tx: tx,
            })
            .await
            .map_err(|_| CoreError::CoordinatorStopped)?;

        rx.await.map_err(|_| CoreError::CoordinatorStopped)?
    }

    /// Parse and execute a named service call.
    pub async fn call_service(
        &self,
        service: &str,
        payload: Value,
    ) -> Result<CommandResult, CoreError> {
        let service: Service = service
            .parse()
            .map_err(|_| CoreError::validation(format!("unknown service '{service}'")))?;
        let cmd = Command::from_service(service, payload)?;
        self.execute(cmd).await
    }

    // ── Todo edits ───────────────────────────────────────────────

    pub async fn create_todo_item(
        &self,
        key: EntityKey,
        item: &NewTodoItem,
    ) -> Result<CommandResult, CoreError> {
        self.require_todo(key)?;
        let cmd = todo::create_command(key, item, Local::now().date_naive())?;
        self.execute(cmd).await
    }

    /// Move an item to `status`. Commands run in order; the first failure
    /// stops the sequence.
    pub async fn update_todo_item(
        &self,
        key: EntityKey,
        uid: &str,
        status: TodoStatus,
    ) -> Result<(), CoreError> {
        self.require_todo(key)?;
        let data = self.data();
        let records = data.data(key).ok_or(CoreError::NoData { key })?;
        for cmd in todo::update_commands(key, uid, status, records)? {
            self.execute(cmd).await?;
        }
        Ok(())
    }

    pub async fn delete_todo_items(&self, key: EntityKey, uids: &[String]) -> Result<(), CoreError> {
        self.require_todo(key)?;
        for cmd in todo::delete_commands(key, uids)? {
            self.execute(cmd).await?;
        }
        Ok(())
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Periodically refresh every active key.
async fn refresh_task(coordinator: Coordinator, interval: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(interval);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                let report = coordinator.refresh().await;
                if !report.is_success() {
                    warn!(failed = ?report.failed, "periodic refresh incomplete");
                }
            }
        }
    }
}

/// Process commands from the mpsc channel, one at a time.
async fn command_processor_task(coordinator: Coordinator, mut rx: mpsc::Receiver<CommandEnvelope>) {
    let cancel = coordinator.inner.cancel.clone();

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            envelope = rx.recv() => {
                let Some(envelope) = envelope else { break };
                let result = routing::route_command(&coordinator, envelope.command).await;
                let _ = envelope.response_tx.send(result);
            }
        }
    }
}

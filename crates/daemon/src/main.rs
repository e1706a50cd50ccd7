//! SmoothDock Daemon
//!
//! Main daemon process for the SmoothDock dock.
//!
//! Responsibilities:
//! - Build one dock panel per configured dock
//! - Handle IPC commands from the CLI and from task watchers
//! - Drive zoom animations from a timer
//! - Push window placement, struts and tooltips to the window manager

mod config;

use anyhow::{Context, Result};
use config::{CompiledTaskRule, Config, TaskAction};
use smoothdock_core_layout::{
    DockItem, DockPanel, InsertOutcome, ItemKind, LayoutError, Point, RemoveOutcome, Size,
    StaticRegistry, TaskInfo, TooltipUpdate, WindowId, SHOW_DESKTOP_COMMAND,
};
use smoothdock_ipc::{
    decode_line, encode_line, socket_path, ClickAction, IpcCommand, IpcResponse, MouseButton,
    MAX_IPC_MESSAGE_SIZE,
};
use smoothdock_platform::{
    resting_layer, windows_can_cover, HeadlessWindowManager, PanelId, PlatformError, StackingLayer,
    TaskScope, WindowManager,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{mpsc, oneshot, Mutex};
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::FmtSubscriber;

/// Events that the daemon event loop processes.
enum DaemonEvent {
    /// An IPC command from a client.
    IpcCommand {
        cmd: IpcCommand,
        responder: oneshot::Sender<IpcResponse>,
    },
    /// Animation tick.
    AnimationTick,
    /// Shutdown signal.
    Shutdown,
}

/// IPC read timeout - clients must send within this period.
const IPC_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Tick interval when no dock exists.
const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(16);

/// Size the application menu is anchored with.
const APPLICATION_MENU_SIZE: Size = Size {
    width: 320,
    height: 480,
};

const SERIALIZATION_ERROR_LINE: &str = "{\"status\":\"error\",\"message\":\"Internal serialization error\"}\n";

/// Errors from handling a single command.
#[derive(Debug, Error)]
enum CommandError {
    #[error("Dock {0} does not exist")]
    UnknownDock(usize),

    #[error("{0}")]
    Layout(#[from] LayoutError),

    #[error("Window manager error: {0}")]
    Platform(#[from] PlatformError),
}

/// Daemon state: the docks and everything they are built from.
struct AppState {
    /// User configuration.
    config: Config,
    /// Where the configuration came from, if a file was found.
    config_path: Option<PathBuf>,
    /// One panel per configured dock, indexed like `config.docks`.
    panels: Vec<DockPanel>,
    /// Applications known by command, for naming task items.
    registry: StaticRegistry,
    /// Pre-compiled task rules for efficient matching.
    compiled_rules: Vec<CompiledTaskRule>,
    /// Every known task window in arrival order, including hidden ones.
    tasks: Vec<TaskInfo>,
    /// Current desktop (1-based).
    desktop: u32,
    desktop_count: u32,
    wm: Box<dyn WindowManager>,
}

impl AppState {
    /// Create new state with config and a window manager.
    fn new_with_config(config: Config, wm: Box<dyn WindowManager>) -> Result<Self> {
        let mut state = Self {
            config,
            config_path: None,
            panels: Vec::new(),
            registry: StaticRegistry::new(Vec::new()),
            compiled_rules: Vec::new(),
            tasks: Vec::new(),
            desktop: 1,
            desktop_count: 1,
            wm,
        };
        state.apply_config()?;
        Ok(state)
    }

    /// Rebuild every dock from the current configuration.
    fn apply_config(&mut self) -> Result<()> {
        self.registry = StaticRegistry::new(self.config.applications.clone());
        self.compiled_rules = self.config.compile_task_rules();

        let mut panels = Vec::with_capacity(self.config.docks.len());
        for (dock, dock_config) in self.config.docks.iter().enumerate() {
            let params = dock_config.panel_params(&self.config.appearance, self.config.screen_rect(dock_config));
            let features = dock_config.panel_features(&self.config.application_menu);
            let mut panel = DockPanel::new(params, features, self.desktop_count)
                .with_context(|| format!("Invalid layout parameters for dock {}", dock))?;
            panel.reload_tasks(&self.visible_tasks(dock), &self.registry);
            panels.push(panel);
        }
        self.panels = panels;
        Ok(())
    }

    /// Create every dock window and place it.
    fn register_panels(&mut self) -> Result<(), PlatformError> {
        let style = self.config.appearance.panel_style();
        for dock in 0..self.panels.len() {
            let visibility = self.panels[dock].params().visibility;
            self.wm.register_panel(dock, visibility)?;
            self.wm.set_style(dock, &style)?;
            self.sync_panel(dock)?;
        }
        Ok(())
    }

    /// Push a dock's window rectangle and strut to the window manager.
    fn sync_panel(&mut self, dock: PanelId) -> Result<(), PlatformError> {
        let panel = self.panels.get(dock).ok_or(PlatformError::UnknownPanel(dock))?;
        self.wm.place_panel(dock, panel.window_rect())?;
        self.wm.set_strut(dock, &panel.strut())
    }

    /// Start collapsing a dock the pointer has left.
    fn leave_panel(&mut self, dock: usize) -> Result<(), CommandError> {
        let panel = self.panel_mut(dock)?;
        let update = panel.pointer_leave();
        let layer = resting_layer(panel.params().visibility);
        self.apply_tooltip(dock, update)?;
        self.wm.set_layer(dock, layer)?;
        self.sync_panel(dock)?;
        Ok(())
    }

    fn apply_tooltip(&mut self, dock: PanelId, update: Option<TooltipUpdate>) -> Result<(), PlatformError> {
        match update {
            Some(TooltipUpdate::Show(request)) => self.wm.show_tooltip(dock, &request),
            Some(TooltipUpdate::Hide) => self.wm.hide_tooltip(dock),
            None => Ok(()),
        }
    }

    fn panel(&self, dock: usize) -> Result<&DockPanel, CommandError> {
        self.panels.get(dock).ok_or(CommandError::UnknownDock(dock))
    }

    fn panel_mut(&mut self, dock: usize) -> Result<&mut DockPanel, CommandError> {
        self.panels.get_mut(dock).ok_or(CommandError::UnknownDock(dock))
    }

    /// Evaluate task rules and return the action for a task.
    fn evaluate_task_rules(&self, task: &TaskInfo) -> TaskAction {
        self.compiled_rules
            .iter()
            .find(|rule| rule.matches(&task.program, &task.title))
            .map_or(TaskAction::Show, |rule| rule.action)
    }

    fn task_scope(&self, dock: usize) -> TaskScope {
        let screen = self.config.docks.get(dock).map_or(0, |d| d.screen);
        TaskScope::new(
            screen,
            self.desktop,
            self.config.behavior.current_screen_tasks_only,
            self.config.behavior.current_desktop_tasks_only,
        )
    }

    /// Whether a task gets an item on a dock.
    fn shows_task(&self, dock: usize, task: &TaskInfo) -> bool {
        let has_task_manager = self.config.docks.get(dock).is_some_and(|d| d.show_task_manager);
        has_task_manager
            && self.evaluate_task_rules(task) == TaskAction::Show
            && self.task_scope(dock).contains(task)
    }

    fn visible_tasks(&self, dock: usize) -> Vec<TaskInfo> {
        self.tasks
            .iter()
            .filter(|task| self.shows_task(dock, task))
            .cloned()
            .collect()
    }

    fn is_animating(&self) -> bool {
        self.panels.iter().any(DockPanel::is_animating)
    }

    fn tick_interval(&self) -> Duration {
        self.panels
            .iter()
            .map(DockPanel::tick_interval)
            .min()
            .unwrap_or(DEFAULT_TICK_INTERVAL)
    }

    /// Advance every running transition by one step. Returns whether any
    /// dock is still animating.
    fn tick_animations(&mut self) -> bool {
        for dock in 0..self.panels.len() {
            if !self.panels[dock].is_animating() {
                continue;
            }
            let update = self.panels[dock].tick();
            if let Err(e) = self.apply_tooltip(dock, update).and_then(|()| self.sync_panel(dock)) {
                warn!("Animation update for dock {} failed: {}", dock, e);
            }
        }
        self.is_animating()
    }

    /// Handle an IPC command and return the response.
    fn handle_command(&mut self, cmd: IpcCommand) -> IpcResponse {
        match cmd {
            IpcCommand::Reload => match Config::load() {
                Ok(mut new_config) => {
                    for w in new_config.validate() {
                        warn!("Config: {} - {}", w.field, w.message);
                    }
                    self.config = new_config;
                    self.config_path = config::find_config_path();
                    if let Err(e) = self.apply_config() {
                        return IpcResponse::error(format!("Failed to apply config: {:#}", e));
                    }
                    if let Err(e) = self.register_panels() {
                        return IpcResponse::error(format!("Failed to place docks: {}", e));
                    }
                    info!("Configuration reloaded: {} dock(s)", self.panels.len());
                    IpcResponse::Ok
                }
                Err(e) => IpcResponse::error(format!("Failed to reload config: {:#}", e)),
            },
            IpcCommand::Stop => {
                // This is handled specially in the event loop
                IpcResponse::Ok
            }
            cmd => self.dispatch(cmd).unwrap_or_else(|e| IpcResponse::error(e.to_string())),
        }
    }

    fn dispatch(&mut self, cmd: IpcCommand) -> Result<IpcResponse, CommandError> {
        match cmd {
            IpcCommand::PointerEnter { dock } => {
                let panel = self.panel_mut(dock)?;
                panel.pointer_enter();
                if windows_can_cover(panel.params().visibility) {
                    self.wm.set_layer(dock, StackingLayer::Above)?;
                }
            }
            IpcCommand::PointerMove { dock, x, y } => {
                let update = self.panel_mut(dock)?.pointer_move(Point::new(x, y));
                self.apply_tooltip(dock, update)?;
                self.sync_panel(dock)?;
            }
            IpcCommand::PointerLeave { dock } => self.leave_panel(dock)?,
            IpcCommand::Click { dock, x, y, button } => {
                let panel = self.panel(dock)?;
                let point = Point::new(x, y);
                let (index, action) = match panel.click(point).zip(panel.hit_test(point)) {
                    Some((item, index)) => (Some(index), click_action(panel, index, item, button)),
                    None => (None, ClickAction::None),
                };
                debug!("Click on dock {} at ({}, {}): {:?}", dock, x, y, action);
                if matches!(action, ClickAction::LockScreen { .. }) {
                    self.leave_panel(dock)?;
                }
                return Ok(IpcResponse::Clicked { dock, index, action });
            }
            IpcCommand::TaskAdded { task } => self.add_task(task)?,
            IpcCommand::TaskRemoved { window_id } => self.remove_task(window_id)?,
            IpcCommand::TaskChanged { task } => self.change_task(task)?,
            IpcCommand::DesktopChanged { desktop, count } => self.change_desktop(desktop, count)?,
            IpcCommand::Pin { dock, index } => {
                self.panel_mut(dock)?.set_pinned(index, true)?;
                self.sync_panel(dock)?;
            }
            IpcCommand::Unpin { dock, index } => {
                self.panel_mut(dock)?.set_pinned(index, false)?;
                self.sync_panel(dock)?;
            }
            IpcCommand::QueryPanel { dock } => {
                let panel = self.panel(dock)?;
                return Ok(IpcResponse::PanelState {
                    dock,
                    state: panel.state(),
                    window: panel.window_rect(),
                    background: panel.background_rect(),
                    item_count: panel.items().len(),
                    layout_generation: panel.layout_generation(),
                });
            }
            IpcCommand::QueryItems { dock } => {
                let items = self.panel(dock)?.placements();
                return Ok(IpcResponse::Items { dock, items });
            }
            IpcCommand::QueryStatus => {
                return Ok(IpcResponse::Status {
                    docks: self.panels.len(),
                    tasks: self.tasks.len(),
                    desktop: self.desktop,
                    desktop_count: self.desktop_count,
                    animating: self.is_animating(),
                    config_path: self.config_path.as_ref().map(|p| p.display().to_string()),
                });
            }
            IpcCommand::Reload | IpcCommand::Stop => {}
        }
        Ok(IpcResponse::Ok)
    }

    fn add_task(&mut self, task: TaskInfo) -> Result<(), CommandError> {
        self.tasks.retain(|t| t.window_id != task.window_id);
        self.tasks.push(task.clone());

        if self.evaluate_task_rules(&task) == TaskAction::Ignore {
            debug!("Task {} ({}) ignored by rule", task.window_id, task.program);
            return Ok(());
        }

        for dock in 0..self.panels.len() {
            if !self.shows_task(dock, &task) {
                continue;
            }
            let outcome = self.panels[dock].insert_task(&task, &self.registry);
            match outcome {
                InsertOutcome::Created(index) => {
                    debug!("Dock {}: new item {} for task {}", dock, index, task.window_id)
                }
                InsertOutcome::Attached(index) => {
                    debug!("Dock {}: task {} attached to item {}", dock, task.window_id, index)
                }
                InsertOutcome::AlreadyPresent(_) => {}
            }
            self.sync_panel(dock)?;
        }
        Ok(())
    }

    fn remove_task(&mut self, window_id: WindowId) -> Result<(), CommandError> {
        self.tasks.retain(|t| t.window_id != window_id);
        for dock in 0..self.panels.len() {
            if let RemoveOutcome::Removed(index) = self.panels[dock].remove_task(window_id) {
                debug!("Dock {}: item {} removed with task {}", dock, index, window_id);
                self.sync_panel(dock)?;
            }
        }
        Ok(())
    }

    /// A task changed; it may have moved in or out of a dock's scope.
    fn change_task(&mut self, task: TaskInfo) -> Result<(), CommandError> {
        match self.tasks.iter_mut().find(|t| t.window_id == task.window_id) {
            Some(known) => *known = task.clone(),
            None => self.tasks.push(task.clone()),
        }

        for dock in 0..self.panels.len() {
            let shown = self.panels[dock].items().find_task(task.window_id).is_some();
            let wanted = self.shows_task(dock, &task);
            match (shown, wanted) {
                (true, true) => {
                    self.panels[dock].update_task(&task);
                }
                (true, false) => {
                    self.panels[dock].remove_task(task.window_id);
                }
                (false, true) => {
                    self.panels[dock].insert_task(&task, &self.registry);
                }
                (false, false) => continue,
            }
            self.sync_panel(dock)?;
        }
        Ok(())
    }

    fn change_desktop(&mut self, desktop: u32, count: Option<u32>) -> Result<(), CommandError> {
        let count = count.map(|c| c.max(1));
        let count_changed = count.is_some_and(|c| c != self.desktop_count);
        let desktop_changed = desktop != self.desktop;
        self.desktop = desktop;
        if let Some(count) = count {
            self.desktop_count = count;
        }
        info!("Desktop {} of {}", self.desktop, self.desktop_count);

        for dock in 0..self.panels.len() {
            let tasks = self.visible_tasks(dock);
            let panel = &mut self.panels[dock];
            if count_changed && panel.features().show_pager {
                let params = panel.params().clone();
                let features = panel.features().clone();
                panel.reload(params, features, self.desktop_count, &tasks, &self.registry)?;
            } else if desktop_changed && self.config.behavior.current_desktop_tasks_only {
                panel.reload_tasks(&tasks, &self.registry);
            } else {
                continue;
            }
            self.sync_panel(dock)?;
        }
        Ok(())
    }
}

const LOCK_SCREEN_COMMANDS: &[&str] = &[
    "qdbus org.kde.screensaver /ScreenSaver Lock",
    "loginctl lock-session",
];

fn is_lock_screen_command(command: &str) -> bool {
    let command = command.split_whitespace().collect::<Vec<_>>().join(" ");
    LOCK_SCREEN_COMMANDS.contains(&command.as_str())
}

/// What a click on `item` asks the host to do.
fn click_action(panel: &DockPanel, index: usize, item: &DockItem, button: MouseButton) -> ClickAction {
    if button == MouseButton::Right {
        return ClickAction::ShowContextMenu { index };
    }
    match item.kind() {
        ItemKind::MenuTrigger { .. } => {
            let position = panel.application_menu_position(APPLICATION_MENU_SIZE);
            ClickAction::ShowApplicationMenu {
                x: position.x,
                y: position.y,
            }
        }
        ItemKind::PagerCell { desktop } => ClickAction::SwitchDesktop { desktop: *desktop },
        ItemKind::Launcher(program) | ItemKind::TaskProgram(program) => {
            if program.command == SHOW_DESKTOP_COMMAND {
                return ClickAction::ToggleShowDesktop;
            }
            if is_lock_screen_command(&program.command) {
                return ClickAction::LockScreen {
                    command: program.command.clone(),
                };
            }
            match program.tasks().first() {
                // Middle click always starts a new instance.
                Some(task) if button == MouseButton::Left => ClickAction::Activate {
                    window_id: task.window_id,
                },
                _ => ClickAction::Launch {
                    command: program.command.clone(),
                },
            }
        }
        ItemKind::Separator | ItemKind::Clock => ClickAction::None,
    }
}

/// Accept clients on the daemon socket.
async fn run_ipc_server(listener: UnixListener, event_tx: mpsc::Sender<DaemonEvent>) {
    loop {
        let stream = match listener.accept().await {
            Ok((stream, _)) => stream,
            Err(e) => {
                error!("Failed to accept client connection: {}", e);
                tokio::time::sleep(Duration::from_millis(100)).await;
                continue;
            }
        };

        debug!("Client connected");

        let event_tx = event_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_client(stream, event_tx).await {
                warn!("Client handler error: {}", e);
            }
        });
    }
}

fn response_line(response: &IpcResponse) -> String {
    encode_line(response).unwrap_or_else(|e| {
        warn!("Failed to serialize IPC response: {}", e);
        SERIALIZATION_ERROR_LINE.to_string()
    })
}

/// Handle a single client connection: one command line, one response line.
async fn handle_client<S>(stream: S, event_tx: mpsc::Sender<DaemonEvent>) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (reader, mut writer) = tokio::io::split(stream);
    let limited_reader = reader.take(MAX_IPC_MESSAGE_SIZE as u64);
    let mut reader = BufReader::new(limited_reader);
    let mut line = String::new();

    // Read command (single line of JSON) with timeout and size bound
    let read_result = tokio::time::timeout(IPC_READ_TIMEOUT, reader.read_line(&mut line)).await;
    let bytes_read = match read_result {
        Ok(Ok(n)) => n,
        Ok(Err(e)) => return Err(e.into()),
        Err(_) => {
            // Timeout: client did not send in time, silently close
            return Ok(());
        }
    };
    if bytes_read == 0 {
        return Ok(()); // Client disconnected
    }

    debug!("Received command: {}", line.trim());

    let cmd: IpcCommand = match decode_line(&line) {
        Ok(cmd) => cmd,
        Err(e) => {
            let response = IpcResponse::error(format!("Invalid command: {}", e));
            writer.write_all(response_line(&response).as_bytes()).await?;
            return Ok(());
        }
    };

    let is_stop = matches!(cmd, IpcCommand::Stop);

    let (resp_tx, resp_rx) = oneshot::channel();

    if event_tx
        .send(DaemonEvent::IpcCommand {
            cmd,
            responder: resp_tx,
        })
        .await
        .is_err()
    {
        let response = IpcResponse::error("Daemon is shutting down");
        writer.write_all(response_line(&response).as_bytes()).await?;
        return Ok(());
    }

    let response = match resp_rx.await {
        Ok(resp) => resp,
        Err(_) => IpcResponse::error("Failed to get response from daemon"),
    };

    writer.write_all(response_line(&response).as_bytes()).await?;
    writer.flush().await?;

    if is_stop {
        let _ = event_tx.send(DaemonEvent::Shutdown).await;
    }

    Ok(())
}

/// Check if another daemon instance is already listening on the socket.
async fn check_already_running(path: &Path) -> bool {
    UnixStream::connect(path).await.is_ok()
}

/// Bind the daemon socket, replacing a stale socket file.
fn bind_socket(path: &Path) -> Result<UnixListener> {
    if path.exists() {
        std::fs::remove_file(path)
            .with_context(|| format!("Failed to remove stale socket: {}", path.display()))?;
    }
    UnixListener::bind(path).with_context(|| format!("Failed to bind IPC socket: {}", path.display()))
}

/// Send animation ticks until `animation_running` is cleared.
fn start_animation_timer(
    animation_tx: mpsc::Sender<DaemonEvent>,
    animation_running: Arc<AtomicBool>,
    period: Duration,
) -> tokio::task::JoinHandle<()> {
    animation_running.store(true, Ordering::SeqCst);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            if !animation_running.load(Ordering::SeqCst) {
                break;
            }
            if animation_tx.send(DaemonEvent::AnimationTick).await.is_err() {
                break; // Channel closed
            }
        }
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (needed for log level)
    let mut config = Config::load().unwrap_or_else(|e| {
        // Can't use tracing yet, fall back to eprintln
        eprintln!("Failed to load configuration: {:#}. Using defaults.", e);
        Config::default()
    });

    // Initialize logging with configured log level; RUST_LOG wins if set
    let log_level = config::parse_log_level(&config.behavior.log_level).unwrap_or(Level::INFO);
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(log_level).into())
        .from_env_lossy();
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Validate and clamp config values
    let config_warnings = config.validate();
    for w in &config_warnings {
        warn!("Config: {} - {}", w.field, w.message);
    }

    info!("SmoothDock daemon starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let socket = socket_path();
    if check_already_running(&socket).await {
        error!("Another smoothdock daemon is already running (socket {} is active)", socket.display());
        return Ok(());
    }

    info!(
        "Configuration loaded: {} dock(s), icons {}-{}px, log_level={}",
        config.docks.len(),
        config.appearance.min_icon_size,
        config.appearance.max_icon_size,
        config.behavior.log_level
    );

    let wm = HeadlessWindowManager::new(config.appearance.tooltip_font_size);
    let mut app = AppState::new_with_config(config, Box::new(wm)).context("Failed to create docks")?;
    app.config_path = config::find_config_path();
    if let Err(e) = app.register_panels() {
        error!("Failed to place dock windows: {}", e);
    }
    for (dock, panel) in app.panels.iter().enumerate() {
        let window = panel.window_rect();
        info!(
            "  Dock {}: {:?} edge, {} items, window {}x{} at {},{}",
            dock,
            panel.params().edge,
            panel.items().len(),
            window.width,
            window.height,
            window.x,
            window.y
        );
    }
    let state = Arc::new(Mutex::new(app));

    // Create event channel
    let (event_tx, mut event_rx) = mpsc::channel::<DaemonEvent>(100);

    // Spawn IPC server
    let listener = bind_socket(&socket)?;
    let ipc_tx = event_tx.clone();
    tokio::spawn(async move {
        run_ipc_server(listener, ipc_tx).await;
    });

    info!("IPC server listening on {}", socket.display());

    // Install Ctrl+C handler so terminal kill triggers graceful shutdown
    {
        let shutdown_tx = event_tx.clone();
        tokio::spawn(async move {
            if let Ok(()) = tokio::signal::ctrl_c().await {
                info!("Ctrl+C received, initiating shutdown...");
                let _ = shutdown_tx.send(DaemonEvent::Shutdown).await;
            }
        });
    }

    info!("Ready. Use smoothdock-cli to send commands.");

    // Animation timer handle - spawned while any dock animates
    let mut animation_timer_handle: Option<tokio::task::JoinHandle<()>> = None;
    let animation_running = Arc::new(AtomicBool::new(false));

    // Main event loop
    while let Some(event) = event_rx.recv().await {
        match event {
            DaemonEvent::IpcCommand { cmd, responder } => {
                let (response, should_animate, period) = {
                    let mut state = state.lock().await;
                    let response = state.handle_command(cmd);
                    (response, state.is_animating(), state.tick_interval())
                };

                // Log if client disconnected before receiving response
                if responder.send(response).is_err() {
                    debug!("Client disconnected before receiving IPC response");
                }

                // Start animation timer if needed
                if should_animate && !animation_running.load(Ordering::SeqCst) {
                    animation_timer_handle = Some(start_animation_timer(
                        event_tx.clone(),
                        animation_running.clone(),
                        period,
                    ));
                }
            }
            DaemonEvent::AnimationTick => {
                let still_animating = state.lock().await.tick_animations();

                // Stop animation timer once every transition completed
                if !still_animating {
                    animation_running.store(false, Ordering::SeqCst);
                    if let Some(handle) = animation_timer_handle.take() {
                        handle.abort();
                    }
                    debug!("All animations complete");
                }
            }
            DaemonEvent::Shutdown => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    if let Some(handle) = animation_timer_handle {
        handle.abort();
    }
    if let Err(e) = std::fs::remove_file(&socket) {
        debug!("Failed to remove socket {}: {}", socket.display(), e);
    }

    info!("SmoothDock daemon shutting down.");
    Ok(())
}

//! Configuration management for the SmoothDock daemon.
//!
//! Configuration is loaded from TOML files in the following locations (in order):
//! 1. `<config dir>/smoothdock/config.toml` (XDG standard)
//! 2. `~/.config/smoothdock/config.toml`
//! 3. `./config.toml` (current directory, for development)

use anyhow::{Context, Result};
use directories::ProjectDirs;
use regex::Regex;
use serde::{Deserialize, Serialize};
use smoothdock_core_layout::{
    AppEntry, LauncherConfig, PanelEdge, PanelFeatures, PanelParams, PanelVisibility, Rect,
    MAX_ANIMATION_SPEED, SEPARATOR_COMMAND, SHOW_DESKTOP_COMMAND,
};
use smoothdock_platform::{Color, PanelStyle};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure for SmoothDock.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Icon sizes, animation and colors shared by all docks.
    pub appearance: AppearanceConfig,
    /// Behavior configuration.
    pub behavior: BehaviorConfig,
    /// Application menu trigger.
    pub application_menu: ApplicationMenuConfig,
    /// Screen geometry, in the order docks refer to them.
    pub screens: Vec<ScreenConfig>,
    /// One entry per dock.
    pub docks: Vec<DockConfig>,
    /// Known applications, used to name and iconify task windows.
    pub applications: Vec<AppEntry>,
    /// Rules deciding which task windows get an item.
    pub task_rules: Vec<TaskRule>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            appearance: AppearanceConfig::default(),
            behavior: BehaviorConfig::default(),
            application_menu: ApplicationMenuConfig::default(),
            screens: vec![ScreenConfig::default()],
            docks: vec![DockConfig::default()],
            applications: Vec::new(),
            task_rules: Vec::new(),
        }
    }
}

/// Appearance-related configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppearanceConfig {
    /// Icon size when the dock is minimized.
    pub min_icon_size: i32,
    /// Icon size right under the pointer.
    pub max_icon_size: i32,
    /// Gap between icons as a fraction of `min_icon_size`.
    pub spacing_factor: f32,
    /// 0 (slowest) to 16 (fastest).
    pub animation_speed: u32,
    /// Number of steps in a zoom transition.
    pub animation_steps: u32,
    pub tooltip_font_size: i32,
    /// Background color as `#rrggbb`.
    pub background_color: String,
    /// Background opacity (0.0-1.0).
    pub background_alpha: f32,
    pub show_border: bool,
    /// Border color as `#rrggbb`.
    pub border_color: String,
    pub use_24_hour_clock: bool,
}

impl Default for AppearanceConfig {
    fn default() -> Self {
        Self {
            min_icon_size: 48,
            max_icon_size: 128,
            spacing_factor: 0.5,
            animation_speed: MAX_ANIMATION_SPEED,
            animation_steps: 20,
            tooltip_font_size: 20,
            background_color: default_background_color(),
            background_alpha: 0.42,
            show_border: true,
            border_color: default_border_color(),
            use_24_hour_clock: true,
        }
    }
}

impl AppearanceConfig {
    /// Colors and clock format handed to the window manager.
    pub fn panel_style(&self) -> PanelStyle {
        let alpha = (self.background_alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        PanelStyle {
            background: Color::from_hex(&self.background_color, alpha).unwrap_or_default(),
            border: if self.show_border {
                Color::from_hex(&self.border_color, u8::MAX)
            } else {
                None
            },
            use_24_hour_clock: self.use_24_hour_clock,
        }
    }
}

/// Behavior-related configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` overrides it.
    pub log_level: String,
    /// Only show tasks on the current desktop.
    pub current_desktop_tasks_only: bool,
    /// Only show tasks on the dock's own screen.
    pub current_screen_tasks_only: bool,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            current_desktop_tasks_only: true,
            current_screen_tasks_only: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationMenuConfig {
    pub label: String,
    pub icon: String,
}

impl Default for ApplicationMenuConfig {
    fn default() -> Self {
        Self {
            label: "Applications".to_string(),
            icon: "start-here-kde".to_string(),
        }
    }
}

/// Geometry of one screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            width: 1920,
            height: 1080,
        }
    }
}

impl From<ScreenConfig> for Rect {
    fn from(screen: ScreenConfig) -> Self {
        Rect::new(screen.x, screen.y, screen.width, screen.height)
    }
}

/// Configuration of one dock.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DockConfig {
    pub edge: PanelEdge,
    /// Index into `screens`.
    pub screen: usize,
    pub visibility: PanelVisibility,
    pub show_application_menu: bool,
    pub show_pager: bool,
    pub show_task_manager: bool,
    pub show_clock: bool,
    /// Pinned launchers, in order. A command of `SEPARATOR` adds a divider.
    pub launchers: Vec<LauncherConfig>,
}

impl Default for DockConfig {
    fn default() -> Self {
        Self {
            edge: PanelEdge::Bottom,
            screen: 0,
            visibility: PanelVisibility::AlwaysVisible,
            show_application_menu: true,
            show_pager: false,
            show_task_manager: true,
            show_clock: false,
            launchers: default_launchers(),
        }
    }
}

impl DockConfig {
    /// Layout parameters for this dock on `screen`.
    pub fn panel_params(&self, appearance: &AppearanceConfig, screen: Rect) -> PanelParams {
        PanelParams {
            edge: self.edge,
            visibility: self.visibility,
            screen,
            min_size: appearance.min_icon_size,
            max_size: appearance.max_icon_size,
            spacing_factor: appearance.spacing_factor,
            animation_steps: appearance.animation_steps,
            animation_speed: appearance.animation_speed,
        }
    }

    /// Which items this dock shows.
    pub fn panel_features(&self, menu: &ApplicationMenuConfig) -> PanelFeatures {
        PanelFeatures {
            show_application_menu: self.show_application_menu,
            menu_label: menu.label.clone(),
            menu_icon: menu.icon.clone(),
            show_pager: self.show_pager,
            show_task_manager: self.show_task_manager,
            show_clock: self.show_clock,
            launchers: self.launchers.clone(),
        }
    }
}

/// Launchers of a fresh dock.
pub fn default_launchers() -> Vec<LauncherConfig> {
    [
        ("Show Desktop", "user-desktop", SHOW_DESKTOP_COMMAND),
        ("Terminal", "utilities-terminal", "konsole"),
        ("File Manager", "system-file-manager", "dolphin"),
        ("Text Editor", "kate", "kate"),
        ("Web Browser", "internet-web-browser", "firefox"),
        ("Multimedia Player", "applications-multimedia", "dragon"),
        ("System Settings", "preferences-system", "systemsettings5"),
        ("Separator", "xorg", SEPARATOR_COMMAND),
        (
            "System - Lock Screen",
            "system-lock-screen",
            "qdbus org.kde.screensaver /ScreenSaver Lock",
        ),
        (
            "System - Shut Down",
            "system-shutdown",
            "qdbus org.kde.ksmserver /KSMServer logout -1 2 3",
        ),
    ]
    .into_iter()
    .map(|(name, icon, command)| LauncherConfig::new(name, icon, command))
    .collect()
}

fn default_background_color() -> String {
    "#638abd".to_string()
}

fn default_border_color() -> String {
    "#b1c4de".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ============================================================================
// Task Rules
// ============================================================================

/// A rule deciding whether a task window gets a dock item.
///
/// Rules are evaluated in order; the first matching rule wins.
///
/// # Example Config
///
/// ```toml
/// [[task_rules]]
/// match_program = "^plasmashell$"
/// action = "ignore"
///
/// [[task_rules]]
/// match_title = ".*Picture-in-Picture.*"
/// action = "ignore"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRule {
    /// Regex pattern to match the program name.
    #[serde(default)]
    pub match_program: Option<String>,

    /// Regex pattern to match the window title.
    #[serde(default)]
    pub match_title: Option<String>,

    #[serde(default)]
    pub action: TaskAction,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskAction {
    /// Show the task on the dock (default behavior).
    #[default]
    Show,
    /// Never give the task an item.
    Ignore,
}

/// A task rule with its patterns compiled.
#[derive(Debug, Clone)]
pub struct CompiledTaskRule {
    program: Option<Regex>,
    title: Option<Regex>,
    pub action: TaskAction,
}

impl CompiledTaskRule {
    /// All given patterns must match. A rule without patterns matches nothing.
    pub fn matches(&self, program: &str, title: &str) -> bool {
        if self.program.is_none() && self.title.is_none() {
            return false;
        }
        self.program.as_ref().map_or(true, |re| re.is_match(program))
            && self.title.as_ref().map_or(true, |re| re.is_match(title))
    }
}

fn compile_pattern(pattern: &Option<String>, field: &str) -> Result<Option<Regex>, ()> {
    match pattern {
        None => Ok(None),
        Some(pattern) => Regex::new(pattern).map(Some).map_err(|e| {
            tracing::warn!("Invalid regex in task rule {}: {} ({})", field, pattern, e);
        }),
    }
}

/// A problem found (and fixed) while validating the configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigWarning {
    pub field: String,
    pub message: String,
}

impl ConfigWarning {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

const MIN_ICON_SIZE_RANGE: (i32, i32) = (16, 256);
const MAX_ICON_SIZE_LIMIT: i32 = 512;
const ANIMATION_STEPS_RANGE: (u32, u32) = (1, 100);
const TOOLTIP_FONT_SIZE_RANGE: (i32, i32) = (8, 72);

fn is_hex_color(color: &str) -> bool {
    Color::from_hex(color, u8::MAX).is_some()
}

impl Config {
    /// Load configuration from standard locations.
    ///
    /// Returns default config if no file is found.
    pub fn load() -> Result<Self> {
        match find_config_path() {
            Some(path) => {
                tracing::info!("Loading config from: {}", path.display());
                Self::load_from_path(&path)
            }
            None => {
                tracing::info!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from a specific path.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Clamp out-of-range values to something usable.
    pub fn validate(&mut self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        let appearance = &mut self.appearance;

        let (lo, hi) = MIN_ICON_SIZE_RANGE;
        if !(lo..=hi).contains(&appearance.min_icon_size) {
            let clamped = appearance.min_icon_size.clamp(lo, hi);
            warnings.push(ConfigWarning::new(
                "appearance.min_icon_size",
                format!("{} is outside {}..={}, using {}", appearance.min_icon_size, lo, hi, clamped),
            ));
            appearance.min_icon_size = clamped;
        }

        let min = appearance.min_icon_size;
        if !(min..=MAX_ICON_SIZE_LIMIT).contains(&appearance.max_icon_size) {
            let clamped = appearance.max_icon_size.clamp(min, MAX_ICON_SIZE_LIMIT);
            warnings.push(ConfigWarning::new(
                "appearance.max_icon_size",
                format!(
                    "{} is outside {}..={}, using {}",
                    appearance.max_icon_size, min, MAX_ICON_SIZE_LIMIT, clamped
                ),
            ));
            appearance.max_icon_size = clamped;
        }

        if !(0.0..=1.0).contains(&appearance.spacing_factor) {
            let clamped = if appearance.spacing_factor.is_nan() {
                AppearanceConfig::default().spacing_factor
            } else {
                appearance.spacing_factor.clamp(0.0, 1.0)
            };
            warnings.push(ConfigWarning::new(
                "appearance.spacing_factor",
                format!("{} is outside 0.0..=1.0, using {}", appearance.spacing_factor, clamped),
            ));
            appearance.spacing_factor = clamped;
        }

        if appearance.animation_speed > MAX_ANIMATION_SPEED {
            warnings.push(ConfigWarning::new(
                "appearance.animation_speed",
                format!(
                    "{} is above {}, using {}",
                    appearance.animation_speed, MAX_ANIMATION_SPEED, MAX_ANIMATION_SPEED
                ),
            ));
            appearance.animation_speed = MAX_ANIMATION_SPEED;
        }

        let (lo, hi) = ANIMATION_STEPS_RANGE;
        if !(lo..=hi).contains(&appearance.animation_steps) {
            let clamped = appearance.animation_steps.clamp(lo, hi);
            warnings.push(ConfigWarning::new(
                "appearance.animation_steps",
                format!("{} is outside {}..={}, using {}", appearance.animation_steps, lo, hi, clamped),
            ));
            appearance.animation_steps = clamped;
        }

        let (lo, hi) = TOOLTIP_FONT_SIZE_RANGE;
        if !(lo..=hi).contains(&appearance.tooltip_font_size) {
            let clamped = appearance.tooltip_font_size.clamp(lo, hi);
            warnings.push(ConfigWarning::new(
                "appearance.tooltip_font_size",
                format!("{} is outside {}..={}, using {}", appearance.tooltip_font_size, lo, hi, clamped),
            ));
            appearance.tooltip_font_size = clamped;
        }

        if !(0.0..=1.0).contains(&appearance.background_alpha) {
            warnings.push(ConfigWarning::new(
                "appearance.background_alpha",
                format!("{} is outside 0.0..=1.0, using 0.42", appearance.background_alpha),
            ));
            appearance.background_alpha = AppearanceConfig::default().background_alpha;
        }

        if !is_hex_color(&appearance.background_color) {
            warnings.push(ConfigWarning::new(
                "appearance.background_color",
                format!("'{}' is not a #rrggbb color", appearance.background_color),
            ));
            appearance.background_color = default_background_color();
        }
        if !is_hex_color(&appearance.border_color) {
            warnings.push(ConfigWarning::new(
                "appearance.border_color",
                format!("'{}' is not a #rrggbb color", appearance.border_color),
            ));
            appearance.border_color = default_border_color();
        }

        if parse_log_level(&self.behavior.log_level).is_none() {
            warnings.push(ConfigWarning::new(
                "behavior.log_level",
                format!("unknown level '{}', using info", self.behavior.log_level),
            ));
            self.behavior.log_level = default_log_level();
        }

        if self.screens.is_empty() {
            warnings.push(ConfigWarning::new("screens", "no screens configured, assuming 1920x1080"));
            self.screens.push(ScreenConfig::default());
        }
        for (index, screen) in self.screens.iter_mut().enumerate() {
            if screen.width <= 0 || screen.height <= 0 {
                warnings.push(ConfigWarning::new(
                    format!("screens[{}]", index),
                    format!("invalid size {}x{}, assuming 1920x1080", screen.width, screen.height),
                ));
                *screen = ScreenConfig {
                    x: screen.x,
                    y: screen.y,
                    ..ScreenConfig::default()
                };
            }
        }

        if self.docks.is_empty() {
            warnings.push(ConfigWarning::new("docks", "no docks configured, adding the default dock"));
            self.docks.push(DockConfig::default());
        }
        let screen_count = self.screens.len();
        for (index, dock) in self.docks.iter_mut().enumerate() {
            if dock.screen >= screen_count {
                warnings.push(ConfigWarning::new(
                    format!("docks[{}].screen", index),
                    format!("screen {} does not exist, using screen 0", dock.screen),
                ));
                dock.screen = 0;
            }
        }

        warnings
    }

    /// Compile task rules, skipping rules with invalid patterns.
    pub fn compile_task_rules(&self) -> Vec<CompiledTaskRule> {
        self.task_rules
            .iter()
            .filter_map(|rule| {
                let program = compile_pattern(&rule.match_program, "match_program").ok()?;
                let title = compile_pattern(&rule.match_title, "match_title").ok()?;
                Some(CompiledTaskRule {
                    program,
                    title,
                    action: rule.action,
                })
            })
            .collect()
    }

    /// Geometry of the screen a dock lives on.
    pub fn screen_rect(&self, dock: &DockConfig) -> Rect {
        self.screens
            .get(dock.screen)
            .copied()
            .unwrap_or_default()
            .into()
    }
}

/// Parse a log level name.
pub fn parse_log_level(level: &str) -> Option<tracing::Level> {
    match level.to_lowercase().as_str() {
        "trace" => Some(tracing::Level::TRACE),
        "debug" => Some(tracing::Level::DEBUG),
        "info" => Some(tracing::Level::INFO),
        "warn" => Some(tracing::Level::WARN),
        "error" => Some(tracing::Level::ERROR),
        _ => None,
    }
}

/// First existing config file, if any.
pub fn find_config_path() -> Option<PathBuf> {
    config_paths().into_iter().find(|path| path.exists())
}

/// Get all possible config file paths in priority order.
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    // 1. XDG: $XDG_CONFIG_HOME/smoothdock/config.toml
    if let Some(proj_dirs) = ProjectDirs::from("org", "smoothdock", "smoothdock") {
        paths.push(proj_dirs.config_dir().join("config.toml"));
    }

    // 2. ~/.config/smoothdock/config.toml
    if let Some(home) = dirs_home() {
        let path = home.join(".config").join("smoothdock").join("config.toml");
        if !paths.contains(&path) {
            paths.push(path);
        }
    }

    // 3. Current directory: ./config.toml
    paths.push(PathBuf::from("config.toml"));

    paths
}

/// Get the user's home directory.
fn dirs_home() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}

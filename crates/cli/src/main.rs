//! SmoothDock CLI
//!
//! Command-line interface for controlling the SmoothDock daemon and for
//! feeding it pointer and task events from scripts.
//!
//! Commands are sent to the daemon via IPC (Unix domain socket).

use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use smoothdock_core_layout::TaskInfo;
use smoothdock_ipc::{decode_line, encode_line, socket_path, ClickAction, IpcCommand, IpcResponse, MouseButton};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;

/// How long to wait for the daemon's answer.
const RESPONSE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(name = "smoothdock-cli")]
#[command(author, version, about = "Control the SmoothDock dock")]
struct Cli {
    /// Print the raw JSON response
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send pointer events to a dock
    Pointer {
        #[command(subcommand)]
        event: PointerEvent,
    },
    /// Click on a dock (window coordinates)
    Click {
        x: i32,
        y: i32,
        #[arg(short, long, default_value_t = 0)]
        dock: usize,
        #[arg(short, long, value_enum, default_value_t = Button::Left)]
        button: Button,
    },
    /// Report task window changes
    Task {
        #[command(subcommand)]
        event: TaskEvent,
    },
    /// Report the current desktop (1-based)
    Desktop {
        desktop: u32,
        /// Number of desktops, if it changed
        #[arg(short, long)]
        count: Option<u32>,
    },
    /// Pin the program at INDEX
    Pin {
        index: usize,
        #[arg(short, long, default_value_t = 0)]
        dock: usize,
    },
    /// Unpin the program at INDEX
    Unpin {
        index: usize,
        #[arg(short, long, default_value_t = 0)]
        dock: usize,
    },
    /// Query dock state
    Query {
        #[command(subcommand)]
        what: QueryType,
    },
    /// Reload configuration
    Reload,
    /// Stop the daemon
    Stop,
    /// Print where the daemon looks for its configuration
    ConfigPath,
}

#[derive(Subcommand)]
enum PointerEvent {
    /// The pointer entered the dock window
    Enter {
        #[arg(short, long, default_value_t = 0)]
        dock: usize,
    },
    /// The pointer moved inside the dock window
    Move {
        x: i32,
        y: i32,
        #[arg(short, long, default_value_t = 0)]
        dock: usize,
    },
    /// The pointer left the dock window
    Leave {
        #[arg(short, long, default_value_t = 0)]
        dock: usize,
    },
}

#[derive(clap::Args)]
struct TaskArgs {
    /// Window id
    window_id: u64,
    /// Program name
    program: String,
    /// Command line of the owning process
    command: String,
    #[arg(short, long, default_value = "")]
    title: String,
    /// Desktop (1-based); omit for all desktops
    #[arg(long)]
    desktop: Option<u32>,
    #[arg(long)]
    screen: Option<usize>,
    /// The window demands attention
    #[arg(long)]
    attention: bool,
}

impl From<TaskArgs> for TaskInfo {
    fn from(args: TaskArgs) -> Self {
        TaskInfo {
            title: args.title,
            desktop: args.desktop,
            screen: args.screen,
            demands_attention: args.attention,
            ..TaskInfo::new(args.window_id, args.program, args.command)
        }
    }
}

#[derive(Subcommand)]
enum TaskEvent {
    /// A task window appeared
    Add(TaskArgs),
    /// A task window changed
    Change(TaskArgs),
    /// A task window closed
    Remove { window_id: u64 },
}

#[derive(Subcommand)]
enum QueryType {
    /// Get a dock's zoom state and geometry
    Panel {
        #[arg(short, long, default_value_t = 0)]
        dock: usize,
    },
    /// Get a dock's items
    Items {
        #[arg(short, long, default_value_t = 0)]
        dock: usize,
    },
    /// Get daemon status
    Status,
}

#[derive(Clone, Copy, ValueEnum)]
enum Button {
    Left,
    Middle,
    Right,
}

impl From<Button> for MouseButton {
    fn from(button: Button) -> Self {
        match button {
            Button::Left => MouseButton::Left,
            Button::Middle => MouseButton::Middle,
            Button::Right => MouseButton::Right,
        }
    }
}

/// Map a subcommand to the IPC command it sends. `None` for local commands.
fn to_ipc_command(command: Commands) -> Option<IpcCommand> {
    let cmd = match command {
        Commands::Pointer { event } => match event {
            PointerEvent::Enter { dock } => IpcCommand::PointerEnter { dock },
            PointerEvent::Move { x, y, dock } => IpcCommand::PointerMove { dock, x, y },
            PointerEvent::Leave { dock } => IpcCommand::PointerLeave { dock },
        },
        Commands::Click { x, y, dock, button } => IpcCommand::Click {
            dock,
            x,
            y,
            button: button.into(),
        },
        Commands::Task { event } => match event {
            TaskEvent::Add(args) => IpcCommand::TaskAdded { task: args.into() },
            TaskEvent::Change(args) => IpcCommand::TaskChanged { task: args.into() },
            TaskEvent::Remove { window_id } => IpcCommand::TaskRemoved { window_id },
        },
        Commands::Desktop { desktop, count } => IpcCommand::DesktopChanged { desktop, count },
        Commands::Pin { index, dock } => IpcCommand::Pin { dock, index },
        Commands::Unpin { index, dock } => IpcCommand::Unpin { dock, index },
        Commands::Query { what } => match what {
            QueryType::Panel { dock } => IpcCommand::QueryPanel { dock },
            QueryType::Items { dock } => IpcCommand::QueryItems { dock },
            QueryType::Status => IpcCommand::QueryStatus,
        },
        Commands::Reload => IpcCommand::Reload,
        Commands::Stop => IpcCommand::Stop,
        Commands::ConfigPath => return None,
    };
    Some(cmd)
}

/// Send one command and wait for the daemon's response.
async fn send_command(cmd: &IpcCommand) -> Result<IpcResponse> {
    let path = socket_path();
    let stream = UnixStream::connect(&path)
        .await
        .with_context(|| format!("Could not connect to {}. Is the daemon running?", path.display()))?;
    let (reader, mut writer) = stream.into_split();

    writer.write_all(encode_line(cmd)?.as_bytes()).await?;
    writer.flush().await?;

    let mut line = String::new();
    let mut reader = BufReader::new(reader);
    tokio::time::timeout(RESPONSE_TIMEOUT, reader.read_line(&mut line))
        .await
        .context("Timed out waiting for the daemon")??;
    if line.is_empty() {
        bail!("Daemon closed the connection without answering");
    }
    Ok(decode_line(&line)?)
}

/// Human-readable rendering of a response.
fn format_response(response: &IpcResponse) -> String {
    match response {
        IpcResponse::Ok => "OK".to_string(),
        IpcResponse::Error { message } => format!("Error: {}", message),
        IpcResponse::PanelState {
            dock,
            state,
            window,
            background,
            item_count,
            layout_generation,
        } => format!(
            "Dock {}: {:?}, {} items (layout {})\n  window {}x{} at {},{}\n  background {}x{} at {},{}",
            dock,
            state,
            item_count,
            layout_generation,
            window.width,
            window.height,
            window.x,
            window.y,
            background.width,
            background.height,
            background.x,
            background.y
        ),
        IpcResponse::Items { dock, items } => {
            let mut out = format!("Dock {}: {} items", dock, items.len());
            for item in items {
                out.push_str(&format!(
                    "\n  {:>2} {:<9} {:<24} size {:>3}{}{}",
                    item.index,
                    item.kind,
                    item.label,
                    item.size,
                    if item.task_count > 0 {
                        format!(", {} task(s)", item.task_count)
                    } else {
                        String::new()
                    },
                    if item.demands_attention { ", attention" } else { "" }
                ));
            }
            out
        }
        IpcResponse::Status {
            docks,
            tasks,
            desktop,
            desktop_count,
            animating,
            config_path,
        } => format!(
            "{} dock(s), {} task(s), desktop {}/{}{}\nconfig: {}",
            docks,
            tasks,
            desktop,
            desktop_count,
            if *animating { ", animating" } else { "" },
            config_path.as_deref().unwrap_or("(defaults)")
        ),
        IpcResponse::Clicked { dock, index, action } => {
            let target = index.map_or_else(|| "nothing".to_string(), |i| format!("item {}", i));
            let action = match action {
                ClickAction::Launch { command } => format!("launch `{}`", command),
                ClickAction::Activate { window_id } => format!("activate window {}", window_id),
                ClickAction::ShowApplicationMenu { x, y } => format!("open application menu at {},{}", x, y),
                ClickAction::ShowContextMenu { index } => format!("open context menu for item {}", index),
                ClickAction::SwitchDesktop { desktop } => format!("switch to desktop {}", desktop),
                ClickAction::ToggleShowDesktop => "toggle show desktop".to_string(),
                ClickAction::LockScreen { command } => format!("lock screen with `{}`", command),
                ClickAction::None => "no action".to_string(),
            };
            format!("Dock {}: clicked {}: {}", dock, target, action)
        }
    }
}

fn print_config_path() {
    match directories::ProjectDirs::from("org", "smoothdock", "smoothdock") {
        Some(dirs) => println!("{}", dirs.config_dir().join("config.toml").display()),
        None => println!("config.toml"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let json = cli.json;

    let Some(cmd) = to_ipc_command(cli.command) else {
        print_config_path();
        return Ok(());
    };

    let response = send_command(&cmd).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        println!("{}", format_response(&response));
    }

    if let IpcResponse::Error { .. } = response {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Option<IpcCommand> {
        let cli = Cli::try_parse_from(args).unwrap();
        to_ipc_command(cli.command)
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_pointer_commands() {
        assert_eq!(
            parse(&["smoothdock-cli", "pointer", "move", "120", "30", "--dock", "1"]),
            Some(IpcCommand::PointerMove { dock: 1, x: 120, y: 30 })
        );
        assert_eq!(
            parse(&["smoothdock-cli", "pointer", "leave"]),
            Some(IpcCommand::PointerLeave { dock: 0 })
        );
    }

    #[test]
    fn test_click_button() {
        assert_eq!(
            parse(&["smoothdock-cli", "click", "10", "20", "-b", "right"]),
            Some(IpcCommand::Click {
                dock: 0,
                x: 10,
                y: 20,
                button: MouseButton::Right,
            })
        );
    }

    #[test]
    fn test_task_add() {
        let cmd = parse(&[
            "smoothdock-cli",
            "task",
            "add",
            "42",
            "konsole",
            "/usr/bin/konsole",
            "--title",
            "~ : bash",
            "--desktop",
            "2",
            "--attention",
        ]);
        let expected = TaskInfo {
            title: "~ : bash".to_string(),
            desktop: Some(2),
            demands_attention: true,
            ..TaskInfo::new(42, "konsole", "/usr/bin/konsole")
        };
        assert_eq!(cmd, Some(IpcCommand::TaskAdded { task: expected }));
    }

    #[test]
    fn test_desktop_and_queries() {
        assert_eq!(
            parse(&["smoothdock-cli", "desktop", "3", "--count", "4"]),
            Some(IpcCommand::DesktopChanged {
                desktop: 3,
                count: Some(4)
            })
        );
        assert_eq!(
            parse(&["smoothdock-cli", "query", "status"]),
            Some(IpcCommand::QueryStatus)
        );
        assert_eq!(parse(&["smoothdock-cli", "config-path"]), None);
    }

    #[test]
    fn test_format_clicked() {
        let text = format_response(&IpcResponse::Clicked {
            dock: 0,
            index: Some(2),
            action: ClickAction::Activate { window_id: 42 },
        });
        assert_eq!(text, "Dock 0: clicked item 2: activate window 42");
    }

    #[test]
    fn test_format_error() {
        assert_eq!(
            format_response(&IpcResponse::error("Dock 3 does not exist")),
            "Error: Dock 3 does not exist"
        );
    }
}

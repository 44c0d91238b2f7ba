use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use prompt_stash_core::ChatStreamEvent;
use prompt_stash_desktop::commands;
use prompt_stash_desktop::models::export::{Collection, ExportOptions, ImportMode, ImportOptions};
use prompt_stash_desktop::models::prompt::{PromptCreateRequest, PromptUpdateRequest};
use prompt_stash_desktop::models::settings::{AgentSettingsPatch, SettingsPatch, Theme};
use prompt_stash_desktop::services::prompt::DEFAULT_SUGGESTION_LIMIT;
use prompt_stash_desktop::services::search::{PromptQuery, PromptSort};
use prompt_stash_desktop::services::{export_filename, parse_document};
use prompt_stash_desktop::utils::paths::resolve_data_dir;
use prompt_stash_desktop::{AppState, CommandResponse};

#[derive(Parser)]
#[command(name = "prompt-stash", version, about = "Local prompt library and chat client")]
struct Cli {
    /// Data directory (defaults to $PROMPT_STASH_HOME or ~/.prompt-stash)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Print raw command responses as JSON
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Manage prompts
    #[command(subcommand)]
    Prompts(PromptsCommand),
    /// List tags, or suggest completions for a partial tag
    Tags {
        #[arg(long)]
        suggest: Option<String>,
    },
    /// Manage chats
    #[command(subcommand)]
    Chats(ChatsCommand),
    /// View or change settings
    #[command(subcommand)]
    Settings(SettingsCommand),
    /// Manage the chat API key
    #[command(subcommand)]
    ApiKey(ApiKeyCommand),
    /// Export selected collections to a snapshot file
    Export {
        #[command(flatten)]
        select: CollectionArgs,
        /// Output file (defaults to a dated name in the current directory)
        #[arg(long, conflicts_with = "stdout")]
        out: Option<PathBuf>,
        /// Write the snapshot to stdout
        #[arg(long)]
        stdout: bool,
    },
    /// Import selected collections from a snapshot file
    Import {
        file: PathBuf,
        #[command(flatten)]
        select: CollectionArgs,
        #[arg(long, value_enum, default_value_t = ModeArg::Merge)]
        mode: ModeArg,
    },
    /// Inspect or delete import backups
    #[command(subcommand)]
    Backups(BackupsCommand),
    /// Report backend health
    Health,
}

#[derive(Subcommand)]
enum PromptsCommand {
    List {
        #[arg(long, default_value = "")]
        query: String,
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        favorites: bool,
        #[arg(long)]
        archived: bool,
        #[arg(long, value_enum, default_value_t = SortArg::Original)]
        sort: SortArg,
    },
    Show { id: String },
    /// Record a use and print the prompt content
    Use { id: String },
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        sample: Option<String>,
        #[arg(long)]
        comments: Option<String>,
    },
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long = "tag")]
        tags: Option<Vec<String>>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        sample: Option<String>,
        #[arg(long)]
        comments: Option<String>,
    },
    Delete { id: String },
    Favorite { id: String },
    Archive { id: String },
    Rate {
        id: String,
        #[arg(value_parser = clap::value_parser!(u8).range(0..=5))]
        rating: u8,
    },
}

#[derive(Subcommand)]
enum ChatsCommand {
    List,
    New {
        #[arg(long)]
        title: Option<String>,
        /// Prompt used as the system message
        #[arg(long)]
        prompt: Option<String>,
    },
    Show { id: String },
    Delete { id: String },
    Send {
        id: String,
        message: String,
        /// Wait for the full reply instead of streaming it
        #[arg(long)]
        no_stream: bool,
    },
}

#[derive(Subcommand)]
enum SettingsCommand {
    Show,
    Set {
        #[arg(long, value_enum)]
        theme: Option<ThemeArg>,
        #[arg(long)]
        language: Option<String>,
        #[arg(long)]
        auto_save: Option<bool>,
        #[arg(long)]
        temperature: Option<f32>,
        #[arg(long)]
        max_tokens: Option<u32>,
        #[arg(long)]
        enable_actions: Option<bool>,
    },
    Reset,
}

#[derive(Subcommand)]
enum ApiKeyCommand {
    Set { key: String },
    Clear,
    Status,
}

#[derive(Subcommand)]
enum BackupsCommand {
    List,
    Show { key: String },
    Delete { key: String },
}

/// Collection selection; none given means all three
#[derive(Args)]
struct CollectionArgs {
    #[arg(long)]
    prompts: bool,
    #[arg(long)]
    chats: bool,
    #[arg(long)]
    settings: bool,
}

impl CollectionArgs {
    fn export_options(&self) -> ExportOptions {
        if !(self.prompts || self.chats || self.settings) {
            return ExportOptions::all();
        }
        ExportOptions {
            prompts: self.prompts,
            chats: self.chats,
            settings: self.settings,
        }
    }

    fn import_options(&self, mode: ImportMode) -> ImportOptions {
        let selected = self.export_options();
        ImportOptions {
            prompts: selected.prompts,
            chats: selected.chats,
            settings: selected.settings,
            mode,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Original,
    Recent,
    Usage,
}

impl From<SortArg> for PromptSort {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Original => PromptSort::Original,
            SortArg::Recent => PromptSort::RecentlyUpdated,
            SortArg::Usage => PromptSort::MostUsed,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Merge,
    Replace,
}

impl From<ModeArg> for ImportMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Merge => ImportMode::Merge,
            ModeArg::Replace => ImportMode::Replace,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ThemeArg {
    Light,
    Dark,
}

impl From<ThemeArg> for Theme {
    fn from(arg: ThemeArg) -> Self {
        match arg {
            ThemeArg::Light => Theme::Light,
            ThemeArg::Dark => Theme::Dark,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("prompt_stash=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let data_dir = resolve_data_dir(cli.data_dir.as_deref())?;

    let state = AppState::new();
    state
        .initialize(&data_dir)
        .await
        .with_context(|| format!("failed to open data directory {}", data_dir.display()))?;

    run(cli.command, cli.json, &state).await
}

async fn run(command: Command, json: bool, state: &AppState) -> Result<()> {
    match command {
        Command::Prompts(cmd) => run_prompts(cmd, json, state).await,
        Command::Tags { suggest } => {
            let response = match suggest {
                Some(partial) => {
                    commands::suggest_tags(partial, Vec::new(), DEFAULT_SUGGESTION_LIMIT, state)
                        .await
                }
                None => commands::list_tags(state).await,
            };
            emit(response, json, |tags| {
                for tag in tags {
                    println!("{}", tag);
                }
            })
        }
        Command::Chats(cmd) => run_chats(cmd, json, state).await,
        Command::Settings(cmd) => {
            let response = match cmd {
                SettingsCommand::Show => commands::get_settings(state).await,
                SettingsCommand::Reset => commands::reset_settings(state).await,
                SettingsCommand::Set {
                    theme,
                    language,
                    auto_save,
                    temperature,
                    max_tokens,
                    enable_actions,
                } => {
                    let agent = AgentSettingsPatch {
                        enable_actions,
                        tools: None,
                        temperature,
                        max_tokens,
                    };
                    let patch = SettingsPatch {
                        theme: theme.map(Theme::from),
                        language,
                        auto_save,
                        agent_settings: (agent != AgentSettingsPatch::default()).then_some(agent),
                    };
                    commands::update_settings(patch, state).await
                }
            };
            emit(response, json, print_json)
        }
        Command::ApiKey(cmd) => match cmd {
            ApiKeyCommand::Set { key } => {
                emit(commands::set_api_key(key, state).await, json, |_| {
                    println!("API key stored")
                })
            }
            ApiKeyCommand::Clear => emit(commands::clear_api_key(state).await, json, |_| {
                println!("API key removed")
            }),
            ApiKeyCommand::Status => {
                emit(commands::get_api_key_status(state).await, json, |set| {
                    println!("{}", if *set { "configured" } else { "not configured" })
                })
            }
        },
        Command::Export {
            select,
            out,
            stdout,
        } => {
            let options = select.export_options();
            let response = commands::export_data(options, state).await;
            let document = match response.data {
                Some(document) if response.success => document,
                _ => bail!(response.error.unwrap_or_else(|| "export failed".to_string())),
            };
            let text = serde_json::to_string_pretty(&document)?;
            if stdout {
                println!("{}", text);
                return Ok(());
            }
            let path = match out {
                Some(path) => path,
                None => PathBuf::from(export_filename(
                    options,
                    chrono::Local::now().date_naive(),
                )?),
            };
            std::fs::write(&path, text)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Exported to {}", path.display());
            Ok(())
        }
        Command::Import { file, select, mode } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let document = parse_document(&text)?;
            let options = select.import_options(mode.into());
            emit(
                commands::import_data(document, options, state).await,
                json,
                |report| {
                    println!("Backup written to {}", report.backup_key);
                    println!("Imported: {}", labels(&report.imported));
                    if !report.skipped.is_empty() {
                        println!("Skipped (not in file): {}", labels(&report.skipped));
                    }
                },
            )
        }
        Command::Backups(cmd) => match cmd {
            BackupsCommand::List => emit(commands::list_backups(state).await, json, |backups| {
                for b in backups {
                    println!(
                        "{}  {}  prompts={} chats={}",
                        b.key, b.created_at, b.prompt_count, b.chat_count
                    );
                }
            }),
            BackupsCommand::Show { key } => {
                emit(commands::get_backup(key, state).await, json, print_json)
            }
            BackupsCommand::Delete { key } => {
                emit(commands::delete_backup(key, state).await, json, |_| {
                    println!("Backup deleted")
                })
            }
        },
        Command::Health => emit(commands::get_health(state).await, json, print_json),
    }
}

async fn run_prompts(cmd: PromptsCommand, json: bool, state: &AppState) -> Result<()> {
    match cmd {
        PromptsCommand::List {
            query,
            tags,
            category,
            favorites,
            archived,
            sort,
        } => {
            let query = PromptQuery {
                text: query,
                tags,
                category,
                favorites_only: favorites,
                include_archived: archived,
                sort: sort.into(),
            };
            emit(commands::list_prompts(query, state).await, json, |prompts| {
                for p in prompts {
                    let star = if p.is_favorite { "*" } else { " " };
                    println!("{} {}  {}  [{}]", star, p.id, p.title, p.tags.join(", "));
                }
            })
        }
        PromptsCommand::Show { id } => emit(commands::get_prompt(id, state).await, json, print_json),
        PromptsCommand::Use { id } => {
            emit(commands::record_prompt_use(id, state).await, json, |p| {
                println!("{}", p.content)
            })
        }
        PromptsCommand::Add {
            title,
            content,
            tags,
            category,
            sample,
            comments,
        } => {
            let request = PromptCreateRequest {
                title,
                content,
                sample,
                comments,
                tags,
                category,
            };
            emit(commands::create_prompt(request, state).await, json, |p| {
                println!("Created {}", p.id)
            })
        }
        PromptsCommand::Edit {
            id,
            title,
            content,
            tags,
            category,
            sample,
            comments,
        } => {
            let request = PromptUpdateRequest {
                title,
                content,
                sample,
                comments,
                tags,
                category,
            };
            emit(commands::update_prompt(id, request, state).await, json, print_json)
        }
        PromptsCommand::Delete { id } => {
            emit(commands::delete_prompt(id, state).await, json, |_| {
                println!("Prompt deleted")
            })
        }
        PromptsCommand::Favorite { id } => {
            emit(commands::toggle_prompt_favorite(id, state).await, json, |p| {
                println!("favorite: {}", p.is_favorite)
            })
        }
        PromptsCommand::Archive { id } => {
            emit(commands::toggle_prompt_archived(id, state).await, json, |p| {
                println!("archived: {}", p.is_archived)
            })
        }
        PromptsCommand::Rate { id, rating } => {
            emit(commands::set_prompt_rating(id, rating, state).await, json, |p| {
                println!("rating: {}", p.rating)
            })
        }
    }
}

async fn run_chats(cmd: ChatsCommand, json: bool, state: &AppState) -> Result<()> {
    match cmd {
        ChatsCommand::List => emit(commands::list_chats(state).await, json, |chats| {
            for c in chats {
                let active = if c.is_active { ">" } else { " " };
                println!("{} {}  {}  ({} messages)", active, c.id, c.title, c.messages.len());
            }
        }),
        ChatsCommand::New { title, prompt } => {
            emit(commands::create_chat(title, prompt, state).await, json, |c| {
                println!("Created {}", c.id)
            })
        }
        ChatsCommand::Show { id } => emit(commands::get_chat(id, state).await, json, |chat| {
            for m in &chat.messages {
                println!("[{:?}] {}", m.role, m.content);
            }
        }),
        ChatsCommand::Delete { id } => emit(commands::delete_chat(id, state).await, json, |_| {
            println!("Chat deleted")
        }),
        ChatsCommand::Send {
            id,
            message,
            no_stream,
        } => {
            let cancel = CancellationToken::new();
            let ctrl_c = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    ctrl_c.cancel();
                }
            });

            if no_stream || json {
                let response = commands::send_chat_message(id, message, None, cancel, state).await;
                return emit(response, json, |chat| {
                    if let Some(reply) = chat.messages.last() {
                        println!("{}", reply.content);
                    }
                });
            }

            let (tx, mut rx) = mpsc::channel::<ChatStreamEvent>(64);
            let printer = tokio::spawn(async move {
                let mut out = std::io::stdout();
                while let Some(event) = rx.recv().await {
                    match event {
                        ChatStreamEvent::TextDelta { content } => {
                            let _ = write!(out, "{}", content);
                            let _ = out.flush();
                        }
                        ChatStreamEvent::ReasoningDelta { .. } => {}
                        ChatStreamEvent::Error { message } => {
                            tracing::warn!(message = %message, "stream error")
                        }
                        ChatStreamEvent::Complete { .. } => println!(),
                    }
                }
            });

            let response = commands::send_chat_message(id, message, Some(tx), cancel, state).await;
            let _ = printer.await;
            emit(response, json, |_| {})
        }
    }
}

/// Print a command response; an error response becomes a non-zero exit
fn emit<T: Serialize>(
    response: CommandResponse<T>,
    json: bool,
    render: impl FnOnce(&T),
) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        if !response.success {
            std::process::exit(1);
        }
        return Ok(());
    }

    match (response.success, &response.data) {
        (true, Some(data)) => {
            render(data);
            Ok(())
        }
        _ => bail!(response
            .error
            .unwrap_or_else(|| "command failed".to_string())),
    }
}

fn labels(collections: &[Collection]) -> String {
    collections
        .iter()
        .map(|c| c.label())
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => tracing::error!(error = %e, "failed to render output"),
    }
}

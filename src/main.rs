use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};
use neurochat::{
    app::{App, Route},
    auth::{LoginForm, SignupForm},
    config::Config,
    profiles, res,
    rooms::{msg, CommunityForm, MemberPicker},
    session::FileStorage,
    AppResult,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "neurochat", version, about = "Terminal client for neurochat")]
struct Cli {
    /// HTTP address of the chat service
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// WebSocket address of the chat service
    #[arg(long, global = true)]
    ws_url: Option<String>,
    /// Directory the session is cached in
    #[arg(long, global = true)]
    home: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Create an account and log into it
    Signup {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Logout,
    /// Show who is logged in
    Profile,
    /// Manage communities
    Groups {
        #[command(subcommand)]
        action: Option<GroupsCommand>,
    },
    /// Open the live chat, optionally in a community picked by name
    Chat { room: Option<String> },
}

#[derive(Subcommand)]
enum GroupsCommand {
    List,
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: String,
        #[arg(long = "member")]
        members: Vec<Uuid>,
    },
    Update {
        id: Uuid,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Replaces the member list
        #[arg(long = "member")]
        members: Option<Vec<Uuid>>,
        /// Adds a known user by name
        #[arg(long)]
        add: Vec<String>,
        /// Removes a known user by name
        #[arg(long)]
        remove: Vec<String>,
    },
    Delete { id: Uuid },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("neurochat=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    let config = Config::from_env()?.with_overrides(
        cli.api_url.as_deref(),
        cli.ws_url.as_deref(),
        cli.home,
    )?;
    let storage = FileStorage::new(&config.data_dir);
    let mut app = App::new(&config, Box::new(storage))?;

    let Some(command) = cli.command else {
        println!("{}", res::landing());
        return Ok(());
    };

    match command {
        Command::Signup { username, email, password } => {
            let user = app.signup(&SignupForm { username, email, password }).await?;
            println!("welcome, {}", user.username);
        }
        Command::Login { email, password } => {
            let user = app.login(&LoginForm { email, password }).await?;
            println!("welcome back, {}", user.username);
        }
        Command::Logout => {
            app.logout().await;
            println!("{}", res::landing());
        }
        Command::Profile => {
            app.open_profile();
            println!("{}", profiles::profile(app.user()));
        }
        Command::Groups { action } => groups(&mut app, action.unwrap_or(GroupsCommand::List)).await?,
        Command::Chat { room } => chat(&mut app, room).await?,
    }
    Ok(())
}

async fn groups(app: &mut App, action: GroupsCommand) -> AppResult<()> {
    if app.user().is_none() {
        return Err("not logged in, run `neurochat login` first")?;
    }
    app.refresh().await;

    match action {
        GroupsCommand::List => print_groups(app),
        GroupsCommand::Create { name, description, members } => {
            let form = CommunityForm { name, description, members };
            let created = app.create_community(&form).await.ok_or("community was not created")?;
            println!("created {} ({})", created.name, created.id);
        }
        GroupsCommand::Update { id, name, description, members, add, remove } => {
            let original = app
                .directory()
                .get(id)
                .cloned()
                .ok_or(format!("no community {id}"))?;

            let mut form = CommunityForm::edit(&original);
            if let Some(name) = name {
                form.name = name;
            }
            if let Some(description) = description {
                form.description = description;
            }
            if let Some(members) = members {
                form.members = members;
            }
            if !add.is_empty() || !remove.is_empty() {
                form.members = pick_members(app, form.members, &add, &remove)?;
            }
            form.validate_edit()?;

            let updated = app
                .update_community(form.into_record(&original))
                .await
                .ok_or("community was not updated")?;
            println!("updated {} ({})", updated.name, updated.id);
        }
        GroupsCommand::Delete { id } => {
            if !app.delete_community(id).await {
                return Err(format!("community {id} was not deleted"))?;
            }
            println!("deleted {id}");
        }
    }
    Ok(())
}

fn pick_members(app: &App, current: Vec<Uuid>, add: &[String], remove: &[String]) -> AppResult<Vec<Uuid>> {
    let mut picker = MemberPicker::new(app.known_users().to_vec(), current);

    for name in add {
        let Some(id) = picker
            .search(name)
            .iter()
            .find(|u| u.username.eq_ignore_ascii_case(name))
            .map(|u| u.id)
        else {
            tracing::debug!(name = %name, "already a member or unknown");
            continue;
        };
        picker.toggle(id);
    }

    for name in remove {
        let id = app
            .known_users()
            .iter()
            .find(|u| u.username.eq_ignore_ascii_case(name))
            .map(|u| u.id)
            .ok_or(format!("unknown user {name}"))?;
        if picker.selected().contains(&id) {
            picker.toggle(id);
        }
    }

    Ok(picker.into_selected())
}

fn print_groups(app: &App) {
    let selected = app.directory().selected().map(|c| c.id);
    for community in app.directory().communities() {
        let marker = if Some(community.id) == selected { '*' } else { ' ' };
        println!(
            "{marker} # {:<20} {:>3} members  {}",
            community.name,
            community.members.len(),
            community.id,
        );
    }
}

fn print_members(app: &App) {
    let roster = app.roster();
    println!("{} members", roster.len());
    for entry in roster.entries() {
        let avatar = entry.avatar.as_deref().unwrap_or("·");
        let owner = if entry.is_owner { " (owner)" } else { "" };
        println!("  {avatar} {}{owner}", entry.name);
    }
}

fn print_header(app: &App) {
    match app.directory().selected() {
        Some(community) => {
            println!("# {} | {} members", community.name, community.members.len());
            if let Some(description) = &community.description {
                println!("  {description}");
            }
        }
        None => println!("no community selected, /join one"),
    }
}

async fn chat(app: &mut App, room: Option<String>) -> AppResult<()> {
    if app.open_chat().await != Route::Chat {
        return Err("not logged in, run `neurochat login` first")?;
    }
    if let Some(room) = room {
        if !app.select_room_by_name(&room).await {
            return Err(format!("no community named {room}"))?;
        }
    }

    print_header(app);
    println!("{}", res::chat_help());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if !handle_line(app, &line).await {
                    break;
                }
            }
            msg = app.next_message(), if app.pane().is_connected() => {
                match msg {
                    Some(msg) => println!("{}", msg::format_line(&msg)),
                    None => println!("-- connection closed, /join a community to reconnect"),
                }
            }
        }
    }

    app.leave_chat().await;
    Ok(())
}

/// Returns false when the user asked to leave.
async fn handle_line(app: &mut App, line: &str) -> bool {
    let line = line.trim();
    let (command, arg) = match line.split_once(' ') {
        Some((command, arg)) => (command, arg.trim()),
        None => (line, ""),
    };

    match command {
        "/quit" | "/exit" => return false,
        "/help" => println!("{}", res::chat_help()),
        "/groups" => {
            app.refresh().await;
            print_groups(app);
        }
        "/members" => print_members(app),
        "/join" => {
            if app.select_room_by_name(arg).await {
                print_header(app);
            } else {
                println!("! no community named {arg}");
            }
        }
        _ if line.is_empty() => {}
        _ => {
            if let Err(e) = app.send(line).await {
                println!("! {e}");
            }
        }
    }
    true
}

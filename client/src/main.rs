//! Caseline command-line client.
//!
//! Composition root standing in for the browser screens: builds the
//! durable store, the HTTP gateways, and the session gate, then
//! dispatches one subcommand against them. All session state lives in
//! the state file, so consecutive invocations behave like one signed-in
//! browser session.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::{EnvFilter, fmt};
use url::Url;

use client::domain::ports::{AuthGateway, CaseGateway, CredentialStore};
use client::domain::{
    Case, CaseDraft, ChatMessage, Identity, ProfileUpdate, Role, RouteDecision, SessionService,
};
use client::outbound::http::{DEFAULT_TIMEOUT_SECONDS, HttpAuthGateway, HttpCaseGateway};
use client::outbound::store::FileCredentialStore;

const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_STATE_FILE: &str = ".caseline/session.json";

#[derive(Parser)]
#[command(name = "caseline", about = "Client for the Caseline case-management service")]
struct Cli {
    /// Remote API origin; falls back to CASELINE_API_URL, then the
    /// local development server.
    #[arg(long)]
    api_url: Option<Url>,
    /// Session state file; falls back to CASELINE_STATE_FILE.
    #[arg(long)]
    state_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and persist the session.
    Login { email: String, password: String },
    /// Create an account; a successful registration signs you in.
    Register {
        name: String,
        email: String,
        password: String,
    },
    /// Clear the stored session.
    Logout,
    /// Show the current identity.
    Whoami,
    /// Show where a screen requiring the given roles would route you.
    Routecheck {
        /// Required roles, comma separated; empty admits any
        /// signed-in user.
        #[arg(value_delimiter = ',')]
        roles: Vec<Role>,
    },
    /// Ask the backend to start a password reset.
    PasswordReset { email: String },
    /// Update the cached profile (display name and/or email).
    UpdateProfile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Case intake and management.
    #[command(subcommand)]
    Cases(CasesCommand),
    /// Administrator surface.
    #[command(subcommand)]
    Admin(AdminCommand),
    /// Assistant chat.
    #[command(subcommand)]
    Chat(ChatCommand),
}

#[derive(Subcommand)]
enum CasesCommand {
    /// List your cases.
    List,
    /// Show one case with its analysis and comments.
    Show { id: u64 },
    /// Submit a new case.
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long, default_value = "general")]
        category: String,
        #[arg(long, default_value = "medium")]
        priority: String,
        #[arg(long, default_value = "moderate")]
        severity: String,
        /// Incident date as YYYY-MM-DD.
        #[arg(long)]
        incident_date: Option<chrono::NaiveDate>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        involved_parties: Option<String>,
        #[arg(long)]
        confidential: bool,
    },
    /// Trigger server-side AI analysis.
    Analyze { id: u64 },
    /// Close a case.
    Close { id: u64 },
    /// Approve a case.
    Approve { id: u64 },
    /// Attach a comment.
    Comment { id: u64, content: String },
}

#[derive(Subcommand)]
enum AdminCommand {
    /// List accounts.
    Users,
    /// Update an account.
    UpdateUser {
        id: i64,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        role: Option<Role>,
    },
    /// Delete an account.
    DeleteUser { id: i64 },
    /// Show the activity log.
    Logs,
}

#[derive(Subcommand)]
enum ChatCommand {
    /// List your chat sessions.
    Sessions,
    /// Start a new chat session.
    New,
    /// Show one session's messages.
    Show { id: u64 },
    /// Send a message and print the assistant's reply.
    Send { id: u64, content: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::from_default_env();
    let result = if env::var("CASELINE_LOG_JSON").ok().as_deref() == Some("1") {
        fmt().with_env_filter(filter).json().try_init()
    } else {
        fmt().with_env_filter(filter).with_target(false).try_init()
    };
    if let Err(error) = result {
        eprintln!("tracing init failed: {error}");
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    let api_url = resolve_api_url(cli.api_url)?;
    let state_file = resolve_state_file(cli.state_file);
    let timeout = Duration::from_secs(DEFAULT_TIMEOUT_SECONDS);

    let store = Arc::new(FileCredentialStore::open(state_file).map_err(|e| e.to_string())?);
    let auth = HttpAuthGateway::new(api_url.clone(), timeout).map_err(|e| e.to_string())?;
    let cases = HttpCaseGateway::new(api_url, timeout).map_err(|e| e.to_string())?;

    let session = SessionService::new(Arc::new(auth), Arc::clone(&store));
    let _restored = session.bootstrap();

    match cli.command {
        Command::Login { email, password } => {
            let identity = session
                .login(&email, &password)
                .await
                .map_err(|e| e.to_string())?;
            println!("signed in as {} ({})", identity.display_name(), identity.role());
        }
        Command::Register {
            name,
            email,
            password,
        } => {
            let identity = session
                .register(&name, &email, &password)
                .await
                .map_err(|e| e.to_string())?;
            println!("registered and signed in as {}", identity.email());
        }
        Command::Logout => {
            session.logout();
            println!("signed out");
        }
        Command::Whoami => match session.identity() {
            Some(identity) => print_identity(&identity),
            None => println!("not signed in"),
        },
        Command::Routecheck { roles } => match session.authorize(&roles) {
            RouteDecision::Allow => println!("allow"),
            RouteDecision::RedirectToLogin => println!("redirect /login"),
            RouteDecision::Redirect(route) => println!("redirect {}", route.path()),
        },
        Command::PasswordReset { email } => {
            session
                .request_password_reset(&email)
                .await
                .map_err(|e| e.to_string())?;
            println!("password reset requested for {email}");
        }
        Command::UpdateProfile { name, email } => {
            let updated = session
                .update_profile(&ProfileUpdate {
                    display_name: name,
                    email,
                })
                .map_err(|e| e.to_string())?;
            print_identity(&updated);
        }
        Command::Cases(command) => run_cases(&session, &cases, command).await?,
        Command::Admin(command) => run_admin(&session, &cases, command).await?,
        Command::Chat(command) => run_chat(&session, &cases, command).await?,
    }
    Ok(())
}

async fn run_cases<G, S>(
    session: &SessionService<G, S>,
    gateway: &impl CaseGateway,
    command: CasesCommand,
) -> Result<(), String>
where
    G: AuthGateway,
    S: CredentialStore,
{
    let token = require_token(session)?;
    match command {
        CasesCommand::List => {
            for case in gateway.list_cases(&token).await.map_err(|e| e.to_string())? {
                print_case_line(&case);
            }
        }
        CasesCommand::Show { id } => {
            let case = gateway.case(&token, id).await.map_err(|e| e.to_string())?;
            print_case(&case);
        }
        CasesCommand::Create {
            title,
            description,
            category,
            priority,
            severity,
            incident_date,
            location,
            involved_parties,
            confidential,
        } => {
            let draft = CaseDraft {
                title,
                description,
                category: parse_choice(&category, "category")?,
                priority: parse_choice(&priority, "priority")?,
                severity: parse_choice(&severity, "severity")?,
                incident_date,
                location,
                involved_parties,
                confidential,
            };
            let case = gateway
                .create_case(&token, &draft)
                .await
                .map_err(|e| e.to_string())?;
            println!("created case {} (#{})", case.case_id, case.id);
        }
        CasesCommand::Analyze { id } => {
            let case = gateway
                .analyze_case(&token, id)
                .await
                .map_err(|e| e.to_string())?;
            match case.analysis_summary.as_deref() {
                Some(summary) => println!("analysis: {summary}"),
                None => println!("analysis started for case #{}", case.id),
            }
        }
        CasesCommand::Close { id } => {
            let case = gateway
                .close_case(&token, id)
                .await
                .map_err(|e| e.to_string())?;
            println!("case #{} is now {}", case.id, case.status);
        }
        CasesCommand::Approve { id } => {
            let case = gateway
                .approve_case(&token, id)
                .await
                .map_err(|e| e.to_string())?;
            println!("case #{} approved", case.id);
        }
        CasesCommand::Comment { id, content } => {
            let comment = gateway
                .add_comment(&token, id, &content)
                .await
                .map_err(|e| e.to_string())?;
            println!("comment #{} added", comment.id);
        }
    }
    Ok(())
}

async fn run_admin<G, S>(
    session: &SessionService<G, S>,
    gateway: &impl CaseGateway,
    command: AdminCommand,
) -> Result<(), String>
where
    G: AuthGateway,
    S: CredentialStore,
{
    let token = require_token(session)?;
    match command {
        AdminCommand::Users => {
            for user in gateway
                .list_managed_users(&token)
                .await
                .map_err(|e| e.to_string())?
            {
                println!("#{} {} <{}> ({})", user.id, user.display_name(), user.email, user.role);
            }
        }
        AdminCommand::UpdateUser {
            id,
            first_name,
            last_name,
            role,
        } => {
            let update = client::domain::ManagedUserUpdate {
                first_name,
                last_name,
                role,
            };
            if update.is_empty() {
                return Err("nothing to update; pass --first-name, --last-name, or --role".into());
            }
            let user = gateway
                .update_managed_user(&token, id, &update)
                .await
                .map_err(|e| e.to_string())?;
            println!("updated #{}: {} ({})", user.id, user.display_name(), user.role);
        }
        AdminCommand::DeleteUser { id } => {
            gateway
                .delete_managed_user(&token, id)
                .await
                .map_err(|e| e.to_string())?;
            println!("deleted user #{id}");
        }
        AdminCommand::Logs => {
            for entry in gateway
                .activity_logs(&token)
                .await
                .map_err(|e| e.to_string())?
            {
                let actor = entry.actor_email.as_deref().unwrap_or("-");
                println!(
                    "{} {} {}:{} by {}",
                    entry
                        .created_at
                        .map(|at| at.to_rfc3339())
                        .unwrap_or_else(|| "-".to_owned()),
                    entry.action,
                    entry.target_type,
                    entry.target_id,
                    actor
                );
            }
        }
    }
    Ok(())
}

async fn run_chat<G, S>(
    session: &SessionService<G, S>,
    gateway: &impl CaseGateway,
    command: ChatCommand,
) -> Result<(), String>
where
    G: AuthGateway,
    S: CredentialStore,
{
    let token = require_token(session)?;
    match command {
        ChatCommand::Sessions => {
            for chat in gateway
                .chat_sessions(&token)
                .await
                .map_err(|e| e.to_string())?
            {
                println!("#{} ({} messages)", chat.id, chat.messages.len());
            }
        }
        ChatCommand::New => {
            let chat = gateway
                .create_chat_session(&token)
                .await
                .map_err(|e| e.to_string())?;
            println!("started chat session #{}", chat.id);
        }
        ChatCommand::Show { id } => {
            let chats = gateway
                .chat_sessions(&token)
                .await
                .map_err(|e| e.to_string())?;
            let Some(chat) = chats.into_iter().find(|chat| chat.id == id) else {
                return Err(format!("no chat session #{id}"));
            };
            for message in &chat.messages {
                print_chat_message(message);
            }
        }
        ChatCommand::Send { id, content } => {
            let reply = gateway
                .send_chat_message(&token, id, &content)
                .await
                .map_err(|e| e.to_string())?;
            print_chat_message(&reply.ai_message);
        }
    }
    Ok(())
}

fn require_token<G, S>(session: &SessionService<G, S>) -> Result<String, String>
where
    G: AuthGateway,
    S: CredentialStore,
{
    session
        .access_token()
        .ok_or_else(|| "not signed in; run `caseline login` first".to_owned())
}

fn resolve_api_url(flag: Option<Url>) -> Result<Url, String> {
    if let Some(url) = flag {
        return Ok(url);
    }
    let raw = env::var("CASELINE_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_owned());
    Url::parse(&raw).map_err(|error| format!("invalid API URL {raw}: {error}"))
}

fn resolve_state_file(flag: Option<PathBuf>) -> PathBuf {
    flag.unwrap_or_else(|| {
        env::var("CASELINE_STATE_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_STATE_FILE))
    })
}

fn parse_choice<T: serde::de::DeserializeOwned>(raw: &str, what: &str) -> Result<T, String> {
    serde_json::from_value(Value::String(raw.to_owned()))
        .map_err(|_| format!("unknown {what}: {raw}"))
}

fn print_identity(identity: &Identity) {
    println!(
        "{} <{}> role={}",
        identity.display_name(),
        identity.email(),
        identity.role()
    );
}

fn print_case_line(case: &Case) {
    println!(
        "#{:<4} {:<16} [{}] {}",
        case.id, case.case_id, case.status, case.title
    );
}

fn print_case(case: &Case) {
    print_case_line(case);
    println!("  category: {:?}", case.category);
    if let Some(date) = case.incident_date {
        println!("  incident date: {date}");
    }
    if let Some(location) = case.location.as_deref() {
        println!("  location: {location}");
    }
    println!("  {}", case.description);
    if let Some(summary) = case
        .analysis
        .as_ref()
        .and_then(|analysis| analysis.summary.as_deref())
        .or(case.analysis_summary.as_deref())
    {
        println!("  analysis: {summary}");
    }
    for comment in &case.comments {
        let author = comment.user_name.as_deref().unwrap_or("-");
        println!("  comment by {author}: {}", comment.content);
    }
}

fn print_chat_message(message: &ChatMessage) {
    let who = if message.is_user { "you" } else { "assistant" };
    println!("[{who}] {}", message.content);
}

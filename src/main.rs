use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;

use appadmin::api::auth::LoginRequest;
use appadmin::api::{ApplicationDraft, CredentialDraft, UploadKind, UserDraft};
use appadmin::config::ConfigError;
use appadmin::listing::{ApplicationFilter, CredentialFilter, DEFAULT_PAGE_SIZE, ListState, Page, StatusFilter, UserFilter};
use appadmin::session::{FileSessionStore, GateOutcome, LOGIN_PATH, RecordingNavigator, RouteGate, SessionHook};
use appadmin::{AdminConfig, ApiClient, ApiError, ErrorKind, SessionStore};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("not logged in (redirected to {0}); run `appadmin login`")]
    LoginRequired(&'static str),
    #[error("no user with id {0}")]
    UserNotFound(String),
    #[error("invalid JSON output: {0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "appadmin", about = "Admin console for the application registry backend")]
struct Cli {
    #[arg(long, global = true, env = "APPADMIN_API_URL")]
    base_url: Option<String>,

    #[arg(long, global = true, env = "APPADMIN_SESSION_DIR")]
    session_dir: Option<PathBuf>,

    #[arg(long, global = true, env = "APPADMIN_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and store the session.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "APPADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Drop the stored session.
    Logout,
    /// Show whether the stored session is still valid.
    Status,
    Apps(AppsCommand),
    Users(UsersCommand),
    Creds(CredsCommand),
    /// Import a CSV file.
    Upload {
        kind: KindArg,
        file: PathBuf,
    },
    /// Download the CSV template for an import.
    Template {
        kind: KindArg,
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Application counters.
    Dashboard,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum KindArg {
    Apps,
    Users,
}

impl From<KindArg> for UploadKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Apps => UploadKind::Applications,
            KindArg::Users => UploadKind::Users,
        }
    }
}

#[derive(Args, Debug)]
struct PageArgs {
    #[arg(long, default_value_t = 1)]
    page: usize,
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    per_page: usize,
}

// -----------------------------------------------------------------------------
// apps
// -----------------------------------------------------------------------------

#[derive(Args, Debug)]
struct AppsCommand {
    #[command(subcommand)]
    command: AppsSubcommand,
}

#[derive(Subcommand, Debug)]
enum AppsSubcommand {
    List {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "all")]
        status: StatusFilter,
        #[command(flatten)]
        paging: PageArgs,
    },
    Show {
        id: String,
    },
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        redirect_uri: String,
        #[arg(long, default_value_t = false)]
        inactive: bool,
        #[arg(long, default_value_t = false)]
        store_token: bool,
        #[arg(long, default_value_t = false)]
        internal_legacy_user: bool,
        #[arg(long, default_value_t = false)]
        desktop: bool,
    },
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        redirect_uri: Option<String>,
        #[arg(long)]
        active: Option<bool>,
        #[arg(long)]
        store_token: Option<bool>,
        #[arg(long)]
        internal_legacy_user: Option<bool>,
        #[arg(long)]
        desktop: Option<bool>,
    },
    Delete {
        id: String,
    },
}

// -----------------------------------------------------------------------------
// users
// -----------------------------------------------------------------------------

#[derive(Args, Debug)]
struct UsersCommand {
    #[command(subcommand)]
    command: UsersSubcommand,
}

#[derive(Args, Debug)]
struct UserFields {
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    login_id: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    app_id: String,
    #[arg(long, default_value = "")]
    azure_id: String,
}

impl From<UserFields> for UserDraft {
    fn from(fields: UserFields) -> Self {
        Self {
            first_name: fields.first_name,
            last_name: fields.last_name,
            login_id: fields.login_id,
            email_id: fields.email,
            app_id: fields.app_id,
            map_user_azure_id: fields.azure_id,
        }
    }
}

#[derive(Subcommand, Debug)]
enum UsersSubcommand {
    List {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long)]
        app: Option<String>,
        #[command(flatten)]
        paging: PageArgs,
    },
    Create(UserFields),
    Update {
        id: String,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        login_id: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        app_id: Option<String>,
        #[arg(long)]
        azure_id: Option<String>,
    },
    Delete {
        id: String,
    },
    /// Create a user already mapped to an application.
    Map(UserFields),
    /// Edit an existing application-user mapping.
    Remap {
        id: String,
        #[command(flatten)]
        fields: UserFields,
    },
    /// Users mapped to one application.
    ByApp {
        app_id: String,
    },
}

// -----------------------------------------------------------------------------
// creds
// -----------------------------------------------------------------------------

#[derive(Args, Debug)]
struct CredsCommand {
    #[command(subcommand)]
    command: CredsSubcommand,
}

#[derive(Subcommand, Debug)]
enum CredsSubcommand {
    List {
        #[arg(long, default_value = "")]
        cred_id: String,
        #[arg(long, default_value = "all")]
        status: StatusFilter,
        #[command(flatten)]
        paging: PageArgs,
    },
    Show {
        id: String,
    },
    Create {
        #[arg(long)]
        client_id: String,
        #[arg(long)]
        tenant_id: String,
        #[arg(long, env = "APPADMIN_CLIENT_SECRET", hide_env_values = true)]
        client_secret: String,
        #[arg(long, env = "APPADMIN_SESSION_SECRET", hide_env_values = true)]
        session_secret: String,
        #[arg(long)]
        authority: String,
        #[arg(long, default_value_t = false)]
        inactive: bool,
    },
    Update {
        id: String,
        #[arg(long)]
        client_id: Option<String>,
        #[arg(long)]
        tenant_id: Option<String>,
        #[arg(long)]
        client_secret: Option<String>,
        #[arg(long)]
        session_secret: Option<String>,
        #[arg(long)]
        authority: Option<String>,
        #[arg(long)]
        active: Option<bool>,
    },
    Delete {
        id: String,
    },
}

// =============================================================================
// ENTRY
// =============================================================================

struct CliContext {
    client: ApiClient,
    store: Arc<dyn SessionStore>,
    navigator: Arc<RecordingNavigator>,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    tracing::debug!(api_url = %config.api_url, session_dir = %config.session_dir.display(), "config loaded");

    let store: Arc<dyn SessionStore> = Arc::new(FileSessionStore::new(&config.session_dir));
    let navigator = Arc::new(RecordingNavigator::new());
    let client = ApiClient::new(&config, Arc::clone(&store), Arc::clone(&navigator) as _)?;
    let ctx = CliContext { client, store, navigator };

    match cli.command {
        Command::Login { email, password } => run_login(&ctx, LoginRequest::new(email, password)).await,
        Command::Logout => {
            ctx.client.auth().logout()?;
            print_json(&json!({ "logged_out": true }))
        }
        Command::Status => print_json(&ctx.client.auth().status(SystemTime::now())),
        command => {
            require_session(&ctx)?;
            run_protected(&ctx, command).await
        }
    }
}

fn load_config(cli: &Cli) -> Result<AdminConfig, CliError> {
    let mut config = AdminConfig::from_env(cli.session_dir.clone())?;
    if let Some(url) = &cli.base_url {
        config = config.with_api_url(url)?;
    }
    if let Some(secs) = cli.timeout_secs.filter(|secs| *secs > 0) {
        config.timeouts.request_secs = secs;
    }
    Ok(config)
}

/// Resolve the session hook once and pass it through the route gate.
fn require_session(ctx: &CliContext) -> Result<(), CliError> {
    let mut hook = SessionHook::mount(Arc::clone(&ctx.store));
    let view = hook.resolve(SystemTime::now()).clone();
    let gate = RouteGate::new(Arc::clone(&ctx.navigator) as _);
    match gate.guard(&view, |_| ()) {
        GateOutcome::Render(()) => Ok(()),
        GateOutcome::Redirect(path) => Err(CliError::LoginRequired(path)),
        GateOutcome::Loading => Err(CliError::LoginRequired(LOGIN_PATH)),
    }
}

async fn run_login(ctx: &CliContext, request: LoginRequest) -> Result<(), CliError> {
    ctx.client.auth().login(&request).await?;
    print_json(&ctx.client.auth().status(SystemTime::now()))
}

async fn run_protected(ctx: &CliContext, command: Command) -> Result<(), CliError> {
    let result = match command {
        Command::Apps(apps) => run_apps(ctx, apps.command).await,
        Command::Users(users) => run_users(ctx, users.command).await,
        Command::Creds(creds) => run_creds(ctx, creds.command).await,
        Command::Upload { kind, file } => {
            let kind = UploadKind::from(kind);
            let report = ctx.client.bulk().upload_file(kind, &file).await?;
            print_json(&json!({ "message": report.summary(kind), "result": report }))
        }
        Command::Template { kind, out } => {
            let path = ctx.client.bulk().save_template(kind.into(), &out).await?;
            print_json(&json!({ "saved": path.display().to_string() }))
        }
        Command::Dashboard => print_json(&ctx.client.dashboard().summary().await?),
        Command::Login { .. } | Command::Logout | Command::Status => Ok(()),
    };
    surface_logout(result, &ctx.navigator)
}

/// A 401 that ended the session mid-command reads as a login prompt.
fn surface_logout(result: Result<(), CliError>, navigator: &RecordingNavigator) -> Result<(), CliError> {
    match (result, navigator.last_redirect()) {
        (Err(CliError::Api(e)), Some(path)) if e.kind() == ErrorKind::Unauthorized => {
            tracing::warn!(path = %path, "session ended during command");
            Err(CliError::LoginRequired(LOGIN_PATH))
        }
        (result, _) => result,
    }
}

// =============================================================================
// RESOURCES
// =============================================================================

async fn run_apps(ctx: &CliContext, command: AppsSubcommand) -> Result<(), CliError> {
    let apps = ctx.client.applications();
    match command {
        AppsSubcommand::List { name, status, paging } => {
            let items = apps.list().await?;
            let state = ListState::new(ApplicationFilter { name, status }).with_per_page(paging.per_page);
            print_page(&paged(state, paging.page).view(&items))
        }
        AppsSubcommand::Show { id } => print_json(&apps.get(&id).await?),
        AppsSubcommand::Create { name, redirect_uri, inactive, store_token, internal_legacy_user, desktop } => {
            let mut draft = ApplicationDraft::new(name, redirect_uri);
            draft.is_active = !inactive;
            draft.store_token = store_token;
            draft.internal_legacy_user = internal_legacy_user;
            draft.desktop = desktop;
            let created = apps.create(&draft).await?;
            print_json(&json!({ "message": "Application added successfully", "application": created }))
        }
        AppsSubcommand::Update { id, name, redirect_uri, active, store_token, internal_legacy_user, desktop } => {
            let mut draft = ApplicationDraft::from_application(&apps.get(&id).await?);
            if let Some(name) = name {
                draft.app_name = name;
            }
            if let Some(uri) = redirect_uri {
                draft.redirect_uri = uri;
            }
            draft.is_active = active.unwrap_or(draft.is_active);
            draft.store_token = store_token.unwrap_or(draft.store_token);
            draft.internal_legacy_user = internal_legacy_user.unwrap_or(draft.internal_legacy_user);
            draft.desktop = desktop.unwrap_or(draft.desktop);
            let updated = apps.update(&id, &draft).await?;
            print_json(&json!({ "message": "Application updated successfully", "application": updated }))
        }
        AppsSubcommand::Delete { id } => {
            apps.delete(&id).await?;
            print_json(&json!({ "message": "Application deleted successfully" }))
        }
    }
}

async fn run_users(ctx: &CliContext, command: UsersSubcommand) -> Result<(), CliError> {
    let users = ctx.client.users();
    match command {
        UsersSubcommand::List { search, app, paging } => {
            let items = users.list().await?;
            let state = ListState::new(UserFilter { search, app_name: app }).with_per_page(paging.per_page);
            print_page(&paged(state, paging.page).view(&items))
        }
        UsersSubcommand::Create(fields) => {
            users.create(&fields.into()).await?;
            print_json(&json!({ "message": "User added successfully" }))
        }
        UsersSubcommand::Update { id, first_name, last_name, login_id, email, app_id, azure_id } => {
            let existing = users
                .list()
                .await?
                .into_iter()
                .find(|user| user.app_user_id == id)
                .ok_or_else(|| CliError::UserNotFound(id.clone()))?;
            let mut draft = UserDraft::from_user(&existing);
            let edits = [
                (&mut draft.first_name, first_name),
                (&mut draft.last_name, last_name),
                (&mut draft.login_id, login_id),
                (&mut draft.email_id, email),
                (&mut draft.app_id, app_id),
                (&mut draft.map_user_azure_id, azure_id),
            ];
            for (field, value) in edits {
                if let Some(value) = value {
                    *field = value;
                }
            }
            users.update(&id, &draft).await?;
            print_json(&json!({ "message": "User updated successfully" }))
        }
        UsersSubcommand::Delete { id } => {
            users.delete(&id).await?;
            print_json(&json!({ "message": "User deleted successfully" }))
        }
        UsersSubcommand::Map(fields) => {
            users.map(&fields.into()).await?;
            print_json(&json!({ "message": "User mapped successfully" }))
        }
        UsersSubcommand::Remap { id, fields } => {
            users.update_mapping(&id, &fields.into()).await?;
            print_json(&json!({ "message": "User mapping updated successfully" }))
        }
        UsersSubcommand::ByApp { app_id } => print_json(&users.by_application(&app_id).await?),
    }
}

async fn run_creds(ctx: &CliContext, command: CredsSubcommand) -> Result<(), CliError> {
    let creds = ctx.client.credentials();
    match command {
        CredsSubcommand::List { cred_id, status, paging } => {
            let items = creds.list().await?;
            let state = ListState::new(CredentialFilter { cred_id, status }).with_per_page(paging.per_page);
            print_page(&paged(state, paging.page).view(&items))
        }
        CredsSubcommand::Show { id } => print_json(&creds.get(&id).await?),
        CredsSubcommand::Create { client_id, tenant_id, client_secret, session_secret, authority, inactive } => {
            let draft = CredentialDraft {
                client_id,
                tenant_id,
                client_secret,
                session_secret,
                azure_authority: authority,
                is_active: !inactive,
            };
            creds.create(&draft).await?;
            print_json(&json!({ "message": "Azure credential added successfully" }))
        }
        CredsSubcommand::Update { id, client_id, tenant_id, client_secret, session_secret, authority, active } => {
            let mut draft = CredentialDraft::from_credential(&creds.get(&id).await?);
            let edits = [
                (&mut draft.client_id, client_id),
                (&mut draft.tenant_id, tenant_id),
                (&mut draft.client_secret, client_secret),
                (&mut draft.session_secret, session_secret),
                (&mut draft.azure_authority, authority),
            ];
            for (field, value) in edits {
                if let Some(value) = value {
                    *field = value;
                }
            }
            draft.is_active = active.unwrap_or(draft.is_active);
            creds.update(&id, &draft).await?;
            print_json(&json!({ "message": "Azure credential updated successfully" }))
        }
        CredsSubcommand::Delete { id } => {
            creds.delete(&id).await?;
            print_json(&json!({ "message": "Credential deleted successfully" }))
        }
    }
}

// =============================================================================
// OUTPUT
// =============================================================================

fn paged<F>(mut state: ListState<F>, page: usize) -> ListState<F> {
    state.set_page(page);
    state
}

fn print_page<T: Serialize>(page: &Page<T>) -> Result<(), CliError> {
    eprintln!("{} (page {} of {})", page.showing(), page.page, page.total_pages.max(1));
    print_json(&page.items)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;

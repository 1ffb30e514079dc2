//! Command-line front end for the CRM dashboard
//!
//! ```text
//! crm login --email ana@empresa-a.com --password ...
//! crm leads --status recibido --search garcia
//! crm reply 42 --message "Gracias, en breve le contactamos"
//! crm users create --name Luis --email luis@empresa-a.com --password ... --role comercial
//! ```

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crm_client::access::{Role, Tab};
use crm_client::auth::FileTokenStore;
use crm_client::config::ClientOptions;
use crm_client::error::Error;
use crm_client::models::{Id, LeadOrigin, LeadStatus};
use crm_client::view::{render, Dashboard, LoginForm};
use crm_client::CrmClient;

#[derive(Parser)]
#[command(name = "crm", version, about = "Lead dashboard of the multi-company CRM")]
struct Cli {
    /// Base URL of the CRM API
    #[arg(long, env = "CRM_API_URL")]
    api_url: Option<String>,

    /// File the session token is kept in
    #[arg(long, env = "CRM_SESSION_FILE")]
    session_file: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and keep the session token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the session token
    Logout,
    /// Show the signed-in user and the tabs available to them
    Whoami,
    /// Show the tab bar
    Tabs,
    /// Lead statistics
    Stats,
    /// List or search leads
    Leads(LeadsArgs),
    /// Show one lead in full
    Lead {
        id: String,
        /// List page the lead is on
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Mark a lead answered, optionally recording the reply
    Reply {
        id: String,
        #[arg(long)]
        message: Option<String>,
        /// List page the lead is on
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// List companies
    Companies,
    /// User administration
    #[command(subcommand)]
    Users(UsersCommand),
}

#[derive(Args)]
struct LeadsArgs {
    /// recibido or contestado
    #[arg(long)]
    status: Option<LeadStatus>,
    /// formulario_web, formulario_leads or manual
    #[arg(long)]
    origin: Option<LeadOrigin>,
    #[arg(long, default_value_t = 1)]
    page: u32,
    /// Company id (superadmin only)
    #[arg(long)]
    company: Option<String>,
    /// Free-text search; ignores the other filters
    #[arg(long)]
    search: Option<String>,
}

#[derive(Subcommand)]
enum UsersCommand {
    List,
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        role: Option<Role>,
        /// Company id (superadmin only; fixed for ceo)
        #[arg(long)]
        company: Option<String>,
        #[arg(long)]
        inactive: bool,
    },
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        /// Leave out to keep the current password
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        role: Option<Role>,
        #[arg(long)]
        company: Option<String>,
        #[arg(long)]
        active: Option<bool>,
    },
    Delete {
        id: String,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    pretty_env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("{}", e.user_message());
        std::process::exit(1);
    }
}

fn default_session_file() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_default()
        .join(".crm-session.json")
}

async fn run(cli: Cli) -> Result<(), Error> {
    let mut options = ClientOptions::from_env();
    if let Some(url) = &cli.api_url {
        options = options.with_api_url(url);
    }
    if let Some(secs) = cli.timeout {
        options = options.with_request_timeout(Some(Duration::from_secs(secs)));
    }
    // one-shot commands have nothing to debounce
    options = options.with_search_debounce(Duration::ZERO);

    let session_file = cli.session_file.unwrap_or_else(default_session_file);
    let client = CrmClient::new_with_options(options, Arc::new(FileTokenStore::new(session_file)))?;

    match cli.command {
        Command::Login { email, password } => {
            let mut form = LoginForm::new();
            form.email = email;
            form.password = password;
            let session = form.submit(client.auth()).await?;
            if let Some(user) = session.user {
                println!("Welcome, {} ({})", user.name, user.role);
            }
            Ok(())
        }
        Command::Logout => {
            client.auth().logout()?;
            println!("Logged out");
            Ok(())
        }
        command => {
            if !client.auth().restore()? {
                return Err(Error::auth("Not logged in; run `crm login` first"));
            }
            let dashboard = Dashboard::new(client);
            dashboard.mount().await?;
            run_dashboard(&dashboard, command).await
        }
    }
}

async fn run_dashboard(dashboard: &Dashboard, command: Command) -> Result<(), Error> {
    match command {
        Command::Whoami => {
            dashboard.view(|state| {
                if let Some(user) = &state.user {
                    println!("{} <{}> ({})", user.name, user.email, user.role);
                }
                println!("{}", render::tab_bar(&state.tabs(), state.active_tab));
            });
        }
        Command::Tabs => {
            dashboard.view(|state| println!("{}", render::tab_bar(&state.tabs(), state.active_tab)));
        }
        Command::Stats => {
            dashboard.view(|state| {
                if let Some(stats) = &state.stats {
                    print!("{}", render::stats(stats));
                }
            });
        }
        Command::Leads(args) => {
            if let Some(company) = args.company {
                dashboard.set_company_filter(Some(Id::from(company.as_str()))).await?;
            }
            if args.status.is_some() {
                dashboard.set_status_filter(args.status).await?;
            }
            if args.origin.is_some() {
                dashboard.set_origin_filter(args.origin).await?;
            }
            if args.page > 1 {
                dashboard.set_page(args.page).await?;
            }
            if let Some(term) = args.search {
                dashboard.search(&term).await?;
            }
            print!("{}", render::lead_table(&dashboard.lead_rows()));
        }
        Command::Lead { id, page } => {
            if page > 1 {
                dashboard.set_page(page).await?;
            }
            dashboard.select_lead(&Id::from(id.as_str()))?;
            if let Some(detail) = dashboard.lead_detail() {
                print!("{}", render::lead_detail(&detail));
            }
        }
        Command::Reply { id, message, page } => {
            if page > 1 {
                dashboard.set_page(page).await?;
            }
            let id = Id::from(id.as_str());
            dashboard.mark_answered(&id, message.as_deref()).await?;
            println!("Lead {} marked answered", id);
        }
        Command::Companies => {
            dashboard.select_tab(Tab::Companies).await?;
            dashboard.view(|state| print!("{}", render::company_table(&state.companies)));
        }
        Command::Users(users) => {
            dashboard.select_tab(Tab::Users).await?;
            run_users(dashboard, users).await?;
        }
        Command::Login { .. } | Command::Logout => {}
    }
    Ok(())
}

async fn run_users(dashboard: &Dashboard, command: UsersCommand) -> Result<(), Error> {
    match command {
        UsersCommand::List => {
            dashboard.view(|state| {
                print!("{}", render::user_table(&state.users, |u| state.can_manage(u)));
            });
        }
        UsersCommand::Create {
            name,
            email,
            password,
            role,
            company,
            inactive,
        } => {
            dashboard.open_create_user()?;
            fill_form(dashboard, Some(name), Some(email), Some(password), role, company, Some(!inactive))?;
            submit_form(dashboard).await?;
            println!("User created");
        }
        UsersCommand::Update {
            id,
            name,
            email,
            password,
            role,
            company,
            active,
        } => {
            dashboard.open_edit_user(&Id::from(id.as_str()))?;
            fill_form(dashboard, name, email, password, role, company, active)?;
            submit_form(dashboard).await?;
            println!("User {} updated", id);
        }
        UsersCommand::Delete { id, yes } => {
            dashboard.request_delete_user(&Id::from(id.as_str()))?;
            if !yes {
                dashboard.cancel_delete();
                return Err(Error::validation("Deletion not confirmed; pass --yes"));
            }
            dashboard.confirm_delete().await?;
            println!("User {} deleted", id);
        }
    }
    Ok(())
}

/// Submit the open form; on failure show it with its message
async fn submit_form(dashboard: &Dashboard) -> Result<(), Error> {
    let result = dashboard.submit_user_form().await;
    if result.is_err() {
        dashboard.view(|state| {
            if let Some(form) = state.user_modal.form() {
                eprint!("{}", render::user_form(form, &state.companies));
            }
        });
    }
    result
}

fn fill_form(
    dashboard: &Dashboard,
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
    role: Option<Role>,
    company: Option<String>,
    active: Option<bool>,
) -> Result<(), Error> {
    dashboard
        .with_user_form(|form| -> Result<(), Error> {
            if let Some(name) = name {
                form.name = name;
            }
            if let Some(email) = email {
                form.email = email;
            }
            if let Some(password) = password {
                form.password = password;
            }
            if let Some(role) = role {
                form.set_role(role)?;
            }
            if let Some(company) = company {
                form.set_company(Some(Id::from(company.as_str())))?;
            }
            if let Some(active) = active {
                form.active = active;
            }
            Ok(())
        })
        .unwrap_or_else(|| Err(Error::validation("No user form is open")))
}

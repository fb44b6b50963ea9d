mod commands;
mod config;
mod context;
mod error;
mod notifications;

use clap::{Parser, Subcommand};
use credport_commons::env::load_env;
use credport_commons::telemetry::{init_telemetry_from_env, init_telemetry_from_env_with_log_file};
use std::path::PathBuf;

use crate::error::PortalResult;

#[derive(Parser)]
#[command(name = "credport")]
#[command(about = "Credential portal CLI to manage wallet sessions, identities, and on-chain academic credentials.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    // Starts the session reconciliation loop
    Run {
        // Optional local log file in addition to stdout.
        #[arg(long)]
        log_file: Option<PathBuf>,
    },

    // Shows the current session and identity state
    Status,

    // Requests wallet account access
    Connect,

    // Clears the local session state
    Disconnect,

    // Switches the wallet to the portal's required chain
    SwitchNetwork,

    // Creates a new identity from an email or a wallet address
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        wallet: Option<String>,
        // "student" or "institution"
        #[arg(long, default_value = "student")]
        account_type: String,
    },

    // Signs in with an email (mock credential check)
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    // Clears the identity and disconnects a linked wallet
    Logout,

    // Links the connected wallet to the active identity
    Link,

    // Removes the wallet link from the active identity
    Unlink,

    // Identity management commands
    Account {
        #[command(subcommand)]
        subcommand: AccountCommands,
    },

    // Mints a credential to a recipient (institution wallets only,
    // enforced by the contract)
    Mint {
        #[arg(long)]
        recipient: String,
        #[arg(long)]
        student: String,
        #[arg(long)]
        degree: String,
        #[arg(long)]
        university: String,
        #[arg(long)]
        uri: String,
    },

    // Verifies a credential token
    Verify {
        #[arg(long)]
        token_id: u64,
    },

    // Lists credentials held by a wallet
    Credentials {
        #[arg(long)]
        owner: Option<String>,
    },

    // Lists credentials minted by an issuer
    Issued {
        #[arg(long)]
        issuer: Option<String>,
    },

    // Generates a resume from the connected wallet's credentials
    Resume,
}

#[derive(Subcommand)]
enum AccountCommands {
    // Shows the active identity
    Show,

    // Changes the account type
    SetType {
        #[arg(long)]
        account_type: String,
    },
}

fn report(result: PortalResult<()>) {
    if let Err(err) = result {
        eprintln!("{}", String::from(err));
    }
}

#[tokio::main]
async fn main() {
    load_env();
    let cli = Cli::parse();

    let _telemetry_guard = match &cli.command {
        Commands::Run { log_file } => match init_telemetry_from_env_with_log_file(log_file.as_deref()) {
            Ok(guard) => Some(guard),
            Err(err) => {
                eprintln!("Failed to initialize telemetry: {err}");
                return;
            }
        },
        _ => match init_telemetry_from_env() {
            Ok(guard) => Some(guard),
            Err(err) => {
                eprintln!("Failed to initialize telemetry: {err}");
                return;
            }
        },
    };

    match cli.command {
        Commands::Run { .. } => report(commands::session::run().await),
        Commands::Status => report(commands::session::status().await),
        Commands::Connect => report(commands::session::connect().await),
        Commands::Disconnect => report(commands::session::disconnect().await),
        Commands::SwitchNetwork => report(commands::session::switch_network().await),
        Commands::Register {
            name,
            email,
            password,
            wallet,
            account_type,
        } => report(commands::identity::register(name, email, password, wallet, account_type).await),
        Commands::Login { email, password } => report(commands::identity::login(email, password).await),
        Commands::Logout => report(commands::identity::logout().await),
        Commands::Link => report(commands::identity::link().await),
        Commands::Unlink => report(commands::identity::unlink().await),
        Commands::Account { subcommand } => match subcommand {
            AccountCommands::Show => report(commands::identity::show().await),
            AccountCommands::SetType { account_type } => {
                report(commands::identity::set_account_type(account_type).await)
            }
        },
        Commands::Mint {
            recipient,
            student,
            degree,
            university,
            uri,
        } => report(commands::credentials::mint(recipient, student, degree, university, uri).await),
        Commands::Verify { token_id } => report(commands::credentials::verify(token_id).await),
        Commands::Credentials { owner } => report(commands::credentials::list_owned(owner).await),
        Commands::Issued { issuer } => report(commands::credentials::list_issued(issuer).await),
        Commands::Resume => report(commands::credentials::resume().await),
    }
}

use alloy::primitives::Address;
use prettytable::{Cell, Row, Table, format};

use credport_core::identity::{AccountType, Registration};
use credport_core::wallet::canonical_address;

use crate::context::init_context;
use crate::error::{PortalError, PortalResult};

fn parse_account_type(raw: &str) -> PortalResult<AccountType> {
    AccountType::parse(raw)
        .ok_or_else(|| PortalError::command(format!("invalid account type '{raw}': expected student or institution")))
}

pub async fn register(
    name: String,
    email: Option<String>,
    password: Option<String>,
    wallet: Option<String>,
    account_type: String,
) -> PortalResult<()> {
    let account_type = parse_account_type(&account_type)?;

    let registration = match (email, wallet) {
        (Some(email), None) => {
            let password =
                password.ok_or_else(|| PortalError::command("--password is required for email registration"))?;
            Registration::Email {
                name,
                email,
                password,
                account_type,
            }
        }
        (None, Some(wallet)) => {
            let wallet_address: Address = wallet
                .parse()
                .map_err(|e| PortalError::command(format!("invalid wallet address: {e}")))?;
            Registration::Wallet {
                name,
                account_type,
                wallet_address,
            }
        }
        _ => {
            return Err(PortalError::command(
                "provide either --email (with --password) or --wallet",
            ));
        }
    };

    let mut ctx = init_context().await?;
    let identity = ctx.identity.register(registration).await?;
    println!("Registered {} as {}.", identity.id, identity.account_type.as_str());
    Ok(())
}

pub async fn login(email: String, password: String) -> PortalResult<()> {
    let mut ctx = init_context().await?;
    let identity = ctx.identity.login(&email, &password).await?;
    println!("Signed in as {} ({}).", identity.id, identity.account_type.as_str());
    Ok(())
}

pub async fn logout() -> PortalResult<()> {
    let mut ctx = init_context().await?;
    ctx.session.initialize().await?;

    ctx.identity.logout(&mut ctx.session).await?;
    println!("Signed out.");
    Ok(())
}

/// Links the session's current wallet address to the active identity.
pub async fn link() -> PortalResult<()> {
    let mut ctx = init_context().await?;
    ctx.session.initialize().await?;

    let address = match ctx.session.address() {
        Some(address) => address,
        None => ctx.session.connect().await?,
    };
    ctx.identity.link(address).await?;
    println!("Linked wallet {}.", canonical_address(&address));
    Ok(())
}

pub async fn unlink() -> PortalResult<()> {
    let mut ctx = init_context().await?;
    ctx.identity.unlink().await?;
    println!("Wallet unlinked. The wallet session itself is untouched.");
    Ok(())
}

pub async fn show() -> PortalResult<()> {
    let ctx = init_context().await?;

    let Some(identity) = ctx.identity.active() else {
        println!("No active identity. Use `credport register`, `credport login`, or connect a wallet.");
        return Ok(());
    };

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
    table.set_titles(Row::new(vec![Cell::new("Identity")]));
    table.add_row(Row::new(vec![Cell::new("Id"), Cell::new(&identity.id)]));
    table.add_row(Row::new(vec![Cell::new("Name"), Cell::new(&identity.name)]));
    table.add_row(Row::new(vec![
        Cell::new("Email"),
        Cell::new(identity.email.as_deref().unwrap_or("-")),
    ]));
    table.add_row(Row::new(vec![
        Cell::new("Account type"),
        Cell::new(identity.account_type.as_str()),
    ]));
    let wallet = identity
        .wallet_address
        .map(|a| canonical_address(&a))
        .unwrap_or_else(|| "-".to_string());
    table.add_row(Row::new(vec![Cell::new("Wallet"), Cell::new(&wallet)]));
    table.printstd();
    Ok(())
}

pub async fn set_account_type(raw: String) -> PortalResult<()> {
    let account_type = parse_account_type(&raw)?;

    let mut ctx = init_context().await?;
    ctx.identity.update_account_type(account_type).await?;
    println!("Account type set to {}.", account_type.as_str());
    Ok(())
}

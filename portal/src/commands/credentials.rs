use alloy::primitives::{Address, U256};
use prettytable::{Cell, Row, Table, format};

use credport_core::credentials::{self, CredentialView};
use credport_core::resume::generate_resume;
use credport_core::wallet::canonical_address;

use crate::context::init_context;
use crate::error::{PortalError, PortalResult};

fn parse_address(raw: &str) -> PortalResult<Address> {
    raw.parse()
        .map_err(|e| PortalError::command(format!("invalid address '{raw}': {e}")))
}

fn print_credential_table(views: &[CredentialView]) {
    if views.is_empty() {
        println!("No credentials found.");
        return;
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
    table.set_titles(Row::new(vec![
        Cell::new("Token"),
        Cell::new("Student"),
        Cell::new("Degree"),
        Cell::new("University"),
        Cell::new("IPFS"),
    ]));
    for view in views {
        table.add_row(Row::new(vec![
            Cell::new(&view.token_id.to_string()),
            Cell::new(&view.student_name),
            Cell::new(&view.degree),
            Cell::new(&view.university),
            Cell::new(&view.ipfs_hash),
        ]));
    }
    table.printstd();
}

pub async fn mint(recipient: String, student: String, degree: String, university: String, uri: String) -> PortalResult<()> {
    let recipient = parse_address(&recipient)?;

    let mut ctx = init_context().await?;
    ctx.session.initialize().await?;
    if ctx.session.address().is_none() {
        ctx.session.connect().await?;
    }

    let contract = ctx.session.contract()?;
    let tx_hash = contract.mint(recipient, &student, &degree, &university, &uri).await?;

    let rendered = format!("{tx_hash:#x}");
    println!("Mint transaction submitted: {rendered}");
    println!("Await confirmation on the explorer before treating the credential as issued.");
    ctx.notifier.notify_credential_minted(&rendered, &student).await;
    Ok(())
}

pub async fn verify(token_id: u64) -> PortalResult<()> {
    let mut ctx = init_context().await?;
    ctx.session.initialize().await?;

    let contract = ctx.session.contract()?;
    let token_id = U256::from(token_id);
    let record = contract.verify(token_id).await?;
    let owner = contract.owner_of(token_id).await?;

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
    table.set_titles(Row::new(vec![Cell::new("Credential"), Cell::new(&token_id.to_string())]));
    table.add_row(Row::new(vec![Cell::new("Student"), Cell::new(&record.student_name)]));
    table.add_row(Row::new(vec![Cell::new("Degree"), Cell::new(&record.degree)]));
    table.add_row(Row::new(vec![Cell::new("University"), Cell::new(&record.university)]));
    table.add_row(Row::new(vec![Cell::new("IPFS"), Cell::new(&record.ipfs_hash)]));
    table.add_row(Row::new(vec![Cell::new("Owner"), Cell::new(&canonical_address(&owner))]));
    table.printstd();
    Ok(())
}

pub async fn list_owned(owner: Option<String>) -> PortalResult<()> {
    let mut ctx = init_context().await?;
    ctx.session.initialize().await?;

    let owner = match owner {
        Some(raw) => parse_address(&raw)?,
        None => ctx
            .session
            .address()
            .ok_or_else(|| PortalError::command("no wallet connected; pass --owner or connect first"))?,
    };

    let contract = ctx.session.contract()?;
    let views = credentials::load_owned(contract.as_ref(), owner).await?;
    print_credential_table(&views);
    Ok(())
}

pub async fn list_issued(issuer: Option<String>) -> PortalResult<()> {
    let mut ctx = init_context().await?;
    ctx.session.initialize().await?;

    let issuer = match issuer {
        Some(raw) => parse_address(&raw)?,
        None => ctx
            .session
            .address()
            .ok_or_else(|| PortalError::command("no wallet connected; pass --issuer or connect first"))?,
    };

    let contract = ctx.session.contract()?;
    let views = credentials::load_issued(contract.as_ref(), issuer).await?;
    print_credential_table(&views);
    Ok(())
}

pub async fn resume() -> PortalResult<()> {
    let mut ctx = init_context().await?;
    ctx.session.initialize().await?;

    let identity = ctx
        .identity
        .active()
        .ok_or_else(|| PortalError::command("no active identity; sign in or connect a wallet first"))?
        .clone();
    let owner = ctx
        .session
        .address()
        .ok_or_else(|| PortalError::command("no wallet connected; credentials are looked up by wallet address"))?;
    let generator = ctx
        .resume
        .as_ref()
        .ok_or_else(|| PortalError::command("no resume service configured; set CREDPORT_RESUME_URL"))?;

    let contract = ctx.session.contract()?;
    let views = credentials::load_owned(contract.as_ref(), owner).await?;

    let text = generate_resume(generator.as_ref(), &identity, &views).await?;
    println!("{text}");
    Ok(())
}

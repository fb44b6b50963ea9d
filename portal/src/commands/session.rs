use std::time::Duration;

use prettytable::{Cell, Row, Table, format};
use tracing::{info, warn};

use credport_core::chain::{self, REQUIRED_CHAIN_ID};
use credport_core::session::{SessionChange, SessionSnapshot};
use credport_core::wallet::canonical_address;

use crate::context::{PortalContext, init_context};
use crate::error::{PortalError, PortalResult};

fn print_session_table(ctx: &PortalContext, snapshot: &SessionSnapshot) {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
    table.set_titles(Row::new(vec![Cell::new("Session")]));

    let address = snapshot
        .address
        .map(|a| canonical_address(&a))
        .unwrap_or_else(|| "not connected".to_string());
    table.add_row(Row::new(vec![Cell::new("Wallet"), Cell::new(&address)]));

    let network = snapshot.network_name.clone().unwrap_or_else(|| "unknown".to_string());
    table.add_row(Row::new(vec![Cell::new("Network"), Cell::new(&network)]));
    table.add_row(Row::new(vec![
        Cell::new("Required network"),
        Cell::new(&chain::network_name(REQUIRED_CHAIN_ID)),
    ]));
    table.add_row(Row::new(vec![
        Cell::new("Correct network"),
        Cell::new(if snapshot.is_correct_network() { "yes" } else { "no" }),
    ]));
    table.add_row(Row::new(vec![
        Cell::new("Contract bound"),
        Cell::new(if snapshot.contract_bound { "yes" } else { "no" }),
    ]));

    let identity = match ctx.identity.active() {
        Some(identity) => format!("{} ({})", identity.id, identity.account_type.as_str()),
        None => "none".to_string(),
    };
    table.add_row(Row::new(vec![Cell::new("Identity"), Cell::new(&identity)]));

    table.printstd();
}

pub async fn status() -> PortalResult<()> {
    let mut ctx = init_context().await?;
    ctx.session.initialize().await?;
    print_session_table(&ctx, &ctx.session.snapshot());
    Ok(())
}

pub async fn connect() -> PortalResult<()> {
    let mut ctx = init_context().await?;
    ctx.session.initialize().await?;

    let address = ctx.session.connect().await?;
    ctx.identity.reconcile(Some(address)).await?;

    println!("Connected as {}", canonical_address(&address));
    print_session_table(&ctx, &ctx.session.snapshot());
    Ok(())
}

pub async fn disconnect() -> PortalResult<()> {
    let mut ctx = init_context().await?;
    ctx.session.initialize().await?;
    ctx.session.disconnect();

    println!("Session cleared locally.");
    println!("Note: the wallet's own authorization cannot be revoked from here; reconnecting is silent.");
    Ok(())
}

pub async fn switch_network() -> PortalResult<()> {
    let mut ctx = init_context().await?;
    ctx.session.initialize().await?;

    let provider = ctx
        .session
        .provider()
        .ok_or_else(|| PortalError::command("no wallet provider configured; set CREDPORT_WALLET_KEY"))?;

    chain::switch_to_required_network(provider.as_ref()).await?;
    println!("Switched to {}.", chain::network_name(REQUIRED_CHAIN_ID));
    Ok(())
}

/// The reconciliation loop: consumes wallet events single-threaded,
/// keeps the persisted identity in step with the session, and performs a
/// full reload whenever the chain changes.
pub async fn run() -> PortalResult<()> {
    let mut ctx = init_context().await?;
    ctx.notifier.notify_startup().await;

    if let Some(provider) = &ctx.provider {
        provider
            .clone()
            .spawn_event_pump(Duration::from_secs(ctx.config.chain_poll_secs));
    }

    'reload: loop {
        ctx.session.initialize().await?;
        if let Err(err) = ctx.identity.reconcile(ctx.session.address()).await {
            warn!("identity reconciliation failed: {}", String::from(err));
        }
        print_session_table(&ctx, &ctx.session.snapshot());

        loop {
            let Some(event) = ctx.session.next_event().await else {
                info!("wallet event stream closed; stopping");
                return Ok(());
            };

            match ctx.session.apply_event(event).await {
                Ok(SessionChange::Disconnected) => {
                    ctx.notifier.notify_wallet_disconnected().await;
                }
                Ok(SessionChange::Connected(address)) => {
                    if let Err(err) = ctx.identity.reconcile(Some(address)).await {
                        warn!("identity reconciliation failed: {}", String::from(err));
                    }
                    ctx.notifier.notify_wallet_connected(&canonical_address(&address)).await;
                }
                Ok(SessionChange::ReloadRequired { chain_id }) => {
                    ctx.notifier.notify_chain_changed(&chain::network_name(chain_id)).await;
                    continue 'reload;
                }
                Err(err) => warn!("failed to apply wallet event: {}", String::from(err)),
            }
        }
    }
}

//! Storefront command-line client.

use std::sync::Arc;

use catalog::InventoryFeed;
use common::{Notifier, TracingNotifier};
use storefront::cli::{self, Command, HELP};
use storefront::{
    ClientError, Config, FileCredentialStore, PushTransport, Session, StorefrontApi,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

type CliSession = Session<StorefrontApi, FileCredentialStore>;

/// Runs one command. Returns false when the user asked to quit.
async fn dispatch(session: &CliSession, command: Command) -> Result<bool, ClientError> {
    match command {
        Command::Login { email, password } => {
            let count = session.login(&email, &password).await?;
            println!("logged in, {count} products loaded");
        }
        Command::Register(request) => {
            session.register(&request).await?;
            println!("registered, you can log in now");
        }
        Command::Logout => {
            session.logout().await?;
            println!("logged out");
        }
        Command::Products => println!("{}", cli::render_products(&session.products().await)),
        Command::Add { id } => {
            let quantity = session.add(id).await?;
            println!("{id}: {quantity} in cart ({} items)", session.cart_badge().await);
        }
        Command::Set { id, quantity } => match session.set_quantity(id, quantity).await? {
            Some(quantity) => println!("{id}: {quantity} in cart"),
            None => println!("{id}: removed"),
        },
        Command::Remove { id } => {
            session.remove(id).await;
            println!("{id}: removed");
        }
        Command::Cart => println!("{}", cli::render_cart(&session.cart_view().await)),
        Command::Checkout => {
            let outcome = session.checkout().await?;
            println!(
                "order placed: {} items, total {} ({})",
                outcome.total_items(),
                outcome.total(),
                outcome.placed_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
        }
        Command::Help => println!("{HELP}"),
        Command::Quit => return Ok(false),
    }
    Ok(true)
}

#[tokio::main]
async fn main() {
    // 1. Load configuration
    let config = Config::from_env().expect("invalid configuration");

    // 2. Initialize tracing
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // 3. Install Prometheus exporter if requested
    if let Some(addr) = config.metrics_addr {
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
            .expect("failed to install Prometheus exporter");
        tracing::info!(%addr, "metrics exporter listening");
    }

    // 4. Wire the session
    let api = StorefrontApi::new(config.api_base_url.clone()).expect("failed to build HTTP client");
    let feed = InventoryFeed::new(config.feed_capacity);
    let notifier: Arc<dyn Notifier> = Arc::new(TracingNotifier);
    let session = Session::new(
        api,
        FileCredentialStore::new(&config.credentials_path),
        feed.clone(),
        notifier,
    );
    let push = PushTransport::new(config.push_url.clone(), feed).spawn();

    match session.start().await {
        Ok(count) => tracing::info!(products = count, "session started"),
        Err(e) => {
            tracing::warn!(error = %e, "catalog pull failed, continuing with an empty catalog")
        }
    }
    println!("{HELP}");

    // 5. Read commands until quit, EOF or Ctrl-C
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("received SIGINT");
                break;
            }
        };
        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read stdin");
                break;
            }
        };

        let keep_going = match Command::parse(&line) {
            Ok(Some(command)) => dispatch(&session, command).await,
            Ok(None) => Ok(true),
            Err(e) => Err(e),
        };
        match keep_going {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => println!("error: {e}"),
        }
    }

    // 6. Tear down
    session.shutdown().await;
    push.stop().await;
    tracing::info!("storefront client exited");
}

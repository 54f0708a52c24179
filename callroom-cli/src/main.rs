use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use colored::*;
use std::net::IpAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use callroom::client::{
    CallDeps, CallRecordApi, CallSession, CallSummary, ClientConfig, HttpCallRecordClient,
    SyntheticMedia,
};
use callroom::model::{CallId, CallStatus, Review};
use callroom::server::{ServerConfig, serve};

#[derive(Parser)]
#[command(name = "callroom")]
#[command(about = "Two-party call signaling server and headless call client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the signaling server. Flags override CALLROOM_HOST / CALLROOM_PORT / CALLROOM_RECORDS.
    Serve {
        #[arg(long)]
        host: Option<IpAddr>,

        #[arg(short, long)]
        port: Option<u16>,

        /// Also serve the in-memory call record API.
        #[arg(long)]
        with_records: bool,
    },

    /// Join a call with a synthetic audio track and print live billing.
    Join {
        #[arg(long)]
        call_id: String,

        #[arg(long, default_value = "ws://127.0.0.1:8080/ws")]
        signaling: String,

        #[arg(long, default_value = "http://127.0.0.1:8080")]
        api: String,

        #[arg(long, default_value = "dev-token")]
        token: String,

        /// Use host candidates only.
        #[arg(long)]
        no_stun: bool,

        /// Rate the call (1-5) once it has ended.
        #[arg(long)]
        rating: Option<u8>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    match Cli::parse().command {
        Commands::Serve {
            host,
            port,
            with_records,
        } => {
            let mut config = ServerConfig::from_env();
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            config.serve_records |= with_records;

            println!(
                "{} {}",
                "Starting callroom signaling on".green().bold(),
                config.addr().to_string().bold()
            );
            serve(config).await?;
        }

        Commands::Join {
            call_id,
            signaling,
            api,
            token,
            no_stun,
            rating,
        } => {
            let mut config = ClientConfig::new(signaling, api, token);
            if no_stun {
                config = config.with_ice_servers(vec![]);
            }
            join(CallId::from(call_id), config, rating).await?;
        }
    }

    Ok(())
}

async fn join(call_id: CallId, config: ClientConfig, rating: Option<u8>) -> Result<()> {
    let deps = CallDeps::from_config(&config, Arc::new(SyntheticMedia::new()))?;
    let outbox = Arc::clone(&deps.outbox);

    let handle = match CallSession::start(call_id.clone(), &config, deps).await {
        Ok(handle) => handle,
        Err(e) => {
            println!("{} {}", "Could not start call:".red().bold(), e.user_message());
            return Err(e.into());
        }
    };
    println!(
        "{} {} ({} per minute)",
        "Joined call with".cyan(),
        handle.record().mentor.name.bold(),
        handle.record().rate_per_minute
    );

    let printer = tokio::spawn(print_progress(
        handle.watch_status(),
        handle.watch_billing(),
    ));

    let mut status = handle.watch_status();
    tokio::select! {
        res = tokio::signal::ctrl_c() => {
            res.context("Failed to listen for ctrl-c")?;
            println!("{}", "Hanging up...".yellow());
            handle.hang_up();
        }
        _ = status.wait_for(|s| s.is_terminal()) => {}
    }

    let summary = handle.finished().await?;
    printer.abort();
    print_summary(&summary);

    if !summary.persisted && summary.reached_media {
        let remaining = outbox.retry_pending().await;
        if remaining > 0 {
            println!(
                "{} {} end report(s) could not be saved",
                "Warning:".yellow().bold(),
                remaining
            );
        }
    }

    if let Some(error) = summary.error() {
        bail!(error.user_message());
    }

    if let Some(rating) = rating {
        if !submit_rating(&config, &call_id, rating).await {
            println!("{}", "The call summary above is final.".dimmed());
        }
    }

    Ok(())
}

/// A rating that cannot be delivered is reported and dropped; the call itself already ended.
async fn submit_rating(config: &ClientConfig, call_id: &CallId, rating: u8) -> bool {
    let review = Review {
        rating,
        comment: None,
    };
    let result = match HttpCallRecordClient::new(
        config.api_base_url.clone(),
        config.auth_token.clone(),
    ) {
        Ok(api) => api.post_review(call_id, &review).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => {
            println!("{}", "Thanks for the rating!".green());
            true
        }
        Err(e) => {
            println!("{} {}", "Rating not sent:".yellow(), e);
            false
        }
    }
}

async fn print_progress(
    mut status: tokio::sync::watch::Receiver<CallStatus>,
    mut billing: tokio::sync::watch::Receiver<callroom::BillingSnapshot>,
) {
    loop {
        tokio::select! {
            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
                let s = *status.borrow_and_update();
                println!("{} {:?}", "Status:".cyan(), s);
            }
            changed = billing.changed() => {
                if changed.is_err() {
                    break;
                }
                let b = *billing.borrow_and_update();
                println!(
                    "   {} {}  {} {}",
                    "elapsed".dimmed(),
                    format_duration(b.duration_secs),
                    "cost".dimmed(),
                    b.cost
                );
            }
        }
    }
}

fn print_summary(summary: &CallSummary) {
    println!("{}", "Call ended".green().bold());
    println!("   reason:   {}", summary.reason);
    println!(
        "   duration: {}",
        format_duration(summary.snapshot.duration_secs)
    );
    println!("   cost:     {}", summary.snapshot.cost);
    if summary.reached_media && !summary.persisted {
        println!("   {}", "end report queued for retry".yellow());
    }
}

fn format_duration(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

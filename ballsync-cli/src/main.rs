use anyhow::{Context, Result};
use ballsync_core::{CoordinatePair, Role};
use ballsync_session::{
    MediaConfig, Session, SessionConfig, SignalingConfig, SignalingMode, TcpSignaling,
    TransportConfig,
};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ballsync", version)]
#[command(about = "Bouncing-ball tracking over a peer-to-peer video session")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stream the ball and check the coordinates reported back.
    Offer(SessionArgs),
    /// Track the ball in the received video and report its position.
    Answer(SessionArgs),
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Auto,
    Listen,
    Dial,
}

impl From<ModeArg> for SignalingMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Auto => SignalingMode::Auto,
            ModeArg::Listen => SignalingMode::Listen,
            ModeArg::Dial => SignalingMode::Dial,
        }
    }
}

#[derive(clap::Args)]
struct SessionArgs {
    /// Signaling host.
    #[arg(long, env = "BALLSYNC_HOST", default_value = "localhost")]
    host: String,

    /// Signaling port.
    #[arg(long, env = "BALLSYNC_PORT", default_value_t = 12345)]
    port: u16,

    #[arg(long, value_enum, default_value_t = ModeArg::Auto)]
    signaling: ModeArg,

    /// STUN server URL; repeat for more. Defaults to a public server.
    #[arg(long = "stun", env = "BALLSYNC_STUN", value_delimiter = ',')]
    stun: Vec<String>,

    /// Use host candidates only, including loopback.
    #[arg(long)]
    local: bool,

    #[arg(long, default_value_t = 30)]
    fps: u32,

    #[arg(long, default_value_t = 500)]
    width: u32,

    #[arg(long, default_value_t = 500)]
    height: u32,

    #[arg(long, default_value_t = 20)]
    radius: u32,

    /// Frames buffered ahead of the estimator before the oldest is dropped.
    #[arg(long, default_value_t = 10)]
    queue_capacity: usize,

    #[arg(long, default_value_t = 60)]
    receive_timeout_secs: u64,
}

impl SessionArgs {
    fn into_config(self, role: Role) -> SessionConfig {
        let mut transport = if self.local {
            TransportConfig::local()
        } else {
            TransportConfig::default()
        };
        if !self.stun.is_empty() {
            transport.ice_servers = self.stun;
        }

        SessionConfig {
            role,
            signaling: SignalingConfig {
                host: self.host,
                port: self.port,
                mode: self.signaling.into(),
                receive_timeout: Duration::from_secs(self.receive_timeout_secs),
            },
            transport,
            media: MediaConfig {
                width: self.width,
                height: self.height,
                radius: self.radius,
                frame_rate: self.fps,
                queue_capacity: self.queue_capacity,
                start: CoordinatePair::new(0, 0),
                ..MediaConfig::default()
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let (role, args) = match Cli::parse().command {
        Commands::Offer(args) => (Role::Offerer, args),
        Commands::Answer(args) => (Role::Answerer, args),
    };
    let config = args.into_config(role);

    println!("{}", format!("🚀 Starting ballsync as {role}...").green().bold());
    println!(
        "   📡 Signaling: {} ({:?})",
        config.signaling.addr(),
        config.signaling.mode
    );
    println!(
        "   🎥 Scene: {}x{} @ {} fps",
        config.media.width, config.media.height, config.media.frame_rate
    );

    let signaling = TcpSignaling::new(config.signaling.clone());
    let session = Session::new(config, signaling).context("Invalid session configuration")?;

    let mut state = session.state();
    tokio::spawn(async move {
        while state.changed().await.is_ok() {
            let current = *state.borrow_and_update();
            println!("   {} {}", "→".cyan(), current.to_string().cyan());
        }
    });

    let report = session
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!("Ctrl-C handler unavailable: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
        .context("Session failed")?;

    println!(
        "{}",
        format!(
            "✨ Session closed ({:?}) after {:.1}s",
            report.reason,
            report.elapsed.as_secs_f64()
        )
        .green()
        .bold()
    );
    if !report.streamed {
        println!("   {}", "No media was exchanged".yellow());
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

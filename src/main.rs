use parallelogram::config::DiscoveryConfig;
use parallelogram::discovery::service::Announcer;
use parallelogram::executor::handlers::worker_router;
use parallelogram::executor::registry::FunctionRegistry;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        // .with_max_level(tracing::Level::DEBUG)
        .with_max_level(tracing::Level::INFO)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 3 {
        eprintln!(
            "Usage: {} --bind <addr:port> [--group <ipv4>] [--discovery-port <port>]",
            args[0]
        );
        eprintln!("Example: {} --bind 0.0.0.0:6000", args[0]);
        eprintln!(
            "Example: {} --bind 0.0.0.0:6001 --group 224.3.29.71 --discovery-port 10000",
            args[0]
        );

        std::process::exit(1);
    }

    let mut bind_addr: Option<SocketAddr> = None;
    let mut discovery = DiscoveryConfig::default();

    let mut i = 1;
    while i < args.len() {
        let value = args.get(i + 1);
        match (args[i].as_str(), value) {
            ("--bind", Some(value)) => {
                bind_addr = Some(value.parse()?);
                i += 2;
            }
            ("--group", Some(value)) => {
                discovery.group = value.parse::<Ipv4Addr>()?;
                i += 2;
            }
            ("--discovery-port", Some(value)) => {
                discovery.port = value.parse()?;
                i += 2;
            }
            (flag, _) => {
                tracing::warn!("Ignoring argument {}", flag);
                i += 1;
            }
        }
    }

    let Some(bind_addr) = bind_addr else {
        anyhow::bail!("--bind is required");
    };

    // 1. Functions this worker can run:
    let registry = FunctionRegistry::with_builtins();
    tracing::info!(
        "Registered {} function(s): {:?}",
        registry.function_count(),
        registry.list_functions()
    );

    // 2. HTTP listener first, so the announced port is the real one:
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    let exec_addr = listener.local_addr()?;

    // 3. Discovery announcer:
    let announcer = Arc::new(Announcer::bind(&discovery, exec_addr.port()).await?);
    tracing::info!(
        "Answering discovery probes for {} on {}",
        discovery.group,
        announcer.local_addr()?
    );
    tokio::spawn(announcer.start());

    // 4. Execution API:
    let app = worker_router(registry);

    tracing::info!("Worker listening on {}", exec_addr);
    tracing::info!("Press Ctrl+C to shutdown");

    axum::serve(listener, app).await?;

    Ok(())
}

use std::net::SocketAddr;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use rdb_explorer::rdb::parse_rdb_file;
use rdb_explorer::server::serve;

const LISTEN_PORT: u16 = 5763;

/// Decodes the RDB file named by the single positional argument, then
/// serves read-only queries over it until killed.
#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 2 {
        eprintln!("usage: rdb-explorer <path/to/dump.rdb>");
        return ExitCode::FAILURE;
    }

    let path = &args[1];
    if !Path::new(path).exists() {
        eprintln!("file {} does not exist", path);
        return ExitCode::FAILURE;
    }

    let snapshot = match parse_rdb_file(path).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            eprintln!("failed to decode {}: {}", path, e);
            return ExitCode::FAILURE;
        }
    };

    println!(
        "decoded rdb version {}: {} keys",
        snapshot.version,
        snapshot.catalog.len()
    );

    let addr = SocketAddr::from(([127, 0, 0, 1], LISTEN_PORT));
    println!("listening on {}", addr);

    if let Err(e) = serve(Arc::new(snapshot), addr).await {
        eprintln!("server failed: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

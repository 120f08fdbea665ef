use backend_api::{init_tracing, run_server, AppState, FileExpenseRepository};
use std::sync::Arc;
use std::{env, path::PathBuf};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse environment variables (with sane defaults)
    let data_dir_raw = env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string());
    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse()
        .unwrap_or(3000);

    // Resolve the data directory: absolute paths are kept, relative ones are
    // taken against the current working directory.
    let data_dir = {
        let raw = PathBuf::from(&data_dir_raw);
        if raw.is_absolute() {
            raw
        } else {
            env::current_dir()?.join(raw)
        }
    };

    println!("Expense Analytics API Server");
    println!("============================");
    println!("Data dir (resolved): {}", data_dir.display());
    println!("Listening on: {}:{}", host, port);
    println!("Environment overrides: DATA_DIR='{}'", data_dir_raw);
    println!();

    // Pre-flight check
    if !data_dir.exists() {
        eprintln!("[WARN] data directory not found at: {}", data_dir.display());
        eprintln!("       Continuing; every user will read as having no expenses until it exists.");
    }

    // Create the repository and the shared handler state
    let repo = Arc::new(FileExpenseRepository::new(data_dir));
    let state = AppState::new(repo);

    // Start the server
    init_tracing();
    run_server(state, &host, port).await?;

    Ok(())
}

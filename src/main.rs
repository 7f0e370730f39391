use std::error::Error;

use journal::{build_app, cli, config::Config, db, services::CredentialStore};
use tokio::net::TcpListener;

const USAGE: &str = "usage: journal [serve] | journal create-user <email> <password>";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;
    let pool = db::init_pool(&config.database_url).await?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        [] | ["serve"] => {}
        ["create-user", email, password] => return cli::create_user(&pool, email, password).await,
        _ => {
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    }

    if let Some(bootstrap) = &config.bootstrap {
        cli::bootstrap_user(&CredentialStore::new(pool.clone()), bootstrap).await?;
    }

    let app = build_app(pool, config.secure_cookies).await?;

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("listening on {}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

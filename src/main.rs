use config::Config;
use notes_web::build_routes;
use notes_web::store::Store;
use serde::Deserialize;
use std::env;
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct Args {
    log_level: String,
    database_host: String,
    database_port: u16,
    database_name: String,
    port: u16,
    database_username: String,
    database_password: String,
}

#[tokio::main]
async fn main() -> Result<(), handle_errors::Error> {
    dotenv::dotenv().ok();

    let config = Config::builder()
        .add_source(config::File::with_name("setup"))
        .build()
        .unwrap();

    let config = config.try_deserialize::<Args>().unwrap();

    let log_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        format!(
            "handle_errors={},notes_web={},warp={}",
            config.log_level, config.log_level, config.log_level
        )
    });

    tracing_subscriber::fmt()
        .with_env_filter(log_filter)
        .with_span_events(FmtSpan::CLOSE)
        .init();

    let db_url = env::var("DATABASE_URL").unwrap_or_else(|_| {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            config.database_username,
            config.database_password,
            config.database_host,
            config.database_port,
            config.database_name
        )
    });
    let store = Store::new(&db_url).await;

    sqlx::migrate!()
        .run(&store.connection)
        .await
        .expect("cannot run migrations");

    let routes = build_routes(store);

    warp::serve(routes).run(([0, 0, 0, 0], config.port)).await;

    Ok(())
}

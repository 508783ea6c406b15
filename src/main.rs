use std::env;
use std::net::SocketAddr;

use weldbid::db::PgPool;
use weldbid::engine::Engine;
use weldbid::server::serve;
use weldbid::store::PgStore;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let db_uri = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let PgPool(pool) = PgPool::new(&db_uri, 5).await.unwrap();

    let store = PgStore::new(pool).await.unwrap();
    let engine = Engine::new(store);

    let addr: SocketAddr = env::var("BIND_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:3000".into())
        .parse()
        .unwrap();

    serve(engine, addr).await;
}

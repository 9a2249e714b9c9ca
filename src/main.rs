


use constants::MainResult;
use routerify::Router;
use std::{net::SocketAddr, sync::Arc, env};
use dotenv::dotenv;
use uuid::Uuid;
use log::{info, error};
use tokio::sync::oneshot;
use self::contexts as ctx;



pub mod middlewares;
pub mod utils;
pub mod constants;
pub mod contexts;
pub mod errors;
pub mod schemas;
pub mod workflow;
pub mod controllers;
pub mod routers;








#[tokio::main(flavor="multi_thread", worker_threads=10)]
async fn main() -> MainResult<(), Box<dyn std::error::Error + Send + Sync + 'static>>{



    // -------------------------------- environment variables setup
    //
    // ---------------------------------------------------------------------
    env::set_var("RUST_LOG", "trace");
    pretty_env_logger::init();
    dotenv().expect("⚠️ .env file not found");
    let db_host = env::var("DB_HOST").expect("⚠️ no db host variable set");
    let db_port = env::var("DB_PORT").expect("⚠️ no db port variable set");
    let db_username = env::var("DB_USERNAME").expect("⚠️ no db username variable set");
    let db_password = env::var("DB_PASSWORD").expect("⚠️ no db password variable set");
    let db_engine = env::var("DB_ENGINE").expect("⚠️ no db engine variable set");
    let db_name = env::var("DB_NAME").expect("⚠️ no db name variable set");
    let environment = env::var("ENVIRONMENT").expect("⚠️ no environment variable set");
    let host = env::var("HOST").expect("⚠️ no host variable set");
    let port = env::var("SWIFTX_PORT").expect("⚠️ no port variable set");
    let token_secret = env::var("SECRET_KEY").expect("⚠️ no secret key variable set");
    let cipher_secret = env::var("ENCRYPTION_KEY").expect("⚠️ no encryption key variable set");
    let token_ttl = env::var("JWT_EXPIRATION").expect("⚠️ found no jwt expiration time")
        .parse::<i64>().expect("⚠️ jwt expiration time must be an integer number of seconds");
    let (_sender, receiver) = oneshot::channel::<u8>(); //// oneshot channel for handling server signals
    let server_addr = format!("{}:{}", host, port).as_str().parse::<SocketAddr>().expect("⚠️ invalid server address");

    //// secrets leave the process environment exactly once, in here; every
    //// component downstream gets them injected at construction
    let security_config = ctx::app::SecurityConfig{
        cipher_secret,
        token_secret,
        token_ttl,
    };



    // -------------------------------- app storage setup
    //
    // ------------------------------------------------------------------
    let db_url = if environment == "prod"{
        format!("{}://{}:{}@{}:{}", db_engine, db_username, db_password, db_host, db_port)
    } else{
        format!("{}://{}:{}", db_engine, db_host, db_port)
    };
    let mut init_db = ctx::app::Db::new().await.expect("⚠️ can't initialize the db instance");
    init_db.url = Some(db_url);
    let mongodb_instance = init_db.connect().await.expect("⚠️ can't connect to mongodb");
    let app_storage = Arc::new(
        ctx::app::Storage{
            id: Uuid::new_v4(),
            db: Some(
                ctx::app::Db{
                    mode: init_db.mode,
                    url: init_db.url,
                    instance: Some(mongodb_instance),
                }
            ),
        }
    );



    // -------------------------------- building the swiftx server from the routers
    //
    //      sharing the db instance and the security config between routers' threads
    // --------------------------------------------------------------------------------------------------------
    let db_instance = app_storage.get_db().await.expect("⚠️ no db instance is available");
    let api = Router::builder()
        .data(db_instance.clone())
        .data(security_config)
        .data(ctx::app::DbConfig{ name: db_name })
        .scope("/auth", routers::auth::register().await)
        .scope("/payment", routers::payment::register().await)
        .build()
        .expect("⚠️ can't build the api router");
    info!("running {} server on port {} - {}", ctx::app::APP_NAME, port, chrono::Local::now().naive_local());
    let server = utils::build_server(api, server_addr).await;
    let graceful = server.with_graceful_shutdown(ctx::app::shutdown_signal(receiver));
    if let Err(e) = graceful.await{
        error!("{} server error {} - {}", ctx::app::APP_NAME, e, chrono::Local::now().naive_local());
    }



    tokio::signal::ctrl_c().await?;
    println!("{} server stopped due to receiving [ctrl-c]", ctx::app::APP_NAME);

    Ok(())

}

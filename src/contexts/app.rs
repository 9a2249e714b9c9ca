


use crate::constants::*;
use crate::errors::AppError;
use hyper::{header, Body, StatusCode};
use log::{info, error};
use mongodb::Client;
use serde::{Serialize, Deserialize};
use tokio::sync::oneshot::Receiver;
use uuid::Uuid;




pub const APP_NAME: &str = "Swiftx";



/*
  -------------------------------------------------------------------------------
| security related knobs injected into the leaf components at construction time
| instead of being read from ambient process state, so tests can pass
| deterministic fixtures; secrets come out of the environment once, inside main
| -------------------------------------------------------------------------------
*/
#[derive(Clone, Debug)]
pub struct SecurityConfig{
    pub cipher_secret: String, //// server held secret the per-field symmetric key is derived from
    pub token_secret: String, //// HS512 signing secret for session tokens
    pub token_ttl: i64, //// seconds a freshly issued session token stays valid
}



//// attached to the router next to the mongodb client so handlers never go
//// back to the process environment for it
#[derive(Clone, Debug)]
pub struct DbConfig{
    pub name: String,
}



#[derive(Clone, Debug)]
pub struct Db{
    pub mode: Mode,
    pub url: Option<String>,
    pub instance: Option<Client>,
}

impl Default for Db{
    fn default() -> Db{
        Db{
            mode: Mode::Off,
            url: None,
            instance: None,
        }
    }
}

impl Db{

    pub async fn new() -> Result<Db, Box<dyn std::error::Error>>{
        Ok(
            Db{
                mode: Mode::On,
                url: None,
                instance: None,
            }
        )
    }

    pub async fn connect(&self) -> Result<Client, mongodb::error::Error>{
        Client::with_uri_str(self.url.as_deref().unwrap_or_default()).await
    }

}



#[derive(Clone, Debug)]
pub struct Storage{
    pub id: Uuid,
    pub db: Option<Db>, //// we could have no db at all
}

impl Storage{
    pub async fn get_db(&self) -> Option<&Client>{
        match self.db.as_ref()?.mode{
            Mode::On => self.db.as_ref()?.instance.as_ref(),
            Mode::Off => None, //// no db is available cause it's off
        }
    }
}



#[derive(Copy, Clone, Debug)]
pub enum Mode{
    On,
    Off,
}



/*
  ----------------------------------------------------------------------------
| the response envelope every controller serializes into the hyper body; the
| data field is Nill for the error paths and for bodyless success responses
| ----------------------------------------------------------------------------
*/
#[derive(Serialize, Deserialize, Debug)]
pub struct Response<'m, T>{
    pub data: Option<T>,
    pub message: &'m str,
    pub status: u16,
}

#[derive(Serialize, Deserialize)]
pub struct Nill<'n>(pub &'n [u8]); //// empty data for the data field of the Response struct



pub fn json_response<T: Serialize>(status: StatusCode, message: &str, data: Option<T>) -> GenericResult<hyper::Response<Body>, hyper::Error>{
    let response_body = Response::<T>{
        data,
        message,
        status: status.as_u16(),
    };
    let response_body_json = serde_json::to_string(&response_body).unwrap_or_else(|_| String::from("{}"));
    Ok(
        hyper::Response::builder()
            .status(status)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(response_body_json))
            .unwrap_or_default()
    )
}

pub fn error_response(e: AppError) -> GenericResult<hyper::Response<Body>, hyper::Error>{
    let message = e.public_message();
    json_response::<Nill>(e.status(), &message, Some(Nill(&[])))
}



pub async fn shutdown_signal(signal: Receiver<u8>){
    match signal.await{
        Ok(0) => {
            info!("shutting down the server - {}", chrono::Local::now().naive_local());
            if let Err(e) = tokio::signal::ctrl_c().await{
                error!("failed to plugin CTRL+C signal to the server - {}", e);
            }
        },
        Ok(_) => {},
        Err(e) => {
            error!("receiving error: [{}] cause sender is not available - {}", e, chrono::Local::now().naive_local())
        }
    }
}




use crate::contexts as ctx;
use crate::constants::*;
use crate::errors::AppError;
use crate::middlewares;
use crate::schemas::auth::Identity;
use bytes::Buf;
use hyper::{Body, Request, StatusCode};
use mongodb::Client;
use routerify::prelude::RequestExt;




// -------------------------------- submit controller: Client files a new payment application
// ➝ Return : Hyper Response Body or Hyper Error
// -------------------------------------------------------------------------
pub async fn main(req: Request<Body>) -> GenericResult<hyper::Response<Body>, hyper::Error>{

    let claims = match middlewares::auth::pass(&req).await{
        Ok(claims) => claims,
        Err(e) => return ctx::app::error_response(e),
    };
    let identity = Identity::from(claims);

    let Some(db) = req.data::<Client>().cloned() else{
        return ctx::app::error_response(AppError::Internal("no storage is shared with the router".to_string()));
    };
    let Some(config) = req.data::<ctx::app::SecurityConfig>().cloned() else{
        return ctx::app::error_response(AppError::Internal("security config is not shared with the router".to_string()));
    };
    let Some(db_config) = req.data::<ctx::app::DbConfig>().cloned() else{
        return ctx::app::error_response(AppError::Internal("db config is not shared with the router".to_string()));
    };

    let whole_body_bytes = hyper::body::to_bytes(req.into_body()).await?;
    let raw: serde_json::Value = match serde_json::from_reader(whole_body_bytes.reader()){
        Ok(value) => value,
        Err(_) => return ctx::app::json_response::<ctx::app::Nill>(StatusCode::BAD_REQUEST, BAD_REQUEST, Some(ctx::app::Nill(&[]))),
    };
    let Some(raw_fields) = raw.as_object() else{
        return ctx::app::json_response::<ctx::app::Nill>(StatusCode::BAD_REQUEST, BAD_REQUEST, Some(ctx::app::Nill(&[])));
    };

    let workflow = super::build_workflow(db, &config, &db_config.name);
    match workflow.submit(&identity, raw_fields).await{
        Ok(view) => ctx::app::json_response(StatusCode::CREATED, SUBMITTED, Some(view)),
        Err(e) => ctx::app::error_response(e),
    }

}




use crate::contexts as ctx;
use crate::constants::*;
use crate::errors::AppError;
use crate::middlewares;
use crate::schemas::auth::Identity;
use crate::schemas::payment::Status;
use hyper::{Body, Request, StatusCode};
use mongodb::Client;
use routerify::prelude::RequestExt;




fn shared_state(req: &Request<Body>) -> Result<(Client, ctx::app::SecurityConfig, ctx::app::DbConfig), AppError>{
    let db = req.data::<Client>().cloned()
        .ok_or_else(|| AppError::Internal("no storage is shared with the router".to_string()))?;
    let config = req.data::<ctx::app::SecurityConfig>().cloned()
        .ok_or_else(|| AppError::Internal("security config is not shared with the router".to_string()))?;
    let db_config = req.data::<ctx::app::DbConfig>().cloned()
        .ok_or_else(|| AppError::Internal("db config is not shared with the router".to_string()))?;
    Ok((db, config, db_config))
}




// -------------------------------- list controllers: read-only projections, each record decrypted best effort
// ➝ Return : Hyper Response Body or Hyper Error
// -------------------------------------------------------------------------

pub async fn all(req: Request<Body>) -> GenericResult<hyper::Response<Body>, hyper::Error>{

    let claims = match middlewares::auth::pass(&req).await{
        Ok(claims) => claims,
        Err(e) => return ctx::app::error_response(e),
    };
    let identity = Identity::from(claims);
    let (db, config, db_config) = match shared_state(&req){
        Ok(state) => state,
        Err(e) => return ctx::app::error_response(e),
    };

    let workflow = super::build_workflow(db, &config, &db_config.name);
    match workflow.list_all(&identity).await{
        Ok(views) => ctx::app::json_response(StatusCode::OK, FETCHED, Some(views)),
        Err(e) => ctx::app::error_response(e),
    }

}


pub async fn mine(req: Request<Body>) -> GenericResult<hyper::Response<Body>, hyper::Error>{

    let claims = match middlewares::auth::pass(&req).await{
        Ok(claims) => claims,
        Err(e) => return ctx::app::error_response(e),
    };
    let identity = Identity::from(claims);
    let (db, config, db_config) = match shared_state(&req){
        Ok(state) => state,
        Err(e) => return ctx::app::error_response(e),
    };

    let workflow = super::build_workflow(db, &config, &db_config.name);
    match workflow.list_mine(&identity).await{
        Ok(views) => ctx::app::json_response(StatusCode::OK, FETCHED, Some(views)),
        Err(e) => ctx::app::error_response(e),
    }

}


pub async fn by_status(req: Request<Body>) -> GenericResult<hyper::Response<Body>, hyper::Error>{

    let claims = match middlewares::auth::pass(&req).await{
        Ok(claims) => claims,
        Err(e) => return ctx::app::error_response(e),
    };
    let identity = Identity::from(claims);
    let (db, config, db_config) = match shared_state(&req){
        Ok(state) => state,
        Err(e) => return ctx::app::error_response(e),
    };

    let status = match req.param("status").and_then(|raw| Status::from_filter(raw)){
        Some(status) => status,
        None => return ctx::app::error_response(AppError::Validation(INVALID_STATUS_FILTER.to_string())),
    };

    let workflow = super::build_workflow(db, &config, &db_config.name);
    match workflow.list_by_status(&identity, status).await{
        Ok(views) => ctx::app::json_response(StatusCode::OK, FETCHED, Some(views)),
        Err(e) => ctx::app::error_response(e),
    }

}

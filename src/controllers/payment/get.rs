


use crate::contexts as ctx;
use crate::constants::*;
use crate::errors::AppError;
use crate::middlewares;
use crate::schemas::auth::Identity;
use hyper::{Body, Request, StatusCode};
use mongodb::bson::oid::ObjectId;
use mongodb::Client;
use routerify::prelude::RequestExt;




// -------------------------------- get controller: one application, decrypted, for its submitter or any employee
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

    let application_id = match req.param("id").map(|raw| ObjectId::parse_str(raw)){
        Some(Ok(application_id)) => application_id,
        _ => return ctx::app::error_response(AppError::Validation(INVALID_APPLICATION_ID.to_string())),
    };

    let workflow = super::build_workflow(db, &config, &db_config.name);
    match workflow.get(&identity, &application_id).await{
        Ok(view) => ctx::app::json_response(StatusCode::OK, FETCHED, Some(view)),
        Err(e) => ctx::app::error_response(e),
    }

}

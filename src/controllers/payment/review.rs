


use crate::contexts as ctx;
use crate::constants::*;
use crate::errors::AppError;
use crate::middlewares;
use crate::schemas::auth::Identity;
use crate::schemas::payment::ReviewRequest;
use bytes::Buf;
use hyper::{Body, Request, StatusCode};
use mongodb::bson::oid::ObjectId;
use mongodb::Client;
use routerify::prelude::RequestExt;




// -------------------------------- review controller: Employee moves a Pending application to a terminal state
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

    let whole_body_bytes = hyper::body::to_bytes(req.into_body()).await?;
    let review_info: ReviewRequest = match serde_json::from_reader(whole_body_bytes.reader()){
        Ok(review_info) => review_info,
        Err(_) => return ctx::app::json_response::<ctx::app::Nill>(StatusCode::BAD_REQUEST, BAD_REQUEST, Some(ctx::app::Nill(&[]))),
    };

    let workflow = super::build_workflow(db, &config, &db_config.name);
    match workflow.review(&identity, &application_id, &review_info.decision, review_info.comments).await{
        Ok(view) => ctx::app::json_response(StatusCode::OK, REVIEWED, Some(view)),
        Err(e) => ctx::app::error_response(e),
    }

}

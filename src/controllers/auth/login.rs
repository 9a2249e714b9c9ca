


use crate::contexts as ctx;
use crate::constants::*;
use crate::errors::AppError;
use crate::schemas;
use crate::utils;
use bytes::Buf;
use chrono::Utc;
use hyper::{Body, Request, StatusCode};
use mongodb::bson::doc;
use mongodb::Client;
use routerify::prelude::RequestExt;




// -------------------------------- login controller
// ➝ Return : Hyper Response Body or Hyper Error
// -------------------------------------------------------------------------
pub async fn main(req: Request<Body>) -> GenericResult<hyper::Response<Body>, hyper::Error>{

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
    let login_info: schemas::auth::LoginRequest = match serde_json::from_reader(whole_body_bytes.reader()){
        Ok(login_info) => login_info,
        Err(_) => return ctx::app::json_response::<ctx::app::Nill>(StatusCode::BAD_REQUEST, BAD_REQUEST, Some(ctx::app::Nill(&[]))),
    };

    ////////////////////////////////// DB Ops

    let users = db.database(&db_config.name).collection::<schemas::auth::UserInfo>("users");
    let user_doc = match users.find_one(doc!{"username": login_info.username.clone()}, None).await{
        Ok(Some(user_doc)) => user_doc,
        //// unknown username and wrong password answer identically; no oracle
        Ok(None) => return ctx::app::error_response(AppError::AuthInvalid),
        Err(e) => return ctx::app::error_response(e.into()),
    };

    match utils::pswd::verify(&login_info.password, &user_doc.pwd).await{
        Ok(true) => {},
        Ok(false) => return ctx::app::error_response(AppError::AuthInvalid),
        Err(e) => return ctx::app::error_response(e),
    }

    let (iat, exp) = utils::jwt::gen_times(config.token_ttl).await;
    let jwt_payload = utils::jwt::Claims{
        _id: user_doc._id,
        username: user_doc.username.clone(),
        role: user_doc.role,
        iat,
        exp,
    };
    let token = match utils::jwt::construct(jwt_payload, &config.token_secret).await{
        Ok(token) => token,
        Err(e) => return ctx::app::error_response(AppError::Internal(format!("token issuance failed - {e}"))),
    };

    let now = Utc::now().timestamp();
    if let Err(e) = users.update_one(doc!{"username": user_doc.username.clone()}, doc!{"$set": {"last_login_time": Some(now)}}, None).await{
        log::warn!("couldn't stamp last login time - {}", e); //// login still succeeds, the stamp is best effort
    }

    let response = schemas::auth::LoginResponse{
        _id: user_doc._id,
        access_token: token,
        username: user_doc.username,
        role: user_doc.role,
        last_login_time: Some(now),
    };
    ctx::app::json_response(StatusCode::OK, ACCESS_GRANTED, Some(response))

    //////////////////////////////////

}




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




// -------------------------------- signup controller
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
    let raw: serde_json::Value = match serde_json::from_reader(whole_body_bytes.reader()){
        Ok(value) => value,
        Err(_) => return ctx::app::json_response::<ctx::app::Nill>(StatusCode::BAD_REQUEST, BAD_REQUEST, Some(ctx::app::Nill(&[]))),
    };
    let Some(raw_fields) = raw.as_object() else{
        return ctx::app::json_response::<ctx::app::Nill>(StatusCode::BAD_REQUEST, BAD_REQUEST, Some(ctx::app::Nill(&[])));
    };

    //// whitelist first so a smuggled role or status never reaches validation,
    //// then the all-or-nothing format check in schema order
    let fields = utils::gate::sanitize(raw_fields, utils::gate::IDENTITY_ALLOWED);
    if let Err(errors) = utils::gate::validate(&fields, utils::gate::IDENTITY_SCHEMA){
        return ctx::app::error_response(AppError::Validation(errors.into_iter().next().unwrap_or_default()));
    }
    let field = |name: &str| fields.get(name).and_then(utils::gate::field_as_string).unwrap_or_default();

    ////////////////////////////////// DB Ops

    let users = db.database(&db_config.name).collection::<schemas::auth::UserInfo>("users");
    //// the collection is the source of truth for username conflicts
    match users.find_one(doc!{"username": field("username")}, None).await{
        Ok(Some(_)) => return ctx::app::json_response::<ctx::app::Nill>(StatusCode::CONFLICT, USERNAME_TAKEN, Some(ctx::app::Nill(&[]))),
        Ok(None) => {},
        Err(e) => return ctx::app::error_response(e.into()),
    }

    let hashed_pwd = match utils::pswd::hash(&field("password")).await{
        Ok(hashed) => hashed,
        Err(e) => return ctx::app::error_response(e),
    };

    let cipher = utils::cipher::FieldCipher::new(&config.cipher_secret);
    let encrypted = (
        cipher.encrypt(&field("full_name")),
        cipher.encrypt(&field("accountNumber")),
        cipher.encrypt(&field("IDNumber")),
    );
    let (full_name, account_number, id_number) = match encrypted{
        (Ok(full_name), Ok(account_number), Ok(id_number)) => (full_name, account_number, id_number),
        _ => return ctx::app::error_response(AppError::Internal("field encryption failed during signup".to_string())),
    };

    let user = schemas::auth::UserInfo{
        _id: None,
        username: field("username"),
        pwd: hashed_pwd,
        full_name,
        account_number,
        id_number,
        role: schemas::auth::Role::Client, //// every signup is a client; employees are provisioned out of band
        created_at: Some(Utc::now().timestamp()),
        last_login_time: None,
    };
    match users.insert_one(&user, None).await{
        Ok(result) => {
            let response = schemas::auth::RegisterResponse{
                _id: result.inserted_id.as_object_id(),
                username: user.username,
                role: user.role,
                created_at: user.created_at,
            };
            ctx::app::json_response(StatusCode::CREATED, REGISTERED, Some(response))
        },
        Err(e) => ctx::app::error_response(e.into()),
    }

    //////////////////////////////////

}

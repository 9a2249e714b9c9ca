


use crate::contexts as ctx;
use crate::constants::*;
use crate::middlewares;
use hyper::{Body, Request, StatusCode};




// -------------------------------- home controller: authenticated ping
// ➝ Return : Hyper Response Body or Hyper Error
// -------------------------------------------------------------------------
pub async fn main(req: Request<Body>) -> GenericResult<hyper::Response<Body>, hyper::Error>{

    match middlewares::auth::pass(&req).await{
        Ok(claims) => ctx::app::json_response(StatusCode::OK, WELCOME, Some(claims)),
        Err(e) => ctx::app::error_response(e),
    }

}




use crate::contexts as ctx;
use crate::constants::*;
use hyper::{Body, Request, StatusCode};




// -------------------------------- not found controller
// ➝ Return : Hyper Response Body or Hyper Error
// -------------------------------------------------------------------------
pub async fn main(_req: Request<Body>) -> GenericResult<hyper::Response<Body>, hyper::Error>{

    ctx::app::json_response::<ctx::app::Nill>(StatusCode::NOT_FOUND, NOT_FOUND_ROUTE, Some(ctx::app::Nill(&[])))

}




/*
    --------------------------------------------------------------------------
   |                    REGISTER HANDLER FOR PAYMENT ROUTER
   |--------------------------------------------------------------------------
   |
   |    job    : the following registers a router requested by the client
   |    return : a Router of type either hyper response body or error response
   |
   | every route here requires a bearer token; the fixed projections
   | (/get/all, /get/mine, /get/status/:status) are registered before the
   | /get/:id catch so routerify never mistakes them for an application id.
   |
*/



use routerify::{Router, Middleware};
use hyper::Body;
use crate::middlewares;
use crate::controllers::payment::{
                                  submit::main as submit,
                                  review::main as review,
                                  get::main as get_one,
                                  list,
                                  _404::main as not_found,
                               };




pub async fn register() -> Router<Body, hyper::Error>{

    Router::builder()
        .middleware(Middleware::post(middlewares::cors::allow))
        .middleware(Middleware::pre(middlewares::logging::logger))
        .post("/submit", submit)
        .get("/get/all", list::all)
        .get("/get/mine", list::mine)
        .get("/get/status/:status", list::by_status)
        .get("/get/:id", get_one)
        .patch("/review/:id", review)
        .any(not_found) //// handling 404 request
        .build()
        .expect("⚠️ can't build the payment router")

}




/*
    --------------------------------------------------------------------------
   |                      REGISTER HANDLER FOR AUTH ROUTER
   |--------------------------------------------------------------------------
   |
   |    job    : the following registers a router requested by the client
   |    return : a Router of type either hyper response body or error response
   |
   | signup and login are the only public routes of the whole server; home is
   | the authenticated ping. the shared states (mongodb client and the security
   | config) are attached once from main.rs and travel with every request.
   |
*/



use routerify::{Router, Middleware};
use hyper::Body;
use crate::middlewares;
use crate::controllers::auth::{
                               signup::main as signup,
                               login::main as login,
                               home::main as home,
                               _404::main as not_found,
                            };




pub async fn register() -> Router<Body, hyper::Error>{

    Router::builder()
        .middleware(Middleware::post(middlewares::cors::allow)) //// post middlewares run after the handlers and get to touch the response
        .middleware(Middleware::pre(middlewares::logging::logger)) //// pre middlewares run before any handler and get to touch the request
        .post("/signup", signup)
        .post("/login", login)
        .get("/home", home)
        .any(not_found) //// handling 404 request
        .build()
        .expect("⚠️ can't build the auth router")

}

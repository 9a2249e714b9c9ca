




pub mod cors{

    use crate::constants::*;
    use hyper::{header, Body, Response, http::HeaderValue};



    ///// CORS middleware allow method - by adding this api to the router config we're allowing the client to access all resources of that router

    pub async fn allow(mut res: Response<Body>) -> GenericResult<Response<Body>, hyper::Error>{
        let headers = res.headers_mut();
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
        headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static("*"));
        headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("*"));
        headers.insert(header::ACCESS_CONTROL_EXPOSE_HEADERS, HeaderValue::from_static("*"));
        Ok(res)
    }

}




pub mod logging{

    use log::info;
    use hyper::{Body, Request};
    use routerify::prelude::RequestExt;

    pub async fn logger(req: Request<Body>) -> Result<Request<Body>, hyper::Error>{
        info!("{} - {} {} {}", chrono::Local::now(), req.remote_addr(), req.method(), req.uri().path());
        Ok(req)
    }

}




pub mod auth{

    use hyper::{Body, Request};
    use routerify::prelude::RequestExt;
    use crate::contexts::app::SecurityConfig;
    use crate::errors::AppError;
    use crate::utils::jwt;



    /*
      -------------------------------------------------------------------------------
    | recovers the verified identity claims out of the bearer header; a missing,
    | malformed, badly signed or expired token is always the same AuthInvalid
    | denial so the response gives no oracle about which check tripped
    | -------------------------------------------------------------------------------
    */
    //// the scheme must be the whole first word; "Bearerabc" is not a bearer header
    pub fn extract_token(authen_str: &str) -> Option<&str>{
        authen_str.strip_prefix("Bearer ")
            .or_else(|| authen_str.strip_prefix("bearer "))
            .map(str::trim)
    }

    pub async fn pass(req: &Request<Body>) -> Result<jwt::Claims, AppError>{
        let config = req.data::<SecurityConfig>()
            .ok_or_else(|| AppError::Internal("security config is not shared with the router".to_string()))?;
        let authen_header = req.headers().get("Authorization").ok_or(AppError::AuthInvalid)?;
        let authen_str = authen_header.to_str().map_err(|_| AppError::AuthInvalid)?;
        let token = extract_token(authen_str).ok_or(AppError::AuthInvalid)?;
        let token_data = jwt::deconstruct(token, &config.token_secret).await.map_err(|_| AppError::AuthInvalid)?;
        Ok(token_data.claims)
    }

}

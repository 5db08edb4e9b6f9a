//! Middleware sending anonymous visitors to the sign-in page.

use std::future::{Future, Ready, ready};
use std::pin::Pin;
use std::rc::Rc;

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::http::{StatusCode, header};
use actix_web::{Error, HttpResponse};

/// Location of the sign-in page served by the auth service.
pub const SIGNIN_PATH: &str = "/auth/signin";

/// Turns `401 Unauthorized` responses into a redirect to [`SIGNIN_PATH`].
pub struct RedirectUnauthorized;

impl<S, B> Transform<S, ServiceRequest> for RedirectUnauthorized
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RedirectUnauthorizedMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RedirectUnauthorizedMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct RedirectUnauthorizedMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RedirectUnauthorizedMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let res = service.call(req).await?;

            if res.status() != StatusCode::UNAUTHORIZED {
                return Ok(res.map_into_left_body());
            }

            let (request, _) = res.into_parts();
            let redirect = HttpResponse::SeeOther()
                .insert_header((header::LOCATION, SIGNIN_PATH))
                .finish()
                .map_into_right_body();
            Ok(ServiceResponse::new(request, redirect))
        })
    }
}

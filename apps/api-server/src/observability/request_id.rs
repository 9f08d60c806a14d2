//! Echo the per-request ID that `TracingLogger` puts on the root span.

use actix_web::{
    Error, HttpMessage,
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    http::header::{HeaderName, HeaderValue},
    middleware::Next,
};
use tracing_actix_web::RequestId;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Copy the request ID into the `X-Request-ID` response header so clients
/// can quote it when reporting a problem. Must be wrapped inside
/// `TracingLogger`.
pub async fn stamp_request_id(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let request_id = req.extensions().get::<RequestId>().copied();

    let mut res = next.call(req).await?;

    if let Some(value) = request_id.and_then(|id| HeaderValue::from_str(&id.to_string()).ok()) {
        res.headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }

    Ok(res)
}

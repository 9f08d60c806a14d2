//! Observability - request IDs on responses.

mod request_id;

pub use request_id::{REQUEST_ID_HEADER, stamp_request_id};

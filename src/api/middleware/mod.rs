pub mod request_id;

pub use request_id::{REQUEST_ID_HEADER, RequestId, RequestTracing, is_valid_request_id};

//! Request decorators that attach LMS API credentials.

mod api_key;

pub use api_key::ApiKey;

//! REST transport shared by all venue adapters.

mod client;
pub mod signer;

pub use client::HttpClient;
pub use signer::{build_query_string, sign_request, PassphraseSigner, RequestSigner, SignableRequest};

// Google Docs / Drive integration.
//
// Two APIs are involved because creation and sharing are separate Google
// products: documents are created and formatted through the Docs v1 API,
// permissions are granted through the Drive v3 API. Both are called with a
// bearer token minted from the resolved service-account credential.

pub mod auth;
pub mod docs_client;

pub use docs_client::GoogleDocsApiClient;

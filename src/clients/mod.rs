pub mod csrf;
pub mod test_api_client;
pub mod test_service;

pub use test_api_client::TestApiClient;
pub use test_service::TestService;

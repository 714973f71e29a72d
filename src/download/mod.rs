pub mod github;
pub mod http;

mod auth_method;
mod request;
mod response;

pub mod password_method;

pub use self::{auth_method::AuthMethod, request::Request as HandshakeRequest, response::Response as HandshakeResponse};

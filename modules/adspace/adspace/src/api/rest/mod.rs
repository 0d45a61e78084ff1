pub mod auth;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod problem;
pub mod routes;

pub use auth::{AgencyPrincipal, Claims, CompanyPrincipal, Role, TokenVerifier};
pub use problem::{ApiResult, Problem};
pub use routes::router;

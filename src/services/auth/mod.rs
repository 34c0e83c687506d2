pub mod claims;
pub mod factory;
pub mod jwt;
pub mod token_issuer;

pub use claims::{Claim, Identity, TokenValidation};
pub use factory::build_auth_services;
pub use jwt::{AccessTokenCodec, TokenCodecError};
pub use token_issuer::{AccessTokenIssuer, IssuedAccessToken, Principal};

/// Factory: build the token codec and issuer from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::services::auth::{AccessTokenCodec, AccessTokenIssuer};
use crate::services::clock::Clock;

pub fn build_auth_services(
    config: &Config,
    clock: Arc<dyn Clock>,
) -> (Arc<AccessTokenCodec>, Arc<AccessTokenIssuer>) {
    let codec = Arc::new(AccessTokenCodec::new(
        config.access_token_secret.as_bytes(),
        clock.clone(),
    ));
    let issuer = Arc::new(AccessTokenIssuer::new(
        codec.clone(),
        clock,
        config.access_token_validity,
    ));

    (codec, issuer)
}

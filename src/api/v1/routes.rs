/*
 * Responsibility
 * - v1 の URL 構造と、ルートごとの認証ポリシーを同じ場所で宣言する
 * - anonymous にしたいものは group 単位 (allow_anonymous) か handler 単位 (anonymous) で明示する
 */
use axum::{
    http::Method,
    routing::{get, post},
};

use crate::api::v1::handlers::{
    account::{log_in, me, sign_up},
    authors::get_author,
    books::{create_book, delete_book, get_book, update_book},
    health::health,
};
use crate::middleware::auth::policy::{Endpoints, RouteGroup};
use crate::state::AppState;

pub const PREFIX: &str = "/api/v1";

pub fn routes() -> Endpoints<AppState> {
    Endpoints::new()
        .group(
            RouteGroup::new("")
                .allow_anonymous()
                .route("/health", get(health)),
        )
        .group(
            RouteGroup::new(format!("{PREFIX}/account"))
                .route("/signup", post(sign_up))
                .route("/login", post(log_in))
                .route("/me", get(me))
                .anonymous(Method::POST, "/signup")
                .anonymous(Method::POST, "/login"),
        )
        .group(
            RouteGroup::new(format!("{PREFIX}/book"))
                .route("/", post(create_book))
                .route(
                    "/{id}",
                    get(get_book).put(update_book).delete(delete_book),
                ),
        )
        .group(
            RouteGroup::new(format!("{PREFIX}/author"))
                .allow_anonymous()
                .route("/{id}", get(get_author)),
        )
}

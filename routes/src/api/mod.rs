pub mod auth;
pub mod me;
pub mod merchant;
pub mod category;
pub mod promo;
pub mod product;
pub mod review;

use axum::{extract::DefaultBodyLimit, routing::{delete, get, post, put}, Router};

pub fn api_routes(ctx: lokanala::Context) -> Router {
	use crate::api as api;

	// a review can carry several photos plus its text fields
	let body_limit = ctx.cfg().storage.max_upload_bytes * (ctx.cfg().storage.max_review_photos + 1);

	Router::new()
		.route("/auth", put(api::auth::register))
		.route("/auth", post(api::auth::login))
		.route("/auth", delete(api::auth::logout))
		.nest("/me", Router::new()
			.route("/notifications", get(api::me::notifications))
			.route("/merchants", get(api::me::merchants))
			.route("/following", get(api::me::following))
		)
		.route("/merchant-categories", get(api::merchant::categories))
		.route("/merchants", get(api::merchant::list))
		.route("/merchants", post(api::merchant::create))
		.nest("/merchants/{id}", Router::new()
			.route("/", get(api::merchant::view))
			.route("/", delete(api::merchant::remove))
			.route("/rating", get(api::merchant::rating))
			.route("/products", get(api::merchant::products))
			.route("/promos", get(api::merchant::promos))
			.route("/promos", post(api::promo::create))
			.route("/follow", post(api::merchant::follow))
			.route("/follow", delete(api::merchant::unfollow))
			.route("/follow", get(api::merchant::following))
			.route("/followers", get(api::merchant::followers))
			.route("/categories", get(api::category::list))
			.route("/categories/order", put(api::category::reorder))
		)
		.route("/categories", post(api::category::create))
		.route("/categories/{id}", put(api::category::update))
		.route("/categories/{id}", delete(api::category::remove))
		.route("/promos/{id}", get(api::promo::view))
		.route("/promos/{id}", put(api::promo::update))
		.route("/promos/{id}", delete(api::promo::remove))
		.route("/products", post(api::product::create))
		.nest("/products/{id}", Router::new()
			.route("/", get(api::product::view))
			.route("/", put(api::product::update))
			.route("/", delete(api::product::remove))
			.route("/rating", get(api::product::rating))
			.route("/reviews", get(api::product::reviews))
		)
		.route("/reviews", post(api::review::create))
		.route("/reviews/{id}", put(api::review::update))
		.route("/reviews/{id}", delete(api::review::remove))
		.layer(DefaultBodyLimit::max(body_limit))
		.with_state(ctx)
}

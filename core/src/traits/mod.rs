pub mod rate;
pub mod review;
pub mod follow;
pub mod notify;
pub mod category;
pub mod merchant;
pub mod product;
pub mod promo;
pub mod admin;

pub use rate::Ratings;
pub use review::Reviewer;
pub use follow::Follows;
pub use notify::Notifier;
pub use category::Categories;
pub use merchant::Merchants;
pub use product::Products;
pub use promo::Promos;
pub use admin::Administrable;

use lokanala::{model, traits::rate::Rating};

type Timestamp = chrono::DateTime<chrono::Utc>;

#[derive(Debug, Clone, serde::Serialize)]
pub struct UserView {
	pub id: i64,
	pub name: String,
	pub email: String,
	pub phone: Option<String>,
	pub photo: Option<String>,
	pub created: Timestamp,
}

impl From<model::user::Model> for UserView {
	fn from(x: model::user::Model) -> Self {
		UserView {
			id: x.id,
			name: x.name,
			email: x.email,
			phone: x.phone,
			photo: x.photo,
			created: x.created,
		}
	}
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct AuthorView {
	pub id: i64,
	pub name: String,
	pub photo: Option<String>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct CategoryView {
	pub id: i64,
	pub name: String,
}

impl From<model::merchant_category::Model> for CategoryView {
	fn from(x: model::merchant_category::Model) -> Self {
		CategoryView { id: x.id, name: x.name }
	}
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct MerchantView {
	pub id: i64,
	pub owner: i64,
	pub category: i64,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub category_name: Option<String>,
	pub name: String,
	pub address: Option<String>,
	pub phone: Option<String>,
	pub description: Option<String>,
	pub location: Option<String>,
	pub image: Option<String>,
	pub registered: Timestamp,
	pub rating: Rating,
}

impl MerchantView {
	pub fn new(x: model::merchant::Model, category: Option<model::merchant_category::Model>, rating: Rating) -> Self {
		MerchantView {
			id: x.id,
			owner: x.owner,
			category: x.category,
			category_name: category.map(|c| c.name),
			name: x.name,
			address: x.address,
			phone: x.phone,
			description: x.description,
			location: x.location,
			image: x.image,
			registered: x.registered,
			rating,
		}
	}
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ProductCategoryView {
	pub id: i64,
	pub merchant: i64,
	pub name: String,
	pub description: Option<String>,
	pub position: i32,
}

impl From<model::product_category::Model> for ProductCategoryView {
	fn from(x: model::product_category::Model) -> Self {
		ProductCategoryView {
			id: x.id,
			merchant: x.merchant,
			name: x.name,
			description: x.description,
			position: x.position,
		}
	}
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ProductView {
	pub id: i64,
	pub merchant: i64,
	pub category: Option<i64>,
	pub name: String,
	pub description: Option<String>,
	pub price: i64,
	pub images: Vec<String>,
	pub created: Timestamp,
	pub rating: Rating,
}

impl ProductView {
	pub fn new(x: model::product::Model, rating: Rating) -> Self {
		ProductView {
			images: x.images(),
			id: x.id,
			merchant: x.merchant,
			category: x.category,
			name: x.name,
			description: x.description,
			price: x.price,
			created: x.created,
			rating,
		}
	}
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct PromoView {
	pub id: i64,
	pub merchant: i64,
	pub name: String,
	pub description: Option<String>,
	pub terms: Option<String>,
	pub instructions: Option<String>,
	pub starts: Option<chrono::NaiveDate>,
	pub ends: Option<chrono::NaiveDate>,
	pub created: Timestamp,
	pub active: bool,
}

impl From<model::promo::Model> for PromoView {
	fn from(x: model::promo::Model) -> Self {
		PromoView {
			active: x.is_active(chrono::Utc::now().date_naive()),
			id: x.id,
			merchant: x.merchant,
			name: x.name,
			description: x.description,
			terms: x.terms,
			instructions: x.instructions,
			starts: x.starts,
			ends: x.ends,
			created: x.created,
		}
	}
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ReviewView {
	pub id: i64,
	pub product: i64,
	pub user: i64,
	pub rating: i32,
	pub comment: String,
	pub photos: Vec<String>,
	pub published: Timestamp,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub author: Option<AuthorView>,
}

impl ReviewView {
	pub fn new(x: model::review::Model, author: Option<model::user::Model>) -> Self {
		ReviewView {
			photos: x.photos(),
			id: x.id,
			product: x.product,
			user: x.user,
			rating: x.rating,
			comment: x.comment,
			published: x.published,
			author: author.map(|u| AuthorView { id: u.id, name: u.name, photo: u.photo }),
		}
	}
}

impl From<model::review::Model> for ReviewView {
	fn from(x: model::review::Model) -> Self {
		ReviewView::new(x, None)
	}
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct NotificationView {
	pub id: i64,
	#[serde(rename = "type")]
	pub kind: &'static str,
	pub reference: Option<i64>,
	pub title: String,
	pub body: String,
	pub created: Timestamp,
	pub delivered: Timestamp,
}

impl NotificationView {
	pub fn new(delivery: model::delivery::Model, notification: model::notification::Model) -> Self {
		NotificationView {
			id: notification.id,
			kind: notification.kind.tag(),
			reference: notification.reference,
			title: notification.title,
			body: notification.body,
			created: notification.created,
			delivered: delivery.delivered,
		}
	}
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct FollowedView {
	pub merchant: MerchantView,
	pub active_promos: Vec<PromoView>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct FollowState {
	pub merchant: i64,
	pub following: bool,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct FollowersView {
	pub merchant: i64,
	pub count: usize,
	pub followers: Vec<i64>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct MerchantDetail {
	#[serde(flatten)]
	pub merchant: MerchantView,
	pub promos: Vec<PromoView>,
	pub products: Vec<ProductView>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ProductDetail {
	#[serde(flatten)]
	pub product: ProductView,
	pub merchant_name: Option<String>,
	pub top_review: Option<ReviewView>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct AuthSuccess {
	pub token: String,
	pub user: i64,
	pub expires: Timestamp,
}

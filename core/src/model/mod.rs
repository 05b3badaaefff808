pub mod user;
pub mod session;

pub mod merchant_category;
pub mod merchant;
pub mod product_category;
pub mod product;
pub mod promo;

pub mod review;
pub mod follow;

pub mod notification;
pub mod delivery;

/// files are stored as a single comma joined column, a legacy multi-image encoding
pub fn join_files(files: &[String]) -> Option<String> {
	if files.is_empty() {
		None
	} else {
		Some(files.join(","))
	}
}

pub fn split_files(joined: Option<&str>) -> Vec<String> {
	joined
		.unwrap_or_default()
		.split(',')
		.map(str::trim)
		.filter(|x| !x.is_empty())
		.map(str::to_string)
		.collect()
}

#[cfg(test)]
mod test {
	#[test]
	fn files_column_skips_empty_segments() {
		assert_eq!(super::split_files(Some("a.jpg,,b.png, ")), vec!["a.jpg".to_string(), "b.png".to_string()]);
		assert!(super::split_files(None).is_empty());
		assert_eq!(super::join_files(&[]), None);
		assert_eq!(super::join_files(&["a.jpg".into(), "b.png".into()]).as_deref(), Some("a.jpg,b.png"));
	}
}

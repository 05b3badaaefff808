use std::{collections::HashMap, str::FromStr};

use axum::extract::Multipart;

use crate::{ApiError, ApiResult};

/// A multipart body with its files already stored. Handlers that fail after collecting
/// must `abandon` the form so stored files don't leak.
#[derive(Debug, Default)]
pub struct Form {
	fields: HashMap<String, Vec<String>>,
	files: Vec<String>,
}

impl Form {
	pub fn text(&self, name: &str) -> Option<String> {
		self.fields
			.get(name)
			.and_then(|x| x.first())
			.map(|x| x.trim().to_string())
			.filter(|x| !x.is_empty())
	}

	pub fn all(&self, name: &str) -> Vec<String> {
		self.fields
			.get(name)
			.map(|x| x.iter().flat_map(|v| v.split(',')).map(|v| v.trim().to_string()).filter(|v| !v.is_empty()).collect())
			.unwrap_or_default()
	}

	pub fn parse<T: FromStr>(&self, name: &str) -> ApiResult<Option<T>> {
		match self.text(name) {
			None => Ok(None),
			Some(x) => x.parse()
				.map(Some)
				.map_err(|_| ApiError::bad_request(format!("invalid value for '{name}'"))),
		}
	}

	pub fn require<T: FromStr>(&self, name: &str) -> ApiResult<T> {
		self.parse(name)?
			.ok_or_else(|| ApiError::bad_request(format!("missing field '{name}'")))
	}

	pub fn files(&self) -> &[String] {
		&self.files
	}

	pub fn first_file(&self) -> Option<String> {
		self.files.first().cloned()
	}

	/// give up on this form: discard what it stored and pass the error along
	pub async fn abandon(self, ctx: &lokanala::Context, err: ApiError) -> ApiError {
		ctx.storage().discard_all(&self.files).await;
		err
	}
}

/// read a multipart body, storing up to `max_files` files found under `file_field`
pub async fn collect(ctx: &lokanala::Context, mut multipart: Multipart, file_field: &str, max_files: usize) -> ApiResult<Form> {
	let mut form = Form::default();
	loop {
		let field = match multipart.next_field().await {
			Ok(Some(field)) => field,
			Ok(None) => break,
			Err(e) => return Err(form.abandon(ctx, e.into()).await),
		};

		let name = field.name().unwrap_or_default().to_string();
		let file_name = field.file_name().map(str::to_string);

		match file_name {
			Some(original) if name == file_field => {
				if form.files.len() >= max_files {
					let err = ApiError::bad_request(format!("at most {max_files} files allowed in '{file_field}'"));
					return Err(form.abandon(ctx, err).await);
				}
				let bytes = match field.bytes().await {
					Ok(x) => x,
					Err(e) => return Err(form.abandon(ctx, e.into()).await),
				};
				if bytes.is_empty() {
					continue; // clients send empty parts for unset file inputs
				}
				match ctx.storage().save(&original, &bytes).await {
					Ok(stored) => form.files.push(stored),
					Err(e) => return Err(form.abandon(ctx, e.into()).await),
				}
			},
			_ => {
				let text = match field.text().await {
					Ok(x) => x,
					Err(e) => return Err(form.abandon(ctx, e.into()).await),
				};
				form.fields.entry(name).or_default().push(text);
			},
		}
	}
	Ok(form)
}

#[cfg(test)]
mod test {
	#[test]
	fn repeated_and_comma_joined_fields_flatten() {
		let mut form = super::Form::default();
		form.fields.insert("keep_photos".into(), vec!["a.png,b.png".into(), " c.png ".into()]);
		form.fields.insert("rating".into(), vec![" 4 ".into()]);
		form.fields.insert("comment".into(), vec!["   ".into()]);
		assert_eq!(form.all("keep_photos"), vec!["a.png", "b.png", "c.png"]);
		assert_eq!(form.require::<i32>("rating").unwrap(), 4);
		assert!(form.text("comment").is_none());
		assert!(form.require::<i64>("missing").is_err());
		assert!(form.parse::<i64>("rating").is_ok());
	}
}

//! Federated identity for Rust: plug any OAuth 2.0 provider in behind one trait and get
//! canonical, scope-checked claims out.
//!
//! The crate sits between a login flow and an external identity provider. A login flow asks a
//! [`provider::Provider`] for its [`oauth::ClientConfig`], performs the authorization-code
//! exchange with the `oauth2` crate, and hands the resulting [`oauth::TokenExchange`] back to
//! [`provider::Provider::claims`], which enforces the configured scopes, fetches the user
//! profile, and normalizes it into [`claims::Claims`].

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod claims;
pub mod config;
pub mod context;
pub mod deps;
pub mod error;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod provider;
pub mod scope;
pub mod secret;

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::RwLock;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};

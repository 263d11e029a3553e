//! # bqxfer-auth
//!
//! Service account authentication for bqxfer.
//!
//! A service account key file is read, a JWT assertion is signed with its private key and
//! exchanged at the key's `token_uri` for a bearer token. Tokens are cached and refreshed
//! shortly before expiry.
//!
//! ```rust
//! use bqxfer_auth::project::Config;
//! use bqxfer_auth::token::DefaultTokenSourceProvider;
//!
//! async fn run() {
//!     let scopes = ["https://www.googleapis.com/auth/bigquery"];
//!     let config = Config::default().with_scopes(&scopes);
//!     let tsp = DefaultTokenSourceProvider::new_with_credentials_file(config, "key.json").await.unwrap();
//! }
//! ```
pub mod credentials;
pub mod error;
pub mod project;
pub mod token;
pub mod token_source;

// Library root
// -----------
// A small Pocket client plus an interactive tool for renaming saved
// items. The binary (`main.rs`) wires these modules together.
//
// Module responsibilities:
// - `api`: one authenticated JSON POST against the Pocket v3 API.
// - `auth`: the credential and the token handshake.
// - `article` / `store`: saved items and the operations on them, including
//   rename (delete, then save again under the new title).
// - `config`: the JSON config file the credential is kept in.
// - `console`: line-based prompts shared by authorization and the fallback UI.
// - `worker`: runs blocking calls off the interactive loop.
// - `ui`: the full-screen list and its line-based fallback.
pub mod api;
pub mod article;
pub mod auth;
pub mod config;
pub mod console;
pub mod error;
pub mod store;
pub mod ui;
pub mod worker;

pub use api::{ApiClient, Transport};
pub use article::{Article, NewArticle};
pub use auth::{Authorizer, Credential};
pub use error::PocketError;
pub use store::{ArticleStore, ItemState};

// Typed operations on the saved-items list, built on a `Transport`.

use crate::api::{to_params, Params, Transport, ADD_PATH, GET_PATH, SEND_PATH};
use crate::article::{Article, NewArticle};
use crate::auth::Credential;
use crate::error::PocketError;
use serde_json::{json, Value};

/// Server-side state filter for `list`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ItemState {
    #[default]
    Unread,
    Archive,
    All,
}

impl ItemState {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemState::Unread => "unread",
            ItemState::Archive => "archive",
            ItemState::All => "all",
        }
    }
}

/// The saved-items list of one authorized user.
///
/// Cheap to clone so a copy can be moved onto a worker thread.
#[derive(Clone)]
pub struct ArticleStore<T: Transport> {
    transport: T,
    credential: Credential,
}

impl<T: Transport> ArticleStore<T> {
    pub fn new(transport: T, credential: Credential) -> Self {
        ArticleStore { transport, credential }
    }

    /// Fetch every item in `state`, in the order the service listed them.
    pub fn list(&self, state: ItemState) -> Result<Vec<Article>, PocketError> {
        let params = to_params(json!({"detailType": "complete", "state": state.as_str()}));
        let body = self.call(GET_PATH, params)?;
        match body.get("list") {
            Some(Value::Object(items)) => items
                .iter()
                .map(|(item_id, data)| Article::from_listing(item_id, data))
                .collect(),
            // An empty list comes back as `[]` instead of `{}`.
            Some(Value::Array(items)) if items.is_empty() => Ok(Vec::new()),
            _ => Err(PocketError::unexpected("listing has no `list` mapping")),
        }
    }

    /// Save a new item.
    ///
    /// `/add` cannot take a timestamp, so a request carrying `time_added`
    /// goes through the batched `add` action instead.
    pub fn add(&self, request: &NewArticle) -> Result<Article, PocketError> {
        let mut fields = to_params(json!({"url": request.url}));
        if let Some(title) = request.title.as_deref().filter(|t| !t.is_empty()) {
            fields.insert("title".into(), title.into());
        }
        if !request.tags.is_empty() {
            fields.insert("tags".into(), request.tags.join(",").into());
        }

        match &request.time_added {
            Some(time) => {
                fields.insert("time".into(), time.clone().into());
                let outcome = self.send_action("add", fields)?;
                if outcome.is_object() {
                    Article::from_added(&outcome, request)
                } else {
                    Err(PocketError::ActionRejected { action: "add".into() })
                }
            }
            None => {
                let body = self.call(ADD_PATH, fields)?;
                let item = body
                    .get("item")
                    .ok_or_else(|| PocketError::unexpected("add response has no item"))?;
                Article::from_added(item, request)
            }
        }
    }

    pub fn delete(&self, article: &Article) -> Result<bool, PocketError> {
        let fields = to_params(json!({"item_id": article.item_id}));
        Ok(succeeded(&self.send_action("delete", fields)?))
    }

    pub fn add_tags(&self, article: &Article, tags: &[String]) -> Result<bool, PocketError> {
        let fields = to_params(json!({"item_id": article.item_id, "tags": tags.join(",")}));
        Ok(succeeded(&self.send_action("tags_add", fields)?))
    }

    /// Rename by deleting `article` and saving it again under `new_name`,
    /// keeping its tags and the time it was first added.
    ///
    /// This is two calls and not atomic. If the delete goes through and the
    /// add fails, the item is gone and the add's error is returned as is.
    /// A rejected delete stops before anything is lost.
    pub fn rename(&self, article: &Article, new_name: &str, clean_url: bool) -> Result<Article, PocketError> {
        let replacement = NewArticle {
            url: article.canonical_url(clean_url).to_string(),
            title: Some(new_name.to_string()),
            tags: article.tags.clone(),
            time_added: article.time_added.clone(),
        };

        if !self.delete(article)? {
            return Err(PocketError::ActionRejected {
                action: "delete".into(),
            });
        }
        log::info!("deleted {} for rename", article.item_id);
        log::debug!("re-adding {}", article.dump());
        self.add(&replacement)
    }

    /// Submit one action through `/send` and return its outcome.
    fn send_action(&self, action: &str, mut fields: Params) -> Result<Value, PocketError> {
        fields.insert("action".into(), action.into());
        let params = to_params(json!({"actions": [Value::Object(fields)]}));
        let body = self.call(SEND_PATH, params)?;
        body.get("action_results")
            .and_then(Value::as_array)
            .and_then(|results| results.first())
            .cloned()
            .ok_or_else(|| PocketError::unexpected(format!("`{action}` returned no action result")))
    }

    fn call(&self, endpoint: &str, params: Params) -> Result<Value, PocketError> {
        self.transport.call(&self.credential, endpoint, params)
    }
}

/// Action outcomes are `true`/`false`, or an object for actions that create
/// something.
fn succeeded(outcome: &Value) -> bool {
    match outcome {
        Value::Bool(ok) => *ok,
        Value::Object(_) => true,
        _ => false,
    }
}

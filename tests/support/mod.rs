//! In-memory stand-in for the Pocket API, shared by the integration tests.

#![allow(dead_code)]

use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

use pocket_rename::api::{Params, Transport};
use pocket_rename::auth::Approval;
use pocket_rename::{Credential, PocketError};
use serde_json::{json, Map, Value};

pub const CONSUMER_KEY: &str = "1234-consumer";
pub const REQUEST_CODE: &str = "req-code-1";
pub const ISSUED_TOKEN: &str = "issued-token";
pub const USERNAME: &str = "reader";

/// One recorded call.
#[derive(Debug, Clone)]
pub struct Call {
    pub endpoint: String,
    pub params: Params,
    pub credential: Credential,
}

impl Call {
    /// Action names of a `/send` call, in order.
    pub fn actions(&self) -> Vec<String> {
        self.params
            .get("actions")
            .and_then(Value::as_array)
            .map(|actions| {
                actions
                    .iter()
                    .filter_map(|a| a.get("action").and_then(Value::as_str).map(str::to_owned))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Default)]
pub struct State {
    pub consumer_key: String,
    pub valid_tokens: Vec<String>,
    /// Stored items in listing shape, in insertion order.
    pub items: Vec<(String, Value)>,
    pub next_id: u64,
    pub calls: Vec<Call>,
    pub fail_get: Option<(u16, String)>,
    pub fail_add: Option<(u16, String)>,
    pub reject_delete: bool,
}

#[derive(Clone, Default)]
pub struct FakePocket {
    state: Arc<Mutex<State>>,
}

impl FakePocket {
    pub fn new() -> Self {
        let fake = FakePocket::default();
        {
            let mut state = fake.state();
            state.consumer_key = CONSUMER_KEY.into();
            state.valid_tokens = vec![ISSUED_TOKEN.into()];
            state.next_id = 100;
        }
        fake
    }

    pub fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Seed an item as `/get` would list it.
    pub fn seed(&self, item_id: &str, url: &str, title: &str, tags: &[&str], time_added: &str) {
        let item = listing_item(item_id, url, Some(title), tags, time_added);
        self.state().items.push((item_id.to_string(), item));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub fn endpoints(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.endpoint).collect()
    }

    pub fn item_ids(&self) -> Vec<String> {
        self.state().items.iter().map(|(id, _)| id.clone()).collect()
    }
}

pub fn authorized() -> Credential {
    Credential::new(CONSUMER_KEY, Some(ISSUED_TOKEN.into()))
}

fn listing_item(item_id: &str, url: &str, title: Option<&str>, tags: &[&str], time_added: &str) -> Value {
    let mut item = json!({
        "item_id": item_id,
        "resolved_id": item_id,
        "given_url": url,
        "given_title": title.unwrap_or(""),
        "resolved_url": url,
        "resolved_title": title.unwrap_or(""),
        "status": "0",
        "time_added": time_added,
    });
    if !tags.is_empty() {
        let tags: Map<String, Value> = tags
            .iter()
            .map(|t| (t.to_string(), json!({"item_id": item_id, "tag": t})))
            .collect();
        item["tags"] = Value::Object(tags);
    }
    item
}

fn http(status: u16, reason: &str) -> PocketError {
    PocketError::Http {
        status,
        reason: reason.into(),
    }
}

impl State {
    /// Save an item and answer the way `/add` and the `add` action do:
    /// a description of the page, without tags or timestamps.
    fn save(&mut self, fields: &Value, time_added: &str) -> Value {
        let item_id = self.next_id.to_string();
        self.next_id += 1;
        let url = fields["url"].as_str().unwrap_or_default().to_string();
        let title = fields.get("title").and_then(Value::as_str);
        let tags: Vec<&str> = fields
            .get("tags")
            .and_then(Value::as_str)
            .map(|t| t.split(',').filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();
        let item = listing_item(&item_id, &url, title, &tags, time_added);
        self.items.push((item_id.clone(), item));
        json!({
            "item_id": item_id,
            "normal_url": url,
            "resolved_id": item_id,
            "resolved_url": url,
            "title": title.unwrap_or(""),
            "response_code": "200",
        })
    }

    fn list(&self, params: &Params) -> Value {
        let limit = params.get("count").and_then(Value::as_u64).map_or(usize::MAX, |n| n as usize);
        if self.items.is_empty() {
            return json!({"status": 2, "list": []});
        }
        let list: Map<String, Value> = self.items.iter().take(limit).cloned().collect();
        json!({"status": 1, "list": list})
    }

    fn send(&mut self, params: &Params) -> Result<Value, PocketError> {
        let actions = params
            .get("actions")
            .and_then(Value::as_array)
            .cloned()
            .ok_or_else(|| http(400, "Missing actions"))?;
        let mut results = Vec::new();
        for action in actions {
            let item_id = action.get("item_id").and_then(Value::as_str).unwrap_or_default().to_string();
            let outcome = match action["action"].as_str() {
                Some("delete") => {
                    let before = self.items.len();
                    if !self.reject_delete {
                        self.items.retain(|(id, _)| *id != item_id);
                    }
                    Value::Bool(self.items.len() < before)
                }
                Some("add") => {
                    if let Some((status, reason)) = self.fail_add.clone() {
                        return Err(http(status, &reason));
                    }
                    let time = action.get("time").and_then(Value::as_str).unwrap_or("0").to_string();
                    self.save(&action, &time)
                }
                Some("tags_add") => {
                    let new_tags = action["tags"].as_str().unwrap_or_default().to_string();
                    match self.items.iter_mut().find(|(id, _)| *id == item_id) {
                        Some((_, item)) => {
                            let tags = item
                                .as_object_mut()
                                .map(|o| o.entry("tags").or_insert_with(|| json!({})));
                            if let Some(Value::Object(tags)) = tags {
                                for tag in new_tags.split(',') {
                                    tags.insert(tag.to_string(), json!({"item_id": item_id, "tag": tag}));
                                }
                            }
                            Value::Bool(true)
                        }
                        None => Value::Bool(false),
                    }
                }
                _ => Value::Bool(false),
            };
            results.push(outcome);
        }
        Ok(json!({"status": 1, "action_results": results}))
    }
}

impl Transport for FakePocket {
    fn call(&self, credential: &Credential, endpoint: &str, params: Params) -> Result<Value, PocketError> {
        let mut state = self.state();
        state.calls.push(Call {
            endpoint: endpoint.to_string(),
            params: params.clone(),
            credential: credential.clone(),
        });

        if credential.consumer_key != state.consumer_key {
            return Err(http(403, "Invalid consumer key."));
        }

        match endpoint {
            "/oauth/request" => return Ok(json!({"code": REQUEST_CODE, "state": null})),
            "/oauth/authorize" => {
                return if params.get("code").and_then(Value::as_str) == Some(REQUEST_CODE) {
                    Ok(json!({"access_token": ISSUED_TOKEN, "username": USERNAME}))
                } else {
                    Err(http(403, "User rejected code."))
                };
            }
            _ => {}
        }

        // Everything else needs a valid token; mirrors the 401 mapping of
        // the real client.
        match &credential.access_token {
            Some(token) if state.valid_tokens.contains(token) => {}
            Some(token) => {
                return Err(PocketError::InvalidAccessToken {
                    access_token: token.clone(),
                })
            }
            None => return Err(http(401, "Missing access token.")),
        }

        match endpoint {
            "/get" => {
                if let Some((status, reason)) = state.fail_get.clone() {
                    return Err(http(status, &reason));
                }
                Ok(state.list(&params))
            }
            "/add" => {
                if let Some((status, reason)) = state.fail_add.clone() {
                    return Err(http(status, &reason));
                }
                let item = state.save(&Value::Object(params), "1700000000");
                Ok(json!({"item": item, "status": 1}))
            }
            "/send" => state.send(&params),
            other => Err(http(404, &format!("no endpoint {other}"))),
        }
    }
}

/// Approves instantly and remembers which URLs it was shown.
#[derive(Default)]
pub struct ScriptedApproval {
    pub urls: Vec<String>,
    pub fail: bool,
}

impl Approval for ScriptedApproval {
    fn approve(&mut self, authorization_url: &str) -> io::Result<()> {
        self.urls.push(authorization_url.to_string());
        if self.fail {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "closed"));
        }
        Ok(())
    }
}

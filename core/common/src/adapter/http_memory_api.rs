//! HTTP 実装の MemoryApi（reqwest blocking）
//!
//! セッションがあれば `Authorization: Bearer <token>` を全リクエストに付ける。
//! 非 2xx は本文の error / detail / message を取り出して `Error::Remote` にする。

use crate::domain::{
    Account, DeltaOp, FragmentId, ListMemoryItem, Memory, MemoryId, RssItem, SharingPermissions,
    UserId,
};
use crate::error::Error;
use crate::ports::outbound::{log_event, FileUpload, Log, LogLevel, MemoryApi, UploadTarget};
use reqwest::blocking::{multipart, Client, RequestBuilder};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

pub struct HttpMemoryApi {
    client: Client,
    base_url: String,
    access_token: Option<String>,
    log: Arc<dyn Log>,
}

#[derive(Deserialize)]
struct CreatedMemory {
    id: MemoryId,
}

#[derive(Deserialize)]
struct CreatedFragment {
    fragment_id: FragmentId,
}

impl HttpMemoryApi {
    pub fn new(base_url: &str, access_token: Option<String>, log: Arc<dyn Log>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token,
            log,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match &self.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// リクエストを送り、2xx なら本文を返す
    fn execute(&self, method: Method, path: &str, builder: RequestBuilder) -> Result<String, Error> {
        let response = match builder.send() {
            Ok(r) => r,
            Err(e) => {
                log_event(
                    self.log.as_ref(),
                    LogLevel::Error,
                    "adapter",
                    "http",
                    &format!("{} {}", method, path),
                    &[("error", json!(e.to_string()))],
                );
                return Err(Error::remote(None, format!("HTTP request failed: {}", e)));
            }
        };

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| Error::remote(Some(status.as_u16()), format!("Failed to read response: {}", e)))?;

        let level = if status.is_success() {
            LogLevel::Debug
        } else {
            LogLevel::Error
        };
        log_event(
            self.log.as_ref(),
            level,
            "adapter",
            "http",
            &format!("{} {}", method, path),
            &[("status", json!(status.as_u16()))],
        );

        if !status.is_success() {
            return Err(Error::remote(
                Some(status.as_u16()),
                error_message(status.as_u16(), &body),
            ));
        }
        Ok(body)
    }

    fn send(&self, method: Method, path: &str, body: Option<Value>) -> Result<String, Error> {
        let mut builder = self.request(method.clone(), path);
        if let Some(body) = body {
            builder = builder.json(&body);
        }
        self.execute(method, path, builder)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let body = self.send(Method::GET, path, None)?;
        parse_body(&body)
    }
}

/// 失敗レスポンスの本文から人間向けメッセージを取り出す
pub fn error_message(status: u16, body: &str) -> String {
    if let Ok(v) = serde_json::from_str::<Value>(body) {
        for key in ["error", "detail", "message"] {
            match &v[key] {
                Value::String(s) => return s.clone(),
                Value::Object(o) => {
                    if let Some(s) = o.get("message").and_then(Value::as_str) {
                        return s.to_string();
                    }
                }
                Value::Null => {}
                other => return other.to_string(),
            }
        }
    }
    if body.trim().is_empty() {
        format!("HTTP {}", status)
    } else {
        format!("HTTP {}: {}", status, body.trim())
    }
}

fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
    serde_json::from_str(body)
        .map_err(|e| Error::json(format!("Failed to parse response JSON: {}", e)))
}

fn ids_json(ids: &[FragmentId]) -> Value {
    json!({ "fragment_ids": ids })
}

impl MemoryApi for HttpMemoryApi {
    fn list_memories(&self) -> Result<Vec<ListMemoryItem>, Error> {
        let items: Option<Vec<ListMemoryItem>> = self.get_json("/memory")?;
        Ok(items.unwrap_or_default())
    }

    fn get_memory(&self, memory_id: &MemoryId) -> Result<Memory, Error> {
        self.get_json(&format!("/memory/{}", memory_id))
    }

    fn get_public_memory(&self, memory_id: &MemoryId) -> Result<Memory, Error> {
        self.get_json(&format!("/public/memory/{}", memory_id))
    }

    fn create_empty_memory(&self) -> Result<MemoryId, Error> {
        let body = self.send(Method::POST, "/memory", None)?;
        let created: CreatedMemory = parse_body(&body)?;
        Ok(created.id)
    }

    fn forget_memory(&self, memory_id: &MemoryId) -> Result<(), Error> {
        self.send(Method::POST, &format!("/memory/{}/forget", memory_id), None)?;
        Ok(())
    }

    fn forget_fragments(&self, memory_id: &MemoryId, fragment_ids: &[FragmentId]) -> Result<(), Error> {
        self.send(
            Method::POST,
            &format!("/memory/{}/forget", memory_id),
            Some(ids_json(fragment_ids)),
        )?;
        Ok(())
    }

    fn set_memory_title(&self, memory_id: &MemoryId, title: &str) -> Result<(), Error> {
        self.send(
            Method::PUT,
            &format!("/memory/{}/set-memory-title", memory_id),
            Some(json!({ "memory_title": title })),
        )?;
        Ok(())
    }

    fn set_fragment_order(&self, memory_id: &MemoryId, fragment_ids: &[FragmentId]) -> Result<(), Error> {
        self.send(
            Method::PUT,
            &format!("/memory/{}/set-fragment-order", memory_id),
            Some(ids_json(fragment_ids)),
        )?;
        Ok(())
    }

    fn set_pin(&self, memory_id: &MemoryId, pin: bool) -> Result<(), Error> {
        self.send(
            Method::PUT,
            &format!("/memory/{}/set-pin", memory_id),
            Some(json!({ "pin": pin })),
        )?;
        Ok(())
    }

    fn set_private(&self, memory_id: &MemoryId, private: bool) -> Result<(), Error> {
        self.send(
            Method::PUT,
            &format!("/memory/{}/set-private", memory_id),
            Some(json!({ "private": private })),
        )?;
        Ok(())
    }

    fn add_rich_text_fragment(&self, memory_id: &MemoryId, content: &[DeltaOp]) -> Result<FragmentId, Error> {
        let body = self.send(
            Method::POST,
            "/fragment/rich-text",
            Some(json!({ "content": content, "memory_id": memory_id })),
        )?;
        let created: CreatedFragment = parse_body(&body)?;
        Ok(created.fragment_id)
    }

    fn modify_rich_text_fragment(
        &self,
        memory_id: &MemoryId,
        fragment_id: &FragmentId,
        content: &[DeltaOp],
    ) -> Result<(), Error> {
        self.send(
            Method::PUT,
            "/fragment/rich-text",
            Some(json!({
                "content": content,
                "memory_id": memory_id,
                "fragment_id": fragment_id,
            })),
        )?;
        Ok(())
    }

    fn add_file_fragment(&self, upload: &FileUpload) -> Result<(), Error> {
        let part = multipart::Part::bytes(upload.bytes.clone()).file_name(upload.file_name.clone());
        let form = multipart::Form::new()
            .part("file", part)
            .text("type", upload.kind.as_str());
        let form = match &upload.target {
            UploadTarget::Memory(memory_id) => form.text("memory_id", memory_id.to_string()),
            UploadTarget::NewMemory { title } => form.text("memory_title", title.clone()),
        };
        let builder = self.request(Method::POST, "/fragment/file").multipart(form);
        self.execute(Method::POST, "/fragment/file", builder)?;
        Ok(())
    }

    fn add_rss_fragment(&self, memory_id: &MemoryId, urls: &[String]) -> Result<(), Error> {
        self.send(
            Method::POST,
            "/fragment/rss",
            Some(json!({ "urls": urls, "memory_id": memory_id })),
        )?;
        Ok(())
    }

    fn modify_rss_feed(
        &self,
        memory_id: &MemoryId,
        fragment_id: &FragmentId,
        urls: &[String],
    ) -> Result<(), Error> {
        self.send(
            Method::PUT,
            "/fragment/rss",
            Some(json!({
                "memory_id": memory_id,
                "fragment_id": fragment_id,
                "urls": urls,
            })),
        )?;
        Ok(())
    }

    fn get_rss_feed(&self, memory_id: &MemoryId, fragment_id: &FragmentId) -> Result<Vec<RssItem>, Error> {
        let builder = self
            .request(Method::GET, "/fragment/rss")
            .query(&[("memory_id", &**memory_id), ("fragment_id", &**fragment_id)]);
        let body = self.execute(Method::GET, "/fragment/rss", builder)?;
        let items: Option<Vec<RssItem>> = parse_body(&body)?;
        Ok(items.unwrap_or_default())
    }

    fn get_sharing_permissions(&self, memory_id: &MemoryId) -> Result<SharingPermissions, Error> {
        self.get_json(&format!("/sharing/{}/permissions", memory_id))
    }

    fn add_editor(&self, memory_id: &MemoryId, email: &str) -> Result<(), Error> {
        self.send(
            Method::PUT,
            &format!("/sharing/{}/editors/add", memory_id),
            Some(json!({ "email": email })),
        )?;
        Ok(())
    }

    fn remove_editor(&self, memory_id: &MemoryId, user_id: &UserId) -> Result<(), Error> {
        self.send(
            Method::PUT,
            &format!("/sharing/{}/editors/remove", memory_id),
            Some(json!({ "user_id": user_id })),
        )?;
        Ok(())
    }

    fn add_reader(&self, memory_id: &MemoryId, email: &str) -> Result<(), Error> {
        self.send(
            Method::PUT,
            &format!("/sharing/{}/readers/add", memory_id),
            Some(json!({ "email": email })),
        )?;
        Ok(())
    }

    fn remove_reader(&self, memory_id: &MemoryId, user_id: &UserId) -> Result<(), Error> {
        self.send(
            Method::PUT,
            &format!("/sharing/{}/readers/remove", memory_id),
            Some(json!({ "user_id": user_id })),
        )?;
        Ok(())
    }

    fn set_public(&self, memory_id: &MemoryId, is_public: bool) -> Result<(), Error> {
        self.send(
            Method::PUT,
            &format!("/sharing/{}/set-public", memory_id),
            Some(json!({ "is_public": is_public })),
        )?;
        Ok(())
    }

    fn get_account(&self) -> Result<Account, Error> {
        self.get_json("/auth/account")
    }
}

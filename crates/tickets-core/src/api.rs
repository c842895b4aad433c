//! Transport-neutral request layer for the `/api/Tickets/*` operations.
//!
//! [`TicketApi`] turns loosely typed inputs (query strings, JSON bodies) into
//! validated domain values, calls [`TicketService`], and maps every outcome
//! to a status code and JSON body. Any transport (HTTP server, CLI, test
//! harness) can sit on top of [`TicketApi::handle`] or the typed methods.
//!
//! | Route            | Method | Path                           | Inputs                 |
//! |------------------|--------|--------------------------------|------------------------|
//! | Create           | POST   | `/api/Tickets/create`          | body: conversation     |
//! | Read             | GET    | `/api/Tickets/read`            | `id`                   |
//! | AddConversation  | POST   | `/api/Tickets/add-conversation`| `id`; body             |
//! | AddNote          | POST   | `/api/Tickets/add-note`        | `id`; body: note       |
//! | UpdateStatus     | PUT    | `/api/Tickets/update-status`   | `id`, `status`         |
//! | UpdateNote       | PUT    | `/api/Tickets/update-note`     | `id`, `noteId`         |

use crate::config::Limits;
use crate::error::{ErrorCode, TicketError};
use crate::model::{Conversation, Ticket};
use crate::service::TicketService;
use crate::store::TicketStore;
use crate::validate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::{fmt, str::FromStr};
use tracing::{debug, warn};

pub const API_PREFIX: &str = "/api/Tickets";

pub const STATUS_OK: u16 = 200;
pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_NOT_FOUND: u16 = 404;
pub const STATUS_METHOD_NOT_ALLOWED: u16 = 405;
pub const STATUS_CONFLICT: u16 = 409;
pub const STATUS_INTERNAL: u16 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
}

impl Method {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unsupported method name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseMethodError {
    pub got: String,
}

impl fmt::Display for ParseMethodError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported method '{}' (expected GET, POST, or PUT)", self.got)
    }
}

impl std::error::Error for ParseMethodError {}

impl FromStr for Method {
    type Err = ParseMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            _ => Err(ParseMethodError { got: s.to_string() }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Create,
    Read,
    AddConversation,
    AddNote,
    UpdateStatus,
    UpdateNote,
}

/// Why a method/path pair did not resolve to a [`Route`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    UnknownPath(String),
    MethodNotAllowed { path: String, allowed: Method },
}

impl Route {
    pub const ALL: [Self; 6] = [
        Self::Create,
        Self::Read,
        Self::AddConversation,
        Self::AddNote,
        Self::UpdateStatus,
        Self::UpdateNote,
    ];

    #[must_use]
    pub const fn method(self) -> Method {
        match self {
            Self::Read => Method::Get,
            Self::Create | Self::AddConversation | Self::AddNote => Method::Post,
            Self::UpdateStatus | Self::UpdateNote => Method::Put,
        }
    }

    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Create => "/api/Tickets/create",
            Self::Read => "/api/Tickets/read",
            Self::AddConversation => "/api/Tickets/add-conversation",
            Self::AddNote => "/api/Tickets/add-note",
            Self::UpdateStatus => "/api/Tickets/update-status",
            Self::UpdateNote => "/api/Tickets/update-note",
        }
    }

    /// Match a request line. Paths compare case-insensitively, ignoring a
    /// trailing slash.
    ///
    /// # Errors
    ///
    /// [`RouteError::UnknownPath`] when no route has the path, or
    /// [`RouteError::MethodNotAllowed`] when it exists under another method.
    pub fn resolve(method: Method, path: &str) -> Result<Self, RouteError> {
        let wanted = path.trim_end_matches('/');
        let route = Self::ALL
            .into_iter()
            .find(|route| route.path().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| RouteError::UnknownPath(path.to_string()))?;

        if route.method() == method {
            Ok(route)
        } else {
            Err(RouteError::MethodNotAllowed {
                path: path.to_string(),
                allowed: route.method(),
            })
        }
    }
}

/// Body of `create` and `add-conversation`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationPayload {
    pub title: String,
    pub content: String,
}

impl From<ConversationPayload> for Conversation {
    fn from(payload: ConversationPayload) -> Self {
        Self::new(payload.title, payload.content)
    }
}

/// Body of `add-note`. A submitted `closed` flag is accepted and ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed: Option<bool>,
}

/// One request as seen by the API layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: BTreeMap<String, String>,
    pub body: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: BTreeMap::new(),
            body: None,
        }
    }

    /// Request for a known route.
    #[must_use]
    pub fn to(route: Route) -> Self {
        Self::new(route.method(), route.path())
    }

    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize `payload` as the JSON body.
    ///
    /// # Errors
    ///
    /// Returns the serializer error if `payload` cannot be rendered.
    pub fn with_json<T: Serialize>(self, payload: &T) -> Result<Self, serde_json::Error> {
        Ok(self.with_body(serde_json::to_string(payload)?))
    }

    fn required(&self, key: &'static str) -> Result<&str, TicketError> {
        self.query
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| TicketError::validation(key, "query parameter is required"))
    }
}

/// Status code plus JSON body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    fn ticket(ticket: &Ticket) -> Self {
        match serde_json::to_value(ticket) {
            Ok(body) => Self {
                status: STATUS_OK,
                body,
            },
            Err(err) => {
                warn!(error = %err, "ticket could not be serialized");
                Self {
                    status: STATUS_INTERNAL,
                    body: error_body(
                        ErrorCode::InternalUnexpected,
                        ErrorCode::InternalUnexpected.message(),
                    ),
                }
            }
        }
    }

    /// Caller errors carry their full message. Storage failures only report
    /// the code's summary so local paths stay out of the body.
    #[must_use]
    pub fn error(err: &TicketError) -> Self {
        let status = http_status(err);
        let code = err.code();
        let message = if status == STATUS_INTERNAL {
            code.message().to_string()
        } else {
            err.to_string()
        };
        Self {
            status,
            body: error_body(code, &message),
        }
    }

    fn route_error(err: &RouteError) -> Self {
        match err {
            RouteError::UnknownPath(path) => Self {
                status: STATUS_NOT_FOUND,
                body: error_body(
                    ErrorCode::ValidationFailed,
                    &format!("no route for path '{path}'"),
                ),
            },
            RouteError::MethodNotAllowed { path, allowed } => Self {
                status: STATUS_METHOD_NOT_ALLOWED,
                body: error_body(
                    ErrorCode::ValidationFailed,
                    &format!("'{path}' only accepts {allowed}"),
                ),
            },
        }
    }
}

/// Status code for a failed operation.
#[must_use]
pub const fn http_status(err: &TicketError) -> u16 {
    match err {
        TicketError::TicketNotFound { .. } | TicketError::NoteNotFound { .. } => STATUS_NOT_FOUND,
        TicketError::InvalidStatus { .. } | TicketError::Validation { .. } => STATUS_BAD_REQUEST,
        TicketError::Conflict { .. } => STATUS_CONFLICT,
        TicketError::Lock(_)
        | TicketError::Io { .. }
        | TicketError::Corrupt { .. }
        | TicketError::Poisoned => STATUS_INTERNAL,
    }
}

/// `{"error": {"code", "message", "hint"}}`.
#[must_use]
pub fn error_body(code: ErrorCode, message: &str) -> Value {
    json!({
        "error": {
            "code": code.code(),
            "message": message,
            "hint": code.hint(),
        }
    })
}

fn parse_body<T: DeserializeOwned>(body: Option<&str>) -> Result<Option<T>, TicketError> {
    let Some(raw) = body.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(None);
    };
    serde_json::from_str::<Option<T>>(raw)
        .map_err(|err| TicketError::validation("body", err.to_string()))
}

fn require_body<T: DeserializeOwned>(body: Option<&str>) -> Result<T, TicketError> {
    parse_body(body)?.ok_or_else(|| TicketError::validation("body", "request body is required"))
}

/// Validating front door to a [`TicketService`].
#[derive(Debug)]
pub struct TicketApi<S> {
    service: TicketService<S>,
    limits: Limits,
}

impl<S: TicketStore> TicketApi<S> {
    pub const fn new(service: TicketService<S>, limits: Limits) -> Self {
        Self { service, limits }
    }

    pub const fn service(&self) -> &TicketService<S> {
        &self.service
    }

    /// # Errors
    ///
    /// [`TicketError::Validation`] for a malformed conversation, or a storage failure.
    pub fn create(&self, payload: Option<ConversationPayload>) -> Result<Ticket, TicketError> {
        let conversation = payload.map(Conversation::from);
        if let Some(conversation) = &conversation {
            validate::validate_conversation(conversation, &self.limits)?;
        }
        self.service.create(conversation)
    }

    /// # Errors
    ///
    /// [`TicketError::Validation`] for a malformed id, or not-found.
    pub fn read(&self, id: &str) -> Result<Ticket, TicketError> {
        let id = validate::parse_ticket_id("id", id)?;
        self.service.read(&id)
    }

    /// # Errors
    ///
    /// Validation, not-found, or storage failures.
    pub fn add_conversation(
        &self,
        id: &str,
        payload: ConversationPayload,
    ) -> Result<Ticket, TicketError> {
        let id = validate::parse_ticket_id("id", id)?;
        let conversation = Conversation::from(payload);
        validate::validate_conversation(&conversation, &self.limits)?;
        self.service.add_conversation(&id, conversation)
    }

    /// # Errors
    ///
    /// Validation, not-found, conflict, or storage failures.
    pub fn add_note(&self, id: &str, payload: NotePayload) -> Result<Ticket, TicketError> {
        let id = validate::parse_ticket_id("id", id)?;
        let note_id = payload
            .id
            .as_deref()
            .map(|raw| validate::parse_note_id("note.id", raw))
            .transpose()?;
        validate::validate_content(&payload.content, &self.limits)?;
        self.service.add_note(&id, note_id, payload.content)
    }

    /// `status` is the ordinal as text, as it arrives in a query string.
    ///
    /// # Errors
    ///
    /// Validation (non-integer), not-found, invalid-status, or storage failures.
    pub fn update_status(&self, id: &str, status: &str) -> Result<Ticket, TicketError> {
        let id = validate::parse_ticket_id("id", id)?;
        let status = status
            .trim()
            .parse::<i64>()
            .map_err(|_| TicketError::validation("status", "must be an integer"))?;
        self.service.update_status(&id, status)
    }

    /// # Errors
    ///
    /// Validation, not-found, or storage failures.
    pub fn update_note(&self, id: &str, note_id: &str) -> Result<Ticket, TicketError> {
        let id = validate::parse_ticket_id("id", id)?;
        let note_id = validate::parse_note_id("noteId", note_id)?;
        self.service.update_note_status(&id, &note_id)
    }

    /// Route, validate, execute, and map the outcome of one request.
    pub fn handle(&self, request: &ApiRequest) -> ApiResponse {
        let response = match Route::resolve(request.method, &request.path) {
            Ok(route) => match self.dispatch(route, request) {
                Ok(ticket) => ApiResponse::ticket(&ticket),
                Err(err) => ApiResponse::error(&err),
            },
            Err(err) => ApiResponse::route_error(&err),
        };
        debug!(
            method = %request.method,
            path = %request.path,
            status = response.status,
            "request handled"
        );
        response
    }

    fn dispatch(&self, route: Route, request: &ApiRequest) -> Result<Ticket, TicketError> {
        let body = request.body.as_deref();
        match route {
            Route::Create => self.create(parse_body(body)?),
            Route::Read => self.read(request.required("id")?),
            Route::AddConversation => {
                let id = request.required("id")?;
                self.add_conversation(id, require_body(body)?)
            }
            Route::AddNote => {
                let id = request.required("id")?;
                self.add_note(id, require_body(body)?)
            }
            Route::UpdateStatus => {
                let id = request.required("id")?;
                self.update_status(id, request.required("status")?)
            }
            Route::UpdateNote => {
                let id = request.required("id")?;
                self.update_note(id, request.required("noteId")?)
            }
        }
    }
}

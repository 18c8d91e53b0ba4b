use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Value, json};

use crate::{
    command::{NewAccount, NewTransaction},
    shared::SharedLedger,
};

/// One request as a transport would hand it over.
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    CreateAccount(NewAccount),
    GetAccount { id: String },
    CreateTransaction(NewTransaction),
    Health,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Created,
    BadRequest,
    NotFound,
}

impl Status {
    /// HTTP equivalent of the status.
    pub fn code(&self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::Created => 201,
            Status::BadRequest => 400,
            Status::NotFound => 404,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Status::Ok | Status::Created)
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub status: Status,
    pub body: Value,
}

impl Response {
    fn record<T: Serialize>(status: Status, record: &T) -> Self {
        match serde_json::to_value(record) {
            Ok(body) => Self { status, body },
            Err(err) => Self::bad_request(err.to_string()),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: Status::BadRequest,
            body: json!({ "error": message.into() }),
        }
    }

    pub fn not_found(message: &str) -> Self {
        Self {
            status: Status::NotFound,
            body: json!({ "error": message }),
        }
    }

    /// Single line JSON rendering, tagged with the request's line number.
    pub fn to_json_line(&self, line: u64) -> String {
        json!({
            "line": line,
            "status": self.status.code(),
            "body": self.body,
        })
        .to_string()
    }

    /// Error message carried by a failed response.
    pub fn error(&self) -> Option<&str> {
        self.body.get("error").and_then(Value::as_str)
    }
}

/// Runs a request against the ledger and maps the outcome to a response.
pub fn handle(ledger: &SharedLedger, request: Request) -> Response {
    match request {
        Request::CreateAccount(new_account) => match ledger.create_account(new_account) {
            Ok(account) => Response::record(Status::Created, &account),
            Err(err) => Response::bad_request(err.to_string()),
        },
        Request::GetAccount { id } => match ledger.get_account(&id) {
            Some(account) => Response::record(Status::Ok, &account),
            None => Response::not_found("Account not found"),
        },
        Request::CreateTransaction(new_tx) => match ledger.create_transaction(new_tx) {
            Ok(tx) => Response::record(Status::Created, &tx),
            Err(err) => Response::bad_request(err.to_string()),
        },
        Request::Health => Response {
            status: Status::Ok,
            body: json!({ "status": "ok" }),
        },
    }
}

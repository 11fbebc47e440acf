use serde::{Deserialize, Serialize};

/// One canonical row of an uploaded spreadsheet. Every field is the cell text
/// exactly as uploaded; amounts are parsed when read, never when written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialRecord {
    pub date: String,
    pub counterparty: String,
    pub description: String,
    pub category: String,
    pub amount: String,
    pub kind: String,
    pub payment_method: String,
    pub status: String,
}

/// A persisted record together with its store metadata.
#[derive(Debug, Clone, Serialize)]
pub struct StoredRecord {
    pub id: i64,
    #[serde(flatten)]
    pub record: FinancialRecord,
    pub uploaded_at: String,
}

#[derive(Debug, Clone)]
pub struct ImportRecord {
    pub id: Option<i64>,
    pub filename: String,
    pub record_count: i64,
    pub delimiter: String,
    pub encoding: String,
    pub checksum: String,
    pub imported_at: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Conversation {
    pub id: i64,
    pub conversation_id: String,
    pub user_id: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Agent,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Agent => "agent",
        }
    }

    pub fn from_db(raw: &str) -> Self {
        if raw == "user" {
            Self::User
        } else {
            Self::Agent
        }
    }
}

#[derive(Debug, Clone)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
    pub timestamp: String,
}

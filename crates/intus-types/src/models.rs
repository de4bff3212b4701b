use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Returned when a stored or submitted string is not a member of one of the
/// fixed enumerations below.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value:?}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Declares a lowercase string enumeration with serde, `Display` and
/// `FromStr` support. The database stores these as their string form.
macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(UnknownVariant { kind: $kind, value: other.to_string() }),
                }
            }
        }
    };
}

string_enum!(
    /// Self-reported emotional state attached to journal entries and check-ins.
    Mood, "mood", {
        Calm => "calm",
        Ok => "ok",
        Stressed => "stressed",
        Anxious => "anxious",
        Sad => "sad",
        Angry => "angry",
    }
);

string_enum!(
    MessageRole, "message role", {
        User => "user",
        Assistant => "assistant",
    }
);

string_enum!(
    ToolType, "tool type", {
        Breathing => "breathing",
        Grounding => "grounding",
        Reframe => "reframe",
        SelfTalk => "selftalk",
    }
);

string_enum!(
    ScenarioType, "scenario type", {
        BullyingSchool => "bullying_school",
        BullyingWork => "bullying_work",
        Anxiety => "anxiety",
        Stress => "stress",
    }
);

string_enum!(
    ResourceType, "resource type", {
        Emergency => "emergency",
        Professional => "professional",
        Education => "education",
    }
);

// -- User-owned entities --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub mood: Mood,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckIn {
    pub id: Uuid,
    pub user_id: Uuid,
    pub mood: Mood,
    pub stress_level: u8,
    pub energy_level: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A chat message. `safety_flags` is non-empty only when the self-harm
/// keyword check matched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub safety_flags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

// -- Reference data (global, read-only) --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ToolType,
    pub description: String,
    pub duration_min: u32,
    pub steps: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ScenarioType,
    pub title: String,
    pub description: String,
    pub steps: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceLink {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: ResourceType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

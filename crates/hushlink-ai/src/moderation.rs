use hushlink_types::models::ModerationVerdict;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::client::{GeminiClient, SafetySetting};

pub const SAFE_REASON: &str = "Content meets safety guidelines.";
pub const INDETERMINATE_REASON: &str =
    "Content could not be analyzed by the moderation system. Blocked as a precaution.";

/// Raw outcome of a moderation call before the fail-closed mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Safe,
    Unsafe(String),
    /// No usable answer from the classifier.
    Indeterminate,
}

impl From<Classification> for ModerationVerdict {
    fn from(c: Classification) -> Self {
        match c {
            Classification::Safe => ModerationVerdict {
                is_safe: true,
                reason: SAFE_REASON.to_string(),
            },
            Classification::Unsafe(reason) => ModerationVerdict {
                is_safe: false,
                reason,
            },
            Classification::Indeterminate => ModerationVerdict {
                is_safe: false,
                reason: INDETERMINATE_REASON.to_string(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModerationOutput {
    is_safe: bool,
    reason: String,
}

/// The policies are the moderation contract, so the provider's own filter
/// is switched off for the matching categories.
const SAFETY_SETTINGS: &[SafetySetting] = &[
    SafetySetting {
        category: "HARM_CATEGORY_HATE_SPEECH",
        threshold: "BLOCK_NONE",
    },
    SafetySetting {
        category: "HARM_CATEGORY_HARASSMENT",
        threshold: "BLOCK_NONE",
    },
    SafetySetting {
        category: "HARM_CATEGORY_SEXUALLY_EXPLICIT",
        threshold: "BLOCK_NONE",
    },
    SafetySetting {
        category: "HARM_CATEGORY_DANGEROUS_CONTENT",
        threshold: "BLOCK_NONE",
    },
];

const POLICIES: &str = "\
1. Hate Speech: content that promotes violence, incites hatred, promotes discrimination, or disparages people on the basis of race or ethnic origin, religion, disability, age, nationality, veteran status, sexual orientation, sex, gender, gender identity, caste, immigration status, or any other characteristic associated with systemic discrimination or marginalization.
2. Harassment: content that targets an individual or group with malicious attacks, including bullying, shaming, or sexual harassment.
3. Sexually Explicit Content: content that contains nudity, graphic sexual acts, or non-consensual sexual content.
4. Dangerous Content: content that promotes, facilitates, or enables access to harmful activities such as illegal drugs, weapons, or self-harm.
5. Promotion of Violence: content that incites or glorifies violence against individuals or groups.";

fn build_prompt(text: &str) -> String {
    format!(
        "You are a content moderation system. Decide whether the text below violates any of these policies.

Policies:
{POLICIES}

Text: {text}

Answer strictly with the output schema.
'isSafe' MUST be false if ANY policy is violated and true only if NO policy is violated.
If 'isSafe' is false, 'reason' MUST name the violated policy (or policies) and briefly explain why, referring to the text.
If 'isSafe' is true, 'reason' MUST be \"{SAFE_REASON}\"
If there is any ambiguity or potential for harm under these policies, err on the side of caution and set 'isSafe' to false."
    )
}

fn response_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "isSafe": { "type": "BOOLEAN" },
            "reason": { "type": "STRING" }
        },
        "required": ["isSafe", "reason"]
    })
}

/// Ask the classifier about `text`. Provider errors and unusable output are
/// both [`Classification::Indeterminate`].
pub async fn classify(client: &GeminiClient, text: &str) -> Classification {
    let output = match client
        .generate::<ModerationOutput>(&build_prompt(text), response_schema(), SAFETY_SETTINGS)
        .await
    {
        Ok(Some(output)) => output,
        Ok(None) => {
            warn!("Moderation returned no parseable verdict ({} chars of input)", text.len());
            return Classification::Indeterminate;
        }
        Err(e) => {
            warn!("Moderation call failed: {}", e);
            return Classification::Indeterminate;
        }
    };

    if output.is_safe {
        Classification::Safe
    } else if output.reason.trim().is_empty() {
        warn!("Moderation flagged content without a reason");
        Classification::Indeterminate
    } else {
        Classification::Unsafe(output.reason.trim().to_string())
    }
}

/// Screen `text` before it is stored. Never errors; fails closed.
pub async fn moderate_content(client: &GeminiClient, text: &str) -> ModerationVerdict {
    let verdict: ModerationVerdict = classify(client, text).await.into();
    info!("Moderation verdict: safe={}", verdict.is_safe);
    verdict
}

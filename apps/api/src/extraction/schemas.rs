//! Response schemas sent with every structured call.
//!
//! The AI service enforces these server-side; the adapter still validates the
//! returned shape on parse, since schema enforcement does not survive an
//! empty or truncated response.

use serde_json::{json, Value};

pub fn resume_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "name": { "type": "STRING" },
            "education": { "type": "STRING" },
            "skills": { "type": "ARRAY", "items": { "type": "STRING" } },
            "experience": { "type": "STRING" },
            "summary": { "type": "STRING" }
        },
        "required": ["name", "education", "skills", "experience", "summary"]
    })
}

fn jd_properties() -> Value {
    json!({
        "jobCode": { "type": "STRING" },
        "title": { "type": "STRING" },
        "keyClarification": { "type": "STRING" },
        "description": { "type": "STRING" },
        "responsibilities": { "type": "ARRAY", "items": { "type": "STRING" } },
        "requirements": {
            "type": "OBJECT",
            "properties": {
                "education": { "type": "STRING" },
                "skills": { "type": "ARRAY", "items": { "type": "STRING" } },
                "experience": { "type": "STRING" },
                "abilities": { "type": "ARRAY", "items": { "type": "STRING" } }
            },
            "required": ["education", "skills", "experience", "abilities"]
        }
    })
}

const JD_REQUIRED: [&str; 6] = [
    "jobCode",
    "title",
    "keyClarification",
    "description",
    "responsibilities",
    "requirements",
];

pub fn jd_list_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": jd_properties(),
            "required": JD_REQUIRED
        }
    })
}

pub fn jd_batch_schema() -> Value {
    let mut properties = jd_properties();
    properties["rowIndex"] = json!({ "type": "NUMBER" });

    let mut required: Vec<&str> = vec!["rowIndex"];
    required.extend(JD_REQUIRED);

    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": properties,
            "required": required
        }
    })
}

pub fn match_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "resumeId": { "type": "STRING" },
            "resumeName": { "type": "STRING" },
            "matches": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "jdId": { "type": "STRING" },
                        "jdTitle": { "type": "STRING" },
                        "score": { "type": "NUMBER" },
                        "comprehensiveEvaluation": { "type": "STRING" },
                        "strengths": { "type": "ARRAY", "items": { "type": "STRING" } },
                        "weaknesses": { "type": "ARRAY", "items": { "type": "STRING" } },
                        "improvementSuggestions": { "type": "ARRAY", "items": { "type": "STRING" } },
                        "isBestMatch": { "type": "BOOLEAN" }
                    },
                    "required": [
                        "jdId",
                        "jdTitle",
                        "score",
                        "comprehensiveEvaluation",
                        "strengths",
                        "weaknesses",
                        "improvementSuggestions",
                        "isBestMatch"
                    ]
                }
            }
        },
        "required": ["resumeId", "resumeName", "matches"]
    })
}

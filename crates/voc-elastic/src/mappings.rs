//! Index mappings created by the seeding tools.

use serde_json::{json, Value};

/// Mapping for the customer reviews index.
#[must_use]
pub fn reviews_mapping() -> Value {
    json!({
        "mappings": {
            "properties": {
                "product": { "type": "keyword" },
                "platform": { "type": "keyword" },
                "review_text": { "type": "text" },
                "rating": { "type": "integer" },
                "sentiment_score": { "type": "double" },
                "sentiment_label": { "type": "keyword" },
                "review_id": { "type": "keyword" },
                "@timestamp": { "type": "date" }
            }
        }
    })
}

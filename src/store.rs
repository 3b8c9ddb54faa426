use futures_util::StreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::Document;
use mongodb::{options::ClientOptions, Client, Cursor, Database};

pub struct MongoDB {
    pub client: Client,
    pub db: Database,
}

impl MongoDB {
    pub async fn init(uri: &str, db_name: &str) -> Self {
        let client_options = ClientOptions::parse(uri)
            .await
            .expect("Failed to parse MongoDB connection string");
        let client = Client::with_options(client_options).expect("Failed to initialize client");
        let db = client.database(db_name);
        MongoDB { client, db }
    }
}

/// Parse a path id as a MongoDB ObjectId. Handlers answer 400 on `None`.
pub fn parse_object_id(id: &str) -> Option<ObjectId> {
    ObjectId::parse_str(id).ok()
}

/// Drain a cursor into a Vec, stopping at the first driver error.
pub async fn collect_docs(mut cursor: Cursor<Document>) -> mongodb::error::Result<Vec<Document>> {
    let mut docs = Vec::new();
    while let Some(res) = cursor.next().await {
        docs.push(res?);
    }
    Ok(docs)
}

/// Convert a JSON body into a BSON document. `None` means the body was not
/// a JSON object and the handler should answer 400.
pub fn json_to_doc(value: &serde_json::Value) -> Option<Document> {
    if !value.is_object() {
        return None;
    }
    mongodb::bson::to_document(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_hex_id() {
        assert!(parse_object_id("65f1a2b3c4d5e6f708192a3b").is_some());
    }

    #[test]
    fn rejects_malformed_ids() {
        assert!(parse_object_id("not-an-id").is_none());
        assert!(parse_object_id("").is_none());
        assert!(parse_object_id("65f1a2b3").is_none());
    }

    #[test]
    fn json_object_becomes_document() {
        let value = serde_json::json!({ "name": "Mug", "price": 9.5 });
        let doc = json_to_doc(&value).unwrap();
        assert_eq!(doc.get_str("name").unwrap(), "Mug");
        assert_eq!(doc.get_f64("price").unwrap(), 9.5);
    }

    #[test]
    fn non_objects_are_rejected() {
        assert!(json_to_doc(&serde_json::json!([1, 2, 3])).is_none());
        assert!(json_to_doc(&serde_json::json!("plain string")).is_none());
        assert!(json_to_doc(&serde_json::json!(42)).is_none());
    }
}

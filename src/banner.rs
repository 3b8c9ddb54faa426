use actix_web::{web, HttpResponse, Responder};
use log::{error, info};
use mongodb::bson::{doc, Document};
use serde_json::Value;

use crate::app_state::AppState;
use crate::store::{collect_docs, json_to_doc};

const COLLECTION: &str = "banners";

/// Split the posted array into insertable documents. `None` when any element
/// is not a JSON object.
pub fn banner_docs(payload: &[Value]) -> Option<Vec<Document>> {
    payload.iter().map(json_to_doc).collect()
}

/// GET /banner
pub async fn list_banners(data: web::Data<AppState>) -> impl Responder {
    let coll = data.mongodb.db.collection::<Document>(COLLECTION);
    match coll.find(doc! {}).await {
        Ok(cursor) => match collect_docs(cursor).await {
            Ok(banners) => HttpResponse::Ok().json(banners),
            Err(e) => {
                error!("Cursor error listing banners: {}", e);
                HttpResponse::InternalServerError().body("Error fetching banners")
            }
        },
        Err(e) => {
            error!("Error listing banners: {}", e);
            HttpResponse::InternalServerError().body("Error fetching banners")
        }
    }
}

/// POST /banner — replaces the whole collection: delete-all, then insert the
/// posted array. The two writes are separate round trips with no transaction;
/// readers can briefly observe an empty collection. An empty payload skips
/// the insert and leaves the collection empty.
pub async fn replace_banners(
    data: web::Data<AppState>,
    payload: web::Json<Vec<Value>>,
) -> impl Responder {
    let new_banners = match banner_docs(&payload) {
        Some(docs) => docs,
        None => return HttpResponse::BadRequest().body("Body must be an array of JSON objects"),
    };

    let coll = data.mongodb.db.collection::<Document>(COLLECTION);
    let deleted = match coll.delete_many(doc! {}).await {
        Ok(res) => res.deleted_count,
        Err(e) => {
            error!("Error clearing banners: {}", e);
            return HttpResponse::InternalServerError().body("Error replacing banners");
        }
    };

    if new_banners.is_empty() {
        info!("Banner collection cleared ({} removed)", deleted);
        return HttpResponse::Ok().json(doc! {
            "deletedCount": deleted as i64,
            "insertedCount": 0_i64,
        });
    }

    match coll.insert_many(new_banners).await {
        Ok(res) => HttpResponse::Ok().json(doc! {
            "deletedCount": deleted as i64,
            "insertedCount": res.inserted_ids.len() as i64,
        }),
        Err(e) => {
            error!("Error inserting banners: {}", e);
            HttpResponse::InternalServerError().body("Error replacing banners")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_payload_yields_no_docs() {
        assert_eq!(banner_docs(&[]).unwrap().len(), 0);
    }

    #[test]
    fn objects_convert_in_order() {
        let payload = vec![json!({ "image": "a.png" }), json!({ "image": "b.png" })];
        let docs = banner_docs(&payload).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].get_str("image").unwrap(), "a.png");
        assert_eq!(docs[1].get_str("image").unwrap(), "b.png");
    }

    #[test]
    fn non_object_element_rejects_whole_payload() {
        let payload = vec![json!({ "image": "a.png" }), json!("b.png")];
        assert!(banner_docs(&payload).is_none());
    }
}

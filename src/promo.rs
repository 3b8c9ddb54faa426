//! Special and iconic promotional categories. Both collections hold embedded
//! product snapshots; the special variant additionally carries a countdown
//! timer (startTime/endTime).

use actix_web::{web, HttpResponse, Responder};
use log::error;
use mongodb::bson::{doc, Document};
use serde::Deserialize;
use serde_json::Value;

use crate::app_state::AppState;
use crate::store::{collect_docs, json_to_doc, parse_object_id};

const SPECIAL: &str = "special_categories";
const ICONIC: &str = "iconic_categories";

#[derive(Debug, Deserialize)]
pub struct RemoveProductRequest {
    #[serde(rename = "productId")]
    pub product_id: String,
}

#[derive(Debug, Deserialize)]
pub struct TimerRequest {
    #[serde(rename = "startTime")]
    pub start_time: String,
    #[serde(rename = "endTime")]
    pub end_time: String,
}

async fn list_promo(data: &AppState, coll_name: &str, label: &str) -> HttpResponse {
    let coll = data.mongodb.db.collection::<Document>(coll_name);
    match coll.find(doc! {}).await {
        Ok(cursor) => match collect_docs(cursor).await {
            Ok(docs) => HttpResponse::Ok().json(docs),
            Err(e) => {
                error!("Cursor error listing {}: {}", coll_name, e);
                HttpResponse::InternalServerError().body(format!("Error fetching {}", label))
            }
        },
        Err(e) => {
            error!("Error listing {}: {}", coll_name, e);
            HttpResponse::InternalServerError().body(format!("Error fetching {}", label))
        }
    }
}

async fn get_promo(data: &AppState, coll_name: &str, label: &str, id: &str) -> HttpResponse {
    let oid = match parse_object_id(id) {
        Some(oid) => oid,
        None => return HttpResponse::BadRequest().body(format!("Invalid {} id", label)),
    };
    let coll = data.mongodb.db.collection::<Document>(coll_name);
    match coll.find_one(doc! { "_id": oid }).await {
        Ok(Some(doc)) => HttpResponse::Ok().json(doc),
        Ok(None) => HttpResponse::NotFound().body(format!("{} not found", label)),
        Err(e) => {
            error!("Error fetching {} {}: {}", coll_name, id, e);
            HttpResponse::InternalServerError().body(format!("Error fetching {}", label))
        }
    }
}

async fn create_promo(data: &AppState, coll_name: &str, label: &str, body: &Value) -> HttpResponse {
    let new_doc = match json_to_doc(body) {
        Some(doc) => doc,
        None => return HttpResponse::BadRequest().body("Body must be a JSON object"),
    };
    let coll = data.mongodb.db.collection::<Document>(coll_name);
    match coll.insert_one(new_doc).await {
        Ok(res) => HttpResponse::Ok().json(doc! { "insertedId": res.inserted_id }),
        Err(e) => {
            error!("Error inserting into {}: {}", coll_name, e);
            HttpResponse::InternalServerError().body(format!("Error creating {}", label))
        }
    }
}

async fn delete_promo(data: &AppState, coll_name: &str, label: &str, id: &str) -> HttpResponse {
    let oid = match parse_object_id(id) {
        Some(oid) => oid,
        None => return HttpResponse::BadRequest().body(format!("Invalid {} id", label)),
    };
    let coll = data.mongodb.db.collection::<Document>(coll_name);
    match coll.delete_one(doc! { "_id": oid }).await {
        Ok(res) if res.deleted_count == 0 => {
            HttpResponse::NotFound().body(format!("{} not found", label))
        }
        Ok(res) => HttpResponse::Ok().json(doc! { "deletedCount": res.deleted_count as i64 }),
        Err(e) => {
            error!("Error deleting from {} {}: {}", coll_name, id, e);
            HttpResponse::InternalServerError().body(format!("Error deleting {}", label))
        }
    }
}

/// `$push` the product snapshot onto the embedded list. No dedupe: pushing
/// the same product twice leaves two copies.
async fn push_product(
    data: &AppState,
    coll_name: &str,
    label: &str,
    id: &str,
    body: &Value,
) -> HttpResponse {
    let oid = match parse_object_id(id) {
        Some(oid) => oid,
        None => return HttpResponse::BadRequest().body(format!("Invalid {} id", label)),
    };
    let product = match json_to_doc(body) {
        Some(doc) if !doc.is_empty() => doc,
        _ => return HttpResponse::BadRequest().body("Body must be a product object"),
    };
    let coll = data.mongodb.db.collection::<Document>(coll_name);
    match coll
        .update_one(doc! { "_id": oid }, doc! { "$push": { "products": product } })
        .await
    {
        Ok(res) if res.matched_count == 0 => {
            HttpResponse::NotFound().body(format!("{} not found", label))
        }
        Ok(res) => HttpResponse::Ok().json(doc! {
            "matchedCount": res.matched_count as i64,
            "modifiedCount": res.modified_count as i64,
        }),
        Err(e) => {
            error!("Error pushing product into {} {}: {}", coll_name, id, e);
            HttpResponse::InternalServerError().body(format!("Error updating {}", label))
        }
    }
}

/// `$pull` every embedded snapshot whose `_id` matches the given product id.
async fn pull_product(
    data: &AppState,
    coll_name: &str,
    label: &str,
    id: &str,
    product_id: &str,
) -> HttpResponse {
    let oid = match parse_object_id(id) {
        Some(oid) => oid,
        None => return HttpResponse::BadRequest().body(format!("Invalid {} id", label)),
    };
    if product_id.is_empty() {
        return HttpResponse::BadRequest().body("Missing productId");
    }
    let coll = data.mongodb.db.collection::<Document>(coll_name);
    match coll
        .update_one(
            doc! { "_id": oid },
            doc! { "$pull": { "products": { "_id": product_id } } },
        )
        .await
    {
        Ok(res) if res.matched_count == 0 => {
            HttpResponse::NotFound().body(format!("{} not found", label))
        }
        Ok(res) => HttpResponse::Ok().json(doc! {
            "matchedCount": res.matched_count as i64,
            "modifiedCount": res.modified_count as i64,
        }),
        Err(e) => {
            error!("Error pulling product from {} {}: {}", coll_name, id, e);
            HttpResponse::InternalServerError().body(format!("Error updating {}", label))
        }
    }
}

// SPECIAL CATEGORIES

pub async fn list_special_categories(data: web::Data<AppState>) -> impl Responder {
    list_promo(&data, SPECIAL, "special categories").await
}

pub async fn get_special_category(
    data: web::Data<AppState>,
    id: web::Path<String>,
) -> impl Responder {
    get_promo(&data, SPECIAL, "Special category", &id).await
}

pub async fn create_special_category(
    data: web::Data<AppState>,
    payload: web::Json<Value>,
) -> impl Responder {
    create_promo(&data, SPECIAL, "special category", &payload).await
}

pub async fn delete_special_category(
    data: web::Data<AppState>,
    id: web::Path<String>,
) -> impl Responder {
    delete_promo(&data, SPECIAL, "Special category", &id).await
}

pub async fn add_product_to_special(
    data: web::Data<AppState>,
    id: web::Path<String>,
    payload: web::Json<Value>,
) -> impl Responder {
    push_product(&data, SPECIAL, "Special category", &id, &payload).await
}

pub async fn remove_product_from_special(
    data: web::Data<AppState>,
    id: web::Path<String>,
    payload: web::Json<RemoveProductRequest>,
) -> impl Responder {
    pull_product(&data, SPECIAL, "Special category", &id, &payload.product_id).await
}

/// PATCH /special_category/{id}/update-timer
pub async fn update_special_timer(
    data: web::Data<AppState>,
    id: web::Path<String>,
    payload: web::Json<TimerRequest>,
) -> impl Responder {
    let oid = match parse_object_id(&id) {
        Some(oid) => oid,
        None => return HttpResponse::BadRequest().body("Invalid special category id"),
    };
    let coll = data.mongodb.db.collection::<Document>(SPECIAL);
    match coll
        .update_one(
            doc! { "_id": oid },
            doc! { "$set": {
                "startTime": &payload.start_time,
                "endTime": &payload.end_time,
            } },
        )
        .await
    {
        Ok(res) if res.matched_count == 0 => {
            HttpResponse::NotFound().body("Special category not found")
        }
        Ok(res) => HttpResponse::Ok().json(doc! {
            "matchedCount": res.matched_count as i64,
            "modifiedCount": res.modified_count as i64,
        }),
        Err(e) => {
            error!("Error updating timer for special category {}: {}", id, e);
            HttpResponse::InternalServerError().body("Error updating special category")
        }
    }
}

// ICONIC CATEGORIES

pub async fn list_iconic_categories(data: web::Data<AppState>) -> impl Responder {
    list_promo(&data, ICONIC, "iconic categories").await
}

pub async fn get_iconic_category(
    data: web::Data<AppState>,
    id: web::Path<String>,
) -> impl Responder {
    get_promo(&data, ICONIC, "Iconic category", &id).await
}

pub async fn create_iconic_category(
    data: web::Data<AppState>,
    payload: web::Json<Value>,
) -> impl Responder {
    create_promo(&data, ICONIC, "iconic category", &payload).await
}

pub async fn delete_iconic_category(
    data: web::Data<AppState>,
    id: web::Path<String>,
) -> impl Responder {
    delete_promo(&data, ICONIC, "Iconic category", &id).await
}

pub async fn add_product_to_iconic(
    data: web::Data<AppState>,
    id: web::Path<String>,
    payload: web::Json<Value>,
) -> impl Responder {
    push_product(&data, ICONIC, "Iconic category", &id, &payload).await
}

pub async fn remove_product_from_iconic(
    data: web::Data<AppState>,
    id: web::Path<String>,
    payload: web::Json<RemoveProductRequest>,
) -> impl Responder {
    pull_product(&data, ICONIC, "Iconic category", &id, &payload.product_id).await
}

use actix_web::{web, HttpResponse, Responder};
use log::error;
use mongodb::bson::{doc, Document};
use serde::Deserialize;
use serde_json::Value;

use crate::app_state::AppState;
use crate::store::{collect_docs, json_to_doc, parse_object_id};

const COLLECTION: &str = "categories";

#[derive(Debug, Deserialize)]
pub struct CategoryImageRequest {
    pub img: String,
}

/// GET /categories
pub async fn list_categories(data: web::Data<AppState>) -> impl Responder {
    let coll = data.mongodb.db.collection::<Document>(COLLECTION);
    match coll.find(doc! {}).await {
        Ok(cursor) => match collect_docs(cursor).await {
            Ok(categories) => HttpResponse::Ok().json(categories),
            Err(e) => {
                error!("Cursor error listing categories: {}", e);
                HttpResponse::InternalServerError().body("Error fetching categories")
            }
        },
        Err(e) => {
            error!("Error listing categories: {}", e);
            HttpResponse::InternalServerError().body("Error fetching categories")
        }
    }
}

/// GET /category_by_id/{id}
pub async fn get_category_by_id(
    data: web::Data<AppState>,
    id: web::Path<String>,
) -> impl Responder {
    let oid = match parse_object_id(&id) {
        Some(oid) => oid,
        None => return HttpResponse::BadRequest().body("Invalid category id"),
    };
    let coll = data.mongodb.db.collection::<Document>(COLLECTION);
    match coll.find_one(doc! { "_id": oid }).await {
        Ok(Some(category)) => HttpResponse::Ok().json(category),
        Ok(None) => HttpResponse::NotFound().body("Category not found"),
        Err(e) => {
            error!("Error fetching category {}: {}", id, e);
            HttpResponse::InternalServerError().body("Error fetching category")
        }
    }
}

/// POST /categories
pub async fn create_category(
    data: web::Data<AppState>,
    payload: web::Json<Value>,
) -> impl Responder {
    let new_category = match json_to_doc(&payload) {
        Some(doc) => doc,
        None => return HttpResponse::BadRequest().body("Body must be a JSON object"),
    };
    let coll = data.mongodb.db.collection::<Document>(COLLECTION);
    match coll.insert_one(new_category).await {
        Ok(res) => HttpResponse::Ok().json(doc! { "insertedId": res.inserted_id }),
        Err(e) => {
            error!("Error inserting category: {}", e);
            HttpResponse::InternalServerError().body("Error creating category")
        }
    }
}

/// PATCH /category_image/{id}
pub async fn update_category_image(
    data: web::Data<AppState>,
    id: web::Path<String>,
    payload: web::Json<CategoryImageRequest>,
) -> impl Responder {
    let oid = match parse_object_id(&id) {
        Some(oid) => oid,
        None => return HttpResponse::BadRequest().body("Invalid category id"),
    };
    let coll = data.mongodb.db.collection::<Document>(COLLECTION);
    match coll
        .update_one(doc! { "_id": oid }, doc! { "$set": { "img": &payload.img } })
        .await
    {
        Ok(res) if res.matched_count == 0 => HttpResponse::NotFound().body("Category not found"),
        Ok(res) => HttpResponse::Ok().json(doc! {
            "matchedCount": res.matched_count as i64,
            "modifiedCount": res.modified_count as i64,
        }),
        Err(e) => {
            error!("Error updating category image {}: {}", id, e);
            HttpResponse::InternalServerError().body("Error updating category")
        }
    }
}

/// PATCH /edit_category/{id}
pub async fn edit_category(
    data: web::Data<AppState>,
    id: web::Path<String>,
    payload: web::Json<Value>,
) -> impl Responder {
    let oid = match parse_object_id(&id) {
        Some(oid) => oid,
        None => return HttpResponse::BadRequest().body("Invalid category id"),
    };
    let set_doc = match json_to_doc(&payload) {
        Some(doc) if !doc.is_empty() => doc,
        _ => return HttpResponse::BadRequest().body("No fields to update"),
    };
    let coll = data.mongodb.db.collection::<Document>(COLLECTION);
    match coll
        .update_one(doc! { "_id": oid }, doc! { "$set": set_doc })
        .await
    {
        Ok(res) if res.matched_count == 0 => HttpResponse::NotFound().body("Category not found"),
        Ok(res) => HttpResponse::Ok().json(doc! {
            "matchedCount": res.matched_count as i64,
            "modifiedCount": res.modified_count as i64,
        }),
        Err(e) => {
            error!("Error editing category {}: {}", id, e);
            HttpResponse::InternalServerError().body("Error updating category")
        }
    }
}

/// DELETE /category-delete/{id}
pub async fn delete_category(data: web::Data<AppState>, id: web::Path<String>) -> impl Responder {
    let oid = match parse_object_id(&id) {
        Some(oid) => oid,
        None => return HttpResponse::BadRequest().body("Invalid category id"),
    };
    let coll = data.mongodb.db.collection::<Document>(COLLECTION);
    match coll.delete_one(doc! { "_id": oid }).await {
        Ok(res) if res.deleted_count == 0 => HttpResponse::NotFound().body("Category not found"),
        Ok(res) => HttpResponse::Ok().json(doc! { "deletedCount": res.deleted_count as i64 }),
        Err(e) => {
            error!("Error deleting category {}: {}", id, e);
            HttpResponse::InternalServerError().body("Error deleting category")
        }
    }
}

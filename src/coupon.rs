use actix_web::{web, HttpResponse, Responder};
use log::error;
use mongodb::bson::{doc, Document};
use serde_json::Value;

use crate::app_state::AppState;
use crate::store::{collect_docs, json_to_doc, parse_object_id};

const COLLECTION: &str = "coupons";

/// GET /coupons
pub async fn list_coupons(data: web::Data<AppState>) -> impl Responder {
    let coll = data.mongodb.db.collection::<Document>(COLLECTION);
    match coll.find(doc! {}).await {
        Ok(cursor) => match collect_docs(cursor).await {
            Ok(coupons) => HttpResponse::Ok().json(coupons),
            Err(e) => {
                error!("Cursor error listing coupons: {}", e);
                HttpResponse::InternalServerError().body("Error fetching coupons")
            }
        },
        Err(e) => {
            error!("Error listing coupons: {}", e);
            HttpResponse::InternalServerError().body("Error fetching coupons")
        }
    }
}

/// POST /coupon
pub async fn create_coupon(data: web::Data<AppState>, payload: web::Json<Value>) -> impl Responder {
    let new_coupon = match json_to_doc(&payload) {
        Some(doc) => doc,
        None => return HttpResponse::BadRequest().body("Body must be a JSON object"),
    };
    let coll = data.mongodb.db.collection::<Document>(COLLECTION);
    match coll.insert_one(new_coupon).await {
        Ok(res) => HttpResponse::Ok().json(doc! { "insertedId": res.inserted_id }),
        Err(e) => {
            error!("Error inserting coupon: {}", e);
            HttpResponse::InternalServerError().body("Error creating coupon")
        }
    }
}

/// DELETE /coupon/{id}
pub async fn delete_coupon(data: web::Data<AppState>, id: web::Path<String>) -> impl Responder {
    let oid = match parse_object_id(&id) {
        Some(oid) => oid,
        None => return HttpResponse::BadRequest().body("Invalid coupon id"),
    };
    let coll = data.mongodb.db.collection::<Document>(COLLECTION);
    match coll.delete_one(doc! { "_id": oid }).await {
        Ok(res) if res.deleted_count == 0 => HttpResponse::NotFound().body("Coupon not found"),
        Ok(res) => HttpResponse::Ok().json(doc! { "deletedCount": res.deleted_count as i64 }),
        Err(e) => {
            error!("Error deleting coupon {}: {}", id, e);
            HttpResponse::InternalServerError().body("Error deleting coupon")
        }
    }
}

use actix_web::{web, HttpResponse, Responder};
use log::error;
use mongodb::bson::{doc, to_bson, Bson, Document};
use serde::Deserialize;
use serde_json::Value;

use crate::app_state::AppState;
use crate::store::{collect_docs, json_to_doc, parse_object_id};

const COLLECTION: &str = "orders";

/// Body of PATCH /order_state/{id}. `state` overwrites the free-form status
/// string; `steps` are appended to orderSteps, prior entries untouched.
#[derive(Debug, Deserialize)]
pub struct OrderStateRequest {
    pub state: String,
    #[serde(default)]
    pub steps: Vec<Value>,
}

/// Build the update for an order-state transition. `None` when the state is
/// empty or a step fails BSON conversion.
pub fn order_state_update(state: &str, steps: &[Value]) -> Option<Document> {
    if state.is_empty() {
        return None;
    }
    let mut update = doc! { "$set": { "status": state } };
    if !steps.is_empty() {
        let steps: Vec<Bson> = steps.iter().map(|s| to_bson(s).ok()).collect::<Option<_>>()?;
        update.insert("$push", doc! { "orderSteps": { "$each": steps } });
    }
    Some(update)
}

/// GET /orders
pub async fn list_orders(data: web::Data<AppState>) -> impl Responder {
    let coll = data.mongodb.db.collection::<Document>(COLLECTION);
    match coll.find(doc! {}).await {
        Ok(cursor) => match collect_docs(cursor).await {
            Ok(orders) => HttpResponse::Ok().json(orders),
            Err(e) => {
                error!("Cursor error listing orders: {}", e);
                HttpResponse::InternalServerError().body("Error fetching orders")
            }
        },
        Err(e) => {
            error!("Error listing orders: {}", e);
            HttpResponse::InternalServerError().body("Error fetching orders")
        }
    }
}

/// GET /order/{email}
pub async fn get_orders_by_email(
    data: web::Data<AppState>,
    email: web::Path<String>,
) -> impl Responder {
    find_orders(&data, doc! { "email": &*email }).await
}

/// GET /order_by_phone/{phone}
pub async fn get_orders_by_phone(
    data: web::Data<AppState>,
    phone: web::Path<String>,
) -> impl Responder {
    find_orders(&data, doc! { "phone": &*phone }).await
}

async fn find_orders(data: &AppState, filter: Document) -> HttpResponse {
    let coll = data.mongodb.db.collection::<Document>(COLLECTION);
    match coll.find(filter).await {
        Ok(cursor) => match collect_docs(cursor).await {
            Ok(orders) => HttpResponse::Ok().json(orders),
            Err(e) => {
                error!("Cursor error fetching orders: {}", e);
                HttpResponse::InternalServerError().body("Error fetching orders")
            }
        },
        Err(e) => {
            error!("Error fetching orders: {}", e);
            HttpResponse::InternalServerError().body("Error fetching orders")
        }
    }
}

/// POST /orders — inserts the body verbatim.
pub async fn create_order(data: web::Data<AppState>, payload: web::Json<Value>) -> impl Responder {
    let new_order = match json_to_doc(&payload) {
        Some(doc) => doc,
        None => return HttpResponse::BadRequest().body("Body must be a JSON object"),
    };
    let coll = data.mongodb.db.collection::<Document>(COLLECTION);
    match coll.insert_one(new_order).await {
        Ok(res) => HttpResponse::Ok().json(doc! { "insertedId": res.inserted_id }),
        Err(e) => {
            error!("Error inserting order: {}", e);
            HttpResponse::InternalServerError().body("Error creating order")
        }
    }
}

/// PATCH /order_state/{id}
pub async fn update_order_state(
    data: web::Data<AppState>,
    id: web::Path<String>,
    payload: web::Json<OrderStateRequest>,
) -> impl Responder {
    let oid = match parse_object_id(&id) {
        Some(oid) => oid,
        None => return HttpResponse::BadRequest().body("Invalid order id"),
    };
    let update = match order_state_update(&payload.state, &payload.steps) {
        Some(update) => update,
        None => return HttpResponse::BadRequest().body("Missing state"),
    };
    let coll = data.mongodb.db.collection::<Document>(COLLECTION);
    match coll.update_one(doc! { "_id": oid }, update).await {
        Ok(res) if res.matched_count == 0 => HttpResponse::NotFound().body("Order not found"),
        Ok(res) => HttpResponse::Ok().json(doc! {
            "matchedCount": res.matched_count as i64,
            "modifiedCount": res.modified_count as i64,
        }),
        Err(e) => {
            error!("Error updating order state {}: {}", id, e);
            HttpResponse::InternalServerError().body("Error updating order")
        }
    }
}

/// DELETE /order-delete/{id}
pub async fn delete_order(data: web::Data<AppState>, id: web::Path<String>) -> impl Responder {
    let oid = match parse_object_id(&id) {
        Some(oid) => oid,
        None => return HttpResponse::BadRequest().body("Invalid order id"),
    };
    let coll = data.mongodb.db.collection::<Document>(COLLECTION);
    match coll.delete_one(doc! { "_id": oid }).await {
        Ok(res) if res.deleted_count == 0 => HttpResponse::NotFound().body("Order not found"),
        Ok(res) => HttpResponse::Ok().json(doc! { "deletedCount": res.deleted_count as i64 }),
        Err(e) => {
            error!("Error deleting order {}: {}", id, e);
            HttpResponse::InternalServerError().body("Error deleting order")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn state_update_sets_status() {
        let update = order_state_update("shipped", &[]).unwrap();
        let set = update.get_document("$set").unwrap();
        assert_eq!(set.get_str("status").unwrap(), "shipped");
        assert!(update.get_document("$push").is_err());
    }

    #[test]
    fn steps_are_appended_with_each() {
        let steps = vec![json!({ "label": "shipped" }), json!({ "label": "out for delivery" })];
        let update = order_state_update("shipped", &steps).unwrap();
        let push = update.get_document("$push").unwrap();
        let each = push.get_document("orderSteps").unwrap().get_array("$each").unwrap();
        assert_eq!(each.len(), 2);
    }

    #[test]
    fn empty_state_is_rejected() {
        assert!(order_state_update("", &[]).is_none());
    }
}

use actix_web::{web, HttpResponse, Responder};
use log::error;
use mongodb::bson::{doc, to_bson, Bson, Document};
use serde::Deserialize;
use serde_json::Value;

use crate::app_state::AppState;
use crate::store::{collect_docs, json_to_doc, parse_object_id};

const COLLECTION: &str = "customers";

#[derive(Debug, Deserialize)]
pub struct MobilePatchRequest {
    pub phone: String,
}

#[derive(Debug, Deserialize)]
pub struct AddressPatchRequest {
    pub address: Value,
}

/// A customer is an admin when their role field is exactly "admin". A missing
/// customer or a missing role field is a defined non-admin, never an error.
pub fn is_admin(customer: Option<&Document>) -> bool {
    customer
        .map(|c| c.get_str("role") == Ok("admin"))
        .unwrap_or(false)
}

/// GET /customers
pub async fn list_customers(data: web::Data<AppState>) -> impl Responder {
    let coll = data.mongodb.db.collection::<Document>(COLLECTION);
    match coll.find(doc! {}).await {
        Ok(cursor) => match collect_docs(cursor).await {
            Ok(customers) => HttpResponse::Ok().json(customers),
            Err(e) => {
                error!("Cursor error listing customers: {}", e);
                HttpResponse::InternalServerError().body("Error fetching customers")
            }
        },
        Err(e) => {
            error!("Error listing customers: {}", e);
            HttpResponse::InternalServerError().body("Error fetching customers")
        }
    }
}

/// PUT /customers/email/{email} — upsert keyed on email.
pub async fn upsert_customer_by_email(
    data: web::Data<AppState>,
    email: web::Path<String>,
    payload: web::Json<Value>,
) -> impl Responder {
    upsert_customer(&data, doc! { "email": &*email }, &payload).await
}

/// PUT /customers/phone/{phone} — upsert keyed on phone.
pub async fn upsert_customer_by_phone(
    data: web::Data<AppState>,
    phone: web::Path<String>,
    payload: web::Json<Value>,
) -> impl Responder {
    upsert_customer(&data, doc! { "phone": &*phone }, &payload).await
}

async fn upsert_customer(data: &AppState, filter: Document, body: &Value) -> HttpResponse {
    let set_doc = match json_to_doc(body) {
        Some(doc) => doc,
        None => return HttpResponse::BadRequest().body("Body must be a JSON object"),
    };
    let coll = data.mongodb.db.collection::<Document>(COLLECTION);
    match coll
        .update_one(filter, doc! { "$set": set_doc })
        .upsert(true)
        .await
    {
        Ok(res) => {
            let upserted = res.upserted_id.unwrap_or(Bson::Null);
            HttpResponse::Ok().json(doc! {
                "matchedCount": res.matched_count as i64,
                "modifiedCount": res.modified_count as i64,
                "upsertedId": upserted,
            })
        }
        Err(e) => {
            error!("Error upserting customer: {}", e);
            HttpResponse::InternalServerError().body("Error saving customer")
        }
    }
}

/// PATCH /customer-mobile/{email}
pub async fn update_customer_mobile(
    data: web::Data<AppState>,
    email: web::Path<String>,
    payload: web::Json<MobilePatchRequest>,
) -> impl Responder {
    if payload.phone.is_empty() {
        return HttpResponse::BadRequest().body("Missing phone");
    }
    patch_customer(&data, &email, doc! { "phone": &payload.phone }).await
}

/// PATCH /customer-address/{email}
pub async fn update_customer_address(
    data: web::Data<AppState>,
    email: web::Path<String>,
    payload: web::Json<AddressPatchRequest>,
) -> impl Responder {
    let address = match to_bson(&payload.address) {
        Ok(bson) => bson,
        Err(e) => {
            error!("Unserializable address payload: {}", e);
            return HttpResponse::BadRequest().body("Invalid address");
        }
    };
    patch_customer(&data, &email, doc! { "address": address }).await
}

async fn patch_customer(data: &AppState, email: &str, set_doc: Document) -> HttpResponse {
    let coll = data.mongodb.db.collection::<Document>(COLLECTION);
    match coll
        .update_one(doc! { "email": email }, doc! { "$set": set_doc })
        .await
    {
        Ok(res) if res.matched_count == 0 => HttpResponse::NotFound().body("Customer not found"),
        Ok(res) => HttpResponse::Ok().json(doc! {
            "matchedCount": res.matched_count as i64,
            "modifiedCount": res.modified_count as i64,
        }),
        Err(e) => {
            error!("Error patching customer {}: {}", email, e);
            HttpResponse::InternalServerError().body("Error updating customer")
        }
    }
}

/// DELETE /customer-delete/{id}
pub async fn delete_customer(data: web::Data<AppState>, id: web::Path<String>) -> impl Responder {
    let oid = match parse_object_id(&id) {
        Some(oid) => oid,
        None => return HttpResponse::BadRequest().body("Invalid customer id"),
    };
    let coll = data.mongodb.db.collection::<Document>(COLLECTION);
    match coll.delete_one(doc! { "_id": oid }).await {
        Ok(res) if res.deleted_count == 0 => HttpResponse::NotFound().body("Customer not found"),
        Ok(res) => HttpResponse::Ok().json(doc! { "deletedCount": res.deleted_count as i64 }),
        Err(e) => {
            error!("Error deleting customer {}: {}", id, e);
            HttpResponse::InternalServerError().body("Error deleting customer")
        }
    }
}

/// GET /admin/{email} — always answers `{ "admin": bool }`; an unknown email
/// is simply not an admin.
pub async fn check_admin(data: web::Data<AppState>, email: web::Path<String>) -> impl Responder {
    let coll = data.mongodb.db.collection::<Document>(COLLECTION);
    match coll.find_one(doc! { "email": &*email }).await {
        Ok(customer) => HttpResponse::Ok().json(doc! { "admin": is_admin(customer.as_ref()) }),
        Err(e) => {
            error!("Error checking admin for {}: {}", email, e);
            HttpResponse::InternalServerError().body("Error checking admin")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_role_matches() {
        let customer = doc! { "email": "a@x.com", "role": "admin" };
        assert!(is_admin(Some(&customer)));
    }

    #[test]
    fn other_roles_are_not_admin() {
        let customer = doc! { "email": "a@x.com", "role": "buyer" };
        assert!(!is_admin(Some(&customer)));
    }

    #[test]
    fn missing_role_field_is_not_admin() {
        let customer = doc! { "email": "a@x.com" };
        assert!(!is_admin(Some(&customer)));
    }

    #[test]
    fn unknown_customer_is_not_admin() {
        assert!(!is_admin(None));
    }
}

use actix_web::{web, HttpResponse, Responder};
use log::error;
use mongodb::bson::{doc, to_bson, Bson, Document};
use serde::Deserialize;
use serde_json::Value;

use crate::app_state::AppState;
use crate::store::{collect_docs, json_to_doc, parse_object_id};

const COLLECTION: &str = "products";

#[derive(Debug, Deserialize)]
pub struct ImagePatchRequest {
    pub images: Vec<String>,
}

/// Legacy single-field patch: `{ "query": "<field>", "inputValue": <value> }`.
#[derive(Debug, Deserialize)]
pub struct FieldPatchRequest {
    pub query: String,
    #[serde(rename = "inputValue")]
    pub input_value: Value,
}

/// Build the `$set` document for the legacy single-field patch. `None` when
/// the field name is empty or the value has no BSON representation.
pub fn single_field_set(field: &str, value: &Value) -> Option<Document> {
    if field.is_empty() {
        return None;
    }
    let bson: Bson = to_bson(value).ok()?;
    Some(doc! { field: bson })
}

/// GET /products
pub async fn list_products(data: web::Data<AppState>) -> impl Responder {
    let coll = data.mongodb.db.collection::<Document>(COLLECTION);
    match coll.find(doc! {}).await {
        Ok(cursor) => match collect_docs(cursor).await {
            Ok(products) => HttpResponse::Ok().json(products),
            Err(e) => {
                error!("Cursor error listing products: {}", e);
                HttpResponse::InternalServerError().body("Error fetching products")
            }
        },
        Err(e) => {
            error!("Error listing products: {}", e);
            HttpResponse::InternalServerError().body("Error fetching products")
        }
    }
}

/// GET /product/{id}
pub async fn get_product(data: web::Data<AppState>, id: web::Path<String>) -> impl Responder {
    let oid = match parse_object_id(&id) {
        Some(oid) => oid,
        None => return HttpResponse::BadRequest().body("Invalid product id"),
    };
    let coll = data.mongodb.db.collection::<Document>(COLLECTION);
    match coll.find_one(doc! { "_id": oid }).await {
        Ok(Some(product)) => HttpResponse::Ok().json(product),
        Ok(None) => HttpResponse::NotFound().body("Product not found"),
        Err(e) => {
            error!("Error fetching product {}: {}", id, e);
            HttpResponse::InternalServerError().body("Error fetching product")
        }
    }
}

/// GET /category/{name} — every product filed under the named category.
pub async fn get_products_by_category(
    data: web::Data<AppState>,
    name: web::Path<String>,
) -> impl Responder {
    let coll = data.mongodb.db.collection::<Document>(COLLECTION);
    match coll.find(doc! { "category": &*name }).await {
        Ok(cursor) => match collect_docs(cursor).await {
            Ok(products) => HttpResponse::Ok().json(products),
            Err(e) => {
                error!("Cursor error for category {}: {}", name, e);
                HttpResponse::InternalServerError().body("Error fetching products")
            }
        },
        Err(e) => {
            error!("Error fetching category {}: {}", name, e);
            HttpResponse::InternalServerError().body("Error fetching products")
        }
    }
}

/// POST /products — inserts the body verbatim, no field validation.
pub async fn create_product(
    data: web::Data<AppState>,
    payload: web::Json<Value>,
) -> impl Responder {
    let new_product = match json_to_doc(&payload) {
        Some(doc) => doc,
        None => return HttpResponse::BadRequest().body("Body must be a JSON object"),
    };
    let coll = data.mongodb.db.collection::<Document>(COLLECTION);
    match coll.insert_one(new_product).await {
        Ok(res) => HttpResponse::Ok().json(doc! { "insertedId": res.inserted_id }),
        Err(e) => {
            error!("Error inserting product: {}", e);
            HttpResponse::InternalServerError().body("Error creating product")
        }
    }
}

/// PATCH /product_image/{id}
pub async fn update_product_images(
    data: web::Data<AppState>,
    id: web::Path<String>,
    payload: web::Json<ImagePatchRequest>,
) -> impl Responder {
    let oid = match parse_object_id(&id) {
        Some(oid) => oid,
        None => return HttpResponse::BadRequest().body("Invalid product id"),
    };
    let coll = data.mongodb.db.collection::<Document>(COLLECTION);
    match coll
        .update_one(
            doc! { "_id": oid },
            doc! { "$set": { "images": payload.images.clone() } },
        )
        .await
    {
        Ok(res) if res.matched_count == 0 => HttpResponse::NotFound().body("Product not found"),
        Ok(res) => HttpResponse::Ok().json(doc! {
            "matchedCount": res.matched_count as i64,
            "modifiedCount": res.modified_count as i64,
        }),
        Err(e) => {
            error!("Error updating product images {}: {}", id, e);
            HttpResponse::InternalServerError().body("Error updating product")
        }
    }
}

/// PATCH /edit_product/{id} — partial update, only supplied fields change.
pub async fn edit_product(
    data: web::Data<AppState>,
    id: web::Path<String>,
    payload: web::Json<Value>,
) -> impl Responder {
    let oid = match parse_object_id(&id) {
        Some(oid) => oid,
        None => return HttpResponse::BadRequest().body("Invalid product id"),
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
        Ok(res) if res.matched_count == 0 => HttpResponse::NotFound().body("Product not found"),
        Ok(res) => HttpResponse::Ok().json(doc! {
            "matchedCount": res.matched_count as i64,
            "modifiedCount": res.modified_count as i64,
        }),
        Err(e) => {
            error!("Error editing product {}: {}", id, e);
            HttpResponse::InternalServerError().body("Error updating product")
        }
    }
}

/// PATCH /product/{id} — legacy single-field patch.
pub async fn patch_product_field(
    data: web::Data<AppState>,
    id: web::Path<String>,
    payload: web::Json<FieldPatchRequest>,
) -> impl Responder {
    let oid = match parse_object_id(&id) {
        Some(oid) => oid,
        None => return HttpResponse::BadRequest().body("Invalid product id"),
    };
    let set_doc = match single_field_set(&payload.query, &payload.input_value) {
        Some(doc) => doc,
        None => return HttpResponse::BadRequest().body("Missing field name"),
    };
    let coll = data.mongodb.db.collection::<Document>(COLLECTION);
    match coll
        .update_one(doc! { "_id": oid }, doc! { "$set": set_doc })
        .await
    {
        Ok(res) if res.matched_count == 0 => HttpResponse::NotFound().body("Product not found"),
        Ok(res) => HttpResponse::Ok().json(doc! {
            "matchedCount": res.matched_count as i64,
            "modifiedCount": res.modified_count as i64,
        }),
        Err(e) => {
            error!("Error patching product {}: {}", id, e);
            HttpResponse::InternalServerError().body("Error updating product")
        }
    }
}

/// DELETE /product-delete/{id}
pub async fn delete_product(data: web::Data<AppState>, id: web::Path<String>) -> impl Responder {
    let oid = match parse_object_id(&id) {
        Some(oid) => oid,
        None => return HttpResponse::BadRequest().body("Invalid product id"),
    };
    let coll = data.mongodb.db.collection::<Document>(COLLECTION);
    match coll.delete_one(doc! { "_id": oid }).await {
        Ok(res) if res.deleted_count == 0 => HttpResponse::NotFound().body("Product not found"),
        Ok(res) => HttpResponse::Ok().json(doc! { "deletedCount": res.deleted_count as i64 }),
        Err(e) => {
            error!("Error deleting product {}: {}", id, e);
            HttpResponse::InternalServerError().body("Error deleting product")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn single_field_set_wraps_value() {
        let set = single_field_set("price", &json!(19.99)).unwrap();
        assert_eq!(set.get_f64("price").unwrap(), 19.99);
    }

    #[test]
    fn single_field_set_accepts_nested_values() {
        let set = single_field_set("whyBest", &json!(["fast", "cheap"])).unwrap();
        assert!(set.get_array("whyBest").is_ok());
    }

    #[test]
    fn single_field_set_rejects_empty_field_name() {
        assert!(single_field_set("", &json!("x")).is_none());
    }
}

// src/main.rs

mod app_state;
mod banner;
mod category;
mod config;
mod coupon;
mod customer;
mod order;
mod product;
mod promo;
mod sales;
mod store;
mod upload;

use std::fs;
use std::sync::Arc;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{middleware::Logger, web, App, HttpResponse, HttpServer, Responder};
use env_logger::Env;
use log::info;

use crate::app_state::AppState;
use crate::banner::{list_banners, replace_banners};
use crate::category::{
    create_category, delete_category, edit_category, get_category_by_id, list_categories,
    update_category_image,
};
use crate::coupon::{create_coupon, delete_coupon, list_coupons};
use crate::customer::{
    check_admin, delete_customer, list_customers, update_customer_address,
    update_customer_mobile, upsert_customer_by_email, upsert_customer_by_phone,
};
use crate::order::{
    create_order, delete_order, get_orders_by_email, get_orders_by_phone, list_orders,
    update_order_state,
};
use crate::product::{
    create_product, delete_product, edit_product, get_product, get_products_by_category,
    list_products, patch_product_field, update_product_images,
};
use crate::promo::{
    add_product_to_iconic, add_product_to_special, create_iconic_category,
    create_special_category, delete_iconic_category, delete_special_category,
    get_iconic_category, get_special_category, list_iconic_categories, list_special_categories,
    remove_product_from_iconic, remove_product_from_special, update_special_timer,
};
use crate::sales::{
    last_month_sales, last_seven_days_sales, monthly_summary, this_month_sales, today_sales,
    total_sales,
};
use crate::upload::{delete_upload, upload_file};

async fn welcome() -> impl Responder {
    HttpResponse::Ok().body("Bazaar backend is running")
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = config::Config::from_env();
    let mongodb = Arc::new(store::MongoDB::init(&config.mongo_uri, &config.database_name).await);
    fs::create_dir_all(&config.upload_dir)?;

    let bind_addr = ("0.0.0.0", config.port);
    info!("Server running at http://{}:{}", bind_addr.0, bind_addr.1);

    let upload_dir = config.upload_dir.clone();
    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(web::Data::new(AppState {
                mongodb: mongodb.clone(),
                config: config.clone(),
            }))
            .route("/", web::get().to(welcome))
            // PRODUCTS
            .route("/products", web::get().to(list_products))
            .route("/products", web::post().to(create_product))
            .route("/product/{id}", web::get().to(get_product))
            .route("/product/{id}", web::patch().to(patch_product_field))
            .route("/product_image/{id}", web::patch().to(update_product_images))
            .route("/edit_product/{id}", web::patch().to(edit_product))
            .route("/product-delete/{id}", web::delete().to(delete_product))
            .route("/category/{name}", web::get().to(get_products_by_category))
            // CATEGORIES
            .route("/categories", web::get().to(list_categories))
            .route("/categories", web::post().to(create_category))
            .route("/category_by_id/{id}", web::get().to(get_category_by_id))
            .route("/category_image/{id}", web::patch().to(update_category_image))
            .route("/edit_category/{id}", web::patch().to(edit_category))
            .route("/category-delete/{id}", web::delete().to(delete_category))
            // SPECIAL CATEGORIES
            .route("/special_categories", web::get().to(list_special_categories))
            .route("/special_categories", web::post().to(create_special_category))
            .route("/special_category/{id}", web::get().to(get_special_category))
            .route(
                "/special_category_delete/{id}",
                web::delete().to(delete_special_category),
            )
            .route(
                "/special_category/{id}/add-product",
                web::patch().to(add_product_to_special),
            )
            .route(
                "/special_category/{id}/remove-product",
                web::patch().to(remove_product_from_special),
            )
            .route(
                "/special_category/{id}/update-timer",
                web::patch().to(update_special_timer),
            )
            // ICONIC CATEGORIES
            .route("/iconic_categories", web::get().to(list_iconic_categories))
            .route("/iconic_categories", web::post().to(create_iconic_category))
            .route("/iconic_category/{id}", web::get().to(get_iconic_category))
            .route(
                "/iconic_category_delete/{id}",
                web::delete().to(delete_iconic_category),
            )
            .route(
                "/iconic_category/{id}/add-product",
                web::patch().to(add_product_to_iconic),
            )
            .route(
                "/iconic_category/{id}/remove-product",
                web::patch().to(remove_product_from_iconic),
            )
            // BANNERS
            .route("/banner", web::get().to(list_banners))
            .route("/banner", web::post().to(replace_banners))
            // ORDERS
            .route("/orders", web::get().to(list_orders))
            .route("/orders", web::post().to(create_order))
            .route("/order/{email}", web::get().to(get_orders_by_email))
            .route("/order_by_phone/{phone}", web::get().to(get_orders_by_phone))
            .route("/order_state/{id}", web::patch().to(update_order_state))
            .route("/order-delete/{id}", web::delete().to(delete_order))
            // COUPONS
            .route("/coupons", web::get().to(list_coupons))
            .route("/coupon", web::post().to(create_coupon))
            .route("/coupon/{id}", web::delete().to(delete_coupon))
            // CUSTOMERS
            .route("/customers", web::get().to(list_customers))
            .route(
                "/customers/email/{email}",
                web::put().to(upsert_customer_by_email),
            )
            .route(
                "/customers/phone/{phone}",
                web::put().to(upsert_customer_by_phone),
            )
            .route("/customer-delete/{id}", web::delete().to(delete_customer))
            .route(
                "/customer-mobile/{email}",
                web::patch().to(update_customer_mobile),
            )
            .route(
                "/customer-address/{email}",
                web::patch().to(update_customer_address),
            )
            .route("/admin/{email}", web::get().to(check_admin))
            // SALES
            .service(
                web::scope("/api/sales")
                    .route("/total", web::get().to(total_sales))
                    .route("/monthly-summary", web::get().to(monthly_summary))
                    .route("/last-month", web::get().to(last_month_sales))
                    .route("/this-month", web::get().to(this_month_sales))
                    .route("/last-7-days", web::get().to(last_seven_days_sales))
                    .route("/today", web::get().to(today_sales)),
            )
            // UPLOADS
            .route("/upload", web::post().to(upload_file))
            .route("/delete", web::delete().to(delete_upload))
            .service(Files::new("/uploads", upload_dir.clone()))
    })
    .bind(bind_addr)?
    .run()
    .await
}

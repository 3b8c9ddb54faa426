//! Sales summaries over delivered orders. Order dates are ISO `YYYY-MM-DD`
//! strings, so range filters are plain string comparisons and the monthly
//! bucket key is the first seven characters of the date.

use actix_web::{web, HttpResponse, Responder};
use chrono::{Datelike, NaiveDate, Utc};
use log::error;
use mongodb::bson::{doc, Bson, Document};

use crate::app_state::AppState;
use crate::store::collect_docs;

const COLLECTION: &str = "orders";

fn iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Half-open window covering the month `today` falls in.
pub fn month_window(today: NaiveDate) -> (String, String) {
    let start = today.with_day(1).unwrap_or(today);
    let next = if today.month() == 12 {
        NaiveDate::from_ymd_opt(today.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(today.year(), today.month() + 1, 1)
    }
    .unwrap_or(start);
    (iso(start), iso(next))
}

/// Half-open window covering the month before the one `today` falls in.
pub fn previous_month_window(today: NaiveDate) -> (String, String) {
    let this_start = today.with_day(1).unwrap_or(today);
    let prev_start = if today.month() == 1 {
        NaiveDate::from_ymd_opt(today.year() - 1, 12, 1)
    } else {
        NaiveDate::from_ymd_opt(today.year(), today.month() - 1, 1)
    }
    .unwrap_or(this_start);
    (iso(prev_start), iso(this_start))
}

/// First day of the trailing n-day window ending today (inclusive).
pub fn trailing_window_start(today: NaiveDate, days: u64) -> String {
    let start = today - chrono::Duration::days(days.saturating_sub(1) as i64);
    iso(start)
}

pub fn match_delivered() -> Document {
    doc! { "status": "delivered" }
}

pub fn match_delivered_range(start: &str, end_exclusive: &str) -> Document {
    doc! { "status": "delivered", "date": { "$gte": start, "$lt": end_exclusive } }
}

pub fn match_delivered_since(start: &str) -> Document {
    doc! { "status": "delivered", "date": { "$gte": start } }
}

pub fn match_delivered_on(day: &str) -> Document {
    doc! { "status": "delivered", "date": day }
}

/// Single-bucket pipeline: sum of totals plus order count for the match.
pub fn summary_pipeline(match_doc: Document) -> Vec<Document> {
    vec![
        doc! { "$match": match_doc },
        doc! { "$group": {
            "_id": Bson::Null,
            "totalSales": { "$sum": "$total" },
            "orderCount": { "$sum": 1 },
        } },
        doc! { "$project": { "_id": 0, "totalSales": 1, "orderCount": 1 } },
    ]
}

/// Per-month buckets over all delivered orders, keyed on `YYYY-MM`.
pub fn monthly_summary_pipeline() -> Vec<Document> {
    vec![
        doc! { "$match": match_delivered() },
        doc! { "$group": {
            "_id": { "$substrBytes": ["$date", 0, 7] },
            "totalSales": { "$sum": "$total" },
            "orderCount": { "$sum": 1 },
        } },
        doc! { "$sort": { "_id": 1 } },
        doc! { "$project": { "_id": 0, "month": "$_id", "totalSales": 1, "orderCount": 1 } },
    ]
}

fn zero_summary() -> Document {
    doc! { "totalSales": 0.0, "orderCount": 0_i64 }
}

/// Run a single-bucket pipeline and answer its one document, or the
/// zero-valued summary when no delivered orders match.
async fn run_summary(data: &AppState, match_doc: Document) -> HttpResponse {
    let coll = data.mongodb.db.collection::<Document>(COLLECTION);
    match coll.aggregate(summary_pipeline(match_doc)).await {
        Ok(cursor) => match collect_docs(cursor).await {
            Ok(mut docs) => match docs.pop() {
                Some(summary) => HttpResponse::Ok().json(summary),
                None => HttpResponse::Ok().json(zero_summary()),
            },
            Err(e) => {
                error!("Cursor error in sales summary: {}", e);
                HttpResponse::InternalServerError().body("Error computing sales summary")
            }
        },
        Err(e) => {
            error!("Error aggregating sales: {}", e);
            HttpResponse::InternalServerError().body("Error computing sales summary")
        }
    }
}

/// GET /api/sales/total — all delivered orders, no date bound.
pub async fn total_sales(data: web::Data<AppState>) -> impl Responder {
    run_summary(&data, match_delivered()).await
}

/// GET /api/sales/monthly-summary
pub async fn monthly_summary(data: web::Data<AppState>) -> impl Responder {
    let coll = data.mongodb.db.collection::<Document>(COLLECTION);
    match coll.aggregate(monthly_summary_pipeline()).await {
        Ok(cursor) => match collect_docs(cursor).await {
            Ok(months) => HttpResponse::Ok().json(months),
            Err(e) => {
                error!("Cursor error in monthly summary: {}", e);
                HttpResponse::InternalServerError().body("Error computing sales summary")
            }
        },
        Err(e) => {
            error!("Error aggregating monthly summary: {}", e);
            HttpResponse::InternalServerError().body("Error computing sales summary")
        }
    }
}

/// GET /api/sales/this-month
pub async fn this_month_sales(data: web::Data<AppState>) -> impl Responder {
    let (start, end) = month_window(Utc::now().date_naive());
    run_summary(&data, match_delivered_range(&start, &end)).await
}

/// GET /api/sales/last-month
pub async fn last_month_sales(data: web::Data<AppState>) -> impl Responder {
    let (start, end) = previous_month_window(Utc::now().date_naive());
    run_summary(&data, match_delivered_range(&start, &end)).await
}

/// GET /api/sales/last-7-days
pub async fn last_seven_days_sales(data: web::Data<AppState>) -> impl Responder {
    let start = trailing_window_start(Utc::now().date_naive(), 7);
    run_summary(&data, match_delivered_since(&start)).await
}

/// GET /api/sales/today
pub async fn today_sales(data: web::Data<AppState>) -> impl Responder {
    let today = iso(Utc::now().date_naive());
    run_summary(&data, match_delivered_on(&today)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_window_covers_calendar_month() {
        let (start, end) = month_window(day(2024, 3, 17));
        assert_eq!(start, "2024-03-01");
        assert_eq!(end, "2024-04-01");
    }

    #[test]
    fn month_window_rolls_over_december() {
        let (start, end) = month_window(day(2024, 12, 5));
        assert_eq!(start, "2024-12-01");
        assert_eq!(end, "2025-01-01");
    }

    #[test]
    fn previous_month_window_rolls_back_january() {
        let (start, end) = previous_month_window(day(2024, 1, 9));
        assert_eq!(start, "2023-12-01");
        assert_eq!(end, "2024-01-01");
    }

    #[test]
    fn trailing_window_includes_today() {
        assert_eq!(trailing_window_start(day(2024, 3, 10), 7), "2024-03-04");
        assert_eq!(trailing_window_start(day(2024, 3, 10), 1), "2024-03-10");
    }

    #[test]
    fn trailing_window_crosses_month_boundary() {
        assert_eq!(trailing_window_start(day(2024, 3, 2), 7), "2024-02-25");
    }

    #[test]
    fn summary_pipeline_filters_delivered_in_range() {
        let pipeline = summary_pipeline(match_delivered_range("2024-03-01", "2024-04-01"));
        let matched = pipeline[0].get_document("$match").unwrap();
        assert_eq!(matched.get_str("status").unwrap(), "delivered");
        let range = matched.get_document("date").unwrap();
        assert_eq!(range.get_str("$gte").unwrap(), "2024-03-01");
        assert_eq!(range.get_str("$lt").unwrap(), "2024-04-01");
    }

    #[test]
    fn monthly_pipeline_groups_on_month_prefix() {
        let pipeline = monthly_summary_pipeline();
        let group = pipeline[1].get_document("$group").unwrap();
        let key = group.get_document("_id").unwrap();
        let parts = key.get_array("$substrBytes").unwrap();
        assert_eq!(parts[0].as_str().unwrap(), "$date");
        assert_eq!(parts[2].as_i32().unwrap(), 7);
    }

    #[test]
    fn zero_summary_has_defined_shape() {
        let summary = zero_summary();
        assert_eq!(summary.get_f64("totalSales").unwrap(), 0.0);
        assert_eq!(summary.get_i64("orderCount").unwrap(), 0);
    }
}

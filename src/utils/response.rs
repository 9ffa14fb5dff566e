use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};

pub fn ok<T: Serialize>(message: &str, data: T) -> Response {
    with_status(StatusCode::OK, message, data)
}

pub fn created<T: Serialize>(message: &str, data: T) -> Response {
    with_status(StatusCode::CREATED, message, data)
}

pub fn message(message: &str) -> Response {
    with_status(StatusCode::OK, message, Value::Null)
}

pub fn with_status<T: Serialize>(status: StatusCode, message: &str, data: T) -> Response {
    (
        status,
        Json(json!({
            "success": true,
            "message": message,
            "data": data,
        })),
    )
        .into_response()
}

pub fn failure(status: StatusCode, message: &str, errors: Vec<Value>) -> Response {
    (
        status,
        Json(json!({
            "success": false,
            "message": message,
            "errors": errors,
        })),
    )
        .into_response()
}

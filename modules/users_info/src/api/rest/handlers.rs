use axum::{
    extract::{rejection::JsonRejection, Path},
    http::{StatusCode, Uri},
    response::Json,
    Extension,
};
use std::sync::Arc;
use tracing::{error, info};

use crate::api::rest::dto::{CreateUserReq, UpdateUserReq, UserDto};
use crate::api::rest::error::{invalid_json, map_domain_error};
use crate::domain::service::Service;
use modkit::api::problem::{Problem, ProblemResponse};
use modkit::XRequestId;

fn request_id(rid: &Option<Extension<XRequestId>>) -> Option<&str> {
    rid.as_ref().map(|Extension(XRequestId(id))| id.as_str())
}

/// List all users
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "users",
    operation_id = "users_info.list_users",
    responses(
        (status = 200, description = "All users", body = [UserDto]),
        (status = 500, description = "Internal Server Error", body = Problem)
    )
)]
pub async fn list_users(
    Extension(svc): Extension<Arc<Service>>,
    rid: Option<Extension<XRequestId>>,
    uri: Uri,
) -> Result<Json<Vec<UserDto>>, ProblemResponse> {
    info!("Listing users");

    match svc.list_users().await {
        Ok(users) => Ok(Json(users.into_iter().map(UserDto::from).collect())),
        Err(e) => {
            error!("Failed to list users: {}", e);
            Err(map_domain_error(&e, uri.path(), request_id(&rid)))
        }
    }
}

/// Get a specific user by ID
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "users",
    operation_id = "users_info.get_user",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User found", body = UserDto),
        (status = 404, description = "Not Found", body = Problem),
        (status = 500, description = "Internal Server Error", body = Problem)
    )
)]
pub async fn get_user(
    Extension(svc): Extension<Arc<Service>>,
    rid: Option<Extension<XRequestId>>,
    Path(id): Path<String>,
    uri: Uri,
) -> Result<Json<UserDto>, ProblemResponse> {
    info!("Getting user with id: {}", id);

    match svc.get_user(&id).await {
        Ok(user) => Ok(Json(UserDto::from(user))),
        Err(e) => {
            info!("Failed to get user {}: {}", id, e);
            Err(map_domain_error(&e, uri.path(), request_id(&rid)))
        }
    }
}

/// Create a new user
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "users",
    operation_id = "users_info.create_user",
    request_body = CreateUserReq,
    responses(
        (status = 201, description = "Created user", body = UserDto),
        (status = 406, description = "Malformed body or missing name", body = Problem),
        (status = 500, description = "Internal Server Error", body = Problem)
    )
)]
pub async fn create_user(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    rid: Option<Extension<XRequestId>>,
    payload: Result<Json<CreateUserReq>, JsonRejection>,
) -> Result<(StatusCode, Json<UserDto>), ProblemResponse> {
    let Json(req_body) = payload.map_err(|rejection| {
        info!("Rejected create body: {}", rejection.body_text());
        invalid_json(
            StatusCode::NOT_ACCEPTABLE,
            &rejection,
            uri.path(),
            request_id(&rid),
        )
    })?;
    info!("Creating user: {:?}", req_body);

    match svc.create_user(req_body.into()).await {
        Ok(user) => Ok((StatusCode::CREATED, Json(UserDto::from(user)))),
        Err(e) => {
            error!("Failed to create user: {}", e);
            Err(map_domain_error(&e, uri.path(), request_id(&rid)))
        }
    }
}

/// Update an existing user; only present, non-empty fields change
#[utoipa::path(
    patch,
    path = "/api/users/{id}",
    tag = "users",
    operation_id = "users_info.update_user",
    params(("id" = String, Path, description = "User id")),
    request_body = UpdateUserReq,
    responses(
        (status = 206, description = "Merged user", body = UserDto),
        (status = 400, description = "Malformed body", body = Problem),
        (status = 404, description = "Not Found or update rejected", body = Problem)
    )
)]
pub async fn update_user(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    rid: Option<Extension<XRequestId>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateUserReq>, JsonRejection>,
) -> Result<(StatusCode, Json<UserDto>), ProblemResponse> {
    let Json(req_body) = payload.map_err(|rejection| {
        info!("Rejected update body for {}: {}", id, rejection.body_text());
        invalid_json(
            StatusCode::BAD_REQUEST,
            &rejection,
            uri.path(),
            request_id(&rid),
        )
    })?;
    info!("Updating user {} with: {:?}", id, req_body);

    match svc.update_user(&id, req_body.into()).await {
        Ok(user) => Ok((StatusCode::PARTIAL_CONTENT, Json(UserDto::from(user)))),
        Err(e) => {
            info!("Failed to update user {}: {}", id, e);
            Err(map_domain_error(&e, uri.path(), request_id(&rid)))
        }
    }
}

/// Delete a user by ID, returning the deleted record
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "users",
    operation_id = "users_info.delete_user",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 202, description = "Deleted user", body = UserDto),
        (status = 404, description = "Not Found", body = Problem),
        (status = 500, description = "Internal Server Error", body = Problem)
    )
)]
pub async fn delete_user(
    Extension(svc): Extension<Arc<Service>>,
    rid: Option<Extension<XRequestId>>,
    Path(id): Path<String>,
    uri: Uri,
) -> Result<(StatusCode, Json<UserDto>), ProblemResponse> {
    info!("Deleting user: {}", id);

    match svc.delete_user(&id).await {
        Ok(user) => Ok((StatusCode::ACCEPTED, Json(UserDto::from(user)))),
        Err(e) => {
            info!("Failed to delete user {}: {}", id, e);
            Err(map_domain_error(&e, uri.path(), request_id(&rid)))
        }
    }
}

//! Review REST API handlers

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};

use super::dto::ReviewListQuery;
use crate::application::{ErrorNormalizer, ReviewService};
use crate::domain::{DomainError, NewReview, Review};
use crate::interfaces::http::common::{
    ApiError, ApiPath, ApiQuery, ApiResponse, ErrorBody, ValidatedJson,
};

#[derive(Clone)]
pub struct ReviewApiState {
    pub service: Arc<ReviewService>,
    pub normalizer: ErrorNormalizer,
}

impl ReviewApiState {
    fn fail(&self, err: DomainError) -> ApiError {
        ApiError::from(self.normalizer.normalize(&err))
    }

    fn bad_request(&self, err: DomainError) -> ApiError {
        ApiError::bad_request(self.normalizer.normalize(&err))
    }
}

type ApiResult<T> = Result<T, ApiError>;

#[utoipa::path(
    get,
    path = "/api/v1/reviews",
    tag = "Reviews",
    params(ReviewListQuery),
    responses(
        (status = 200, description = "Review list", body = ApiResponse<Vec<Review>>),
        (status = 400, description = "Malformed filter", body = ErrorBody),
        (status = 500, description = "Storage failure", body = ErrorBody)
    )
)]
pub async fn list_reviews(
    State(state): State<ReviewApiState>,
    ApiQuery(query): ApiQuery<ReviewListQuery>,
) -> ApiResult<Json<ApiResponse<Vec<Review>>>> {
    let created_on = query.created_on().map_err(|e| state.bad_request(e))?;
    let reviews = match created_on {
        Some(date) => state.service.find_all_by_created_at(date).await,
        None => state.service.find_all().await,
    }
    .map_err(|e| state.fail(e))?;

    Ok(Json(ApiResponse::success(reviews)))
}

#[utoipa::path(
    get,
    path = "/api/v1/reviews/{id}",
    tag = "Reviews",
    params(("id" = i32, Path, description = "Review ID")),
    responses(
        (status = 200, description = "Review details", body = ApiResponse<Review>),
        (status = 400, description = "Malformed id", body = ErrorBody),
        (status = 404, description = "Not found", body = ErrorBody)
    )
)]
pub async fn get_review(
    State(state): State<ReviewApiState>,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<Json<ApiResponse<Review>>> {
    let review = state.service.find_by_id(id).await.map_err(|e| state.fail(e))?;
    Ok(Json(ApiResponse::success(review)))
}

#[utoipa::path(
    post,
    path = "/api/v1/reviews",
    tag = "Reviews",
    request_body = NewReview,
    responses(
        (status = 201, description = "Created", body = ApiResponse<Review>),
        (status = 404, description = "Course not found in the catalog", body = ErrorBody),
        (status = 422, description = "Invalid review", body = ErrorBody),
        (status = 503, description = "Catalog unavailable (only when outages are exposed)", body = ErrorBody)
    )
)]
pub async fn create_review(
    State(state): State<ReviewApiState>,
    ValidatedJson(body): ValidatedJson<NewReview>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Review>>)> {
    let review = state.service.save(body).await.map_err(|e| state.fail(e))?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(review))))
}

#[utoipa::path(
    put,
    path = "/api/v1/reviews/{id}",
    tag = "Reviews",
    params(("id" = i32, Path, description = "Review ID")),
    request_body = NewReview,
    responses(
        (status = 200, description = "Updated", body = ApiResponse<Review>),
        (status = 400, description = "Malformed id", body = ErrorBody),
        (status = 404, description = "Review, or its course in the catalog, not found", body = ErrorBody),
        (status = 422, description = "Invalid review", body = ErrorBody),
        (status = 503, description = "Catalog unavailable (only when outages are exposed)", body = ErrorBody)
    )
)]
pub async fn update_review(
    State(state): State<ReviewApiState>,
    ApiPath(id): ApiPath<i32>,
    ValidatedJson(body): ValidatedJson<NewReview>,
) -> ApiResult<Json<ApiResponse<Review>>> {
    let review = state.service.update(id, body).await.map_err(|e| state.fail(e))?;
    Ok(Json(ApiResponse::success(review)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/reviews/{id}",
    tag = "Reviews",
    params(("id" = i32, Path, description = "Review ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 400, description = "Malformed id", body = ErrorBody),
        (status = 404, description = "Not found", body = ErrorBody)
    )
)]
pub async fn delete_review(
    State(state): State<ReviewApiState>,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<StatusCode> {
    state.service.delete_by_id(id).await.map_err(|e| state.fail(e))?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/api/v1/cache/courses/{course_id}",
    tag = "Cache",
    params(("course_id" = i32, Path, description = "Course ID")),
    responses(
        (status = 204, description = "Cached course dropped (or was never cached)"),
        (status = 400, description = "Malformed course id", body = ErrorBody),
        (status = 500, description = "Cache failure", body = ErrorBody)
    )
)]
pub async fn evict_course(
    State(state): State<ReviewApiState>,
    ApiPath(course_id): ApiPath<i32>,
) -> ApiResult<StatusCode> {
    state
        .service
        .evict_course(course_id)
        .await
        .map_err(|e| state.fail(e))?;
    Ok(StatusCode::NO_CONTENT)
}

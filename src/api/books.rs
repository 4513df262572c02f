//! Book collection endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;

use crate::{
    error::{AppError, AppResult, ErrorResponse},
    models::{Book, BookPayload, BookQuery},
    AppState,
};

use super::{
    ApiResponse, BookCreated, BookCreatedResponse, BookDetail, BookDetailResponse, BookList,
    BookListResponse, BookUpdatedResponse, MessageResponse,
};

/// Add a book to the collection
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = BookPayload,
    responses(
        (status = 201, description = "Book added", body = BookCreatedResponse),
        (status = 400, description = "Missing name or readPage greater than pageCount", body = ErrorResponse),
        (status = 500, description = "Book could not be stored", body = ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    WithRejection(Json(data), _): WithRejection<Json<BookPayload>, AppError>,
) -> AppResult<(StatusCode, Json<ApiResponse<BookCreated>>)> {
    let book_id = state.services.books.create(&data).await?;

    let body = ApiResponse::success(BookCreated { book_id })
        .with_message("Book added successfully");
    Ok((StatusCode::CREATED, Json(body)))
}

/// List books, optionally filtered by name, reading or finished
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(BookQuery),
    responses(
        (status = 200, description = "Book summaries in insertion order", body = BookListResponse)
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    WithRejection(Query(pairs), _): WithRejection<Query<Vec<(String, String)>>, AppError>,
) -> AppResult<Json<ApiResponse<BookList>>> {
    let query = BookQuery::from_pairs(pairs);
    let books = state.services.books.list_filtered(&query).await;
    Ok(Json(ApiResponse::success(BookList { books })))
}

/// Get book details by ID
#[utoipa::path(
    get,
    path = "/books/{book_id}",
    tag = "books",
    params(("book_id" = String, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = BookDetailResponse),
        (status = 404, description = "Book not found", body = ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    Path(book_id): Path<String>,
) -> AppResult<Json<ApiResponse<BookDetail>>> {
    let book = state.services.books.get_by_id(&book_id).await?;
    Ok(Json(ApiResponse::success(BookDetail { book })))
}

/// Replace all mutable fields of a book
#[utoipa::path(
    put,
    path = "/books/{book_id}",
    tag = "books",
    params(("book_id" = String, Path, description = "Book ID")),
    request_body = BookPayload,
    responses(
        (status = 200, description = "Book updated", body = BookUpdatedResponse),
        (status = 400, description = "Missing name or readPage greater than pageCount", body = ErrorResponse),
        (status = 404, description = "Book not found", body = ErrorResponse)
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    Path(book_id): Path<String>,
    WithRejection(Json(data), _): WithRejection<Json<BookPayload>, AppError>,
) -> AppResult<Json<ApiResponse<Book>>> {
    let book = state.services.books.update_by_id(&book_id, &data).await?;
    Ok(Json(
        ApiResponse::success(book).with_message("Book updated successfully"),
    ))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{book_id}",
    tag = "books",
    params(("book_id" = String, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book deleted", body = MessageResponse),
        (status = 404, description = "Book not found", body = ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    Path(book_id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    state.services.books.delete_by_id(&book_id).await?;
    Ok(Json(MessageResponse::success("Book deleted successfully")))
}

//! API integration tests
//!
//! Run against a live server (database and Redis up) with:
//! cargo test -- --ignored

use reqwest::Client;
use serde_json::{json, Value};
use std::time::{SystemTime, UNIX_EPOCH};

const BASE_URL: &str = "http://localhost:8080";

/// Unique suffix so repeated runs don't collide on usernames/ISBNs
fn unique() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos()
}

/// Client with a cookie store, so sessions behave like a browser
fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to build client")
}

/// Register a member and return its id
async fn register_user(client: &Client, username: &str) -> i32 {
    let response = client
        .post(format!("{}/users/register", BASE_URL))
        .json(&json!({
            "username": username,
            "password": "password",
            "role": "member"
        }))
        .send()
        .await
        .expect("Failed to send register request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    body["user"]["id"].as_i64().expect("No user id in response") as i32
}

/// Create a book and return its ISBN
async fn create_book(client: &Client, quantity: i32) -> String {
    let isbn = format!("isbn-{}", unique());
    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({
            "isbn": isbn,
            "name": "Test Driven Development",
            "quantity": quantity,
            "price": 29.99
        }))
        .send()
        .await
        .expect("Failed to send create book request");

    assert!(response.status().is_success());
    isbn
}

#[tokio::test]
#[ignore]
async fn test_health_check() {
    let response = client()
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_register_sets_session_and_profile_works() {
    let client = client();
    let username = format!("reader-{}", unique());

    let user_id = register_user(&client, &username).await;

    let response = client
        .get(format!("{}/users/profile", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["user"]["id"].as_i64(), Some(user_id as i64));
    assert_eq!(body["user"]["username"], username.as_str());
    // Password must never appear in responses
    assert!(body["user"].get("password").is_none());
}

#[tokio::test]
#[ignore]
async fn test_register_duplicate_username() {
    let first = client();
    let username = format!("dup-{}", unique());

    register_user(&first, &username).await;

    // Fresh client: no session must be opened by the failing call
    let second = client();
    let response = second
        .post(format!("{}/users/register", BASE_URL))
        .json(&json!({
            "username": username,
            "password": "password",
            "role": "member"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);

    let profile = second
        .get(format!("{}/users/profile", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(profile.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_login_unknown_user() {
    let response = client()
        .post(format!("{}/users/login", BASE_URL))
        .json(&json!({
            "username": format!("nobody-{}", unique()),
            "password": "password"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_login_wrong_password() {
    let client = client();
    let username = format!("badpass-{}", unique());
    register_user(&client, &username).await;

    let response = client
        .post(format!("{}/users/login", BASE_URL))
        .json(&json!({
            "username": username,
            "password": "not-the-password"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_logout_closes_session() {
    let client = client();
    let username = format!("logout-{}", unique());
    register_user(&client, &username).await;

    let response = client
        .get(format!("{}/users/logout", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], true);

    let profile = client
        .get(format!("{}/users/profile", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(profile.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_borrow_unknown_book() {
    let client = client();
    let user_id = register_user(&client, &format!("ghostbook-{}", unique())).await;

    let response = client
        .post(format!("{}/users/borrow", BASE_URL))
        .json(&json!({ "isbn": "no-such-isbn", "userId": user_id }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_borrow_lifecycle_with_single_copy() {
    let client = client();
    let user_a = register_user(&client, &format!("alice-{}", unique())).await;
    let user_b = register_user(&client, &format!("bob-{}", unique())).await;
    let isbn = create_book(&client, 1).await;

    // A borrows the only copy
    let response = client
        .post(format!("{}/users/borrow", BASE_URL))
        .json(&json!({ "isbn": isbn, "userId": user_a }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["book"]["availableQuantity"].as_i64(), Some(0));

    // A cannot borrow it twice
    let response = client
        .post(format!("{}/users/borrow", BASE_URL))
        .json(&json!({ "isbn": isbn, "userId": user_a }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    // B is shut out while the copy is held
    let response = client
        .post(format!("{}/users/borrow", BASE_URL))
        .json(&json!({ "isbn": isbn, "userId": user_b }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    // A returns the book
    let response = client
        .post(format!("{}/users/return", BASE_URL))
        .json(&json!({ "isbn": isbn, "userId": user_a }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["book"]["availableQuantity"].as_i64(), Some(1));

    // Now B can borrow it
    let response = client
        .post(format!("{}/users/borrow", BASE_URL))
        .json(&json!({ "isbn": isbn, "userId": user_b }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["book"]["availableQuantity"].as_i64(), Some(0));
    assert_eq!(body["book"]["borrowedBy"], json!([user_b]));
}

#[tokio::test]
#[ignore]
async fn test_return_without_borrow() {
    let client = client();
    let user_id = register_user(&client, &format!("noloan-{}", unique())).await;
    let isbn = create_book(&client, 1).await;

    let response = client
        .post(format!("{}/users/return", BASE_URL))
        .json(&json!({ "isbn": isbn, "userId": user_id }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_accept_borrow_transitions_request() {
    let client = client();
    let user_id = register_user(&client, &format!("accepted-{}", unique())).await;
    // Two copies: the request leaves capacity for the acceptance re-check
    let isbn = create_book(&client, 2).await;

    let response = client
        .post(format!("{}/users/borrow", BASE_URL))
        .json(&json!({ "isbn": isbn, "userId": user_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let response = client
        .post(format!("{}/users/accept-borrow", BASE_URL))
        .json(&json!({ "isbn": isbn, "userId": user_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let details: Value = client
        .get(format!("{}/books/{}", BASE_URL, isbn))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    let borrows = details["book"]["borrows"]
        .as_array()
        .expect("borrows missing");
    assert_eq!(borrows.len(), 1);
    assert_eq!(borrows[0]["status"], "accepted");
    assert!(borrows[0]["returnedOn"].is_null());
}

#[tokio::test]
#[ignore]
async fn test_accept_borrow_without_request() {
    let client = client();
    let user_id = register_user(&client, &format!("norequest-{}", unique())).await;
    let isbn = create_book(&client, 2).await;

    let response = client
        .post(format!("{}/users/accept-borrow", BASE_URL))
        .json(&json!({ "isbn": isbn, "userId": user_id }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_borrowed_books_lists_open_borrows() {
    let client = client();
    let user_id = register_user(&client, &format!("shelf-{}", unique())).await;
    let isbn = create_book(&client, 1).await;

    let response = client
        .post(format!("{}/users/borrow", BASE_URL))
        .json(&json!({ "isbn": isbn, "userId": user_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = client
        .get(format!("{}/users/borrowed-books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    let books = body["books"].as_array().expect("books missing");
    assert!(books.iter().any(|b| b["isbn"] == isbn.as_str()));
}

#[tokio::test]
#[ignore]
async fn test_list_users_strips_passwords() {
    let client = client();
    register_user(&client, &format!("nopass-{}", unique())).await;

    let body: Value = client
        .get(format!("{}/users", BASE_URL))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    let users = body["users"].as_array().expect("users missing");
    assert!(!users.is_empty());
    assert!(users.iter().all(|u| u.get("password").is_none()));
}

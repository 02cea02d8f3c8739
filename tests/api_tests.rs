//! API integration tests
//!
//! These run against a live server with a freshly migrated database:
//! start the server, then `cargo test -- --ignored`.

use reqwest::Client;
use serde_json::{json, Value};
use std::time::{SystemTime, UNIX_EPOCH};

const BASE_URL: &str = "http://localhost:5000/api";

/// Unique suffix so repeated runs do not collide on uniqueness rules
fn unique(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{}-{}", prefix, nanos)
}

/// Helper to get an authenticated client
async fn get_auth_token(client: &Client) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "admin123"
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response
        .json()
        .await
        .expect("Failed to parse login response");
    body["token"]
        .as_str()
        .expect("No token in response")
        .to_string()
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
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
async fn test_login() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "admin123"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["username"], "admin");
    assert_eq!(body["role"], "Admin");

    // Token expires roughly 24 hours from now
    let expires_at = chrono_parse(body["expiresAt"].as_str().expect("No expiresAt"));
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;
    let delta = expires_at - now;
    assert!(delta > 23 * 3600 && delta <= 24 * 3600 + 60, "delta = {}", delta);
}

/// Minimal RFC 3339 timestamp to unix seconds, avoiding extra test deps
fn chrono_parse(s: &str) -> i64 {
    let datetime: chrono::DateTime<chrono::Utc> = s.parse().expect("Invalid timestamp");
    datetime.timestamp()
}

#[tokio::test]
#[ignore]
async fn test_login_failures_are_indistinguishable() {
    let client = Client::new();

    let wrong_password = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({"username": "admin", "password": "wrong"}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(wrong_password.status(), 401);
    let wrong_password: Value = wrong_password.json().await.unwrap();

    let no_such_user = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({"username": "no-such-user", "password": "whatever"}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(no_such_user.status(), 401);
    let no_such_user: Value = no_such_user.json().await.unwrap();

    assert_eq!(wrong_password["message"], no_such_user["message"]);
}

#[tokio::test]
#[ignore]
async fn test_authors_listing_is_public() {
    let client = Client::new();

    let response = client
        .get(format!("{}/authors", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    let authors = body.as_array().expect("Expected an array");
    for author in authors {
        assert!(author["bookCount"].is_number());
    }

    let dropdown = client
        .get(format!("{}/authors/dropdown", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert!(dropdown.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_books_require_auth() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_author_name_uniqueness_is_case_insensitive() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let name = unique("Jane Doe");

    let response = client
        .post(format!("{}/authors", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({"name": name}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let created: Value = response.json().await.unwrap();
    let author_id = created["id"].as_i64().expect("No author ID");

    // Same name, different case
    let duplicate = client
        .post(format!("{}/authors", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({"name": name.to_lowercase()}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(duplicate.status(), 400);

    // A distinct name succeeds
    let distinct = client
        .post(format!("{}/authors", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({"name": format!("{}2", name)}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(distinct.status(), 201);
    let distinct: Value = distinct.json().await.unwrap();

    // Cleanup
    for id in [author_id, distinct["id"].as_i64().unwrap()] {
        let _ = client
            .delete(format!("{}/authors/{}", BASE_URL, id))
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await;
    }
}

#[tokio::test]
#[ignore]
async fn test_author_with_books_cannot_be_deleted() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let author = client
        .post(format!("{}/authors", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({"name": unique("Busy Author")}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(author.status(), 201);
    let author: Value = author.json().await.unwrap();
    let author_id = author["id"].as_i64().unwrap();

    let book = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "title": unique("A Book"),
            "author": "placeholder",
            "quantity": 1,
            "authorId": author_id
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(book.status(), 201);
    let book: Value = book.json().await.unwrap();
    let book_id = book["id"].as_i64().unwrap();

    // The denormalized author field was synchronized to the linked author
    assert_eq!(book["author"], author["name"]);
    assert_eq!(book["authorName"], author["name"]);

    // Delete is refused and the message reports the exact count
    let refused = client
        .delete(format!("{}/authors/{}", BASE_URL, author_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(refused.status(), 400);
    let refused: Value = refused.json().await.unwrap();
    assert!(refused["message"]
        .as_str()
        .unwrap()
        .contains("1 book(s)"));

    // After the book is removed, deletion succeeds
    let removed = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert!(removed.status().is_success());

    let deleted = client
        .delete(format!("{}/authors/{}", BASE_URL, author_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert!(deleted.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_isbn_uniqueness_excludes_self() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let isbn = format!(
        "{}",
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos()
            % 10_000_000_000_000
    );

    let first = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "title": unique("First"),
            "author": "Somebody",
            "isbn": isbn,
            "quantity": 1
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(first.status(), 201);
    let first: Value = first.json().await.unwrap();
    let first_id = first["id"].as_i64().unwrap();

    // Another book with the same ISBN is rejected
    let duplicate = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "title": unique("Second"),
            "author": "Somebody Else",
            "isbn": isbn,
            "quantity": 1
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(duplicate.status(), 400);

    // Updating the book with its own ISBN succeeds
    let update = client
        .put(format!("{}/books/{}", BASE_URL, first_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "title": unique("First Revised"),
            "author": "Somebody",
            "isbn": isbn,
            "quantity": 2
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(update.status(), 200);
    let updated: Value = update.json().await.unwrap();
    assert_eq!(updated["quantity"], 2);
    assert_eq!(updated["createdAt"], first["createdAt"]);

    // Cleanup
    let _ = client
        .delete(format!("{}/books/{}", BASE_URL, first_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await;
}

#[tokio::test]
#[ignore]
async fn test_book_with_unknown_author_is_rejected() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "title": unique("Orphan"),
            "author": "Nobody",
            "quantity": 1,
            "authorId": 999999
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_search_books() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    // Seeded catalog: "1984" (Science Fiction), "The Great Gatsby" (Fiction),
    // "To Kill a Mockingbird" (Fiction)
    let by_category = client
        .get(format!("{}/books/search?category=fiction", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert!(by_category.status().is_success());
    let by_category: Value = by_category.json().await.unwrap();
    let titles: Vec<&str> = by_category
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["title"].as_str().unwrap())
        .collect();
    assert!(titles.contains(&"1984"));
    assert!(titles.contains(&"The Great Gatsby"));

    let by_title = client
        .get(format!("{}/books/search?title=1984", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    let by_title: Value = by_title.json().await.unwrap();
    assert_eq!(by_title.as_array().unwrap().len(), 1);
    assert_eq!(by_title[0]["title"], "1984");

    let by_author = client
        .get(format!("{}/books/search?author=orwell", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    let by_author: Value = by_author.json().await.unwrap();
    assert_eq!(by_author[0]["title"], "1984");
}

#[tokio::test]
#[ignore]
async fn test_user_lifecycle_and_login() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let username = unique("testuser");

    let created = client
        .post(format!("{}/users", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "username": username,
            "password": "testpass123",
            "role": "Member"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(created.status(), 201);
    let created: Value = created.json().await.unwrap();
    let user_id = created["id"].as_i64().expect("No user ID");
    assert!(created.get("passwordHash").is_none());

    // The new user can log in and the claims echo back
    let login = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({"username": username, "password": "testpass123"}))
        .send()
        .await
        .expect("Failed to send request");
    assert!(login.status().is_success());
    let login: Value = login.json().await.unwrap();
    assert_eq!(login["username"], username.as_str());
    assert_eq!(login["role"], "Member");

    // Duplicate username is rejected regardless of password
    let duplicate = client
        .post(format!("{}/users", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({"username": username, "password": "otherpass456"}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(duplicate.status(), 400);

    // Cleanup: delete the user (not an admin, so no guard applies)
    let deleted = client
        .delete(format!("{}/users/{}", BASE_URL, user_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert!(deleted.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_last_admin_cannot_be_deleted() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    // Find the admin users; when only one remains, deleting it must fail
    let users = client
        .get(format!("{}/users", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    let users: Value = users.json().await.unwrap();
    let admins: Vec<&Value> = users
        .as_array()
        .unwrap()
        .iter()
        .filter(|u| u["role"] == "Admin")
        .collect();

    if admins.len() == 1 {
        let id = admins[0]["id"].as_i64().unwrap();
        let response = client
            .delete(format!("{}/users/{}", BASE_URL, id))
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), 400);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["message"], "Cannot delete the last admin user");
    }
}

#[tokio::test]
#[ignore]
async fn test_member_cannot_write() {
    let client = Client::new();
    let admin_token = get_auth_token(&client).await;
    let username = unique("reader");

    let created = client
        .post(format!("{}/users", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&json!({
            "username": username,
            "password": "readerpass1",
            "role": "Member"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(created.status(), 201);
    let created: Value = created.json().await.unwrap();

    let login = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({"username": username, "password": "readerpass1"}))
        .send()
        .await
        .expect("Failed to send request");
    let login: Value = login.json().await.unwrap();
    let member_token = login["token"].as_str().unwrap();

    let forbidden = client
        .post(format!("{}/authors", BASE_URL))
        .header("Authorization", format!("Bearer {}", member_token))
        .json(&json!({"name": unique("Should Not Exist")}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(forbidden.status(), 403);

    // Cleanup
    let _ = client
        .delete(format!("{}/users/{}", BASE_URL, created["id"].as_i64().unwrap()))
        .header("Authorization", format!("Bearer {}", admin_token))
        .send()
        .await;
}

//! End-to-end scenarios against a migrated database.
//!
//! These tests require a `PostgreSQL` server that `#[sqlx::test]` can create
//! throwaway databases on, named by `DATABASE_URL`.
//!
//! Run with: `cargo test -p foodgram-integration-tests -- --ignored`

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::{Value, json};
use sqlx::PgPool;

use foodgram_integration_tests::{TestApp, recipe_body, seed_reference_data};

fn ids(page: &Value) -> Vec<i64> {
    page["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect()
}

// ============================================================================
// Recipes
// ============================================================================

#[sqlx::test(migrations = "../server/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_create_and_read_recipe(pool: PgPool) {
    let refs = seed_reference_data(&pool).await;
    let app = TestApp::with_pool(pool);
    let (author_id, token) = app.sign_up("chef").await;

    let created = app
        .create_recipe(
            &token,
            &recipe_body("Soup", &[(refs.water, 80), (refs.salt, 5)], &[refs.dinner]),
        )
        .await;

    assert_eq!(created["name"], "Soup");
    assert_eq!(created["author"]["id"], author_id);
    assert_eq!(created["author"]["is_subscribed"], false);
    assert_eq!(created["is_favorited"], false);
    assert_eq!(created["is_in_shopping_cart"], false);
    assert_eq!(created["tags"][0]["slug"], "dinner");
    assert_eq!(
        created["ingredients"],
        json!([
            { "id": refs.water, "name": "Water", "measurement_unit": "g", "amount": 80 },
            { "id": refs.salt, "name": "Salt", "measurement_unit": "g", "amount": 5 },
        ])
    );

    let image = created["image"].as_str().unwrap();
    let relative = image
        .strip_prefix("http://localhost:8000/media/")
        .expect("absolute media URL");
    assert!(app.media_root().join(relative).exists());

    let id = created["id"].as_i64().unwrap();
    let fetched = app.get(&format!("/api/recipes/{id}/"), None).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.json(), created);
}

#[sqlx::test(migrations = "../server/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_duplicate_ingredients_write_nothing(pool: PgPool) {
    let refs = seed_reference_data(&pool).await;
    let app = TestApp::with_pool(pool.clone());
    let (_, token) = app.sign_up("chef").await;

    let response = app
        .post(
            "/api/recipes/",
            Some(&token),
            &recipe_body("Salty", &[(refs.salt, 5), (refs.salt, 7)], &[refs.dinner]),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json()["ingredients"],
        json!(["Ingredients must not repeat."])
    );

    let (recipes,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM recipes")
        .fetch_one(&pool)
        .await
        .unwrap();
    let (lines,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM recipe_ingredients")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!((recipes, lines), (0, 0));
}

#[sqlx::test(migrations = "../server/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_unknown_ingredient_is_field_error(pool: PgPool) {
    let refs = seed_reference_data(&pool).await;
    let app = TestApp::with_pool(pool);
    let (_, token) = app.sign_up("chef").await;

    let response = app
        .post(
            "/api/recipes/",
            Some(&token),
            &recipe_body("Mystery", &[(9999, 1)], &[refs.dinner]),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json()["ingredients"],
        json!(["Ingredient with id 9999 does not exist."])
    );
}

#[sqlx::test(migrations = "../server/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_non_author_cannot_update(pool: PgPool) {
    let refs = seed_reference_data(&pool).await;
    let app = TestApp::with_pool(pool);
    let (_, author) = app.sign_up("chef").await;
    let (_, stranger) = app.sign_up("critic").await;

    let created = app
        .create_recipe(
            &author,
            &recipe_body("Soup", &[(refs.salt, 5)], &[refs.dinner]),
        )
        .await;
    let uri = format!("/api/recipes/{}/", created["id"]);

    let mut edit = recipe_body("Not Soup", &[(refs.carrot, 1)], &[refs.breakfast]);
    edit.as_object_mut().unwrap().remove("image");

    let response = app.patch(&uri, Some(&stranger), &edit).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app.delete(&uri, Some(&stranger)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let unchanged = app.get(&uri, None).await.json();
    assert_eq!(unchanged["name"], "Soup");
    assert_eq!(unchanged["ingredients"][0]["id"], refs.salt);
}

#[sqlx::test(migrations = "../server/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_author_update_replaces_children_and_keeps_image(pool: PgPool) {
    let refs = seed_reference_data(&pool).await;
    let app = TestApp::with_pool(pool);
    let (_, token) = app.sign_up("chef").await;

    let created = app
        .create_recipe(
            &token,
            &recipe_body("Soup", &[(refs.salt, 5), (refs.water, 80)], &[refs.dinner]),
        )
        .await;
    let uri = format!("/api/recipes/{}/", created["id"]);

    let mut edit = recipe_body("Carrot soup", &[(refs.carrot, 3)], &[refs.breakfast]);
    edit.as_object_mut().unwrap().remove("image");

    let response = app.patch(&uri, Some(&token), &edit).await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.text());
    let updated = response.json();

    assert_eq!(updated["name"], "Carrot soup");
    assert_eq!(updated["image"], created["image"]);
    assert_eq!(updated["tags"].as_array().unwrap().len(), 1);
    assert_eq!(updated["tags"][0]["id"], refs.breakfast);
    assert_eq!(
        updated["ingredients"],
        json!([{ "id": refs.carrot, "name": "Carrot", "measurement_unit": "pcs", "amount": 3 }])
    );
}

#[sqlx::test(migrations = "../server/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_delete_removes_recipe_and_image(pool: PgPool) {
    let refs = seed_reference_data(&pool).await;
    let app = TestApp::with_pool(pool);
    let (_, token) = app.sign_up("chef").await;
    let (_, fan) = app.sign_up("fan").await;

    let created = app
        .create_recipe(&token, &recipe_body("Soup", &[(refs.salt, 5)], &[refs.dinner]))
        .await;
    let id = created["id"].as_i64().unwrap();
    let relative = created["image"]
        .as_str()
        .unwrap()
        .strip_prefix("http://localhost:8000/media/")
        .unwrap()
        .to_string();

    let favorited = app
        .post(&format!("/api/recipes/{id}/favorite/"), Some(&fan), &json!({}))
        .await;
    assert_eq!(favorited.status, StatusCode::CREATED);

    let response = app.delete(&format!("/api/recipes/{id}/"), Some(&token)).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let gone = app.get(&format!("/api/recipes/{id}/"), None).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    assert!(!app.media_root().join(relative).exists());
}

#[sqlx::test(migrations = "../server/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_listing_filters_and_pagination(pool: PgPool) {
    let refs = seed_reference_data(&pool).await;
    let app = TestApp::with_pool(pool);
    let (chef_id, chef) = app.sign_up("chef").await;
    let (baker_id, baker) = app.sign_up("baker").await;

    let soup = app
        .create_recipe(&chef, &recipe_body("Soup", &[(refs.salt, 5)], &[refs.dinner]))
        .await;
    let porridge = app
        .create_recipe(
            &chef,
            &recipe_body("Porridge", &[(refs.water, 50)], &[refs.breakfast]),
        )
        .await;
    let bread = app
        .create_recipe(
            &baker,
            &recipe_body("Bread", &[(refs.salt, 2)], &[refs.breakfast, refs.dinner]),
        )
        .await;
    let (soup, porridge, bread) = (
        soup["id"].as_i64().unwrap(),
        porridge["id"].as_i64().unwrap(),
        bread["id"].as_i64().unwrap(),
    );

    let all = app.get("/api/recipes/", None).await.json();
    assert_eq!(all["count"], 3);
    assert_eq!(ids(&all), vec![bread, porridge, soup]);

    let by_author = app
        .get(&format!("/api/recipes/?author={chef_id}"), None)
        .await
        .json();
    assert_eq!(ids(&by_author), vec![porridge, soup]);

    let by_either_author = app
        .get(
            &format!("/api/recipes/?author={chef_id}&author={baker_id}&tags=breakfast"),
            None,
        )
        .await
        .json();
    assert_eq!(ids(&by_either_author), vec![bread, porridge]);

    let breakfast = app.get("/api/recipes/?tags=breakfast", None).await.json();
    assert_eq!(ids(&breakfast), vec![bread, porridge]);

    let either = app
        .get("/api/recipes/?tags=breakfast&tags=dinner", None)
        .await
        .json();
    assert_eq!(either["count"], 3);

    let first = app.get("/api/recipes/?limit=2", None).await.json();
    assert_eq!(ids(&first), vec![bread, porridge]);
    assert_eq!(
        first["next"],
        "http://localhost:8000/api/recipes?limit=2&page=2"
    );
    assert_eq!(first["previous"], Value::Null);

    let second = app.get("/api/recipes/?limit=2&page=2", None).await.json();
    assert_eq!(ids(&second), vec![soup]);
    assert_eq!(second["next"], Value::Null);
    assert_eq!(
        second["previous"],
        "http://localhost:8000/api/recipes?limit=2"
    );

    let past_end = app.get("/api/recipes/?limit=2&page=3", None).await;
    assert_eq!(past_end.status, StatusCode::NOT_FOUND);
    assert_eq!(past_end.json(), json!({ "detail": "Invalid page." }));
}

// ============================================================================
// Favorites and shopping cart
// ============================================================================

#[sqlx::test(migrations = "../server/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_favorite_twice_conflicts(pool: PgPool) {
    let refs = seed_reference_data(&pool).await;
    let app = TestApp::with_pool(pool);
    let (_, token) = app.sign_up("chef").await;

    let created = app
        .create_recipe(&token, &recipe_body("Soup", &[(refs.salt, 5)], &[refs.dinner]))
        .await;
    let id = created["id"].as_i64().unwrap();
    let uri = format!("/api/recipes/{id}/favorite/");

    let first = app.post(&uri, Some(&token), &json!({})).await;
    assert_eq!(first.status, StatusCode::CREATED);
    assert_eq!(
        first.json(),
        json!({ "id": id, "name": "Soup", "image": created["image"], "cooking_time": 15 })
    );

    let second = app.post(&uri, Some(&token), &json!({})).await;
    assert_eq!(second.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        second.json(),
        json!({ "detail": "Recipe is already in favorites." })
    );

    let favorites = app.get("/api/recipes/?is_favorited=1", Some(&token)).await.json();
    assert_eq!(ids(&favorites), vec![id]);
    assert_eq!(favorites["results"][0]["is_favorited"], true);

    let removed = app.delete(&uri, Some(&token)).await;
    assert_eq!(removed.status, StatusCode::NO_CONTENT);

    let again = app.delete(&uri, Some(&token)).await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
    assert_eq!(again.json(), json!({ "detail": "Recipe is not in favorites." }));
}

#[sqlx::test(migrations = "../server/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_cart_twice_conflicts_and_keeps_one_row(pool: PgPool) {
    let refs = seed_reference_data(&pool).await;
    let app = TestApp::with_pool(pool.clone());
    let (user_id, token) = app.sign_up("chef").await;

    let created = app
        .create_recipe(&token, &recipe_body("Soup", &[(refs.salt, 5)], &[refs.dinner]))
        .await;
    let uri = format!("/api/recipes/{}/shopping_cart/", created["id"]);

    let first = app.post(&uri, Some(&token), &json!({})).await;
    assert_eq!(first.status, StatusCode::CREATED);

    let second = app.post(&uri, Some(&token), &json!({})).await;
    assert_eq!(second.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        second.json(),
        json!({ "detail": "Recipe is already in the shopping cart." })
    );

    let (rows,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM shopping_cart WHERE user_id = $1")
        .bind(i32::try_from(user_id).unwrap())
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(rows, 1);
}

#[sqlx::test(migrations = "../server/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_favorite_missing_recipe_is_404(pool: PgPool) {
    let app = TestApp::with_pool(pool);
    let (_, token) = app.sign_up("chef").await;

    let response = app
        .post("/api/recipes/4242/favorite/", Some(&token), &json!({}))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../server/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_shopping_list_sums_amounts(pool: PgPool) {
    let refs = seed_reference_data(&pool).await;
    let app = TestApp::with_pool(pool);
    let (_, chef) = app.sign_up("chef").await;
    let (_, shopper) = app.sign_up("shopper").await;

    let soup = app
        .create_recipe(
            &chef,
            &recipe_body("Soup", &[(refs.salt, 5), (refs.water, 80)], &[refs.dinner]),
        )
        .await;
    let stew = app
        .create_recipe(
            &chef,
            &recipe_body("Stew", &[(refs.salt, 3), (refs.carrot, 2)], &[refs.dinner]),
        )
        .await;
    app.create_recipe(
        &chef,
        &recipe_body("Tea", &[(refs.water, 30)], &[refs.breakfast]),
    )
    .await;

    for recipe in [&soup, &stew] {
        let response = app
            .post(
                &format!("/api/recipes/{}/shopping_cart/", recipe["id"]),
                Some(&shopper),
                &json!({}),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
    }

    let download = app
        .get("/api/recipes/download_shopping_cart/", Some(&shopper))
        .await;
    assert_eq!(download.status, StatusCode::OK);
    assert!(
        download
            .header("content-type")
            .unwrap()
            .starts_with("text/plain")
    );
    assert_eq!(
        download.header("content-disposition"),
        Some("attachment; filename=\"shopping_list.txt\"")
    );
    assert_eq!(
        download.text(),
        "Shopping list\nCarrot, 2 pcs\nSalt, 8 g\nWater, 80 g\n"
    );

    let empty = app
        .get("/api/recipes/download_shopping_cart/", Some(&chef))
        .await;
    assert_eq!(empty.text(), "Shopping list\n");
}

#[sqlx::test(migrations = "../server/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_soup_shopping_list(pool: PgPool) {
    let refs = seed_reference_data(&pool).await;
    let app = TestApp::with_pool(pool);
    let (_, author) = app.sign_up("author").await;
    let (_, buyer) = app.sign_up("buyer").await;

    let soup = app
        .create_recipe(
            &author,
            &recipe_body("Soup", &[(refs.salt, 5), (refs.water, 200)], &[refs.dinner]),
        )
        .await;
    let added = app
        .post(
            &format!("/api/recipes/{}/shopping_cart/", soup["id"]),
            Some(&buyer),
            &json!({}),
        )
        .await;
    assert_eq!(added.status, StatusCode::CREATED);

    let in_cart = app
        .get("/api/recipes/?is_in_shopping_cart=1", Some(&buyer))
        .await
        .json();
    assert_eq!(in_cart["count"], 1);
    assert_eq!(in_cart["results"][0]["is_in_shopping_cart"], true);

    let download = app
        .get("/api/recipes/download_shopping_cart/", Some(&buyer))
        .await;
    assert_eq!(download.text(), "Shopping list\nSalt, 5 g\nWater, 200 g\n");
}

// ============================================================================
// Subscriptions
// ============================================================================

#[sqlx::test(migrations = "../server/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_cannot_follow_self(pool: PgPool) {
    let app = TestApp::with_pool(pool);
    let (id, token) = app.sign_up("chef").await;

    let response = app
        .post(&format!("/api/users/{id}/subscribe/"), Some(&token), &json!({}))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json(),
        json!({ "non_field_errors": ["You cannot follow yourself."] })
    );
}

#[sqlx::test(migrations = "../server/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_subscriptions_limit_recipes(pool: PgPool) {
    let refs = seed_reference_data(&pool).await;
    let app = TestApp::with_pool(pool);
    let (chef_id, chef) = app.sign_up("chef").await;
    let (_, reader) = app.sign_up("reader").await;

    for name in ["Soup", "Stew", "Tea"] {
        app.create_recipe(&chef, &recipe_body(name, &[(refs.salt, 1)], &[refs.dinner]))
            .await;
    }

    let uri = format!("/api/users/{chef_id}/subscribe/?recipes_limit=2");
    let followed = app.post(&uri, Some(&reader), &json!({})).await;
    assert_eq!(followed.status, StatusCode::CREATED);
    let followed = followed.json();
    assert_eq!(followed["username"], "chef");
    assert_eq!(followed["is_subscribed"], true);
    assert_eq!(followed["recipes_count"], 3);
    assert_eq!(followed["recipes"].as_array().unwrap().len(), 2);

    let again = app.post(&uri, Some(&reader), &json!({})).await;
    assert_eq!(again.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        again.json(),
        json!({ "detail": "You are already subscribed to this author." })
    );

    let page = app
        .get("/api/users/subscriptions/?recipes_limit=1", Some(&reader))
        .await
        .json();
    assert_eq!(page["count"], 1);
    assert_eq!(page["results"][0]["id"], chef_id);
    assert_eq!(page["results"][0]["recipes"].as_array().unwrap().len(), 1);
    assert_eq!(page["results"][0]["recipes"][0]["name"], "Tea");
    assert_eq!(page["results"][0]["recipes_count"], 3);

    let profile = app
        .get(&format!("/api/users/{chef_id}/"), Some(&reader))
        .await
        .json();
    assert_eq!(profile["is_subscribed"], true);

    let removed = app
        .delete(&format!("/api/users/{chef_id}/subscribe/"), Some(&reader))
        .await;
    assert_eq!(removed.status, StatusCode::NO_CONTENT);

    let missing = app
        .delete(&format!("/api/users/{chef_id}/subscribe/"), Some(&reader))
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Reference data
// ============================================================================

#[sqlx::test(migrations = "../server/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_reference_data_endpoints(pool: PgPool) {
    let refs = seed_reference_data(&pool).await;
    let app = TestApp::with_pool(pool);

    let tags = app.get("/api/tags/", None).await.json();
    assert_eq!(tags.as_array().unwrap().len(), 2);
    assert_eq!(tags[0]["name"], "Breakfast");

    let tag = app.get(&format!("/api/tags/{}/", refs.dinner), None).await;
    assert_eq!(
        tag.json(),
        json!({ "id": refs.dinner, "name": "Dinner", "color": "#8775D2", "slug": "dinner" })
    );

    let matches = app.get("/api/ingredients/?name=SA", None).await.json();
    assert_eq!(
        matches,
        json!([{ "id": refs.salt, "name": "Salt", "measurement_unit": "g" }])
    );

    let all = app.get("/api/ingredients/", None).await.json();
    assert_eq!(all.as_array().unwrap().len(), 3);

    let missing = app.get("/api/ingredients/9999/", None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Accounts
// ============================================================================

#[sqlx::test(migrations = "../server/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_duplicate_registration_is_field_error(pool: PgPool) {
    let app = TestApp::with_pool(pool);
    app.sign_up("chef").await;

    let response = app
        .post(
            "/api/users/",
            None,
            &json!({
                "email": "other@example.com",
                "username": "chef",
                "first_name": "Other",
                "last_name": "Cook",
                "password": "long-enough-password",
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json(),
        json!({ "username": ["A user with that username already exists."] })
    );
}

#[sqlx::test(migrations = "../server/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_password_change_and_logout(pool: PgPool) {
    let app = TestApp::with_pool(pool);
    let (id, token) = app.sign_up("chef").await;

    let me = app.get("/api/users/me/", Some(&token)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.json()["id"], id);

    let wrong = app
        .post(
            "/api/users/set_password/",
            Some(&token),
            &json!({ "current_password": "nope-nope-nope", "new_password": "brand-new-secret" }),
        )
        .await;
    assert_eq!(wrong.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        wrong.json(),
        json!({ "current_password": ["Invalid password."] })
    );

    let changed = app
        .post(
            "/api/users/set_password/",
            Some(&token),
            &json!({
                "current_password": foodgram_integration_tests::PASSWORD,
                "new_password": "brand-new-secret",
            }),
        )
        .await;
    assert_eq!(changed.status, StatusCode::NO_CONTENT);

    let logout = app
        .post("/api/auth/token/logout/", Some(&token), &json!({}))
        .await;
    assert_eq!(logout.status, StatusCode::NO_CONTENT);

    let revoked = app.get("/api/users/me/", Some(&token)).await;
    assert_eq!(revoked.status, StatusCode::UNAUTHORIZED);
    assert_eq!(revoked.json(), json!({ "detail": "Invalid token." }));

    let old_password = app
        .post(
            "/api/auth/token/login/",
            None,
            &json!({ "email": "chef@example.com", "password": foodgram_integration_tests::PASSWORD }),
        )
        .await;
    assert_eq!(old_password.status, StatusCode::BAD_REQUEST);
}

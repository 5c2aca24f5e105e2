use crate::{
	models::ErrorResponse,
	tests::{
		fixtures::TestFixtures,
		test_utils::{bearer, TestContext},
	},
};
use actix_web::{http::StatusCode, test};
use serde_json::{json, Value};

#[actix_web::test]
async fn test_create_expense() {
	let ctx = TestContext::new(None);
	let app = init_app!(ctx);
	let (user_id, auth) = ctx.new_caller();

	let resp = test::TestRequest::post()
		.uri("/api/expenses")
		.insert_header(auth.clone())
		.set_json(TestFixtures::expense(320.5, "Food", TestFixtures::this_year(3, 14)))
		.send_request(&app)
		.await;
	assert_eq!(resp.status(), StatusCode::CREATED);

	let created: Value = test::read_body_json(resp).await;
	assert_eq!(created["userId"], json!(user_id));
	assert_eq!(created["amount"].as_f64(), Some(320.5));
	assert_eq!(created["category"], "Food");
	assert_eq!(created["description"], "Test expense");

	let id = created["_id"].as_str().unwrap();
	let resp = test::TestRequest::get()
		.uri(&format!("/api/expenses/{}", id))
		.insert_header(auth)
		.send_request(&app)
		.await;
	assert_eq!(resp.status(), StatusCode::OK);
	let fetched: Value = test::read_body_json(resp).await;
	assert_eq!(fetched, created);
}

#[actix_web::test]
async fn test_unauthorized_expense_requests() {
	let ctx = TestContext::new(None);
	let app = init_app!(ctx);

	let missing = test::TestRequest::get().uri("/api/expenses").send_request(&app).await;
	assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);
	let body: ErrorResponse = test::read_body_json(missing).await;
	assert_eq!(body.message, "Invalid or missing token");

	let forged = test::TestRequest::post()
		.uri("/api/expenses")
		.insert_header(bearer("not.a.token"))
		.set_json(TestFixtures::expense(1.0, "Food", TestFixtures::this_year(1, 1)))
		.send_request(&app)
		.await;
	assert_eq!(forged.status(), StatusCode::UNAUTHORIZED);
	assert_eq!(ctx.store.expense_count(), 0);
}

#[actix_web::test]
async fn test_invalid_expense_amount() {
	let ctx = TestContext::new(None);
	let app = init_app!(ctx);
	let (_, auth) = ctx.new_caller();
	let date = TestFixtures::this_year(2, 10);

	let negative = test::TestRequest::post()
		.uri("/api/expenses")
		.insert_header(auth.clone())
		.set_json(TestFixtures::expense(-100.0, "Food", date))
		.send_request(&app)
		.await;
	assert_eq!(negative.status(), StatusCode::BAD_REQUEST);

	let not_a_number = test::TestRequest::post()
		.uri("/api/expenses")
		.insert_header(auth.clone())
		.set_json(json!({ "amount": "lots", "category": "Food", "date": "2024-02-10" }))
		.send_request(&app)
		.await;
	assert_eq!(not_a_number.status(), StatusCode::BAD_REQUEST);

	for huge in ["1e400", "1e2000000"] {
		let resp = test::TestRequest::post()
			.uri("/api/expenses")
			.insert_header(auth.clone())
			.set_json(json!({ "amount": huge, "category": "Food", "date": "2024-02-10" }))
			.send_request(&app)
			.await;
		assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "amount {huge} was accepted");
		let body: ErrorResponse = test::read_body_json(resp).await;
		assert_eq!(body.message, "Invalid expense data");
	}

	let zero = test::TestRequest::post()
		.uri("/api/expenses")
		.insert_header(auth)
		.set_json(TestFixtures::expense(0.0, "Food", date))
		.send_request(&app)
		.await;
	assert_eq!(zero.status(), StatusCode::CREATED);
	assert_eq!(ctx.store.expense_count(), 1);
}

#[actix_web::test]
async fn test_unknown_category_and_bad_date_are_rejected() {
	let ctx = TestContext::new(None);
	let app = init_app!(ctx);
	let (_, auth) = ctx.new_caller();

	for payload in [
		json!({ "amount": 5, "category": "Rent", "date": "2024-02-10" }),
		json!({ "amount": 5, "category": "Food", "date": "10/02/2024" }),
		json!({ "amount": 5, "category": "Food" }),
	] {
		let resp = test::TestRequest::post()
			.uri("/api/expenses")
			.insert_header(auth.clone())
			.set_json(&payload)
			.send_request(&app)
			.await;
		assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "payload {payload} was accepted");
		let body: ErrorResponse = test::read_body_json(resp).await;
		assert_eq!(body.message, "Invalid expense data");
	}
	assert_eq!(ctx.store.expense_count(), 0);
}

#[actix_web::test]
async fn test_list_expenses_with_filters() {
	let ctx = TestContext::new(None);
	let app = init_app!(ctx);
	let (_, auth) = ctx.new_caller();

	for (amount, category, date) in [
		(10.0, "Food", "2024-01-05"),
		(20.0, "Transport", "2024-01-20"),
		(30.0, "Food", "2024-02-01"),
		(40.0, "Food", "2024-03-15"),
	] {
		let resp = test::TestRequest::post()
			.uri("/api/expenses")
			.insert_header(auth.clone())
			.set_json(json!({ "amount": amount, "category": category, "date": date }))
			.send_request(&app)
			.await;
		assert_eq!(resp.status(), StatusCode::CREATED);
	}

	let all = test::TestRequest::get()
		.uri("/api/expenses")
		.insert_header(auth.clone())
		.send_request(&app)
		.await;
	let all: Vec<Value> = test::read_body_json(all).await;
	let dates: Vec<&str> = all.iter().map(|e| e["date"].as_str().unwrap()).collect();
	assert_eq!(dates, ["2024-03-15", "2024-02-01", "2024-01-20", "2024-01-05"]);

	let filtered = test::TestRequest::get()
		.uri("/api/expenses?category=Food&startDate=2024-01-05&endDate=2024-02-01")
		.insert_header(auth.clone())
		.send_request(&app)
		.await;
	let filtered: Vec<Value> = test::read_body_json(filtered).await;
	let amounts: Vec<f64> = filtered.iter().map(|e| e["amount"].as_f64().unwrap()).collect();
	assert_eq!(amounts, [30.0, 10.0]);

	let bad = test::TestRequest::get()
		.uri("/api/expenses?category=Rent")
		.insert_header(auth)
		.send_request(&app)
		.await;
	assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_update_and_delete_expense() {
	let ctx = TestContext::new(None);
	let app = init_app!(ctx);
	let (_, auth) = ctx.new_caller();

	let resp = test::TestRequest::post()
		.uri("/api/expenses")
		.insert_header(auth.clone())
		.set_json(TestFixtures::expense(12.0, "Shopping", TestFixtures::this_year(5, 2)))
		.send_request(&app)
		.await;
	let created: Value = test::read_body_json(resp).await;
	let uri = format!("/api/expenses/{}", created["_id"].as_str().unwrap());

	let resp = test::TestRequest::put()
		.uri(&uri)
		.insert_header(auth.clone())
		.set_json(json!({ "amount": 15.75, "category": "Health" }))
		.send_request(&app)
		.await;
	assert_eq!(resp.status(), StatusCode::OK);
	let updated: Value = test::read_body_json(resp).await;
	assert_eq!(updated["_id"], created["_id"]);
	assert_eq!(updated["amount"].as_f64(), Some(15.75));
	assert_eq!(updated["category"], "Health");
	assert_eq!(updated["date"], created["date"]);
	assert_eq!(updated["description"], created["description"]);

	let negative = test::TestRequest::put()
		.uri(&uri)
		.insert_header(auth.clone())
		.set_json(json!({ "amount": -1 }))
		.send_request(&app)
		.await;
	assert_eq!(negative.status(), StatusCode::BAD_REQUEST);

	let huge = test::TestRequest::put()
		.uri(&uri)
		.insert_header(auth.clone())
		.set_json(json!({ "amount": "1e400" }))
		.send_request(&app)
		.await;
	assert_eq!(huge.status(), StatusCode::BAD_REQUEST);
	let body: ErrorResponse = test::read_body_json(huge).await;
	assert_eq!(body.message, "Invalid expense data");

	let resp = test::TestRequest::delete().uri(&uri).insert_header(auth.clone()).send_request(&app).await;
	assert_eq!(resp.status(), StatusCode::OK);
	let body: Value = test::read_body_json(resp).await;
	assert_eq!(body, json!({ "success": true }));

	let again = test::TestRequest::delete().uri(&uri).insert_header(auth.clone()).send_request(&app).await;
	assert_eq!(again.status(), StatusCode::NOT_FOUND);

	let gone = test::TestRequest::get().uri(&uri).insert_header(auth).send_request(&app).await;
	assert_eq!(gone.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_expenses_are_owner_scoped() {
	let ctx = TestContext::new(None);
	let app = init_app!(ctx);
	let (_, owner) = ctx.new_caller();
	let (_, intruder) = ctx.new_caller();

	let resp = test::TestRequest::post()
		.uri("/api/expenses")
		.insert_header(owner.clone())
		.set_json(TestFixtures::expense(99.0, "Utilities", TestFixtures::this_year(4, 1)))
		.send_request(&app)
		.await;
	let created: Value = test::read_body_json(resp).await;
	let uri = format!("/api/expenses/{}", created["_id"].as_str().unwrap());

	let read = test::TestRequest::get().uri(&uri).insert_header(intruder.clone()).send_request(&app).await;
	let update = test::TestRequest::put()
		.uri(&uri)
		.insert_header(intruder.clone())
		.set_json(json!({ "amount": 1 }))
		.send_request(&app)
		.await;
	let delete =
		test::TestRequest::delete().uri(&uri).insert_header(intruder.clone()).send_request(&app).await;

	for resp in [read, update, delete] {
		assert_eq!(resp.status(), StatusCode::NOT_FOUND);
		let body: ErrorResponse = test::read_body_json(resp).await;
		assert_eq!(body.message, "Not found");
	}

	let listed = test::TestRequest::get()
		.uri("/api/expenses")
		.insert_header(intruder)
		.send_request(&app)
		.await;
	let listed: Vec<Value> = test::read_body_json(listed).await;
	assert!(listed.is_empty());

	let still_there = test::TestRequest::get().uri(&uri).insert_header(owner).send_request(&app).await;
	let still_there: Value = test::read_body_json(still_there).await;
	assert_eq!(still_there["amount"].as_f64(), Some(99.0));
}

#[actix_web::test]
async fn test_malformed_id_is_not_found() {
	let ctx = TestContext::new(None);
	let app = init_app!(ctx);
	let (_, auth) = ctx.new_caller();

	let resp = test::TestRequest::get()
		.uri("/api/expenses/not-a-uuid")
		.insert_header(auth)
		.send_request(&app)
		.await;
	assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

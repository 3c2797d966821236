// tests/quiz_flow_tests.rs

mod common;

use std::collections::HashSet;

use common::{TestApp, browser, location, spawn_app};
use reqwest::Client;
use serde_json::{Value, json};

async fn submit(app: &TestApp, client: &Client, body: Value) -> (u16, Value) {
    let response = client
        .post(app.url("/quiz/submit"))
        .json(&body)
        .send()
        .await
        .expect("Submit failed");
    let status = response.status().as_u16();
    (status, response.json().await.unwrap_or(Value::Null))
}

async fn correct_answer_of(app: &TestApp, question_id: i64) -> String {
    sqlx::query_scalar("SELECT correct_answer FROM questions WHERE id = ?")
        .bind(question_id)
        .fetch_one(app.catalog.pool())
        .await
        .unwrap()
}

async fn drawn_question_ids(app: &TestApp, client: &Client, total: usize) -> Vec<i64> {
    let mut ids = Vec::new();
    for index in 0..total {
        let (status, body) = app
            .get_json(client, &format!("/quiz/question/{index}"))
            .await;
        assert_eq!(status, 200);
        ids.push(body["question"]["id"].as_i64().unwrap());
    }
    ids
}

#[tokio::test]
async fn science_quiz_scenario() {
    // Arrange
    let app = spawn_app().await;
    let client = browser();
    let username = app.signed_in_user(&client).await;
    let quiz_id = app.quiz_id_by_title("Science Quiz").await;

    // 1. Start: 15 questions in the pool, 10 drawn
    let (status, started) = app.get_json(&client, &format!("/quiz/{quiz_id}")).await;
    assert_eq!(status, 200);
    assert_eq!(started["total_questions"], 10);
    assert_eq!(started["question_time_limit"], 30);
    assert_eq!(started["quiz"]["category_name"], "Science & Technology");

    let ids = drawn_question_ids(&app, &client, 10).await;
    assert_eq!(ids.iter().collect::<HashSet<_>>().len(), 10);

    // 2. Correct answer to question 0
    let (_, first) = app.get_json(&client, "/quiz/question/0").await;
    assert_eq!(first["question_num"], 1);
    assert_eq!(first["progress"].as_f64().unwrap(), 10.0);
    assert!(first["question"].get("correct_answer").is_none());

    let answer = correct_answer_of(&app, ids[0]).await;
    let (status, outcome) = submit(&app, &client, json!({"answer": answer, "question_num": 0})).await;
    assert_eq!(status, 200);
    assert_eq!(outcome["correct"], true);
    assert_eq!(outcome["score"], 10);
    assert_eq!(outcome["correct_answer"], answer.as_str());

    // 3. Wrong answer to question 1
    let (_, outcome) = submit(
        &app,
        &client,
        json!({"answer": "definitely not it", "question_num": 1}),
    )
    .await;
    assert_eq!(outcome["correct"], false);
    assert_eq!(outcome["score"], 10);

    // 4. Complete with only two answered
    let (status, body) = app.get_json(&client, "/quiz/results").await;
    assert_eq!(status, 200);
    let results = &body["results"];
    assert_eq!(results["score"], 10);
    assert_eq!(results["correct_answers"], 1);
    assert_eq!(results["total_questions"], 10);
    assert_eq!(results["percentage"].as_f64().unwrap(), 10.0);
    assert_eq!(results["quiz_info"]["title"], "Science Quiz");
    assert_eq!(results["answers"].as_array().unwrap().len(), 2);

    // 5. Persisted record and user totals
    let (total_questions, correct_answers): (i64, i64) = sqlx::query_as(
        "SELECT total_questions, correct_answers FROM game_sessions gs \
         JOIN users u ON gs.user_id = u.id WHERE u.username = ?",
    )
    .bind(&username)
    .fetch_one(app.catalog.pool())
    .await
    .unwrap();
    assert_eq!(total_questions, 10);
    assert_eq!(correct_answers, 1);

    let (_, dashboard) = app.get_json(&client, "/dashboard").await;
    assert_eq!(dashboard["user"]["total_score"], 10);
    assert_eq!(dashboard["user"]["games_played"], 1);
    assert_eq!(dashboard["user"]["best_streak"], 1);
    assert_eq!(dashboard["recent_games"][0]["title"], "Science Quiz");

    // 6. The attempt is gone
    let response = client.get(app.url("/quiz/results")).send().await.unwrap();
    assert_eq!(location(&response), "/dashboard");
    assert_eq!(app.flashes(&client).await, vec!["No quiz session found"]);
}

#[tokio::test]
async fn small_quiz_uses_every_question() {
    let app = spawn_app().await;
    let client = browser();
    app.signed_in_user(&client).await;
    let quiz_id = app.quiz_id_by_title("Sports & Games Quiz").await;

    let (_, started) = app.get_json(&client, &format!("/quiz/{quiz_id}")).await;
    assert_eq!(started["total_questions"], 5);

    let drawn: HashSet<i64> = drawn_question_ids(&app, &client, 5)
        .await
        .into_iter()
        .collect();
    let pool: HashSet<i64> = sqlx::query_scalar::<_, i64>("SELECT id FROM questions WHERE quiz_id = ?")
        .bind(quiz_id)
        .fetch_all(app.catalog.pool())
        .await
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(drawn, pool);
}

#[tokio::test]
async fn question_out_of_range_is_an_error() {
    let app = spawn_app().await;
    let client = browser();
    app.signed_in_user(&client).await;
    let quiz_id = app.quiz_id_by_title("Music & Arts Quiz").await;
    app.get_json(&client, &format!("/quiz/{quiz_id}")).await;

    let (status, body) = app.get_json(&client, "/quiz/question/5").await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Quiz completed");

    let (status, body) = submit(&app, &client, json!({"answer": "x", "question_num": 5})).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Invalid question number");
}

#[tokio::test]
async fn quiz_endpoints_require_an_active_attempt() {
    let app = spawn_app().await;
    let client = browser();
    app.signed_in_user(&client).await;

    let (status, body) = app.get_json(&client, "/quiz/question/0").await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "No active quiz session. Please start a new quiz.");

    let (status, body) = submit(&app, &client, json!({"answer": "x", "question_num": 0})).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "No active quiz session. Please start a new quiz.");
}

#[tokio::test]
async fn empty_answer_is_a_skip() {
    let app = spawn_app().await;
    let client = browser();
    app.signed_in_user(&client).await;
    let quiz_id = app.quiz_id_by_title("Food & Culture Quiz").await;
    app.get_json(&client, &format!("/quiz/{quiz_id}")).await;

    let (status, outcome) = submit(&app, &client, json!({"question_num": 0})).await;
    assert_eq!(status, 200);
    assert_eq!(outcome["correct"], false);
    assert_eq!(outcome["score"], 0);

    let (status, outcome) = submit(&app, &client, json!({"answer": "", "question_num": 1})).await;
    assert_eq!(status, 200);
    assert_eq!(outcome["correct"], false);

    let (_, body) = app.get_json(&client, "/quiz/results").await;
    let answers = body["results"]["answers"].as_array().unwrap();
    assert_eq!(answers[0]["answer"], "No answer");
    assert_eq!(answers[1]["answer"], "No answer");
    assert_eq!(body["results"]["percentage"].as_f64().unwrap(), 0.0);
}

#[tokio::test]
async fn submit_without_body_is_rejected() {
    let app = spawn_app().await;
    let client = browser();
    app.signed_in_user(&client).await;
    let quiz_id = app.quiz_id_by_title("Food & Culture Quiz").await;
    app.get_json(&client, &format!("/quiz/{quiz_id}")).await;

    let response = client.post(app.url("/quiz/submit")).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "No data received");
}

#[tokio::test]
async fn submit_with_empty_object_is_rejected() {
    let app = spawn_app().await;
    let client = browser();
    app.signed_in_user(&client).await;
    let quiz_id = app.quiz_id_by_title("Sports & Games Quiz").await;
    app.get_json(&client, &format!("/quiz/{quiz_id}")).await;

    let (status, body) = submit(&app, &client, json!({})).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "No data received");

    // Nothing was logged for the rejected body
    submit(&app, &client, json!({"answer": "x", "question_num": 1})).await;
    let (_, body) = app.get_json(&client, "/quiz/results").await;
    let answers = body["results"]["answers"].as_array().unwrap();
    assert_eq!(answers.len(), 1);
    assert_eq!(answers[0]["answer"], "x");
}

#[tokio::test]
async fn negative_question_numbers_are_invalid() {
    let app = spawn_app().await;
    let client = browser();
    app.signed_in_user(&client).await;
    let quiz_id = app.quiz_id_by_title("Music & Arts Quiz").await;
    app.get_json(&client, &format!("/quiz/{quiz_id}")).await;

    let (status, body) = submit(&app, &client, json!({"answer": "x", "question_num": -1})).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Invalid question number");

    let (status, body) = submit(&app, &client, json!({"answer": "x", "question_num": "two"})).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Invalid question number");

    let (status, body) = app.get_json(&client, "/quiz/question/-1").await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Invalid question number");
}

#[tokio::test]
async fn non_text_answer_is_scored_wrong() {
    let app = spawn_app().await;
    let client = browser();
    app.signed_in_user(&client).await;
    let quiz_id = app.quiz_id_by_title("Food & Culture Quiz").await;
    app.get_json(&client, &format!("/quiz/{quiz_id}")).await;

    let (status, outcome) = submit(&app, &client, json!({"answer": 5, "question_num": 0})).await;
    assert_eq!(status, 200);
    assert_eq!(outcome["correct"], false);
    assert_eq!(outcome["score"], 0);

    let (_, body) = app.get_json(&client, "/quiz/results").await;
    assert_eq!(body["results"]["answers"][0]["answer"], "5");
    assert_eq!(body["results"]["correct_answers"], 0);
}

#[tokio::test]
async fn resubmission_is_logged_twice() {
    let app = spawn_app().await;
    let client = browser();
    app.signed_in_user(&client).await;
    let quiz_id = app.quiz_id_by_title("Movies & Entertainment Quiz").await;
    app.get_json(&client, &format!("/quiz/{quiz_id}")).await;

    let ids = drawn_question_ids(&app, &client, 1).await;
    let answer = correct_answer_of(&app, ids[0]).await;
    submit(&app, &client, json!({"answer": answer, "question_num": 0})).await;
    let (_, outcome) = submit(&app, &client, json!({"answer": answer, "question_num": 0})).await;
    assert_eq!(outcome["score"], 20);

    let (_, body) = app.get_json(&client, "/quiz/results").await;
    assert_eq!(body["results"]["answers"].as_array().unwrap().len(), 2);
    assert_eq!(body["results"]["correct_answers"], 2);
}

#[tokio::test]
async fn unknown_quiz_redirects_to_dashboard() {
    let app = spawn_app().await;
    let client = browser();
    app.signed_in_user(&client).await;
    app.flashes(&client).await;

    let response = client.get(app.url("/quiz/9999")).send().await.unwrap();

    assert_eq!(location(&response), "/dashboard");
    assert_eq!(app.flashes(&client).await, vec!["Quiz not found"]);
}

#[tokio::test]
async fn quiz_without_questions_redirects_to_dashboard() {
    let app = spawn_app().await;
    let client = browser();
    app.signed_in_user(&client).await;
    app.flashes(&client).await;

    let quiz_id: i64 = sqlx::query_scalar(
        "INSERT INTO quizzes (title, category_id) VALUES ('Empty Quiz', 1) RETURNING id",
    )
    .fetch_one(app.catalog.pool())
    .await
    .unwrap();

    let response = client
        .get(app.url(&format!("/quiz/{quiz_id}")))
        .send()
        .await
        .unwrap();

    assert_eq!(location(&response), "/dashboard");
    assert_eq!(
        app.flashes(&client).await,
        vec!["This quiz has no questions yet"]
    );
}

#[tokio::test]
async fn random_quiz_redirects_to_a_quiz() {
    let app = spawn_app().await;
    let client = browser();
    app.signed_in_user(&client).await;

    let response = client.get(app.url("/random-quiz")).send().await.unwrap();

    assert_eq!(response.status().as_u16(), 303);
    let target = location(&response);
    let quiz_id: i64 = target
        .strip_prefix("/quiz/")
        .and_then(|id| id.parse().ok())
        .expect("redirect should point at a quiz");
    assert!((1..=8).contains(&quiz_id));
}

#[tokio::test]
async fn random_quiz_with_empty_catalog_warns() {
    let app = spawn_app().await;
    let client = browser();
    app.signed_in_user(&client).await;
    app.flashes(&client).await;

    sqlx::query("DELETE FROM questions")
        .execute(app.catalog.pool())
        .await
        .unwrap();
    sqlx::query("DELETE FROM quizzes")
        .execute(app.catalog.pool())
        .await
        .unwrap();

    let response = client.get(app.url("/random-quiz")).send().await.unwrap();

    assert_eq!(location(&response), "/dashboard");
    assert_eq!(app.flashes(&client).await, vec!["No quizzes available"]);
}

#[tokio::test]
async fn best_streak_keeps_the_highest_correct_count() {
    let app = spawn_app().await;
    let client = browser();
    app.signed_in_user(&client).await;
    let quiz_id = app.quiz_id_by_title("Sports & Games Quiz").await;

    // First attempt: two right
    app.get_json(&client, &format!("/quiz/{quiz_id}")).await;
    let ids = drawn_question_ids(&app, &client, 2).await;
    for (index, id) in ids.iter().enumerate() {
        let answer = correct_answer_of(&app, *id).await;
        submit(&app, &client, json!({"answer": answer, "question_num": index})).await;
    }
    app.get_json(&client, "/quiz/results").await;

    // Second attempt: none right
    app.get_json(&client, &format!("/quiz/{quiz_id}")).await;
    submit(&app, &client, json!({"answer": "nope", "question_num": 0})).await;
    app.get_json(&client, "/quiz/results").await;

    let (_, dashboard) = app.get_json(&client, "/dashboard").await;
    assert_eq!(dashboard["user"]["games_played"], 2);
    assert_eq!(dashboard["user"]["total_score"], 20);
    assert_eq!(dashboard["user"]["best_streak"], 2);
    assert_eq!(dashboard["recent_games"].as_array().unwrap().len(), 2);
}

use std::time::Duration;

use mockito::{Matcher, Server};
use quiz_api::{ApiError, GenerateBankRequest, HttpQuizApi, HttpQuizApiConfig, QuizApi};
use quiz_core::model::{
    AnswerOutcome, Difficulty, DocumentId, OptionKey, QuestionCount, QuestionId, QuizId,
    ResolvedSource, SessionId,
};
use serde_json::json;

fn api_for(server: &Server) -> HttpQuizApi {
    HttpQuizApi::new(HttpQuizApiConfig::new(
        format!("{}/api/", server.url()),
        Duration::from_secs(5),
    ))
    .unwrap()
}

fn question(id: &str, difficulty: &str) -> serde_json::Value {
    json!({
        "question_id": id,
        "question": "What does `?` do on a Result?",
        "options": ["A) Panics", "B) Propagates the error", "C) Ignores it", "D) Logs it"],
        "difficulty": difficulty
    })
}

#[tokio::test]
async fn generate_bank_posts_document_source() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/competitive-quiz/generate-bank")
        .match_body(Matcher::Json(json!({
            "num_questions": 30,
            "document_id": "doc-9"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "quiz_id": "quiz-1",
                "question_bank": [question("q1", "low"), question("q2", "hard")]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let api = api_for(&server);
    let bank = api
        .generate_bank(GenerateBankRequest::new(
            30,
            ResolvedSource::Document(DocumentId::new("doc-9")),
        ))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(bank.quiz_id(), &QuizId::new("quiz-1"));
    assert_eq!(bank.len(), 2);
    assert_eq!(bank.items()[1].difficulty(), Difficulty::Hard);
}

#[tokio::test]
async fn start_session_sends_question_count() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/competitive-quiz/start")
        .match_body(Matcher::Json(json!({ "quiz_id": "quiz-1", "num_questions": 7 })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "session_id": "sess-1",
                "question": question("q1", "medium"),
                "current_difficulty": "medium"
            })
            .to_string(),
        )
        .create_async()
        .await;

    let started = api_for(&server)
        .start_session(&QuizId::new("quiz-1"), QuestionCount::new(7).unwrap())
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(started.session_id, SessionId::new("sess-1"));
    assert_eq!(started.current_difficulty, Difficulty::Medium);
}

#[tokio::test]
async fn submit_answer_maps_completion() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/competitive-quiz/answer")
        .match_body(Matcher::Json(json!({
            "session_id": "sess-1",
            "question_id": "q5",
            "answer": "B"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "is_correct": true,
                "correct_answer": "B",
                "reward": 3.5,
                "explanation": "`?` returns early with the error.",
                "is_complete": true,
                "stats": {
                    "accuracy": 80.0,
                    "correct_answers": 4,
                    "questions_answered": 5,
                    "total_reward": 9.5,
                    "performance_trend": "improving",
                    "difficulty_distribution": { "medium": 3, "hard": 2 }
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let result = api_for(&server)
        .submit_answer(
            &SessionId::new("sess-1"),
            &QuestionId::new("q5"),
            OptionKey::new('B'),
        )
        .await
        .unwrap();

    assert!(result.is_complete());
    assert!(matches!(result.outcome, AnswerOutcome::Complete));
    assert_eq!(result.stats.correct_answers, 4);
    assert_eq!(result.stats.difficulty_distribution.get(&Difficulty::Hard), Some(&2));
}

#[tokio::test]
async fn graded_answer_with_null_stats_still_advances() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/competitive-quiz/answer")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "is_correct": false,
                "correct_answer": "A",
                "reward": -1.0,
                "is_complete": false,
                "next_question": question("q6", "low"),
                "next_difficulty": "low",
                "stats": {
                    "accuracy": null,
                    "correct_answers": 0,
                    "questions_answered": 1,
                    "total_reward": null,
                    "difficulty_distribution": { "medium": 0.5 }
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let result = api_for(&server)
        .submit_answer(
            &SessionId::new("sess-1"),
            &QuestionId::new("q5"),
            OptionKey::new('C'),
        )
        .await
        .unwrap();

    assert!(matches!(result.outcome, AnswerOutcome::Next { .. }));
    assert_eq!(result.stats.accuracy, 0.0);
    assert_eq!(result.stats.questions_answered, 1);
    assert_eq!(result.stats.difficulty_distribution.get(&Difficulty::Medium), Some(&1));
}

#[tokio::test]
async fn bank_accepts_options_without_letter_prefixes() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/competitive-quiz/generate-bank")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "quiz_id": "quiz-3",
                "question_bank": [{
                    "question_id": "q1",
                    "question": "Capital of the Czech Republic?",
                    "options": ["Paris", "Prague", "Rome", "Berlin"],
                    "difficulty": "low"
                }]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let bank = api_for(&server)
        .generate_bank(GenerateBankRequest::new(
            1,
            ResolvedSource::Topic("Capitals".into()),
        ))
        .await
        .unwrap();

    let item = &bank.items()[0];
    assert_eq!(item.key_at(1).unwrap(), OptionKey::new('B'));
    assert_eq!(item.index_of(OptionKey::new('d')), Some(3));
}

#[tokio::test]
async fn rejection_surfaces_detail_message() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/competitive-quiz/start")
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(json!({ "detail": "Quiz not found" }).to_string())
        .create_async()
        .await;

    let err = api_for(&server)
        .start_session(&QuizId::new("gone"), QuestionCount::default())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ApiError::Rejected {
            status: 404,
            message: "Quiz not found".into()
        }
    );
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn server_error_without_body_is_retryable() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/competitive-quiz/generate-bank")
        .with_status(503)
        .create_async()
        .await;

    let err = api_for(&server)
        .generate_bank(GenerateBankRequest::new(
            30,
            ResolvedSource::Topic("Traits".into()),
        ))
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Rejected { status: 503, .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn malformed_body_is_a_protocol_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/competitive-quiz/generate-bank")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("{\"quiz\": ")
        .create_async()
        .await;

    let err = api_for(&server)
        .generate_bank(GenerateBankRequest::new(
            30,
            ResolvedSource::Topic("Traits".into()),
        ))
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Protocol(_)));
}

#[tokio::test]
async fn unreachable_service_is_a_network_error() {
    let api = HttpQuizApi::new(HttpQuizApiConfig::new(
        "http://127.0.0.1:9",
        Duration::from_secs(2),
    ))
    .unwrap();

    let err = api
        .start_session(&QuizId::new("quiz"), QuestionCount::default())
        .await
        .unwrap_err();

    assert!(err.is_retryable());
}

//! Store semantics against an in-memory backend.

use std::sync::Mutex;

use async_trait::async_trait;

use quizdeck::api::{ApiError, QuizApi};
use quizdeck::models::{
    AnswerMap, AnswerValue, Pagination, Question, QuestionDraft, QuestionKind, QuestionResult,
    ScoreSummary, ScoringResult, Test, TestDraft, TestListQuery, TestPage, TestPatch,
};
use quizdeck::TestStore;

/// In-memory stand-in for the REST backend.
struct MockApi {
    tests: Mutex<Vec<Test>>,
    /// When set, every call answers with this application error.
    failure: Mutex<Option<String>>,
    next_id: Mutex<u32>,
}

impl MockApi {
    fn new(tests: Vec<Test>) -> Self {
        Self {
            tests: Mutex::new(tests),
            failure: Mutex::new(None),
            next_id: Mutex::new(1000),
        }
    }

    fn fail_with(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }

    fn recover(&self) {
        *self.failure.lock().unwrap() = None;
    }

    fn check_failure(&self) -> Result<(), ApiError> {
        match self.failure.lock().unwrap().as_ref() {
            Some(message) => Err(ApiError::Application {
                status: 500,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }

    fn fresh_id(&self, prefix: &str) -> String {
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        format!("{prefix}{next}")
    }
}

#[async_trait]
impl QuizApi for MockApi {
    async fn list_tests(&self, query: &TestListQuery) -> Result<TestPage, ApiError> {
        self.check_failure()?;
        let tests = self.tests.lock().unwrap();
        let page = query.page.unwrap_or(1);
        let limit = query.limit.unwrap_or(10);
        let start = ((page - 1) * limit) as usize;
        let slice: Vec<Test> = tests
            .iter()
            .skip(start)
            .take(limit as usize)
            .cloned()
            .collect();
        Ok(TestPage { tests: slice, page, limit, total: tests.len() as u32 })
    }

    async fn get_test(&self, id: &str) -> Result<Test, ApiError> {
        self.check_failure()?;
        self.tests
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or(ApiError::Application { status: 404, message: "test not found".into() })
    }

    async fn create_test(&self, draft: &TestDraft) -> Result<Test, ApiError> {
        self.check_failure()?;
        let test = Test {
            id: self.fresh_id("t"),
            title: draft.title.clone(),
            description: draft.description.clone(),
            tags: draft.tags.clone(),
            questions: vec![],
            created_at: None,
        };
        self.tests.lock().unwrap().push(test.clone());
        Ok(test)
    }

    async fn update_test(&self, id: &str, patch: &TestPatch) -> Result<Test, ApiError> {
        self.check_failure()?;
        let mut tests = self.tests.lock().unwrap();
        let test = tests
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(ApiError::Application { status: 404, message: "test not found".into() })?;
        if let Some(title) = &patch.title {
            test.title = title.clone();
        }
        if let Some(description) = &patch.description {
            test.description = description.clone();
        }
        if let Some(tags) = &patch.tags {
            test.tags = tags.clone();
        }
        Ok(test.clone())
    }

    async fn delete_test(&self, id: &str) -> Result<(), ApiError> {
        self.check_failure()?;
        let mut tests = self.tests.lock().unwrap();
        let before = tests.len();
        tests.retain(|t| t.id != id);
        if tests.len() == before {
            return Err(ApiError::Application { status: 404, message: "test not found".into() });
        }
        Ok(())
    }

    async fn check_answers(
        &self,
        test_id: &str,
        answers: &AnswerMap,
    ) -> Result<ScoringResult, ApiError> {
        self.check_failure()?;
        let tests = self.tests.lock().unwrap();
        let test = tests
            .iter()
            .find(|t| t.id == test_id)
            .ok_or(ApiError::Application { status: 404, message: "test not found".into() })?;

        let results: Vec<QuestionResult> = test
            .questions
            .iter()
            .map(|q| {
                let correct = answers
                    .get(&q.id)
                    .is_some_and(|answer| is_correct(q, answer));
                QuestionResult {
                    question_id: q.id.clone(),
                    correct,
                    points: if correct { q.points } else { 0 },
                    possible_points: q.points,
                }
            })
            .collect();

        let total_points: u32 = results.iter().map(|r| r.possible_points).sum();
        let earned_points: u32 = results.iter().map(|r| r.points).sum();
        let correct_count = results.iter().filter(|r| r.correct).count() as u32;
        let total = results.len() as u32;

        // Like the real backend, the response does not echo the answers.
        Ok(ScoringResult {
            summary: ScoreSummary {
                earned_points,
                total_points,
                percentage_score: if total_points > 0 {
                    (100 * earned_points / total_points) as f64
                } else {
                    0.0
                },
                correct_count,
                incorrect_count: total - correct_count,
                total_questions: total,
            },
            results,
            answers: AnswerMap::new(),
        })
    }

    async fn add_question(
        &self,
        test_id: &str,
        draft: &QuestionDraft,
    ) -> Result<Question, ApiError> {
        self.check_failure()?;
        let question = Question {
            id: self.fresh_id("q"),
            text: draft.text.clone(),
            points: draft.points,
            kind: draft.kind.clone(),
        };
        let mut tests = self.tests.lock().unwrap();
        let test = tests
            .iter_mut()
            .find(|t| t.id == test_id)
            .ok_or(ApiError::Application { status: 404, message: "test not found".into() })?;
        test.questions.push(question.clone());
        Ok(question)
    }

    async fn update_question(
        &self,
        id: &str,
        draft: &QuestionDraft,
    ) -> Result<Question, ApiError> {
        self.check_failure()?;
        let mut tests = self.tests.lock().unwrap();
        for test in tests.iter_mut() {
            if let Some(q) = test.questions.iter_mut().find(|q| q.id == id) {
                q.text = draft.text.clone();
                q.points = draft.points;
                q.kind = draft.kind.clone();
                return Ok(q.clone());
            }
        }
        Err(ApiError::Application { status: 404, message: "question not found".into() })
    }

    async fn delete_question(&self, id: &str) -> Result<(), ApiError> {
        self.check_failure()?;
        let mut tests = self.tests.lock().unwrap();
        for test in tests.iter_mut() {
            let before = test.questions.len();
            test.questions.retain(|q| q.id != id);
            if test.questions.len() != before {
                return Ok(());
            }
        }
        Err(ApiError::Application { status: 404, message: "question not found".into() })
    }
}

fn is_correct(question: &Question, answer: &AnswerValue) -> bool {
    match (&question.kind, answer) {
        (QuestionKind::Single { correct_answers, .. }, AnswerValue::Single(s)) => {
            correct_answers.first().is_some_and(|c| c == s)
        }
        (QuestionKind::Multiple { correct_answers, .. }, AnswerValue::Multiple(selected)) => {
            let mut expected = correct_answers.clone();
            let mut got = selected.clone();
            expected.sort();
            got.sort();
            expected == got
        }
        (QuestionKind::Text { correct_answer_text }, AnswerValue::Text(s)) => {
            correct_answer_text.eq_ignore_ascii_case(s.trim())
        }
        _ => false,
    }
}

fn question(id: &str, kind: QuestionKind) -> Question {
    Question { id: id.into(), text: format!("question {id}"), points: 2, kind }
}

fn simple_test(id: &str, title: &str) -> Test {
    Test {
        id: id.into(),
        title: title.into(),
        description: String::new(),
        tags: vec![],
        questions: vec![question(
            &format!("{id}-q1"),
            QuestionKind::Text { correct_answer_text: "yes".into() },
        )],
        created_at: None,
    }
}

fn catalog(count: usize) -> Vec<Test> {
    (0..count)
        .map(|i| simple_test(&format!("t{i}"), &format!("Test {i}")))
        .collect()
}

#[tokio::test]
async fn fetch_tests_replaces_catalog_and_pagination() {
    let store = TestStore::new(MockApi::new(catalog(25)));

    let query = TestListQuery { page: Some(2), limit: Some(10), ..Default::default() };
    let page = store.fetch_tests(query).await.expect("page 2 loads");
    assert_eq!(page.tests.len(), 10);

    let state = store.state().await;
    assert_eq!(state.pagination, Pagination { page: 2, limit: 10, total: 25 });
    assert!(state.pagination.has_next());
    assert!(!state.loading);
    assert!(state.error.is_none());
    drop(state);

    let query = TestListQuery { page: Some(3), limit: Some(10), ..Default::default() };
    store.fetch_tests(query).await.expect("page 3 loads");
    let state = store.state().await;
    assert_eq!(state.tests.len(), 5);
    assert!(!state.pagination.has_next());
}

#[tokio::test]
async fn failed_fetch_keeps_prior_catalog_and_sets_error() {
    let api = MockApi::new(catalog(3));
    let store = TestStore::new(api);

    store.fetch_tests(TestListQuery::page(1)).await.expect("first load");
    assert_eq!(store.state().await.tests.len(), 3);

    store.api().fail_with("backend exploded");
    let outcome = store.fetch_tests(TestListQuery::page(1)).await;
    assert!(outcome.is_none());

    let state = store.state().await;
    assert_eq!(state.tests.len(), 3, "prior catalog untouched");
    assert_eq!(state.error.as_deref(), Some("backend exploded"));
    assert!(!state.loading);
}

#[tokio::test]
async fn error_clears_on_next_operation() {
    let store = TestStore::new(MockApi::new(catalog(1)));

    store.api().fail_with("nope");
    assert!(store.fetch_tests(TestListQuery::page(1)).await.is_none());
    assert!(store.state().await.error.is_some());

    store.api().recover();
    assert!(store.fetch_tests(TestListQuery::page(1)).await.is_some());
    assert!(store.state().await.error.is_none());
}

#[tokio::test]
async fn deleting_current_test_clears_it() {
    let store = TestStore::new(MockApi::new(catalog(3)));
    store.fetch_tests(TestListQuery::page(1)).await.unwrap();
    store.fetch_test_by_id("t1").await.unwrap();

    assert!(store.delete_test("t1").await);
    let state = store.state().await;
    assert!(state.current_test.is_none());
    assert_eq!(state.tests.len(), 2);
    assert!(state.tests.iter().all(|t| t.id != "t1"));
}

#[tokio::test]
async fn deleting_other_test_keeps_current() {
    let store = TestStore::new(MockApi::new(catalog(3)));
    store.fetch_tests(TestListQuery::page(1)).await.unwrap();
    store.fetch_test_by_id("t1").await.unwrap();

    assert!(store.delete_test("t2").await);
    let state = store.state().await;
    assert_eq!(state.current_test.as_ref().map(|t| t.id.as_str()), Some("t1"));
    assert_eq!(state.tests.len(), 2);
    assert!(state.tests.iter().all(|t| t.id != "t2"));
}

#[tokio::test]
async fn create_appends_to_catalog_and_returns_entity() {
    let store = TestStore::new(MockApi::new(catalog(1)));
    store.fetch_tests(TestListQuery::page(1)).await.unwrap();

    let draft = TestDraft {
        title: "Fresh".into(),
        description: "Brand new".into(),
        tags: vec!["new".into()],
    };
    let created = store.create_test(draft).await.expect("created");
    assert!(!created.id.is_empty());

    let state = store.state().await;
    assert_eq!(state.tests.len(), 2);
    assert_eq!(state.tests.last().map(|t| t.id.as_str()), Some(created.id.as_str()));
}

#[tokio::test]
async fn update_patches_catalog_and_current() {
    let store = TestStore::new(MockApi::new(catalog(2)));
    store.fetch_tests(TestListQuery::page(1)).await.unwrap();
    store.fetch_test_by_id("t0").await.unwrap();

    let patch = TestPatch { title: Some("Renamed".into()), ..Default::default() };
    let updated = store.update_test("t0", patch).await.expect("updated");
    assert_eq!(updated.title, "Renamed");

    let state = store.state().await;
    assert_eq!(state.current_test.as_ref().map(|t| t.title.as_str()), Some("Renamed"));
    assert_eq!(state.tests[0].title, "Renamed");
    assert_eq!(state.tests[1].title, "Test 1");
}

#[tokio::test]
async fn question_mutations_only_touch_the_parent_test() {
    let store = TestStore::new(MockApi::new(catalog(2)));
    store.fetch_test_by_id("t0").await.unwrap();

    // A question added to another test leaves the current cache alone.
    let draft = QuestionDraft {
        text: "Elsewhere".into(),
        points: 1,
        kind: QuestionKind::Text { correct_answer_text: "x".into() },
    };
    store.add_question("t1", draft.clone()).await.expect("added");
    assert_eq!(
        store.state().await.current_test.as_ref().unwrap().questions.len(),
        1
    );

    // Updating a question that belongs to another test is also a no-op
    // on the cache.
    store.update_question("t1-q1", draft.clone()).await.expect("updated");
    let state = store.state().await;
    let current = state.current_test.as_ref().unwrap();
    assert_eq!(current.questions[0].text, "question t0-q1");
    drop(state);

    // Adding to the loaded test appends in order.
    store.add_question("t0", draft).await.expect("added");
    let state = store.state().await;
    let current = state.current_test.as_ref().unwrap();
    assert_eq!(current.questions.len(), 2);
    assert_eq!(current.questions[1].text, "Elsewhere");
}

#[tokio::test]
async fn deleting_question_updates_cached_test() {
    let store = TestStore::new(MockApi::new(catalog(1)));
    store.fetch_test_by_id("t0").await.unwrap();

    assert!(store.delete_question("t0-q1").await);
    let state = store.state().await;
    assert!(state.current_test.as_ref().unwrap().questions.is_empty());
}

#[tokio::test]
async fn check_answers_republishes_submitted_answers() {
    let mut test = simple_test("t0", "Scored");
    test.questions = vec![
        question(
            "q1",
            QuestionKind::Single {
                options: vec!["a".into(), "b".into()],
                correct_answers: vec!["a".into()],
            },
        ),
        question("q2", QuestionKind::Text { correct_answer_text: "yes".into() }),
    ];
    let store = TestStore::new(MockApi::new(vec![test]));

    let mut answers = AnswerMap::new();
    answers.insert("q1".into(), AnswerValue::Single("a".into()));
    answers.insert("q2".into(), AnswerValue::Text("no".into()));

    let result = store.check_answers("t0", answers.clone()).await.expect("scored");

    // The mock backend omits the echo; the store re-attaches it.
    assert_eq!(result.answers, answers);
    assert_eq!(result.summary.correct_count, 1);
    assert_eq!(result.summary.earned_points, 2);

    let state = store.state().await;
    assert_eq!(state.results.as_ref().unwrap().answers, answers);
    assert_eq!(state.answers, answers);
}

#[tokio::test]
async fn failed_scoring_keeps_no_result() {
    let store = TestStore::new(MockApi::new(catalog(1)));
    store.api().fail_with("scoring down");

    let outcome = store.check_answers("t0", AnswerMap::new()).await;
    assert!(outcome.is_none());

    let state = store.state().await;
    assert!(state.results.is_none());
    assert_eq!(state.error.as_deref(), Some("scoring down"));
}

#[tokio::test]
async fn clear_results_drops_result_and_answers() {
    let store = TestStore::new(MockApi::new(catalog(1)));

    let mut answers = AnswerMap::new();
    answers.insert("t0-q1".into(), AnswerValue::Text("yes".into()));
    store.check_answers("t0", answers).await.expect("scored");
    assert!(store.state().await.results.is_some());

    store.clear_results().await;
    let state = store.state().await;
    assert!(state.results.is_none());
    assert!(state.answers.is_empty());
}

#[tokio::test]
async fn missing_test_surfaces_not_found() {
    let store = TestStore::new(MockApi::new(catalog(1)));

    assert!(store.fetch_test_by_id("ghost").await.is_none());
    let state = store.state().await;
    assert_eq!(state.error.as_deref(), Some("test not found"));
    assert!(state.current_test.is_none());
}

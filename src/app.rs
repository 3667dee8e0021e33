//! Application shell: screens, key dispatch, and the event loop.
//!
//! The store is owned here and handed to spawned tasks as a weak
//! [`StoreContext`]; task results come back over an mpsc channel and are
//! folded into screen transitions.

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyCode, KeyEventKind, KeyModifiers};
use futures_util::StreamExt;
use tokio::sync::mpsc;

use crate::attempt::{Attempt, AttemptPhase};
use crate::forms::{QuestionForm, TestForm};
use crate::models::{AnswerMap, QuestionKind, Test, TestListQuery};
use crate::store::TestStore;
use crate::{terminal, ui};

/// Which screen owns the keyboard.
pub enum Screen {
    Catalog,
    Details(DetailsView),
    TestForm(TestForm),
    QuestionForm(QuestionForm),
    Take(TakeView),
    Results { scroll: usize },
}

/// Local state of the catalog screen.
pub struct CatalogView {
    pub selected: usize,
    pub searching: bool,
    pub search_input: String,
    pub active_search: Option<String>,
    pub active_tag: Option<String>,
    /// Test id armed for deletion; a second press confirms.
    pub pending_delete: Option<String>,
}

impl CatalogView {
    fn new() -> Self {
        Self {
            selected: 0,
            searching: false,
            search_input: String::new(),
            active_search: None,
            active_tag: None,
            pending_delete: None,
        }
    }
}

/// Local state of the details screen.
pub struct DetailsView {
    pub selected: usize,
    pub pending_delete: Option<String>,
}

impl DetailsView {
    fn new() -> Self {
        Self { selected: 0, pending_delete: None }
    }
}

/// Local state of the take-test screen: the attempt plus presentation
/// cursors that are not part of the attempt itself.
pub struct TakeView {
    pub attempt: Attempt,
    /// Option cursor while answering, grid cursor while reviewing.
    pub cursor: usize,
    pub confirm_submit: bool,
}

impl TakeView {
    fn loading(test_id: &str) -> Self {
        Self { attempt: Attempt::loading(test_id), cursor: 0, confirm_submit: false }
    }

    fn started(attempt: Attempt) -> Self {
        Self { attempt, cursor: 0, confirm_submit: false }
    }
}

/// Completion notices from spawned store operations.
enum AppEvent {
    CatalogLoaded,
    TestLoaded(Option<Box<Test>>),
    TestSaved(Option<String>),
    TestDeleted(bool),
    QuestionSaved(bool),
    QuestionDeleted,
    ScoringFinished(bool),
}

/// Tags present on the loaded catalog page, first-occurrence order.
pub fn available_tags(tests: &[Test]) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for test in tests {
        for tag in &test.tags {
            if !tags.contains(tag) {
                tags.push(tag.clone());
            }
        }
    }
    tags
}

pub struct App {
    store: Arc<TestStore>,
    tx: mpsc::UnboundedSender<AppEvent>,
    pub screen: Screen,
    pub catalog: CatalogView,
    should_quit: bool,
}

/// Run the terminal client until the user quits.
pub async fn run(store: Arc<TestStore>) -> std::io::Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut app = App {
        store,
        tx,
        screen: Screen::Catalog,
        catalog: CatalogView::new(),
        should_quit: false,
    };
    app.refresh_catalog();

    let mut term = terminal::init()?;
    let mut events = EventStream::new();
    let mut tick = tokio::time::interval(Duration::from_millis(100));

    while !app.should_quit {
        {
            let state = app.store.state().await;
            term.draw(|frame| ui::render(frame, &app, &state))?;
        }

        tokio::select! {
            maybe_event = events.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        app.handle_key(key.code, key.modifiers).await;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(_)) | None => break,
                }
            }
            Some(event) = rx.recv() => app.handle_app_event(event).await,
            _ = tick.tick() => {}
        }
    }

    terminal::restore()
}

impl App {
    // Spawned store operations. Each holds a weak context so a response
    // arriving after shutdown is dropped instead of reviving the store.

    /// Re-fetch the catalog with the active filters on the store's current
    /// page.
    fn refresh_catalog(&self) {
        let ctx = self.store.context();
        let tx = self.tx.clone();
        let search = self.catalog.active_search.clone();
        let tag = self.catalog.active_tag.clone();
        tokio::spawn(async move {
            let Ok(store) = ctx.get() else { return };
            let page = store.state().await.pagination.page;
            let query = TestListQuery { page: Some(page), limit: None, search, tag };
            store.fetch_tests(query).await;
            let _ = tx.send(AppEvent::CatalogLoaded);
        });
    }

    fn fetch_catalog(&self, query: TestListQuery) {
        let ctx = self.store.context();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let Ok(store) = ctx.get() else { return };
            store.fetch_tests(query).await;
            let _ = tx.send(AppEvent::CatalogLoaded);
        });
    }

    fn filtered_query(&self, page: u32) -> TestListQuery {
        TestListQuery {
            page: Some(page),
            limit: None,
            search: self.catalog.active_search.clone(),
            tag: self.catalog.active_tag.clone(),
        }
    }

    fn fetch_test(&self, id: String) {
        let ctx = self.store.context();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let Ok(store) = ctx.get() else { return };
            let test = store.fetch_test_by_id(&id).await;
            let _ = tx.send(AppEvent::TestLoaded(test.map(Box::new)));
        });
    }

    fn save_test(&self, form: &TestForm) {
        let ctx = self.store.context();
        let tx = self.tx.clone();
        let test_id = form.test_id.clone();
        let draft = form.as_draft();
        let patch = form.as_patch();
        tokio::spawn(async move {
            let Ok(store) = ctx.get() else { return };
            let saved = match &test_id {
                Some(id) => store.update_test(id, patch).await,
                None => store.create_test(draft).await,
            };
            let _ = tx.send(AppEvent::TestSaved(saved.map(|t| t.id)));
        });
    }

    fn delete_test(&self, id: String) {
        let ctx = self.store.context();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let Ok(store) = ctx.get() else { return };
            let ok = store.delete_test(&id).await;
            let _ = tx.send(AppEvent::TestDeleted(ok));
        });
    }

    fn save_question(&self, form: &QuestionForm) {
        let ctx = self.store.context();
        let tx = self.tx.clone();
        let test_id = form.test_id.clone();
        let question_id = form.question_id.clone();
        let draft = form.as_draft();
        tokio::spawn(async move {
            let Ok(store) = ctx.get() else { return };
            let saved = match &question_id {
                Some(id) => store.update_question(id, draft).await,
                None => store.add_question(&test_id, draft).await,
            };
            let _ = tx.send(AppEvent::QuestionSaved(saved.is_some()));
        });
    }

    fn delete_question(&self, id: String) {
        let ctx = self.store.context();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let Ok(store) = ctx.get() else { return };
            store.delete_question(&id).await;
            let _ = tx.send(AppEvent::QuestionDeleted);
        });
    }

    fn submit_attempt(&self, test_id: String, answers: AnswerMap) {
        let ctx = self.store.context();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let Ok(store) = ctx.get() else { return };
            let ok = store.check_answers(&test_id, answers).await.is_some();
            let _ = tx.send(AppEvent::ScoringFinished(ok));
        });
    }

    fn clear_results(&self) {
        let ctx = self.store.context();
        tokio::spawn(async move {
            if let Ok(store) = ctx.get() {
                store.clear_results().await;
            }
        });
    }

    async fn current_test_id(&self) -> Option<String> {
        self.store
            .state()
            .await
            .current_test
            .as_ref()
            .map(|t| t.id.clone())
    }

    async fn question_count(&self) -> usize {
        self.store
            .state()
            .await
            .current_test
            .as_ref()
            .map(|t| t.questions.len())
            .unwrap_or(0)
    }

    async fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::CatalogLoaded => {
                let len = self.store.state().await.tests.len();
                if self.catalog.selected >= len {
                    self.catalog.selected = len.saturating_sub(1);
                }
            }
            AppEvent::TestLoaded(test) => {
                if let Screen::Take(view) = &mut self.screen {
                    if view.attempt.phase() == AttemptPhase::Loading {
                        if let Some(test) = test {
                            *view = TakeView::started(Attempt::new(&test));
                        }
                        // On failure the store error renders in place.
                    }
                }
            }
            AppEvent::TestSaved(Some(id)) => {
                self.screen = Screen::Details(DetailsView::new());
                self.fetch_test(id);
            }
            AppEvent::TestSaved(None) => {}
            AppEvent::TestDeleted(ok) => {
                if ok {
                    self.refresh_catalog();
                }
            }
            AppEvent::QuestionSaved(ok) => {
                if ok {
                    self.screen = Screen::Details(DetailsView::new());
                }
            }
            AppEvent::QuestionDeleted => {
                let len = self.question_count().await;
                if let Screen::Details(view) = &mut self.screen {
                    if view.selected >= len {
                        view.selected = len.saturating_sub(1);
                    }
                }
            }
            AppEvent::ScoringFinished(ok) => {
                if let Screen::Take(view) = &mut self.screen {
                    if ok {
                        view.attempt.submitted();
                        self.screen = Screen::Results { scroll: 0 };
                    } else {
                        view.attempt.submit_failed();
                        view.confirm_submit = false;
                    }
                }
            }
        }
    }

    async fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        match &self.screen {
            Screen::Catalog => self.handle_catalog_key(key).await,
            Screen::Details(_) => self.handle_details_key(key).await,
            Screen::TestForm(_) => self.handle_test_form_key(key).await,
            Screen::QuestionForm(_) => self.handle_question_form_key(key, modifiers).await,
            Screen::Take(_) => self.handle_take_key(key).await,
            Screen::Results { .. } => self.handle_results_key(key).await,
        }
    }

    async fn handle_catalog_key(&mut self, key: KeyCode) {
        if self.catalog.searching {
            match key {
                KeyCode::Char(c) => self.catalog.search_input.push(c),
                KeyCode::Backspace => {
                    self.catalog.search_input.pop();
                }
                KeyCode::Enter => {
                    let term = self.catalog.search_input.trim().to_string();
                    self.catalog.active_search = (!term.is_empty()).then_some(term);
                    self.catalog.searching = false;
                    self.fetch_catalog(self.filtered_query(1));
                }
                KeyCode::Esc => self.catalog.searching = false,
                _ => {}
            }
            return;
        }

        // Any key other than a repeated delete disarms the confirmation.
        if !matches!(key, KeyCode::Char('d')) {
            self.catalog.pending_delete = None;
        }

        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            KeyCode::Down | KeyCode::Char('j') => {
                let len = self.store.state().await.tests.len();
                if len > 0 && self.catalog.selected + 1 < len {
                    self.catalog.selected += 1;
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.catalog.selected = self.catalog.selected.saturating_sub(1);
            }
            KeyCode::Enter => {
                let id = self.selected_test_id().await;
                if let Some(id) = id {
                    self.screen = Screen::Details(DetailsView::new());
                    self.fetch_test(id);
                }
            }
            KeyCode::Right | KeyCode::Char('n') => {
                let pagination = self.store.state().await.pagination;
                if pagination.has_next() {
                    self.fetch_catalog(self.filtered_query(pagination.page + 1));
                }
            }
            KeyCode::Left | KeyCode::Char('p') => {
                let pagination = self.store.state().await.pagination;
                if pagination.has_previous() {
                    self.fetch_catalog(self.filtered_query(pagination.page - 1));
                }
            }
            KeyCode::Char('/') => {
                self.catalog.searching = true;
                self.catalog.search_input.clear();
            }
            KeyCode::Char('t') => {
                let tags = available_tags(&self.store.state().await.tests);
                self.catalog.active_tag = next_tag(&tags, self.catalog.active_tag.as_deref());
                self.fetch_catalog(self.filtered_query(1));
            }
            KeyCode::Char('x') => {
                self.catalog.active_search = None;
                self.catalog.active_tag = None;
                self.catalog.search_input.clear();
                self.fetch_catalog(TestListQuery::page(1));
            }
            KeyCode::Char('c') => self.screen = Screen::TestForm(TestForm::create()),
            KeyCode::Char('d') => {
                let Some(id) = self.selected_test_id().await else { return };
                if self.catalog.pending_delete.as_deref() == Some(id.as_str()) {
                    self.catalog.pending_delete = None;
                    self.delete_test(id);
                } else {
                    self.catalog.pending_delete = Some(id);
                }
            }
            KeyCode::Char('r') => self.refresh_catalog(),
            _ => {}
        }
    }

    async fn selected_test_id(&self) -> Option<String> {
        self.store
            .state()
            .await
            .tests
            .get(self.catalog.selected)
            .map(|t| t.id.clone())
    }

    async fn handle_details_key(&mut self, key: KeyCode) {
        let selected = match &self.screen {
            Screen::Details(view) => view.selected,
            _ => return,
        };

        if !matches!(key, KeyCode::Char('x')) {
            if let Screen::Details(view) = &mut self.screen {
                view.pending_delete = None;
            }
        }

        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            KeyCode::Esc | KeyCode::Char('b') => {
                self.screen = Screen::Catalog;
                self.refresh_catalog();
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let len = self.question_count().await;
                if let Screen::Details(view) = &mut self.screen {
                    if len > 0 && view.selected + 1 < len {
                        view.selected += 1;
                    }
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if let Screen::Details(view) = &mut self.screen {
                    view.selected = view.selected.saturating_sub(1);
                }
            }
            KeyCode::Char('t') => {
                if let Some(id) = self.current_test_id().await {
                    self.screen = Screen::Take(TakeView::loading(&id));
                    self.fetch_test(id);
                }
            }
            KeyCode::Char('e') => {
                let form = {
                    let state = self.store.state().await;
                    state.current_test.as_ref().map(TestForm::edit)
                };
                if let Some(form) = form {
                    self.screen = Screen::TestForm(form);
                }
            }
            KeyCode::Char('a') => {
                if let Some(id) = self.current_test_id().await {
                    self.screen = Screen::QuestionForm(QuestionForm::create(id));
                }
            }
            KeyCode::Enter => {
                let form = {
                    let state = self.store.state().await;
                    state.current_test.as_ref().and_then(|t| {
                        t.questions
                            .get(selected)
                            .map(|q| QuestionForm::edit(t.id.clone(), q))
                    })
                };
                if let Some(form) = form {
                    self.screen = Screen::QuestionForm(form);
                }
            }
            KeyCode::Char('x') => {
                let id = {
                    let state = self.store.state().await;
                    state
                        .current_test
                        .as_ref()
                        .and_then(|t| t.questions.get(selected).map(|q| q.id.clone()))
                };
                let Some(id) = id else { return };
                let armed = match &self.screen {
                    Screen::Details(view) => {
                        view.pending_delete.as_deref() == Some(id.as_str())
                    }
                    _ => false,
                };
                if armed {
                    if let Screen::Details(view) = &mut self.screen {
                        view.pending_delete = None;
                    }
                    self.delete_question(id);
                } else if let Screen::Details(view) = &mut self.screen {
                    view.pending_delete = Some(id);
                }
            }
            _ => {}
        }
    }

    async fn handle_test_form_key(&mut self, key: KeyCode) {
        let loading = self.store.state().await.loading;
        let Screen::TestForm(form) = &mut self.screen else { return };

        match key {
            KeyCode::Esc => {
                if form.is_editing() {
                    self.screen = Screen::Details(DetailsView::new());
                } else {
                    self.screen = Screen::Catalog;
                }
            }
            KeyCode::Tab | KeyCode::Down => form.focus_next(),
            KeyCode::BackTab | KeyCode::Up => form.focus_previous(),
            KeyCode::Enter => {
                if form.on_enter() && !loading && form.validate() {
                    let Screen::TestForm(form) = &self.screen else { return };
                    self.save_test(form);
                }
            }
            KeyCode::Char(c) => form.push_char(c),
            KeyCode::Backspace => form.pop_char(),
            KeyCode::Delete => form.remove_last_tag(),
            _ => {}
        }
    }

    async fn handle_question_form_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        let loading = self.store.state().await.loading;
        let Screen::QuestionForm(form) = &mut self.screen else { return };

        if modifiers.contains(KeyModifiers::CONTROL) {
            match key {
                KeyCode::Char('a') => form.add_option(),
                KeyCode::Char('d') => {
                    if let Some(index) = form.focused_option() {
                        form.remove_option(index);
                        form.clamp_focus();
                    }
                }
                _ => {}
            }
            return;
        }

        match key {
            KeyCode::Esc => self.screen = Screen::Details(DetailsView::new()),
            KeyCode::Tab | KeyCode::Down => form.focus_next(),
            KeyCode::BackTab | KeyCode::Up => form.focus_previous(),
            KeyCode::Left => form.on_left(),
            KeyCode::Right => form.on_right(),
            KeyCode::Enter => {
                if form.on_enter() && !loading && form.validate() {
                    let Screen::QuestionForm(form) = &self.screen else { return };
                    self.save_question(form);
                }
            }
            KeyCode::Char(c) => form.push_char(c),
            KeyCode::Backspace => form.pop_char(),
            _ => {}
        }
    }

    async fn handle_take_key(&mut self, key: KeyCode) {
        let phase = match &self.screen {
            Screen::Take(view) => view.attempt.phase(),
            _ => return,
        };

        match phase {
            AttemptPhase::Loading | AttemptPhase::Empty => match key {
                KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('b') => {
                    self.screen = Screen::Details(DetailsView::new());
                }
                _ => {}
            },
            AttemptPhase::Answering => self.handle_answering_key(key),
            AttemptPhase::Reviewing => self.handle_reviewing_key(key).await,
            // Submission in flight; only the result event moves us on.
            AttemptPhase::Submitting | AttemptPhase::Submitted => {}
        }
    }

    fn handle_answering_key(&mut self, key: KeyCode) {
        let Screen::Take(view) = &mut self.screen else { return };
        let (is_text, is_single, option_count) = match view.attempt.current_question() {
            Some(q) => (
                matches!(q.kind, QuestionKind::Text { .. }),
                matches!(q.kind, QuestionKind::Single { .. }),
                q.kind.options().len(),
            ),
            None => (false, false, 0),
        };

        match key {
            // Navigation away discards the attempt.
            KeyCode::Esc => self.screen = Screen::Details(DetailsView::new()),
            KeyCode::Left => {
                view.attempt.previous();
                view.cursor = 0;
            }
            KeyCode::Right | KeyCode::Enter => {
                view.attempt.next();
                view.cursor = 0;
            }
            KeyCode::Up => view.cursor = view.cursor.saturating_sub(1),
            KeyCode::Down => {
                if option_count > 0 && view.cursor + 1 < option_count {
                    view.cursor += 1;
                }
            }
            KeyCode::Backspace if is_text => {
                let mut text = current_text(view);
                text.pop();
                view.attempt.set_text(text);
            }
            KeyCode::Char(c) if is_text => {
                let mut text = current_text(view);
                text.push(c);
                view.attempt.set_text(text);
            }
            KeyCode::Char(' ') => {
                let option = view
                    .attempt
                    .current_question()
                    .and_then(|q| q.kind.options().get(view.cursor))
                    .cloned();
                if let Some(option) = option {
                    if is_single {
                        view.attempt.select_option(&option);
                    } else {
                        view.attempt.toggle_option(&option);
                    }
                }
            }
            KeyCode::Char('v') => {
                view.attempt.begin_review();
                view.cursor = 0;
            }
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char(c) if c.is_ascii_digit() => {
                if let Some(number) = c.to_digit(10) {
                    if number >= 1 {
                        view.attempt.jump_to(number as usize - 1);
                        view.cursor = 0;
                    }
                }
            }
            _ => {}
        }
    }

    async fn handle_reviewing_key(&mut self, key: KeyCode) {
        let loading = self.store.state().await.loading;
        let Screen::Take(view) = &mut self.screen else { return };

        if view.confirm_submit {
            match key {
                KeyCode::Char('y') | KeyCode::Enter => {
                    view.confirm_submit = false;
                    if !loading && view.attempt.begin_submit() {
                        let test_id = view.attempt.test_id().to_string();
                        let answers = view.attempt.answers();
                        self.submit_attempt(test_id, answers);
                    }
                }
                KeyCode::Char('n') | KeyCode::Esc => view.confirm_submit = false,
                _ => {}
            }
            return;
        }

        match key {
            KeyCode::Down | KeyCode::Char('j') => {
                if view.cursor + 1 < view.attempt.total() {
                    view.cursor += 1;
                }
            }
            KeyCode::Up | KeyCode::Char('k') => view.cursor = view.cursor.saturating_sub(1),
            KeyCode::Enter => {
                view.attempt.jump_to(view.cursor);
                view.cursor = 0;
            }
            KeyCode::Char('s') => {
                // Submission stays disabled while a request is in flight.
                if !loading {
                    view.confirm_submit = true;
                }
            }
            KeyCode::Esc | KeyCode::Char('b') => {
                let index = view.attempt.current_index();
                view.attempt.jump_to(index);
            }
            KeyCode::Char('q') => self.should_quit = true,
            _ => {}
        }
    }

    async fn handle_results_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Down | KeyCode::Char('j') => {
                if let Screen::Results { scroll } = &mut self.screen {
                    *scroll += 1;
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if let Screen::Results { scroll } = &mut self.screen {
                    *scroll = scroll.saturating_sub(1);
                }
            }
            KeyCode::Char('r') => {
                // Retake: drop the result and start a fresh attempt.
                if let Some(id) = self.current_test_id().await {
                    self.clear_results();
                    self.screen = Screen::Take(TakeView::loading(&id));
                    self.fetch_test(id);
                }
            }
            KeyCode::Esc | KeyCode::Char('b') => {
                self.clear_results();
                self.screen = Screen::Details(DetailsView::new());
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            _ => {}
        }
    }
}

fn current_text(view: &TakeView) -> String {
    view.attempt
        .current_question()
        .and_then(|q| view.attempt.answer_for(&q.id))
        .and_then(|a| a.as_str())
        .unwrap_or_default()
        .to_string()
}

fn next_tag(tags: &[String], active: Option<&str>) -> Option<String> {
    match active {
        None => tags.first().cloned(),
        Some(current) => match tags.iter().position(|t| t == current) {
            Some(index) if index + 1 < tags.len() => Some(tags[index + 1].clone()),
            _ => None,
        },
    }
}

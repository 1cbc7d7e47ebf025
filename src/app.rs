use crate::api::QuestionSource;
use crate::error::FetchError;
use crate::models::{QuestionItem, QuestionsPage};
use crate::pagination::{Completion, PageRequest, Paginator};
use crate::selection::Overlay;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use tui::widgets::ListState;

/// Moving the cursor this close to the last card asks for the next page.
pub const LOAD_MORE_THRESHOLD: usize = 5;

const PAGE_STEP: usize = 5;

/// Results coming back from background fetches.
#[derive(Debug)]
pub enum AppMessage {
    PageFetched {
        request: PageRequest,
        result: Result<QuestionsPage, FetchError>,
    },
}

pub struct App {
    pub paginator: Paginator,
    pub state: ListState,
    pub overlay: Overlay,
    pub overlay_scroll: u16,
    /// Shown after the fetch status until the next key press, e.g. a link
    /// that failed to open.
    pub notice: Option<String>,
    pub should_quit: bool,
    source: Arc<dyn QuestionSource>,
    runtime: Handle,
    tx: mpsc::UnboundedSender<AppMessage>,
    rx: mpsc::UnboundedReceiver<AppMessage>,
    task: Option<JoinHandle<()>>,
}

impl App {
    pub fn new(
        source: Arc<dyn QuestionSource>,
        runtime: Handle,
        page_size: u32,
        max_items: usize,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            paginator: Paginator::new(page_size, max_items),
            state: ListState::default(),
            overlay: Overlay::Closed,
            overlay_scroll: 0,
            notice: None,
            should_quit: false,
            source,
            runtime,
            tx,
            rx,
            task: None,
        }
    }

    pub fn items(&self) -> &[QuestionItem] {
        self.paginator.items()
    }

    pub fn mount(&mut self) {
        if let Some(request) = self.paginator.mount() {
            self.dispatch(request);
        }
    }

    /// Asks for the next page; ignored while loading or once exhausted.
    pub fn fetch_next_page(&mut self) {
        if let Some(request) = self.paginator.begin_fetch() {
            self.dispatch(request);
        }
    }

    fn dispatch(&mut self, request: PageRequest) {
        debug!(page = request.page, "spawning page fetch");
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        self.task = Some(self.runtime.spawn(async move {
            let result = source.fetch_page(request.page, request.page_size).await;
            // receiver is gone once the app is torn down
            let _ = tx.send(AppMessage::PageFetched { request, result });
        }));
    }

    /// Folds in every finished fetch. Called once per UI tick.
    pub fn drain_messages(&mut self) {
        while let Ok(message) = self.rx.try_recv() {
            self.handle_message(message);
        }
    }

    pub fn handle_message(&mut self, message: AppMessage) {
        match message {
            AppMessage::PageFetched { request, result } => {
                let completion = self.paginator.complete(request, result);
                if completion != Completion::Discarded {
                    self.task = None;
                }
                if let Completion::Appended(n) = completion {
                    if n > 0 && self.state.selected().is_none() {
                        self.state.select(Some(0));
                    }
                }
            }
        }
    }

    fn select_index(&mut self, index: usize) {
        self.state.select(Some(index));
        if index + LOAD_MORE_THRESHOLD >= self.items().len() {
            self.fetch_next_page();
        }
    }

    pub fn on_up(&mut self) {
        if self.overlay.is_open() {
            self.overlay_scroll = self.overlay_scroll.saturating_sub(1);
            return;
        }
        if let Some(i) = self.state.selected() {
            self.state.select(Some(i.saturating_sub(1)));
        }
    }

    pub fn on_down(&mut self) {
        if self.overlay.is_open() {
            self.overlay_scroll = self.overlay_scroll.saturating_add(1);
            return;
        }
        let len = self.items().len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => (i + 1).min(len - 1),
            None => 0,
        };
        self.select_index(i);
    }

    pub fn on_page_up(&mut self) {
        if self.overlay.is_open() {
            self.overlay_scroll = self.overlay_scroll.saturating_sub(PAGE_STEP as u16);
            return;
        }
        if let Some(i) = self.state.selected() {
            self.state.select(Some(i.saturating_sub(PAGE_STEP)));
        }
    }

    pub fn on_page_down(&mut self) {
        if self.overlay.is_open() {
            self.overlay_scroll = self.overlay_scroll.saturating_add(PAGE_STEP as u16);
            return;
        }
        let len = self.items().len();
        if len == 0 {
            return;
        }
        let i = self.state.selected().map_or(0, |i| (i + PAGE_STEP).min(len - 1));
        self.select_index(i);
    }

    pub fn on_home(&mut self) {
        if !self.overlay.is_open() && !self.items().is_empty() {
            self.state.select(Some(0));
        }
    }

    pub fn on_end(&mut self) {
        let len = self.items().len();
        if !self.overlay.is_open() && len > 0 {
            self.select_index(len - 1);
        }
    }

    pub fn on_enter(&mut self) {
        if self.overlay.is_open() {
            return;
        }
        if let Some(i) = self.state.selected() {
            if let Some(item) = self.paginator.items().get(i) {
                self.overlay.select_item(item, i);
                self.overlay_scroll = 0;
            }
        }
    }

    pub fn on_back(&mut self) {
        self.overlay.dismiss();
        self.overlay_scroll = 0;
    }

    /// Manual retry after a failed fetch.
    pub fn on_retry(&mut self) {
        if self.paginator.error().is_some() {
            self.fetch_next_page();
        }
    }

    pub fn selected_link(&self) -> Option<&str> {
        match self.overlay.selection() {
            Some(selection) => Some(&selection.link),
            None => self
                .state
                .selected()
                .and_then(|i| self.items().get(i))
                .map(|item| item.link.as_str()),
        }
    }

    pub fn open_selected_link(&mut self) {
        let Some(link) = self.selected_link().map(str::to_owned) else {
            return;
        };
        match open::that(&link) {
            Ok(()) => self.notice = None,
            Err(err) => {
                warn!(%link, error = %err, "could not open link");
                self.notice = Some(format!("Could not open {}", link));
            }
        }
    }

    /// Leaves the screen; anything still in flight is dropped.
    pub fn quit(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.paginator.teardown();
        self.should_quit = true;
    }

    #[cfg(test)]
    async fn settle(&mut self) {
        if let Some(message) = self.rx.recv().await {
            self.handle_message(message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::FetchStatus;
    use crate::pagination::tests::page;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Serves `pages[page - 1]`, an empty page past the end.
    struct PagedSource {
        pages: Vec<u64>,
        calls: Mutex<Vec<u32>>,
    }

    impl PagedSource {
        fn new(pages: Vec<u64>) -> Arc<Self> {
            Arc::new(Self {
                pages,
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl QuestionSource for PagedSource {
        async fn fetch_page(&self, page: u32, _page_size: u32) -> Result<QuestionsPage, FetchError> {
            self.calls.lock().unwrap().push(page);
            let start: u64 = self.pages.iter().take(page as usize - 1).sum();
            let len = self.pages.get(page as usize - 1).copied().unwrap_or(0);
            Ok(page_of(start..start + len))
        }
    }

    fn page_of(ids: std::ops::Range<u64>) -> QuestionsPage {
        page(ids, true)
    }

    fn app_with(source: Arc<PagedSource>) -> App {
        App::new(source, Handle::current(), 10, 300)
    }

    #[tokio::test]
    async fn mount_loads_first_page_once() {
        let source = PagedSource::new(vec![10, 10]);
        let mut app = app_with(source.clone());

        app.mount();
        app.mount();
        assert!(app.paginator.is_loading());
        app.settle().await;

        assert_eq!(app.items().len(), 10);
        assert_eq!(app.state.selected(), Some(0));
        assert_eq!(*source.calls.lock().unwrap(), vec![1]);
    }

    #[tokio::test]
    async fn scrolling_near_the_end_fetches_more() {
        let source = PagedSource::new(vec![10, 10]);
        let mut app = app_with(source.clone());
        app.mount();
        app.settle().await;

        for _ in 0..4 {
            app.on_down();
        }
        assert!(!app.paginator.is_loading());

        app.on_down();
        assert!(app.paginator.is_loading());
        // a second trigger while loading is ignored
        app.on_down();
        app.settle().await;

        assert_eq!(app.items().len(), 20);
        assert_eq!(*source.calls.lock().unwrap(), vec![1, 2]);
    }

    #[tokio::test]
    async fn end_of_data_shows_exhausted() {
        let source = PagedSource::new(vec![3]);
        let mut app = app_with(source.clone());
        app.mount();
        app.settle().await;

        app.on_end();
        app.settle().await;
        assert_eq!(app.paginator.status(), &FetchStatus::Exhausted);

        app.on_end();
        assert!(!app.paginator.is_loading());
        assert_eq!(*source.calls.lock().unwrap(), vec![1, 2]);
    }

    #[tokio::test]
    async fn overlay_open_scroll_dismiss() {
        let source = PagedSource::new(vec![10]);
        let mut app = app_with(source);
        app.mount();
        app.settle().await;

        app.on_down();
        app.on_enter();
        assert_eq!(app.overlay.selection().unwrap().title, "question 1");
        assert_eq!(app.selected_link(), Some("https://stackoverflow.com/q/1"));

        app.on_down();
        app.on_down();
        assert_eq!(app.overlay_scroll, 2);
        assert_eq!(app.state.selected(), Some(1));

        app.on_back();
        assert!(!app.overlay.is_open());
        assert_eq!(app.overlay_scroll, 0);
    }

    #[tokio::test]
    async fn quit_discards_outstanding_fetch() {
        let source = PagedSource::new(vec![10]);
        let mut app = app_with(source);
        let request = app.paginator.mount().unwrap();
        app.quit();

        app.handle_message(AppMessage::PageFetched {
            request,
            result: Ok(page_of(0..10)),
        });
        assert!(app.items().is_empty());
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn navigation_on_empty_list_is_harmless() {
        let source = PagedSource::new(vec![]);
        let mut app = app_with(source);
        app.on_down();
        app.on_page_down();
        app.on_up();
        app.on_end();
        app.on_enter();
        assert_eq!(app.state.selected(), None);
        assert!(!app.overlay.is_open());
    }

    /// Page 2 fails once, then behaves.
    struct FlakySource {
        failed: Mutex<bool>,
        calls: Mutex<Vec<u32>>,
    }

    #[async_trait]
    impl QuestionSource for FlakySource {
        async fn fetch_page(&self, page: u32, _page_size: u32) -> Result<QuestionsPage, FetchError> {
            self.calls.lock().unwrap().push(page);
            let mut failed = self.failed.lock().unwrap();
            if page == 2 && !*failed {
                *failed = true;
                return Err(FetchError::Transport("connection reset".into()));
            }
            let start = (page as u64 - 1) * 10;
            Ok(page_of(start..start + 10))
        }
    }

    #[tokio::test]
    async fn retry_after_error_refetches_same_page() {
        let source = Arc::new(FlakySource {
            failed: Mutex::new(false),
            calls: Mutex::new(Vec::new()),
        });
        let mut app = App::new(source.clone(), Handle::current(), 10, 300);

        // nothing to retry yet
        app.on_retry();
        assert!(!app.paginator.is_loading());

        app.mount();
        app.settle().await;
        app.on_end();
        app.settle().await;
        assert!(app.paginator.error().is_some());
        assert_eq!(app.items().len(), 10);

        app.on_retry();
        assert!(app.paginator.is_loading());
        app.settle().await;

        assert_eq!(app.paginator.status(), &FetchStatus::Loaded);
        assert_eq!(app.items().len(), 20);
        assert_eq!(app.paginator.page(), 3);
        assert_eq!(*source.calls.lock().unwrap(), vec![1, 2, 2]);
    }
}

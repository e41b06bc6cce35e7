//! Debounced query controller / 防抖查询控制器
//!
//! `ControllerState` is a plain state machine: inputs go in, `FetchRequest`s
//! come out, and fetch results are fed back through `resolve`. Every request
//! carries a generation number; a result is applied only while its generation
//! is still the latest one issued, so a slow stale response can never
//! overwrite fresher results.
//!
//! `spawn` drives the state machine on a tokio task: search-text edits wait
//! for the debounce delay, category and page changes fetch immediately, and
//! issuing a new fetch cancels the previous in-flight one.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

use crate::config::AppConfig;
use crate::error::FetchError;
use crate::models::{Advocate, Criteria, PaginationInfo, ResultPage};

use super::fetcher::Fetcher;

/// Search debounce delay / 搜索防抖延迟
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(500);

/// Debounce phase of the search text / 搜索输入的防抖阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No edit since the last commit / 无待处理输入
    Idle,
    /// Waiting for input to settle / 等待输入稳定
    Pending { deadline: Instant },
    /// Last edit committed as the debounced value / 已提交
    Settled,
}

/// One outbound fetch / 一次查询请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub generation: u64,
    pub criteria: Criteria,
}

/// What happened to a fetch result / 结果处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Applied,
    Failed,
    /// Stale generation or cancellation / 过期或已取消
    Discarded,
}

/// User input / 用户输入
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    SearchText(String),
    ToggleCategory(String),
    ClearCategories,
    SetPage(u64),
    Retry,
}

/// Displayed state / 界面显示状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub records: Vec<Advocate>,
    pub pagination: PaginationInfo,
    pub is_loading: bool,
    pub error: Option<String>,
    pub search_text: String,
    pub debounced_search: String,
    pub categories: Vec<String>,
    pub page: u64,
}

#[derive(Debug, Clone)]
pub struct ControllerState {
    delay: Duration,
    limit: u64,
    search_text: String,
    debounced_search: String,
    categories: Vec<String>,
    page: u64,
    phase: Phase,
    generation: u64,
    records: Vec<Advocate>,
    pagination: PaginationInfo,
    is_loading: bool,
    error: Option<String>,
}

impl ControllerState {
    pub fn new(limit: u64, delay: Duration) -> Self {
        let limit = limit.max(1);
        Self {
            delay,
            limit,
            search_text: String::new(),
            debounced_search: String::new(),
            categories: Vec::new(),
            page: 1,
            phase: Phase::Idle,
            generation: 0,
            records: Vec::new(),
            pagination: PaginationInfo { limit, ..PaginationInfo::default() },
            is_loading: false,
            error: None,
        }
    }

    /// Initial fetch with empty criteria / 初始查询
    pub fn start(&mut self) -> FetchRequest {
        self.issue()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Pending debounce deadline, if any / 防抖截止时间
    pub fn deadline(&self) -> Option<Instant> {
        match self.phase {
            Phase::Pending { deadline } => Some(deadline),
            _ => None,
        }
    }

    /// Apply one input; search edits only schedule, everything else may fetch / 处理输入
    pub fn apply(&mut self, input: Input, now: Instant) -> Option<FetchRequest> {
        match input {
            Input::SearchText(text) => {
                self.set_search_text(text, now);
                None
            }
            Input::ToggleCategory(category) => Some(self.toggle_category(category)),
            Input::ClearCategories => self.clear_categories(),
            Input::SetPage(page) => self.set_page(page),
            Input::Retry => Some(self.retry()),
        }
    }

    /// Record a search edit and restart the debounce timer / 更新搜索文本并重启计时
    pub fn set_search_text(&mut self, text: String, now: Instant) -> Instant {
        self.search_text = text;
        let deadline = now + self.delay;
        self.phase = Phase::Pending { deadline };
        deadline
    }

    /// Commit the search text once the timer has elapsed / 防抖到期后提交
    ///
    /// Fetches only when the committed value actually changed; the page then
    /// resets to 1.
    pub fn poll_debounce(&mut self, now: Instant) -> Option<FetchRequest> {
        let Phase::Pending { deadline } = self.phase else {
            return None;
        };
        if now < deadline {
            return None;
        }
        self.phase = Phase::Settled;

        let committed = self.search_text.trim();
        if committed == self.debounced_search {
            return None;
        }
        self.debounced_search = committed.to_string();
        self.page = 1;
        Some(self.issue())
    }

    /// Add the category if absent, remove it if present / 切换专长筛选
    pub fn toggle_category(&mut self, category: String) -> FetchRequest {
        if let Some(pos) = self.categories.iter().position(|c| *c == category) {
            self.categories.remove(pos);
        } else {
            self.categories.push(category);
        }
        self.page = 1;
        self.issue()
    }

    pub fn clear_categories(&mut self) -> Option<FetchRequest> {
        if self.categories.is_empty() {
            return None;
        }
        self.categories.clear();
        self.page = 1;
        Some(self.issue())
    }

    /// Jump to a page; values below 1 become 1 / 翻页
    pub fn set_page(&mut self, page: u64) -> Option<FetchRequest> {
        let page = page.max(1);
        if page == self.page {
            return None;
        }
        self.page = page;
        Some(self.issue())
    }

    /// Manual retry of the current criteria / 手动重试
    pub fn retry(&mut self) -> FetchRequest {
        self.issue()
    }

    fn criteria(&self) -> Criteria {
        Criteria::new(&self.debounced_search, self.categories.clone(), self.page, self.limit)
    }

    fn issue(&mut self) -> FetchRequest {
        self.generation += 1;
        self.is_loading = true;
        self.error = None;
        FetchRequest {
            generation: self.generation,
            criteria: self.criteria(),
        }
    }

    /// Feed back a fetch result / 处理查询结果
    pub fn resolve(&mut self, generation: u64, result: Result<ResultPage, FetchError>) -> Resolution {
        if generation != self.generation {
            tracing::debug!("Discarding stale response: generation {} (current {})", generation, self.generation);
            return Resolution::Discarded;
        }
        self.is_loading = false;
        match result {
            Ok(page) => {
                self.pagination = page.pagination();
                self.records = page.records;
                Resolution::Applied
            }
            Err(e) if e.is_cancelled() => Resolution::Discarded,
            Err(e) => {
                tracing::warn!("Advocate fetch failed: {}", e);
                self.error = Some(e.to_string());
                Resolution::Failed
            }
        }
    }

    pub fn view(&self) -> ViewState {
        ViewState {
            records: self.records.clone(),
            pagination: self.pagination,
            is_loading: self.is_loading,
            error: self.error.clone(),
            search_text: self.search_text.clone(),
            debounced_search: self.debounced_search.clone(),
            categories: self.categories.clone(),
            page: self.page,
        }
    }
}

/// Handle to a running controller / 运行中控制器的句柄
pub struct ControllerHandle {
    inputs: mpsc::UnboundedSender<Input>,
    view: watch::Receiver<ViewState>,
    task: JoinHandle<()>,
}

impl ControllerHandle {
    /// Send an input; returns false once the controller has stopped / 发送输入
    pub fn send(&self, input: Input) -> bool {
        self.inputs.send(input).is_ok()
    }

    pub fn set_search_text(&self, text: impl Into<String>) -> bool {
        self.send(Input::SearchText(text.into()))
    }

    pub fn toggle_category(&self, category: impl Into<String>) -> bool {
        self.send(Input::ToggleCategory(category.into()))
    }

    pub fn clear_categories(&self) -> bool {
        self.send(Input::ClearCategories)
    }

    pub fn set_page(&self, page: u64) -> bool {
        self.send(Input::SetPage(page))
    }

    pub fn retry(&self) -> bool {
        self.send(Input::Retry)
    }

    /// Current displayed state / 当前显示状态
    pub fn view(&self) -> ViewState {
        self.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.view.clone()
    }

    /// Stop the controller and cancel any in-flight fetch / 停止控制器
    pub async fn shutdown(self) {
        drop(self.inputs);
        if let Err(e) = self.task.await {
            tracing::warn!("Query controller task ended abnormally: {}", e);
        }
    }
}

type Completion = (u64, Result<ResultPage, FetchError>);

struct Driver {
    state: ControllerState,
    fetcher: Arc<dyn Fetcher>,
    completions: mpsc::UnboundedSender<Completion>,
    in_flight: Option<CancellationToken>,
}

impl Driver {
    fn dispatch(&mut self, request: FetchRequest) {
        if let Some(previous) = self.in_flight.take() {
            previous.cancel();
        }
        let token = CancellationToken::new();
        self.in_flight = Some(token.clone());

        let fetcher = self.fetcher.clone();
        let completions = self.completions.clone();
        tokio::spawn(async move {
            let result = tokio::select! {
                _ = token.cancelled() => Err(FetchError::Cancelled),
                result = fetcher.fetch(&request.criteria) => result,
            };
            // Receiver gone means the controller stopped
            let _ = completions.send((request.generation, result));
        });
    }

    async fn run(
        mut self,
        mut inputs: mpsc::UnboundedReceiver<Input>,
        mut done: mpsc::UnboundedReceiver<Completion>,
        view: watch::Sender<ViewState>,
    ) {
        loop {
            let deadline = self.state.deadline();
            let wake_at = deadline.unwrap_or_else(|| Instant::now() + Duration::from_secs(3600));

            tokio::select! {
                input = inputs.recv() => {
                    let Some(input) = input else { break };
                    if let Some(request) = self.state.apply(input, Instant::now()) {
                        self.dispatch(request);
                    }
                }
                Some((generation, result)) = done.recv() => {
                    self.state.resolve(generation, result);
                    if generation == self.state.generation() {
                        self.in_flight = None;
                    }
                }
                _ = sleep_until(wake_at), if deadline.is_some() => {
                    if let Some(request) = self.state.poll_debounce(Instant::now()) {
                        self.dispatch(request);
                    }
                }
            }

            view.send_replace(self.state.view());
        }

        if let Some(token) = self.in_flight.take() {
            token.cancel();
        }
        tracing::debug!("Query controller stopped");
    }
}

/// Start a controller with the configured page size and debounce delay / 按配置启动控制器
pub fn spawn_with_config(fetcher: Arc<dyn Fetcher>, config: &AppConfig) -> ControllerHandle {
    spawn(fetcher, config.directory.default_limit, config.debounce_delay())
}

/// Start a controller on the current tokio runtime / 启动查询控制器
pub fn spawn(fetcher: Arc<dyn Fetcher>, limit: u64, delay: Duration) -> ControllerHandle {
    let mut state = ControllerState::new(limit, delay);
    let first = state.start();
    let (input_tx, input_rx) = mpsc::unbounded_channel();
    let (done_tx, done_rx) = mpsc::unbounded_channel();
    let (view_tx, view_rx) = watch::channel(state.view());

    let mut driver = Driver {
        state,
        fetcher,
        completions: done_tx,
        in_flight: None,
    };
    driver.dispatch(first);
    let task = tokio::spawn(driver.run(input_rx, done_rx, view_tx));

    ControllerHandle {
        inputs: input_tx,
        view: view_rx,
        task,
    }
}

//! Query client: fetch transports and the debounced controller / 查询客户端

pub mod controller;
pub mod fetcher;

pub use controller::{spawn, spawn_with_config, ControllerHandle, ControllerState, FetchRequest, Input, Phase, Resolution, ViewState, DEBOUNCE_DELAY};
pub use fetcher::{ExecutorFetcher, Fetcher, HttpFetcher};

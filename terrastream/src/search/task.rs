//! Search tasks and their manager.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use thiserror::Error;

use super::filter::filter_results;
use super::item::SearchItem;
use super::parse::parse_results;
use crate::config::{DEFAULT_SEARCH_FILTERING, DEFAULT_SEARCH_SRS, DEFAULT_SEARCH_URL};
use crate::coord::{distance, CoordinateConvertor, Point3, SrsType};
use crate::log::Logger;
use crate::resource::{ContentKind, ResourceHandle, ResourceRef, ResourceRegistry, ResourceState};
use crate::{log_debug, log_error, log_info};

/// Placeholder replaced by the encoded query in search URL templates.
pub const QUERY_PLACEHOLDER: &str = "{value}";

/// Search failures. Each one finishes its task.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    /// The search URL or SRS changed after the task was created.
    #[error("search for '{query}' is no longer valid")]
    Stale { query: String },

    #[error("failed to parse results for '{query}': {reason}")]
    Parse { query: String, reason: String },

    #[error("failed to load results for '{query}': {reason}")]
    Load { query: String, reason: String },
}

/// Where and how searches are made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    url_template: String,
    srs: SrsType,
    filtering: bool,
}

impl SearchConfig {
    pub fn new(url_template: impl Into<String>, srs: SrsType) -> Self {
        Self {
            url_template: url_template.into(),
            srs,
            filtering: DEFAULT_SEARCH_FILTERING,
        }
    }

    pub fn with_filtering(mut self, filtering: bool) -> Self {
        self.filtering = filtering;
        self
    }

    pub fn url_template(&self) -> &str {
        &self.url_template
    }

    /// Reference frame the search service reports positions in.
    pub fn srs(&self) -> SrsType {
        self.srs
    }

    pub fn filtering(&self) -> bool {
        self.filtering
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_URL, DEFAULT_SEARCH_SRS)
    }
}

/// Bytes outside the RFC 3986 unreserved set.
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encode everything outside the RFC 3986 unreserved set.
pub fn url_encode(value: &str) -> String {
    utf8_percent_encode(value, QUERY_ENCODE_SET).to_string()
}

/// Substitute the encoded query for the first `{value}` in `template`.
pub fn generate_search_url(template: &str, query: &str) -> String {
    template.replacen(QUERY_PLACEHOLDER, &url_encode(query), 1)
}

#[derive(Debug)]
enum Outcome {
    Pending,
    Done(Result<Vec<SearchItem>, SearchError>),
}

#[derive(Debug)]
struct TaskInner {
    outcome: Outcome,
    resource: Option<ResourceRef>,
}

/// One query in flight or finished.
///
/// Shared with the caller as `Arc<SearchTask>`; the manager only keeps a
/// weak reference, so dropping the last `Arc` abandons the search.
pub struct SearchTask {
    query: String,
    position: Point3,
    url: String,
    validity_url: String,
    validity_srs: SrsType,
    convertor: Arc<dyn CoordinateConvertor>,
    inner: Mutex<TaskInner>,
}

impl SearchTask {
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Origin distances are measured from.
    pub fn position(&self) -> Point3 {
        self.position
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_done(&self) -> bool {
        matches!(self.lock().outcome, Outcome::Done(_))
    }

    /// Filtered results once done; empty while pending or after failure.
    pub fn results(&self) -> Vec<SearchItem> {
        match &self.lock().outcome {
            Outcome::Done(Ok(items)) => items.clone(),
            _ => Vec::new(),
        }
    }

    pub fn error(&self) -> Option<SearchError> {
        match &self.lock().outcome {
            Outcome::Done(Err(e)) => Some(e.clone()),
            _ => None,
        }
    }

    /// Recompute every result's distance from `point`.
    ///
    /// Fails if `current` no longer matches the URL and SRS this task was
    /// created with.
    pub fn update_distances(&self, point: Point3, current: &SearchConfig) -> Result<(), SearchError> {
        if current.url_template() != self.validity_url || current.srs() != self.validity_srs {
            return Err(SearchError::Stale {
                query: self.query.clone(),
            });
        }
        if let Outcome::Done(Ok(items)) = &mut self.lock().outcome {
            for item in items.iter_mut() {
                item.distance = distance(self.convertor.as_ref(), item.position, point);
            }
        }
        Ok(())
    }

    fn finish(&self, result: Result<Vec<SearchItem>, SearchError>) {
        let mut inner = self.lock();
        inner.outcome = Outcome::Done(result);
        inner.resource = None;
    }

    fn lock(&self) -> MutexGuard<'_, TaskInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for SearchTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchTask")
            .field("query", &self.query)
            .field("url", &self.url)
            .field("done", &self.is_done())
            .finish()
    }
}

struct Tracked {
    task: Weak<SearchTask>,
    handle: ResourceHandle,
}

/// Starts searches and resolves them as their results arrive.
pub struct SearchManager {
    config: SearchConfig,
    convertor: Arc<dyn CoordinateConvertor>,
    tasks: Vec<Tracked>,
    logger: Arc<dyn Logger>,
}

impl SearchManager {
    pub fn new(
        config: SearchConfig,
        convertor: Arc<dyn CoordinateConvertor>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            config,
            convertor,
            tasks: Vec::new(),
            logger,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Replace the configuration. Existing tasks become stale for
    /// `update_distances` if the URL or SRS changed.
    pub fn set_config(&mut self, config: SearchConfig) {
        self.config = config;
    }

    /// Start a search around `point`. The results resource is requested at
    /// infinite priority and held until the task resolves.
    pub fn search(
        &mut self,
        registry: &mut ResourceRegistry,
        query: &str,
        point: Point3,
    ) -> Arc<SearchTask> {
        let url = generate_search_url(self.config.url_template(), query);
        let handle = registry.request(&url, ContentKind::Json, f32::INFINITY);
        let task = Arc::new(SearchTask {
            query: query.to_string(),
            position: point,
            url: url.clone(),
            validity_url: self.config.url_template().to_string(),
            validity_srs: self.config.srs(),
            convertor: Arc::clone(&self.convertor),
            inner: Mutex::new(TaskInner {
                outcome: Outcome::Pending,
                resource: registry.hold(handle),
            }),
        });
        self.tasks.push(Tracked {
            task: Arc::downgrade(&task),
            handle,
        });
        log_info!(self.logger, "Search '{}' started: {}", query, url);
        task
    }

    /// Advance every tracked task. Resolved and abandoned tasks are
    /// dropped from tracking. Returns how many resolved this call.
    pub fn update(&mut self, registry: &mut ResourceRegistry) -> usize {
        let mut resolved = 0;
        let mut tasks = std::mem::take(&mut self.tasks);
        tasks.retain(|tracked| {
            let Some(task) = tracked.task.upgrade() else {
                log_debug!(self.logger, "Search abandoned before completion");
                return false;
            };
            match registry.poll(tracked.handle) {
                ResourceState::Uninitialized | ResourceState::Downloading => {
                    registry.touch(tracked.handle);
                    true
                }
                ResourceState::Error => {
                    let reason = registry
                        .error(tracked.handle)
                        .map_or_else(|| "resource unavailable".to_string(), |e| e.to_string());
                    let err = SearchError::Load {
                        query: task.query.clone(),
                        reason,
                    };
                    log_error!(self.logger, "Search failed, url: {}, error: {}", task.url, err);
                    task.finish(Err(err));
                    resolved += 1;
                    false
                }
                ResourceState::Ready => {
                    let result = self.resolve(registry, tracked.handle, &task);
                    if let Err(err) = &result {
                        log_error!(self.logger, "Search failed, url: {}, error: {}", task.url, err);
                    }
                    task.finish(result);
                    resolved += 1;
                    false
                }
            }
        });
        self.tasks = tasks;
        resolved
    }

    fn resolve(
        &self,
        registry: &ResourceRegistry,
        handle: ResourceHandle,
        task: &SearchTask,
    ) -> Result<Vec<SearchItem>, SearchError> {
        let doc = registry.json(handle).ok_or_else(|| SearchError::Parse {
            query: task.query.clone(),
            reason: "results are not a JSON document".to_string(),
        })?;
        let items = parse_results(doc, task.position, self.convertor.as_ref()).map_err(|reason| {
            SearchError::Parse {
                query: task.query.clone(),
                reason,
            }
        })?;
        let raw = items.len();
        let items = if self.config.filtering() {
            filter_results(items, self.convertor.as_ref())
        } else {
            items
        };
        log_info!(
            self.logger,
            "Search '{}' finished with {} results ({} raw)",
            task.query,
            items.len(),
            raw
        );
        Ok(items)
    }

    /// Tasks still tracked.
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }
}

impl std::fmt::Debug for SearchManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchManager")
            .field("config", &self.config)
            .field("pending", &self.tasks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Cache;
    use crate::coord::IdentityConvertor;
    use crate::log::NoOpLogger;
    use std::fs;
    use tempfile::TempDir;

    fn manager(template: &str) -> SearchManager {
        SearchManager::new(
            SearchConfig::new(template, SrsType::Cartesian),
            Arc::new(IdentityConvertor::new(SrsType::Cartesian)),
            Arc::new(NoOpLogger),
        )
    }

    // A template without `{value}` always resolves to the same local file.
    fn results_file(dir: &TempDir, body: &str) -> String {
        let path = dir.path().join("results.json");
        fs::write(&path, body).unwrap();
        path.display().to_string()
    }

    #[test]
    fn test_url_encode() {
        assert_eq!(url_encode("New York"), "New%20York");
        assert_eq!(url_encode("a&b=c/d"), "a%26b%3Dc%2Fd");
        assert_eq!(url_encode("Plzeň"), "Plze%C5%88");
        assert_eq!(url_encode("safe-._~"), "safe-._~");
        assert_eq!(url_encode("50% *off*"), "50%25%20%2Aoff%2A");
    }

    #[test]
    fn test_generate_search_url() {
        assert_eq!(
            generate_search_url("https://s.example/q={value}&f=json", "Brno city"),
            "https://s.example/q=Brno%20city&f=json"
        );
        assert_eq!(generate_search_url("https://s.example/", "x"), "https://s.example/");
    }

    #[test]
    fn test_search_resolves_from_local_results() {
        let dir = TempDir::new().unwrap();
        let template = results_file(
            &dir,
            r#"[
                {"display_name": "Springfield, USA", "type": "building", "lon": 0, "lat": 0},
                {"display_name": "Springfield, USA", "type": "city", "lon": 50000, "lat": 0}
            ]"#,
        );
        let mut registry = ResourceRegistry::json_only(Cache::local(dir.path()));
        let mut searches = manager(&template);

        let task = searches.search(&mut registry, "springfield", [0.0; 3]);
        assert_eq!(registry.priority(registry.find(task.url()).unwrap()), Some(f32::INFINITY));
        assert!(!task.is_done());

        assert_eq!(searches.update(&mut registry), 1);
        assert_eq!(searches.pending(), 0);
        assert!(task.is_done());
        let results = task.results();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].kind, "city");
        assert_eq!(results[0].distance, 50000.0);

        // The results resource is released once the task is done.
        assert_eq!(registry.collect(), 1);
    }

    #[test]
    fn test_malformed_results_finish_with_error() {
        let dir = TempDir::new().unwrap();
        let template = results_file(&dir, r#"{"error": "rate limited"}"#);
        let mut registry = ResourceRegistry::json_only(Cache::local(dir.path()));
        let mut searches = manager(&template);

        let task = searches.search(&mut registry, "x", [0.0; 3]);
        searches.update(&mut registry);
        assert!(matches!(task.error(), Some(SearchError::Parse { .. })));
        assert!(task.results().is_empty());
    }

    #[test]
    fn test_missing_results_finish_with_load_error() {
        let dir = TempDir::new().unwrap();
        let template = dir.path().join("absent.json").display().to_string();
        let mut registry = ResourceRegistry::json_only(Cache::local(dir.path()));
        let mut searches = manager(&template);

        let task = searches.search(&mut registry, "x", [0.0; 3]);
        searches.update(&mut registry);
        assert!(matches!(task.error(), Some(SearchError::Load { .. })));
    }

    #[test]
    fn test_abandoned_task_dropped() {
        let dir = TempDir::new().unwrap();
        let mut registry = ResourceRegistry::json_only(Cache::local(dir.path()));
        let mut searches = manager("https://s.example/?q={value}");

        drop(searches.search(&mut registry, "x", [0.0; 3]));
        assert_eq!(searches.pending(), 1);
        assert_eq!(searches.update(&mut registry), 0);
        assert_eq!(searches.pending(), 0);
    }

    #[test]
    fn test_update_distances_and_staleness() {
        let dir = TempDir::new().unwrap();
        let template = results_file(
            &dir,
            r#"[{"display_name": "A", "type": "city", "lon": 100, "lat": 0}]"#,
        );
        let mut registry = ResourceRegistry::json_only(Cache::local(dir.path()));
        let mut searches = manager(&template);
        let task = searches.search(&mut registry, "a", [0.0; 3]);
        searches.update(&mut registry);

        task.update_distances([100.0, 10.0, 0.0], searches.config()).unwrap();
        assert_eq!(task.results()[0].distance, 10.0);

        searches.set_config(SearchConfig::new(&template, SrsType::Geographic));
        let err = task.update_distances([0.0; 3], searches.config()).unwrap_err();
        assert_eq!(err, SearchError::Stale { query: "a".into() });
    }
}

//! Task source adapter: paginated Jira JQL search.
//!
//! Fetches the authoritative task list over the Jira REST API with
//! basic auth (email + API token). Pagination is transparent: pages
//! are fetched until the reported total is reached or a page comes
//! back empty. A transport failure after the first page surfaces the
//! partial results already fetched; nothing is refetched in the same
//! run.

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::model::Task;

/// Fields requested per issue; everything the widest schema can map.
const SEARCH_FIELDS: &str = "key,summary,status,assignee,project,resolutiondate";

/// Display value for issues without an assignee.
const UNASSIGNED: &str = "Unassigned";

/// A source of tracker tasks.
///
/// The engine consumes this capability; tests stub it without HTTP.
pub trait TaskSource {
    /// Fetch all tasks matching the configured query.
    fn fetch_tasks(&self) -> Result<Vec<Task>>;
}

/// Jira REST client over a blocking HTTP transport.
pub struct JiraClient {
    client: reqwest::blocking::Client,
    base_url: String,
    email: String,
    api_token: String,
    jql: String,
    page_size: usize,
}

impl JiraClient {
    #[must_use]
    pub fn new(
        base_url: String,
        email: String,
        api_token: String,
        jql: String,
        page_size: usize,
    ) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            email,
            api_token,
            jql,
            page_size: page_size.max(1),
        }
    }

    fn fetch_page(&self, start_at: usize) -> Result<SearchResponse> {
        let url = format!("{}/rest/api/3/search", self.base_url);
        let response = self
            .client
            .get(&url)
            .basic_auth(&self.email, Some(&self.api_token))
            .header("Accept", "application/json")
            .query(&[
                ("jql", self.jql.as_str()),
                ("fields", SEARCH_FIELDS),
                ("startAt", &start_at.to_string()),
                ("maxResults", &self.page_size.to_string()),
            ])
            .send()
            .map_err(|e| Error::Tracker(format!("search request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::Tracker(format!(
                "search returned HTTP {}",
                response.status()
            )));
        }

        response
            .json()
            .map_err(|e| Error::Tracker(format!("failed to parse search response: {e}")))
    }
}

impl TaskSource for JiraClient {
    fn fetch_tasks(&self) -> Result<Vec<Task>> {
        collect_pages(|start_at| self.fetch_page(start_at))
    }
}

/// Drive the pagination loop over a page fetcher.
///
/// Advances by the number of issues each page actually carried, not by
/// the requested page size: the server may cap `maxResults` below the
/// configured value, and the loop must keep going until the reported
/// total is reached or a page comes back empty.
fn collect_pages(mut fetch_page: impl FnMut(usize) -> Result<SearchResponse>) -> Result<Vec<Task>> {
    let mut tasks: Vec<Task> = Vec::new();
    let mut start_at = 0usize;

    loop {
        let page = match fetch_page(start_at) {
            Ok(page) => page,
            Err(e) if !tasks.is_empty() => {
                // Partial results are still usable; later phases only
                // touch the tasks that were fetched.
                warn!(fetched = tasks.len(), "page fetch failed, using partial results: {e}");
                break;
            }
            Err(e) => return Err(e),
        };

        if page.issues.is_empty() {
            break;
        }
        let fetched = page.issues.len();
        tasks.extend(page.issues.into_iter().map(issue_to_task));

        if tasks.len() >= page.total {
            break;
        }
        start_at += fetched;
        info!(fetched = tasks.len(), total = page.total, "fetching tracker tasks");
    }

    info!(count = tasks.len(), "tracker tasks fetched");
    Ok(tasks)
}

fn issue_to_task(issue: Issue) -> Task {
    let fields = issue.fields;
    Task {
        key: issue.key,
        title: fields.summary.unwrap_or_default(),
        raw_status: fields.status.map(|s| s.name).unwrap_or_default(),
        resolution_date: fields.resolutiondate.unwrap_or_default(),
        extra: vec![
            (
                "assignee".to_string(),
                fields
                    .assignee
                    .and_then(|a| a.display_name)
                    .unwrap_or_else(|| UNASSIGNED.to_string()),
            ),
            (
                "project".to_string(),
                fields.project.and_then(|p| p.name).unwrap_or_default(),
            ),
        ],
    }
}

// ── Wire types ────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    issues: Vec<Issue>,
    #[serde(default)]
    total: usize,
}

#[derive(Debug, Deserialize)]
struct Issue {
    key: String,
    fields: IssueFields,
}

#[derive(Debug, Deserialize)]
struct IssueFields {
    summary: Option<String>,
    status: Option<StatusField>,
    assignee: Option<UserField>,
    project: Option<ProjectField>,
    resolutiondate: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatusField {
    name: String,
}

#[derive(Debug, Deserialize)]
struct UserField {
    #[serde(rename = "displayName")]
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProjectField {
    name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_deserialization() {
        let body = r#"{
            "issues": [{
                "key": "KAN-7",
                "fields": {
                    "summary": "Fix login",
                    "status": {"name": "In Progress"},
                    "assignee": {"displayName": "Jo Doe"},
                    "project": {"name": "Kanban"},
                    "resolutiondate": null
                }
            }],
            "total": 1
        }"#;
        let response: SearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.total, 1);

        let task = issue_to_task(response.issues.into_iter().next().unwrap());
        assert_eq!(task.key, "KAN-7");
        assert_eq!(task.title, "Fix login");
        assert_eq!(task.raw_status, "In Progress");
        assert_eq!(task.resolution_date, "");
        assert_eq!(task.extra_field("assignee"), Some("Jo Doe"));
        assert_eq!(task.extra_field("project"), Some("Kanban"));
    }

    #[test]
    fn test_missing_fields_get_defaults() {
        let body = r#"{
            "issues": [{"key": "KAN-8", "fields": {
                "summary": null, "status": null, "assignee": null,
                "project": null, "resolutiondate": null
            }}],
            "total": 1
        }"#;
        let response: SearchResponse = serde_json::from_str(body).unwrap();
        let task = issue_to_task(response.issues.into_iter().next().unwrap());
        assert_eq!(task.title, "");
        assert_eq!(task.raw_status, "");
        assert_eq!(task.extra_field("assignee"), Some("Unassigned"));
        assert_eq!(task.extra_field("project"), Some(""));
    }

    #[test]
    fn test_empty_search_response() {
        let response: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(response.issues.is_empty());
        assert_eq!(response.total, 0);
    }

    fn issue(key: &str) -> Issue {
        Issue {
            key: key.to_string(),
            fields: IssueFields {
                summary: None,
                status: None,
                assignee: None,
                project: None,
                resolutiondate: None,
            },
        }
    }

    #[test]
    fn test_pagination_stops_at_reported_total() {
        let mut starts = Vec::new();
        let tasks = collect_pages(|start_at| {
            starts.push(start_at);
            Ok(SearchResponse {
                issues: vec![issue(&format!("KAN-{start_at}"))],
                total: 3,
            })
        })
        .unwrap();

        assert_eq!(tasks.len(), 3);
        assert_eq!(starts, vec![0, 1, 2]);
    }

    #[test]
    fn test_server_capped_pages_still_fetch_everything() {
        // The server returns 2 issues per page no matter what
        // maxResults asked for; all 5 must still come back.
        let pages: Vec<Vec<Issue>> = vec![
            vec![issue("KAN-1"), issue("KAN-2")],
            vec![issue("KAN-3"), issue("KAN-4")],
            vec![issue("KAN-5")],
        ];
        let tasks = collect_pages(|start_at| {
            Ok(SearchResponse {
                issues: pages[start_at / 2]
                    .iter()
                    .map(|i| issue(&i.key))
                    .collect(),
                total: 5,
            })
        })
        .unwrap();

        assert_eq!(tasks.len(), 5);
        assert_eq!(tasks[4].key, "KAN-5");
    }

    #[test]
    fn test_empty_page_terminates_short_of_total() {
        // A stale total must not spin the loop once pages run dry.
        let tasks = collect_pages(|start_at| {
            Ok(SearchResponse {
                issues: if start_at == 0 { vec![issue("KAN-1")] } else { Vec::new() },
                total: 10,
            })
        })
        .unwrap();
        assert_eq!(tasks.len(), 1);
    }

    #[test]
    fn test_failure_after_first_page_keeps_partial_results() {
        let tasks = collect_pages(|start_at| {
            if start_at == 0 {
                Ok(SearchResponse {
                    issues: vec![issue("KAN-1")],
                    total: 3,
                })
            } else {
                Err(Error::Tracker("boom".into()))
            }
        })
        .unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].key, "KAN-1");
    }

    #[test]
    fn test_failure_on_first_page_aborts() {
        let err = collect_pages(|_| Err(Error::Tracker("boom".into()))).unwrap_err();
        assert!(matches!(err, Error::Tracker(_)));
    }
}

//! Log artifact resolution and line-indexed search.
//!
//! Nothing here touches the network; [`crate::core::services::log_service`]
//! feeds it with the artifact list and the downloaded text.

use crate::api::models::{JobLogUrl, ResultModel};
use crate::error::ApiError;
use serde::{Deserialize, Serialize};

/// A job's log artifact chosen for download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogReference {
    pub job_id: u64,
    pub artifact_name: String,
    pub resolved_url: String,
    pub parse_status: String,
}

impl LogReference {
    fn from_log_url(job_id: u64, log: &JobLogUrl) -> Self {
        Self {
            job_id,
            artifact_name: log.name.clone(),
            resolved_url: log.url.clone(),
            parse_status: log.parse_status.clone(),
        }
    }
}

/// Pick the artifact called `name`, or the first one when no name is given.
pub fn select_log(
    job_id: u64,
    logs: &[JobLogUrl],
    name: Option<&str>,
) -> Result<LogReference, ApiError> {
    let selected = match name {
        Some(name) => logs.iter().find(|log| log.name == name),
        None => logs.first(),
    };

    match (selected, name) {
        (Some(log), _) => Ok(LogReference::from_log_url(job_id, log)),
        (None, Some(name)) => {
            let available: Vec<&str> = logs.iter().map(|log| log.name.as_str()).collect();
            let available = if available.is_empty() {
                "none".to_string()
            } else {
                available.join(", ")
            };
            Err(ApiError::NotFound {
                status: None,
                endpoint: format!("job {}", job_id),
                message: format!(
                    "Log '{}' not found for job {}. Available logs: {}",
                    name, job_id, available
                ),
            })
        }
        (None, None) => Err(ApiError::NotFound {
            status: None,
            endpoint: format!("job {}", job_id),
            message: format!("No logs available for job {}", job_id),
        }),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchOptions {
    /// Lines of context on each side of a match; 0 disables context.
    pub context_lines: usize,
    /// Stop scanning after this many matches.
    pub max_matches: Option<usize>,
}

impl SearchOptions {
    pub fn with_context(context_lines: usize) -> Self {
        Self {
            context_lines,
            max_matches: None,
        }
    }
}

/// One matching line of a log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogMatch {
    /// 1-based.
    pub line_number: usize,
    pub line: String,
    /// Surrounding lines in document order, the match included.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Vec<String>>,
    /// Line number of the first context line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_start: Option<usize>,
}

impl LogMatch {
    /// Context lines paired with their 1-based line numbers.
    pub fn numbered_context(&self) -> Vec<(usize, &str)> {
        match (&self.context, self.context_start) {
            (Some(context), Some(start)) => context
                .iter()
                .enumerate()
                .map(|(offset, line)| (start + offset, line.as_str()))
                .collect(),
            _ => vec![(self.line_number, self.line.as_str())],
        }
    }
}

impl ResultModel for LogMatch {}
impl ResultModel for LogReference {}

/// Case-sensitive substring scan of `text`, line by line.
pub fn search_lines(text: &str, pattern: &str, options: SearchOptions) -> Vec<LogMatch> {
    let lines: Vec<&str> = text.lines().collect();
    let mut matches = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        if options.max_matches.is_some_and(|max| matches.len() >= max) {
            break;
        }
        if !line.contains(pattern) {
            continue;
        }

        let (context, context_start) = if options.context_lines > 0 {
            let start = idx.saturating_sub(options.context_lines);
            let end = (idx + options.context_lines).min(lines.len() - 1);
            let window = lines[start..=end].iter().map(|l| l.to_string()).collect();
            (Some(window), Some(start + 1))
        } else {
            (None, None)
        };

        matches.push(LogMatch {
            line_number: idx + 1,
            line: line.to_string(),
            context,
            context_start,
        });
    }

    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log_url(name: &str) -> JobLogUrl {
        JobLogUrl {
            id: 1,
            job_id: 42,
            name: name.to_string(),
            url: format!("https://logs.test/{}.log", name),
            parse_status: "parsed".to_string(),
        }
    }

    #[test]
    fn test_search_with_context() {
        let text = "a\nERROR b\nc";
        let matches = search_lines(text, "ERROR", SearchOptions::with_context(1));
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].line_number, 2);
        assert_eq!(matches[0].line, "ERROR b");
        assert_eq!(
            matches[0].context,
            Some(vec!["a".to_string(), "ERROR b".to_string(), "c".to_string()])
        );
    }

    #[test]
    fn test_search_without_context() {
        let matches = search_lines("a\nERROR b\nc", "ERROR", SearchOptions::default());
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].line_number, 2);
        assert_eq!(matches[0].context, None);
        assert_eq!(matches[0].numbered_context(), vec![(2, "ERROR b")]);
    }

    #[test]
    fn test_context_clipped_to_document() {
        let text = "ERROR first\nok\nok\nERROR last";
        let matches = search_lines(text, "ERROR", SearchOptions::with_context(2));
        assert_eq!(matches.len(), 2);
        assert_eq!(
            matches[0].context.as_deref(),
            Some(&["ERROR first".to_string(), "ok".to_string(), "ok".to_string()][..])
        );
        assert_eq!(matches[0].context_start, Some(1));
        assert_eq!(matches[1].line_number, 4);
        assert_eq!(matches[1].context_start, Some(2));
        assert_eq!(
            matches[1].numbered_context(),
            vec![(2, "ok"), (3, "ok"), (4, "ERROR last")]
        );
    }

    #[test]
    fn test_search_is_case_sensitive_substring() {
        let text = "error lower\nERROR upper\nan ERROR inside\n[E.R.R.O.R]";
        let matches = search_lines(text, "ERROR", SearchOptions::default());
        let numbers: Vec<usize> = matches.iter().map(|m| m.line_number).collect();
        assert_eq!(numbers, vec![2, 3]);

        // No regex interpretation
        assert!(search_lines(text, "E.R", SearchOptions::default()).len() == 1);
        assert!(search_lines(text, "ERR.R", SearchOptions::default()).is_empty());
    }

    #[test]
    fn test_search_no_matches_is_empty() {
        assert!(search_lines("a\nb", "ERROR", SearchOptions::with_context(3)).is_empty());
        assert!(search_lines("", "ERROR", SearchOptions::default()).is_empty());
    }

    #[test]
    fn test_search_handles_crlf() {
        let matches = search_lines("a\r\nERROR b\r\nc\r\n", "ERROR", SearchOptions::default());
        assert_eq!(matches[0].line, "ERROR b");
        assert_eq!(matches[0].line_number, 2);
    }

    #[test]
    fn test_max_matches() {
        let text = "x1\nx2\nx3\nx4";
        let options = SearchOptions {
            context_lines: 0,
            max_matches: Some(2),
        };
        let matches = search_lines(text, "x", options);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[1].line_number, 2);
    }

    #[test]
    fn test_select_log_by_name() {
        let logs = vec![log_url("builds-4h"), log_url("live_backing_log")];
        let reference = select_log(42, &logs, Some("live_backing_log")).unwrap();
        assert_eq!(reference.artifact_name, "live_backing_log");
        assert_eq!(reference.resolved_url, "https://logs.test/live_backing_log.log");
        assert_eq!(reference.job_id, 42);
        assert_eq!(reference.parse_status, "parsed");
    }

    #[test]
    fn test_select_log_defaults_to_first() {
        let logs = vec![log_url("builds-4h"), log_url("live_backing_log")];
        let reference = select_log(42, &logs, None).unwrap();
        assert_eq!(reference.artifact_name, "builds-4h");
    }

    #[test]
    fn test_select_log_missing_name() {
        let logs = vec![log_url("builds-4h"), log_url("live_backing_log")];
        let err = select_log(42, &logs, Some("errorsummary_json")).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::NotFound);
        let message = err.to_string();
        assert!(message.contains("errorsummary_json"));
        assert!(message.contains("builds-4h, live_backing_log"));
    }

    #[test]
    fn test_select_log_empty_list() {
        let err = select_log(7, &[], None).unwrap_err();
        assert!(err.to_string().contains("No logs available for job 7"));
    }
}

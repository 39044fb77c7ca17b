use crate::api::models::{
    BugSuggestion, FailureByBug, FailureClassification, Job, JobLogUrl, OptionCollection,
    PerformanceAlertSummary, PerformanceFramework, Push, Repository, TextLogError,
};
use crate::core::log_search::LogMatch;
use crate::utils::text::{format_duration, format_timestamp, short_revision, truncate_text};
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table, presets};
use crossterm::terminal;

/// Column widths for free-text columns, chosen from the terminal width.
struct ColumnWidths {
    name: usize,
    text: usize,
}

pub struct TableDisplay {
    max_width: Option<usize>,
    use_colors: bool,
}

impl Default for TableDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl TableDisplay {
    pub fn new() -> Self {
        Self {
            max_width: Self::detect_terminal_width(),
            use_colors: true,
        }
    }

    fn detect_terminal_width() -> Option<usize> {
        match terminal::size() {
            Ok((cols, _)) => Some((cols as usize).clamp(40, 200)),
            Err(_) => Some(80),
        }
    }

    pub fn with_max_width(mut self, width: usize) -> Self {
        self.max_width = Some(width);
        self
    }

    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    fn bold_header(&self, text: &str, color: Color) -> Cell {
        if self.use_colors {
            Cell::new(text).add_attribute(Attribute::Bold).fg(color)
        } else {
            Cell::new(text).add_attribute(Attribute::Bold)
        }
    }

    fn colored_cell(&self, text: &str, color: Color) -> Cell {
        if self.use_colors {
            Cell::new(text).fg(color)
        } else {
            Cell::new(text)
        }
    }

    fn new_table(&self, headers: &[&str], color: Color) -> Table {
        let mut table = Table::new();
        table.load_preset(presets::UTF8_FULL);
        table.set_content_arrangement(ContentArrangement::Dynamic);
        let width = self
            .max_width
            .map(|w| if w > 20 { w - 6 } else { w.max(40) })
            .unwrap_or(80);
        table.set_width(width as u16);
        let cells: Vec<Cell> = headers.iter().map(|h| self.bold_header(h, color)).collect();
        table.set_header(cells);
        table
    }

    fn column_widths(&self) -> ColumnWidths {
        match self.max_width.unwrap_or(80) {
            0..=79 => ColumnWidths { name: 20, text: 30 },
            80..=119 => ColumnWidths { name: 30, text: 50 },
            _ => ColumnWidths { name: 45, text: 90 },
        }
    }

    /// Color for a job result as shown in the Treeherder UI.
    fn result_color(result: &str) -> Color {
        match result {
            "success" => Color::Green,
            "testfailed" => Color::Yellow,
            "busted" | "exception" => Color::Red,
            "retry" | "usercancel" => Color::Blue,
            "unknown" => Color::DarkGrey,
            _ => Color::White,
        }
    }

    pub fn render_repositories(&self, repositories: &[Repository]) -> String {
        if repositories.is_empty() {
            return "No repositories found.".to_string();
        }
        let widths = self.column_widths();
        let mut table = self.new_table(&["ID", "Name", "Group", "DVCS", "Status"], Color::Cyan);
        for repo in repositories {
            let status_color = if repo.is_active() {
                Color::Green
            } else {
                Color::DarkGrey
            };
            table.add_row(vec![
                self.colored_cell(&repo.id.to_string(), Color::Cyan),
                Cell::new(truncate_text(&repo.name, widths.name)),
                Cell::new(&repo.repository_group.name),
                Cell::new(&repo.dvcs_type),
                self.colored_cell(&repo.active_status, status_color),
            ]);
        }
        table.to_string()
    }

    pub fn render_pushes(&self, pushes: &[Push]) -> String {
        if pushes.is_empty() {
            return "No pushes found.".to_string();
        }
        let widths = self.column_widths();
        let mut table = self.new_table(
            &["ID", "Revision", "Author", "Pushed", "Commits"],
            Color::Cyan,
        );
        for push in pushes {
            table.add_row(vec![
                self.colored_cell(&push.id.to_string(), Color::Cyan),
                Cell::new(short_revision(&push.revision)),
                Cell::new(truncate_text(&push.author, widths.name)),
                Cell::new(format_timestamp(push.push_timestamp)),
                Cell::new(push.revision_count.to_string()),
            ]);
        }
        table.to_string()
    }

    pub fn render_jobs(&self, jobs: &[Job]) -> String {
        if jobs.is_empty() {
            return "No jobs found.".to_string();
        }
        let widths = self.column_widths();
        let mut table = self.new_table(
            &["ID", "Symbol", "Job", "Platform", "Result", "Duration"],
            Color::Cyan,
        );
        for job in jobs {
            let result = if job.is_completed() {
                job.result.as_str()
            } else {
                job.state.as_str()
            };
            table.add_row(vec![
                self.colored_cell(&job.id.to_string(), Color::Cyan),
                Cell::new(job.symbol()),
                Cell::new(truncate_text(&job.job_type_name, widths.text)),
                Cell::new(truncate_text(&job.platform, widths.name)),
                self.colored_cell(result, Self::result_color(result)),
                Cell::new(format_duration(job.duration_seconds())),
            ]);
        }
        table.to_string()
    }

    /// Key/value view of a single job.
    pub fn render_job_detail(&self, job: &Job, tc_root_url: &str) -> String {
        let mut table = self.new_table(&["Field", "Value"], Color::Green);
        let mut rows = vec![
            ("ID", job.id.to_string()),
            ("GUID", job.job_guid.clone()),
            ("Job", job.job_type_name.clone()),
            ("Symbol", job.symbol()),
            ("Platform", job.platform.clone()),
            ("Options", job.platform_option.clone()),
            ("Tier", job.tier.to_string()),
            ("State", job.state.clone()),
            ("Result", job.result.clone()),
            ("Push", job.push_id.to_string()),
            ("Started", format_timestamp(job.start_timestamp)),
            ("Duration", format_duration(job.duration_seconds())),
            ("Machine", job.machine_name.clone()),
        ];
        if let Some(url) = job.task_url(tc_root_url) {
            rows.push(("Task", url));
        }
        for (field, value) in rows {
            let cell = if field == "Result" {
                self.colored_cell(&value, Self::result_color(&value))
            } else {
                Cell::new(value)
            };
            table.add_row(vec![self.colored_cell(field, Color::Cyan), cell]);
        }
        table.to_string()
    }

    pub fn render_log_urls(&self, logs: &[JobLogUrl]) -> String {
        if logs.is_empty() {
            return "No logs available.".to_string();
        }
        let mut table = self.new_table(&["Name", "Parse Status", "URL"], Color::Cyan);
        for log in logs {
            table.add_row(vec![
                self.colored_cell(&log.name, Color::Cyan),
                Cell::new(&log.parse_status),
                self.colored_cell(&log.url, Color::DarkGrey),
            ]);
        }
        table.to_string()
    }

    /// Plain `line: text` listing; context lines are indented, matches marked with `>`.
    pub fn render_log_matches(&self, matches: &[LogMatch]) -> String {
        if matches.is_empty() {
            return "No matching lines.".to_string();
        }
        let mut out = Vec::new();
        for (idx, m) in matches.iter().enumerate() {
            if idx > 0 && m.context.is_some() {
                out.push("--".to_string());
            }
            for (line_number, line) in m.numbered_context() {
                let marker = if line_number == m.line_number { '>' } else { ' ' };
                out.push(format!("{}{:>7}: {}", marker, line_number, line));
            }
        }
        out.join("\n")
    }

    pub fn render_alert_summaries(&self, summaries: &[PerformanceAlertSummary]) -> String {
        if summaries.is_empty() {
            return "No alert summaries found.".to_string();
        }
        let mut table = self.new_table(
            &["ID", "Repository", "Framework", "Created", "Regressions", "Improvements", "Bug"],
            Color::Magenta,
        );
        for summary in summaries {
            let bug = summary
                .bug_number
                .map(|b| b.to_string())
                .unwrap_or_else(|| "-".to_string());
            table.add_row(vec![
                self.colored_cell(&summary.id.to_string(), Color::Cyan),
                Cell::new(&summary.repository),
                Cell::new(summary.framework.to_string()),
                Cell::new(summary.created.format("%Y-%m-%d %H:%M").to_string()),
                self.colored_cell(&summary.regression_count().to_string(), Color::Red),
                self.colored_cell(&summary.improvement_count().to_string(), Color::Green),
                Cell::new(bug),
            ]);
        }
        table.to_string()
    }

    pub fn render_frameworks(&self, frameworks: &[PerformanceFramework]) -> String {
        let mut table = self.new_table(&["ID", "Name"], Color::Magenta);
        for framework in frameworks {
            table.add_row(vec![
                self.colored_cell(&framework.id.to_string(), Color::Cyan),
                Cell::new(&framework.name),
            ]);
        }
        table.to_string()
    }

    pub fn render_failure_classifications(&self, items: &[FailureClassification]) -> String {
        let mut table = self.new_table(&["ID", "Name"], Color::Cyan);
        for item in items {
            table.add_row(vec![
                self.colored_cell(&item.id.to_string(), Color::Cyan),
                Cell::new(&item.name),
            ]);
        }
        table.to_string()
    }

    pub fn render_option_collections(&self, collections: &[OptionCollection]) -> String {
        let mut table = self.new_table(&["Hash", "Options"], Color::Cyan);
        for collection in collections {
            let options: Vec<&str> = collection.options.iter().map(|o| o.name.as_str()).collect();
            table.add_row(vec![
                self.colored_cell(&collection.option_collection_hash, Color::DarkGrey),
                Cell::new(options.join(", ")),
            ]);
        }
        table.to_string()
    }

    pub fn render_failures_by_bug(&self, failures: &[FailureByBug]) -> String {
        if failures.is_empty() {
            return "No failures found.".to_string();
        }
        let widths = self.column_widths();
        let mut table = self.new_table(
            &["Job", "Pushed", "Tree", "Platform", "Build", "Suite"],
            Color::Yellow,
        );
        for failure in failures {
            table.add_row(vec![
                self.colored_cell(&failure.job_id.to_string(), Color::Cyan),
                Cell::new(&failure.push_time),
                Cell::new(&failure.tree),
                Cell::new(truncate_text(&failure.platform, widths.name)),
                Cell::new(&failure.build_type),
                Cell::new(truncate_text(&failure.test_suite, widths.name)),
            ]);
        }
        table.to_string()
    }

    pub fn render_text_log_errors(&self, errors: &[TextLogError]) -> String {
        if errors.is_empty() {
            return "No errors recorded.".to_string();
        }
        let widths = self.column_widths();
        let mut table = self.new_table(&["Line", "New", "Error"], Color::Red);
        for error in errors {
            let new_failure = if error.new_failure { "yes" } else { "" };
            table.add_row(vec![
                self.colored_cell(&error.line_number.to_string(), Color::Cyan),
                self.colored_cell(new_failure, Color::Red),
                Cell::new(truncate_text(&error.line, widths.text)),
            ]);
        }
        table.to_string()
    }

    pub fn render_bug_suggestions(&self, suggestions: &[BugSuggestion]) -> String {
        if suggestions.is_empty() {
            return "No bug suggestions.".to_string();
        }
        let widths = self.column_widths();
        let mut table = self.new_table(&["Line", "Search", "Bugs"], Color::Yellow);
        for suggestion in suggestions {
            let bugs: Vec<String> = suggestion
                .bugs
                .open_recent
                .iter()
                .chain(suggestion.bugs.all_others.iter())
                .map(|bug| format!("{} {}", bug.id, truncate_text(&bug.summary, widths.name)))
                .collect();
            let bugs = if bugs.is_empty() {
                "-".to_string()
            } else {
                bugs.join("\n")
            };
            table.add_row(vec![
                self.colored_cell(&suggestion.line_number.to_string(), Color::Cyan),
                Cell::new(truncate_text(&suggestion.search, widths.text)),
                Cell::new(bugs),
            ]);
        }
        table.to_string()
    }
}

use std::fmt::Write as _;

use crate::{Details, MessagePanel, Page, ResultTable, StateLabel};

/// How the opaque failure detail is inserted into HTML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetailPolicy {
    /// Escape the detail like every other server-supplied string.
    #[default]
    Escape,
    /// Insert the detail as pre-rendered markup.
    Trusted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub detail_policy: DetailPolicy,
    pub back_href: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            detail_policy: DetailPolicy::Escape,
            back_href: "/".to_string(),
        }
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Renders the page as an HTML fragment.
pub fn render_html(page: &Page, options: &RenderOptions) -> String {
    let mut html = String::new();
    let label_class = match page.state_label {
        StateLabel::Pending | StateLabel::Progress => "label-default",
        StateLabel::Success => "label-success",
        StateLabel::SuccessWithWarnings => "label-warning",
        StateLabel::Failure => "label-danger",
    };
    let _ = writeln!(
        html,
        "<div id=\"current-state\"><span class=\"label {label_class}\">{}</span></div>",
        page.state_label.as_str()
    );

    let bar_class = if page.progress_active {
        "progress-bar active"
    } else {
        "progress-bar"
    };
    let _ = writeln!(
        html,
        "<div class=\"progress\"><div id=\"progress-bar\" class=\"{bar_class}\" style=\"width: {}%\"></div></div>",
        page.progress_percent
    );
    if let Some(message) = &page.progress_message {
        let _ = writeln!(
            html,
            "<p id=\"progress-message\">{}</p>",
            escape_html(message)
        );
    }

    if let Some(panel) = &page.panel {
        html.push_str(&render_panel(panel, options));
    }

    if !page.warnings.is_empty() {
        html.push_str("<div id=\"warnings\" class=\"alert alert-warning\">\n<ul>\n");
        for warning in &page.warnings {
            let _ = writeln!(html, "<li>{}</li>", escape_html(warning));
        }
        html.push_str("</ul>\n</div>\n");
    }

    html.push_str("<div id=\"details\">\n");
    match &page.details {
        Details::Empty => {}
        Details::Table(table) => html.push_str(&render_table(table)),
        Details::RawDetail(detail) => {
            let detail = match options.detail_policy {
                DetailPolicy::Escape => escape_html(detail),
                DetailPolicy::Trusted => detail.clone(),
            };
            let _ = writeln!(html, "<pre class=\"failure-detail\">{detail}</pre>");
        }
    }
    html.push_str("</div>\n");

    if page.continue_enabled {
        html.push_str("<button id=\"continue\" class=\"btn btn-primary\">Continue</button>\n");
    }
    html
}

fn render_panel(panel: &MessagePanel, options: &RenderOptions) -> String {
    let back = format!(
        "<p><a href=\"{}\" class=\"alert-link\">Go back to the upload form</a></p>",
        escape_html(&options.back_href)
    );
    match panel {
        MessagePanel::Success => {
            format!("<div id=\"message\" class=\"alert alert-success\">\n{back}\n</div>\n")
        }
        MessagePanel::DomainError { message } => format!(
            "<div id=\"message\" class=\"alert alert-danger sql-error\">\n\
             <p>There was an error uploading to the database:</p>\n\
             <p class=\"error-message\">{}</p>\n{back}\n</div>\n",
            escape_html(message)
        ),
        MessagePanel::ClientError { message } => format!(
            "<div id=\"message\" class=\"alert alert-danger\">\n<p class=\"error-message\">{}</p>\n{back}\n</div>\n",
            escape_html(message)
        ),
    }
}

fn render_table(table: &ResultTable) -> String {
    let mut html = String::from("<table class=\"table table-striped\">\n<thead>\n<tr>");
    for header in &table.headers {
        match &header.type_annotation {
            Some(kind) => {
                let _ = write!(
                    html,
                    "<th>{} <small>{}</small></th>",
                    escape_html(&header.name),
                    escape_html(kind)
                );
            }
            None => {
                let _ = write!(html, "<th>{}</th>", escape_html(&header.name));
            }
        }
    }
    html.push_str("</tr>\n</thead>\n<tbody>\n");
    for row in &table.rows {
        html.push_str("<tr>");
        for cell in row {
            let _ = write!(html, "<td>{}</td>", escape_html(cell));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody>\n</table>\n");
    let _ = writeln!(
        html,
        "<p class=\"sample-note\">{}</p>",
        escape_html(&table.partial_sample_note())
    );
    html
}

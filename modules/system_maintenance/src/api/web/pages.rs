//! HTML page rendering
//!
//! Pages are assembled from escaped fragments; the only unescaped content is
//! the rendered markup shadow columns, which the markup renderer produced.

use super::paths::Paths;
use crate::contract::{
    DocumentationDetail, DocumentationSummary, EntityCounts, MaintenanceRecordDetail, Page,
    Principal, RawField, RawRecordKind, RecordSummary,
};
use crate::domain::markup::escape_html as e;
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use std::fmt::Write;

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";

fn datetime(value: &DateTime<Utc>) -> String {
    value.format(DATETIME_FORMAT).to_string()
}

fn link(href: &str, text: &str) -> String {
    format!("<a href=\"{}\">{}</a>", e(href), e(text))
}

/// Page shell with the navigation bar
fn layout(paths: &Paths, user: Option<&Principal>, title: &str, body: &str) -> String {
    let mut nav = String::new();
    if let Some(principal) = user {
        let _ = writeln!(
            nav,
            "<nav>{} | {} | {} <span class=\"user\">{}</span> {}</nav>",
            link(&paths.home(), "Home"),
            link(&paths.records(), "Maintenance Records"),
            link(&paths.documentation_list(), "Documentation"),
            e(&principal.account.display_name()),
            link(&paths.logout(), "Log out"),
        );
    }
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title} | System Maintenance</title>\n</head>\n<body>\n{nav}\
         <main>\n<h1>{title}</h1>\n{body}</main>\n</body>\n</html>\n",
        title = e(title),
        nav = nav,
        body = body,
    )
}

fn pagination<T>(page: &Page<T>) -> String {
    let mut out = String::from("<div class=\"pagination\">");
    if page.has_previous() {
        let _ = write!(out, "<a href=\"?page={}\">previous</a> ", page.page - 1);
    }
    let _ = write!(
        out,
        "<span class=\"current\">Page {} of {}</span>",
        page.page,
        page.num_pages()
    );
    if page.has_next() {
        let _ = write!(out, " <a href=\"?page={}\">next</a>", page.page + 1);
    }
    out.push_str("</div>\n");
    out
}

// ===== Home =====

/// Admin console collections linked from the home view
const ADMIN_COLLECTIONS: [(&str, &str); 7] = [
    ("systems", "Systems"),
    ("hardware", "Hardware"),
    ("software", "Software"),
    ("maintenance-types", "Maintenance Types"),
    ("sys-admins", "Sys Admins"),
    ("maintenance-records", "Maintenance Records"),
    ("documentation-records", "Documentation Records"),
];

pub fn home_page(
    paths: &Paths,
    principal: &Principal,
    counts: &EntityCounts,
    show_admin_links: bool,
) -> String {
    let rows = [
        ("Systems", counts.systems),
        ("Hardware", counts.hardware),
        ("Software", counts.software),
        ("Maintenance Types", counts.maintenance_types),
        ("Sys Admins", counts.sys_admins),
        ("Maintenance Records", counts.maintenance_records),
        ("Documentation Records", counts.documentation_records),
    ];

    let mut body = String::from("<table class=\"counts\">\n");
    for (label, count) in rows {
        let _ = writeln!(body, "<tr><th>{}</th><td>{}</td></tr>", label, count);
    }
    body.push_str("</table>\n");

    let _ = writeln!(
        body,
        "<p>{} | {}</p>",
        link(&paths.records(), "Browse maintenance records"),
        link(&paths.documentation_list(), "Browse documentation")
    );

    if show_admin_links {
        body.push_str("<h2>Administration</h2>\n<ul class=\"admin-links\">\n");
        for (collection, label) in ADMIN_COLLECTIONS {
            let _ = writeln!(body, "<li>{}</li>", link(&paths.admin(collection), label));
        }
        body.push_str("</ul>\n");
    }

    layout(paths, Some(principal), "System Maintenance", &body)
}

// ===== Login =====

/// State of the login form
#[derive(Debug, Default)]
pub struct LoginForm<'a> {
    pub username: &'a str,
    pub next: Option<&'a str>,
    pub username_error: Option<&'a str>,
    pub password_error: Option<&'a str>,
    pub form_error: Option<&'a str>,
    /// Signed in, but without access to the requested page
    pub unauthorized_notice: bool,
}

fn field_error(error: Option<&str>) -> String {
    error
        .map(|message| format!("<ul class=\"errorlist\"><li>{}</li></ul>\n", e(message)))
        .unwrap_or_default()
}

pub fn login_page(paths: &Paths, form: &LoginForm<'_>) -> String {
    let mut body = String::new();
    if form.unauthorized_notice {
        body.push_str(
            "<p class=\"errornote\">You are authenticated, but are not authorized to access \
             this page. Would you like to login to a different account?</p>\n",
        );
    }
    if let Some(message) = form.form_error {
        let _ = writeln!(body, "<p class=\"errornote\">{}</p>", e(message));
    }
    let _ = writeln!(
        body,
        "<form method=\"post\" action=\"{action}\">\n\
         {username_error}<label for=\"id_username\">Username:</label>\n\
         <input type=\"text\" name=\"username\" id=\"id_username\" value=\"{username}\" autofocus>\n\
         {password_error}<label for=\"id_password\">Password:</label>\n\
         <input type=\"password\" name=\"password\" id=\"id_password\">\n\
         <input type=\"hidden\" name=\"next\" value=\"{next}\">\n\
         <input type=\"submit\" value=\"Log in\">\n</form>",
        action = e(&paths.login()),
        username_error = field_error(form.username_error),
        username = e(form.username),
        password_error = field_error(form.password_error),
        next = e(form.next.unwrap_or("")),
    );
    layout(paths, None, "Log in", &body)
}

// ===== Documentation =====

pub fn documentation_list_page(
    paths: &Paths,
    principal: &Principal,
    page: &Page<DocumentationSummary>,
) -> String {
    let mut body = String::new();
    if page.items.is_empty() {
        body.push_str("<p>No documentation records.</p>\n");
    } else {
        body.push_str(
            "<table>\n<tr><th>Title</th><th>Maintenance type</th><th>Updated</th></tr>\n",
        );
        for doc in &page.items {
            let _ = writeln!(
                body,
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                link(&paths.documentation(doc.id), &doc.title),
                e(&doc.maintenance_type),
                datetime(&doc.updated_at)
            );
        }
        body.push_str("</table>\n");
    }
    body.push_str(&pagination(page));
    layout(paths, Some(principal), "Documentation", &body)
}

pub fn documentation_detail_page(
    paths: &Paths,
    principal: &Principal,
    detail: &DocumentationDetail,
) -> String {
    let record = &detail.record;
    let mut body = String::new();
    let _ = writeln!(
        body,
        "<dl>\n<dt>Maintenance type</dt><dd>{}</dd>\n\
         <dt>Created</dt><dd>{}</dd>\n<dt>Updated</dt><dd>{}</dd>\n</dl>",
        e(&detail.maintenance_type.maintenance_type),
        datetime(&record.created_at),
        datetime(&record.updated_at),
    );
    let _ = writeln!(
        body,
        "<section class=\"markup\">\n{}\n</section>\n<p>{}</p>",
        record.documentation.rendered,
        link(
            &paths.raw(RawRecordKind::Documentation, "documentation", record.id),
            "View source"
        ),
    );

    body.push_str("<h2>Maintenance records</h2>\n");
    body.push_str(&record_links(paths, &detail.maintenance_records));
    layout(paths, Some(principal), &record.title, &body)
}

// ===== Maintenance Records =====

fn record_links(paths: &Paths, records: &[RecordSummary]) -> String {
    if records.is_empty() {
        return "<p>None.</p>\n".to_string();
    }
    let mut out = String::from("<ul>\n");
    for summary in records {
        let _ = writeln!(out, "<li>{}</li>", link(&paths.record(summary.id), &summary.label()));
    }
    out.push_str("</ul>\n");
    out
}

pub fn record_list_page(
    paths: &Paths,
    principal: &Principal,
    page: &Page<RecordSummary>,
) -> String {
    let mut body = String::new();
    if page.items.is_empty() {
        body.push_str("<p>No maintenance records.</p>\n");
    } else {
        body.push_str(
            "<table>\n<tr><th>Record</th><th>System</th><th>Maintenance type</th>\
             <th>Sys admin</th><th>Status</th><th>Date</th></tr>\n",
        );
        for summary in &page.items {
            let _ = writeln!(
                body,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                link(&paths.record(summary.id), &format!("#{}", summary.id)),
                e(&summary.system),
                e(&summary.maintenance_type),
                e(&summary.sys_admin),
                e(summary.status.label()),
                datetime(&summary.datetime)
            );
        }
        body.push_str("</table>\n");
    }
    body.push_str(&pagination(page));
    layout(paths, Some(principal), "Maintenance Records", &body)
}

pub fn record_detail_page(
    paths: &Paths,
    principal: &Principal,
    detail: &MaintenanceRecordDetail,
) -> String {
    let record = &detail.record;
    let mut body = String::new();

    let names = |items: Vec<&str>| -> String {
        if items.is_empty() {
            "None".to_string()
        } else {
            items.into_iter().map(e).collect::<Vec<_>>().join(", ")
        }
    };

    let _ = writeln!(
        body,
        "<dl>\n<dt>System</dt><dd>{}</dd>\n<dt>Maintenance type</dt><dd>{}</dd>\n\
         <dt>Status</dt><dd>{}</dd>\n<dt>Sys admin</dt><dd>{}</dd>\n\
         <dt>Date</dt><dd>{}</dd>\n<dt>Hardware</dt><dd>{}</dd>\n\
         <dt>Software</dt><dd>{}</dd>\n</dl>",
        e(&detail.system.name),
        e(&detail.maintenance_type.maintenance_type),
        e(record.status.label()),
        e(&detail.sys_admin.display_name()),
        datetime(&record.datetime),
        names(detail.hardware.iter().map(|h| h.name.as_str()).collect()),
        names(detail.software.iter().map(|s| s.name.as_str()).collect()),
    );

    for (field, heading, text) in [
        ("description", "Description", &record.description),
        ("procedure", "Procedure", &record.procedure),
        ("problems", "Problems", &record.problems),
    ] {
        let _ = writeln!(
            body,
            "<h2>{}</h2>\n<section class=\"markup\">\n{}\n</section>\n<p>{}</p>",
            heading,
            text.rendered,
            link(&paths.raw(RawRecordKind::Maintenance, field, record.id), "View source"),
        );
    }

    body.push_str("<h2>Documentation</h2>\n");
    if detail.documentation_records.is_empty() {
        body.push_str("<p>None.</p>\n");
    } else {
        body.push_str("<ul>\n");
        for doc in &detail.documentation_records {
            let _ = writeln!(body, "<li>{}</li>", link(&paths.documentation(doc.id), &doc.title));
        }
        body.push_str("</ul>\n");
    }

    body.push_str("<h2>References</h2>\n");
    body.push_str(&record_links(paths, &detail.references));
    body.push_str("<h2>Referenced by</h2>\n");
    body.push_str(&record_links(paths, &detail.referenced_by));

    layout(paths, Some(principal), &detail.summary.label(), &body)
}

// ===== Raw markup =====

pub fn raw_page(paths: &Paths, principal: &Principal, raw: &RawField) -> String {
    let back = match raw.kind {
        RawRecordKind::Documentation => paths.documentation(raw.record_id),
        RawRecordKind::Maintenance => paths.record(raw.record_id),
    };
    let markup_type = if raw.markup_type.is_empty() {
        "none"
    } else {
        raw.markup_type.as_str()
    };
    let body = format!(
        "<p>Markup type: {}</p>\n<pre class=\"raw\">{}</pre>\n<p>{}</p>\n",
        e(markup_type),
        e(&raw.raw),
        link(&back, &raw.record_label),
    );
    layout(
        paths,
        Some(principal),
        &format!("{}: {}", raw.record_label, raw.field_name),
        &body,
    )
}

// ===== Errors =====

pub fn not_found_page() -> String {
    error_shell("Not Found", "The requested page was not found.")
}

pub fn server_error_page() -> String {
    error_shell("Server Error", "An unexpected error occurred.")
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    error_shell(status.canonical_reason().unwrap_or("Error"), message)
}

fn error_shell(title: &str, message: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n</head>\n<body>\n<h1>{title}</h1>\n<p>{message}</p>\n\
         </body>\n</html>\n",
        title = e(title),
        message = e(message),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{Account, MaintenanceStatus};

    fn principal() -> Principal {
        Principal {
            account: Account {
                id: 1,
                username: "alice".to_string(),
                password_hash: String::new(),
                first_name: String::new(),
                last_name: String::new(),
                email: String::new(),
                is_active: true,
                is_superuser: false,
                date_joined: Utc::now(),
            },
            sys_admin: None,
        }
    }

    #[test]
    fn test_home_admin_links_only_when_requested() {
        let paths = Paths::new("", "/admin");
        let counts = EntityCounts::default();
        let plain = home_page(&paths, &principal(), &counts, false);
        assert!(!plain.contains("/admin/systems"));

        let admin = home_page(&paths, &principal(), &counts, true);
        assert!(admin.contains("href=\"/admin/systems\""));
    }

    #[test]
    fn test_login_page_escapes_values() {
        let paths = Paths::new("", "/admin");
        let html = login_page(
            &paths,
            &LoginForm {
                username: "<bob>",
                next: Some("/records/?a=1&b=2"),
                ..Default::default()
            },
        );
        assert!(html.contains("value=\"&lt;bob&gt;\""));
        assert!(html.contains("value=\"/records/?a=1&amp;b=2\""));
    }

    #[test]
    fn test_pagination_links() {
        let page = Page {
            items: vec![RecordSummary {
                id: 1,
                system: "web01".to_string(),
                maintenance_type: "Patch".to_string(),
                sys_admin: "alice".to_string(),
                status: MaintenanceStatus::Complete,
                datetime: Utc::now(),
            }],
            total: 25,
            page: 2,
            per_page: 10,
        };
        let html = pagination(&page);
        assert!(html.contains("?page=1"));
        assert!(html.contains("?page=3"));
        assert!(html.contains("Page 2 of 3"));
    }
}

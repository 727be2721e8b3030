//! Self-contained HTML evidence report.

use purviewx_types::EvidenceBinder;

/// Audit searches scheduled whenever unified auditing is on.
pub const SCHEDULED_AUDIT_SEARCHES: [AuditSearch; 3] = [
    AuditSearch {
        id: "search-dlp-matches",
        name: "DLP Policy Matches",
        schedule: "Daily",
    },
    AuditSearch {
        id: "search-label-changes",
        name: "Sensitivity Label Changes",
        schedule: "Daily",
    },
    AuditSearch {
        id: "search-admin-actions",
        name: "High-Privilege Admin Actions",
        schedule: "Weekly",
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditSearch {
    pub id: &'static str,
    pub name: &'static str,
    pub schedule: &'static str,
}

const MUTED: &str = "<p class=\"text-sm text-gray-500\">";
const LIST_OPEN: &str = "<ul class=\"list-disc list-inside bg-gray-50 p-4 rounded-md\">\n";

/// Render the binder as a standalone HTML document.
///
/// Pure: the same binder always renders to the same bytes. All wizard text
/// is escaped.
pub fn render_binder_html(binder: &EvidenceBinder) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    out.push_str("<meta charset=\"UTF-8\">\n");
    out.push_str(
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
    );
    out.push_str(&format!(
        "<title>PurviewX Evidence Binder v{}</title>\n",
        binder.version
    ));
    out.push_str("<script src=\"https://cdn.tailwindcss.com\"></script>\n");
    out.push_str("</head>\n<body class=\"bg-gray-100 font-sans p-8\">\n");
    out.push_str("<div class=\"container mx-auto bg-white p-8 rounded-lg shadow-md\">\n");
    out.push_str("<header class=\"text-center mb-10\">\n");
    out.push_str("<h1 class=\"text-3xl font-bold text-gray-800\">PurviewX Evidence Binder</h1>\n");
    out.push_str(
        "<p class=\"text-gray-500\">A snapshot of the deployed compliance configuration.</p>\n",
    );
    out.push_str("</header>\n");

    section(&mut out, "Binder Summary", |out| summary(out, binder));
    section(&mut out, "Core Configuration", |out| core(out, binder));
    section(&mut out, "Data Classification", |out| classification(out, binder));
    section(&mut out, "Data Governance &amp; Protection", |out| {
        governance(out, binder)
    });
    section(&mut out, "Audit &amp; eDiscovery", |out| audit(out, binder));

    out.push_str("<footer class=\"text-center mt-10 pt-4 border-t\">\n");
    out.push_str(
        "<p class=\"text-xs text-gray-500\">Generated by PurviewX Configuration Accelerator</p>\n",
    );
    out.push_str("</footer>\n</div>\n</body>\n</html>\n");
    out
}

fn section(out: &mut String, title: &str, body: impl FnOnce(&mut String)) {
    out.push_str("<div class=\"mb-8\">\n");
    out.push_str(&format!(
        "<h2 class=\"text-xl font-semibold border-b pb-2 mb-4\">{}</h2>\n",
        title
    ));
    body(out);
    out.push_str("</div>\n");
}

/// `value` is inserted as-is; escape it first when it carries wizard text.
fn key_values(out: &mut String, rows: &[(&str, String)]) {
    out.push_str("<dl class=\"grid grid-cols-1 md:grid-cols-2 gap-x-8 gap-y-4\">\n");
    for (key, value) in rows {
        out.push_str("<div class=\"border-b pb-2\">");
        out.push_str(&format!(
            "<dt class=\"text-sm font-medium text-gray-500\">{}</dt>",
            key
        ));
        out.push_str(&format!(
            "<dd class=\"mt-1 text-sm text-gray-900 font-semibold\">{}</dd>",
            value
        ));
        out.push_str("</div>\n");
    }
    out.push_str("</dl>\n");
}

fn heading(out: &mut String, text: &str) {
    out.push_str(&format!(
        "<h3 class=\"text-lg font-medium mt-6 mb-2\">{}</h3>\n",
        text
    ));
}

fn list(out: &mut String, items: impl IntoIterator<Item = String>) {
    out.push_str(LIST_OPEN);
    for item in items {
        out.push_str(&format!("<li class=\"text-sm\">{}</li>\n", item));
    }
    out.push_str("</ul>\n");
}

fn muted(out: &mut String, text: &str) {
    out.push_str(MUTED);
    out.push_str(text);
    out.push_str("</p>\n");
}

fn summary(out: &mut String, binder: &EvidenceBinder) {
    key_values(
        out,
        &[
            ("Version", format!("v{}", binder.version)),
            ("Generated At", escape(&binder.timestamp)),
            (
                "Configuration Checksum",
                format!(
                    "<code class=\"text-sm bg-gray-200 p-1 rounded\">{}</code>",
                    escape(&binder.checksum)
                ),
            ),
        ],
    );
}

fn core(out: &mut String, binder: &EvidenceBinder) {
    let data = &binder.data;
    key_values(
        out,
        &[(
            "Cloud Environment",
            escape(data.cloud_environment.as_str()),
        )],
    );

    heading(out, "Admin Consent Scopes");
    let scopes: Vec<String> = data
        .granted_scopes()
        .map(|scope| format!("<code>{}</code>", escape(scope)))
        .collect();
    if scopes.is_empty() {
        out.push_str(LIST_OPEN);
        out.push_str("<li class=\"text-sm text-gray-500\">No scopes consented.</li>\n");
        out.push_str("</ul>\n");
    } else {
        list(out, scopes);
    }
}

fn classification(out: &mut String, binder: &EvidenceBinder) {
    let data = &binder.data;

    heading(
        out,
        &format!(
            "Custom Sensitive Information Types ({})",
            data.custom_sits.len()
        ),
    );
    if data.custom_sits.is_empty() {
        muted(out, "No custom SITs were imported.");
    } else {
        list(
            out,
            data.custom_sits.iter().map(|sit| {
                format!("<b>{}</b>: {}", escape(&sit.name), escape(&sit.description))
            }),
        );
    }

    heading(
        out,
        &format!("Sensitivity Labels ({})", data.sensitivity_labels.len()),
    );
    list(
        out,
        data.labels_by_priority().into_iter().map(|label| {
            format!(
                "<b>{}</b> (Priority: {})",
                escape(&label.name),
                label.priority
            )
        }),
    );
}

fn governance(out: &mut String, binder: &EvidenceBinder) {
    let data = &binder.data;

    let retention: Vec<String> = data
        .enabled_retention_policies()
        .map(|policy| {
            let duration = if policy.is_indefinite() {
                "Indefinite".to_string()
            } else {
                format!("{} days", policy.duration_days)
            };
            format!("<b>{}</b> ({})", escape(&policy.name), duration)
        })
        .collect();
    heading(
        out,
        &format!("Retention Policies ({} enabled)", retention.len()),
    );
    if retention.is_empty() {
        muted(out, "No retention policies were enabled.");
    } else {
        list(out, retention);
    }

    let dlp: Vec<String> = data
        .enabled_dlp_policies()
        .map(|policy| {
            format!(
                "<b>{}</b> (Locations: {})",
                escape(&policy.name),
                escape(&policy.locations.join(", "))
            )
        })
        .collect();
    heading(
        out,
        &format!("Data Loss Prevention Policies ({} enabled)", dlp.len()),
    );
    if dlp.is_empty() {
        muted(out, "No DLP policies were enabled.");
    } else {
        list(out, dlp);
    }
}

fn audit(out: &mut String, binder: &EvidenceBinder) {
    let data = &binder.data;

    let auditing = if data.audit_settings.is_enabled {
        format!(
            "Enabled ({} day retention)",
            data.audit_settings.retention_days
        )
    } else {
        "Disabled".to_string()
    };
    let case = if data.e_discovery_case.create {
        format!("Created (Name: {})", escape(&data.e_discovery_case.name))
    } else {
        "Not Created".to_string()
    };
    key_values(
        out,
        &[
            ("Unified Auditing", auditing),
            ("Initial eDiscovery Case", case),
        ],
    );

    heading(out, "Scheduled Audit Searches");
    if data.audit_settings.is_enabled {
        list(
            out,
            SCHEDULED_AUDIT_SEARCHES.iter().map(|search| {
                format!(
                    "<b>{}</b> (ID: <code>{}</code>, Schedule: {})",
                    search.name, search.id, search.schedule
                )
            }),
        );
    } else {
        muted(out, "Auditing was not enabled, no searches scheduled.");
    }
}

pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

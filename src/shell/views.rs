// HTML views for the launcher shell
//
// Plain string templates. Everything that came from outside (app metadata,
// notices, URLs) goes through `escape_html`; app fragments are inserted as-is.

use crate::api::StoreEntry;
use crate::apps::{AppDescriptor, Fragment};
use crate::markdown::escape_html;
use crate::notice::Notice;
use crate::version;
use std::sync::Arc;

const STYLE: &str = "body{font-family:sans-serif;margin:0;background:#f6f7f2}\
header{display:flex;gap:1rem;align-items:center;padding:1rem;background:#5a7d3a;color:#fff}\
header a{color:#fff}main{padding:1rem;max-width:48rem;margin:auto}\
.grid{display:grid;grid-template-columns:repeat(auto-fill,minmax(9rem,1fr));gap:1rem}\
.tile{padding:1rem;border-radius:1rem;text-align:center}.icon{font-size:2.5rem}\
.notices{position:fixed;top:1rem;right:1rem}.notice{padding:.5rem 1rem;margin:.25rem;border-radius:.5rem;color:#fff}\
.notice-info{background:#3b82f6}.notice-success{background:#8b5cf6}\
.notice-warning{background:#f59e0b}.notice-error{background:#ef4444}\
.result-error{background:#fee2e2;padding:1rem;border-left:4px solid #ef4444}";

/// Full page around `body`
pub fn page(title: &str, notices: &[Notice], body: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\">\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
         <title>{title} · Matcha</title><style>{style}</style></head>\
         <body><header><strong>🍵 Matcha</strong><a href=\"/\">My apps</a>\
         <a href=\"/store\">App store</a><small>{version}</small></header>\
         {notices}<main>{body}</main></body></html>",
        title = escape_html(title),
        style = STYLE,
        version = escape_html(&version::version_string()),
        notices = notice_list(notices),
        body = body,
    )
}

fn notice_list(notices: &[Notice]) -> String {
    if notices.is_empty() {
        return String::new();
    }

    let items: String = notices
        .iter()
        .map(|n| {
            format!(
                "<div class=\"notice {}\">{}</div>",
                n.level.css_class(),
                escape_html(&n.message)
            )
        })
        .collect();
    format!("<div class=\"notices\">{}</div>", items)
}

fn tile(app: &AppDescriptor, controls: &str) -> String {
    format!(
        "<div class=\"tile {color}\" data-app=\"{id}\"><div class=\"icon\">{icon}</div>\
         <div class=\"name\">{name}</div>{controls}</div>",
        color = escape_html(&app.color),
        id = escape_html(&app.id),
        icon = escape_html(&app.icon),
        name = escape_html(&app.name),
        controls = controls,
    )
}

fn post_button(path: &str, label: &str) -> String {
    format!(
        "<form method=\"post\" action=\"{}\"><button type=\"submit\">{}</button></form>",
        escape_html(path),
        escape_html(label)
    )
}

/// Home screen: installed apps only
pub fn my_apps(installed: &[Arc<AppDescriptor>]) -> String {
    if installed.is_empty() {
        return "<h1>My apps</h1><p class=\"empty\">No apps installed yet. \
                Visit the <a href=\"/store\">app store</a> to add some!</p>"
            .to_string();
    }

    let tiles: String = installed
        .iter()
        .map(|app| {
            let controls = format!(
                "<a class=\"open\" href=\"/apps/{id}\">Open</a>{uninstall}",
                id = escape_html(&app.id),
                uninstall = post_button(&format!("/apps/{}/uninstall", app.id), "Uninstall"),
            );
            tile(app, &controls)
        })
        .collect();

    format!(
        "<h1>My apps</h1><div class=\"grid\">{}</div>{}",
        tiles,
        post_button("/apps/clear", "Uninstall everything")
    )
}

/// Store screen: every registered app with install controls
pub fn store(listing: &[StoreEntry]) -> String {
    let tiles: String = listing
        .iter()
        .map(|entry| {
            let app = &entry.app;
            let controls = if entry.installed {
                format!(
                    "<p class=\"description\">{}</p><span class=\"installed\">Installed</span>{}",
                    escape_html(&app.description),
                    post_button(&format!("/apps/{}/uninstall", app.id), "Uninstall")
                )
            } else {
                format!(
                    "<p class=\"description\">{}</p>{}",
                    escape_html(&app.description),
                    post_button(&format!("/apps/{}/install", app.id), "Install")
                )
            };
            tile(app, &controls)
        })
        .collect();

    format!("<h1>App store</h1><div class=\"grid\">{}</div>", tiles)
}

/// A launched app: back link plus the mounted fragment
pub fn app_frame(app: &AppDescriptor, fragment: &Fragment, open_url: Option<&str>) -> String {
    let open = open_url
        .map(|url| {
            format!(
                "<p class=\"open-url\"><a href=\"{url}\" target=\"_blank\" rel=\"noopener\">Open in a new tab ↗</a></p>",
                url = escape_html(url)
            )
        })
        .unwrap_or_default();

    format!(
        "<nav><a href=\"/\">← My apps</a></nav><div id=\"app-container\" data-app=\"{id}\">{fragment}</div>{open}",
        id = escape_html(&app.id),
        fragment = fragment,
        open = open,
    )
}

/// Body for error pages
pub fn error_body(message: &str) -> String {
    format!(
        "<h1>Something went wrong</h1><p>{}</p><p><a href=\"/\">Back to my apps</a></p>",
        escape_html(message)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::Notice;

    fn app(id: &str) -> Arc<AppDescriptor> {
        Arc::new(
            AppDescriptor::new(id, "<Notes>", || Fragment::new("<p>view</p>"))
                .with_icon("📝")
                .with_description("Take notes"),
        )
    }

    #[test]
    fn test_page_escapes_notices() {
        let html = page("Home", &[Notice::error("<script>")], "<p>body</p>");
        assert!(html.contains("notice notice-error"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("<main><p>body</p></main>"));
    }

    #[test]
    fn test_my_apps_empty_and_filled() {
        assert!(my_apps(&[]).contains("No apps installed yet"));

        let html = my_apps(&[app("notepad")]);
        assert!(html.contains("href=\"/apps/notepad\""));
        assert!(html.contains("action=\"/apps/notepad/uninstall\""));
        assert!(html.contains("&lt;Notes&gt;"));
    }

    #[test]
    fn test_store_shows_install_state() {
        let listing = vec![
            StoreEntry {
                app: app("a"),
                installed: true,
            },
            StoreEntry {
                app: app("b"),
                installed: false,
            },
        ];
        let html = store(&listing);

        assert!(html.contains("action=\"/apps/a/uninstall\""));
        assert!(html.contains("action=\"/apps/b/install\""));
    }

    #[test]
    fn test_app_frame_mounts_fragment() {
        let app = app("notepad");
        let html = app_frame(&app, &app.render(), Some("https://example.com/?q=a&b"));

        assert!(html.contains("<div id=\"app-container\" data-app=\"notepad\"><p>view</p></div>"));
        assert!(html.contains("href=\"https://example.com/?q=a&amp;b\""));
    }
}

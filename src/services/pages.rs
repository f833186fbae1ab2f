use serde_json::json;

use crate::api::routes::RouteName;
use crate::core::config::Settings;

/// Full landing page: page chrome plus the embedded viewer.
pub(crate) fn render_index(settings: &Settings, iid: Option<i64>) -> String {
    let heading = format!(
        "<header class=\"ol3-viewer-header\"><h1>{}</h1></header>",
        escape_html(&settings.viewer().title)
    );
    let body = format!("{heading}\n{}", viewer_container(settings, iid, false));
    page(settings, &body)
}

/// Embeddable plugin page: just the viewer container, no chrome.
pub(crate) fn render_plugin(settings: &Settings, iid: Option<i64>, debug: bool) -> String {
    page(settings, &viewer_container(settings, iid, debug))
}

fn page(settings: &Settings, body: &str) -> String {
    let viewer = settings.viewer();
    format!(
        "<!doctype html>\n\
         <html lang=\"en\">\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <title>{title}</title>\n\
         <link rel=\"stylesheet\" href=\"{prefix}/css/ol3-viewer.css\">\n\
         </head>\n\
         <body>\n\
         {body}\n\
         </body>\n\
         </html>\n",
        title = escape_html(&viewer.title),
        prefix = viewer.static_prefix,
    )
}

fn viewer_container(settings: &Settings, iid: Option<i64>, debug: bool) -> String {
    let viewer = settings.viewer();
    let script = if debug { &viewer.debug_script } else { &viewer.script };
    let config = bootstrap_config(iid, debug);
    format!(
        "<div id=\"ol3-viewer\"></div>\n\
         <script type=\"application/json\" id=\"ol3-viewer-config\">{config}</script>\n\
         <script src=\"{prefix}/{script}\"></script>",
        prefix = viewer.static_prefix,
    )
}

/// Bootstrap blob the viewer script reads before mounting.
fn bootstrap_config(iid: Option<i64>, debug: bool) -> serde_json::Value {
    json!({
        "image_id": iid,
        "rois_url": RouteName::RequestRois.reverse(iid),
        "debug": debug,
    })
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

//! HTML shells for the browser views.

use axum::response::Html;

use crate::frontend::header;

fn shell(view: &str, title: &str) -> String {
    format!(
        "<!doctype html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n<body>\n{}\n<main id=\"app\" data-view=\"{view}\"></main>\n</body>\n</html>\n",
        header::render()
    )
}

pub async fn home() -> Html<String> {
    Html(shell("home", "Annotations"))
}

pub async fn annotate() -> Html<String> {
    Html(shell("annotate", "Annotate"))
}

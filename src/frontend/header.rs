//! Site navigation header.

/// A navigation link in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavLink {
    pub label: &'static str,
    pub href: &'static str,
}

pub const LINKS: [NavLink; 2] = [
    NavLink { label: "Home", href: "/" },
    NavLink { label: "Annotate", href: "/annotate" },
];

/// Render the header. Pure: every call returns the same markup.
pub fn render() -> String {
    let links: String = LINKS
        .iter()
        .map(|link| format!(r#"<a href="{}">{}</a>"#, link.href, link.label))
        .collect();
    format!(r#"<header class="header"><nav class="nav">{links}</nav></header>"#)
}

//! HTML grid page for directory listings.
//!
//! Renders a directory as a responsive grid of tiles: an UP tile, outlined
//! DIR tiles, thumbnail tiles for images (lazy-loaded, with a retry hook for
//! thumbnails that are still encoding), and plain tiles showing the extension
//! for everything else.

use std::path::Path;

use crate::fs::listing::{EntryKind, ListedEntry};

/// Escape HTML special characters to prevent XSS attacks.
fn html_escape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// Percent-encode each component of a relative path into an absolute URL path.
fn url_for(rel: &Path, name: Option<&str>) -> String {
    let mut url = String::from("/");
    for component in rel.iter() {
        let component = component.to_string_lossy();
        url.push_str(&urlencoding::encode(&component));
        url.push('/');
    }
    match name {
        Some(name) => url.push_str(&urlencoding::encode(name)),
        None => {
            if url.len() > 1 {
                url.pop(); // drop the trailing slash
            }
        }
    }
    url
}

/// URL of the parent directory ("/" for the root).
fn parent_url(rel: &Path) -> String {
    match rel.parent() {
        Some(parent) => url_for(parent, None),
        None => "/".to_string(),
    }
}

fn dir_tile(rel: &Path, name: &str) -> String {
    format!(
        r#"<a class="dir" href="{href}">
    <p class="type">DIR</p>
    <p class="name">{name}</p>
</a>
"#,
        href = url_for(rel, Some(name)),
        name = html_escape(name),
    )
}

fn up_tile(rel: &Path) -> String {
    format!(
        r#"<a class="dir" href="{href}">
    <p class="type">^ UP</p>
</a>
"#,
        href = parent_url(rel),
    )
}

fn thumb_tile(rel: &Path, name: &str, thumb_size: u32) -> String {
    let href = url_for(rel, Some(name));
    format!(
        r#"<a class="thumb" href="{href}">
    <img src="{href}?thumb={thumb_size}" loading="lazy" onerror="retry(this);">
    <p class="name">{name}</p>
</a>
"#,
        name = html_escape(name),
    )
}

fn file_tile(rel: &Path, name: &str) -> String {
    let ext = name.rsplit('.').next().unwrap_or("");
    format!(
        r#"<a class="file" href="{href}">
    <p class="type">{ext}</p>
    <p class="name">{name}</p>
</a>
"#,
        href = url_for(rel, Some(name)),
        ext = html_escape(ext),
        name = html_escape(name),
    )
}

/// Render the listing page for a directory.
///
/// # Arguments
///
/// * `rel` - the directory's path relative to the served root
/// * `entries` - its entries, as produced by [`crate::fs::list_dir`]
/// * `thumb_size` - edge size used for the grid's thumbnail URLs
pub fn render_listing(rel: &Path, entries: &[ListedEntry], thumb_size: u32) -> String {
    let title = html_escape(&url_for(rel, None));

    let mut body = String::new();
    if !rel.as_os_str().is_empty() {
        body.push_str(&up_tile(rel));
    }
    for entry in entries {
        let tile = match entry.kind {
            EntryKind::Dir => dir_tile(rel, &entry.name),
            EntryKind::Image => thumb_tile(rel, &entry.name, thumb_size),
            EntryKind::Other => file_tile(rel, &entry.name),
        };
        body.push_str(&tile);
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Directory listing for {title}</title>
<script type="text/javascript">
    // Thumbnails race their own encoding; retry failed images after a beat.
    function retry(element) {{
        setTimeout(function() {{
            element.src = element.src;
        }}, 500);
    }}
</script>
<style>
    html, body {{
        padding: 0;
        margin: 0;
    }}
    * {{
        box-sizing: border-box;
    }}
    body {{
        display: flex;
        flex-direction: row;
        justify-content: center;
        flex-wrap: wrap;
        gap: 1rem;
        padding: 1rem;
    }}
    a {{
        text-decoration: none;
        width: min(20vmin, 10rem);
        height: min(20vmin, 10rem);
        position: relative;
    }}
    a:hover {{
        opacity: 75%;
    }}
    a.thumb > img {{
        width: 100%;
        height: 100%;
        object-fit: cover;
    }}
    a.thumb > p.name {{
        background-color: #fff4;
    }}
    a > p.name {{
        width: 100%;
        height: auto;
        margin: 0;
        position: absolute;
        padding: 0 min(0.5vmin, 0.25rem) min(0.5vmin, 0.25rem) min(0.5vmin, 0.25rem);
        bottom: 0;
        left: 0;
        overflow-wrap: break-word;
        font-family: 'Courier New', Courier, monospace;
        color: black;
        font-size: min(1.5vmin, 0.75rem);
        text-align: center;
    }}
    p.type {{
        width: 100%;
        margin: 0;
        position: absolute;
        padding: min(1vmin, 0.5rem);
        top: 0;
        left: 0;
        overflow-wrap: break-word;
        font-weight: bold;
        font-family: 'Courier New', Courier, monospace;
        color: black;
        font-size: min(4vmin, 2rem);
        text-align: center;
        z-index: 50;
    }}
    a.dir {{
        outline-offset: max(-0.5vmin, -0.25rem);
        outline: min(0.5vmin, 0.25rem) dashed black;
    }}
    a.dir:hover {{
        outline: min(0.5vmin, 0.25rem) dashed #000a;
    }}
    a.file {{
        outline-offset: max(-0.5vmin, -0.25rem);
        outline: min(0.5vmin, 0.25rem) dotted black;
        background-color: #ddd;
    }}
    a.file:hover {{
        outline: min(0.5vmin, 0.25rem) dotted #000a;
    }}
</style>
</head>
<body>
{body}</body>
</html>
"#
    )
}

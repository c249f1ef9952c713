//! HTML pages, rendered with maud.

use maud::{DOCTYPE, Markup, html};
use snapcode_core::asset::AssetKind;

const CSS: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0 auto; max-width: 960px; padding: 1rem; }
.grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(200px, 1fr)); gap: 1rem; }
.grid figure { margin: 0; }
.grid img, .grid video { width: 100%; height: 200px; object-fit: cover; }
.share { display: flex; flex-wrap: wrap; gap: 2rem; align-items: flex-start; }
.share img.asset, .share video { max-width: 480px; width: 100%; }
.share img.code { width: 256px; image-rendering: pixelated; }
"#;

fn base(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (CSS) }
            }
            body {
                header {
                    nav { a href="/gallery" { "Gallery" } }
                }
                (content)
            }
        }
    }
}

/// An `<img>` or `<video>` pointing at a stored asset.
fn media(filename: &str, class: &str) -> Markup {
    let src = format!("/download/{filename}");
    let is_video = AssetKind::from_filename(filename).is_some_and(AssetKind::is_video);
    html! {
        @if is_video {
            video class=(class) src=(src) controls preload="metadata" {}
        } @else {
            img class=(class) src=(src) alt=(filename) loading="lazy";
        }
    }
}

/// The page shown after an upload: the asset next to its QR code.
pub fn show_code(filename: &str, qr_file: &str, url: &str) -> Markup {
    base(
        "Your photo",
        html! {
            h1 { "Scan to download" }
            div.share {
                (media(filename, "asset"))
                div {
                    img.code src={ "/qrcodes/" (qr_file) } alt="QR code";
                    p { a href=(url) { (url) } }
                }
            }
            p { a href="/gallery" { "Back to the gallery" } }
        },
    )
}

pub fn gallery(files: &[String], search: &str) -> Markup {
    base(
        "Gallery",
        html! {
            h1 { "Gallery" }
            form method="get" action="/gallery" {
                input type="search" name="search" value=(search) placeholder="Search";
                button type="submit" { "Search" }
            }
            form method="post" action="/upload" enctype="multipart/form-data" {
                input type="file" name="file" required;
                input type="email" name="email" placeholder="Email (optional)";
                button type="submit" { "Upload" }
            }
            @if files.is_empty() {
                p.empty { "Nothing here yet." }
            } @else {
                div.grid {
                    @for file in files {
                        figure {
                            a href={ "/download/" (file) } { (media(file, "thumb")) }
                            figcaption { (file) }
                        }
                    }
                }
            }
        },
    )
}

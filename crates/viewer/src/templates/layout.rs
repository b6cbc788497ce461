use maud::{html, Markup, PreEscaped, DOCTYPE};

pub struct PageConfig<'a> {
    pub title: &'a str,
    pub boundaries_url: &'a str,
    pub damage_points_url: &'a str,
    pub tile_url: &'a str,
    pub tile_attribution: &'a str,
}

/// Page script and stylesheet, resolved relative to the written page. The shell
/// carries markup only; these files are deployed next to it separately.
pub const PAGE_SCRIPT: &str = "static/map.js";
pub const PAGE_STYLESHEET: &str = "static/styles.css";

const LEAFLET_CSS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
const LEAFLET_JS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";

pub fn base(config: &PageConfig, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (config.title) }
                link rel="stylesheet" href=(LEAFLET_CSS);
                link rel="stylesheet" href=(PAGE_STYLESHEET);
                script src=(LEAFLET_JS) {}
            }
            body {
                // Data sources for the page script; the shell itself stays static.
                script {
                    (PreEscaped(format!(
                        "const MAP_SOURCES = {};",
                        sources_json(config)
                    )))
                }

                (content)

                script src=(PAGE_SCRIPT) {}
            }
        }
    }
}

fn sources_json(config: &PageConfig) -> String {
    serde_json::json!({
        "boundaries": config.boundaries_url,
        "damagePoints": config.damage_points_url,
        "tiles": config.tile_url,
        "attribution": config.tile_attribution,
    })
    .to_string()
}

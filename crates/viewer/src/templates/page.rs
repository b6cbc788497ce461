use maud::{html, Markup};

use super::layout::{base, PageConfig};
use crate::{Region, OVERVIEW_LABEL, POINTS_COUNT_LABEL};

/// Static page shell: map container, region controls, labels and loader.
pub fn map_page(config: &PageConfig) -> Markup {
    base(
        config,
        html! {
            div id="loader" class="loader" {
                div class="spinner" {}
                p { "Loading map data..." }
            }

            aside class="sidebar" {
                h1 class="title" { (config.title) }

                div class="current-view" {
                    span class="label" { "Current view: " }
                    span id="current-view" { (OVERVIEW_LABEL) }
                }
                div class="points-count" {
                    span id="points-count" { (POINTS_COUNT_LABEL) }
                }

                (region_controls())
            }

            div id="map" {}
        },
    )
}

fn region_controls() -> Markup {
    html! {
        nav class="region-controls" {
            @for region in Region::ALL {
                button type="button" class="region-btn" data-region=(region.key()) {
                    (region.name())
                }
            }
            button type="button" id="zoom-out" class="region-btn overview-btn" {
                "Zoom out"
            }
        }
    }
}

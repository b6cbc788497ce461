use maud::{html, Markup};

use crate::Region;

/// Popup body for a region: name, description and damage figure.
pub fn annotation(region: Region) -> Markup {
    let info = region.info();
    html! {
        div class="region-popup" data-region=(info.key) {
            h3 class="popup-title" { (info.name) }
            p class="popup-desc" { (info.desc) }
            p class="popup-stat" {
                strong { (info.stat) }
                " of structures damaged"
            }
        }
    }
}

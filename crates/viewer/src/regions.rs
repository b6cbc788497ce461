use std::fmt;

use crate::{LatLng, Viewport};

/// View shown at startup and after a reset.
pub const OVERVIEW: Viewport = Viewport {
    center: LatLng {
        lat: 31.4432234,
        lng: 34.360007,
    },
    zoom: 11,
};

/// Current-view label while the overview is shown.
pub const OVERVIEW_LABEL: &str = "Gaza Strip Overview";

/// Points-count label. Fixed text, not computed from the loaded layer.
pub const POINTS_COUNT_LABEL: &str = "Damage sites: 1,000+";

/// The governorates the viewer knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    NorthGaza,
    GazaCity,
    DeirAlBalah,
    KhanYounis,
    Rafah,
}

/// Static metadata attached to a [`Region`].
#[derive(Debug, PartialEq)]
pub struct RegionInfo {
    pub key: &'static str,
    pub name: &'static str,
    pub center: LatLng,
    pub zoom: u8,
    pub stat: &'static str,
    pub desc: &'static str,
}

const NORTH_GAZA: RegionInfo = RegionInfo {
    key: "north-gaza",
    name: "North Gaza",
    center: LatLng {
        lat: 31.5428,
        lng: 34.5036,
    },
    zoom: 13,
    stat: "70%",
    desc: "Beit Hanoun, Beit Lahia and Jabalia. Share of structures damaged (satellite estimate).",
};

const GAZA_CITY: RegionInfo = RegionInfo {
    key: "gaza",
    name: "Gaza City",
    center: LatLng {
        lat: 31.5017,
        lng: 34.4668,
    },
    zoom: 13,
    stat: "74%",
    desc: "Most populous governorate. Share of structures damaged (satellite estimate).",
};

const DEIR_AL_BALAH: RegionInfo = RegionInfo {
    key: "deir-al-balah",
    name: "Deir al-Balah",
    center: LatLng {
        lat: 31.4180,
        lng: 34.3510,
    },
    zoom: 13,
    stat: "49%",
    desc: "Central governorate including Nuseirat, Bureij and Maghazi. Share of structures damaged (satellite estimate).",
};

const KHAN_YOUNIS: RegionInfo = RegionInfo {
    key: "khan-younis",
    name: "Khan Younis",
    center: LatLng {
        lat: 31.3462,
        lng: 34.3063,
    },
    zoom: 13,
    stat: "55%",
    desc: "Southern governorate including Bani Suheila and Abasan. Share of structures damaged (satellite estimate).",
};

const RAFAH: RegionInfo = RegionInfo {
    key: "rafah",
    name: "Rafah",
    center: LatLng {
        lat: 31.2969,
        lng: 34.2455,
    },
    zoom: 13,
    stat: "48%",
    desc: "Southernmost governorate on the Egyptian border. Share of structures damaged (satellite estimate).",
};

impl Region {
    /// Every region, in control order (north to south).
    pub const ALL: [Region; 5] = [
        Region::NorthGaza,
        Region::GazaCity,
        Region::DeirAlBalah,
        Region::KhanYounis,
        Region::Rafah,
    ];

    pub fn info(self) -> &'static RegionInfo {
        match self {
            Region::NorthGaza => &NORTH_GAZA,
            Region::GazaCity => &GAZA_CITY,
            Region::DeirAlBalah => &DEIR_AL_BALAH,
            Region::KhanYounis => &KHAN_YOUNIS,
            Region::Rafah => &RAFAH,
        }
    }

    /// Resolve a registry key. Unknown keys are `None`, never an error.
    pub fn from_key(key: &str) -> Option<Region> {
        match key {
            "north-gaza" => Some(Region::NorthGaza),
            "gaza" => Some(Region::GazaCity),
            "deir-al-balah" => Some(Region::DeirAlBalah),
            "khan-younis" => Some(Region::KhanYounis),
            "rafah" => Some(Region::Rafah),
            _ => None,
        }
    }

    pub fn key(self) -> &'static str {
        self.info().key
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }

    pub fn center(self) -> LatLng {
        self.info().center
    }

    pub fn viewport(self) -> Viewport {
        let info = self.info();
        Viewport {
            center: info.center,
            zoom: info.zoom,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Turn a boundary feature name into a registry key: lowercase, whitespace runs
/// become a single hyphen, surrounding whitespace dropped.
pub fn normalize_region_name(raw: &str) -> String {
    raw.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

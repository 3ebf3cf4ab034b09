//! Snap zones: the geometry calculator and the zone detector.
//!
//! A zone is a named rectangle derived from the viewport and a padding
//! constant. Zones are never stored; they are recomputed whenever the active
//! [`LayoutType`] or the viewport changes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Point, Rect, Viewport, rect_contains};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ZoneId {
    #[serde(rename = "half-left")]
    HalfLeft,
    #[serde(rename = "half-right")]
    HalfRight,
    #[serde(rename = "quarter-tl")]
    QuarterTopLeft,
    #[serde(rename = "quarter-tr")]
    QuarterTopRight,
    #[serde(rename = "quarter-bl")]
    QuarterBottomLeft,
    #[serde(rename = "quarter-br")]
    QuarterBottomRight,
    #[serde(rename = "third-left")]
    ThirdLeft,
    #[serde(rename = "third-center")]
    ThirdCenter,
    #[serde(rename = "third-right")]
    ThirdRight,
}

impl ZoneId {
    pub const ALL: [ZoneId; 9] = [
        ZoneId::HalfLeft,
        ZoneId::HalfRight,
        ZoneId::QuarterTopLeft,
        ZoneId::QuarterTopRight,
        ZoneId::QuarterBottomLeft,
        ZoneId::QuarterBottomRight,
        ZoneId::ThirdLeft,
        ZoneId::ThirdCenter,
        ZoneId::ThirdRight,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ZoneId::HalfLeft => "half-left",
            ZoneId::HalfRight => "half-right",
            ZoneId::QuarterTopLeft => "quarter-tl",
            ZoneId::QuarterTopRight => "quarter-tr",
            ZoneId::QuarterBottomLeft => "quarter-bl",
            ZoneId::QuarterBottomRight => "quarter-br",
            ZoneId::ThirdLeft => "third-left",
            ZoneId::ThirdCenter => "third-center",
            ZoneId::ThirdRight => "third-right",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ZoneId::HalfLeft => "Left Half",
            ZoneId::HalfRight => "Right Half",
            ZoneId::QuarterTopLeft => "Top Left",
            ZoneId::QuarterTopRight => "Top Right",
            ZoneId::QuarterBottomLeft => "Bottom Left",
            ZoneId::QuarterBottomRight => "Bottom Right",
            ZoneId::ThirdLeft => "Left Third",
            ZoneId::ThirdCenter => "Center Third",
            ZoneId::ThirdRight => "Right Third",
        }
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} `{name}`")]
pub struct UnknownName {
    kind: &'static str,
    name: String,
}

impl FromStr for ZoneId {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ZoneId::ALL
            .into_iter()
            .find(|zone| zone.as_str() == s)
            .ok_or_else(|| UnknownName {
                kind: "zone",
                name: s.to_string(),
            })
    }
}

/// Named arrangement of zones offered while layout mode is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutType {
    Halves,
    #[serde(alias = "splits")]
    Thirds,
    Quarters,
    /// Two stacked quarters on the left and a half on the right.
    TwoQuartersLeft,
}

impl LayoutType {
    pub const ALL: [LayoutType; 4] = [
        LayoutType::Halves,
        LayoutType::Thirds,
        LayoutType::Quarters,
        LayoutType::TwoQuartersLeft,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LayoutType::Halves => "halves",
            LayoutType::Thirds => "thirds",
            LayoutType::Quarters => "quarters",
            LayoutType::TwoQuartersLeft => "two-quarters-left",
        }
    }

    /// Zone ids in detection order. No two zones of one layout overlap.
    pub fn zone_ids(self) -> &'static [ZoneId] {
        match self {
            LayoutType::Halves => &[ZoneId::HalfLeft, ZoneId::HalfRight],
            LayoutType::Thirds => &[ZoneId::ThirdLeft, ZoneId::ThirdCenter, ZoneId::ThirdRight],
            LayoutType::Quarters => &[
                ZoneId::QuarterTopLeft,
                ZoneId::QuarterTopRight,
                ZoneId::QuarterBottomLeft,
                ZoneId::QuarterBottomRight,
            ],
            LayoutType::TwoQuartersLeft => &[
                ZoneId::QuarterTopLeft,
                ZoneId::QuarterBottomLeft,
                ZoneId::HalfRight,
            ],
        }
    }

    pub fn next(self) -> Self {
        let idx = LayoutType::ALL
            .iter()
            .position(|layout| *layout == self)
            .unwrap_or(0);
        LayoutType::ALL[(idx + 1) % LayoutType::ALL.len()]
    }
}

impl fmt::Display for LayoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutType {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "splits" {
            return Ok(LayoutType::Thirds);
        }
        LayoutType::ALL
            .into_iter()
            .find(|layout| layout.as_str() == s)
            .ok_or_else(|| UnknownName {
                kind: "layout",
                name: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zone {
    pub id: ZoneId,
    pub rect: Rect,
    pub label: &'static str,
}

/// Rectangle of `zone` for the given viewport and padding.
pub fn zone_rect_for(zone: ZoneId, viewport: Viewport, padding: f64) -> Rect {
    let w = viewport.width;
    let h = viewport.height;
    let p = padding;
    let half_w = w / 2.0 - p * 1.5;
    let half_h = h / 2.0 - p * 1.5;
    let full_h = h - p * 2.0;
    let third_w = w / 3.0 - p;
    let right_x = w / 2.0 + p / 2.0;
    let bottom_y = h / 2.0 + p / 2.0;
    match zone {
        ZoneId::HalfLeft => Rect::new(p, p, half_w, full_h),
        ZoneId::HalfRight => Rect::new(right_x, p, half_w, full_h),
        ZoneId::QuarterTopLeft => Rect::new(p, p, half_w, half_h),
        ZoneId::QuarterTopRight => Rect::new(right_x, p, half_w, half_h),
        ZoneId::QuarterBottomLeft => Rect::new(p, bottom_y, half_w, half_h),
        ZoneId::QuarterBottomRight => Rect::new(right_x, bottom_y, half_w, half_h),
        ZoneId::ThirdLeft => Rect::new(p, p, third_w, full_h),
        ZoneId::ThirdCenter => Rect::new(w / 3.0 + p / 2.0, p, third_w, full_h),
        ZoneId::ThirdRight => Rect::new(w / 3.0 * 2.0 + p / 2.0, p, third_w, full_h),
    }
}

/// String boundary of [`zone_rect_for`]: unknown names yield `None`.
pub fn zone_rect_for_name(name: &str, viewport: Viewport, padding: f64) -> Option<Rect> {
    let zone = name.parse::<ZoneId>().ok()?;
    Some(zone_rect_for(zone, viewport, padding))
}

pub fn zones_for_layout(layout: LayoutType, viewport: Viewport, padding: f64) -> Vec<Zone> {
    layout
        .zone_ids()
        .iter()
        .map(|&id| Zone {
            id,
            rect: zone_rect_for(id, viewport, padding),
            label: id.label(),
        })
        .collect()
}

/// First zone, in slice order, whose rectangle contains `point`.
pub fn detect_zone(point: Point, zones: &[Zone]) -> Option<ZoneId> {
    zones
        .iter()
        .find(|zone| rect_contains(zone.rect, point))
        .map(|zone| zone.id)
}

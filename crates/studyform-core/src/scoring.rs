//! Per-instrument scoring.
//!
//! Every scorer is a pure function of a form's responses. Missing or
//! non-numeric selections count as 0 and never raise: in-progress sessions
//! must still export. Callers that need to tell "answered 0" from
//! "unanswered" have to look at the raw [`ResponseRecord`].

use serde::{Deserialize, Serialize};

use crate::model::ResponseRecord;
use crate::schema::TLX_RANGE_MAX;

/// Numeric value of a selection; absent, blank or malformed values give 0.
pub fn coerce_score(selected: Option<&str>) -> f64 {
    selected
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Integer value of a selection, truncating any fractional part.
pub fn coerce_int(selected: Option<&str>) -> i64 {
    coerce_score(selected) as i64
}

fn field_int(record: Option<&ResponseRecord>, field_id: &str) -> i64 {
    coerce_int(record.and_then(|r| r.selected(field_id)))
}

fn field_score(record: Option<&ResponseRecord>, field_id: &str) -> f64 {
    coerce_score(record.and_then(|r| r.selected(field_id)))
}

/// CSQ-VR subscale sums.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsqVrScores {
    pub nausea: i64,
    pub vestibular: i64,
    pub oculomotor: i64,
    pub total: i64,
}

/// Sum the paired items of each CSQ-VR subscale.
pub fn score_csq_vr(record: Option<&ResponseRecord>) -> CsqVrScores {
    let pair = |a: &str, b: &str| field_int(record, a) + field_int(record, b);

    let nausea = pair("nauseaA", "nauseaB");
    let vestibular = pair("vestibularA", "vestibularB");
    let oculomotor = pair("oculomotorA", "oculomotorB");

    CsqVrScores {
        nausea,
        vestibular,
        oculomotor,
        total: nausea + vestibular + oculomotor,
    }
}

/// NASA-TLX subscales with performance already inverted, plus the raw score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NasaTlxScores {
    pub mental: f64,
    pub physical: f64,
    pub temporal: f64,
    pub performance: f64,
    pub effort: f64,
    pub frustration: f64,
    /// Unweighted mean of the six subscales.
    pub raw_tlx: f64,
}

/// Score a NASA-TLX form whose scales run up to `range_max`.
///
/// Performance is inverted (`range_max - raw`) so that better performance
/// lowers the perceived load.
pub fn score_nasa_tlx(record: Option<&ResponseRecord>, range_max: f64) -> NasaTlxScores {
    let mental = field_score(record, "mentalDemand");
    let physical = field_score(record, "physicalDemand");
    let temporal = field_score(record, "temporalDemand");
    let performance = range_max - field_score(record, "performance");
    let effort = field_score(record, "effort");
    let frustration = field_score(record, "frustration");

    let raw_tlx = (mental + physical + temporal + performance + effort + frustration) / 6.0;

    NasaTlxScores {
        mental,
        physical,
        temporal,
        performance,
        effort,
        frustration,
        raw_tlx,
    }
}

/// Default NASA-TLX range maximum.
pub fn default_tlx_range_max() -> f64 {
    TLX_RANGE_MAX as f64
}

/// The seven usability dimensions, read straight from their items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsabilityScores {
    pub control: i64,
    pub comfort: i64,
    pub ease: i64,
    pub precision: i64,
    pub perceived_offset: i64,
    pub applicability: i64,
    pub naturalness: i64,
}

/// Schema field backing each usability dimension.
pub const USABILITY_DIMENSIONS: [(&str, &str); 7] = [
    ("control", "headControl"),
    ("comfort", "comfort"),
    ("ease", "easyTarget"),
    ("precision", "preciseTarget"),
    ("perceived-offset", "mismatch"),
    ("applicability", "applicability"),
    ("naturalness", "natural"),
];

pub fn score_usability(record: Option<&ResponseRecord>) -> UsabilityScores {
    let [control, comfort, ease, precision, perceived_offset, applicability, naturalness] =
        USABILITY_DIMENSIONS.map(|(_, field)| field_int(record, field));

    UsabilityScores {
        control,
        comfort,
        ease,
        precision,
        perceived_offset,
        applicability,
        naturalness,
    }
}

/// Render a score the way a spreadsheet expects: integers without a decimal
/// point, everything else in shortest form.
pub fn format_score(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

//! Typed bout and event vocabulary
//!
//! UFCStats prints the same concept differently on different pages: the
//! event card says `U-DEC` where the fight page says `Decision - Unanimous`,
//! and weight classes come with decorations such as `UFC ... Title Bout`.
//! These coercions map every spelling onto one enum.

use serde::Serialize;

use super::{coerce_with, Coerced};

/// Landed/attempted pair, e.g. significant strikes `15 of 27`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Attempts {
    pub landed: i64,
    pub attempted: i64,
}

/// Event location split into its parts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub city: String,
    pub region: Option<String>,
    pub country: String,
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.region {
            Some(region) => write!(f, "{}, {}, {}", self.city, region, self.country),
            None => write!(f, "{}, {}", self.city, self.country),
        }
    }
}

/// `Las Vegas, Nevada, USA` or `London, England`
pub fn coerce_location(raw: &str) -> Coerced<Location> {
    coerce_with(raw, |s| {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.iter().any(|p| p.is_empty()) {
            return None;
        }
        match parts.as_slice() {
            [city, country] => Some(Location {
                city: city.to_string(),
                region: None,
                country: country.to_string(),
            }),
            [city, region, country] => Some(Location {
                city: city.to_string(),
                region: Some(region.to_string()),
                country: country.to_string(),
            }),
            _ => None,
        }
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightClass {
    Strawweight,
    Flyweight,
    Bantamweight,
    Featherweight,
    Lightweight,
    Welterweight,
    Middleweight,
    LightHeavyweight,
    Heavyweight,
    SuperHeavyweight,
    CatchWeight,
    OpenWeight,
}

impl WeightClass {
    /// Spellings in match order; compound names come before their suffixes
    const SPELLINGS: &'static [(&'static str, WeightClass)] = &[
        ("light heavyweight", WeightClass::LightHeavyweight),
        ("super heavyweight", WeightClass::SuperHeavyweight),
        ("heavyweight", WeightClass::Heavyweight),
        ("middleweight", WeightClass::Middleweight),
        ("welterweight", WeightClass::Welterweight),
        ("lightweight", WeightClass::Lightweight),
        ("featherweight", WeightClass::Featherweight),
        ("bantamweight", WeightClass::Bantamweight),
        ("flyweight", WeightClass::Flyweight),
        ("strawweight", WeightClass::Strawweight),
        ("catch weight", WeightClass::CatchWeight),
        ("catchweight", WeightClass::CatchWeight),
        ("open weight", WeightClass::OpenWeight),
        ("openweight", WeightClass::OpenWeight),
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WeightClass::Strawweight => "strawweight",
            WeightClass::Flyweight => "flyweight",
            WeightClass::Bantamweight => "bantamweight",
            WeightClass::Featherweight => "featherweight",
            WeightClass::Lightweight => "lightweight",
            WeightClass::Welterweight => "welterweight",
            WeightClass::Middleweight => "middleweight",
            WeightClass::LightHeavyweight => "light_heavyweight",
            WeightClass::Heavyweight => "heavyweight",
            WeightClass::SuperHeavyweight => "super_heavyweight",
            WeightClass::CatchWeight => "catch_weight",
            WeightClass::OpenWeight => "open_weight",
        }
    }
}

/// Weight class plus the decorations the source folds into the same string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoutClass {
    pub weight_class: WeightClass,
    pub is_female: bool,
    pub is_title: bool,
}

/// `Women's Flyweight`, `UFC Lightweight Title Bout`, `Catch Weight Bout`
pub fn coerce_bout_class(raw: &str) -> Coerced<BoutClass> {
    coerce_with(raw, |s| {
        let lower = s.to_lowercase();
        let weight_class = WeightClass::SPELLINGS
            .iter()
            .find(|(spelling, _)| lower.contains(spelling))
            .map(|(_, wc)| *wc)?;
        Some(BoutClass {
            weight_class,
            is_female: lower.contains("women"),
            is_title: lower.contains("title"),
        })
    })
}

/// How a bout ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    KoTko,
    Submission,
    DecisionUnanimous,
    DecisionSplit,
    DecisionMajority,
    DoctorStoppage,
    Disqualification,
    CouldNotContinue,
    Overturned,
    Other,
}

impl Method {
    /// Upper-cased leading tokens, longest spellings of a family first
    const SPELLINGS: &'static [(&'static str, Method)] = &[
        ("TKO - DOCTOR'S STOPPAGE", Method::DoctorStoppage),
        ("KO/TKO", Method::KoTko),
        ("SUBMISSION", Method::Submission),
        ("SUB", Method::Submission),
        ("DECISION - UNANIMOUS", Method::DecisionUnanimous),
        ("DECISION - SPLIT", Method::DecisionSplit),
        ("DECISION - MAJORITY", Method::DecisionMajority),
        ("U-DEC", Method::DecisionUnanimous),
        ("S-DEC", Method::DecisionSplit),
        ("M-DEC", Method::DecisionMajority),
        ("DISQUALIFICATION", Method::Disqualification),
        ("DQ", Method::Disqualification),
        ("COULD NOT CONTINUE", Method::CouldNotContinue),
        ("CNC", Method::CouldNotContinue),
        ("OVERTURNED", Method::Overturned),
        ("OTHER", Method::Other),
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::KoTko => "ko_tko",
            Method::Submission => "submission",
            Method::DecisionUnanimous => "decision_unanimous",
            Method::DecisionSplit => "decision_split",
            Method::DecisionMajority => "decision_majority",
            Method::DoctorStoppage => "doctor_stoppage",
            Method::Disqualification => "disqualification",
            Method::CouldNotContinue => "could_not_continue",
            Method::Overturned => "overturned",
            Method::Other => "other",
        }
    }

    pub fn is_decision(&self) -> bool {
        matches!(
            self,
            Method::DecisionUnanimous | Method::DecisionSplit | Method::DecisionMajority
        )
    }
}

/// Method with the free-text finish detail the event card appends
/// (`KO/TKO Punches` → `KoTko`, `Punches`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodResult {
    pub method: Method,
    pub detail: Option<String>,
}

pub fn coerce_method(raw: &str) -> Coerced<MethodResult> {
    coerce_with(raw, |s| {
        let upper = s.to_uppercase();
        Method::SPELLINGS.iter().find_map(|(spelling, method)| {
            let rest = upper.strip_prefix(spelling)?;
            if !rest.is_empty() && !rest.starts_with(' ') {
                return None;
            }
            // slice the original string so the detail keeps its casing
            let detail = s.get(spelling.len()..).map(str::trim).unwrap_or("");
            Some(MethodResult {
                method: *method,
                detail: (!detail.is_empty()).then(|| detail.to_string()),
            })
        })
    })
}

/// One corner's result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Win,
    Loss,
    Draw,
    NoContest,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Win => "win",
            Outcome::Loss => "loss",
            Outcome::Draw => "draw",
            Outcome::NoContest => "nc",
        }
    }
}

/// `W`/`win`, `L`/`loss`, `D`/`draw`, `NC`/`nc`
pub fn coerce_outcome(raw: &str) -> Coerced<Outcome> {
    coerce_with(raw, |s| match s.to_lowercase().as_str() {
        "w" | "win" => Some(Outcome::Win),
        "l" | "loss" => Some(Outcome::Loss),
        "d" | "draw" => Some(Outcome::Draw),
        "nc" | "no contest" => Some(Outcome::NoContest),
        _ => None,
    })
}

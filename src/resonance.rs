//! Identification of known dimuon resonances from their invariant mass

use crate::numeric::Float;

use prefix_num_ops::real::*;
use std::fmt::Display;

/// Number of named resonance candidates (excluding the background)
pub const NUM_RESONANCES: usize = 3;

/// Candidate origin of a muon pair
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum Resonance {
    /// cc̄ bound state
    JPsi,
    /// bb̄ bound state
    Upsilon,
    /// Neutral weak boson
    ZBoson,
    /// Anything else (combinatorial background, soft QCD...)
    Unknown,
}
//
impl Resonance {
    /// Named resonances, by increasing mass
    pub const NAMED: [Resonance; NUM_RESONANCES] =
        [Resonance::JPsi, Resonance::Upsilon, Resonance::ZBoson];

    /// All classification outcomes, in display order
    pub const ALL: [Resonance; NUM_RESONANCES + 1] = [
        Resonance::JPsi,
        Resonance::Upsilon,
        Resonance::ZBoson,
        Resonance::Unknown,
    ];

    /// Human-readable name
    pub fn label(self) -> &'static str {
        match self {
            Resonance::JPsi => "J/Psi Meson",
            Resonance::Upsilon => "Upsilon Meson",
            Resonance::ZBoson => "Z Boson",
            Resonance::Unknown => "Unknown / Background",
        }
    }

    /// Open mass window (GeV) in which a pair is attributed to this resonance
    pub fn mass_window(self) -> Option<(Float, Float)> {
        match self {
            Resonance::JPsi => Some((2.8, 3.4)),
            Resonance::Upsilon => Some((9.0, 10.5)),
            Resonance::ZBoson => Some((80.0, 100.0)),
            Resonance::Unknown => None,
        }
    }

    /// Reference mass of the resonance (GeV)
    pub fn nominal_mass(self) -> Option<Float> {
        match self {
            Resonance::JPsi => Some(3.0969),
            Resonance::Upsilon => Some(9.4603),
            Resonance::ZBoson => Some(91.1876),
            Resonance::Unknown => None,
        }
    }

    /// Short physics background on the candidate
    pub fn description(self) -> &'static str {
        match self {
            Resonance::JPsi => {
                "Bound state of a charm quark and its antiquark, whose discovery in 1974 \
                 established the existence of charm"
            }
            Resonance::Upsilon => {
                "Bound state of a bottom quark and its antiquark, about three times heavier \
                 than the J/Psi"
            }
            Resonance::ZBoson => {
                "Heavy neutral carrier of the weak force, able to produce very energetic \
                 muons whose tracks are almost straight"
            }
            Resonance::Unknown => {
                "Most likely a random pairing of muons rather than the decay of a specific \
                 heavy particle"
            }
        }
    }
}

impl Display for Resonance {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fmt.write_str(self.label())
    }
}

/// Qualitative confidence in a resonance assignment
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum Confidence {
    /// Not a resonance candidate
    None,
    /// Inside the mass window, away from the peak
    Weak,
    /// Close to the nominal mass of the resonance
    Strong,
}
//
impl Confidence {
    /// Human-readable name
    pub fn label(self) -> &'static str {
        match self {
            Confidence::None => "none",
            Confidence::Weak => "weak",
            Confidence::Strong => "strong",
        }
    }
}

/// Fraction of a mass window's half-width, around the nominal mass, where
/// candidates are considered strong
const STRONG_FRACTION: Float = 0.25;

/// Outcome of the classification of an invariant mass
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Classification {
    /// Most likely origin of the pair
    pub resonance: Resonance,

    /// How much the mass supports that origin
    pub confidence: Confidence,
}
//
impl Classification {
    /// Human-readable name of the candidate
    pub fn label(&self) -> &'static str {
        self.resonance.label()
    }
}

/// Attribute an invariant mass (GeV) to a resonance candidate
///
/// Mass windows are open and disjoint, so masses on a window boundary (and
/// NaN) are classified as background.
pub fn classify(mass: Float) -> Classification {
    let in_window = |res: &Resonance| {
        res.mass_window()
            .map_or(false, |(low, high)| low < mass && mass < high)
    };
    let Some(resonance) = Resonance::NAMED.iter().copied().find(in_window) else {
        return Classification {
            resonance: Resonance::Unknown,
            confidence: Confidence::None,
        };
    };
    Classification {
        resonance,
        confidence: confidence(resonance, mass),
    }
}

/// Confidence of a named resonance assignment
fn confidence(resonance: Resonance, mass: Float) -> Confidence {
    let (Some((low, high)), Some(nominal)) = (resonance.mass_window(), resonance.nominal_mass())
    else {
        return Confidence::None;
    };
    let half_width = (high - low) / 2.;
    if abs(mass - nominal) <= STRONG_FRACTION * half_width {
        Confidence::Strong
    } else {
        Confidence::Weak
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(mass: Float) -> &'static str {
        classify(mass).label()
    }

    #[test]
    fn known_resonances() {
        assert_eq!(label(3.09), "J/Psi Meson");
        assert_eq!(label(9.46), "Upsilon Meson");
        assert_eq!(label(91.2), "Z Boson");
        assert_eq!(label(50.0), "Unknown / Background");
    }

    #[test]
    fn window_boundaries_are_background() {
        for &mass in &[2.8, 3.4, 9.0, 10.5, 80.0, 100.0] {
            assert_eq!(classify(mass).resonance, Resonance::Unknown, "{mass}");
        }
    }

    #[test]
    fn classification_is_total() {
        for &mass in &[0., 1e-30, 5., 1e6, Float::INFINITY, Float::NAN, -1.] {
            let classification = classify(mass);
            assert_eq!(classification.resonance, Resonance::Unknown);
            assert_eq!(classification.confidence, Confidence::None);
        }
    }

    #[test]
    fn windows_are_disjoint_and_contain_their_peak() {
        let windows = Resonance::NAMED.map(|res| res.mass_window().unwrap());
        for pair in windows.windows(2) {
            assert!(pair[0].1 <= pair[1].0);
        }
        for res in Resonance::NAMED {
            let (low, high) = res.mass_window().unwrap();
            let nominal = res.nominal_mass().unwrap();
            assert!(low < nominal && nominal < high);
            assert_eq!(classify(nominal).resonance, res);
            assert_eq!(classify(nominal).confidence, Confidence::Strong);
        }
        assert_eq!(Resonance::Unknown.mass_window(), None);
    }

    #[test]
    fn confidence_tiers() {
        assert_eq!(classify(91.0).confidence, Confidence::Strong);
        assert_eq!(classify(81.0).confidence, Confidence::Weak);
        assert_eq!(classify(2.85).confidence, Confidence::Weak);
        assert_eq!(classify(9.5).confidence, Confidence::Strong);
    }

    #[test]
    fn display_uses_label() {
        assert_eq!(Resonance::ZBoson.to_string(), "Z Boson");
        assert_eq!(Resonance::ALL.len(), NUM_RESONANCES + 1);
    }
}

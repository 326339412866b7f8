//! Feature variables and band-name resolution
//!
//! Every feature raster on disk maps to exactly one [`FeatureVariable`].
//! Resolution runs over an ordered rule table: background names match
//! before their plain counterparts, and the plain color rules explicitly
//! reject names containing "Background" so `BackgroundRed.tif` can never
//! be taken for the red band.

/// The 22 per-pixel feature variables, in canonical column order.
///
/// The declaration order here is the training-table column order and the
/// feature-matrix column order; the two must never drift apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FeatureVariable {
    NDVI,
    Pan,
    R,
    G,
    B,
    NIR,
    SAVI01,
    SAVI02,
    SAVI03,
    SAVI04,
    SAVI05,
    SAVI06,
    SAVI07,
    SAVI08,
    SAVI09,
    SAVI10,
    BackgroundRed,
    BackgroundGreen,
    BackgroundBlue,
    BackgroundNIR,
    BackgroundPan,
    BackgroundNDVI,
}

impl FeatureVariable {
    /// All variables in canonical column order
    pub const ALL: [FeatureVariable; 22] = [
        FeatureVariable::NDVI,
        FeatureVariable::Pan,
        FeatureVariable::R,
        FeatureVariable::G,
        FeatureVariable::B,
        FeatureVariable::NIR,
        FeatureVariable::SAVI01,
        FeatureVariable::SAVI02,
        FeatureVariable::SAVI03,
        FeatureVariable::SAVI04,
        FeatureVariable::SAVI05,
        FeatureVariable::SAVI06,
        FeatureVariable::SAVI07,
        FeatureVariable::SAVI08,
        FeatureVariable::SAVI09,
        FeatureVariable::SAVI10,
        FeatureVariable::BackgroundRed,
        FeatureVariable::BackgroundGreen,
        FeatureVariable::BackgroundBlue,
        FeatureVariable::BackgroundNIR,
        FeatureVariable::BackgroundPan,
        FeatureVariable::BackgroundNDVI,
    ];

    /// Number of feature variables
    pub const COUNT: usize = Self::ALL.len();

    /// Column name in the training table
    pub fn name(self) -> &'static str {
        match self {
            FeatureVariable::NDVI => "NDVI",
            FeatureVariable::Pan => "Pan",
            FeatureVariable::R => "R",
            FeatureVariable::G => "G",
            FeatureVariable::B => "B",
            FeatureVariable::NIR => "NIR",
            FeatureVariable::SAVI01 => "SAVI01",
            FeatureVariable::SAVI02 => "SAVI02",
            FeatureVariable::SAVI03 => "SAVI03",
            FeatureVariable::SAVI04 => "SAVI04",
            FeatureVariable::SAVI05 => "SAVI05",
            FeatureVariable::SAVI06 => "SAVI06",
            FeatureVariable::SAVI07 => "SAVI07",
            FeatureVariable::SAVI08 => "SAVI08",
            FeatureVariable::SAVI09 => "SAVI09",
            FeatureVariable::SAVI10 => "SAVI10",
            FeatureVariable::BackgroundRed => "Background_Red",
            FeatureVariable::BackgroundGreen => "Background_Green",
            FeatureVariable::BackgroundBlue => "Background_Blue",
            FeatureVariable::BackgroundNIR => "Background_NIR",
            FeatureVariable::BackgroundPan => "Background_Pan",
            FeatureVariable::BackgroundNDVI => "Background_NDVI",
        }
    }

    /// Canonical file name for this variable
    pub fn file_name(self) -> &'static str {
        match self {
            FeatureVariable::NDVI => "NDVI.tif",
            FeatureVariable::Pan => "Pan.tif",
            FeatureVariable::R => "Red.tif",
            FeatureVariable::G => "Green.tif",
            FeatureVariable::B => "Blue.tif",
            FeatureVariable::NIR => "NIR.tif",
            FeatureVariable::SAVI01 => "SAVI_01.tif",
            FeatureVariable::SAVI02 => "SAVI_02.tif",
            FeatureVariable::SAVI03 => "SAVI_03.tif",
            FeatureVariable::SAVI04 => "SAVI_04.tif",
            FeatureVariable::SAVI05 => "SAVI_05.tif",
            FeatureVariable::SAVI06 => "SAVI_06.tif",
            FeatureVariable::SAVI07 => "SAVI_07.tif",
            FeatureVariable::SAVI08 => "SAVI_08.tif",
            FeatureVariable::SAVI09 => "SAVI_09.tif",
            FeatureVariable::SAVI10 => "SAVI_10.tif",
            FeatureVariable::BackgroundRed => "BackgroundRed.tif",
            FeatureVariable::BackgroundGreen => "BackgroundGreen.tif",
            FeatureVariable::BackgroundBlue => "BackgroundBlue.tif",
            FeatureVariable::BackgroundNIR => "BackgroundNIR.tif",
            FeatureVariable::BackgroundPan => "BackgroundPan.tif",
            FeatureVariable::BackgroundNDVI => "BackgroundNDVI.tif",
        }
    }
}

struct Rule {
    suffix: &'static str,
    reject: Option<&'static str>,
    variable: FeatureVariable,
}

const fn plain(suffix: &'static str, variable: FeatureVariable) -> Rule {
    Rule {
        suffix,
        reject: Some("Background"),
        variable,
    }
}

const fn exact(suffix: &'static str, variable: FeatureVariable) -> Rule {
    Rule {
        suffix,
        reject: None,
        variable,
    }
}

/// Ordered resolution rules. Background suffixes come first; the plain
/// band rules additionally reject "Background" because names like
/// `BackgroundPan.tif` also end with `Pan.tif`.
const RULES: [Rule; 22] = [
    exact("BackgroundRed.tif", FeatureVariable::BackgroundRed),
    exact("BackgroundGreen.tif", FeatureVariable::BackgroundGreen),
    exact("BackgroundBlue.tif", FeatureVariable::BackgroundBlue),
    exact("BackgroundNIR.tif", FeatureVariable::BackgroundNIR),
    exact("BackgroundPan.tif", FeatureVariable::BackgroundPan),
    exact("BackgroundNDVI.tif", FeatureVariable::BackgroundNDVI),
    exact("SAVI_01.tif", FeatureVariable::SAVI01),
    exact("SAVI_02.tif", FeatureVariable::SAVI02),
    exact("SAVI_03.tif", FeatureVariable::SAVI03),
    exact("SAVI_04.tif", FeatureVariable::SAVI04),
    exact("SAVI_05.tif", FeatureVariable::SAVI05),
    exact("SAVI_06.tif", FeatureVariable::SAVI06),
    exact("SAVI_07.tif", FeatureVariable::SAVI07),
    exact("SAVI_08.tif", FeatureVariable::SAVI08),
    exact("SAVI_09.tif", FeatureVariable::SAVI09),
    exact("SAVI_10.tif", FeatureVariable::SAVI10),
    plain("Red.tif", FeatureVariable::R),
    plain("Green.tif", FeatureVariable::G),
    plain("Blue.tif", FeatureVariable::B),
    plain("NIR.tif", FeatureVariable::NIR),
    plain("NDVI.tif", FeatureVariable::NDVI),
    plain("Pan.tif", FeatureVariable::Pan),
];

/// Resolve a file name to its feature variable.
///
/// Unrecognized names return `None`; directory scans skip them silently.
pub fn resolve(file_name: &str) -> Option<FeatureVariable> {
    for rule in &RULES {
        if file_name.ends_with(rule.suffix)
            && !rule.reject.is_some_and(|r| file_name.contains(r))
        {
            return Some(rule.variable);
        }
    }
    None
}

// 📐 Bucket Schema - Identity Dimensions
// The eleven identity axes, their canonical bucket labels, and the rule that
// classifies a raw CSV field into one bucket (or "NA")

use crate::rules::LabelNormalizer;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fallback bucket for missing or unrecognized identity data
pub const NA_BUCKET: &str = "NA";

/// Number of identity dimensions
pub const DIMENSION_COUNT: usize = 11;

// ============================================================================
// DIMENSIONS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimension {
    Age,
    Gender,
    Education,
    EmploymentStatus,
    CountryOfResidence,
    Expatriate,
    MaritalStatus,
    RiskGroup,
    CurrentSituation,
    IsolationAdults,
    IsolationChildren,
}

impl Dimension {
    /// All dimensions in dataset order
    pub const ALL: [Dimension; DIMENSION_COUNT] = [
        Dimension::Age,
        Dimension::Gender,
        Dimension::Education,
        Dimension::EmploymentStatus,
        Dimension::CountryOfResidence,
        Dimension::Expatriate,
        Dimension::MaritalStatus,
        Dimension::RiskGroup,
        Dimension::CurrentSituation,
        Dimension::IsolationAdults,
        Dimension::IsolationChildren,
    ];

    /// Human-readable name for display
    pub fn name(&self) -> &'static str {
        match self {
            Dimension::Age => "Age",
            Dimension::Gender => "Gender",
            Dimension::Education => "Education",
            Dimension::EmploymentStatus => "Employment Status",
            Dimension::CountryOfResidence => "Country of Residence",
            Dimension::Expatriate => "Expatriate",
            Dimension::MaritalStatus => "Marital status",
            Dimension::RiskGroup => "Risk Group",
            Dimension::CurrentSituation => "Current Situation",
            Dimension::IsolationAdults => "Isolation Adult",
            Dimension::IsolationChildren => "Isolation Children",
        }
    }

    /// Position in `Dimension::ALL` and in a processed dataset
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// CSV column the dimension is read from
    pub fn column(&self) -> usize {
        match self {
            Dimension::Age => 4,
            Dimension::Gender => 5,
            Dimension::Education => 6,
            Dimension::EmploymentStatus => 8,
            Dimension::CountryOfResidence => 9,
            Dimension::Expatriate => 10,
            Dimension::MaritalStatus => 12,
            Dimension::RiskGroup => 14,
            Dimension::CurrentSituation => 15,
            Dimension::IsolationAdults => 16,
            Dimension::IsolationChildren => 17,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dimension {
    type Err = String;

    /// Accepts the display name or a kebab/snake-case spelling, any case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect();

        Dimension::ALL
            .into_iter()
            .find(|d| {
                let debug = format!("{:?}", d).to_lowercase();
                let display: String = d
                    .name()
                    .chars()
                    .filter(|c| c.is_alphanumeric())
                    .flat_map(char::to_lowercase)
                    .collect();
                wanted == debug || wanted == display
            })
            .ok_or_else(|| format!("unknown dimension: {}", s))
    }
}

// ============================================================================
// CANONICAL LABELS
// ============================================================================

pub const AGE_BUCKETS: [&str; 6] = ["18-24", "25-34", "35-44", "45-54", "55-64", "65+"];

pub const GENDER_BUCKETS: [&str; 3] = ["Male", "Female", "Other/would rather not say"];

pub const EDUCATION_BUCKETS: [&str; 7] = [
    "None",
    "Up to 6 years of school",
    "Up to 9 years of school",
    "Up to 12 years of school",
    "Some College, short continuing education or equivalent",
    "College degree, bachelor, master",
    "PhD/Doctorate",
];

pub const EMPLOYMENT_BUCKETS: [&str; 6] = [
    "Not employed",
    "Student",
    "Part time employed",
    "Full time employed",
    "Self-employed",
    "Retired",
];

#[rustfmt::skip]
pub const COUNTRY_BUCKETS: [&str; 195] = [
    "Afghanistan", "Albania", "Algeria", "Andorra", "Angola", "Antigua and Barbuda", "Argentina",
    "Armenia", "Australia", "Austria", "Azerbaijan", "The Bahamas", "Bahrain", "Bangladesh",
    "Barbados", "Belarus", "Belgium", "Belize", "Benin", "Bhutan", "Bolivia",
    "Bosnia and Herzegovina", "Botswana", "Brazil", "Brunei", "Bulgaria", "Burkina Faso", "Burundi",
    "Cabo Verde", "Cambodia", "Cameroon", "Canada", "Central African Republic", "Chad", "Chile",
    "China", "Colombia", "Comoros", "Congo, Democratic Republic of the", "Congo, Republic of the",
    "Costa Rica", "Côte d’Ivoire", "Croatia", "Cuba", "Cyprus", "Czech Republic", "Denmark",
    "Djibouti", "Dominica", "Dominican Republic", "East Timor (Timor-Leste)", "Ecuador", "Egypt",
    "El Salvador", "Equatorial Guinea", "Eritrea", "Estonia", "Eswatini", "Ethiopia", "Fiji",
    "Finland", "France", "Gabon", "The Gambia", "Georgia", "Germany", "Ghana", "Greece", "Grenada",
    "Guatemala", "Guinea", "Guinea-Bissau", "Guyana", "Haiti", "Honduras", "Hungary", "Iceland",
    "India", "Indonesia", "Iran", "Iraq", "Ireland", "Israel", "Italy", "Jamaica", "Japan",
    "Jordan", "Kazakhstan", "Kenya", "Kiribati", "Korea, North", "Korea, South", "Kosovo", "Kuwait",
    "Kyrgyzstan", "Laos", "Latvia", "Lebanon", "Lesotho", "Liberia", "Libya", "Liechtenstein",
    "Lithuania", "Luxembourg", "Madagascar", "Malawi", "Malaysia", "Maldives", "Mali", "Malta",
    "Marshall Islands", "Mauritania", "Mauritius", "Mexico", "Micronesia, Federated States of",
    "Moldova", "Monaco", "Mongolia", "Montenegro", "Morocco", "Mozambique", "Myanmar (Burma)",
    "Namibia", "Nauru", "Nepal", "Netherlands", "New Zealand", "Nicaragua", "Niger", "Nigeria",
    "North Macedonia", "Norway", "Oman", "Pakistan", "Palau", "Panama", "Papua New Guinea",
    "Paraguay", "Peru", "Philippines", "Poland", "Portugal", "Qatar", "Romania", "Russia", "Rwanda",
    "Saint Kitts and Nevis", "Saint Lucia", "Saint Vincent and the Grenadines", "Samoa",
    "San Marino", "Sao Tome and Principe", "Saudi Arabia", "Senegal", "Serbia", "Seychelles",
    "Sierra Leone", "Singapore", "Slovakia", "Slovenia", "Solomon Islands", "Somalia",
    "South Africa", "Spain", "Sri Lanka", "Sudan", "Sudan, South", "Suriname", "Sweden",
    "Switzerland", "Syria", "Tajikistan", "Tanzania", "Thailand", "Togo", "Tonga",
    "Trinidad and Tobago", "Tunisia", "Turkey", "Turkmenistan", "Tuvalu", "Uganda", "Ukraine",
    "United Arab Emirates", "United Kingdom", "United States", "Uruguay", "Uzbekistan", "Vanuatu",
    "Vatican City", "Venezuela", "Vietnam", "Yemen", "Zambia", "Zimbabwe",
];

pub const EXPATRIATE_BUCKETS: [&str; 2] = ["Yes", "No"];

pub const MARITAL_BUCKETS: [&str; 4] = [
    "Single",
    "Married/cohabiting",
    "Divorced/widowed",
    "Other/would rather not say",
];

pub const RISK_GROUP_BUCKETS: [&str; 3] = ["Yes", "No", "Not sure"];

pub const SITUATION_BUCKETS: [&str; 4] = [
    "Life carries on as usual",
    "Life carries on with minor changes",
    "Isolated",
    "Isolated in medical facility of similar location",
];

/// Head counts 0-10 verbatim, then decades up to 110
pub const HEAD_COUNT_BUCKETS: [&str; 21] = [
    "0", "1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11-20", "21-30", "31-40", "41-50",
    "51-60", "61-70", "71-80", "81-90", "91-100", "101-110",
];

// ============================================================================
// CLASSIFIERS
// ============================================================================

/// How a dimension turns a raw field into a bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classifier {
    /// Integer age, bucketed into `AGE_BUCKETS`
    AgeRange,
    /// Integer head count, bucketed into `HEAD_COUNT_BUCKETS`
    HeadCount,
    /// Free-text label matched against the canonical list
    Label,
}

/// Age bucket for an integer age.
///
/// Below 65 the bucket is `AGE_BUCKETS[(age - 15) / 10]`, so 24 is still in
/// "18-24" and 25 starts "25-34". Ages below 15 have no bucket.
pub fn age_bucket(age: i64) -> Option<&'static str> {
    match age {
        a if a < 15 => None,
        a if a < 65 => Some(AGE_BUCKETS[((a - 15) / 10) as usize]),
        _ => Some(AGE_BUCKETS[AGE_BUCKETS.len() - 1]),
    }
}

/// Head-count bucket for the number of co-isolating adults or children
pub fn head_count_bucket(count: i64) -> Option<&'static str> {
    match count {
        c if c < 0 => None,
        c if c <= 10 => Some(HEAD_COUNT_BUCKETS[c as usize]),
        c if c <= 110 => Some(HEAD_COUNT_BUCKETS[((c - 11) / 10 + 11) as usize]),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DimensionSpec {
    pub dimension: Dimension,
    pub labels: &'static [&'static str],
    pub classifier: Classifier,
}

// ============================================================================
// BUCKET SCHEMA
// ============================================================================

#[derive(Debug, Clone)]
pub struct BucketSchema {
    specs: [DimensionSpec; DIMENSION_COUNT],
    normalizer: LabelNormalizer,
}

impl BucketSchema {
    pub fn new(normalizer: LabelNormalizer) -> Self {
        let specs = Dimension::ALL.map(|dimension| {
            let (labels, classifier): (&'static [&'static str], Classifier) = match dimension {
                Dimension::Age => (&AGE_BUCKETS[..], Classifier::AgeRange),
                Dimension::Gender => (&GENDER_BUCKETS[..], Classifier::Label),
                Dimension::Education => (&EDUCATION_BUCKETS[..], Classifier::Label),
                Dimension::EmploymentStatus => (&EMPLOYMENT_BUCKETS[..], Classifier::Label),
                Dimension::CountryOfResidence => (&COUNTRY_BUCKETS[..], Classifier::Label),
                Dimension::Expatriate => (&EXPATRIATE_BUCKETS[..], Classifier::Label),
                Dimension::MaritalStatus => (&MARITAL_BUCKETS[..], Classifier::Label),
                Dimension::RiskGroup => (&RISK_GROUP_BUCKETS[..], Classifier::Label),
                Dimension::CurrentSituation => (&SITUATION_BUCKETS[..], Classifier::Label),
                Dimension::IsolationAdults => (&HEAD_COUNT_BUCKETS[..], Classifier::HeadCount),
                Dimension::IsolationChildren => (&HEAD_COUNT_BUCKETS[..], Classifier::HeadCount),
            };
            DimensionSpec {
                dimension,
                labels,
                classifier,
            }
        });

        BucketSchema { specs, normalizer }
    }

    pub fn spec(&self, dimension: Dimension) -> &DimensionSpec {
        &self.specs[dimension.index()]
    }

    /// Canonical labels of a dimension, in declaration order
    pub fn labels(&self, dimension: Dimension) -> &'static [&'static str] {
        self.spec(dimension).labels
    }

    /// Classify one raw field. Never fails: anything unrecognized is "NA".
    pub fn classify(&self, dimension: Dimension, raw: &str) -> &'static str {
        let spec = self.spec(dimension);
        let raw = raw.trim();

        let bucket = match spec.classifier {
            Classifier::AgeRange => raw.parse::<i64>().ok().and_then(age_bucket),
            Classifier::HeadCount => raw.parse::<i64>().ok().and_then(head_count_bucket),
            Classifier::Label => self.match_label(spec.labels, raw),
        };

        bucket.unwrap_or(NA_BUCKET)
    }

    /// Classify every dimension of a row; missing columns classify as "NA"
    pub fn classify_row<S: AsRef<str>>(&self, row: &[S]) -> [&'static str; DIMENSION_COUNT] {
        Dimension::ALL.map(|dimension| match row.get(dimension.column()) {
            Some(field) => self.classify(dimension, field.as_ref()),
            None => NA_BUCKET,
        })
    }

    fn match_label(&self, labels: &'static [&'static str], raw: &str) -> Option<&'static str> {
        if raw.is_empty() || raw == NA_BUCKET {
            return None;
        }

        if let Some(exact) = labels.iter().find(|label| **label == raw) {
            return Some(*exact);
        }

        // Export uses lower case for yes/no style answers
        if let Some(folded) = labels.iter().find(|label| label.eq_ignore_ascii_case(raw)) {
            return Some(*folded);
        }

        let canonical = self.normalizer.normalize(raw)?;
        labels.iter().find(|label| **label == canonical).copied()
    }
}

impl Default for BucketSchema {
    fn default() -> Self {
        Self::new(LabelNormalizer::standard())
    }
}

// ============================================================================
// TESTS
// ============================================================================

//! NIST SP 800-22 test identifiers.
//!
//! The battery names each p-value file after a test key. Keys are stable
//! machine identifiers; display names are for people.

/// The fifteen tests of the NIST SP 800-22 battery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NistTestKind {
    Frequency,
    FrequencyBlock,
    Runs,
    LongestRunOfOnes,
    BinaryMatrixRank,
    DiscreteFourierTransform,
    NonOverlappingTemplateMatching,
    OverlappingTemplateMatching,
    MaurersUniversal,
    LinearComplexity,
    Serial,
    ApproximateEntropy,
    CumulativeSums,
    RandomExcursions,
    RandomExcursionsVariant,
}

impl NistTestKind {
    /// All tests in battery order.
    pub const ALL: [NistTestKind; 15] = [
        Self::Frequency,
        Self::FrequencyBlock,
        Self::Runs,
        Self::LongestRunOfOnes,
        Self::BinaryMatrixRank,
        Self::DiscreteFourierTransform,
        Self::NonOverlappingTemplateMatching,
        Self::OverlappingTemplateMatching,
        Self::MaurersUniversal,
        Self::LinearComplexity,
        Self::Serial,
        Self::ApproximateEntropy,
        Self::CumulativeSums,
        Self::RandomExcursions,
        Self::RandomExcursionsVariant,
    ];

    /// File stem used by the battery.
    pub fn key(self) -> &'static str {
        match self {
            Self::Frequency => "Frequency_Test",
            Self::FrequencyBlock => "Frequency_Block_Test",
            Self::Runs => "Runs_Test",
            Self::LongestRunOfOnes => "Longest_Run_of_Ones_Test",
            Self::BinaryMatrixRank => "Binary_Matrix_Rank_Test",
            Self::DiscreteFourierTransform => "Discrete_Fourier_Transform_Test",
            Self::NonOverlappingTemplateMatching => "Non-overlapping_Template_Matching_Test",
            Self::OverlappingTemplateMatching => "Overlapping_Template_Matching_Test",
            Self::MaurersUniversal => "Maurer’s_“Universal_Statistical”_Test",
            Self::LinearComplexity => "Linear_Complexity_Test",
            Self::Serial => "Serial_Test",
            Self::ApproximateEntropy => "Approximate_Entropy_Test",
            Self::CumulativeSums => "Cumulative_Sums_Test",
            Self::RandomExcursions => "Random_Excursions_Test",
            Self::RandomExcursionsVariant => "Random_Excursions_Variant_Test",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Frequency => "Frequency (Monobit)",
            Self::FrequencyBlock => "Frequency within a Block",
            Self::Runs => "Runs",
            Self::LongestRunOfOnes => "Longest Run of Ones in a Block",
            Self::BinaryMatrixRank => "Binary Matrix Rank",
            Self::DiscreteFourierTransform => "Discrete Fourier Transform (Spectral)",
            Self::NonOverlappingTemplateMatching => "Non-overlapping Template Matching",
            Self::OverlappingTemplateMatching => "Overlapping Template Matching",
            Self::MaurersUniversal => "Maurer's Universal Statistical",
            Self::LinearComplexity => "Linear Complexity",
            Self::Serial => "Serial",
            Self::ApproximateEntropy => "Approximate Entropy",
            Self::CumulativeSums => "Cumulative Sums (Cusum)",
            Self::RandomExcursions => "Random Excursions",
            Self::RandomExcursionsVariant => "Random Excursions Variant",
        }
    }

    /// Resolve a file stem to a test.
    ///
    /// Exact keys win; otherwise the longest key that prefixes `stem` is used,
    /// so per-state files such as `Random_Excursions_Test_x=-4` still resolve.
    pub fn from_key(stem: &str) -> Option<Self> {
        if let Some(kind) = Self::ALL.iter().copied().find(|k| k.key() == stem) {
            return Some(kind);
        }
        Self::ALL
            .iter()
            .copied()
            .filter(|k| stem.starts_with(k.key()))
            .max_by_key(|k| k.key().len())
    }
}

impl std::fmt::Display for NistTestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

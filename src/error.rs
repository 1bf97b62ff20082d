//! Error types for the guild roster core

use pyo3::PyErr;
use thiserror::Error;

pyo3::create_exception!(
    guild_roster_core,
    TalentBuildError,
    pyo3::exceptions::PyValueError,
    "A talent allocation broke a build rule."
);
pyo3::create_exception!(
    guild_roster_core,
    AllocationParseError,
    pyo3::exceptions::PyValueError,
    "Talent allocation text could not be read."
);
pyo3::create_exception!(
    guild_roster_core,
    FieldValidationError,
    pyo3::exceptions::PyValueError,
    "A character sheet field holds a value outside its enumeration."
);
pyo3::create_exception!(
    guild_roster_core,
    CatalogError,
    pyo3::exceptions::PyRuntimeError,
    "The talent catalog is missing or malformed."
);

/// Broad grouping of errors, one per Python exception class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    TalentBuild,
    AllocationParse,
    Field,
    Catalog,
}

/// Main error type for the guild roster core
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GuildError {
    // Talent build rules
    #[error("No talent trees are registered for class '{class}'")]
    UnknownClassForTalents { class: String },

    #[error("Ranks for '{talent}' must be a positive integer, got {value}")]
    InvalidRankValue { talent: String, value: String },

    #[error("Talent '{talent}' does not exist for class '{class}'")]
    UnknownTalent { talent: String, class: String },

    #[error("Talent '{talent}' has a maximum of {max_rank} ranks, but {requested} were requested")]
    RankExceedsMax {
        talent: String,
        max_rank: u32,
        requested: u64,
    },

    #[error("Talent '{talent}' requires level {required}, but the character is level {level}")]
    LevelTooLow {
        talent: String,
        required: u32,
        level: u32,
    },

    #[error("A level {level} character has {available} talent points, but {spent} were spent")]
    PointBudgetExceeded {
        level: u32,
        available: u32,
        spent: u64,
    },

    #[error(
        "Talent '{talent}' is in tier {tier} of {tree} and needs {required} points in {tree}, but only {spent} were spent there"
    )]
    TierGateNotMet {
        talent: String,
        tree: String,
        tier: u8,
        required: u32,
        spent: u64,
    },

    #[error("Talent '{talent}' requires {ranks} ranks in '{prerequisite}', which was not chosen")]
    MissingPrerequisite {
        talent: String,
        prerequisite: String,
        ranks: u32,
    },

    #[error("Talent '{talent}' requires {required} ranks in '{prerequisite}', but only {actual} were spent")]
    PrerequisiteRankTooLow {
        talent: String,
        prerequisite: String,
        required: u32,
        actual: u64,
    },

    #[error("Character level {0} is out of range")]
    InvalidLevel(i64),

    // Allocation parse stage
    #[error("Talent allocation is not a JSON object of talent names to ranks: {0}")]
    MalformedAllocation(String),

    // Character sheet fields
    #[error("'{0}' is not a valid race")]
    InvalidRace(String),

    #[error("'{0}' is not a valid class")]
    InvalidClass(String),

    #[error("A {race} cannot be a {class}")]
    IncompatibleCombination { race: String, class: String },

    #[error("At least one role must be selected")]
    NoRolesSelected,

    #[error("'{0}' is not a valid role")]
    InvalidRole(String),

    #[error("'{0}' is not a valid profession")]
    InvalidProfession(String),

    #[error("At most {max} primary professions are allowed, got {count}")]
    TooManyPrimaryProfessions { count: usize, max: usize },

    #[error("'{0}' is not a valid http(s) URL")]
    InvalidUrlFormat(String),

    // Catalog
    #[error("Talent catalog not initialized. Call load_talent_catalog() first.")]
    CatalogNotInitialized,

    #[error("Invalid talent catalog: {0}")]
    InvalidCatalog(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),
}

impl GuildError {
    /// Machine-readable name of the failure, stable across releases
    pub fn kind(&self) -> &'static str {
        match self {
            GuildError::UnknownClassForTalents { .. } => "UnknownClassForTalents",
            GuildError::InvalidRankValue { .. } => "InvalidRankValue",
            GuildError::UnknownTalent { .. } => "UnknownTalent",
            GuildError::RankExceedsMax { .. } => "RankExceedsMax",
            GuildError::LevelTooLow { .. } => "LevelTooLow",
            GuildError::PointBudgetExceeded { .. } => "PointBudgetExceeded",
            GuildError::TierGateNotMet { .. } => "TierGateNotMet",
            GuildError::MissingPrerequisite { .. } => "MissingPrerequisite",
            GuildError::PrerequisiteRankTooLow { .. } => "PrerequisiteRankTooLow",
            GuildError::InvalidLevel(_) => "InvalidLevel",
            GuildError::MalformedAllocation(_) => "MalformedAllocation",
            GuildError::InvalidRace(_) => "InvalidRace",
            GuildError::InvalidClass(_) => "InvalidClass",
            GuildError::IncompatibleCombination { .. } => "IncompatibleCombination",
            GuildError::NoRolesSelected => "NoRolesSelected",
            GuildError::InvalidRole(_) => "InvalidRole",
            GuildError::InvalidProfession(_) => "InvalidProfession",
            GuildError::TooManyPrimaryProfessions { .. } => "TooManyPrimaryProfessions",
            GuildError::InvalidUrlFormat(_) => "InvalidUrlFormat",
            GuildError::CatalogNotInitialized => "CatalogNotInitialized",
            GuildError::InvalidCatalog(_) => "InvalidCatalog",
            GuildError::DeserializationError(_) => "DeserializationError",
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            GuildError::UnknownClassForTalents { .. }
            | GuildError::UnknownTalent { .. }
            | GuildError::RankExceedsMax { .. }
            | GuildError::LevelTooLow { .. }
            | GuildError::PointBudgetExceeded { .. }
            | GuildError::TierGateNotMet { .. }
            | GuildError::MissingPrerequisite { .. }
            | GuildError::PrerequisiteRankTooLow { .. }
            | GuildError::InvalidLevel(_) => ErrorCategory::TalentBuild,
            // Raised by both stages; the parse stage and the validator agree on the rule
            GuildError::InvalidRankValue { .. } => ErrorCategory::TalentBuild,
            GuildError::MalformedAllocation(_) => ErrorCategory::AllocationParse,
            GuildError::InvalidRace(_)
            | GuildError::InvalidClass(_)
            | GuildError::IncompatibleCombination { .. }
            | GuildError::NoRolesSelected
            | GuildError::InvalidRole(_)
            | GuildError::InvalidProfession(_)
            | GuildError::TooManyPrimaryProfessions { .. }
            | GuildError::InvalidUrlFormat(_) => ErrorCategory::Field,
            GuildError::CatalogNotInitialized
            | GuildError::InvalidCatalog(_)
            | GuildError::DeserializationError(_) => ErrorCategory::Catalog,
        }
    }
}

impl From<GuildError> for PyErr {
    fn from(err: GuildError) -> PyErr {
        let args = (err.kind(), err.to_string());
        match err.category() {
            ErrorCategory::TalentBuild => TalentBuildError::new_err(args),
            ErrorCategory::AllocationParse => AllocationParseError::new_err(args),
            ErrorCategory::Field => FieldValidationError::new_err(args),
            ErrorCategory::Catalog => CatalogError::new_err(args),
        }
    }
}

/// Result type alias for the guild roster core
pub type Result<T> = std::result::Result<T, GuildError>;

//! Guild Roster Core - rules engine behind the guild management bot
//!
//! This crate validates character submissions (race, class, roles,
//! professions, links) and talent builds against a swappable talent
//! catalog, with Python bindings via PyO3.

use pyo3::prelude::*;

pub mod catalog;
pub mod config;
pub mod error;
pub mod profile;
pub mod talent;

use crate::catalog::{CatalogStore, TalentCatalog};
use crate::error::{
    AllocationParseError, CatalogError, FieldValidationError, GuildError, TalentBuildError,
};
use crate::talent::{parse_allocation, validate_build, Allocation, TalentBuildReport};
use once_cell::sync::Lazy;
use pyo3::types::{PyBool, PyDict, PyInt};
use tracing_subscriber::EnvFilter;

// ============================================================================
// Cached Catalog
// ============================================================================

/// Global talent catalog, replaced wholesale on every sync
static CATALOG: Lazy<CatalogStore> = Lazy::new(CatalogStore::new);

// ============================================================================
// Helper Functions
// ============================================================================

fn install_catalog(catalog: TalentCatalog) {
    let classes = catalog.classes().len();
    let talents = catalog.talent_count();
    match CATALOG.replace(catalog) {
        Some(previous) => tracing::info!(classes, talents, previous, "talent catalog reloaded"),
        None => tracing::info!(classes, talents, "talent catalog loaded"),
    }
}

fn character_level(level: i64) -> Result<u32, GuildError> {
    u32::try_from(level).map_err(|_| GuildError::InvalidLevel(level))
}

fn invalid_rank(talent: &str, value: &Bound<'_, PyAny>) -> GuildError {
    GuildError::InvalidRankValue {
        talent: talent.to_string(),
        value: value
            .repr()
            .map(|r| r.to_string())
            .unwrap_or_else(|_| "?".to_string()),
    }
}

/// Read a {talent: ranks} dict; anything but a plain int is not a rank
fn extract_allocation(dict: &Bound<'_, PyDict>) -> PyResult<Allocation> {
    let mut allocation = Allocation::new();
    for (key, value) in dict.iter() {
        let talent: String = key.extract().map_err(|_| {
            GuildError::MalformedAllocation("talent names must be strings".to_string())
        })?;

        // bool is an int subclass in Python
        if value.is_instance_of::<PyBool>() || !value.is_instance_of::<PyInt>() {
            return Err(invalid_rank(&talent, &value).into());
        }
        let ranks: i64 = match value.extract() {
            Ok(ranks) => ranks,
            // Python ints are unbounded; a huge positive one is still just too many ranks
            Err(_) if value.gt(0)? => i64::MAX,
            Err(_) => return Err(invalid_rank(&talent, &value).into()),
        };
        allocation.insert(talent, ranks);
    }
    Ok(allocation)
}

/// Accept either "a, b, c" or a list of strings
fn extract_list(obj: &Bound<'_, PyAny>) -> PyResult<Vec<String>> {
    if obj.is_none() {
        return Ok(Vec::new());
    }
    if let Ok(text) = obj.extract::<String>() {
        return Ok(profile::parse_list(&text));
    }
    obj.extract()
}

fn run_validation(
    class_name: &str,
    level: i64,
    allocation: &Allocation,
) -> PyResult<TalentBuildReport> {
    let level = character_level(level)?;
    let catalog = CATALOG.snapshot()?;

    match validate_build(&catalog, class_name, level, allocation) {
        Ok(summary) => {
            tracing::debug!(
                class = class_name,
                level,
                spent = summary.points_spent,
                "talent build accepted"
            );
            Ok(TalentBuildReport::new(summary))
        }
        Err(err) => {
            tracing::debug!(class = class_name, level, kind = err.kind(), "talent build rejected");
            Err(err.into())
        }
    }
}

// ============================================================================
// Python Functions
// ============================================================================

/// Install a tracing subscriber writing to stderr
///
/// # Arguments
/// * `filter` - EnvFilter directives such as "guild_roster_core=debug";
///   defaults to `RUST_LOG`, then "info"
///
/// # Returns
/// False if a subscriber was already installed
#[pyfunction]
#[pyo3(signature = (filter=None))]
fn init_logging(filter: Option<&str>) -> PyResult<bool> {
    let filter = match filter {
        Some(directives) => EnvFilter::try_new(directives).map_err(|e| {
            PyErr::new::<pyo3::exceptions::PyValueError, _>(format!(
                "Invalid log filter: {}",
                e
            ))
        })?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    Ok(tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok())
}

/// Load (or replace) the talent catalog from a dict
///
/// Expected shape: {class: {tree: {talent: {"tier", "max_rank",
/// "min_level"?, "prerequisites"?: [{"talent", "ranks"}]}}}}
///
/// Validations already running keep using the catalog they started with.
#[pyfunction]
fn load_talent_catalog(catalog: &Bound<'_, PyDict>) -> PyResult<()> {
    let talents = config::deserialize_talent_catalog(catalog)?;
    install_catalog(talents);
    Ok(())
}

/// Load (or replace) the talent catalog from JSON text
#[pyfunction]
fn load_talent_catalog_json(text: &str) -> PyResult<()> {
    let talents = config::parse_talent_catalog_json(text)?;
    install_catalog(talents);
    Ok(())
}

/// Load (or replace) the talent catalog from JSON text without blocking
/// the event loop
///
/// Parsing runs on Tokio's blocking pool; the swap itself is instant.
///
/// # Example (Python)
/// ```python
/// await load_talent_catalog_json_async(sheet_json)
/// ```
#[pyfunction]
fn load_talent_catalog_json_async<'py>(py: Python<'py>, text: String) -> PyResult<Bound<'py, PyAny>> {
    pyo3_async_runtimes::tokio::future_into_py(py, async move {
        let talents = tokio::task::spawn_blocking(move || config::parse_talent_catalog_json(&text))
            .await
            .map_err(|e| {
                PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(format!(
                    "Catalog load task panicked: {}",
                    e
                ))
            })??;

        install_catalog(talents);
        Ok::<(), PyErr>(())
    })
}

/// Check if the talent catalog is loaded
#[pyfunction]
fn is_catalog_initialized() -> bool {
    CATALOG.is_initialized()
}

/// Classes with talent trees, in catalog order
#[pyfunction]
fn talent_classes() -> PyResult<Vec<String>> {
    let catalog = CATALOG.snapshot()?;
    Ok(catalog.classes().to_vec())
}

/// Trees of a class as [(tree, [talent, ...])], in catalog order
#[pyfunction]
fn class_talent_trees(class_name: &str) -> PyResult<Vec<(String, Vec<String>)>> {
    let catalog = CATALOG.snapshot()?;
    let class = catalog.lookup(class_name)?;
    Ok(class
        .trees()
        .iter()
        .map(|tree| {
            let names = tree.talents().iter().map(|t| t.name.clone()).collect();
            (tree.name.clone(), names)
        })
        .collect())
}

/// Talent points a character of this level has to spend
#[pyfunction]
fn available_talent_points(level: i64) -> PyResult<u32> {
    Ok(talent::available_talent_points(character_level(level)?))
}

/// Validate a talent build given as {talent: ranks}
///
/// # Returns
/// A TalentBuildReport describing the accepted build
///
/// # Raises
/// TalentBuildError with args (kind, message) when a rule is broken,
/// CatalogError if no catalog was loaded
#[pyfunction]
fn validate_talent_build(
    class_name: &str,
    level: i64,
    allocation: &Bound<'_, PyDict>,
) -> PyResult<TalentBuildReport> {
    let allocation = extract_allocation(allocation)?;
    run_validation(class_name, level, &allocation)
}

/// Validate a talent build given as the JSON text typed in chat
///
/// # Raises
/// AllocationParseError when the text is not a JSON object, otherwise as
/// `validate_talent_build`
#[pyfunction]
fn validate_talent_build_json(class_name: &str, level: i64, text: &str) -> PyResult<TalentBuildReport> {
    let allocation = parse_allocation(text)?;
    run_validation(class_name, level, &allocation)
}

/// Exact-match race check
#[pyfunction]
fn validate_race(name: &str) -> PyResult<bool> {
    profile::validate_race(name)?;
    Ok(true)
}

/// Exact-match class check
#[pyfunction]
fn validate_class(name: &str) -> PyResult<bool> {
    profile::validate_class(name)?;
    Ok(true)
}

/// Case-insensitive race and class check against the compatibility matrix
#[pyfunction]
fn validate_race_class(race: &str, class_name: &str) -> PyResult<bool> {
    profile::validate_race_class(race, class_name)?;
    Ok(true)
}

/// Roles as "Tank, Healer" or ["Tank", "Healer"]
#[pyfunction]
fn validate_roles(roles: &Bound<'_, PyAny>) -> PyResult<bool> {
    profile::validate_roles(&extract_list(roles)?)?;
    Ok(true)
}

/// Professions as "Mining, Cooking" or a list; empty is valid
#[pyfunction]
fn validate_professions(professions: &Bound<'_, PyAny>) -> PyResult<bool> {
    profile::validate_professions(&extract_list(professions)?)?;
    Ok(true)
}

/// Empty string or an http(s) URL
#[pyfunction]
fn validate_url(url: &str) -> PyResult<bool> {
    profile::validate_url(url)?;
    Ok(true)
}

/// Canonical race spelling, or None
#[pyfunction]
fn canonical_race(name: &str) -> Option<&'static str> {
    catalog::canonical_race(name)
}

/// Canonical class spelling, or None
#[pyfunction]
fn canonical_class(name: &str) -> Option<&'static str> {
    catalog::canonical_class(name)
}

/// Classes a race may play; empty for unknown races
#[pyfunction]
fn classes_for_race(race: &str) -> Vec<&'static str> {
    catalog::canonical_race(race)
        .map(|race| catalog::classes_for_race(race).to_vec())
        .unwrap_or_default()
}

/// Clean free text from a submission before storing or echoing it
#[pyfunction]
#[pyo3(signature = (text, max_chars=1024))]
fn sanitize_input(text: &str, max_chars: usize) -> String {
    profile::sanitize_input(text, max_chars)
}

// ============================================================================
// Python Module Definition
// ============================================================================

/// Python module definition
#[pymodule]
fn guild_roster_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(init_logging, m)?)?;
    m.add_function(wrap_pyfunction!(load_talent_catalog, m)?)?;
    m.add_function(wrap_pyfunction!(load_talent_catalog_json, m)?)?;
    m.add_function(wrap_pyfunction!(load_talent_catalog_json_async, m)?)?;
    m.add_function(wrap_pyfunction!(is_catalog_initialized, m)?)?;
    m.add_function(wrap_pyfunction!(talent_classes, m)?)?;
    m.add_function(wrap_pyfunction!(class_talent_trees, m)?)?;
    m.add_function(wrap_pyfunction!(available_talent_points, m)?)?;
    m.add_function(wrap_pyfunction!(validate_talent_build, m)?)?;
    m.add_function(wrap_pyfunction!(validate_talent_build_json, m)?)?;
    m.add_function(wrap_pyfunction!(validate_race, m)?)?;
    m.add_function(wrap_pyfunction!(validate_class, m)?)?;
    m.add_function(wrap_pyfunction!(validate_race_class, m)?)?;
    m.add_function(wrap_pyfunction!(validate_roles, m)?)?;
    m.add_function(wrap_pyfunction!(validate_professions, m)?)?;
    m.add_function(wrap_pyfunction!(validate_url, m)?)?;
    m.add_function(wrap_pyfunction!(canonical_race, m)?)?;
    m.add_function(wrap_pyfunction!(canonical_class, m)?)?;
    m.add_function(wrap_pyfunction!(classes_for_race, m)?)?;
    m.add_function(wrap_pyfunction!(sanitize_input, m)?)?;
    m.add_class::<TalentBuildReport>()?;

    let py = m.py();
    m.add("TalentBuildError", py.get_type::<TalentBuildError>())?;
    m.add("AllocationParseError", py.get_type::<AllocationParseError>())?;
    m.add("FieldValidationError", py.get_type::<FieldValidationError>())?;
    m.add("CatalogError", py.get_type::<CatalogError>())?;
    m.add("RACES", catalog::RACES.to_vec())?;
    m.add("CLASSES", catalog::CLASSES.to_vec())?;
    m.add("ROLES", catalog::ROLES.to_vec())?;
    m.add("PRIMARY_PROFESSIONS", catalog::PRIMARY_PROFESSIONS.to_vec())?;
    m.add("SECONDARY_PROFESSIONS", catalog::SECONDARY_PROFESSIONS.to_vec())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CStr;

    fn eval<'py>(py: Python<'py>, source: &CStr) -> Bound<'py, PyAny> {
        py.eval(source, None, None).unwrap()
    }

    fn error_kind(py: Python<'_>, err: &PyErr) -> String {
        err.value(py)
            .getattr("args")
            .and_then(|args| args.get_item(0))
            .and_then(|kind| kind.extract())
            .unwrap()
    }

    #[test]
    fn test_character_level() {
        assert_eq!(character_level(60), Ok(60));
        assert_eq!(character_level(0), Ok(0));
        assert_eq!(character_level(-1), Err(GuildError::InvalidLevel(-1)));
        assert_eq!(
            character_level(4_294_967_296),
            Err(GuildError::InvalidLevel(4_294_967_296))
        );
    }

    #[test]
    fn test_extract_allocation_keeps_order() {
        Python::initialize();
        Python::attach(|py| {
            let dict = eval(py, c"{'Tactical Mastery': 5, 'Deflection': 2}");
            let allocation = extract_allocation(dict.downcast::<PyDict>().unwrap()).unwrap();
            assert_eq!(
                allocation.iter().collect::<Vec<_>>(),
                vec![("Tactical Mastery", 5), ("Deflection", 2)]
            );
        });
    }

    #[test]
    fn test_extract_allocation_rejects_non_int_ranks() {
        Python::initialize();
        Python::attach(|py| {
            for source in [
                c"{'Cruelty': True}",
                c"{'Cruelty': 2.0}",
                c"{'Cruelty': '5'}",
                c"{'Cruelty': None}",
                c"{'Cruelty': -10**30}",
            ] {
                let dict = eval(py, source);
                let err = extract_allocation(dict.downcast::<PyDict>().unwrap()).unwrap_err();
                assert!(err.is_instance_of::<TalentBuildError>(py), "input: {:?}", source);
                assert_eq!(error_kind(py, &err), "InvalidRankValue", "input: {:?}", source);
            }
        });
    }

    #[test]
    fn test_extract_allocation_rejects_non_str_names() {
        Python::initialize();
        Python::attach(|py| {
            let dict = eval(py, c"{1: 5}");
            let err = extract_allocation(dict.downcast::<PyDict>().unwrap()).unwrap_err();
            assert!(err.is_instance_of::<AllocationParseError>(py));
            assert_eq!(error_kind(py, &err), "MalformedAllocation");
        });
    }

    #[test]
    fn test_extract_allocation_saturates_huge_ranks() {
        Python::initialize();
        Python::attach(|py| {
            let dict = eval(py, c"{'Cruelty': 10**30}");
            let allocation = extract_allocation(dict.downcast::<PyDict>().unwrap()).unwrap();
            assert_eq!(allocation.get("Cruelty"), Some(i64::MAX));
        });
    }

    #[test]
    fn test_extract_list_accepts_text_or_list() {
        Python::initialize();
        Python::attach(|py| {
            assert_eq!(
                extract_list(&eval(py, c"'Tank, Healer,,'")).unwrap(),
                vec!["Tank", "Healer"]
            );
            assert_eq!(
                extract_list(&eval(py, c"['Tank', ' DPS ']")).unwrap(),
                vec!["Tank", " DPS "]
            );
            assert!(extract_list(&eval(py, c"None")).unwrap().is_empty());
            assert!(extract_list(&eval(py, c"5")).is_err());

            let err = validate_roles(&eval(py, c"['Tank', ' DPS ']")).unwrap_err();
            assert!(err.is_instance_of::<FieldValidationError>(py));
            assert_eq!(error_kind(py, &err), "InvalidRole");
            assert!(validate_professions(&eval(py, c"'Mining, Cooking'")).unwrap());
        });
    }

    #[test]
    fn test_dict_catalog_load_then_validate() {
        Python::initialize();
        Python::attach(|py| {
            let catalog = eval(
                py,
                c"{'Warrior': {
                    'Arms': {'Deflection': {'tier': 1, 'max_rank': 5},
                             'Tactical Mastery': {'tier': 2, 'max_rank': 5}},
                    'Fury': {'Cruelty': {'tier': 1, 'max_rank': 5}},
                }}",
            );
            load_talent_catalog(catalog.downcast::<PyDict>().unwrap()).unwrap();
            assert!(is_catalog_initialized());

            let allocation = eval(py, c"{'Deflection': 5, 'Cruelty': 3}");
            let report =
                validate_talent_build("Warrior", 20, allocation.downcast::<PyDict>().unwrap())
                    .unwrap();
            assert_eq!(report.summary().distribution(), "5/3");

            let err = validate_talent_build("Warrior", -5, allocation.downcast::<PyDict>().unwrap())
                .unwrap_err();
            assert_eq!(error_kind(py, &err), "InvalidLevel");

            let bad = eval(py, c"{'Warrior': {'Arms': {'Deflection': {'max_rank': 5}}}}");
            let err = load_talent_catalog(bad.downcast::<PyDict>().unwrap()).unwrap_err();
            assert!(err.is_instance_of::<CatalogError>(py));
            // The rejected load leaves the previous catalog in place
            assert_eq!(talent_classes().unwrap(), vec!["Warrior"]);
        });
    }
}

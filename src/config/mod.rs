//! Configuration module for catalog data
//!
//! This module turns the talent catalog handed over by the bot (a Python
//! dict or JSON text, `class -> tree -> talent -> TalentConfig`) into a
//! `TalentCatalog`.

mod talent;

pub use talent::*;

use crate::catalog::TalentCatalog;
use crate::error::{GuildError, Result};
use pyo3::types::{PyAnyMethods, PyBool, PyDict, PyDictMethods, PyInt, PyList, PyListMethods};
use pyo3::Bound;
use serde_json::{Map, Value};
use smallvec::SmallVec;

/// Helper to get attribute from either dict or object
fn get_attr<'py>(obj: &Bound<'py, pyo3::PyAny>, name: &str) -> pyo3::PyResult<Bound<'py, pyo3::PyAny>> {
    if let Ok(dict) = obj.downcast::<PyDict>() {
        dict.get_item(name)?
            .ok_or_else(|| pyo3::exceptions::PyKeyError::new_err(name.to_string()))
    } else {
        obj.getattr(name)
    }
}

/// Helper to get optional attribute from either dict or object
fn get_attr_opt<'py>(obj: &Bound<'py, pyo3::PyAny>, name: &str) -> Option<Bound<'py, pyo3::PyAny>> {
    if let Ok(dict) = obj.downcast::<PyDict>() {
        dict.get_item(name).ok().flatten()
    } else {
        obj.getattr(name).ok()
    }
}

/// Deserialize the talent catalog from a Python dict
/// Expected format: {class: {tree: {talent: TalentConfig, ...}, ...}, ...}
///
/// Any malformed entry rejects the whole catalog with a `DeserializationError`
/// naming where it sits; nothing is coerced or defaulted past a bad value.
pub fn deserialize_talent_catalog(catalog: &Bound<'_, PyDict>) -> Result<TalentCatalog> {
    let mut talents = TalentCatalog::default();

    for (class_key, trees) in catalog.iter() {
        let class = extract_key(&class_key, "class name")?;
        let trees: Bound<'_, PyDict> = trees.extract().map_err(|_| {
            GuildError::DeserializationError(format!("trees of class '{}' must be a dict", class))
        })?;

        for (tree_key, tree_talents) in trees.iter() {
            let tree = extract_key(&tree_key, &format!("tree name ({})", class))?;
            let tree_talents: Bound<'_, PyDict> = tree_talents.extract().map_err(|_| {
                GuildError::DeserializationError(format!(
                    "talents of tree '{}' ({}) must be a dict",
                    tree, class
                ))
            })?;

            // Trees without talents still count towards the distribution string
            talents.ensure_tree(&class, &tree);
            for (name_key, value) in tree_talents.iter() {
                let name = extract_key(&name_key, &format!("talent name ({}, {})", class, tree))?;
                let config = extract_talent(&value).map_err(|e| {
                    GuildError::DeserializationError(format!(
                        "talent '{}' ({}, {}): {}",
                        name, class, tree, e
                    ))
                })?;
                talents.insert(&class, &tree, &name, config)?;
            }
        }
    }

    talents.audit();
    Ok(talents)
}

fn extract_key(key: &Bound<'_, pyo3::PyAny>, what: &str) -> Result<String> {
    key.extract().map_err(|_| {
        let repr = key.repr().map(|r| r.to_string()).unwrap_or_else(|_| "?".to_string());
        GuildError::DeserializationError(format!("{} must be a string, got {}", what, repr))
    })
}

/// Integer field of a talent entry; bool and float are rejected rather than coerced
fn extract_int<T: TryFrom<u64>>(value: &Bound<'_, pyo3::PyAny>, field: &str) -> pyo3::PyResult<T> {
    if value.is_instance_of::<PyBool>() || !value.is_instance_of::<PyInt>() {
        let repr = value.repr().map(|r| r.to_string()).unwrap_or_else(|_| "?".to_string());
        return Err(pyo3::exceptions::PyTypeError::new_err(format!(
            "'{}' must be an integer, got {}",
            field, repr
        )));
    }
    value
        .extract::<u64>()
        .ok()
        .and_then(|raw| T::try_from(raw).ok())
        .ok_or_else(|| {
            pyo3::exceptions::PyValueError::new_err(format!("'{}' is out of range", field))
        })
}

fn extract_talent(obj: &Bound<'_, pyo3::PyAny>) -> pyo3::PyResult<TalentConfig> {
    let tier: u8 = extract_int(&get_attr(obj, "tier")?, "tier")?;
    let max_rank: u32 = extract_int(&get_attr(obj, "max_rank")?, "max_rank")?;
    let min_level: Option<u32> = match get_attr_opt(obj, "min_level") {
        Some(value) if !value.is_none() => Some(extract_int(&value, "min_level")?),
        _ => None,
    };

    let prerequisites = match get_attr_opt(obj, "prerequisites") {
        Some(prereq_obj) if !prereq_obj.is_none() => {
            let list: Bound<'_, PyList> = prereq_obj.extract().map_err(|_| {
                pyo3::exceptions::PyTypeError::new_err("'prerequisites' must be a list")
            })?;
            let mut prerequisites = SmallVec::new();
            for item in list.iter() {
                prerequisites.push(extract_prerequisite(&item)?);
            }
            prerequisites
        }
        _ => SmallVec::new(),
    };

    Ok(TalentConfig {
        tier,
        max_rank,
        min_level,
        prerequisites,
    })
}

fn extract_prerequisite(obj: &Bound<'_, pyo3::PyAny>) -> pyo3::PyResult<PrerequisiteConfig> {
    let talent: String = get_attr(obj, "talent")?.extract()?;
    let ranks: u32 = extract_int(&get_attr(obj, "ranks")?, "ranks")?;
    Ok(PrerequisiteConfig { talent, ranks })
}

/// Parse the talent catalog from JSON text, keeping class, tree and talent order
pub fn parse_talent_catalog_json(text: &str) -> Result<TalentCatalog> {
    let root: Value = serde_json::from_str(text)
        .map_err(|e| GuildError::DeserializationError(e.to_string()))?;
    let classes = as_object(&root, "talent catalog")?;

    let mut talents = TalentCatalog::default();
    for (class, trees) in classes {
        let trees = as_object(trees, &format!("trees of class '{}'", class))?;
        for (tree, tree_talents) in trees {
            let tree_talents =
                as_object(tree_talents, &format!("talents of tree '{}' ({})", tree, class))?;
            talents.ensure_tree(class, tree);
            for (name, value) in tree_talents {
                let config: TalentConfig = serde_json::from_value(value.clone()).map_err(|e| {
                    GuildError::DeserializationError(format!("talent '{}' ({}): {}", name, class, e))
                })?;
                talents.insert(class, tree, name, config)?;
            }
        }
    }

    talents.audit();
    Ok(talents)
}

fn as_object<'a>(value: &'a Value, what: &str) -> Result<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| GuildError::DeserializationError(format!("{} must be a JSON object", what)))
}
